//! Stacked bar chart data and geometry.
//!
//! [`bar_layout`] is shared by the on-screen [`BarChart`] and the export SVG so the PDF
//! shows the same bars as the dashboard.

use std::collections::{BTreeMap, BTreeSet};

use dioxus::prelude::*;
use time::Date;

use super::axis::AxisLabelFormat;

/// Series colours, cycled.
pub const PALETTE: [&str; 6] = [
    "#4f6bed", "#f2994a", "#27ae60", "#eb5757", "#9b51e0", "#2d9cdb",
];

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StackedData {
    /// One label per x-axis bucket, left to right.
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    /// Same length as [`StackedData::labels`].
    pub values: Vec<f64>,
}

impl StackedData {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() || self.series.is_empty()
    }

    pub fn totals(&self) -> Vec<f64> {
        (0..self.labels.len())
            .map(|idx| self.series.iter().map(|s| s.values[idx]).sum())
            .collect()
    }
}

/// Group `(date, series, value)` points into label buckets per `format`, summing values
/// that land in the same bucket. Series keep first-seen order.
pub fn stack_series<I, S>(points: I, format: AxisLabelFormat) -> StackedData
where
    I: IntoIterator<Item = (Date, S, f64)>,
    S: Into<String>,
{
    let mut buckets: BTreeSet<Date> = BTreeSet::new();
    let mut order: Vec<String> = Vec::new();
    let mut sums: BTreeMap<(String, Date), f64> = BTreeMap::new();

    for (date, series, value) in points {
        let series = series.into();
        let bucket = format.bucket(date);
        buckets.insert(bucket);
        if !order.contains(&series) {
            order.push(series.clone());
        }
        *sums.entry((series, bucket)).or_default() += value;
    }

    let labels = buckets.iter().map(|d| format.label(*d)).collect();
    let series = order
        .into_iter()
        .map(|name| {
            let values = buckets
                .iter()
                .map(|bucket| {
                    sums.get(&(name.clone(), *bucket))
                        .copied()
                        .unwrap_or_default()
                })
                .collect();
            Series { name, values }
        })
        .collect();

    StackedData { labels, series }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub x: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarLayout {
    pub width: f64,
    pub height: f64,
    /// Y of the x-axis line.
    pub baseline: f64,
    pub bars: Vec<BarRect>,
    pub ticks: Vec<AxisTick>,
    pub max_total: f64,
}

pub const AXIS_GUTTER: f64 = 28.0;
const BAR_FILL_RATIO: f64 = 0.7;

/// Bars stacked bottom-up in series order, scaled so the tallest stack fills the plot.
pub fn bar_layout(data: &StackedData, width: f64, height: f64) -> BarLayout {
    let baseline = (height - AXIS_GUTTER).max(0.0);
    let totals = data.totals();
    let max_total = totals.iter().copied().fold(0.0_f64, f64::max);
    let slot = if data.labels.is_empty() {
        0.0
    } else {
        width / data.labels.len() as f64
    };
    let bar_width = slot * BAR_FILL_RATIO;

    let mut bars = Vec::new();
    let mut ticks = Vec::with_capacity(data.labels.len());
    for (idx, label) in data.labels.iter().enumerate() {
        let left = slot * idx as f64 + (slot - bar_width) / 2.0;
        ticks.push(AxisTick {
            x: slot * idx as f64 + slot / 2.0,
            label: label.clone(),
        });

        let mut top = baseline;
        for (series_idx, series) in data.series.iter().enumerate() {
            let value = series.values.get(idx).copied().unwrap_or_default();
            if value <= 0.0 || max_total <= 0.0 {
                continue;
            }
            let bar_height = value / max_total * baseline;
            top -= bar_height;
            bars.push(BarRect {
                x: left,
                y: top,
                width: bar_width,
                height: bar_height,
                color: PALETTE[series_idx % PALETTE.len()],
            });
        }
    }

    BarLayout {
        width,
        height,
        baseline,
        bars,
        ticks,
        max_total,
    }
}

#[component]
pub fn BarChart(
    data: StackedData,
    #[props(default = 640.0)] width: f64,
    #[props(default = 260.0)] height: f64,
) -> Element {
    let layout = bar_layout(&data, width, height);
    let view_box = format!("0 0 {} {}", layout.width, layout.height);
    let baseline = layout.baseline;
    let label_y = baseline + 18.0;
    let legend: Vec<(String, &'static str)> = data
        .series
        .iter()
        .enumerate()
        .map(|(idx, s)| (s.name.clone(), PALETTE[idx % PALETTE.len()]))
        .collect();

    rsx! {
        figure { class: "bar-chart",
            svg {
                class: "bar-chart__plot",
                view_box: "{view_box}",
                preserve_aspect_ratio: "none",
                line {
                    class: "bar-chart__axis",
                    x1: "0",
                    y1: "{baseline}",
                    x2: "{layout.width}",
                    y2: "{baseline}",
                }
                for bar in layout.bars.iter() {
                    rect {
                        x: "{bar.x}",
                        y: "{bar.y}",
                        width: "{bar.width}",
                        height: "{bar.height}",
                        fill: "{bar.color}",
                    }
                }
                for tick in layout.ticks.iter() {
                    text {
                        class: "bar-chart__tick",
                        x: "{tick.x}",
                        y: "{label_y}",
                        text_anchor: "middle",
                        "{tick.label}"
                    }
                }
            }
            if legend.len() > 1 {
                figcaption { class: "bar-chart__legend",
                    for (name, color) in legend.into_iter() {
                        span { class: "bar-chart__legend-item",
                            span { class: "bar-chart__swatch", style: "background: {color}" }
                            "{name}"
                        }
                    }
                }
            }
        }
    }
}

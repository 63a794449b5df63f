//! Sponsor/community events column.

use api::analytics::SponsorEventBucket;
use dioxus::prelude::*;
use time::Date;

use super::axis::AxisLabelFormat;
use super::chart::{stack_series, BarChart, StackedData};
use crate::core::format::format_count;

pub const NO_EVENTS_MESSAGE: &str = "No events for this period";

#[derive(Debug, Clone, PartialEq)]
pub enum SponsorColumnState {
    Loading,
    /// Either running total is zero or unknown.
    NoEvents,
    Chart {
        period_events: u32,
        to_date_events: u32,
        data: StackedData,
    },
}

impl SponsorColumnState {
    pub fn from_props(
        events: &[SponsorEventBucket],
        period_events: Option<u32>,
        to_date_events: Option<u32>,
        is_loading: bool,
        format: AxisLabelFormat,
    ) -> Self {
        if is_loading {
            return SponsorColumnState::Loading;
        }
        match (period_events, to_date_events) {
            (Some(period), Some(to_date)) if period > 0 && to_date > 0 => {
                let data = stack_series(
                    events
                        .iter()
                        .map(|b| (b.date, b.community.clone(), f64::from(b.count))),
                    format,
                );
                SponsorColumnState::Chart {
                    period_events: period,
                    to_date_events: to_date,
                    data,
                }
            }
            _ => SponsorColumnState::NoEvents,
        }
    }
}

#[component]
pub fn SponsorEventColumn(
    events: Vec<SponsorEventBucket>,
    period_events: Option<u32>,
    to_date_events: Option<u32>,
    is_loading: bool,
    range_start: Date,
    range_end: Date,
) -> Element {
    let format = AxisLabelFormat::for_range(range_start, range_end);
    let state = SponsorColumnState::from_props(
        &events,
        period_events,
        to_date_events,
        is_loading,
        format,
    );

    match state {
        SponsorColumnState::Loading => rsx! {
            div { class: "sponsor-column sponsor-column--loading", aria_busy: "true",
                div { class: "skeleton skeleton--line" }
                div { class: "skeleton skeleton--line skeleton--short" }
                div { class: "skeleton skeleton--block" }
            }
        },
        SponsorColumnState::NoEvents => rsx! {
            div { class: "sponsor-column",
                p { class: "sponsor-column__empty", "{NO_EVENTS_MESSAGE}" }
            }
        },
        SponsorColumnState::Chart {
            period_events,
            to_date_events,
            data,
        } => rsx! {
            div { class: "sponsor-column",
                div { class: "sponsor-column__totals",
                    div { class: "metric",
                        span { class: "metric__label", "This period" }
                        strong { class: "metric__value", "{format_count(period_events.into())}" }
                    }
                    div { class: "metric",
                        span { class: "metric__label", "To date" }
                        strong { class: "metric__value", "{format_count(to_date_events.into())}" }
                    }
                }
                BarChart { data }
            }
        },
    }
}

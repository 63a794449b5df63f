//! Chart-or-table rendering for each analytics type.

use api::analytics::{MetricSeriesResponse, RetentionResponse, SponsorEventsResponse};
use api::AnalyticsQuery;
use dioxus::prelude::*;
use time::Date;

use super::axis::AxisLabelFormat;
use super::chart::BarChart;
use super::data::{fetch_analytics, retention_chart, series_chart, AnalyticsData};
use super::sponsor::SponsorEventColumn;
use crate::components::notice::{ErrorNotice, LoadingSkeleton};
use crate::core::context::AppContext;
use crate::core::format::{format_count, format_date, format_minutes, format_percent};
use crate::core::widgets::{AnalyticsType, DisplayFormat};

/// Already-fetched analytics, rendered non-interactively.
#[component]
pub fn AnalyticsBlock(
    analytics_type: AnalyticsType,
    display_format: DisplayFormat,
    data: AnalyticsData,
    range_start: Date,
    range_end: Date,
) -> Element {
    let format = AxisLabelFormat::for_range(range_start, range_end);

    match (data, display_format) {
        (AnalyticsData::Sponsor(response), DisplayFormat::Chart) => rsx! {
            SponsorEventColumn {
                events: response.events,
                period_events: response.period_events,
                to_date_events: response.to_date_events,
                is_loading: false,
                range_start,
                range_end,
            }
        },
        (AnalyticsData::Sponsor(response), DisplayFormat::Table) => sponsor_table(&response),
        (AnalyticsData::Series(response), DisplayFormat::Chart) => {
            let chart = series_chart(&response, analytics_type, format);
            let total = response.total.map(|t| value_label(analytics_type, t));
            rsx! {
                if let Some(total) = total {
                    p { class: "analytics-block__total", "Total: " strong { "{total}" } }
                }
                if chart.is_empty() {
                    p { class: "analytics-block__empty", "No data for this period" }
                } else {
                    BarChart { data: chart }
                }
            }
        }
        (AnalyticsData::Series(response), DisplayFormat::Table) => {
            series_table(&response, analytics_type)
        }
        (AnalyticsData::Retention(response), DisplayFormat::Chart) => rsx! {
            BarChart { data: retention_chart(&response) }
        },
        (AnalyticsData::Retention(response), DisplayFormat::Table) => retention_table(&response),
    }
}

/// Self-fetching analytics block used on the analytics page and in report previews.
#[component]
pub fn AnalyticsPanel(
    analytics_type: AnalyticsType,
    display_format: DisplayFormat,
    query: AnalyticsQuery,
) -> Element {
    let ctx = use_context::<AppContext>();
    let range_start = query.start.date();
    let range_end = query.end.date();

    let resource = use_resource(use_reactive!(|(query, analytics_type)| {
        let api = ctx.api.clone();
        async move {
            let result = fetch_analytics(&api, analytics_type, &query).await;
            if let Err(err) = &result {
                tracing::warn!(
                    analytics = analytics_type.wire_name(),
                    error = %err,
                    "analytics request failed"
                );
            }
            result
        }
    }));

    let body = match &*resource.read() {
        None if analytics_type == AnalyticsType::SponsorEvents
            && display_format == DisplayFormat::Chart =>
        {
            rsx! {
                SponsorEventColumn {
                    events: Vec::new(),
                    period_events: None,
                    to_date_events: None,
                    is_loading: true,
                    range_start,
                    range_end,
                }
            }
        }
        None => rsx! { LoadingSkeleton {} },
        Some(Err(err)) => rsx! { ErrorNotice { message: err.user_message() } },
        Some(Ok(data)) => rsx! {
            AnalyticsBlock {
                analytics_type,
                display_format,
                data: data.clone(),
                range_start,
                range_end,
            }
        },
    };

    body
}

pub fn value_label(analytics_type: AnalyticsType, value: f64) -> String {
    match analytics_type {
        AnalyticsType::VtcTime => format_minutes(value),
        AnalyticsType::Retention => format_percent(value),
        AnalyticsType::SponsorEvents
        | AnalyticsType::PageVisits
        | AnalyticsType::MemberAttendance => format_count(value.max(0.0).round() as u64),
    }
}

fn sponsor_table(response: &SponsorEventsResponse) -> Element {
    rsx! {
        table { class: "data-table",
            thead {
                tr {
                    th { "Date" }
                    th { "Community" }
                    th { class: "data-table__num", "Events" }
                }
            }
            tbody {
                for bucket in response.events.iter() {
                    tr {
                        td { "{format_date(bucket.date)}" }
                        td { "{bucket.community}" }
                        td { class: "data-table__num", "{bucket.count}" }
                    }
                }
            }
        }
    }
}

fn series_table(response: &MetricSeriesResponse, analytics_type: AnalyticsType) -> Element {
    let split = response.points.iter().any(|p| p.series.is_some());
    rsx! {
        table { class: "data-table",
            thead {
                tr {
                    th { "Date" }
                    if split {
                        th { "Series" }
                    }
                    th { class: "data-table__num", "Value" }
                }
            }
            tbody {
                for point in response.points.iter() {
                    tr {
                        td { "{format_date(point.date)}" }
                        if split {
                            td { {point.series.clone().unwrap_or_default()} }
                        }
                        td { class: "data-table__num", {value_label(analytics_type, point.value)} }
                    }
                }
            }
            if let Some(total) = response.total {
                tfoot {
                    tr {
                        th { "Total" }
                        if split {
                            th {}
                        }
                        th { class: "data-table__num", {value_label(analytics_type, total)} }
                    }
                }
            }
        }
    }
}

fn retention_table(response: &RetentionResponse) -> Element {
    rsx! {
        table { class: "data-table data-table--dense",
            thead {
                tr {
                    th { "Cohort" }
                    th { class: "data-table__num", "Members" }
                    for period in response.periods.iter() {
                        th { class: "data-table__num", "{period}" }
                    }
                }
            }
            tbody {
                for cohort in response.cohorts.iter() {
                    tr {
                        td { "{cohort.cohort}" }
                        td { class: "data-table__num", "{cohort.members}" }
                        for idx in 0..response.periods.len() {
                            td { class: "data-table__num",
                                {cohort.retained.get(idx).map(|r| format_percent(*r)).unwrap_or_default()}
                            }
                        }
                    }
                }
            }
        }
    }
}

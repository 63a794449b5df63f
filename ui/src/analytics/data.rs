//! Fetching and shaping analytics payloads.

use api::analytics::{MetricSeriesResponse, RetentionResponse, SponsorEventsResponse};
use api::{AnalyticsQuery, ApiClient, ApiResult};

use super::axis::AxisLabelFormat;
use super::chart::{stack_series, Series, StackedData};
use crate::core::widgets::AnalyticsType;

#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsData {
    Sponsor(SponsorEventsResponse),
    Series(MetricSeriesResponse),
    Retention(RetentionResponse),
}

pub async fn fetch_analytics(
    api: &ApiClient,
    analytics_type: AnalyticsType,
    query: &AnalyticsQuery,
) -> ApiResult<AnalyticsData> {
    let data = match analytics_type {
        AnalyticsType::SponsorEvents => {
            AnalyticsData::Sponsor(api.fetch_sponsor_events(query).await?)
        }
        AnalyticsType::PageVisits => AnalyticsData::Series(api.fetch_page_visits(query).await?),
        AnalyticsType::MemberAttendance => {
            AnalyticsData::Series(api.fetch_member_attendance(query).await?)
        }
        AnalyticsType::Retention => AnalyticsData::Retention(api.fetch_retention(query).await?),
        AnalyticsType::VtcTime => AnalyticsData::Series(api.fetch_vtc_time(query).await?),
    };
    Ok(data)
}

/// Name of the single series when the backend does not split points.
pub fn default_series_name(analytics_type: AnalyticsType) -> &'static str {
    match analytics_type {
        AnalyticsType::SponsorEvents => "Events",
        AnalyticsType::PageVisits => "Visits",
        AnalyticsType::MemberAttendance => "Attendees",
        AnalyticsType::Retention => "Retained",
        AnalyticsType::VtcTime => "Minutes",
    }
}

pub fn series_chart(
    response: &MetricSeriesResponse,
    analytics_type: AnalyticsType,
    format: AxisLabelFormat,
) -> StackedData {
    let fallback = default_series_name(analytics_type);
    stack_series(
        response.points.iter().map(|p| {
            (
                p.date,
                p.series.clone().unwrap_or_else(|| fallback.to_string()),
                p.value,
            )
        }),
        format,
    )
}

/// Mean retention per period across cohorts, weighted by cohort size, in percent.
pub fn retention_chart(response: &RetentionResponse) -> StackedData {
    let values = (0..response.periods.len())
        .map(|period| {
            let (retained, members) = response
                .cohorts
                .iter()
                .filter_map(|c| c.retained.get(period).map(|r| (r * f64::from(c.members), c.members)))
                .fold((0.0, 0u32), |(sum, n), (r, m)| (sum + r, n + m));
            if members == 0 {
                0.0
            } else {
                retained / f64::from(members) * 100.0
            }
        })
        .collect();

    StackedData {
        labels: response.periods.clone(),
        series: vec![Series {
            name: default_series_name(AnalyticsType::Retention).to_string(),
            values,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::analytics::{MetricPoint, RetentionCohort};
    use time::macros::date;

    #[test]
    fn unsplit_points_use_the_default_series() {
        let response = MetricSeriesResponse {
            points: vec![
                MetricPoint { date: date!(2025 - 04 - 01), value: 10.0, series: None },
                MetricPoint { date: date!(2025 - 04 - 02), value: 12.0, series: None },
            ],
            total: Some(22.0),
        };
        let data = series_chart(&response, AnalyticsType::PageVisits, AxisLabelFormat::MonthDay);
        assert_eq!(data.series.len(), 1);
        assert_eq!(data.series[0].name, "Visits");
        assert_eq!(data.labels, vec!["04-01", "04-02"]);
    }

    #[test]
    fn retention_is_weighted_by_cohort_size() {
        let response = RetentionResponse {
            periods: vec!["Week 1".into(), "Week 2".into()],
            cohorts: vec![
                RetentionCohort { cohort: "Jan".into(), members: 10, retained: vec![1.0, 0.5] },
                RetentionCohort { cohort: "Feb".into(), members: 30, retained: vec![0.5] },
            ],
        };
        let data = retention_chart(&response);
        assert_eq!(data.labels, vec!["Week 1", "Week 2"]);
        let values = &data.series[0].values;
        assert!((values[0] - 62.5).abs() < 1e-9);
        assert!((values[1] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn retention_without_cohorts_is_zero() {
        let response = RetentionResponse {
            periods: vec!["Week 1".into()],
            cohorts: vec![],
        };
        assert_eq!(retention_chart(&response).series[0].values, vec![0.0]);
    }
}

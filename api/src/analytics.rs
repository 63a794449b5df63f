//! Time-windowed aggregate metrics behind the analytics charts.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{AnalyticsQuery, ApiClient, ApiError, ApiResult, RequestKind};

time::serde::format_description!(pub iso_date, Date, "[year]-[month]-[day]");

/// Event count for one community on one day, as returned by the sponsor endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorEventBucket {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub community: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SponsorEventsResponse {
    #[serde(default)]
    pub events: Vec<SponsorEventBucket>,
    /// Events inside the requested window.
    pub period_events: Option<u32>,
    /// Events since the sponsorship started.
    pub to_date_events: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricPoint {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
}

/// Page visits, member attendance and VTC minutes all share this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MetricSeriesResponse {
    #[serde(default)]
    pub points: Vec<MetricPoint>,
    #[serde(default)]
    pub total: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionCohort {
    pub cohort: String,
    pub members: u32,
    /// Share of the cohort still active in each period, 0.0..=1.0.
    pub retained: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RetentionResponse {
    #[serde(default)]
    pub periods: Vec<String>,
    #[serde(default)]
    pub cohorts: Vec<RetentionCohort>,
}

const EXCEL_EXPORT_PATH: &str = "analytics/export.xlsx";

impl ApiClient {
    pub async fn fetch_sponsor_events(
        &self,
        query: &AnalyticsQuery,
    ) -> ApiResult<SponsorEventsResponse> {
        self.get_json(
            RequestKind::Analytics,
            "analytics/sponsor_events",
            &query.to_pairs(),
        )
        .await
    }

    pub async fn fetch_page_visits(&self, query: &AnalyticsQuery) -> ApiResult<MetricSeriesResponse> {
        self.get_json(RequestKind::Analytics, "analytics/page_visits", &query.to_pairs())
            .await
    }

    pub async fn fetch_member_attendance(
        &self,
        query: &AnalyticsQuery,
    ) -> ApiResult<MetricSeriesResponse> {
        self.get_json(
            RequestKind::Analytics,
            "analytics/member_attendance",
            &query.to_pairs(),
        )
        .await
    }

    pub async fn fetch_retention(&self, query: &AnalyticsQuery) -> ApiResult<RetentionResponse> {
        self.get_json(RequestKind::Analytics, "analytics/retention", &query.to_pairs())
            .await
    }

    pub async fn fetch_vtc_time(&self, query: &AnalyticsQuery) -> ApiResult<MetricSeriesResponse> {
        self.get_json(RequestKind::Analytics, "analytics/vtc_time", &query.to_pairs())
            .await
    }

    /// Direct download link for the server-generated Excel workbook.
    pub fn excel_export_url(&self, query: &AnalyticsQuery) -> ApiResult<String> {
        let url = reqwest::Url::parse_with_params(&self.url(EXCEL_EXPORT_PATH), query.to_pairs())
            .map_err(|err| ApiError::Url(err.to_string()))?;
        Ok(url.to_string())
    }
}

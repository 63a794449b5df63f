//! Tabular report endpoints and custom report template persistence.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::analytics::iso_date;
use crate::{AnalyticsQuery, ApiClient, ApiResult, RequestKind};

/// How feedback responses are rolled up in the feedback table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackAggregation {
    #[default]
    ByEvent,
    ByCategory,
}

impl FeedbackAggregation {
    pub fn as_param(&self) -> &'static str {
        match self {
            FeedbackAggregation::ByEvent => "event",
            FeedbackAggregation::ByCategory => "category",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRow {
    pub label: String,
    pub responses: u32,
    pub average_rating: Option<f64>,
}

/// One feedback tab. Rendered as a tab on screen and as a sub-section in exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackCategory {
    pub name: String,
    #[serde(default)]
    pub rows: Vec<FeedbackRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackReport {
    #[serde(default)]
    pub categories: Vec<FeedbackCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRow {
    pub name: String,
    pub email: String,
    pub community: String,
    pub events_attended: u32,
    #[serde(default, with = "iso_date::option")]
    pub last_attended: Option<Date>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MemberReport {
    #[serde(default)]
    pub rows: Vec<MemberRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRow {
    pub name: String,
    pub email: String,
    pub events_hosted: u32,
    pub attendees: u32,
    pub average_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HostReport {
    #[serde(default)]
    pub rows: Vec<HostRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationRow {
    pub event_title: String,
    pub community: String,
    #[serde(with = "iso_date")]
    pub scheduled_for: Date,
    pub reason: Option<String>,
    pub canceled_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CancellationReport {
    #[serde(default)]
    pub rows: Vec<CancellationRow>,
}

/// A saved custom report. `config_json` is the dashboard snapshot, opaque at this layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTemplate {
    pub id: String,
    pub name: String,
    #[serde(rename = "configJSON")]
    pub config_json: serde_json::Value,
    #[serde(default)]
    pub occurrence_id: Option<String>,
    /// Record-level permission evaluated by the backend for the current user.
    #[serde(default)]
    pub can_override: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplatePayload<'a> {
    pub name: &'a str,
    #[serde(rename = "configJSON")]
    pub config_json: &'a serde_json::Value,
}

impl ApiClient {
    pub async fn fetch_feedback_report(
        &self,
        query: &AnalyticsQuery,
        aggregation: FeedbackAggregation,
    ) -> ApiResult<FeedbackReport> {
        let mut pairs = query.to_pairs();
        pairs.push(("aggregationType", aggregation.as_param().to_string()));
        self.get_json(RequestKind::Report, "custom_reports/feedback", &pairs)
            .await
    }

    pub async fn fetch_member_report(&self, query: &AnalyticsQuery) -> ApiResult<MemberReport> {
        self.get_json(
            RequestKind::MemberReport,
            "custom_reports/members",
            &query.to_pairs(),
        )
        .await
    }

    pub async fn fetch_host_report(&self, query: &AnalyticsQuery) -> ApiResult<HostReport> {
        self.get_json(RequestKind::Report, "custom_reports/hosts", &query.to_pairs())
            .await
    }

    pub async fn fetch_cancellations(
        &self,
        query: &AnalyticsQuery,
    ) -> ApiResult<CancellationReport> {
        self.get_json(
            RequestKind::Report,
            "custom_reports/cancellations",
            &query.to_pairs(),
        )
        .await
    }

    pub async fn fetch_template(&self, id: &str) -> ApiResult<ReportTemplate> {
        self.get_json(
            RequestKind::Template,
            &format!("custom_reports/template/{id}"),
            &[],
        )
        .await
    }

    /// `POST .../custom_reports/template/{timezone}`
    pub async fn create_template(
        &self,
        timezone: &str,
        payload: &TemplatePayload<'_>,
    ) -> ApiResult<ReportTemplate> {
        let template: ReportTemplate = self
            .post_json(
                RequestKind::Template,
                &format!("custom_reports/template/{timezone}"),
                payload,
            )
            .await?;
        tracing::info!(template_id = %template.id, name = %template.name, "Report template created");
        Ok(template)
    }

    pub async fn update_template(
        &self,
        id: &str,
        payload: &TemplatePayload<'_>,
    ) -> ApiResult<ReportTemplate> {
        let template: ReportTemplate = self
            .patch_json(
                RequestKind::Template,
                &format!("custom_reports/template/{id}"),
                payload,
            )
            .await?;
        tracing::info!(template_id = %id, "Report template updated");
        Ok(template)
    }

    pub async fn update_occurrence(
        &self,
        occurrence_id: &str,
        payload: &TemplatePayload<'_>,
    ) -> ApiResult<ReportTemplate> {
        let template: ReportTemplate = self
            .patch_json(
                RequestKind::Template,
                &format!("custom_reports/occurrence/{occurrence_id}"),
                payload,
            )
            .await?;
        tracing::info!(occurrence_id, "Report occurrence updated");
        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn template_uses_config_json_key() {
        let raw = json!({
            "id": "t1",
            "name": "Quarterly",
            "configJSON": {"gridCells": []},
            "canOverride": true
        });
        let template: ReportTemplate = serde_json::from_value(raw).unwrap();
        assert!(template.can_override);
        assert_eq!(template.config_json["gridCells"], json!([]));

        let payload = TemplatePayload {
            name: &template.name,
            config_json: &template.config_json,
        };
        let encoded = serde_json::to_value(&payload).unwrap();
        assert!(encoded.get("configJSON").is_some());
    }

    #[test]
    fn permission_defaults_to_denied() {
        let raw = json!({"id": "t1", "name": "Q", "configJSON": {}});
        let template: ReportTemplate = serde_json::from_value(raw).unwrap();
        assert!(!template.can_override);
    }

    #[test]
    fn member_rows_accept_missing_last_attended() {
        let raw = json!({"rows": [{
            "name": "Ana", "email": "ana@example.com", "community": "North", "eventsAttended": 3
        }]});
        let report: MemberReport = serde_json::from_value(raw).unwrap();
        assert_eq!(report.rows[0].last_attended, None);
    }
}

//! Data loading for report widgets.

use api::reports::{CancellationReport, FeedbackReport, HostReport, MemberReport};
use api::{AnalyticsQuery, ApiClient, ApiResult};
use time::OffsetDateTime;

use crate::analytics::data::{fetch_analytics, AnalyticsData};
use crate::core::config::ReportFilters;
use crate::core::widgets::{WidgetConfig, WidgetKind};

/// What a widget renders from. Inline-editable widgets carry their content in the
/// config and load nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetData {
    Inline,
    Feedback(FeedbackReport),
    Members(MemberReport),
    Hosts(HostReport),
    Analytics(AnalyticsData),
    Cancellations(CancellationReport),
}

/// Loaded data, or the notification text for a failed request.
pub type WidgetLoad = Result<WidgetData, String>;

/// The query a widget issues under the report's global filters.
pub fn widget_query(
    kind: &WidgetKind,
    filters: &ReportFilters,
    timezone: &str,
    now: OffsetDateTime,
) -> AnalyticsQuery {
    let query = filters.to_query(timezone, now);
    match kind {
        WidgetKind::MemberReportTable { group_by } => query.with_group_by(Some(*group_by)),
        WidgetKind::Text { .. }
        | WidgetKind::RichText { .. }
        | WidgetKind::FileUpload { .. }
        | WidgetKind::FeedbackTable { .. }
        | WidgetKind::HostReportTable {}
        | WidgetKind::AnalyticsWidget { .. }
        | WidgetKind::EventCancelationsWidget {} => query,
    }
}

pub async fn load_widget_data(
    api: &ApiClient,
    widget: &WidgetConfig,
    query: &AnalyticsQuery,
) -> ApiResult<WidgetData> {
    let data = match &widget.kind {
        WidgetKind::Text { .. } | WidgetKind::RichText { .. } | WidgetKind::FileUpload { .. } => {
            WidgetData::Inline
        }
        WidgetKind::FeedbackTable { aggregation_type } => {
            WidgetData::Feedback(api.fetch_feedback_report(query, *aggregation_type).await?)
        }
        WidgetKind::MemberReportTable { .. } => {
            WidgetData::Members(api.fetch_member_report(query).await?)
        }
        WidgetKind::HostReportTable {} => WidgetData::Hosts(api.fetch_host_report(query).await?),
        WidgetKind::AnalyticsWidget { analytics_type, .. } => {
            WidgetData::Analytics(fetch_analytics(api, *analytics_type, query).await?)
        }
        WidgetKind::EventCancelationsWidget {} => {
            WidgetData::Cancellations(api.fetch_cancellations(query).await?)
        }
    };
    Ok(data)
}

/// [`load_widget_data`] with the failure logged and turned into notification text.
pub async fn load_for_display(
    api: &ApiClient,
    widget: &WidgetConfig,
    query: &AnalyticsQuery,
) -> WidgetLoad {
    load_widget_data(api, widget, query).await.map_err(|err| {
        tracing::warn!(
            widget_id = %widget.i,
            component = widget.component_type().wire_name(),
            status = ?err.status(),
            error = %err,
            "widget data request failed"
        );
        err.user_message()
    })
}

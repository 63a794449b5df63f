//! Persisted report payloads.
//!
//! [`DashboardConfig`] is the unit saved to the backend as `configJSON` and handed to the
//! export view. The handoff goes through local storage wrapped in a versioned
//! [`HandoffEnvelope`] so a stale or foreign payload fails loudly instead of rendering an
//! empty report.

use std::collections::BTreeMap;

use api::AnalyticsQuery;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Duration, OffsetDateTime};

use super::error::{BuilderError, ConfigError};
use super::grid::{BreakpointLayouts, GridCell, LayoutItem, PRIMARY_BREAKPOINT};
use super::storage::KeyValueStore;
use super::widgets::WidgetConfig;

pub const CONFIG_KEY: &str = "reportConfig";
pub const FILTERS_KEY: &str = "reportFilters";
pub const HANDOFF_VERSION: u32 = 1;

/// Default look-back window when a report has no explicit date range.
pub const DEFAULT_RANGE_DAYS: i64 = 30;

const REQUIRED_FIELDS: [&str; 3] = ["gridCells", "widgets", "rglLayouts"];

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardConfig {
    pub grid_cells: Vec<GridCell>,
    pub widgets: BTreeMap<String, WidgetConfig>,
    pub rgl_layouts: BreakpointLayouts,
    #[serde(default)]
    pub report_name: String,
}

impl DashboardConfig {
    /// Parse and validate a snapshot. Nothing is returned unless every check passes.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(raw).map_err(ConfigError::Malformed)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let object = value.as_object().ok_or(ConfigError::NotAnObject)?;
        if let Some(missing) = REQUIRED_FIELDS
            .into_iter()
            .find(|field| !object.contains_key(*field))
        {
            return Err(ConfigError::MissingField(missing));
        }

        let mut config: DashboardConfig =
            serde_json::from_value(value).map_err(ConfigError::Schema)?;
        config.check_references()?;
        config.sync_primary_layout();
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Schema)
    }

    /// Every `widgetId` on a cell must resolve in the widget map, and the widget's `i`
    /// must match the key it is stored under.
    pub fn check_references(&self) -> Result<(), BuilderError> {
        for cell in &self.grid_cells {
            if let Some(widget_id) = &cell.widget_id {
                match self.widgets.get(widget_id) {
                    Some(widget) if widget.i == *widget_id => {}
                    _ => {
                        return Err(BuilderError::DanglingWidget {
                            cell: cell.id.clone(),
                            widget: widget_id.clone(),
                        })
                    }
                }
            }
        }
        Ok(())
    }

    /// Widgets no cell points at.
    pub fn orphaned_widgets(&self) -> Vec<&str> {
        self.widgets
            .keys()
            .filter(|id| {
                !self
                    .grid_cells
                    .iter()
                    .any(|cell| cell.widget_id.as_deref() == Some(id.as_str()))
            })
            .map(String::as_str)
            .collect()
    }

    /// The primary breakpoint is always derived from the cells.
    pub fn sync_primary_layout(&mut self) {
        self.rgl_layouts
            .insert(PRIMARY_BREAKPOINT.to_string(), primary_layout(&self.grid_cells));
    }
}

pub fn primary_layout(cells: &[GridCell]) -> Vec<LayoutItem> {
    cells.iter().map(GridCell::layout_item).collect()
}

/// Global scope applied to every data-fetching widget.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilters {
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<OffsetDateTime>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence_id: Option<String>,
}

impl ReportFilters {
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none()
            && self.end_date.is_none()
            && self.community_ids.as_ref().map_or(true, Vec::is_empty)
            && self.occurrence_id.is_none()
    }

    /// Both ends of the range, when both are set.
    pub fn date_range(&self) -> Option<(OffsetDateTime, OffsetDateTime)> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    /// Range actually queried: explicit bounds where set, otherwise the trailing
    /// [`DEFAULT_RANGE_DAYS`] ending at `now`.
    pub fn effective_range(&self, now: OffsetDateTime) -> (OffsetDateTime, OffsetDateTime) {
        let end = self.end_date.unwrap_or(now);
        let start = self
            .start_date
            .unwrap_or(end - Duration::days(DEFAULT_RANGE_DAYS));
        (start, end)
    }

    pub fn to_query(&self, timezone: &str, now: OffsetDateTime) -> AnalyticsQuery {
        let (start, end) = self.effective_range(now);
        AnalyticsQuery::new(start, end, timezone)
            .with_communities(self.community_ids.clone().unwrap_or_default())
            .with_occurrence(self.occurrence_id.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoffEnvelope<T> {
    pub version: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub saved_at: OffsetDateTime,
    pub payload: T,
}

impl<T> HandoffEnvelope<T> {
    pub fn new(payload: T, saved_at: OffsetDateTime) -> Self {
        Self {
            version: HANDOFF_VERSION,
            saved_at,
            payload,
        }
    }
}

/// Write the builder's current snapshot and filters for the export view.
pub fn write_handoff(
    store: &dyn KeyValueStore,
    config: &DashboardConfig,
    filters: &ReportFilters,
    saved_at: OffsetDateTime,
) -> Result<(), ConfigError> {
    write_envelope(store, CONFIG_KEY, &HandoffEnvelope::new(config, saved_at))?;
    write_envelope(store, FILTERS_KEY, &HandoffEnvelope::new(filters, saved_at))?;
    tracing::info!(
        cells = config.grid_cells.len(),
        widgets = config.widgets.len(),
        "export handoff written"
    );
    Ok(())
}

/// Read the handoff written by [`write_handoff`].
///
/// A missing config is [`ConfigError::NothingSaved`]; missing filters fall back to
/// the empty filter set. Any present payload must carry the current version and pass
/// the same checks as a loaded snapshot.
pub fn read_handoff(
    store: &dyn KeyValueStore,
) -> Result<(DashboardConfig, ReportFilters), ConfigError> {
    let config_value = read_envelope(store, CONFIG_KEY)?.ok_or(ConfigError::NothingSaved)?;
    let config = DashboardConfig::from_value(config_value)?;

    let filters = match read_envelope(store, FILTERS_KEY)? {
        Some(value) => parse_payload::<ReportFilters>(value)?,
        None => {
            tracing::warn!("export handoff has no filters; using an unfiltered range");
            ReportFilters::default()
        }
    };

    if !config.orphaned_widgets().is_empty() {
        tracing::warn!(
            orphans = config.orphaned_widgets().len(),
            "export handoff carries widgets without cells"
        );
    }

    Ok((config, filters))
}

fn write_envelope<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &'static str,
    envelope: &HandoffEnvelope<T>,
) -> Result<(), ConfigError> {
    let raw = serde_json::to_string(envelope).map_err(|source| {
        super::error::StorageError::Encode {
            key: key.to_string(),
            source,
        }
    })?;
    store.set(key, &raw)?;
    Ok(())
}

/// Returns the unwrapped payload of a versioned envelope, or `None` when the key is unset.
fn read_envelope(
    store: &dyn KeyValueStore,
    key: &'static str,
) -> Result<Option<Value>, ConfigError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    let mut value: Value = serde_json::from_str(&raw).map_err(ConfigError::Malformed)?;
    let object = value.as_object_mut().ok_or(ConfigError::NotAnObject)?;

    let found = object
        .get("version")
        .and_then(Value::as_u64)
        .ok_or(ConfigError::MissingField("version"))?;
    if found != u64::from(HANDOFF_VERSION) {
        return Err(ConfigError::UnsupportedVersion {
            key,
            found: u32::try_from(found).unwrap_or(u32::MAX),
            expected: HANDOFF_VERSION,
        });
    }

    object
        .remove("payload")
        .map(Some)
        .ok_or(ConfigError::MissingField("payload"))
}

fn parse_payload<T: DeserializeOwned>(value: Value) -> Result<T, ConfigError> {
    serde_json::from_value(value).map_err(ConfigError::Schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::LayoutRect;
    use crate::core::storage::MemoryStore;
    use crate::core::widgets::ComponentType;
    use serde_json::json;
    use time::macros::datetime;

    fn sample() -> DashboardConfig {
        let mut widgets = BTreeMap::new();
        widgets.insert(
            "w1".to_string(),
            WidgetConfig::new("w1", ComponentType::FeedbackTable),
        );
        let mut config = DashboardConfig {
            grid_cells: vec![
                GridCell {
                    id: "c1".into(),
                    layout: LayoutRect { x: 0, y: 0, w: 6, h: 4 },
                    widget_id: Some("w1".into()),
                },
                GridCell {
                    id: "c2".into(),
                    layout: LayoutRect { x: 6, y: 0, w: 6, h: 4 },
                    widget_id: None,
                },
            ],
            widgets,
            rgl_layouts: BreakpointLayouts::new(),
            report_name: "Q3 sponsors".into(),
        };
        config.sync_primary_layout();
        config
    }

    #[test]
    fn json_round_trip_preserves_cells_and_widgets() {
        let config = sample();
        let raw = config.to_json_pretty().unwrap();
        let back = DashboardConfig::from_json(&raw).unwrap();
        assert_eq!(back.grid_cells, config.grid_cells);
        assert_eq!(back.widgets, config.widgets);
        assert_eq!(back.report_name, "Q3 sponsors");
    }

    #[test]
    fn primary_layout_is_recomputed_from_cells() {
        let raw = json!({
            "gridCells": [{"id": "c1", "layout": {"x": 0, "y": 2, "w": 4, "h": 3}}],
            "widgets": {},
            "rglLayouts": {"md": [{"i": "c1", "x": 1, "y": 1, "w": 1, "h": 1}]}
        });
        let config = DashboardConfig::from_value(raw).unwrap();
        assert_eq!(
            config.rgl_layouts["lg"],
            vec![LayoutItem { i: "c1".into(), x: 0, y: 2, w: 4, h: 3 }]
        );
        assert_eq!(config.rgl_layouts["md"].len(), 1);
        assert_eq!(config.report_name, "");
    }

    #[test]
    fn missing_top_level_field_is_named() {
        let raw = r#"{"gridCells": [], "widgets": {}}"#;
        let err = DashboardConfig::from_json(raw).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("rglLayouts")));
    }

    #[test]
    fn malformed_json_and_non_objects_are_rejected() {
        assert!(matches!(
            DashboardConfig::from_json("{not json").unwrap_err(),
            ConfigError::Malformed(_)
        ));
        assert!(matches!(
            DashboardConfig::from_json("[]").unwrap_err(),
            ConfigError::NotAnObject
        ));
    }

    #[test]
    fn dangling_reference_is_rejected() {
        let raw = json!({
            "gridCells": [{"id": "c1", "layout": {"x": 0, "y": 0, "w": 6, "h": 4}, "widgetId": "ghost"}],
            "widgets": {},
            "rglLayouts": {}
        });
        let err = DashboardConfig::from_value(raw).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Integrity(BuilderError::DanglingWidget { .. })
        ));
    }

    #[test]
    fn handoff_round_trips_through_store() {
        let store = MemoryStore::default();
        let config = sample();
        let filters = ReportFilters {
            start_date: Some(datetime!(2025-01-01 0:00 UTC)),
            end_date: Some(datetime!(2025-03-31 0:00 UTC)),
            community_ids: Some(vec!["north".into()]),
            occurrence_id: None,
        };
        write_handoff(&store, &config, &filters, datetime!(2025-04-01 9:30 UTC)).unwrap();

        let (read_config, read_filters) = read_handoff(&store).unwrap();
        assert_eq!(read_config, config);
        assert_eq!(read_filters, filters);
    }

    #[test]
    fn empty_store_reports_nothing_saved() {
        let store = MemoryStore::default();
        assert!(matches!(
            read_handoff(&store).unwrap_err(),
            ConfigError::NothingSaved
        ));
    }

    #[test]
    fn unversioned_payload_is_loud() {
        let store = MemoryStore::default();
        store
            .set(CONFIG_KEY, r#"{"gridCells": [], "widgets": {}, "rglLayouts": {}}"#)
            .unwrap();
        assert!(matches!(
            read_handoff(&store).unwrap_err(),
            ConfigError::MissingField("version")
        ));

        store
            .set(CONFIG_KEY, r#"{"version": 7, "savedAt": "2025-01-01T00:00:00Z", "payload": {}}"#)
            .unwrap();
        assert!(matches!(
            read_handoff(&store).unwrap_err(),
            ConfigError::UnsupportedVersion { found: 7, .. }
        ));
    }

    #[test]
    fn filters_fall_back_to_trailing_window() {
        let now = datetime!(2025-05-31 12:00 UTC);
        let filters = ReportFilters::default();
        assert!(filters.is_empty());
        let (start, end) = filters.effective_range(now);
        assert_eq!(end, now);
        assert_eq!(end - start, Duration::days(DEFAULT_RANGE_DAYS));
        assert!(filters.date_range().is_none());
    }
}

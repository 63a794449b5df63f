//! Grid/layout state manager and widget settings editor.
//!
//! [`ReportBuilder`] is the only writer of the grid cells, the widget map and the
//! per-breakpoint layouts. Views hold it in a signal and call these operations from event
//! handlers. Every operation either applies fully or returns an error with the state
//! untouched.

use std::collections::BTreeMap;

use super::config::DashboardConfig;
use super::error::{BuilderError, ConfigError};
use super::grid::{next_placement, BreakpointLayouts, GridCell, LayoutItem, PRIMARY_BREAKPOINT};
use super::widgets::{ComponentType, InlineContent, WidgetConfig, WidgetSettings};

/// An open settings modal: which widget, and the form's current contents.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsSession {
    pub widget_id: String,
    pub component: ComponentType,
    /// `None` for variants without configurable settings.
    pub draft: Option<WidgetSettings>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportBuilder {
    grid_cells: Vec<GridCell>,
    widgets: BTreeMap<String, WidgetConfig>,
    rgl_layouts: BreakpointLayouts,
    report_name: String,
    editing: Option<SettingsSession>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: DashboardConfig) -> Result<Self, ConfigError> {
        let mut builder = Self::new();
        builder.load(config)?;
        Ok(builder)
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.grid_cells
    }

    pub fn widgets(&self) -> &BTreeMap<String, WidgetConfig> {
        &self.widgets
    }

    pub fn layouts(&self) -> &BreakpointLayouts {
        &self.rgl_layouts
    }

    pub fn report_name(&self) -> &str {
        &self.report_name
    }

    pub fn set_report_name(&mut self, name: impl Into<String>) {
        self.report_name = name.into();
    }

    /// Append an empty cell at the next free slot and return its id.
    pub fn add_cell(&mut self) -> String {
        let id = self.fresh_id("cell");
        let layout = next_placement(&self.grid_cells);
        self.grid_cells.push(GridCell {
            id: id.clone(),
            layout,
            widget_id: None,
        });
        self.sync_primary_layout();
        tracing::info!(cell_id = %id, x = layout.x, y = layout.y, "cell added");
        id
    }

    /// Create a default-shaped widget of `component` inside an empty cell.
    ///
    /// Occupied cells are rejected; call [`ReportBuilder::clear_widget`] first.
    pub fn drop_widget(
        &mut self,
        cell_id: &str,
        component: ComponentType,
    ) -> Result<String, BuilderError> {
        let index = self.cell_index(cell_id)?;
        if let Some(existing) = &self.grid_cells[index].widget_id {
            tracing::warn!(cell_id, widget_id = %existing, "drop rejected: cell occupied");
            return Err(BuilderError::CellOccupied {
                cell: cell_id.to_string(),
                widget: existing.clone(),
            });
        }

        let widget_id = self.fresh_id("widget");
        self.widgets
            .insert(widget_id.clone(), WidgetConfig::new(&widget_id, component));
        self.grid_cells[index].widget_id = Some(widget_id.clone());
        tracing::info!(
            cell_id,
            widget_id = %widget_id,
            component = component.wire_name(),
            "widget dropped"
        );
        Ok(widget_id)
    }

    /// Store every breakpoint list the layout engine reported verbatim. Cell layouts track
    /// the primary breakpoint, so `current` is merged into them only when `breakpoint` is
    /// the primary one; other breakpoints never move a cell.
    pub fn apply_layout_change(
        &mut self,
        breakpoint: &str,
        current: &[LayoutItem],
        all_layouts: BreakpointLayouts,
    ) {
        for (name, items) in all_layouts {
            self.rgl_layouts.insert(name, items);
        }
        if breakpoint != PRIMARY_BREAKPOINT {
            tracing::debug!(breakpoint, items = current.len(), "secondary breakpoint layout stored");
            return;
        }
        for item in current {
            match self.grid_cells.iter_mut().find(|cell| cell.id == item.i) {
                Some(cell) => cell.layout = item.rect(),
                None => tracing::debug!(cell_id = %item.i, "layout item for unknown cell ignored"),
            }
        }
        self.sync_primary_layout();
    }

    /// Delete a cell and, if it held one, its widget.
    pub fn remove_cell(&mut self, cell_id: &str) -> Result<Option<WidgetConfig>, BuilderError> {
        let index = self.cell_index(cell_id)?;
        let cell = self.grid_cells.remove(index);
        for items in self.rgl_layouts.values_mut() {
            items.retain(|item| item.i != cell.id);
        }

        let removed = cell.widget_id.as_deref().and_then(|id| self.take_widget(id));
        tracing::info!(
            cell_id,
            widget_id = cell.widget_id.as_deref().unwrap_or("-"),
            "cell removed"
        );
        Ok(removed)
    }

    /// Empty a cell, deleting its widget. The cell keeps its place in the grid.
    pub fn clear_widget(&mut self, cell_id: &str) -> Result<Option<WidgetConfig>, BuilderError> {
        let index = self.cell_index(cell_id)?;
        let Some(widget_id) = self.grid_cells[index].widget_id.take() else {
            return Ok(None);
        };
        let removed = self.take_widget(&widget_id);
        tracing::info!(cell_id, widget_id = %widget_id, "widget cleared");
        Ok(removed)
    }

    /// Edit-mode callback of the inline-editable renderers.
    pub fn update_inline(
        &mut self,
        widget_id: &str,
        content: InlineContent,
    ) -> Result<(), BuilderError> {
        let widget = self
            .widgets
            .get_mut(widget_id)
            .ok_or_else(|| BuilderError::WidgetNotFound(widget_id.to_string()))?;
        widget.apply_inline(content)
    }

    /// The widget a cell hosts. A reference that does not resolve is an error, never `None`.
    pub fn widget_for_cell(&self, cell_id: &str) -> Result<Option<&WidgetConfig>, BuilderError> {
        let cell = &self.grid_cells[self.cell_index(cell_id)?];
        match &cell.widget_id {
            None => Ok(None),
            Some(widget_id) => self.widgets.get(widget_id).map(Some).ok_or_else(|| {
                BuilderError::DanglingWidget {
                    cell: cell.id.clone(),
                    widget: widget_id.clone(),
                }
            }),
        }
    }

    pub fn check_integrity(&self) -> Result<(), BuilderError> {
        for cell in &self.grid_cells {
            self.widget_for_cell(&cell.id)?;
        }
        Ok(())
    }

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

    /// Open the settings modal for one widget, replacing any session already open.
    pub fn open_settings(&mut self, widget_id: &str) -> Result<&SettingsSession, BuilderError> {
        let widget = self
            .widgets
            .get(widget_id)
            .ok_or_else(|| BuilderError::WidgetNotFound(widget_id.to_string()))?;
        let session = SettingsSession {
            widget_id: widget_id.to_string(),
            component: widget.component_type(),
            draft: widget.settings_form(),
        };
        Ok(self.editing.insert(session))
    }

    pub fn settings_session(&self) -> Option<&SettingsSession> {
        self.editing.as_ref()
    }

    /// Replace the form contents of the open session.
    pub fn settings_draft(&mut self, draft: WidgetSettings) -> Result<(), BuilderError> {
        let session = self.editing.as_mut().ok_or(BuilderError::NoSettingsSession)?;
        if session.draft.is_none() {
            return Err(BuilderError::NoSettings(session.component.wire_name()));
        }
        session.draft = Some(draft);
        Ok(())
    }

    /// Close the modal. The widget map is not touched.
    pub fn cancel_settings(&mut self) {
        self.editing = None;
    }

    /// Merge the draft onto its widget and close the modal.
    ///
    /// On a variant mismatch the modal stays open and the widget is unchanged.
    pub fn save_settings(&mut self) -> Result<(), BuilderError> {
        let session = self.editing.as_ref().ok_or(BuilderError::NoSettingsSession)?;
        if let Some(draft) = session.draft {
            let widget = self
                .widgets
                .get_mut(&session.widget_id)
                .ok_or_else(|| BuilderError::WidgetNotFound(session.widget_id.clone()))?;
            widget.apply_settings(draft)?;
            tracing::info!(widget_id = %session.widget_id, "widget settings saved");
        }
        self.editing = None;
        Ok(())
    }

    /// Full snapshot of the current state.
    pub fn snapshot(&self) -> DashboardConfig {
        let mut config = DashboardConfig {
            grid_cells: self.grid_cells.clone(),
            widgets: self.widgets.clone(),
            rgl_layouts: self.rgl_layouts.clone(),
            report_name: self.report_name.clone(),
        };
        config.sync_primary_layout();
        config
    }

    /// Replace all collections with a validated snapshot.
    pub fn load(&mut self, mut config: DashboardConfig) -> Result<(), ConfigError> {
        if let Err(err) = config.check_references() {
            tracing::warn!(error = %err, "report config rejected");
            return Err(err.into());
        }
        config.sync_primary_layout();

        let orphans = config.orphaned_widgets().len();
        if orphans > 0 {
            tracing::warn!(orphans, "loaded report has widgets without a cell");
        }

        self.grid_cells = config.grid_cells;
        self.widgets = config.widgets;
        self.rgl_layouts = config.rgl_layouts;
        self.report_name = config.report_name;
        self.editing = None;
        tracing::info!(
            cells = self.grid_cells.len(),
            widgets = self.widgets.len(),
            "report config loaded"
        );
        Ok(())
    }

    pub fn load_json(&mut self, raw: &str) -> Result<(), ConfigError> {
        match DashboardConfig::from_json(raw) {
            Ok(config) => self.load(config),
            Err(err) => {
                tracing::warn!(error = %err, "report JSON rejected");
                Err(err)
            }
        }
    }

    fn cell_index(&self, cell_id: &str) -> Result<usize, BuilderError> {
        self.grid_cells
            .iter()
            .position(|cell| cell.id == cell_id)
            .ok_or_else(|| BuilderError::CellNotFound(cell_id.to_string()))
    }

    fn take_widget(&mut self, widget_id: &str) -> Option<WidgetConfig> {
        if self
            .editing
            .as_ref()
            .is_some_and(|session| session.widget_id == widget_id)
        {
            self.editing = None;
        }
        self.widgets.remove(widget_id)
    }

    fn fresh_id(&self, prefix: &str) -> String {
        loop {
            let id = format!("{prefix}-{}", uuid::Uuid::new_v4().simple());
            let taken = self.grid_cells.iter().any(|cell| cell.id == id)
                || self.widgets.contains_key(&id);
            if !taken {
                return id;
            }
        }
    }

    fn sync_primary_layout(&mut self) {
        self.rgl_layouts.insert(
            PRIMARY_BREAKPOINT.to_string(),
            self.grid_cells.iter().map(GridCell::layout_item).collect(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::LayoutRect;
    use crate::core::widgets::{AnalyticsType, DisplayFormat, WidgetKind};
    use api::reports::FeedbackAggregation;
    use api::GroupBy;

    fn builder_with_cells(n: usize) -> (ReportBuilder, Vec<String>) {
        let mut builder = ReportBuilder::new();
        let ids = (0..n).map(|_| builder.add_cell()).collect();
        (builder, ids)
    }

    #[test]
    fn added_cells_have_unique_ids_and_wrap_rows() {
        let (builder, ids) = builder_with_cells(3);
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 3);

        let layouts: Vec<LayoutRect> = builder.cells().iter().map(|c| c.layout).collect();
        assert_eq!((layouts[0].x, layouts[0].y), (0, 0));
        assert_eq!((layouts[1].x, layouts[1].y), (6, 0));
        assert_eq!((layouts[2].x, layouts[2].y), (0, 4));
        assert_eq!(builder.layouts()["lg"].len(), 3);
    }

    #[test]
    fn dropping_feedback_table_creates_exactly_one_widget() {
        let (mut builder, ids) = builder_with_cells(2);
        let widget_id = builder
            .drop_widget(&ids[0], ComponentType::FeedbackTable)
            .unwrap();

        assert_eq!(builder.widgets().len(), 1);
        let widget = &builder.widgets()[&widget_id];
        assert_eq!(widget.component_type(), ComponentType::FeedbackTable);
        assert_eq!(widget.i, widget_id);
        assert_eq!(
            builder.cells()[0].widget_id.as_deref(),
            Some(widget_id.as_str())
        );
        assert_eq!(builder.cells()[1].widget_id, None);
    }

    #[test]
    fn dropping_onto_filled_cell_requires_prior_removal() {
        let (mut builder, ids) = builder_with_cells(1);
        let first = builder.drop_widget(&ids[0], ComponentType::Text).unwrap();
        let before = builder.clone();

        let err = builder
            .drop_widget(&ids[0], ComponentType::FeedbackTable)
            .unwrap_err();
        assert_eq!(
            err,
            BuilderError::CellOccupied {
                cell: ids[0].clone(),
                widget: first.clone(),
            }
        );
        assert_eq!(builder, before);

        let cleared = builder.clear_widget(&ids[0]).unwrap().unwrap();
        assert_eq!(cleared.i, first);
        let second = builder
            .drop_widget(&ids[0], ComponentType::FeedbackTable)
            .unwrap();
        assert_ne!(second, first);
        assert_eq!(builder.widgets().len(), 1);
        assert!(builder.orphaned_widgets().is_empty());
    }

    #[test]
    fn dropping_onto_missing_cell_fails() {
        let mut builder = ReportBuilder::new();
        assert_eq!(
            builder.drop_widget("nope", ComponentType::Text).unwrap_err(),
            BuilderError::CellNotFound("nope".into())
        );
        assert!(builder.widgets().is_empty());
    }

    #[test]
    fn removing_a_cell_removes_its_widget() {
        let (mut builder, ids) = builder_with_cells(3);
        let mut widget_ids = Vec::new();
        for (cell, ct) in ids.iter().zip([
            ComponentType::Text,
            ComponentType::AnalyticsWidget,
            ComponentType::HostReportTable,
        ]) {
            widget_ids.push(builder.drop_widget(cell, ct).unwrap());
        }

        for (cell, widget) in ids.iter().zip(&widget_ids) {
            let removed = builder.remove_cell(cell).unwrap();
            assert_eq!(removed.map(|w| w.i), Some(widget.clone()));
            assert!(!builder.widgets().contains_key(widget));
            assert!(builder.layouts().values().flatten().all(|item| item.i != *cell));
        }
        assert!(builder.widgets().is_empty());
        assert!(builder.cells().is_empty());
    }

    #[test]
    fn removing_empty_cell_leaves_widgets_alone() {
        let (mut builder, ids) = builder_with_cells(2);
        let widget = builder.drop_widget(&ids[0], ComponentType::Text).unwrap();
        assert_eq!(builder.remove_cell(&ids[1]).unwrap(), None);
        assert!(builder.widgets().contains_key(&widget));
    }

    #[test]
    fn layout_change_merges_current_and_keeps_other_breakpoints() {
        let (mut builder, ids) = builder_with_cells(2);
        let mut md = BreakpointLayouts::new();
        md.insert(
            "md".into(),
            vec![LayoutItem { i: ids[0].clone(), x: 0, y: 0, w: 10, h: 2 }],
        );
        builder.apply_layout_change("md", &[], md);

        let moved = LayoutItem { i: ids[1].clone(), x: 0, y: 8, w: 12, h: 5 };
        let mut lg = BreakpointLayouts::new();
        lg.insert("lg".into(), vec![moved.clone()]);
        builder.apply_layout_change("lg", std::slice::from_ref(&moved), lg);

        assert_eq!(builder.cells()[1].layout, moved.rect());
        assert_eq!(builder.layouts()["md"][0].w, 10);
        // lg is always derived from every cell, not just the reported ones
        assert_eq!(builder.layouts()["lg"].len(), 2);
    }

    #[test]
    fn secondary_breakpoint_change_leaves_lg_and_cells_alone() {
        let (mut builder, ids) = builder_with_cells(1);
        let lg_before = builder.layouts()["lg"].clone();
        let cell_before = builder.cells()[0].layout;

        let reported = LayoutItem { i: ids[0].clone(), x: 2, y: 7, w: 10, h: 2 };
        let mut md = BreakpointLayouts::new();
        md.insert("md".into(), vec![reported.clone()]);
        builder.apply_layout_change("md", std::slice::from_ref(&reported), md);

        assert_eq!(builder.layouts()["lg"], lg_before);
        assert_eq!(builder.cells()[0].layout, cell_before);
        assert_eq!(builder.layouts()["md"], vec![reported]);
        assert_eq!(builder.snapshot().rgl_layouts["lg"], lg_before);
    }

    #[test]
    fn cancel_leaves_widget_map_untouched() {
        let (mut builder, ids) = builder_with_cells(1);
        let widget_id = builder
            .drop_widget(&ids[0], ComponentType::AnalyticsWidget)
            .unwrap();
        let before = builder.widgets().clone();

        builder.open_settings(&widget_id).unwrap();
        builder
            .settings_draft(WidgetSettings::Analytics {
                analytics_type: AnalyticsType::VtcTime,
                display_format: DisplayFormat::Table,
            })
            .unwrap();
        builder.cancel_settings();

        assert_eq!(builder.widgets(), &before);
        assert!(builder.settings_session().is_none());
    }

    #[test]
    fn save_merges_settings_and_keeps_identity() {
        let (mut builder, ids) = builder_with_cells(1);
        let widget_id = builder
            .drop_widget(&ids[0], ComponentType::MemberReportTable)
            .unwrap();

        let session = builder.open_settings(&widget_id).unwrap();
        assert_eq!(
            session.draft,
            Some(WidgetSettings::MemberReport { group_by: GroupBy::Day })
        );
        builder
            .settings_draft(WidgetSettings::MemberReport { group_by: GroupBy::Month })
            .unwrap();
        builder.save_settings().unwrap();

        let widget = &builder.widgets()[&widget_id];
        assert_eq!(widget.i, widget_id);
        assert_eq!(
            widget.kind,
            WidgetKind::MemberReportTable { group_by: GroupBy::Month }
        );
        assert!(builder.settings_session().is_none());
    }

    #[test]
    fn mismatched_draft_is_rejected_without_mutation() {
        let (mut builder, ids) = builder_with_cells(1);
        let widget_id = builder
            .drop_widget(&ids[0], ComponentType::FeedbackTable)
            .unwrap();
        let before = builder.widgets().clone();

        builder.open_settings(&widget_id).unwrap();
        builder
            .settings_draft(WidgetSettings::MemberReport { group_by: GroupBy::Week })
            .unwrap();
        assert!(matches!(
            builder.save_settings().unwrap_err(),
            BuilderError::SettingsMismatch { .. }
        ));
        assert_eq!(builder.widgets(), &before);
        assert!(builder.settings_session().is_some());
    }

    #[test]
    fn variants_without_settings_open_a_static_session() {
        let (mut builder, ids) = builder_with_cells(1);
        let widget_id = builder
            .drop_widget(&ids[0], ComponentType::HostReportTable)
            .unwrap();
        assert_eq!(builder.open_settings(&widget_id).unwrap().draft, None);
        assert_eq!(
            builder
                .settings_draft(WidgetSettings::Feedback {
                    aggregation_type: FeedbackAggregation::ByCategory
                })
                .unwrap_err(),
            BuilderError::NoSettings("HOST_REPORT_TABLE")
        );
        builder.save_settings().unwrap();
        assert!(builder.settings_session().is_none());
    }

    #[test]
    fn clearing_the_edited_widget_closes_its_session() {
        let (mut builder, ids) = builder_with_cells(1);
        let widget_id = builder
            .drop_widget(&ids[0], ComponentType::FeedbackTable)
            .unwrap();
        builder.open_settings(&widget_id).unwrap();
        builder.clear_widget(&ids[0]).unwrap();
        assert!(builder.settings_session().is_none());
        assert_eq!(builder.save_settings(), Err(BuilderError::NoSettingsSession));
        builder.check_integrity().unwrap();
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let (mut builder, ids) = builder_with_cells(3);
        builder.set_report_name("Monthly digest");
        let text = builder.drop_widget(&ids[0], ComponentType::Text).unwrap();
        builder
            .update_inline(&text, InlineContent::Text("Hello".into()))
            .unwrap();
        builder
            .drop_widget(&ids[2], ComponentType::EventCancelationsWidget)
            .unwrap();

        let raw = builder.snapshot().to_json_pretty().unwrap();
        let mut restored = ReportBuilder::new();
        restored.load_json(&raw).unwrap();

        assert_eq!(restored.cells(), builder.cells());
        assert_eq!(restored.widgets(), builder.widgets());
        assert_eq!(restored.report_name(), "Monthly digest");
        assert_eq!(restored.snapshot(), builder.snapshot());
    }

    #[test]
    fn failed_load_leaves_state_unchanged() {
        let (mut builder, ids) = builder_with_cells(1);
        builder.drop_widget(&ids[0], ComponentType::Text).unwrap();
        let before = builder.clone();

        assert!(builder.load_json(r#"{"gridCells": [], "widgets": {}}"#).is_err());
        assert!(builder.load_json("garbage").is_err());
        let dangling = r#"{
            "gridCells": [{"id": "a", "layout": {"x": 0, "y": 0, "w": 6, "h": 4}, "widgetId": "gone"}],
            "widgets": {},
            "rglLayouts": {}
        }"#;
        assert!(matches!(
            builder.load_json(dangling).unwrap_err(),
            ConfigError::Integrity(BuilderError::DanglingWidget { .. })
        ));
        assert_eq!(builder, before);
    }

    #[test]
    fn orphans_survive_load() {
        let raw = r#"{
            "gridCells": [],
            "widgets": {"w1": {"i": "w1", "componentType": "TEXT", "content": "kept"}},
            "rglLayouts": {}
        }"#;
        let mut builder = ReportBuilder::new();
        builder.load_json(raw).unwrap();
        assert_eq!(builder.orphaned_widgets(), vec!["w1"]);
    }
}

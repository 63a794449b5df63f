//! Custom report builder page.

use api::reports::{ReportTemplate, TemplatePayload};
use api::ApiClient;
use dioxus::prelude::*;
use time::OffsetDateTime;

use crate::analytics::filters::{FilterBar, FilterForm};
use crate::components::notice::{BlockingDialog, ErrorNotice, ForbiddenPage, LoadingSkeleton};
use crate::core::builder::ReportBuilder;
use crate::core::config::{write_handoff, DashboardConfig, ReportFilters};
use crate::core::context::AppContext;
use crate::core::grid::{nudged_layout, GridCell, Nudge, GRID_COLUMNS, PRIMARY_BREAKPOINT, ROW_HEIGHT_PX};
use crate::core::storage::LocalStore;
use crate::core::widgets::{ComponentType, InlineContent, WidgetConfig};
use crate::export::deliver::copy_to_clipboard;
use crate::t;

use super::render::{RenderMode, WidgetView};
use super::settings::SettingsModal;

/// Where "Save" sends the current snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    Create { timezone: String },
    Template { id: String },
    Occurrence { id: String },
}

impl SaveTarget {
    /// Occurrence overrides win over the template they were created from.
    pub fn for_template(template: Option<&ReportTemplate>, timezone: &str) -> Self {
        match template {
            Some(ReportTemplate {
                occurrence_id: Some(id),
                ..
            }) => SaveTarget::Occurrence { id: id.clone() },
            Some(template) => SaveTarget::Template {
                id: template.id.clone(),
            },
            None => SaveTarget::Create {
                timezone: timezone.to_string(),
            },
        }
    }
}

async fn save_report(
    api: &ApiClient,
    target: &SaveTarget,
    config: &DashboardConfig,
) -> Result<ReportTemplate, String> {
    let config_json = serde_json::to_value(config).map_err(|err| err.to_string())?;
    let name = if config.report_name.trim().is_empty() {
        "Untitled report"
    } else {
        config.report_name.trim()
    };
    let payload = TemplatePayload {
        name,
        config_json: &config_json,
    };
    let result = match target {
        SaveTarget::Create { timezone } => api.create_template(timezone, &payload).await,
        SaveTarget::Template { id } => api.update_template(id, &payload).await,
        SaveTarget::Occurrence { id } => api.update_occurrence(id, &payload).await,
    };
    result.map_err(|err| {
        tracing::error!(target = ?target, error = %err, "saving report failed");
        err.user_message()
    })
}

#[derive(Clone, Debug, PartialEq)]
enum SaveStatus {
    Idle,
    Working(&'static str),
    Done(String),
    Error(String),
}

/// A blocking dialog's title and message.
type DialogText = (String, String);

/// Builder for a brand-new report.
#[component]
pub fn ReportBuilderPage(on_export: EventHandler<()>) -> Element {
    rsx! {
        ReportEditor { template: None, on_export }
    }
}

/// Loads a saved template and opens it in the builder when the user may override it.
#[component]
pub fn TemplateEditPage(template_id: String, on_export: EventHandler<()>) -> Element {
    let ctx = use_context::<AppContext>();

    let template = use_resource(use_reactive!(|template_id| {
        let api = ctx.api.clone();
        async move { api.fetch_template(&template_id).await }
    }));

    let body = match &*template.read() {
        None => rsx! { LoadingSkeleton { lines: 6 } },
        Some(Err(err)) => rsx! {
            ErrorNotice { message: err.user_message() }
        },
        Some(Ok(template)) if !template.can_override => {
            tracing::warn!(template_id = %template.id, "template is not editable by this user");
            rsx! { ForbiddenPage {} }
        }
        Some(Ok(template)) => rsx! {
            ReportEditor { template: Some(template.clone()), on_export }
        },
    };
    body
}

fn initial_builder(template: Option<&ReportTemplate>) -> (ReportBuilder, Option<DialogText>) {
    let Some(template) = template else {
        return (ReportBuilder::new(), None);
    };
    let loaded = DashboardConfig::from_value(template.config_json.clone())
        .and_then(ReportBuilder::from_config);
    match loaded {
        Ok(mut builder) => {
            if builder.report_name().trim().is_empty() {
                builder.set_report_name(template.name.clone());
            }
            (builder, None)
        }
        Err(err) => {
            tracing::error!(template_id = %template.id, error = %err, "stored report config rejected");
            let mut builder = ReportBuilder::new();
            builder.set_report_name(template.name.clone());
            (builder, Some((t!("dialog-load-failed"), err.to_string())))
        }
    }
}

#[component]
fn ReportEditor(template: Option<ReportTemplate>, on_export: EventHandler<()>) -> Element {
    let ctx = use_context::<AppContext>();

    let initial = use_hook(|| initial_builder(template.as_ref()));
    let mut builder = use_signal(|| initial.0.clone());
    let mut dialog = use_signal(|| initial.1.clone());
    let mut mode = use_signal(|| RenderMode::Edit);
    let dragging = use_signal(|| None::<ComponentType>);
    let notice = use_signal(|| None::<String>);
    let mut status = use_signal(|| SaveStatus::Idle);
    let mut saved = use_signal(|| template.clone());
    let mut json_open = use_signal(|| false);
    let mut json_text = use_signal(String::new);
    let filter_form = use_signal(|| FilterForm::trailing(OffsetDateTime::now_utc().date()));

    let occurrence_id = template.as_ref().and_then(|t| t.occurrence_id.clone());
    let filters = {
        let mut filters = filter_form().to_report_filters().unwrap_or_default();
        filters.occurrence_id = occurrence_id.clone();
        filters
    };

    let snapshot = builder.read().snapshot();
    let cells: Vec<GridCell> = builder.read().cells().to_vec();
    let current_mode = mode();

    let on_save = move |_| {
        if matches!(status(), SaveStatus::Working(_)) {
            return;
        }
        let target = SaveTarget::for_template(saved().as_ref(), &ctx.timezone);
        let config = builder.read().snapshot();
        let api = ctx.api.clone();
        status.set(SaveStatus::Working("Saving"));
        spawn(async move {
            match save_report(&api, &target, &config).await {
                Ok(template) => {
                    status.set(SaveStatus::Done(format!("Saved \u{201c}{}\u{201d}", template.name)));
                    // A created template is updated in place from now on.
                    if matches!(target, SaveTarget::Create { .. }) {
                        saved.set(Some(template));
                    }
                }
                Err(message) => status.set(SaveStatus::Error(message)),
            }
        });
    };

    let on_copy_json = move |_| {
        let raw = match builder.read().snapshot().to_json_pretty() {
            Ok(raw) => raw,
            Err(err) => {
                status.set(SaveStatus::Error(err.to_string()));
                return;
            }
        };
        spawn(async move {
            match copy_to_clipboard(raw).await {
                Ok(()) => status.set(SaveStatus::Done("Report JSON copied".into())),
                Err(err) => status.set(SaveStatus::Error(err)),
            }
        });
    };

    let on_load_json = move |_| {
        let raw = json_text();
        let result = builder.write().load_json(&raw);
        match result {
            Ok(()) => {
                json_open.set(false);
                json_text.set(String::new());
                status.set(SaveStatus::Done("Report loaded".into()));
            }
            Err(err) => dialog.set(Some((t!("dialog-load-failed"), err.to_string()))),
        }
    };

    let export_filters = filters.clone();
    let on_go_export = move |_| {
        if let Err(err) = builder.read().check_integrity() {
            tracing::error!(error = %err, "report failed integrity check before export");
            dialog.set(Some((t!("dialog-handoff-failed"), err.to_string())));
            return;
        }
        let config = builder.read().snapshot();
        match write_handoff(&LocalStore, &config, &export_filters, OffsetDateTime::now_utc()) {
            Ok(()) => on_export.call(()),
            Err(err) => {
                tracing::error!(error = %err, "export handoff failed");
                dialog.set(Some((t!("dialog-handoff-failed"), err.to_string())));
            }
        }
    };

    let status_line = match status() {
        SaveStatus::Idle => None,
        SaveStatus::Working(label) => Some(("status".to_string(), format!("{label}…"))),
        SaveStatus::Done(message) => Some(("status status--success".to_string(), message)),
        SaveStatus::Error(message) => Some(("status status--error".to_string(), message)),
    };

    let grid_style = format!(
        "grid-template-columns: repeat({GRID_COLUMNS}, minmax(0, 1fr)); grid-auto-rows: {ROW_HEIGHT_PX}px;"
    );

    rsx! {
        section { class: "page page-report-builder",
            header { class: "page__header",
                h1 { {t!("report-builder-title")} }
                input {
                    class: "report-name",
                    r#type: "text",
                    placeholder: "Report name",
                    value: "{snapshot.report_name}",
                    oninput: move |evt| builder.write().set_report_name(evt.value()),
                }
                div { class: "page__actions",
                    button {
                        r#type: "button",
                        class: "button",
                        onclick: move |_| {
                            let next = if mode() == RenderMode::Edit { RenderMode::Preview } else { RenderMode::Edit };
                            mode.set(next);
                        },
                        if current_mode == RenderMode::Edit { "Preview" } else { "Edit" }
                    }
                    button { r#type: "button", class: "button", onclick: move |_| json_open.set(!json_open()), "Load JSON" }
                    button { r#type: "button", class: "button", onclick: on_copy_json, "Copy JSON" }
                    button {
                        r#type: "button",
                        class: "button",
                        disabled: matches!(status(), SaveStatus::Working(_)),
                        onclick: on_save,
                        {t!("action-save")}
                    }
                    button { r#type: "button", class: "button button--primary", onclick: on_go_export, {t!("report-go-export")} }
                }
            }

            if let Some((class, message)) = status_line {
                p { class: "{class}", "{message}" }
            }
            if let Some(message) = notice() {
                ErrorNotice { message }
            }

            if json_open() {
                div { class: "json-loader",
                    textarea {
                        rows: "8",
                        placeholder: "Paste a report configuration",
                        value: "{json_text}",
                        oninput: move |evt| json_text.set(evt.value()),
                    }
                    button { r#type: "button", class: "button button--primary", onclick: on_load_json, "Load" }
                }
            }

            if current_mode == RenderMode::Preview {
                FilterBar { form: filter_form }
            }

            div { class: "report-builder",
                if current_mode == RenderMode::Edit {
                    WidgetMenu { dragging }
                }
                div { class: "report-grid", style: "{grid_style}",
                    for cell in cells {
                        GridCellView {
                            key: "{cell.id}",
                            cell: cell.clone(),
                            mode: current_mode,
                            filters: filters.clone(),
                            builder,
                            dragging,
                            notice,
                        }
                    }
                }
                if current_mode == RenderMode::Edit {
                    button {
                        r#type: "button",
                        class: "button report-builder__add",
                        onclick: move |_| {
                            builder.write().add_cell();
                        },
                        "+ Add cell"
                    }
                }
            }

            SettingsModal { builder }

            if let Some((title, message)) = dialog() {
                BlockingDialog { title, message, on_close: move |_| dialog.set(None) }
            }
        }
    }
}

#[component]
fn WidgetMenu(mut dragging: Signal<Option<ComponentType>>) -> Element {
    let armed = dragging();
    rsx! {
        aside { class: "widget-menu",
            h2 { class: "widget-menu__title", "Widgets" }
            for component in ComponentType::ALL {
                div {
                    key: "{component.wire_name()}",
                    class: if armed == Some(component) { "widget-menu__item widget-menu__item--armed" } else { "widget-menu__item" },
                    draggable: "true",
                    ondragstart: move |_| dragging.set(Some(component)),
                    onclick: move |_| {
                        let next = if dragging() == Some(component) { None } else { Some(component) };
                        dragging.set(next);
                    },
                    "{component.label()}"
                }
            }
        }
    }
}

const TOOLBAR: [(Nudge, &str, &str); 8] = [
    (Nudge::Left, "Move left", "←"),
    (Nudge::Right, "Move right", "→"),
    (Nudge::Up, "Move up", "↑"),
    (Nudge::Down, "Move down", "↓"),
    (Nudge::Narrower, "Narrower", "−w"),
    (Nudge::Wider, "Wider", "+w"),
    (Nudge::Shorter, "Shorter", "−h"),
    (Nudge::Taller, "Taller", "+h"),
];

/// Feed a one-step move or resize back through the layout-change path.
fn apply_nudge(mut builder: Signal<ReportBuilder>, cell_id: &str, step: Nudge) {
    let items = nudged_layout(builder.read().cells(), cell_id, step);
    let layouts = [(PRIMARY_BREAKPOINT.to_string(), items.clone())]
        .into_iter()
        .collect();
    builder.write().apply_layout_change(PRIMARY_BREAKPOINT, &items, layouts);
}

fn place_widget(
    mut builder: Signal<ReportBuilder>,
    mut dragging: Signal<Option<ComponentType>>,
    mut notice: Signal<Option<String>>,
    cell_id: &str,
    component: ComponentType,
) {
    let result = builder.write().drop_widget(cell_id, component);
    dragging.set(None);
    match result {
        Ok(_) => notice.set(None),
        Err(err) => notice.set(Some(err.to_string())),
    }
}

#[component]
fn GridCellView(
    cell: GridCell,
    mode: RenderMode,
    filters: ReportFilters,
    mut builder: Signal<ReportBuilder>,
    dragging: Signal<Option<ComponentType>>,
    mut notice: Signal<Option<String>>,
) -> Element {
    let style = format!(
        "grid-column: {} / span {}; grid-row: {} / span {};",
        cell.layout.x + 1,
        cell.layout.w,
        cell.layout.y + 1,
        cell.layout.h
    );
    let lookup: Result<Option<WidgetConfig>, String> = builder
        .read()
        .widget_for_cell(&cell.id)
        .map(|w| w.cloned())
        .map_err(|err| err.to_string());
    let editing = mode == RenderMode::Edit;

    let content = match lookup {
        Err(message) => rsx! { ErrorNotice { message } },
        Ok(None) => {
            let armed = dragging();
            let cell_id = cell.id.clone();
            rsx! {
                div { class: "grid-cell__drop",
                    if let Some(component) = armed {
                        button {
                            r#type: "button",
                            class: "button button--ghost",
                            onclick: move |_| place_widget(builder, dragging, notice, &cell_id, component),
                            "Place {component.label()} here"
                        }
                    } else {
                        p { "Drop a widget here" }
                    }
                }
            }
        }
        Ok(Some(widget)) => {
            let title = widget.section_title();
            let widget_id = widget.i.clone();
            let settings_id = widget.i.clone();
            let has_settings = widget.component_type().has_settings();
            rsx! {
                div { class: "grid-cell__widget", "data-section": "widget",
                    h2 { class: "grid-cell__title", "{title}" }
                    if editing && has_settings {
                        button {
                            r#type: "button",
                            class: "button button--ghost grid-cell__settings",
                            onclick: move |_| {
                                if let Err(err) = builder.write().open_settings(&settings_id).map(|_| ()) {
                                    notice.set(Some(err.to_string()));
                                }
                            },
                            "Settings"
                        }
                    }
                    WidgetView {
                        widget,
                        mode,
                        filters,
                        on_inline: move |content: InlineContent| {
                            if let Err(err) = builder.write().update_inline(&widget_id, content) {
                                notice.set(Some(err.to_string()));
                            }
                        },
                    }
                }
            }
        }
    };

    let drop_id = cell.id.clone();
    let clear_id = cell.id.clone();
    let remove_id = cell.id.clone();

    rsx! {
        div {
            class: if cell.is_empty() { "grid-cell grid-cell--empty" } else { "grid-cell" },
            style: "{style}",
            ondragover: move |evt| evt.prevent_default(),
            ondrop: move |evt| {
                evt.prevent_default();
                if let Some(component) = dragging() {
                    place_widget(builder, dragging, notice, &drop_id, component);
                }
            },
            if editing {
                div { class: "grid-cell__toolbar",
                    for (step, label, glyph) in TOOLBAR {
                        button {
                            r#type: "button",
                            title: label,
                            onclick: {
                                let cell_id = cell.id.clone();
                                move |_| apply_nudge(builder, &cell_id, step)
                            },
                            "{glyph}"
                        }
                    }
                    if !cell.is_empty() {
                        button {
                            r#type: "button",
                            title: "Remove widget",
                            onclick: move |_| {
                                if let Err(err) = builder.write().clear_widget(&clear_id) {
                                    notice.set(Some(err.to_string()));
                                }
                            },
                            "Clear"
                        }
                    }
                    button {
                        r#type: "button",
                        title: "Remove cell",
                        class: "grid-cell__remove",
                        onclick: move |_| {
                            if let Err(err) = builder.write().remove_cell(&remove_id) {
                                notice.set(Some(err.to_string()));
                            }
                        },
                        "✕"
                    }
                }
            }
            {content}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template(occurrence: Option<&str>) -> ReportTemplate {
        ReportTemplate {
            id: "tpl-1".into(),
            name: "Monthly".into(),
            config_json: json!({}),
            occurrence_id: occurrence.map(str::to_string),
            can_override: true,
        }
    }

    #[test]
    fn save_target_prefers_occurrence() {
        assert_eq!(
            SaveTarget::for_template(None, "Europe/Madrid"),
            SaveTarget::Create {
                timezone: "Europe/Madrid".into()
            }
        );
        assert_eq!(
            SaveTarget::for_template(Some(&template(None)), "UTC"),
            SaveTarget::Template { id: "tpl-1".into() }
        );
        assert_eq!(
            SaveTarget::for_template(Some(&template(Some("occ-9"))), "UTC"),
            SaveTarget::Occurrence { id: "occ-9".into() }
        );
    }

    #[test]
    fn broken_template_config_opens_empty_with_a_dialog() {
        let mut broken = template(None);
        broken.config_json = json!({ "gridCells": [] });
        let (builder, dialog) = initial_builder(Some(&broken));
        assert!(builder.cells().is_empty());
        assert_eq!(builder.report_name(), "Monthly");
        let (_, message) = dialog.unwrap();
        assert!(message.contains("widgets"), "{message}");
    }

    #[test]
    fn stored_template_config_is_loaded() {
        let mut source = ReportBuilder::new();
        let cell = source.add_cell();
        source.drop_widget(&cell, ComponentType::HostReportTable).unwrap();
        let mut stored = template(None);
        stored.config_json = serde_json::to_value(source.snapshot()).unwrap();

        let (builder, dialog) = initial_builder(Some(&stored));
        assert!(dialog.is_none());
        assert_eq!(builder.cells(), source.cells());
        assert_eq!(builder.report_name(), "Monthly");
    }
}

//! Export view: replays the builder's handoff in exporting mode and writes PDF/PNG files.

use dioxus::prelude::*;
use futures::future::join_all;
use time::{Date, OffsetDateTime};

use crate::components::notice::{ErrorNotice, LoadingSkeleton};
use crate::core::config::{read_handoff, DashboardConfig, ReportFilters, DEFAULT_RANGE_DAYS};
use crate::core::context::AppContext;
use crate::core::error::ConfigError;
use crate::core::format::format_date;
use crate::core::grid::reading_order;
use crate::core::storage::LocalStore;
use crate::core::widgets::WidgetConfig;
use crate::export::deliver::download_bytes;
use crate::export::{build_pdf, build_png, ExportError, ExportedFile};
use crate::t;

use super::blocks::report_blocks;
use super::data::{load_for_display, widget_query, WidgetLoad};
use super::render::{RenderMode, WidgetBody};

/// Widgets in the order they appear on the grid. Cells whose widget is missing are
/// skipped with a warning.
pub fn widgets_in_reading_order(config: &DashboardConfig) -> Vec<WidgetConfig> {
    reading_order(&config.grid_cells)
        .into_iter()
        .filter_map(|cell| {
            let id = cell.widget_id.as_ref()?;
            let widget = config.widgets.get(id);
            if widget.is_none() {
                tracing::warn!(cell_id = %cell.id, widget_id = %id, "export skips dangling widget");
            }
            widget.cloned()
        })
        .collect()
}

/// Why the export view has nothing to show.
#[derive(Debug, Clone, PartialEq)]
pub enum HandoffProblem {
    NothingSaved,
    Invalid(String),
}

impl From<ConfigError> for HandoffProblem {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NothingSaved => HandoffProblem::NothingSaved,
            other => HandoffProblem::Invalid(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum ExportStatus {
    Idle,
    Working(&'static str),
    Done(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportKind {
    Pdf,
    Png,
}

#[component]
pub fn ReportExportPage() -> Element {
    let handoff = use_hook(|| {
        read_handoff(&LocalStore).map_err(|err| {
            tracing::error!(error = %err, "export handoff unreadable");
            HandoffProblem::from(err)
        })
    });

    match handoff {
        Ok((config, filters)) => rsx! { ExportView { config, filters } },
        Err(HandoffProblem::NothingSaved) => rsx! {
            section { class: "page page-export",
                h1 { {t!("report-export-title")} }
                div { class: "notice notice--warning", role: "alert",
                    p { {t!("export-nothing-saved")} }
                }
            }
        },
        Err(HandoffProblem::Invalid(message)) => rsx! {
            section { class: "page page-export",
                h1 { {t!("report-export-title")} }
                div { class: "notice notice--error", role: "alert",
                    strong { {t!("export-handoff-invalid")} }
                    p { "{message}" }
                }
            }
        },
    }
}

#[component]
fn ExportView(config: DashboardConfig, filters: ReportFilters) -> Element {
    let ctx = use_context::<AppContext>();
    let status = use_signal(|| ExportStatus::Idle);
    let busy = use_signal(|| false);

    let now = use_hook(OffsetDateTime::now_utc);
    let (range_start, range_end) = {
        let (start, end) = filters.effective_range(now);
        (start.date(), end.date())
    };
    let range_text = range_label(&filters, range_start, range_end);
    let widgets = widgets_in_reading_order(&config);

    let loads = use_resource({
        let widgets = widgets.clone();
        let filters = filters.clone();
        move || {
            let api = ctx.api.clone();
            let timezone = ctx.timezone.clone();
            let widgets = widgets.clone();
            let filters = filters.clone();
            async move {
                let requests = widgets.iter().map(|widget| {
                    let query = widget_query(&widget.kind, &filters, &timezone, now);
                    let api = api.clone();
                    async move { load_for_display(&api, widget, &query).await }
                });
                let loads: Vec<WidgetLoad> = join_all(requests).await;
                tracing::info!(widgets = loads.len(), "export data loaded");
                widgets.into_iter().zip(loads).collect::<Vec<(WidgetConfig, WidgetLoad)>>()
            }
        }
    });

    let loaded = loads.read().clone();
    let report_name = config.report_name.clone();

    let feedback = match status() {
        ExportStatus::Idle => None,
        ExportStatus::Working(label) => Some(("status".to_string(), format!("{label}…"))),
        ExportStatus::Done(message) => Some(("status status--success".to_string(), message)),
        ExportStatus::Error(message) => Some(("status status--error".to_string(), message)),
    };

    let handler = |kind: ExportKind| {
        let loaded = loaded.clone();
        let title = report_name.clone();
        let mut status = status;
        let mut busy = busy;
        move |_: MouseEvent| {
            if busy() {
                return;
            }
            let Some(loaded) = loaded.clone() else {
                status.set(ExportStatus::Error(ExportError::EmptyCapture.to_string()));
                return;
            };
            busy.set(true);
            status.set(ExportStatus::Working(match kind {
                ExportKind::Pdf => "Building PDF",
                ExportKind::Png => "Building PNG",
            }));
            let title = title.clone();
            spawn(async move {
                let outcome = run_export(kind, &title, &loaded, range_start, range_end).await;
                match outcome {
                    Ok(message) => status.set(ExportStatus::Done(message)),
                    Err(err) => {
                        tracing::error!(error = %err, "export failed");
                        status.set(ExportStatus::Error(err.to_string()));
                    }
                }
                busy.set(false);
            });
        }
    };

    let body = match &loaded {
        None => rsx! { LoadingSkeleton { lines: 8 } },
        Some(items) if items.is_empty() => rsx! {
            ErrorNotice { message: t!("export-no-widgets") }
        },
        Some(items) => rsx! {
            for (id, title, widget, load) in items.iter().map(|(w, l)| (w.i.clone(), w.section_title(), w.clone(), l.clone())) {
                section { key: "{id}", class: "export-section", "data-section": "widget",
                    h2 { class: "export-section__title", "{title}" }
                    WidgetBody {
                        widget,
                        load,
                        mode: RenderMode::Exporting,
                        range_start,
                        range_end,
                    }
                }
            }
        },
    };

    rsx! {
        section { class: "page page-export",
            header { class: "page__header",
                h1 { {t!("report-export-title")} }
                div { class: "page__actions",
                    button {
                        r#type: "button",
                        class: "button button--primary",
                        disabled: busy() || loaded.is_none(),
                        onclick: handler(ExportKind::Pdf),
                        {t!("export-download-pdf")}
                    }
                    button {
                        r#type: "button",
                        class: "button",
                        disabled: busy() || loaded.is_none(),
                        onclick: handler(ExportKind::Png),
                        {t!("export-download-png")}
                    }
                }
            }
            if let Some((class, message)) = feedback {
                p { class: "{class}", "{message}" }
            }
            article { class: "export-capture",
                h1 { class: "export-capture__title", "{report_name}" }
                p { class: "export-capture__range", "{range_text}" }
                {body}
            }
        }
    }
}

/// Dates shown under the capture title; a range the user did not pick is marked as the
/// default window.
fn range_label(filters: &ReportFilters, start: Date, end: Date) -> String {
    let dates = format!("{} – {}", format_date(start), format_date(end));
    match filters.date_range() {
        Some(_) => dates,
        None => format!("{dates} (last {DEFAULT_RANGE_DAYS} days)"),
    }
}

async fn run_export(
    kind: ExportKind,
    title: &str,
    loaded: &[(WidgetConfig, WidgetLoad)],
    range_start: Date,
    range_end: Date,
) -> Result<String, ExportError> {
    let blocks = report_blocks(
        title,
        loaded.iter().map(|(widget, load)| (widget, load)),
        range_start,
        range_end,
    );
    let at = OffsetDateTime::now_utc();
    let file: ExportedFile = match kind {
        ExportKind::Pdf => build_pdf(&blocks, title, &t!("pdf-contents"), at).await?,
        ExportKind::Png => build_png(&blocks, title, at).await?,
    };
    let size = file.bytes.len();
    let saved_to = download_bytes(&file.file_name, file.mime, file.bytes).await?;
    tracing::info!(file = %file.file_name, bytes = size, "export delivered");
    Ok(match saved_to {
        Some(path) => format!("Saved to {path}"),
        None => format!("Downloaded {}", file.file_name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::ReportBuilder;
    use crate::core::widgets::ComponentType;
    use time::macros::datetime;

    #[test]
    fn range_label_marks_the_default_window() {
        let start = datetime!(2024-03-01 00:00 UTC);
        let end = datetime!(2024-03-31 00:00 UTC);
        let picked = ReportFilters {
            start_date: Some(start),
            end_date: Some(end),
            ..ReportFilters::default()
        };
        let explicit = range_label(&picked, start.date(), end.date());
        assert!(!explicit.contains("last"));

        let open_ended = ReportFilters {
            start_date: Some(start),
            ..ReportFilters::default()
        };
        let fallback = range_label(&open_ended, start.date(), end.date());
        assert!(fallback.starts_with(&explicit));
        assert!(fallback.ends_with("(last 30 days)"));
    }

    #[test]
    fn widgets_follow_the_grid_reading_order() {
        let mut builder = ReportBuilder::new();
        let first = builder.add_cell();
        let second = builder.add_cell();
        let third = builder.add_cell();
        builder.drop_widget(&third, ComponentType::Text).unwrap();
        builder.drop_widget(&first, ComponentType::HostReportTable).unwrap();
        builder.drop_widget(&second, ComponentType::FeedbackTable).unwrap();
        let _ = builder.add_cell();

        let order: Vec<ComponentType> = widgets_in_reading_order(&builder.snapshot())
            .iter()
            .map(WidgetConfig::component_type)
            .collect();
        assert_eq!(
            order,
            vec![
                ComponentType::HostReportTable,
                ComponentType::FeedbackTable,
                ComponentType::Text,
            ]
        );
    }

    #[test]
    fn nothing_saved_is_told_apart_from_bad_payloads() {
        assert_eq!(
            HandoffProblem::from(ConfigError::NothingSaved),
            HandoffProblem::NothingSaved
        );
        assert!(matches!(
            HandoffProblem::from(ConfigError::MissingField("widgets")),
            HandoffProblem::Invalid(message) if message.contains("widgets")
        ));
    }
}

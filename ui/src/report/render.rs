//! Widget renderers.
//!
//! One entry point, [`WidgetView`], dispatches on the widget variant. Inline-editable
//! widgets edit their own content in [`RenderMode::Edit`]; data widgets show a
//! placeholder card there and only fetch in preview or export.

use api::reports::FeedbackAggregation;
use base64::Engine;
use dioxus::prelude::*;
use time::{Date, OffsetDateTime};

use crate::analytics::views::AnalyticsBlock;
use crate::components::notice::{ErrorNotice, LoadingSkeleton};
use crate::core::config::ReportFilters;
use crate::core::context::AppContext;
use crate::core::widgets::{DisplayFormat, FileAttachment, InlineContent, WidgetConfig, WidgetKind};

use super::data::{load_for_display, widget_query, WidgetData, WidgetLoad};
use super::tables::{
    cancellation_table, feedback_table, host_table, member_table, page_count, TableData,
    PREVIEW_PAGE_SIZE,
};

/// Largest file the upload widget embeds into the report.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Builder canvas: inline widgets are editable, data widgets do not fetch.
    Edit,
    /// Read-only, data-fetching, interactive (tabs and pagination).
    Preview,
    /// Read-only and fully expanded for capture.
    Exporting,
}

impl RenderMode {
    pub fn fetches_data(&self) -> bool {
        !matches!(self, RenderMode::Edit)
    }
}

/// One-line description of where a data widget's rows come from.
pub fn data_source_summary(kind: &WidgetKind) -> String {
    match kind {
        WidgetKind::Text { .. } => "Free text".into(),
        WidgetKind::RichText { .. } => "Formatted notes".into(),
        WidgetKind::FileUpload { .. } => "Embedded file".into(),
        WidgetKind::FeedbackTable { aggregation_type } => match aggregation_type {
            FeedbackAggregation::ByEvent => "Feedback responses, per event".into(),
            FeedbackAggregation::ByCategory => "Feedback responses, per category".into(),
        },
        WidgetKind::MemberReportTable { group_by } => {
            format!("Member attendance, grouped by {}", group_by.as_param())
        }
        WidgetKind::HostReportTable {} => "Hosted events and ratings per host".into(),
        WidgetKind::AnalyticsWidget {
            analytics_type,
            display_format,
        } => format!(
            "{} as a {}",
            analytics_type.label(),
            match display_format {
                DisplayFormat::Chart => "chart",
                DisplayFormat::Table => "table",
            }
        ),
        WidgetKind::EventCancelationsWidget {} => "Canceled events in the selected range".into(),
    }
}

#[component]
pub fn WidgetView(
    widget: WidgetConfig,
    mode: RenderMode,
    filters: ReportFilters,
    on_inline: EventHandler<InlineContent>,
) -> Element {
    match &widget.kind {
        WidgetKind::Text { content } => rsx! {
            TextWidget { content: content.clone(), mode, on_inline }
        },
        WidgetKind::RichText { html } => rsx! {
            RichTextWidget { html: html.clone(), mode, on_inline }
        },
        WidgetKind::FileUpload {
            file_name,
            mime_type,
            data_url,
        } => rsx! {
            FileUploadWidget {
                file_name: file_name.clone(),
                mime_type: mime_type.clone(),
                data_url: data_url.clone(),
                mode,
                on_inline,
            }
        },
        WidgetKind::FeedbackTable { .. }
        | WidgetKind::MemberReportTable { .. }
        | WidgetKind::HostReportTable {}
        | WidgetKind::AnalyticsWidget { .. }
        | WidgetKind::EventCancelationsWidget {} => {
            if mode.fetches_data() {
                rsx! { FetchingWidget { widget: widget.clone(), filters, mode } }
            } else {
                let summary = data_source_summary(&widget.kind);
                rsx! {
                    div { class: "widget-placeholder",
                        p { class: "widget-placeholder__source", "{summary}" }
                        p { class: "widget-placeholder__hint", "Data loads in preview." }
                    }
                }
            }
        }
    }
}

#[component]
fn FetchingWidget(widget: WidgetConfig, filters: ReportFilters, mode: RenderMode) -> Element {
    let ctx = use_context::<AppContext>();
    let timezone = ctx.timezone.clone();
    let (range_start, range_end) = {
        let (start, end) = filters.effective_range(OffsetDateTime::now_utc());
        (start.date(), end.date())
    };

    let fetch_widget = widget.clone();
    let resource = use_resource(use_reactive!(|(fetch_widget, filters)| {
        let api = ctx.api.clone();
        let timezone = timezone.clone();
        async move {
            let query = widget_query(&fetch_widget.kind, &filters, &timezone, OffsetDateTime::now_utc());
            load_for_display(&api, &fetch_widget, &query).await
        }
    }));

    let body = match &*resource.read() {
        None => rsx! { LoadingSkeleton {} },
        Some(load) => rsx! {
            WidgetBody {
                widget: widget.clone(),
                load: load.clone(),
                mode,
                range_start,
                range_end,
            }
        },
    };
    body
}

/// Renders already-loaded data. The export page calls this directly with data it fetched
/// up front.
#[component]
pub fn WidgetBody(
    widget: WidgetConfig,
    load: WidgetLoad,
    mode: RenderMode,
    range_start: Date,
    range_end: Date,
) -> Element {
    let expanded = mode == RenderMode::Exporting;
    let data = match load {
        Ok(data) => data,
        Err(message) => return rsx! { ErrorNotice { message } },
    };

    match (&widget.kind, data) {
        (WidgetKind::Text { content }, _) => rsx! {
            TextWidget { content: content.clone(), mode, on_inline: |_| {} }
        },
        (WidgetKind::RichText { html }, _) => rsx! {
            RichTextWidget { html: html.clone(), mode, on_inline: |_| {} }
        },
        (WidgetKind::FileUpload { file_name, mime_type, data_url }, _) => rsx! {
            FileUploadWidget {
                file_name: file_name.clone(),
                mime_type: mime_type.clone(),
                data_url: data_url.clone(),
                mode,
                on_inline: |_| {},
            }
        },
        (WidgetKind::FeedbackTable { .. }, WidgetData::Feedback(report)) => {
            let tabs: Vec<(String, TableData)> = report
                .categories
                .iter()
                .map(|c| (c.name.clone(), feedback_table(c)))
                .collect();
            rsx! { FeedbackTabs { tabs, expanded } }
        }
        (WidgetKind::MemberReportTable { .. }, WidgetData::Members(report)) => rsx! {
            ReportTable { table: member_table(&report), expanded }
        },
        (WidgetKind::HostReportTable {}, WidgetData::Hosts(report)) => rsx! {
            ReportTable { table: host_table(&report), expanded }
        },
        (WidgetKind::EventCancelationsWidget {}, WidgetData::Cancellations(report)) => rsx! {
            ReportTable { table: cancellation_table(&report), expanded }
        },
        (
            WidgetKind::AnalyticsWidget {
                analytics_type,
                display_format,
            },
            WidgetData::Analytics(data),
        ) => rsx! {
            AnalyticsBlock {
                analytics_type: *analytics_type,
                display_format: *display_format,
                data,
                range_start,
                range_end,
            }
        },
        (kind, _) => {
            tracing::error!(
                widget_id = %widget.i,
                component = kind.component_type().wire_name(),
                "widget data does not match widget type"
            );
            rsx! { ErrorNotice { message: "This widget could not be rendered." } }
        }
    }
}

#[component]
fn TextWidget(content: String, mode: RenderMode, on_inline: EventHandler<InlineContent>) -> Element {
    if mode == RenderMode::Edit {
        return rsx! {
            textarea {
                class: "widget-text__editor",
                rows: "5",
                placeholder: "Write something…",
                value: "{content}",
                oninput: move |evt| on_inline.call(InlineContent::Text(evt.value())),
            }
        };
    }

    let paragraphs: Vec<String> = content
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    rsx! {
        div { class: "widget-text",
            for (idx, paragraph) in paragraphs.into_iter().enumerate() {
                p { key: "{idx}", "{paragraph}" }
            }
        }
    }
}

#[component]
fn RichTextWidget(html: String, mode: RenderMode, on_inline: EventHandler<InlineContent>) -> Element {
    rsx! {
        if mode == RenderMode::Edit {
            textarea {
                class: "widget-rich__source",
                rows: "6",
                placeholder: "<p>HTML content</p>",
                value: "{html}",
                oninput: move |evt| on_inline.call(InlineContent::RichText(evt.value())),
            }
        }
        div { class: "widget-rich", dangerous_inner_html: "{html}" }
    }
}

/// MIME type guessed from a file name's extension.
pub fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "csv" => "text/csv",
        "txt" => "text/plain",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

/// Inline attachment for an uploaded file, or the reason it was refused.
pub fn attachment_from_bytes(file_name: &str, bytes: &[u8]) -> Result<FileAttachment, String> {
    if bytes.is_empty() {
        return Err(format!("{file_name} is empty"));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(format!(
            "{file_name} is larger than {} MB",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        ));
    }
    let mime_type = mime_for(file_name);
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(FileAttachment {
        file_name: file_name.to_string(),
        mime_type: mime_type.to_string(),
        data_url: format!("data:{mime_type};base64,{encoded}"),
    })
}

#[component]
fn FileUploadWidget(
    file_name: Option<String>,
    mime_type: Option<String>,
    data_url: Option<String>,
    mode: RenderMode,
    on_inline: EventHandler<InlineContent>,
) -> Element {
    let mut upload_error = use_signal(|| None::<String>);
    let is_image = mime_type.as_deref().is_some_and(|m| m.starts_with("image/"));

    let preview = match (&file_name, &data_url) {
        (Some(name), Some(url)) if is_image => rsx! {
            img { class: "widget-file__image", src: "{url}", alt: "{name}" }
        },
        (Some(name), Some(url)) => rsx! {
            a { class: "widget-file__link", href: "{url}", download: "{name}", "{name}" }
        },
        _ => rsx! {
            p { class: "widget-file__empty", "No file attached" }
        },
    };

    rsx! {
        div { class: "widget-file",
            {preview}
            if mode == RenderMode::Edit {
                div { class: "widget-file__controls",
                    input {
                        r#type: "file",
                        onchange: move |evt: FormEvent| async move {
                            let Some(engine) = evt.files() else {
                                return;
                            };
                            let Some(name) = engine.files().into_iter().next() else {
                                return;
                            };
                            let outcome = match engine.read_file(&name).await {
                                Some(bytes) => attachment_from_bytes(&name, &bytes),
                                None => Err(format!("Could not read {name}")),
                            };
                            match outcome {
                                Ok(file) => {
                                    upload_error.set(None);
                                    tracing::info!(file = %file.file_name, mime = %file.mime_type, "file attached");
                                    on_inline.call(InlineContent::File(Some(file)));
                                }
                                Err(message) => {
                                    tracing::warn!(file = %name, %message, "file upload rejected");
                                    upload_error.set(Some(message));
                                }
                            }
                        },
                    }
                    if file_name.is_some() {
                        button {
                            r#type: "button",
                            class: "button button--ghost",
                            onclick: move |_| {
                                upload_error.set(None);
                                on_inline.call(InlineContent::File(None));
                            },
                            "Remove file"
                        }
                    }
                }
                if let Some(message) = upload_error() {
                    ErrorNotice { message }
                }
            }
        }
    }
}

#[component]
fn FeedbackTabs(tabs: Vec<(String, TableData)>, expanded: bool) -> Element {
    let mut active = use_signal(|| 0usize);

    if tabs.is_empty() {
        return rsx! { p { class: "widget__empty", "No data for this period" } };
    }

    if expanded {
        return rsx! {
            for (idx, (name, table)) in tabs.into_iter().enumerate() {
                section { key: "{idx}", class: "feedback-section", "data-section": "sub",
                    h3 { class: "feedback-section__title", "{name}" }
                    ReportTable { table, expanded: true }
                }
            }
        };
    }

    let current = active().min(tabs.len() - 1);
    let table = tabs[current].1.clone();
    rsx! {
        div { class: "tabs",
            div { class: "tabs__list", role: "tablist",
                for (idx, (name, _)) in tabs.iter().enumerate() {
                    button {
                        key: "{idx}",
                        r#type: "button",
                        role: "tab",
                        class: if idx == current { "tabs__tab tabs__tab--active" } else { "tabs__tab" },
                        onclick: move |_| active.set(idx),
                        "{name}"
                    }
                }
            }
            ReportTable { table, expanded: false }
        }
    }
}

/// A table, paginated unless `expanded`.
#[component]
pub fn ReportTable(table: TableData, expanded: bool) -> Element {
    let mut page = use_signal(|| 0usize);

    if table.is_empty() {
        return rsx! { p { class: "widget__empty", "No data for this period" } };
    }

    let pages = page_count(table.rows.len(), PREVIEW_PAGE_SIZE);
    let current = page().min(pages - 1);
    let rows: Vec<Vec<String>> = if expanded {
        table.rows.clone()
    } else {
        table.page(current, PREVIEW_PAGE_SIZE).to_vec()
    };

    rsx! {
        table { class: "data-table",
            thead {
                tr {
                    for column in table.columns.iter() {
                        th { "{column}" }
                    }
                }
            }
            tbody {
                for row in rows.iter() {
                    tr {
                        for cell in row.iter() {
                            td { "{cell}" }
                        }
                    }
                }
            }
        }
        if !expanded && pages > 1 {
            div { class: "pager",
                button {
                    r#type: "button",
                    class: "button button--ghost",
                    disabled: current == 0,
                    onclick: move |_| page.set(current.saturating_sub(1)),
                    "‹ Prev"
                }
                span { class: "pager__status", "Page {current + 1} of {pages}" }
                button {
                    r#type: "button",
                    class: "button button--ghost",
                    disabled: current + 1 >= pages,
                    onclick: move |_| page.set(current + 1),
                    "Next ›"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::GroupBy;

    use crate::core::widgets::ComponentType;

    #[test]
    fn only_edit_mode_suppresses_fetching() {
        assert!(!RenderMode::Edit.fetches_data());
        assert!(RenderMode::Preview.fetches_data());
        assert!(RenderMode::Exporting.fetches_data());
    }

    #[test]
    fn placeholders_describe_the_configured_source() {
        let feedback = WidgetKind::FeedbackTable {
            aggregation_type: FeedbackAggregation::ByCategory,
        };
        assert_eq!(data_source_summary(&feedback), "Feedback responses, per category");
        let members = WidgetKind::MemberReportTable {
            group_by: GroupBy::Month,
        };
        assert_eq!(data_source_summary(&members), "Member attendance, grouped by month");
        for component in ComponentType::ALL {
            assert!(!data_source_summary(&WidgetKind::default_for(component)).is_empty());
        }
    }

    #[test]
    fn uploads_become_data_urls() {
        let file = attachment_from_bytes("Logo.PNG", &[1, 2, 3]).unwrap();
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.data_url, "data:image/png;base64,AQID");
        assert_eq!(mime_for("notes"), "application/octet-stream");
    }

    #[test]
    fn oversized_or_empty_uploads_are_refused() {
        assert!(attachment_from_bytes("a.txt", &[]).is_err());
        let big = vec![0u8; MAX_UPLOAD_BYTES + 1];
        assert!(attachment_from_bytes("a.bin", &big).unwrap_err().contains("larger than 5 MB"));
    }
}

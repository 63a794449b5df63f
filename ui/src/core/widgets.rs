//! Widget configuration union.
//!
//! Every widget is a [`WidgetConfig`]: its id `i` plus a [`WidgetKind`] tagged by
//! `componentType`. All dispatch over widget types is an exhaustive `match` on
//! [`ComponentType`] or [`WidgetKind`], so adding a variant breaks the build at every
//! renderer, settings form and menu entry until it is handled.

use api::reports::FeedbackAggregation;
use api::GroupBy;
use serde::{Deserialize, Serialize};

use super::error::BuilderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentType {
    Text,
    RichText,
    FileUpload,
    FeedbackTable,
    MemberReportTable,
    HostReportTable,
    AnalyticsWidget,
    EventCancelationsWidget,
}

impl ComponentType {
    /// Widget menu order.
    pub const ALL: [ComponentType; 8] = [
        ComponentType::Text,
        ComponentType::RichText,
        ComponentType::FileUpload,
        ComponentType::FeedbackTable,
        ComponentType::MemberReportTable,
        ComponentType::HostReportTable,
        ComponentType::AnalyticsWidget,
        ComponentType::EventCancelationsWidget,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ComponentType::Text => "Text",
            ComponentType::RichText => "Rich text",
            ComponentType::FileUpload => "File",
            ComponentType::FeedbackTable => "Feedback",
            ComponentType::MemberReportTable => "Member report",
            ComponentType::HostReportTable => "Host report",
            ComponentType::AnalyticsWidget => "Analytics",
            ComponentType::EventCancelationsWidget => "Event cancelations",
        }
    }

    /// Wire name, identical to the serialized `componentType`.
    pub fn wire_name(&self) -> &'static str {
        match self {
            ComponentType::Text => "TEXT",
            ComponentType::RichText => "RICH_TEXT",
            ComponentType::FileUpload => "FILE_UPLOAD",
            ComponentType::FeedbackTable => "FEEDBACK_TABLE",
            ComponentType::MemberReportTable => "MEMBER_REPORT_TABLE",
            ComponentType::HostReportTable => "HOST_REPORT_TABLE",
            ComponentType::AnalyticsWidget => "ANALYTICS_WIDGET",
            ComponentType::EventCancelationsWidget => "EVENT_CANCELATIONS_WIDGET",
        }
    }

    /// Text, rich text and files edit their own content in place.
    pub fn is_inline_editable(&self) -> bool {
        matches!(
            self,
            ComponentType::Text | ComponentType::RichText | ComponentType::FileUpload
        )
    }

    /// Data widgets hit the backend, and only outside edit mode.
    pub fn fetches_data(&self) -> bool {
        !self.is_inline_editable()
    }

    pub fn has_settings(&self) -> bool {
        matches!(
            self,
            ComponentType::FeedbackTable
                | ComponentType::MemberReportTable
                | ComponentType::AnalyticsWidget
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalyticsType {
    #[default]
    SponsorEvents,
    PageVisits,
    MemberAttendance,
    Retention,
    VtcTime,
}

impl AnalyticsType {
    pub const ALL: [AnalyticsType; 5] = [
        AnalyticsType::SponsorEvents,
        AnalyticsType::PageVisits,
        AnalyticsType::MemberAttendance,
        AnalyticsType::Retention,
        AnalyticsType::VtcTime,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AnalyticsType::SponsorEvents => "Sponsor events",
            AnalyticsType::PageVisits => "Page visits",
            AnalyticsType::MemberAttendance => "Member attendance",
            AnalyticsType::Retention => "Retention",
            AnalyticsType::VtcTime => "VTC time",
        }
    }

    pub fn wire_name(&self) -> &'static str {
        match self {
            AnalyticsType::SponsorEvents => "SPONSOR_EVENTS",
            AnalyticsType::PageVisits => "PAGE_VISITS",
            AnalyticsType::MemberAttendance => "MEMBER_ATTENDANCE",
            AnalyticsType::Retention => "RETENTION",
            AnalyticsType::VtcTime => "VTC_TIME",
        }
    }

    pub fn from_wire_name(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.wire_name() == raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisplayFormat {
    #[default]
    Chart,
    Table,
}

/// Variant payloads, tagged by `componentType` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "componentType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WidgetKind {
    Text {
        #[serde(default)]
        content: String,
    },
    RichText {
        #[serde(default)]
        html: String,
    },
    #[serde(rename_all = "camelCase")]
    FileUpload {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data_url: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    FeedbackTable {
        #[serde(default)]
        aggregation_type: FeedbackAggregation,
    },
    #[serde(rename_all = "camelCase")]
    MemberReportTable {
        #[serde(default)]
        group_by: GroupBy,
    },
    HostReportTable {},
    #[serde(rename_all = "camelCase")]
    AnalyticsWidget {
        #[serde(default)]
        analytics_type: AnalyticsType,
        #[serde(default)]
        display_format: DisplayFormat,
    },
    EventCancelationsWidget {},
}

impl WidgetKind {
    pub fn default_for(component: ComponentType) -> Self {
        match component {
            ComponentType::Text => WidgetKind::Text {
                content: String::new(),
            },
            ComponentType::RichText => WidgetKind::RichText {
                html: String::new(),
            },
            ComponentType::FileUpload => WidgetKind::FileUpload {
                file_name: None,
                mime_type: None,
                data_url: None,
            },
            ComponentType::FeedbackTable => WidgetKind::FeedbackTable {
                aggregation_type: FeedbackAggregation::default(),
            },
            ComponentType::MemberReportTable => WidgetKind::MemberReportTable {
                group_by: GroupBy::default(),
            },
            ComponentType::HostReportTable => WidgetKind::HostReportTable {},
            ComponentType::AnalyticsWidget => WidgetKind::AnalyticsWidget {
                analytics_type: AnalyticsType::default(),
                display_format: DisplayFormat::default(),
            },
            ComponentType::EventCancelationsWidget => WidgetKind::EventCancelationsWidget {},
        }
    }

    pub fn component_type(&self) -> ComponentType {
        match self {
            WidgetKind::Text { .. } => ComponentType::Text,
            WidgetKind::RichText { .. } => ComponentType::RichText,
            WidgetKind::FileUpload { .. } => ComponentType::FileUpload,
            WidgetKind::FeedbackTable { .. } => ComponentType::FeedbackTable,
            WidgetKind::MemberReportTable { .. } => ComponentType::MemberReportTable,
            WidgetKind::HostReportTable {} => ComponentType::HostReportTable,
            WidgetKind::AnalyticsWidget { .. } => ComponentType::AnalyticsWidget,
            WidgetKind::EventCancelationsWidget {} => ComponentType::EventCancelationsWidget,
        }
    }
}

/// A configured widget. `i` equals the `widgetId` of the cell that hosts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub i: String,
    #[serde(flatten)]
    pub kind: WidgetKind,
}

/// Editable fields of the three configurable variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetSettings {
    Feedback {
        aggregation_type: FeedbackAggregation,
    },
    MemberReport {
        group_by: GroupBy,
    },
    Analytics {
        analytics_type: AnalyticsType,
        display_format: DisplayFormat,
    },
}

impl WidgetSettings {
    fn target(&self) -> ComponentType {
        match self {
            WidgetSettings::Feedback { .. } => ComponentType::FeedbackTable,
            WidgetSettings::MemberReport { .. } => ComponentType::MemberReportTable,
            WidgetSettings::Analytics { .. } => ComponentType::AnalyticsWidget,
        }
    }
}

/// New content pushed by an inline-editable renderer in edit mode.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineContent {
    Text(String),
    RichText(String),
    File(Option<FileAttachment>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileAttachment {
    pub file_name: String,
    pub mime_type: String,
    pub data_url: String,
}

impl WidgetConfig {
    pub fn new(i: impl Into<String>, component: ComponentType) -> Self {
        Self {
            i: i.into(),
            kind: WidgetKind::default_for(component),
        }
    }

    pub fn component_type(&self) -> ComponentType {
        self.kind.component_type()
    }

    /// Heading used on screen and as the table-of-contents entry in exports.
    pub fn section_title(&self) -> String {
        match &self.kind {
            WidgetKind::Text { content } => content
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(|line| truncate(line, 60))
                .unwrap_or_else(|| "Text".to_string()),
            WidgetKind::RichText { .. } => "Notes".to_string(),
            WidgetKind::FileUpload { file_name, .. } => file_name
                .clone()
                .unwrap_or_else(|| "Attachment".to_string()),
            WidgetKind::FeedbackTable { aggregation_type } => match aggregation_type {
                FeedbackAggregation::ByEvent => "Feedback by event".to_string(),
                FeedbackAggregation::ByCategory => "Feedback by category".to_string(),
            },
            WidgetKind::MemberReportTable { .. } => "Member report".to_string(),
            WidgetKind::HostReportTable {} => "Host report".to_string(),
            WidgetKind::AnalyticsWidget { analytics_type, .. } => {
                analytics_type.label().to_string()
            }
            WidgetKind::EventCancelationsWidget {} => "Event cancelations".to_string(),
        }
    }

    /// Form contents for the settings modal; `None` for the five variants without settings.
    pub fn settings_form(&self) -> Option<WidgetSettings> {
        match &self.kind {
            WidgetKind::FeedbackTable { aggregation_type } => Some(WidgetSettings::Feedback {
                aggregation_type: *aggregation_type,
            }),
            WidgetKind::MemberReportTable { group_by } => Some(WidgetSettings::MemberReport {
                group_by: *group_by,
            }),
            WidgetKind::AnalyticsWidget {
                analytics_type,
                display_format,
            } => Some(WidgetSettings::Analytics {
                analytics_type: *analytics_type,
                display_format: *display_format,
            }),
            WidgetKind::Text { .. }
            | WidgetKind::RichText { .. }
            | WidgetKind::FileUpload { .. }
            | WidgetKind::HostReportTable {}
            | WidgetKind::EventCancelationsWidget {} => None,
        }
    }

    /// Shallow-merge settings onto the widget. `i` and the variant never change; a form
    /// for another variant is rejected without touching the widget.
    pub fn apply_settings(&mut self, settings: WidgetSettings) -> Result<(), BuilderError> {
        match (&mut self.kind, settings) {
            (
                WidgetKind::FeedbackTable { aggregation_type },
                WidgetSettings::Feedback {
                    aggregation_type: next,
                },
            ) => {
                *aggregation_type = next;
                Ok(())
            }
            (
                WidgetKind::MemberReportTable { group_by },
                WidgetSettings::MemberReport { group_by: next },
            ) => {
                *group_by = next;
                Ok(())
            }
            (
                WidgetKind::AnalyticsWidget {
                    analytics_type,
                    display_format,
                },
                WidgetSettings::Analytics {
                    analytics_type: next_type,
                    display_format: next_format,
                },
            ) => {
                *analytics_type = next_type;
                *display_format = next_format;
                Ok(())
            }
            (kind, settings) => Err(BuilderError::SettingsMismatch {
                expected: settings.target().wire_name(),
                found: kind.component_type().wire_name(),
            }),
        }
    }

    pub fn apply_inline(&mut self, content: InlineContent) -> Result<(), BuilderError> {
        match (&mut self.kind, content) {
            (WidgetKind::Text { content }, InlineContent::Text(next)) => {
                *content = next;
                Ok(())
            }
            (WidgetKind::RichText { html }, InlineContent::RichText(next)) => {
                *html = next;
                Ok(())
            }
            (
                WidgetKind::FileUpload {
                    file_name,
                    mime_type,
                    data_url,
                },
                InlineContent::File(next),
            ) => {
                match next {
                    Some(file) => {
                        *file_name = Some(file.file_name);
                        *mime_type = Some(file.mime_type);
                        *data_url = Some(file.data_url);
                    }
                    None => {
                        *file_name = None;
                        *mime_type = None;
                        *data_url = None;
                    }
                }
                Ok(())
            }
            _ => Err(BuilderError::NotInlineEditable(self.i.clone())),
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

//! Widget settings modal.

use api::reports::FeedbackAggregation;
use api::GroupBy;
use dioxus::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::builder::ReportBuilder;
use crate::core::widgets::{AnalyticsType, DisplayFormat, WidgetSettings};
use crate::t;

/// Wire name of a unit enum variant, as used for `<option>` values.
pub fn to_wire<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(name)) => name,
        _ => String::new(),
    }
}

pub fn from_wire<T: DeserializeOwned>(raw: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(raw.to_string())).ok()
}

/// Draft with one field replaced from a `<select>` change; `None` when the value is not
/// a known variant.
pub fn edit_draft(draft: WidgetSettings, field: &str, raw: &str) -> Option<WidgetSettings> {
    match (draft, field) {
        (WidgetSettings::Feedback { .. }, "aggregationType") => {
            Some(WidgetSettings::Feedback {
                aggregation_type: from_wire(raw)?,
            })
        }
        (WidgetSettings::MemberReport { .. }, "groupBy") => Some(WidgetSettings::MemberReport {
            group_by: from_wire(raw)?,
        }),
        (WidgetSettings::Analytics { display_format, .. }, "analyticsType") => {
            Some(WidgetSettings::Analytics {
                analytics_type: AnalyticsType::from_wire_name(raw)?,
                display_format,
            })
        }
        (WidgetSettings::Analytics { analytics_type, .. }, "displayFormat") => {
            Some(WidgetSettings::Analytics {
                analytics_type,
                display_format: from_wire(raw)?,
            })
        }
        _ => None,
    }
}

#[component]
pub fn SettingsModal(mut builder: Signal<ReportBuilder>) -> Element {
    let Some(session) = builder.read().settings_session().cloned() else {
        return rsx! {};
    };

    let mut update = move |field: &'static str, raw: String| {
        let Some(draft) = builder.read().settings_session().and_then(|s| s.draft) else {
            return;
        };
        match edit_draft(draft, field, &raw) {
            Some(next) => {
                if let Err(err) = builder.write().settings_draft(next) {
                    tracing::warn!(error = %err, "settings draft rejected");
                }
            }
            None => tracing::warn!(field, value = %raw, "unknown settings value ignored"),
        }
    };

    let form = match session.draft {
        None => rsx! {
            p { class: "settings__empty", "This widget has no settings." }
        },
        Some(WidgetSettings::Feedback { aggregation_type }) => rsx! {
            label { class: "settings__field",
                span { "Aggregation" }
                select {
                    value: to_wire(&aggregation_type),
                    onchange: move |evt| update("aggregationType", evt.value()),
                    option { value: to_wire(&FeedbackAggregation::ByEvent), "By event" }
                    option { value: to_wire(&FeedbackAggregation::ByCategory), "By category" }
                }
            }
        },
        Some(WidgetSettings::MemberReport { group_by }) => rsx! {
            label { class: "settings__field",
                span { "Group by" }
                select {
                    value: to_wire(&group_by),
                    onchange: move |evt| update("groupBy", evt.value()),
                    option { value: to_wire(&GroupBy::Day), "Day" }
                    option { value: to_wire(&GroupBy::Week), "Week" }
                    option { value: to_wire(&GroupBy::Month), "Month" }
                }
            }
        },
        Some(WidgetSettings::Analytics {
            analytics_type,
            display_format,
        }) => rsx! {
            label { class: "settings__field",
                span { "Metric" }
                select {
                    value: analytics_type.wire_name(),
                    onchange: move |evt| update("analyticsType", evt.value()),
                    for kind in AnalyticsType::ALL {
                        option { value: kind.wire_name(), {kind.label()} }
                    }
                }
            }
            label { class: "settings__field",
                span { "Display" }
                select {
                    value: to_wire(&display_format),
                    onchange: move |evt| update("displayFormat", evt.value()),
                    option { value: to_wire(&DisplayFormat::Chart), "Chart" }
                    option { value: to_wire(&DisplayFormat::Table), "Table" }
                }
            }
        },
    };

    rsx! {
        div { class: "dialog-backdrop",
            div { class: "dialog dialog--settings", role: "dialog", aria_modal: "true",
                h2 { class: "dialog__title", {t!("settings-title", widget = session.component.label())} }
                {form}
                div { class: "dialog__actions",
                    button {
                        r#type: "button",
                        class: "button button--ghost",
                        onclick: move |_| builder.write().cancel_settings(),
                        {t!("action-cancel")}
                    }
                    button {
                        r#type: "button",
                        class: "button button--primary",
                        onclick: move |_| {
                            if let Err(err) = builder.write().save_settings() {
                                tracing::error!(error = %err, "saving widget settings failed");
                            }
                        },
                        {t!("action-save")}
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        assert_eq!(to_wire(&FeedbackAggregation::ByCategory), "BY_CATEGORY");
        assert_eq!(from_wire::<GroupBy>("MONTH"), Some(GroupBy::Month));
        assert_eq!(from_wire::<GroupBy>("fortnight"), None);
        assert_eq!(to_wire(&AnalyticsType::VtcTime), AnalyticsType::VtcTime.wire_name());
    }

    #[test]
    fn analytics_draft_edits_one_field_at_a_time() {
        let draft = WidgetSettings::Analytics {
            analytics_type: AnalyticsType::SponsorEvents,
            display_format: DisplayFormat::Chart,
        };
        let next = edit_draft(draft, "displayFormat", "TABLE").unwrap();
        assert_eq!(
            next,
            WidgetSettings::Analytics {
                analytics_type: AnalyticsType::SponsorEvents,
                display_format: DisplayFormat::Table,
            }
        );
        let next = edit_draft(next, "analyticsType", AnalyticsType::Retention.wire_name()).unwrap();
        assert!(matches!(
            next,
            WidgetSettings::Analytics { analytics_type: AnalyticsType::Retention, display_format: DisplayFormat::Table }
        ));
    }

    #[test]
    fn foreign_fields_and_values_are_ignored() {
        let draft = WidgetSettings::MemberReport {
            group_by: GroupBy::Day,
        };
        assert_eq!(edit_draft(draft, "aggregationType", "BY_EVENT"), None);
        assert_eq!(edit_draft(draft, "groupBy", "YEAR"), None);

        let analytics = WidgetSettings::Analytics {
            analytics_type: AnalyticsType::VtcTime,
            display_format: DisplayFormat::Chart,
        };
        assert_eq!(edit_draft(analytics, "analyticsType", "vtc_time"), None);
    }
}

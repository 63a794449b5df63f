use dioxus::prelude::*;
use time::OffsetDateTime;

use super::filters::{FilterBar, FilterForm};
use super::views::AnalyticsPanel;
use crate::components::notice::ErrorNotice;
use crate::core::context::AppContext;
use crate::core::widgets::{AnalyticsType, DisplayFormat};
use crate::t;

#[component]
pub fn AnalyticsPage() -> Element {
    let ctx = use_context::<AppContext>();
    let form = use_signal(|| FilterForm::trailing(OffsetDateTime::now_utc().date()));
    let formats = use_signal(|| vec![DisplayFormat::Chart; AnalyticsType::ALL.len()]);

    let query = form().to_query(&ctx.timezone, OffsetDateTime::now_utc());
    let excel_url = query
        .as_ref()
        .ok()
        .map(|q| ctx.api.excel_export_url(q));

    rsx! {
        section { class: "page analytics-page",
            header { class: "page__header",
                h1 { {t!("analytics-title")} }
                {match excel_url {
                    Some(Ok(url)) => rsx! {
                        a { class: "button button--ghost", href: "{url}", download: "", {t!("analytics-excel")} }
                    },
                    Some(Err(err)) => rsx! { ErrorNotice { message: err.user_message() } },
                    None => rsx! {},
                }}
            }

            FilterBar { form, show_sponsor: true }

            if let Ok(query) = query {
                div { class: "analytics-grid",
                    for (idx, analytics_type) in AnalyticsType::ALL.into_iter().enumerate() {
                        AnalyticsCard {
                            key: "{analytics_type.wire_name()}",
                            analytics_type,
                            index: idx,
                            formats,
                            query: query.clone(),
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn AnalyticsCard(
    analytics_type: AnalyticsType,
    index: usize,
    mut formats: Signal<Vec<DisplayFormat>>,
    query: api::AnalyticsQuery,
) -> Element {
    let display_format = formats().get(index).copied().unwrap_or_default();
    let toggle_label = match display_format {
        DisplayFormat::Chart => "Show table",
        DisplayFormat::Table => "Show chart",
    };

    rsx! {
        article { class: "card analytics-card",
            div { class: "card__header",
                h2 { "{analytics_type.label()}" }
                button {
                    r#type: "button",
                    class: "button button--small",
                    onclick: move |_| {
                        if let Some(slot) = formats.write().get_mut(index) {
                            *slot = match *slot {
                                DisplayFormat::Chart => DisplayFormat::Table,
                                DisplayFormat::Table => DisplayFormat::Chart,
                            };
                        }
                    },
                    "{toggle_label}"
                }
            }
            AnalyticsPanel { analytics_type, display_format, query }
        }
    }
}

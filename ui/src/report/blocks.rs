//! Exporting-mode output of each widget as document blocks.

use time::Date;

use crate::analytics::axis::AxisLabelFormat;
use crate::analytics::data::{retention_chart, series_chart, AnalyticsData};
use crate::analytics::sponsor::{SponsorColumnState, NO_EVENTS_MESSAGE};
use crate::analytics::views::value_label;
use crate::core::format::format_count;
use crate::core::widgets::{AnalyticsType, DisplayFormat, WidgetConfig, WidgetKind};
use crate::export::document::{Block, SectionLevel};

use super::data::{WidgetData, WidgetLoad};
use super::tables::{
    analytics_table, cancellation_table, feedback_table, host_table, member_table, TableData,
};

const EMPTY_MESSAGE: &str = "No data for this period";

/// Blocks for one widget: its section heading, then every tab, category and row fully
/// expanded.
pub fn widget_blocks(
    widget: &WidgetConfig,
    load: &WidgetLoad,
    range_start: Date,
    range_end: Date,
) -> Vec<Block> {
    let mut blocks = vec![Block::Heading {
        text: widget.section_title(),
        level: SectionLevel::Widget,
    }];

    let data = match load {
        Ok(data) => data,
        Err(message) => {
            blocks.push(Block::Notice(message.clone()));
            return blocks;
        }
    };

    match (&widget.kind, data) {
        (WidgetKind::Text { content }, _) => {
            blocks.extend(paragraphs(content));
        }
        (WidgetKind::RichText { html }, _) => {
            blocks.extend(paragraphs(&html_to_text(html)));
        }
        (WidgetKind::FileUpload { file_name, mime_type, .. }, _) => {
            blocks.push(match (file_name, mime_type) {
                (Some(name), Some(mime)) => Block::Paragraph(format!("Attached file: {name} ({mime})")),
                (Some(name), None) => Block::Paragraph(format!("Attached file: {name}")),
                _ => Block::Notice("No file attached".into()),
            });
        }
        (WidgetKind::FeedbackTable { .. }, WidgetData::Feedback(report)) => {
            if report.categories.is_empty() {
                blocks.push(Block::Notice(EMPTY_MESSAGE.into()));
            }
            for category in &report.categories {
                blocks.push(Block::Heading {
                    text: category.name.clone(),
                    level: SectionLevel::SubSection,
                });
                blocks.push(table_block(feedback_table(category)));
            }
        }
        (WidgetKind::MemberReportTable { .. }, WidgetData::Members(report)) => {
            blocks.push(table_block(member_table(report)));
        }
        (WidgetKind::HostReportTable {}, WidgetData::Hosts(report)) => {
            blocks.push(table_block(host_table(report)));
        }
        (WidgetKind::EventCancelationsWidget {}, WidgetData::Cancellations(report)) => {
            blocks.push(table_block(cancellation_table(report)));
        }
        (
            WidgetKind::AnalyticsWidget {
                analytics_type,
                display_format,
            },
            WidgetData::Analytics(data),
        ) => {
            let format = AxisLabelFormat::for_range(range_start, range_end);
            match display_format {
                DisplayFormat::Table => blocks.push(table_block(analytics_table(*analytics_type, data))),
                DisplayFormat::Chart => blocks.extend(analytics_chart_blocks(*analytics_type, data, format)),
            }
        }
        (kind, data) => {
            tracing::error!(
                component = kind.component_type().wire_name(),
                data = ?std::mem::discriminant(data),
                "widget data does not match widget type"
            );
            blocks.push(Block::Notice("This widget could not be rendered".into()));
        }
    }

    blocks
}

fn analytics_chart_blocks(
    analytics_type: AnalyticsType,
    data: &AnalyticsData,
    format: AxisLabelFormat,
) -> Vec<Block> {
    match data {
        AnalyticsData::Sponsor(response) => {
            match SponsorColumnState::from_props(
                &response.events,
                response.period_events,
                response.to_date_events,
                false,
                format,
            ) {
                SponsorColumnState::Chart {
                    period_events,
                    to_date_events,
                    data,
                } => vec![
                    Block::Paragraph(format!(
                        "Events this period: {}    Events to date: {}",
                        format_count(u64::from(period_events)),
                        format_count(u64::from(to_date_events))
                    )),
                    Block::Chart(data),
                ],
                SponsorColumnState::Loading | SponsorColumnState::NoEvents => {
                    vec![Block::Notice(NO_EVENTS_MESSAGE.into())]
                }
            }
        }
        AnalyticsData::Series(response) => {
            let chart = series_chart(response, analytics_type, format);
            let mut blocks = Vec::new();
            if let Some(total) = response.total {
                blocks.push(Block::Paragraph(format!(
                    "Total: {}",
                    value_label(analytics_type, total)
                )));
            }
            if chart.is_empty() {
                blocks.push(Block::Notice(EMPTY_MESSAGE.into()));
            } else {
                blocks.push(Block::Chart(chart));
            }
            blocks
        }
        AnalyticsData::Retention(response) => {
            let chart = retention_chart(response);
            if chart.is_empty() {
                vec![Block::Notice(EMPTY_MESSAGE.into())]
            } else {
                vec![Block::Chart(chart)]
            }
        }
    }
}

fn table_block(table: TableData) -> Block {
    if table.is_empty() {
        Block::Notice(EMPTY_MESSAGE.into())
    } else {
        Block::Table {
            columns: table.columns,
            rows: table.rows,
        }
    }
}

fn paragraphs(text: &str) -> Vec<Block> {
    let blocks: Vec<Block> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| Block::Paragraph(p.split_whitespace().collect::<Vec<_>>().join(" ")))
        .collect();
    if blocks.is_empty() {
        vec![Block::Notice("(empty)".into())]
    } else {
        blocks
    }
}

/// Plain text of an HTML fragment: tags dropped, block ends turned into paragraph breaks,
/// the common entities decoded.
pub fn html_to_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut tag = String::new();
    let mut in_tag = false;

    for c in html.chars() {
        match (in_tag, c) {
            (false, '<') => {
                in_tag = true;
                tag.clear();
            }
            (true, '>') => {
                in_tag = false;
                let closing = tag.starts_with('/');
                let name = tag
                    .trim_start_matches('/')
                    .split(|c: char| c.is_whitespace() || c == '/')
                    .next()
                    .unwrap_or("")
                    .to_ascii_lowercase();
                let ends_block = matches!(
                    name.as_str(),
                    "p" | "div" | "li" | "h1" | "h2" | "h3" | "h4" | "tr"
                );
                if (closing && ends_block) || name == "br" {
                    out.push_str("\n\n");
                }
            }
            (true, c) => tag.push(c),
            (false, c) => out.push(c),
        }
    }

    out.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Title block followed by every widget's blocks, in the order given.
pub fn report_blocks<'a>(
    report_name: &str,
    widgets: impl IntoIterator<Item = (&'a WidgetConfig, &'a WidgetLoad)>,
    range_start: Date,
    range_end: Date,
) -> Vec<Block> {
    let title = if report_name.trim().is_empty() {
        "Custom report".to_string()
    } else {
        report_name.trim().to_string()
    };
    let mut blocks = vec![Block::Title(title)];
    for (widget, load) in widgets {
        blocks.extend(widget_blocks(widget, load, range_start, range_end));
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::analytics::SponsorEventsResponse;
    use api::reports::{FeedbackAggregation, FeedbackCategory, FeedbackReport, FeedbackRow};
    use time::macros::date;

    use crate::core::widgets::ComponentType;

    const START: Date = date!(2025 - 01 - 01);
    const END: Date = date!(2025 - 01 - 31);

    fn headings(blocks: &[Block]) -> Vec<(String, SectionLevel)> {
        blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading { text, level } => Some((text.clone(), *level)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn feedback_categories_become_sub_sections() {
        let widget = WidgetConfig {
            i: "widget-1".into(),
            kind: WidgetKind::FeedbackTable {
                aggregation_type: FeedbackAggregation::ByCategory,
            },
        };
        let report = FeedbackReport {
            categories: vec![
                FeedbackCategory {
                    name: "Workshops".into(),
                    rows: vec![FeedbackRow { label: "Intro".into(), responses: 4, average_rating: Some(4.0) }],
                },
                FeedbackCategory { name: "Meetups".into(), rows: vec![] },
            ],
        };

        let blocks = widget_blocks(&widget, &Ok(WidgetData::Feedback(report)), START, END);
        assert_eq!(
            headings(&blocks),
            vec![
                ("Feedback by category".to_string(), SectionLevel::Widget),
                ("Workshops".to_string(), SectionLevel::SubSection),
                ("Meetups".to_string(), SectionLevel::SubSection),
            ]
        );
        assert!(matches!(blocks[2], Block::Table { .. }));
        assert!(matches!(&blocks[4], Block::Notice(m) if m == EMPTY_MESSAGE));
    }

    #[test]
    fn failed_loads_render_the_message() {
        let widget = WidgetConfig::new("w", ComponentType::MemberReportTable);
        let blocks = widget_blocks(&widget, &Err("The request took too long.".into()), START, END);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1], Block::Notice("The request took too long.".into()));
    }

    #[test]
    fn sponsor_chart_without_events_is_a_notice() {
        let widget = WidgetConfig::new("w", ComponentType::AnalyticsWidget);
        assert!(matches!(
            widget.kind,
            WidgetKind::AnalyticsWidget { analytics_type: AnalyticsType::SponsorEvents, .. }
        ));
        let data = AnalyticsData::Sponsor(SponsorEventsResponse {
            events: vec![],
            period_events: Some(0),
            to_date_events: Some(20),
        });
        let blocks = widget_blocks(&widget, &Ok(WidgetData::Analytics(data)), START, END);
        assert_eq!(blocks[1], Block::Notice(NO_EVENTS_MESSAGE.into()));
    }

    #[test]
    fn mismatched_data_is_reported_not_panicked() {
        let widget = WidgetConfig::new("w", ComponentType::HostReportTable);
        let blocks = widget_blocks(&widget, &Ok(WidgetData::Inline), START, END);
        assert!(matches!(blocks.last(), Some(Block::Notice(_))));
    }

    #[test]
    fn rich_text_is_flattened_to_paragraphs() {
        assert_eq!(
            html_to_text("<p>Hello&nbsp;<b>world</b></p><p>A &amp; B</p>"),
            "Hello world\n\nA & B\n\n"
        );
        let widget = WidgetConfig {
            i: "w".into(),
            kind: WidgetKind::RichText {
                html: "<p>One</p><p>Two</p>".into(),
            },
        };
        let blocks = widget_blocks(&widget, &Ok(WidgetData::Inline), START, END);
        assert_eq!(
            &blocks[1..],
            &[Block::Paragraph("One".into()), Block::Paragraph("Two".into())]
        );
    }

    #[test]
    fn report_starts_with_title() {
        let text = WidgetConfig {
            i: "w".into(),
            kind: WidgetKind::Text { content: "Summary\n\nAll good".into() },
        };
        let load: WidgetLoad = Ok(WidgetData::Inline);
        let blocks = report_blocks("  Q1 Review ", [(&text, &load)], START, END);
        assert_eq!(blocks[0], Block::Title("Q1 Review".into()));
        assert_eq!(headings(&blocks), vec![("Summary".to_string(), SectionLevel::Widget)]);
        assert_eq!(blocks[2], Block::Paragraph("Summary".into()));
    }
}

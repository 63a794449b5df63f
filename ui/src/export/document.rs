//! Exporting-mode document model.
//!
//! Widgets in exporting mode produce [`Block`]s: fully expanded, no tabs, no internal
//! pagination. [`layout_document`] stacks them at a fixed capture width and records a
//! [`SectionMarker`] per heading, in document order, with its offset from the top.

use crate::analytics::chart::{bar_layout, BarLayout, StackedData, PALETTE};

use super::fonts::{fit_line, measure, wrap_text, FontWeight};

/// Fixed horizontal size of the capture, in CSS pixels.
pub const CAPTURE_WIDTH_PX: f64 = 1000.0;
pub const PADDING_PX: f64 = 32.0;
const BLOCK_GAP_PX: f64 = 14.0;
const SECTION_GAP_PX: f64 = 28.0;

const TITLE_SIZE: f64 = 30.0;
const HEADING_SIZE: f64 = 22.0;
const SUBHEADING_SIZE: f64 = 17.0;
const BODY_SIZE: f64 = 15.0;
const TABLE_SIZE: f64 = 13.0;
const TABLE_ROW_PX: f64 = 26.0;
const CHART_HEIGHT_PX: f64 = 260.0;
const LEGEND_ROW_PX: f64 = 22.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionLevel {
    /// Top-level widget title.
    Widget,
    /// Nested section such as one feedback category.
    SubSection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionMarker {
    pub title: String,
    pub level: SectionLevel,
    pub offset_px: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Report title; not part of the table of contents.
    Title(String),
    Heading { text: String, level: SectionLevel },
    Paragraph(String),
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Chart(StackedData),
    /// Muted one-line message, e.g. an empty data set or a fetch error.
    Notice(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub lines: Vec<String>,
    pub size: f64,
    pub weight: FontWeight,
    pub line_height: f64,
    /// Baseline offset of the first line from the top of the item.
    pub ascent: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlacedKind {
    Text(TextRun),
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
        column_width: f64,
        row_height: f64,
    },
    Chart {
        layout: BarLayout,
        legend: Vec<(String, &'static str)>,
    },
    Rule,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Placed {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub kind: PlacedKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutDocument {
    pub width: f64,
    pub height: f64,
    pub items: Vec<Placed>,
    pub sections: Vec<SectionMarker>,
}

impl LaidOutDocument {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub fn layout_document(blocks: &[Block]) -> LaidOutDocument {
    let inner = CAPTURE_WIDTH_PX - 2.0 * PADDING_PX;
    let mut cursor = PADDING_PX;
    let mut items = Vec::new();
    let mut sections = Vec::new();

    for (idx, block) in blocks.iter().enumerate() {
        if idx > 0 {
            cursor += match block {
                Block::Heading {
                    level: SectionLevel::Widget,
                    ..
                } => SECTION_GAP_PX,
                _ => BLOCK_GAP_PX,
            };
        }

        match block {
            Block::Title(text) => {
                let run = text_run(text, FontWeight::Bold, TITLE_SIZE, inner, "#111827");
                let height = run_height(&run);
                items.push(placed(cursor, inner, height, PlacedKind::Text(run)));
                cursor += height + 6.0;
                items.push(placed(cursor, inner, 1.0, PlacedKind::Rule));
                cursor += 1.0;
            }
            Block::Heading { text, level } => {
                sections.push(SectionMarker {
                    title: text.clone(),
                    level: *level,
                    offset_px: cursor,
                });
                let (size, weight, color) = match level {
                    SectionLevel::Widget => (HEADING_SIZE, FontWeight::Bold, "#111827"),
                    SectionLevel::SubSection => (SUBHEADING_SIZE, FontWeight::SemiBold, "#374151"),
                };
                let run = text_run(text, weight, size, inner, color);
                let height = run_height(&run);
                items.push(placed(cursor, inner, height, PlacedKind::Text(run)));
                cursor += height;
            }
            Block::Paragraph(text) => {
                let run = text_run(text, FontWeight::Regular, BODY_SIZE, inner, "#1f2937");
                let height = run_height(&run);
                items.push(placed(cursor, inner, height, PlacedKind::Text(run)));
                cursor += height;
            }
            Block::Notice(text) => {
                let run = text_run(text, FontWeight::Regular, BODY_SIZE, inner, "#6b7280");
                let height = run_height(&run);
                items.push(placed(cursor, inner, height, PlacedKind::Text(run)));
                cursor += height;
            }
            Block::Table { columns, rows } => {
                let count = columns.len().max(1) as f64;
                let column_width = inner / count;
                let fit = |cell: &String, weight| {
                    fit_line(cell, weight, TABLE_SIZE, column_width - 12.0)
                };
                let columns: Vec<String> = columns
                    .iter()
                    .map(|c| fit(c, FontWeight::SemiBold))
                    .collect();
                let rows: Vec<Vec<String>> = rows
                    .iter()
                    .map(|row| row.iter().map(|c| fit(c, FontWeight::Regular)).collect())
                    .collect();
                let height = TABLE_ROW_PX * (rows.len() + 1) as f64;
                items.push(placed(
                    cursor,
                    inner,
                    height,
                    PlacedKind::Table {
                        columns,
                        rows,
                        column_width,
                        row_height: TABLE_ROW_PX,
                    },
                ));
                cursor += height;
            }
            Block::Chart(data) => {
                let layout = bar_layout(data, inner, CHART_HEIGHT_PX);
                let legend: Vec<(String, &'static str)> = if data.series.len() > 1 {
                    data.series
                        .iter()
                        .enumerate()
                        .map(|(i, s)| (s.name.clone(), PALETTE[i % PALETTE.len()]))
                        .collect()
                } else {
                    Vec::new()
                };
                let height = CHART_HEIGHT_PX + if legend.is_empty() { 0.0 } else { LEGEND_ROW_PX };
                items.push(placed(cursor, inner, height, PlacedKind::Chart { layout, legend }));
                cursor += height;
            }
        }
    }

    LaidOutDocument {
        width: CAPTURE_WIDTH_PX,
        height: (cursor + PADDING_PX).ceil(),
        items,
        sections,
    }
}

fn placed(y: f64, width: f64, height: f64, kind: PlacedKind) -> Placed {
    Placed {
        x: PADDING_PX,
        y,
        width,
        height,
        kind,
    }
}

fn text_run(text: &str, weight: FontWeight, size: f64, width: f64, color: &'static str) -> TextRun {
    let metrics = measure(weight, size);
    TextRun {
        lines: wrap_text(text, weight, size, width),
        size,
        weight,
        line_height: metrics.line_h,
        ascent: metrics.asc,
        color,
    }
}

fn run_height(run: &TextRun) -> f64 {
    run.line_height * run.lines.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(text: &str, level: SectionLevel) -> Block {
        Block::Heading {
            text: text.into(),
            level,
        }
    }

    #[test]
    fn sections_follow_document_order_with_increasing_offsets() {
        let blocks = vec![
            Block::Title("Quarterly report".into()),
            heading("Feedback by category", SectionLevel::Widget),
            heading("Workshops", SectionLevel::SubSection),
            Block::Table {
                columns: vec!["Event".into(), "Responses".into()],
                rows: vec![vec!["Intro".into(), "12".into()]; 5],
            },
            heading("Socials", SectionLevel::SubSection),
            Block::Notice("No responses".into()),
            heading("Page visits", SectionLevel::Widget),
            Block::Chart(StackedData::default()),
        ];
        let doc = layout_document(&blocks);

        let titles: Vec<&str> = doc.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Feedback by category", "Workshops", "Socials", "Page visits"]
        );
        assert!(doc
            .sections
            .windows(2)
            .all(|pair| pair[0].offset_px < pair[1].offset_px));
        assert_eq!(doc.sections[1].level, SectionLevel::SubSection);
        assert!(doc.height > doc.sections[3].offset_px + CHART_HEIGHT_PX);
        assert_eq!(doc.width, CAPTURE_WIDTH_PX);
    }

    #[test]
    fn empty_document_has_only_padding() {
        let doc = layout_document(&[]);
        assert!(doc.is_empty());
        assert!(doc.sections.is_empty());
        assert_eq!(doc.height, 2.0 * PADDING_PX);
    }

    #[test]
    fn tables_take_one_row_per_record_plus_header() {
        let doc = layout_document(&[Block::Table {
            columns: vec!["A".into()],
            rows: vec![vec!["1".into()], vec!["2".into()]],
        }]);
        assert_eq!(doc.items[0].height, 3.0 * TABLE_ROW_PX);
    }
}

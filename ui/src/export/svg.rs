//! Serialise a laid-out document to one tall SVG.

use std::fmt::Write;

use super::document::{LaidOutDocument, PlacedKind, TextRun};

const FONT_FAMILY: &str = "Inter, Helvetica, Arial, sans-serif";

pub fn document_svg(doc: &LaidOutDocument) -> String {
    let mut out = String::with_capacity(4096 + doc.items.len() * 256);
    let _ = write!(
        out,
        "<svg xmlns='http://www.w3.org/2000/svg' width='{w}' height='{h}' viewBox='0 0 {w} {h}'>\
         <rect width='{w}' height='{h}' fill='#ffffff'/>",
        w = doc.width,
        h = doc.height,
    );

    for item in &doc.items {
        match &item.kind {
            PlacedKind::Text(run) => write_text(&mut out, item.x, item.y, run),
            PlacedKind::Rule => {
                let _ = write!(
                    out,
                    "<rect x='{}' y='{}' width='{}' height='1' fill='#d1d5db'/>",
                    item.x, item.y, item.width
                );
            }
            PlacedKind::Table {
                columns,
                rows,
                column_width,
                row_height,
            } => {
                let _ = write!(
                    out,
                    "<rect x='{}' y='{}' width='{}' height='{}' fill='#f3f4f6'/>",
                    item.x, item.y, item.width, row_height
                );
                write_row(&mut out, item.x, item.y, *column_width, *row_height, columns, 600);
                for (idx, row) in rows.iter().enumerate() {
                    let top = item.y + row_height * (idx + 1) as f64;
                    let _ = write!(
                        out,
                        "<rect x='{}' y='{}' width='{}' height='1' fill='#e5e7eb'/>",
                        item.x, top, item.width
                    );
                    write_row(&mut out, item.x, top, *column_width, *row_height, row, 400);
                }
            }
            PlacedKind::Chart { layout, legend } => {
                let _ = write!(
                    out,
                    "<g transform='translate({} {})'>\
                     <line x1='0' y1='{b}' x2='{w}' y2='{b}' stroke='#9ca3af' stroke-width='1'/>",
                    item.x,
                    item.y,
                    b = layout.baseline,
                    w = layout.width,
                );
                for bar in &layout.bars {
                    let _ = write!(
                        out,
                        "<rect x='{:.2}' y='{:.2}' width='{:.2}' height='{:.2}' fill='{}'/>",
                        bar.x, bar.y, bar.width, bar.height, bar.color
                    );
                }
                for tick in &layout.ticks {
                    let _ = write!(
                        out,
                        "<text x='{:.2}' y='{:.2}' font-family='{FONT_FAMILY}' font-size='11' \
                         fill='#4b5563' text-anchor='middle'>{}</text>",
                        tick.x,
                        layout.baseline + 18.0,
                        escape(&tick.label)
                    );
                }
                let mut legend_x = 0.0;
                let legend_y = layout.height + 16.0;
                for (name, color) in legend {
                    let _ = write!(
                        out,
                        "<rect x='{legend_x:.2}' y='{:.2}' width='10' height='10' fill='{color}'/>\
                         <text x='{:.2}' y='{legend_y:.2}' font-family='{FONT_FAMILY}' font-size='12' \
                         fill='#374151'>{}</text>",
                        legend_y - 9.0,
                        legend_x + 14.0,
                        escape(name)
                    );
                    legend_x += 24.0 + name.chars().count() as f64 * 7.0;
                }
                out.push_str("</g>");
            }
        }
    }

    out.push_str("</svg>");
    out
}

fn write_text(out: &mut String, x: f64, y: f64, run: &TextRun) {
    for (idx, line) in run.lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let baseline = y + run.ascent + run.line_height * idx as f64;
        let _ = write!(
            out,
            "<text x='{x:.2}' y='{baseline:.2}' font-family='{FONT_FAMILY}' font-size='{}' \
             font-weight='{}' fill='{}'>{}</text>",
            run.size,
            run.weight.css_weight(),
            run.color,
            escape(line)
        );
    }
}

fn write_row(
    out: &mut String,
    x: f64,
    y: f64,
    column_width: f64,
    row_height: f64,
    cells: &[String],
    weight: u16,
) {
    for (idx, cell) in cells.iter().enumerate() {
        let _ = write!(
            out,
            "<text x='{:.2}' y='{:.2}' font-family='{FONT_FAMILY}' font-size='13' \
             font-weight='{weight}' fill='#111827'>{}</text>",
            x + column_width * idx as f64 + 6.0,
            y + row_height * 0.66,
            escape(cell)
        );
    }
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::document::{layout_document, Block, SectionLevel};

    #[test]
    fn svg_has_document_size_and_escaped_text() {
        let doc = layout_document(&[
            Block::Heading {
                text: "Hosts & <guests>".into(),
                level: SectionLevel::Widget,
            },
            Block::Paragraph("O'Brien".into()),
        ]);
        let svg = document_svg(&doc);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(&format!("height='{}'", doc.height)));
        assert!(svg.contains("Hosts &amp; &lt;guests&gt;"));
        assert!(svg.contains("O&apos;Brien"));
        assert!(svg.ends_with("</svg>"));
    }
}

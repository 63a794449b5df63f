//! Report export: lay out the exporting-mode render, rasterize it once, paginate it and
//! write a PDF with a linked table of contents (or a single tall PNG).

pub mod deliver;
pub mod document;
pub mod fonts;
pub mod paginate;
pub mod pdf;
pub mod raster;
pub mod svg;

use time::OffsetDateTime;

use crate::core::format::slugify;

use self::document::{layout_document, Block, LaidOutDocument};
use self::paginate::{ExportPlan, PageGeometry};
use self::pdf::{write_pdf, PdfLabels};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("there is nothing to export yet")]
    EmptyCapture,

    #[error("failed to rasterize the report: {0}")]
    Raster(String),

    #[error("the table of contents needs {needed} page(s) but only {reserved} were reserved")]
    TocOverflow { needed: usize, reserved: usize },

    #[error("failed to write the PDF: {0}")]
    Pdf(String),

    #[error("failed to encode the PNG: {0}")]
    Png(String),

    #[error("failed to save {file}: {reason}")]
    Delivery { file: String, reason: String },
}

/// Output file name for a report, e.g. `q3-sponsors-20250401_093000.pdf`.
pub fn export_file_name(report_name: &str, extension: &str, at: OffsetDateTime) -> String {
    use time::macros::format_description;

    let slug = match slugify(report_name) {
        s if s.is_empty() => "report".to_string(),
        s => s,
    };
    let stamp = at
        .format(&format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))
        .unwrap_or_else(|_| "export".into());
    format!("{slug}-{stamp}.{extension}")
}

/// A finished export, ready for [`deliver::download_bytes`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Lay out the exporting-mode blocks and serialise them to one tall SVG.
fn capture(blocks: &[Block]) -> Result<(LaidOutDocument, String), ExportError> {
    let doc = layout_document(blocks);
    if doc.is_empty() {
        return Err(ExportError::EmptyCapture);
    }
    tracing::info!(
        sections = doc.sections.len(),
        height_px = doc.height,
        "export capture laid out"
    );
    let svg = svg::document_svg(&doc);
    Ok((doc, svg))
}

/// Rasterize once, paginate, and write the PDF with its table of contents.
pub async fn build_pdf(
    blocks: &[Block],
    title: &str,
    contents_heading: &str,
    at: OffsetDateTime,
) -> Result<ExportedFile, ExportError> {
    let (doc, svg) = capture(blocks)?;
    let image = raster::rasterize(svg, doc.width.round() as u32, doc.height.round() as u32).await?;
    tracing::info!(width = image.width, height = image.height, "export rasterized");

    let plan = ExportPlan::build(image.width, image.height, &doc.sections, PageGeometry::A4)?;
    tracing::debug!(
        content_height_mm = plan.content_height_mm,
        pages = plan.content_pages(),
        "export planned"
    );
    let bytes = write_pdf(
        &plan,
        &image,
        PdfLabels {
            title,
            contents_heading,
        },
    )?;
    Ok(ExportedFile {
        file_name: export_file_name(title, "pdf", at),
        mime: deliver::PDF_MIME,
        bytes,
    })
}

/// The whole capture as a single tall PNG.
pub async fn build_png(blocks: &[Block], title: &str, at: OffsetDateTime) -> Result<ExportedFile, ExportError> {
    let (doc, svg) = capture(blocks)?;
    let bytes = raster::render_png(svg, doc.width.round() as u32, doc.height.round() as u32).await?;
    tracing::info!(bytes = bytes.len(), "png export encoded");
    Ok(ExportedFile {
        file_name: export_file_name(title, "png", at),
        mime: deliver::PNG_MIME,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn file_name_is_slugged_from_report_name() {
        let at = datetime!(2025-04-01 9:30 UTC);
        assert_eq!(
            export_file_name("Q3 Sponsors", "pdf", at),
            "q3-sponsors-20250401_093000.pdf"
        );
        assert_eq!(export_file_name("", "png", at), "report-20250401_093000.png");
    }

    #[test]
    fn empty_report_cannot_be_captured() {
        assert!(matches!(capture(&[]), Err(ExportError::EmptyCapture)));
    }

    #[test]
    fn capture_produces_svg_at_capture_width() {
        let blocks = vec![
            Block::Title("Report".into()),
            Block::Heading {
                text: "Hosts".into(),
                level: document::SectionLevel::Widget,
            },
            Block::Paragraph("Body".into()),
        ];
        let (doc, svg) = capture(&blocks).unwrap();
        assert_eq!(doc.sections.len(), 1);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Hosts"));
    }
}

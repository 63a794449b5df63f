//! PDF assembly with `lopdf`: reserved table-of-contents pages first, then one image page
//! per capture slice. TOC lines carry link annotations to their section's page and offset.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::paginate::{ExportPlan, TocEntry, TOC_METRICS};
use super::raster::RasterImage;
use super::ExportError;

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";
const IMAGE_NAME: &str = "Im0";

fn pt(mm: f64) -> f64 {
    mm * 72.0 / 25.4
}

fn real(v: f64) -> Object {
    Object::Real(v as f32)
}

/// Helvetica is WinAnsi-encoded; anything outside Latin-1 prints as `?`.
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Rough Helvetica advance, enough to right-align page numbers.
fn approx_width_pt(text: &str, size_pt: f64) -> f64 {
    text.chars().count() as f64 * size_pt * 0.556
}

fn pdf_err(err: lopdf::Error) -> ExportError {
    ExportError::Pdf(err.to_string())
}

/// Labels printed on the generated pages.
#[derive(Debug, Clone, Copy)]
pub struct PdfLabels<'a> {
    pub title: &'a str,
    pub contents_heading: &'a str,
}

pub fn write_pdf(plan: &ExportPlan, image: &RasterImage, labels: PdfLabels<'_>) -> Result<Vec<u8>, ExportError> {
    if plan.slices.is_empty() {
        return Err(ExportError::EmptyCapture);
    }

    let geometry = plan.geometry;
    let page_w = pt(geometry.width_mm);
    let page_h = pt(geometry.height_mm);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_ids: Vec<ObjectId> = (0..plan.total_pages()).map(|_| doc.new_object_id()).collect();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let fonts = dictionary! {
        FONT_REGULAR => regular,
        FONT_BOLD => bold,
    };

    // Table of contents.
    for toc_page in 1..=plan.toc.reserved_pages {
        let entries: Vec<&TocEntry> = plan
            .toc
            .entries
            .iter()
            .filter(|e| e.slot.page == toc_page)
            .collect();

        let mut ops = Vec::new();
        if toc_page == 1 {
            push_text(
                &mut ops,
                FONT_BOLD,
                TOC_METRICS.heading_size_pt,
                pt(geometry.margin_x_mm),
                page_h - pt(geometry.margin_top_mm) - TOC_METRICS.heading_size_pt,
                labels.contents_heading,
            );
        }

        let mut annots = Vec::with_capacity(entries.len());
        let right = page_w - pt(geometry.margin_x_mm);
        for entry in entries {
            let size = TOC_METRICS.font_size_pt(entry.level);
            let line_h = pt(TOC_METRICS.line_height_mm(entry.level));
            let top = page_h - pt(entry.slot.y_mm);
            let baseline = top - line_h * 0.75;
            let font = match entry.level {
                super::document::SectionLevel::Widget => FONT_BOLD,
                super::document::SectionLevel::SubSection => FONT_REGULAR,
            };
            let x = pt(entry.slot.x_mm);
            push_text(&mut ops, font, size, x, baseline, &entry.title);

            let number = entry.target.page.to_string();
            push_text(
                &mut ops,
                FONT_REGULAR,
                size,
                right - approx_width_pt(&number, size),
                baseline,
                &number,
            );

            let Some(&target_id) = page_ids.get(entry.target.page - 1) else {
                return Err(ExportError::Pdf(format!(
                    "link target page {} does not exist",
                    entry.target.page
                )));
            };
            let dest_top = page_h - pt(entry.target.y_mm);
            annots.push(Object::Reference(doc.add_object(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Link",
                "Rect" => vec![real(x), real(top - line_h), real(right), real(top)],
                "Border" => vec![0.into(), 0.into(), 0.into()],
                "Dest" => vec![
                    Object::Reference(target_id),
                    "XYZ".into(),
                    real(pt(geometry.margin_x_mm)),
                    real(dest_top),
                    Object::Null,
                ],
            })));
        }

        let content = Content { operations: ops }.encode().map_err(pdf_err)?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), real(page_w), real(page_h)],
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => fonts.clone() },
        };
        if !annots.is_empty() {
            page.set("Annots", annots);
        }
        doc.objects.insert(page_ids[toc_page - 1], Object::Dictionary(page));
    }

    // Content pages.
    for slice in &plan.slices {
        let rgb = image.rgb_rows(slice.src_y_px, slice.src_height_px);
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(image.width),
                "Height" => i64::from(slice.src_height_px),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            rgb,
        ));

        let w = pt(geometry.content_width_mm());
        let h = pt(slice.dest_height_mm);
        let x = pt(geometry.margin_x_mm);
        let y = page_h - pt(geometry.margin_top_mm) - h;
        let ops = vec![
            Operation::new("q", vec![]),
            Operation::new("cm", vec![real(w), 0.into(), 0.into(), real(h), real(x), real(y)]),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ];
        let content = Content { operations: ops }.encode().map_err(pdf_err)?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));

        let index = plan.toc.reserved_pages + slice.page - 1;
        doc.objects.insert(
            page_ids[index],
            Object::Dictionary(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), real(page_w), real(page_h)],
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => fonts.clone(),
                    "XObject" => dictionary! { IMAGE_NAME => image_id },
                },
            }),
        );
    }

    let kids: Vec<Object> = page_ids.iter().copied().map(Object::Reference).collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(latin1(labels.title)),
        "Producer" => Object::string_literal("Pulseboard"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    doc.compress();
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(|e| ExportError::Pdf(e.to_string()))?;

    tracing::info!(pages = page_ids.len(), bytes = bytes.len(), "pdf written");
    Ok(bytes)
}

fn push_text(ops: &mut Vec<Operation>, font: &str, size: f64, x: f64, y: f64, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(font.as_bytes().to_vec()), real(size)],
    ));
    ops.push(Operation::new("Td", vec![real(x), real(y)]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(latin1(text), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::document::{SectionLevel, SectionMarker};
    use crate::export::paginate::PageGeometry;

    const LABELS: PdfLabels<'static> = PdfLabels {
        title: "Quarterly Report",
        contents_heading: "Contents",
    };

    fn white(width: u32, height: u32) -> RasterImage {
        RasterImage::new(width, height, vec![255; (width * height * 4) as usize]).unwrap()
    }

    fn marker(title: &str, offset_px: f64) -> SectionMarker {
        SectionMarker {
            title: title.into(),
            level: SectionLevel::Widget,
            offset_px,
        }
    }

    #[test]
    fn latin1_replaces_wide_characters() {
        assert_eq!(latin1("Café ✓"), vec![b'C', b'a', b'f', 0xE9, b' ', b'?']);
    }

    #[test]
    fn page_count_includes_reserved_toc_pages() {
        let sections = vec![marker("Feedback", 10.0), marker("Hosts", 300.0)];
        let plan = ExportPlan::build(100, 400, &sections, PageGeometry::A4).unwrap();
        // 100px wide at 190mm: 1.9mm per px, so 400px spans three pages.
        assert_eq!(plan.content_pages(), 3);
        let image = white(100, 400);

        let bytes = write_pdf(&plan, &image, LABELS).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), plan.total_pages());
        assert_eq!(plan.total_pages(), 4);
    }

    #[test]
    fn toc_links_point_at_section_pages() {
        let sections = vec![marker("Feedback", 10.0), marker("Hosts", 200.0)];
        let plan = ExportPlan::build(100, 400, &sections, PageGeometry::A4).unwrap();
        let bytes = write_pdf(&plan, &white(100, 400), LABELS).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        let toc_page = pages[&1];
        let annots = doc
            .get_object(toc_page)
            .and_then(Object::as_dict)
            .and_then(|d| d.get(b"Annots"))
            .and_then(Object::as_array)
            .unwrap();
        assert_eq!(annots.len(), 2);

        for (annot, entry) in annots.iter().zip(&plan.toc.entries) {
            let dict = doc
                .dereference(annot)
                .and_then(|(_, obj)| obj.as_dict())
                .unwrap();
            let dest = dict.get(b"Dest").and_then(Object::as_array).unwrap();
            let target = dest[0].as_reference().unwrap();
            assert_eq!(target, pages[&(entry.target.page as u32)]);
        }
    }

    #[test]
    fn missing_slices_are_rejected() {
        let mut plan = ExportPlan::build(100, 10, &[], PageGeometry::A4).unwrap();
        plan.slices.clear();
        assert!(matches!(
            write_pdf(&plan, &white(100, 10), LABELS),
            Err(ExportError::EmptyCapture)
        ));
    }
}

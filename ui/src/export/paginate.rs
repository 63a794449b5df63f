//! Pagination of the single tall capture, and table-of-contents planning.
//!
//! All positions here are in millimetres on an A4 page unless a name says `_px`. The
//! capture's pixel space maps to page space through the fixed content width:
//! `mm = px * content_width_mm / image_width_px`.
//!
//! The table of contents is laid out by one routine, [`flow_toc`], driven by one set of
//! [`TocMetrics`]. Estimation and rendering both call it, so the reserved page count and
//! the pages the entries land on cannot disagree; [`plan_toc`] still refuses to place a
//! line beyond the reservation.

use super::document::{SectionLevel, SectionMarker};
use super::ExportError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f64,
    pub height_mm: f64,
    pub margin_top_mm: f64,
    pub margin_bottom_mm: f64,
    pub margin_x_mm: f64,
}

impl PageGeometry {
    pub const A4: PageGeometry = PageGeometry {
        width_mm: 210.0,
        height_mm: 297.0,
        margin_top_mm: 12.0,
        margin_bottom_mm: 12.0,
        margin_x_mm: 10.0,
    };

    pub fn content_width_mm(&self) -> f64 {
        self.width_mm - 2.0 * self.margin_x_mm
    }

    /// Page height minus top and bottom margins.
    pub fn usable_height_mm(&self) -> f64 {
        self.height_mm - self.margin_top_mm - self.margin_bottom_mm
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// A point on an output page. `page` is 1-based; `y_mm` is measured from the page top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagePosition {
    pub page: usize,
    pub y_mm: f64,
}

/// Page and in-page offset of a content offset, by repeatedly subtracting one page's
/// usable height. An offset exactly on a boundary starts the next page at its top margin.
pub fn locate_offset(offset_mm: f64, geometry: &PageGeometry) -> PagePosition {
    let usable = geometry.usable_height_mm();
    let mut remaining = offset_mm.max(0.0);
    let mut page = 1;
    while remaining >= usable {
        remaining -= usable;
        page += 1;
    }
    PagePosition {
        page,
        y_mm: geometry.margin_top_mm + remaining,
    }
}

/// One content page's chunk of the capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSlice {
    /// 1-based content page number (before TOC pages are inserted).
    pub page: usize,
    pub src_y_px: u32,
    pub src_height_px: u32,
    pub dest_height_mm: f64,
}

/// Cut a capture of `image_height_px` rows into page-sized chunks.
pub fn slice_pages(image_height_px: u32, scale_mm_per_px: f64, geometry: &PageGeometry) -> Vec<PageSlice> {
    let page_px = geometry.usable_height_mm() / scale_mm_per_px;
    let mut slices = Vec::new();
    let mut page = 1;
    let mut top = 0u32;
    while top < image_height_px {
        let bottom = ((page as f64 * page_px).round() as u32).clamp(top + 1, image_height_px);
        let rows = bottom - top;
        slices.push(PageSlice {
            page,
            src_y_px: top,
            src_height_px: rows,
            dest_height_mm: f64::from(rows) * scale_mm_per_px,
        });
        top = bottom;
        page += 1;
    }
    slices
}

/// Table-of-contents typography, shared by estimation and rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TocMetrics {
    /// Space taken by the "Contents" heading on the first TOC page.
    pub heading_block_mm: f64,
    pub heading_size_pt: f64,
    pub entry_line_mm: f64,
    pub entry_size_pt: f64,
    pub sub_line_mm: f64,
    pub sub_size_pt: f64,
    pub sub_indent_mm: f64,
    /// Titles are cut to one line of at most this many characters.
    pub entry_max_chars: usize,
    pub sub_max_chars: usize,
}

pub const TOC_METRICS: TocMetrics = TocMetrics {
    heading_block_mm: 16.0,
    heading_size_pt: 18.0,
    entry_line_mm: 8.0,
    entry_size_pt: 12.0,
    sub_line_mm: 6.5,
    sub_size_pt: 10.0,
    sub_indent_mm: 8.0,
    entry_max_chars: 80,
    sub_max_chars: 84,
};

impl TocMetrics {
    pub fn line_height_mm(&self, level: SectionLevel) -> f64 {
        match level {
            SectionLevel::Widget => self.entry_line_mm,
            SectionLevel::SubSection => self.sub_line_mm,
        }
    }

    pub fn indent_mm(&self, level: SectionLevel) -> f64 {
        match level {
            SectionLevel::Widget => 0.0,
            SectionLevel::SubSection => self.sub_indent_mm,
        }
    }

    pub fn font_size_pt(&self, level: SectionLevel) -> f64 {
        match level {
            SectionLevel::Widget => self.entry_size_pt,
            SectionLevel::SubSection => self.sub_size_pt,
        }
    }

    pub fn max_chars(&self, level: SectionLevel) -> usize {
        match level {
            SectionLevel::Widget => self.entry_max_chars,
            SectionLevel::SubSection => self.sub_max_chars,
        }
    }
}

/// Where one TOC line sits. `page` is the 1-based TOC page; `y_mm` is the top of the line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TocSlot {
    pub page: usize,
    pub y_mm: f64,
    pub x_mm: f64,
}

/// Lay TOC lines out top to bottom; a line that does not fit moves to the next page.
pub fn flow_toc(levels: &[SectionLevel], geometry: &PageGeometry, metrics: &TocMetrics) -> Vec<TocSlot> {
    let bottom = geometry.height_mm - geometry.margin_bottom_mm;
    let mut page = 1;
    let mut y = geometry.margin_top_mm + metrics.heading_block_mm;
    let mut slots = Vec::with_capacity(levels.len());

    for level in levels {
        let height = metrics.line_height_mm(*level);
        if y + height > bottom {
            page += 1;
            y = geometry.margin_top_mm;
        }
        slots.push(TocSlot {
            page,
            y_mm: y,
            x_mm: geometry.margin_x_mm + metrics.indent_mm(*level),
        });
        y += height;
    }
    slots
}

/// TOC pages to reserve ahead of the content. Zero when there are no sections.
pub fn estimate_toc_pages(sections: &[SectionMarker], geometry: &PageGeometry, metrics: &TocMetrics) -> usize {
    let levels: Vec<SectionLevel> = sections.iter().map(|s| s.level).collect();
    flow_toc(&levels, geometry, metrics)
        .last()
        .map(|slot| slot.page)
        .unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    pub title: String,
    pub level: SectionLevel,
    pub slot: TocSlot,
    /// Content page the section starts on, before TOC pages are inserted.
    pub content_page: usize,
    /// Link destination in the final document: `content_page + reserved_pages`.
    pub target: PagePosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TocPlan {
    pub reserved_pages: usize,
    pub entries: Vec<TocEntry>,
}

/// Render-side TOC layout against a fixed reservation.
pub fn plan_toc(
    sections: &[(SectionMarker, PagePosition)],
    reserved_pages: usize,
    geometry: &PageGeometry,
    metrics: &TocMetrics,
) -> Result<TocPlan, ExportError> {
    let levels: Vec<SectionLevel> = sections.iter().map(|(s, _)| s.level).collect();
    let slots = flow_toc(&levels, geometry, metrics);

    if let Some(needed) = slots.last().map(|slot| slot.page) {
        if needed > reserved_pages {
            tracing::error!(needed, reserved = reserved_pages, "table of contents overflow");
            return Err(ExportError::TocOverflow {
                needed,
                reserved: reserved_pages,
            });
        }
    }

    let entries = sections
        .iter()
        .zip(slots)
        .map(|((marker, position), slot)| TocEntry {
            title: one_line(&marker.title, metrics.max_chars(marker.level)),
            level: marker.level,
            slot,
            content_page: position.page,
            target: PagePosition {
                page: position.page + reserved_pages,
                y_mm: position.y_mm,
            },
        })
        .collect();

    Ok(TocPlan {
        reserved_pages,
        entries,
    })
}

fn one_line(title: &str, max_chars: usize) -> String {
    let flat = title.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let mut out: String = flat.chars().take(max_chars.saturating_sub(3)).collect();
        out.push_str("...");
        out
    }
}

/// Everything needed to write the PDF for one capture.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPlan {
    pub geometry: PageGeometry,
    pub scale_mm_per_px: f64,
    pub content_height_mm: f64,
    pub slices: Vec<PageSlice>,
    pub toc: TocPlan,
}

impl ExportPlan {
    pub fn build(
        image_width_px: u32,
        image_height_px: u32,
        sections: &[SectionMarker],
        geometry: PageGeometry,
    ) -> Result<Self, ExportError> {
        if image_width_px == 0 || image_height_px == 0 {
            return Err(ExportError::EmptyCapture);
        }

        let content_width = geometry.content_width_mm();
        let scale = content_width / f64::from(image_width_px);
        let content_height_mm = f64::from(image_height_px) * content_width / f64::from(image_width_px);
        let slices = slice_pages(image_height_px, scale, &geometry);

        let located: Vec<(SectionMarker, PagePosition)> = sections
            .iter()
            .map(|marker| (marker.clone(), locate_offset(marker.offset_px * scale, &geometry)))
            .collect();

        let reserved = estimate_toc_pages(sections, &geometry, &TOC_METRICS);
        let toc = plan_toc(&located, reserved, &geometry, &TOC_METRICS)?;

        tracing::info!(
            content_pages = slices.len(),
            toc_pages = reserved,
            sections = sections.len(),
            "export paginated"
        );

        Ok(Self {
            geometry,
            scale_mm_per_px: scale,
            content_height_mm,
            slices,
            toc,
        })
    }

    pub fn content_pages(&self) -> usize {
        self.slices.len()
    }

    pub fn total_pages(&self) -> usize {
        self.toc.reserved_pages + self.slices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GEOMETRY: PageGeometry = PageGeometry::A4;

    fn marker(title: &str, level: SectionLevel, offset_px: f64) -> SectionMarker {
        SectionMarker {
            title: title.into(),
            level,
            offset_px,
        }
    }

    /// Pixels per content page at a 1000px capture width.
    fn page_px() -> f64 {
        GEOMETRY.usable_height_mm() / (GEOMETRY.content_width_mm() / 1000.0)
    }

    #[test]
    fn offsets_inside_first_page_stay_there() {
        let pos = locate_offset(100.0, &GEOMETRY);
        assert_eq!(pos.page, 1);
        assert!((pos.y_mm - 112.0).abs() < 1e-9);
    }

    #[test]
    fn boundary_offset_rounds_to_next_page_top() {
        let usable = GEOMETRY.usable_height_mm();
        let pos = locate_offset(usable, &GEOMETRY);
        assert_eq!(pos.page, 2);
        assert_eq!(pos.y_mm, GEOMETRY.margin_top_mm);

        let pos = locate_offset(usable * 2.0, &GEOMETRY);
        assert_eq!(pos.page, 3);
        assert_eq!(pos.y_mm, GEOMETRY.margin_top_mm);
    }

    #[test]
    fn slices_cover_the_capture_exactly_once() {
        let scale = GEOMETRY.content_width_mm() / 1000.0;
        let slices = slice_pages(4000, scale, &GEOMETRY);
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].src_y_px, 0);
        for pair in slices.windows(2) {
            assert_eq!(pair[0].src_y_px + pair[0].src_height_px, pair[1].src_y_px);
        }
        let last = slices.last().unwrap();
        assert_eq!(last.src_y_px + last.src_height_px, 4000);
        assert!(slices[0].dest_height_mm <= GEOMETRY.usable_height_mm() + 0.2);
    }

    #[test]
    fn three_page_capture_links_account_for_toc_pages() {
        let height = (page_px() * 2.5) as u32;
        let sections = vec![
            marker("Feedback", SectionLevel::Widget, 40.0),
            marker("Workshops", SectionLevel::SubSection, 120.0),
            marker("Members", SectionLevel::Widget, page_px() + 10.0),
            marker("Hosts", SectionLevel::Widget, page_px() * 2.0 + 50.0),
        ];

        let plan = ExportPlan::build(1000, height, &sections, GEOMETRY).unwrap();
        assert_eq!(plan.content_pages(), 3);

        let estimated = estimate_toc_pages(&sections, &GEOMETRY, &TOC_METRICS);
        assert_eq!(plan.toc.reserved_pages, estimated);
        assert_eq!(estimated, 1);
        assert!(plan
            .toc
            .entries
            .iter()
            .all(|e| e.slot.page <= plan.toc.reserved_pages));

        let content_pages: Vec<usize> = plan.toc.entries.iter().map(|e| e.content_page).collect();
        assert_eq!(content_pages, vec![1, 1, 2, 3]);
        for entry in &plan.toc.entries {
            assert_eq!(entry.target.page, entry.content_page + plan.toc.reserved_pages);
        }
        assert_eq!(plan.total_pages(), 4);
    }

    #[test]
    fn long_tocs_reserve_more_pages_and_still_agree() {
        let sections: Vec<SectionMarker> = (0..120)
            .map(|i| {
                let level = if i % 3 == 0 {
                    SectionLevel::Widget
                } else {
                    SectionLevel::SubSection
                };
                marker(&format!("Section {i}"), level, i as f64 * 30.0)
            })
            .collect();
        let height = (page_px() * 2.5) as u32;
        let plan = ExportPlan::build(1000, height, &sections, GEOMETRY).unwrap();

        assert!(plan.toc.reserved_pages > 1);
        let last_slot_page = plan.toc.entries.iter().map(|e| e.slot.page).max().unwrap();
        assert_eq!(last_slot_page, plan.toc.reserved_pages);
        for entry in &plan.toc.entries {
            assert_eq!(entry.target.page, entry.content_page + plan.toc.reserved_pages);
        }
    }

    #[test]
    fn under_reservation_fails_fast() {
        let sections: Vec<(SectionMarker, PagePosition)> = (0..80)
            .map(|i| {
                (
                    marker("Entry", SectionLevel::Widget, 0.0),
                    PagePosition { page: 1, y_mm: 12.0 + i as f64 },
                )
            })
            .collect();
        let err = plan_toc(&sections, 1, &GEOMETRY, &TOC_METRICS).unwrap_err();
        assert!(matches!(err, ExportError::TocOverflow { reserved: 1, needed } if needed > 1));
    }

    #[test]
    fn sub_entries_are_indented_and_tighter() {
        let slots = flow_toc(
            &[SectionLevel::Widget, SectionLevel::SubSection, SectionLevel::Widget],
            &GEOMETRY,
            &TOC_METRICS,
        );
        assert!(slots[1].x_mm > slots[0].x_mm);
        let first_gap = slots[1].y_mm - slots[0].y_mm;
        let second_gap = slots[2].y_mm - slots[1].y_mm;
        assert_eq!(first_gap, TOC_METRICS.entry_line_mm);
        assert_eq!(second_gap, TOC_METRICS.sub_line_mm);
    }

    #[test]
    fn titles_are_cut_to_one_line() {
        let long = "word ".repeat(40);
        let cut = one_line(&long, 20);
        assert_eq!(cut.chars().count(), 20);
        assert!(cut.ends_with("..."));
        assert_eq!(one_line("Two\nlines", 20), "Two lines");
    }

    #[test]
    fn empty_capture_is_rejected() {
        assert!(matches!(
            ExportPlan::build(1000, 0, &[], GEOMETRY),
            Err(ExportError::EmptyCapture)
        ));
    }

    #[test]
    fn no_sections_means_no_toc_pages() {
        let plan = ExportPlan::build(1000, 500, &[], GEOMETRY).unwrap();
        assert_eq!(plan.toc.reserved_pages, 0);
        assert_eq!(plan.total_pages(), 1);
    }
}

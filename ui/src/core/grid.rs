//! Grid geometry for the report builder.
//!
//! Coordinates are grid units: `x`/`w` in columns of a [`GRID_COLUMNS`]-wide grid,
//! `y`/`h` in rows of [`ROW_HEIGHT_PX`] pixels.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const GRID_COLUMNS: u32 = 12;
pub const DEFAULT_CELL_WIDTH: u32 = 6;
pub const DEFAULT_CELL_HEIGHT: u32 = 4;
pub const ROW_HEIGHT_PX: u32 = 60;

/// Breakpoint whose layout list is derived from the cells themselves.
pub const PRIMARY_BREAKPOINT: &str = "lg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LayoutRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl LayoutRect {
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }
}

/// One placed rectangle in the report grid, optionally hosting a widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub id: String,
    pub layout: LayoutRect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget_id: Option<String>,
}

impl GridCell {
    pub fn is_empty(&self) -> bool {
        self.widget_id.is_none()
    }

    pub fn layout_item(&self) -> LayoutItem {
        LayoutItem::from_rect(&self.id, self.layout)
    }
}

/// Layout-engine item; `i` is the cell id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutItem {
    pub i: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl LayoutItem {
    pub fn from_rect(id: &str, rect: LayoutRect) -> Self {
        Self {
            i: id.to_string(),
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
        }
    }

    pub fn rect(&self) -> LayoutRect {
        LayoutRect {
            x: self.x,
            y: self.y,
            w: self.w,
            h: self.h,
        }
    }
}

pub type BreakpointLayouts = BTreeMap<String, Vec<LayoutItem>>;

/// Slot for the next added cell: fill the current row left to right, wrap every
/// `GRID_COLUMNS / DEFAULT_CELL_WIDTH` cells onto a row below everything placed so far.
pub fn next_placement(cells: &[GridCell]) -> LayoutRect {
    let index = cells.len() as u32;
    let x = (index * DEFAULT_CELL_WIDTH) % GRID_COLUMNS;

    let y = if x == 0 {
        cells.iter().map(|c| c.layout.bottom()).max().unwrap_or(0)
    } else {
        cells.last().map(|c| c.layout.y).unwrap_or(0)
    };

    LayoutRect {
        x,
        y,
        w: DEFAULT_CELL_WIDTH,
        h: DEFAULT_CELL_HEIGHT,
    }
}

/// Cells in visual reading order: top to bottom, then left to right.
pub fn reading_order(cells: &[GridCell]) -> Vec<&GridCell> {
    let mut ordered: Vec<&GridCell> = cells.iter().collect();
    ordered.sort_by_key(|c| (c.layout.y, c.layout.x));
    ordered
}

/// One step of a move or resize issued from the cell toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nudge {
    Left,
    Right,
    Up,
    Down,
    Wider,
    Narrower,
    Taller,
    Shorter,
}

/// `rect` moved or resized by one grid unit, kept inside the grid and at least 1x1.
pub fn nudge(rect: LayoutRect, step: Nudge) -> LayoutRect {
    let mut next = rect;
    match step {
        Nudge::Left => next.x = rect.x.saturating_sub(1),
        Nudge::Right => next.x = (rect.x + 1).min(GRID_COLUMNS - rect.w.min(GRID_COLUMNS)).max(rect.x),
        Nudge::Up => next.y = rect.y.saturating_sub(1),
        Nudge::Down => next.y = rect.y + 1,
        Nudge::Wider => next.w = (rect.w + 1).min(GRID_COLUMNS - rect.x.min(GRID_COLUMNS - 1)),
        Nudge::Narrower => next.w = rect.w.saturating_sub(1).max(1),
        Nudge::Taller => next.h = rect.h + 1,
        Nudge::Shorter => next.h = rect.h.saturating_sub(1).max(1),
    }
    next
}

/// Layout-engine report after nudging one cell: every cell's item, for the primary
/// breakpoint.
pub fn nudged_layout(cells: &[GridCell], cell_id: &str, step: Nudge) -> Vec<LayoutItem> {
    cells
        .iter()
        .map(|cell| {
            if cell.id == cell_id {
                LayoutItem::from_rect(&cell.id, nudge(cell.layout, step))
            } else {
                cell.layout_item()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(id: &str, layout: LayoutRect) -> GridCell {
        GridCell {
            id: id.into(),
            layout,
            widget_id: None,
        }
    }

    #[test]
    fn placement_fills_row_then_wraps() {
        let mut cells = Vec::new();
        let first = next_placement(&cells);
        assert_eq!((first.x, first.y), (0, 0));
        cells.push(cell("a", first));

        let second = next_placement(&cells);
        assert_eq!((second.x, second.y), (6, 0));
        cells.push(cell("b", second));

        let third = next_placement(&cells);
        assert_eq!((third.x, third.y), (0, DEFAULT_CELL_HEIGHT));
    }

    #[test]
    fn wrap_goes_below_tallest_cell() {
        let cells = vec![
            cell("a", LayoutRect { x: 0, y: 0, w: 6, h: 9 }),
            cell("b", LayoutRect { x: 6, y: 0, w: 6, h: 2 }),
        ];
        assert_eq!(next_placement(&cells).y, 9);
    }

    #[test]
    fn reading_order_is_row_major() {
        let cells = vec![
            cell("low", LayoutRect { x: 0, y: 8, w: 6, h: 4 }),
            cell("right", LayoutRect { x: 6, y: 0, w: 6, h: 4 }),
            cell("left", LayoutRect { x: 0, y: 0, w: 6, h: 4 }),
        ];
        let ids: Vec<_> = reading_order(&cells).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["left", "right", "low"]);
    }

    #[test]
    fn nudges_stay_inside_the_grid() {
        let rect = LayoutRect { x: 0, y: 0, w: 6, h: 4 };
        assert_eq!(nudge(rect, Nudge::Left), rect);
        assert_eq!(nudge(rect, Nudge::Up), rect);
        assert_eq!(nudge(rect, Nudge::Right).x, 1);

        let flush_right = LayoutRect { x: 6, y: 2, w: 6, h: 4 };
        assert_eq!(nudge(flush_right, Nudge::Right), flush_right);
        assert_eq!(nudge(flush_right, Nudge::Wider), flush_right);
        assert_eq!(nudge(flush_right, Nudge::Narrower).w, 5);

        let tiny = LayoutRect { x: 3, y: 0, w: 1, h: 1 };
        assert_eq!(nudge(tiny, Nudge::Narrower), tiny);
        assert_eq!(nudge(tiny, Nudge::Shorter), tiny);
        assert_eq!(nudge(tiny, Nudge::Taller).h, 2);
    }

    #[test]
    fn right_nudge_never_pulls_an_overhanging_cell_left() {
        let overhang = LayoutRect { x: 9, y: 0, w: 6, h: 4 };
        assert_eq!(nudge(overhang, Nudge::Right), overhang);
    }

    #[test]
    fn nudged_layout_touches_only_the_target() {
        let cells = vec![
            cell("a", LayoutRect { x: 0, y: 0, w: 6, h: 4 }),
            cell("b", LayoutRect { x: 6, y: 0, w: 6, h: 4 }),
        ];
        let items = nudged_layout(&cells, "a", Nudge::Down);
        assert_eq!(items[0].y, 1);
        assert_eq!(items[1], cells[1].layout_item());
    }
}

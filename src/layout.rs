//! Grid planning for the shop image.
//!
//! The shop image is two card sections side by side: **Featured** on the
//! left, **Daily** on the right, under a fixed 350 px header band holding the
//! title, the date and the section labels. Every card occupies the same cell:
//!
//! ```text
//! ┌──────── 310 ────────┐ 20 ┌──────── 310 ────────┐
//! │                     │    │                     │
//! │        card         │    │        card         │  510
//! │                     │    │                     │
//! └─────────────────────┘    └─────────────────────┘
//!                         20 (row gutter)
//! ```
//!
//! The grid shape is picked from a small, fixed set of thresholds on the
//! section lengths. Most specific first:
//!
//! | Condition | Display columns | Featured / row | Daily / row | Daily offset |
//! |---|---|---|---|---|
//! | featured ≥ 18 and daily ≥ 18 | 12 | 6 | 6 | `340 * 6 + 100` |
//! | featured ≥ 18 | 9 | 6 | 3 | `340 * 6` |
//! | otherwise | 6 | 3 | 3 | `340 * 3` |
//!
//! Everything here is pure arithmetic and covered by unit tests.

/// Rendered card width in pixels.
pub const CARD_WIDTH: u32 = 310;
/// Rendered card height in pixels.
pub const CARD_HEIGHT: u32 = 510;
/// Space between neighbouring cards, both axes.
pub const GUTTER: u32 = 20;
/// Width one display column contributes to the canvas.
pub const COLUMN_PITCH: u32 = 340;
/// Height one card row contributes to the canvas.
pub const ROW_PITCH: u32 = CARD_HEIGHT + GUTTER;
/// Height of the title band above the first card row.
pub const HEADER_HEIGHT: u32 = 350;
/// Left edge of the featured section.
pub const FEATURED_ORIGIN_X: u32 = 20;

/// Section lengths at which the wide layouts kick in.
const WIDE_THRESHOLD: usize = 18;

/// One of the two card sections of the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Featured,
    Daily,
}

impl Section {
    /// Header label drawn above the section.
    pub fn label(self) -> &'static str {
        match self {
            Section::Featured => "FEATURED",
            Section::Daily => "DAILY",
        }
    }
}

/// Geometry for one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPlan {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Total columns the canvas width is derived from.
    pub display_columns: u32,
    pub featured_columns: u32,
    pub daily_columns: u32,
    /// Left edge of the daily section.
    pub daily_offset_x: u32,
    /// Card rows of the taller section.
    pub rows: u32,
}

impl GridPlan {
    /// Cards per row in the given section.
    pub fn columns(&self, section: Section) -> u32 {
        match section {
            Section::Featured => self.featured_columns,
            Section::Daily => self.daily_columns,
        }
    }

    /// Top-left corner of the `index`-th card slot of a section.
    ///
    /// Slots fill row by row: column `index % columns`, row `index / columns`.
    pub fn cell_origin(&self, section: Section, index: usize) -> (u32, u32) {
        let columns = self.columns(section) as usize;
        let origin_x = match section {
            Section::Featured => FEATURED_ORIGIN_X,
            Section::Daily => self.daily_offset_x,
        };
        let col = (index % columns) as u32;
        let row = (index / columns) as u32;
        (
            origin_x + col * (CARD_WIDTH + GUTTER),
            HEADER_HEIGHT + row * ROW_PITCH,
        )
    }
}

/// Pick the grid shape for the given section lengths.
///
/// Total: never fails. Callers decide what to do with two empty sections.
pub fn plan_grid(featured: usize, daily: usize) -> GridPlan {
    let (display_columns, featured_columns, daily_columns, daily_offset_x) =
        if featured >= WIDE_THRESHOLD && daily >= WIDE_THRESHOLD {
            (12, 6, 6, COLUMN_PITCH * 6 + 100)
        } else if featured >= WIDE_THRESHOLD {
            (9, 6, 3, COLUMN_PITCH * 6)
        } else {
            (6, 3, 3, COLUMN_PITCH * 3)
        };

    let rows = rows_needed(featured, featured_columns).max(rows_needed(daily, daily_columns));

    GridPlan {
        canvas_width: COLUMN_PITCH * display_columns - 30,
        canvas_height: ROW_PITCH * rows + HEADER_HEIGHT,
        display_columns,
        featured_columns,
        daily_columns,
        daily_offset_x,
        rows,
    }
}

fn rows_needed(count: usize, columns: u32) -> u32 {
    count.div_ceil(columns as usize) as u32
}

//! Shop Composer: snapshot + date label → the finished shop image.
//!
//! Composition happens fully in memory ([`compose`]) so it can be asserted on
//! pixel by pixel; [`render_to_file`] adds the JPEG encode and the write.
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │              FORTNITE ITEM SHOP               │  y = 30
//! │                18 OCTOBER 2026                │  y = 120
//! │ FEATURED                                DAILY │  y = 240
//! │ ┌────┐ ┌────┐ ┌────┐    ┌────┐ ┌────┐ ┌────┐  │  y = 350
//! │ │card│ │card│ │card│    │card│ │card│ │card│  │
//! │ └────┘ └────┘ └────┘    └────┘ └────┘ └────┘  │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! Slots fill in catalog order; a skipped card does not leave a hole.

use crate::card::{CardError, render_entry};
use crate::catalog::CatalogSnapshot;
use crate::imaging::backend::{AssetError, AssetProvider, Typeface};
use crate::imaging::calculations::center_x;
use crate::imaging::disk_assets::BACKGROUND_ASSET;
use crate::imaging::operations::{FittedText, draw_centered, paste, paste_masked, ratio_resize};
use crate::imaging::params::Quality;
use crate::layout::{GridPlan, Section, plan_grid};
use image::{Rgba, RgbaImage};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

pub const TITLE: &str = "FORTNITE ITEM SHOP";
/// Size of the title, date and section headers.
pub const HEADER_SIZE: u32 = 80;

const TITLE_Y: i32 = 30;
const DATE_Y: i32 = 120;
const SECTION_LABEL_Y: i32 = 240;
const FEATURED_LABEL_X: i32 = 20;
/// The daily label is anchored this far left of the right edge.
const DAILY_LABEL_INSET: i32 = 230;

/// Fill used when `background.png` cannot be opened.
pub const FALLBACK_FILL: Rgba<u8> = Rgba([34, 37, 40, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Error, Debug)]
pub enum ShopError {
    #[error("catalog has no featured or daily entries")]
    NoEntries,
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),
    #[error("Failed to encode shop image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A card that made it onto the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedCard {
    pub section: Section,
    /// Grid slot within the section.
    pub slot: usize,
    pub x: u32,
    pub y: u32,
    pub name: String,
}

/// A catalog entry that produced no card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCard {
    pub section: Section,
    /// Position in the catalog's entry list.
    pub position: usize,
    pub reason: String,
}

/// What one render pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderReport {
    pub width: u32,
    pub height: u32,
    pub placed: Vec<PlacedCard>,
    pub skipped: Vec<SkippedCard>,
}

impl RenderReport {
    pub fn placed_in(&self, section: Section) -> impl Iterator<Item = &PlacedCard> {
        self.placed.iter().filter(move |c| c.section == section)
    }
}

fn draw_background(canvas: &mut RgbaImage, assets: &dyn AssetProvider) {
    match assets.image(BACKGROUND_ASSET) {
        Ok(bg) => {
            let bg = ratio_resize(&bg, canvas.width(), canvas.height());
            let x = center_x(bg.width(), canvas.width());
            paste(canvas, &bg, x, 0);
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to open {BACKGROUND_ASSET}, defaulting to dark gray"
            );
            for px in canvas.pixels_mut() {
                *px = FALLBACK_FILL;
            }
        }
    }
}

fn draw_header(
    canvas: &mut RgbaImage,
    face: &dyn Typeface,
    date_label: &str,
    snapshot: &CatalogSnapshot,
) {
    let title = FittedText::measured(face, TITLE, HEADER_SIZE);
    draw_centered(canvas, face, &title, TITLE_Y, WHITE);

    let date = FittedText::measured(face, &date_label.to_uppercase(), HEADER_SIZE);
    draw_centered(canvas, face, &date, DATE_Y, WHITE);

    if !snapshot.featured.is_empty() {
        face.draw(
            canvas,
            Section::Featured.label(),
            HEADER_SIZE,
            FEATURED_LABEL_X,
            SECTION_LABEL_Y,
            WHITE,
        );
    }
    if !snapshot.daily.is_empty() {
        let x = canvas.width() as i32 - DAILY_LABEL_INSET;
        face.draw(
            canvas,
            Section::Daily.label(),
            HEADER_SIZE,
            x,
            SECTION_LABEL_Y,
            WHITE,
        );
    }
}

fn draw_section(
    canvas: &mut RgbaImage,
    plan: &GridPlan,
    section: Section,
    entries: &[Value],
    assets: &dyn AssetProvider,
    face: &dyn Typeface,
    report: &mut RenderReport,
) {
    let mut slot = 0;
    for (position, raw) in entries.iter().enumerate() {
        match render_entry(raw, assets, face) {
            Ok((entry, card)) => {
                let (x, y) = plan.cell_origin(section, slot);
                paste_masked(canvas, &card, x as i64, y as i64);
                report.placed.push(PlacedCard {
                    section,
                    slot,
                    x,
                    y,
                    name: entry.item_name,
                });
                slot += 1;
            }
            Err(e) => {
                let section_label = section.label();
                match &e {
                    CardError::Entry(reason) => {
                        tracing::warn!(
                            section = section_label,
                            position,
                            %reason,
                            "skipping entry"
                        );
                    }
                    CardError::Icon(err) => {
                        tracing::warn!(
                            section = section_label,
                            position,
                            error = %err,
                            "skipping entry, icon unavailable"
                        );
                    }
                }
                report.skipped.push(SkippedCard {
                    section,
                    position,
                    reason: e.to_string(),
                });
            }
        }
    }
}

/// Lay out and draw the whole shop in memory.
///
/// Fails only when both sections are empty; everything else degrades to
/// fallbacks or skipped cards.
pub fn compose(
    snapshot: &CatalogSnapshot,
    date_label: &str,
    assets: &dyn AssetProvider,
    face: &dyn Typeface,
) -> Result<(RgbaImage, RenderReport), ShopError> {
    if snapshot.is_empty() {
        return Err(ShopError::NoEntries);
    }

    let plan = plan_grid(snapshot.featured.len(), snapshot.daily.len());
    let mut canvas = RgbaImage::from_pixel(
        plan.canvas_width,
        plan.canvas_height,
        Rgba([0, 0, 0, 255]),
    );
    let mut report = RenderReport {
        width: plan.canvas_width,
        height: plan.canvas_height,
        placed: Vec::new(),
        skipped: Vec::new(),
    };

    draw_background(&mut canvas, assets);
    draw_header(&mut canvas, face, date_label, snapshot);

    draw_section(
        &mut canvas,
        &plan,
        Section::Featured,
        &snapshot.featured,
        assets,
        face,
        &mut report,
    );
    draw_section(
        &mut canvas,
        &plan,
        Section::Daily,
        &snapshot.daily,
        assets,
        face,
        &mut report,
    );

    Ok((canvas, report))
}

/// Compose and write the shop as JPEG to `output`.
///
/// The image is encoded next to `output` and renamed over it, so a failed
/// write never leaves a truncated file behind. The staging file is removed
/// when encoding or the rename fails.
pub fn render_to_file(
    snapshot: &CatalogSnapshot,
    date_label: &str,
    assets: &dyn AssetProvider,
    face: &dyn Typeface,
    output: &Path,
    quality: Quality,
) -> Result<RenderReport, ShopError> {
    let (canvas, report) = compose(snapshot, date_label, assets, face)?;

    let mut staging = output.as_os_str().to_owned();
    staging.push(".partial");
    let staging = Path::new(&staging);

    let written = crate::imaging::save_jpeg(&canvas, staging, quality)
        .map_err(ShopError::from)
        .and_then(|()| std::fs::rename(staging, output).map_err(ShopError::from));
    if let Err(e) = written {
        if let Err(cleanup) = std::fs::remove_file(staging)
            && cleanup.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(
                path = %staging.display(),
                error = %cleanup,
                "failed to remove partial image"
            );
        }
        return Err(e);
    }

    tracing::info!(
        path = %output.display(),
        cards = report.placed.len(),
        skipped = report.skipped.len(),
        "Generated Item Shop image"
    );
    Ok(report)
}

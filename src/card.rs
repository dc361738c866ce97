//! Card Renderer: one catalog entry → one 310x510 card.
//!
//! Layers, bottom to top:
//!
//! ```text
//! ┌──────────────┐  0
//! │  <Rarity>BG  │
//! │     icon     │  frame top (0 or 15), cover-resized to the category frame
//! │              │
//! │ 1,200 [V]    │  347  price + currency glyph, centered as one block
//! │ RENEGADE RAI │  400  name, white, shrink-to-fit
//! │    OUTFIT    │  450  category, rarity accent, shrink-to-fit
//! │  <Rarity>OV  │
//! └──────────────┘  510
//! ```
//!
//! The overlay is pasted before the text so labels sit on top of it.
//! Missing templates fall back to the Common pair; a missing icon skips the card.

use crate::catalog::{Entry, SkipReason};
use crate::imaging::backend::{AssetError, AssetProvider, Typeface};
use crate::imaging::calculations::center_x;
use crate::imaging::disk_assets::CURRENCY_ASSET;
use crate::imaging::operations::{
    FittedText, draw_centered, fit_text, paste, paste_masked, ratio_resize,
};
use crate::imaging::params::IconFrame;
use crate::rarity::{RarityStyle, style_for};
use image::{Rgba, RgbaImage};
use serde_json::Value;
use thiserror::Error;

pub const CARD_WIDTH: u32 = crate::layout::CARD_WIDTH;
pub const CARD_HEIGHT: u32 = crate::layout::CARD_HEIGHT;

/// Font size for price, name and category.
pub const LABEL_SIZE: u32 = 40;
/// Labels at least this wide get shrunk.
pub const SHRINK_TRIGGER: u32 = 280;
/// Shrunk labels end up narrower than this.
pub const LABEL_MAX_WIDTH: u32 = 260;

const PRICE_Y: i32 = 347;
const GLYPH_Y: i64 = 350;
const GLYPH_SIZE: u32 = 40;
const GLYPH_GAP: u32 = 5;
const NAME_Y: i32 = 400;
const CATEGORY_Y: i32 = 450;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Name suffixes that repeat what the category label already says.
const REDUNDANT_SUFFIXES: &[&str] = &[" OUTFIT", " PICKAXE", " BUNDLE"];

#[derive(Error, Debug)]
pub enum CardError {
    #[error(transparent)]
    Entry(#[from] SkipReason),
    #[error("icon unavailable: {0}")]
    Icon(#[source] AssetError),
}

/// `1234567` → `"1,234,567"`.
pub fn format_price(price: u64) -> String {
    let digits = price.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Uppercased name with redundant category suffixes removed.
///
/// Bundles only lose `" BUNDLE"`; an outfit bundle keeps `" OUTFIT"`.
pub fn display_name(entry: &Entry) -> String {
    let upper = entry.item_name.to_uppercase();
    if entry.category_id == "bundle" {
        return upper.replace(" BUNDLE", "");
    }
    REDUNDANT_SUFFIXES
        .iter()
        .fold(upper, |name, suffix| name.replace(suffix, ""))
}

/// Shrink only labels that reach [`SHRINK_TRIGGER`].
fn fit_label(face: &dyn Typeface, text: &str) -> FittedText {
    let measured = FittedText::measured(face, text, LABEL_SIZE);
    if measured.width >= SHRINK_TRIGGER {
        fit_text(face, text, LABEL_SIZE, LABEL_MAX_WIDTH)
    } else {
        measured
    }
}

/// Open a rarity template, falling back to the Common one.
fn template(assets: &dyn AssetProvider, name: &str, fallback: &str) -> Option<RgbaImage> {
    match assets.image(name) {
        Ok(img) => Some(img),
        Err(e) => {
            tracing::warn!(asset = name, error = %e, "template missing, using {fallback}");
            match assets.image(fallback) {
                Ok(img) => Some(img),
                Err(e) => {
                    tracing::warn!(asset = fallback, error = %e, "fallback template missing");
                    None
                }
            }
        }
    }
}

fn draw_price(canvas: &mut RgbaImage, assets: &dyn AssetProvider, face: &dyn Typeface, price: u64) {
    let text = format_price(price);
    let text_width = face.text_width(&text, LABEL_SIZE);

    let glyph = match assets.image(CURRENCY_ASSET) {
        Ok(img) => Some(ratio_resize(&img, GLYPH_SIZE, GLYPH_SIZE)),
        Err(e) => {
            tracing::warn!(error = %e, "currency glyph missing, drawing price without it");
            None
        }
    };

    match glyph {
        Some(glyph) => {
            let block = text_width + GLYPH_GAP + GLYPH_SIZE;
            let x = center_x(block, CARD_WIDTH);
            face.draw(canvas, &text, LABEL_SIZE, x as i32, PRICE_Y, WHITE);
            paste_masked(
                canvas,
                &glyph,
                x + (text_width + GLYPH_GAP) as i64,
                GLYPH_Y,
            );
        }
        None => {
            let x = center_x(text_width, CARD_WIDTH);
            face.draw(canvas, &text, LABEL_SIZE, x as i32, PRICE_Y, WHITE);
        }
    }
}

/// Render one validated entry.
pub fn render_card(
    entry: &Entry,
    assets: &dyn AssetProvider,
    face: &dyn Typeface,
) -> Result<RgbaImage, CardError> {
    let style = style_for(&entry.rarity_id);
    let fallback = RarityStyle::DEFAULT;
    let mut card = RgbaImage::new(CARD_WIDTH, CARD_HEIGHT);

    if let Some(bg) = template(assets, &style.background_asset(), &fallback.background_asset()) {
        paste(&mut card, &bg, 0, 0);
    }

    let icon = assets.icon(&entry.icon_url).map_err(CardError::Icon)?;
    let frame = IconFrame::for_category(&entry.category_id);
    let icon = ratio_resize(&icon, frame.width, frame.height);
    paste_masked(
        &mut card,
        &icon,
        center_x(icon.width(), CARD_WIDTH),
        frame.top,
    );

    if let Some(ov) = template(assets, &style.overlay_asset(), &fallback.overlay_asset()) {
        paste_masked(&mut card, &ov, 0, 0);
    }

    draw_price(&mut card, assets, face, entry.final_price);

    let name = fit_label(face, &display_name(entry));
    draw_centered(&mut card, face, &name, NAME_Y + (name.shrink / 2) as i32, WHITE);

    let category = fit_label(face, &entry.category_id.to_uppercase());
    draw_centered(
        &mut card,
        face,
        &category,
        CATEGORY_Y + (category.shrink / 2) as i32,
        style.accent_rgba(),
    );

    Ok(card)
}

/// Parse a raw catalog entry and render it.
pub fn render_entry(
    raw: &Value,
    assets: &dyn AssetProvider,
    face: &dyn Typeface,
) -> Result<(Entry, RgbaImage), CardError> {
    let entry = Entry::parse(raw)?;
    let card = render_card(&entry, assets, face)?;
    Ok((entry, card))
}

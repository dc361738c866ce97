//! Asset and text backends.
//!
//! Rendering needs two things from the outside world: pixels it does not own
//! (templates, the background, item icons) and a way to measure and draw
//! text. Both sit behind traits so card and shop composition stay
//! deterministic and testable without asset files, fonts or network:
//!
//! - [`AssetProvider`]: static images by relative name, icons by URL.
//!   Production: [`DiskAssets`](super::disk_assets::DiskAssets).
//! - [`Typeface`]: text width and glyph drawing at a pixel size.
//!   Production: [`RustTypeface`](super::typeface::RustTypeface).

use image::{Rgba, RgbaImage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status} fetching {url}")]
    Status { status: u16, url: String },
    #[error("Font unavailable: {0}")]
    Font(String),
    #[error("{0} is outside the images directory")]
    OutsideAssets(String),
}

/// Source of every image the renderer pastes.
pub trait AssetProvider {
    /// Open a static image by path relative to the images directory,
    /// e.g. `"background.png"` or `"shopTemplates/EpicBG.png"`.
    fn image(&self, name: &str) -> Result<RgbaImage, AssetError>;

    /// Fetch an item icon. `location` is an `http(s)` URL or a path
    /// relative to the images directory.
    fn icon(&self, location: &str) -> Result<RgbaImage, AssetError>;
}

/// A display font at arbitrary pixel sizes.
pub trait Typeface {
    /// Rendered width of `text` at `size` px.
    fn text_width(&self, text: &str, size: u32) -> u32;

    /// Draw `text` with its top-left corner at `(x, y)`.
    fn draw(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        size: u32,
        x: i32,
        y: i32,
        color: Rgba<u8>,
    );
}

//! TrueType text rendering with `rusttype`.
//!
//! The display font is Burbank Big (the in-game font). Distributions that
//! cannot ship it get Luckiest Guy instead; [`RustTypeface::load`] tries the
//! primary file first and warns when it falls back.

use super::backend::{AssetError, Typeface};
use super::operations::blend_pixel;
use image::{Rgba, RgbaImage};
use rusttype::{Font, Scale, point};
use std::path::{Path, PathBuf};

/// Preferred display font, relative to the fonts directory.
pub const PRIMARY_FONT: &str = "BurbankBigRegular-Black.ttf";
/// Used when the primary font is missing or unreadable.
pub const FALLBACK_FONT: &str = "LuckiestGuy-Regular.ttf";

pub struct RustTypeface {
    font: Font<'static>,
    path: PathBuf,
}

impl RustTypeface {
    /// Load a single font file.
    pub fn from_file(path: &Path) -> Result<Self, AssetError> {
        let bytes = std::fs::read(path)?;
        let font = Font::try_from_vec(bytes)
            .ok_or_else(|| AssetError::Font(format!("{} is not a valid font", path.display())))?;
        Ok(Self {
            font,
            path: path.to_path_buf(),
        })
    }

    /// Load [`PRIMARY_FONT`] from `fonts_dir`, falling back to [`FALLBACK_FONT`].
    pub fn load(fonts_dir: &Path) -> Result<Self, AssetError> {
        match Self::from_file(&fonts_dir.join(PRIMARY_FONT)) {
            Ok(face) => Ok(face),
            Err(primary_err) => {
                tracing::warn!(
                    error = %primary_err,
                    "{PRIMARY_FONT} not found, defaulting font to {FALLBACK_FONT}"
                );
                Self::from_file(&fonts_dir.join(FALLBACK_FONT)).map_err(|e| {
                    AssetError::Font(format!("no usable font in {}: {e}", fonts_dir.display()))
                })
            }
        }
    }

    /// File the font was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Typeface for RustTypeface {
    fn text_width(&self, text: &str, size: u32) -> u32 {
        if text.is_empty() {
            return 0;
        }
        let scale = Scale::uniform(size as f32);
        let v_metrics = self.font.v_metrics(scale);
        let mut width: f32 = 0.0;
        for glyph in self.font.layout(text, scale, point(0.0, v_metrics.ascent)) {
            let advance_end = glyph.position().x + glyph.unpositioned().h_metrics().advance_width;
            width = width.max(advance_end);
            if let Some(bb) = glyph.pixel_bounding_box() {
                width = width.max(bb.max.x as f32);
            }
        }
        width.ceil() as u32
    }

    fn draw(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        size: u32,
        x: i32,
        y: i32,
        color: Rgba<u8>,
    ) {
        let scale = Scale::uniform(size as f32);
        let v_metrics = self.font.v_metrics(scale);
        let origin = point(x as f32, y as f32 + v_metrics.ascent);
        let (width, height) = (canvas.width() as i32, canvas.height() as i32);

        for glyph in self.font.layout(text, scale, origin) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px < 0 || py < 0 || px >= width || py >= height {
                    return;
                }
                blend_pixel(canvas.get_pixel_mut(px as u32, py as u32), color, coverage);
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_fonts_is_font_error() {
        let tmp = TempDir::new().unwrap();
        let result = RustTypeface::load(tmp.path());
        assert!(matches!(result, Err(AssetError::Font(_))));
    }

    #[test]
    fn garbage_font_file_is_rejected() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(PRIMARY_FONT), b"not a font").unwrap();
        std::fs::write(tmp.path().join(FALLBACK_FONT), b"also not a font").unwrap();
        assert!(matches!(
            RustTypeface::load(tmp.path()),
            Err(AssetError::Font(_))
        ));
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = RustTypeface::from_file(&tmp.path().join("none.ttf"));
        assert!(matches!(result, Err(AssetError::Io(_))));
    }
}

//! Pixel operations shared by card and shop composition.
//!
//! Two paste flavours mirror how layers are stacked:
//!
//! | Function | Alpha handling | Used for |
//! |---|---|---|
//! | [`paste`] | replaces destination pixels, alpha included | card template backgrounds, the shop background |
//! | [`paste_masked`] | source alpha blends onto the destination | icons, overlays, the currency glyph, finished cards |
//!
//! Text goes through a [`Typeface`]; [`fit_text`] shrinks a label until it
//! fits a width bound.

use super::backend::Typeface;
use super::calculations::{bounded_cover, center_x, cover_dimensions};
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ImageError, ImageResult, Rgba, RgbImage, RgbaImage};
use std::io::Write;
use std::path::Path;

/// Smallest font size [`fit_text`] shrinks to before it starts truncating.
pub const MIN_FONT_SIZE: u32 = 8;

/// How far past its box a cover resize may reach, as a multiple of each side.
/// Everything beyond is clipped off the card or canvas anyway.
pub const MAX_COVER_OVERHANG: u32 = 2;

/// Resize to cover a `max_width` x `max_height` box, preserving aspect ratio.
///
/// The overhang is capped at [`MAX_COVER_OVERHANG`]; for extreme aspect
/// ratios the source is cropped (centered horizontally, from the top) first.
pub fn ratio_resize(img: &RgbaImage, max_width: u32, max_height: u32) -> RgbaImage {
    let bound = bounded_cover(img.dimensions(), (max_width, max_height), MAX_COVER_OVERHANG);
    if let Some(crop) = bound {
        let kept = image::imageops::crop_imm(img, crop.x, 0, crop.width, crop.height).to_image();
        return image::imageops::resize(
            &kept,
            crop.out_width.max(1),
            crop.out_height.max(1),
            FilterType::Lanczos3,
        );
    }

    let (w, h) = cover_dimensions(img.dimensions(), (max_width, max_height));
    if (w, h) == img.dimensions() {
        return img.clone();
    }
    image::imageops::resize(img, w.max(1), h.max(1), FilterType::Lanczos3)
}

/// Copy `layer` onto `canvas` at `(x, y)`, replacing pixels. Clipped to the canvas.
pub fn paste(canvas: &mut RgbaImage, layer: &RgbaImage, x: i64, y: i64) {
    image::imageops::replace(canvas, layer, x, y);
}

/// Blend `layer` onto `canvas` at `(x, y)` using the layer's own alpha as mask.
pub fn paste_masked(canvas: &mut RgbaImage, layer: &RgbaImage, x: i64, y: i64) {
    image::imageops::overlay(canvas, layer, x, y);
}

/// Source-over blend of `color` into `dst` at the given glyph coverage (0..=1).
pub(crate) fn blend_pixel(dst: &mut Rgba<u8>, color: Rgba<u8>, coverage: f32) {
    let src_a = coverage.clamp(0.0, 1.0) * color.0[3] as f32 / 255.0;
    if src_a <= 0.0 {
        return;
    }
    let dst_a = dst.0[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    for c in 0..3 {
        let blended =
            (color.0[c] as f32 * src_a + dst.0[c] as f32 * dst_a * (1.0 - src_a)) / out_a;
        dst.0[c] = blended.round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = (out_a * 255.0).round() as u8;
}

/// A label resolved to a size that fits its width bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FittedText {
    pub text: String,
    pub size: u32,
    pub width: u32,
    /// How many sizes were shed from the requested size.
    pub shrink: u32,
}

impl FittedText {
    /// `text` measured at `size`, unchanged.
    pub fn measured(face: &dyn Typeface, text: &str, size: u32) -> Self {
        Self {
            text: text.to_string(),
            size,
            width: face.text_width(text, size),
            shrink: 0,
        }
    }
}

/// Shrink `text` one size at a time until it renders narrower than `max_width`.
///
/// Sizes never go below [`MIN_FONT_SIZE`]. If the text is still too wide at
/// the floor, trailing characters are dropped until it fits.
pub fn fit_text(face: &dyn Typeface, text: &str, size: u32, max_width: u32) -> FittedText {
    let mut fitted = FittedText::measured(face, text, size);

    while fitted.width >= max_width && fitted.size > MIN_FONT_SIZE {
        fitted.size -= 1;
        fitted.shrink += 1;
        fitted.width = face.text_width(&fitted.text, fitted.size);
    }

    while fitted.width >= max_width && fitted.text.pop().is_some() {
        fitted.width = face.text_width(&fitted.text, fitted.size);
    }

    fitted
}

/// Draw a fitted label horizontally centered on the canvas at row `y`.
pub fn draw_centered(
    canvas: &mut RgbaImage,
    face: &dyn Typeface,
    label: &FittedText,
    y: i32,
    color: Rgba<u8>,
) {
    let x = center_x(label.width, canvas.width()) as i32;
    face.draw(canvas, &label.text, label.size, x, y, color);
}

/// Encode as baseline JPEG (alpha dropped) into `writer`.
pub fn encode_jpeg<W: Write>(canvas: &RgbaImage, writer: W, quality: Quality) -> ImageResult<()> {
    let rgb: RgbImage = image::buffer::ConvertBuffer::convert(canvas);
    let encoder = JpegEncoder::new_with_quality(writer, quality.value());
    rgb.write_with_encoder(encoder)
}

/// Encode as JPEG and write to `path`, replacing any existing file.
pub fn save_jpeg(canvas: &RgbaImage, path: &Path, quality: Quality) -> ImageResult<()> {
    let file = std::fs::File::create(path).map_err(ImageError::IoError)?;
    let mut writer = std::io::BufWriter::new(file);
    encode_jpeg(canvas, &mut writer, quality)?;
    writer.flush().map_err(ImageError::IoError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::BlockFace;

    // =========================================================================
    // paste / paste_masked
    // =========================================================================

    #[test]
    fn paste_replaces_including_alpha() {
        let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255]));
        let layer = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        paste(&mut canvas, &layer, 1, 1);
        assert_eq!(canvas.get_pixel(1, 1).0, [0, 0, 0, 0]);
        assert_eq!(canvas.get_pixel(0, 0).0, [9, 9, 9, 255]);
    }

    #[test]
    fn paste_masked_keeps_destination_under_transparency() {
        let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255]));
        let mut layer = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        layer.put_pixel(1, 1, Rgba([200, 0, 0, 255]));
        paste_masked(&mut canvas, &layer, 1, 1);
        assert_eq!(canvas.get_pixel(1, 1).0, [9, 9, 9, 255]);
        assert_eq!(canvas.get_pixel(2, 2).0, [200, 0, 0, 255]);
    }

    #[test]
    fn paste_clips_negative_offsets() {
        let mut canvas = RgbaImage::new(4, 4);
        let layer = RgbaImage::from_pixel(6, 6, Rgba([1, 2, 3, 255]));
        paste_masked(&mut canvas, &layer, -1, -1);
        assert_eq!(canvas.get_pixel(0, 0).0, [1, 2, 3, 255]);
        assert_eq!(canvas.get_pixel(3, 3).0, [1, 2, 3, 255]);
    }

    // =========================================================================
    // blend_pixel
    // =========================================================================

    #[test]
    fn blend_full_coverage_replaces_color() {
        let mut px = Rgba([0, 0, 0, 255]);
        blend_pixel(&mut px, Rgba([255, 255, 255, 255]), 1.0);
        assert_eq!(px.0, [255, 255, 255, 255]);
    }

    #[test]
    fn blend_half_coverage_mixes() {
        let mut px = Rgba([0, 0, 0, 255]);
        blend_pixel(&mut px, Rgba([200, 100, 0, 255]), 0.5);
        assert_eq!(px.0, [100, 50, 0, 255]);
    }

    #[test]
    fn blend_onto_transparent_takes_source_color() {
        let mut px = Rgba([0, 0, 0, 0]);
        blend_pixel(&mut px, Rgba([200, 100, 0, 255]), 0.5);
        assert_eq!(px.0, [200, 100, 0, 128]);
    }

    #[test]
    fn blend_zero_coverage_is_noop() {
        let mut px = Rgba([5, 6, 7, 8]);
        blend_pixel(&mut px, Rgba([200, 100, 0, 255]), 0.0);
        assert_eq!(px.0, [5, 6, 7, 8]);
    }

    // =========================================================================
    // ratio_resize
    // =========================================================================

    #[test]
    fn ratio_resize_covers_box() {
        let img = RgbaImage::new(512, 512);
        assert_eq!(ratio_resize(&img, 285, 365).dimensions(), (365, 365));
        assert_eq!(ratio_resize(&img, 40, 40).dimensions(), (40, 40));
    }

    #[test]
    fn ratio_resize_caps_extreme_aspect_ratios() {
        let tall = RgbaImage::from_pixel(1, 4000, Rgba([9, 9, 9, 255]));
        assert_eq!(ratio_resize(&tall, 310, 390).dimensions(), (310, 780));

        let wide = RgbaImage::from_pixel(4000, 1, Rgba([9, 9, 9, 255]));
        assert_eq!(ratio_resize(&wide, 310, 390).dimensions(), (620, 390));
    }

    // =========================================================================
    // fit_text
    // =========================================================================

    #[test]
    fn fit_text_leaves_short_text_alone() {
        let fitted = fit_text(&BlockFace, "SHORT", 40, 260);
        assert_eq!(fitted.size, 40);
        assert_eq!(fitted.shrink, 0);
        assert_eq!(fitted.text, "SHORT");
    }

    #[test]
    fn fit_text_shrinks_until_under_bound() {
        // 12 chars * 24 px = 288 at size 40
        let fitted = fit_text(&BlockFace, "RENEGADE RAI", 40, 260);
        assert!(fitted.width < 260);
        assert_eq!(fitted.width, BlockFace.text_width("RENEGADE RAI", fitted.size));
        assert_eq!(fitted.shrink, 40 - fitted.size);
        // One size larger would not have fit
        assert!(BlockFace.text_width("RENEGADE RAI", fitted.size + 1) >= 260);
        assert_eq!(fitted.text, "RENEGADE RAI");
    }

    #[test]
    fn fit_text_never_exceeds_bound() {
        for len in 0..200 {
            let text = "W".repeat(len);
            let fitted = fit_text(&BlockFace, &text, 40, 260);
            assert!(fitted.width < 260, "len {len} rendered {}", fitted.width);
            assert!(fitted.size >= MIN_FONT_SIZE);
            assert!(fitted.size <= 40);
        }
    }

    #[test]
    fn fit_text_truncates_at_floor() {
        let text = "X".repeat(100);
        let fitted = fit_text(&BlockFace, &text, 40, 260);
        assert_eq!(fitted.size, MIN_FONT_SIZE);
        assert_eq!(fitted.shrink, 40 - MIN_FONT_SIZE);
        assert!(fitted.text.len() < 100);
        assert!(text.starts_with(&fitted.text));
    }

    #[test]
    fn fit_text_size_decreases_monotonically_with_length() {
        let mut last = u32::MAX;
        for len in 10..60 {
            let fitted = fit_text(&BlockFace, &"M".repeat(len), 40, 260);
            assert!(fitted.size <= last);
            last = fitted.size;
        }
    }

    // =========================================================================
    // draw_centered / encoding
    // =========================================================================

    #[test]
    fn draw_centered_places_label_in_middle() {
        let mut canvas = RgbaImage::new(100, 20);
        let label = FittedText::measured(&BlockFace, "AB", 10);
        // 2 chars * 6 px = 12 wide → x = 44
        draw_centered(&mut canvas, &BlockFace, &label, 5, Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(43, 5).0, [0, 0, 0, 0]);
        assert_eq!(canvas.get_pixel(44, 5).0, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(55, 14).0, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(56, 5).0, [0, 0, 0, 0]);
    }

    #[test]
    fn encode_jpeg_produces_jpeg_bytes() {
        let canvas = RgbaImage::from_pixel(16, 8, Rgba([30, 60, 90, 255]));
        let mut bytes = Vec::new();
        encode_jpeg(&canvas, &mut bytes, Quality::default()).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }

    #[test]
    fn save_jpeg_to_missing_dir_fails() {
        let canvas = RgbaImage::new(4, 4);
        let result = save_jpeg(
            &canvas,
            Path::new("/nonexistent-dir/itemshop.jpeg"),
            Quality::default(),
        );
        assert!(matches!(result, Err(ImageError::IoError(_))));
    }
}

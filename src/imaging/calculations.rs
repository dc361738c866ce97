//! Pure calculation functions for image placement.
//!
//! All functions here are pure and testable without any I/O or images.

/// Scale `source` so it covers the `target` box, preserving aspect ratio.
///
/// The scale factor is `max(target_w / src_w, target_h / src_h)`: one
/// dimension matches the box exactly, the other meets or exceeds it.
/// Results are truncated toward zero.
///
/// # Examples
/// ```
/// # use item_shop::imaging::calculations::cover_dimensions;
/// // 512x512 icon into the 285x365 outfit box → 365x365
/// assert_eq!(cover_dimensions((512, 512), (285, 365)), (365, 365));
/// ```
pub fn cover_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;
    if src_w == 0 || src_h == 0 {
        return (0, 0);
    }

    let ratio = (tgt_w as f64 / src_w as f64).max(tgt_h as f64 / src_h as f64);
    ((src_w as f64 * ratio) as u32, (src_h as f64 * ratio) as u32)
}

/// Left offset that centers a `foreground`-wide element on a
/// `background`-wide one. Negative when the foreground is wider; odd
/// remainders round toward negative infinity.
pub fn center_x(foreground: u32, background: u32) -> i64 {
    (background as i64 - foreground as i64).div_euclid(2)
}

/// Source region and output size for a cover resize whose overhang is capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverCrop {
    /// Left edge of the kept source region; the region is horizontally centered
    /// and starts at the top.
    pub x: u32,
    pub width: u32,
    pub height: u32,
    pub out_width: u32,
    pub out_height: u32,
}

/// Crop needed so a cover resize stays within `overhang` times the target box.
///
/// `None` when the plain [`cover_dimensions`] result already fits. Otherwise
/// the source is cut down to the part that maps onto the capped output, so
/// extreme aspect ratios never allocate huge intermediate buffers.
pub fn bounded_cover(source: (u32, u32), target: (u32, u32), overhang: u32) -> Option<CoverCrop> {
    let (src_w, src_h) = source;
    let (w, h) = cover_dimensions(source, target);
    let limit_w = target.0.max(1) * overhang;
    let limit_h = target.1.max(1) * overhang;
    if w <= limit_w && h <= limit_h {
        return None;
    }

    let out_width = w.min(limit_w);
    let out_height = h.min(limit_h);
    let kept = |out: u32, full: u32, src: u32| {
        (out as u64 * src as u64 / full.max(1) as u64).clamp(1, src.max(1) as u64) as u32
    };
    let width = kept(out_width, w, src_w);
    let height = kept(out_height, h, src_h);
    Some(CoverCrop {
        x: (src_w - width) / 2,
        width,
        height,
        out_width,
        out_height,
    })
}

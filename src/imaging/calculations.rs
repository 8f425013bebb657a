//! Pure calculation functions for thumbnail dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the largest size that fits inside `bounds` while keeping the
/// aspect ratio of `source`.
///
/// Images that already fit are returned unchanged: thumbnails are never
/// upscaled. Each output edge is rounded to the nearest pixel and kept at
/// least 1px, so extreme panoramas still produce a valid image.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `bounds` - Maximum thumbnail dimensions (width, height)
///
/// # Returns
/// * `(width, height)` - Thumbnail dimensions, each within its bound
///
/// # Examples
/// ```
/// # use thumb_sync::imaging::calculate_fit_dimensions;
/// // 2:1 landscape into a 300px box → 300x150
/// assert_eq!(calculate_fit_dimensions((4000, 2000), (300, 300)), (300, 150));
///
/// // Already small enough → untouched
/// assert_eq!(calculate_fit_dimensions((100, 50), (300, 300)), (100, 50));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    if src_w == 0 || src_h == 0 || (src_w <= max_w && src_h <= max_h) {
        return source;
    }

    // The tighter of the two constraints decides the scale
    let ratio = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);
    let w = ((src_w as f64 * ratio).round() as u32).clamp(1, max_w.max(1));
    let h = ((src_h as f64 * ratio).round() as u32).clamp(1, max_h.max(1));
    (w, h)
}

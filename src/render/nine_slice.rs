//! Nine-slice resampling.
//!
//! A bitmap is split into a 3x3 grid by its border insets. Corners are
//! copied unscaled, the four edges stretch along one axis and the centre
//! stretches along both. The same routine shrinks a pre-stretched preview
//! back to its canonical size and grows a canonical bitmap to a requested
//! size.

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::types::Border;

/// Resample `src` to `target_w x target_h`, keeping `border` regions intact.
pub fn nine_slice_scale(src: &RgbaImage, target_w: u32, target_h: u32, border: Border) -> RgbaImage {
    let (sw, sh) = src.dimensions();
    let mut dst = RgbaImage::new(target_w, target_h);

    // Column and row spans as (src_start, src_len, dst_start, dst_len).
    let columns = spans(sw, target_w, border.left, border.right);
    let rows = spans(sh, target_h, border.top, border.bottom);

    for &(sy, sh_len, dy, dh_len) in &rows {
        for &(sx, sw_len, dx, dw_len) in &columns {
            if sw_len == 0 || sh_len == 0 || dw_len == 0 || dh_len == 0 {
                continue;
            }
            let region = imageops::crop_imm(src, sx, sy, sw_len, sh_len).to_image();
            let region = if (sw_len, sh_len) == (dw_len, dh_len) {
                region
            } else {
                imageops::resize(&region, dw_len, dh_len, FilterType::Triangle)
            };
            imageops::replace(&mut dst, &region, dx as i64, dy as i64);
        }
    }

    dst
}

/// Shrink an oversized, pre-stretched bitmap back to its canonical size.
pub fn reduce(src: &RgbaImage, target_w: u32, target_h: u32, border: Border) -> RgbaImage {
    nine_slice_scale(src, target_w, target_h, border)
}

/// Grow a canonical bitmap to the requested size.
pub fn expand(src: &RgbaImage, target_w: u32, target_h: u32, border: Border) -> RgbaImage {
    nine_slice_scale(src, target_w, target_h, border)
}

/// The three spans along one axis. Insets are clamped to the smaller of the
/// two lengths so corners never overlap.
fn spans(src_len: u32, dst_len: u32, start_inset: u32, end_inset: u32) -> [(u32, u32, u32, u32); 3] {
    let limit = src_len.min(dst_len);
    let start = start_inset.min(limit);
    let end = end_inset.min(limit - start);

    let src_mid = src_len.saturating_sub(start.saturating_add(end));
    let dst_mid = dst_len.saturating_sub(start.saturating_add(end));

    [
        (0, start, 0, start),
        (start, src_mid, start, dst_mid),
        (src_len - end, end, dst_len - end, end),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// Distinct colour per pixel so misplaced copies are caught.
    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| Rgba([(x * 20) as u8, (y * 20) as u8, 128, 255]))
    }

    fn region_eq(a: &RgbaImage, ax: u32, ay: u32, b: &RgbaImage, bx: u32, by: u32, w: u32, h: u32) -> bool {
        (0..h).all(|y| (0..w).all(|x| a.get_pixel(ax + x, ay + y) == b.get_pixel(bx + x, by + y)))
    }

    #[test]
    fn test_round_trip_preserves_corners() {
        let border = Border::new(2, 3, 4, 1);
        let (w, h) = (10, 12);
        let original = gradient(w, h);

        let expanded = expand(&original, w + 7, h + 7, border);
        assert_eq!(expanded.dimensions(), (17, 19));
        let reduced = reduce(&expanded, w, h, border);
        assert_eq!(reduced.dimensions(), (w, h));

        // top-left, top-right, bottom-left, bottom-right
        assert!(region_eq(&reduced, 0, 0, &original, 0, 0, 1, 2));
        assert!(region_eq(&reduced, w - 3, 0, &original, w - 3, 0, 3, 2));
        assert!(region_eq(&reduced, 0, h - 4, &original, 0, h - 4, 1, 4));
        assert!(region_eq(&reduced, w - 3, h - 4, &original, w - 3, h - 4, 3, 4));
    }

    #[test]
    fn test_expand_corners_copied_unscaled() {
        let border = Border::new(2, 2, 2, 2);
        let original = gradient(6, 6);
        let expanded = expand(&original, 20, 16, border);

        assert!(region_eq(&expanded, 0, 0, &original, 0, 0, 2, 2));
        assert!(region_eq(&expanded, 18, 14, &original, 4, 4, 2, 2));
    }

    #[test]
    fn test_edges_stretch_along_one_axis() {
        let border = Border::new(1, 1, 1, 1);
        let mut src = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 255]));
        // Top edge is a single red pixel.
        src.put_pixel(1, 0, Rgba([255, 0, 0, 255]));
        let out = expand(&src, 9, 3, border);

        for x in 1..8 {
            assert_eq!(*out.get_pixel(x, 0), Rgba([255, 0, 0, 255]), "x={x}");
        }
        assert_eq!(*out.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_degenerate_centre_skipped() {
        // Border consumes the whole target; only corners are drawn.
        let border = Border::new(2, 2, 2, 2);
        let out = reduce(&gradient(10, 10), 4, 4, border);
        assert_eq!(out.dimensions(), (4, 4));
        assert_eq!(*out.get_pixel(0, 0), *gradient(10, 10).get_pixel(0, 0));
        assert_eq!(*out.get_pixel(3, 3), *gradient(10, 10).get_pixel(9, 9));
    }

    #[test]
    fn test_oversized_border_clamped() {
        let out = expand(&gradient(4, 4), 8, 8, Border::new(10, 10, 10, 10));
        assert_eq!(out.dimensions(), (8, 8));
    }
}

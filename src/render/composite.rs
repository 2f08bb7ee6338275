//! Straight-alpha compositing primitives.
//!
//! Bitmaps are `image::RgbaImage` with non-premultiplied alpha. Coverage
//! masks are [`AlphaMap`]s holding one `f32` in `0..=1` per pixel.

use image::{GrayImage, Luma, Rgba, RgbaImage};

use crate::types::Colour;

/// Per-pixel coverage in `0..=1`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaMap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl AlphaMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; (width * height) as usize],
        }
    }

    /// Alpha channel of `image`, placed at `(dx, dy)` on a `width x height` canvas.
    pub fn from_image(image: &RgbaImage, width: u32, height: u32, dx: i32, dy: i32) -> Self {
        let mut map = Self::new(width, height);
        for (x, y, pixel) in image.enumerate_pixels() {
            let tx = x as i32 + dx;
            let ty = y as i32 + dy;
            if let Some(index) = map.index(tx, ty) {
                map.data[index] = pixel[3] as f32 / 255.0;
            }
        }
        map
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some((y as u32 * self.width + x as u32) as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> f32 {
        self.index(x, y).map_or(0.0, |i| self.data[i])
    }

    /// `1 - a` everywhere.
    pub fn inverted(&self) -> AlphaMap {
        AlphaMap {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|a| 1.0 - a).collect(),
        }
    }

    /// Keep coverage only where `other` does not cover (destination-out).
    pub fn subtract(&self, other: &AlphaMap) -> AlphaMap {
        AlphaMap {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| a * (1.0 - b))
                .collect(),
        }
    }

    /// Multiply coverage (destination-in).
    pub fn intersect(&self, other: &AlphaMap) -> AlphaMap {
        AlphaMap {
            width: self.width,
            height: self.height,
            data: self.data.iter().zip(&other.data).map(|(a, b)| a * b).collect(),
        }
    }

    /// Translate by a whole-pixel offset; uncovered pixels become `fill`.
    pub fn shifted(&self, dx: i32, dy: i32, fill: f32) -> AlphaMap {
        let mut out = AlphaMap {
            width: self.width,
            height: self.height,
            data: vec![fill; self.data.len()],
        };
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                if let Some(src) = self.index(x - dx, y - dy) {
                    let dst = (y as u32 * self.width + x as u32) as usize;
                    out.data[dst] = self.data[src];
                }
            }
        }
        out
    }

    /// Gaussian blur with the given sigma.
    pub fn blurred(&self, sigma: f32) -> AlphaMap {
        if sigma <= 0.0 {
            return self.clone();
        }
        let gray = GrayImage::from_fn(self.width, self.height, |x, y| {
            let a = self.data[(y * self.width + x) as usize];
            Luma([(a * 255.0).round() as u8])
        });
        let blurred = image::imageops::blur(&gray, sigma);
        AlphaMap {
            width: self.width,
            height: self.height,
            data: blurred.pixels().map(|p| p[0] as f32 / 255.0).collect(),
        }
    }

    /// Morphological dilation by sampling `samples` angular offsets at every
    /// whole distance up to `radius`. Pixels outside the map read as `outside`.
    ///
    /// Copies are accumulated with source-over semantics, so the result is
    /// at least the maximum of the shifted coverages. `scratch` is reused
    /// between calls to avoid reallocating the accumulator.
    pub fn dilated(&self, radius: f32, samples: usize, outside: f32, scratch: &mut Vec<f32>) -> AlphaMap {
        if radius <= 0.0 {
            return self.clone();
        }

        // Remaining transparency, multiplied down by every shifted copy.
        scratch.clear();
        scratch.extend(self.data.iter().map(|a| 1.0 - a));

        let mut offsets: Vec<(i32, i32)> = Vec::new();
        let steps = radius.ceil() as u32;
        for step in 1..=steps {
            let distance = (step as f32).min(radius);
            for i in 0..samples {
                let theta = i as f32 / samples as f32 * std::f32::consts::TAU;
                let offset = (
                    (theta.cos() * distance).round() as i32,
                    (theta.sin() * distance).round() as i32,
                );
                if offset != (0, 0) {
                    offsets.push(offset);
                }
            }
        }
        offsets.sort_unstable();
        offsets.dedup();

        for (dx, dy) in offsets {
            for y in 0..self.height as i32 {
                for x in 0..self.width as i32 {
                    let a = match self.index(x - dx, y - dy) {
                        Some(src) => self.data[src],
                        None => outside,
                    };
                    if a > 0.0 {
                        scratch[(y as u32 * self.width + x as u32) as usize] *= 1.0 - a;
                    }
                }
            }
        }

        AlphaMap {
            width: self.width,
            height: self.height,
            data: scratch.iter().map(|t| 1.0 - t).collect(),
        }
    }

    /// Erosion: the dilation of the transparent area, inverted.
    pub fn eroded(&self, radius: f32, samples: usize, scratch: &mut Vec<f32>) -> AlphaMap {
        self.inverted().dilated(radius, samples, 1.0, scratch).inverted()
    }

    /// Paint `colour` through this coverage (source-in).
    pub fn fill(&self, colour: Colour) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let a = self.data[(y * self.width + x) as usize] * colour.a as f32;
            Rgba([colour.r, colour.g, colour.b, a.round().clamp(0.0, 255.0) as u8])
        })
    }
}

/// Composite `src` over `dst` with `src`'s top-left at `(dx, dy)`.
pub fn draw_over(dst: &mut RgbaImage, src: &RgbaImage, dx: i32, dy: i32) {
    for (x, y, pixel) in src.enumerate_pixels() {
        let tx = x as i32 + dx;
        let ty = y as i32 + dy;
        if tx < 0 || ty < 0 || tx >= dst.width() as i32 || ty >= dst.height() as i32 {
            continue;
        }
        let under = dst.get_pixel_mut(tx as u32, ty as u32);
        *under = over(*pixel, *under);
    }
}

/// Keep `dst` only where `mask` is opaque (destination-in). Pixels outside
/// the placed mask are cleared.
pub fn destination_in(dst: &mut RgbaImage, mask: &RgbaImage, dx: i32, dy: i32) {
    let (w, h) = (mask.width() as i32, mask.height() as i32);
    for (x, y, pixel) in dst.enumerate_pixels_mut() {
        let mx = x as i32 - dx;
        let my = y as i32 - dy;
        let coverage = if mx < 0 || my < 0 || mx >= w || my >= h {
            0.0
        } else {
            mask.get_pixel(mx as u32, my as u32)[3] as f32 / 255.0
        };
        pixel[3] = (pixel[3] as f32 * coverage).round() as u8;
    }
}

/// Paint `src` onto `dst` without changing `dst`'s alpha (source-atop).
/// Both images must be the same size.
pub fn source_atop(dst: &mut RgbaImage, src: &RgbaImage) {
    for (under, top) in dst.pixels_mut().zip(src.pixels()) {
        if under[3] == 0 || top[3] == 0 {
            continue;
        }
        let t = top[3] as f32 / 255.0;
        for c in 0..3 {
            under[c] = (top[c] as f32 * t + under[c] as f32 * (1.0 - t)).round() as u8;
        }
    }
}

/// Source-over of two straight-alpha pixels.
pub fn over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0;
    if sa >= 1.0 {
        return src;
    }
    if sa <= 0.0 {
        return dst;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let mut out = [0u8; 4];
    for c in 0..3 {
        let value = (src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        out[c] = value.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    Rgba(out)
}

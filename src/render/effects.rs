//! Effect baking: flattens a layer's mask and effects into one bitmap.
//!
//! Compositing order is fixed:
//!
//! 1. the mask is applied to a private copy of the content;
//! 2. strokes are traced from the **unmasked** bitmap;
//! 3. drop shadows are cast by the **masked** content;
//! 4. gradient and colour overlays tint the masked content, each confined
//!    to the alpha that is already there, followed by inner shadows.
//!
//! The result is drawn shadow, content, stroke (bottom to top) onto a canvas
//! padded on every side so nothing is clipped.

use image::RgbaImage;

use crate::types::{
    ColorOverlay, Colour, Effect, GradientOverlay, LayerNode, Shadow, Stroke, StrokePosition,
};

use super::composite::{destination_in, draw_over, source_atop, AlphaMap};

/// Bitmap produced by [`EffectBaker::bake`].
#[derive(Debug, Clone)]
pub struct Baked {
    pub image: RgbaImage,
    /// Transparent margin added on every side; subtract it when placing the
    /// bitmap back in layer coordinates.
    pub padding: u32,
}

/// Number of angular samples used to dilate by `width` pixels.
pub fn stroke_samples(width: f32) -> usize {
    ((width * 8.0).ceil() as usize).clamp(16, 48)
}

/// Margin needed so strokes and drop shadows are not clipped.
pub fn required_padding(layer: &LayerNode) -> u32 {
    let mut padding = 0.0f32;
    for effect in layer.active_effects() {
        match effect {
            Effect::Stroke(stroke) => padding = padding.max(2.0 * stroke.size),
            Effect::DropShadow(shadow) => {
                padding = padding.max(shadow.size + shadow.distance);
            }
            _ => {}
        }
    }
    padding.max(0.0).ceil() as u32
}

/// Bakes layers. Owns scratch space, so give each thread its own baker.
#[derive(Debug, Default)]
pub struct EffectBaker {
    scratch: Vec<f32>,
}

impl EffectBaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten `layer`'s mask and effects.
    ///
    /// Passes run in the order mask, stroke (traced on the unmasked source),
    /// drop shadow (cast by the masked content), then overlays and inner
    /// shadow on the content. Stacking differs from that order: shadows sit
    /// at the bottom, the content above them and strokes on top.
    ///
    /// Returns `None` when the layer has no bitmap, or has neither an active
    /// mask nor an enabled effect; the original bitmap should then be used
    /// as-is.
    pub fn bake(&mut self, layer: &LayerNode) -> Option<Baked> {
        let source = layer.bitmap.as_ref()?;
        let mask = layer.active_mask();
        if mask.is_none() && layer.active_effects().next().is_none() {
            return None;
        }

        let padding = required_padding(layer);
        let pad = padding as i32;
        let width = source.width() + 2 * padding;
        let height = source.height() + 2 * padding;

        let mut content = RgbaImage::new(width, height);
        draw_over(&mut content, source, pad, pad);

        let raw_alpha = AlphaMap::from_image(source, width, height, pad, pad);

        if let Some(mask) = mask {
            match &mask.bitmap {
                Some(bitmap) => {
                    let dx = pad + mask.bounds.left - layer.bounds.left;
                    let dy = pad + mask.bounds.top - layer.bounds.top;
                    destination_in(&mut content, bitmap, dx, dy);
                }
                None => tracing::warn!(layer = %layer.name, "mask has no bitmap, ignoring"),
            }
        }

        let strokes: Vec<RgbaImage> = layer
            .active_effects()
            .filter_map(|e| match e {
                Effect::Stroke(stroke) => Some(self.render_stroke(&raw_alpha, stroke)),
                _ => None,
            })
            .collect();

        let masked_alpha = AlphaMap::from_image(&content, width, height, 0, 0);
        let shadows: Vec<RgbaImage> = layer
            .active_effects()
            .filter_map(|e| match e {
                Effect::DropShadow(shadow) => Some(render_drop_shadow(&masked_alpha, shadow)),
                _ => None,
            })
            .collect();

        let bounds = (pad, pad, source.width(), source.height());
        for effect in layer.active_effects() {
            if let Effect::GradientOverlay(gradient) = effect {
                apply_gradient(&mut content, gradient, bounds);
            }
        }
        for effect in layer.active_effects() {
            if let Effect::ColorOverlay(overlay) = effect {
                apply_color_overlay(&mut content, overlay);
            }
        }
        for effect in layer.active_effects() {
            if let Effect::InnerShadow(shadow) = effect {
                apply_inner_shadow(&mut content, shadow);
            }
        }

        let mut canvas = RgbaImage::new(width, height);
        for shadow in &shadows {
            draw_over(&mut canvas, shadow, 0, 0);
        }
        draw_over(&mut canvas, &content, 0, 0);
        for stroke in &strokes {
            draw_over(&mut canvas, stroke, 0, 0);
        }

        Some(Baked {
            image: canvas,
            padding,
        })
    }

    /// Render the stroke ring for `stroke` around the coverage `source`.
    ///
    /// The returned image has the same size as `source`.
    pub fn render_stroke(&mut self, source: &AlphaMap, stroke: &Stroke) -> RgbaImage {
        let width = stroke.size.max(0.0);
        let ring = match stroke.position {
            StrokePosition::Outside => {
                let grown = source.dilated(width, stroke_samples(width), 0.0, &mut self.scratch);
                grown.subtract(source)
            }
            StrokePosition::Inside => {
                let shrunk = source.eroded(width, stroke_samples(width), &mut self.scratch);
                source.subtract(&shrunk)
            }
            StrokePosition::Center => {
                let half = width / 2.0;
                let samples = stroke_samples(half);
                let grown = source.dilated(half, samples, 0.0, &mut self.scratch);
                let shrunk = source.eroded(half, samples, &mut self.scratch);
                grown.subtract(&shrunk)
            }
        };
        ring.fill(stroke.color.with_opacity(stroke.opacity))
    }
}

fn shadow_colour(shadow: &Shadow) -> Colour {
    Colour {
        a: 255,
        ..shadow.color
    }
    .with_opacity(shadow.opacity)
}

fn render_drop_shadow(content: &AlphaMap, shadow: &Shadow) -> RgbaImage {
    let (dx, dy) = shadow.offset();
    content
        .blurred(shadow.size / 2.0)
        .shifted(dx.round() as i32, dy.round() as i32, 0.0)
        .fill(shadow_colour(shadow))
}

fn apply_inner_shadow(content: &mut RgbaImage, shadow: &Shadow) {
    let (w, h) = content.dimensions();
    let alpha = AlphaMap::from_image(content, w, h, 0, 0);
    let (dx, dy) = shadow.offset();
    let cast = alpha
        .inverted()
        .shifted(dx.round() as i32, dy.round() as i32, 1.0)
        .blurred(shadow.size / 2.0)
        .intersect(&alpha);
    source_atop(content, &cast.fill(shadow_colour(shadow)));
}

/// Colour at `t` along normalised stops.
fn sample_stops(stops: &[crate::types::GradientStop], t: f32) -> Colour {
    let Some(first) = stops.first() else {
        return Colour::TRANSPARENT;
    };
    if t <= first.location {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if t <= b.location {
            let span = b.location - a.location;
            let local = if span > 0.0 { (t - a.location) / span } else { 1.0 };
            return a.color.mix(b.color, local);
        }
    }
    stops.last().map_or(Colour::TRANSPARENT, |s| s.color)
}

/// Linear gradient across `bounds` (x, y, w, h), confined to existing alpha.
fn apply_gradient(content: &mut RgbaImage, gradient: &GradientOverlay, bounds: (i32, i32, u32, u32)) {
    let stops = gradient.normalized_stops();
    if stops.is_empty() {
        return;
    }

    let (bx, by, bw, bh) = bounds;
    let radians = gradient.angle.to_radians();
    let (cos, sin) = (radians.cos(), radians.sin());
    let cx = bx as f32 + bw as f32 / 2.0;
    let cy = by as f32 + bh as f32 / 2.0;
    let length = (bw as f32 * cos).abs() + (bh as f32 * sin).abs();

    let (w, h) = content.dimensions();
    let layer = RgbaImage::from_fn(w, h, |x, y| {
        let px = x as f32 + 0.5 - cx;
        let py = y as f32 + 0.5 - cy;
        let t = if length > 0.0 {
            0.5 + (px * cos - py * sin) / length
        } else {
            0.0
        };
        let colour = sample_stops(&stops, t.clamp(0.0, 1.0)).with_opacity(gradient.opacity);
        image::Rgba(colour.to_rgba())
    });
    source_atop(content, &layer);
}

fn apply_color_overlay(content: &mut RgbaImage, overlay: &ColorOverlay) {
    let colour = overlay.color.with_opacity(overlay.opacity);
    let (w, h) = content.dimensions();
    let layer = RgbaImage::from_pixel(w, h, image::Rgba(colour.to_rgba()));
    source_atop(content, &layer);
}

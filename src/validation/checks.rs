//! Per-layer checks.
//!
//! Each check looks at one visible, non-excluded layer and reports what the
//! exporter would silently skip or get wrong.

use crate::classify::has_directive_marker;
use crate::layout::BoundsResolver;
use crate::types::{LayerKind, LayerNode, NodeDescriptor, NodeType};

use super::warning::Diagnostic;

/// A layer together with where it sits in the tree.
pub struct LayerContext<'a> {
    pub layer: &'a LayerNode,
    pub descriptor: &'a NodeDescriptor,
    /// Slash-separated path of layer names.
    pub path: &'a str,
}

/// A directive marker that did not parse stays in the export name.
pub fn check_nine_slice_syntax(ctx: &LayerContext, out: &mut Vec<Diagnostic>) {
    let name = &ctx.layer.name;
    if has_directive_marker(name) && ctx.descriptor.nine_slice.is_none() {
        out.push(
            Diagnostic::warning(
                "layerport::validate::nine-slice-syntax",
                ctx.path,
                format!("'{}' has a nine-slice marker that is not a valid directive", name),
            )
            .with_help("Use exactly six numbers: @9#W,H_a,b,c,d"),
        );
    }
}

/// The declared border must leave a centre inside the declared size.
pub fn check_nine_slice_fit(ctx: &LayerContext, out: &mut Vec<Diagnostic>) {
    let Some(slice) = ctx.descriptor.nine_slice else {
        return;
    };
    if !slice.border.fits(slice.width, slice.height) {
        out.push(Diagnostic::warning(
            "layerport::validate::nine-slice-border",
            ctx.path,
            format!(
                "border {}+{} x {}+{} does not fit {}x{}; the image is exported unsliced",
                slice.border.left,
                slice.border.right,
                slice.border.top,
                slice.border.bottom,
                slice.width,
                slice.height
            ),
        ));
    }
}

/// Raster layers need usable bounds and pixels.
pub fn check_raster(ctx: &LayerContext, out: &mut Vec<Diagnostic>) {
    if !is_raster(ctx) {
        return;
    }
    let layer = ctx.layer;

    let mask_fallback = layer
        .active_mask()
        .is_some_and(|m| !m.bounds.is_degenerate());
    if layer.bounds.is_degenerate() && !mask_fallback {
        out.push(
            Diagnostic::warning(
                "layerport::validate::degenerate-bounds",
                ctx.path,
                "layer has no area and no mask to take bounds from; it will be skipped",
            )
            .with_help("Rasterise the layer or give it a mask"),
        );
    }

    if layer.bitmap.is_none() {
        out.push(Diagnostic::warning(
            "layerport::validate::no-bitmap",
            ctx.path,
            "layer has no pixels; it will be skipped",
        ));
    }
}

/// Components with nothing visible inside are skipped.
pub fn check_component(ctx: &LayerContext, resolver: &BoundsResolver, out: &mut Vec<Diagnostic>) {
    if !(ctx.descriptor.node_type.is_component() && ctx.layer.is_group()) {
        return;
    }
    match resolver.visual_bounds(ctx.layer) {
        Ok(bounds) if bounds.is_degenerate() => out.push(Diagnostic::warning(
            "layerport::validate::empty-component",
            ctx.path,
            format!("component '{}' has no visible content", ctx.descriptor.export_name),
        )),
        Ok(_) => {}
        Err(e) => out.push(Diagnostic::error("layerport::validate::depth", ctx.path, e.to_string())),
    }
}

/// Whether the exporter will rasterise this layer.
fn is_raster(ctx: &LayerContext) -> bool {
    let layer = ctx.layer;
    match ctx.descriptor.node_type {
        NodeType::Group => false,
        NodeType::Component { .. } if layer.is_group() => false,
        ref t if t.is_text() && layer.text.is_some() => false,
        _ => layer.kind != LayerKind::Adjustment,
    }
}

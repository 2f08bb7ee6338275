//! Bottom-up walk of the layer tree.
//!
//! Children are fully resolved before their parent, so a component's file
//! is written (and its id known) before the node referencing it is built.
//! Storage is reached only through [`AssetSink`], which keeps the walk
//! independent of the output format.

use image::RgbaImage;

use crate::classify::classify;
use crate::error::{ExportError, Result};
use crate::layout::{text_frame, BoundsResolver};
use crate::package::{ImageKey, ResourceRef};
use crate::render::{nine_slice, required_padding, EffectBaker};
use crate::types::{
    Border, BorderOrder, Effect, LayerKind, LayerNode, NamingRules, NodeDescriptor, NodeType,
    Rect, MAX_DEPTH,
};

use super::text::TextContent;
use super::tree::{
    ComponentDef, NodeContent, OutputNode, TextNode, TextRole, TextShadow, TextStroke,
};
use super::ExportReport;

/// Where the walker reads and writes assets.
pub trait AssetSink {
    /// An already exported image the key can reuse.
    fn find_image(&mut self, key: &ImageKey) -> Option<ResourceRef>;

    fn store_image(&mut self, key: &ImageKey, image: &RgbaImage) -> Result<ResourceRef>;

    /// The file name a component will be written under, and whether it had
    /// to be changed to avoid a clash.
    fn component_name(&mut self, name: &str, common: bool) -> (String, bool);

    /// A component already written during this export.
    fn emitted_component(&mut self, name: &str, common: bool) -> Option<ResourceRef>;

    fn store_component(&mut self, def: &ComponentDef, common: bool) -> Result<ResourceRef>;
}

/// Walks a layer tree into display lists.
pub struct TreeWalker<'a> {
    rules: &'a NamingRules,
    order: BorderOrder,
    baker: EffectBaker,
    report: ExportReport,
    /// Set while inside a shared component; its assets are shared too.
    shared: bool,
}

impl<'a> TreeWalker<'a> {
    pub fn new(rules: &'a NamingRules, order: BorderOrder) -> Self {
        Self {
            rules,
            order,
            baker: EffectBaker::new(),
            report: ExportReport::default(),
            shared: false,
        }
    }

    pub fn into_report(self) -> ExportReport {
        self.report
    }

    /// Build the display list for `layers`, positioned relative to `origin`.
    pub fn build(&mut self, layers: &[LayerNode], origin: Rect, sink: &mut dyn AssetSink) -> Result<Vec<OutputNode>> {
        let mut out = Vec::new();
        for layer in layers {
            self.build_layer(layer, origin, 1.0, 0, sink, &mut out)?;
        }
        Ok(out)
    }

    fn build_layer(
        &mut self,
        layer: &LayerNode,
        origin: Rect,
        alpha: f32,
        depth: usize,
        sink: &mut dyn AssetSink,
        out: &mut Vec<OutputNode>,
    ) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(ExportError::Build {
                message: format!("Layer '{}' is nested deeper than {} levels", layer.name, MAX_DEPTH),
                help: Some("Flatten some of the enclosing groups".to_string()),
            });
        }
        if !layer.visible {
            tracing::debug!(layer = %layer.name, "hidden, skipped");
            return Ok(());
        }
        if layer.kind == LayerKind::Adjustment {
            tracing::debug!(layer = %layer.name, "adjustment layer, skipped");
            return Ok(());
        }

        let descriptor = classify(&layer.name, layer.kind, self.rules, self.order);
        if descriptor.is_excluded() {
            tracing::debug!(layer = %layer.name, "excluded with its subtree");
            self.report.skipped += 1;
            return Ok(());
        }

        let alpha = alpha * layer.opacity.clamp(0.0, 1.0);
        match &descriptor.node_type {
            NodeType::Component { engine_type, .. } if layer.is_group() => {
                self.build_component(layer, &descriptor, engine_type, origin, alpha, depth, sink, out)
            }
            NodeType::Group => {
                for child in &layer.children {
                    self.build_layer(child, origin, alpha, depth + 1, sink, out)?;
                }
                Ok(())
            }
            node_type if node_type.is_text() && layer.text.is_some() => {
                self.build_text(layer, &descriptor, origin, alpha, out);
                Ok(())
            }
            _ => self.build_image(layer, &descriptor, origin, alpha, sink, out),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_component(
        &mut self,
        layer: &LayerNode,
        descriptor: &NodeDescriptor,
        engine_type: &str,
        origin: Rect,
        alpha: f32,
        depth: usize,
        sink: &mut dyn AssetSink,
        out: &mut Vec<OutputNode>,
    ) -> Result<()> {
        let bounds = BoundsResolver::new(self.rules, self.order).visual_bounds(layer)?;
        if bounds.is_degenerate() {
            tracing::warn!(layer = %layer.name, "component has no visible content, skipped");
            self.report.skipped += 1;
            return Ok(());
        }

        let common = self.shared || descriptor.is_common();
        let (name, renamed) = sink.component_name(&descriptor.export_name, common);

        let resource = match sink.emitted_component(&name, common) {
            Some(resource) => resource,
            None => {
                if renamed {
                    self.report.renamed += 1;
                }
                let mut children = Vec::new();
                let outer = std::mem::replace(&mut self.shared, common);
                let built = layer
                    .children
                    .iter()
                    .try_for_each(|child| self.build_layer(child, bounds, 1.0, depth + 1, sink, &mut children));
                self.shared = outer;
                built?;
                let def = ComponentDef {
                    name,
                    engine_type: engine_type.to_string(),
                    width: bounds.width() as u32,
                    height: bounds.height() as u32,
                    children,
                };
                let resource = sink.store_component(&def, common)?;
                tracing::info!(component = %def.name, nodes = def.children.len(), "built component");
                self.report.components += 1;
                resource
            }
        };

        out.push(OutputNode {
            name: descriptor.instance_name.clone(),
            frame: bounds.relative_to(&origin),
            alpha,
            content: NodeContent::Component {
                resource,
                engine_type: engine_type.to_string(),
            },
        });
        Ok(())
    }

    fn build_text(&mut self, layer: &LayerNode, descriptor: &NodeDescriptor, origin: Rect, alpha: f32, out: &mut Vec<OutputNode>) {
        let Some(info) = &layer.text else {
            return;
        };
        let frame = text_frame(layer);
        if frame.is_degenerate() {
            tracing::warn!(layer = %layer.name, "text has degenerate bounds, skipped");
            self.report.skipped += 1;
            return;
        }

        let role = match descriptor.node_type {
            NodeType::InputText => TextRole::Input,
            NodeType::RichText => TextRole::Rich,
            _ => TextRole::Plain,
        };

        let mut stroke = None;
        let mut shadow = None;
        for effect in layer.active_effects() {
            match effect {
                Effect::Stroke(s) if stroke.is_none() => {
                    stroke = Some(TextStroke {
                        color: s.color.with_opacity(s.opacity),
                        size: s.size,
                    })
                }
                Effect::DropShadow(s) if shadow.is_none() => {
                    shadow = Some(TextShadow {
                        color: s.color.with_opacity(s.opacity),
                        offset: s.offset(),
                    })
                }
                _ => {}
            }
        }

        out.push(OutputNode {
            name: descriptor.instance_name.clone(),
            frame: frame.relative_to(&origin),
            alpha,
            content: NodeContent::Text(TextNode {
                role,
                content: TextContent::from_runs(&info.effective_runs()),
                font: info.font.clone(),
                size: info.scaled_size().round().max(1.0) as u32,
                align: info.align,
                bold: info.bold,
                letter_spacing: info.letter_spacing,
                leading: info.leading,
                stroke,
                shadow,
            }),
        });
    }

    fn build_image(
        &mut self,
        layer: &LayerNode,
        descriptor: &NodeDescriptor,
        origin: Rect,
        alpha: f32,
        sink: &mut dyn AssetSink,
        out: &mut Vec<OutputNode>,
    ) -> Result<()> {
        let placed;
        let layer = if layer.bounds.is_degenerate() {
            match layer.active_mask().filter(|m| !m.bounds.is_degenerate()) {
                Some(mask) => {
                    tracing::debug!(layer = %layer.name, "degenerate bounds, using mask bounds");
                    placed = LayerNode {
                        bounds: mask.bounds,
                        ..layer.clone()
                    };
                    &placed
                }
                None => {
                    tracing::warn!(layer = %layer.name, "degenerate bounds and no mask, skipped");
                    self.report.skipped += 1;
                    return Ok(());
                }
            }
        } else {
            layer
        };

        let Some(bitmap) = &layer.bitmap else {
            tracing::warn!(layer = %layer.name, "no bitmap, skipped");
            self.report.skipped += 1;
            return Ok(());
        };

        let needs_bake = layer.active_mask().is_some() || layer.active_effects().next().is_some();
        let padding = if needs_bake { required_padding(layer) } else { 0 };

        let margin = padding.saturating_mul(2);
        let mut width = bitmap.width().saturating_add(margin);
        let mut height = bitmap.height().saturating_add(margin);
        let mut border = None;
        if let Some(slice) = descriptor.nine_slice {
            match sliced_size(slice.width, slice.height, slice.border, padding) {
                Some((w, h, padded)) => {
                    width = w;
                    height = h;
                    border = Some(padded);
                }
                None => {
                    tracing::warn!(layer = %layer.name, "nine-slice border does not fit its size, exporting unsliced");
                }
            }
        }

        let key = ImageKey {
            name: &descriptor.export_name,
            common: self.shared || descriptor.is_common(),
            width,
            height,
            border,
        };

        let resource = match sink.find_image(&key) {
            Some(resource) => {
                tracing::debug!(layer = %layer.name, id = %resource.id, "reused image");
                self.report.reused += 1;
                resource
            }
            None => {
                let baked = match self.baker.bake(layer) {
                    Some(baked) => baked.image,
                    None => bitmap.clone(),
                };
                let image = match border {
                    Some(border) => nine_slice::reduce(&baked, width, height, border),
                    None => baked,
                };
                let resource = sink.store_image(&key, &image)?;
                self.report.written += 1;
                resource
            }
        };

        let content = match descriptor.node_type {
            NodeType::Loader => NodeContent::Loader { resource },
            _ => NodeContent::Image {
                resource,
                sliced: border.is_some(),
            },
        };
        out.push(OutputNode {
            name: descriptor.instance_name.clone(),
            frame: layer.bounds.inflate(padding as i32).relative_to(&origin),
            alpha,
            content,
        });
        Ok(())
    }
}

/// Stored size and border of a nine-slice image grown by `padding` on each
/// side. `None` when the border leaves no centre or the sizes overflow.
fn sliced_size(width: u32, height: u32, border: Border, padding: u32) -> Option<(u32, u32, Border)> {
    if !border.fits(width, height) {
        return None;
    }
    let margin = padding.checked_mul(2)?;
    let padded = Border::new(
        border.top.checked_add(padding)?,
        border.right.checked_add(padding)?,
        border.bottom.checked_add(padding)?,
        border.left.checked_add(padding)?,
    );
    Some((width.checked_add(margin)?, height.checked_add(margin)?, padded))
}

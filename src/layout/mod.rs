//! Visual bounds of layers.
//!
//! Most layers report their own geometry. Groups decoded from some fill-layer
//! encodings carry a degenerate rectangle; their extent is recovered from
//! their children instead. Text layers get a separate frame correction, see
//! [`text_frame`].

mod text;

pub use text::{text_frame, POINT_TEXT_ASCENT};

use crate::classify::classify;
use crate::error::{ExportError, Result};
use crate::types::{BorderOrder, LayerNode, NamingRules, Rect, MAX_DEPTH};

/// Computes effective bounds for layers under one naming-rule table.
#[derive(Debug, Clone, Copy)]
pub struct BoundsResolver<'a> {
    rules: &'a NamingRules,
    order: BorderOrder,
}

impl<'a> BoundsResolver<'a> {
    pub fn new(rules: &'a NamingRules, order: BorderOrder) -> Self {
        Self { rules, order }
    }

    /// The rectangle `layer` visually occupies.
    ///
    /// Non-group layers and groups with real geometry return their bounds
    /// unchanged. A degenerate group returns the union of its visible,
    /// non-excluded children, or [`Rect::ZERO`] when none contribute.
    pub fn visual_bounds(&self, layer: &LayerNode) -> Result<Rect> {
        self.visual_bounds_at(layer, 0)
    }

    fn visual_bounds_at(&self, layer: &LayerNode, depth: usize) -> Result<Rect> {
        if depth > MAX_DEPTH {
            return Err(ExportError::Build {
                message: format!("Layer '{}' is nested deeper than {} levels", layer.name, MAX_DEPTH),
                help: Some("Flatten some of the enclosing groups".to_string()),
            });
        }

        if !layer.is_group() || !layer.bounds.is_degenerate() {
            return Ok(layer.bounds);
        }

        let mut union = Rect::ZERO;
        for child in &layer.children {
            if !self.contributes(child) {
                continue;
            }
            let bounds = self.visual_bounds_at(child, depth + 1)?;
            union = union.union(&bounds);
        }
        Ok(union)
    }

    fn contributes(&self, layer: &LayerNode) -> bool {
        layer.visible && !classify(&layer.name, layer.kind, self.rules, self.order).is_excluded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LayerKind;

    fn group(children: Vec<LayerNode>) -> LayerNode {
        LayerNode::new(1, "fill", LayerKind::Group, Rect::ZERO).with_children(children)
    }

    fn image(id: u32, name: &str, bounds: Rect) -> LayerNode {
        LayerNode::new(id, name, LayerKind::Image, bounds)
    }

    fn resolve(layer: &LayerNode) -> Result<Rect> {
        let rules = NamingRules::default();
        BoundsResolver::new(&rules, BorderOrder::TopRightBottomLeft).visual_bounds(layer)
    }

    #[test]
    fn test_leaf_bounds_unchanged() {
        let layer = image(2, "a", Rect::new(3, 4, 5, 6));
        assert_eq!(resolve(&layer).unwrap(), Rect::new(3, 4, 5, 6));
    }

    #[test]
    fn test_degenerate_group_unions_children() {
        let layer = group(vec![
            image(2, "a", Rect::new(0, 0, 10, 10)),
            image(3, "b", Rect::new(5, 5, 20, 20)),
        ]);
        assert_eq!(resolve(&layer).unwrap(), Rect::new(0, 0, 20, 20));
    }

    #[test]
    fn test_group_with_geometry_kept() {
        let mut layer = group(vec![image(2, "a", Rect::new(0, 0, 10, 10))]);
        layer.bounds = Rect::new(1, 1, 4, 4);
        assert_eq!(resolve(&layer).unwrap(), Rect::new(1, 1, 4, 4));
    }

    #[test]
    fn test_empty_group_is_zero() {
        assert_eq!(resolve(&group(vec![])).unwrap(), Rect::ZERO);
    }

    #[test]
    fn test_excluded_and_hidden_children_ignored() {
        let mut hidden = image(3, "hidden", Rect::new(0, 0, 50, 50));
        hidden.visible = false;
        let layer = group(vec![
            image(2, "skipped@skip", Rect::new(0, 0, 100, 100)),
            hidden,
        ]);
        assert_eq!(resolve(&layer).unwrap(), Rect::ZERO);

        let layer = group(vec![
            image(2, "skipped@skip", Rect::new(0, 0, 100, 100)),
            image(4, "kept", Rect::new(7, 8, 9, 10)),
        ]);
        assert_eq!(resolve(&layer).unwrap(), Rect::new(7, 8, 9, 10));
    }

    #[test]
    fn test_nested_degenerate_groups() {
        let inner = group(vec![image(3, "a", Rect::new(2, 2, 6, 6))]);
        let outer = group(vec![inner, image(4, "b", Rect::new(10, 0, 12, 3))]);
        assert_eq!(resolve(&outer).unwrap(), Rect::new(2, 0, 12, 6));
    }

    #[test]
    fn test_depth_limit() {
        let mut layer = image(0, "leaf", Rect::new(0, 0, 1, 1));
        for _ in 0..=MAX_DEPTH + 1 {
            layer = group(vec![layer]);
        }
        assert!(matches!(resolve(&layer), Err(ExportError::Build { .. })));
    }
}

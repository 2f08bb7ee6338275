//! Text frame correction.
//!
//! Decoders report text bounds as the glyph bounding box. Target renderers
//! place text by its line box instead, so point text is moved up to account
//! for the ascent and paragraph text takes its size from the declared box.

use crate::types::{LayerNode, Rect, TextAlign};

/// Fraction of the font size point text is raised by.
pub const POINT_TEXT_ASCENT: f32 = 0.15;

/// The frame a text layer should occupy in the output.
///
/// Returns the layer's bounds unchanged for layers without text metadata.
pub fn text_frame(layer: &LayerNode) -> Rect {
    let bounds = layer.bounds;
    let Some(text) = &layer.text else {
        return bounds;
    };

    let Some(text_box) = text.text_box else {
        let rise = (text.scaled_size() * POINT_TEXT_ASCENT).round() as i32;
        return bounds.translate(0, -rise);
    };

    let (sx, sy) = text.scale();
    let width = (text_box.width() as f64 * sx).round() as i32;
    let height = (text_box.height() as f64 * sy).round() as i32;

    let top = match text.transform {
        Some([.., ty]) => (ty + text_box.top as f64 * sy).round() as i32,
        None => bounds.top,
    };

    // Keep the edge the alignment anchors to.
    let left = match text.align {
        TextAlign::Left | TextAlign::Justify => bounds.left,
        TextAlign::Right => bounds.right - width,
        TextAlign::Center => (bounds.left + bounds.right) / 2 - width / 2,
    };

    Rect::from_xywh(left, top, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Colour, LayerKind, TextInfo};

    fn text_layer(bounds: Rect, info: TextInfo) -> LayerNode {
        LayerNode::new(1, "t", LayerKind::Text, bounds).with_text(info)
    }

    #[test]
    fn test_point_text_raised() {
        let layer = text_layer(
            Rect::new(10, 100, 60, 120),
            TextInfo::new("Hi", "Arial", 20.0, Colour::BLACK),
        );
        assert_eq!(text_frame(&layer), Rect::new(10, 97, 60, 117));
    }

    #[test]
    fn test_box_text_left_aligned() {
        let mut info = TextInfo::new("Hi", "Arial", 20.0, Colour::BLACK);
        info.text_box = Some(Rect::new(0, 0, 100, 40));
        info.transform = Some([1.0, 0.0, 0.0, 1.0, 10.0, 50.0]);
        let layer = text_layer(Rect::new(12, 55, 40, 75), info);
        assert_eq!(text_frame(&layer), Rect::new(12, 50, 112, 90));
    }

    #[test]
    fn test_box_text_right_keeps_right_edge() {
        let mut info = TextInfo::new("Hi", "Arial", 20.0, Colour::BLACK);
        info.align = TextAlign::Right;
        info.text_box = Some(Rect::new(0, 0, 50, 20));
        info.transform = Some([2.0, 0.0, 0.0, 2.0, 0.0, 0.0]);
        let layer = text_layer(Rect::new(100, 10, 200, 50), info);
        let frame = text_frame(&layer);
        assert_eq!(frame.right, 200);
        assert_eq!(frame.width(), 100);
        assert_eq!(frame.height(), 40);
        assert_eq!(frame.top, 0);
    }

    #[test]
    fn test_box_text_centered() {
        let mut info = TextInfo::new("Hi", "Arial", 20.0, Colour::BLACK);
        info.align = TextAlign::Center;
        info.text_box = Some(Rect::new(0, 0, 40, 20));
        let layer = text_layer(Rect::new(100, 10, 120, 30), info);
        assert_eq!(text_frame(&layer), Rect::new(90, 10, 130, 30));
    }

    #[test]
    fn test_non_text_unchanged() {
        let layer = LayerNode::new(1, "img", LayerKind::Image, Rect::new(1, 2, 3, 4));
        assert_eq!(text_frame(&layer), Rect::new(1, 2, 3, 4));
    }
}

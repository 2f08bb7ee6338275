//! The decoded layer tree.
//!
//! These types are produced by an external decoder and are read-only to the
//! export pipeline. Bitmaps are loaded separately (see
//! [`crate::discovery::load_document`]) and are never decoded here.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use super::{Colour, Effect, Rect};

/// A decoded layered-image document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Dots per inch.
    #[serde(default = "default_resolution")]
    pub resolution: f32,
    /// Top-level layers, bottom to top.
    #[serde(default)]
    pub layers: Vec<LayerNode>,
}

fn default_resolution() -> f32 {
    72.0
}

impl Document {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            resolution: default_resolution(),
            layers: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Text,
    Image,
    Group,
    Shape,
    Adjustment,
}

/// One node of the layer tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerNode {
    pub id: u32,
    pub name: String,
    pub kind: LayerKind,
    #[serde(default)]
    pub bounds: Rect,
    #[serde(default = "visible")]
    pub visible: bool,
    #[serde(default = "full_opacity")]
    pub opacity: f32,
    #[serde(default = "default_blend_mode")]
    pub blend_mode: String,
    /// Children, bottom to top. Only groups have them.
    #[serde(default)]
    pub children: Vec<LayerNode>,
    #[serde(default)]
    pub text: Option<TextInfo>,
    #[serde(default)]
    pub mask: Option<Mask>,
    #[serde(default)]
    pub effects: Vec<Effect>,
    /// Path of the layer's PNG relative to the document file.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(skip)]
    pub bitmap: Option<RgbaImage>,
}

fn visible() -> bool {
    true
}

fn full_opacity() -> f32 {
    1.0
}

fn default_blend_mode() -> String {
    "normal".to_string()
}

impl LayerNode {
    /// A bare layer, mostly useful for building trees in code.
    pub fn new(id: u32, name: impl Into<String>, kind: LayerKind, bounds: Rect) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            bounds,
            visible: true,
            opacity: 1.0,
            blend_mode: default_blend_mode(),
            children: Vec::new(),
            text: None,
            mask: None,
            effects: Vec::new(),
            image: None,
            bitmap: None,
        }
    }

    pub fn with_bitmap(mut self, bitmap: RgbaImage) -> Self {
        self.bitmap = Some(bitmap);
        self
    }

    pub fn with_children(mut self, children: Vec<LayerNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_mask(mut self, mask: Mask) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn with_text(mut self, text: TextInfo) -> Self {
        self.text = Some(text);
        self
    }

    pub fn is_group(&self) -> bool {
        self.kind == LayerKind::Group
    }

    /// The mask, if present and not disabled.
    pub fn active_mask(&self) -> Option<&Mask> {
        self.mask.as_ref().filter(|m| !m.disabled)
    }

    /// Enabled effects only.
    pub fn active_effects(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter().filter(|e| e.is_enabled())
    }
}

/// A layer mask. Opaque mask pixels keep the layer's content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mask {
    pub bounds: Rect,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(skip)]
    pub bitmap: Option<RgbaImage>,
}

impl Mask {
    pub fn new(bounds: Rect, bitmap: RgbaImage) -> Self {
        Self {
            bounds,
            disabled: false,
            image: None,
            bitmap: Some(bitmap),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// A contiguous span of text sharing one colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub color: Colour,
}

impl TextRun {
    pub fn new(text: impl Into<String>, color: Colour) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }
}

/// Text metadata of a text layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextInfo {
    pub text: String,
    #[serde(default)]
    pub runs: Vec<TextRun>,
    #[serde(default)]
    pub font: String,
    pub size: f32,
    #[serde(default = "default_text_colour")]
    pub color: Colour,
    #[serde(default)]
    pub align: TextAlign,
    /// Paragraph box in text-local coordinates; absent for point text.
    #[serde(default, rename = "box")]
    pub text_box: Option<Rect>,
    /// `[xx, xy, yx, yy, tx, ty]`.
    #[serde(default)]
    pub transform: Option<[f64; 6]>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub letter_spacing: f32,
    #[serde(default)]
    pub leading: Option<f32>,
}

fn default_text_colour() -> Colour {
    Colour::BLACK
}

impl TextInfo {
    pub fn new(text: impl Into<String>, font: impl Into<String>, size: f32, color: Colour) -> Self {
        Self {
            text: text.into(),
            runs: Vec::new(),
            font: font.into(),
            size,
            color,
            align: TextAlign::Left,
            text_box: None,
            transform: None,
            bold: false,
            letter_spacing: 0.0,
            leading: None,
        }
    }

    /// Runs, or a single run covering the whole text when none were decoded.
    pub fn effective_runs(&self) -> Vec<TextRun> {
        if self.runs.is_empty() {
            vec![TextRun::new(self.text.clone(), self.color)]
        } else {
            self.runs.clone()
        }
    }

    /// Horizontal and vertical scale of the text transform.
    pub fn scale(&self) -> (f64, f64) {
        match self.transform {
            Some([xx, xy, yx, yy, _, _]) => ((xx * xx + xy * xy).sqrt(), (yx * yx + yy * yy).sqrt()),
            None => (1.0, 1.0),
        }
    }

    /// Font size after applying the transform's vertical scale.
    pub fn scaled_size(&self) -> f32 {
        (self.size as f64 * self.scale().1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_document() {
        let json = r##"{
            "name": "Main",
            "width": 640,
            "height": 480,
            "layers": [
                {"id": 1, "name": "bg", "kind": "image",
                 "bounds": {"left": 0, "top": 0, "right": 640, "bottom": 480},
                 "image": "layers/1.png"},
                {"id": 2, "name": "Title", "kind": "text",
                 "bounds": {"left": 10, "top": 10, "right": 110, "bottom": 40},
                 "text": {"text": "Hello", "size": 24, "color": "#ffffff", "align": "center"}}
            ]
        }"##;

        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.resolution, 72.0);
        assert_eq!(doc.layers.len(), 2);
        assert!(doc.layers[0].visible);
        assert_eq!(doc.layers[0].opacity, 1.0);
        assert_eq!(doc.layers[0].image.as_deref(), Some("layers/1.png"));
        let text = doc.layers[1].text.as_ref().unwrap();
        assert_eq!(text.align, TextAlign::Center);
        assert_eq!(text.effective_runs(), vec![TextRun::new("Hello", Colour::WHITE)]);
    }

    #[test]
    fn test_text_scale() {
        let mut text = TextInfo::new("a", "Arial", 10.0, Colour::BLACK);
        text.transform = Some([2.0, 0.0, 0.0, 1.5, 0.0, 0.0]);
        assert_eq!(text.scale(), (2.0, 1.5));
        assert_eq!(text.scaled_size(), 15.0);
    }

    #[test]
    fn test_active_mask_skips_disabled() {
        let mut mask = Mask::new(Rect::new(0, 0, 2, 2), RgbaImage::new(2, 2));
        mask.disabled = true;
        let layer = LayerNode::new(1, "a", LayerKind::Image, Rect::new(0, 0, 2, 2)).with_mask(mask);
        assert!(layer.active_mask().is_none());
    }
}

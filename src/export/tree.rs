//! Format-neutral output tree produced by the walker.

use crate::package::ResourceRef;
use crate::types::{Colour, Rect, TextAlign};

use super::text::TextContent;

/// A component or view definition: one output file.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDef {
    /// File name without extension.
    pub name: String,
    /// Engine-side type; empty for plain components and views.
    pub engine_type: String,
    pub width: u32,
    pub height: u32,
    /// Display list, bottom to top.
    pub children: Vec<OutputNode>,
}

/// One node in a display list.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputNode {
    pub name: String,
    /// Position and size relative to the enclosing component.
    pub frame: Rect,
    pub alpha: f32,
    pub content: NodeContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    Image {
        resource: ResourceRef,
        /// The image is a nine-slice sprite stretched to the frame.
        sliced: bool,
    },
    Loader {
        resource: ResourceRef,
    },
    Text(TextNode),
    Component {
        resource: ResourceRef,
        engine_type: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    Plain,
    Input,
    Rich,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStroke {
    pub color: Colour,
    pub size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextShadow {
    pub color: Colour,
    pub offset: (f32, f32),
}

/// A text field. Text layers are never rasterised.
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub role: TextRole,
    pub content: TextContent,
    pub font: String,
    pub size: u32,
    pub align: TextAlign,
    pub bold: bool,
    pub letter_spacing: f32,
    pub leading: Option<f32>,
    pub stroke: Option<TextStroke>,
    pub shadow: Option<TextShadow>,
}

//! Core data types for the export pipeline.

mod colour;
mod descriptor;
mod effect;
mod geometry;
mod layer;
mod naming;

pub use colour::Colour;
pub use descriptor::{NineSlice, NodeDescriptor, NodeFlags, NodeType};
pub use effect::{
    ColorOverlay, Effect, GradientOverlay, GradientStop, Shadow, Stroke, StrokePosition,
    GRADIENT_LOCATION_RANGE,
};
pub use geometry::{Border, Rect};
pub use layer::{Document, LayerKind, LayerNode, Mask, TextAlign, TextInfo, TextRun};
pub use naming::{ComponentRule, NamingRules};

/// Maximum group nesting the pipeline will walk.
pub const MAX_DEPTH: usize = 256;

/// The two output flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    /// XML component/resource packages.
    #[default]
    Fairygui,
    /// YAML prefabs with PNG sprites and `.meta` sidecars.
    Unity,
}

/// Order of the four trailing numbers of a nine-slice directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderOrder {
    TopRightBottomLeft,
    LeftBottomRightTop,
}

impl BorderOrder {
    /// Map four directive values onto a [`Border`].
    pub fn to_border(self, v: [u32; 4]) -> Border {
        match self {
            BorderOrder::TopRightBottomLeft => Border::new(v[0], v[1], v[2], v[3]),
            BorderOrder::LeftBottomRightTop => Border::new(v[3], v[2], v[1], v[0]),
        }
    }
}

impl TargetFormat {
    pub fn border_order(self) -> BorderOrder {
        match self {
            TargetFormat::Fairygui => BorderOrder::TopRightBottomLeft,
            TargetFormat::Unity => BorderOrder::LeftBottomRightTop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_border_orders() {
        let values = [1, 2, 3, 4];
        assert_eq!(
            BorderOrder::TopRightBottomLeft.to_border(values),
            Border::new(1, 2, 3, 4)
        );
        // left=1, bottom=2, right=3, top=4
        assert_eq!(
            BorderOrder::LeftBottomRightTop.to_border(values),
            Border::new(4, 3, 2, 1)
        );
    }
}

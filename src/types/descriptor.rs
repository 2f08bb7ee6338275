//! Semantic descriptor derived from a layer name.

use std::fmt;

use super::Border;

/// What a layer becomes in the output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeType {
    Image,
    Text,
    InputText,
    RichText,
    Component { engine_type: String, tag: String },
    Loader,
    Group,
}

impl NodeType {
    pub fn is_text(&self) -> bool {
        matches!(self, NodeType::Text | NodeType::InputText | NodeType::RichText)
    }

    pub fn is_component(&self) -> bool {
        matches!(self, NodeType::Component { .. })
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Image => write!(f, "image"),
            NodeType::Text => write!(f, "text"),
            NodeType::InputText => write!(f, "input"),
            NodeType::RichText => write!(f, "richtext"),
            NodeType::Component { engine_type, .. } if engine_type.is_empty() => {
                write!(f, "component")
            }
            NodeType::Component { engine_type, .. } => write!(f, "component:{}", engine_type),
            NodeType::Loader => write!(f, "loader"),
            NodeType::Group => write!(f, "group"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeFlags {
    pub common: bool,
    pub exported: bool,
    pub no_export: bool,
    pub img: bool,
}

/// Nine-slice directive: the canonical size plus its border insets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NineSlice {
    pub width: u32,
    pub height: u32,
    pub border: Border,
}

/// The classification of one layer. Never mutated once computed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeDescriptor {
    /// Sanitised identifier used for file names.
    pub export_name: String,
    /// Name given to the instance inside its parent.
    pub instance_name: String,
    pub node_type: NodeType,
    pub flags: NodeFlags,
    pub nine_slice: Option<NineSlice>,
}

impl NodeDescriptor {
    pub fn is_common(&self) -> bool {
        self.flags.common
    }

    pub fn is_excluded(&self) -> bool {
        self.flags.no_export
    }
}

//! layerport - layered image export pipeline
//!
//! Turns a decoded layered-image document into engine-ready UI assets:
//! XML component packages with a shared resource manifest, or YAML prefabs
//! with PNG sprites and `.meta` sidecars.

pub mod classify;
pub mod cli;
pub mod discovery;
pub mod error;
pub mod export;
pub mod layout;
pub mod logging;
pub mod output;
pub mod package;
pub mod render;
pub mod types;
pub mod validation;

pub use classify::classify;
pub use discovery::{find_config, load_document, parse_document, ExportConfig, ResourceIndex};
pub use error::{ExportError, Result};
pub use export::{export, ExportOptions, ExportReport, TreeWalker};
pub use layout::BoundsResolver;
pub use package::{Directory, FsDirectory, MemoryDirectory, PackageManager, SpriteManager};
pub use render::EffectBaker;
pub use types::{Document, LayerKind, LayerNode, NamingRules, NodeDescriptor, NodeType, TargetFormat};
pub use validation::{validate_document, Diagnostic, Severity, ValidationResult};

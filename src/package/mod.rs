//! Output storage: directories, identifiers, manifests and the managers that
//! place exported assets into packages (XML format) or asset folders
//! (prefab format).

mod directory;
mod ids;
mod manager;
mod manifest;
mod meta;
mod sprites;

pub use directory::{join, Directory, FsDirectory, MemoryDirectory};
pub use ids::{IdGenerator, RandomIds, SequentialIds, ID_LENGTH};
pub use manager::{PackageManager, ASSETS_FOLDER, COMPONENT_FOLDER, VIEW_FOLDER};
pub use manifest::{ManifestEntry, PackageManifest, ResourceKind, MANIFEST_FILE};
pub use meta::{prefab_meta, sprite_meta};
pub use sprites::SpriteManager;

use crate::types::Border;

/// Something the output can point at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    /// Resource id (XML format) or guid (prefab format).
    pub id: String,
    /// Owning package id, set only when it differs from the package being
    /// written.
    pub package: Option<String>,
    /// File path relative to the owning package or the target root.
    pub file: String,
    pub width: u32,
    pub height: u32,
}

/// Lookup key for an exported image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageKey<'a> {
    pub name: &'a str,
    pub common: bool,
    /// Size of the bitmap as it will be stored.
    pub width: u32,
    pub height: u32,
    pub border: Option<Border>,
}

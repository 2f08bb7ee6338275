//! Inputs of an export: the project configuration, the decoded document and
//! the assets already present in the target directory.

mod config;
mod loader;
mod scanner;

use std::path::Path;

use crate::error::Result;

pub use config::{ExportConfig, PackageLayout, UnityLayout};
pub use loader::{load_document, parse_document};
pub use scanner::{
    parse_meta_guid, scan_meta, scan_packages, IndexedResource, MetaIndex, MetaRecord,
    ResourceIndex,
};

/// The name of the configuration file.
pub const CONFIG_FILENAME: &str = "layerport.yaml";

/// Load `layerport.yaml` from `root`, or defaults when there is none.
///
/// Returns the configuration and whether a file was found.
pub fn find_config(root: &Path) -> Result<(ExportConfig, bool)> {
    let path = root.join(CONFIG_FILENAME);
    if path.exists() {
        Ok((ExportConfig::load(&path)?, true))
    } else {
        Ok((ExportConfig::default(), false))
    }
}

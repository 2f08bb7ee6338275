//! Project configuration (layerport.yaml) parsing.
//!
//! The configuration selects the output format, the layer naming rules and
//! where each kind of output lands inside the target directory.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};
use crate::types::{NamingRules, TargetFormat};

/// Package names for the XML package format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageLayout {
    /// Folder holding every package, relative to the target directory.
    pub root: String,
    /// Package receiving the exported view. Defaults to the document name.
    pub current: Option<String>,
    /// Package for shared (`common_`) assets and components.
    pub common: String,
    /// Package for images larger than the size threshold.
    pub big: String,
}

impl Default for PackageLayout {
    fn default() -> Self {
        Self {
            root: "assets".to_string(),
            current: None,
            common: "Common".to_string(),
            big: "BigAssets".to_string(),
        }
    }
}

/// Folders for the prefab format, relative to the target directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnityLayout {
    pub sprites: String,
    pub output: String,
    pub fonts: String,
    pub pixels_per_unit: f32,
}

impl Default for UnityLayout {
    fn default() -> Self {
        Self {
            sprites: "Assets/UI/Sprites".to_string(),
            output: "Assets/UI/Prefabs".to_string(),
            fonts: "Assets/UI/Fonts".to_string(),
            pixels_per_unit: 100.0,
        }
    }
}

/// Export configuration loaded from layerport.yaml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub format: TargetFormat,
    pub naming: NamingRules,
    pub packages: PackageLayout,
    pub unity: UnityLayout,
    /// Images wider or taller than this many pixels go to the big package.
    pub big_asset_threshold: u32,
    /// Rewrite images that already exist instead of reusing them.
    pub overwrite_assets: bool,
}

fn default_threshold() -> u32 {
    512
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: TargetFormat::default(),
            naming: NamingRules::default(),
            packages: PackageLayout::default(),
            unity: UnityLayout::default(),
            big_asset_threshold: default_threshold(),
            overwrite_assets: false,
        }
    }
}

impl ExportConfig {
    /// Load configuration from a layerport.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ExportError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read config: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ExportError::Parse {
            message: format!("Invalid config: {}", e),
            help: Some("Check layerport.yaml syntax".to_string()),
        })
    }

    /// Serialise back to YAML, as written by `layerport init`.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| ExportError::build(format!("Failed to serialise config: {}", e)))
    }

    /// Name of the package the view of `document` is written to.
    pub fn current_package(&self, document: &str) -> String {
        self.packages
            .current
            .clone()
            .unwrap_or_else(|| crate::classify::sanitize(document))
    }
}

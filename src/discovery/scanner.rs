//! Index of assets already present in a target directory.
//!
//! Exports consult this index so that assets written by earlier runs, or by
//! other documents sharing a package, are referenced instead of rewritten.
//! An unreadable or corrupt entry is logged and left out; a partial index
//! only costs some reuse.

use std::collections::BTreeMap;

use crate::package::{join, Directory, ManifestEntry, PackageManifest, ResourceKind, MANIFEST_FILE};

/// A manifest entry together with the package that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedResource {
    pub package_id: String,
    pub package_name: String,
    pub entry: ManifestEntry,
}

/// Images and fonts of scanned packages, keyed by file base name.
#[derive(Debug, Clone, Default)]
pub struct ResourceIndex {
    images: BTreeMap<String, IndexedResource>,
    fonts: BTreeMap<String, IndexedResource>,
}

impl ResourceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the images and fonts of `manifest`. Earlier packages win on
    /// duplicate names.
    pub fn add_package(&mut self, package_name: &str, manifest: &PackageManifest) {
        for entry in &manifest.resources {
            let map = match entry.kind {
                ResourceKind::Image => &mut self.images,
                ResourceKind::Font => &mut self.fonts,
                ResourceKind::Component | ResourceKind::Other(_) => continue,
            };
            map.entry(entry.base_name().to_string())
                .or_insert_with(|| IndexedResource {
                    package_id: manifest.id.clone(),
                    package_name: package_name.to_string(),
                    entry: entry.clone(),
                });
        }
    }

    pub fn image(&self, name: &str) -> Option<&IndexedResource> {
        self.images.get(name)
    }

    pub fn font(&self, name: &str) -> Option<&IndexedResource> {
        self.fonts.get(name)
    }

    pub fn len(&self) -> usize {
        self.images.len() + self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read the manifest of each named package under `root`.
pub fn scan_packages(dir: &dyn Directory, root: &str, packages: &[&str]) -> ResourceIndex {
    let mut index = ResourceIndex::new();
    for name in packages {
        let path = join(&[root, name, MANIFEST_FILE]);
        let content = match dir.read_to_string(&path) {
            Ok(Some(content)) => content,
            Ok(None) => {
                tracing::debug!(package = %name, "no manifest to scan");
                continue;
            }
            Err(e) => {
                tracing::warn!(package = %name, "skipping unreadable manifest: {}", e);
                continue;
            }
        };
        match PackageManifest::parse(&content) {
            Ok(manifest) => {
                tracing::debug!(package = %name, resources = manifest.resources.len(), "scanned package");
                index.add_package(name, &manifest);
            }
            Err(e) => tracing::warn!(package = %name, "skipping corrupt manifest: {}", e),
        }
    }
    index
}

/// An asset of the prefab format, located by its `.meta` sidecar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaRecord {
    pub guid: String,
    /// Root-relative path of the asset (without `.meta`).
    pub path: String,
}

/// Sprites, prefabs and fonts found in the prefab-format folders, keyed by
/// file stem.
#[derive(Debug, Clone, Default)]
pub struct MetaIndex {
    pub sprites: BTreeMap<String, MetaRecord>,
    pub prefabs: BTreeMap<String, MetaRecord>,
    pub fonts: BTreeMap<String, MetaRecord>,
}

/// Extract the guid from a `.meta` sidecar.
/// Line-based so all-digit guids keep their leading zeros.
pub fn parse_meta_guid(content: &str) -> Option<String> {
    content
        .lines()
        .find_map(|line| line.strip_prefix("guid:"))
        .map(|guid| guid.trim().trim_matches(|c: char| c == '"' || c == '\'').to_string())
        .filter(|guid| !guid.is_empty())
}

const FONT_EXTENSIONS: &[&str] = &[".ttf", ".otf", ".fontsettings"];

/// Scan sprite, prefab and font folders for `.meta` sidecars.
pub fn scan_meta(dir: &dyn Directory, sprites: &str, output: &str, fonts: &str) -> MetaIndex {
    let mut index = MetaIndex::default();
    scan_meta_folder(dir, sprites, &[".png"], &mut index.sprites);
    scan_meta_folder(dir, output, &[".prefab"], &mut index.prefabs);
    scan_meta_folder(dir, fonts, FONT_EXTENSIONS, &mut index.fonts);
    index
}

fn scan_meta_folder(
    dir: &dyn Directory,
    folder: &str,
    extensions: &[&str],
    into: &mut BTreeMap<String, MetaRecord>,
) {
    let files = match dir.list_files(folder) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!(folder = %folder, "skipping unreadable folder: {}", e);
            return;
        }
    };

    for meta_path in files {
        let Some(asset_path) = meta_path.strip_suffix(".meta") else {
            continue;
        };
        let file_name = asset_path.rsplit('/').next().unwrap_or(asset_path);
        let Some(stem) = extensions
            .iter()
            .find_map(|ext| file_name.strip_suffix(ext))
        else {
            continue;
        };

        let guid = match dir.read_to_string(&meta_path) {
            Ok(Some(content)) => parse_meta_guid(&content),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(path = %meta_path, "skipping unreadable sidecar: {}", e);
                continue;
            }
        };
        match guid {
            Some(guid) => {
                into.entry(stem.to_string()).or_insert(MetaRecord {
                    guid,
                    path: asset_path.to_string(),
                });
            }
            None => tracing::warn!(path = %meta_path, "sidecar has no guid"),
        }
    }
}

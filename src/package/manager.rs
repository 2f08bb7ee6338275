//! Package placement for the XML package format.
//!
//! Three packages take part in an export: the current package receiving the
//! view, the common package for shared assets and the big package for
//! oversized images. Each is opened at start (its id recovered from an
//! existing `package.xml`), mutated during the walk, and flushed at the end.

use std::collections::HashMap;

use crate::discovery::{scan_packages, PackageLayout, ResourceIndex};
use crate::error::Result;

use super::directory::{join, Directory};
use super::ids::IdGenerator;
use super::manifest::{ManifestEntry, PackageManifest, ResourceKind, MANIFEST_FILE};
use super::{ImageKey, ResourceRef};

pub const ASSETS_FOLDER: &str = "/Assets/";
pub const COMPONENT_FOLDER: &str = "/Component/";
pub const VIEW_FOLDER: &str = "/View/";
const FLAT_FOLDER: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Current = 0,
    Common = 1,
    Big = 2,
}

#[derive(Debug)]
struct Package {
    /// Root-relative folder of the package.
    folder: String,
    manifest: PackageManifest,
    touched: bool,
}

impl Package {
    /// Open a package, recovering its id from an existing manifest. A missing
    /// or unreadable manifest starts a fresh package.
    fn open(dir: &dyn Directory, ids: &mut dyn IdGenerator, root: &str, name: &str) -> Self {
        let folder = join(&[root, name]);
        let path = join(&[&folder, MANIFEST_FILE]);

        let existing = match dir.read_to_string(&path) {
            Ok(Some(content)) => match PackageManifest::parse(&content) {
                Ok(manifest) => Some(manifest),
                Err(e) => {
                    tracing::warn!(package = %name, "corrupt manifest, starting a new package: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(package = %name, "unreadable manifest, starting a new package: {}", e);
                None
            }
        };

        let manifest = match existing {
            Some(mut manifest) => {
                tracing::debug!(package = %name, id = %manifest.id, "opened package");
                manifest.name = name.to_string();
                manifest
            }
            None => {
                let manifest = PackageManifest::new(ids.next_id(), name);
                tracing::debug!(package = %name, id = %manifest.id, "new package");
                manifest
            }
        };

        Self {
            folder,
            manifest,
            touched: false,
        }
    }

    /// Write `bytes` as `name` in `folder` and record it in the manifest,
    /// keeping the id of any entry it replaces.
    fn store(
        &mut self,
        dir: &mut dyn Directory,
        ids: &mut dyn IdGenerator,
        mut entry: ManifestEntry,
        bytes: &[u8],
    ) -> Result<ManifestEntry> {
        if let Some(existing) = self.manifest.find(&entry.name, &entry.path) {
            entry.id = existing.id.clone();
        } else {
            entry.id = ids.next_id();
        }
        dir.write_file(&join(&[&self.folder, &entry.file_path()]), bytes)?;
        self.manifest.upsert(entry.clone());
        self.touched = true;
        Ok(entry)
    }
}

fn to_ref(current_id: &str, package_id: &str, entry: &ManifestEntry) -> ResourceRef {
    let (width, height) = entry.size.unwrap_or((0, 0));
    ResourceRef {
        id: entry.id.clone(),
        package: (package_id != current_id).then(|| package_id.to_string()),
        file: entry.file_path(),
        width,
        height,
    }
}

/// Routes assets into packages and keeps their manifests.
pub struct PackageManager<'d> {
    dir: &'d mut dyn Directory,
    ids: &'d mut dyn IdGenerator,
    packages: Vec<Package>,
    /// Index into `packages` for each [`Slot`].
    slots: [usize; 3],
    shared: ResourceIndex,
    big_threshold: u32,
    force: bool,
    components: HashMap<(usize, String), ResourceRef>,
}

impl<'d> PackageManager<'d> {
    /// Open the current, common and big packages below `layout.root` and
    /// index the common package for cross-package reuse.
    pub fn open(
        dir: &'d mut dyn Directory,
        ids: &'d mut dyn IdGenerator,
        layout: &PackageLayout,
        current: &str,
        big_threshold: u32,
        force: bool,
    ) -> Self {
        let shared = scan_packages(&*dir, &layout.root, &[&layout.common]);

        let mut packages: Vec<Package> = Vec::new();
        let mut slots = [0; 3];
        let names = [current, layout.common.as_str(), layout.big.as_str()];
        for (slot, name) in names.iter().enumerate() {
            let found = packages
                .iter()
                .position(|p| p.manifest.name == *name);
            slots[slot] = match found {
                Some(index) => index,
                None => {
                    packages.push(Package::open(&*dir, &mut *ids, &layout.root, name));
                    packages.len() - 1
                }
            };
        }

        Self {
            dir,
            ids,
            packages,
            slots,
            shared,
            big_threshold,
            force,
            components: HashMap::new(),
        }
    }

    fn package(&self, slot: Slot) -> &Package {
        &self.packages[self.slots[slot as usize]]
    }

    pub fn current_id(&self) -> &str {
        &self.package(Slot::Current).manifest.id
    }

    /// Id of the package components with this sharing flag are written to.
    pub fn component_package_id(&self, common: bool) -> &str {
        &self.package(component_slot(common)).manifest.id
    }

    /// Root-relative folder of the current package.
    pub fn current_folder(&self) -> &str {
        &self.package(Slot::Current).folder
    }

    /// Package and folder an image is stored in.
    fn route(&self, key: &ImageKey) -> (usize, &'static str) {
        if key.common {
            (self.slots[Slot::Common as usize], ASSETS_FOLDER)
        } else if key.width > self.big_threshold || key.height > self.big_threshold {
            (self.slots[Slot::Big as usize], FLAT_FOLDER)
        } else {
            (self.slots[Slot::Current as usize], ASSETS_FOLDER)
        }
    }

    /// An existing image the key can reuse.
    ///
    /// The shared index is consulted first, then the routed package's own
    /// manifest. With `force` set, nothing in the routed package is reused.
    pub fn find_image(&self, key: &ImageKey) -> Option<ResourceRef> {
        let (index, folder) = self.route(key);
        let target = &self.packages[index].manifest;
        let current_id = self.current_id();

        if let Some(hit) = self.shared.image(key.name) {
            if !(self.force && hit.package_id == target.id) {
                tracing::debug!(layer = %key.name, package = %hit.package_name, "reusing shared image");
                return Some(to_ref(current_id, &hit.package_id, &hit.entry));
            }
        }

        if self.force {
            return None;
        }
        target
            .find(&format!("{}.png", key.name), folder)
            .map(|entry| to_ref(current_id, &target.id, entry))
    }

    /// Write a PNG for `key` into its routed package.
    pub fn store_image(&mut self, key: &ImageKey, png: &[u8]) -> Result<ResourceRef> {
        let (index, folder) = self.route(key);
        let mut entry = ManifestEntry::new("", ResourceKind::Image, format!("{}.png", key.name), folder);
        entry.size = Some((key.width, key.height));
        entry.scale9grid = key.border.map(|b| b.grid_rect(key.width, key.height));

        let current_id = self.current_id().to_string();
        let package = &mut self.packages[index];
        let entry = package.store(&mut *self.dir, &mut *self.ids, entry, png)?;
        tracing::debug!(image = %entry.name, package = %package.manifest.name, "wrote image");
        Ok(to_ref(&current_id, &package.manifest.id, &entry))
    }

    /// A component file name that does not clash with other resources of
    /// the target package. Returns the name and whether it was changed.
    ///
    /// A component entry already filed under `name` is this component's own
    /// from an earlier export and keeps the name.
    pub fn component_name(&self, name: &str, common: bool) -> (String, bool) {
        let manifest = &self.package(component_slot(common)).manifest;
        if manifest.find(&format!("{}.xml", name), COMPONENT_FOLDER).is_some() {
            return (name.to_string(), false);
        }
        let taken = |candidate: &str| -> bool {
            manifest
                .resources
                .iter()
                .any(|r| r.kind != ResourceKind::Component && r.base_name() == candidate)
        };

        if !taken(name) {
            return (name.to_string(), false);
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", name, n);
            if !taken(candidate.as_str()) {
                tracing::warn!(component = %name, renamed = %candidate, "name collides with an existing resource");
                return (candidate, true);
            }
            n += 1;
        }
    }

    /// A component already written during this export.
    pub fn emitted_component(&self, name: &str, common: bool) -> Option<ResourceRef> {
        let index = self.slots[component_slot(common) as usize];
        self.components.get(&(index, name.to_string())).cloned()
    }

    /// Write a component definition.
    pub fn store_component(&mut self, name: &str, common: bool, xml: &str, size: (u32, u32)) -> Result<ResourceRef> {
        let index = self.slots[component_slot(common) as usize];
        let mut entry = ManifestEntry::new("", ResourceKind::Component, format!("{}.xml", name), COMPONENT_FOLDER);
        entry.size = Some(size);
        entry.exported = true;

        let current_id = self.current_id().to_string();
        let package = &mut self.packages[index];
        let entry = package.store(&mut *self.dir, &mut *self.ids, entry, xml.as_bytes())?;
        let resource = to_ref(&current_id, &package.manifest.id, &entry);
        self.components.insert((index, name.to_string()), resource.clone());
        Ok(resource)
    }

    /// Whether a view of this name already exists in the current package.
    pub fn view_exists(&self, name: &str) -> Result<bool> {
        let package = self.package(Slot::Current);
        let file = format!("{}.xml", name);
        if package.manifest.find(&file, VIEW_FOLDER).is_some() {
            return Ok(true);
        }
        self.dir.exists(&join(&[&package.folder, VIEW_FOLDER, &file]))
    }

    /// Write the top-level view into the current package.
    pub fn store_view(&mut self, name: &str, xml: &str, size: (u32, u32)) -> Result<ResourceRef> {
        let index = self.slots[Slot::Current as usize];
        let mut entry = ManifestEntry::new("", ResourceKind::Component, format!("{}.xml", name), VIEW_FOLDER);
        entry.size = Some(size);
        entry.exported = true;

        let package = &mut self.packages[index];
        let entry = package.store(&mut *self.dir, &mut *self.ids, entry, xml.as_bytes())?;
        let id = package.manifest.id.clone();
        Ok(to_ref(&id, &id, &entry))
    }

    /// `ui://` URL of a font resource, searched in the shared index and then
    /// in the open packages.
    pub fn font_url(&self, font: &str) -> Option<String> {
        if let Some(hit) = self.shared.font(font) {
            return Some(format!("ui://{}{}", hit.package_id, hit.entry.id));
        }
        self.packages.iter().find_map(|p| {
            p.manifest
                .resources
                .iter()
                .find(|r| r.kind == ResourceKind::Font && r.base_name() == font)
                .map(|r| format!("ui://{}{}", p.manifest.id, r.id))
        })
    }

    /// Rewrite the manifest of every package that changed.
    pub fn flush(&mut self) -> Result<usize> {
        let mut written = 0;
        for package in self.packages.iter().filter(|p| p.touched) {
            let path = join(&[&package.folder, MANIFEST_FILE]);
            self.dir.write_file(&path, package.manifest.to_xml().as_bytes())?;
            tracing::info!(package = %package.manifest.name, id = %package.manifest.id, "wrote manifest");
            written += 1;
        }
        Ok(written)
    }
}

fn component_slot(common: bool) -> Slot {
    if common {
        Slot::Common
    } else {
        Slot::Current
    }
}

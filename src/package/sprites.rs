//! Asset placement for the prefab format.
//!
//! Sprites land in the sprite folder with a `.png.meta` sidecar, prefabs in
//! the output folder with a `.prefab.meta` sidecar. Guids already present in
//! sidecars are reused so references from other prefabs stay valid.

use std::collections::BTreeMap;

use crate::discovery::{scan_meta, MetaIndex, MetaRecord, UnityLayout};
use crate::error::Result;

use super::directory::{join, Directory};
use super::ids::IdGenerator;
use super::meta::{prefab_meta, sprite_meta};
use super::{ImageKey, ResourceRef};

/// Sub-folder of the sprite folder holding shared sprites.
pub const COMMON_SPRITE_FOLDER: &str = "Common";

pub struct SpriteManager<'d> {
    dir: &'d mut dyn Directory,
    ids: &'d mut dyn IdGenerator,
    layout: UnityLayout,
    index: MetaIndex,
    /// Prefab guids handed out during this export.
    assigned: BTreeMap<String, MetaRecord>,
    force: bool,
}

impl<'d> SpriteManager<'d> {
    /// Scan the sprite, output and font folders.
    pub fn open(dir: &'d mut dyn Directory, ids: &'d mut dyn IdGenerator, layout: &UnityLayout, force: bool) -> Self {
        let index = scan_meta(&*dir, &layout.sprites, &layout.output, &layout.fonts);
        tracing::debug!(
            sprites = index.sprites.len(),
            prefabs = index.prefabs.len(),
            fonts = index.fonts.len(),
            "scanned asset folders"
        );
        Self {
            dir,
            ids,
            layout: layout.clone(),
            index,
            assigned: BTreeMap::new(),
            force,
        }
    }

    /// An existing sprite with the key's name, unless overwriting.
    pub fn find_sprite(&self, key: &ImageKey) -> Option<ResourceRef> {
        if self.force {
            return None;
        }
        self.index.sprites.get(key.name).map(|record| ResourceRef {
            id: record.guid.clone(),
            package: None,
            file: record.path.clone(),
            width: key.width,
            height: key.height,
        })
    }

    /// Write a sprite and its sidecar, keeping any existing guid.
    pub fn store_sprite(&mut self, key: &ImageKey, png: &[u8]) -> Result<ResourceRef> {
        let record = match self.index.sprites.get(key.name) {
            Some(existing) => existing.clone(),
            None => {
                let folder = if key.common {
                    join(&[&self.layout.sprites, COMMON_SPRITE_FOLDER])
                } else {
                    self.layout.sprites.clone()
                };
                MetaRecord {
                    guid: self.ids.next_guid(),
                    path: join(&[&folder, &format!("{}.png", key.name)]),
                }
            }
        };

        self.dir.write_file(&record.path, png)?;
        let meta = sprite_meta(&record.guid, key.border, self.layout.pixels_per_unit);
        self.dir.write_file(&format!("{}.meta", record.path), meta.as_bytes())?;
        tracing::debug!(sprite = %record.path, "wrote sprite");

        self.index.sprites.insert(key.name.to_string(), record.clone());
        Ok(ResourceRef {
            id: record.guid,
            package: None,
            file: record.path,
            width: key.width,
            height: key.height,
        })
    }

    /// The record a prefab has, or will have once written.
    fn prefab_record(&mut self, name: &str) -> MetaRecord {
        if let Some(record) = self.index.prefabs.get(name).or_else(|| self.assigned.get(name)) {
            return record.clone();
        }
        let record = MetaRecord {
            guid: self.ids.next_guid(),
            path: join(&[&self.layout.output, &format!("{}.prefab", name)]),
        };
        self.assigned.insert(name.to_string(), record.clone());
        record
    }

    /// Whether a prefab of this name exists in the output folder.
    pub fn prefab_exists(&self, name: &str) -> Result<bool> {
        if self.index.prefabs.contains_key(name) {
            return Ok(true);
        }
        self.dir
            .exists(&join(&[&self.layout.output, &format!("{}.prefab", name)]))
    }

    /// Write a prefab and its sidecar.
    pub fn store_prefab(&mut self, name: &str, yaml: &str, size: (u32, u32)) -> Result<ResourceRef> {
        let MetaRecord { guid, path } = self.prefab_record(name);

        self.dir.write_file(&path, yaml.as_bytes())?;
        self.dir
            .write_file(&format!("{}.meta", path), prefab_meta(&guid).as_bytes())?;
        tracing::debug!(prefab = %path, "wrote prefab");

        Ok(ResourceRef {
            id: guid,
            package: None,
            file: path,
            width: size.0,
            height: size.1,
        })
    }

    /// Guid of a font asset by file stem.
    pub fn font_guid(&self, font: &str) -> Option<&str> {
        self.index.fonts.get(font).map(|r| r.guid.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{MemoryDirectory, SequentialIds};
    use crate::types::Border;

    fn key(name: &str) -> ImageKey<'_> {
        ImageKey {
            name,
            common: false,
            width: 8,
            height: 8,
            border: None,
        }
    }

    #[test]
    fn test_store_then_reuse() {
        let mut dir = MemoryDirectory::new();
        let mut ids = SequentialIds::new();
        let mut sprites = SpriteManager::open(&mut dir, &mut ids, &UnityLayout::default(), false);

        assert_eq!(sprites.find_sprite(&key("bg")), None);
        let stored = sprites.store_sprite(&key("bg"), b"png").unwrap();
        assert_eq!(stored.file, "Assets/UI/Sprites/bg.png");
        assert_eq!(sprites.find_sprite(&key("bg")), Some(stored));
        drop(sprites);

        assert!(dir.file("Assets/UI/Sprites/bg.png.meta").is_some());
    }

    #[test]
    fn test_existing_guid_kept_on_force() {
        let mut dir = MemoryDirectory::new();
        dir.write_file("Assets/UI/Sprites/Common/bg.png.meta", b"guid: feedface\n")
            .unwrap();
        let mut ids = SequentialIds::new();
        let mut sprites = SpriteManager::open(&mut dir, &mut ids, &UnityLayout::default(), true);

        assert_eq!(sprites.find_sprite(&key("bg")), None);
        let mut k = key("bg");
        k.border = Some(Border::new(1, 1, 1, 1));
        let stored = sprites.store_sprite(&k, b"png").unwrap();
        assert_eq!(stored.id, "feedface");
        assert_eq!(stored.file, "Assets/UI/Sprites/Common/bg.png");
        drop(sprites);

        let meta = dir.text("Assets/UI/Sprites/Common/bg.png.meta").unwrap();
        assert!(meta.contains("spriteBorder: {x: 1, y: 1, z: 1, w: 1}"));
    }

    #[test]
    fn test_common_sprites_in_subfolder() {
        let mut dir = MemoryDirectory::new();
        let mut ids = SequentialIds::new();
        let mut sprites = SpriteManager::open(&mut dir, &mut ids, &UnityLayout::default(), false);
        let mut k = key("frame");
        k.common = true;
        assert_eq!(
            sprites.store_sprite(&k, b"png").unwrap().file,
            "Assets/UI/Sprites/Common/frame.png"
        );
    }

    #[test]
    fn test_prefab_guid_stable() {
        let mut dir = MemoryDirectory::new();
        dir.write_file("Assets/UI/Prefabs/Main.prefab.meta", b"guid: 1234abcd\n")
            .unwrap();
        let mut ids = SequentialIds::new();
        let mut sprites = SpriteManager::open(&mut dir, &mut ids, &UnityLayout::default(), false);

        assert!(sprites.prefab_exists("Main").unwrap());
        assert_eq!(sprites.prefab_record("Main").guid, "1234abcd");

        let fresh = sprites.prefab_record("BtnOk").guid;
        let stored = sprites.store_prefab("BtnOk", "yaml", (10, 10)).unwrap();
        assert_eq!(stored.id, fresh);
        assert_eq!(stored.file, "Assets/UI/Prefabs/BtnOk.prefab");
        assert!(!sprites.prefab_exists("Other").unwrap());
        sprites.prefab_record("Other");
        assert!(!sprites.prefab_exists("Other").unwrap());
    }

    #[test]
    fn test_font_guid() {
        let mut dir = MemoryDirectory::new();
        dir.write_file("Assets/UI/Fonts/Title.ttf.meta", b"guid: f0f0\n").unwrap();
        let mut ids = SequentialIds::new();
        let sprites = SpriteManager::open(&mut dir, &mut ids, &UnityLayout::default(), false);
        assert_eq!(sprites.font_guid("Title"), Some("f0f0"));
        assert_eq!(sprites.font_guid("Body"), None);
    }
}

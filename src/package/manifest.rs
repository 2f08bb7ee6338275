//! `package.xml`: the resource manifest of an XML component package.
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <packageDescription id="k3x9a0b1">
//!   <resources>
//!     <image id="p2m4c7d8" name="bg.png" path="/Assets/" size="64,32" scale="9grid" scale9grid="4,4,56,24"/>
//!     <component id="q8w1e5r6" name="BtnStart.xml" path="/Component/" size="120,48" exported="true"/>
//!   </resources>
//!   <publish name="Main"/>
//! </packageDescription>
//! ```
//!
//! The whole file is rewritten on every flush. Attribute order is fixed so
//! unchanged manifests serialise to identical bytes.

use std::fmt;

use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{ExportError, Result};
use crate::types::Border;

pub const MANIFEST_FILE: &str = "package.xml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    Image,
    Component,
    Font,
    /// Resource types this crate does not produce, kept verbatim.
    Other(String),
}

impl ResourceKind {
    pub fn as_str(&self) -> &str {
        match self {
            ResourceKind::Image => "image",
            ResourceKind::Component => "component",
            ResourceKind::Font => "font",
            ResourceKind::Other(tag) => tag,
        }
    }

    fn from_tag(tag: &str) -> Self {
        match tag {
            "image" => ResourceKind::Image,
            "component" => ResourceKind::Component,
            "font" => ResourceKind::Font,
            other => ResourceKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `<resources>` child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub id: String,
    pub kind: ResourceKind,
    /// File name including extension.
    pub name: String,
    /// Folder inside the package, with leading and trailing `/`.
    pub path: String,
    pub exported: bool,
    pub size: Option<(u32, u32)>,
    /// Stretchable centre as `x, y, width, height`.
    pub scale9grid: Option<(u32, u32, u32, u32)>,
}

impl ManifestEntry {
    pub fn new(id: impl Into<String>, kind: ResourceKind, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            path: path.into(),
            exported: false,
            size: None,
            scale9grid: None,
        }
    }

    /// File name without extension.
    pub fn base_name(&self) -> &str {
        self.name.rsplit_once('.').map_or(self.name.as_str(), |(base, _)| base)
    }

    /// Package-relative file path, e.g. `Assets/bg.png`.
    pub fn file_path(&self) -> String {
        super::directory::join(&[&self.path, &self.name])
    }

    /// Nine-slice border recovered from the stored grid.
    pub fn border(&self) -> Option<Border> {
        let (x, y, w, h) = self.scale9grid?;
        let (width, height) = self.size?;
        Some(Border::from_grid_rect(x, y, w, h, width, height))
    }
}

/// The contents of a `package.xml`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackageManifest {
    pub id: String,
    pub name: String,
    pub resources: Vec<ManifestEntry>,
}

impl PackageManifest {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            resources: Vec::new(),
        }
    }

    /// Entry with the given file name in the given folder.
    pub fn find(&self, name: &str, path: &str) -> Option<&ManifestEntry> {
        self.resources.iter().find(|r| r.name == name && r.path == path)
    }

    pub fn find_mut(&mut self, name: &str, path: &str) -> Option<&mut ManifestEntry> {
        self.resources.iter_mut().find(|r| r.name == name && r.path == path)
    }

    pub fn by_id(&self, id: &str) -> Option<&ManifestEntry> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Add or replace the entry with the same name and path.
    pub fn upsert(&mut self, entry: ManifestEntry) {
        match self.find_mut(&entry.name, &entry.path) {
            Some(existing) => *existing = entry,
            None => self.resources.push(entry),
        }
    }

    /// Parse a manifest.
    pub fn parse(content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut manifest = PackageManifest::default();
        let mut seen_root = false;
        let mut in_resources = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"packageDescription" => {
                        seen_root = true;
                        manifest.id = attribute(&e, b"id")?.unwrap_or_default();
                    }
                    b"resources" => in_resources = true,
                    _ if in_resources => manifest.resources.push(parse_entry(&e)?),
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"packageDescription" => {
                        seen_root = true;
                        manifest.id = attribute(&e, b"id")?.unwrap_or_default();
                    }
                    b"publish" => manifest.name = attribute(&e, b"name")?.unwrap_or_default(),
                    _ if in_resources => manifest.resources.push(parse_entry(&e)?),
                    _ => {}
                },
                Ok(Event::End(e)) if e.name().as_ref() == b"resources" => in_resources = false,
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(ExportError::Xml {
                        message: format!("Malformed package manifest: {}", e),
                    })
                }
                _ => {}
            }
        }

        if !seen_root || manifest.id.is_empty() {
            return Err(ExportError::Xml {
                message: "Package manifest has no packageDescription id".to_string(),
            });
        }
        Ok(manifest)
    }

    /// Serialise to `package.xml` text.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        out.push_str(&format!("<packageDescription id=\"{}\">\n", escape(&self.id)));
        out.push_str("  <resources>\n");
        for entry in &self.resources {
            out.push_str(&format!(
                "    <{} id=\"{}\" name=\"{}\" path=\"{}\"",
                entry.kind,
                escape(&entry.id),
                escape(&entry.name),
                escape(&entry.path)
            ));
            if let Some((w, h)) = entry.size {
                out.push_str(&format!(" size=\"{},{}\"", w, h));
            }
            if let Some((x, y, w, h)) = entry.scale9grid {
                out.push_str(&format!(" scale=\"9grid\" scale9grid=\"{},{},{},{}\"", x, y, w, h));
            }
            if entry.exported {
                out.push_str(" exported=\"true\"");
            }
            out.push_str("/>\n");
        }
        out.push_str("  </resources>\n");
        out.push_str(&format!("  <publish name=\"{}\"/>\n", escape(&self.name)));
        out.push_str("</packageDescription>\n");
        out
    }
}

fn attribute(e: &BytesStart, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() != key {
            continue;
        }
        let raw = String::from_utf8(attr.value.to_vec()).map_err(|err| ExportError::Xml {
            message: format!("Attribute is not UTF-8: {}", err),
        })?;
        let value = unescape(&raw).map_err(|err| ExportError::Xml {
            message: format!("Bad escape in attribute: {}", err),
        })?;
        return Ok(Some(value.into_owned()));
    }
    Ok(None)
}

fn parse_pair(value: &str) -> Option<(u32, u32)> {
    let (a, b) = value.split_once(',')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

fn parse_quad(value: &str) -> Option<(u32, u32, u32, u32)> {
    let parts: Vec<u32> = value
        .split(',')
        .map(|p| p.trim().parse().ok())
        .collect::<Option<Vec<_>>>()?;
    match parts.as_slice() {
        [x, y, w, h] => Some((*x, *y, *w, *h)),
        _ => None,
    }
}

fn parse_entry(e: &BytesStart) -> Result<ManifestEntry> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let id = attribute(e, b"id")?.ok_or_else(|| ExportError::Xml {
        message: format!("<{}> resource without id", tag),
    })?;
    let mut entry = ManifestEntry::new(
        id,
        ResourceKind::from_tag(&tag),
        attribute(e, b"name")?.unwrap_or_default(),
        attribute(e, b"path")?.unwrap_or_else(|| "/".to_string()),
    );
    entry.exported = attribute(e, b"exported")?.as_deref() == Some("true");
    entry.size = attribute(e, b"size")?.as_deref().and_then(parse_pair);
    if attribute(e, b"scale")?.as_deref() == Some("9grid") {
        entry.scale9grid = attribute(e, b"scale9grid")?.as_deref().and_then(parse_quad);
    }
    Ok(entry)
}

//! Document loader.
//!
//! Reads a decoded document from JSON and attaches the PNG bitmaps its
//! layers and masks refer to. Image paths are relative to the JSON file.

use std::fs;
use std::path::Path;

use image::RgbaImage;

use crate::error::{ExportError, Result};
use crate::types::{Document, LayerNode, MAX_DEPTH};

/// Load a document and every bitmap it references.
pub fn load_document(path: &Path) -> Result<Document> {
    let content = fs::read_to_string(path).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to read document: {}", e),
    })?;

    let mut document = parse_document(&content)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    for layer in &mut document.layers {
        load_bitmaps(layer, base, 0)?;
    }

    tracing::debug!(document = %document.name, layers = document.layers.len(), "loaded document");
    Ok(document)
}

/// Parse document JSON without loading bitmaps.
pub fn parse_document(content: &str) -> Result<Document> {
    serde_json::from_str(content).map_err(|e| ExportError::Parse {
        message: format!("Invalid document: {}", e),
        help: Some("The document must be the decoder's JSON layer tree".to_string()),
    })
}

fn load_bitmaps(layer: &mut LayerNode, base: &Path, depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(ExportError::build(format!(
            "Layer '{}' is nested deeper than {} levels",
            layer.name, MAX_DEPTH
        )));
    }

    if let Some(image) = &layer.image {
        layer.bitmap = Some(load_png(&base.join(image))?);
    }
    if let Some(mask) = &mut layer.mask {
        if let Some(image) = &mask.image {
            mask.bitmap = Some(load_png(&base.join(image))?);
        }
    }
    for child in &mut layer.children {
        load_bitmaps(child, base, depth + 1)?;
    }
    Ok(())
}

fn load_png(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to load bitmap: {}", e),
    })?;
    Ok(image.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    #[test]
    fn test_load_document_with_bitmaps() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("layers")).unwrap();
        RgbaImage::from_pixel(4, 2, Rgba([255, 0, 0, 255]))
            .save(dir.path().join("layers/1.png"))
            .unwrap();
        RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]))
            .save(dir.path().join("layers/1-mask.png"))
            .unwrap();

        let json = r#"{
            "name": "Main", "width": 100, "height": 50,
            "layers": [{
                "id": 1, "name": "group", "kind": "group",
                "children": [{
                    "id": 2, "name": "bg", "kind": "image",
                    "bounds": {"left": 0, "top": 0, "right": 4, "bottom": 2},
                    "image": "layers/1.png",
                    "mask": {"bounds": {"left": 0, "top": 0, "right": 2, "bottom": 2},
                             "image": "layers/1-mask.png"}
                }]
            }]
        }"#;
        let path = dir.path().join("main.json");
        fs::write(&path, json).unwrap();

        let doc = load_document(&path).unwrap();
        let bg = &doc.layers[0].children[0];
        assert_eq!(bg.bitmap.as_ref().unwrap().dimensions(), (4, 2));
        assert_eq!(
            bg.mask.as_ref().unwrap().bitmap.as_ref().unwrap().dimensions(),
            (2, 2)
        );
    }

    #[test]
    fn test_missing_bitmap_is_error() {
        let dir = tempdir().unwrap();
        let json = r#"{"name": "Main", "width": 1, "height": 1,
            "layers": [{"id": 1, "name": "bg", "kind": "image", "image": "nope.png"}]}"#;
        let path = dir.path().join("main.json");
        fs::write(&path, json).unwrap();

        assert!(matches!(load_document(&path), Err(ExportError::Io { .. })));
    }

    #[test]
    fn test_parse_invalid_document() {
        assert!(matches!(parse_document("{"), Err(ExportError::Parse { .. })));
    }
}

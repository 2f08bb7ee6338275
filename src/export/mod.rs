//! Export pipeline entry points.
//!
//! An export walks a decoded [`Document`] bottom-up, stores every image and
//! component through an [`AssetSink`] and finally writes the top-level view.
//! Pre-flight checks run before the first write so a refused export leaves
//! the target untouched.

mod fairygui;
mod text;
mod tree;
mod unity;
mod walker;

pub use fairygui::{component_xml, PackageSink};
pub use text::{Span, TextContent};
pub use tree::{ComponentDef, NodeContent, OutputNode, TextNode, TextRole, TextShadow, TextStroke};
pub use unity::{prefab_yaml, yaml_quote, SpriteSink, ROOT_OBJECT_ID, ROOT_TRANSFORM_ID};
pub use walker::{AssetSink, TreeWalker};

use crate::classify::sanitize;
use crate::discovery::ExportConfig;
use crate::error::{ExportError, Result};
use crate::package::{Directory, IdGenerator, PackageManager, SpriteManager};
use crate::types::{Document, TargetFormat};

/// What an export did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Images baked and written.
    pub written: usize,
    /// Images served from existing output.
    pub reused: usize,
    /// Layers left out (excluded, degenerate or without pixels).
    pub skipped: usize,
    /// Components renamed to avoid a clash.
    pub renamed: usize,
    /// Component files written, views excluded.
    pub components: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Rewrite images even when a matching one exists.
    pub force: bool,
    /// Overwrite an existing view instead of refusing.
    pub replace_view: bool,
}

/// Export `document` in the configured format.
pub fn export(
    document: &Document,
    config: &ExportConfig,
    dir: &mut dyn Directory,
    ids: &mut dyn IdGenerator,
    options: ExportOptions,
) -> Result<ExportReport> {
    match config.format {
        TargetFormat::Fairygui => export_fairygui(document, config, dir, ids, options),
        TargetFormat::Unity => export_unity(document, config, dir, ids, options),
    }
}

/// Name of the view file a document produces.
pub fn view_name(document: &Document) -> String {
    let name = sanitize(&document.name);
    if name.is_empty() {
        "Main".to_string()
    } else {
        name
    }
}

fn check_root(dir: &dyn Directory) -> Result<()> {
    if dir.root_exists() {
        Ok(())
    } else {
        Err(ExportError::DirectoryMissing { path: dir.location() })
    }
}

/// Export into component/resource packages.
pub fn export_fairygui(
    document: &Document,
    config: &ExportConfig,
    dir: &mut dyn Directory,
    ids: &mut dyn IdGenerator,
    options: ExportOptions,
) -> Result<ExportReport> {
    check_root(dir)?;
    let view = view_name(document);
    let current = config.current_package(&document.name);
    let force = options.force || config.overwrite_assets;

    let mut packages = PackageManager::open(dir, ids, &config.packages, &current, config.big_asset_threshold, force);
    if !options.replace_view && packages.view_exists(&view)? {
        return Err(ExportError::ViewExists { name: view });
    }

    let mut walker = TreeWalker::new(&config.naming, TargetFormat::Fairygui.border_order());
    let children = {
        let mut sink = PackageSink::new(&mut packages);
        walker.build(&document.layers, document.bounds(), &mut sink)?
    };

    let def = ComponentDef {
        name: view,
        engine_type: String::new(),
        width: document.width,
        height: document.height,
        children,
    };
    let current_id = packages.current_id().to_string();
    let xml = component_xml(&def, &current_id, &current_id, &|font| packages.font_url(font));
    packages.store_view(&def.name, &xml, (def.width, def.height))?;
    let manifests = packages.flush()?;

    let report = walker.into_report();
    tracing::info!(
        view = %def.name,
        package = %current,
        written = report.written,
        reused = report.reused,
        skipped = report.skipped,
        manifests,
        "export finished"
    );
    Ok(report)
}

/// Export as prefabs with sprites.
pub fn export_unity(
    document: &Document,
    config: &ExportConfig,
    dir: &mut dyn Directory,
    ids: &mut dyn IdGenerator,
    options: ExportOptions,
) -> Result<ExportReport> {
    check_root(dir)?;
    let view = view_name(document);
    let force = options.force || config.overwrite_assets;

    let mut sprites = SpriteManager::open(dir, ids, &config.unity, force);
    if !options.replace_view && sprites.prefab_exists(&view)? {
        return Err(ExportError::ViewExists { name: view });
    }

    let mut walker = TreeWalker::new(&config.naming, TargetFormat::Unity.border_order());
    let children = {
        let mut sink = SpriteSink::new(&mut sprites);
        walker.build(&document.layers, document.bounds(), &mut sink)?
    };

    let def = ComponentDef {
        name: view,
        engine_type: String::new(),
        width: document.width,
        height: document.height,
        children,
    };
    let yaml = prefab_yaml(&def, &|font| sprites.font_guid(font).map(str::to_string));
    sprites.store_prefab(&def.name, &yaml, (def.width, def.height))?;

    let report = walker.into_report();
    tracing::info!(
        view = %def.name,
        written = report.written,
        reused = report.reused,
        skipped = report.skipped,
        "export finished"
    );
    Ok(report)
}

/// Shortest decimal form with at most three places.
pub(crate) fn number(value: f32) -> String {
    let text = format!("{:.3}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{MemoryDirectory, SequentialIds};
    use crate::types::{Colour, LayerKind, LayerNode, Rect, TextInfo};
    use image::{Rgba, RgbaImage};
    use pretty_assertions::assert_eq;

    fn image(id: u32, name: &str, bounds: Rect, shade: u8) -> LayerNode {
        let bitmap = RgbaImage::from_pixel(bounds.width() as u32, bounds.height() as u32, Rgba([shade, 0, 0, 255]));
        LayerNode::new(id, name, LayerKind::Image, bounds).with_bitmap(bitmap)
    }

    fn document() -> Document {
        let mut doc = Document::new("Main", 200, 100);
        doc.layers = vec![
            image(1, "bg", Rect::new(0, 0, 200, 100), 10),
            LayerNode::new(2, "Btn$ok", LayerKind::Group, Rect::ZERO).with_children(vec![
                image(3, "btn bg", Rect::new(10, 10, 50, 30), 20),
                LayerNode::new(4, "caption", LayerKind::Text, Rect::new(15, 15, 45, 25))
                    .with_text(TextInfo::new("OK", "Arial", 10.0, Colour::WHITE)),
            ]),
            image(5, "common_frame", Rect::new(60, 10, 70, 20), 30),
            LayerNode::new(6, "debug@skip", LayerKind::Group, Rect::ZERO)
                .with_children(vec![image(7, "grid", Rect::new(0, 0, 200, 100), 40)]),
            image(8, "star", Rect::new(80, 10, 84, 14), 50),
            image(9, "star", Rect::new(90, 10, 94, 14), 50),
        ];
        doc
    }

    fn run(dir: &mut MemoryDirectory, config: &ExportConfig, options: ExportOptions) -> Result<ExportReport> {
        let mut ids = SequentialIds::new();
        export(&document(), config, dir, &mut ids, options)
    }

    fn replace() -> ExportOptions {
        ExportOptions {
            force: false,
            replace_view: true,
        }
    }

    fn unity_config() -> ExportConfig {
        ExportConfig {
            format: TargetFormat::Unity,
            ..ExportConfig::default()
        }
    }

    #[test]
    fn test_package_layout() {
        let mut dir = MemoryDirectory::new();
        let report = run(&mut dir, &ExportConfig::default(), ExportOptions::default()).unwrap();

        for path in [
            "assets/Main/package.xml",
            "assets/Main/Assets/bg.png",
            "assets/Main/Assets/btn_bg.png",
            "assets/Main/Assets/star.png",
            "assets/Main/Component/BtnOk.xml",
            "assets/Main/View/Main.xml",
            "assets/Common/package.xml",
            "assets/Common/Assets/frame.png",
        ] {
            assert!(dir.file(path).is_some(), "missing {path}");
        }
        assert!(dir.paths().all(|p| !p.contains("grid")));
        assert!(dir.paths().all(|p| !p.starts_with("assets/BigAssets")));

        assert_eq!(
            report,
            ExportReport {
                written: 4,
                reused: 1,
                skipped: 1,
                renamed: 0,
                components: 1,
            }
        );
    }

    #[test]
    fn test_view_references() {
        let mut dir = MemoryDirectory::new();
        run(&mut dir, &ExportConfig::default(), ExportOptions::default()).unwrap();

        let view = dir.text("assets/Main/View/Main.xml").unwrap();
        assert!(view.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<component size=\"200,100\">"));
        let lines: Vec<&str> = view.lines().filter(|l| l.trim_start().starts_with('<') && l.contains(" id=\"n")).collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("name=\"bg\""));
        assert!(lines[1].starts_with("    <component ") && lines[1].contains("name=\"btnOk\" src=\""));
        assert!(lines[1].contains("xy=\"10,10\" size=\"40,20\""));
        // The shared image lives in the common package.
        assert!(lines[2].contains("fileName=\"Assets/frame.png\" pkg=\""));

        let button = dir.text("assets/Main/Component/BtnOk.xml").unwrap();
        assert!(button.contains("extention=\"Button\""));
        assert!(button.contains("name=\"btn_bg\""));
        assert!(button.contains("<text id=\"n1\" name=\"caption\" xy=\"5,3\""));
    }

    #[test]
    fn test_second_run_is_pure_reuse() {
        let config = ExportConfig::default();
        let mut dir = MemoryDirectory::new();
        run(&mut dir, &config, ExportOptions::default()).unwrap();

        let main = dir.text("assets/Main/package.xml").unwrap().to_string();
        let common = dir.text("assets/Common/package.xml").unwrap().to_string();
        let view = dir.text("assets/Main/View/Main.xml").unwrap().to_string();
        dir.reset_writes();

        let report = run(&mut dir, &config, replace()).unwrap();
        assert_eq!(report.written, 0);
        assert_eq!(report.reused, 5);
        assert!(dir.writes().iter().all(|p| !p.ends_with(".png")), "{:?}", dir.writes());
        assert_eq!(dir.text("assets/Main/package.xml").unwrap(), main);
        assert_eq!(dir.text("assets/Common/package.xml").unwrap(), common);
        assert_eq!(dir.text("assets/Main/View/Main.xml").unwrap(), view);
    }

    #[test]
    fn test_component_beside_same_named_image_is_stable() {
        let mut doc = Document::new("Main", 100, 100);
        doc.layers = vec![
            LayerNode::new(1, "Btn$start", LayerKind::Group, Rect::ZERO)
                .with_children(vec![image(2, "face", Rect::new(0, 0, 20, 10), 20)]),
            image(3, "BtnStart", Rect::new(30, 0, 40, 10), 30),
        ];
        let config = ExportConfig::default();
        let mut dir = MemoryDirectory::new();
        let mut ids = SequentialIds::new();
        export(&doc, &config, &mut dir, &mut ids, ExportOptions::default()).unwrap();
        let manifest = dir.text("assets/Main/package.xml").unwrap().to_string();
        let view = dir.text("assets/Main/View/Main.xml").unwrap().to_string();
        assert!(manifest.contains("name=\"BtnStart.xml\""));
        assert!(manifest.contains("name=\"BtnStart.png\""));

        let report = export(&doc, &config, &mut dir, &mut ids, replace()).unwrap();
        assert_eq!(report.renamed, 0);
        assert_eq!(dir.text("assets/Main/package.xml").unwrap(), manifest);
        assert_eq!(dir.text("assets/Main/View/Main.xml").unwrap(), view);
    }

    #[test]
    fn test_force_rewrites_with_same_ids() {
        let config = ExportConfig::default();
        let mut dir = MemoryDirectory::new();
        run(&mut dir, &config, ExportOptions::default()).unwrap();
        let main = dir.text("assets/Main/package.xml").unwrap().to_string();
        dir.reset_writes();

        let options = ExportOptions {
            force: true,
            replace_view: true,
        };
        let report = run(&mut dir, &config, options).unwrap();
        assert!(dir.writes().iter().any(|p| p == "assets/Main/Assets/star.png"));
        assert!(dir.writes().iter().any(|p| p == "assets/Common/Assets/frame.png"));
        assert_eq!((report.written, report.reused), (5, 0));
        assert_eq!(dir.text("assets/Main/package.xml").unwrap(), main);
    }

    #[test]
    fn test_existing_view_refused_before_writing() {
        let config = ExportConfig::default();
        let mut dir = MemoryDirectory::new();
        run(&mut dir, &config, ExportOptions::default()).unwrap();
        dir.reset_writes();

        let err = run(&mut dir, &config, ExportOptions::default()).unwrap_err();
        assert!(matches!(err, ExportError::ViewExists { ref name } if name == "Main"));
        assert!(dir.writes().is_empty());
    }

    #[test]
    fn test_missing_root_fails_fast() {
        let mut dir = MemoryDirectory::new();
        dir.remove_root();
        for config in [ExportConfig::default(), unity_config()] {
            let err = run(&mut dir, &config, ExportOptions::default()).unwrap_err();
            assert!(matches!(err, ExportError::DirectoryMissing { .. }));
        }
        assert!(dir.writes().is_empty());
    }

    #[test]
    fn test_unity_layout() {
        let config = unity_config();
        let mut dir = MemoryDirectory::new();
        let report = run(&mut dir, &config, ExportOptions::default()).unwrap();
        assert_eq!(report.written, 4);

        for path in [
            "Assets/UI/Sprites/bg.png",
            "Assets/UI/Sprites/bg.png.meta",
            "Assets/UI/Sprites/Common/frame.png",
            "Assets/UI/Prefabs/BtnOk.prefab",
            "Assets/UI/Prefabs/BtnOk.prefab.meta",
            "Assets/UI/Prefabs/Main.prefab",
            "Assets/UI/Prefabs/Main.prefab.meta",
        ] {
            assert!(dir.file(path).is_some(), "missing {path}");
        }

        let button_meta = dir.text("Assets/UI/Prefabs/BtnOk.prefab.meta").unwrap();
        let guid = crate::discovery::parse_meta_guid(button_meta).unwrap();
        let main = dir.text("Assets/UI/Prefabs/Main.prefab").unwrap();
        assert!(main.contains(&format!("m_SourcePrefab: {{fileID: 100100000, guid: {}, type: 3}}", guid)));
    }

    #[test]
    fn test_unity_second_run_is_pure_reuse() {
        let config = unity_config();
        let mut dir = MemoryDirectory::new();
        run(&mut dir, &config, ExportOptions::default()).unwrap();
        let main = dir.text("Assets/UI/Prefabs/Main.prefab").unwrap().to_string();
        let meta = dir.text("Assets/UI/Sprites/bg.png.meta").unwrap().to_string();
        dir.reset_writes();

        let report = run(&mut dir, &config, replace()).unwrap();
        assert_eq!(report.written, 0);
        assert!(dir.writes().iter().all(|p| !p.ends_with(".png")));
        assert_eq!(dir.text("Assets/UI/Prefabs/Main.prefab").unwrap(), main);
        assert_eq!(dir.text("Assets/UI/Sprites/bg.png.meta").unwrap(), meta);
    }

    #[test]
    fn test_number_format() {
        assert_eq!(number(1.0), "1");
        assert_eq!(number(0.25), "0.25");
        assert_eq!(number(0.3333), "0.333");
        assert_eq!(number(-0.0001), "0");
        assert_eq!(number(120.0), "120");
    }
}

//! Component XML writer for the package format.

use image::RgbaImage;
use quick_xml::escape::escape;

use crate::error::Result;
use crate::package::{ImageKey, PackageManager, ResourceRef};
use crate::render::encode_png;
use crate::types::TextAlign;

use super::tree::{ComponentDef, NodeContent, OutputNode, TextNode, TextRole};
use super::walker::AssetSink;
use super::number;

/// Serialise a component or view.
///
/// `owner` is the id of the package the file is written to; references into
/// any other package carry a `pkg` attribute. `current` is the package that
/// unqualified [`ResourceRef`]s belong to.
pub fn component_xml(
    def: &ComponentDef,
    owner: &str,
    current: &str,
    font_url: &dyn Fn(&str) -> Option<String>,
) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str(&format!("<component size=\"{},{}\"", def.width, def.height));
    if !def.engine_type.is_empty() {
        out.push_str(&format!(" extention=\"{}\"", escape(&def.engine_type)));
    }
    out.push_str(">\n");

    if def.children.is_empty() {
        out.push_str("  <displayList/>\n");
    } else {
        out.push_str("  <displayList>\n");
        for (index, node) in def.children.iter().enumerate() {
            out.push_str("    ");
            out.push_str(&node_xml(node, index, owner, current, font_url));
            out.push('\n');
        }
        out.push_str("  </displayList>\n");
    }

    if !def.engine_type.is_empty() {
        out.push_str(&format!("  <{}/>\n", escape(&def.engine_type)));
    }
    out.push_str("</component>\n");
    out
}

fn node_xml(
    node: &OutputNode,
    index: usize,
    owner: &str,
    current: &str,
    font_url: &dyn Fn(&str) -> Option<String>,
) -> String {
    let element = match &node.content {
        NodeContent::Image { .. } => "image",
        NodeContent::Loader { .. } => "loader",
        NodeContent::Text(text) if text.role == TextRole::Rich => "richtext",
        NodeContent::Text(_) => "text",
        NodeContent::Component { .. } => "component",
    };

    let mut attrs = Attrs::default();
    attrs.push("id", &format!("n{}", index));
    attrs.push("name", &node.name);

    match &node.content {
        NodeContent::Image { resource, .. } | NodeContent::Component { resource, .. } => {
            attrs.push("src", &resource.id);
            attrs.push("fileName", &resource.file);
            if let Some(pkg) = foreign_package(resource, owner, current) {
                attrs.push("pkg", pkg);
            }
        }
        _ => {}
    }

    attrs.push("xy", &format!("{},{}", node.frame.left, node.frame.top));
    attrs.push("size", &format!("{},{}", node.frame.width(), node.frame.height()));
    if node.alpha < 1.0 {
        attrs.push("alpha", &number(node.alpha));
    }

    match &node.content {
        NodeContent::Loader { resource } => {
            let pkg = resource.package.as_deref().unwrap_or(current);
            attrs.push("url", &format!("ui://{}{}", pkg, resource.id));
            attrs.push("fill", "scale");
        }
        NodeContent::Text(text) => text_attrs(&mut attrs, text, font_url),
        _ => {}
    }

    format!("<{}{}/>", element, attrs.0)
}

fn text_attrs(attrs: &mut Attrs, text: &TextNode, font_url: &dyn Fn(&str) -> Option<String>) {
    if !text.font.is_empty() {
        let font = font_url(&text.font).unwrap_or_else(|| text.font.clone());
        attrs.push("font", &font);
    }
    attrs.push("fontSize", &text.size.to_string());
    attrs.push("color", &text.content.base.to_hex_rgb());
    let align = match text.align {
        TextAlign::Left | TextAlign::Justify => None,
        TextAlign::Center => Some("center"),
        TextAlign::Right => Some("right"),
    };
    if let Some(align) = align {
        attrs.push("align", align);
    }
    if text.bold {
        attrs.push("bold", "true");
    }
    if text.letter_spacing != 0.0 {
        attrs.push("letterSpacing", &number(text.letter_spacing));
    }
    if let Some(leading) = text.leading {
        attrs.push("leading", &number(leading));
    }
    if let Some(stroke) = text.stroke {
        attrs.push("strokeColor", &stroke.color.to_hex_rgb());
        attrs.push("strokeSize", &number(stroke.size));
    }
    if let Some(shadow) = text.shadow {
        attrs.push("shadowColor", &shadow.color.to_hex_rgb());
        attrs.push("shadowOffset", &format!("{},{}", number(shadow.offset.0), number(shadow.offset.1)));
    }
    if text.role == TextRole::Input {
        attrs.push("input", "true");
    }
    if text.content.is_tagged() || text.role == TextRole::Rich {
        attrs.push("ubb", "true");
        attrs.push("text", &text.content.to_ubb());
    } else {
        attrs.push("text", &text.content.plain());
    }
}

/// The package a reference must name, if it is not the file's own.
fn foreign_package<'r>(resource: &'r ResourceRef, owner: &str, current: &'r str) -> Option<&'r str> {
    let package = resource.package.as_deref().unwrap_or(current);
    (package != owner).then_some(package)
}

#[derive(Default)]
struct Attrs(String);

impl Attrs {
    fn push(&mut self, key: &str, value: &str) {
        self.0.push_str(&format!(" {}=\"{}\"", key, escape(value)));
    }
}

/// [`AssetSink`] writing into packages.
pub struct PackageSink<'m, 'd> {
    packages: &'m mut PackageManager<'d>,
}

impl<'m, 'd> PackageSink<'m, 'd> {
    pub fn new(packages: &'m mut PackageManager<'d>) -> Self {
        Self { packages }
    }
}

impl AssetSink for PackageSink<'_, '_> {
    fn find_image(&mut self, key: &ImageKey) -> Option<ResourceRef> {
        self.packages.find_image(key)
    }

    fn store_image(&mut self, key: &ImageKey, image: &RgbaImage) -> Result<ResourceRef> {
        let png = encode_png(image)?;
        self.packages.store_image(key, &png)
    }

    fn component_name(&mut self, name: &str, common: bool) -> (String, bool) {
        self.packages.component_name(name, common)
    }

    fn emitted_component(&mut self, name: &str, common: bool) -> Option<ResourceRef> {
        self.packages.emitted_component(name, common)
    }

    fn store_component(&mut self, def: &ComponentDef, common: bool) -> Result<ResourceRef> {
        let packages = &*self.packages;
        let xml = component_xml(
            def,
            packages.component_package_id(common),
            packages.current_id(),
            &|font| packages.font_url(font),
        );
        self.packages
            .store_component(&def.name, common, &xml, (def.width, def.height))
    }
}

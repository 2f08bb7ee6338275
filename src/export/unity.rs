//! Prefab writer for the sprite format.
//!
//! Each component becomes one prefab: a GameObject per node with a
//! RectTransform anchored top-left, a CanvasRenderer and the behaviour that
//! draws it. Nested components are linked through a `PrefabInstance` and a
//! stripped RectTransform. File ids are assigned in walk order, so the same
//! tree always produces the same file.

use std::collections::HashMap;

use image::RgbaImage;

use crate::error::Result;
use crate::package::{ImageKey, ResourceRef, SpriteManager};
use crate::render::encode_png;
use crate::types::{Colour, Rect, TextAlign};

use super::number;
use super::tree::{ComponentDef, NodeContent, OutputNode, TextNode, TextRole};
use super::walker::AssetSink;

/// File id of every prefab's root GameObject.
pub const ROOT_OBJECT_ID: i64 = 1000;
/// File id of every prefab's root RectTransform.
pub const ROOT_TRANSFORM_ID: i64 = 1001;

const HEADER: &str = "%YAML 1.1\n%TAG !u! tag:unity3d.com,2011:\n";

const IMAGE_SCRIPT: &str = "fe87c0e1cc204ed48ad3b37840f39efc";
const TEXT_SCRIPT: &str = "5f7201a12d95ffc409449d95f23cf332";
const OUTLINE_SCRIPT: &str = "e19747de3f5aca642ab2be37e372fb86";
const SHADOW_SCRIPT: &str = "cfabb0440166ab443bba8876756fdfa9";
const INPUT_FIELD_SCRIPT: &str = "d199490a83bb2b844b9695cbf13b01ef";
const BUTTON_SCRIPT: &str = "4e29b1a8efbd4b44bb3f3716e73f07ff";

const BUILTIN_FONT: &str = "{fileID: 10102, guid: 0000000000000000e000000000000000, type: 0}";

/// Serialise a component or view as prefab YAML.
pub fn prefab_yaml(def: &ComponentDef, fonts: &dyn Fn(&str) -> Option<String>) -> String {
    let mut writer = PrefabWriter {
        out: String::new(),
        next_id: ROOT_TRANSFORM_ID + 1,
        fonts,
    };

    let button = (def.engine_type == "Button").then(|| writer.next());
    let mut children = Vec::with_capacity(def.children.len());
    for (order, node) in def.children.iter().enumerate() {
        children.push(writer.node(node, ROOT_TRANSFORM_ID, order));
    }
    let body = std::mem::take(&mut writer.out);

    let mut components = vec![ROOT_TRANSFORM_ID];
    components.extend(button);
    writer.game_object(ROOT_OBJECT_ID, &def.name, &components);
    writer.rect_transform(
        ROOT_TRANSFORM_ID,
        ROOT_OBJECT_ID,
        &children,
        0,
        0,
        Rect::from_xywh(0, 0, def.width as i32, def.height as i32),
    );
    if let Some(id) = button {
        writer.behaviour(
            id,
            ROOT_OBJECT_ID,
            BUTTON_SCRIPT,
            "  m_Navigation:\n    m_Mode: 3\n  m_Transition: 1\n  m_Interactable: 1\n  m_TargetGraphic: {fileID: 0}\n  m_OnClick:\n    m_PersistentCalls:\n      m_Calls: []\n",
        );
    }

    format!("{}{}{}", HEADER, writer.out, body)
}

struct PrefabWriter<'f> {
    out: String,
    next_id: i64,
    fonts: &'f dyn Fn(&str) -> Option<String>,
}

impl PrefabWriter<'_> {
    fn next(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Write one node; returns the RectTransform id its parent lists.
    fn node(&mut self, node: &OutputNode, parent: i64, order: usize) -> i64 {
        if let NodeContent::Component { resource, .. } = &node.content {
            return self.prefab_instance(node, resource, parent, order);
        }

        let object = self.next();
        let transform = self.next();
        let renderer = self.next();
        let mut components = vec![transform, renderer];
        let mut behaviours: Vec<(i64, &str, String)> = Vec::new();

        match &node.content {
            NodeContent::Image { resource, sliced } => {
                let id = self.next();
                behaviours.push((id, IMAGE_SCRIPT, image_fields(resource, *sliced, node.alpha)));
            }
            NodeContent::Loader { resource } => {
                let id = self.next();
                behaviours.push((id, IMAGE_SCRIPT, image_fields(resource, false, node.alpha)));
            }
            NodeContent::Text(text) => {
                let text_id = self.next();
                behaviours.push((text_id, TEXT_SCRIPT, self.text_fields(text, node.alpha)));
                if let Some(stroke) = text.stroke {
                    let fields = effect_fields(stroke.color, (stroke.size, stroke.size));
                    behaviours.push((self.next(), OUTLINE_SCRIPT, fields));
                }
                if let Some(shadow) = text.shadow {
                    behaviours.push((self.next(), SHADOW_SCRIPT, effect_fields(shadow.color, shadow.offset)));
                }
                if text.role == TextRole::Input {
                    let fields = format!(
                        "  m_TextComponent: {{fileID: {}}}\n  m_Text: {}\n  m_CharacterLimit: 0\n  m_ContentType: 0\n  m_LineType: 0\n",
                        text_id,
                        yaml_quote(&text.content.plain())
                    );
                    behaviours.push((self.next(), INPUT_FIELD_SCRIPT, fields));
                }
            }
            NodeContent::Component { .. } => {}
        }
        components.extend(behaviours.iter().map(|(id, _, _)| *id));

        self.game_object(object, &node.name, &components);
        self.rect_transform(transform, object, &[], parent, order, node.frame);
        self.canvas_renderer(renderer, object);
        for (id, script, fields) in &behaviours {
            self.behaviour(*id, object, script, fields);
        }
        transform
    }

    fn text_fields(&self, text: &TextNode, alpha: f32) -> String {
        let font = match (self.fonts)(&text.font) {
            Some(guid) => format!("{{fileID: 12800000, guid: {}, type: 3}}", guid),
            None => BUILTIN_FONT.to_string(),
        };
        let alignment = match text.align {
            TextAlign::Left | TextAlign::Justify => 0,
            TextAlign::Center => 1,
            TextAlign::Right => 2,
        };
        let line_spacing = match text.leading {
            Some(leading) if text.size > 0 => leading / text.size as f32,
            _ => 1.0,
        };
        let body = text.content.to_rich_text();

        format!(
            "  m_Material: {{fileID: 0}}\n  m_Color: {}\n  m_RaycastTarget: 1\n  m_FontData:\n    m_Font: {}\n    m_FontSize: {}\n    m_FontStyle: {}\n    m_BestFit: 0\n    m_MinSize: 0\n    m_MaxSize: {}\n    m_Alignment: {}\n    m_AlignByGeometry: 0\n    m_RichText: 1\n    m_HorizontalOverflow: 1\n    m_VerticalOverflow: 1\n    m_LineSpacing: {}\n  m_Text: {}\n",
            colour(text.content.base, alpha),
            font,
            text.size,
            if text.bold { 1 } else { 0 },
            text.size,
            alignment,
            number(line_spacing),
            yaml_quote(&body)
        )
    }

    fn prefab_instance(&mut self, node: &OutputNode, resource: &ResourceRef, parent: i64, order: usize) -> i64 {
        let instance = self.next();
        let stripped = self.next();
        let guid = &resource.id;

        let modifications = [
            (ROOT_OBJECT_ID, "m_Name", yaml_quote(&node.name)),
            (ROOT_TRANSFORM_ID, "m_RootOrder", order.to_string()),
            (ROOT_TRANSFORM_ID, "m_AnchoredPosition.x", node.frame.left.to_string()),
            (ROOT_TRANSFORM_ID, "m_AnchoredPosition.y", (-node.frame.top).to_string()),
            (ROOT_TRANSFORM_ID, "m_SizeDelta.x", node.frame.width().to_string()),
            (ROOT_TRANSFORM_ID, "m_SizeDelta.y", node.frame.height().to_string()),
        ];

        self.out.push_str(&format!(
            "--- !u!1001 &{}\nPrefabInstance:\n  m_ObjectHideFlags: 0\n  serializedVersion: 2\n  m_Modification:\n    serializedVersion: 3\n    m_TransformParent: {{fileID: {}}}\n    m_Modifications:\n",
            instance, parent
        ));
        for (target, path, value) in modifications {
            self.out.push_str(&format!(
                "    - target: {{fileID: {}, guid: {}, type: 3}}\n      propertyPath: {}\n      value: {}\n      objectReference: {{fileID: 0}}\n",
                target, guid, path, value
            ));
        }
        self.out.push_str(&format!(
            "    m_RemovedComponents: []\n    m_AddedGameObjects: []\n    m_AddedComponents: []\n  m_SourcePrefab: {{fileID: 100100000, guid: {}, type: 3}}\n",
            guid
        ));
        self.out.push_str(&format!(
            "--- !u!224 &{} stripped\nRectTransform:\n  m_CorrespondingSourceObject: {{fileID: {}, guid: {}, type: 3}}\n  m_PrefabInstance: {{fileID: {}}}\n  m_PrefabAsset: {{fileID: 0}}\n",
            stripped, ROOT_TRANSFORM_ID, guid, instance
        ));
        stripped
    }

    fn game_object(&mut self, id: i64, name: &str, components: &[i64]) {
        self.out.push_str(&format!(
            "--- !u!1 &{}\nGameObject:\n  m_ObjectHideFlags: 0\n  m_CorrespondingSourceObject: {{fileID: 0}}\n  m_PrefabInstance: {{fileID: 0}}\n  m_PrefabAsset: {{fileID: 0}}\n  serializedVersion: 6\n  m_Component:\n",
            id
        ));
        for component in components {
            self.out
                .push_str(&format!("  - component: {{fileID: {}}}\n", component));
        }
        self.out.push_str(&format!(
            "  m_Layer: 5\n  m_Name: {}\n  m_TagString: Untagged\n  m_Icon: {{fileID: 0}}\n  m_NavMeshLayer: 0\n  m_StaticEditorFlags: 0\n  m_IsActive: 1\n",
            yaml_quote(name)
        ));
    }

    fn rect_transform(&mut self, id: i64, object: i64, children: &[i64], parent: i64, order: usize, frame: Rect) {
        self.out.push_str(&format!(
            "--- !u!224 &{}\nRectTransform:\n  m_ObjectHideFlags: 0\n  m_CorrespondingSourceObject: {{fileID: 0}}\n  m_PrefabInstance: {{fileID: 0}}\n  m_PrefabAsset: {{fileID: 0}}\n  m_GameObject: {{fileID: {}}}\n  m_LocalRotation: {{x: 0, y: 0, z: 0, w: 1}}\n  m_LocalPosition: {{x: 0, y: 0, z: 0}}\n  m_LocalScale: {{x: 1, y: 1, z: 1}}\n",
            id, object
        ));
        if children.is_empty() {
            self.out.push_str("  m_Children: []\n");
        } else {
            self.out.push_str("  m_Children:\n");
            for child in children {
                self.out.push_str(&format!("  - {{fileID: {}}}\n", child));
            }
        }
        self.out.push_str(&format!(
            "  m_Father: {{fileID: {}}}\n  m_RootOrder: {}\n  m_LocalEulerAnglesHint: {{x: 0, y: 0, z: 0}}\n  m_AnchorMin: {{x: 0, y: 1}}\n  m_AnchorMax: {{x: 0, y: 1}}\n  m_AnchoredPosition: {{x: {}, y: {}}}\n  m_SizeDelta: {{x: {}, y: {}}}\n  m_Pivot: {{x: 0, y: 1}}\n",
            parent,
            order,
            frame.left,
            -frame.top,
            frame.width(),
            frame.height()
        ));
    }

    fn canvas_renderer(&mut self, id: i64, object: i64) {
        self.out.push_str(&format!(
            "--- !u!222 &{}\nCanvasRenderer:\n  m_ObjectHideFlags: 0\n  m_CorrespondingSourceObject: {{fileID: 0}}\n  m_PrefabInstance: {{fileID: 0}}\n  m_PrefabAsset: {{fileID: 0}}\n  m_GameObject: {{fileID: {}}}\n  m_CullTransparentMesh: 1\n",
            id, object
        ));
    }

    fn behaviour(&mut self, id: i64, object: i64, script: &str, fields: &str) {
        self.out.push_str(&format!(
            "--- !u!114 &{}\nMonoBehaviour:\n  m_ObjectHideFlags: 0\n  m_CorrespondingSourceObject: {{fileID: 0}}\n  m_PrefabInstance: {{fileID: 0}}\n  m_PrefabAsset: {{fileID: 0}}\n  m_GameObject: {{fileID: {}}}\n  m_Enabled: 1\n  m_EditorHideFlags: 0\n  m_Script: {{fileID: 11500000, guid: {}, type: 3}}\n  m_Name: \n  m_EditorClassIdentifier: \n{}",
            id, object, script, fields
        ));
    }
}

fn image_fields(resource: &ResourceRef, sliced: bool, alpha: f32) -> String {
    format!(
        "  m_Material: {{fileID: 0}}\n  m_Color: {}\n  m_RaycastTarget: 1\n  m_Sprite: {{fileID: 21300000, guid: {}, type: 3}}\n  m_Type: {}\n  m_PreserveAspect: 0\n  m_FillCenter: 1\n",
        colour(Colour::WHITE, alpha),
        resource.id,
        if sliced { 1 } else { 0 }
    )
}

fn effect_fields(color: Colour, distance: (f32, f32)) -> String {
    format!(
        "  m_EffectColor: {}\n  m_EffectDistance: {{x: {}, y: {}}}\n  m_UseGraphicAlpha: 1\n",
        colour(color, 1.0),
        number(distance.0),
        number(-distance.1)
    )
}

fn colour(c: Colour, alpha: f32) -> String {
    let [r, g, b, a] = c.to_unit();
    format!(
        "{{r: {}, g: {}, b: {}, a: {}}}",
        number(r),
        number(g),
        number(b),
        number(a * alpha)
    )
}

/// Quote a scalar when it would not survive as a plain YAML string.
pub fn yaml_quote(value: &str) -> String {
    let plain = !value.is_empty()
        && value.trim() == value
        && !value.starts_with(['-', '?', '!', '&', '*', '|', '>', '%', '@', '`', '\'', '"', '[', '{'])
        && !value.contains(['#', ':', '{', '}', '[', ']', ',', '\n', '\t', '\\', '<'])
        && value.parse::<f64>().is_err()
        && !matches!(value, "true" | "false" | "null" | "~" | "yes" | "no" | "on" | "off");
    if plain {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// [`AssetSink`] writing sprites and prefabs.
pub struct SpriteSink<'m, 'd> {
    sprites: &'m mut SpriteManager<'d>,
    emitted: HashMap<String, ResourceRef>,
}

impl<'m, 'd> SpriteSink<'m, 'd> {
    pub fn new(sprites: &'m mut SpriteManager<'d>) -> Self {
        Self {
            sprites,
            emitted: HashMap::new(),
        }
    }
}

impl AssetSink for SpriteSink<'_, '_> {
    fn find_image(&mut self, key: &ImageKey) -> Option<ResourceRef> {
        self.sprites.find_sprite(key)
    }

    fn store_image(&mut self, key: &ImageKey, image: &RgbaImage) -> Result<ResourceRef> {
        let png = encode_png(image)?;
        self.sprites.store_sprite(key, &png)
    }

    /// Prefabs share one folder and never clash with sprites.
    fn component_name(&mut self, name: &str, _common: bool) -> (String, bool) {
        (name.to_string(), false)
    }

    fn emitted_component(&mut self, name: &str, _common: bool) -> Option<ResourceRef> {
        self.emitted.get(name).cloned()
    }

    fn store_component(&mut self, def: &ComponentDef, _common: bool) -> Result<ResourceRef> {
        let sprites = &*self.sprites;
        let yaml = prefab_yaml(def, &|font| sprites.font_guid(font).map(str::to_string));
        let resource = self
            .sprites
            .store_prefab(&def.name, &yaml, (def.width, def.height))?;
        self.emitted.insert(def.name.clone(), resource.clone());
        Ok(resource)
    }
}

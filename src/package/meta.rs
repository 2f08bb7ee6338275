//! `.meta` sidecars for the prefab format.

use crate::types::Border;

/// Importer settings for a sprite. The border is written in the engine's
/// `x: left, y: bottom, z: right, w: top` order.
pub fn sprite_meta(guid: &str, border: Option<Border>, pixels_per_unit: f32) -> String {
    let border = border.unwrap_or_default();
    format!(
        "fileFormatVersion: 2
guid: {guid}
TextureImporter:
  serializedVersion: 12
  mipmaps:
    enableMipMap: 0
  alphaIsTransparency: 1
  textureType: 8
  textureShape: 1
  spriteMode: 1
  spritePixelsToUnits: {pixels_per_unit}
  spriteBorder: {{x: {left}, y: {bottom}, z: {right}, w: {top}}}
  spritePivot: {{x: 0.5, y: 0.5}}
  alignment: 0
  userData: 
  assetBundleName: 
  assetBundleVariant: 
",
        left = border.left,
        bottom = border.bottom,
        right = border.right,
        top = border.top,
    )
}

pub fn prefab_meta(guid: &str) -> String {
    format!(
        "fileFormatVersion: 2
guid: {guid}
PrefabImporter:
  externalObjects: {{}}
  userData: 
  assetBundleName: 
  assetBundleVariant: 
"
    )
}

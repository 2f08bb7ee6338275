//! Layer effect payloads.
//!
//! Every effect the decoder may attach to a layer is one variant of
//! [`Effect`], with explicit fields. Colours arrive as hex strings.

use serde::{Deserialize, Serialize};

use super::Colour;

/// One layer effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Effect {
    Stroke(Stroke),
    DropShadow(Shadow),
    InnerShadow(Shadow),
    GradientOverlay(GradientOverlay),
    ColorOverlay(ColorOverlay),
}

impl Effect {
    pub fn is_enabled(&self) -> bool {
        match self {
            Effect::Stroke(e) => e.enabled,
            Effect::DropShadow(e) | Effect::InnerShadow(e) => e.enabled,
            Effect::GradientOverlay(e) => e.enabled,
            Effect::ColorOverlay(e) => e.enabled,
        }
    }
}

/// Where a stroke sits relative to the shape edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokePosition {
    #[default]
    Outside,
    Inside,
    Center,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Stroke width in pixels.
    pub size: f32,
    #[serde(default)]
    pub position: StrokePosition,
    pub color: Colour,
    #[serde(default = "full_opacity")]
    pub opacity: f32,
    #[serde(default = "enabled")]
    pub enabled: bool,
}

/// Drop shadow or inner shadow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: Colour,
    #[serde(default = "full_opacity")]
    pub opacity: f32,
    /// Light angle in degrees.
    #[serde(default)]
    pub angle: f32,
    #[serde(default)]
    pub distance: f32,
    /// Blur size in pixels.
    #[serde(default)]
    pub size: f32,
    #[serde(default = "enabled")]
    pub enabled: bool,
}

impl Shadow {
    /// Pixel offset of the shadow relative to the content.
    pub fn offset(&self) -> (f32, f32) {
        let radians = self.angle.to_radians();
        (radians.cos() * self.distance, radians.sin() * self.distance)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Either normalised (0..=1) or in the decoder's fixed integer range.
    pub location: f32,
    pub color: Colour,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientOverlay {
    pub stops: Vec<GradientStop>,
    #[serde(default = "full_opacity")]
    pub opacity: f32,
    /// Direction in degrees; 90 runs bottom to top.
    #[serde(default = "default_gradient_angle")]
    pub angle: f32,
    #[serde(default)]
    pub reverse: bool,
    #[serde(default = "enabled")]
    pub enabled: bool,
}

/// Upper bound of the integer range some decoders use for stop locations.
pub const GRADIENT_LOCATION_RANGE: f32 = 4096.0;

impl GradientOverlay {
    /// Stops with locations normalised to 0..=1 and sorted.
    ///
    /// If the first stop lies beyond 1 the whole list is taken to be in the
    /// integer range and rescaled.
    pub fn normalized_stops(&self) -> Vec<GradientStop> {
        let scaled = self.stops.first().is_some_and(|s| s.location > 1.0);
        let mut stops: Vec<GradientStop> = self
            .stops
            .iter()
            .map(|s| {
                let location = if scaled {
                    s.location / GRADIENT_LOCATION_RANGE
                } else {
                    s.location
                };
                let location = if self.reverse { 1.0 - location } else { location };
                GradientStop {
                    location: location.clamp(0.0, 1.0),
                    color: s.color,
                }
            })
            .collect();
        stops.sort_by(|a, b| a.location.total_cmp(&b.location));
        stops
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorOverlay {
    pub color: Colour,
    #[serde(default = "full_opacity")]
    pub opacity: f32,
    #[serde(default = "enabled")]
    pub enabled: bool,
}

fn full_opacity() -> f32 {
    1.0
}

fn enabled() -> bool {
    true
}

fn default_gradient_angle() -> f32 {
    90.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_tagged_effects() {
        let json = r##"[
            {"type": "stroke", "size": 2, "position": "inside", "color": "#ff0000"},
            {"type": "drop-shadow", "color": "#000000", "opacity": 0.5, "angle": 90, "distance": 4, "size": 3},
            {"type": "color-overlay", "color": "#00ff00", "enabled": false}
        ]"##;
        let effects: Vec<Effect> = serde_json::from_str(json).unwrap();

        assert_eq!(effects.len(), 3);
        match &effects[0] {
            Effect::Stroke(s) => {
                assert_eq!(s.position, StrokePosition::Inside);
                assert_eq!(s.opacity, 1.0);
                assert!(s.enabled);
            }
            other => panic!("expected stroke, got {other:?}"),
        }
        assert!(matches!(effects[1], Effect::DropShadow(_)));
        assert!(!effects[2].is_enabled());
    }

    #[test]
    fn test_shadow_offset() {
        let shadow = Shadow {
            color: Colour::BLACK,
            opacity: 1.0,
            angle: 90.0,
            distance: 5.0,
            size: 0.0,
            enabled: true,
        };
        let (dx, dy) = shadow.offset();
        assert!(dx.abs() < 1e-4);
        assert!((dy - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_normalized_stops_rescales_integer_range() {
        let overlay = GradientOverlay {
            stops: vec![
                GradientStop {
                    location: 4096.0,
                    color: Colour::WHITE,
                },
                GradientStop {
                    location: 2048.0,
                    color: Colour::BLACK,
                },
            ],
            opacity: 1.0,
            angle: 90.0,
            reverse: false,
            enabled: true,
        };
        let stops = overlay.normalized_stops();
        assert_eq!(stops[0].location, 0.5);
        assert_eq!(stops[1].location, 1.0);
    }

    #[test]
    fn test_normalized_stops_keeps_unit_range() {
        let overlay = GradientOverlay {
            stops: vec![
                GradientStop {
                    location: 0.0,
                    color: Colour::WHITE,
                },
                GradientStop {
                    location: 1.0,
                    color: Colour::BLACK,
                },
            ],
            opacity: 1.0,
            angle: 0.0,
            reverse: false,
            enabled: true,
        };
        let stops = overlay.normalized_stops();
        assert_eq!(stops[0].location, 0.0);
        assert_eq!(stops[1].location, 1.0);
    }
}

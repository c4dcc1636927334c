use crate::interaction::action::ActionKind;
use crate::interaction::input::InteractionSettings;
use crate::interaction::region::InteractionLayers;
use crate::tracking::gate::{ContentKinds, GateFilter};
use bevy::prelude::*;
use constants::interaction::DEFAULT_RAY_DISTANCE;
use serde::{Deserialize, Serialize};

/// One card scene as authored in `cards/<scene>.card.json`.
#[derive(Asset, TypePath, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardManifest {
    pub scene: String,
    #[serde(default)]
    pub interaction: InteractionSpec,
    #[serde(default)]
    pub markers: Vec<MarkerSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionSpec {
    #[serde(default = "default_ray_distance")]
    pub ray_distance: f32,
    /// Layers pointer rays accept. Empty means every layer.
    #[serde(default)]
    pub layers: Vec<u8>,
}

fn default_ray_distance() -> f32 {
    DEFAULT_RAY_DISTANCE
}

impl Default for InteractionSpec {
    fn default() -> Self {
        Self {
            ray_distance: DEFAULT_RAY_DISTANCE,
            layers: Vec::new(),
        }
    }
}

impl InteractionSpec {
    /// Out-of-range layers fall back to accepting every layer.
    pub fn to_settings(&self) -> InteractionSettings {
        let layers = if self.layers.is_empty() {
            InteractionLayers::ALL
        } else {
            InteractionLayers::from_layers(&self.layers).unwrap_or_else(|e| {
                warn!("[SCENE] {}; ray queries accept every layer", e);
                InteractionLayers::ALL
            })
        };
        InteractionSettings {
            ray_distance: self.ray_distance,
            layers,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateMode {
    #[default]
    Visibility,
    Colliders,
}

impl GateMode {
    pub fn filter(self) -> GateFilter {
        match self {
            Self::Visibility => GateFilter::visibility(),
            Self::Colliders => GateFilter::colliders(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub id: String,
    #[serde(default)]
    pub gate: GateMode,
    #[serde(default)]
    pub content: Vec<ContentSpec>,
    #[serde(default)]
    pub buttons: Vec<ButtonSpec>,
    #[serde(default)]
    pub overlays: Vec<OverlaySpec>,
}

/// Passive content (logo, text panel) shown while the marker is tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSpec {
    pub name: String,
    #[serde(default = "renderable")]
    pub kinds: ContentKinds,
    #[serde(default)]
    pub size: [f32; 3],
    #[serde(default)]
    pub translation: [f32; 3],
}

fn renderable() -> ContentKinds {
    ContentKinds::RENDERABLE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonSpec {
    pub name: String,
    pub size: [f32; 3],
    #[serde(default)]
    pub translation: [f32; 3],
    /// Layers the button's region belongs to. Empty means the default layer.
    #[serde(default)]
    pub layers: Vec<u8>,
    pub action: ActionSpec,
}

/// Action as written in JSON. `target` names an overlay for `video_toggle`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    pub kind: ActionKind,
    #[serde(default)]
    pub payload: String,
    #[serde(default)]
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlaySpec {
    pub name: String,
    pub clip: String,
    /// Audio channel to route playback through.
    #[serde(default)]
    pub audio: Option<u32>,
    /// Tapping the playing overlay hides it again.
    #[serde(default)]
    pub close_on_tap: bool,
    pub size: [f32; 3],
    #[serde(default)]
    pub translation: [f32; 3],
}

/// Manifest the current card scene is built from. Replaced on every scene switch.
#[derive(Resource, Debug, Clone)]
pub struct ActiveCardManifest(pub CardManifest);

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "scene": "business_card",
        "interaction": { "layers": [0, 2] },
        "markers": [{
            "id": "card_front",
            "content": [{ "name": "logo", "size": [0.08, 0.04, 0.001] }],
            "buttons": [{
                "name": "play",
                "size": [0.02, 0.02, 0.002],
                "action": { "kind": "video_toggle", "target": "intro" }
            }],
            "overlays": [{
                "name": "intro",
                "clip": "videos/intro.mp4",
                "close_on_tap": true,
                "size": [0.09, 0.05, 0.001]
            }]
        }]
    }"#;

    #[test]
    fn parses_with_defaults() {
        let manifest: CardManifest = serde_json::from_str(SAMPLE).unwrap();
        let marker = &manifest.markers[0];

        assert_eq!(marker.gate, GateMode::Visibility);
        assert_eq!(marker.content[0].kinds, ContentKinds::RENDERABLE);
        assert_eq!(marker.buttons[0].action.kind, ActionKind::VideoToggle);
        assert_eq!(marker.buttons[0].action.target.as_deref(), Some("intro"));
        assert!(marker.overlays[0].close_on_tap);
        assert_eq!(marker.overlays[0].audio, None);

        let settings = manifest.interaction.to_settings();
        assert_eq!(settings.ray_distance, DEFAULT_RAY_DISTANCE);
        assert_eq!(settings.layers, InteractionLayers(0b101));
    }

    #[test]
    fn invalid_layers_accept_everything() {
        let spec = InteractionSpec {
            ray_distance: 2.0,
            layers: vec![40],
        };
        assert_eq!(spec.to_settings().layers, InteractionLayers::ALL);
    }
}

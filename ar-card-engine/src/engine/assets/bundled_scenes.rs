use bevy::prelude::*;
use serde::Deserialize;

/// Scene names found under `assets/cards` at build time.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BundledScenes {
    pub scenes: Vec<String>,
}

impl BundledScenes {
    pub fn from_build() -> Self {
        let listing = include_str!(concat!(env!("OUT_DIR"), "/bundled_scenes.json"));
        serde_json::from_str(listing).unwrap_or_else(|e| {
            error!("[SCENE] Bundled scene listing is unreadable: {}", e);
            Self::default()
        })
    }

    pub fn contains(&self, scene: &str) -> bool {
        self.scenes.iter().any(|s| s == scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scene_is_bundled() {
        let bundled = BundledScenes::from_build();
        assert!(bundled.contains(constants::path::DEFAULT_SCENE));
        assert!(!bundled.contains("missing_scene"));
    }
}

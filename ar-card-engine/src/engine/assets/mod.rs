//! Card scene configuration assets.

/// Scenes bundled with this build, discovered by the build script.
pub mod bundled_scenes;

/// JSON card manifest: markers, content, buttons and overlays per scene.
pub mod card_manifest;

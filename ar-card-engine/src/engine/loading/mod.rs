//! Card manifest loading and scene construction.
//!
//! ```text
//! ManifestLoader.request(scene)
//!   └─> load_requested_manifest()  asset server, cards/<scene>.card.json
//!       └─> poll_manifest_loading() ─> ActiveCardManifest
//!           └─> install_card_scene()  entities, registry, gates ─> Running
//! SceneLoadRequest
//!   └─> switch_card_scene()  teardown, request next ─> Loading
//! ```

/// Spawns marker roots, content, buttons, overlays and gates from a manifest.
pub mod card_builder;

/// Asset-server side of manifest loading, plus scene switching.
pub mod manifest_loader;

use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;
use constants::path::MANIFEST_EXTENSION;

use crate::engine::assets::bundled_scenes::BundledScenes;
use crate::engine::assets::card_manifest::{ActiveCardManifest, CardManifest};
use crate::engine::core::card_core::CardSystems;
use card_builder::{SceneChanged, install_card_scene};
use manifest_loader::{
    ManifestLoader, load_requested_manifest, poll_manifest_loading, switch_card_scene,
};

/// Scene switching and building. Needs no asset server: tests insert
/// `ActiveCardManifest` directly.
pub struct CardScenePlugin;

impl Plugin for CardScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ManifestLoader>()
            .insert_resource(BundledScenes::from_build())
            .add_event::<SceneChanged>()
            .add_systems(
                Update,
                (
                    switch_card_scene,
                    install_card_scene.run_if(resource_exists_and_changed::<ActiveCardManifest>),
                )
                    .chain()
                    .in_set(CardSystems::Scene),
            );
    }
}

/// Loads manifests through the asset server. Added by the app, not the core plugin.
pub struct ManifestLoadingPlugin;

impl Plugin for ManifestLoadingPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(JsonAssetPlugin::<CardManifest>::new(&[MANIFEST_EXTENSION]))
            .add_systems(
                Update,
                (load_requested_manifest, poll_manifest_loading)
                    .chain()
                    .in_set(CardSystems::Loading),
            );
    }
}

use super::card_builder::{CardSceneRoot, teardown_card_scene};
use crate::engine::assets::bundled_scenes::BundledScenes;
use crate::engine::assets::card_manifest::{ActiveCardManifest, CardManifest};
use crate::engine::core::app_state::AppState;
use crate::error::PlatformError;
use crate::interaction::dispatcher::ActionDispatcher;
use crate::interaction::registry::ActionRegistry;
use crate::platform::SceneLoadRequest;
use crate::video::overlay::{OverlayParts, OverlayState, OverlayStateChanged, OverlaySurface};
use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::path::{DEFAULT_SCENE, MANIFEST_EXTENSION, RELATIVE_MANIFEST_PATH};

/// Tracks which card manifest is wanted and the in-flight load for it.
#[derive(Resource, Debug)]
pub struct ManifestLoader {
    requested: Option<String>,
    scene: String,
    handle: Option<Handle<CardManifest>>,
}

impl Default for ManifestLoader {
    fn default() -> Self {
        Self {
            requested: Some(DEFAULT_SCENE.to_string()),
            scene: DEFAULT_SCENE.to_string(),
            handle: None,
        }
    }
}

impl ManifestLoader {
    pub fn request(&mut self, scene: impl Into<String>) {
        let scene = scene.into();
        self.scene = scene.clone();
        self.requested = Some(scene);
        self.handle = None;
    }

    /// Scene most recently requested, loaded or not.
    pub fn scene(&self) -> &str {
        &self.scene
    }

    pub fn is_pending(&self) -> bool {
        self.requested.is_some() || self.handle.is_some()
    }
}

pub fn manifest_path(scene: &str) -> String {
    format!("{}/{}.{}", RELATIVE_MANIFEST_PATH, scene, MANIFEST_EXTENSION)
}

// Start loading whichever manifest was last requested
pub fn load_requested_manifest(mut loader: ResMut<ManifestLoader>, asset_server: Res<AssetServer>) {
    let Some(scene) = loader.requested.take() else {
        return;
    };
    let path = manifest_path(&scene);
    info!("[SCENE] Loading card manifest {}", path);
    loader.handle = Some(asset_server.load(path));
}

pub fn poll_manifest_loading(
    mut loader: ResMut<ManifestLoader>,
    asset_server: Res<AssetServer>,
    manifests: Res<Assets<CardManifest>>,
    mut commands: Commands,
) {
    let Some(handle) = loader.handle.clone() else {
        return;
    };

    if let Some(manifest) = manifests.get(&handle) {
        if manifest.scene != loader.scene {
            warn!(
                "[SCENE] Manifest for '{}' declares scene '{}'",
                loader.scene, manifest.scene
            );
        }
        commands.insert_resource(ActiveCardManifest(manifest.clone()));
        loader.handle = None;
        return;
    }

    if let LoadState::Failed(e) = asset_server.load_state(&handle) {
        error!("[SCENE] Card manifest '{}' failed to load: {}", loader.scene, e);
        loader.handle = None;
    }
}

/// Tear the current scene down and request the next one. Only bundled scenes
/// are accepted; anything else is logged and the current scene stays.
#[allow(clippy::too_many_arguments)]
pub fn switch_card_scene(
    mut requests: EventReader<SceneLoadRequest>,
    bundled: Res<BundledScenes>,
    roots: Query<Entity, With<CardSceneRoot>>,
    mut overlays: Query<(Entity, OverlayParts)>,
    mut registry: ResMut<ActionRegistry>,
    mut dispatcher: ResMut<ActionDispatcher>,
    mut loader: ResMut<ManifestLoader>,
    next_state: Option<ResMut<NextState<AppState>>>,
    mut overlay_changes: EventWriter<OverlayStateChanged>,
    mut commands: Commands,
) {
    let Some(request) = requests
        .read()
        .filter(|request| {
            let known = bundled.contains(&request.scene);
            if !known {
                error!("[SCENE] {}", PlatformError::UnknownScene(request.scene.clone()));
            }
            known
        })
        .last()
    else {
        return;
    };

    // Stop playback before the overlays go away with the scene.
    for (entity, (mut overlay, mut visibility, mut region)) in &mut overlays {
        let mut surface = OverlaySurface {
            visibility: &mut visibility,
            region: region.as_deref_mut(),
        };
        if overlay.hide(&mut surface) {
            overlay_changes.write(OverlayStateChanged {
                overlay: entity,
                name: overlay.name().to_string(),
                state: OverlayState::Hidden,
            });
        }
    }

    teardown_card_scene(&mut commands, &roots, &mut registry, &mut dispatcher);
    commands.remove_resource::<ActiveCardManifest>();
    loader.request(request.scene.clone());
    info!("[SCENE] Switching to '{}'", request.scene);

    if let Some(mut next_state) = next_state {
        next_state.set(AppState::Loading);
    }
}

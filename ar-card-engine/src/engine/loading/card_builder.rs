use crate::engine::assets::card_manifest::{
    ActionSpec, ActiveCardManifest, ButtonSpec, CardManifest, ContentSpec, MarkerSpec, OverlaySpec,
};
use crate::engine::core::app_state::AppState;
use crate::error::ManifestError;
use crate::interaction::action::{ActionDescriptor, ActionKind};
use crate::interaction::dispatcher::ActionDispatcher;
use crate::interaction::region::{HitRegion, InteractionLayers};
use crate::interaction::registry::ActionRegistry;
use crate::tracking::gate::{ContentKinds, OverlayOwned, TrackingGatedActivation};
use crate::tracking::source::{TrackingStatusSource, TrackingSubscription};
use crate::tracking::status::{MarkerId, TrackedMarker};
use crate::video::backend::{AudioSinkId, ChannelAudioSink, ClockedVideoBackend};
use crate::video::overlay::VideoOverlay;
use bevy::prelude::*;
use constants::render_settings::{BUTTON_COLOUR, CONTENT_COLOUR, OVERLAY_COLOUR, SURFACE_THICKNESS};
use std::collections::{HashMap, HashSet};

/// Root of everything spawned for one card scene. Despawning it tears the scene down.
#[derive(Component, Debug, Clone)]
pub struct CardSceneRoot {
    pub scene: String,
}

/// Emitted once a card scene has been built and is live.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct SceneChanged {
    pub scene: String,
}

/// Placeholder geometry for content, buttons and overlays. Absent in headless runs.
struct SurfaceAssets<'a> {
    meshes: &'a mut Assets<Mesh>,
    content: Handle<StandardMaterial>,
    button: Handle<StandardMaterial>,
    overlay: Handle<StandardMaterial>,
}

impl<'a> SurfaceAssets<'a> {
    fn new(meshes: &'a mut Assets<Mesh>, materials: &mut Assets<StandardMaterial>) -> Self {
        let mut unlit = |[r, g, b]: [f32; 3]| {
            materials.add(StandardMaterial {
                base_color: Color::srgb(r, g, b),
                unlit: true,
                ..default()
            })
        };
        Self {
            content: unlit(CONTENT_COLOUR),
            button: unlit(BUTTON_COLOUR),
            overlay: unlit(OVERLAY_COLOUR),
            meshes,
        }
    }

    fn attach(&mut self, entity: &mut EntityCommands, size: Vec3, material: Handle<StandardMaterial>) {
        if size.x <= 0.0 || size.y <= 0.0 {
            return;
        }
        let depth = size.z.max(SURFACE_THICKNESS);
        let mesh = self.meshes.add(Cuboid::new(size.x, size.y, depth));
        entity.insert((Mesh3d(mesh), MeshMaterial3d(material)));
    }
}

/// Turns a manifest into entities, filling the action registry as it goes.
struct CardSceneBuilder<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    registry: &'a mut ActionRegistry,
    surfaces: Option<SurfaceAssets<'a>>,
    overlays: HashMap<String, Entity>,
}

impl CardSceneBuilder<'_, '_, '_> {
    /// Returns the number of marker roots spawned.
    fn build(&mut self, manifest: &CardManifest) -> usize {
        let root = self
            .commands
            .spawn((
                Name::new(format!("card_scene:{}", manifest.scene)),
                CardSceneRoot {
                    scene: manifest.scene.clone(),
                },
                Transform::default(),
                Visibility::Inherited,
            ))
            .id();

        let mut seen = HashSet::new();
        let markers: Vec<&MarkerSpec> = manifest
            .markers
            .iter()
            .filter(|marker| {
                let fresh = seen.insert(marker.id.as_str());
                if !fresh {
                    warn!("[SCENE] {}", ManifestError::DuplicateMarker(marker.id.clone()));
                }
                fresh
            })
            .collect();

        let marker_roots: Vec<Entity> = markers
            .iter()
            .map(|marker| self.spawn_marker_root(marker, root))
            .collect();

        // Overlays first so video toggles on any marker can name them.
        let overlays: Vec<Vec<Entity>> = markers
            .iter()
            .zip(&marker_roots)
            .map(|(marker, &marker_root)| {
                marker
                    .overlays
                    .iter()
                    .filter_map(|spec| self.spawn_overlay(spec, &marker.id, marker_root))
                    .collect()
            })
            .collect();

        for ((marker, &marker_root), overlay_entities) in markers.iter().zip(&marker_roots).zip(overlays) {
            let mut members: Vec<Entity> = marker
                .content
                .iter()
                .map(|spec| self.spawn_content(spec, marker_root))
                .collect();
            members.extend(
                marker
                    .buttons
                    .iter()
                    .map(|spec| self.spawn_button(spec, &marker.id, marker_root)),
            );
            // Collider-only gates would otherwise make hidden overlays hit-testable.
            if marker.gate.filter().exclude_overlay_owned {
                members.extend(overlay_entities);
            }

            let member_count = members.len();
            self.commands.spawn((
                Name::new(format!("gate:{}", marker.id)),
                TrackingGatedActivation::new(marker.gate.filter(), members),
                TrackingSubscription::to(marker.id.as_str()),
                ChildOf(marker_root),
            ));
            debug!(
                "[SCENE] Marker '{}' gated by {:?} over {} members",
                marker.id, marker.gate, member_count
            );
        }

        marker_roots.len()
    }

    fn spawn_marker_root(&mut self, marker: &MarkerSpec, root: Entity) -> Entity {
        self.commands
            .spawn((
                Name::new(format!("marker:{}", marker.id)),
                TrackedMarker {
                    id: MarkerId::new(marker.id.as_str()),
                },
                Transform::default(),
                Visibility::Inherited,
                ChildOf(root),
            ))
            .id()
    }

    fn spawn_content(&mut self, spec: &ContentSpec, marker_root: Entity) -> Entity {
        let size = Vec3::from_array(spec.size);
        let mut entity = self.commands.spawn((
            Name::new(spec.name.clone()),
            spec.kinds,
            Transform::from_translation(Vec3::from_array(spec.translation)),
            Visibility::Inherited,
            ChildOf(marker_root),
        ));
        if spec.kinds.collidable {
            entity.insert(HitRegion::new(size));
        }
        if let Some(surfaces) = self.surfaces.as_mut() {
            if spec.kinds.renderable {
                let material = surfaces.content.clone();
                surfaces.attach(&mut entity, size, material);
            }
        }
        entity.id()
    }

    fn spawn_button(&mut self, spec: &ButtonSpec, marker: &str, marker_root: Entity) -> Entity {
        let size = Vec3::from_array(spec.size);
        let layers = if spec.layers.is_empty() {
            InteractionLayers::default()
        } else {
            InteractionLayers::from_layers(&spec.layers).unwrap_or_else(|e| {
                warn!("[SCENE] Button '{}': {}; using the default layer", spec.name, e);
                InteractionLayers::default()
            })
        };

        let mut entity = self.commands.spawn((
            Name::new(spec.name.clone()),
            ContentKinds::RENDERABLE.union(ContentKinds::COLLIDABLE),
            HitRegion::new(size).with_layers(layers),
            Transform::from_translation(Vec3::from_array(spec.translation)),
            Visibility::Inherited,
            ChildOf(marker_root),
        ));
        if let Some(surfaces) = self.surfaces.as_mut() {
            let material = surfaces.button.clone();
            surfaces.attach(&mut entity, size, material);
        }
        let region = entity.id();

        let action = match self.resolve_action(&spec.action, &spec.name) {
            Ok(action) => Some(action),
            Err(e) => {
                warn!("[SCENE] {}; '{}' will do nothing when tapped", e, spec.name);
                None
            }
        };
        self.registry
            .register(region, action, Some(MarkerId::new(marker)));
        region
    }

    fn resolve_action(&self, spec: &ActionSpec, region: &str) -> Result<ActionDescriptor, ManifestError> {
        if spec.kind != ActionKind::VideoToggle {
            return ActionDescriptor::with_payload(spec.kind, &spec.payload, region);
        }
        let target = spec
            .target
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ManifestError::MissingVideoTarget {
                region: region.to_string(),
            })?;
        let overlay = self
            .overlays
            .get(target)
            .ok_or_else(|| ManifestError::UnknownVideoTarget {
                region: region.to_string(),
                target: target.to_string(),
            })?;
        Ok(ActionDescriptor::video_toggle(*overlay))
    }

    fn spawn_overlay(&mut self, spec: &OverlaySpec, marker: &str, marker_root: Entity) -> Option<Entity> {
        if self.overlays.contains_key(&spec.name) {
            warn!("[SCENE] {}", ManifestError::DuplicateOverlay(spec.name.clone()));
            return None;
        }

        let size = Vec3::from_array(spec.size);
        let mut video = VideoOverlay::new(
            spec.name.clone(),
            marker,
            ClockedVideoBackend::new(spec.clip.clone()),
        );
        if let Some(channel) = spec.audio {
            video = video.with_audio(ChannelAudioSink::new(AudioSinkId(channel)));
        }

        let mut entity = self.commands.spawn((
            Name::new(spec.name.clone()),
            video,
            OverlayOwned,
            ContentKinds::RENDERABLE.union(ContentKinds::COLLIDABLE),
            HitRegion::new(size),
            TrackingSubscription::to(marker),
            Transform::from_translation(Vec3::from_array(spec.translation)),
            Visibility::Hidden,
            ChildOf(marker_root),
        ));
        if let Some(surfaces) = self.surfaces.as_mut() {
            let material = surfaces.overlay.clone();
            surfaces.attach(&mut entity, size, material);
        }
        let overlay = entity.id();

        if spec.close_on_tap {
            self.registry.register(
                overlay,
                Some(ActionDescriptor::video_toggle(overlay)),
                Some(MarkerId::new(marker)),
            );
        }
        self.overlays.insert(spec.name.clone(), overlay);
        Some(overlay)
    }
}

/// Despawn the current scene and forget everything that pointed into it.
/// Subscriptions are released by the despawn itself.
pub fn teardown_card_scene(
    commands: &mut Commands,
    roots: &Query<Entity, With<CardSceneRoot>>,
    registry: &mut ActionRegistry,
    dispatcher: &mut ActionDispatcher,
) {
    for root in roots {
        commands.entity(root).despawn();
    }
    registry.clear();
    dispatcher.reset();
}

/// Build the scene described by `ActiveCardManifest` whenever it is (re)inserted.
#[allow(clippy::too_many_arguments)]
pub fn install_card_scene(
    manifest: Res<ActiveCardManifest>,
    roots: Query<Entity, With<CardSceneRoot>>,
    mut registry: ResMut<ActionRegistry>,
    mut dispatcher: ResMut<ActionDispatcher>,
    mut tracking: ResMut<TrackingStatusSource>,
    mut meshes: Option<ResMut<Assets<Mesh>>>,
    mut materials: Option<ResMut<Assets<StandardMaterial>>>,
    next_state: Option<ResMut<NextState<AppState>>>,
    mut scene_changed: EventWriter<SceneChanged>,
    mut commands: Commands,
) {
    let manifest = &manifest.0;
    if !roots.is_empty() {
        debug!("[SCENE] Replacing live scene with '{}'", manifest.scene);
        teardown_card_scene(&mut commands, &roots, &mut registry, &mut dispatcher);
    }

    tracking.set_scene_markers(
        manifest
            .markers
            .iter()
            .map(|marker| MarkerId::new(marker.id.as_str())),
    );

    let surfaces = match (meshes.as_deref_mut(), materials.as_deref_mut()) {
        (Some(meshes), Some(materials)) => Some(SurfaceAssets::new(meshes, materials)),
        _ => None,
    };

    let mut builder = CardSceneBuilder {
        commands: &mut commands,
        registry: &mut registry,
        surfaces,
        overlays: HashMap::new(),
    };
    let marker_count = builder.build(manifest);

    commands.insert_resource(manifest.interaction.to_settings());
    info!(
        "[SCENE] '{}' ready: {} markers, {} registered regions",
        manifest.scene,
        marker_count,
        registry.len()
    );

    scene_changed.write(SceneChanged {
        scene: manifest.scene.clone(),
    });
    if let Some(mut next_state) = next_state {
        next_state.set(AppState::Running);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_markers_are_not_counted() {
        let manifest: CardManifest = serde_json::from_str(
            r#"{
                "scene": "dupes",
                "markers": [{ "id": "front" }, { "id": "front" }, { "id": "back" }]
            }"#,
        )
        .unwrap();
        let mut world = World::new();
        world.init_resource::<TrackingStatusSource>();
        let mut registry = ActionRegistry::default();

        let spawned = {
            let mut commands = world.commands();
            let mut builder = CardSceneBuilder {
                commands: &mut commands,
                registry: &mut registry,
                surfaces: None,
                overlays: HashMap::new(),
            };
            builder.build(&manifest)
        };
        world.flush();

        assert_eq!(spawned, 2);
        let mut markers = world.query::<&TrackedMarker>();
        assert_eq!(markers.iter(&world).count(), 2);
    }
}

use super::dispatcher::{
    ActionDispatcher, ActionEffects, ActionExecuted, ActionTriggered, DispatchOutcome,
};
use super::input::{InteractionSettings, PointerRay};
use super::ray::{RegionParts, RegionRaycaster, Raycaster};
use super::registry::{ActionRegistry, Resolution};
use crate::platform::{PlatformUrlOpener, SceneLoadRequest};
use crate::tracking::source::TrackingStatusSource;
use crate::video::overlay::{self as video_overlay, OverlayParts, OverlayState, OverlayStateChanged};
use bevy::prelude::*;

/// Hit-test each pointer ray and forward actions whose marker is currently active.
pub fn resolve_pointer_hits(
    mut rays: EventReader<PointerRay>,
    regions: Query<RegionParts>,
    settings: Res<InteractionSettings>,
    registry: Res<ActionRegistry>,
    source: Res<TrackingStatusSource>,
    mut triggered: EventWriter<ActionTriggered>,
) {
    let raycaster = RegionRaycaster::new(&regions);
    for pointer in rays.read() {
        let Some(hit) = raycaster.query(pointer.ray, settings.ray_distance, settings.layers) else {
            continue;
        };

        match registry.resolve(hit.region, &source) {
            Resolution::Ready { action, marker } => {
                triggered.write(ActionTriggered {
                    region: hit.region,
                    marker,
                    action,
                });
            }
            Resolution::NoAction => {
                warn!("[ACTION] Region {:?} was hit but carries no action", hit.region);
            }
            Resolution::NoMarker => {
                warn!("[ACTION] Region {:?} has no owning marker", hit.region);
            }
            Resolution::Inactive { marker, status } => {
                debug!(
                    "[ACTION] Ignoring hit on {:?}: marker '{}' is {}",
                    hit.region,
                    marker,
                    status.to_string()
                );
            }
        }
    }
}

/// `ActionEffects` backed by the ECS world for one system run.
struct WorldEffects<'w, 's> {
    overlays: Query<'w, 's, OverlayParts>,
    opener: Res<'w, PlatformUrlOpener>,
    source: Res<'w, TrackingStatusSource>,
    scene_requests: EventWriter<'w, SceneLoadRequest>,
    overlay_changes: EventWriter<'w, OverlayStateChanged>,
}

impl WorldEffects<'_, '_> {
    fn announce(&mut self, overlay: Entity, state: OverlayState) {
        let Ok((video, _, _)) = self.overlays.get(overlay) else {
            return;
        };
        self.overlay_changes.write(OverlayStateChanged {
            overlay,
            name: video.name().to_string(),
            state,
        });
    }
}

impl ActionEffects for WorldEffects<'_, '_> {
    fn open_url(&mut self, uri: &str) {
        self.opener.open_logged(uri);
    }

    fn load_scene(&mut self, scene: &str) {
        info!("[ACTION] Loading scene '{}'", scene);
        self.scene_requests.write(SceneLoadRequest {
            scene: scene.to_string(),
        });
    }

    fn has_overlay(&self, overlay: Entity) -> bool {
        self.overlays.contains(overlay)
    }

    fn overlay_marker_active(&self, overlay: Entity) -> bool {
        self.overlays
            .get(overlay)
            .is_ok_and(|(video, _, _)| self.source.current_status(video.marker()).is_active())
    }

    fn show_overlay(&mut self, overlay: Entity) -> bool {
        let changed = video_overlay::show_overlay(&mut self.overlays, overlay).unwrap_or(false);
        if changed {
            self.announce(overlay, OverlayState::Playing);
        }
        changed
    }

    fn hide_overlay(&mut self, overlay: Entity) -> bool {
        let was_playing = video_overlay::hide_overlay(&mut self.overlays, overlay).unwrap_or(false);
        if was_playing {
            self.announce(overlay, OverlayState::Hidden);
        }
        was_playing
    }
}

/// Run triggered actions in order. A scene change ends the dispatch and drops
/// whatever else was triggered this tick.
#[allow(clippy::too_many_arguments)]
pub fn execute_triggered_actions(
    mut triggered: EventReader<ActionTriggered>,
    mut dispatcher: ResMut<ActionDispatcher>,
    overlays: Query<OverlayParts>,
    opener: Res<PlatformUrlOpener>,
    source: Res<TrackingStatusSource>,
    scene_requests: EventWriter<SceneLoadRequest>,
    overlay_changes: EventWriter<OverlayStateChanged>,
    mut executed: EventWriter<ActionExecuted>,
) {
    let pending: Vec<ActionTriggered> = triggered.read().cloned().collect();
    if pending.is_empty() {
        return;
    }
    let mut effects = WorldEffects {
        overlays,
        opener,
        source,
        scene_requests,
        overlay_changes,
    };

    for (index, action) in pending.iter().enumerate() {
        let outcome = dispatcher.execute(&action.action, &mut effects);
        if matches!(
            outcome,
            DispatchOutcome::MissingOverlay(_) | DispatchOutcome::OverlayUntracked(_)
        ) {
            continue;
        }

        executed.write(ActionExecuted {
            region: action.region,
            marker: action.marker.clone(),
            kind: action.action.kind(),
        });

        if matches!(outcome, DispatchOutcome::SceneChange(_)) {
            let dropped = pending.len() - index - 1;
            if dropped > 0 {
                debug!("[ACTION] Dropped {} action(s) queued after a scene change", dropped);
            }
            break;
        }
    }
}

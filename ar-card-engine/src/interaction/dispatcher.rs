use super::action::{ActionDescriptor, ActionKind};
use crate::tracking::status::MarkerId;
use bevy::prelude::*;

/// Side effects an executed action may have. The ECS implementation lives in
/// `execute_triggered_actions`; tests substitute a recorder.
pub trait ActionEffects {
    fn open_url(&mut self, uri: &str);
    fn load_scene(&mut self, scene: &str);
    fn has_overlay(&self, overlay: Entity) -> bool;
    /// Whether the marker owning `overlay` is currently active.
    fn overlay_marker_active(&self, overlay: Entity) -> bool;
    /// Returns whether the overlay changed state.
    fn show_overlay(&mut self, overlay: Entity) -> bool;
    /// Returns whether the overlay was playing.
    fn hide_overlay(&mut self, overlay: Entity) -> bool;
}

/// An action that passed hit-testing and tracking gating, ready to run.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ActionTriggered {
    pub region: Entity,
    pub marker: MarkerId,
    pub action: ActionDescriptor,
}

/// Emitted after an action's effect was issued.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ActionExecuted {
    pub region: Entity,
    pub marker: MarkerId,
    pub kind: ActionKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    UrlOpened(String),
    /// Nothing else may run in this dispatch after a scene change.
    SceneChange(String),
    OverlayShown(Entity),
    OverlayHidden(Entity),
    MissingOverlay(Entity),
    /// The target's own marker is not tracked, so it may not start.
    OverlayUntracked(Entity),
}

/// Owns the single "currently playing" slot shared by every video toggle.
///
/// Invariant: when `currently_playing` names an overlay, that overlay is
/// Playing and no other overlay is.
#[derive(Resource, Debug, Default)]
pub struct ActionDispatcher {
    currently_playing: Option<Entity>,
}

impl ActionDispatcher {
    pub fn currently_playing(&self) -> Option<Entity> {
        self.currently_playing
    }

    pub fn execute(
        &mut self,
        action: &ActionDescriptor,
        effects: &mut impl ActionEffects,
    ) -> DispatchOutcome {
        match action {
            ActionDescriptor::SceneLoad { scene } => {
                effects.load_scene(scene);
                DispatchOutcome::SceneChange(scene.clone())
            }
            ActionDescriptor::VideoToggle { overlay } => self.toggle(*overlay, effects),
            other => {
                // Every remaining kind maps to a URI.
                let uri = other.uri().unwrap_or_default();
                effects.open_url(&uri);
                DispatchOutcome::UrlOpened(uri)
            }
        }
    }

    fn toggle(&mut self, overlay: Entity, effects: &mut impl ActionEffects) -> DispatchOutcome {
        if self.currently_playing == Some(overlay) {
            effects.hide_overlay(overlay);
            self.currently_playing = None;
            return DispatchOutcome::OverlayHidden(overlay);
        }

        if !effects.has_overlay(overlay) {
            warn!("[ACTION] Video toggle target {:?} no longer exists", overlay);
            return DispatchOutcome::MissingOverlay(overlay);
        }

        if !effects.overlay_marker_active(overlay) {
            debug!(
                "[ACTION] Video toggle target {:?} belongs to a marker that is not tracked",
                overlay
            );
            return DispatchOutcome::OverlayUntracked(overlay);
        }

        if let Some(previous) = self.currently_playing.take() {
            effects.hide_overlay(previous);
        }
        effects.show_overlay(overlay);
        self.currently_playing = Some(overlay);
        DispatchOutcome::OverlayShown(overlay)
    }

    /// Forget `overlay` if it holds the slot, e.g. after a forced hide.
    pub fn release(&mut self, overlay: Entity) -> bool {
        if self.currently_playing != Some(overlay) {
            return false;
        }
        self.currently_playing = None;
        true
    }

    pub fn reset(&mut self) {
        self.currently_playing = None;
    }

    #[cfg(test)]
    pub(crate) fn set_currently_playing(&mut self, overlay: Option<Entity>) {
        self.currently_playing = overlay;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Default)]
    struct RecordingEffects {
        overlays: HashSet<Entity>,
        untracked: HashSet<Entity>,
        playing: HashSet<Entity>,
        urls: Vec<String>,
        scenes: Vec<String>,
        shows: usize,
    }

    impl ActionEffects for RecordingEffects {
        fn open_url(&mut self, uri: &str) {
            self.urls.push(uri.to_string());
        }

        fn load_scene(&mut self, scene: &str) {
            self.scenes.push(scene.to_string());
        }

        fn has_overlay(&self, overlay: Entity) -> bool {
            self.overlays.contains(&overlay)
        }

        fn overlay_marker_active(&self, overlay: Entity) -> bool {
            !self.untracked.contains(&overlay)
        }

        fn show_overlay(&mut self, overlay: Entity) -> bool {
            self.shows += 1;
            self.playing.insert(overlay)
        }

        fn hide_overlay(&mut self, overlay: Entity) -> bool {
            self.playing.remove(&overlay)
        }
    }

    fn effects_with(overlays: &[Entity]) -> RecordingEffects {
        RecordingEffects {
            overlays: overlays.iter().copied().collect(),
            ..Default::default()
        }
    }

    #[test]
    fn toggle_same_overlay_hides_it() {
        let a = Entity::from_raw(1);
        let mut effects = effects_with(&[a]);
        let mut dispatcher = ActionDispatcher::default();
        let toggle = ActionDescriptor::video_toggle(a);

        assert_eq!(dispatcher.execute(&toggle, &mut effects), DispatchOutcome::OverlayShown(a));
        assert_eq!(dispatcher.currently_playing(), Some(a));

        assert_eq!(dispatcher.execute(&toggle, &mut effects), DispatchOutcome::OverlayHidden(a));
        assert_eq!(dispatcher.currently_playing(), None);
        assert!(effects.playing.is_empty());
    }

    #[test]
    fn toggle_different_overlay_swaps() {
        let a = Entity::from_raw(1);
        let b = Entity::from_raw(2);
        let mut effects = effects_with(&[a, b]);
        let mut dispatcher = ActionDispatcher::default();

        dispatcher.execute(&ActionDescriptor::video_toggle(a), &mut effects);
        dispatcher.execute(&ActionDescriptor::video_toggle(b), &mut effects);

        assert_eq!(dispatcher.currently_playing(), Some(b));
        assert_eq!(effects.playing, HashSet::from([b]));
    }

    #[test]
    fn missing_target_leaves_current_overlay_playing() {
        let a = Entity::from_raw(1);
        let gone = Entity::from_raw(9);
        let mut effects = effects_with(&[a]);
        let mut dispatcher = ActionDispatcher::default();

        dispatcher.execute(&ActionDescriptor::video_toggle(a), &mut effects);
        let outcome = dispatcher.execute(&ActionDescriptor::video_toggle(gone), &mut effects);

        assert_eq!(outcome, DispatchOutcome::MissingOverlay(gone));
        assert_eq!(dispatcher.currently_playing(), Some(a));
        assert!(effects.playing.contains(&a));
    }

    #[test]
    fn untracked_target_is_not_started() {
        let a = Entity::from_raw(1);
        let b = Entity::from_raw(2);
        let mut effects = effects_with(&[a, b]);
        effects.untracked.insert(b);
        let mut dispatcher = ActionDispatcher::default();

        dispatcher.execute(&ActionDescriptor::video_toggle(a), &mut effects);
        let outcome = dispatcher.execute(&ActionDescriptor::video_toggle(b), &mut effects);

        assert_eq!(outcome, DispatchOutcome::OverlayUntracked(b));
        assert_eq!(dispatcher.currently_playing(), Some(a));
        assert_eq!(effects.playing, HashSet::from([a]));
        assert_eq!(effects.shows, 1);
    }

    #[test]
    fn link_and_scene_actions_use_their_delegates() {
        let mut effects = RecordingEffects::default();
        let mut dispatcher = ActionDispatcher::default();

        let phone = ActionDescriptor::with_payload(ActionKind::Phone, "5551234", "phone").unwrap();
        dispatcher.execute(&phone, &mut effects);
        let scene = ActionDescriptor::with_payload(ActionKind::SceneLoad, "portfolio", "next").unwrap();
        let outcome = dispatcher.execute(&scene, &mut effects);

        assert_eq!(effects.urls, vec!["tel://5551234".to_string()]);
        assert_eq!(effects.scenes, vec!["portfolio".to_string()]);
        assert_eq!(outcome, DispatchOutcome::SceneChange("portfolio".into()));
        assert_eq!(effects.shows, 0);
    }

    #[test]
    fn release_only_clears_matching_overlay() {
        let a = Entity::from_raw(1);
        let mut dispatcher = ActionDispatcher::default();
        dispatcher.set_currently_playing(Some(a));

        assert!(!dispatcher.release(Entity::from_raw(2)));
        assert!(dispatcher.release(a));
        assert_eq!(dispatcher.currently_playing(), None);
    }
}

//! Marker-attached video overlays.
//!
//! `show()` enables the surface straight away and arms a pending start; the
//! play command goes out on the following tick in `start_pending_playback`.
//! Tracking loss for the owning marker forces `hide()` and releases the
//! overlay from the action dispatcher.

/// Playback and audio collaborators behind trait objects.
pub mod backend;

/// `VideoOverlay` component and its Hidden/Playing transitions.
pub mod overlay;

use bevy::prelude::*;

use crate::engine::core::card_core::CardSystems;
use crate::interaction::dispatcher::ActionDispatcher;
use crate::tracking::source::TrackingStatusChanged;
use overlay::{OverlayParts, OverlaySurface};

pub use backend::{AudioSink, AudioSinkId, ChannelAudioSink, ClockedVideoBackend, VideoBackend};
pub use overlay::{OverlayState, OverlayStateChanged, VideoOverlay};

/// Expects `ActionDispatcher` from `InteractionPlugin`.
pub struct VideoPlugin;

impl Plugin for VideoPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<OverlayStateChanged>()
            .add_systems(
                Update,
                (
                    hide_overlays_on_tracking_loss,
                    start_pending_playback,
                    advance_playback_clocks,
                )
                    .chain()
                    .in_set(CardSystems::Playback),
            );
    }
}

/// Forced transition: any overlay whose marker is no longer active goes Hidden,
/// whatever state it was in, including a show still waiting for its start tick.
pub fn hide_overlays_on_tracking_loss(
    mut deliveries: EventReader<TrackingStatusChanged>,
    mut overlays: Query<OverlayParts>,
    mut dispatcher: ResMut<ActionDispatcher>,
    mut changes: EventWriter<OverlayStateChanged>,
) {
    for delivery in deliveries.read() {
        if delivery.status.is_active() {
            continue;
        }
        let Ok((mut overlay, mut visibility, mut region)) = overlays.get_mut(delivery.subscriber)
        else {
            continue;
        };

        let mut surface = OverlaySurface {
            visibility: &mut visibility,
            region: region.as_deref_mut(),
        };
        if !overlay.hide(&mut surface) {
            continue;
        }

        info!(
            "[VIDEO] '{}' hidden: marker '{}' is {}",
            overlay.name(),
            delivery.marker,
            delivery.status.to_string()
        );
        dispatcher.release(delivery.subscriber);
        changes.write(OverlayStateChanged {
            overlay: delivery.subscriber,
            name: overlay.name().to_string(),
            state: OverlayState::Hidden,
        });
    }
}

/// Second half of `show()`: issue the deferred play command.
pub fn start_pending_playback(mut overlays: Query<&mut VideoOverlay>) {
    for mut overlay in &mut overlays {
        if !overlay.is_start_pending() {
            continue;
        }
        if overlay.start_pending_playback() {
            debug!("[VIDEO] '{}' playback started", overlay.name());
        }
    }
}

pub fn advance_playback_clocks(time: Res<Time>, mut overlays: Query<&mut VideoOverlay>) {
    let delta = time.delta();
    for mut overlay in &mut overlays {
        if overlay.is_playing() && !overlay.is_start_pending() {
            overlay.advance(delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::backend::testing::{PlaybackLog, RecordingBackend, SharedLog};
    use super::*;
    use crate::interaction::region::HitRegion;
    use bevy::ecs::system::SystemState;
    use crate::tracking::TrackingPlugin;
    use crate::tracking::source::{TrackingStatusReport, TrackingSubscription};
    use crate::tracking::status::TrackingStatus;
    use std::sync::{Arc, Mutex};

    fn app_with_overlay() -> (App, Entity, SharedLog) {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, TrackingPlugin, VideoPlugin))
            .init_resource::<ActionDispatcher>()
            .configure_sets(Update, (CardSystems::Tracking, CardSystems::Playback).chain());

        let log: SharedLog = Arc::new(Mutex::new(PlaybackLog::default()));
        let overlay = app
            .world_mut()
            .spawn((
                VideoOverlay::new("intro", "card_front", RecordingBackend::new(log.clone())),
                Visibility::Hidden,
                HitRegion::new(Vec3::ONE),
                TrackingSubscription::to("card_front"),
            ))
            .id();
        (app, overlay, log)
    }

    fn show(app: &mut App, entity: Entity) {
        let mut state = SystemState::<Query<OverlayParts>>::new(app.world_mut());
        let mut overlays = state.get_mut(app.world_mut());
        overlay::show_overlay(&mut overlays, entity);
    }

    #[test]
    fn play_is_issued_on_the_tick_after_show() {
        let (mut app, overlay, log) = app_with_overlay();
        app.world_mut()
            .send_event(TrackingStatusReport::new("card_front", TrackingStatus::Tracked));
        app.update();

        show(&mut app, overlay);
        assert_eq!(log.lock().unwrap().plays, 0);
        assert!(app.world().get::<HitRegion>(overlay).unwrap().enabled);

        app.update();
        assert_eq!(log.lock().unwrap().plays, 1);
        app.update();
        assert_eq!(log.lock().unwrap().plays, 1);
    }

    #[test]
    fn tracking_loss_forces_hide_and_releases_dispatcher() {
        let (mut app, overlay, log) = app_with_overlay();
        show(&mut app, overlay);
        app.world_mut()
            .resource_mut::<ActionDispatcher>()
            .set_currently_playing(Some(overlay));
        app.update();

        app.world_mut()
            .send_event(TrackingStatusReport::new("card_front", TrackingStatus::NotFound));
        app.update();

        let video = app.world().get::<VideoOverlay>(overlay).unwrap();
        assert_eq!(video.state(), OverlayState::Hidden);
        assert_eq!(*app.world().get::<Visibility>(overlay).unwrap(), Visibility::Hidden);
        assert_eq!(log.lock().unwrap().stops, 1);
        assert_eq!(
            app.world().resource::<ActionDispatcher>().currently_playing(),
            None
        );

        let events = app.world().resource::<Events<OverlayStateChanged>>();
        let mut reader = events.get_cursor();
        let hidden: Vec<_> = reader
            .read(events)
            .filter(|e| e.state == OverlayState::Hidden)
            .collect();
        assert_eq!(hidden.len(), 1);
    }

    #[test]
    fn tracking_loss_cancels_show_before_start() {
        let (mut app, overlay, log) = app_with_overlay();
        show(&mut app, overlay);
        app.world_mut()
            .send_event(TrackingStatusReport::new("card_front", TrackingStatus::Limited));
        app.update();

        assert_eq!(log.lock().unwrap().plays, 0);
        assert!(!app.world().get::<VideoOverlay>(overlay).unwrap().is_playing());
    }
}

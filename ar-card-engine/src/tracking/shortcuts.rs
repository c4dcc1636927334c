use super::source::{TrackingStatusReport, TrackingStatusSource};
use super::status::{TrackedMarker, TrackingStatus};
use bevy::prelude::*;

/// Digit keys in marker order; `Digit1` is the first marker sorted by id.
#[cfg(not(target_arch = "wasm32"))]
const MARKER_KEYS: [KeyCode; constants::interaction::MAX_SHORTCUT_MARKERS] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

/// System toggling markers between `Tracked` and `NotFound` from the keyboard (native builds only).
#[cfg(not(target_arch = "wasm32"))]
pub fn handle_tracking_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    markers: Query<&TrackedMarker>,
    source: Res<TrackingStatusSource>,
    mut reports: EventWriter<TrackingStatusReport>,
) {
    let mut ids: Vec<_> = markers.iter().map(|m| m.id.clone()).collect();
    ids.sort();
    ids.dedup();

    for (key, id) in MARKER_KEYS.iter().zip(ids) {
        if !keyboard.just_pressed(*key) {
            continue;
        }

        let status = if source.current_status(&id).is_active() {
            TrackingStatus::NotFound
        } else {
            TrackingStatus::Tracked
        };
        debug!("[TRACK] Shortcut {:?} -> '{}' {}", key, id, status.to_string());
        reports.write(TrackingStatusReport::new(id, status));
    }
}

/// Placeholder system for WASM builds where the host page supplies tracking.
#[cfg(target_arch = "wasm32")]
pub fn handle_tracking_keyboard_shortcuts() {
    // Tracking arrives over RPC in WASM builds.
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::tracking::TrackingPlugin;
    use crate::tracking::status::MarkerId;

    #[test]
    fn digit_key_toggles_nth_marker() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, TrackingPlugin))
            .init_resource::<ButtonInput<KeyCode>>()
            .add_systems(
                Update,
                handle_tracking_keyboard_shortcuts.before(crate::engine::core::card_core::CardSystems::Tracking),
            );

        app.world_mut()
            .resource_mut::<TrackingStatusSource>()
            .set_scene_markers([MarkerId::new("card_back"), MarkerId::new("card_front")]);
        app.world_mut().spawn(TrackedMarker {
            id: MarkerId::new("card_back"),
        });
        app.world_mut().spawn(TrackedMarker {
            id: MarkerId::new("card_front"),
        });

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Digit2);
        app.update();

        let source = app.world().resource::<TrackingStatusSource>();
        assert_eq!(
            source.current_status(&MarkerId::new("card_front")),
            TrackingStatus::Tracked
        );
        assert_eq!(
            source.current_status(&MarkerId::new("card_back")),
            TrackingStatus::Undefined
        );

        {
            let mut keyboard = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
            keyboard.release(KeyCode::Digit2);
            keyboard.clear();
            keyboard.press(KeyCode::Digit2);
        }
        app.update();

        assert_eq!(
            app.world()
                .resource::<TrackingStatusSource>()
                .current_status(&MarkerId::new("card_front")),
            TrackingStatus::NotFound
        );
    }
}

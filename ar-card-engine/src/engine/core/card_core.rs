use bevy::prelude::*;

use crate::engine::loading::CardScenePlugin;
use crate::interaction::InteractionPlugin;
use crate::platform::PlatformPlugin;
use crate::tracking::TrackingPlugin;
use crate::video::VideoPlugin;

/// Per-tick pipeline, run in this order inside `Update`.
///
/// A show issued in `Dispatch` at tick N is started by `Playback` at tick N+1,
/// after that tick's tracking statuses have been applied.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardSystems {
    /// Manifest asset polling.
    Loading,
    /// Scene switching and building.
    Scene,
    /// Status fan-out and gates.
    Tracking,
    /// Forced hides, deferred starts, playback clocks.
    Playback,
    /// Pointer to ray to triggered action.
    Input,
    Dispatch,
}

/// Everything needed to run a card scene without a window or renderer.
pub struct CardCorePlugin;

impl Plugin for CardCorePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                CardSystems::Loading,
                CardSystems::Scene,
                CardSystems::Tracking,
                CardSystems::Playback,
                CardSystems::Input,
                CardSystems::Dispatch,
            )
                .chain(),
        )
        .add_plugins((
            PlatformPlugin,
            TrackingPlugin,
            VideoPlugin,
            InteractionPlugin,
            CardScenePlugin,
        ));
    }
}

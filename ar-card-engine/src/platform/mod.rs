//! Platform delegates: URL hand-off and scene-load requests.

/// URL opener seam and its native/browser implementations.
pub mod url_opener;

use bevy::prelude::*;

pub use url_opener::{PlatformUrlOpener, SystemUrlOpener, UrlOpener};

/// Request to replace the current card scene. Handled by the scene loader at
/// the start of the next tick; control does not come back to the requester.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct SceneLoadRequest {
    pub scene: String,
}

pub struct PlatformPlugin;

impl Plugin for PlatformPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlatformUrlOpener>()
            .add_event::<SceneLoadRequest>();
    }
}

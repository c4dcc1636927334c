//! Pointer input to action execution.
//!
//! ```text
//! mouse / touch / host RPC
//!   └─> PointerDown ─> project_pointer_rays() ─> PointerRay
//!       └─> resolve_pointer_hits()   nearest enabled HitRegion, registry lookup,
//!           │                        owning marker must be active right now
//!           └─> ActionTriggered
//!               └─> execute_triggered_actions()   ActionDispatcher
//!                   ├─ email / phone / map  -> PlatformUrlOpener
//!                   ├─ scene_load           -> SceneLoadRequest (ends dispatch)
//!                   └─ video_toggle         -> show / hide VideoOverlay
//! ```

pub mod action;

/// Toggle policy and the single currently-playing slot.
pub mod dispatcher;

pub mod input;

/// Ray versus oriented-box hit testing.
pub mod ray;

/// `HitRegion` and interaction layers.
pub mod region;

pub mod registry;

mod systems;

use bevy::prelude::*;

use crate::engine::core::card_core::CardSystems;
use input::{emit_pointer_down, project_pointer_rays};
use systems::{execute_triggered_actions, resolve_pointer_hits};

pub use action::{ActionDescriptor, ActionKind};
pub use dispatcher::{ActionDispatcher, ActionExecuted, ActionTriggered};
pub use input::{ArCamera, InteractionSettings, PointerDown, PointerRay, PointerSource};
pub use region::{HitRegion, InteractionLayers};
pub use registry::ActionRegistry;

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActionRegistry>()
            .init_resource::<ActionDispatcher>()
            .init_resource::<InteractionSettings>()
            .add_event::<PointerDown>()
            .add_event::<PointerRay>()
            .add_event::<ActionTriggered>()
            .add_event::<ActionExecuted>()
            .add_systems(
                Update,
                (emit_pointer_down, project_pointer_rays, resolve_pointer_hits)
                    .chain()
                    .in_set(CardSystems::Input),
            )
            .add_systems(
                Update,
                execute_triggered_actions.in_set(CardSystems::Dispatch),
            );
    }
}

use bevy::prelude::*;

/// `Loading` until the current card manifest has been turned into entities.
/// Pointer input and action dispatch only run in `Running`.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    Running,
}

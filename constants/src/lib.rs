//! Shared constants for the AR card engine.

pub mod interaction;
pub mod logging;
pub mod path;
pub mod render_settings;

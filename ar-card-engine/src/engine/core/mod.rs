//! Core application setup and state management.
//!
//! Handles application lifecycle, window configuration and the per-tick
//! system pipeline shared by native, WASM and headless builds.

/// Application setup and plugin configuration for the Bevy engine.
pub mod app_setup;

/// Loading/Running state machine.
pub mod app_state;

/// Headless core plugin and the ordered system sets every tick runs through.
pub mod card_core;

/// Platform-specific window configuration for native and WASM builds.
///
/// Configures canvas integration for web targets and vsync settings.
pub mod window_config;

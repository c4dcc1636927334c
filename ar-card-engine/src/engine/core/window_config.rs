use bevy::prelude::*;
use bevy::window::PresentMode;

pub fn create_window_config() -> Window {
    #[cfg(target_arch = "wasm32")]
    {
        Window {
            canvas: Some("#bevy".into()),
            fit_canvas_to_parent: true,
            // Touch events must reach the page so the host can forward them too.
            prevent_default_event_handling: false,
            transparent: true,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Window {
            title: "AR Card Engine".into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }
}

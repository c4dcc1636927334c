use super::region::InteractionLayers;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use constants::interaction::DEFAULT_RAY_DISTANCE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch,
    /// Forwarded by the host page over RPC.
    Host,
}

/// Discrete "pointer began" at a logical window position. Holding never repeats it.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PointerDown {
    pub screen_position: Vec2,
    pub source: PointerSource,
}

/// World-space ray for one pointer-down.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PointerRay {
    pub ray: Ray3d,
}

/// Camera whose view the tracker renders into; pointer rays start here.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct ArCamera;

/// Ray query parameters, taken from the active card manifest.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct InteractionSettings {
    pub ray_distance: f32,
    pub layers: InteractionLayers,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            ray_distance: DEFAULT_RAY_DISTANCE,
            layers: InteractionLayers::ALL,
        }
    }
}

pub fn emit_pointer_down(
    mouse: Option<Res<ButtonInput<MouseButton>>>,
    touches: Option<Res<Touches>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut pointer_events: EventWriter<PointerDown>,
) {
    if let Some(mouse) = mouse {
        if mouse.just_pressed(MouseButton::Left) {
            if let Some(position) = windows.single().ok().and_then(|w| w.cursor_position()) {
                pointer_events.write(PointerDown {
                    screen_position: position,
                    source: PointerSource::Mouse,
                });
            }
        }
    }

    if let Some(touches) = touches {
        for touch in touches.iter_just_pressed() {
            pointer_events.write(PointerDown {
                screen_position: touch.position(),
                source: PointerSource::Touch,
            });
        }
    }
}

pub fn project_pointer_rays(
    mut pointer_events: EventReader<PointerDown>,
    cameras: Query<(&GlobalTransform, &Camera), With<ArCamera>>,
    mut rays: EventWriter<PointerRay>,
) {
    let active_camera = cameras.single();
    for pointer in pointer_events.read() {
        let Ok((cam_xf, camera)) = &active_camera else {
            warn_once!("[ACTION] No single ArCamera; pointer input ignored");
            continue;
        };
        match camera.viewport_to_world(cam_xf, pointer.screen_position) {
            Ok(ray) => {
                rays.write(PointerRay { ray });
            }
            Err(e) => debug!(
                "[ACTION] Pointer at {} ({:?}) has no world ray: {:?}",
                pointer.screen_position, pointer.source, e
            ),
        }
    }
}

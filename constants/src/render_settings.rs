/// Linear sRGB colours for placeholder geometry spawned from card manifests.
pub const CONTENT_COLOUR: [f32; 3] = [0.85, 0.85, 0.9];
pub const BUTTON_COLOUR: [f32; 3] = [0.1, 0.45, 0.9];
pub const OVERLAY_COLOUR: [f32; 3] = [0.05, 0.05, 0.05];

/// Thickness of generated button and overlay slabs.
pub const SURFACE_THICKNESS: f32 = 0.002;

/// Camera clear colour; transparent so the host page's camera feed shows through.
pub const CLEAR_COLOUR: [f32; 4] = [0.0, 0.0, 0.0, 0.0];

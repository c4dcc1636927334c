/// Maximum pointer ray length in world units when a manifest does not override it.
pub const DEFAULT_RAY_DISTANCE: f32 = 100.0;

/// Interaction layer every hit region belongs to unless the manifest says otherwise.
pub const DEFAULT_INTERACTION_LAYER: u8 = 0;

/// Number of addressable interaction layers (bits in the layer mask).
pub const INTERACTION_LAYER_COUNT: u8 = 32;

/// Scheme prefix for email actions.
pub const MAILTO_SCHEME: &str = "mailto:";

/// Scheme prefix for phone actions.
pub const TEL_SCHEME: &str = "tel://";

/// Highest marker index reachable through the desktop digit-key shortcuts.
pub const MAX_SHORTCUT_MARKERS: usize = 9;

//! Error types for manifest validation and platform delegates.

use thiserror::Error;

/// Problems found while turning a card manifest into scene entities.
/// Each one disables a single entry; none of them abort scene construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    #[error("{kind} action on '{region}' has an empty payload")]
    EmptyPayload { region: String, kind: &'static str },

    #[error("video_toggle action on '{region}' has no target overlay")]
    MissingVideoTarget { region: String },

    #[error("video_toggle action on '{region}' targets unknown overlay '{target}'")]
    UnknownVideoTarget { region: String, target: String },

    #[error("duplicate marker id '{0}'")]
    DuplicateMarker(String),

    #[error("duplicate overlay name '{0}'")]
    DuplicateOverlay(String),

    #[error("interaction layer {0} is out of range")]
    InvalidLayer(u8),
}

/// Failures reported by platform collaborators. Logged, never retried.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("failed to open '{uri}': {source}")]
    UrlOpen {
        uri: String,
        #[source]
        source: std::io::Error,
    },

    #[error("browser rejected '{uri}': {reason}")]
    Browser { uri: String, reason: String },

    #[error("scene '{0}' is not bundled with this build")]
    UnknownScene(String),
}

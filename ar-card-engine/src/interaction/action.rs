use bevy::prelude::*;
use constants::interaction::{MAILTO_SCHEME, TEL_SCHEME};
use serde::{Deserialize, Serialize};

use crate::error::ManifestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Email,
    Phone,
    Map,
    SceneLoad,
    VideoToggle,
}

impl ActionKind {
    pub fn to_string(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Map => "map",
            Self::SceneLoad => "scene_load",
            Self::VideoToggle => "video_toggle",
        }
    }
}

/// Immutable action attached to one hit region.
///
/// A video toggle always carries its target overlay; the validated
/// constructors reject empty payloads for every other kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionDescriptor {
    Email { address: String },
    Phone { number: String },
    Map { url: String },
    SceneLoad { scene: String },
    VideoToggle { overlay: Entity },
}

impl ActionDescriptor {
    /// Build a payload-carrying action. `region` only names the entry in errors.
    pub fn with_payload(
        kind: ActionKind,
        payload: &str,
        region: &str,
    ) -> Result<Self, ManifestError> {
        let build: fn(String) -> Self = match kind {
            ActionKind::Email => |address| Self::Email { address },
            ActionKind::Phone => |number| Self::Phone { number },
            ActionKind::Map => |url| Self::Map { url },
            ActionKind::SceneLoad => |scene| Self::SceneLoad { scene },
            ActionKind::VideoToggle => {
                return Err(ManifestError::MissingVideoTarget {
                    region: region.to_string(),
                });
            }
        };

        let payload = payload.trim();
        if payload.is_empty() {
            return Err(ManifestError::EmptyPayload {
                region: region.to_string(),
                kind: kind.to_string(),
            });
        }
        Ok(build(payload.to_string()))
    }

    pub fn video_toggle(overlay: Entity) -> Self {
        Self::VideoToggle { overlay }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Email { .. } => ActionKind::Email,
            Self::Phone { .. } => ActionKind::Phone,
            Self::Map { .. } => ActionKind::Map,
            Self::SceneLoad { .. } => ActionKind::SceneLoad,
            Self::VideoToggle { .. } => ActionKind::VideoToggle,
        }
    }

    /// URI handed to the platform opener, for the kinds that open one.
    pub fn uri(&self) -> Option<String> {
        match self {
            Self::Email { address } => Some(format!("{MAILTO_SCHEME}{address}")),
            Self::Phone { number } => Some(format!("{TEL_SCHEME}{number}")),
            Self::Map { url } => Some(url.clone()),
            Self::SceneLoad { .. } | Self::VideoToggle { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uris_use_kind_schemes() {
        let email = ActionDescriptor::with_payload(ActionKind::Email, "jo@example.com", "email_btn").unwrap();
        assert_eq!(email.uri().as_deref(), Some("mailto:jo@example.com"));

        let phone = ActionDescriptor::with_payload(ActionKind::Phone, " +15551234 ", "phone_btn").unwrap();
        assert_eq!(phone.uri().as_deref(), Some("tel://+15551234"));

        let map = ActionDescriptor::with_payload(ActionKind::Map, "https://maps.example/q=x", "map_btn").unwrap();
        assert_eq!(map.uri().as_deref(), Some("https://maps.example/q=x"));

        let scene = ActionDescriptor::with_payload(ActionKind::SceneLoad, "portfolio", "next").unwrap();
        assert_eq!(scene.uri(), None);
        assert_eq!(scene.kind(), ActionKind::SceneLoad);
    }

    #[test]
    fn empty_payload_is_rejected() {
        let err = ActionDescriptor::with_payload(ActionKind::Email, "  ", "email_btn").unwrap_err();
        assert_eq!(
            err,
            ManifestError::EmptyPayload {
                region: "email_btn".into(),
                kind: "email"
            }
        );
    }

    #[test]
    fn video_toggle_needs_a_target() {
        let err = ActionDescriptor::with_payload(ActionKind::VideoToggle, "intro", "play_btn").unwrap_err();
        assert!(matches!(err, ManifestError::MissingVideoTarget { .. }));

        let toggle = ActionDescriptor::video_toggle(Entity::from_raw(4));
        assert_eq!(toggle.kind(), ActionKind::VideoToggle);
        assert_eq!(toggle.uri(), None);
    }
}

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a physical marker as reported by the tracking subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerId(pub String);

impl MarkerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MarkerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for MarkerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Tracking quality reported for a marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    #[default]
    Undefined,
    NotFound,
    Limited,
    Tracked,
    ExtendedTracked,
}

impl TrackingStatus {
    /// Only `Tracked` and `ExtendedTracked` make marker content visible and interactive.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Tracked | Self::ExtendedTracked)
    }

    /// Parse the identifiers used by the host-page tracker.
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "undefined" => Some(Self::Undefined),
            "not_found" | "notfound" => Some(Self::NotFound),
            "limited" => Some(Self::Limited),
            "tracked" => Some(Self::Tracked),
            "extended_tracked" | "extendedtracked" => Some(Self::ExtendedTracked),
            _ => None,
        }
    }

    pub fn to_string(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::NotFound => "not_found",
            Self::Limited => "limited",
            Self::Tracked => "tracked",
            Self::ExtendedTracked => "extended_tracked",
        }
    }
}

/// Root entity of everything attached to one physical marker.
/// The tracking subsystem owns its pose; this crate only reads its identity.
#[derive(Component, Debug, Clone)]
pub struct TrackedMarker {
    pub id: MarkerId,
}

use super::action::ActionDescriptor;
use crate::tracking::source::TrackingStatusSource;
use crate::tracking::status::{MarkerId, TrackingStatus};
use bevy::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct RegistryEntry {
    pub action: Option<ActionDescriptor>,
    pub marker: Option<MarkerId>,
}

/// Region entity -> (action, owning marker), filled when a card scene is built.
///
/// Replaces walking the entity tree on every tap: the owning marker is an
/// explicit lookup, and regions without an action simply have no entry.
#[derive(Resource, Debug, Default)]
pub struct ActionRegistry {
    entries: HashMap<Entity, RegistryEntry>,
}

/// Outcome of looking up a hit region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Region carries no action.
    NoAction,
    /// Action found but no marker owns the region.
    NoMarker,
    /// Owning marker is not currently located.
    Inactive {
        marker: MarkerId,
        status: TrackingStatus,
    },
    Ready {
        action: ActionDescriptor,
        marker: MarkerId,
    },
}

impl ActionRegistry {
    pub fn register(
        &mut self,
        region: Entity,
        action: Option<ActionDescriptor>,
        marker: Option<MarkerId>,
    ) {
        self.entries.insert(region, RegistryEntry { action, marker });
    }

    pub fn entry(&self, region: Entity) -> Option<&RegistryEntry> {
        self.entries.get(&region)
    }

    /// Resolve the action for a hit region and gate it on its marker's current status.
    pub fn resolve(&self, region: Entity, source: &TrackingStatusSource) -> Resolution {
        let Some(RegistryEntry {
            action: Some(action),
            marker,
        }) = self.entries.get(&region)
        else {
            return Resolution::NoAction;
        };
        let Some(marker) = marker else {
            return Resolution::NoMarker;
        };

        let status = source.current_status(marker);
        if !status.is_active() {
            return Resolution::Inactive {
                marker: marker.clone(),
                status,
            };
        }
        Resolution::Ready {
            action: action.clone(),
            marker: marker.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::action::ActionKind;

    fn email() -> ActionDescriptor {
        ActionDescriptor::with_payload(ActionKind::Email, "jo@example.com", "email_btn").unwrap()
    }

    #[test]
    fn resolution_is_gated_on_marker_status() {
        let region = Entity::from_raw(10);
        let marker = MarkerId::new("card_front");
        let mut registry = ActionRegistry::default();
        registry.register(region, Some(email()), Some(marker.clone()));

        let mut source = TrackingStatusSource::default();
        assert_eq!(
            registry.resolve(region, &source),
            Resolution::Inactive {
                marker: marker.clone(),
                status: TrackingStatus::Undefined
            }
        );

        source.set_scene_markers([marker.clone()]);
        source.report(&marker, TrackingStatus::ExtendedTracked);
        assert_eq!(
            registry.resolve(region, &source),
            Resolution::Ready {
                action: email(),
                marker
            }
        );
    }

    #[test]
    fn missing_entries_resolve_to_no_ops() {
        let mut registry = ActionRegistry::default();
        let source = TrackingStatusSource::default();
        let bare = Entity::from_raw(1);
        let orphan = Entity::from_raw(2);
        let invalid = Entity::from_raw(3);
        registry.register(orphan, Some(email()), None);
        registry.register(invalid, None, Some(MarkerId::new("card_front")));

        assert_eq!(registry.resolve(bare, &source), Resolution::NoAction);
        assert_eq!(registry.resolve(orphan, &source), Resolution::NoMarker);
        assert_eq!(registry.resolve(invalid, &source), Resolution::NoAction);

        registry.clear();
        assert!(registry.is_empty());
    }
}

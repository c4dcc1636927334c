use super::source::TrackingStatusChanged;
use crate::interaction::region::HitRegion;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Kinds of passive content an entity carries.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentKinds {
    #[serde(default)]
    pub renderable: bool,
    #[serde(default)]
    pub collidable: bool,
    #[serde(default)]
    pub canvas: bool,
}

impl ContentKinds {
    pub const RENDERABLE: Self = Self {
        renderable: true,
        collidable: false,
        canvas: false,
    };
    pub const COLLIDABLE: Self = Self {
        renderable: false,
        collidable: true,
        canvas: false,
    };
    pub const CANVAS: Self = Self {
        renderable: false,
        collidable: false,
        canvas: true,
    };
    pub const ALL: Self = Self {
        renderable: true,
        collidable: true,
        canvas: true,
    };

    pub const fn union(self, other: Self) -> Self {
        Self {
            renderable: self.renderable || other.renderable,
            collidable: self.collidable || other.collidable,
            canvas: self.canvas || other.canvas,
        }
    }

    /// Whether a gate toggling `self` drives the member's `Visibility`.
    fn drives_visibility(self, member: Self) -> bool {
        (self.renderable && member.renderable) || (self.canvas && member.canvas)
    }

    fn drives_region(self, member: Self) -> bool {
        self.collidable && member.collidable
    }
}

/// Tags content owned by a video overlay. Overlays drive their own visibility,
/// so gates that exclude overlay-owned members leave these alone.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct OverlayOwned;

/// Selects which members a gate toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateFilter {
    pub kinds: ContentKinds,
    pub exclude_overlay_owned: bool,
}

impl GateFilter {
    /// Renderers, colliders and canvases, leaving overlay surfaces alone.
    pub const fn visibility() -> Self {
        Self {
            kinds: ContentKinds::ALL,
            exclude_overlay_owned: true,
        }
    }

    /// Colliders only, for markers without overlays.
    pub const fn colliders() -> Self {
        Self {
            kinds: ContentKinds::COLLIDABLE,
            exclude_overlay_owned: false,
        }
    }
}

/// Keeps a marker's passive content enabled exactly while the marker is tracked.
///
/// Lives on its own entity next to a `TrackingSubscription` for the marker.
/// Members are captured when the scene is built; despawned members are skipped.
#[derive(Component, Debug, Clone)]
pub struct TrackingGatedActivation {
    filter: GateFilter,
    members: Vec<Entity>,
    active: Option<bool>,
}

impl TrackingGatedActivation {
    pub fn new(filter: GateFilter, members: Vec<Entity>) -> Self {
        Self {
            filter,
            members,
            active: None,
        }
    }

    pub fn filter(&self) -> GateFilter {
        self.filter
    }

    pub fn members(&self) -> &[Entity] {
        &self.members
    }

    /// `None` until the first status delivery.
    pub fn active(&self) -> Option<bool> {
        self.active
    }
}

/// Query data for gate members. Every part is optional so any entity can be a member.
pub type GateMemberParts = (
    Option<&'static mut Visibility>,
    Option<&'static mut HitRegion>,
    Option<&'static ContentKinds>,
    Has<OverlayOwned>,
);

/// Enable or disable the gate's members. Returns how many members changed.
pub fn apply_gate(
    gate: &TrackingGatedActivation,
    enabled: bool,
    members: &mut Query<GateMemberParts>,
) -> usize {
    let target_visibility = if enabled {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };

    let mut changed = 0;
    for &member in &gate.members {
        let Ok((visibility, region, kinds, overlay_owned)) = members.get_mut(member) else {
            continue;
        };
        if overlay_owned && gate.filter.exclude_overlay_owned {
            continue;
        }

        // Untagged members count as whatever components they carry.
        let kinds = kinds.copied().unwrap_or(ContentKinds {
            renderable: visibility.is_some(),
            collidable: region.is_some(),
            canvas: false,
        });

        let mut member_changed = false;
        if let Some(mut visibility) = visibility {
            if gate.filter.kinds.drives_visibility(kinds) {
                member_changed |= visibility.set_if_neq(target_visibility);
            }
        }
        if let Some(mut region) = region {
            if gate.filter.kinds.drives_region(kinds) {
                member_changed |= region.set_enabled(enabled);
            }
        }
        if member_changed {
            changed += 1;
        }
    }
    changed
}

/// Fail-safe initial state: nothing visible or hit-testable until tracking is confirmed.
pub fn initialise_tracking_gates(
    gates: Query<&TrackingGatedActivation, Added<TrackingGatedActivation>>,
    mut members: Query<GateMemberParts>,
) {
    for gate in &gates {
        apply_gate(gate, false, &mut members);
    }
}

/// Apply status deliveries addressed to gate entities.
pub fn apply_tracking_gates(
    mut deliveries: EventReader<TrackingStatusChanged>,
    mut gates: Query<&mut TrackingGatedActivation>,
    mut members: Query<GateMemberParts>,
) {
    for delivery in deliveries.read() {
        let Ok(mut gate) = gates.get_mut(delivery.subscriber) else {
            continue;
        };

        let active = delivery.status.is_active();
        let changed = apply_gate(&gate, active, &mut members);
        if gate.active != Some(active) {
            info!(
                "[GATE] Marker '{}' content {} ({} of {} members changed)",
                delivery.marker,
                if active { "enabled" } else { "disabled" },
                changed,
                gate.members.len()
            );
        }
        gate.active = Some(active);
    }
}

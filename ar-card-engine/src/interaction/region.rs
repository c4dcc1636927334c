use bevy::prelude::*;
use constants::interaction::{DEFAULT_INTERACTION_LAYER, INTERACTION_LAYER_COUNT};
use serde::{Deserialize, Serialize};

use crate::error::ManifestError;

/// Bitmask of interaction layers a region belongs to or a ray query accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InteractionLayers(pub u32);

impl InteractionLayers {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);

    pub fn layer(layer: u8) -> Result<Self, ManifestError> {
        if layer >= INTERACTION_LAYER_COUNT {
            return Err(ManifestError::InvalidLayer(layer));
        }
        Ok(Self(1 << layer))
    }

    /// Combine several layer indices. Out-of-range indices are reported, not silently dropped.
    pub fn from_layers(layers: &[u8]) -> Result<Self, ManifestError> {
        layers
            .iter()
            .try_fold(Self::NONE, |mask, &layer| Ok(mask.with(Self::layer(layer)?)))
    }

    pub fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for InteractionLayers {
    fn default() -> Self {
        Self(1 << DEFAULT_INTERACTION_LAYER)
    }
}

/// Hit-testable oriented box centred on the entity's global transform.
///
/// Regions start disabled; tracking gates and video overlays turn them on.
/// Disabled regions are invisible to ray queries.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct HitRegion {
    pub size: Vec3,
    pub enabled: bool,
    pub layers: InteractionLayers,
}

impl HitRegion {
    pub fn new(size: Vec3) -> Self {
        Self {
            size,
            enabled: false,
            layers: InteractionLayers::default(),
        }
    }

    pub fn with_layers(mut self, layers: InteractionLayers) -> Self {
        self.layers = layers;
        self
    }

    /// Update the enabled flag, returning whether it changed.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        if self.enabled == enabled {
            return false;
        }
        self.enabled = enabled;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_combine_and_intersect() {
        let front = InteractionLayers::from_layers(&[0, 3]).unwrap();
        assert!(front.intersects(InteractionLayers::layer(3).unwrap()));
        assert!(!front.intersects(InteractionLayers::layer(1).unwrap()));
        assert!(front.intersects(InteractionLayers::ALL));
        assert!(!front.intersects(InteractionLayers::NONE));
    }

    #[test]
    fn out_of_range_layer_is_rejected() {
        assert_eq!(
            InteractionLayers::from_layers(&[1, 40]),
            Err(ManifestError::InvalidLayer(40))
        );
    }

    #[test]
    fn regions_start_disabled() {
        let mut region = HitRegion::new(Vec3::ONE);
        assert!(!region.enabled);
        assert!(region.set_enabled(true));
        assert!(!region.set_enabled(true));
    }
}

//! Marker tracking status: the source of truth for "is this marker located right now".
//!
//! The external tracker writes `TrackingStatusReport` events. The
//! `TrackingStatusSource` resource keeps the last status per marker and fans
//! each report out as `TrackingStatusChanged` events, one per subscribed entity.
//!
//! ```text
//! Host tracker / shortcuts
//!   └─> TrackingStatusReport
//!       └─> publish_tracking_reports()
//!           ├─> TrackingStatusSource (last status per marker)
//!           └─> TrackingStatusChanged (per subscriber)
//!               ├─> apply_tracking_gates()          content on/off
//!               └─> hide_overlays_on_tracking_loss() forced video hide
//! ```
//!
//! Subscriptions are components: inserting `TrackingSubscription` subscribes
//! the entity, despawning it releases the subscription.

/// Gates that enable marker content while the marker is tracked.
pub mod gate;

/// Native digit-key shortcuts standing in for a tracker on desktop.
pub mod shortcuts;

/// Status source resource, subscriptions and the report/delivery events.
pub mod source;

/// Marker identity and tracking status values.
pub mod status;

use bevy::prelude::*;

use crate::engine::core::card_core::CardSystems;
use gate::{apply_tracking_gates, initialise_tracking_gates};
use source::{
    TrackingStatusChanged, TrackingStatusReport, TrackingStatusSource, publish_tracking_reports,
};

pub use gate::{ContentKinds, GateFilter, OverlayOwned, TrackingGatedActivation};
pub use source::TrackingSubscription;
pub use status::{MarkerId, TrackedMarker, TrackingStatus};

pub struct TrackingPlugin;

impl Plugin for TrackingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TrackingStatusSource>()
            .add_event::<TrackingStatusReport>()
            .add_event::<TrackingStatusChanged>()
            .add_systems(
                Update,
                (
                    publish_tracking_reports,
                    initialise_tracking_gates,
                    apply_tracking_gates,
                )
                    .chain()
                    .in_set(CardSystems::Tracking),
            );
    }
}

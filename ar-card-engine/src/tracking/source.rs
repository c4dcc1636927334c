use super::status::{MarkerId, TrackedMarker, TrackingStatus};
use bevy::ecs::component::HookContext;
use bevy::ecs::world::DeferredWorld;
use bevy::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Opaque handle returned by [`TrackingStatusSource::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(u64);

/// Raw status report from the tracking subsystem (host page, native tracker, shortcuts).
#[derive(Event, Debug, Clone)]
pub struct TrackingStatusReport {
    pub marker: MarkerId,
    pub status: TrackingStatus,
    /// Marker pose in world space, when the tracker supplies one.
    pub pose: Option<Transform>,
}

impl TrackingStatusReport {
    pub fn new(marker: impl Into<MarkerId>, status: TrackingStatus) -> Self {
        Self {
            marker: marker.into(),
            status,
            pose: None,
        }
    }
}

/// Status delivered to one subscriber. Equivalent of the subscriber's callback firing.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct TrackingStatusChanged {
    pub subscriber: Entity,
    pub marker: MarkerId,
    pub status: TrackingStatus,
}

#[derive(Debug, Clone)]
struct Subscriber {
    marker: MarkerId,
    entity: Entity,
}

/// Last known status per marker plus the set of entities listening to each marker.
///
/// Statuses persist until the next report; nothing times out. Reports are
/// forwarded to subscribers even when the status did not change, so every
/// consumer must treat deliveries as idempotent.
///
/// Only markers of the most recently installed scene, or markers with a live
/// subscriber, have their status recorded. Reports for anything else are dropped.
#[derive(Resource, Default, Debug)]
pub struct TrackingStatusSource {
    statuses: HashMap<MarkerId, TrackingStatus>,
    scene_markers: HashSet<MarkerId>,
    subscriptions: BTreeMap<SubscriptionHandle, Subscriber>,
    next_handle: u64,
    replays: Vec<TrackingStatusChanged>,
}

impl TrackingStatusSource {
    /// Register `subscriber` for status changes of `marker`.
    /// If the marker already has a known status it is replayed once on the next publish.
    pub fn subscribe(&mut self, marker: MarkerId, subscriber: Entity) -> SubscriptionHandle {
        let handle = SubscriptionHandle(self.next_handle);
        self.next_handle += 1;

        let status = self.current_status(&marker);
        if status != TrackingStatus::Undefined {
            self.replays.push(TrackingStatusChanged {
                subscriber,
                marker: marker.clone(),
                status,
            });
        }

        self.subscriptions.insert(
            handle,
            Subscriber {
                marker,
                entity: subscriber,
            },
        );
        handle
    }

    /// Release a subscription. Returns false for unknown or already released handles.
    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        let Some(released) = self.subscriptions.remove(&handle) else {
            return false;
        };
        self.replays
            .retain(|d| d.subscriber != released.entity || d.marker != released.marker);
        true
    }

    /// Point-in-time status query. Unknown markers are `Undefined`.
    pub fn current_status(&self, marker: &MarkerId) -> TrackingStatus {
        self.statuses.get(marker).copied().unwrap_or_default()
    }

    /// Replace the set of markers the live scene declares and forget statuses
    /// of markers outside it. Statuses of markers kept across scenes survive,
    /// so the next scene's subscribers get them replayed.
    pub fn set_scene_markers(&mut self, markers: impl IntoIterator<Item = MarkerId>) {
        self.scene_markers = markers.into_iter().collect();
        let scene = &self.scene_markers;
        self.statuses.retain(|id, _| scene.contains(id));
    }

    /// Whether reports for `marker` are recorded.
    pub fn accepts(&self, marker: &MarkerId) -> bool {
        self.scene_markers.contains(marker) || self.subscriptions.values().any(|s| &s.marker == marker)
    }

    /// Record a new status and return one delivery per subscriber of that marker,
    /// in subscription order. Markers the source does not accept are ignored.
    pub fn report(&mut self, marker: &MarkerId, status: TrackingStatus) -> Vec<TrackingStatusChanged> {
        if !self.accepts(marker) {
            return Vec::new();
        }
        self.statuses.insert(marker.clone(), status);
        self.subscriptions
            .values()
            .filter(|s| &s.marker == marker)
            .map(|s| TrackingStatusChanged {
                subscriber: s.entity,
                marker: marker.clone(),
                status,
            })
            .collect()
    }

    /// Drain deliveries queued by [`subscribe`](Self::subscribe) for already-known markers.
    pub fn take_replays(&mut self) -> Vec<TrackingStatusChanged> {
        std::mem::take(&mut self.replays)
    }

    pub fn subscriber_count(&self, marker: &MarkerId) -> usize {
        self.subscriptions
            .values()
            .filter(|s| &s.marker == marker)
            .count()
    }

    pub fn is_subscribed(&self, handle: SubscriptionHandle) -> bool {
        self.subscriptions.contains_key(&handle)
    }

    /// Known markers with their last status, sorted by id.
    pub fn known_markers(&self) -> Vec<(MarkerId, TrackingStatus)> {
        let mut markers: Vec<_> = self
            .statuses
            .iter()
            .map(|(id, status)| (id.clone(), *status))
            .collect();
        markers.sort_by(|a, b| a.0.cmp(&b.0));
        markers
    }
}

/// Scoped subscription to one marker's status stream.
///
/// Inserting the component subscribes the entity; removing it, replacing it,
/// or despawning the entity releases the subscription.
#[derive(Component, Debug, Clone)]
#[component(on_insert = register_subscription, on_replace = release_subscription)]
pub struct TrackingSubscription {
    marker: MarkerId,
    handle: Option<SubscriptionHandle>,
}

impl TrackingSubscription {
    pub fn to(marker: impl Into<MarkerId>) -> Self {
        Self {
            marker: marker.into(),
            handle: None,
        }
    }

    pub fn marker(&self) -> &MarkerId {
        &self.marker
    }

    /// `None` until the subscription has been registered with the source.
    pub fn handle(&self) -> Option<SubscriptionHandle> {
        self.handle
    }
}

fn register_subscription(mut world: DeferredWorld, context: HookContext) {
    let Some(marker) = world
        .get::<TrackingSubscription>(context.entity)
        .map(|s| s.marker.clone())
    else {
        return;
    };

    let handle = {
        let Some(mut source) = world.get_resource_mut::<TrackingStatusSource>() else {
            warn!(
                "[TRACK] No TrackingStatusSource; {:?} will never receive status for '{}'",
                context.entity, marker
            );
            return;
        };
        source.subscribe(marker, context.entity)
    };

    if let Some(mut subscription) = world.get_mut::<TrackingSubscription>(context.entity) {
        subscription.handle = Some(handle);
    }
}

fn release_subscription(mut world: DeferredWorld, context: HookContext) {
    let Some(handle) = world
        .get::<TrackingSubscription>(context.entity)
        .and_then(|s| s.handle)
    else {
        return;
    };

    if let Some(mut source) = world.get_resource_mut::<TrackingStatusSource>() {
        source.unsubscribe(handle);
    }
}

type PosedDescendants<'w, 's> = Query<
    'w,
    's,
    (&'static Transform, &'static mut GlobalTransform, Option<&'static Children>),
    Without<TrackedMarker>,
>;

/// Apply incoming reports to the source and fan them out to subscribers.
/// Replays for fresh subscribers go out first so they never overtake a newer report.
///
/// A reported pose also rewrites the world transforms below the marker root,
/// so taps later in the same tick are hit-tested against the new pose.
pub fn publish_tracking_reports(
    mut reports: EventReader<TrackingStatusReport>,
    mut source: ResMut<TrackingStatusSource>,
    mut deliveries: EventWriter<TrackingStatusChanged>,
    mut markers: Query<(&TrackedMarker, &mut Transform, &mut GlobalTransform, Option<&Children>)>,
    mut descendants: PosedDescendants,
) {
    for replay in source.take_replays() {
        deliveries.write(replay);
    }

    for report in reports.read() {
        if !source.accepts(&report.marker) {
            debug!("[TRACK] Ignoring report for '{}': not in the live scene", report.marker);
            continue;
        }

        let previous = source.current_status(&report.marker);
        if previous != report.status {
            info!(
                "[TRACK] Marker '{}' {} -> {}",
                report.marker,
                previous.to_string(),
                report.status.to_string()
            );
        }

        for delivery in source.report(&report.marker, report.status) {
            deliveries.write(delivery);
        }

        let Some(pose) = report.pose else {
            continue;
        };
        for (marker, mut transform, mut global, children) in &mut markers {
            if marker.id != report.marker {
                continue;
            }
            let parent = global.affine() * transform.compute_affine().inverse();
            *transform = pose;
            *global = GlobalTransform::from(parent * pose.compute_affine());
            if let Some(children) = children {
                refresh_world_transforms(*global, children, &mut descendants);
            }
        }
    }
}

fn refresh_world_transforms(
    parent: GlobalTransform,
    children: &Children,
    descendants: &mut PosedDescendants,
) {
    let mut pending: Vec<(GlobalTransform, Entity)> =
        children.to_vec().into_iter().map(|child| (parent, child)).collect();
    while let Some((parent, entity)) = pending.pop() {
        let Ok((transform, mut global, children)) = descendants.get_mut(entity) else {
            continue;
        };
        *global = parent.mul_transform(*transform);
        if let Some(children) = children {
            let own = *global;
            pending.extend(children.to_vec().into_iter().map(|child| (own, child)));
        }
    }
}

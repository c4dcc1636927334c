use super::region::{HitRegion, InteractionLayers};
use bevy::prelude::*;

/// Nearest region hit along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub region: Entity,
    pub distance: f32,
}

/// Hit-testing seam. Implementations return only the nearest enabled region.
pub trait Raycaster {
    fn query(&self, ray: Ray3d, max_distance: f32, layers: InteractionLayers) -> Option<RaycastHit>;
}

pub type RegionParts = (Entity, &'static GlobalTransform, &'static HitRegion);

/// Raycaster over every `HitRegion` in the world.
pub struct RegionRaycaster<'a, 'w, 's> {
    regions: &'a Query<'w, 's, RegionParts>,
}

impl<'a, 'w, 's> RegionRaycaster<'a, 'w, 's> {
    pub fn new(regions: &'a Query<'w, 's, RegionParts>) -> Self {
        Self { regions }
    }
}

impl Raycaster for RegionRaycaster<'_, '_, '_> {
    fn query(&self, ray: Ray3d, max_distance: f32, layers: InteractionLayers) -> Option<RaycastHit> {
        nearest_region_hit(ray, max_distance, layers, self.regions.iter())
    }
}

/// Disabled regions and regions outside `layers` are skipped. Ties keep the first region seen.
pub fn nearest_region_hit<'a>(
    ray: Ray3d,
    max_distance: f32,
    layers: InteractionLayers,
    regions: impl IntoIterator<Item = (Entity, &'a GlobalTransform, &'a HitRegion)>,
) -> Option<RaycastHit> {
    let origin = ray.origin;
    let dir = ray.direction.as_vec3();

    let mut best: Option<RaycastHit> = None;
    for (entity, xf, region) in regions {
        if !region.enabled || !region.layers.intersects(layers) {
            continue;
        }
        let Some(t) = ray_hits_obb(origin, dir, *xf, region.size) else {
            continue;
        };
        if t > max_distance {
            continue;
        }
        if best.is_none_or(|b| t < b.distance) {
            best = Some(RaycastHit {
                region: entity,
                distance: t,
            });
        }
    }
    best
}

/// Ray against an oriented box of `size` centred on `xf`.
/// `t` survives the affine transform, so it is a world distance for unit `dir`.
pub fn ray_hits_obb(origin: Vec3, dir: Vec3, xf: GlobalTransform, size: Vec3) -> Option<f32> {
    let inv = xf.compute_matrix().inverse();
    let o_local = inv.transform_point3(origin);
    let d_local = inv.transform_vector3(dir);
    let he = size * 0.5;
    ray_aabb_hit_t(o_local, d_local, -he, he)
}

// Slab method; the entry t, or the exit t when the origin is inside the box.
pub fn ray_aabb_hit_t(ray_origin: Vec3, ray_direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;

    for axis in 0..3 {
        let o = ray_origin[axis];
        let d = ray_direction[axis];
        if d == 0.0 {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let (mut t0, mut t1) = ((min[axis] - o) * inv, (max[axis] - o) * inv);
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_enter = t_enter.max(t0);
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    if t_exit < 0.0 {
        return None;
    }
    Some(if t_enter >= 0.0 { t_enter } else { t_exit })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward_ray() -> Ray3d {
        Ray3d::new(Vec3::new(0.0, 0.0, 10.0), Dir3::NEG_Z)
    }

    fn enabled(size: Vec3) -> HitRegion {
        let mut region = HitRegion::new(size);
        region.enabled = true;
        region
    }

    #[test]
    fn aabb_entry_distance() {
        let t = ray_aabb_hit_t(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, Vec3::splat(-1.0), Vec3::ONE);
        assert_eq!(t, Some(4.0));
        let miss = ray_aabb_hit_t(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z, Vec3::splat(-1.0), Vec3::ONE);
        assert_eq!(miss, None);
        let behind = ray_aabb_hit_t(Vec3::new(0.0, 0.0, 5.0), Vec3::Z, Vec3::splat(-1.0), Vec3::ONE);
        assert_eq!(behind, None);
    }

    #[test]
    fn obb_respects_rotation_and_scale() {
        let xf = GlobalTransform::from(
            Transform::from_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2))
                .with_scale(Vec3::new(1.0, 1.0, 4.0)),
        );
        // Local z (scaled by 4) now points along world x; the box reaches x = ±2.
        let t = ray_hits_obb(Vec3::new(10.0, 0.0, 0.0), Vec3::NEG_X, xf, Vec3::ONE).unwrap();
        assert!((t - 8.0).abs() < 1e-4);
    }

    #[test]
    fn nearest_enabled_region_in_range_wins() {
        let near = Entity::from_raw(1);
        let far = Entity::from_raw(2);
        let disabled = Entity::from_raw(3);
        let near_xf = GlobalTransform::from_translation(Vec3::new(0.0, 0.0, 2.0));
        let far_xf = GlobalTransform::from_translation(Vec3::ZERO);
        let disabled_xf = GlobalTransform::from_translation(Vec3::new(0.0, 0.0, 5.0));
        let region = enabled(Vec3::ONE);
        let off = HitRegion::new(Vec3::ONE);

        let regions = [
            (far, &far_xf, &region),
            (near, &near_xf, &region),
            (disabled, &disabled_xf, &off),
        ];

        let hit = nearest_region_hit(forward_ray(), 100.0, InteractionLayers::ALL, regions).unwrap();
        assert_eq!(hit.region, near);
        assert!((hit.distance - 7.5).abs() < 1e-4);

        assert!(nearest_region_hit(forward_ray(), 5.0, InteractionLayers::ALL, regions).is_none());
    }

    #[test]
    fn layer_filter_excludes_regions() {
        let entity = Entity::from_raw(1);
        let xf = GlobalTransform::IDENTITY;
        let region = enabled(Vec3::ONE).with_layers(InteractionLayers::layer(3).unwrap());

        let default_only = InteractionLayers::default();
        assert!(nearest_region_hit(forward_ray(), 100.0, default_only, [(entity, &xf, &region)]).is_none());

        let layer_three = InteractionLayers::layer(3).unwrap();
        assert!(nearest_region_hit(forward_ray(), 100.0, layer_three, [(entity, &xf, &region)]).is_some());
    }
}

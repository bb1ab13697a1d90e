use std::borrow::Cow;

use avian2d::prelude::*;
use bevy::prelude::*;

use super::colliders::{ColliderSet, KinematicColliders};

/// Marker component for platforms that can be jumped through from below and
/// dropped through from above.
#[derive(Component, Default)]
pub struct OneWayPlatform;

/// What kind of surface a ray landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceKind {
    #[default]
    Solid,
    /// Only solid against downward contact, and only until dropped through
    OneWay,
}

/// Result of a single ray cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin to the hit point
    pub distance: f32,
    /// Surface normal at the hit point
    pub normal: Vec2,
    pub surface: SurfaceKind,
    /// Entity owning the collider that was hit
    pub collider: Entity,
}

/// The ray cast capability every sweep in this crate is built on.
///
/// Returns the nearest hit within `max_distance` along `direction` against
/// colliders whose layers intersect `mask`. A ray starting inside a collider
/// reports a hit at distance zero, whose normal may be zero.
pub trait RayCaster {
    fn cast_ray(&self, origin: Vec2, direction: Dir2, max_distance: f32, mask: LayerMask)
        -> Option<RayHit>;
}

impl<T: RayCaster + ?Sized> RayCaster for &T {
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        (**self).cast_ray(origin, direction, max_distance, mask)
    }
}

/// Tells which surface kind a collider presents to a ray.
pub trait SurfaceLookup {
    fn surface(&self, collider: Entity) -> SurfaceKind;
}

/// Query used to tag hits on [`OneWayPlatform`] colliders.
pub type OneWayQuery<'w, 's> = Query<'w, 's, (), With<OneWayPlatform>>;

impl SurfaceLookup for OneWayQuery<'_, '_> {
    fn surface(&self, collider: Entity) -> SurfaceKind {
        if self.contains(collider) {
            SurfaceKind::OneWay
        } else {
            SurfaceKind::Solid
        }
    }
}

/// [`RayCaster`] over the whole level.
///
/// Static geometry goes through Avian's [`SpatialQuery`]. Kinematic bodies
/// move during the fixed step, before Avian syncs their colliders, so they
/// are cast against in [`KinematicColliders`] at their current positions.
/// The excluded entities (at least the caster itself) are never reported,
/// so rays starting inside the mover's own collider don't hit it.
///
/// The filter is built for the mover's collision mask; casts with another
/// mask pay for a copy.
pub struct SpatialRayCaster<'a, 'w, 's, S: SurfaceLookup> {
    spatial_query: &'a SpatialQuery<'w, 's>,
    surfaces: &'a S,
    kinematic: &'a ColliderSet,
    excluded: Vec<Entity>,
    filter: SpatialQueryFilter,
}

impl<'a, 'w, 's, S: SurfaceLookup> SpatialRayCaster<'a, 'w, 's, S> {
    pub fn new(
        spatial_query: &'a SpatialQuery<'w, 's>,
        surfaces: &'a S,
        kinematic: &'a KinematicColliders,
        mask: LayerMask,
        excluded: impl IntoIterator<Item = Entity>,
    ) -> Self {
        let excluded: Vec<Entity> = excluded.into_iter().collect();
        let filter = static_filter(mask, &excluded, kinematic);

        Self {
            spatial_query,
            surfaces,
            kinematic: &kinematic.0,
            excluded,
            filter,
        }
    }
}

impl<S: SurfaceLookup> RayCaster for SpatialRayCaster<'_, '_, '_, S> {
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        let filter = with_mask(&self.filter, mask);
        let hit = self
            .spatial_query
            .cast_ray(origin, direction, max_distance, true, &filter);
        let fixed = hit.map(|hit| RayHit {
            distance: hit.distance,
            normal: hit.normal,
            surface: self.surfaces.surface(hit.entity),
            collider: hit.entity,
        });

        let moving = self
            .kinematic
            .nearest_hit(origin, direction, max_distance, mask, &self.excluded);

        match (fixed, moving) {
            (Some(a), Some(b)) => Some(if b.distance < a.distance { b } else { a }),
            (a, b) => a.or(b),
        }
    }
}

/// Spatial query filter for static geometry only.
fn static_filter(
    mask: LayerMask,
    excluded: &[Entity],
    kinematic: &ColliderSet,
) -> SpatialQueryFilter {
    // Stale copies of the kinematic colliders live in the spatial query
    SpatialQueryFilter::from_mask(mask)
        .with_excluded_entities(excluded.iter().copied().chain(kinematic.entities()))
}

fn with_mask(filter: &SpatialQueryFilter, mask: LayerMask) -> Cow<'_, SpatialQueryFilter> {
    if filter.mask == mask {
        Cow::Borrowed(filter)
    } else {
        Cow::Owned(filter.clone().with_mask(mask))
    }
}

/// Angle in degrees between a surface normal and world up, in `[0, 180]`.
///
/// 0 is flat ground, 90 a vertical wall.
pub fn slope_angle(normal: Vec2) -> f32 {
    normal
        .normalize_or_zero()
        .dot(Vec2::Y)
        .clamp(-1.0, 1.0)
        .acos()
        .to_degrees()
}

/// Sign that treats zero as positive, so a body at rest still faces and
/// probes to the right.
#[inline]
pub fn sign(value: f32) -> f32 {
    if value >= 0.0 { 1.0 } else { -1.0 }
}

/// Horizontal ray direction for a ±1 sign.
#[inline]
pub(crate) fn horizontal_dir(direction: f32) -> Dir2 {
    if direction < 0.0 { Dir2::NEG_X } else { Dir2::X }
}

/// Vertical ray direction for a ±1 sign.
#[inline]
pub(crate) fn vertical_dir(direction: f32) -> Dir2 {
    if direction < 0.0 { Dir2::NEG_Y } else { Dir2::Y }
}

//! Colliders cast against directly, outside Avian's spatial query.
//!
//! [`ColliderSet`] serves two jobs. Headless, it is the whole world for the
//! tests and offline tools (level validators, replay checkers). In the app,
//! [`KinematicColliders`] keeps one with every kinematic body at its current
//! position, so sweeps see platforms and players where this step left them
//! instead of where the last physics step synced them.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::ray::{OneWayPlatform, RayCaster, RayHit, SurfaceKind};

/// One collider placed in a [`ColliderSet`].
#[derive(Clone)]
struct Placed {
    entity: Entity,
    shape: Collider,
    position: Vec2,
    surface: SurfaceKind,
    layers: LayerMask,
}

impl std::fmt::Debug for Placed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Placed")
            .field("entity", &self.entity)
            .field("position", &self.position)
            .field("surface", &self.surface)
            .field("layers", &self.layers)
            .finish_non_exhaustive()
    }
}

impl Placed {
    /// Solid cast: a ray starting inside the shape hits it at distance zero.
    fn cast(&self, origin: Vec2, direction: Dir2, max_distance: f32) -> Option<RayHit> {
        let (distance, normal) = self.shape.cast_ray(
            Position(self.position),
            Rotation::IDENTITY,
            origin,
            direction.as_vec2(),
            max_distance,
            true,
        )?;

        Some(RayHit {
            distance,
            normal,
            surface: self.surface,
            collider: self.entity,
        })
    }
}

/// A flat list of colliders that can be ray cast against.
///
/// Like Avian's solid ray casts, a ray starting inside a shape hits it at
/// distance zero. Segments added with [`ColliderSet::add_segment`] have no
/// inside.
#[derive(Debug, Clone, Default)]
pub struct ColliderSet {
    colliders: Vec<Placed>,
}

impl ColliderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `shape` centred on `position`.
    pub fn add(
        &mut self,
        entity: Entity,
        shape: Collider,
        position: Vec2,
        surface: SurfaceKind,
        layers: LayerMask,
    ) -> &mut Self {
        self.colliders.push(Placed {
            entity,
            shape,
            position,
            surface,
            layers,
        });
        self
    }

    /// Adds an axis-aligned box.
    pub fn add_box(
        &mut self,
        entity: Entity,
        center: Vec2,
        half_extents: Vec2,
        surface: SurfaceKind,
        layers: LayerMask,
    ) -> &mut Self {
        let size = half_extents * 2.0;
        self.add(entity, Collider::rectangle(size.x, size.y), center, surface, layers)
    }

    /// Adds a convex polygon, split into a fan of triangles around its first
    /// point. Concave outlines need one call per convex piece.
    pub fn add_polygon(
        &mut self,
        entity: Entity,
        points: &[Vec2],
        surface: SurfaceKind,
        layers: LayerMask,
    ) -> &mut Self {
        let Some((&anchor, rest)) = points.split_first() else {
            return self;
        };
        if rest.len() < 2 {
            warn!("polygon for {entity:?} needs at least 3 points, got {}", points.len());
            return self;
        }

        for pair in rest.windows(2) {
            let shape = Collider::triangle(Vec2::ZERO, pair[0] - anchor, pair[1] - anchor);
            self.add(entity, shape, anchor, surface, layers);
        }
        self
    }

    /// Adds a single edge, solid from either side.
    pub fn add_segment(
        &mut self,
        entity: Entity,
        start: Vec2,
        end: Vec2,
        surface: SurfaceKind,
        layers: LayerMask,
    ) -> &mut Self {
        self.add(entity, Collider::segment(Vec2::ZERO, end - start), start, surface, layers)
    }

    /// Moves every shape owned by `entity`.
    pub fn translate(&mut self, entity: Entity, delta: Vec2) {
        for placed in self.colliders.iter_mut().filter(|p| p.entity == entity) {
            placed.position += delta;
        }
    }

    pub fn clear(&mut self) {
        self.colliders.clear();
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Entities owning at least one shape, in insertion order, repeated once
    /// per shape.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.colliders.iter().map(|p| p.entity)
    }

    /// A caster over this set that never reports the given entities.
    pub fn excluding(&self, excluded: impl IntoIterator<Item = Entity>) -> ColliderSetView<'_> {
        ColliderSetView {
            set: self,
            excluded: excluded.into_iter().collect(),
        }
    }

    pub(crate) fn nearest_hit(
        &self,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        mask: LayerMask,
        excluded: &[Entity],
    ) -> Option<RayHit> {
        self.colliders
            .iter()
            .filter(|p| p.layers.0 & mask.0 != 0 && !excluded.contains(&p.entity))
            .filter_map(|p| p.cast(origin, direction, max_distance))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

impl RayCaster for ColliderSet {
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        self.nearest_hit(origin, direction, max_distance, mask, &[])
    }
}

/// A [`ColliderSet`] with some entities left out, the headless
/// counterpart of excluding entities from a spatial query.
#[derive(Debug, Clone)]
pub struct ColliderSetView<'a> {
    set: &'a ColliderSet,
    excluded: Vec<Entity>,
}

impl RayCaster for ColliderSetView<'_> {
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        self.set
            .nearest_hit(origin, direction, max_distance, mask, &self.excluded)
    }
}

/// Every kinematic collider at its position within the current step.
///
/// Rebuilt from transforms at the start of each fixed step; systems that
/// move a kinematic body translate its entry right away.
#[derive(Resource, Debug, Clone, Default, Deref, DerefMut)]
pub struct KinematicColliders(pub ColliderSet);

/// Refreshes [`KinematicColliders`]; runs before anything moves
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct KinematicSync;

pub fn refresh_kinematic_colliders(
    mut kinematic: ResMut<KinematicColliders>,
    bodies: Query<(
        Entity,
        &RigidBody,
        &Collider,
        &Transform,
        Option<&CollisionLayers>,
        Has<OneWayPlatform>,
    )>,
) {
    kinematic.clear();

    for (entity, rigid_body, collider, transform, layers, one_way) in &bodies {
        if !matches!(rigid_body, RigidBody::Kinematic) {
            continue;
        }

        let surface = if one_way {
            SurfaceKind::OneWay
        } else {
            SurfaceKind::Solid
        };
        let layers = layers.copied().unwrap_or_default().memberships;
        kinematic.add(
            entity,
            collider.clone(),
            transform.translation.truncate(),
            surface,
            layers,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn ray_reports_nearest_hit() {
        let mut entities = World::new();
        let near = entities.spawn_empty().id();
        let far = entities.spawn_empty().id();
        let mut set = ColliderSet::new();
        set.add_box(near, Vec2::new(0.0, -1.0), Vec2::new(5.0, 0.5), SurfaceKind::Solid, LayerMask::ALL)
            .add_box(far, Vec2::new(0.0, -4.0), Vec2::new(5.0, 0.5), SurfaceKind::Solid, LayerMask::ALL);

        let hit = set
            .cast_ray(Vec2::new(0.0, 1.0), Dir2::NEG_Y, 10.0, LayerMask::ALL)
            .expect("floor below the origin");

        assert!((hit.distance - 1.5).abs() < 1e-5);
        assert!((hit.normal - Vec2::Y).length() < 1e-5);
        assert_eq!(hit.collider, near);
    }

    #[test]
    fn ray_respects_max_distance() {
        let mut entities = World::new();
        let mut set = ColliderSet::new();
        set.add_box(entities.spawn_empty().id(), Vec2::new(3.0, 0.0), Vec2::ONE, SurfaceKind::Solid, LayerMask::ALL);

        assert!(set.cast_ray(Vec2::ZERO, Dir2::X, 1.9, LayerMask::ALL).is_none());
        assert!(set.cast_ray(Vec2::ZERO, Dir2::X, 2.1, LayerMask::ALL).is_some());
    }

    #[test]
    fn ray_ignores_other_layers() {
        let mut entities = World::new();
        let mut set = ColliderSet::new();
        set.add_box(entities.spawn_empty().id(), Vec2::new(3.0, 0.0), Vec2::ONE, SurfaceKind::Solid, LayerMask(0b10));

        assert!(set.cast_ray(Vec2::ZERO, Dir2::X, 10.0, LayerMask(0b01)).is_none());
        assert!(set.cast_ray(Vec2::ZERO, Dir2::X, 10.0, LayerMask(0b10)).is_some());
    }

    #[test]
    fn polygon_faces_report_their_normal() {
        let mut entities = World::new();
        let mut set = ColliderSet::new();
        // 45 degree ramp rising to the right
        set.add_polygon(
            entities.spawn_empty().id(),
            &[Vec2::new(0.0, 0.0), Vec2::new(4.0, 4.0), Vec2::new(4.0, 0.0)],
            SurfaceKind::Solid,
            LayerMask::ALL,
        );

        let hit = set
            .cast_ray(Vec2::new(3.0, 5.0), Dir2::NEG_Y, 10.0, LayerMask::ALL)
            .expect("ramp below the origin");
        assert!((hit.distance - 2.0).abs() < 1e-5);
        let expected = Vec2::new(-1.0, 1.0).normalize();
        assert!((hit.normal - expected).length() < 1e-4, "{}", hit.normal);
    }

    #[test]
    fn ray_starting_inside_hits_at_zero_distance() {
        let mut entities = World::new();
        let ledge = entities.spawn_empty().id();
        let mut set = ColliderSet::new();
        set.add_box(ledge, Vec2::new(0.0, -0.25), Vec2::new(3.0, 0.25), SurfaceKind::OneWay, LayerMask::ALL);

        // Pointing away from every edge still reports the overlap
        for direction in [Dir2::NEG_Y, Dir2::Y, Dir2::X] {
            let hit = set
                .cast_ray(Vec2::new(0.0, -0.035), direction, 0.115, LayerMask::ALL)
                .expect("origin inside the ledge");
            assert_eq!(hit.distance, 0.0);
            assert_eq!(hit.surface, SurfaceKind::OneWay);
            assert_eq!(hit.collider, ledge);
        }

        // Segments have no inside
        let mut open = ColliderSet::new();
        open.add_segment(ledge, Vec2::new(-3.0, 0.0), Vec2::new(3.0, 0.0), SurfaceKind::Solid, LayerMask::ALL);
        let hit = open
            .cast_ray(Vec2::new(0.0, -0.1), Dir2::Y, 1.0, LayerMask::ALL)
            .expect("segment above the origin");
        assert!((hit.distance - 0.1).abs() < 1e-5);
    }

    #[test]
    fn excluded_entities_are_skipped() {
        let mut entities = World::new();
        let platform = entities.spawn_empty().id();
        let floor = entities.spawn_empty().id();
        let mut set = ColliderSet::new();
        set.add_box(platform, Vec2::new(0.0, -1.0), Vec2::new(2.0, 0.5), SurfaceKind::Solid, LayerMask::ALL)
            .add_box(floor, Vec2::new(0.0, -5.0), Vec2::new(10.0, 1.0), SurfaceKind::Solid, LayerMask::ALL);

        let hit = set
            .excluding([platform])
            .cast_ray(Vec2::ZERO, Dir2::NEG_Y, 10.0, LayerMask::ALL)
            .expect("floor under the platform");
        assert_eq!(hit.collider, floor);
        assert!((hit.distance - 4.0).abs() < 1e-5);

        // Starting inside an excluded collider is no hit either
        let hit = set
            .excluding([platform])
            .cast_ray(Vec2::new(0.0, -1.0), Dir2::NEG_Y, 10.0, LayerMask::ALL)
            .expect("floor under the platform");
        assert_eq!(hit.collider, floor);
    }

    #[test]
    fn translate_moves_only_owned_shapes() {
        let mut entities = World::new();
        let platform = entities.spawn_empty().id();
        let wall = entities.spawn_empty().id();
        let mut set = ColliderSet::new();
        set.add_box(platform, Vec2::ZERO, Vec2::ONE, SurfaceKind::Solid, LayerMask::ALL)
            .add_box(wall, Vec2::new(10.0, 0.0), Vec2::ONE, SurfaceKind::Solid, LayerMask::ALL);

        set.translate(platform, Vec2::new(0.0, 2.0));

        let hit = set
            .cast_ray(Vec2::new(0.0, 5.0), Dir2::NEG_Y, 10.0, LayerMask::ALL)
            .expect("platform below the origin");
        assert!((hit.distance - 2.0).abs() < 1e-5);
        let hit = set
            .cast_ray(Vec2::new(5.0, 0.0), Dir2::X, 10.0, LayerMask::ALL)
            .expect("wall right of the origin");
        assert!((hit.distance - 4.0).abs() < 1e-5);

        // The inside moved with the box
        let inside = set
            .cast_ray(Vec2::new(0.0, 2.5), Dir2::Y, 0.1, LayerMask::ALL)
            .expect("origin inside the moved platform");
        assert_eq!(inside.distance, 0.0);
        assert!(set.cast_ray(Vec2::new(0.0, -0.5), Dir2::Y, 0.1, LayerMask::ALL).is_none());
    }

    #[test]
    fn refresh_snapshots_only_kinematic_bodies() {
        let mut world = World::new();
        world.init_resource::<KinematicColliders>();
        let lift = world
            .spawn((
                RigidBody::Kinematic,
                Collider::rectangle(4.0, 0.5),
                Transform::from_xyz(0.0, 2.0, 0.0),
                OneWayPlatform,
            ))
            .id();
        world.spawn((
            RigidBody::Static,
            Collider::rectangle(40.0, 1.0),
            Transform::from_xyz(0.0, -1.0, 0.0),
        ));

        world
            .run_system_once(refresh_kinematic_colliders)
            .expect("refresh runs");

        let kinematic = world.resource::<KinematicColliders>();
        assert_eq!(kinematic.entities().collect::<Vec<_>>(), vec![lift]);
        let hit = kinematic
            .cast_ray(Vec2::new(0.0, 5.0), Dir2::NEG_Y, 10.0, LayerMask::ALL)
            .expect("lift below the origin");
        assert_eq!(hit.surface, SurfaceKind::OneWay);
        assert!((hit.distance - 2.75).abs() < 1e-5);
    }
}

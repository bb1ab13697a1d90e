mod body;
mod colliders;
mod collision;
mod layers;
mod origins;
mod plugin;
mod ray;

pub use body::{BodyConfig, KinematicBody};
pub use colliders::{
    refresh_kinematic_colliders, ColliderSet, ColliderSetView, KinematicColliders, KinematicSync,
};
pub use collision::{
    CollisionResolver, CollisionState, RaySegment, SlopeState, SweepSettings, DROP_THROUGH_INPUT,
};
pub use layers::GameLayer;
pub use origins::{
    RayGrid, RayOrigins, RaySpacing, DISTANCE_BETWEEN_RAYS, MIN_RAY_COUNT, SKIN_WIDTH,
};
pub use plugin::PhysicsPlugin;
pub use ray::{
    sign, slope_angle, OneWayPlatform, OneWayQuery, RayCaster, RayHit, SpatialRayCaster,
    SurfaceKind, SurfaceLookup,
};

pub(crate) use ray::{horizontal_dir, vertical_dir};

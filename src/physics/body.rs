use avian2d::prelude::LayerMask;
use bevy::math::bounding::Aabb2d;
use bevy::prelude::*;

use super::collision::{CollisionResolver, CollisionState, RaySegment, SweepSettings};
use super::layers::GameLayer;
use super::origins::{RayGrid, DISTANCE_BETWEEN_RAYS, SKIN_WIDTH};
use super::ray::RayCaster;
use crate::error::ShapeError;

/// Collision tunables for a kinematic body
#[derive(Debug, Clone, Copy)]
pub struct BodyConfig {
    /// Inward margin between the box and its ray origins
    pub skin_width: f32,
    /// Steepest walkable slope in degrees
    pub max_slope_angle: f32,
    /// Target spacing between parallel rays
    pub distance_between_rays: f32,
    /// Layers the body collides with
    pub collision_mask: LayerMask,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            skin_width: SKIN_WIDTH,
            max_slope_angle: 80.0,
            distance_between_rays: DISTANCE_BETWEEN_RAYS,
            collision_mask: GameLayer::solid_mask(),
        }
    }
}

impl BodyConfig {
    pub fn with_max_slope_angle(mut self, degrees: f32) -> Self {
        self.max_slope_angle = degrees;
        self
    }

    pub fn with_collision_mask(mut self, mask: impl Into<LayerMask>) -> Self {
        self.collision_mask = mask.into();
        self
    }

    pub fn with_skin_width(mut self, skin_width: f32) -> Self {
        self.skin_width = skin_width;
        self
    }

    fn sweep_settings(&self) -> SweepSettings {
        SweepSettings {
            skin_width: self.skin_width,
            max_slope_angle: self.max_slope_angle,
            collision_mask: self.collision_mask,
        }
    }
}

/// A box that moves by ray-cast sweeps instead of by a physics solver.
///
/// Players call [`KinematicBody::move_and_collide`] with their own velocity
/// and input; moving platforms call [`KinematicBody::carry`] on passengers.
/// Both go through the same sweep.
#[derive(Component, Debug, Clone)]
pub struct KinematicBody {
    grid: RayGrid,
    config: BodyConfig,
    /// Contacts from the most recent move
    pub collisions: CollisionState,
    /// Directional input passed to the most recent move
    pub input: Vec2,
    /// Record ray segments for debug drawing
    pub record_rays: bool,
    rays: Vec<RaySegment>,
}

impl KinematicBody {
    pub fn new(half_extents: Vec2, config: BodyConfig) -> Result<Self, ShapeError> {
        Ok(Self {
            grid: RayGrid::new(half_extents, config.skin_width, config.distance_between_rays)?,
            config,
            collisions: CollisionState::default(),
            input: Vec2::ZERO,
            record_rays: false,
            rays: Vec::new(),
        })
    }

    pub fn config(&self) -> &BodyConfig {
        &self.config
    }

    pub fn half_extents(&self) -> Vec2 {
        self.grid.half_extents()
    }

    /// Changes the box size, keeping collision state.
    pub fn resize(&mut self, half_extents: Vec2) -> Result<(), ShapeError> {
        self.grid.resize(half_extents)
    }

    pub fn bounds(&self, center: Vec2) -> Aabb2d {
        self.grid.bounds(center)
    }

    /// Rays cast during the last move, if `record_rays` is set.
    pub fn rays(&self) -> &[RaySegment] {
        &self.rays
    }

    /// Sweeps the box from `position` by `velocity` (this step's
    /// displacement), moves `position`, and returns the displacement
    /// actually applied.
    ///
    /// `standing_on_platform` marks the body grounded regardless of what the
    /// sweep found; platforms set it for the passengers they carry.
    pub fn move_and_collide(
        &mut self,
        position: &mut Vec2,
        velocity: Vec2,
        input: Vec2,
        standing_on_platform: bool,
        caster: &impl RayCaster,
    ) -> Vec2 {
        self.input = input;
        self.rays.clear();

        let origins = self.grid.origins(*position);
        let mut resolver = CollisionResolver::new(
            caster,
            self.config.sweep_settings(),
            origins,
            self.grid.spacing(),
            input,
        );
        if self.record_rays {
            resolver = resolver.with_ray_log(&mut self.rays);
        }

        let displacement = resolver.resolve(&mut self.collisions, velocity);
        *position += displacement;

        if standing_on_platform {
            self.collisions.below = true;
        }

        displacement
    }

    /// Moves the body on behalf of something carrying or pushing it, with no
    /// directional input.
    pub fn carry(
        &mut self,
        position: &mut Vec2,
        velocity: Vec2,
        standing_on_platform: bool,
        caster: &impl RayCaster,
    ) -> Vec2 {
        self.move_and_collide(position, velocity, Vec2::ZERO, standing_on_platform, caster)
    }
}

mod passengers;
mod path;
mod plugin;

pub use passengers::{find_passengers, PassengerMove};
pub use path::{ease, PathMode, PlatformPath, MAX_EASE_AMOUNT};
pub use plugin::{move_platforms, spawn_moving_platform, PlatformPlugin, PlatformSystems};

use avian2d::prelude::LayerMask;
use bevy::prelude::*;

use crate::error::ShapeError;
use crate::physics::{GameLayer, RayCaster, RayGrid, DISTANCE_BETWEEN_RAYS, SKIN_WIDTH};

/// A kinematic box that follows a [`PlatformPath`] and carries whatever
/// rests on it or stands in its way.
#[derive(Component, Debug, Clone)]
pub struct MovingPlatform {
    pub path: PlatformPath,
    grid: RayGrid,
    /// Layers scanned for passengers
    pub passenger_mask: LayerMask,
}

impl MovingPlatform {
    pub fn new(half_extents: Vec2, path: PlatformPath) -> Result<Self, ShapeError> {
        Ok(Self {
            path,
            grid: RayGrid::new(half_extents, SKIN_WIDTH, DISTANCE_BETWEEN_RAYS)?,
            passenger_mask: GameLayer::passenger_mask(),
        })
    }

    pub fn with_passenger_mask(mut self, mask: impl Into<LayerMask>) -> Self {
        self.passenger_mask = mask.into();
        self
    }

    pub fn half_extents(&self) -> Vec2 {
        self.grid.half_extents()
    }

    /// Advances the path and works out who gets moved, without moving
    /// anything. Apply the result with [`PlatformStep::apply`].
    pub fn step(
        &mut self,
        position: Vec2,
        dt: f32,
        now: f32,
        caster: &impl RayCaster,
    ) -> PlatformStep {
        let velocity = self.path.advance(position, dt, now);
        let passengers = find_passengers(
            caster,
            &self.grid.origins(position),
            &self.grid.spacing(),
            self.grid.skin_width(),
            velocity,
            self.passenger_mask,
        );

        PlatformStep {
            velocity,
            passengers,
        }
    }
}

/// One step of platform motion: its own displacement and every passenger
/// move it causes.
#[derive(Debug, Clone, Default)]
pub struct PlatformStep {
    pub velocity: Vec2,
    pub passengers: Vec<PassengerMove>,
}

/// A single action in the order a [`PlatformStep`] must be applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CarryStep<'a> {
    Passenger(&'a PassengerMove),
    Platform(Vec2),
}

impl PlatformStep {
    pub fn moved_before(&self) -> impl Iterator<Item = &PassengerMove> {
        self.passengers.iter().filter(|m| m.move_before_platform)
    }

    pub fn moved_after(&self) -> impl Iterator<Item = &PassengerMove> {
        self.passengers.iter().filter(|m| !m.move_before_platform)
    }

    /// Feeds the step to `visit` in order: pushed passengers, the platform
    /// itself, then riders that must follow the platform's new position.
    pub fn apply(&self, mut visit: impl FnMut(CarryStep<'_>)) {
        for passenger in self.moved_before() {
            visit(CarryStep::Passenger(passenger));
        }
        visit(CarryStep::Platform(self.velocity));
        for passenger in self.moved_after() {
            visit(CarryStep::Passenger(passenger));
        }
    }
}

use avian2d::prelude::LayerMask;
use bevy::prelude::*;

use super::origins::{RayOrigins, RaySpacing};
use super::ray::{horizontal_dir, sign, slope_angle, vertical_dir, RayCaster, RayHit, SurfaceKind};

/// Length of the probe that looks for a slope under the trailing corner.
/// Effectively unbounded; the drop is compared against this step's travel.
const DESCEND_PROBE_DISTANCE: f32 = f32::MAX;

/// Longest segment kept in the debug ray log; the descend probe is unbounded.
const DEBUG_RAY_LIMIT: f32 = 100.0;

/// Vertical input below this counts as "down held" for dropping through
/// one-way platforms
pub const DROP_THROUGH_INPUT: f32 = -0.5;

/// Which kind of slope, if any, the body is moving along this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlopeState {
    #[default]
    None,
    Climbing,
    Descending,
    /// Standing on a slope steeper than the max slope angle
    SlidingDownMaxSlope,
}

/// Contacts and slope information produced by the last move.
///
/// Everything except `slope_angle_old`, `face_direction` and
/// `through_platform` is cleared at the start of every move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionState {
    pub above: bool,
    pub below: bool,
    pub left: bool,
    pub right: bool,
    pub slope: SlopeState,
    /// Degrees from up of the slope being traversed
    pub slope_angle: f32,
    /// `slope_angle` from the previous move
    pub slope_angle_old: f32,
    pub slope_normal: Vec2,
    /// Requested velocity before any slope adjustment
    pub velocity_old: Vec2,
    /// Last non-zero horizontal direction, ±1
    pub face_direction: f32,
    /// One-way platform currently being dropped through
    pub through_platform: Option<Entity>,
}

impl Default for CollisionState {
    fn default() -> Self {
        Self {
            above: false,
            below: false,
            left: false,
            right: false,
            slope: SlopeState::None,
            slope_angle: 0.0,
            slope_angle_old: 0.0,
            slope_normal: Vec2::ZERO,
            velocity_old: Vec2::ZERO,
            face_direction: 1.0,
            through_platform: None,
        }
    }
}

impl CollisionState {
    pub fn reset(&mut self) {
        self.above = false;
        self.below = false;
        self.left = false;
        self.right = false;
        self.slope = SlopeState::None;
        self.slope_normal = Vec2::ZERO;
        self.slope_angle_old = self.slope_angle;
        self.slope_angle = 0.0;
    }

    pub fn climbing_slope(&self) -> bool {
        self.slope == SlopeState::Climbing
    }

    pub fn descending_slope(&self) -> bool {
        self.slope == SlopeState::Descending
    }

    pub fn sliding_down_max_slope(&self) -> bool {
        self.slope == SlopeState::SlidingDownMaxSlope
    }

    /// Touching a wall on either side.
    pub fn touching_wall(&self) -> bool {
        self.left || self.right
    }

    /// -1 for a wall on the left, 1 otherwise.
    pub fn wall_direction(&self) -> f32 {
        if self.left { -1.0 } else { 1.0 }
    }

    fn set_slope(&mut self, slope: SlopeState, angle: f32, normal: Vec2) {
        self.slope = slope;
        self.slope_angle = angle;
        self.slope_normal = normal;
    }
}

/// A ray cast made during a move, kept for debug drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySegment {
    pub origin: Vec2,
    pub end: Vec2,
    pub hit: bool,
}

/// Tunables shared by every sweep of one body.
#[derive(Debug, Clone, Copy)]
pub struct SweepSettings {
    pub skin_width: f32,
    /// Steepest slope (degrees) that can be walked up
    pub max_slope_angle: f32,
    pub collision_mask: LayerMask,
}

/// Clamps one step's requested displacement against the world.
///
/// Runs the descend pre-pass, then the horizontal and vertical sweeps, and
/// writes what it found into a [`CollisionState`].
pub struct CollisionResolver<'a, C: RayCaster> {
    caster: &'a C,
    settings: SweepSettings,
    origins: RayOrigins,
    spacing: RaySpacing,
    /// Directional input of the mover; only the vertical axis is read
    input: Vec2,
    rays: Option<&'a mut Vec<RaySegment>>,
}

impl<'a, C: RayCaster> CollisionResolver<'a, C> {
    pub fn new(
        caster: &'a C,
        settings: SweepSettings,
        origins: RayOrigins,
        spacing: RaySpacing,
        input: Vec2,
    ) -> Self {
        Self {
            caster,
            settings,
            origins,
            spacing,
            input,
            rays: None,
        }
    }

    /// Records every cast into `rays`.
    pub fn with_ray_log(mut self, rays: &'a mut Vec<RaySegment>) -> Self {
        self.rays = Some(rays);
        self
    }

    /// Returns the displacement that can actually be applied this step.
    pub fn resolve(&mut self, state: &mut CollisionState, mut velocity: Vec2) -> Vec2 {
        state.reset();
        state.velocity_old = velocity;

        if velocity.y < 0.0 {
            self.descend_slope(state, &mut velocity);
        }

        if velocity.x != 0.0 {
            state.face_direction = sign(velocity.x);
        }

        self.horizontal_collisions(state, &mut velocity);

        if velocity.y != 0.0 {
            self.vertical_collisions(state, &mut velocity);
        }

        velocity
    }

    fn cast(&mut self, origin: Vec2, direction: Dir2, max_distance: f32) -> Option<RayHit> {
        let hit = self
            .caster
            .cast_ray(origin, direction, max_distance, self.settings.collision_mask);

        if let Some(rays) = self.rays.as_deref_mut() {
            let length = hit.map_or(max_distance, |h| h.distance);
            rays.push(RaySegment {
                origin,
                end: origin + direction.as_vec2() * length.min(DEBUG_RAY_LIMIT),
                hit: hit.is_some(),
            });
        }

        hit
    }

    /// Slope casts read the normal, which is zero for a ray that starts
    /// inside a collider, so such hits are dropped.
    fn cast_outside(
        &mut self,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
    ) -> Option<RayHit> {
        self.cast(origin, direction, max_distance)
            .filter(|hit| hit.distance > 0.0)
    }

    fn horizontal_collisions(&mut self, state: &mut CollisionState, velocity: &mut Vec2) {
        let skin = self.settings.skin_width;
        let max_slope = self.settings.max_slope_angle;
        let direction_x = state.face_direction;
        let corner = if direction_x < 0.0 {
            self.origins.bottom_left
        } else {
            self.origins.bottom_right
        };
        let spacing = self.spacing.horizontal_spacing;

        // Near-zero horizontal speed still probes far enough to feel an
        // adjacent wall
        let ray_length = if velocity.x.abs() < skin {
            2.0 * skin
        } else {
            velocity.x.abs() + skin
        };

        // Each clamp shortens the ray for the rays after it, so only a
        // closer obstruction can clamp again
        (0..self.spacing.horizontal_count).fold(ray_length, |ray_length, i| {
            let origin = corner + Vec2::Y * (spacing * i as f32);
            let Some(hit) = self.cast(origin, horizontal_dir(direction_x), ray_length) else {
                return ray_length;
            };
            // Origin already inside geometry
            if hit.distance == 0.0 {
                return ray_length;
            }

            let angle = slope_angle(hit.normal);

            if i == 0 && angle <= max_slope {
                if state.descending_slope() {
                    state.slope = SlopeState::None;
                    *velocity = state.velocity_old;
                }

                // Start the climb at the foot of a new slope rather than
                // from where the body currently is
                let mut distance_to_slope_start = 0.0;
                if angle != state.slope_angle_old {
                    distance_to_slope_start = hit.distance - skin;
                    velocity.x -= distance_to_slope_start * direction_x;
                }
                climb_slope(state, velocity, angle, hit.normal);
                velocity.x += distance_to_slope_start * direction_x;
            }

            if state.climbing_slope() && angle <= max_slope {
                return ray_length;
            }

            velocity.x = (hit.distance - skin) * direction_x;
            if state.climbing_slope() {
                velocity.y = state.slope_angle.to_radians().tan() * velocity.x.abs();
            }
            state.left = direction_x == -1.0;
            state.right = direction_x == 1.0;

            hit.distance
        });
    }

    fn vertical_collisions(&mut self, state: &mut CollisionState, velocity: &mut Vec2) {
        let skin = self.settings.skin_width;
        let direction_y = sign(velocity.y);
        let corner = if direction_y < 0.0 {
            self.origins.bottom_left
        } else {
            self.origins.top_left
        };
        let spacing = self.spacing.vertical_spacing;
        let drop_requested = self.input.y <= DROP_THROUGH_INPUT;

        (0..self.spacing.vertical_count).fold(velocity.y.abs() + skin, |ray_length, i| {
            // Probe from where the horizontal sweep left the body
            let origin = corner + Vec2::X * (spacing * i as f32 + velocity.x);
            let Some(hit) = self.cast(origin, vertical_dir(direction_y), ray_length) else {
                return ray_length;
            };

            if let Some(through) = state.through_platform {
                if through == hit.collider {
                    return ray_length;
                }
                debug!("left one-way platform {through:?}");
                state.through_platform = None;
            }

            if hit.surface == SurfaceKind::OneWay {
                // Climbing leaves vy >= 0, so a climbing body always skips here
                if direction_y > 0.0 || hit.distance == 0.0 {
                    return ray_length;
                }
                if drop_requested {
                    debug!("dropping through one-way platform {:?}", hit.collider);
                    state.through_platform = Some(hit.collider);
                    return ray_length;
                }
            }

            velocity.y = (hit.distance - skin) * direction_y;
            if state.climbing_slope() {
                velocity.x =
                    velocity.y / state.slope_angle.to_radians().tan() * sign(velocity.x);
            }
            state.below = direction_y == -1.0;
            state.above = direction_y == 1.0;

            hit.distance
        });

        if state.climbing_slope() {
            self.recheck_slope_angle(state, velocity);
        }
    }

    /// Catches a change of slope angle part way through a climb so the body
    /// doesn't sink into the steeper section.
    fn recheck_slope_angle(&mut self, state: &mut CollisionState, velocity: &mut Vec2) {
        let skin = self.settings.skin_width;
        let direction_x = sign(velocity.x);
        let corner = if direction_x < 0.0 {
            self.origins.bottom_left
        } else {
            self.origins.bottom_right
        };
        let origin = corner + Vec2::Y * velocity.y;

        let Some(hit) =
            self.cast_outside(origin, horizontal_dir(direction_x), velocity.x.abs() + skin)
        else {
            return;
        };

        let angle = slope_angle(hit.normal);
        if angle != state.slope_angle {
            velocity.x = (hit.distance - skin) * direction_x;
            state.slope_angle = angle;
            state.slope_normal = hit.normal;
        }
    }

    fn descend_slope(&mut self, state: &mut CollisionState, velocity: &mut Vec2) {
        let skin = self.settings.skin_width;
        let probe_length = velocity.y.abs() + skin;

        let left = self.cast_outside(self.origins.bottom_left, Dir2::NEG_Y, probe_length);
        let right = self.cast_outside(self.origins.bottom_right, Dir2::NEG_Y, probe_length);

        // Only one foot over a too-steep slope: slide off it
        if left.is_some() != right.is_some() {
            if let Some(hit) = left.or(right) {
                self.slide_down_max_slope(state, velocity, hit);
            }
        }

        if state.sliding_down_max_slope() {
            return;
        }

        let direction_x = sign(velocity.x);
        let trailing_corner = if direction_x < 0.0 {
            self.origins.bottom_right
        } else {
            self.origins.bottom_left
        };
        let Some(hit) = self.cast_outside(trailing_corner, Dir2::NEG_Y, DESCEND_PROBE_DISTANCE)
        else {
            return;
        };

        let angle = slope_angle(hit.normal);
        if angle == 0.0 || angle >= self.settings.max_slope_angle {
            return;
        }
        // Slope must fall away in the direction of travel
        if sign(hit.normal.x) != direction_x {
            return;
        }

        let radians = angle.to_radians();
        let move_distance = velocity.x.abs();
        // Too far above the slope to reach it this step
        if hit.distance - skin > radians.tan() * move_distance {
            return;
        }

        velocity.x = radians.cos() * move_distance * sign(velocity.x);
        velocity.y -= radians.sin() * move_distance;

        state.set_slope(SlopeState::Descending, angle, hit.normal);
        state.below = true;
    }

    fn slide_down_max_slope(&self, state: &mut CollisionState, velocity: &mut Vec2, hit: RayHit) {
        let angle = slope_angle(hit.normal);
        if angle <= self.settings.max_slope_angle {
            return;
        }

        velocity.x =
            sign(hit.normal.x) * (velocity.y.abs() - hit.distance) / angle.to_radians().tan();
        state.set_slope(SlopeState::SlidingDownMaxSlope, angle, hit.normal);
    }
}

/// Converts horizontal travel into travel along a slope, unless the body is
/// already rising faster than the slope would carry it (a jump).
fn climb_slope(state: &mut CollisionState, velocity: &mut Vec2, angle: f32, normal: Vec2) {
    let radians = angle.to_radians();
    let move_distance = velocity.x.abs();
    let climb_velocity_y = radians.sin() * move_distance;

    if velocity.y <= climb_velocity_y {
        velocity.y = climb_velocity_y;
        velocity.x = radians.cos() * move_distance * sign(velocity.x);
        state.below = true;
        state.set_slope(SlopeState::Climbing, angle, normal);
    }
}

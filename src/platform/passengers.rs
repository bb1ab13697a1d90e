use avian2d::prelude::LayerMask;
use bevy::prelude::*;

use crate::physics::{horizontal_dir, sign, vertical_dir, RayCaster, RayOrigins, RaySpacing};

/// How one passenger is moved by a platform this step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassengerMove {
    pub passenger: Entity,
    /// Displacement to apply to the passenger
    pub velocity: Vec2,
    /// Passenger rides the platform and should count as grounded
    pub standing_on_platform: bool,
    /// Move the passenger before the platform translates
    pub move_before_platform: bool,
}

/// Finds everything the platform pushes or carries when it moves by
/// `velocity` this step.
///
/// Three scans run in order: along the vertical motion, along the horizontal
/// motion, then a short probe above the top edge for riders. A passenger is
/// recorded by the first scan that finds it.
pub fn find_passengers(
    caster: &impl RayCaster,
    origins: &RayOrigins,
    spacing: &RaySpacing,
    skin_width: f32,
    velocity: Vec2,
    passenger_mask: LayerMask,
) -> Vec<PassengerMove> {
    let mut moves: Vec<PassengerMove> = Vec::new();

    let direction_x = sign(velocity.x);
    let direction_y = sign(velocity.y);

    // Riders above a rising platform, or bodies below a sinking one
    if velocity.y != 0.0 {
        let ray_length = velocity.y.abs() + skin_width;
        let corner = if direction_y < 0.0 {
            origins.bottom_left
        } else {
            origins.top_left
        };

        for i in 0..spacing.vertical_count {
            let origin = corner + Vec2::X * (spacing.vertical_spacing * i as f32);
            let Some(hit) =
                caster.cast_ray(origin, vertical_dir(direction_y), ray_length, passenger_mask)
            else {
                continue;
            };
            if hit.distance == 0.0 {
                continue;
            }

            let rising = direction_y == 1.0;
            push_unique(
                &mut moves,
                PassengerMove {
                    passenger: hit.collider,
                    velocity: Vec2::new(
                        if rising { velocity.x } else { 0.0 },
                        velocity.y - (hit.distance - skin_width) * direction_y,
                    ),
                    standing_on_platform: rising,
                    move_before_platform: true,
                },
            );
        }
    }

    // Bodies in the way of a sideways move
    if velocity.x != 0.0 {
        let ray_length = velocity.x.abs() + skin_width;
        let corner = if direction_x < 0.0 {
            origins.bottom_left
        } else {
            origins.bottom_right
        };

        for i in 0..spacing.horizontal_count {
            let origin = corner + Vec2::Y * (spacing.horizontal_spacing * i as f32);
            let Some(hit) =
                caster.cast_ray(origin, horizontal_dir(direction_x), ray_length, passenger_mask)
            else {
                continue;
            };
            if hit.distance == 0.0 {
                continue;
            }

            // Small downward push keeps the passenger's own sweep checking
            // the ground under it
            push_unique(
                &mut moves,
                PassengerMove {
                    passenger: hit.collider,
                    velocity: Vec2::new(
                        velocity.x - (hit.distance - skin_width) * direction_x,
                        -skin_width,
                    ),
                    standing_on_platform: false,
                    move_before_platform: true,
                },
            );
        }
    }

    // Riders on top of a platform moving down or only sideways
    if direction_y == -1.0 || (velocity.y == 0.0 && velocity.x != 0.0) {
        let ray_length = skin_width * 2.0;

        for i in 0..spacing.vertical_count {
            let origin = origins.top_left + Vec2::X * (spacing.vertical_spacing * i as f32);
            let Some(hit) = caster.cast_ray(origin, Dir2::Y, ray_length, passenger_mask) else {
                continue;
            };
            if hit.distance == 0.0 {
                continue;
            }

            push_unique(
                &mut moves,
                PassengerMove {
                    passenger: hit.collider,
                    velocity,
                    standing_on_platform: true,
                    move_before_platform: false,
                },
            );
        }
    }

    moves
}

fn push_unique(moves: &mut Vec<PassengerMove>, passenger_move: PassengerMove) {
    if !moves.iter().any(|m| m.passenger == passenger_move.passenger) {
        moves.push(passenger_move);
    }
}

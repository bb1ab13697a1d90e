use bevy::math::bounding::Aabb2d;
use bevy::prelude::*;

use crate::error::ShapeError;

/// Inward margin between a shape's bounds and its ray origins
pub const SKIN_WIDTH: f32 = 0.015;

/// Target distance between neighbouring parallel rays
pub const DISTANCE_BETWEEN_RAYS: f32 = 0.25;

/// Fewest rays cast along any edge
pub const MIN_RAY_COUNT: usize = 2;

/// Corners of a shape shrunk by the skin width, where sweeps start from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RayOrigins {
    pub bottom_left: Vec2,
    pub bottom_right: Vec2,
    pub top_left: Vec2,
    pub top_right: Vec2,
}

impl RayOrigins {
    /// Origins of the given bounds shrunk by `skin_width` on every side.
    pub fn from_bounds(bounds: Aabb2d, skin_width: f32) -> Self {
        let min = bounds.min + Vec2::splat(skin_width);
        let max = bounds.max - Vec2::splat(skin_width);
        Self {
            bottom_left: min,
            bottom_right: Vec2::new(max.x, min.y),
            top_left: Vec2::new(min.x, max.y),
            top_right: max,
        }
    }
}

/// How many rays each sweep casts and how far apart they are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySpacing {
    /// Rays cast sideways, stacked bottom to top
    pub horizontal_count: usize,
    /// Rays cast up or down, spread left to right
    pub vertical_count: usize,
    pub horizontal_spacing: f32,
    pub vertical_spacing: f32,
}

impl RaySpacing {
    /// Spreads rays over an inner (already skin-shrunk) size.
    ///
    /// Counts round to the nearest whole ray and never drop below
    /// [`MIN_RAY_COUNT`], so the outermost rays always sit on the corners.
    pub fn from_size(inner_size: Vec2, distance_between_rays: f32) -> Self {
        let count = |extent: f32| {
            if distance_between_rays > 0.0 && distance_between_rays.is_finite() {
                ((extent / distance_between_rays).round() as usize).max(MIN_RAY_COUNT)
            } else {
                MIN_RAY_COUNT
            }
        };
        let horizontal_count = count(inner_size.y);
        let vertical_count = count(inner_size.x);

        Self {
            horizontal_count,
            vertical_count,
            horizontal_spacing: inner_size.y / (horizontal_count - 1) as f32,
            vertical_spacing: inner_size.x / (vertical_count - 1) as f32,
        }
    }
}

/// An axis-aligned box and the ray layout derived from it.
///
/// Spacing is computed once per size; origins are recomputed from the
/// current center every step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayGrid {
    half_extents: Vec2,
    skin_width: f32,
    distance_between_rays: f32,
    spacing: RaySpacing,
}

impl RayGrid {
    pub fn new(
        half_extents: Vec2,
        skin_width: f32,
        distance_between_rays: f32,
    ) -> Result<Self, ShapeError> {
        validate(half_extents, skin_width)?;

        if distance_between_rays <= 0.0 || !distance_between_rays.is_finite() {
            warn!(
                "ray spacing target {distance_between_rays} is not positive, using {MIN_RAY_COUNT} rays per edge"
            );
        }

        let inner_size = (half_extents - Vec2::splat(skin_width)) * 2.0;
        Ok(Self {
            half_extents,
            skin_width,
            distance_between_rays,
            spacing: RaySpacing::from_size(inner_size, distance_between_rays),
        })
    }

    /// Changes the box size and recomputes the ray layout.
    pub fn resize(&mut self, half_extents: Vec2) -> Result<(), ShapeError> {
        *self = Self::new(half_extents, self.skin_width, self.distance_between_rays)?;
        Ok(())
    }

    pub fn half_extents(&self) -> Vec2 {
        self.half_extents
    }

    pub fn skin_width(&self) -> f32 {
        self.skin_width
    }

    pub fn spacing(&self) -> RaySpacing {
        self.spacing
    }

    /// Full (unshrunk) bounds of the box centered on `center`.
    pub fn bounds(&self, center: Vec2) -> Aabb2d {
        Aabb2d::new(center, self.half_extents)
    }

    pub fn origins(&self, center: Vec2) -> RayOrigins {
        RayOrigins::from_bounds(self.bounds(center), self.skin_width)
    }
}

fn validate(half_extents: Vec2, skin_width: f32) -> Result<(), ShapeError> {
    if !half_extents.is_finite() || !skin_width.is_finite() || skin_width < 0.0 {
        return Err(ShapeError::NonFinite {
            half_extents,
            skin_width,
        });
    }
    if half_extents.x <= skin_width || half_extents.y <= skin_width {
        return Err(ShapeError::TooSmall {
            half_extents,
            skin_width,
        });
    }
    Ok(())
}

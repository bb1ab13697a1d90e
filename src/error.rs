//! Error types for body construction.

use bevy::math::Vec2;
use thiserror::Error;

/// Errors raised when building a ray-cast shape.
///
/// These only come out of construction APIs; stepping a body never fails.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ShapeError {
    /// Half extents or skin width are NaN or infinite, or the skin is negative.
    #[error("shape is not finite: half extents {half_extents}, skin width {skin_width}")]
    NonFinite {
        /// The rejected half extents.
        half_extents: Vec2,
        /// The rejected skin width.
        skin_width: f32,
    },

    /// Box leaves no room for ray origins once the skin is removed.
    #[error("shape with half extents {half_extents} is too small for skin width {skin_width}")]
    TooSmall {
        /// The rejected half extents.
        half_extents: Vec2,
        /// Skin width the shape has to contain.
        skin_width: f32,
    },
}

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Errors raised when a shape cannot describe a real collider.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("sphere radius must be positive and finite, got {0}")]
    InvalidRadius(f32),
    #[error("box half extents must be positive and finite, got {0:?}")]
    InvalidHalfExtents([f32; 3]),
}

/// Primitive collider description.
///
/// The render side uses the same value to scale a unit mesh: spheres scale
/// isotropically by the radius, boxes per axis by the full extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeDescriptor {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
}

impl ShapeDescriptor {
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Box from full width/height/depth.
    pub fn cuboid(size: Vec3) -> Self {
        Self::Box {
            half_extents: size * 0.5,
        }
    }

    pub fn validate(&self) -> Result<(), ShapeError> {
        match *self {
            Self::Sphere { radius } => {
                if radius.is_finite() && radius > 0.0 {
                    Ok(())
                } else {
                    Err(ShapeError::InvalidRadius(radius))
                }
            }
            Self::Box { half_extents } => {
                if half_extents.is_finite() && half_extents.min_element() > 0.0 {
                    Ok(())
                } else {
                    Err(ShapeError::InvalidHalfExtents(half_extents.to_array()))
                }
            }
        }
    }

    /// Scale to apply to the unit render mesh matching this shape.
    pub fn render_scale(&self) -> Vec3 {
        match *self {
            Self::Sphere { radius } => Vec3::splat(radius),
            Self::Box { half_extents } => half_extents * 2.0,
        }
    }
}

use glam::Vec3;
use rubble_common::{ObjectId, ShapeError};
use rubble_physics::PhysicsError;

/// Errors from building, stepping or syncing paired objects.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("invalid shape: {0}")]
    InvalidShape(#[from] ShapeError),
    #[error("mass must be finite and non-negative, got {0}")]
    InvalidMass(f32),
    #[error("position must be finite, got {0:?}")]
    InvalidPosition(Vec3),
    #[error("impulse must be finite, got {0:?}")]
    InvalidImpulse(Vec3),
    #[error("invalid structure: {0}")]
    InvalidStructure(String),
    #[error("invalid launch: {0}")]
    InvalidLaunch(String),
    #[error("object {0:?} has no body in the physics world")]
    MissingBody(ObjectId),
    #[error("object {0:?} has no proxy in the scene")]
    MissingProxy(ObjectId),
    #[error("physics: {0}")]
    Physics(#[from] PhysicsError),
}

impl SimError {
    /// Whether the frame loop must stop. Fatal errors mean the scene no longer
    /// mirrors the simulation.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingBody(_)
                | Self::MissingProxy(_)
                | Self::Physics(PhysicsError::NonFiniteTransform(_))
                | Self::Physics(PhysicsError::InvalidTimeStep(_))
        )
    }
}

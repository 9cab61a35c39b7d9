use glam::{Quat, Vec3};
use rubble_common::{BodyHandle, ShapeDescriptor, ShapeError};
use serde::{Deserialize, Serialize};

/// Errors from the physics world.
///
/// `InvalidTimeStep` and `NonFiniteTransform` leave the simulation in a state
/// that cannot be trusted and are meant to stop the frame loop.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhysicsError {
    #[error("invalid shape: {0}")]
    InvalidShape(#[from] ShapeError),
    #[error("mass must be finite and non-negative, got {0}")]
    InvalidMass(f32),
    #[error("position must be finite, got {0:?}")]
    InvalidPosition(Vec3),
    #[error("time step must be finite and non-negative, got {0}")]
    InvalidTimeStep(f32),
    #[error("body {0:?} produced a non-finite transform")]
    NonFiniteTransform(BodyHandle),
}

/// Sleep classification of a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SleepState {
    Awake,
    /// Awake, but moving slower than the sleep speed limit.
    Sleepy,
    Sleeping,
}

/// Everything the world needs to create a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDescriptor {
    pub shape: ShapeDescriptor,
    pub position: Vec3,
    /// Zero makes the body static.
    pub mass: f32,
}

impl BodyDescriptor {
    pub fn new(shape: ShapeDescriptor, position: Vec3, mass: f32) -> Self {
        Self {
            shape,
            position,
            mass,
        }
    }

    pub fn is_static(&self) -> bool {
        self.mass == 0.0
    }

    pub fn validate(&self) -> Result<(), PhysicsError> {
        self.shape.validate()?;
        if !self.mass.is_finite() || self.mass < 0.0 {
            return Err(PhysicsError::InvalidMass(self.mass));
        }
        if !self.position.is_finite() {
            return Err(PhysicsError::InvalidPosition(self.position));
        }
        Ok(())
    }
}

/// Boundary between the synchronization layer and a rigid body simulation.
pub trait PhysicsEngine {
    /// Validate the descriptor and insert a body. Nothing is inserted on error.
    fn add_body(&mut self, descriptor: &BodyDescriptor) -> Result<BodyHandle, PhysicsError>;

    /// Remove a body. Returns false if the handle no longer resolves.
    fn remove_body(&mut self, handle: BodyHandle) -> bool;

    /// Advance by `real_dt` seconds of wall time in fixed sub-steps, running
    /// at most `max_sub_steps`. Returns the number of sub-steps taken.
    fn step(&mut self, real_dt: f32, max_sub_steps: u32) -> Result<u32, PhysicsError>;

    /// Position and orientation to present for the body.
    fn transform(&self, handle: BodyHandle) -> Option<(Vec3, Quat)>;

    /// Returns false, leaving the body untouched, if the handle no longer
    /// resolves or the impulse is not finite.
    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) -> bool;

    fn set_sleeping(&mut self, handle: BodyHandle, sleeping: bool) -> bool;

    fn sleep_state(&self, handle: BodyHandle) -> Option<SleepState>;

    fn mass(&self, handle: BodyHandle) -> Option<f32>;

    fn body_count(&self) -> usize;
}

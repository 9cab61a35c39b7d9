//! Physics World: rigid body simulation behind an engine-agnostic boundary.
//!
//! # Invariants
//! - Bodies are addressed only through [`BodyHandle`]s, which are never reused.
//! - A step either leaves every body with a finite transform or reports a
//!   fatal [`PhysicsError::NonFiniteTransform`].
//!
//! [`BodyHandle`]: rubble_common::BodyHandle

pub mod config;
pub mod engine;
pub mod world;

pub use config::{ContactMaterial, WorldConfig};
pub use engine::{BodyDescriptor, PhysicsEngine, PhysicsError, SleepState};
pub use world::RapierWorld;

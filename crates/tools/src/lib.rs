//! Developer tooling: read-only views of a running simulation.
//!
//! # Invariants
//! - Tools never mutate the registry, the physics world or the scene.

mod inspector;

pub use inspector::{ObjectInfo, RegistryInspector, RegistrySummary};

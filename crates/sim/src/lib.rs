//! Physics/Render Synchronization: keeps every simulated rigid body paired
//! with exactly one render proxy.
//!
//! # Invariants
//! - Every body in the physics world has exactly one [`PairedObject`] in the
//!   [`SimulationRegistry`], and every registered object owns exactly one body
//!   and one proxy.
//! - A body and its proxy are created together and released together.
//! - Proxies are synced from bodies only after the physics step of a frame.
//!
//! Frame order: [`FrameTimer::tick`] → [`SimulationRegistry::step`] (physics
//! sub-steps, then sync of every object in insertion order) → render.

pub mod assets;
pub mod clock;
pub mod error;
pub mod factory;
pub mod launch;
pub mod paired;
pub mod params;
pub mod registry;
pub mod structure;

pub use assets::DefaultAssets;
pub use clock::FrameTimer;
pub use error::SimError;
pub use factory::{BoxParams, ObjectFactory, SphereParams};
pub use launch::{LaunchController, LaunchParameters, LaunchReport};
pub use paired::{ObjectSpec, PairedObject};
pub use params::{DemoParameters, ParamsError};
pub use registry::{RegistryConfig, RegistryState, SimulationRegistry};
pub use structure::{StructureGenerator, StructureParams};

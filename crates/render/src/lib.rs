//! Rendering Adapter: the render side of the physics/render boundary.
//!
//! # Invariants
//! - The render side never drives simulation; it only receives proxies and
//!   transforms.
//! - A detached proxy is gone: its id never resolves again.
//!
//! The [`Scene`] is a headless proxy store. A GPU backend implements
//! [`RenderEngine`] the same way without changing consumers.

mod renderer;
mod scene;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use scene::{MaterialHandle, MeshHandle, RenderEngine, RenderProxy, Scene};

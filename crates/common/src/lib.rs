//! Shared value types used on both sides of the physics/render boundary.

mod shape;
mod types;

pub use shape::{ShapeDescriptor, ShapeError};
pub use types::{BodyHandle, ObjectId, ProxyId, Transform};

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Friction/restitution pair applied to every collider in the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactMaterial {
    pub friction: f32,
    pub restitution: f32,
}

impl Default for ContactMaterial {
    fn default() -> Self {
        Self {
            friction: 1.0,
            restitution: 0.2,
        }
    }
}

/// Global parameters of a physics world. Fixed for the lifetime of the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub gravity: Vec3,
    /// Length of one simulation sub-step, in seconds.
    pub fixed_time_step: f32,
    /// Whether resting bodies may fall asleep.
    pub allow_sleep: bool,
    /// Linear and angular speed under which an awake body counts as sleepy.
    pub sleep_speed_limit: f32,
    pub contact: ContactMaterial,
    /// Static floor collider at y = 0.
    pub ground_plane: bool,
    /// Blend reported transforms between the last two sub-steps.
    pub interpolate: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.82, 0.0),
            fixed_time_step: 1.0 / 60.0,
            allow_sleep: true,
            sleep_speed_limit: 0.1,
            contact: ContactMaterial::default(),
            ground_plane: true,
            interpolate: false,
        }
    }
}

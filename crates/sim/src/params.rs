//! User-tunable demo parameters, loadable from JSON.

use std::ops::RangeInclusive;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::launch::LaunchParameters;
use crate::structure::StructureParams;

#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything the demo exposes as a slider or toggle.
///
/// Missing JSON fields fall back to their defaults. Values outside their
/// slider range are only corrected by [`DemoParameters::clamped`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoParameters {
    pub show_sleep_state: bool,
    /// Bricks per row.
    pub wall_row_size: u32,
    pub wall_rows: u32,
    /// Brick width; height and depth are half of it.
    pub wall_brick_size: f32,
    pub wall_brick_mass: f32,
    pub ball_radius: f32,
    pub ball_mass: f32,
    pub ball_launch_force: f32,
    pub ball_launch_spread: f32,
}

impl Default for DemoParameters {
    fn default() -> Self {
        Self {
            show_sleep_state: false,
            wall_row_size: 7,
            wall_rows: 7,
            wall_brick_size: 1.0,
            wall_brick_mass: 1.0,
            ball_radius: 0.5,
            ball_mass: 5.0,
            ball_launch_force: 33.0,
            ball_launch_spread: 10.0,
        }
    }
}

impl DemoParameters {
    pub const WALL_ROW_SIZE: RangeInclusive<u32> = 3..=15;
    pub const WALL_ROWS: RangeInclusive<u32> = 3..=15;
    pub const WALL_BRICK_SIZE: RangeInclusive<f32> = 0.2..=1.5;
    pub const WALL_BRICK_MASS: RangeInclusive<f32> = 0.1..=10.0;
    pub const BALL_RADIUS: RangeInclusive<f32> = 0.05..=1.0;
    pub const BALL_MASS: RangeInclusive<f32> = 0.1..=30.0;
    pub const BALL_LAUNCH_FORCE: RangeInclusive<f32> = 8.0..=83.0;
    pub const BALL_LAUNCH_SPREAD: RangeInclusive<f32> = 0.0..=17.0;

    /// Plane the wall stands in.
    pub const WALL_Z: f32 = -4.0;

    pub fn from_json_str(json: &str) -> Result<Self, ParamsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ParamsError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Copy with every value pulled into its slider range. Each correction is
    /// logged.
    pub fn clamped(&self) -> Self {
        Self {
            show_sleep_state: self.show_sleep_state,
            wall_row_size: clamp_u32("wall_row_size", self.wall_row_size, Self::WALL_ROW_SIZE),
            wall_rows: clamp_u32("wall_rows", self.wall_rows, Self::WALL_ROWS),
            wall_brick_size: clamp_f32(
                "wall_brick_size",
                self.wall_brick_size,
                Self::WALL_BRICK_SIZE,
            ),
            wall_brick_mass: clamp_f32(
                "wall_brick_mass",
                self.wall_brick_mass,
                Self::WALL_BRICK_MASS,
            ),
            ball_radius: clamp_f32("ball_radius", self.ball_radius, Self::BALL_RADIUS),
            ball_mass: clamp_f32("ball_mass", self.ball_mass, Self::BALL_MASS),
            ball_launch_force: clamp_f32(
                "ball_launch_force",
                self.ball_launch_force,
                Self::BALL_LAUNCH_FORCE,
            ),
            ball_launch_spread: clamp_f32(
                "ball_launch_spread",
                self.ball_launch_spread,
                Self::BALL_LAUNCH_SPREAD,
            ),
        }
    }

    /// Wall layout: bricks are `s × s/2 × s/2`, centred on x, standing on the
    /// ground at `z = WALL_Z`.
    pub fn structure_params(&self) -> StructureParams {
        let s = self.wall_brick_size;
        StructureParams {
            rows: self.wall_rows,
            columns: self.wall_row_size,
            brick_size: Vec3::new(s, s * 0.5, s * 0.5),
            origin: Vec3::new(0.0, 0.0, Self::WALL_Z),
            brick_mass: self.wall_brick_mass,
        }
    }

    pub fn launch_params(&self) -> LaunchParameters {
        LaunchParameters {
            radius: self.ball_radius,
            mass: self.ball_mass,
            force: self.ball_launch_force,
            spread: self.ball_launch_spread,
        }
    }
}

fn clamp_u32(name: &str, value: u32, range: RangeInclusive<u32>) -> u32 {
    let clamped = value.clamp(*range.start(), *range.end());
    if clamped != value {
        tracing::warn!(param = name, value, clamped, "parameter out of range");
    }
    clamped
}

fn clamp_f32(name: &str, value: f32, range: RangeInclusive<f32>) -> f32 {
    // NaN falls back to the low end.
    let clamped = if value.is_nan() {
        *range.start()
    } else {
        value.clamp(*range.start(), *range.end())
    };
    if clamped != value {
        tracing::warn!(param = name, value, clamped, "parameter out of range");
    }
    clamped
}

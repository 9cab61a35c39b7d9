use glam::Vec3;
use rubble_common::ShapeDescriptor;
use rubble_physics::PhysicsEngine;
use rubble_render::RenderEngine;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::factory::{BoxParams, ObjectFactory};
use crate::paired::PairedObject;

/// Layout of a brick wall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureParams {
    pub rows: u32,
    /// Bricks per row.
    pub columns: u32,
    /// Full width/height/depth of one brick.
    pub brick_size: Vec3,
    /// Bottom centre of the wall.
    pub origin: Vec3,
    pub brick_mass: f32,
}

impl Default for StructureParams {
    fn default() -> Self {
        Self {
            rows: 5,
            columns: 5,
            brick_size: Vec3::new(2.0, 1.0, 1.0),
            origin: Vec3::ZERO,
            brick_mass: 1.0,
        }
    }
}

impl StructureParams {
    /// Largest wall `validate` accepts.
    pub const MAX_BRICKS: u64 = 10_000;

    pub fn brick_count(&self) -> usize {
        self.rows as usize * self.columns as usize
    }

    /// Height of the finished wall above its origin.
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.brick_size.y
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let count = u64::from(self.rows) * u64::from(self.columns);
        if count > Self::MAX_BRICKS {
            return Err(SimError::InvalidStructure(format!(
                "{} x {} bricks exceeds the limit of {}",
                self.rows,
                self.columns,
                Self::MAX_BRICKS
            )));
        }
        ShapeDescriptor::cuboid(self.brick_size).validate()?;
        if !self.brick_mass.is_finite() || self.brick_mass < 0.0 {
            return Err(SimError::InvalidMass(self.brick_mass));
        }
        if !self.origin.is_finite() {
            return Err(SimError::InvalidStructure(format!(
                "origin must be finite, got {:?}",
                self.origin
            )));
        }
        Ok(())
    }
}

/// Lays out and builds brick walls.
pub struct StructureGenerator;

impl StructureGenerator {
    /// Brick centres in row-major order, bottom row first.
    ///
    /// Odd rows are shifted right by a quarter brick so joints don't line up.
    /// Does not validate; [`StructureGenerator::build`] does.
    pub fn layout(params: &StructureParams) -> Vec<Vec3> {
        let size = params.brick_size;
        let wall_x_offset = -0.5 * size.x * params.columns as f32;
        let capacity = params.brick_count().min(StructureParams::MAX_BRICKS as usize);
        let mut positions = Vec::with_capacity(capacity);

        for row in 0..params.rows {
            let y = params.origin.y + size.y * (row as f32 + 0.5);
            let row_x_offset = if row % 2 == 1 { size.x * 0.25 } else { 0.0 };
            for column in 0..params.columns {
                let x = params.origin.x
                    + wall_x_offset
                    + row_x_offset
                    + size.x * (column as f32 + 0.5);
                positions.push(Vec3::new(x, y, params.origin.z));
            }
        }
        positions
    }

    /// Create every brick and put it to sleep.
    ///
    /// Sleeping bricks stay put until something hits them; left awake, the
    /// wall settles and jitters on its own. On error every brick built so far
    /// is destroyed again.
    pub fn build(
        factory: &ObjectFactory,
        physics: &mut impl PhysicsEngine,
        scene: &mut impl RenderEngine,
        params: &StructureParams,
    ) -> Result<Vec<PairedObject>, SimError> {
        params.validate()?;

        let mut bricks = Vec::with_capacity(params.brick_count());
        for position in Self::layout(params) {
            let brick = factory.create_box(
                physics,
                scene,
                &BoxParams {
                    size: params.brick_size,
                    position,
                    mass: params.brick_mass,
                    ..BoxParams::default()
                },
            );
            match brick {
                Ok(brick) => {
                    physics.set_sleeping(brick.body(), true);
                    bricks.push(brick);
                }
                Err(err) => {
                    for mut brick in bricks {
                        brick.destroy(physics, scene);
                    }
                    return Err(err);
                }
            }
        }
        Ok(bricks)
    }
}

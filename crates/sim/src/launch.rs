use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rubble_common::ObjectId;
use rubble_physics::PhysicsEngine;
use rubble_render::RenderEngine;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::factory::SphereParams;
use crate::registry::SimulationRegistry;

/// One-shot projectile settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchParameters {
    pub radius: f32,
    pub mass: f32,
    /// Forward impulse per unit of mass.
    pub force: f32,
    /// Bound on the lateral impulse per unit of mass.
    pub spread: f32,
}

impl Default for LaunchParameters {
    fn default() -> Self {
        Self {
            radius: 0.5,
            mass: 5.0,
            force: 33.0,
            spread: 10.0,
        }
    }
}

impl LaunchParameters {
    /// Rejects anything that would put a non-finite value into the world.
    /// Radius is checked again, as a shape, when the projectile is built.
    pub fn validate(&self) -> Result<(), SimError> {
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(SimError::InvalidMass(self.mass));
        }
        if !self.radius.is_finite() {
            return Err(SimError::InvalidLaunch(format!(
                "radius must be finite, got {}",
                self.radius
            )));
        }
        if !self.force.is_finite() || !self.spread.is_finite() {
            return Err(SimError::InvalidLaunch(format!(
                "force and spread must be finite, got {} and {}",
                self.force, self.spread
            )));
        }
        Ok(())
    }
}

/// What a single `fire` produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchReport {
    pub object: ObjectId,
    pub position: Vec3,
    pub impulse: Vec3,
}

/// Fires projectiles at the wall along -Z.
///
/// Keeps nothing about what it fired; the projectile belongs to the registry
/// and its motion to the physics world.
pub struct LaunchController {
    rng: StdRng,
}

impl Default for LaunchController {
    fn default() -> Self {
        Self::new()
    }
}

impl LaunchController {
    /// Distance in front of the origin the projectile starts from.
    pub const LAUNCH_Z: f32 = 4.0;

    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic spread, for tests and replays.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Launch point for a structure of the given height: halfway up the wall,
    /// never below the projectile's own radius.
    pub fn launch_point(&self, structure_height: f32, radius: f32) -> Vec3 {
        Vec3::new(0.0, (structure_height * 0.5).max(radius), Self::LAUNCH_Z)
    }

    /// Impulse for one shot: `-force * mass` forward, each lateral component
    /// uniform in `[-spread/2, spread/2) * mass`.
    pub fn impulse(&mut self, params: &LaunchParameters) -> Vec3 {
        let lateral_x = (self.rng.gen_range(0.0f32..1.0) - 0.5) * params.spread * params.mass;
        let lateral_y = (self.rng.gen_range(0.0f32..1.0) - 0.5) * params.spread * params.mass;
        Vec3::new(lateral_x, lateral_y, -params.force * params.mass)
    }

    /// Spawn a projectile in `registry` and kick it toward the wall.
    pub fn fire<P: PhysicsEngine, R: RenderEngine>(
        &mut self,
        registry: &mut SimulationRegistry<P, R>,
        params: &LaunchParameters,
    ) -> Result<LaunchReport, SimError> {
        params.validate()?;
        // Finite inputs can still overflow once scaled by mass.
        let impulse = self.impulse(params);
        if !impulse.is_finite() {
            return Err(SimError::InvalidImpulse(impulse));
        }

        let position = self.launch_point(registry.structure_height(), params.radius);
        let material = registry.factory().assets().projectile_material;
        let object = registry.spawn_sphere(&SphereParams {
            radius: params.radius,
            position,
            mass: params.mass,
            material: Some(material),
            ..SphereParams::default()
        })?;
        registry.apply_impulse(object, impulse)?;
        tracing::info!(
            id = %object.short(),
            impulse = ?impulse,
            "projectile fired"
        );

        Ok(LaunchReport {
            object,
            position,
            impulse,
        })
    }
}

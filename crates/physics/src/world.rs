use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use rapier3d::prelude::*;
use rubble_common::{BodyHandle, ShapeDescriptor};

use crate::config::WorldConfig;
use crate::engine::{BodyDescriptor, PhysicsEngine, PhysicsError, SleepState};

const GROUND_HALF_SIZE: f32 = 500.0;
const GROUND_HALF_THICKNESS: f32 = 0.5;

/// Per-body bookkeeping kept next to the rapier body.
#[derive(Debug, Clone, Copy)]
struct BodyRecord {
    rapier: RigidBodyHandle,
    mass: f32,
    /// Pose before the most recent sub-step, used for interpolation.
    previous: (Vec3, Quat),
}

/// Physics world backed by rapier3d.
///
/// Owns the full rapier pipeline state. Bodies are exposed only through
/// [`BodyHandle`]s; the ground plane is a free collider and never counts as a
/// body.
pub struct RapierWorld {
    config: WorldConfig,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    /// BTreeMap for deterministic iteration order.
    records: BTreeMap<BodyHandle, BodyRecord>,
    next_handle: u64,
    accumulator: f32,
    sub_steps: u64,
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

impl RapierWorld {
    pub fn new(config: WorldConfig) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.fixed_time_step;

        let mut world = Self {
            config,
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            records: BTreeMap::new(),
            next_handle: 0,
            accumulator: 0.0,
            sub_steps: 0,
        };
        if config.ground_plane {
            world.insert_ground();
        }
        world
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Total number of fixed sub-steps simulated so far.
    pub fn sub_step_count(&self) -> u64 {
        self.sub_steps
    }

    /// Simulated time not yet consumed by a whole sub-step.
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Number of colliders, ground included.
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Number of rigid bodies held by rapier itself.
    pub fn rapier_body_count(&self) -> usize {
        self.bodies.len()
    }

    fn insert_ground(&mut self) {
        // Top face sits at y = 0.
        let ground =
            ColliderBuilder::cuboid(GROUND_HALF_SIZE, GROUND_HALF_THICKNESS, GROUND_HALF_SIZE)
                .translation(vector![0.0, -GROUND_HALF_THICKNESS, 0.0])
                .friction(self.config.contact.friction)
                .restitution(self.config.contact.restitution)
                .build();
        self.colliders.insert(ground);
    }

    fn internal_step(&mut self) -> Result<(), PhysicsError> {
        for record in self.records.values_mut() {
            if let Some(body) = self.bodies.get(record.rapier) {
                record.previous = pose_of(body);
            }
        }

        let gravity = to_vector(self.config.gravity);
        self.pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
        self.sub_steps += 1;

        for (handle, record) in &self.records {
            if let Some(body) = self.bodies.get(record.rapier) {
                let (position, rotation) = pose_of(body);
                if !position.is_finite() || !rotation.is_finite() {
                    tracing::error!(
                        ?handle,
                        sub_step = self.sub_steps,
                        "non-finite body transform"
                    );
                    return Err(PhysicsError::NonFiniteTransform(*handle));
                }
            }
        }
        Ok(())
    }
}

impl PhysicsEngine for RapierWorld {
    fn add_body(&mut self, descriptor: &BodyDescriptor) -> Result<BodyHandle, PhysicsError> {
        descriptor.validate()?;

        let builder = if descriptor.is_static() {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic()
        };
        let body = builder
            .translation(to_vector(descriptor.position))
            .can_sleep(self.config.allow_sleep)
            .build();

        let collider = match descriptor.shape {
            ShapeDescriptor::Sphere { radius } => ColliderBuilder::ball(radius),
            ShapeDescriptor::Box { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
        }
        .friction(self.config.contact.friction)
        .restitution(self.config.contact.restitution);
        let collider = if descriptor.is_static() {
            collider
        } else {
            collider.mass(descriptor.mass)
        };

        let rapier = self.bodies.insert(body);
        self.colliders
            .insert_with_parent(collider.build(), rapier, &mut self.bodies);
        if let Some(body) = self.bodies.get_mut(rapier) {
            body.recompute_mass_properties_from_colliders(&self.colliders);
        }

        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.records.insert(
            handle,
            BodyRecord {
                rapier,
                mass: descriptor.mass,
                previous: (descriptor.position, Quat::IDENTITY),
            },
        );
        tracing::trace!(?handle, mass = descriptor.mass, "body added");
        Ok(handle)
    }

    fn remove_body(&mut self, handle: BodyHandle) -> bool {
        let Some(record) = self.records.remove(&handle) else {
            return false;
        };
        self.bodies.remove(
            record.rapier,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        tracing::trace!(?handle, "body removed");
        true
    }

    fn step(&mut self, real_dt: f32, max_sub_steps: u32) -> Result<u32, PhysicsError> {
        if !real_dt.is_finite() || real_dt < 0.0 {
            return Err(PhysicsError::InvalidTimeStep(real_dt));
        }

        let fixed = self.config.fixed_time_step;
        self.accumulator += real_dt;
        let mut taken = 0;
        while self.accumulator >= fixed && taken < max_sub_steps {
            self.internal_step()?;
            self.accumulator -= fixed;
            taken += 1;
        }

        // Too far behind to catch up: drop the backlog instead of spiralling.
        if self.accumulator >= fixed {
            tracing::debug!(
                backlog = self.accumulator,
                max_sub_steps,
                "physics behind real time, dropping backlog"
            );
            self.accumulator %= fixed;
        }
        Ok(taken)
    }

    fn transform(&self, handle: BodyHandle) -> Option<(Vec3, Quat)> {
        let record = self.records.get(&handle)?;
        let body = self.bodies.get(record.rapier)?;
        let current = pose_of(body);
        if !self.config.interpolate || body.is_sleeping() {
            return Some(current);
        }
        let alpha = (self.accumulator / self.config.fixed_time_step).clamp(0.0, 1.0);
        let (prev_position, prev_rotation) = record.previous;
        Some((
            prev_position.lerp(current.0, alpha),
            prev_rotation.slerp(current.1, alpha),
        ))
    }

    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) -> bool {
        if !impulse.is_finite() {
            tracing::warn!(?handle, ?impulse, "non-finite impulse ignored");
            return false;
        }
        let Some(record) = self.records.get(&handle) else {
            return false;
        };
        match self.bodies.get_mut(record.rapier) {
            Some(body) => {
                body.apply_impulse(to_vector(impulse), true);
                true
            }
            None => false,
        }
    }

    fn set_sleeping(&mut self, handle: BodyHandle, sleeping: bool) -> bool {
        let Some(record) = self.records.get(&handle) else {
            return false;
        };
        let Some(body) = self.bodies.get_mut(record.rapier) else {
            return false;
        };
        if sleeping {
            body.sleep();
        } else {
            body.wake_up(true);
        }
        true
    }

    fn sleep_state(&self, handle: BodyHandle) -> Option<SleepState> {
        let record = self.records.get(&handle)?;
        let body = self.bodies.get(record.rapier)?;
        let limit = self.config.sleep_speed_limit;
        let state = if body.is_sleeping() {
            SleepState::Sleeping
        } else if body.is_dynamic() && body.linvel().norm() < limit && body.angvel().norm() < limit
        {
            SleepState::Sleepy
        } else {
            SleepState::Awake
        };
        Some(state)
    }

    fn mass(&self, handle: BodyHandle) -> Option<f32> {
        self.records.get(&handle).map(|record| record.mass)
    }

    fn body_count(&self) -> usize {
        self.records.len()
    }
}

fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn pose_of(body: &RigidBody) -> (Vec3, Quat) {
    let t = body.translation();
    let r = body.rotation();
    (Vec3::new(t.x, t.y, t.z), Quat::from_xyzw(r.i, r.j, r.k, r.w))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn ball_at(y: f32) -> BodyDescriptor {
        BodyDescriptor::new(ShapeDescriptor::sphere(0.5), Vec3::new(0.0, y, 0.0), 1.0)
    }

    #[test]
    fn world_starts_empty_with_ground() {
        let world = RapierWorld::default();
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.rapier_body_count(), 0);
        assert_eq!(world.collider_count(), 1);
    }

    #[test]
    fn ground_plane_is_optional() {
        let world = RapierWorld::new(WorldConfig {
            ground_plane: false,
            ..WorldConfig::default()
        });
        assert_eq!(world.collider_count(), 0);
    }

    #[test]
    fn add_and_remove_body() {
        let mut world = RapierWorld::default();
        let handle = world.add_body(&ball_at(5.0)).unwrap();
        assert_eq!(world.body_count(), 1);
        assert_eq!(world.rapier_body_count(), 1);
        assert_eq!(world.collider_count(), 2);

        assert!(world.remove_body(handle));
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.rapier_body_count(), 0);
        assert_eq!(world.collider_count(), 1);
    }

    #[test]
    fn removing_twice_is_harmless() {
        let mut world = RapierWorld::default();
        let handle = world.add_body(&ball_at(5.0)).unwrap();
        assert!(world.remove_body(handle));
        assert!(!world.remove_body(handle));
        assert!(world.transform(handle).is_none());
    }

    #[test]
    fn handles_are_not_reused() {
        let mut world = RapierWorld::default();
        let a = world.add_body(&ball_at(5.0)).unwrap();
        world.remove_body(a);
        let b = world.add_body(&ball_at(5.0)).unwrap();
        assert_ne!(a, b);
        assert!(world.transform(a).is_none());
    }

    #[test]
    fn invalid_shape_leaves_world_untouched() {
        let mut world = RapierWorld::default();
        let bad = BodyDescriptor::new(
            ShapeDescriptor::cuboid(Vec3::new(1.0, 0.0, 1.0)),
            Vec3::ZERO,
            1.0,
        );
        assert!(matches!(
            world.add_body(&bad),
            Err(PhysicsError::InvalidShape(_))
        ));
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.rapier_body_count(), 0);
        assert_eq!(world.collider_count(), 1);
    }

    #[test]
    fn dynamic_body_falls() {
        let mut world = RapierWorld::default();
        let handle = world.add_body(&ball_at(5.0)).unwrap();
        let (before, _) = world.transform(handle).unwrap();
        assert_eq!(world.step(DT, 3).unwrap(), 1);
        let (after, _) = world.transform(handle).unwrap();
        assert!(after.y < before.y);
    }

    #[test]
    fn static_body_stays_put() {
        let mut world = RapierWorld::default();
        let handle = world
            .add_body(&BodyDescriptor::new(
                ShapeDescriptor::sphere(0.5),
                Vec3::new(0.0, 5.0, 0.0),
                0.0,
            ))
            .unwrap();
        for _ in 0..10 {
            world.step(DT, 3).unwrap();
        }
        let (position, _) = world.transform(handle).unwrap();
        assert_eq!(position, Vec3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn step_catches_up_to_max_sub_steps() {
        let mut world = RapierWorld::default();
        world.add_body(&ball_at(5.0)).unwrap();
        assert_eq!(world.step(DT * 2.5, 3).unwrap(), 2);
        assert_eq!(world.step(DT * 10.0, 3).unwrap(), 3);
        assert!(world.accumulator() < DT);
        assert_eq!(world.sub_step_count(), 5);
    }

    #[test]
    fn short_frame_takes_no_sub_step() {
        let mut world = RapierWorld::default();
        assert_eq!(world.step(DT * 0.5, 3).unwrap(), 0);
        assert_eq!(world.sub_step_count(), 0);
    }

    #[test]
    fn rejects_bad_time_steps() {
        let mut world = RapierWorld::default();
        assert_eq!(
            world.step(-1.0, 3),
            Err(PhysicsError::InvalidTimeStep(-1.0))
        );
        assert!(world.step(f32::NAN, 3).is_err());
    }

    #[test]
    fn sleep_and_wake() {
        let mut world = RapierWorld::default();
        let handle = world.add_body(&ball_at(5.0)).unwrap();
        assert!(world.set_sleeping(handle, true));
        assert_eq!(world.sleep_state(handle), Some(SleepState::Sleeping));
        assert!(world.set_sleeping(handle, false));
        assert_ne!(world.sleep_state(handle), Some(SleepState::Sleeping));
    }

    #[test]
    fn body_at_rest_is_sleepy_and_fast_body_is_awake() {
        let mut world = RapierWorld::default();
        let handle = world.add_body(&ball_at(5.0)).unwrap();
        assert_eq!(world.sleep_state(handle), Some(SleepState::Sleepy));
        world.apply_impulse(handle, Vec3::new(0.0, 0.0, -10.0));
        world.step(DT, 3).unwrap();
        assert_eq!(world.sleep_state(handle), Some(SleepState::Awake));
    }

    #[test]
    fn impulse_pushes_body() {
        let mut world = RapierWorld::default();
        let handle = world.add_body(&ball_at(5.0)).unwrap();
        assert!(world.apply_impulse(handle, Vec3::new(0.0, 0.0, -10.0)));
        world.step(DT, 3).unwrap();
        let (position, _) = world.transform(handle).unwrap();
        assert!(position.z < 0.0);
    }

    #[test]
    fn non_finite_position_leaves_world_untouched() {
        let mut world = RapierWorld::default();
        assert!(matches!(
            world.add_body(&ball_at(f32::NAN)),
            Err(PhysicsError::InvalidPosition(_))
        ));
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.rapier_body_count(), 0);
        assert_eq!(world.collider_count(), 1);
    }

    #[test]
    fn non_finite_impulse_is_refused() {
        let mut world = RapierWorld::default();
        let handle = world.add_body(&ball_at(5.0)).unwrap();
        assert!(!world.apply_impulse(handle, Vec3::new(0.0, 0.0, f32::NAN)));
        assert!(!world.apply_impulse(handle, Vec3::new(f32::INFINITY, 0.0, 0.0)));
        assert_eq!(world.step(DT, 3).unwrap(), 1);
        let (position, _) = world.transform(handle).unwrap();
        assert!(position.is_finite());
        assert_eq!(position.z, 0.0);
    }

    #[test]
    fn reports_descriptor_mass() {
        let mut world = RapierWorld::default();
        let handle = world
            .add_body(&BodyDescriptor::new(
                ShapeDescriptor::cuboid(Vec3::ONE),
                Vec3::new(0.0, 2.0, 0.0),
                2.0,
            ))
            .unwrap();
        assert_eq!(world.mass(handle), Some(2.0));
    }

    #[test]
    fn interpolation_lags_behind_latest_sub_step() {
        let mut raw = RapierWorld::default();
        let mut smooth = RapierWorld::new(WorldConfig {
            interpolate: true,
            ..WorldConfig::default()
        });
        let a = raw.add_body(&ball_at(5.0)).unwrap();
        let b = smooth.add_body(&ball_at(5.0)).unwrap();

        raw.step(DT * 1.5, 3).unwrap();
        smooth.step(DT * 1.5, 3).unwrap();

        let (latest, _) = raw.transform(a).unwrap();
        let (blended, _) = smooth.transform(b).unwrap();
        assert!(blended.y > latest.y);
        assert!(blended.y < 5.0);
    }
}

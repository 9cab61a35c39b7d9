use glam::Vec3;
use rubble_common::ObjectId;
use rubble_physics::{PhysicsEngine, RapierWorld, WorldConfig};
use rubble_render::{RenderEngine, Scene};
use serde::{Deserialize, Serialize};

use crate::assets::DefaultAssets;
use crate::error::SimError;
use crate::factory::{BoxParams, ObjectFactory, SphereParams};
use crate::paired::PairedObject;
use crate::params::DemoParameters;
use crate::structure::{StructureGenerator, StructureParams};

/// Registry-level tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Upper bound on physics sub-steps per frame.
    pub max_sub_steps: u32,
    /// Tint proxies by sleep state on every sync.
    pub show_sleep_state: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_sub_steps: 3,
            show_sleep_state: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    Empty,
    Populated,
}

/// Sole owner of the physics world, the scene and every paired object.
///
/// Objects are kept in creation order. The registry is the only way to create
/// or destroy objects, which keeps the body count equal to the object count.
/// Populating a non-empty registry resets it first.
pub struct SimulationRegistry<P: PhysicsEngine = RapierWorld, R: RenderEngine = Scene> {
    physics: P,
    scene: R,
    factory: ObjectFactory,
    objects: Vec<PairedObject>,
    config: RegistryConfig,
    structure: Option<StructureParams>,
    frame: u64,
    sub_steps: u64,
}

impl SimulationRegistry {
    /// Registry over a rapier world and a headless scene.
    pub fn with_world(world: WorldConfig, config: RegistryConfig) -> Self {
        Self::new(
            RapierWorld::new(world),
            Scene::new(),
            DefaultAssets::default(),
            config,
        )
    }
}

impl Default for SimulationRegistry {
    fn default() -> Self {
        Self::with_world(WorldConfig::default(), RegistryConfig::default())
    }
}

impl<P: PhysicsEngine, R: RenderEngine> SimulationRegistry<P, R> {
    pub fn new(physics: P, scene: R, assets: DefaultAssets, config: RegistryConfig) -> Self {
        Self {
            physics,
            scene,
            factory: ObjectFactory::new(assets),
            objects: Vec::new(),
            config,
            structure: None,
            frame: 0,
            sub_steps: 0,
        }
    }

    pub fn state(&self) -> RegistryState {
        if self.objects.is_empty() {
            RegistryState::Empty
        } else {
            RegistryState::Populated
        }
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    /// The scene the render engine draws from.
    pub fn scene(&self) -> &R {
        &self.scene
    }

    pub fn factory(&self) -> &ObjectFactory {
        &self.factory
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Objects in creation order.
    pub fn objects(&self) -> &[PairedObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&PairedObject> {
        self.objects.iter().find(|object| object.id() == id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Frames stepped so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Physics sub-steps run so far.
    pub fn sub_steps(&self) -> u64 {
        self.sub_steps
    }

    pub fn show_sleep_state(&self) -> bool {
        self.config.show_sleep_state
    }

    /// Takes effect on the next sync.
    pub fn set_show_sleep_state(&mut self, show: bool) {
        self.config.show_sleep_state = show;
    }

    /// Height of the current wall, or zero if none was populated since the
    /// last reset.
    pub fn structure_height(&self) -> f32 {
        self.structure.map(|s| s.height()).unwrap_or(0.0)
    }

    pub fn spawn_sphere(&mut self, params: &SphereParams) -> Result<ObjectId, SimError> {
        let object = self
            .factory
            .create_sphere(&mut self.physics, &mut self.scene, params)?;
        Ok(self.register(object))
    }

    pub fn spawn_box(&mut self, params: &BoxParams) -> Result<ObjectId, SimError> {
        let object = self
            .factory
            .create_box(&mut self.physics, &mut self.scene, params)?;
        Ok(self.register(object))
    }

    fn register(&mut self, object: PairedObject) -> ObjectId {
        let id = object.id();
        self.objects.push(object);
        id
    }

    pub fn apply_impulse(&mut self, id: ObjectId, impulse: Vec3) -> Result<(), SimError> {
        if !impulse.is_finite() {
            return Err(SimError::InvalidImpulse(impulse));
        }
        let body = self
            .object(id)
            .map(PairedObject::body)
            .ok_or(SimError::MissingBody(id))?;
        if self.physics.apply_impulse(body, impulse) {
            Ok(())
        } else {
            Err(SimError::MissingBody(id))
        }
    }

    /// Destroy every object.
    pub fn reset(&mut self) {
        let count = self.objects.len();
        for mut object in self.objects.drain(..) {
            object.destroy(&mut self.physics, &mut self.scene);
        }
        self.structure = None;
        if count > 0 {
            tracing::info!(count, "registry reset");
        }
    }

    /// Build a wall. A non-empty registry is reset first; invalid parameters
    /// are rejected before anything is destroyed.
    pub fn populate(&mut self, params: &StructureParams) -> Result<usize, SimError> {
        let _span =
            tracing::info_span!("populate", rows = params.rows, columns = params.columns).entered();
        params.validate()?;
        if !self.objects.is_empty() {
            tracing::debug!(objects = self.objects.len(), "populate on non-empty registry, resetting");
            self.reset();
        }

        let bricks =
            StructureGenerator::build(&self.factory, &mut self.physics, &mut self.scene, params)?;
        let count = bricks.len();
        self.objects.extend(bricks);
        self.structure = Some(*params);
        tracing::info!(count, "structure populated");
        Ok(count)
    }

    /// Rebuild the wall from the current demo parameters.
    pub fn regenerate(&mut self, params: &DemoParameters) -> Result<usize, SimError> {
        self.populate(&params.structure_params())
    }

    /// Advance physics by `real_dt` seconds of wall time, then sync every
    /// object. Does nothing on an empty registry.
    ///
    /// Errors here are fatal for the frame loop (see [`SimError::is_fatal`]).
    pub fn step(&mut self, real_dt: f32) -> Result<u32, SimError> {
        let _span = tracing::trace_span!("step", frame = self.frame).entered();
        self.frame += 1;
        if self.objects.is_empty() {
            return Ok(0);
        }

        let taken = self
            .physics
            .step(real_dt, self.config.max_sub_steps)
            .inspect_err(|err| tracing::error!(%err, "physics step failed"))?;
        self.sub_steps += u64::from(taken);
        self.sync_all()?;
        tracing::trace!(taken, objects = self.objects.len(), "frame stepped");
        Ok(taken)
    }

    /// Copy every body's pose onto its proxy, in creation order.
    pub fn sync_all(&mut self) -> Result<(), SimError> {
        let sleep_debug = self
            .config
            .show_sleep_state
            .then_some(self.factory.assets());
        for object in &self.objects {
            object.sync(&self.physics, &mut self.scene, sleep_debug)?;
        }
        Ok(())
    }
}

impl<P: PhysicsEngine, R: RenderEngine> Drop for SimulationRegistry<P, R> {
    fn drop(&mut self) {
        // Bodies leave the world before the world itself goes away.
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use glam::Quat;
    use rubble_common::BodyHandle;
    use rubble_physics::{BodyDescriptor, PhysicsError, SleepState};

    const DT: f32 = 1.0 / 60.0;

    fn assert_paired(registry: &SimulationRegistry) {
        assert_eq!(registry.physics().body_count(), registry.len());
        assert_eq!(registry.physics().rapier_body_count(), registry.len());
        assert_eq!(registry.scene().proxy_count(), registry.len());
    }

    fn wall_3x3() -> StructureParams {
        StructureParams {
            rows: 3,
            columns: 3,
            brick_size: Vec3::ONE,
            origin: Vec3::ZERO,
            brick_mass: 2.0,
        }
    }

    #[test]
    fn registry_starts_empty() {
        let registry = SimulationRegistry::default();
        assert_eq!(registry.state(), RegistryState::Empty);
        assert_paired(&registry);
    }

    #[test]
    fn populate_builds_sleeping_bricks_of_given_mass() {
        let mut registry = SimulationRegistry::default();
        assert_eq!(registry.populate(&wall_3x3()).unwrap(), 9);
        assert_eq!(registry.state(), RegistryState::Populated);
        assert_eq!(registry.len(), 9);
        for object in registry.objects() {
            assert_eq!(registry.physics().mass(object.body()), Some(2.0));
            assert_eq!(
                registry.physics().sleep_state(object.body()),
                Some(SleepState::Sleeping)
            );
        }
        assert_paired(&registry);
    }

    #[test]
    fn populate_twice_auto_resets() {
        let mut registry = SimulationRegistry::default();
        registry.populate(&wall_3x3()).unwrap();
        registry.populate(&wall_3x3()).unwrap();
        assert_eq!(registry.len(), 9);
        assert_paired(&registry);
    }

    #[test]
    fn invalid_populate_keeps_existing_wall() {
        let mut registry = SimulationRegistry::default();
        registry.populate(&wall_3x3()).unwrap();
        let bad = StructureParams {
            brick_size: Vec3::new(0.0, 1.0, 1.0),
            ..wall_3x3()
        };
        assert!(registry.populate(&bad).is_err());
        assert_eq!(registry.len(), 9);
        assert_paired(&registry);
    }

    #[test]
    fn reset_clears_everything() {
        let mut registry = SimulationRegistry::default();
        registry.populate(&wall_3x3()).unwrap();
        registry.spawn_sphere(&SphereParams::default()).unwrap();
        registry.reset();
        assert_eq!(registry.len(), 0);
        assert_eq!(registry.physics().body_count(), 0);
        assert_eq!(registry.physics().rapier_body_count(), 0);
        assert_eq!(registry.scene().proxy_count(), 0);
        assert_eq!(registry.state(), RegistryState::Empty);
        assert_eq!(registry.structure_height(), 0.0);
    }

    #[test]
    fn step_syncs_falling_object() {
        let mut registry = SimulationRegistry::default();
        let id = registry
            .spawn_sphere(&SphereParams {
                position: Vec3::new(0.0, 5.0, 0.0),
                ..SphereParams::default()
            })
            .unwrap();
        let proxy = registry.object(id).unwrap().proxy();
        let before = registry.scene().proxy(proxy).unwrap().transform.position.y;

        assert_eq!(registry.step(DT).unwrap(), 1);

        let after = registry.scene().proxy(proxy).unwrap().transform.position.y;
        assert!(after < before);
    }

    #[test]
    fn step_on_empty_registry_is_noop() {
        let mut registry = SimulationRegistry::default();
        assert_eq!(registry.step(DT).unwrap(), 0);
        assert_eq!(registry.sub_steps(), 0);
        assert_eq!(registry.physics().sub_step_count(), 0);
        assert_eq!(registry.frame(), 1);
    }

    #[test]
    fn step_counts_sub_steps() {
        let mut registry = SimulationRegistry::default();
        registry.spawn_box(&BoxParams {
            position: Vec3::new(0.0, 3.0, 0.0),
            ..BoxParams::default()
        })
        .unwrap();
        registry.step(DT * 2.0).unwrap();
        registry.step(DT * 10.0).unwrap();
        assert_eq!(registry.sub_steps(), 5);
        assert_eq!(registry.frame(), 2);
    }

    #[test]
    fn pairing_holds_across_operations() {
        let mut registry = SimulationRegistry::default();
        registry.populate(&wall_3x3()).unwrap();
        assert_paired(&registry);
        registry.spawn_sphere(&SphereParams {
            position: Vec3::new(0.0, 2.0, 4.0),
            ..SphereParams::default()
        })
        .unwrap();
        assert_paired(&registry);
        for _ in 0..5 {
            registry.step(DT).unwrap();
            assert_paired(&registry);
        }
        registry.populate(&wall_3x3()).unwrap();
        assert_paired(&registry);
        registry.reset();
        assert_paired(&registry);
    }

    #[test]
    fn sleep_debug_tints_bricks() {
        let mut registry = SimulationRegistry::default();
        registry.populate(&wall_3x3()).unwrap();
        registry.set_show_sleep_state(true);
        registry.sync_all().unwrap();

        let sleeping = registry.factory().assets().sleeping_material;
        for object in registry.objects() {
            let proxy = registry.scene().proxy(object.proxy()).unwrap();
            assert_eq!(proxy.material, sleeping);
        }

        registry.set_show_sleep_state(false);
        registry.sync_all().unwrap();
        let default = registry.factory().assets().default_material;
        for object in registry.objects() {
            assert_eq!(
                registry.scene().proxy(object.proxy()).unwrap().material,
                default
            );
        }
    }

    #[test]
    fn apply_impulse_to_unknown_object_fails() {
        let mut registry = SimulationRegistry::default();
        assert!(matches!(
            registry.apply_impulse(ObjectId::new(), Vec3::X),
            Err(SimError::MissingBody(_))
        ));
    }

    #[test]
    fn spawn_at_non_finite_position_creates_nothing() {
        let mut registry = SimulationRegistry::default();
        let result = registry.spawn_sphere(&SphereParams {
            position: Vec3::new(0.0, f32::NAN, 0.0),
            ..SphereParams::default()
        });
        assert!(matches!(result, Err(SimError::InvalidPosition(_))));
        assert!(registry.is_empty());
        assert_eq!(registry.physics().body_count(), 0);
        assert_paired(&registry);
    }

    #[test]
    fn non_finite_impulse_is_rejected() {
        let mut registry = SimulationRegistry::default();
        let id = registry
            .spawn_sphere(&SphereParams {
                position: Vec3::new(0.0, 5.0, 0.0),
                ..SphereParams::default()
            })
            .unwrap();
        assert!(matches!(
            registry.apply_impulse(id, Vec3::new(f32::NAN, 0.0, 0.0)),
            Err(SimError::InvalidImpulse(_))
        ));
        assert_eq!(registry.step(DT).unwrap(), 1);
    }

    #[test]
    fn regenerate_uses_demo_parameters() {
        let mut registry = SimulationRegistry::default();
        let params = DemoParameters {
            wall_rows: 3,
            wall_row_size: 4,
            ..DemoParameters::default()
        };
        assert_eq!(registry.regenerate(&params).unwrap(), 12);
        assert_eq!(registry.structure_height(), 1.5);
        assert_paired(&registry);
    }

    /// Physics double whose step always blows up.
    #[derive(Default)]
    struct ExplodingPhysics {
        bodies: Vec<BodyHandle>,
        next: u64,
        removed: Rc<Cell<usize>>,
    }

    impl PhysicsEngine for ExplodingPhysics {
        fn add_body(&mut self, descriptor: &BodyDescriptor) -> Result<BodyHandle, PhysicsError> {
            descriptor.validate()?;
            let handle = BodyHandle(self.next);
            self.next += 1;
            self.bodies.push(handle);
            Ok(handle)
        }

        fn remove_body(&mut self, handle: BodyHandle) -> bool {
            let before = self.bodies.len();
            self.bodies.retain(|h| *h != handle);
            let removed = self.bodies.len() != before;
            if removed {
                self.removed.set(self.removed.get() + 1);
            }
            removed
        }

        fn step(&mut self, _real_dt: f32, _max_sub_steps: u32) -> Result<u32, PhysicsError> {
            Err(PhysicsError::NonFiniteTransform(self.bodies[0]))
        }

        fn transform(&self, _handle: BodyHandle) -> Option<(Vec3, Quat)> {
            Some((Vec3::NAN, Quat::IDENTITY))
        }

        fn apply_impulse(&mut self, _handle: BodyHandle, _impulse: Vec3) -> bool {
            true
        }

        fn set_sleeping(&mut self, _handle: BodyHandle, _sleeping: bool) -> bool {
            true
        }

        fn sleep_state(&self, _handle: BodyHandle) -> Option<SleepState> {
            Some(SleepState::Awake)
        }

        fn mass(&self, _handle: BodyHandle) -> Option<f32> {
            Some(1.0)
        }

        fn body_count(&self) -> usize {
            self.bodies.len()
        }
    }

    #[test]
    fn physics_blow_up_is_fatal_and_skips_sync() {
        let mut registry = SimulationRegistry::new(
            ExplodingPhysics::default(),
            Scene::new(),
            DefaultAssets::default(),
            RegistryConfig::default(),
        );
        let id = registry.spawn_sphere(&SphereParams::default()).unwrap();
        let proxy = registry.object(id).unwrap().proxy();

        let err = registry.step(DT).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(
            err,
            SimError::Physics(PhysicsError::NonFiniteTransform(_))
        ));
        // The corrupted pose never reached the scene.
        assert_eq!(
            registry.scene().proxy(proxy).unwrap().transform.position,
            Vec3::ZERO
        );
    }

    #[test]
    fn dropping_registry_removes_every_body() {
        let physics = ExplodingPhysics::default();
        let removed = Rc::clone(&physics.removed);
        let mut registry = SimulationRegistry::new(
            physics,
            Scene::new(),
            DefaultAssets::default(),
            RegistryConfig::default(),
        );
        registry.spawn_box(&BoxParams::default()).unwrap();
        registry.spawn_sphere(&SphereParams::default()).unwrap();
        drop(registry);
        assert_eq!(removed.get(), 2);
    }
}

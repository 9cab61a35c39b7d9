use rubble_common::{ObjectId, ShapeDescriptor};
use rubble_physics::{PhysicsEngine, SleepState};
use rubble_render::RenderEngine;
use rubble_sim::SimulationRegistry;

/// Registry inspector for developer tooling.
///
/// Read-only queries against the registry, its physics world and its scene,
/// for logs and debug overlays.
pub struct RegistryInspector;

impl RegistryInspector {
    /// Produce a summary of the registry state.
    pub fn summary<P: PhysicsEngine, R: RenderEngine>(
        registry: &SimulationRegistry<P, R>,
    ) -> RegistrySummary {
        let mut summary = RegistrySummary {
            frame: registry.frame(),
            sub_steps: registry.sub_steps(),
            objects: registry.len(),
            bodies: registry.physics().body_count(),
            proxies: registry.scene().proxy_count(),
            awake: 0,
            sleepy: 0,
            sleeping: 0,
        };
        for object in registry.objects() {
            match registry.physics().sleep_state(object.body()) {
                Some(SleepState::Awake) => summary.awake += 1,
                Some(SleepState::Sleepy) => summary.sleepy += 1,
                Some(SleepState::Sleeping) => summary.sleeping += 1,
                None => {}
            }
        }
        summary
    }

    /// Body and proxy details of one object.
    pub fn inspect_object<P: PhysicsEngine, R: RenderEngine>(
        registry: &SimulationRegistry<P, R>,
        id: ObjectId,
    ) -> Option<ObjectInfo> {
        let object = registry.object(id)?;
        let physics = registry.physics();
        let (position, rotation) = physics.transform(object.body())?;
        let proxy = registry.scene().proxy(object.proxy())?;
        let s = proxy.transform.scale;
        Some(ObjectInfo {
            id,
            shape: *object.shape(),
            position: position.to_array(),
            rotation: rotation.to_array(),
            scale: [s.x, s.y, s.z],
            mass: physics.mass(object.body()).unwrap_or(0.0),
            sleep_state: physics.sleep_state(object.body()),
            material: proxy.material.0,
        })
    }

    /// All object IDs, in creation order.
    pub fn list_objects<P: PhysicsEngine, R: RenderEngine>(
        registry: &SimulationRegistry<P, R>,
    ) -> Vec<ObjectId> {
        registry.objects().iter().map(|object| object.id()).collect()
    }
}

/// Summary of registry state for the inspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrySummary {
    pub frame: u64,
    pub sub_steps: u64,
    pub objects: usize,
    pub bodies: usize,
    pub proxies: usize,
    pub awake: usize,
    pub sleepy: usize,
    pub sleeping: usize,
}

impl RegistrySummary {
    /// Whether bodies, proxies and objects all agree.
    pub fn is_paired(&self) -> bool {
        self.bodies == self.objects && self.proxies == self.objects
    }
}

impl std::fmt::Display for RegistrySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Registry: frame={} sub_steps={} objects={} bodies={} proxies={} awake={} sleepy={} sleeping={}",
            self.frame,
            self.sub_steps,
            self.objects,
            self.bodies,
            self.proxies,
            self.awake,
            self.sleepy,
            self.sleeping
        )
    }
}

/// Detailed info about a single paired object.
#[derive(Debug, Clone)]
pub struct ObjectInfo {
    pub id: ObjectId,
    pub shape: ShapeDescriptor,
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
    pub mass: f32,
    pub sleep_state: Option<SleepState>,
    pub material: u64,
}

impl std::fmt::Display for ObjectInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.shape {
            ShapeDescriptor::Sphere { .. } => "sphere",
            ShapeDescriptor::Box { .. } => "box",
        };
        write!(
            f,
            "Object [{}] {kind} pos=({:.2}, {:.2}, {:.2}) scale=({:.2}, {:.2}, {:.2}) mass={:.2} sleep={:?} mat={}",
            self.id.short(),
            self.position[0],
            self.position[1],
            self.position[2],
            self.scale[0],
            self.scale[1],
            self.scale[2],
            self.mass,
            self.sleep_state,
            self.material,
        )
    }
}

use glam::{Quat, Vec3};
use rubble_common::{BodyHandle, ObjectId, ProxyId, ShapeDescriptor, Transform};
use rubble_physics::{BodyDescriptor, PhysicsEngine, SleepState};
use rubble_render::{MaterialHandle, MeshHandle, RenderEngine, RenderProxy};

use crate::assets::DefaultAssets;
use crate::error::SimError;

/// Fully resolved description of one object to create.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectSpec {
    pub shape: ShapeDescriptor,
    pub position: Vec3,
    /// Zero makes the object static.
    pub mass: f32,
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
}

/// One rigid body and the render proxy that mirrors it.
///
/// Both sides are allocated in [`PairedObject::create`] and released in
/// [`PairedObject::destroy`]; neither is ever released on its own.
#[derive(Debug)]
pub struct PairedObject {
    id: ObjectId,
    body: BodyHandle,
    proxy: ProxyId,
    shape: ShapeDescriptor,
    /// Material restored when sleep debugging is turned off.
    material: MaterialHandle,
    destroyed: bool,
}

impl PairedObject {
    /// Insert a body into `physics` and attach a matching proxy to `scene`.
    ///
    /// `spec` is checked before either side is touched, so an error never
    /// leaves half an object behind.
    pub fn create(
        physics: &mut impl PhysicsEngine,
        scene: &mut impl RenderEngine,
        spec: &ObjectSpec,
    ) -> Result<Self, SimError> {
        spec.shape.validate()?;
        if !spec.mass.is_finite() || spec.mass < 0.0 {
            return Err(SimError::InvalidMass(spec.mass));
        }
        if !spec.position.is_finite() {
            return Err(SimError::InvalidPosition(spec.position));
        }

        let body = physics.add_body(&BodyDescriptor::new(spec.shape, spec.position, spec.mass))?;
        let proxy = scene.attach(RenderProxy {
            mesh: spec.mesh,
            material: spec.material,
            transform: Transform {
                position: spec.position,
                rotation: Quat::IDENTITY,
                scale: spec.shape.render_scale(),
            },
        });

        let object = Self {
            id: ObjectId::new(),
            body,
            proxy,
            shape: spec.shape,
            material: spec.material,
            destroyed: false,
        };
        tracing::debug!(id = %object.id.short(), ?body, ?proxy, "paired object created");
        Ok(object)
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn proxy(&self) -> ProxyId {
        self.proxy
    }

    pub fn shape(&self) -> &ShapeDescriptor {
        &self.shape
    }

    pub fn material(&self) -> MaterialHandle {
        self.material
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Copy the body's pose onto the proxy. Call only after the physics step.
    ///
    /// With `sleep_debug` set, sleepy and sleeping bodies are tinted from the
    /// debug palette; awake bodies, and every body once it is unset, show the
    /// object's own material.
    pub fn sync(
        &self,
        physics: &impl PhysicsEngine,
        scene: &mut impl RenderEngine,
        sleep_debug: Option<&DefaultAssets>,
    ) -> Result<(), SimError> {
        if self.destroyed {
            return Ok(());
        }

        let (position, rotation) = physics
            .transform(self.body)
            .ok_or(SimError::MissingBody(self.id))?;
        if !scene.set_transform(self.proxy, position, rotation) {
            return Err(SimError::MissingProxy(self.id));
        }

        let wanted = match sleep_debug {
            Some(assets) => physics.sleep_state(self.body).map(|state| match state {
                SleepState::Awake => self.material,
                _ => assets.sleep_material(state),
            }),
            None => Some(self.material),
        };
        let current = scene.proxy(self.proxy).map(|proxy| proxy.material);
        if let Some(material) = wanted.filter(|material| current != Some(*material)) {
            scene.set_material(self.proxy, material);
        }
        Ok(())
    }

    /// Remove the body and detach the proxy. Returns false if already destroyed.
    pub fn destroy(
        &mut self,
        physics: &mut impl PhysicsEngine,
        scene: &mut impl RenderEngine,
    ) -> bool {
        if self.destroyed {
            return false;
        }
        physics.remove_body(self.body);
        scene.detach(self.proxy);
        self.destroyed = true;
        tracing::debug!(id = %self.id.short(), "paired object destroyed");
        true
    }
}

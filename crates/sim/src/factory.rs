use glam::Vec3;
use rubble_common::ShapeDescriptor;
use rubble_physics::PhysicsEngine;
use rubble_render::{MaterialHandle, MeshHandle, RenderEngine};

use crate::assets::DefaultAssets;
use crate::error::SimError;
use crate::paired::{ObjectSpec, PairedObject};

/// Parameters for a sphere. `None` overrides fall back to the shared assets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereParams {
    pub radius: f32,
    pub position: Vec3,
    pub mass: f32,
    pub mesh: Option<MeshHandle>,
    pub material: Option<MaterialHandle>,
}

impl Default for SphereParams {
    fn default() -> Self {
        Self {
            radius: 0.5,
            position: Vec3::ZERO,
            mass: 1.0,
            mesh: None,
            material: None,
        }
    }
}

/// Parameters for a box, given as full width/height/depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxParams {
    pub size: Vec3,
    pub position: Vec3,
    pub mass: f32,
    pub mesh: Option<MeshHandle>,
    pub material: Option<MaterialHandle>,
}

impl Default for BoxParams {
    fn default() -> Self {
        Self {
            size: Vec3::ONE,
            position: Vec3::ZERO,
            mass: 1.0,
            mesh: None,
            material: None,
        }
    }
}

/// Builds paired objects from high-level parameters, filling gaps from the
/// shared default meshes and materials.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectFactory {
    assets: DefaultAssets,
}

impl ObjectFactory {
    pub fn new(assets: DefaultAssets) -> Self {
        Self { assets }
    }

    pub fn assets(&self) -> &DefaultAssets {
        &self.assets
    }

    pub fn sphere_spec(&self, params: &SphereParams) -> ObjectSpec {
        self.spec(
            ShapeDescriptor::sphere(params.radius),
            params.position,
            params.mass,
            params.mesh,
            params.material,
        )
    }

    pub fn box_spec(&self, params: &BoxParams) -> ObjectSpec {
        self.spec(
            ShapeDescriptor::cuboid(params.size),
            params.position,
            params.mass,
            params.mesh,
            params.material,
        )
    }

    fn spec(
        &self,
        shape: ShapeDescriptor,
        position: Vec3,
        mass: f32,
        mesh: Option<MeshHandle>,
        material: Option<MaterialHandle>,
    ) -> ObjectSpec {
        ObjectSpec {
            shape,
            position,
            mass,
            mesh: mesh.unwrap_or_else(|| self.assets.unit_mesh(&shape)),
            material: material.unwrap_or(self.assets.default_material),
        }
    }

    pub fn create_sphere(
        &self,
        physics: &mut impl PhysicsEngine,
        scene: &mut impl RenderEngine,
        params: &SphereParams,
    ) -> Result<PairedObject, SimError> {
        PairedObject::create(physics, scene, &self.sphere_spec(params))
    }

    pub fn create_box(
        &self,
        physics: &mut impl PhysicsEngine,
        scene: &mut impl RenderEngine,
        params: &BoxParams,
    ) -> Result<PairedObject, SimError> {
        PairedObject::create(physics, scene, &self.box_spec(params))
    }
}

use rubble_common::ShapeDescriptor;
use rubble_physics::SleepState;
use rubble_render::{MaterialHandle, MeshHandle};

/// Meshes and materials shared by every object the factory builds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultAssets {
    /// Unit-radius sphere.
    pub sphere_mesh: MeshHandle,
    /// 1x1x1 box.
    pub box_mesh: MeshHandle,
    pub default_material: MaterialHandle,
    /// Red, shown for sleepy bodies when sleep debugging is on.
    pub sleepy_material: MaterialHandle,
    /// Blue, shown for sleeping bodies when sleep debugging is on.
    pub sleeping_material: MaterialHandle,
    pub projectile_material: MaterialHandle,
}

impl Default for DefaultAssets {
    fn default() -> Self {
        Self {
            sphere_mesh: MeshHandle(0),
            box_mesh: MeshHandle(1),
            default_material: MaterialHandle(0),
            sleepy_material: MaterialHandle(1),
            sleeping_material: MaterialHandle(2),
            projectile_material: MaterialHandle(3),
        }
    }
}

impl DefaultAssets {
    pub fn unit_mesh(&self, shape: &ShapeDescriptor) -> MeshHandle {
        match shape {
            ShapeDescriptor::Sphere { .. } => self.sphere_mesh,
            ShapeDescriptor::Box { .. } => self.box_mesh,
        }
    }

    pub fn sleep_material(&self, state: SleepState) -> MaterialHandle {
        match state {
            SleepState::Awake => self.default_material,
            SleepState::Sleepy => self.sleepy_material,
            SleepState::Sleeping => self.sleeping_material,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn mesh_follows_shape() {
        let assets = DefaultAssets::default();
        assert_eq!(
            assets.unit_mesh(&ShapeDescriptor::sphere(1.0)),
            assets.sphere_mesh
        );
        assert_eq!(
            assets.unit_mesh(&ShapeDescriptor::cuboid(Vec3::ONE)),
            assets.box_mesh
        );
    }

    #[test]
    fn sleep_palette_is_distinct() {
        let assets = DefaultAssets::default();
        let awake = assets.sleep_material(SleepState::Awake);
        let sleepy = assets.sleep_material(SleepState::Sleepy);
        let sleeping = assets.sleep_material(SleepState::Sleeping);
        assert_eq!(awake, assets.default_material);
        assert_ne!(awake, sleepy);
        assert_ne!(sleepy, sleeping);
    }
}

use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use rubble_common::{ProxyId, Transform};
use serde::{Deserialize, Serialize};

/// A handle referencing a mesh asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshHandle(pub u64);

/// A handle referencing a material asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialHandle(pub u64);

/// Renderable stand-in for one simulated object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderProxy {
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub transform: Transform,
}

/// Everything the synchronization layer may ask of a render engine.
pub trait RenderEngine {
    /// Add a proxy to the scene and return its id.
    fn attach(&mut self, proxy: RenderProxy) -> ProxyId;

    /// Remove a proxy. Returns `None` if it was already detached.
    fn detach(&mut self, id: ProxyId) -> Option<RenderProxy>;

    /// Move a proxy. Scale is left untouched.
    fn set_transform(&mut self, id: ProxyId, position: Vec3, rotation: Quat) -> bool;

    fn set_material(&mut self, id: ProxyId, material: MaterialHandle) -> bool;

    fn proxy(&self, id: ProxyId) -> Option<&RenderProxy>;

    fn proxy_count(&self) -> usize;
}

/// Headless scene: attached proxies keyed by id.
#[derive(Debug, Default)]
pub struct Scene {
    proxies: BTreeMap<ProxyId, RenderProxy>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attached proxies in id order.
    pub fn proxies(&self) -> impl Iterator<Item = (ProxyId, &RenderProxy)> {
        self.proxies.iter().map(|(id, proxy)| (*id, proxy))
    }
}

impl RenderEngine for Scene {
    fn attach(&mut self, proxy: RenderProxy) -> ProxyId {
        let id = ProxyId(self.next_id);
        self.next_id += 1;
        self.proxies.insert(id, proxy);
        id
    }

    fn detach(&mut self, id: ProxyId) -> Option<RenderProxy> {
        self.proxies.remove(&id)
    }

    fn set_transform(&mut self, id: ProxyId, position: Vec3, rotation: Quat) -> bool {
        match self.proxies.get_mut(&id) {
            Some(proxy) => {
                proxy.transform.position = position;
                proxy.transform.rotation = rotation;
                true
            }
            None => false,
        }
    }

    fn set_material(&mut self, id: ProxyId, material: MaterialHandle) -> bool {
        match self.proxies.get_mut(&id) {
            Some(proxy) => {
                proxy.material = material;
                true
            }
            None => false,
        }
    }

    fn proxy(&self, id: ProxyId) -> Option<&RenderProxy> {
        self.proxies.get(&id)
    }

    fn proxy_count(&self) -> usize {
        self.proxies.len()
    }
}

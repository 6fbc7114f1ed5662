//! Fixed-capacity instance pools for tendon rendering.

use std::sync::Arc;

use crate::data_structures::{geometry::Geometry, instance::Instance, material::PhongMaterial};

/// Capacity of every tendon pool. Never grown.
pub const TENDON_POOL_CAPACITY: usize = 1023;

/// One geometry drawn `count` times with per-instance transforms.
#[derive(Debug, Clone)]
pub struct InstancedPool {
    pub geometry: Arc<Geometry>,
    pub material: PhongMaterial,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    instances: Vec<Instance>,
    count: usize,
}

impl InstancedPool {
    pub fn new(geometry: Arc<Geometry>, material: PhongMaterial, capacity: usize) -> Self {
        Self {
            geometry,
            material,
            cast_shadow: true,
            receive_shadow: true,
            instances: vec![Instance::new(); capacity],
            count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.instances.len()
    }

    /// Number of instances currently drawn.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Clamped to the capacity.
    pub fn set_count(&mut self, count: usize) {
        self.count = count.min(self.capacity());
    }

    /// Write the transform of slot `index`. Returns `false` when the slot is
    /// beyond the capacity and nothing was written.
    pub fn set_instance(&mut self, index: usize, instance: Instance) -> bool {
        match self.instances.get_mut(index) {
            Some(slot) => {
                *slot = instance;
                true
            }
            None => false,
        }
    }

    pub fn instance(&self, index: usize) -> Option<&Instance> {
        self.instances.get(index)
    }

    /// The instances that are drawn.
    pub fn live(&self) -> &[Instance] {
        &self.instances[..self.count]
    }

    /// Every slot, drawn or not.
    pub fn slots(&self) -> &[Instance] {
        &self.instances
    }
}

/// Cylinder segments and sphere joints of all tendons.
#[derive(Debug, Clone)]
pub struct TendonPools {
    pub cylinders: InstancedPool,
    pub spheres: InstancedPool,
}

impl TendonPools {
    pub const COLOR: [f32; 3] = [0.8, 0.3, 0.3];

    pub fn new() -> Self {
        let material = PhongMaterial { color: Self::COLOR };
        Self {
            cylinders: InstancedPool::new(
                Arc::new(Geometry::cylinder(1.0, 1.0, 1.0, 32)),
                material,
                TENDON_POOL_CAPACITY,
            ),
            spheres: InstancedPool::new(
                Arc::new(Geometry::sphere(1.0, 10, 10)),
                material,
                TENDON_POOL_CAPACITY,
            ),
        }
    }
}

impl Default for TendonPools {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Vector3;

    use super::*;

    #[test]
    fn pools_start_empty_at_full_capacity() {
        let pools = TendonPools::new();
        assert_eq!(pools.cylinders.capacity(), 1023);
        assert_eq!(pools.spheres.capacity(), 1023);
        assert_eq!(pools.spheres.count(), 0);
        assert!(pools.spheres.live().is_empty());
        assert!(pools.cylinders.cast_shadow && pools.cylinders.receive_shadow);
    }

    #[test]
    fn writes_and_counts_are_clamped() {
        let mut pools = TendonPools::new();
        let moved = Instance::from(Vector3::new(1.0, 2.0, 3.0));
        assert!(pools.spheres.set_instance(1022, moved));
        assert!(!pools.spheres.set_instance(1023, moved));
        pools.spheres.set_count(5000);
        assert_eq!(pools.spheres.count(), 1023);
        assert_eq!(pools.spheres.live()[1022], moved);
    }
}

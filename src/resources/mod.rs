//! Loading scene files and creating GPU resources for a built scene.
//!
//! - `assets` fetches scene files and stages them into the virtual filesystem
//! - `mesh` uploads geometry
//! - `texture` provides the texture bind group layout
//!
//! [`GpuScene`] uploads every distinct geometry and texture of a
//! [`BuiltScene`] once and keeps one instance buffer for the mesh nodes and
//! one per tendon pool.

use std::{collections::HashMap, sync::Arc};

use wgpu::util::DeviceExt;

use crate::{
    builder::BuiltScene,
    data_structures::{
        geometry::Geometry,
        instance::{Instance, InstanceRaw},
        instanced::InstancedPool,
        scene_graph::{NodeId, NodeKind},
        texture::{GpuTexture, Texture},
    },
    resources::{mesh::GpuMesh, texture::texture_bind_group},
};

pub mod assets;
pub mod mesh;
pub mod texture;

/// One mesh or reflector node to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshDraw {
    pub node: NodeId,
    /// Key into [`GpuScene::meshes`].
    pub mesh: usize,
    /// Source texture id, if the node is textured.
    pub texture: Option<usize>,
    /// Slot in the node instance buffer.
    pub instance: u32,
}

#[derive(Debug)]
pub struct PoolBuffers {
    pub mesh: GpuMesh,
    pub instances: wgpu::Buffer,
    pub capacity: usize,
}

impl PoolBuffers {
    fn new(device: &wgpu::Device, pool: &InstancedPool, label: &str) -> Self {
        Self {
            mesh: GpuMesh::from_geometry(device, &pool.geometry),
            instances: device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: (pool.capacity() * std::mem::size_of::<InstanceRaw>()) as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
            capacity: pool.capacity(),
        }
    }

    fn write(&self, queue: &wgpu::Queue, pool: &InstancedPool) {
        let raw: Vec<InstanceRaw> = pool.live().iter().map(Instance::to_raw).collect();
        if !raw.is_empty() {
            queue.write_buffer(&self.instances, 0, bytemuck::cast_slice(&raw));
        }
    }
}

fn geometry_key(geometry: &Arc<Geometry>) -> usize {
    Arc::as_ptr(geometry) as usize
}

#[derive(Debug)]
pub struct GpuScene {
    /// Uploaded geometry keyed by the identity of its shared allocation.
    pub meshes: HashMap<usize, GpuMesh>,
    pub textures: HashMap<usize, (GpuTexture, wgpu::BindGroup)>,
    pub draws: Vec<MeshDraw>,
    pub node_instances: wgpu::Buffer,
    pub cylinders: PoolBuffers,
    pub spheres: PoolBuffers,
}

impl GpuScene {
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        scene: &BuiltScene,
    ) -> anyhow::Result<Self> {
        let mut meshes = HashMap::new();
        let mut textures = HashMap::new();
        let mut draws = Vec::new();

        for id in scene.graph.descendants(scene.root) {
            let Some(node) = scene.graph.get(id) else {
                continue;
            };
            let (geometry, texture): (&Arc<Geometry>, Option<&Arc<Texture>>) = match &node.kind {
                NodeKind::Mesh {
                    geometry, material, ..
                } => (geometry, material.map.as_ref()),
                NodeKind::Reflector(reflector) => (&reflector.geometry, reflector.texture.as_ref()),
                _ => continue,
            };

            let key = geometry_key(geometry);
            meshes
                .entry(key)
                .or_insert_with(|| GpuMesh::from_geometry(device, geometry));

            if let Some(texture) = texture {
                if !textures.contains_key(&texture.source) {
                    let label = format!("texture {}", texture.source);
                    let gpu = GpuTexture::from_texture(device, queue, texture, Some(&label))?;
                    let bind_group = texture_bind_group(device, layout, &gpu, &label);
                    textures.insert(texture.source, (gpu, bind_group));
                }
            }

            draws.push(MeshDraw {
                node: id,
                mesh: key,
                texture: texture.map(|t| t.source),
                instance: draws.len() as u32,
            });
        }

        let raw = node_instances(scene, &draws);
        let node_instances = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Node Instance Buffer"),
            contents: bytemuck::cast_slice(&raw),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        log::info!(
            "Uploaded {} meshes, {} textures for {} nodes",
            meshes.len(),
            textures.len(),
            draws.len()
        );

        let gpu = Self {
            meshes,
            textures,
            draws,
            node_instances,
            cylinders: PoolBuffers::new(device, &scene.tendons.cylinders, "Tendon Cylinder Instances"),
            spheres: PoolBuffers::new(device, &scene.tendons.spheres, "Tendon Sphere Instances"),
        };
        gpu.write_instances(queue, scene);
        Ok(gpu)
    }

    /// Push the current world transforms and pool instances to the GPU.
    pub fn write_instances(&self, queue: &wgpu::Queue, scene: &BuiltScene) {
        let raw = node_instances(scene, &self.draws);
        queue.write_buffer(&self.node_instances, 0, bytemuck::cast_slice(&raw));
        self.cylinders.write(queue, &scene.tendons.cylinders);
        self.spheres.write(queue, &scene.tendons.spheres);
    }
}

/// World transforms of the drawn nodes. Never empty so the buffer always
/// has a valid size.
fn node_instances(scene: &BuiltScene, draws: &[MeshDraw]) -> Vec<InstanceRaw> {
    let mut raw: Vec<InstanceRaw> = draws
        .iter()
        .map(|draw| {
            scene
                .graph
                .get_world_transform(draw.node)
                .unwrap_or_default()
                .to_raw()
        })
        .collect();
    if raw.is_empty() {
        raw.push(Instance::new().to_raw());
    }
    raw
}

//! Translation of a physics [`Model`] into a renderable scene.
//!
//! [`build_scene`] walks the flat geom arrays once, creating one group node
//! per body, one mesh (or reflector) node per visible geom, the model lights
//! and the two tendon pools. Everything ends up below a single root node so
//! a reload can drop the whole scene at once.

use std::{collections::HashMap, f32::consts::FRAC_PI_2, sync::Arc};

use cgmath::{Rad, Rotation3, Vector3};
use log::{debug, warn};

use crate::{
    data_structures::{
        geometry::Geometry,
        instance::Instance,
        instanced::TendonPools,
        light::Light,
        material::{Material, Surface},
        scene_graph::{Node, NodeId, NodeKind, PoolKind, Reflector, SceneGraph},
        texture::Texture,
    },
    physics::{GeomType, Model},
    swizzle,
};

pub const ROOT_NAME: &str = "MuJoCo Root";

/// Geoms in this render group and above are not shown.
pub const HIDDEN_GEOM_GROUP: i32 = 3;

pub const CAPSULE_CAP_SEGMENTS: u32 = 20;
pub const CAPSULE_RADIAL_SEGMENTS: u32 = 20;
pub const CYLINDER_RADIAL_SEGMENTS: u32 = 32;
pub const SPHERE_WIDTH_SEGMENTS: u32 = 32;
pub const SPHERE_HEIGHT_SEGMENTS: u32 = 16;
pub const PLANE_SIZE: f32 = 100.0;
pub const REFLECTOR_CLIP_BIAS: f32 = 0.003;

/// Everything produced for one loaded model.
#[derive(Debug, Clone)]
pub struct BuiltScene {
    pub graph: SceneGraph,
    pub root: NodeId,
    /// Node of each body id. `None` only for body 0 when it owns no geoms,
    /// in which case `root` takes its place.
    pub bodies: Vec<Option<NodeId>>,
    /// Reconstructed mesh geometry by mesh id.
    pub meshes: HashMap<usize, Arc<Geometry>>,
    /// Materials in allocation order. The first entry is the initial opaque
    /// white material.
    pub materials: Vec<Arc<Material>>,
    pub lights: Vec<Light>,
    pub tendons: TendonPools,
    pub cylinders: NodeId,
    pub spheres: NodeId,
}

impl BuiltScene {
    pub fn body_node(&self, body: usize) -> Option<NodeId> {
        self.bodies.get(body).copied().flatten()
    }

    /// The node bodies and lights hang from: body 0 if it has a node,
    /// otherwise the root.
    pub fn anchor(&self) -> NodeId {
        self.body_node(0).unwrap_or(self.root)
    }

    /// Recompute all world transforms below the root.
    pub fn update_world_transforms(&mut self) {
        self.graph.update_world_transforms(self.root);
    }
}

fn index(value: i32) -> usize {
    value.max(0) as usize
}

/// Sub-slice clamped to the buffer, so short buffers yield short slices.
fn span<T>(buffer: &[T], start: usize, end: usize) -> &[T] {
    let end = end.min(buffer.len());
    &buffer[start.min(end)..end]
}

fn rgba(buffer: &[f32], i: usize) -> [f32; 4] {
    let mut out = [1.0; 4];
    for (dst, src) in out.iter_mut().zip(span(buffer, i * 4, i * 4 + 4)) {
        *dst = *src;
    }
    out
}

/// Copy the buffers of mesh `mesh_id` out of the model and convert vertices
/// and normals to renderer coordinates.
pub fn reconstruct_mesh(model: &Model, mesh_id: usize) -> Geometry {
    let vertadr = index(model.mesh_vertadr[mesh_id]);
    let vertnum = index(model.mesh_vertnum[mesh_id]);
    let faceadr = index(model.mesh_faceadr[mesh_id]);
    let facenum = index(model.mesh_facenum[mesh_id]);

    let mut positions = span(&model.mesh_vert, vertadr * 3, (vertadr + vertnum) * 3).to_vec();
    swizzle::swizzle_in_place(&mut positions);
    let mut normals = span(&model.mesh_normal, vertadr * 3, (vertadr + vertnum) * 3).to_vec();
    swizzle::swizzle_in_place(&mut normals);

    let uvs = match model.mesh_texcoordadr.get(mesh_id) {
        Some(&adr) if adr >= 0 => {
            let adr = adr as usize;
            span(&model.mesh_texcoord, adr * 2, (adr + vertnum) * 2).to_vec()
        }
        _ => Vec::new(),
    };
    let indices = span(&model.mesh_face, faceadr * 3, (faceadr + facenum) * 3)
        .iter()
        .map(|&i| index(i) as u32)
        .collect();

    Geometry::indexed(format!("mesh {mesh_id}"), positions, normals, uvs, indices)
}

/// Rebuild texture `tex_id` from the packed RGB buffer.
pub fn unpack_texture(model: &Model, tex_id: usize) -> Texture {
    let width = index(model.tex_width[tex_id]) as u32;
    let height = index(model.tex_height[tex_id]) as u32;
    let offset = index(model.tex_adr[tex_id]);
    let len = width as usize * height as usize * 3;
    Texture::from_rgb(tex_id, width, height, span(&model.tex_rgb, offset, offset + len))
}

/// Colour, texture and surface a geom resolves to.
struct Appearance {
    rgba: [f32; 4],
    texture: Option<usize>,
    surface: Option<Surface>,
}

fn appearance(model: &Model, geom: usize) -> Appearance {
    let matid = model.geom_matid[geom];
    if matid < 0 {
        return Appearance {
            rgba: rgba(&model.geom_rgba, geom),
            texture: None,
            surface: None,
        };
    }
    let mat = matid as usize;
    let texture = model
        .mat_texid
        .get(mat)
        .and_then(|&tex| usize::try_from(tex).ok());
    Appearance {
        rgba: rgba(&model.mat_rgba, mat),
        texture,
        surface: Some(Surface::from_model(
            model.mat_specular.get(mat).copied().unwrap_or(0.0),
            model.mat_reflectance.get(mat).copied().unwrap_or(0.0),
            model.mat_shininess.get(mat).copied().unwrap_or(0.0),
        )),
    }
}

/// Procedural geometry of a primitive geom. Planes, height fields and
/// meshes are handled by the caller.
fn primitive(ty: GeomType, size: [f32; 3]) -> Option<Geometry> {
    match ty {
        GeomType::Sphere => Some(Geometry::sphere(
            size[0],
            SPHERE_WIDTH_SEGMENTS,
            SPHERE_HEIGHT_SEGMENTS,
        )),
        GeomType::Capsule => Some(Geometry::capsule(
            size[0],
            size[1] * 2.0,
            CAPSULE_CAP_SEGMENTS,
            CAPSULE_RADIAL_SEGMENTS,
        )),
        // stretched by the node scale
        GeomType::Ellipsoid => Some(Geometry::sphere(
            1.0,
            SPHERE_WIDTH_SEGMENTS,
            SPHERE_HEIGHT_SEGMENTS,
        )),
        GeomType::Cylinder => Some(Geometry::cylinder(
            size[0],
            size[0],
            size[1] * 2.0,
            CYLINDER_RADIAL_SEGMENTS,
        )),
        GeomType::Box => Some(Geometry::cuboid(size[0] * 2.0, size[2] * 2.0, size[1] * 2.0)),
        GeomType::Plane | GeomType::HeightField | GeomType::Mesh => None,
    }
}

/// Build the scene for `model`.
///
/// Never fails: sentinel ids select the default branches, unknown geom types
/// and height fields are skipped with a warning.
pub fn build_scene(model: &Model) -> BuiltScene {
    let mut graph = SceneGraph::new();
    let root = graph.add(Node::new(ROOT_NAME, NodeKind::Group));

    let mut bodies: Vec<Option<NodeId>> = vec![None; model.nbody()];
    let mut meshes: HashMap<usize, Arc<Geometry>> = HashMap::new();
    let mut material = Arc::new(Material::default());
    let mut materials = vec![material.clone()];

    for g in 0..model.ngeom() {
        if model.geom_group[g] >= HIDDEN_GEOM_GROUP {
            continue;
        }

        let b = index(model.geom_bodyid[g]);
        let code = model.geom_type[g];
        let size = [
            model.geom_size[g * 3] as f32,
            model.geom_size[g * 3 + 1] as f32,
            model.geom_size[g * 3 + 2] as f32,
        ];

        if b >= bodies.len() {
            bodies.resize(b + 1, None);
        }
        let body = *bodies[b].get_or_insert_with(|| {
            graph.add(Node::new(
                model.body_name(b),
                NodeKind::Body {
                    body_id: b,
                    has_custom_mesh: false,
                },
            ))
        });

        let Some(ty) = GeomType::from_raw(code) else {
            warn!("Skipping geom {g} with unknown type {code}");
            continue;
        };

        let geometry = match ty {
            GeomType::Plane => None,
            GeomType::HeightField => {
                warn!("Height field geom {g} is not supported and will not be drawn");
                continue;
            }
            GeomType::Mesh => {
                let Ok(mesh_id) = usize::try_from(model.geom_dataid[g]) else {
                    warn!("Mesh geom {g} references no mesh");
                    continue;
                };
                let geometry = meshes
                    .entry(mesh_id)
                    .or_insert_with(|| Arc::new(reconstruct_mesh(model, mesh_id)))
                    .clone();
                if let Some(NodeKind::Body {
                    has_custom_mesh, ..
                }) = graph.get_mut(body).map(|node| &mut node.kind)
                {
                    *has_custom_mesh = true;
                }
                Some(geometry)
            }
            _ => primitive(ty, size).map(Arc::new),
        };

        let look = appearance(model, g);
        if !material.matches(look.rgba, look.texture) {
            let map = look
                .texture
                .map(|tex_id| Arc::new(unpack_texture(model, tex_id)));
            material = Arc::new(Material::new(look.rgba, map, look.surface));
            materials.push(material.clone());
        }

        let mut local = Instance::from(swizzle::position(&model.geom_pos, g));
        let node = match geometry {
            None => {
                local.rotation = cgmath::Quaternion::from_angle_x(Rad(-FRAC_PI_2));
                Node::new(
                    format!("geom {g}"),
                    NodeKind::Reflector(Reflector {
                        geometry: Arc::new(Geometry::plane(PLANE_SIZE, PLANE_SIZE)),
                        clip_bias: REFLECTOR_CLIP_BIAS,
                        texture: material.map.clone(),
                    }),
                )
            }
            Some(geometry) => {
                local.rotation = swizzle::quaternion(&model.geom_quat, g);
                if ty == GeomType::Ellipsoid {
                    local.scale = Vector3::new(size[0], size[2], size[1]);
                }
                Node::new(
                    format!("geom {g}"),
                    NodeKind::Mesh {
                        geometry,
                        material: material.clone(),
                        body_id: b,
                    },
                )
            }
        };
        graph.add_child(
            body,
            node.with_local(local)
                .with_shadows(g != 0, ty != GeomType::Mesh),
        );
    }

    let tendons = TendonPools::new();
    let cylinders = graph.add_child(
        root,
        Node::new("tendon cylinders", NodeKind::Instanced(PoolKind::Cylinders)).with_shadows(true, true),
    );
    let spheres = graph.add_child(
        root,
        Node::new("tendon spheres", NodeKind::Instanced(PoolKind::Spheres)).with_shadows(true, true),
    );

    let anchor = bodies.first().copied().flatten().unwrap_or(root);
    let mut lights = Vec::with_capacity(model.nlight().max(1));
    for l in 0..model.nlight() {
        let node = graph.add_child(
            anchor,
            Node::new(format!("light {l}"), NodeKind::Light(lights.len())),
        );
        let light = if model.light_directional[l] {
            Light::directional(node)
        } else {
            // three attenuation terms per light, the constant one first
            let attenuation = model.light_attenuation.get(l * 3).copied().unwrap_or(0.0);
            Light::spot(node, attenuation)
        };
        lights.push(light);
    }
    if lights.is_empty() {
        let node = graph.add_child(root, Node::new("default light", NodeKind::Light(0)));
        lights.push(Light {
            from_model: false,
            cast_shadow: false,
            ..Light::directional(node)
        });
    }

    for b in 0..model.nbody() {
        match bodies[b] {
            Some(node) if b == 0 => graph.attach(root, node),
            Some(node) => graph.attach(anchor, node),
            None if b == 0 => {}
            None => {
                debug!("Body {b} has no geometry, adding an empty group");
                let node = graph.add_child(
                    anchor,
                    Node::new(
                        model.body_name(b),
                        NodeKind::Body {
                            body_id: b,
                            has_custom_mesh: false,
                        },
                    ),
                );
                bodies[b] = Some(node);
            }
        }
    }
    // geoms on bodies past `nbody`
    for node in bodies.iter().skip(model.nbody()).flatten() {
        graph.attach(anchor, *node);
    }

    let mut scene = BuiltScene {
        graph,
        root,
        bodies,
        meshes,
        materials,
        lights,
        tendons,
        cylinders,
        spheres,
    };
    scene.update_world_transforms();
    scene
}

//! Struct-of-arrays model description as exposed by the physics engine.
//!
//! Arrays are indexed by their respective ids and flattened the way the
//! engine stores them:
//! - `body_*` arrays indexed by body id (0 = world)
//! - `geom_*` arrays indexed by geom id, vectors stored as 3 (or 4) floats each
//! - `mesh_*` address/count arrays index into the shared `mesh_vert`,
//!   `mesh_normal`, `mesh_texcoord` and `mesh_face` buffers
//! - `mat_*`, `tex_*`, `light_*`, `tendon_*`, `actuator_*` likewise
//!
//! `-1` is the sentinel for "none" in every id-valued array.

use std::borrow::Cow;

/// Shape of a geom, using the engine's numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeomType {
    Plane,
    HeightField,
    Sphere,
    Capsule,
    Ellipsoid,
    Cylinder,
    Box,
    Mesh,
}

impl GeomType {
    /// Map the engine's type code, returning `None` for types the viewer has no
    /// representation for.
    pub fn from_raw(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Plane),
            1 => Some(Self::HeightField),
            2 => Some(Self::Sphere),
            3 => Some(Self::Capsule),
            4 => Some(Self::Ellipsoid),
            5 => Some(Self::Cylinder),
            6 => Some(Self::Box),
            7 => Some(Self::Mesh),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Plane => 0,
            Self::HeightField => 1,
            Self::Sphere => 2,
            Self::Capsule => 3,
            Self::Ellipsoid => 4,
            Self::Cylinder => 5,
            Self::Box => 6,
            Self::Mesh => 7,
        }
    }
}

/// A loaded model. Read-only to everything in this crate.
#[derive(Debug, Clone)]
pub struct Model {
    /// Number of generalized position coordinates.
    pub nq: usize,
    /// Simulation timestep in seconds.
    pub opt_timestep: f64,
    /// All names, each terminated by a NUL byte.
    pub names: Vec<u8>,

    // bodies
    pub body_parentid: Vec<i32>,
    pub name_bodyadr: Vec<i32>,

    // geoms
    pub geom_type: Vec<i32>,
    pub geom_bodyid: Vec<i32>,
    pub geom_group: Vec<i32>,
    /// Mesh id for mesh geoms, `-1` otherwise.
    pub geom_dataid: Vec<i32>,
    pub geom_matid: Vec<i32>,
    pub geom_size: Vec<f64>,
    pub geom_pos: Vec<f64>,
    pub geom_quat: Vec<f64>,
    pub geom_rgba: Vec<f32>,

    // meshes
    pub mesh_vertadr: Vec<i32>,
    pub mesh_vertnum: Vec<i32>,
    pub mesh_texcoordadr: Vec<i32>,
    pub mesh_faceadr: Vec<i32>,
    pub mesh_facenum: Vec<i32>,
    pub mesh_vert: Vec<f32>,
    pub mesh_normal: Vec<f32>,
    pub mesh_texcoord: Vec<f32>,
    pub mesh_face: Vec<i32>,

    // materials
    pub mat_rgba: Vec<f32>,
    pub mat_texid: Vec<i32>,
    pub mat_specular: Vec<f32>,
    pub mat_reflectance: Vec<f32>,
    pub mat_shininess: Vec<f32>,

    // textures, packed RGB
    pub tex_width: Vec<i32>,
    pub tex_height: Vec<i32>,
    pub tex_adr: Vec<i32>,
    pub tex_rgb: Vec<u8>,

    // lights
    pub light_directional: Vec<bool>,
    /// Constant, linear and quadratic terms per light.
    pub light_attenuation: Vec<f32>,

    // tendons
    pub tendon_width: Vec<f64>,

    // actuators
    pub actuator_ctrllimited: Vec<bool>,
    pub actuator_ctrlrange: Vec<f64>,
    pub name_actuatoradr: Vec<i32>,

    // keyframes, `nq` values each
    pub key_qpos: Vec<f64>,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            nq: 0,
            opt_timestep: 0.002,
            names: Vec::new(),
            body_parentid: Vec::new(),
            name_bodyadr: Vec::new(),
            geom_type: Vec::new(),
            geom_bodyid: Vec::new(),
            geom_group: Vec::new(),
            geom_dataid: Vec::new(),
            geom_matid: Vec::new(),
            geom_size: Vec::new(),
            geom_pos: Vec::new(),
            geom_quat: Vec::new(),
            geom_rgba: Vec::new(),
            mesh_vertadr: Vec::new(),
            mesh_vertnum: Vec::new(),
            mesh_texcoordadr: Vec::new(),
            mesh_faceadr: Vec::new(),
            mesh_facenum: Vec::new(),
            mesh_vert: Vec::new(),
            mesh_normal: Vec::new(),
            mesh_texcoord: Vec::new(),
            mesh_face: Vec::new(),
            mat_rgba: Vec::new(),
            mat_texid: Vec::new(),
            mat_specular: Vec::new(),
            mat_reflectance: Vec::new(),
            mat_shininess: Vec::new(),
            tex_width: Vec::new(),
            tex_height: Vec::new(),
            tex_adr: Vec::new(),
            tex_rgb: Vec::new(),
            light_directional: Vec::new(),
            light_attenuation: Vec::new(),
            tendon_width: Vec::new(),
            actuator_ctrllimited: Vec::new(),
            actuator_ctrlrange: Vec::new(),
            name_actuatoradr: Vec::new(),
            key_qpos: Vec::new(),
        }
    }
}

impl Model {
    pub fn nbody(&self) -> usize {
        self.body_parentid.len()
    }

    pub fn ngeom(&self) -> usize {
        self.geom_type.len()
    }

    pub fn nmesh(&self) -> usize {
        self.mesh_vertadr.len()
    }

    pub fn nlight(&self) -> usize {
        self.light_directional.len()
    }

    pub fn ntendon(&self) -> usize {
        self.tendon_width.len()
    }

    /// Number of actuators.
    pub fn nu(&self) -> usize {
        self.actuator_ctrllimited.len()
    }

    /// Number of keyframes.
    pub fn nkey(&self) -> usize {
        if self.nq == 0 {
            0
        } else {
            self.key_qpos.len() / self.nq
        }
    }

    /// Decode the NUL-terminated name starting at byte offset `adr`.
    ///
    /// Out-of-range or negative offsets yield an empty name.
    pub fn name_at(&self, adr: i32) -> Cow<'_, str> {
        let Some(tail) = usize::try_from(adr).ok().and_then(|adr| self.names.get(adr..)) else {
            return Cow::Borrowed("");
        };
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        String::from_utf8_lossy(&tail[..end])
    }

    pub fn body_name(&self, body: usize) -> Cow<'_, str> {
        self.name_bodyadr
            .get(body)
            .map_or(Cow::Borrowed(""), |&adr| self.name_at(adr))
    }

    pub fn actuator_name(&self, actuator: usize) -> Cow<'_, str> {
        self.name_actuatoradr
            .get(actuator)
            .map_or(Cow::Borrowed(""), |&adr| self.name_at(adr))
    }

    /// The `nq` joint positions stored for keyframe `key`.
    pub fn keyframe(&self, key: usize) -> Option<&[f64]> {
        if key >= self.nkey() {
            return None;
        }
        self.key_qpos.get(key * self.nq..(key + 1) * self.nq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named() -> Model {
        Model {
            names: b"world\0arm\0elbow_motor\0".to_vec(),
            body_parentid: vec![0, 0],
            name_bodyadr: vec![0, 6],
            actuator_ctrllimited: vec![true],
            name_actuatoradr: vec![10],
            ..Default::default()
        }
    }

    #[test]
    fn names_are_split_at_nul() {
        let model = named();
        assert_eq!(model.body_name(0), "world");
        assert_eq!(model.body_name(1), "arm");
        assert_eq!(model.actuator_name(0), "elbow_motor");
    }

    #[test]
    fn invalid_name_offsets_are_empty() {
        let model = named();
        assert_eq!(model.name_at(-1), "");
        assert_eq!(model.name_at(500), "");
        assert_eq!(model.body_name(7), "");
    }

    #[test]
    fn keyframes_are_sliced_by_nq() {
        let model = Model {
            nq: 2,
            key_qpos: vec![0.0, 1.0, 2.0, 3.0],
            ..Default::default()
        };
        assert_eq!(model.nkey(), 2);
        assert_eq!(model.keyframe(1), Some(&[2.0, 3.0][..]));
        assert_eq!(model.keyframe(2), None);
    }

    #[test]
    fn geom_type_codes_round_trip() {
        for code in 0..8 {
            let ty = GeomType::from_raw(code).unwrap();
            assert_eq!(ty.code(), code);
        }
        assert_eq!(GeomType::from_raw(8), None);
    }
}

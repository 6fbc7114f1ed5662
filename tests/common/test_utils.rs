use std::collections::HashMap;

use anyhow::{anyhow, bail};
use mjviewer::{
    config::ViewerConfig,
    physics::{FileContents, MemoryFs, Model, PhysicsEngine, Simulation, VirtualFs},
    resources::assets::stage_file,
};

/// Simulation state that only moves when a test writes to it.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeSim {
    pub(crate) qpos: Vec<f64>,
    pub(crate) ctrl: Vec<f64>,
    pub(crate) xpos: Vec<f64>,
    pub(crate) xquat: Vec<f64>,
    pub(crate) light_xpos: Vec<f64>,
    pub(crate) light_xdir: Vec<f64>,
    pub(crate) ten_wrapadr: Vec<i32>,
    pub(crate) ten_wrapnum: Vec<i32>,
    pub(crate) wrap_xpos: Vec<f64>,
    pub(crate) steps: usize,
    pub(crate) forwards: usize,
    pub(crate) resets: usize,
}

impl FakeSim {
    pub(crate) fn for_model(model: &Model) -> Self {
        Self {
            qpos: vec![0.0; model.nq],
            ctrl: vec![0.0; model.nu()],
            xpos: vec![0.0; model.nbody() * 3],
            xquat: (0..model.nbody()).flat_map(|_| [1.0, 0.0, 0.0, 0.0]).collect(),
            light_xpos: vec![0.0; model.nlight() * 3],
            light_xdir: (0..model.nlight()).flat_map(|_| [0.0, 0.0, -1.0]).collect(),
            ten_wrapadr: vec![0; model.ntendon()],
            ten_wrapnum: vec![0; model.ntendon()],
            ..Default::default()
        }
    }
}

impl Simulation for FakeSim {
    fn step(&mut self) {
        self.steps += 1;
    }

    fn forward(&mut self) {
        self.forwards += 1;
    }

    fn reset_data(&mut self) {
        self.resets += 1;
        self.qpos.iter_mut().for_each(|q| *q = 0.0);
        self.ctrl.iter_mut().for_each(|c| *c = 0.0);
    }

    fn qpos_mut(&mut self) -> &mut [f64] {
        &mut self.qpos
    }

    fn ctrl(&self) -> &[f64] {
        &self.ctrl
    }

    fn ctrl_mut(&mut self) -> &mut [f64] {
        &mut self.ctrl
    }

    fn xpos(&self) -> &[f64] {
        &self.xpos
    }

    fn xquat(&self) -> &[f64] {
        &self.xquat
    }

    fn light_xpos(&self) -> &[f64] {
        &self.light_xpos
    }

    fn light_xdir(&self) -> &[f64] {
        &self.light_xdir
    }

    fn ten_wrapadr(&self) -> &[i32] {
        &self.ten_wrapadr
    }

    fn ten_wrapnum(&self) -> &[i32] {
        &self.ten_wrapnum
    }

    fn wrap_xpos(&self) -> &[f64] {
        &self.wrap_xpos
    }
}

/// Serves registered models for paths that exist in its filesystem.
#[derive(Debug, Default)]
pub(crate) struct FakeEngine {
    pub(crate) fs: MemoryFs,
    pub(crate) models: HashMap<String, Model>,
    pub(crate) loads: Vec<String>,
}

impl FakeEngine {
    /// Register `model` under `scene` (a path relative to the working
    /// directory) without staging a file for it.
    pub(crate) fn register(&mut self, config: &ViewerConfig, scene: &str, model: Model) {
        self.models.insert(config.scene_path(scene), model);
    }

    /// Register `model` and stage a scene file for it.
    pub(crate) fn with_scene(mut self, config: &ViewerConfig, scene: &str, model: Model) -> Self {
        stage_file(
            &mut self.fs,
            &config.working_dir,
            scene,
            FileContents::Text("<mujoco/>".to_string()),
        )
        .expect("staging fixture scene");
        self.register(config, scene, model);
        self
    }
}

impl PhysicsEngine for FakeEngine {
    type Sim = FakeSim;

    fn load_model(&mut self, path: &str) -> anyhow::Result<Model> {
        self.loads.push(path.to_string());
        if !self.fs.exists(path) {
            bail!("{path} does not exist");
        }
        self.models
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("{path} is not a model"))
    }

    fn create_simulation(&mut self, model: &Model) -> anyhow::Result<FakeSim> {
        Ok(FakeSim::for_model(model))
    }

    fn fs(&mut self) -> &mut dyn VirtualFs {
        &mut self.fs
    }
}

/// A config whose scene list holds just `scenes`, nothing to prefetch.
pub(crate) fn config_with_scenes(scenes: &[(&str, &str)]) -> ViewerConfig {
    ViewerConfig {
        asset_files: Vec::new(),
        scenes: scenes
            .iter()
            .map(|(name, path)| (name.to_string(), path.to_string()))
            .collect(),
        ..Default::default()
    }
}

/// Bodies: world, upper, lower.
///
/// Geoms:
/// 0. textured plane on the world body
/// 1. capsule on `upper`, render group 1
/// 2. triangle mesh on `lower`
/// 3. the same mesh again on `lower`, render group 2
/// 4. sphere on `upper` in the hidden render group
///
/// One spot light, one tendon, two actuators (`elbow` is control-limited,
/// `free` is not) and two keyframes over `nq = 2`.
pub(crate) fn arm_model() -> Model {
    let grey: [f32; 4] = [0.5, 0.5, 0.5, 1.0];
    let bone: [f32; 4] = [0.9, 0.8, 0.7, 1.0];
    Model {
        nq: 2,
        names: b"world\0upper\0lower\0elbow\0free\0".to_vec(),
        body_parentid: vec![0, 0, 1],
        name_bodyadr: vec![0, 6, 12],

        geom_type: vec![0, 3, 7, 7, 2],
        geom_bodyid: vec![0, 1, 2, 2, 1],
        geom_group: vec![0, 1, 0, 2, 3],
        geom_dataid: vec![-1, -1, 0, 0, -1],
        geom_matid: vec![0, -1, -1, -1, -1],
        geom_size: vec![
            1.0, 1.0, 0.1, //
            0.05, 0.2, 0.0, //
            0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, //
            0.1, 0.0, 0.0,
        ],
        geom_pos: vec![
            0.0, 0.0, 0.0, //
            0.0, 0.0, 0.2, //
            0.0, 0.0, 0.0, //
            0.0, 0.1, 0.0, //
            0.0, 0.0, 0.0,
        ],
        geom_quat: (0..5).flat_map(|_| [1.0, 0.0, 0.0, 0.0]).collect(),
        geom_rgba: [grey, grey, bone, bone, grey].concat(),

        mesh_vertadr: vec![0],
        mesh_vertnum: vec![3],
        mesh_texcoordadr: vec![0],
        mesh_faceadr: vec![0],
        mesh_facenum: vec![1],
        mesh_vert: vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0,
        ],
        mesh_normal: vec![
            0.0, 0.0, 1.0, //
            0.0, 0.0, 1.0, //
            0.0, 0.0, 1.0,
        ],
        mesh_texcoord: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        mesh_face: vec![0, 1, 2],

        mat_rgba: vec![1.0, 1.0, 1.0, 1.0],
        mat_texid: vec![0],
        mat_specular: vec![0.5],
        mat_reflectance: vec![0.2],
        mat_shininess: vec![0.25],

        tex_width: vec![2],
        tex_height: vec![1],
        tex_adr: vec![0],
        tex_rgb: vec![10, 20, 30, 40, 50, 60],

        light_directional: vec![false],
        light_attenuation: vec![0.5, 0.0, 0.0],

        tendon_width: vec![0.01],

        actuator_ctrllimited: vec![true, false],
        actuator_ctrlrange: vec![0.0, 1.0, -1.0, 1.0],
        name_actuatoradr: vec![18, 24],

        key_qpos: vec![0.1, 0.2, 0.3, 0.4],
        ..Default::default()
    }
}

/// Only the world body, no geoms, no lights.
pub(crate) fn empty_model() -> Model {
    Model {
        names: b"world\0".to_vec(),
        body_parentid: vec![0],
        name_bodyadr: vec![0],
        ..Default::default()
    }
}

/// One tendon running through `points` (physics coordinates) with width
/// `width`, and a simulation reporting those wrap points.
pub(crate) fn tendon_fixture(points: &[[f64; 3]], width: f64) -> (Model, FakeSim) {
    let model = Model {
        tendon_width: vec![width],
        ..empty_model()
    };
    let mut sim = FakeSim::for_model(&model);
    sim.ten_wrapadr = vec![0];
    sim.ten_wrapnum = vec![points.len() as i32];
    sim.wrap_xpos = points.iter().flatten().copied().collect();
    (model, sim)
}

pub(crate) fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

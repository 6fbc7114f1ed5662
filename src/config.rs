//! Viewer configuration and the control-panel bound parameters.

use std::collections::BTreeMap;

use cgmath::Point3;

/// Display name and scene path (relative to the working directory) of every
/// selectable scene, in menu order.
pub const SCENE_CHOICES: [(&str, &str); 6] = [
    ("Hand", "myo_sim/hand/myo_hand.xml"),
    ("TEST", "myo_sim/elbow/myo_test.xml"),
    ("Elbow", "myo_sim/elbow/myo_elbow_1dof6muscles.xml"),
    ("Elbow Exo", "myo_sim/elbow/myo_elbow_1dof6muscles_1dofexo.xml"),
    ("motor_finger_v0", "myo_sim/finger/motor_finger_v0.xml"),
    ("myo_finger_v0", "myo_sim/finger/myo_finger_v0.xml"),
];

/// Files staged into the virtual filesystem before the first load.
pub const DEFAULT_SCENE_FILES: &[&str] = &[
    "myo_sim/elbow/myo_test.xml",
    "myo_sim/basic/muscle_load.xml",
    "myo_sim/elbow/assets/myo_elbow_1dof6muscles_1dofexo_body.xml",
    "myo_sim/elbow/assets/myo_elbow_1dof6muscles_body.xml",
    "myo_sim/elbow/assets/myo_elbow_2dof6muscles_body.xml",
    "myo_sim/elbow/assets/myo_elbow_assets.xml",
    "myo_sim/elbow/elbow_1dof6muscles_1dofSoftexo_Ideal.xml",
    "myo_sim/elbow/elbow_1dof6muscles_1dofSoftexo_sim2.xml",
    "myo_sim/elbow/myo_elbow_1dof6muscles.xml",
    "myo_sim/elbow/myo_elbow_1dof6muscles_1dofexo.xml",
    "myo_sim/elbow/myo_elbow_2dof6muscles.xml",
    "myo_sim/finger/finger_v0.xml",
    "myo_sim/finger/motor_finger_v0.xml",
    "myo_sim/finger/myo_finger_v0.xml",
    "myo_sim/hand/assets/myo_hand_assets.xml",
    "myo_sim/hand/assets/myo_hand_body.xml",
    "myo_sim/hand/assets/myo_hand_body_TTrans.xml",
    "myo_sim/hand/myo_hand.xml",
    "myo_sim/meshes/1mc.stl",
    "myo_sim/meshes/2distph.stl",
    "myo_sim/meshes/2mc.stl",
    "myo_sim/meshes/2midph.stl",
    "myo_sim/meshes/2proxph.stl",
    "myo_sim/meshes/3distph.stl",
    "myo_sim/meshes/3mc.stl",
    "myo_sim/meshes/3midph.stl",
    "myo_sim/meshes/3proxph.stl",
    "myo_sim/meshes/4distph.stl",
    "myo_sim/meshes/4mc.stl",
    "myo_sim/meshes/4midph.stl",
    "myo_sim/meshes/4proxph.stl",
    "myo_sim/meshes/5distph.stl",
    "myo_sim/meshes/5mc.stl",
    "myo_sim/meshes/5midph.stl",
    "myo_sim/meshes/5proxph.stl",
    "myo_sim/meshes/arm_r_1mc.stl",
    "myo_sim/meshes/arm_r_2distph.stl",
    "myo_sim/meshes/arm_r_2mc.stl",
    "myo_sim/meshes/arm_r_2midph.stl",
    "myo_sim/meshes/arm_r_2proxph.stl",
    "myo_sim/meshes/arm_r_3distph.stl",
    "myo_sim/meshes/arm_r_3mc.stl",
    "myo_sim/meshes/arm_r_3midph.stl",
    "myo_sim/meshes/arm_r_3proxph.stl",
    "myo_sim/meshes/arm_r_4distph.stl",
    "myo_sim/meshes/arm_r_4mc.stl",
    "myo_sim/meshes/arm_r_4midph.stl",
    "myo_sim/meshes/arm_r_4proxph.stl",
    "myo_sim/meshes/arm_r_5distph.stl",
    "myo_sim/meshes/arm_r_5mc.stl",
    "myo_sim/meshes/arm_r_5midph.stl",
    "myo_sim/meshes/arm_r_5proxph.stl",
    "myo_sim/meshes/arm_r_capitate.stl",
    "myo_sim/meshes/arm_r_hamate.stl",
    "myo_sim/meshes/arm_r_humerus.stl",
    "myo_sim/meshes/arm_r_lunate.stl",
    "myo_sim/meshes/arm_r_pisiform.stl",
    "myo_sim/meshes/arm_r_radius.stl",
    "myo_sim/meshes/arm_r_scaphoid.stl",
    "myo_sim/meshes/arm_r_thumbdist.stl",
    "myo_sim/meshes/arm_r_thumbprox.stl",
    "myo_sim/meshes/arm_r_trapezium.stl",
    "myo_sim/meshes/arm_r_trapezoid.stl",
    "myo_sim/meshes/arm_r_triquetrum.stl",
    "myo_sim/meshes/arm_r_ulna.stl",
    "myo_sim/meshes/capitate.stl",
    "myo_sim/meshes/capitate_lvs.stl",
    "myo_sim/meshes/capitate_rvs.stl",
    "myo_sim/meshes/clavicle.stl",
    "myo_sim/meshes/fingers1.stl",
    "myo_sim/meshes/fingers12.stl",
    "myo_sim/meshes/fingers16.stl",
    "myo_sim/meshes/fingers17.stl",
    "myo_sim/meshes/fingers18mod61.stl",
    "myo_sim/meshes/fingers19mod13-24.stl",
    "myo_sim/meshes/fingers2.stl",
    "myo_sim/meshes/fingers3.stl",
    "myo_sim/meshes/fingers4.stl",
    "myo_sim/meshes/fingers8.stl",
    "myo_sim/meshes/ground_jaw.stl",
    "myo_sim/meshes/ground_r_clavicle.stl",
    "myo_sim/meshes/ground_r_scapula.stl",
    "myo_sim/meshes/ground_ribs.stl",
    "myo_sim/meshes/ground_skull.stl",
    "myo_sim/meshes/ground_spine.stl",
    "myo_sim/meshes/hamate.stl",
    "myo_sim/meshes/hamate_lvs.stl",
    "myo_sim/meshes/hamate_rvs.stl",
    "myo_sim/meshes/hand_2distph.stl",
    "myo_sim/meshes/hand_2midph.stl",
    "myo_sim/meshes/hand_2proxph.stl",
    "myo_sim/meshes/hat_jaw.stl",
    "myo_sim/meshes/hat_ribs_scap.stl",
    "myo_sim/meshes/hat_skull.stl",
    "myo_sim/meshes/hat_spine.stl",
    "myo_sim/meshes/human_highpoly.stl",
    "myo_sim/meshes/human_lowpoly.stl",
    "myo_sim/meshes/human_lowpoly_norighthand.stl",
    "myo_sim/meshes/humerus.stl",
    "myo_sim/meshes/humerus_lv.stl",
    "myo_sim/meshes/humerus_rv.stl",
    "myo_sim/meshes/index_distal_lvs.stl",
    "myo_sim/meshes/index_distal_rvs.stl",
    "myo_sim/meshes/index_medial_lvs.stl",
    "myo_sim/meshes/index_medial_rvs.stl",
    "myo_sim/meshes/index_proximal_lvs.stl",
    "myo_sim/meshes/index_proximal_rvs.stl",
    "myo_sim/meshes/l_bofoot.stl",
    "myo_sim/meshes/l_femur.stl",
    "myo_sim/meshes/l_fibula.stl",
    "myo_sim/meshes/l_foot.stl",
    "myo_sim/meshes/l_patella.stl",
    "myo_sim/meshes/l_pelvis.stl",
    "myo_sim/meshes/l_talus.stl",
    "myo_sim/meshes/l_tibia.stl",
    "myo_sim/meshes/little_distal_lvs.stl",
    "myo_sim/meshes/little_distal_rvs.stl",
    "myo_sim/meshes/little_medial_lvs.stl",
    "myo_sim/meshes/little_medial_rvs.stl",
    "myo_sim/meshes/little_proximal_lvs.stl",
    "myo_sim/meshes/little_proximal_rvs.stl",
    "myo_sim/meshes/lunate.stl",
    "myo_sim/meshes/lunate_lvs.stl",
    "myo_sim/meshes/lunate_rvs.stl",
    "myo_sim/meshes/metacarpal1_lvs.stl",
    "myo_sim/meshes/metacarpal1_rvs.stl",
    "myo_sim/meshes/metacarpal2_lvs.stl",
    "myo_sim/meshes/metacarpal2_rvs.stl",
    "myo_sim/meshes/metacarpal3_lvs.stl",
    "myo_sim/meshes/metacarpal3_rvs.stl",
    "myo_sim/meshes/metacarpal4_lvs.stl",
    "myo_sim/meshes/metacarpal4_rvs.stl",
    "myo_sim/meshes/metacarpal5_lvs.stl",
    "myo_sim/meshes/metacarpal5_rvs.stl",
    "myo_sim/meshes/middle_distal_lvs.stl",
    "myo_sim/meshes/middle_distal_rvs.stl",
    "myo_sim/meshes/middle_medial_lvs.stl",
    "myo_sim/meshes/middle_medial_rvs.stl",
    "myo_sim/meshes/middle_proximal_lvs.stl",
    "myo_sim/meshes/middle_proximal_rvs.stl",
    "myo_sim/meshes/movaxesfin104.stl",
    "myo_sim/meshes/movaxesfin117.stl",
    "myo_sim/meshes/movaxesfin133.stl",
    "myo_sim/meshes/movaxesfin143.stl",
    "myo_sim/meshes/movaxesfin158.stl",
    "myo_sim/meshes/movaxesfin515.stl",
    "myo_sim/meshes/movaxesfin623.stl",
    "myo_sim/meshes/movaxesfin76.stl",
    "myo_sim/meshes/movaxesfin91.stl",
    "myo_sim/meshes/pisiform.stl",
    "myo_sim/meshes/pisiform_lvs.stl",
    "myo_sim/meshes/pisiform_rvs.stl",
    "myo_sim/meshes/r_bofoot.stl",
    "myo_sim/meshes/r_cap.stl",
    "myo_sim/meshes/r_femur.stl",
    "myo_sim/meshes/r_fibula.stl",
    "myo_sim/meshes/r_foot.stl",
    "myo_sim/meshes/r_ham.stl",
    "myo_sim/meshes/r_lun.stl",
    "myo_sim/meshes/r_patella.stl",
    "myo_sim/meshes/r_pelvis.stl",
    "myo_sim/meshes/r_pis.stl",
    "myo_sim/meshes/r_scaph.stl",
    "myo_sim/meshes/r_talus.stl",
    "myo_sim/meshes/r_tibia.stl",
    "myo_sim/meshes/r_triq.stl",
    "myo_sim/meshes/r_trpzd.stl",
    "myo_sim/meshes/r_trpzm.stl",
    "myo_sim/meshes/radius.stl",
    "myo_sim/meshes/radius_lv.stl",
    "myo_sim/meshes/radius_rv.stl",
    "myo_sim/meshes/ring_distal_lvs.stl",
    "myo_sim/meshes/ring_distal_rvs.stl",
    "myo_sim/meshes/ring_medial_lvs.stl",
    "myo_sim/meshes/ring_medial_rvs.stl",
    "myo_sim/meshes/ring_proximal_lvs.stl",
    "myo_sim/meshes/ring_proximal_rvs.stl",
    "myo_sim/meshes/sacrum.stl",
    "myo_sim/meshes/scaphoid.stl",
    "myo_sim/meshes/scaphoid_lvs.stl",
    "myo_sim/meshes/scaphoid_rvs.stl",
    "myo_sim/meshes/scapula.stl",
    "myo_sim/meshes/thorax.stl",
    "myo_sim/meshes/thumb_distal_lvs.stl",
    "myo_sim/meshes/thumb_distal_rvs.stl",
    "myo_sim/meshes/thumb_proximal_lvs.stl",
    "myo_sim/meshes/thumb_proximal_rvs.stl",
    "myo_sim/meshes/thumbdist.stl",
    "myo_sim/meshes/thumbprox.stl",
    "myo_sim/meshes/torso_lowpoly.stl",
    "myo_sim/meshes/trapezium.stl",
    "myo_sim/meshes/trapezium_lvs.stl",
    "myo_sim/meshes/trapezium_rvs.stl",
    "myo_sim/meshes/trapezoid.stl",
    "myo_sim/meshes/trapezoid_lvs.stl",
    "myo_sim/meshes/trapezoid_rvs.stl",
    "myo_sim/meshes/triquetrum.stl",
    "myo_sim/meshes/triquetrum_lvs.stl",
    "myo_sim/meshes/triquetrum_rvs.stl",
    "myo_sim/meshes/ulna.stl",
    "myo_sim/meshes/ulna_lv.stl",
    "myo_sim/meshes/ulna_rv.stl",
    "myo_sim/scene/floor0.png",
    "myo_sim/scene/myosuite_logo.obj",
    "myo_sim/scene/myosuite_logo.png",
    "myo_sim/scene/myosuite_logo.xml",
    "myo_sim/scene/myosuite_scene.obj",
    "myo_sim/scene/myosuite_scene.png",
    "myo_sim/scene/myosuite_scene.xml",
    "myo_sim/scene/myosuite_scene_noFloor.obj",
    "myo_sim/scene/myosuite_scene_noFloor.png",
    "myo_sim/scene/myosuite_scene_noFloor_noPedestal.obj",
    "myo_sim/scene/myosuite_scene_noPedestal.xml",
    "myo_sim/scene/myosuite_warning.png",
];

/// Static viewer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Where scene files are fetched from. A directory natively, a path
    /// relative to the page origin on the web.
    pub asset_base: String,
    /// Directory of the engine's virtual filesystem scenes are staged into.
    pub working_dir: String,
    pub asset_files: Vec<String>,
    pub scenes: Vec<(String, String)>,
    pub camera_position: Point3<f32>,
    pub camera_target: Point3<f32>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            asset_base: "assets/scenes".to_string(),
            #[cfg(target_arch = "wasm32")]
            asset_base: "examples/scenes".to_string(),
            working_dir: "/working/".to_string(),
            asset_files: DEFAULT_SCENE_FILES.iter().map(|f| f.to_string()).collect(),
            scenes: SCENE_CHOICES
                .iter()
                .map(|(name, path)| (name.to_string(), path.to_string()))
                .collect(),
            camera_position: Point3::new(2.0, 1.7, 1.7),
            camera_target: Point3::new(0.0, 0.7, 0.0),
        }
    }
}

impl ViewerConfig {
    /// Path of the first scene choice, used when nothing else is selected.
    pub fn default_scene(&self) -> &str {
        self.scenes.first().map_or("", |(_, path)| path.as_str())
    }

    /// Location of `scene` inside the virtual filesystem.
    pub fn scene_path(&self, scene: &str) -> String {
        format!("{}/{}", self.working_dir.trim_end_matches('/'), scene)
    }

    pub fn scene_by_name(&self, name: &str) -> Option<&str> {
        self.scenes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, path)| path.as_str())
    }
}

/// Values bound to control-panel widgets.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    pub scene: String,
    pub paused: bool,
    pub help: bool,
    pub keyframe_number: usize,
    /// Time constant of the control noise in seconds.
    pub ctrl_noise_rate: f64,
    /// Standard deviation of the control noise. Zero disables it.
    pub ctrl_noise_std: f64,
    /// Slider value of every control-limited actuator, by actuator name.
    pub actuators: BTreeMap<String, f64>,
}

impl Params {
    pub fn new(scene: impl Into<String>) -> Self {
        Self {
            scene: scene.into(),
            paused: false,
            help: false,
            keyframe_number: 0,
            ctrl_noise_rate: 0.0,
            ctrl_noise_std: 0.0,
            actuators: BTreeMap::new(),
        }
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::new(SCENE_CHOICES[0].1)
    }
}

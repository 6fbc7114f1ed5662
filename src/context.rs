//! The viewer context: the single owner of the loaded scene and UI state.
//!
//! Every keyboard shortcut, panel widget and frame tick goes through a
//! [`ViewerContext`]. A reload drops the previous model, simulation and scene
//! before anything new is loaded.

use anyhow::Context as _;
use log::{info, warn};
use rand::{SeedableRng, rngs::StdRng};
use winit::keyboard::{KeyCode, ModifiersState};

use crate::{
    builder::{BuiltScene, build_scene},
    camera::FreeCamera,
    config::{Params, ViewerConfig},
    controls::{Command, ControlPanel, PanelEvent, command_for_key},
    physics::{Model, PhysicsEngine, Simulation},
    resources::assets::download_scene_files,
    sync::{self, SimClock},
};

/// A model together with its simulation and scene.
#[derive(Debug)]
pub struct LoadedScene<S> {
    pub model: Model,
    pub simulation: S,
    pub scene: BuiltScene,
}

pub struct ViewerContext<E: PhysicsEngine> {
    pub config: ViewerConfig,
    pub params: Params,
    pub camera: FreeCamera,
    pub panel: ControlPanel,
    engine: E,
    loaded: Option<LoadedScene<E::Sim>>,
    clock: SimClock,
    started: instant::Instant,
    rng: StdRng,
}

impl<E: PhysicsEngine> ViewerContext<E> {
    /// A context with nothing loaded yet.
    pub fn new(config: ViewerConfig, engine: E) -> Self {
        let params = Params::new(config.default_scene());
        let camera = FreeCamera::new(config.camera_position, config.camera_target);
        let panel = ControlPanel::new(&config);
        Self {
            config,
            params,
            camera,
            panel,
            engine,
            loaded: None,
            clock: SimClock::default(),
            started: instant::Instant::now(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Use a seeded generator for control noise.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Stage the configured scene files and load the selected scene.
    pub async fn init(config: ViewerConfig, mut engine: E) -> anyhow::Result<Self> {
        download_scene_files(&config, engine.fs())
            .await
            .context("staging scene files")?;
        let mut ctx = Self::new(config, engine);
        ctx.reload()?;
        Ok(ctx)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn loaded(&self) -> Option<&LoadedScene<E::Sim>> {
        self.loaded.as_ref()
    }

    pub fn model(&self) -> Option<&Model> {
        self.loaded.as_ref().map(|l| &l.model)
    }

    pub fn simulation(&self) -> Option<&E::Sim> {
        self.loaded.as_ref().map(|l| &l.simulation)
    }

    pub fn simulation_mut(&mut self) -> Option<&mut E::Sim> {
        self.loaded.as_mut().map(|l| &mut l.simulation)
    }

    pub fn scene(&self) -> Option<&BuiltScene> {
        self.loaded.as_ref().map(|l| &l.scene)
    }

    pub fn clock(&self) -> SimClock {
        self.clock
    }

    /// Replace the current scene with a fresh load of `params.scene`.
    ///
    /// The old scene is gone even if the new load fails.
    pub fn reload(&mut self) -> anyhow::Result<()> {
        self.loaded = None;
        if self.params.scene.is_empty() {
            warn!("No scene selected, nothing to reload");
            return Ok(());
        }

        let path = self.config.scene_path(&self.params.scene);
        let model = self
            .engine
            .load_model(&path)
            .with_context(|| format!("loading {path}"))?;
        let mut simulation = self
            .engine
            .create_simulation(&model)
            .with_context(|| format!("creating simulation for {path}"))?;
        simulation.forward();
        let scene = build_scene(&model);

        info!("new model loaded. has {} keyframes.", model.nkey());
        self.loaded = Some(LoadedScene {
            model,
            simulation,
            scene,
        });
        self.after_load();
        Ok(())
    }

    /// Post-load updates: camera, keyframe slider and actuator sliders.
    fn after_load(&mut self) {
        self.reset_camera();
        let Some(loaded) = &self.loaded else { return };
        self.panel.rebuild(&loaded.model);
        self.params.keyframe_number = self.params.keyframe_number.min(self.panel.keyframe.max);
        self.params.actuators = self
            .panel
            .actuators
            .iter()
            .map(|slider| (slider.name.clone(), 0.0))
            .collect();
    }

    /// Run `command`. Commands needing a simulation do nothing without one.
    pub fn execute(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Reload => self.reload()?,
            Command::Reset => self.reset_simulation(),
            Command::TogglePause => self.toggle_pause(),
            Command::ResetCamera => self.reset_camera(),
            Command::ToggleHelp => self.toggle_help(),
        }
        Ok(())
    }

    pub fn reset_simulation(&mut self) {
        match self.simulation_mut() {
            Some(sim) => {
                sim.reset_data();
                sim.forward();
            }
            None => warn!("Reset requested without a loaded simulation"),
        }
    }

    pub fn toggle_pause(&mut self) {
        self.set_paused(!self.params.paused);
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.params.paused = paused;
    }

    pub fn toggle_help(&mut self) {
        self.params.help = !self.params.help;
    }

    pub fn reset_camera(&mut self) {
        self.camera
            .reset(self.config.camera_position, self.config.camera_target);
    }

    /// Jump to keyframe `key`. Out-of-range keys only move the slider.
    pub fn set_keyframe(&mut self, key: usize) {
        self.params.keyframe_number = key;
        let Some(loaded) = self.loaded.as_mut() else {
            warn!("Keyframe {key} requested without a loaded simulation");
            return;
        };
        if let Some(qpos) = loaded.model.keyframe(key) {
            let target = loaded.simulation.qpos_mut();
            let n = target.len().min(qpos.len());
            target[..n].copy_from_slice(&qpos[..n]);
        }
    }

    /// Set the control of actuator `index` and its slider value.
    pub fn set_actuator(&mut self, index: usize, value: f64) {
        let Some(loaded) = self.loaded.as_mut() else {
            warn!("Actuator {index} set without a loaded simulation");
            return;
        };
        if let Some(slider) = self.panel.actuators.iter().find(|s| s.index == index) {
            self.params.actuators.insert(slider.name.clone(), value);
        }
        match loaded.simulation.ctrl_mut().get_mut(index) {
            Some(ctrl) => *ctrl = value,
            None => warn!("Actuator {index} is out of range"),
        }
    }

    /// Switch to the scene with display name `name` (or a scene path) and
    /// load it.
    pub fn select_scene(&mut self, name: &str) -> anyhow::Result<()> {
        self.params.scene = self
            .config
            .scene_by_name(name)
            .unwrap_or(name)
            .to_string();
        self.reload()
    }

    /// Handle a key press. Returns whether the key was bound.
    pub fn on_key(&mut self, key: KeyCode, modifiers: ModifiersState) -> anyhow::Result<bool> {
        match command_for_key(key, modifiers) {
            Some(command) => {
                self.execute(command)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn on_panel_event(&mut self, event: PanelEvent) -> anyhow::Result<()> {
        match event {
            PanelEvent::SceneSelected(name) => self.select_scene(&name)?,
            PanelEvent::PausedChanged(paused) => self.set_paused(paused),
            PanelEvent::Command(command) => self.execute(command)?,
            PanelEvent::KeyframeChanged(key) => self.set_keyframe(key),
            PanelEvent::ActuatorChanged { index, value } => self.set_actuator(index, value),
        }
        Ok(())
    }

    /// Advance the simulation to `now_ms` and bring the scene up to date.
    /// Returns the number of simulation steps taken.
    pub fn frame(&mut self, now_ms: f64) -> usize {
        let Some(loaded) = self.loaded.as_mut() else {
            return 0;
        };
        let steps = sync::advance(
            &mut loaded.simulation,
            &loaded.model,
            &mut self.params,
            &mut self.clock,
            now_ms,
            &mut self.rng,
        );
        sync::sync_poses(&mut loaded.scene, &loaded.simulation);
        sync::sync_tendons(&mut loaded.scene, &loaded.model, &loaded.simulation);
        steps
    }

    /// [`Self::frame`] at the wall-clock time since the context was created.
    pub fn tick(&mut self) -> usize {
        let now_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        self.frame(now_ms)
    }
}

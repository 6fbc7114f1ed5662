//! Viewer commands, their key bindings and the control-panel model.
//!
//! Keyboard shortcuts and panel widgets both resolve to a [`Command`] or a
//! [`PanelEvent`] which the viewer context executes, so every action has a
//! single implementation.

use winit::keyboard::{KeyCode, ModifiersState};

use crate::{config::ViewerConfig, physics::Model};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Reload,
    Reset,
    TogglePause,
    ResetCamera,
    ToggleHelp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: KeyCode,
    /// The binding only fires with Ctrl held. Bindings without it fire
    /// regardless of modifiers.
    pub ctrl: bool,
    pub command: Command,
    /// Help menu description.
    pub action: &'static str,
    /// Help menu key label.
    pub label: &'static str,
}

/// All shortcuts, in help menu order.
pub const KEY_BINDINGS: [KeyBinding; 5] = [
    KeyBinding {
        key: KeyCode::F1,
        ctrl: false,
        command: Command::ToggleHelp,
        action: "Help",
        label: "F1",
    },
    KeyBinding {
        key: KeyCode::Space,
        ctrl: false,
        command: Command::TogglePause,
        action: "Play / Pause",
        label: "Space",
    },
    KeyBinding {
        key: KeyCode::KeyL,
        ctrl: true,
        command: Command::Reload,
        action: "Reload XML",
        label: "Ctrl L",
    },
    KeyBinding {
        key: KeyCode::Backspace,
        ctrl: false,
        command: Command::Reset,
        action: "Reset simulation",
        label: "Backspace",
    },
    KeyBinding {
        key: KeyCode::KeyA,
        ctrl: true,
        command: Command::ResetCamera,
        action: "Reset free camera",
        label: "Ctrl A",
    },
];

pub fn command_for_key(key: KeyCode, modifiers: ModifiersState) -> Option<Command> {
    KEY_BINDINGS
        .iter()
        .find(|binding| binding.key == key && (!binding.ctrl || modifiers.control_key()))
        .map(|binding| binding.command)
}

/// `(action, key)` rows of the help menu.
pub fn help_rows() -> impl Iterator<Item = (&'static str, &'static str)> {
    KEY_BINDINGS.iter().map(|binding| (binding.action, binding.label))
}

/// Map a DOM `KeyboardEvent.code` onto the keys the viewer binds.
pub fn key_from_dom_code(code: &str) -> Option<KeyCode> {
    match code {
        "F1" => Some(KeyCode::F1),
        "Space" => Some(KeyCode::Space),
        "KeyL" => Some(KeyCode::KeyL),
        "Backspace" => Some(KeyCode::Backspace),
        "KeyA" => Some(KeyCode::KeyA),
        _ => None,
    }
}

/// Input from a control-panel widget.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    /// A scene chosen by display name.
    SceneSelected(String),
    PausedChanged(bool),
    Command(Command),
    KeyframeChanged(usize),
    ActuatorChanged { index: usize, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframeSlider {
    pub max: usize,
    /// Disabled sliders are drawn dimmed.
    pub enabled: bool,
}

impl KeyframeSlider {
    pub const STEP: usize = 1;

    pub fn for_model(model: &Model) -> Self {
        let nkey = model.nkey();
        Self {
            max: nkey.saturating_sub(1),
            enabled: nkey > 0,
        }
    }

    pub fn opacity(&self) -> f32 {
        if self.enabled { 1.0 } else { 0.5 }
    }
}

impl Default for KeyframeSlider {
    fn default() -> Self {
        Self {
            max: 0,
            enabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActuatorSlider {
    /// Actuator id, also the index into `ctrl`.
    pub index: usize,
    pub name: String,
    pub min: f64,
    pub max: f64,
}

impl ActuatorSlider {
    pub const STEP: f64 = 0.01;
}

/// One slider per control-limited actuator.
pub fn actuator_sliders(model: &Model) -> Vec<ActuatorSlider> {
    (0..model.nu())
        .filter(|&i| model.actuator_ctrllimited[i])
        .map(|i| ActuatorSlider {
            index: i,
            name: model.actuator_name(i).into_owned(),
            min: model.actuator_ctrlrange.get(2 * i).copied().unwrap_or(0.0),
            max: model.actuator_ctrlrange.get(2 * i + 1).copied().unwrap_or(0.0),
        })
        .collect()
}

/// State of the control panel widgets.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPanel {
    /// `(display name, scene path)` entries of the scene dropdown.
    pub scenes: Vec<(String, String)>,
    pub keyframe: KeyframeSlider,
    pub actuators: Vec<ActuatorSlider>,
    pub actuators_open: bool,
}

impl ControlPanel {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            scenes: config.scenes.clone(),
            keyframe: KeyframeSlider::default(),
            actuators: Vec::new(),
            actuators_open: false,
        }
    }

    /// Refresh the model-dependent widgets after a load.
    pub fn rebuild(&mut self, model: &Model) {
        self.keyframe = KeyframeSlider::for_model(model);
        self.actuators = actuator_sliders(model);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_bindings_need_ctrl() {
        let none = ModifiersState::empty();
        assert_eq!(command_for_key(KeyCode::KeyL, none), None);
        assert_eq!(command_for_key(KeyCode::KeyL, ModifiersState::CONTROL), Some(Command::Reload));
        assert_eq!(command_for_key(KeyCode::KeyA, ModifiersState::CONTROL), Some(Command::ResetCamera));
    }

    #[test]
    fn plain_bindings_ignore_modifiers() {
        assert_eq!(command_for_key(KeyCode::Space, ModifiersState::CONTROL), Some(Command::TogglePause));
        assert_eq!(command_for_key(KeyCode::F1, ModifiersState::empty()), Some(Command::ToggleHelp));
        assert_eq!(command_for_key(KeyCode::Backspace, ModifiersState::SHIFT), Some(Command::Reset));
        assert_eq!(command_for_key(KeyCode::KeyQ, ModifiersState::CONTROL), None);
    }

    #[test]
    fn one_binding_per_key() {
        for (i, a) in KEY_BINDINGS.iter().enumerate() {
            for b in &KEY_BINDINGS[i + 1..] {
                assert_ne!(a.key, b.key);
                assert_ne!(a.command, b.command);
            }
        }
    }

    #[test]
    fn help_rows_are_in_menu_order() {
        let rows: Vec<_> = help_rows().collect();
        assert_eq!(
            rows,
            vec![
                ("Help", "F1"),
                ("Play / Pause", "Space"),
                ("Reload XML", "Ctrl L"),
                ("Reset simulation", "Backspace"),
                ("Reset free camera", "Ctrl A"),
            ]
        );
    }

    #[test]
    fn dom_codes_map_to_bound_keys() {
        for binding in KEY_BINDINGS {
            let code = binding.label.trim_start_matches("Ctrl ");
            let code = if code.len() == 1 { format!("Key{code}") } else { code.to_string() };
            assert_eq!(key_from_dom_code(&code), Some(binding.key));
        }
        assert_eq!(key_from_dom_code("KeyZ"), None);
    }

    #[test]
    fn keyframe_slider_dims_without_keyframes() {
        let empty = KeyframeSlider::for_model(&Model::default());
        assert_eq!(empty.max, 0);
        assert_eq!(empty.opacity(), 0.5);

        let model = Model {
            nq: 1,
            key_qpos: vec![0.0, 0.5, 1.0],
            ..Default::default()
        };
        let slider = KeyframeSlider::for_model(&model);
        assert_eq!(slider.max, 2);
        assert!(slider.enabled);
    }

    #[test]
    fn only_limited_actuators_get_sliders() {
        let model = Model {
            names: b"free\0elbow\0".to_vec(),
            actuator_ctrllimited: vec![false, true],
            actuator_ctrlrange: vec![0.0, 0.0, -1.0, 2.0],
            name_actuatoradr: vec![0, 5],
            ..Default::default()
        };
        let sliders = actuator_sliders(&model);
        assert_eq!(
            sliders,
            vec![ActuatorSlider {
                index: 1,
                name: "elbow".to_string(),
                min: -1.0,
                max: 2.0,
            }]
        );
    }
}

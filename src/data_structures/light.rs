use cgmath::Vector3;

use crate::data_structures::scene_graph::NodeId;

/// Shadow map parameters shared by every model light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSettings {
    pub map_size: [u32; 2],
    pub near: f32,
    pub far: f32,
    pub bias: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            map_size: [1024, 1024],
            near: 1.0,
            far: 10.0,
            bias: -0.005,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Directional,
    Spot { penumbra: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub decay: f32,
    pub cast_shadow: bool,
    pub shadow: ShadowSettings,
    /// Scene node carrying the light's pose.
    pub node: NodeId,
    /// World-space point the light aims at, updated every frame.
    pub target: Vector3<f32>,
    /// `false` for the fallback light of a model without lights.
    pub from_model: bool,
}

impl Light {
    pub fn directional(node: NodeId) -> Self {
        Self {
            kind: LightKind::Directional,
            decay: 0.0,
            cast_shadow: true,
            shadow: ShadowSettings::default(),
            node,
            target: Vector3::new(0.0, 0.0, 0.0),
            from_model: true,
        }
    }

    /// A spot light whose decay is the model attenuation scaled by 100.
    pub fn spot(node: NodeId, attenuation: f32) -> Self {
        Self {
            kind: LightKind::Spot { penumbra: 0.5 },
            decay: attenuation * 100.0,
            ..Self::directional(node)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spot_decay_scales_attenuation() {
        let light = Light::spot(NodeId(3), 0.25);
        assert_eq!(light.kind, LightKind::Spot { penumbra: 0.5 });
        assert_eq!(light.decay, 25.0);
        assert!(light.cast_shadow && light.from_model);
        assert_eq!(light.shadow.map_size, [1024, 1024]);
        assert_eq!(Light::directional(NodeId(3)).decay, 0.0);
    }
}

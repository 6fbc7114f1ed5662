use std::sync::Arc;

use crate::data_structures::texture::Texture;

/// Surface parameters of a model material.
///
/// These are only set when the geom references a material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub specular_intensity: f32,
    pub reflectivity: f32,
    pub roughness: f32,
    pub metalness: f32,
}

impl Surface {
    pub fn from_model(specular: f32, reflectance: f32, shininess: f32) -> Self {
        Self {
            specular_intensity: specular * 0.5,
            reflectivity: reflectance,
            roughness: 1.0 - shininess,
            metalness: 0.1,
        }
    }
}

/// A physically based material.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: [f32; 3],
    pub opacity: f32,
    pub transparent: bool,
    pub map: Option<Arc<Texture>>,
    pub surface: Option<Surface>,
}

impl Material {
    pub fn new(rgba: [f32; 4], map: Option<Arc<Texture>>, surface: Option<Surface>) -> Self {
        Self {
            color: [rgba[0], rgba[1], rgba[2]],
            opacity: rgba[3],
            transparent: rgba[3] < 1.0,
            map,
            surface,
        }
    }

    /// Whether this material can stand in for a geom with the given colour
    /// and texture. Only colour, opacity and the texture source count.
    pub fn matches(&self, rgba: [f32; 4], texture: Option<usize>) -> bool {
        self.color == [rgba[0], rgba[1], rgba[2]]
            && self.opacity == rgba[3]
            && self.map.as_ref().map(|map| map.source) == texture
    }

    pub fn texture_id(&self) -> Option<usize> {
        self.map.as_ref().map(|map| map.source)
    }
}

impl Default for Material {
    /// Opaque white, untextured.
    fn default() -> Self {
        Self::new([1.0, 1.0, 1.0, 1.0], None, None)
    }
}

/// Flat-shaded material used for tendon pools.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhongMaterial {
    pub color: [f32; 3],
}

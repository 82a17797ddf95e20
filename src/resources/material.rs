use glam::{Vec3, Vec4};

/// Minimal PBR factor record attached to a mesh primitive.
///
/// Only the factors are carried; textures and images are outside the scope of
/// this pipeline. Factors round-trip through import and export so merged
/// output keeps its tinting.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    pub base_color: Vec4,
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: Vec3,
    pub double_sided: bool,
}

impl Material {
    #[must_use]
    pub fn new(base_color: Vec4) -> Self {
        Self {
            name: None,
            base_color,
            metallic: 1.0,
            roughness: 1.0,
            emissive: Vec3::ZERO,
            double_sided: false,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(Vec4::ONE)
    }
}

//! Material system for Blinn-Phong rendering
//!
//! Materials are stored centrally in [`MaterialManager`] and mesh nodes
//! reference them by [`MaterialId`]. Several meshes may share one material;
//! changing it changes all of them.

use crate::gfx::color::Color;

/// Index of a material inside the [`MaterialManager`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub usize);

/// Index of a 2D texture stored in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

/// GPU uniform data for materials
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    /// x = shininess, y = specular strength, z = 1 when textured
    pub params: [f32; 4],
}

/// Surface description: diffuse color, optional texture and specular response
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub color: Color,
    pub texture: Option<TextureId>,
    pub shininess: f32,
    pub specular: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            color: Color::new(0.8, 0.8, 0.8),
            texture: None,
            shininess: 30.0,
            specular: 0.25,
        }
    }
}

impl Material {
    pub fn new(name: &str, color: Color) -> Self {
        Self {
            name: name.to_string(),
            color,
            ..Default::default()
        }
    }

    /// Builder pattern: Set the diffuse texture
    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn to_uniform(&self) -> MaterialUniform {
        MaterialUniform {
            base_color: self.color.to_linear().to_rgba(1.0),
            params: [
                self.shininess,
                self.specular,
                if self.texture.is_some() { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}

/// Manages all materials in the scene
#[derive(Debug, Default)]
pub struct MaterialManager {
    materials: Vec<Material>,
}

impl MaterialManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a material and returns its id
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn get_material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn get_material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id.0)
    }

    /// Duplicates a material so the copy can be changed independently
    pub fn clone_material(&mut self, id: MaterialId) -> Option<MaterialId> {
        let copy = self.get_material(id)?.clone();
        Some(self.add_material(copy))
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(i, material)| (MaterialId(i), material))
    }
}

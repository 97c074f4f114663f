//! Global uniform bindings for camera and scene data
//!
//! Manages the per-frame uniform shared by every draw call: camera matrices,
//! the packed light list and the light-space matrices of the shadow maps.

use cgmath::{
    ortho, perspective, EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3,
    Vector4,
};

use crate::{
    gfx::{
        camera::{orbit_camera::OPENGL_TO_WGPU_MATRIX, OrbitCamera},
        scene::{LightKind, NodeId, Scene},
    },
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Lights beyond this count are ignored by the lit shader
pub const MAX_LIGHTS: usize = 8;
/// Number of layers in the shadow-map array
pub const MAX_SHADOW_MAPS: usize = 4;

const LIGHT_POINT: f32 = 1.0;
const LIGHT_SPOT: f32 = 2.0;
const LIGHT_DIRECTIONAL: f32 = 3.0;

const SHADOW_NEAR: f32 = 0.5;
const SHADOW_FAR: f32 = 100.0;
const DIRECTIONAL_SHADOW_EXTENT: f32 = 25.0;

/// One light as seen by the shader. MUST match `LightData` in the shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightData {
    /// xyz = world position, w = kind
    pub position: [f32; 4],
    /// xyz = direction the light travels, w = range (point lights)
    pub direction: [f32; 4],
    /// rgb = color, a = intensity
    pub color: [f32; 4],
    /// x = cos outer cone, y = cos inner cone, z = shadow layer or -1, w = bias
    pub params: [f32; 4],
}

/// Global uniform buffer content. MUST match `Globals` in the shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
    /// Inverse of the rotation-only view-projection, for skybox directions
    pub sky_inv_view_proj: [[f32; 4]; 4],
    /// rgb = summed ambient light
    pub ambient: [f32; 4],
    /// x = number of used `lights` entries
    pub counts: [u32; 4],
    pub lights: [LightData; MAX_LIGHTS],
    pub shadow_view_proj: [[[f32; 4]; 4]; MAX_SHADOW_MAPS],
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// A light that renders into one layer of the shadow-map array
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowCaster {
    pub light: NodeId,
    pub layer: u32,
    pub map_size: u32,
    pub view_proj: Matrix4<f32>,
}

/// Assigns shadow-map layers to shadow-casting directional and spot lights
///
/// Point-light shadows would need a cube map per light and are not drawn;
/// the point light still illuminates the scene.
pub fn shadow_casters(scene: &Scene) -> Vec<ShadowCaster> {
    let mut casters = Vec::new();

    for (id, light) in scene.lights() {
        let Some(shadow) = light.shadow else {
            continue;
        };

        let projection = match light.kind {
            LightKind::Directional { .. } => ortho(
                -DIRECTIONAL_SHADOW_EXTENT,
                DIRECTIONAL_SHADOW_EXTENT,
                -DIRECTIONAL_SHADOW_EXTENT,
                DIRECTIONAL_SHADOW_EXTENT,
                SHADOW_NEAR,
                SHADOW_FAR,
            ),
            LightKind::Spot { angle, .. } => perspective(Rad(angle * 2.0), 1.0, SHADOW_NEAR, SHADOW_FAR),
            LightKind::Ambient | LightKind::Point { .. } => continue,
        };

        if casters.len() == MAX_SHADOW_MAPS {
            log::warn!("Shadow map limit reached, light {:?} casts no shadow", id);
            break;
        }

        let eye = scene.world_position(id);
        let target = light
            .target()
            .map_or(Vector3::new(0.0, 0.0, 0.0), |t| scene.resolve_target(t));

        casters.push(ShadowCaster {
            light: id,
            layer: casters.len() as u32,
            map_size: shadow.map_size,
            view_proj: OPENGL_TO_WGPU_MATRIX * projection * look_at(eye, target),
        });
    }

    casters
}

fn look_at(eye: Vector3<f32>, target: Vector3<f32>) -> Matrix4<f32> {
    let forward = (target - eye).normalize();
    let up = if forward.y.abs() > 0.99 {
        Vector3::unit_z()
    } else {
        Vector3::unit_y()
    };
    Matrix4::look_at_rh(Point3::from_vec(eye), Point3::from_vec(target), up)
}

impl GlobalUBOContent {
    /// Packs camera, lights and shadow matrices for one frame
    pub fn build(camera: &OrbitCamera, scene: &Scene, casters: &[ShadowCaster]) -> Self {
        let mut content: GlobalUBOContent = bytemuck::Zeroable::zeroed();

        content.view_position = camera.uniform.view_position;
        content.view_proj = camera.uniform.view_proj;

        let mut rotation_only = camera.view_matrix();
        rotation_only.w = Vector4::new(0.0, 0.0, 0.0, 1.0);
        let sky_view_proj = OPENGL_TO_WGPU_MATRIX * camera.projection_matrix() * rotation_only;
        content.sky_inv_view_proj = sky_view_proj
            .invert()
            .unwrap_or_else(Matrix4::identity)
            .into();

        let mut count = 0;
        for (id, light) in scene.lights() {
            let radiance = light.color.to_linear();

            let (kind, range, cos_outer, cos_inner) = match light.kind {
                LightKind::Ambient => {
                    content.ambient[0] += radiance.r * light.intensity;
                    content.ambient[1] += radiance.g * light.intensity;
                    content.ambient[2] += radiance.b * light.intensity;
                    continue;
                }
                LightKind::Point { range } => (LIGHT_POINT, range, -1.0, -1.0),
                LightKind::Spot {
                    angle, penumbra, ..
                } => (
                    LIGHT_SPOT,
                    0.0,
                    angle.cos(),
                    (angle * (1.0 - penumbra)).cos(),
                ),
                LightKind::Directional { .. } => (LIGHT_DIRECTIONAL, 0.0, -1.0, -1.0),
            };

            if count == MAX_LIGHTS {
                log::warn!("Light limit reached, ignoring light {:?}", id);
                break;
            }

            let position = scene.world_position(id);
            let direction = light
                .target()
                .map(|target| scene.resolve_target(target) - position)
                .filter(|d| d.magnitude2() > 0.0)
                .map_or(Vector3::new(0.0, -1.0, 0.0), |d| d.normalize());

            let caster = casters.iter().find(|c| c.light == id);
            let shadow_layer = caster.map_or(-1.0, |c| c.layer as f32);
            let bias = light.shadow.map_or(0.0, |s| s.bias);

            content.lights[count] = LightData {
                position: [position.x, position.y, position.z, kind],
                direction: [direction.x, direction.y, direction.z, range],
                color: [radiance.r, radiance.g, radiance.b, light.intensity],
                params: [cos_outer, cos_inner, shadow_layer, bias],
            };
            count += 1;
        }
        content.counts[0] = count as u32;

        for caster in casters {
            content.shadow_view_proj[caster.layer as usize] = caster.view_proj.into();
        }

        content
    }
}

/// Bind group layout and bind group for the global uniform (group 0)
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group Layout");

        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Globals Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{color::Color, lighting::LightingRig};
    use cgmath::Deg;

    fn rig_scene() -> (Scene, LightingRig) {
        let mut scene = Scene::new();
        let rig = LightingRig::install(&mut scene);
        (scene, rig)
    }

    #[test]
    fn test_point_light_gets_no_shadow_layer() {
        let (scene, rig) = rig_scene();
        let casters = shadow_casters(&scene);

        let lights: Vec<NodeId> = casters.iter().map(|c| c.light).collect();
        assert_eq!(lights, vec![rig.spot, rig.directional, rig.debug]);
        assert_eq!(casters.iter().map(|c| c.layer).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(casters[2].map_size, 2048);
    }

    #[test]
    fn test_light_colors_are_packed_linear() {
        let (mut scene, rig) = rig_scene();
        if let Some(point) = scene.light_mut(rig.point) {
            point.color = Color::new(0.5, 1.0, 0.0);
        }
        let camera = OrbitCamera::from_eye(
            Vector3::new(0.0, 5.0, 15.0),
            Vector3::new(0.0, 0.0, 0.0),
            Deg(75.0).into(),
            1.0,
            0.1,
            1000.0,
        );
        let content = GlobalUBOContent::build(&camera, &scene, &shadow_casters(&scene));

        let point = content.lights.iter().find(|l| l.position[3] == LIGHT_POINT).unwrap();
        assert!((point.color[0] - 0.2140).abs() < 1e-3);
        assert!((point.color[1] - 1.0).abs() < 1e-5);
        assert_eq!(point.color[2], 0.0);
    }

    #[test]
    fn test_shadow_matrix_keeps_target_in_view() {
        let (scene, _) = rig_scene();
        for caster in shadow_casters(&scene) {
            let clip = caster.view_proj * Vector4::new(0.0, 0.0, 0.0, 1.0);
            let ndc = clip.truncate() / clip.w;
            assert!(ndc.x.abs() < 1e-3 && ndc.y.abs() < 1e-3);
            assert!(ndc.z > 0.0 && ndc.z < 1.0);
        }
    }

    #[test]
    fn test_build_packs_lights() {
        let (scene, rig) = rig_scene();
        let camera = OrbitCamera::from_eye(
            Vector3::new(0.0, 5.0, 15.0),
            Vector3::new(0.0, 0.0, 0.0),
            Deg(75.0).into(),
            16.0 / 9.0,
            0.1,
            1000.0,
        );
        let casters = shadow_casters(&scene);
        let content = GlobalUBOContent::build(&camera, &scene, &casters);

        assert_eq!(content.counts[0], 4);
        assert!((content.ambient[0] - 0.2).abs() < 1e-6);

        // Debug light aims from (5, 10, -5) at its target node at the origin
        let debug = content
            .lights
            .iter()
            .find(|l| l.color[3] == 0.8 && l.position[2] == -5.0)
            .unwrap();
        let expected = Vector3::new(-5.0, -10.0, 5.0).normalize();
        assert!((Vector3::new(debug.direction[0], debug.direction[1], debug.direction[2]) - expected).magnitude() < 1e-5);
        assert_eq!(debug.params[3], -0.001);
        assert_eq!(debug.params[2], 2.0);

        let point_position = scene.world_position(rig.point);
        let point = content.lights.iter().find(|l| l.position[3] == LIGHT_POINT).unwrap();
        assert_eq!(point.position[..3], [point_position.x, point_position.y, point_position.z]);
        assert_eq!(point.direction[3], 100.0);
        assert_eq!(point.params[2], -1.0);
    }
}

//! WGPU-based rendering engine
//!
//! Owns the surface, device and every GPU-side mirror of the scene. Frames are
//! drawn in three steps: one depth pass per shadow-casting light into a layer
//! of the shadow-map array, the lit main pass, then the skybox behind it.

use std::{collections::HashMap, sync::Arc};

use cgmath::{Matrix, Matrix4, SquareMatrix};
use wgpu::{util::DeviceExt, Device, TextureFormat};

use crate::{
    error::RenderError,
    gfx::{
        camera::OrbitCamera,
        resources::{
            global_bindings::{
                shadow_casters, GlobalBindings, GlobalUBO, GlobalUBOContent, ShadowCaster,
                MAX_SHADOW_MAPS,
            },
            image_data::ImageData,
            material::{Material, MaterialId, MaterialUniform, TextureId},
            texture_resource::TextureResource,
        },
        scene::{Background, CubeMapId, GeometryId, MeshNode, NodeId, Scene},
    },
    wgpu_utils::{
        binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc,
        UniformBuffer,
    },
};

use super::pipeline_manager::{PipelineConfig, PipelineManager};

const LIT_PIPELINE: &str = "Lit";
const SHADOW_PIPELINE: &str = "Shadow";
const SKYBOX_PIPELINE: &str = "Skybox";

/// Shadow map resolution used until a light asks for a specific one
const DEFAULT_SHADOW_MAP_SIZE: u32 = 1024;

/// Per-node uniform. MUST match `NodeData` in the shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct NodeUniform {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
    /// x = 1 when the node receives shadows
    params: [f32; 4],
}

impl NodeUniform {
    fn new(world: Matrix4<f32>, mesh: &MeshNode) -> Self {
        let normal = world.invert().map_or(world, |inverse| inverse.transpose());
        Self {
            model: world.into(),
            normal: normal.into(),
            params: [if mesh.receive_shadow { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct ShadowPassUniform {
    light_view_proj: [[f32; 4]; 4],
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

struct GpuNode {
    ubo: UniformBuffer<NodeUniform>,
    bind_group: wgpu::BindGroup,
}

struct GpuMaterial {
    ubo: UniformBuffer<MaterialUniform>,
    bind_group: wgpu::BindGroup,
    texture: Option<TextureId>,
}

struct GpuSkybox {
    cube_map: CubeMapId,
    _texture: TextureResource,
    bind_group: wgpu::BindGroup,
}

/// Shadow-map array with one depth layer per casting light
struct ShadowMaps {
    size: u32,
    array: TextureResource,
    layer_views: Vec<wgpu::TextureView>,
    passes: Vec<(UniformBuffer<ShadowPassUniform>, wgpu::BindGroup)>,
    bind_group: wgpu::BindGroup,
}

impl ShadowMaps {
    fn new(
        device: &Device,
        size: u32,
        sample_layout: &BindGroupLayoutWithDesc,
        pass_layout: &BindGroupLayoutWithDesc,
    ) -> Self {
        let array = TextureResource::create_shadow_map_array(device, size, MAX_SHADOW_MAPS as u32);
        let layer_views = (0..MAX_SHADOW_MAPS as u32)
            .map(|layer| array.layer_view(layer))
            .collect();

        let passes = (0..MAX_SHADOW_MAPS)
            .map(|_| {
                let ubo = UniformBuffer::<ShadowPassUniform>::new(device);
                let bind_group = BindGroupBuilder::new(pass_layout)
                    .resource(ubo.binding_resource())
                    .create(device, "Shadow Pass Bind Group");
                (ubo, bind_group)
            })
            .collect();

        let bind_group = BindGroupBuilder::new(sample_layout)
            .texture(&array.view)
            .sampler(&array.sampler)
            .create(device, "Shadow Map Bind Group");

        log::debug!("Created {}x{} shadow map array", size, size);

        Self {
            size,
            array,
            layer_views,
            passes,
            bind_group,
        }
    }
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,

    node_layout: BindGroupLayoutWithDesc,
    material_layout: BindGroupLayoutWithDesc,
    shadow_sample_layout: BindGroupLayoutWithDesc,
    shadow_pass_layout: BindGroupLayoutWithDesc,
    skybox_layout: BindGroupLayoutWithDesc,

    shadow_maps: ShadowMaps,
    fallback_texture: TextureResource,

    meshes: HashMap<GeometryId, GpuMesh>,
    nodes: HashMap<NodeId, GpuNode>,
    materials: HashMap<MaterialId, GpuMaterial>,
    textures: HashMap<TextureId, TextureResource>,
    skybox: Option<GpuSkybox>,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// # Errors
    /// Fails when no surface, adapter or device can be obtained.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<RenderEngine, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or(RenderError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let global_ubo = GlobalUBO::new(&device);
        let global_bindings = GlobalBindings::new(&device, &global_ubo);

        let node_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(&device, "Node Bind Group Layout");
        let material_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(&device, "Material Bind Group Layout");
        let shadow_sample_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::depth_texture_2d_array())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Comparison))
            .create(&device, "Shadow Map Bind Group Layout");
        let shadow_pass_layout = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::uniform())
            .create(&device, "Shadow Pass Bind Group Layout");
        let skybox_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_cube())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(&device, "Skybox Bind Group Layout");

        let shadow_maps = ShadowMaps::new(
            &device,
            DEFAULT_SHADOW_MAP_SIZE,
            &shadow_sample_layout,
            &shadow_pass_layout,
        );

        let fallback_texture = TextureResource::create_from_image(
            &device,
            &queue,
            &ImageData::solid_color(1, 1, [255, 255, 255, 255]),
            "Fallback Texture",
        );

        let device_handle: Arc<Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        pipeline_manager.load_shader("lit", include_str!("shaders/lit.wgsl"));
        pipeline_manager.load_shader("shadow", include_str!("shaders/shadow.wgsl"));
        pipeline_manager.load_shader("skybox", include_str!("shaders/skybox.wgsl"));

        pipeline_manager.register_pipeline(
            LIT_PIPELINE,
            PipelineConfig::shaded(
                "lit",
                format,
                vec![
                    global_bindings.bind_group_layout().clone(),
                    node_layout.layout.clone(),
                    material_layout.layout.clone(),
                    shadow_sample_layout.layout.clone(),
                ],
            ),
        );

        pipeline_manager.register_pipeline(
            SHADOW_PIPELINE,
            PipelineConfig::depth_only(
                "shadow",
                vec![shadow_pass_layout.layout.clone(), node_layout.layout.clone()],
                2,
                2.0,
            ),
        );

        pipeline_manager.register_pipeline(
            SKYBOX_PIPELINE,
            PipelineConfig::shaded(
                "skybox",
                format,
                vec![
                    global_bindings.bind_group_layout().clone(),
                    skybox_layout.layout.clone(),
                ],
            )
            .with_depth_test(wgpu::CompareFunction::LessEqual, false)
            .without_vertex_input(),
        );

        pipeline_manager.create_all_pipelines()?;

        Ok(RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            depth_texture,
            format,
            pipeline_manager,
            global_ubo,
            global_bindings,
            node_layout,
            material_layout,
            shadow_sample_layout,
            shadow_pass_layout,
            skybox_layout,
            shadow_maps,
            fallback_texture,
            meshes: HashMap::new(),
            nodes: HashMap::new(),
            materials: HashMap::new(),
            textures: HashMap::new(),
            skybox: None,
        })
    }

    /// Renders one frame of `scene` as seen from `camera`
    ///
    /// GPU mirrors of geometry, materials and textures are created the first
    /// time they are drawn, so nodes added after startup (the loaded model)
    /// need no extra registration. The optional `ui_callback` draws on top of
    /// the finished scene.
    pub fn render_frame<F>(&mut self, scene: &Scene, camera: &OrbitCamera, ui_callback: Option<F>)
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(err) => {
                log::warn!("Skipping frame: {}", err);
                return;
            }
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let casters = shadow_casters(scene);
        self.ensure_shadow_map_size(&casters);
        self.global_ubo.update_content(
            &self.queue,
            GlobalUBOContent::build(camera, scene, &casters),
        );
        self.prepare_scene(scene);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // PASS 1: one depth pass per shadow-casting light
        for caster in &casters {
            self.encode_shadow_pass(&mut encoder, scene, caster);
        }

        // PASS 2: lit scene, then the skybox fills whatever depth left at the far plane
        {
            let clear_color = match scene.background {
                Background::Color(color) => color.into(),
                Background::CubeMap(_) => wgpu::Color::BLACK,
            };

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(LIT_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(3, &self.shadow_maps.bind_group, &[]);

                for (id, mesh) in scene.meshes() {
                    let (Some(gpu_mesh), Some(node), Some(material)) = (
                        self.meshes.get(&mesh.geometry),
                        self.nodes.get(&id),
                        self.materials.get(&mesh.material),
                    ) else {
                        continue;
                    };

                    render_pass.set_bind_group(1, &node.bind_group, &[]);
                    render_pass.set_bind_group(2, &material.bind_group, &[]);
                    render_pass.set_vertex_buffer(0, gpu_mesh.vertex_buffer.slice(..));
                    render_pass
                        .set_index_buffer(gpu_mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..gpu_mesh.index_count, 0, 0..1);
                }
            }

            if let (Some(skybox), Some(pipeline)) = (
                self.skybox.as_ref(),
                self.pipeline_manager.get_pipeline(SKYBOX_PIPELINE),
            ) {
                if matches!(scene.background, Background::CubeMap(_)) {
                    render_pass.set_pipeline(pipeline);
                    render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);
                    render_pass.set_bind_group(1, &skybox.bind_group, &[]);
                    render_pass.draw(0..3, 0..1);
                }
            }
        }

        // PASS 3: UI overlay
        if let Some(ui_fn) = ui_callback {
            ui_fn(&self.device, &self.queue, &mut encoder, &surface_texture_view);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }

    fn encode_shadow_pass(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        scene: &Scene,
        caster: &ShadowCaster,
    ) {
        let layer = caster.layer as usize;
        let Some((ubo, bind_group)) = self.shadow_maps.passes.get_mut(layer) else {
            return;
        };
        ubo.update_content(
            &self.queue,
            ShadowPassUniform {
                light_view_proj: caster.view_proj.into(),
            },
        );

        let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Depth Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.shadow_maps.layer_views[layer],
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        let Some(pipeline) = self.pipeline_manager.get_pipeline(SHADOW_PIPELINE) else {
            return;
        };
        shadow_pass.set_pipeline(pipeline);
        shadow_pass.set_bind_group(0, &*bind_group, &[]);

        for (id, mesh) in scene.meshes().filter(|(_, mesh)| mesh.cast_shadow) {
            let (Some(gpu_mesh), Some(node)) = (self.meshes.get(&mesh.geometry), self.nodes.get(&id))
            else {
                continue;
            };
            shadow_pass.set_bind_group(1, &node.bind_group, &[]);
            shadow_pass.set_vertex_buffer(0, gpu_mesh.vertex_buffer.slice(..));
            shadow_pass.set_index_buffer(gpu_mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            shadow_pass.draw_indexed(0..gpu_mesh.index_count, 0, 0..1);
        }
    }

    /// Grows or shrinks the shadow array to the largest map any caster requests
    fn ensure_shadow_map_size(&mut self, casters: &[ShadowCaster]) {
        let max_dimension = self.device.limits().max_texture_dimension_2d;
        let size = casters
            .iter()
            .map(|c| c.map_size)
            .max()
            .unwrap_or(DEFAULT_SHADOW_MAP_SIZE)
            .clamp(1, max_dimension);

        if size != self.shadow_maps.size {
            self.shadow_maps = ShadowMaps::new(
                &self.device,
                size,
                &self.shadow_sample_layout,
                &self.shadow_pass_layout,
            );
        }
    }

    /// Uploads everything the scene references that has no GPU mirror yet
    fn prepare_scene(&mut self, scene: &Scene) {
        if let Background::CubeMap(id) = scene.background {
            self.prepare_skybox(scene, id);
        }

        for (id, mesh) in scene.meshes() {
            self.prepare_mesh(scene, mesh.geometry);
            self.prepare_material(scene, mesh.material);

            let uniform = NodeUniform::new(scene.world_matrix(id), mesh);
            match self.nodes.get_mut(&id) {
                Some(node) => {
                    node.ubo.update_content(&self.queue, uniform);
                }
                None => {
                    let ubo = UniformBuffer::new_with_data(&self.device, &uniform);
                    let bind_group = BindGroupBuilder::new(&self.node_layout)
                        .resource(ubo.binding_resource())
                        .create(&self.device, "Node Bind Group");
                    self.nodes.insert(id, GpuNode { ubo, bind_group });
                }
            }
        }
    }

    fn prepare_mesh(&mut self, scene: &Scene, id: GeometryId) {
        if self.meshes.contains_key(&id) {
            return;
        }
        let Some(geometry) = scene.geometry(id) else {
            return;
        };

        let vertices = geometry.data.to_vertices();
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(&geometry.data.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        self.meshes.insert(
            id,
            GpuMesh {
                vertex_buffer,
                index_buffer,
                index_count: geometry.data.indices.len() as u32,
            },
        );
    }

    fn prepare_material(&mut self, scene: &Scene, id: MaterialId) {
        let Some(material) = scene.materials.get_material(id) else {
            return;
        };
        let uniform = material.to_uniform();

        if let Some(gpu) = self.materials.get_mut(&id) {
            gpu.ubo.update_content(&self.queue, uniform);
            if gpu.texture == material.texture {
                return;
            }
        }

        if let Some(texture) = material.texture {
            self.prepare_texture(scene, texture);
        }

        let ubo = match self.materials.remove(&id) {
            Some(existing) => existing.ubo,
            None => UniformBuffer::new_with_data(&self.device, &uniform),
        };
        let bind_group = self.material_bind_group(material, &ubo);

        self.materials.insert(
            id,
            GpuMaterial {
                ubo,
                bind_group,
                texture: material.texture,
            },
        );
    }

    fn material_bind_group(
        &self,
        material: &Material,
        ubo: &UniformBuffer<MaterialUniform>,
    ) -> wgpu::BindGroup {
        let texture = material
            .texture
            .and_then(|id| self.textures.get(&id))
            .unwrap_or(&self.fallback_texture);

        BindGroupBuilder::new(&self.material_layout)
            .resource(ubo.binding_resource())
            .texture(&texture.view)
            .sampler(&texture.sampler)
            .create(&self.device, &format!("Material '{}' Bind Group", material.name))
    }

    fn prepare_texture(&mut self, scene: &Scene, id: TextureId) {
        if self.textures.contains_key(&id) {
            return;
        }
        if let Some(image) = scene.texture(id) {
            let texture = TextureResource::create_from_image(
                &self.device,
                &self.queue,
                image,
                &format!("Texture {}", id.0),
            );
            self.textures.insert(id, texture);
        }
    }

    fn prepare_skybox(&mut self, scene: &Scene, id: CubeMapId) {
        if self.skybox.as_ref().is_some_and(|s| s.cube_map == id) {
            return;
        }
        let Some(cube) = scene.cube_map(id) else {
            return;
        };

        let texture = TextureResource::create_cube_map(&self.device, &self.queue, cube);
        let bind_group = BindGroupBuilder::new(&self.skybox_layout)
            .texture(&texture.view)
            .sampler(&texture.sampler)
            .create(&self.device, "Skybox Bind Group");

        self.skybox = Some(GpuSkybox {
            cube_map: id,
            _texture: texture,
            bind_group,
        });
    }

    /// Resizes the surface and recreates the depth buffer
    ///
    /// Zero-sized requests (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Returns reference to the wgpu device
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns reference to the wgpu command queue
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns the surface texture format
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

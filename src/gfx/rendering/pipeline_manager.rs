//! Named render pipelines built from declarative configs
//!
//! Every pipeline renders against the shared depth format with face culling
//! off.

use std::{collections::HashMap, sync::Arc};
use wgpu::*;

use crate::error::RenderError;
use crate::gfx::resources::TextureResource;
use crate::gfx::scene::vertex::Vertex3D;

/// What a pipeline draws into and how it tests depth
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub shader: String,
    pub bind_group_layouts: Vec<BindGroupLayout>,
    /// `None` builds a depth-only pipeline without a fragment stage
    pub color_format: Option<TextureFormat>,
    pub depth_compare: CompareFunction,
    pub depth_write: bool,
    pub depth_bias: DepthBiasState,
    /// Mesh pipelines read [`Vertex3D`] buffers; fullscreen passes read none
    pub vertex_input: bool,
}

impl PipelineConfig {
    /// A mesh pipeline shading into `color_format` with a standard depth test
    pub fn shaded(shader: &str, color_format: TextureFormat, layouts: Vec<BindGroupLayout>) -> Self {
        Self {
            shader: shader.to_string(),
            bind_group_layouts: layouts,
            color_format: Some(color_format),
            depth_compare: CompareFunction::Less,
            depth_write: true,
            depth_bias: DepthBiasState::default(),
            vertex_input: true,
        }
    }

    /// A depth-only mesh pipeline with constant and slope-scaled bias
    pub fn depth_only(shader: &str, layouts: Vec<BindGroupLayout>, constant: i32, slope_scale: f32) -> Self {
        Self {
            shader: shader.to_string(),
            bind_group_layouts: layouts,
            color_format: None,
            depth_compare: CompareFunction::Less,
            depth_write: true,
            depth_bias: DepthBiasState {
                constant,
                slope_scale,
                clamp: 0.0,
            },
            vertex_input: true,
        }
    }

    /// Depth comparison and whether passing fragments write depth
    pub fn with_depth_test(mut self, compare: CompareFunction, write: bool) -> Self {
        self.depth_compare = compare;
        self.depth_write = write;
        self
    }

    /// Fullscreen pass: the vertex shader generates its own positions
    pub fn without_vertex_input(mut self) -> Self {
        self.vertex_input = false;
        self
    }
}

/// Compiles shaders and builds named render pipelines from [`PipelineConfig`]s
///
/// Pipelines are registered first and built together by
/// [`PipelineManager::create_all_pipelines`], once every shader is loaded.
pub struct PipelineManager {
    device: Arc<Device>,
    pipelines: HashMap<String, RenderPipeline>,
    shader_modules: HashMap<String, ShaderModule>,
    pending: Vec<(String, PipelineConfig)>,
}

impl PipelineManager {
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            pipelines: HashMap::new(),
            shader_modules: HashMap::new(),
            pending: Vec::new(),
        }
    }

    /// Queues a pipeline; it exists after the next `create_all_pipelines`
    pub fn register_pipeline(&mut self, name: &str, config: PipelineConfig) {
        self.pending.push((name.to_string(), config));
    }

    pub fn load_shader(&mut self, name: &str, source: &str) {
        let module = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        });
        self.shader_modules.insert(name.to_string(), module);
    }

    pub fn get_pipeline(&self, name: &str) -> Option<&RenderPipeline> {
        self.pipelines.get(name)
    }

    /// Builds every queued pipeline
    ///
    /// # Errors
    /// Fails on the first pipeline whose shader was never loaded.
    pub fn create_all_pipelines(&mut self) -> Result<(), RenderError> {
        for (name, config) in std::mem::take(&mut self.pending) {
            let pipeline = self.build(&name, &config)?;
            log::debug!("Created pipeline '{}'", name);
            self.pipelines.insert(name, pipeline);
        }
        Ok(())
    }

    fn build(&self, name: &str, config: &PipelineConfig) -> Result<RenderPipeline, RenderError> {
        let shader = self
            .shader_modules
            .get(&config.shader)
            .ok_or_else(|| RenderError::MissingShader(config.shader.clone()))?;

        let layouts: Vec<&BindGroupLayout> = config.bind_group_layouts.iter().collect();
        let layout = self.device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some(name),
            bind_group_layouts: &layouts,
            push_constant_ranges: &[],
        });

        let targets: Vec<Option<ColorTargetState>> = config
            .color_format
            .map(|format| ColorTargetState {
                format,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })
            .into_iter()
            .map(Some)
            .collect();

        let vertex_buffers = if config.vertex_input {
            vec![Vertex3D::desc()]
        } else {
            Vec::new()
        };

        Ok(self.device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(name),
            layout: Some(&layout),
            vertex: VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &vertex_buffers,
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: config.color_format.map(|_| FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &targets,
                compilation_options: PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState {
                cull_mode: None,
                ..PrimitiveState::default()
            },
            depth_stencil: Some(DepthStencilState {
                format: TextureResource::DEPTH_FORMAT,
                depth_write_enabled: config.depth_write,
                depth_compare: config.depth_compare,
                stencil: StencilState::default(),
                bias: config.depth_bias,
            }),
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        }))
    }
}

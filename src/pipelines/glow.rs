use cgmath::{InnerSpace, Vector3};

use crate::{
    config::{GlobeConfig, hex_to_rgb},
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::basic::{PipelineOptions, mk_material_pipeline_layout, mk_render_pipeline},
};

/// Layout mirrors `GlowUniform` in `glow.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlowUniform {
    pub color: [f32; 3],
    pub bias: f32,
    pub power: f32,
    pub alpha: f32,
    pub _padding: [f32; 2],
}

impl GlowUniform {
    pub fn from_config(config: &GlobeConfig) -> Self {
        Self {
            color: hex_to_rgb(config.glow_color),
            bias: config.glow_bias,
            power: config.glow_power,
            alpha: config.glow_alpha,
            _padding: [0.0; 2],
        }
    }
}

/// Rim intensity of the atmosphere shell for an outward `normal` seen along `view`
/// (surface towards camera). Never negative and finite for any unit inputs.
pub fn glow_intensity(normal: Vector3<f32>, view: Vector3<f32>, bias: f32, power: f32) -> f32 {
    let facing = if normal.magnitude2() > 0.0 && view.magnitude2() > 0.0 {
        normal.normalize().dot(view.normalize())
    } else {
        0.0
    };
    (bias - facing).max(0.0).powf(power)
}

pub fn mk_glow_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    flat_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = mk_material_pipeline_layout(
        device,
        "Glow Pipeline Layout",
        camera_bind_group_layout,
        flat_layout,
    );
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Glow Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("glow.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        format,
        Some(Texture::DEPTH_FORMAT),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        shader,
        PipelineOptions {
            // Only the inside of the shell is drawn, so the halo hugs the silhouette.
            cull_mode: Some(wgpu::Face::Front),
            ..PipelineOptions::additive("Glow Pipeline")
        },
    )
}

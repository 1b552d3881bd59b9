use crate::{
    config::CloudConfig,
    data_structures::{
        instance::InstanceRaw,
        material::TimeUniform,
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::basic::{PipelineOptions, mk_material_pipeline_layout, mk_render_pipeline},
};

/// Layout mirrors `CloudUniform` in `cloud.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CloudUniform {
    pub color: [f32; 3],
    pub time: f32,
    pub wobble_amplitude: f32,
    pub wobble_speed: f32,
    pub breathing: f32,
    /// UV scroll of the coverage noise per unit of time.
    pub drift: f32,
}

impl CloudUniform {
    pub fn from_config(config: &CloudConfig) -> Self {
        Self {
            color: config.color,
            time: 0.0,
            wobble_amplitude: 0.5,
            wobble_speed: 0.2,
            breathing: config.breathing,
            drift: 0.01,
        }
    }
}

impl TimeUniform for CloudUniform {
    fn set_time(&mut self, time: f32) {
        self.time = time;
    }

    fn time(&self) -> f32 {
        self.time
    }
}

pub fn mk_cloud_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    single_texture_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = mk_material_pipeline_layout(
        device,
        "Cloud Pipeline Layout",
        camera_bind_group_layout,
        single_texture_layout,
    );
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Cloud Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("cloud.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        format,
        Some(Texture::DEPTH_FORMAT),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        shader,
        PipelineOptions::additive("Cloud Pipeline"),
    )
}

use crate::{
    config::hex_to_rgb,
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::basic::{PipelineOptions, mk_material_pipeline_layout, mk_render_pipeline},
};

/// Layout mirrors `WireUniform` in `wireframe.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct WireUniform {
    pub color: [f32; 3],
    pub opacity: f32,
}

impl WireUniform {
    pub fn new(color: u32, opacity: f32) -> Self {
        Self {
            color: hex_to_rgb(color),
            opacity,
        }
    }
}

/// Draws index pairs of a [`crate::data_structures::model::MeshData::to_wireframe`] mesh as lines.
pub fn mk_wireframe_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    flat_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = mk_material_pipeline_layout(
        device,
        "Wireframe Pipeline Layout",
        camera_bind_group_layout,
        flat_layout,
    );
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Wireframe Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("wireframe.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        format,
        Some(Texture::DEPTH_FORMAT),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        shader,
        PipelineOptions {
            topology: wgpu::PrimitiveTopology::LineList,
            cull_mode: None,
            ..PipelineOptions::translucent("Wireframe Pipeline")
        },
    )
}

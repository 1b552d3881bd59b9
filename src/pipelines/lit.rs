use cgmath::InnerSpace;

use crate::{
    config::{LightConfig, hex_to_rgb},
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::basic::{PipelineOptions, mk_material_pipeline_layout, mk_render_pipeline},
};

/// Directional, ambient and hemisphere lighting with optional bump and specular maps.
/// Layout mirrors `LitUniform` in `lit.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LitUniform {
    pub sun_direction: [f32; 3],
    pub sun_intensity: f32,
    pub sun_color: [f32; 3],
    pub shininess: f32,
    pub ambient: [f32; 3],
    pub bump_scale: f32,
    pub sky_color: [f32; 3],
    pub fog_near: f32,
    pub ground_color: [f32; 3],
    pub fog_far: f32,
    pub fog_color: [f32; 3],
    pub specular_strength: f32,
    pub specular_color: [f32; 3],
    pub opacity: f32,
}

impl LitUniform {
    /// Matte lighting without bump or specular contribution.
    pub fn from_lights(lights: &LightConfig, fog_color: u32, fog_near: f32, fog_far: f32) -> Self {
        let direction = cgmath::Vector3::from(lights.sun_position);
        let direction = if direction.magnitude2() > 0.0 {
            direction.normalize()
        } else {
            cgmath::Vector3::unit_y()
        };
        let scale = |rgb: [f32; 3], k: f32| [rgb[0] * k, rgb[1] * k, rgb[2] * k];
        Self {
            sun_direction: direction.into(),
            sun_intensity: lights.sun_intensity,
            sun_color: hex_to_rgb(lights.sun_color),
            shininess: 1.0,
            ambient: scale(hex_to_rgb(lights.ambient_color), lights.ambient_intensity),
            bump_scale: 0.0,
            sky_color: scale(hex_to_rgb(lights.sky_color), lights.hemisphere_intensity),
            fog_near,
            ground_color: scale(hex_to_rgb(lights.ground_color), lights.hemisphere_intensity),
            fog_far,
            fog_color: hex_to_rgb(fog_color),
            specular_strength: 0.0,
            specular_color: [0.0; 3],
            opacity: 1.0,
        }
    }

    pub fn with_specular(mut self, color: u32, shininess: f32) -> Self {
        self.specular_color = hex_to_rgb(color);
        self.shininess = shininess;
        self.specular_strength = 1.0;
        self
    }

    pub fn with_bump(mut self, bump_scale: f32) -> Self {
        self.bump_scale = bump_scale;
        self
    }
}

fn mk_lit_layout(
    device: &wgpu::Device,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    lit_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::PipelineLayout {
    mk_material_pipeline_layout(
        device,
        "Lit Pipeline Layout",
        camera_bind_group_layout,
        lit_bind_group_layout,
    )
}

fn lit_shader() -> wgpu::ShaderModuleDescriptor<'static> {
    wgpu::ShaderModuleDescriptor {
        label: Some("Lit Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("lit.wgsl").into()),
    }
}

pub fn mk_lit_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    lit_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = mk_lit_layout(device, camera_bind_group_layout, lit_bind_group_layout);
    mk_render_pipeline(
        device,
        &layout,
        format,
        Some(Texture::DEPTH_FORMAT),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        lit_shader(),
        PipelineOptions::opaque("Lit Pipeline"),
    )
}

/// Same shader as [`mk_lit_pipeline`], alpha blended for the semi-transparent peaks.
pub fn mk_translucent_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    lit_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = mk_lit_layout(device, camera_bind_group_layout, lit_bind_group_layout);
    mk_render_pipeline(
        device,
        &layout,
        format,
        Some(Texture::DEPTH_FORMAT),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        lit_shader(),
        PipelineOptions::translucent("Translucent Pipeline"),
    )
}

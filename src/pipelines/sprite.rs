use crate::{
    config::ParticleConfig,
    data_structures::{
        material::TimeUniform,
        model::Vertex,
        particles::ParticleRaw,
        texture::Texture,
    },
    pipelines::basic::{PipelineOptions, mk_material_pipeline_layout, mk_render_pipeline},
};

/// Camera-facing quads drawn per particle: 6 vertices, generated from the vertex index.
pub const SPRITE_VERTICES: u32 = 6;

/// Layout mirrors `SpriteUniform` in `sprite.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteUniform {
    pub time: f32,
    pub opacity: f32,
    pub sprite_scale: f32,
    pub wind_strength: f32,
    /// Distance fade range. A range with `fade_far <= fade_near` disables fading.
    pub fade_near: f32,
    pub fade_far: f32,
    pub _padding: [f32; 2],
}

impl SpriteUniform {
    pub fn from_config(config: &ParticleConfig) -> Self {
        Self {
            time: 0.0,
            opacity: config.opacity,
            sprite_scale: config.sprite_scale,
            wind_strength: config.wind_strength,
            fade_near: config.fade_near,
            fade_far: config.fade_far,
            _padding: [0.0; 2],
        }
    }
}

impl TimeUniform for SpriteUniform {
    fn set_time(&mut self, time: f32) {
        self.time = time;
    }

    fn time(&self) -> f32 {
        self.time
    }
}

fn mk_sprite_pipeline_with(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    single_texture_layout: &wgpu::BindGroupLayout,
    options: PipelineOptions,
) -> wgpu::RenderPipeline {
    let layout = mk_material_pipeline_layout(
        device,
        "Sprite Pipeline Layout",
        camera_bind_group_layout,
        single_texture_layout,
    );
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Sprite Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("sprite.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        format,
        Some(Texture::DEPTH_FORMAT),
        &[ParticleRaw::desc()],
        shader,
        PipelineOptions {
            cull_mode: None,
            ..options
        },
    )
}

/// Additive sprites hidden behind opaque geometry (atmosphere dust, stars).
pub fn mk_sprite_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    single_texture_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    mk_sprite_pipeline_with(
        device,
        format,
        camera_bind_group_layout,
        single_texture_layout,
        PipelineOptions::additive("Sprite Pipeline"),
    )
}

/// Additive sprites drawn over everything (falling snow).
pub fn mk_overlay_sprite_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    single_texture_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    mk_sprite_pipeline_with(
        device,
        format,
        camera_bind_group_layout,
        single_texture_layout,
        PipelineOptions {
            depth_compare: wgpu::CompareFunction::Always,
            ..PipelineOptions::additive("Overlay Sprite Pipeline")
        },
    )
}

use crate::{
    config::{TerrainConfig, hex_to_rgb},
    data_structures::{
        instance::InstanceRaw,
        material::TimeUniform,
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::basic::{PipelineOptions, mk_material_pipeline_layout, mk_render_pipeline},
};

/// Terrain shading parameters. Layout mirrors `TerrainUniform` in `terrain.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainUniform {
    pub light_direction: [f32; 3],
    pub time: f32,
    pub light_color: [f32; 3],
    pub snow_level: f32,
    pub ambient_color: [f32; 3],
    pub snow_blend: f32,
    pub fog_color: [f32; 3],
    pub fog_near: f32,
    pub fog_far: f32,
    pub uv_scale: f32,
    pub displacement_scale: f32,
    pub idle_amplitude: f32,
    pub threshold_low: f32,
    pub threshold_high: f32,
    /// UV distance between the height samples used to rebuild the displaced normal.
    pub normal_step: f32,
    /// World units per UV unit along each axis.
    pub extent: f32,
}

impl TerrainUniform {
    pub fn from_config(config: &TerrainConfig) -> Self {
        Self {
            light_direction: config.light_direction,
            time: 0.0,
            light_color: hex_to_rgb(config.light_color),
            snow_level: config.snow_level,
            ambient_color: hex_to_rgb(config.ambient_color),
            snow_blend: config.snow_blend,
            fog_color: hex_to_rgb(config.fog_color),
            fog_near: config.fog_near,
            fog_far: config.fog_far,
            uv_scale: config.uv_scale,
            displacement_scale: config.displacement_scale,
            idle_amplitude: config.idle_amplitude,
            threshold_low: config.threshold_low,
            threshold_high: config.threshold_high,
            normal_step: 1.0 / config.segments.max(1) as f32,
            extent: config.size,
        }
    }
}

impl TimeUniform for TerrainUniform {
    fn set_time(&mut self, time: f32) {
        self.time = time;
    }

    fn time(&self) -> f32 {
        self.time
    }
}

pub fn mk_terrain_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    terrain_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = mk_material_pipeline_layout(
        device,
        "Terrain Pipeline Layout",
        camera_bind_group_layout,
        terrain_bind_group_layout,
    );
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Terrain Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("terrain.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        format,
        Some(Texture::DEPTH_FORMAT),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        shader,
        PipelineOptions::opaque("Terrain Pipeline"),
    )
}

//! Render pipelines of the backdrops.
//!
//! Every pipeline binds the camera at group 0 and one material at group 1. The uniform
//! structs next to each constructor mirror the WGSL blocks byte for byte.

pub mod basic;
pub mod cloud;
pub mod glow;
pub mod lit;
pub mod sprite;
pub mod terrain;
pub mod wireframe;

use crate::data_structures::material::MaterialLayouts;

/// All pipelines for one surface format.
#[derive(Debug)]
pub struct Pipelines {
    pub terrain: wgpu::RenderPipeline,
    pub lit: wgpu::RenderPipeline,
    pub translucent: wgpu::RenderPipeline,
    pub cloud: wgpu::RenderPipeline,
    pub glow: wgpu::RenderPipeline,
    pub wireframe: wgpu::RenderPipeline,
    pub sprite: wgpu::RenderPipeline,
    pub overlay_sprite: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        layouts: &MaterialLayouts,
    ) -> Self {
        let camera = camera_bind_group_layout;
        Self {
            terrain: terrain::mk_terrain_pipeline(device, format, camera, &layouts.terrain),
            lit: lit::mk_lit_pipeline(device, format, camera, &layouts.lit),
            translucent: lit::mk_translucent_pipeline(device, format, camera, &layouts.lit),
            cloud: cloud::mk_cloud_pipeline(device, format, camera, &layouts.single),
            glow: glow::mk_glow_pipeline(device, format, camera, &layouts.flat),
            wireframe: wireframe::mk_wireframe_pipeline(device, format, camera, &layouts.flat),
            sprite: sprite::mk_sprite_pipeline(device, format, camera, &layouts.single),
            overlay_sprite: sprite::mk_overlay_sprite_pipeline(
                device,
                format,
                camera,
                &layouts.single,
            ),
        }
    }
}

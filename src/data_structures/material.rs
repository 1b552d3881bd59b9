//! Shader materials: one uniform block plus a fixed list of textures per bind group.
//!
//! Materials are created once and shared by reference between every node that draws with
//! them. The only field that changes after construction is the time of uniforms that
//! implement [`TimeUniform`]; it is written through [`TimeDriven::set_time`] and flushed to
//! the GPU before the next draw.

use std::cell::Cell;

use wgpu::util::DeviceExt;

use crate::data_structures::texture::Texture;

/// A uniform block carrying an animation time.
pub trait TimeUniform: bytemuck::Pod {
    fn set_time(&mut self, time: f32);
    fn time(&self) -> f32;
}

/// Anything whose shader reads the scene clock.
///
/// Scene controllers keep an explicit list of these and push the clock into each of them
/// once per frame.
pub trait TimeDriven {
    fn set_time(&self, time: f32);

    fn time(&self) -> f32;

    /// Upload pending changes. Called once per frame before drawing.
    fn write_to_buffer(&self, queue: &wgpu::Queue);
}

pub struct Material<U: bytemuck::Pod> {
    pub name: String,
    uniform: Cell<U>,
    buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    dirty: Cell<bool>,
}

impl<U: bytemuck::Pod> Material<U> {
    /// Binding 0 holds the uniform, bindings `1..=n` the textures and `n + 1` the sampler.
    /// `layout` must come from [`material_layout`] with the same texture count.
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        name: &str,
        uniform: U,
        textures: &[&Texture],
        sampler: &wgpu::Sampler,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Uniform Buffer", name)),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }];
        for (i, texture) in textures.iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: i as u32 + 1,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            });
        }
        if !textures.is_empty() {
            entries.push(wgpu::BindGroupEntry {
                binding: textures.len() as u32 + 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            });
        }

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &entries,
            label: Some(name),
        });

        Self {
            name: name.to_string(),
            uniform: Cell::new(uniform),
            buffer,
            bind_group,
            dirty: Cell::new(false),
        }
    }

    pub fn uniform(&self) -> U {
        self.uniform.get()
    }

    fn flush(&self, queue: &wgpu::Queue) {
        if self.dirty.replace(false) {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform.get()]));
        }
    }
}

impl<U: TimeUniform> TimeDriven for Material<U> {
    fn set_time(&self, time: f32) {
        let mut uniform = self.uniform.get();
        uniform.set_time(time);
        self.uniform.set(uniform);
        self.dirty.set(true);
    }

    fn time(&self) -> f32 {
        self.uniform.get().time()
    }

    fn write_to_buffer(&self, queue: &wgpu::Queue) {
        self.flush(queue);
    }
}

/// Layout for a material with one uniform block and `textures` filterable 2D textures
/// sharing a single sampler. Everything is visible to both shader stages because the
/// terrain and cloud vertex shaders sample noise maps.
pub fn material_layout(device: &wgpu::Device, label: &str, textures: u32) -> wgpu::BindGroupLayout {
    let visibility = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
    let mut entries = vec![wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }];
    for i in 0..textures {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: i + 1,
            visibility,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
            },
            count: None,
        });
    }
    if textures > 0 {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: textures + 1,
            visibility,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
    }
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &entries,
        label: Some(label),
    })
}

/// Material bind group layouts, one per texture count in use.
#[derive(Debug)]
pub struct MaterialLayouts {
    /// Uniform only (atmosphere glow, wireframe).
    pub flat: wgpu::BindGroupLayout,
    /// One texture (sprites, clouds).
    pub single: wgpu::BindGroupLayout,
    /// Colour, bump and specular maps.
    pub lit: wgpu::BindGroupLayout,
    /// The six terrain maps.
    pub terrain: wgpu::BindGroupLayout,
}

impl MaterialLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            flat: material_layout(device, "flat_material_layout", 0),
            single: material_layout(device, "single_texture_material_layout", 1),
            lit: material_layout(device, "lit_material_layout", 3),
            terrain: material_layout(device, "terrain_material_layout", 6),
        }
    }
}

//! Fixed-size particle fields: falling snow, drifting dust and the starfield.
//!
//! All three share one update rule, `position += velocity * dt`, followed by the optional
//! recycling of particles that dropped below the floor or drifted out of the spawn box
//! sideways. Particles are never created or
//! destroyed after spawning. Wind sway and distance fade are display-only effects applied
//! in `sprite.wgsl`; [`wind_offset`] and [`distance_fade`] state the same rules on the host.

use std::rc::Rc;

use cgmath::Vector3;
use rand::Rng;
use wgpu::util::DeviceExt;

use crate::{
    config::ParticleConfig,
    data_structures::{material::Material, model::Vertex, terrain::smoothstep},
    pipelines::sprite::{SPRITE_VERTICES, SpriteUniform},
    render::{Render, Sprites},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vector3<f32>,
    pub velocity: Vector3<f32>,
    pub size: f32,
    pub color: [f32; 4],
}

/// Wrap-around rule for particles leaving through the floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecycleBand {
    pub floor: f32,
    pub ceiling: f32,
    pub depth: f32,
}

impl RecycleBand {
    /// `offset` is the distance from the floor to the top of the band, `depth` how far the
    /// band reaches down from there.
    pub fn new(floor: f32, offset: f32, depth: f32) -> Self {
        let offset = offset.abs().max(f32::EPSILON);
        Self {
            floor,
            ceiling: floor + offset,
            depth: depth.abs().clamp(f32::EPSILON, offset),
        }
    }

    pub fn lower_bound(&self) -> f32 {
        self.ceiling - self.depth
    }

    /// Height after recycling. Heights at or above the floor are returned unchanged; a
    /// particle that overshot the floor by less than `depth` is lifted by exactly
    /// `ceiling - floor`; any result lies in `(ceiling - depth, ceiling]`.
    pub fn apply(&self, y: f32) -> f32 {
        if y >= self.floor {
            y
        } else if !y.is_finite() {
            self.ceiling
        } else {
            self.ceiling - (self.floor - y).rem_euclid(self.depth)
        }
    }
}

/// Keeps recycled particles inside the spawn box on x and z by wrapping them to the
/// opposite side. An empty extent on either axis leaves that axis alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalWrap {
    /// `[x, z]` lower bounds.
    pub min: [f32; 2],
    /// `[x, z]` upper bounds.
    pub max: [f32; 2],
}

impl HorizontalWrap {
    pub fn from_spawn_box(spawn_min: [f32; 3], spawn_max: [f32; 3]) -> Self {
        Self {
            min: [spawn_min[0], spawn_min[2]],
            max: [spawn_max[0], spawn_max[2]],
        }
    }

    /// `(x, z)` wrapped into `[min, max)` per axis.
    pub fn apply(&self, x: f32, z: f32) -> (f32, f32) {
        (
            wrap_into(x, self.min[0], self.max[0]),
            wrap_into(z, self.min[1], self.max[1]),
        )
    }
}

fn wrap_into(v: f32, min: f32, max: f32) -> f32 {
    if !(max > min) || (v >= min && v < max) {
        return v;
    }
    if !v.is_finite() {
        return min;
    }
    let wrapped = min + (v - min).rem_euclid(max - min);
    // rem_euclid can round up to the full extent for values just below min.
    if wrapped >= max { min } else { wrapped }
}

fn sample(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    if max > min { rng.gen_range(min..max) } else { min }
}

fn sample_vec(rng: &mut impl Rng, min: [f32; 3], max: [f32; 3]) -> Vector3<f32> {
    Vector3::new(
        sample(rng, min[0], max[0]),
        sample(rng, min[1], max[1]),
        sample(rng, min[2], max[2]),
    )
}

#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    recycle: Option<RecycleBand>,
    wrap: Option<HorizontalWrap>,
}

impl ParticleField {
    pub fn spawn(config: &ParticleConfig, rng: &mut impl Rng) -> Self {
        let particles = (0..config.count)
            .map(|_| {
                let position = sample_vec(rng, config.spawn_min, config.spawn_max);
                let velocity = sample_vec(rng, config.velocity_min, config.velocity_max);
                let size = sample(rng, config.size_min, config.size_max);
                let brightness = sample(rng, config.brightness_min, config.brightness_max);
                Particle {
                    position,
                    velocity,
                    size,
                    color: [brightness, brightness, brightness * config.blue_boost, 1.0],
                }
            })
            .collect();
        let recycle = config
            .floor
            .map(|floor| RecycleBand::new(floor, config.recycle_offset, config.band_depth));
        let wrap = recycle
            .is_some()
            .then(|| HorizontalWrap::from_spawn_box(config.spawn_min, config.spawn_max));
        Self {
            particles,
            recycle,
            wrap,
        }
    }

    pub fn from_particles(particles: Vec<Particle>, recycle: Option<RecycleBand>) -> Self {
        Self {
            particles,
            recycle,
            wrap: None,
        }
    }

    pub fn with_horizontal_wrap(mut self, wrap: HorizontalWrap) -> Self {
        self.wrap = Some(wrap);
        self
    }

    pub fn step(&mut self, dt: f32) {
        for particle in self.particles.iter_mut() {
            particle.position += particle.velocity * dt;
            if let Some(band) = &self.recycle {
                particle.position.y = band.apply(particle.position.y);
            }
            if let Some(wrap) = &self.wrap {
                let (x, z) = wrap.apply(particle.position.x, particle.position.z);
                particle.position.x = x;
                particle.position.z = z;
            }
        }
    }

    /// A field whose particles never move needs no per-frame upload.
    pub fn is_static(&self) -> bool {
        self.particles
            .iter()
            .all(|p| p.velocity == Vector3::new(0.0, 0.0, 0.0))
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn recycle(&self) -> Option<&RecycleBand> {
        self.recycle.as_ref()
    }

    pub fn horizontal_wrap(&self) -> Option<&HorizontalWrap> {
        self.wrap.as_ref()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn to_raw(&self) -> Vec<ParticleRaw> {
        self.particles
            .iter()
            .map(|p| ParticleRaw {
                position: p.position.into(),
                size: p.size,
                color: p.color,
            })
            .collect()
    }
}

/// Horizontal sway added to a particle's x at draw time.
pub fn wind_offset(time: f32, z: f32, strength: f32) -> f32 {
    (time * 0.5 + z * 0.1).sin() * strength
}

/// Opacity multiplier by distance to the camera; an empty range disables fading.
pub fn distance_fade(distance: f32, near: f32, far: f32) -> f32 {
    if far > near {
        1.0 - smoothstep(near, far, distance)
    } else {
        1.0
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleRaw {
    position: [f32; 3],
    size: f32,
    color: [f32; 4],
}

impl Vertex for ParticleRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ParticleRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// A particle field together with its GPU buffer and sprite material.
pub struct ParticleSystem {
    pub field: ParticleField,
    buffer: wgpu::Buffer,
    material: Rc<Material<SpriteUniform>>,
    overlay: bool,
}

impl ParticleSystem {
    /// `overlay` systems are drawn without depth testing on top of the scene.
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        field: ParticleField,
        material: Rc<Material<SpriteUniform>>,
        overlay: bool,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Particle Buffer", name)),
            contents: bytemuck::cast_slice(&field.to_raw()),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            field,
            buffer,
            material,
            overlay,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if !self.field.is_static() {
            self.field.step(dt);
        }
    }

    pub fn write_to_buffer(&self, queue: &wgpu::Queue) {
        if !self.field.is_static() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&self.field.to_raw()));
        }
    }

    pub fn get_render(&self) -> Render<'_> {
        let sprites = Sprites {
            particles: &self.buffer,
            material: &self.material.bind_group,
            vertices: SPRITE_VERTICES,
            amount: self.field.len() as u32,
        };
        if self.overlay {
            Render::Overlay(sprites)
        } else {
            Render::Sprites(sprites)
        }
    }
}

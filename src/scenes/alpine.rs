//! The hero backdrop: displaced snowy terrain, distant peaks, clouds, falling snow and
//! floating dust under a sky-blue fog.

use std::rc::Rc;

use cgmath::{Point3, Rotation3, Vector3};
use rand::Rng;

use crate::{
    config::{BackdropConfig, CameraConfig, CloudConfig, PeakConfig},
    context::Gpu,
    data_structures::{
        instance::Instance,
        material::{Material, TimeDriven},
        model::Mesh,
        particles::{ParticleField, ParticleSystem},
        scene_graph::{MeshNode, SceneNode},
        shapes::{cone, hsl_to_rgb, uv_sphere},
        terrain::terrain_grid,
        texture::Texture,
    },
    pipelines::{
        cloud::CloudUniform, lit::LitUniform, sprite::SpriteUniform, terrain::TerrainUniform,
    },
    render::{Pass, Render},
    resources::{
        fallback,
        texture::{TextureKey, TextureSet},
    },
    scenes::{Backdrop, CameraInput},
};

/// How far the look-at point sinks at full scroll progress.
pub const LOOK_AT_DROP: f32 = 5.0;

/// Eye and look-at target of the terrain camera.
///
/// The eye follows the pointer and dollies up and back with scroll progress; the look-at
/// point sways slowly with the clock and sinks as the page scrolls.
pub fn alpine_camera_target(
    camera: &CameraConfig,
    input: &CameraInput,
    time: f32,
) -> (Point3<f32>, Point3<f32>) {
    let progress = input.scroll_progress;
    let eye = Point3::new(
        camera.eye[0] + input.pointer[0] * camera.pointer_reach[0] + camera.scroll_dolly[0] * progress,
        camera.eye[1] + input.pointer[1] * camera.pointer_reach[1] + camera.scroll_dolly[1] * progress,
        camera.eye[2] + camera.scroll_dolly[2] * progress,
    );
    let look_at = Point3::new(
        camera.look_at[0] + (time * 0.1).sin() * 2.0,
        camera.look_at[1] + (time * 0.1).cos() - LOOK_AT_DROP * progress,
        camera.look_at[2],
    );
    (eye, look_at)
}

fn sample(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    if max > min { rng.gen_range(min..max) } else { min }
}

fn sample_position(rng: &mut impl Rng, min: [f32; 3], max: [f32; 3]) -> Vector3<f32> {
    Vector3::new(
        sample(rng, min[0], max[0]),
        sample(rng, min[1], max[1]),
        sample(rng, min[2], max[2]),
    )
}

/// Randomized local transforms of the peak instances.
pub fn peak_instances(config: &PeakConfig, rng: &mut impl Rng) -> Vec<Instance> {
    (0..config.count)
        .map(|_| {
            let lightness = sample(rng, config.lightness_min, config.lightness_max);
            let [r, g, b] = hsl_to_rgb(config.hue, config.saturation, lightness);
            let position = sample_position(rng, config.spawn_min, config.spawn_max);
            let yaw = sample(rng, 0.0, std::f32::consts::PI);
            Instance {
                position,
                rotation: cgmath::Quaternion::from_angle_y(cgmath::Rad(yaw)),
                ..Default::default()
            }
            .with_color([r, g, b, 1.0])
        })
        .collect()
}

/// Randomized local transforms of the cloud instances; opacity travels in the alpha
/// channel of the tint.
pub fn cloud_instances(config: &CloudConfig, rng: &mut impl Rng) -> Vec<Instance> {
    (0..config.count)
        .map(|_| {
            let position = sample_position(rng, config.spawn_min, config.spawn_max);
            let scale = sample(rng, config.scale_min, config.scale_max);
            let opacity = sample(rng, config.opacity_min, config.opacity_max);
            Instance {
                position,
                scale: Vector3::new(scale, scale, scale),
                ..Default::default()
            }
            .with_color([1.0, 1.0, 1.0, opacity])
        })
        .collect()
}

fn place(node: &mut dyn SceneNode, instances: Vec<Instance>) {
    for (i, instance) in instances.into_iter().enumerate() {
        node.set_local_transform(i, instance);
    }
    node.update_world_transform_all();
}

pub struct AlpineBackdrop {
    camera: CameraConfig,
    terrain: MeshNode<TerrainUniform>,
    peaks: MeshNode<LitUniform>,
    clouds: MeshNode<CloudUniform>,
    snow: ParticleSystem,
    dust: ParticleSystem,
    time_driven: Vec<Rc<dyn TimeDriven>>,
}

impl AlpineBackdrop {
    pub fn snow(&self) -> &ParticleSystem {
        &self.snow
    }
}

impl Backdrop for AlpineBackdrop {
    const KEYS: &'static [TextureKey] = &TextureKey::TERRAIN;

    fn manifest(config: &BackdropConfig) -> &[(TextureKey, String)] {
        &config.textures.terrain
    }

    fn camera_config(config: &BackdropConfig) -> &CameraConfig {
        &config.alpine_camera
    }

    fn build<R: Rng>(
        gpu: &Gpu,
        textures: &TextureSet,
        config: &BackdropConfig,
        rng: &mut R,
    ) -> anyhow::Result<Self> {
        let device = &gpu.device;
        let queue = &gpu.queue;

        let terrain_maps = TextureKey::TERRAIN
            .iter()
            .map(|key| textures.get(*key))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let terrain_material = Rc::new(Material::new(
            device,
            &gpu.layouts.terrain,
            "terrain_material",
            TerrainUniform::from_config(&config.terrain),
            &terrain_maps,
            &gpu.sampler,
        ));
        let grid = Rc::new(Mesh::new(
            device,
            "terrain",
            &terrain_grid(config.terrain.size, config.terrain.segments),
        ));
        let mut terrain = MeshNode::new(
            device,
            "terrain",
            grid,
            terrain_material.clone(),
            Pass::Terrain,
            1,
        );
        place(
            &mut terrain,
            vec![Instance::from(Vector3::new(0.0, config.terrain.elevation, 0.0))],
        );

        // Peaks carry no maps of their own: white colour, flat bump, black specular.
        let white = Texture::solid(device, queue, [255, 255, 255, 255], "peak_color", false);
        let flat = Texture::solid(device, queue, [128, 128, 128, 255], "peak_bump", true);
        let black = Texture::solid(device, queue, [0, 0, 0, 255], "peak_specular", true);
        let peak_uniform = LitUniform {
            opacity: config.peaks.opacity,
            ..LitUniform::from_lights(
                &config.alpine_lights,
                config.terrain.fog_color,
                config.terrain.fog_near,
                config.terrain.fog_far,
            )
        };
        let peak_material = Rc::new(Material::new(
            device,
            &gpu.layouts.lit,
            "peak_material",
            peak_uniform,
            &[&white, &flat, &black],
            &gpu.sampler,
        ));
        let peak_mesh = Rc::new(Mesh::new(
            device,
            "peak",
            &cone(config.peaks.radius, config.peaks.height, config.peaks.segments),
        ));
        let mut peaks = MeshNode::new(
            device,
            "peaks",
            peak_mesh,
            peak_material,
            Pass::Translucent,
            config.peaks.count,
        );
        place(&mut peaks, peak_instances(&config.peaks, rng));

        let cloud_material = Rc::new(Material::new(
            device,
            &gpu.layouts.single,
            "cloud_material",
            CloudUniform::from_config(&config.clouds),
            &[textures.get(TextureKey::Noise)?],
            &gpu.sampler,
        ));
        let cloud_mesh = Rc::new(Mesh::new(
            device,
            "cloud",
            &uv_sphere(config.clouds.radius, config.clouds.segments, config.clouds.segments),
        ));
        let mut clouds = MeshNode::new(
            device,
            "clouds",
            cloud_mesh,
            cloud_material.clone(),
            Pass::Cloud,
            config.clouds.count,
        );
        place(&mut clouds, cloud_instances(&config.clouds, rng));

        let sprite = Texture::from_rgba(device, queue, &fallback::snowflake_sprite(), "snowflake", false);
        let snow_material = Rc::new(Material::new(
            device,
            &gpu.layouts.single,
            "snow_material",
            SpriteUniform::from_config(&config.snow),
            &[&sprite],
            &gpu.sampler,
        ));
        let snow = ParticleSystem::new(
            device,
            "snow",
            ParticleField::spawn(&config.snow, rng),
            snow_material.clone(),
            true,
        );
        let dust_material = Rc::new(Material::new(
            device,
            &gpu.layouts.single,
            "dust_material",
            SpriteUniform::from_config(&config.atmosphere),
            &[&sprite],
            &gpu.sampler,
        ));
        let dust = ParticleSystem::new(
            device,
            "dust",
            ParticleField::spawn(&config.atmosphere, rng),
            dust_material,
            false,
        );

        let time_driven: Vec<Rc<dyn TimeDriven>> =
            vec![terrain_material, snow_material, cloud_material];

        log::debug!(
            "Alpine backdrop: {} peaks, {} clouds, {} snowflakes, {} dust particles",
            peaks.instance_count(),
            clouds.instance_count(),
            snow.field.len(),
            dust.field.len(),
        );

        Ok(Self {
            camera: config.alpine_camera.clone(),
            terrain,
            peaks,
            clouds,
            snow,
            dust,
            time_driven,
        })
    }

    fn time_driven(&self) -> Vec<Rc<dyn TimeDriven>> {
        self.time_driven.clone()
    }

    fn update(&mut self, _time: f32, dt: f32) {
        self.snow.update(dt);
        self.dust.update(dt);
    }

    fn camera_target(&mut self, input: &CameraInput, time: f32) -> (Point3<f32>, Point3<f32>) {
        alpine_camera_target(&self.camera, input, time)
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue) {
        self.terrain.write_to_buffers(queue);
        self.peaks.write_to_buffers(queue);
        self.clouds.write_to_buffers(queue);
        self.snow.write_to_buffer(queue);
        self.dust.write_to_buffer(queue);
    }

    fn on_render(&self) -> Render<'_> {
        Render::Composed(vec![
            self.terrain.get_render(),
            self.peaks.get_render(),
            self.clouds.get_render(),
            self.dust.get_render(),
            self.snow.get_render(),
        ])
    }
}

//! The secondary backdrop: a slowly spinning earth with a wireframe overlay, a glowing
//! atmosphere shell and a starfield, seen from an auto-orbiting camera.

use std::rc::Rc;

use cgmath::{Point3, Rotation3, Vector3};
use rand::Rng;

use crate::{
    camera::orbit,
    config::{BackdropConfig, CameraConfig},
    context::Gpu,
    data_structures::{
        instance::Instance,
        material::{Material, TimeDriven},
        model::Mesh,
        particles::{ParticleField, ParticleSystem},
        scene_graph::{ContainerNode, MeshNode, SceneNode},
        shapes::uv_sphere,
        texture::Texture,
    },
    pipelines::{
        glow::GlowUniform, lit::LitUniform, sprite::SpriteUniform, wireframe::WireUniform,
    },
    render::{Pass, Render},
    resources::{
        fallback,
        texture::{TextureKey, TextureSet},
    },
    scenes::{Backdrop, CameraInput},
};

/// Yaw the globe starts with, turning the fallback continents towards the camera.
pub const INITIAL_YAW: f32 = std::f32::consts::PI;

/// Auto-orbit of the globe camera: the orbit position advances by a fixed angle per
/// frame while the pointer pushes the eye target sideways and up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitRig {
    pub position: Point3<f32>,
    pub speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub pointer_reach: [f32; 2],
    pub look_at: Point3<f32>,
}

impl OrbitRig {
    pub fn new(camera: &CameraConfig) -> Self {
        Self {
            position: camera.eye.into(),
            speed: camera.orbit_speed,
            min_distance: camera.min_distance,
            max_distance: camera.max_distance,
            pointer_reach: camera.pointer_reach,
            look_at: camera.look_at.into(),
        }
    }

    pub fn step(&mut self, input: &CameraInput) -> (Point3<f32>, Point3<f32>) {
        self.position = orbit(self.position, self.speed, self.min_distance, self.max_distance);
        let eye = self.position
            + Vector3::new(
                input.pointer[0] * self.pointer_reach[0],
                input.pointer[1] * self.pointer_reach[1],
                0.0,
            );
        (eye, self.look_at)
    }
}

pub struct GlobeBackdrop {
    root: ContainerNode,
    stars: ParticleSystem,
    yaw: f32,
    spin_per_frame: f32,
    orbit: OrbitRig,
    time_driven: Vec<Rc<dyn TimeDriven>>,
}

impl GlobeBackdrop {
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    fn spin(&mut self) {
        self.root.set_local_transform(
            0,
            Instance {
                rotation: cgmath::Quaternion::from_angle_y(cgmath::Rad(self.yaw)),
                ..Default::default()
            },
        );
        self.root.update_world_transform_all();
    }
}

impl Backdrop for GlobeBackdrop {
    const KEYS: &'static [TextureKey] = &TextureKey::GLOBE;

    fn manifest(config: &BackdropConfig) -> &[(TextureKey, String)] {
        &config.textures.globe
    }

    fn camera_config(config: &BackdropConfig) -> &CameraConfig {
        &config.globe_camera
    }

    fn build<R: Rng>(
        gpu: &Gpu,
        textures: &TextureSet,
        config: &BackdropConfig,
        rng: &mut R,
    ) -> anyhow::Result<Self> {
        let device = &gpu.device;
        let globe = &config.globe;

        let surface_uniform = LitUniform::from_lights(
            &config.globe_lights,
            globe.fog_color,
            globe.fog_near,
            globe.fog_far,
        )
        .with_specular(globe.specular_color, globe.shininess)
        .with_bump(globe.bump_scale);
        let surface_material = Rc::new(Material::new(
            device,
            &gpu.layouts.lit,
            "earth_material",
            surface_uniform,
            &[
                textures.get(TextureKey::EarthColor)?,
                textures.get(TextureKey::EarthBump)?,
                textures.get(TextureKey::EarthSpecular)?,
            ],
            &gpu.sampler,
        ));
        let sphere = uv_sphere(globe.radius, globe.segments, globe.segments);
        let surface = MeshNode::new(
            device,
            "earth",
            Rc::new(Mesh::new(device, "earth", &sphere)),
            surface_material,
            Pass::Lit,
            1,
        );

        let wire_material = Rc::new(Material::new(
            device,
            &gpu.layouts.flat,
            "earth_wireframe_material",
            WireUniform::new(globe.wireframe_color, globe.wireframe_opacity),
            &[],
            &gpu.sampler,
        ));
        let mut wireframe = MeshNode::new(
            device,
            "earth_wireframe",
            Rc::new(Mesh::new(device, "earth_wireframe", &sphere.to_wireframe())),
            wire_material,
            Pass::Wireframe,
            1,
        );
        let s = globe.wireframe_scale;
        wireframe.set_local_transform(
            0,
            Instance {
                scale: Vector3::new(s, s, s),
                ..Default::default()
            },
        );

        let glow_material = Rc::new(Material::new(
            device,
            &gpu.layouts.flat,
            "atmosphere_material",
            GlowUniform::from_config(globe),
            &[],
            &gpu.sampler,
        ));
        let atmosphere = MeshNode::new(
            device,
            "atmosphere",
            Rc::new(Mesh::new(
                device,
                "atmosphere",
                &uv_sphere(globe.atmosphere_radius, globe.segments, globe.segments),
            )),
            glow_material,
            Pass::Glow,
            1,
        );

        let mut root = ContainerNode::new(1);
        root.add_child(Box::new(surface));
        root.add_child(Box::new(wireframe));
        root.add_child(Box::new(atmosphere));

        let sprite = Texture::from_rgba(
            device,
            &gpu.queue,
            &fallback::snowflake_sprite(),
            "star",
            false,
        );
        let star_material = Rc::new(Material::new(
            device,
            &gpu.layouts.single,
            "star_material",
            SpriteUniform::from_config(&config.stars),
            &[&sprite],
            &gpu.sampler,
        ));
        let stars = ParticleSystem::new(
            device,
            "stars",
            ParticleField::spawn(&config.stars, rng),
            star_material.clone(),
            false,
        );

        let mut backdrop = Self {
            root,
            stars,
            yaw: INITIAL_YAW,
            spin_per_frame: globe.spin_per_frame,
            orbit: OrbitRig::new(&config.globe_camera),
            time_driven: vec![star_material],
        };
        backdrop.spin();
        Ok(backdrop)
    }

    fn time_driven(&self) -> Vec<Rc<dyn TimeDriven>> {
        self.time_driven.clone()
    }

    fn update(&mut self, _time: f32, dt: f32) {
        self.yaw += self.spin_per_frame;
        self.spin();
        self.stars.update(dt);
    }

    fn camera_target(&mut self, input: &CameraInput, _time: f32) -> (Point3<f32>, Point3<f32>) {
        self.orbit.step(input)
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue) {
        self.root.write_to_buffers(queue);
        self.stars.write_to_buffer(queue);
    }

    fn on_render(&self) -> Render<'_> {
        Render::Composed(vec![self.root.get_render(), self.stars.get_render()])
    }
}

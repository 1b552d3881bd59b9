//! Scene controllers: one independent camera, clock and scene per backdrop.
//!
//! A [`SceneController`] starts out [`Phase::Initializing`] and clears its viewport to the
//! background colour while its textures load. Once the load batch has settled (loaded or
//! replaced by fallbacks) the [`Backdrop`] is built, its time-driven materials are
//! registered and the controller is [`Phase::Ready`] for the rest of the process.

pub mod alpine;
pub mod globe;

use std::rc::Rc;

use cgmath::Point3;
use rand::Rng;

use crate::{
    camera::{Camera, CameraRig},
    config::{BackdropConfig, CameraConfig},
    context::Gpu,
    data_structures::material::TimeDriven,
    render::Render,
    resources::texture::{ImageSet, TextureKey, TextureSet, load_image_set},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Ready,
}

/// Scene time, advanced by a fixed step once per frame. Never paused or rewound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clock {
    time: f32,
    step: f32,
}

impl Clock {
    pub fn new(step: f32) -> Self {
        Self {
            time: 0.0,
            step: step.max(0.0),
        }
    }

    pub fn advance(&mut self) -> f32 {
        self.time += self.step;
        self.time
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn step(&self) -> f32 {
        self.step
    }
}

/// Environmental input of a scene, mutated by input events and read by the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraInput {
    /// Pointer in normalized device coordinates, `[-1, 1]` per axis with y up.
    pub pointer: [f32; 2],
    /// 0 at the top of the page, 1 at the bottom.
    pub scroll_progress: f32,
}

impl CameraInput {
    pub fn set_pointer(&mut self, x: f64, y: f64, width: u32, height: u32) {
        self.pointer = pointer_from_cursor(x, y, width, height);
    }

    pub fn set_scroll(&mut self, offset: f32, document_height: f32, viewport_height: f32) {
        self.scroll_progress = scroll_progress(offset, document_height, viewport_height);
    }
}

pub fn pointer_from_cursor(x: f64, y: f64, width: u32, height: u32) -> [f32; 2] {
    if width == 0 || height == 0 {
        return [0.0, 0.0];
    }
    [
        (x / width as f64 * 2.0 - 1.0) as f32,
        (-(y / height as f64) * 2.0 + 1.0) as f32,
    ]
}

/// Scroll offset as a fraction of the scrollable distance, clamped to `[0, 1]`. A page
/// that fits into the viewport has progress 0.
pub fn scroll_progress(offset: f32, document_height: f32, viewport_height: f32) -> f32 {
    let max_scroll = document_height - viewport_height;
    if max_scroll <= 0.0 || !offset.is_finite() {
        return 0.0;
    }
    (offset / max_scroll).clamp(0.0, 1.0)
}

/// The scene content a controller drives.
pub trait Backdrop {
    /// Texture slots the shaders of this backdrop sample.
    const KEYS: &'static [TextureKey];

    fn manifest(config: &BackdropConfig) -> &[(TextureKey, String)];

    fn camera_config(config: &BackdropConfig) -> &CameraConfig;

    fn build<R: Rng>(
        gpu: &Gpu,
        textures: &TextureSet,
        config: &BackdropConfig,
        rng: &mut R,
    ) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// Every material whose shader reads the clock, in a fixed order.
    fn time_driven(&self) -> Vec<Rc<dyn TimeDriven>>;

    /// Per-frame simulation step (particles, spinning objects).
    fn update(&mut self, time: f32, dt: f32);

    /// Where the eye should go and where it should look this frame.
    fn camera_target(&mut self, input: &CameraInput, time: f32) -> (Point3<f32>, Point3<f32>);

    fn write_to_buffers(&mut self, queue: &wgpu::Queue);

    fn on_render(&self) -> Render<'_>;
}

pub struct SceneController<B: Backdrop> {
    name: &'static str,
    phase: Phase,
    clock: Clock,
    backdrop: Option<B>,
    time_driven: Vec<Rc<dyn TimeDriven>>,
    rig: CameraRig,
    pub input: CameraInput,
}

impl<B: Backdrop> SceneController<B> {
    pub fn new(name: &'static str, config: &BackdropConfig) -> Self {
        let camera = B::camera_config(config);
        Self {
            name,
            phase: Phase::Initializing,
            clock: Clock::new(config.clock_step),
            backdrop: None,
            time_driven: Vec::new(),
            rig: CameraRig::new(camera.eye.into(), camera.look_at.into(), camera.damping),
            input: CameraInput::default(),
        }
    }

    /// Loads the texture batch of this backdrop. Always yields a complete set.
    pub async fn load_images<R: Rng>(config: &BackdropConfig, rng: &mut R) -> ImageSet {
        let mut images =
            load_image_set(B::manifest(config), config.textures.fallback_size, rng).await;
        images.complete(B::KEYS, config.textures.fallback_size, rng);
        images
    }

    /// Uploads the settled texture batch, builds the scene and becomes ready.
    pub fn finish_loading<R: Rng>(
        &mut self,
        gpu: &Gpu,
        images: &ImageSet,
        config: &BackdropConfig,
        rng: &mut R,
    ) -> anyhow::Result<()> {
        let textures = TextureSet::upload(&gpu.device, &gpu.queue, images);
        let backdrop = B::build(gpu, &textures, config, rng)?;
        self.install(backdrop);
        log::info!("{} backdrop ready ({:?} textures)", self.name, images.origin());
        Ok(())
    }

    /// Takes ownership of a built backdrop. A controller becomes ready only once; later
    /// calls are ignored.
    pub fn install(&mut self, backdrop: B) {
        if self.phase == Phase::Ready {
            log::warn!("{} backdrop is already built, ignoring the new one", self.name);
            return;
        }
        self.time_driven = backdrop.time_driven();
        self.backdrop = Some(backdrop);
        self.phase = Phase::Ready;
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn time(&self) -> f32 {
        self.clock.time()
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn backdrop(&self) -> Option<&B> {
        self.backdrop.as_ref()
    }

    pub fn time_driven(&self) -> &[Rc<dyn TimeDriven>] {
        &self.time_driven
    }

    /// One frame of simulation: advance the clock, push it into every registered
    /// material, step the backdrop and ease the camera. Does nothing until ready.
    pub fn update(&mut self) {
        let Some(backdrop) = self.backdrop.as_mut() else {
            return;
        };
        let time = self.clock.advance();
        for driven in &self.time_driven {
            driven.set_time(time);
        }
        backdrop.update(time, self.clock.step());
        let (eye, look_at) = backdrop.camera_target(&self.input, time);
        self.rig.ease_towards(eye, look_at);
    }

    pub fn apply_camera(&self, camera: &mut Camera) {
        self.rig.apply(camera);
    }

    pub fn write_to_buffers(&mut self, queue: &wgpu::Queue) {
        for driven in &self.time_driven {
            driven.write_to_buffer(queue);
        }
        if let Some(backdrop) = self.backdrop.as_mut() {
            backdrop.write_to_buffers(queue);
        }
    }

    pub fn on_render(&self) -> Render<'_> {
        match &self.backdrop {
            Some(backdrop) => backdrop.on_render(),
            None => Render::None,
        }
    }
}

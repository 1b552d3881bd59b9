#![allow(dead_code)]

use std::{
    cell::Cell,
    rc::Rc,
    sync::{Arc, Mutex},
};

use alpine_backdrop::{
    background::Section,
    config::{BackdropConfig, CameraConfig},
    context::Gpu,
    data_structures::material::TimeDriven,
    relay::{Email, MailTransport, RelayError},
    render::Render,
    resources::texture::{TextureKey, TextureSet},
    scenes::{Backdrop, CameraInput},
};
use cgmath::Point3;
use rand::{SeedableRng, rngs::StdRng};

pub(crate) fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub(crate) fn assert_close(actual: f32, expected: f32, eps: f32) {
    assert!(
        (actual - expected).abs() <= eps,
        "expected {} to be within {} of {}",
        actual,
        eps,
        expected
    );
}

pub(crate) fn assert_point_close(actual: Point3<f32>, expected: Point3<f32>, eps: f32) {
    assert_close(actual.x, expected.x, eps);
    assert_close(actual.y, expected.y, eps);
    assert_close(actual.z, expected.z, eps);
}

/// The section layout of the default page: 900, 1100, 1000 and 800 pixels tall.
pub(crate) fn page_sections() -> Vec<Section> {
    Section::stack(&[900.0, 1100.0, 1000.0, 800.0])
}

/// Collects every mail instead of sending it.
#[derive(Clone, Default)]
pub(crate) struct RecordingTransport {
    pub(crate) sent: Arc<Mutex<Vec<Email>>>,
}

impl RecordingTransport {
    pub(crate) fn sent(&self) -> Vec<Email> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

impl MailTransport for RecordingTransport {
    fn send(&self, email: &Email) -> Result<(), RelayError> {
        self.sent
            .lock()
            .map_err(|_| RelayError::Transport("poisoned".to_string()))?
            .push(email.clone());
        Ok(())
    }
}

/// Fails every delivery.
pub(crate) struct FailingTransport;

impl MailTransport for FailingTransport {
    fn send(&self, _: &Email) -> Result<(), RelayError> {
        Err(RelayError::Transport("connection refused".to_string()))
    }
}

/// Remembers the last time pushed into it.
#[derive(Default)]
pub(crate) struct RecordedTime {
    time: Cell<f32>,
    pushes: Cell<u32>,
}

impl RecordedTime {
    pub(crate) fn pushes(&self) -> u32 {
        self.pushes.get()
    }
}

impl TimeDriven for RecordedTime {
    fn set_time(&self, time: f32) {
        self.time.set(time);
        self.pushes.set(self.pushes.get() + 1);
    }

    fn time(&self) -> f32 {
        self.time.get()
    }

    fn write_to_buffer(&self, _: &wgpu::Queue) {}
}

/// A backdrop without GPU resources that steers the camera to a fixed point.
pub(crate) struct MockBackdrop {
    pub(crate) drivers: Vec<Rc<dyn TimeDriven>>,
    pub(crate) updates: Rc<Cell<u32>>,
    pub(crate) eye: Point3<f32>,
    pub(crate) look_at: Point3<f32>,
}

impl MockBackdrop {
    pub(crate) fn new(drivers: Vec<Rc<dyn TimeDriven>>, eye: Point3<f32>) -> Self {
        Self {
            drivers,
            updates: Rc::new(Cell::new(0)),
            eye,
            look_at: Point3::new(0.0, 0.0, 0.0),
        }
    }
}

impl Backdrop for MockBackdrop {
    const KEYS: &'static [TextureKey] = &[];

    fn manifest(config: &BackdropConfig) -> &[(TextureKey, String)] {
        &config.textures.terrain
    }

    fn camera_config(config: &BackdropConfig) -> &CameraConfig {
        &config.alpine_camera
    }

    fn build<R: rand::Rng>(
        _: &Gpu,
        _: &TextureSet,
        _: &BackdropConfig,
        _: &mut R,
    ) -> anyhow::Result<Self> {
        anyhow::bail!("the mock backdrop is installed directly")
    }

    fn time_driven(&self) -> Vec<Rc<dyn TimeDriven>> {
        self.drivers.clone()
    }

    fn update(&mut self, _: f32, _: f32) {
        self.updates.set(self.updates.get() + 1);
    }

    fn camera_target(&mut self, _: &CameraInput, _: f32) -> (Point3<f32>, Point3<f32>) {
        (self.eye, self.look_at)
    }

    fn write_to_buffers(&mut self, _: &wgpu::Queue) {}

    fn on_render(&self) -> Render<'_> {
        Render::None
    }
}

/// A device and queue without any surface.
#[cfg(feature = "integration-tests")]
pub(crate) async fn headless_gpu() -> Gpu {
    Gpu::new(Gpu::create_instance(), None)
        .await
        .expect("No graphics adapter available for integration tests")
}

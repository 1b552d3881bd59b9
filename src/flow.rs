//! Application event loop and the per-frame driver.
//!
//! The loop owns both backdrops. It follows this pattern:
//! 1. Create the two windows (canvases `hero-bg` and `globe-bg` on the web) and the shared
//!    GPU context, then show the terrain backdrop
//! 2. Load the texture batches of both scenes; the scenes stay `Initializing` and clear to
//!    their background colour until their batch has settled
//! 3. Each redraw of the visible window runs one [`FrameDriver`] tick: advance both
//!    scene clocks, ease the cameras, flush uniforms and draw the visible viewport
//! 4. Scroll and pointer input only update scene inputs and the [`BackgroundManager`]
//!
//! Natively every future is resolved on a tokio runtime with `block_on`. On the web they
//! are spawned with `wasm_bindgen_futures::spawn_local` and their results come back as
//! [`BackdropEvent`]s through the event loop proxy.

use std::{fmt::Debug, sync::Arc};

use instant::{Duration, Instant};
use rand::{SeedableRng, rngs::StdRng};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

use crate::{
    background::{Background, BackgroundManager, Section, VirtualPage},
    config::{BackdropConfig, PageConfig},
    context::{Gpu, Viewport},
    render::Render,
    resources::texture::ImageSet,
    scenes::{SceneController, alpine::AlpineBackdrop, globe::GlobeBackdrop},
};

/// Frames between two timing summaries in the debug log.
pub const REPORT_INTERVAL: u64 = 600;

/// Explicit frame scheduler. Owns the running flag and runs one update and render step
/// per tick; a failing step is logged and counted but never ends the loop.
#[derive(Debug, Default)]
pub struct FrameDriver {
    running: bool,
    frames: u64,
    failures: u64,
    busy: Duration,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        if !self.running {
            log::debug!("Frame driver started after {} frames", self.frames);
        }
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            log::debug!("Frame driver stopped after {} frames", self.frames);
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Runs `step` once if the driver is running. Returns whether another frame should be
    /// scheduled.
    pub fn tick<F: FnOnce() -> anyhow::Result<()>>(&mut self, step: F) -> bool {
        if !self.running {
            return false;
        }
        let started = Instant::now();
        if let Err(e) = step() {
            self.failures += 1;
            log::error!("Frame {} failed: {:#}", self.frames, e);
        }
        self.busy += started.elapsed();
        self.frames += 1;
        if self.frames % REPORT_INTERVAL == 0 {
            log::debug!(
                "{} frames, {:?} per frame on average, {} failed",
                self.frames,
                self.busy / REPORT_INTERVAL as u32,
                self.failures
            );
            self.busy = Duration::ZERO;
        }
        self.running
    }
}

/// Settled texture batches of both scenes.
#[derive(Debug)]
pub struct SceneImages {
    pub alpine: ImageSet,
    pub globe: ImageSet,
}

/// Loads both texture batches concurrently. Never fails: failed batches are replaced by
/// procedural textures.
pub async fn load_scene_images(config: &BackdropConfig) -> SceneImages {
    let mut alpine_rng = StdRng::from_entropy();
    let mut globe_rng = StdRng::from_entropy();
    let (alpine, globe) = futures::join!(
        SceneController::<AlpineBackdrop>::load_images(config, &mut alpine_rng),
        SceneController::<GlobeBackdrop>::load_images(config, &mut globe_rng),
    );
    SceneImages { alpine, globe }
}

fn present(viewport: &mut Viewport, gpu: &Gpu, render: Render<'_>) -> anyhow::Result<()> {
    match viewport.render(gpu, render) {
        Ok(()) => Ok(()),
        // Reconfigure the surface if it's lost or outdated
        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
            viewport.reconfigure(&gpu.device);
            Ok(())
        }
        Err(wgpu::SurfaceError::Timeout) => {
            log::warn!("Surface timed out, skipping the frame");
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("Unable to render: {}", e)),
    }
}

/// Everything that exists once the GPU is up: both viewports and their scenes.
pub struct Backdrops {
    pub gpu: Gpu,
    pub hero: Viewport,
    pub globe: Viewport,
    pub alpine_scene: SceneController<AlpineBackdrop>,
    pub globe_scene: SceneController<GlobeBackdrop>,
    pub manager: BackgroundManager,
    pub config: BackdropConfig,
    page: VirtualPage,
}

impl Backdrops {
    pub async fn new(
        hero_window: Arc<Window>,
        globe_window: Arc<Window>,
        config: BackdropConfig,
    ) -> anyhow::Result<Self> {
        let instance = Gpu::create_instance();
        let hero_surface = instance.create_surface(hero_window.clone())?;
        let globe_surface = instance.create_surface(globe_window.clone())?;
        let gpu = Gpu::new(instance, Some(&hero_surface)).await?;

        let hero = Viewport::new(&gpu, hero_window, hero_surface, &config.alpine_camera)?;
        let globe = Viewport::new(&gpu, globe_window, globe_surface, &config.globe_camera)?;

        Ok(Self {
            alpine_scene: SceneController::new("Terrain", &config),
            globe_scene: SceneController::new("Globe", &config),
            manager: BackgroundManager::new(),
            page: VirtualPage::new(&config.page),
            gpu,
            hero,
            globe,
            config,
        })
    }

    fn viewport_mut(&mut self, id: WindowId) -> Option<&mut Viewport> {
        if self.hero.window().id() == id {
            Some(&mut self.hero)
        } else if self.globe.window().id() == id {
            Some(&mut self.globe)
        } else {
            None
        }
    }

    fn viewport(&self, id: WindowId) -> Option<&Viewport> {
        [&self.hero, &self.globe]
            .into_iter()
            .find(|viewport| viewport.window().id() == id)
    }

    pub fn resize(&mut self, id: WindowId, width: u32, height: u32) {
        let device = self.gpu.device.clone();
        if let Some(viewport) = self.viewport_mut(id) {
            viewport.resize(&device, width, height);
        }
    }

    /// Builds both scenes from their settled texture batches. A scene that fails to build
    /// stays in its initializing state and keeps clearing to its background colour.
    pub fn finish_loading(&mut self, images: SceneImages) {
        let mut rng = StdRng::from_entropy();
        if let Err(e) =
            self.alpine_scene
                .finish_loading(&self.gpu, &images.alpine, &self.config, &mut rng)
        {
            log::error!("Terrain backdrop could not be built: {:#}", e);
        }
        if let Err(e) =
            self.globe_scene
                .finish_loading(&self.gpu, &images.globe, &self.config, &mut rng)
        {
            log::error!("Globe backdrop could not be built: {:#}", e);
        }
        self.request_redraw();
    }

    /// Hard visibility flip between the two viewports.
    pub fn show(&mut self, background: Background) {
        log::info!(
            "Showing the {} backdrop",
            if background.shows_terrain() { "terrain" } else { "globe" }
        );
        self.hero.set_visible(background.shows_terrain());
        self.globe.set_visible(background.shows_globe());
    }

    pub fn on_scroll(
        &mut self,
        offset: f32,
        viewport_height: f32,
        document_height: f32,
        sections: &[Section],
    ) {
        self.alpine_scene
            .input
            .set_scroll(offset, document_height, viewport_height);
        if let Some(background) = self.manager.handle_scroll(offset, viewport_height, sections) {
            self.show(background);
        }
    }

    /// Mouse wheel input of the native virtual page.
    pub fn scroll_page(&mut self, delta: f32, viewport_height: f32) {
        let offset = self.page.scroll_by(delta, viewport_height);
        let document_height = self.page.document_height();
        let sections = self.page.sections().to_vec();
        self.on_scroll(offset, viewport_height, document_height, &sections);
    }

    pub fn on_pointer(&mut self, x: f64, y: f64, width: u32, height: u32) {
        self.alpine_scene.input.set_pointer(x, y, width, height);
        self.globe_scene.input.set_pointer(x, y, width, height);
    }

    pub fn is_visible(&self, id: WindowId) -> bool {
        self.viewport(id).is_some_and(|viewport| viewport.is_visible())
    }

    pub fn request_redraw(&self) {
        for viewport in [&self.hero, &self.globe] {
            if viewport.is_visible() {
                viewport.window().request_redraw();
            }
        }
    }

    /// One frame: both scene clocks advance, only the visible viewport draws.
    pub fn frame(&mut self) -> anyhow::Result<()> {
        self.alpine_scene.update();
        self.globe_scene.update();

        self.alpine_scene.apply_camera(&mut self.hero.camera.camera);
        self.globe_scene.apply_camera(&mut self.globe.camera.camera);

        self.alpine_scene.write_to_buffers(&self.gpu.queue);
        self.globe_scene.write_to_buffers(&self.gpu.queue);

        present(&mut self.hero, &self.gpu, self.alpine_scene.on_render())?;
        present(&mut self.globe, &self.gpu, self.globe_scene.on_render())?;
        Ok(())
    }
}

pub enum BackdropEvent {
    Initialized(Box<Backdrops>),
    TexturesLoaded(Box<SceneImages>),
    Scroll {
        offset: f32,
        viewport_height: f32,
        document_height: f32,
        sections: Vec<Section>,
    },
    Pointer {
        x: f64,
        y: f64,
        width: u32,
        height: u32,
    },
}

impl Debug for BackdropEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::TexturesLoaded(_) => f.write_str("TexturesLoaded"),
            Self::Scroll {
                offset,
                viewport_height,
                document_height,
                sections,
            } => f
                .debug_struct("Scroll")
                .field("offset", offset)
                .field("viewport_height", viewport_height)
                .field("document_height", document_height)
                .field("sections", &sections.len())
                .finish(),
            Self::Pointer { x, y, .. } => f.debug_struct("Pointer").field("x", x).field("y", y).finish(),
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<BackdropEvent>,
    backdrops: Option<Backdrops>,
    driver: FrameDriver,
    initializing: bool,
}

impl App {
    pub fn new(event_loop: &EventLoop<BackdropEvent>) -> anyhow::Result<Self> {
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy: event_loop.create_proxy(),
            backdrops: None,
            driver: FrameDriver::new(),
            initializing: false,
        })
    }

    fn on_initialized(&mut self, mut backdrops: Backdrops) {
        log::info!("Backdrops initialized, loading textures");
        backdrops.hero.reconfigure(&backdrops.gpu.device);
        backdrops.globe.reconfigure(&backdrops.gpu.device);
        let background = backdrops.manager.background();
        backdrops.show(background);
        backdrops.request_redraw();

        let config = backdrops.config.clone();
        self.backdrops = Some(backdrops);
        self.initializing = false;
        self.driver.start();

        #[cfg(target_arch = "wasm32")]
        crate::web::install_listeners(self.proxy.clone());

        self.load_textures(config);
    }

    fn load_textures(&self, config: BackdropConfig) {
        let fut = async move { load_scene_images(&config).await };

        #[cfg(not(target_arch = "wasm32"))]
        {
            let images = self.async_runtime.block_on(fut);
            if self
                .proxy
                .send_event(BackdropEvent::TexturesLoaded(Box::new(images)))
                .is_err()
            {
                log::error!("Event loop was closed before the textures arrived");
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let images = fut.await;
                if proxy
                    .send_event(BackdropEvent::TexturesLoaded(Box::new(images)))
                    .is_err()
                {
                    log::error!("Event loop was closed before the textures arrived");
                }
            });
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn create_windows(
    event_loop: &ActiveEventLoop,
    page: &PageConfig,
) -> anyhow::Result<(Arc<Window>, Arc<Window>)> {
    let size = winit::dpi::PhysicalSize::new(page.window_width, page.window_height);
    let hero = event_loop.create_window(
        Window::default_attributes()
            .with_title("Alpine backdrop")
            .with_inner_size(size),
    )?;
    let globe = event_loop.create_window(
        Window::default_attributes()
            .with_title("Globe backdrop")
            .with_inner_size(size),
    )?;
    Ok((Arc::new(hero), Arc::new(globe)))
}

#[cfg(target_arch = "wasm32")]
fn create_windows(
    event_loop: &ActiveEventLoop,
    _page: &PageConfig,
) -> anyhow::Result<(Arc<Window>, Arc<Window>)> {
    use wasm_bindgen::JsCast;
    use winit::platform::web::WindowAttributesExtWebSys;

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| anyhow::anyhow!("No document to attach the backdrops to"))?;
    let create = |id: &str| -> anyhow::Result<Arc<Window>> {
        let canvas = document
            .get_element_by_id(id)
            .ok_or_else(|| anyhow::anyhow!("No canvas with id {}", id))?
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .map_err(|_| anyhow::anyhow!("Element {} is not a canvas", id))?;
        let attributes = Window::default_attributes().with_canvas(Some(canvas));
        Ok(Arc::new(event_loop.create_window(attributes)?))
    };
    Ok((
        create(crate::web::HERO_CANVAS)?,
        create(crate::web::GLOBE_CANVAS)?,
    ))
}

impl ApplicationHandler<BackdropEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.backdrops.is_some() || self.initializing {
            return;
        }
        self.initializing = true;

        #[cfg(not(target_arch = "wasm32"))]
        {
            let config = self.async_runtime.block_on(BackdropConfig::load());
            let result = create_windows(event_loop, &config.page).and_then(|(hero, globe)| {
                self.async_runtime
                    .block_on(Backdrops::new(hero, globe, config))
            });
            match result {
                Ok(backdrops) => self.on_initialized(backdrops),
                Err(e) => {
                    log::error!("Backdrop initialization failed: {:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            match create_windows(event_loop, &PageConfig::default()) {
                Ok((hero, globe)) => {
                    let proxy = self.proxy.clone();
                    wasm_bindgen_futures::spawn_local(async move {
                        let config = BackdropConfig::load().await;
                        match Backdrops::new(hero, globe, config).await {
                            Ok(backdrops) => {
                                if proxy
                                    .send_event(BackdropEvent::Initialized(Box::new(backdrops)))
                                    .is_err()
                                {
                                    log::error!("Event loop was closed before the backdrops were ready");
                                }
                            }
                            Err(e) => log::error!("Backdrop initialization failed: {:#}", e),
                        }
                    });
                }
                Err(e) => log::error!("Backdrop initialization failed: {:#}", e),
            }
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: BackdropEvent) {
        if let BackdropEvent::Initialized(backdrops) = event {
            self.on_initialized(*backdrops);
            return;
        }
        let Some(backdrops) = self.backdrops.as_mut() else {
            log::warn!("Dropping {:?}, the backdrops are not initialized yet", event);
            return;
        };
        match event {
            BackdropEvent::Initialized(_) => {}
            BackdropEvent::TexturesLoaded(images) => backdrops.finish_loading(*images),
            BackdropEvent::Scroll {
                offset,
                viewport_height,
                document_height,
                sections,
            } => backdrops.on_scroll(offset, viewport_height, document_height, &sections),
            BackdropEvent::Pointer {
                x,
                y,
                width,
                height,
            } => backdrops.on_pointer(x, y, width, height),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(backdrops) = self.backdrops.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                self.driver.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => backdrops.resize(window_id, size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(viewport) = backdrops.viewport(window_id) {
                    let size = viewport.window().inner_size();
                    backdrops.on_pointer(position.x, position.y, size.width, size.height);
                }
            }
            #[cfg(not(target_arch = "wasm32"))]
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    winit::event::MouseScrollDelta::LineDelta(_, lines) => {
                        -lines * backdrops.page.line_height()
                    }
                    winit::event::MouseScrollDelta::PixelDelta(pixels) => -pixels.y as f32,
                };
                let viewport_height = backdrops
                    .viewport(window_id)
                    .map(|viewport| viewport.window().inner_size().height as f32)
                    .unwrap_or(0.0);
                backdrops.scroll_page(delta, viewport_height);
            }
            WindowEvent::RedrawRequested => {
                // Only the visible window paces the frames.
                if !backdrops.is_visible(window_id) {
                    return;
                }
                if self.driver.tick(|| backdrops.frame()) {
                    backdrops.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Opens the backdrops and runs until the windows are closed.
pub fn run() -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info)?;
    }

    let event_loop: EventLoop<BackdropEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}

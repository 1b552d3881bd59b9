//! GPU context shared by both backdrops, and one render target per backdrop.
//!
//! [`Gpu`] owns the device and queue plus the layouts and sampler every material is
//! built against. A [`Viewport`] binds one window (or canvas) to its own surface, depth
//! buffer, pipelines and camera. Both viewports submit to the same queue.

use std::{iter, sync::Arc};

use anyhow::Context as _;
use winit::window::Window;

use crate::{
    camera::{self, Camera, CameraResources, Projection},
    config::{CameraConfig, hex_to_color},
    data_structures::{
        material::MaterialLayouts,
        texture::{self, Texture},
    },
    pipelines::Pipelines,
    render::{Batches, Render},
};

#[derive(Debug)]
pub struct Gpu {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub layouts: MaterialLayouts,
    pub camera_layout: wgpu::BindGroupLayout,
    pub sampler: wgpu::Sampler,
}

impl Gpu {
    /// The instance is a handle to our GPU.
    /// BackendBit::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
    pub fn create_instance() -> wgpu::Instance {
        wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        })
    }

    /// `compatible_surface` is `None` for headless use.
    pub async fn new(
        instance: wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
    ) -> anyhow::Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable graphics adapter")?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                ..Default::default()
            })
            .await
            .context("Failed to create the graphics device")?;

        let layouts = MaterialLayouts::new(&device);
        let camera_layout = camera::camera_bind_group_layout(&device);
        let sampler = texture::create_default_sampler(&device);

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            layouts,
            camera_layout,
            sampler,
        })
    }
}

#[derive(Debug)]
pub struct Viewport {
    pub(crate) window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
    depth_texture: Texture,
    pub pipelines: Pipelines,
    pub camera: CameraResources,
    pub clear_colour: wgpu::Color,
    is_surface_configured: bool,
    visible: bool,
}

impl Viewport {
    pub fn new(
        gpu: &Gpu,
        window: Arc<Window>,
        surface: wgpu::Surface<'static>,
        camera_config: &CameraConfig,
    ) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&gpu.adapter);
        // Shaders assume an sRGB surface, anything else renders too dark.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("Surface is incompatible with the adapter")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let pipelines = Pipelines::new(&gpu.device, surface_format, &gpu.camera_layout, &gpu.layouts);
        let camera = CameraResources::new(
            &gpu.device,
            &gpu.camera_layout,
            Camera::new(camera_config.eye, camera_config.look_at),
            Projection::new(
                size.width,
                size.height,
                cgmath::Deg(camera_config.fovy_degrees),
                camera_config.near,
                camera_config.far,
            ),
        );
        let depth_texture =
            Texture::create_depth_texture(&gpu.device, [size.width, size.height], "depth_texture");

        Ok(Self {
            window,
            surface,
            config,
            depth_texture,
            pipelines,
            camera,
            clear_colour: hex_to_color(camera_config.clear_color),
            is_surface_configured: false,
            visible: true,
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn is_surface_configured(&self) -> bool {
        self.is_surface_configured
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// A zero-sized resize leaves the surface unconfigured; drawing is skipped until a
    /// valid size arrives.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.is_surface_configured = true;
            self.camera.projection.resize(width, height);
            self.surface.configure(device, &self.config);
            self.depth_texture = Texture::create_depth_texture(
                device,
                [self.config.width, self.config.height],
                "depth_texture",
            );
        } else {
            self.is_surface_configured = false;
        }
    }

    pub fn reconfigure(&mut self, device: &wgpu::Device) {
        let size = self.window.inner_size();
        self.resize(device, size.width, size.height);
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        #[cfg(not(target_arch = "wasm32"))]
        self.window.set_visible(visible);
        #[cfg(target_arch = "wasm32")]
        crate::web::set_canvas_visible(&self.window, visible);
        if visible {
            self.window.request_redraw();
        }
    }

    /// Clears to the background colour and draws `render` on top.
    pub fn render(&mut self, gpu: &Gpu, render: Render<'_>) -> Result<(), wgpu::SurfaceError> {
        if !self.is_surface_configured || !self.visible {
            return Ok(());
        }

        self.camera.write_to_buffer(&gpu.queue);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            Batches::from_render(render).draw(
                &mut render_pass,
                &self.pipelines,
                &self.camera.bind_group,
            );
        }

        gpu.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

//! Look-at cameras, perspective projection and the eased camera rig.
//!
//! The backdrops never let the user fly the camera. Each frame a scene computes a target
//! eye and look-at point from the pointer, the scroll progress and the clock, and the
//! [`CameraRig`] moves the eye a fixed fraction of the remaining distance towards its
//! target while the look-at point is taken as is.

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use wgpu::util::DeviceExt;

/// cgmath builds OpenGL clip space (z in -1..1); wgpu expects z in 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    pub fn new<E: Into<Point3<f32>>, T: Into<Point3<f32>>>(eye: E, target: T) -> Self {
        Self {
            eye: eye.into(),
            target: target.into(),
            up: Vector3::unit_y(),
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye, self.target, self.up)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Layout mirrors `CameraUniform` in every shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub view_position: [f32; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view: Matrix4::identity().into(),
            proj: Matrix4::identity().into(),
            view_position: [0.0; 4],
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.eye.to_homogeneous().into();
        self.view = camera.calc_matrix().into();
        self.proj = projection.calc_matrix().into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

pub fn camera_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("camera_bind_group_layout"),
    })
}

/// Camera state plus its GPU uniform, one per viewport.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub projection: Projection,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl CameraResources {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        camera: Camera,
        projection: Projection,
    ) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, &projection);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            camera,
            projection,
            uniform,
            buffer,
            bind_group,
        }
    }

    pub fn write_to_buffer(&mut self, queue: &wgpu::Queue) {
        self.uniform.update_view_proj(&self.camera, &self.projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

/// Exponentially smoothed eye position. The look-at point follows its target directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub eye: Point3<f32>,
    pub look_at: Point3<f32>,
    pub damping: f32,
}

impl CameraRig {
    pub fn new(eye: Point3<f32>, look_at: Point3<f32>, damping: f32) -> Self {
        Self {
            eye,
            look_at,
            damping: damping.clamp(0.0, 1.0),
        }
    }

    /// Moves the eye `damping` of the remaining distance towards `eye`, per axis.
    pub fn ease_towards(&mut self, eye: Point3<f32>, look_at: Point3<f32>) {
        self.eye = ease(self.eye, eye, self.damping);
        self.look_at = look_at;
    }

    pub fn apply(&self, camera: &mut Camera) {
        camera.eye = self.eye;
        camera.target = self.look_at;
    }
}

pub fn ease(current: Point3<f32>, target: Point3<f32>, damping: f32) -> Point3<f32> {
    current + (target - current) * damping
}

/// Rotates `eye` around the y axis through the origin by `angle` radians and clamps its
/// distance to the origin to `[min_distance, max_distance]`.
pub fn orbit(eye: Point3<f32>, angle: f32, min_distance: f32, max_distance: f32) -> Point3<f32> {
    let (sin, cos) = angle.sin_cos();
    let rotated = Vector3::new(eye.x * cos + eye.z * sin, eye.y, eye.z * cos - eye.x * sin);
    let distance = rotated.magnitude();
    let clamped = distance.clamp(min_distance, max_distance.max(min_distance));
    if distance > f32::EPSILON {
        Point3::from_vec(rotated * (clamped / distance))
    } else {
        Point3::new(0.0, 0.0, clamped)
    }
}

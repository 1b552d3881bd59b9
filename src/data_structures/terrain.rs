//! Terrain grid and the shading rules evaluated by `terrain.wgsl`.
//!
//! The grid itself is flat; displacement happens in the vertex shader every frame. The
//! functions below are the host-side statement of the same per-vertex and per-fragment
//! rules. They are used by the tests and by anything that needs terrain heights on the
//! CPU, and must stay in sync with the shader.

use cgmath::{InnerSpace, Vector3};

use crate::{
    data_structures::model::{MeshData, ModelVertex},
    pipelines::terrain::TerrainUniform,
};

const UP: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);

/// Amplitude of the colour dither added after fogging.
pub const DITHER_AMPLITUDE: f32 = 0.02;

/// Upper bound on grid resolution. Keeps vertex indices well inside `u32`.
pub const MAX_TERRAIN_SEGMENTS: u32 = 1024;

/// Square grid of `segments x segments` quads centred on the origin in the XZ plane with
/// normals pointing up. `v` runs from 1 at the far edge (`-z`) to 0 at the near edge.
/// `segments` is clamped to `1..=MAX_TERRAIN_SEGMENTS`.
pub fn terrain_grid(size: f32, segments: u32) -> MeshData {
    let segments = segments.clamp(1, MAX_TERRAIN_SEGMENTS);
    let row = segments + 1;
    let half = size / 2.0;
    let step = size / segments as f32;

    let mut vertices = Vec::with_capacity(row as usize * row as usize);
    for iz in 0..row {
        for ix in 0..row {
            let u = ix as f32 / segments as f32;
            let v = iz as f32 / segments as f32;
            vertices.push(ModelVertex {
                position: [-half + ix as f32 * step, 0.0, -half + iz as f32 * step],
                tex_coords: [u, 1.0 - v],
                normal: [0.0, 1.0, 0.0],
            });
        }
    }

    let mut indices = Vec::with_capacity(segments as usize * segments as usize * 6);
    for iz in 0..segments {
        for ix in 0..segments {
            let a = iz * row + ix;
            let b = a + 1;
            let c = a + row;
            let d = c + 1;
            indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }

    MeshData { vertices, indices }
}

/// Hermite interpolation between `edge0` and `edge1`. Degenerate or inverted edges
/// collapse to a step at `edge0` instead of dividing by zero.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if !(edge1 > edge0) {
        return if x >= edge0 { 1.0 } else { 0.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn mix3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [mix(a[0], b[0], t), mix(a[1], b[1], t), mix(a[2], b[2], t)]
}

fn normalize_or_up(v: Vector3<f32>) -> Vector3<f32> {
    if v.magnitude2() > f32::EPSILON && v.magnitude2().is_finite() {
        v.normalize()
    } else {
        UP
    }
}

/// Broad noise weighted 0.8 against 0.2 for the fine detail octave.
pub fn blend_noise(perlin: f32, detail: f32) -> f32 {
    perlin * 0.8 + detail * 0.2
}

/// Normalized elevation in `[0, 1]`; this is also the value the snow mask reads.
pub fn displacement_factor(perlin: f32, detail: f32, low: f32, high: f32) -> f32 {
    smoothstep(low, high, blend_noise(perlin, detail))
}

pub fn idle_wave(time: f32, x: f32, amplitude: f32) -> f32 {
    (time * 0.5 + x * 0.1).sin() * amplitude
}

/// Offset along the surface normal of a vertex at local `x`.
pub fn terrain_height(uniform: &TerrainUniform, perlin: f32, detail: f32, time: f32, x: f32) -> f32 {
    let factor = displacement_factor(perlin, detail, uniform.threshold_low, uniform.threshold_high);
    factor * uniform.displacement_scale + idle_wave(time, x, uniform.idle_amplitude)
}

/// Upper bound on `|terrain_height|`.
pub fn max_displacement(uniform: &TerrainUniform) -> f32 {
    uniform.displacement_scale.abs() + uniform.idle_amplitude.abs()
}

/// Normal of a height field from its slope along x and z.
pub fn height_normal(dh_dx: f32, dh_dz: f32) -> Vector3<f32> {
    normalize_or_up(Vector3::new(-dh_dx, 1.0, -dh_dz))
}

/// Bends `normal` by a tangent-space normal-map texel given in `[0, 1]` per channel.
/// A flat texel `(0.5, 0.5, 1.0)` leaves the normal unchanged.
pub fn perturb_normal(normal: Vector3<f32>, texel: [f32; 3]) -> Vector3<f32> {
    let n = normalize_or_up(normal);
    let tangent = normalize_or_up(Vector3::unit_x() - n * n.x);
    let bitangent = n.cross(tangent);
    let t = Vector3::new(texel[0] * 2.0 - 1.0, texel[1] * 2.0 - 1.0, texel[2] * 2.0 - 1.0);
    let mapped = tangent * t.x + bitangent * t.y + n * t.z;
    normalize_or_up(n + mapped * 0.5)
}

/// Snow coverage from normalized elevation and slope: full snow on high flat ground, none
/// on vertical faces or below `level - blend`.
pub fn snow_factor(elevation: f32, level: f32, blend: f32, normal: Vector3<f32>) -> f32 {
    let height_mask = smoothstep(level - blend, level + blend, elevation);
    let slope_mask = normalize_or_up(normal).dot(UP).max(0.0);
    (height_mask * slope_mask).clamp(0.0, 1.0)
}

pub fn fog_factor(distance: f32, near: f32, far: f32) -> f32 {
    smoothstep(near, far, distance)
}

/// Everything the fragment stage samples or interpolates for one terrain pixel.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceSample {
    pub albedo: [f32; 3],
    pub snow: [f32; 3],
    /// Normal-map texel in `[0, 1]` per channel.
    pub normal_texel: [f32; 3],
    pub normal: Vector3<f32>,
    pub elevation: f32,
    pub distance: f32,
    pub world_x: f32,
    pub time: f32,
}

/// Final terrain colour, each channel clamped to `[0, 1]`. Lighting is Lambert diffuse
/// plus ambient; there is no specular term.
pub fn shade(uniform: &TerrainUniform, s: &SurfaceSample) -> [f32; 3] {
    let n = perturb_normal(s.normal, s.normal_texel);
    let snow = snow_factor(s.elevation, uniform.snow_level, uniform.snow_blend, n);
    let base = mix3(s.albedo, s.snow, snow);

    let l = normalize_or_up(Vector3::from(uniform.light_direction));
    let diffuse = n.dot(l).max(0.0);

    let fog = fog_factor(s.distance, uniform.fog_near, uniform.fog_far);
    let dither = (s.time + s.world_x * 0.1).sin() * DITHER_AMPLITUDE;

    let mut out = [0.0; 3];
    for i in 0..3 {
        let lit = base[i] * (uniform.light_color[i] * diffuse + uniform.ambient_color[i]);
        let c = mix(lit, uniform.fog_color[i], fog) + dither;
        out[i] = if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) };
    }
    out
}

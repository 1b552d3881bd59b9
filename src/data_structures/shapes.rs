//! Procedural primitive meshes and colour helpers for the secondary scene objects.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector3};

use crate::data_structures::model::{MeshData, ModelVertex};

/// Closed cone with its apex at `+height/2` and the base disc at `-height/2`, centred on
/// the y axis.
pub fn cone(radius: f32, height: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let half = height * 0.5;
    let slope = if height != 0.0 { radius / height } else { 0.0 };
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    // side: an apex row and a base row, both with a seam duplicate
    for row in 0..=1u32 {
        let v = row as f32;
        let ring = v * radius;
        for x in 0..=segments {
            let u = x as f32 / segments as f32;
            let theta = u * 2.0 * PI;
            let (sin, cos) = theta.sin_cos();
            let normal = Vector3::new(sin, slope, cos).normalize();
            vertices.push(ModelVertex {
                position: [ring * sin, half - v * height, ring * cos],
                tex_coords: [u, 1.0 - v],
                normal: normal.into(),
            });
        }
    }
    let row = segments + 1;
    for x in 0..segments {
        let b = row + x;
        let c = row + x + 1;
        let d = x + 1;
        indices.extend_from_slice(&[b, c, d]);
    }

    // base cap
    let center = vertices.len() as u32;
    vertices.push(ModelVertex {
        position: [0.0, -half, 0.0],
        tex_coords: [0.5, 0.5],
        normal: [0.0, -1.0, 0.0],
    });
    let rim = vertices.len() as u32;
    for x in 0..=segments {
        let theta = x as f32 / segments as f32 * 2.0 * PI;
        let (sin, cos) = theta.sin_cos();
        vertices.push(ModelVertex {
            position: [radius * sin, -half, radius * cos],
            tex_coords: [cos * 0.5 + 0.5, sin * 0.5 + 0.5],
            normal: [0.0, -1.0, 0.0],
        });
    }
    for x in 0..segments {
        indices.extend_from_slice(&[rim + x + 1, rim + x, center]);
    }

    MeshData { vertices, indices }
}

/// Latitude/longitude sphere. Texture `u` runs once around the equator and `v` from the
/// north pole (1) to the south pole (0), the layout equirectangular earth maps expect.
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let mut vertices = Vec::new();
    let mut grid = Vec::new();

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let mut row = Vec::new();
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let normal = Vector3::new(
                -(u * 2.0 * PI).cos() * (v * PI).sin(),
                (v * PI).cos(),
                (u * 2.0 * PI).sin() * (v * PI).sin(),
            );
            row.push(vertices.len() as u32);
            vertices.push(ModelVertex {
                position: (normal * radius).into(),
                tex_coords: [u, 1.0 - v],
                normal: normal.into(),
            });
        }
        grid.push(row);
    }

    let mut indices = Vec::new();
    for iy in 0..height_segments as usize {
        for ix in 0..width_segments as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];
            // the pole rows collapse to a single point, skip their degenerate halves
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments as usize - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    MeshData { vertices, indices }
}

/// HSL in `[0,1]` to linear-ish RGB in `[0,1]`.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    let h = hue.rem_euclid(1.0);
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);
    if s == 0.0 {
        return [l; 3];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    [
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    ]
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

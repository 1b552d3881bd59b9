use alpine_backdrop::data_structures::{
    model::{MeshData, ModelVertex},
    shapes::{cone, hsl_to_rgb, uv_sphere},
};
use cgmath::{InnerSpace, Vector3};

use crate::common::test_utils::assert_close;
mod common;

#[test]
fn should_build_sphere_without_pole_slivers() {
    let sphere = uv_sphere(10.0, 8, 6);
    assert_eq!(sphere.vertices.len(), 9 * 7);
    assert_eq!(sphere.triangle_count(), 8 * (2 * 6 - 2));
    for v in &sphere.vertices {
        assert_close(Vector3::from(v.position).magnitude(), 10.0, 1e-4);
    }
    assert_close(sphere.vertices[0].position[1], 10.0, 1e-5);
    assert_close(sphere.vertices.last().map(|v| v.position[1]).unwrap_or(0.0), -10.0, 1e-5);
}

#[test]
fn should_close_cone_with_base_cap() {
    let cone = cone(3.0, 6.0, 8);
    assert_eq!(cone.vertices.len(), 2 * 9 + 1 + 9);
    assert_eq!(cone.triangle_count(), 16);
    assert_eq!(cone.vertices[0].position, [0.0, 3.0, 0.0]);
    let base: Vec<_> = cone.vertices[9..18].to_vec();
    for v in base {
        assert_close(v.position[1], -3.0, 1e-6);
        assert_close(v.position[0].hypot(v.position[2]), 3.0, 1e-5);
    }
    assert!(cone.indices.iter().all(|&i| (i as usize) < cone.vertices.len()));
}

#[test]
fn should_convert_hsl() {
    assert_eq!(hsl_to_rgb(0.0, 0.0, 0.4), [0.4, 0.4, 0.4]);
    let red = hsl_to_rgb(0.0, 1.0, 0.5);
    assert_close(red[0], 1.0, 1e-6);
    assert_close(red[1], 0.0, 1e-6);
    assert_close(red[2], 0.0, 1e-6);
    let blue = hsl_to_rgb(2.0 / 3.0, 1.0, 0.5);
    assert_close(blue[2], 1.0, 1e-5);
    assert_close(blue[0], 0.0, 1e-5);
    assert_eq!(hsl_to_rgb(1.25, 0.5, 0.5), hsl_to_rgb(0.25, 0.5, 0.5));
}

#[test]
fn should_list_every_quad_edge_once() {
    let vertex = |x: f32, z: f32| ModelVertex {
        position: [x, 0.0, z],
        tex_coords: [0.0, 0.0],
        normal: [0.0, 1.0, 0.0],
    };
    let quad = MeshData {
        vertices: vec![vertex(0.0, 0.0), vertex(1.0, 0.0), vertex(0.0, 1.0), vertex(1.0, 1.0)],
        indices: vec![0, 2, 1, 1, 2, 3],
    };
    let wire = quad.to_wireframe();
    assert_eq!(wire.indices.len(), 5 * 2);
    assert_eq!(wire.vertices.len(), 4);
}

#[test]
fn should_glow_at_the_rim_of_the_atmosphere() {
    use alpine_backdrop::pipelines::glow::glow_intensity;

    let normal = Vector3::new(0.0, 0.0, 1.0);
    assert_eq!(glow_intensity(normal, Vector3::new(0.0, 0.0, 1.0), 0.7, 2.0), 0.0);
    assert_close(glow_intensity(normal, Vector3::new(1.0, 0.0, 0.0), 0.7, 2.0), 0.49, 1e-6);
    let back = glow_intensity(normal, Vector3::new(0.0, 0.0, -1.0), 0.7, 2.0);
    assert_close(back, 1.7 * 1.7, 1e-5);
    assert_close(glow_intensity(Vector3::new(0.0, 0.0, 0.0), normal, 0.7, 2.0), 0.49, 1e-6);
}

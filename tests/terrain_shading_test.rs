use alpine_backdrop::{
    config::TerrainConfig,
    data_structures::terrain::{
        MAX_TERRAIN_SEGMENTS, SurfaceSample, displacement_factor, fog_factor, height_normal, max_displacement,
        perturb_normal, shade, smoothstep, snow_factor, terrain_grid, terrain_height,
    },
    pipelines::terrain::TerrainUniform,
};
use cgmath::{InnerSpace, Vector3};

use crate::common::test_utils::assert_close;
mod common;

fn uniform() -> TerrainUniform {
    TerrainUniform::from_config(&TerrainConfig::default())
}

#[test]
fn should_displace_high_noise_almost_fully() {
    let factor = displacement_factor(0.9, 0.9, 0.2, 1.0);
    assert_close(factor, 0.957, 0.001);
    assert!((1.0 - factor) < 0.05);
    assert_eq!(displacement_factor(0.0, 0.0, 0.2, 1.0), 0.0);
    assert_eq!(displacement_factor(1.0, 1.0, 0.2, 1.0), 1.0);
}

#[test]
fn should_treat_degenerate_edges_as_a_step() {
    assert_eq!(smoothstep(0.5, 0.5, 0.4), 0.0);
    assert_eq!(smoothstep(0.5, 0.5, 0.5), 1.0);
    assert_eq!(smoothstep(0.8, 0.2, 0.9), 1.0);
    assert_eq!(smoothstep(0.8, 0.2, 0.5), 0.0);
}

#[test]
fn should_grow_snow_monotonically_with_elevation() {
    let up = Vector3::new(0.0, 1.0, 0.0);
    let mut previous = 0.0;
    for i in 0..=100 {
        let elevation = i as f32 / 100.0;
        let snow = snow_factor(elevation, 0.5, 0.2, up);
        assert!((0.0..=1.0).contains(&snow));
        assert!(snow >= previous, "snow dropped at elevation {}", elevation);
        previous = snow;
    }
    assert_eq!(snow_factor(0.2, 0.5, 0.2, up), 0.0);
    assert_eq!(snow_factor(1.0, 0.5, 0.2, up), 1.0);
}

#[test]
fn should_keep_snow_off_vertical_faces() {
    let wall = Vector3::new(1.0, 0.0, 0.0);
    assert_close(snow_factor(1.0, 0.5, 0.2, wall), 0.0, 1e-6);
    let overhang = Vector3::new(0.0, -1.0, 0.0);
    assert_eq!(snow_factor(1.0, 0.5, 0.2, overhang), 0.0);
}

#[test]
fn should_bound_terrain_height() {
    let uniform = uniform();
    let bound = max_displacement(&uniform);
    for step in 0..50 {
        let time = step as f32 * 0.37;
        for (perlin, detail) in [(0.0, 0.0), (0.3, 0.9), (1.0, 1.0), (0.6, 0.1)] {
            let h = terrain_height(&uniform, perlin, detail, time, step as f32 - 25.0);
            assert!(h.abs() <= bound + 1e-4, "{} exceeds {}", h, bound);
        }
    }
}

#[test]
fn should_leave_normal_untouched_by_flat_texel() {
    let n = height_normal(0.3, -0.2);
    let perturbed = perturb_normal(n, [0.5, 0.5, 1.0]);
    assert_close(perturbed.dot(n), 1.0, 1e-5);
    assert_close(height_normal(0.0, 0.0).y, 1.0, 1e-6);
}

#[test]
fn should_fade_into_fog_between_near_and_far() {
    assert_eq!(fog_factor(5.0, 10.0, 50.0), 0.0);
    assert_eq!(fog_factor(60.0, 10.0, 50.0), 1.0);
    assert_close(fog_factor(30.0, 10.0, 50.0), 0.5, 1e-6);
}

#[test]
fn should_shade_within_unit_range() {
    let uniform = uniform();
    let samples = [
        (1.0, Vector3::new(0.0, 1.0, 0.0), 5.0),
        (0.0, Vector3::new(0.3, 0.8, 0.1), 120.0),
        (0.7, Vector3::new(1.0, 0.0, 0.0), 30.0),
        (0.5, Vector3::new(0.0, 0.0, 0.0), 0.0),
    ];
    for (i, (elevation, normal, distance)) in samples.into_iter().enumerate() {
        let sample = SurfaceSample {
            albedo: [0.9, 0.8, 0.7],
            snow: [1.0, 1.0, 1.0],
            normal_texel: [0.6, 0.4, 0.9],
            normal,
            elevation,
            distance,
            world_x: i as f32 * 10.0,
            time: i as f32,
        };
        for channel in shade(&uniform, &sample) {
            assert!((0.0..=1.0).contains(&channel), "channel {} of sample {}", channel, i);
        }
    }
}

#[test]
fn should_shade_black_albedo_to_black_without_fog_or_dither() {
    let mut uniform = uniform();
    uniform.fog_near = 10.0;
    uniform.fog_far = 20.0;
    let light = Vector3::from(uniform.light_direction).normalize();
    let sample = SurfaceSample {
        albedo: [0.0, 0.0, 0.0],
        snow: [0.0, 0.0, 0.0],
        normal_texel: [0.5, 0.5, 1.0],
        // Facing the light head on, where any highlight would peak.
        normal: light,
        elevation: 0.0,
        distance: 0.0,
        world_x: 0.0,
        time: 0.0,
    };
    assert_eq!(shade(&uniform, &sample), [0.0, 0.0, 0.0]);
}

#[test]
fn should_build_square_grid() {
    let grid = terrain_grid(10.0, 4);
    assert_eq!(grid.vertices.len(), 25);
    assert_eq!(grid.indices.len(), 4 * 4 * 6);
    assert_eq!(grid.triangle_count(), 32);
    assert_eq!(grid.vertices[0].position, [-5.0, 0.0, -5.0]);
    assert_eq!(grid.vertices[24].position, [5.0, 0.0, 5.0]);
    assert!(grid.vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
    assert!(grid.indices.iter().all(|&i| (i as usize) < grid.vertices.len()));
}

#[test]
fn should_clamp_grid_segments() {
    let grid = terrain_grid(10.0, u32::MAX);
    let row = MAX_TERRAIN_SEGMENTS as usize + 1;
    assert_eq!(grid.vertices.len(), row * row);
    assert_eq!(grid.indices.len(), (row - 1) * (row - 1) * 6);
    assert!(grid.indices.iter().all(|&i| (i as usize) < grid.vertices.len()));

    let single = terrain_grid(10.0, 0);
    assert_eq!(single.vertices.len(), 4);
    assert_eq!(single.indices.len(), 6);
}

use std::f32::consts::PI;

use alpine_backdrop::{
    config::ParticleConfig,
    data_structures::particles::{
        HorizontalWrap, Particle, ParticleField, RecycleBand, distance_fade, wind_offset,
    },
};
use cgmath::Vector3;

use crate::common::test_utils::{assert_close, seeded_rng};
mod common;

#[test]
fn should_recycle_into_band_below_ceiling() {
    let band = RecycleBand::new(-10.0, 60.0, 40.0);
    assert_eq!(band.ceiling, 50.0);
    assert_eq!(band.lower_bound(), 10.0);

    assert_eq!(band.apply(-5.0), -5.0);
    assert_eq!(band.apply(-10.0), -10.0);
    assert_close(band.apply(-11.0), 49.0, 1e-5);
    assert_close(band.apply(-60.0), 40.0, 1e-4);
    for y in [-10.5, -30.0, -49.9, -200.0, -1e6] {
        let recycled = band.apply(y);
        assert!(recycled > band.lower_bound() && recycled <= band.ceiling, "{} -> {}", y, recycled);
    }
}

#[test]
fn should_send_non_finite_heights_to_ceiling() {
    let band = RecycleBand::new(-10.0, 60.0, 40.0);
    assert_eq!(band.apply(f32::NAN), 50.0);
    assert_eq!(band.apply(f32::NEG_INFINITY), 50.0);
}

#[test]
fn should_keep_snow_count_and_floor_while_falling() {
    let config = ParticleConfig::snow();
    let mut field = ParticleField::spawn(&config, &mut seeded_rng(7));
    assert_eq!(field.len(), config.count);

    for _ in 0..5000 {
        field.step(0.016);
    }
    assert_eq!(field.len(), config.count);
    assert!(field.particles().iter().all(|p| p.position.y >= -10.0));
}

#[test]
fn should_wrap_sideways_drift_to_the_opposite_edge() {
    let wrap = HorizontalWrap::from_spawn_box([-50.0, 10.0, -50.0], [50.0, 60.0, 50.0]);
    assert_eq!(wrap.apply(10.0, -20.0), (10.0, -20.0));
    let (x, z) = wrap.apply(51.0, -51.0);
    assert_close(x, -49.0, 1e-5);
    assert_close(z, 49.0, 1e-5);
    assert_eq!(wrap.apply(f32::INFINITY, f32::NAN), (-50.0, -50.0));

    let particle = Particle {
        position: Vector3::new(49.0, 20.0, 0.0),
        velocity: Vector3::new(2.0, 0.0, -3.0),
        size: 1.0,
        color: [1.0; 4],
    };
    let mut field = ParticleField::from_particles(vec![particle], None).with_horizontal_wrap(wrap);
    field.step(1.0);
    let moved = field.particles()[0].position;
    assert_close(moved.x, -49.0, 1e-5);
    assert_close(moved.z, -3.0, 1e-5);
}

#[test]
fn should_keep_long_running_snow_inside_spawn_box() {
    let config = ParticleConfig::snow();
    let mut field = ParticleField::spawn(&config, &mut seeded_rng(5));
    assert!(field.horizontal_wrap().is_some());
    for _ in 0..2000 {
        field.step(1.0);
    }
    for p in field.particles() {
        assert!(p.position.x >= config.spawn_min[0] && p.position.x < config.spawn_max[0], "x {}", p.position.x);
        assert!(p.position.z >= config.spawn_min[2] && p.position.z < config.spawn_max[2], "z {}", p.position.z);
    }
}

#[test]
fn should_spawn_within_configured_bounds() {
    let config = ParticleConfig::snow();
    let field = ParticleField::spawn(&config, &mut seeded_rng(3));
    for p in field.particles() {
        let position: [f32; 3] = p.position.into();
        let velocity: [f32; 3] = p.velocity.into();
        for axis in 0..3 {
            assert!(position[axis] >= config.spawn_min[axis] && position[axis] <= config.spawn_max[axis]);
            assert!(velocity[axis] >= config.velocity_min[axis] && velocity[axis] <= config.velocity_max[axis]);
        }
        assert!(p.size >= config.size_min && p.size <= config.size_max);
    }
}

#[test]
fn should_leave_stars_in_place() {
    let mut field = ParticleField::spawn(&ParticleConfig::stars(), &mut seeded_rng(11));
    assert!(field.horizontal_wrap().is_none());
    assert!(field.is_static());
    assert!(field.recycle().is_none());
    let before = field.particles().to_vec();
    field.step(1.0);
    assert_eq!(field.particles(), before.as_slice());
}

#[test]
fn should_reproduce_field_from_seed() {
    let config = ParticleConfig::atmosphere();
    let a = ParticleField::spawn(&config, &mut seeded_rng(42));
    let b = ParticleField::spawn(&config, &mut seeded_rng(42));
    assert_eq!(a.particles(), b.particles());
}

#[test]
fn should_integrate_velocity() {
    let particle = Particle {
        position: Vector3::new(0.0, 5.0, 0.0),
        velocity: Vector3::new(1.0, -2.0, 0.5),
        size: 1.0,
        color: [1.0; 4],
    };
    let mut field = ParticleField::from_particles(vec![particle], None);
    field.step(0.5);
    assert_eq!(field.particles()[0].position, Vector3::new(0.5, 4.0, 0.25));
}

#[test]
fn should_sway_with_wind() {
    assert_close(wind_offset(PI, 0.0, 2.0), 2.0, 1e-5);
    assert_eq!(wind_offset(0.0, 0.0, 2.0), 0.0);
    assert_eq!(wind_offset(3.0, 7.0, 0.0), 0.0);
}

#[test]
fn should_fade_with_distance() {
    assert_eq!(distance_fade(10.0, 20.0, 50.0), 1.0);
    assert_eq!(distance_fade(80.0, 20.0, 50.0), 0.0);
    assert_close(distance_fade(35.0, 20.0, 50.0), 0.5, 1e-6);
    assert_eq!(distance_fade(500.0, 0.0, 0.0), 1.0);
}

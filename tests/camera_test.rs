use std::f32::consts::FRAC_PI_2;

use alpine_backdrop::{
    camera::{CameraRig, ease, orbit},
    config::CameraConfig,
    scenes::{
        CameraInput, alpine::alpine_camera_target, globe::OrbitRig, pointer_from_cursor,
        scroll_progress,
    },
};
use cgmath::{MetricSpace, Point3};

use crate::common::test_utils::{assert_close, assert_point_close};
mod common;

#[test]
fn should_ease_a_fraction_of_the_remaining_distance() {
    let eased = ease(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, -20.0, 40.0), 0.5);
    assert_eq!(eased, Point3::new(5.0, -10.0, 20.0));
}

#[test]
fn should_ease_eye_but_take_look_at_directly() {
    let mut rig = CameraRig::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 0.0), 0.02);
    rig.ease_towards(Point3::new(100.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0));
    assert_point_close(rig.eye, Point3::new(2.0, 0.0, 0.0), 1e-5);
    assert_eq!(rig.look_at, Point3::new(1.0, 2.0, 3.0));
}

#[test]
fn should_converge_on_a_fixed_target() {
    let target = Point3::new(0.0, 20.0, 35.0);
    let mut rig = CameraRig::new(Point3::new(0.0, 15.0, 25.0), target, 0.02);
    let mut distance = rig.eye.distance(target);
    for _ in 0..500 {
        rig.ease_towards(target, target);
        let next = rig.eye.distance(target);
        assert!(next <= distance);
        distance = next;
    }
    assert!(distance < 0.01);
}

#[test]
fn should_orbit_around_the_y_axis() {
    let eye = orbit(Point3::new(0.0, 0.0, 20.0), FRAC_PI_2, 15.0, 30.0);
    assert_point_close(eye, Point3::new(20.0, 0.0, 0.0), 1e-4);
}

#[test]
fn should_clamp_orbit_distance() {
    assert_point_close(orbit(Point3::new(0.0, 0.0, 40.0), 0.0, 15.0, 30.0), Point3::new(0.0, 0.0, 30.0), 1e-4);
    assert_point_close(orbit(Point3::new(0.0, 0.0, 5.0), 0.0, 15.0, 30.0), Point3::new(0.0, 0.0, 15.0), 1e-4);
    assert_point_close(orbit(Point3::new(0.0, 0.0, 0.0), 0.3, 15.0, 30.0), Point3::new(0.0, 0.0, 15.0), 1e-4);
}

#[test]
fn should_map_cursor_to_device_coordinates() {
    assert_eq!(pointer_from_cursor(0.0, 0.0, 800, 600), [-1.0, 1.0]);
    assert_eq!(pointer_from_cursor(800.0, 600.0, 800, 600), [1.0, -1.0]);
    assert_eq!(pointer_from_cursor(400.0, 300.0, 800, 600), [0.0, 0.0]);
    assert_eq!(pointer_from_cursor(10.0, 10.0, 0, 600), [0.0, 0.0]);
}

#[test]
fn should_measure_scroll_progress() {
    assert_close(scroll_progress(1500.0, 3800.0, 800.0), 0.5, 1e-6);
    assert_eq!(scroll_progress(4000.0, 3800.0, 800.0), 1.0);
    assert_eq!(scroll_progress(-50.0, 3800.0, 800.0), 0.0);
    assert_eq!(scroll_progress(100.0, 600.0, 800.0), 0.0);
    assert_eq!(scroll_progress(f32::NAN, 3800.0, 800.0), 0.0);
}

#[test]
fn should_dolly_terrain_camera_with_scroll() {
    let camera = CameraConfig::alpine();
    let input = CameraInput {
        pointer: [0.0, 0.0],
        scroll_progress: 1.0,
    };
    let (eye, look_at) = alpine_camera_target(&camera, &input, 0.0);
    assert_point_close(eye, Point3::new(0.0, 20.0, 35.0), 1e-5);
    assert_point_close(look_at, Point3::new(0.0, -4.0, -10.0), 1e-5);
}

#[test]
fn should_follow_the_pointer_with_terrain_camera() {
    let camera = CameraConfig::alpine();
    let mut input = CameraInput::default();
    input.set_pointer(800.0, 0.0, 800, 600);
    let (eye, _) = alpine_camera_target(&camera, &input, 0.0);
    assert_point_close(eye, Point3::new(2.0, 16.0, 25.0), 1e-5);
}

#[test]
fn should_offset_globe_eye_by_pointer() {
    let mut camera = CameraConfig::globe();
    camera.orbit_speed = 0.0;
    let mut rig = OrbitRig::new(&camera);
    let input = CameraInput {
        pointer: [1.0, -0.5],
        scroll_progress: 0.0,
    };
    let (eye, look_at) = rig.step(&input);
    assert_point_close(eye, Point3::new(1.0, -0.5, 20.0), 1e-5);
    assert_eq!(look_at, Point3::new(0.0, 0.0, 0.0));
    assert_point_close(rig.position, Point3::new(0.0, 0.0, 20.0), 1e-5);
}

#[test]
fn should_keep_globe_orbit_within_distance_limits() {
    let camera = CameraConfig::globe();
    let mut rig = OrbitRig::new(&camera);
    for _ in 0..3600 {
        rig.step(&CameraInput::default());
        let distance = rig.position.distance(Point3::new(0.0, 0.0, 0.0));
        assert!(distance >= camera.min_distance - 1e-3 && distance <= camera.max_distance + 1e-3);
    }
}

use std::f32::consts::PI;

use cgmath::{Deg, InnerSpace, Point3};
use instant::Duration;
use orbit_viewer::{
    camera::{Camera, Projection},
    controls::OrbitController,
};
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceId, Touch, TouchPhase, WindowEvent},
};

use crate::common::test_utils::assert_close;

mod common;

const FRAME: Duration = Duration::from_millis(16);

fn rig() -> (Camera, Projection) {
    (
        Camera::new([0.0, 0.0, 5.0]),
        Projection::new(800, 600, Deg(60.0), 0.1, 100.0),
    )
}

fn azimuth(camera: &Camera) -> f32 {
    camera.position.x.atan2(camera.position.z)
}

fn radius(camera: &Camera) -> f32 {
    (camera.position - camera.target).magnitude()
}

fn touch(id: u64, phase: TouchPhase, x: f64, y: f64) -> WindowEvent {
    WindowEvent::Touch(Touch {
        device_id: DeviceId::dummy(),
        phase,
        location: PhysicalPosition::new(x, y),
        force: None,
        id,
    })
}

#[test]
fn should_apply_the_full_rotation_without_damping() {
    let (mut camera, projection) = rig();
    let mut controls = OrbitController::new(0.0, 600);

    controls.rotate_left(0.5);
    assert!(controls.update(&mut camera, &projection, FRAME));

    assert_close(azimuth(&camera), -0.5, 1e-5);
    assert_close((camera.position - Point3::new(0.0, 0.0, 0.0)).magnitude(), 5.0, 1e-4);
    assert!(controls.is_settled());
}

#[test]
fn should_ease_into_the_rotation_with_damping() {
    let (mut camera, projection) = rig();
    let mut controls = OrbitController::new(0.05, 600);

    controls.rotate_left(1.0);
    controls.update(&mut camera, &projection, FRAME);
    let first = azimuth(&camera);
    assert!(first < 0.0 && first > -0.5, "first frame moved to {first}");

    let mut frames = 1;
    while !controls.is_settled() && frames < 1000 {
        controls.update(&mut camera, &projection, FRAME);
        frames += 1;
    }

    assert!(controls.is_settled(), "still moving after {frames} frames");
    assert_close(azimuth(&camera), -1.0, 1e-3);
    assert!(!controls.update(&mut camera, &projection, FRAME));
}

#[test]
fn should_not_flip_over_the_poles() {
    let (mut camera, projection) = rig();
    let mut controls = OrbitController::new(0.0, 600);

    controls.rotate_up(10.0);
    controls.update(&mut camera, &projection, FRAME);

    let offset = camera.position - Point3::new(0.0, 0.0, 0.0);
    assert!(offset.y > 0.0);
    assert!(offset.x.hypot(offset.z) > 0.0, "camera sits exactly on the pole");
    assert_close(offset.magnitude(), 5.0, 1e-4);
    assert_eq!(camera.target, Point3::new(0.0, 0.0, 0.0));
}

#[test]
fn should_dolly_towards_the_target() {
    let (mut camera, projection) = rig();
    let mut controls = OrbitController::new(0.05, 600);

    controls.dolly(0.5);
    controls.update(&mut camera, &projection, FRAME);

    assert_close(camera.position.z, 2.5, 1e-4);
}

#[test]
fn should_respect_the_distance_limits() {
    let (mut camera, projection) = rig();
    let mut controls = OrbitController::new(0.0, 600);
    controls.min_distance = 2.0;
    controls.max_distance = 8.0;

    controls.dolly(0.01);
    controls.update(&mut camera, &projection, FRAME);
    assert_close(camera.position.z, 2.0, 1e-4);

    controls.dolly(100.0);
    controls.update(&mut camera, &projection, FRAME);
    assert_close(camera.position.z, 8.0, 1e-4);
}

#[test]
fn should_ignore_invalid_dolly_factors() {
    let (mut camera, projection) = rig();
    let mut controls = OrbitController::new(0.0, 600);

    controls.dolly(0.0);
    controls.dolly(-2.0);
    controls.dolly(f32::NAN);

    assert!(controls.is_settled());
    assert!(!controls.update(&mut camera, &projection, FRAME));
    assert_eq!(camera.position, Point3::new(0.0, 0.0, 5.0));
}

#[test]
fn should_pan_camera_and_target_together() {
    let (mut camera, projection) = rig();
    let mut controls = OrbitController::new(0.0, 600);

    // Dragging right moves the scene right, so the camera goes left
    controls.pan(100.0, 0.0);
    controls.update(&mut camera, &projection, FRAME);

    assert!(controls.target.x < 0.0);
    assert_close(controls.target.y, 0.0, 1e-6);
    assert_close(camera.position.x, controls.target.x, 1e-5);
    assert_close(camera.position.z, 5.0, 1e-4);
    assert_eq!(camera.target, controls.target);
}

#[test]
fn should_drop_pending_motion_when_retargeted() {
    let (mut camera, projection) = rig();
    let mut controls = OrbitController::new(0.05, 600);
    controls.rotate_left(1.0);
    controls.pan(50.0, 50.0);

    controls.set_target([1.0, 2.0, 3.0]);

    assert!(controls.is_settled());
    assert!(!controls.update(&mut camera, &projection, FRAME));
}

#[test]
fn should_rotate_with_one_finger() {
    let (mut camera, projection) = rig();
    let mut controls = OrbitController::new(0.0, 600);

    assert!(controls.handle_window_events(&touch(1, TouchPhase::Started, 100.0, 100.0)));
    assert!(controls.handle_window_events(&touch(1, TouchPhase::Moved, 160.0, 100.0)));
    controls.update(&mut camera, &projection, FRAME);

    assert_close(azimuth(&camera), -2.0 * PI * 60.0 / 600.0, 1e-4);
    assert_close(radius(&camera), 5.0, 1e-4);
    assert_eq!(controls.target, Point3::new(0.0, 0.0, 0.0));
}

#[test]
fn should_ignore_moves_of_unknown_or_lifted_fingers() {
    let (mut camera, projection) = rig();
    let mut controls = OrbitController::new(0.0, 600);

    controls.handle_window_events(&touch(7, TouchPhase::Moved, 300.0, 300.0));
    controls.handle_window_events(&touch(1, TouchPhase::Started, 100.0, 100.0));
    controls.handle_window_events(&touch(1, TouchPhase::Ended, 100.0, 100.0));
    controls.handle_window_events(&touch(1, TouchPhase::Moved, 400.0, 100.0));

    assert!(controls.is_settled());
    assert!(!controls.update(&mut camera, &projection, FRAME));
}

#[test]
fn should_zoom_in_when_two_fingers_spread() {
    let (mut camera, projection) = rig();
    let mut controls = OrbitController::new(0.0, 600);

    controls.handle_window_events(&touch(1, TouchPhase::Started, 300.0, 300.0));
    controls.handle_window_events(&touch(2, TouchPhase::Started, 500.0, 300.0));
    // Spread symmetrically so the midpoint ends where it started
    controls.handle_window_events(&touch(1, TouchPhase::Moved, 200.0, 300.0));
    controls.handle_window_events(&touch(2, TouchPhase::Moved, 600.0, 300.0));
    controls.update(&mut camera, &projection, FRAME);

    assert_close(radius(&camera), 2.5, 1e-4);
    assert_close(azimuth(&camera), 0.0, 1e-5);
    assert_close(controls.target.x, 0.0, 1e-5);
    assert_close(controls.target.y, 0.0, 1e-5);
}

#[test]
fn should_zoom_out_when_two_fingers_pinch() {
    let (mut camera, projection) = rig();
    let mut controls = OrbitController::new(0.0, 600);

    controls.handle_window_events(&touch(1, TouchPhase::Started, 200.0, 300.0));
    controls.handle_window_events(&touch(2, TouchPhase::Started, 600.0, 300.0));
    controls.handle_window_events(&touch(2, TouchPhase::Moved, 400.0, 300.0));
    controls.update(&mut camera, &projection, FRAME);

    assert_close(radius(&camera), 10.0, 1e-3);
}

#[test]
fn should_pan_when_two_fingers_move_together() {
    let (mut camera, projection) = rig();
    let mut controls = OrbitController::new(0.0, 600);

    controls.handle_window_events(&touch(1, TouchPhase::Started, 300.0, 300.0));
    controls.handle_window_events(&touch(2, TouchPhase::Started, 500.0, 300.0));
    controls.handle_window_events(&touch(1, TouchPhase::Moved, 300.0, 400.0));
    controls.handle_window_events(&touch(2, TouchPhase::Moved, 500.0, 400.0));
    controls.update(&mut camera, &projection, FRAME);

    // Dragging down moves the scene down, so the target goes up
    assert!(controls.target.y > 0.0, "target stayed at {:?}", controls.target);
    assert_close(controls.target.x, 0.0, 1e-5);
    assert_close(radius(&camera), 5.0, 1e-4);
    assert_close(azimuth(&camera), 0.0, 1e-5);
    assert_eq!(camera.target, controls.target);
}

#[test]
fn should_fall_back_to_rotation_after_lifting_a_finger() {
    let (mut camera, projection) = rig();
    let mut controls = OrbitController::new(0.0, 600);

    controls.handle_window_events(&touch(1, TouchPhase::Started, 300.0, 300.0));
    controls.handle_window_events(&touch(2, TouchPhase::Started, 500.0, 300.0));
    controls.handle_window_events(&touch(1, TouchPhase::Ended, 300.0, 300.0));
    controls.handle_window_events(&touch(2, TouchPhase::Moved, 440.0, 300.0));
    controls.update(&mut camera, &projection, FRAME);

    assert_close(azimuth(&camera), 2.0 * PI * 60.0 / 600.0, 1e-4);
    assert_close(radius(&camera), 5.0, 1e-4);
}

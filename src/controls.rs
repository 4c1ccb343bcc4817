//! Orbit-style camera controls.
//!
//! The controller keeps the camera on a sphere around `target`. Pointer and
//! touch input only record deltas; [`OrbitController::update`] applies them once
//! per frame. With damping enabled only a fraction of the pending delta is
//! applied each frame and the rest decays, which gives the camera its inertia.

use std::f32::consts::PI;

use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3};
use instant::Duration;
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, Touch, TouchPhase, WindowEvent},
};

use crate::camera::{Camera, Projection};

/// Keeps the camera from flipping over the poles.
const POLAR_EPSILON: f32 = 1e-4;
const MIN_RADIUS: f32 = 1e-6;
/// Damping factors are expressed per frame at this rate.
const REFERENCE_FPS: f32 = 60.0;
/// Upper bound for frames caught up in one update (e.g. after a stall).
const MAX_CATCH_UP_FRAMES: f32 = 10.0;
/// Scroll pixels that count as one wheel line.
const PIXELS_PER_LINE: f32 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Drag {
    None,
    Rotate,
    Pan,
}

/// Spherical coordinates of the camera relative to the target.
///
/// `theta` is the azimuth around +Y measured from +Z, `phi` the polar angle
/// measured from +Y.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vector3<f32>) -> Self {
        let radius = offset.magnitude();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_offset(&self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

#[derive(Debug)]
pub struct OrbitController {
    pub target: Point3<f32>,
    /// Fraction of the pending motion applied per 60 Hz frame; `0` disables damping.
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    spherical_delta: Spherical,
    scale: f32,
    pan_offset: Vector3<f32>,
    /// Screen-space pan in pixels, converted to world space on the next update.
    pending_pan: (f32, f32),
    drag: Drag,
    cursor: Option<PhysicalPosition<f64>>,
    touches: Vec<(u64, PhysicalPosition<f64>)>,
    viewport_height: f32,
}

impl OrbitController {
    pub fn new(damping_factor: f32, viewport_height: u32) -> Self {
        Self {
            target: Point3::origin(),
            damping_factor,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            spherical_delta: Spherical::default(),
            scale: 1.0,
            pan_offset: Vector3::new(0.0, 0.0, 0.0),
            pending_pan: (0.0, 0.0),
            drag: Drag::None,
            cursor: None,
            touches: Vec::new(),
            viewport_height: viewport_height.max(1) as f32,
        }
    }

    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height.max(1) as f32;
    }

    /// Move the orbit centre and drop any motion still in flight.
    pub fn set_target<P: Into<Point3<f32>>>(&mut self, target: P) {
        self.target = target.into();
        self.spherical_delta = Spherical::default();
        self.scale = 1.0;
        self.pan_offset = Vector3::new(0.0, 0.0, 0.0);
        self.pending_pan = (0.0, 0.0);
    }

    pub fn is_settled(&self) -> bool {
        self.spherical_delta.theta.abs() < 1e-6
            && self.spherical_delta.phi.abs() < 1e-6
            && self.pan_offset.magnitude2() < 1e-12
            && self.pending_pan == (0.0, 0.0)
            && self.scale == 1.0
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    /// Move the camera closer by `scale` (`< 1` zooms in, `> 1` zooms out).
    pub fn dolly(&mut self, scale: f32) {
        if scale > 0.0 && scale.is_finite() {
            self.scale *= scale;
        }
    }

    /// Pan by a pointer movement in pixels.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.pending_pan.0 += dx;
        self.pending_pan.1 += dy;
    }

    fn rotate_by_pixels(&mut self, dx: f32, dy: f32) {
        self.rotate_left(2.0 * PI * dx / self.viewport_height * self.rotate_speed);
        self.rotate_up(2.0 * PI * dy / self.viewport_height * self.rotate_speed);
    }

    fn zoom_steps(&mut self, steps: f32) {
        // Positive steps (wheel up) zoom in
        self.dolly(0.95f32.powf(self.zoom_speed * steps));
    }

    /// Record pointer and touch input. Returns `true` if the event was used.
    pub fn handle_window_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::Resized(size) => {
                self.set_viewport_height(size.height);
                false
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.drag = match (state, button) {
                    (ElementState::Pressed, MouseButton::Left) => Drag::Rotate,
                    (ElementState::Pressed, MouseButton::Right | MouseButton::Middle) => Drag::Pan,
                    (ElementState::Released, _) => Drag::None,
                    _ => self.drag,
                };
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(last) = self.cursor {
                    let dx = (position.x - last.x) as f32;
                    let dy = (position.y - last.y) as f32;
                    match self.drag {
                        Drag::Rotate => self.rotate_by_pixels(dx, dy),
                        Drag::Pan => self.pan(dx, dy),
                        Drag::None => (),
                    }
                }
                self.cursor = Some(*position);
                self.drag != Drag::None
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.drag = Drag::None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
                };
                self.zoom_steps(steps);
                true
            }
            WindowEvent::Touch(touch) => {
                self.handle_touch(touch);
                true
            }
            _ => false,
        }
    }

    fn handle_touch(&mut self, touch: &Touch) {
        match touch.phase {
            TouchPhase::Started => {
                self.touches.retain(|(id, _)| *id != touch.id);
                self.touches.push((touch.id, touch.location));
            }
            TouchPhase::Moved => {
                let before: Vec<_> = self.touches.iter().map(|(_, location)| *location).collect();
                let Some(slot) = self.touches.iter_mut().find(|(id, _)| *id == touch.id) else {
                    return;
                };
                slot.1 = touch.location;
                let now: Vec<_> = self.touches.iter().map(|(_, location)| *location).collect();
                match (before.as_slice(), now.as_slice()) {
                    ([old], [new]) => {
                        let (dx, dy) = ((new.x - old.x) as f32, (new.y - old.y) as f32);
                        self.rotate_by_pixels(dx, dy);
                    }
                    ([old_a, old_b, ..], [new_a, new_b, ..]) => {
                        let old_distance = distance(old_a, old_b);
                        let new_distance = distance(new_a, new_b);
                        if old_distance > 0.0 && new_distance > 0.0 {
                            // Fingers apart zoom in
                            self.dolly(old_distance / new_distance);
                        }
                        let (old_mid, new_mid) = (midpoint(old_a, old_b), midpoint(new_a, new_b));
                        self.pan(new_mid.0 - old_mid.0, new_mid.1 - old_mid.1);
                    }
                    _ => (),
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.touches.retain(|(id, _)| *id != touch.id);
            }
        }
    }

    /// Advance damping by `dt` and move `camera` accordingly.
    ///
    /// Returns `true` if the camera pose changed.
    pub fn update(&mut self, camera: &mut Camera, projection: &Projection, dt: Duration) -> bool {
        if self.is_settled() {
            self.spherical_delta = Spherical::default();
            self.pan_offset = Vector3::new(0.0, 0.0, 0.0);
            return false;
        }
        let before = *camera;
        let frames = (dt.as_secs_f32() * REFERENCE_FPS).clamp(0.0, MAX_CATCH_UP_FRAMES);
        let applied = if self.damping_factor > 0.0 {
            1.0 - (1.0 - self.damping_factor.min(1.0)).powf(frames)
        } else {
            1.0
        };

        let offset = camera.position - self.target;
        let mut spherical = Spherical::from_offset(offset);
        self.consume_pending_pan(camera, projection, spherical.radius);

        spherical.theta += self.spherical_delta.theta * applied;
        spherical.phi = (spherical.phi + self.spherical_delta.phi * applied)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        spherical.radius = (spherical.radius * self.scale)
            .clamp(self.min_distance, self.max_distance)
            .max(MIN_RADIUS);
        self.target += self.pan_offset * applied;

        camera.position = self.target + spherical.to_offset();
        camera.target = self.target;

        self.spherical_delta.theta *= 1.0 - applied;
        self.spherical_delta.phi *= 1.0 - applied;
        self.pan_offset *= 1.0 - applied;
        self.scale = 1.0;

        *camera != before
    }

    fn consume_pending_pan(&mut self, camera: &Camera, projection: &Projection, radius: f32) {
        let (dx, dy) = self.pending_pan;
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        self.pending_pan = (0.0, 0.0);
        // World units covered by one pixel at the target's depth
        let target_distance = radius * (projection.fovy.0 / 2.0).tan();
        let per_pixel = 2.0 * target_distance / self.viewport_height * self.pan_speed;
        let forward = camera.forward();
        let right = forward.cross(camera.up);
        if right.magnitude2() == 0.0 {
            return;
        }
        let right = right.normalize();
        let up = right.cross(forward).normalize();
        self.pan_offset += right * (-dx * per_pixel) + up * (dy * per_pixel);
    }
}

fn distance(a: &PhysicalPosition<f64>, b: &PhysicalPosition<f64>) -> f32 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt() as f32
}

fn midpoint(a: &PhysicalPosition<f64>, b: &PhysicalPosition<f64>) -> (f32, f32) {
    (((a.x + b.x) / 2.0) as f32, ((a.y + b.y) / 2.0) as f32)
}

//! Auto-framing: fit the camera to a freshly loaded model.
//!
//! Framing happens in two halves. [`frame_model`] measures the model, moves it
//! so its bounding-box centre sits at the origin and computes a [`Framing`];
//! the session then applies that framing to its camera, projection and orbit
//! controls. [`compute_framing`] is the pure core shared by both.

use cgmath::{Deg, EuclideanSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3};

use crate::{
    camera::{Camera, Projection},
    controls::OrbitController,
    data_structures::{
        bounds::Aabb,
        scene_graph::{SceneNode, world_bounds},
    },
};

/// Camera placement derived from a model's bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Framing {
    pub center: Point3<f32>,
    pub size: Vector3<f32>,
    /// Largest edge of the bounds, or the fallback extent for degenerate models.
    pub max_dim: f32,
    /// Distance at which `max_dim` exactly fills the vertical field of view.
    pub distance: f32,
    pub camera_z: f32,
    pub near: f32,
    pub far: f32,
    /// Set when the bounds had no usable extent and `max_dim` is the fallback.
    pub degenerate: bool,
}

impl Framing {
    pub fn camera_position(&self) -> Point3<f32> {
        Point3::new(0.0, 0.0, self.camera_z)
    }
}

/// Derive the camera placement for `bounds` seen with a vertical `fov`.
///
/// Bounds that are empty, flat in every axis or not finite fall back to
/// `fallback_extent` as their size instead of dividing by zero.
pub fn compute_framing(bounds: &Aabb, fov: Deg<f32>, margin: f32, fallback_extent: f32) -> Framing {
    let (center, size) = if bounds.is_empty() {
        (Point3::origin(), Vector3::new(0.0, 0.0, 0.0))
    } else {
        (bounds.center(), bounds.size())
    };
    let measured = size.x.max(size.y).max(size.z);
    let degenerate = !(measured.is_finite() && measured > 0.0);
    let max_dim = if degenerate { fallback_extent } else { measured };

    let fov_rad: Rad<f32> = fov.into();
    let distance = (max_dim / 2.0) / (fov_rad.0 / 2.0).tan();

    Framing {
        center,
        size,
        max_dim,
        distance,
        camera_z: distance * margin,
        near: max_dim / 100.0,
        far: max_dim * 10.0,
        degenerate,
    }
}

/// Translate `root` so that the centre of its world bounds is the origin.
///
/// Returns the bounds measured before the move. A root whose bounds are
/// already centred, or empty, is left untouched.
pub fn recenter(root: &mut dyn SceneNode) -> Aabb {
    let bounds = world_bounds(root, &Matrix4::identity());
    if bounds.is_empty() {
        return bounds;
    }
    let center = bounds.center();
    if !(center.x.is_finite() && center.y.is_finite() && center.z.is_finite()) {
        return bounds;
    }
    let mut local = *root.get_local_transform();
    local.position -= center.to_vec();
    root.set_local_transform(local);
    bounds
}

/// Measure and re-centre `root`, then compute how the camera should frame it.
pub fn frame_model(
    root: &mut dyn SceneNode,
    fov: Deg<f32>,
    margin: f32,
    fallback_extent: f32,
) -> Framing {
    let bounds = recenter(root);
    let framing = compute_framing(&bounds, fov, margin, fallback_extent);
    if framing.degenerate {
        log::warn!(
            "model {} has no measurable extent, framing it as if it were {} units large",
            root.name(),
            fallback_extent
        );
    }
    framing
}

/// Put the camera on +Z looking at the origin, scale the clip planes to the
/// model and point the orbit controls at the origin.
pub fn apply_framing(
    framing: &Framing,
    camera: &mut Camera,
    projection: &mut Projection,
    controls: &mut OrbitController,
) {
    camera.position = framing.camera_position();
    camera.look_at(Point3::origin());
    projection.set_clip_planes(framing.near, framing.far);
    controls.set_target(Point3::origin());
}

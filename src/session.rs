//! The viewer's mutable state, owned in one place.
//!
//! A [`ViewerSession`] holds the camera, projection, orbit controls, the
//! loaded environment and model, and the current surface size. It knows
//! nothing about the GPU, so several sessions can exist side by side and be
//! driven from tests.

use cgmath::Deg;
use instant::Duration;
use winit::event::WindowEvent;

use crate::{
    camera::{Camera, Projection},
    config::ViewerConfig,
    controls::OrbitController,
    data_structures::{environment::EnvironmentMap, model::LoadedModel},
    framing::{Framing, apply_framing},
    loader::{LoadEvent, PreparedModel},
};

#[derive(Debug)]
pub struct ViewerSession {
    pub config: ViewerConfig,
    pub camera: Camera,
    pub projection: Projection,
    pub controls: OrbitController,
    environment: Option<EnvironmentMap>,
    model: Option<LoadedModel>,
    framing: Option<Framing>,
    surface_size: (u32, u32),
    /// Bumped whenever the environment changes so the renderer can re-upload it.
    environment_generation: u64,
}

impl ViewerSession {
    pub fn new(config: ViewerConfig, width: u32, height: u32) -> Self {
        let camera = Camera::new(config.initial_camera_position);
        let projection = Projection::new(
            width,
            height,
            Deg(config.fov_degrees),
            config.initial_near,
            config.initial_far,
        );
        let controls = OrbitController::new(config.damping_factor, height);
        Self {
            config,
            camera,
            projection,
            controls,
            environment: None,
            model: None,
            framing: None,
            surface_size: (width, height),
            environment_generation: 0,
        }
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.surface_size
    }

    pub fn environment(&self) -> Option<&EnvironmentMap> {
        self.environment.as_ref()
    }

    pub fn environment_generation(&self) -> u64 {
        self.environment_generation
    }

    pub fn model(&self) -> Option<&LoadedModel> {
        self.model.as_ref()
    }

    pub fn model_mut(&mut self) -> Option<&mut LoadedModel> {
        self.model.as_mut()
    }

    pub fn framing(&self) -> Option<&Framing> {
        self.framing.as_ref()
    }

    /// Install an environment as both reflection source and background.
    pub fn set_environment(&mut self, environment: EnvironmentMap) {
        log::info!(
            "environment {} ready ({}x{})",
            environment.name,
            environment.width,
            environment.height
        );
        self.environment = Some(environment);
        self.environment_generation += 1;
    }

    /// Put a prepared model into the scene and move the camera to frame it.
    ///
    /// A previously installed model is replaced.
    pub fn install_model(&mut self, prepared: PreparedModel) {
        let PreparedModel { model, framing } = prepared;
        apply_framing(
            &framing,
            &mut self.camera,
            &mut self.projection,
            &mut self.controls,
        );
        log::info!("model {} added to the scene", model.name);
        self.model = Some(model);
        self.framing = Some(framing);
    }

    pub fn apply(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::EnvironmentReady(environment) => self.set_environment(environment),
            LoadEvent::ModelReady(prepared) => self.install_model(prepared),
        }
    }

    /// Track a new surface size: camera aspect, control sensitivity and the
    /// size reported to the renderer.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_size = (width, height);
        self.projection.resize(width, height);
        self.controls.set_viewport_height(height);
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.controls.handle_window_events(event)
    }

    /// Advance the orbit controls by `dt`. Returns `true` if the camera moved.
    pub fn update(&mut self, dt: Duration) -> bool {
        self.controls
            .update(&mut self.camera, &self.projection, dt)
    }
}

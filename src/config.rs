//! Compile-time viewer settings.
//!
//! Everything the viewer can be tuned with lives in [`ViewerConfig`]. The
//! defaults are the constants below; there is no config file and no CLI.

use crate::normalize::MaterialOverrides;

pub const ENVIRONMENT_URI: &str =
    "https://dl.polyhaven.org/file/ph-assets/HDRIs/hdr/1k/qwantani_afternoon_puresky_1k.hdr";
pub const MODEL_URI: &str = "hall3.glb";

pub const FOV_DEGREES: f32 = 60.0;
pub const INITIAL_CAMERA_POSITION: [f32; 3] = [0.0, 1.0, 3.0];
pub const INITIAL_NEAR: f32 = 0.1;
pub const INITIAL_FAR: f32 = 1000.0;

/// Extra distance on top of the exact fit so the model does not touch the edges.
pub const FRAMING_MARGIN: f32 = 1.5;
/// Extent assumed when a model has no measurable size.
pub const FALLBACK_EXTENT: f32 = 1.0;

pub const TONE_MAPPING_EXPOSURE: f32 = 0.8;
pub const DAMPING_FACTOR: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HemisphereLight {
    pub sky_color: [f32; 3],
    pub ground_color: [f32; 3],
    pub intensity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    pub environment_uri: String,
    pub model_uri: String,
    /// Draw the environment panorama behind the model.
    pub environment_background: bool,
    pub fov_degrees: f32,
    pub initial_camera_position: [f32; 3],
    pub initial_near: f32,
    pub initial_far: f32,
    pub framing_margin: f32,
    pub fallback_extent: f32,
    pub material_overrides: MaterialOverrides,
    pub exposure: f32,
    pub damping_factor: f32,
    pub hemisphere_light: HemisphereLight,
    pub directional_light: DirectionalLight,
    pub clear_colour: wgpu::Color,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            environment_uri: ENVIRONMENT_URI.to_string(),
            model_uri: MODEL_URI.to_string(),
            environment_background: true,
            fov_degrees: FOV_DEGREES,
            initial_camera_position: INITIAL_CAMERA_POSITION,
            initial_near: INITIAL_NEAR,
            initial_far: INITIAL_FAR,
            framing_margin: FRAMING_MARGIN,
            fallback_extent: FALLBACK_EXTENT,
            material_overrides: MaterialOverrides::default(),
            exposure: TONE_MAPPING_EXPOSURE,
            damping_factor: DAMPING_FACTOR,
            hemisphere_light: HemisphereLight {
                sky_color: [1.0, 1.0, 1.0],
                // 0x444444
                ground_color: [0.267, 0.267, 0.267],
                intensity: 0.3,
            },
            directional_light: DirectionalLight {
                position: [5.0, 10.0, 7.5],
                color: [1.0, 1.0, 1.0],
                intensity: 0.5,
            },
            clear_colour: wgpu::Color {
                r: 0.9,
                g: 0.9,
                b: 0.9,
                a: 1.0,
            },
        }
    }
}

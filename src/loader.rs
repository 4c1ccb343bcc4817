//! The asset-load pipeline.
//!
//! Loading is a single future: environment, then model, then material
//! normalization and framing. A later stage only starts once the previous one
//! succeeded; the first failure ends the pipeline and is returned to the
//! caller. Intermediate results are handed to a sink as soon as they are
//! available so the environment can be shown while the model downloads.

use crate::{
    config::ViewerConfig,
    data_structures::{environment::EnvironmentMap, model::LoadedModel},
    error::LoadError,
    framing::{Framing, frame_model},
    normalize::normalize_materials,
    resources::{AssetSource, environment::load_environment, model::load_model},
};

/// A model that has been normalized and re-centred, plus the camera framing
/// that fits it.
#[derive(Debug)]
pub struct PreparedModel {
    pub model: LoadedModel,
    pub framing: Framing,
}

#[derive(Debug)]
pub enum LoadEvent {
    EnvironmentReady(EnvironmentMap),
    ModelReady(PreparedModel),
}

/// Normalize the materials of `model` and move it into framing position.
pub fn prepare_model(mut model: LoadedModel, config: &ViewerConfig) -> PreparedModel {
    normalize_materials(&mut model, &config.material_overrides);
    let framing = frame_model(
        model.root.as_mut(),
        cgmath::Deg(config.fov_degrees),
        config.framing_margin,
        config.fallback_extent,
    );
    log::info!(
        "framed {}: max dimension {:.3}, camera z {:.3}, clip planes {:.4}..{:.2}",
        model.name,
        framing.max_dim,
        framing.camera_z,
        framing.near,
        framing.far
    );
    PreparedModel { model, framing }
}

/// Run the whole pipeline, reporting each finished stage to `sink`.
pub async fn run_load_pipeline(
    source: &dyn AssetSource,
    config: &ViewerConfig,
    sink: &mut dyn FnMut(LoadEvent),
) -> Result<(), LoadError> {
    let environment = load_environment(source, &config.environment_uri).await?;
    sink(LoadEvent::EnvironmentReady(environment));

    let model = load_model(source, &config.model_uri).await?;
    sink(LoadEvent::ModelReady(prepare_model(model, config)));
    Ok(())
}

//! orbit-viewer
//!
//! A minimal cross-platform (native and WASM) glTF viewer. It loads an HDR
//! environment for reflections and background, then a single glTF model,
//! tones its materials down to a matte look, frames the camera around the
//! model and renders it with orbit-style camera controls.
//!
//! High-level modules
//! - `app`: winit application handler, event loop and frame loop
//! - `camera`: camera pose, projection and the camera uniform
//! - `config`: compile-time settings collected in `ViewerConfig`
//! - `context`: window surface and the renderer drawing into it
//! - `controls`: orbit controls with damping
//! - `data_structures`: scene graph, meshes, materials, textures and bounds
//! - `error`: the load pipeline's error type
//! - `framing`: bounding-box based camera framing
//! - `loader`: environment-then-model load pipeline
//! - `normalize`: material normalization
//! - `pipelines`: render pipelines and shaders
//! - `render`: GPU resources and frame encoding
//! - `resources`: asset fetching and HDR / glTF decoding
//! - `session`: the viewer's mutable state, independent of the GPU
//!

pub mod app;
pub mod camera;
pub mod config;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod error;
pub mod framing;
pub mod loader;
pub mod normalize;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod session;

pub use app::run;
pub use config::ViewerConfig;
pub use error::LoadError;
pub use session::ViewerSession;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn run_web() -> Result<(), wasm_bindgen::JsValue> {
    run(ViewerConfig::default())
        .map_err(|err| wasm_bindgen::JsValue::from_str(&format!("{err:#}")))
}

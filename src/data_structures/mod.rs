//! Viewer data structures: scene graph, geometry, materials and textures.
//!
//! - `bounds` holds the axis-aligned bounding box used for framing
//! - `environment` holds decoded HDR panoramas
//! - `material` contains surface parameters and their GPU uniforms
//! - `model` contains mesh geometry, vertex layouts and the loaded model bundle
//! - `scene_graph` enables hierarchical scene organization
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `transform` holds per-node transforms and their GPU layout

pub mod bounds;
pub mod environment;
pub mod material;
pub mod model;
pub mod scene_graph;
pub mod texture;
pub mod transform;

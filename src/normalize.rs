//! Material normalization.
//!
//! Freshly loaded models often come with mirror-like metals that glow under an
//! HDR environment. The normalizer pins every referenced material to a fixed,
//! matte set of values and dims its base colour slightly.

use std::collections::BTreeSet;

use crate::data_structures::{model::LoadedModel, scene_graph::visit};

/// The values every material is pinned to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialOverrides {
    pub metalness: f32,
    pub roughness: f32,
    /// Multiplier for the base colour's RGB channels.
    pub color_scale: f32,
    pub env_map_intensity: f32,
}

impl Default for MaterialOverrides {
    fn default() -> Self {
        Self {
            metalness: 0.1,
            roughness: 0.9,
            color_scale: 0.98,
            env_map_intensity: 1.0,
        }
    }
}

/// Apply `overrides` to every material referenced by a mesh of `model`.
///
/// Metalness, roughness and intensity are assigned, so repeated calls agree
/// with a single one. The colour scale is a multiplication and is applied at
/// most once per material; later calls skip it. Returns the number of
/// materials that were touched.
pub fn normalize_materials(model: &mut LoadedModel, overrides: &MaterialOverrides) -> usize {
    let mut referenced = BTreeSet::new();
    visit(model.root.as_ref(), &mut |node| {
        referenced.extend(node.get_meshes().iter().map(|mesh| mesh.material));
    });

    let mut touched = 0;
    for idx in referenced {
        let Some(material) = model.materials.get_mut(idx) else {
            log::warn!("a mesh references material {idx} which does not exist");
            continue;
        };
        if material.metalness.is_some() {
            material.metalness = Some(overrides.metalness);
        }
        if material.roughness.is_some() {
            material.roughness = Some(overrides.roughness);
        }
        if let Some(color) = material.base_color.as_mut() {
            if !material.dimmed {
                color[0] *= overrides.color_scale;
                color[1] *= overrides.color_scale;
                color[2] *= overrides.color_scale;
            }
        }
        material.dimmed = true;
        material.env_map_intensity = overrides.env_map_intensity;
        material.needs_update = true;
        touched += 1;
    }
    log::debug!("normalized {touched} materials of {}", model.name);
    touched
}

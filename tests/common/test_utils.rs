#![allow(dead_code)]

use std::{
    cell::RefCell,
    collections::HashMap,
    future::{Future, pending},
};

use orbit_viewer::{
    data_structures::{
        material::Material,
        model::{LoadedModel, Mesh, ModelVertex},
        scene_graph::{ContainerNode, MeshNode, SceneNode},
    },
    resources::{AssetSource, FetchFuture},
};

/// In-memory assets that records every URI it is asked for.
#[derive(Default)]
pub(crate) struct MemorySource {
    files: HashMap<String, Vec<u8>>,
    /// URIs whose fetch never completes.
    pending: Vec<String>,
    pub(crate) requests: RefCell<Vec<String>>,
}

impl MemorySource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_file(mut self, uri: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(uri.to_string(), bytes);
        self
    }

    pub(crate) fn with_pending(mut self, uri: &str) -> Self {
        self.pending.push(uri.to_string());
        self
    }

    pub(crate) fn requests_for(&self, uri: &str) -> usize {
        self.requests.borrow().iter().filter(|r| *r == uri).count()
    }
}

impl AssetSource for MemorySource {
    fn fetch<'a>(&'a self, uri: &'a str) -> FetchFuture<'a> {
        self.requests.borrow_mut().push(uri.to_string());
        if self.pending.iter().any(|p| p == uri) {
            return Box::pin(pending::<anyhow::Result<Vec<u8>>>());
        }
        let result = self
            .files
            .get(uri)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("404: {uri}"));
        Box::pin(async move { result })
    }
}

pub(crate) fn block_on<F: Future>(future: F) -> F::Output {
    futures::executor::block_on(future)
}

/// A flat Radiance HDR image (no run-length encoding) from RGBE quadruples.
pub(crate) fn radiance_hdr(width: u32, height: u32, pixels: &[[u8; 4]]) -> Vec<u8> {
    assert_eq!(pixels.len(), (width * height) as usize);
    let mut bytes =
        format!("#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y {height} +X {width}\n").into_bytes();
    for pixel in pixels {
        bytes.extend_from_slice(pixel);
    }
    bytes
}

pub(crate) struct GlbMesh<'a> {
    pub(crate) positions: &'a [[f32; 3]],
    pub(crate) indices: &'a [u32],
    pub(crate) material: Option<usize>,
    pub(crate) translation: [f32; 3],
}

/// A binary glTF with one node per mesh and materials given as
/// `(base colour, metallic, roughness)`.
pub(crate) fn glb(meshes: &[GlbMesh], materials: &[([f32; 4], f32, f32)]) -> Vec<u8> {
    let mut bin = Vec::new();
    let mut views = Vec::new();
    let mut accessors = Vec::new();
    let mut json_meshes = Vec::new();
    let mut nodes = Vec::new();

    for (idx, mesh) in meshes.iter().enumerate() {
        let position_offset = bin.len();
        for position in mesh.positions {
            for component in position {
                bin.extend_from_slice(&component.to_le_bytes());
            }
        }
        let index_offset = bin.len();
        for index in mesh.indices {
            bin.extend_from_slice(&index.to_le_bytes());
        }

        let (min, max) = mesh.positions.iter().fold(
            ([f32::INFINITY; 3], [f32::NEG_INFINITY; 3]),
            |(mut min, mut max), p| {
                for axis in 0..3 {
                    min[axis] = min[axis].min(p[axis]);
                    max[axis] = max[axis].max(p[axis]);
                }
                (min, max)
            },
        );

        views.push(format!(
            r#"{{"buffer":0,"byteOffset":{position_offset},"byteLength":{},"target":34962}}"#,
            index_offset - position_offset
        ));
        views.push(format!(
            r#"{{"buffer":0,"byteOffset":{index_offset},"byteLength":{},"target":34963}}"#,
            bin.len() - index_offset
        ));
        accessors.push(format!(
            r#"{{"bufferView":{},"componentType":5126,"count":{},"type":"VEC3","min":{},"max":{}}}"#,
            2 * idx,
            mesh.positions.len(),
            json_array(&min),
            json_array(&max)
        ));
        accessors.push(format!(
            r#"{{"bufferView":{},"componentType":5125,"count":{},"type":"SCALAR"}}"#,
            2 * idx + 1,
            mesh.indices.len()
        ));
        let material = mesh
            .material
            .map(|m| format!(r#","material":{m}"#))
            .unwrap_or_default();
        json_meshes.push(format!(
            r#"{{"primitives":[{{"attributes":{{"POSITION":{}}},"indices":{}{material}}}]}}"#,
            2 * idx,
            2 * idx + 1
        ));
        nodes.push(format!(
            r#"{{"name":"node{idx}","mesh":{idx},"translation":{}}}"#,
            json_array(&mesh.translation)
        ));
    }

    let json_materials: Vec<String> = materials
        .iter()
        .enumerate()
        .map(|(idx, (color, metallic, roughness))| {
            format!(
                r#"{{"name":"material{idx}","pbrMetallicRoughness":{{"baseColorFactor":{},"metallicFactor":{metallic},"roughnessFactor":{roughness}}}}}"#,
                json_array(color)
            )
        })
        .collect();
    let scene_nodes: Vec<String> = (0..meshes.len()).map(|i| i.to_string()).collect();
    let materials = if json_materials.is_empty() {
        String::new()
    } else {
        format!(r#","materials":[{}]"#, json_materials.join(","))
    };

    let json = format!(
        r#"{{"asset":{{"version":"2.0"}},"scene":0,"scenes":[{{"nodes":[{}]}}],"nodes":[{}],"meshes":[{}]{materials},"buffers":[{{"byteLength":{}}}],"bufferViews":[{}],"accessors":[{}]}}"#,
        scene_nodes.join(","),
        nodes.join(","),
        json_meshes.join(","),
        bin.len(),
        views.join(","),
        accessors.join(",")
    );

    let mut json = json.into_bytes();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());
    glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(&json);
    glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"BIN\0");
    glb.extend_from_slice(&bin);
    glb
}

fn json_array(values: &[f32]) -> String {
    let values: Vec<String> = values.iter().map(|v| format!("{v:?}")).collect();
    format!("[{}]", values.join(","))
}

/// Eight corners of an axis-aligned box, triangulated.
pub(crate) fn box_mesh(min: [f32; 3], max: [f32; 3]) -> (Vec<[f32; 3]>, Vec<u32>) {
    let positions = (0..8)
        .map(|i| {
            [
                if i & 1 == 0 { min[0] } else { max[0] },
                if i & 2 == 0 { min[1] } else { max[1] },
                if i & 4 == 0 { min[2] } else { max[2] },
            ]
        })
        .collect();
    let indices = vec![
        0, 2, 1, 1, 2, 3, // -z
        4, 5, 6, 5, 7, 6, // +z
        0, 1, 4, 1, 5, 4, // -y
        2, 6, 3, 3, 6, 7, // +y
        0, 4, 2, 2, 4, 6, // -x
        1, 3, 5, 3, 7, 5, // +x
    ];
    (positions, indices)
}

pub(crate) fn mesh_from(name: &str, positions: &[[f32; 3]], indices: &[u32], material: usize) -> Mesh {
    let vertices = positions
        .iter()
        .map(|&position| ModelVertex {
            position,
            normal: [0.0, 1.0, 0.0],
            tex_coords: [0.0, 0.0],
        })
        .collect();
    Mesh::new(name, vertices, indices.to_vec(), material)
}

/// A model whose root holds one mesh node per entry of `meshes`.
pub(crate) fn model_from(meshes: Vec<Mesh>, materials: Vec<Material>) -> LoadedModel {
    let mut root = ContainerNode::new("root");
    for (idx, mesh) in meshes.into_iter().enumerate() {
        root.add_child(Box::new(MeshNode::new(&format!("node{idx}"), vec![mesh])));
    }
    LoadedModel::new("test model", Box::new(root), materials, Vec::new())
}

pub(crate) fn material(base_color: [f32; 4], metalness: f32, roughness: f32) -> Material {
    Material {
        base_color: Some(base_color),
        metalness: Some(metalness),
        roughness: Some(roughness),
        ..Material::new("test material")
    }
}

pub(crate) fn assert_close(actual: f32, expected: f32, tolerance: f32) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} but got {actual} (tolerance {tolerance})"
    );
}

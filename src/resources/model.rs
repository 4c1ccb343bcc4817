use std::collections::HashMap;

use anyhow::Context;
use cgmath::InnerSpace;

use crate::{
    data_structures::{
        material::{ImageData, Material},
        model::{LoadedModel, Mesh, ModelVertex},
        scene_graph::{ContainerNode, MeshNode, SceneNode},
        transform::Transform,
    },
    error::LoadError,
    resources::{AssetSource, resolve_uri},
};

/// Fetch and parse a glTF 2.0 asset (`.glb`, or `.gltf` with external buffers).
pub async fn load_model(source: &dyn AssetSource, uri: &str) -> Result<LoadedModel, LoadError> {
    log::info!("loading model {uri}");
    let wrap = |err: anyhow::Error| LoadError::model(uri, err);

    let bytes = source.fetch(uri).await.map_err(wrap)?;
    let gltf = ::gltf::Gltf::from_slice(&bytes)
        .with_context(|| format!("{uri} is not a valid glTF asset"))
        .map_err(wrap)?;
    let buffers = load_buffers(source, uri, &gltf).await.map_err(wrap)?;
    let (images, image_slots) = load_images(source, uri, &gltf, &buffers).await;
    let model = build_model(uri, &gltf, &buffers, images, &image_slots).map_err(wrap)?;

    log::info!(
        "loaded model {uri}: {} meshes, {} materials",
        model.mesh_count(),
        model.materials.len()
    );
    Ok(model)
}

async fn load_buffers(
    source: &dyn AssetSource,
    uri: &str,
    gltf: &::gltf::Gltf,
) -> anyhow::Result<Vec<Vec<u8>>> {
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        let data = match buffer.source() {
            ::gltf::buffer::Source::Bin => gltf
                .blob
                .clone()
                .ok_or_else(|| anyhow::anyhow!("buffer {} refers to a missing GLB chunk", buffer.index()))?,
            ::gltf::buffer::Source::Uri(reference) if reference.starts_with("data:") => {
                anyhow::bail!("buffer {} uses an embedded data URI, which is not supported", buffer.index())
            }
            ::gltf::buffer::Source::Uri(reference) => {
                let resolved = resolve_uri(uri, reference);
                source.fetch(&resolved).await?
            }
        };
        if data.len() < buffer.length() {
            anyhow::bail!(
                "buffer {} holds {} bytes but declares {}",
                buffer.index(),
                data.len(),
                buffer.length()
            );
        }
        buffer_data.push(data);
    }
    Ok(buffer_data)
}

/// Decode every image used as a base colour texture.
///
/// Returns the decoded images and a map from glTF image index to position in
/// that list. Images that fail to load are skipped with a warning; their
/// materials render untextured.
async fn load_images(
    source: &dyn AssetSource,
    uri: &str,
    gltf: &::gltf::Gltf,
    buffers: &[Vec<u8>],
) -> (Vec<ImageData>, HashMap<usize, usize>) {
    let mut images = Vec::new();
    let mut slots = HashMap::new();
    for material in gltf.materials() {
        let Some(info) = material.pbr_metallic_roughness().base_color_texture() else {
            continue;
        };
        let image = info.texture().source();
        if slots.contains_key(&image.index()) {
            continue;
        }
        let name = image
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("image {}", image.index()));
        let decoded = match image.source() {
            ::gltf::image::Source::View { view, .. } => buffers
                .get(view.buffer().index())
                .and_then(|data| data.get(view.offset()..view.offset() + view.length()))
                .ok_or_else(|| anyhow::anyhow!("buffer view {} is out of range", view.index()))
                .and_then(|bytes| decode_image(&name, bytes)),
            ::gltf::image::Source::Uri { uri: reference, .. } => {
                match source.fetch(&resolve_uri(uri, reference)).await {
                    Ok(bytes) => decode_image(&name, &bytes),
                    Err(err) => Err(err),
                }
            }
        };
        match decoded {
            Ok(data) => {
                slots.insert(image.index(), images.len());
                images.push(data);
            }
            Err(err) => log::warn!("texture {name} of {uri} could not be loaded: {err:#}"),
        }
    }
    (images, slots)
}

fn decode_image(name: &str, bytes: &[u8]) -> anyhow::Result<ImageData> {
    let rgba = image::load_from_memory(bytes)
        .with_context(|| format!("could not decode {name}"))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(ImageData {
        name: name.to_string(),
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

fn convert_material(material: &::gltf::Material, image_slots: &HashMap<usize, usize>) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let name = material
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("material {}", material.index().unwrap_or_default()));
    Material {
        base_color: Some(pbr.base_color_factor()),
        metalness: Some(pbr.metallic_factor()),
        roughness: Some(pbr.roughness_factor()),
        base_color_texture: pbr
            .base_color_texture()
            .and_then(|info| image_slots.get(&info.texture().source().index()).copied()),
        ..Material::new(&name)
    }
}

struct Builder<'a> {
    buffers: &'a [Vec<u8>],
    /// Index the glTF default material gets once a primitive needs it.
    default_material: usize,
    uses_default_material: bool,
}

impl Builder<'_> {
    fn node(&mut self, node: ::gltf::Node) -> Box<dyn SceneNode> {
        let name = node
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("node {}", node.index()));
        let mut scene_node: Box<dyn SceneNode> = match node.mesh() {
            Some(mesh) => Box::new(MeshNode::new(&name, self.meshes(&name, mesh))),
            None => Box::new(ContainerNode::new(&name)),
        };
        scene_node.set_local_transform(Transform::from(node.transform()));
        for child in node.children() {
            let child = self.node(child);
            scene_node.add_child(child);
        }
        scene_node
    }

    fn meshes(&mut self, node_name: &str, mesh: ::gltf::Mesh) -> Vec<Mesh> {
        let mesh_name = mesh.name().unwrap_or(node_name).to_string();
        let mut meshes = Vec::new();
        for primitive in mesh.primitives() {
            let name = format!("{mesh_name}/{}", primitive.index());
            if primitive.mode() != ::gltf::mesh::Mode::Triangles {
                log::warn!("skipping primitive {name}: mode {:?} is not supported", primitive.mode());
                continue;
            }
            let buffers = self.buffers;
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
            let Some(positions) = reader.read_positions() else {
                log::warn!("skipping primitive {name}: it has no positions");
                continue;
            };
            let mut vertices: Vec<ModelVertex> = positions
                .map(|position| ModelVertex {
                    position,
                    ..Default::default()
                })
                .collect();
            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..vertices.len() as u32).collect(),
            };
            if indices.len() % 3 != 0 || indices.iter().any(|&i| i as usize >= vertices.len()) {
                log::warn!("skipping primitive {name}: malformed index data");
                continue;
            }
            match reader.read_normals() {
                Some(normals) => vertices
                    .iter_mut()
                    .zip(normals)
                    .for_each(|(vertex, normal)| vertex.normal = normal),
                None => generate_normals(&mut vertices, &indices),
            }
            if let Some(tex_coords) = reader.read_tex_coords(0) {
                vertices
                    .iter_mut()
                    .zip(tex_coords.into_f32())
                    .for_each(|(vertex, uv)| vertex.tex_coords = uv);
            }
            let material = match primitive.material().index() {
                Some(idx) => idx,
                None => {
                    self.uses_default_material = true;
                    self.default_material
                }
            };
            meshes.push(Mesh::new(&name, vertices, indices, material));
        }
        meshes
    }
}

/// Area-weighted vertex normals for primitives that ship without any.
fn generate_normals(vertices: &mut [ModelVertex], indices: &[u32]) {
    let mut accumulated = vec![cgmath::Vector3::new(0.0f32, 0.0, 0.0); vertices.len()];
    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let pa = cgmath::Vector3::from(vertices[a].position);
        let pb = cgmath::Vector3::from(vertices[b].position);
        let pc = cgmath::Vector3::from(vertices[c].position);
        let face = (pb - pa).cross(pc - pa);
        for i in [a, b, c] {
            accumulated[i] += face;
        }
    }
    for (vertex, normal) in vertices.iter_mut().zip(accumulated) {
        vertex.normal = if normal.magnitude2() > 0.0 {
            normal.normalize().into()
        } else {
            [0.0, 1.0, 0.0]
        };
    }
}

fn build_model(
    uri: &str,
    gltf: &::gltf::Gltf,
    buffers: &[Vec<u8>],
    images: Vec<ImageData>,
    image_slots: &HashMap<usize, usize>,
) -> anyhow::Result<LoadedModel> {
    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .ok_or_else(|| anyhow::anyhow!("{uri} contains no scene"))?;

    let mut materials: Vec<Material> = gltf
        .materials()
        .map(|material| convert_material(&material, image_slots))
        .collect();
    let mut builder = Builder {
        buffers,
        default_material: materials.len(),
        uses_default_material: false,
    };

    let mut root = ContainerNode::new(scene.name().unwrap_or(uri));
    for node in scene.nodes() {
        root.add_child(builder.node(node));
    }
    if builder.uses_default_material {
        materials.push(Material::gltf_default());
    }

    Ok(LoadedModel::new(uri, Box::new(root), materials, images))
}

//! Mesh geometry, vertex layouts and the loaded model bundle.
//!
//! Geometry stays on the CPU after parsing so that the normalizer and the
//! auto-framer can work on it without a device. GPU buffers are created lazily
//! by `write_to_buffers` right before the first frame that draws them.

use cgmath::{Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;

use crate::data_structures::{
    material::{GpuMaterial, ImageData, Material},
    scene_graph::SceneNode,
    texture::Texture,
};

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// One glTF primitive: triangles sharing a material.
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    /// Index into [`LoadedModel::materials`].
    pub material: usize,
    pub gpu: Option<GpuMesh>,
}

impl Mesh {
    pub fn new(name: &str, vertices: Vec<ModelVertex>, indices: Vec<u32>, material: usize) -> Self {
        Self {
            name: name.to_string(),
            vertices,
            indices,
            material,
            gpu: None,
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = cgmath::Point3<f32>> + '_ {
        self.vertices
            .iter()
            .map(|vertex| cgmath::Point3::from(vertex.position))
    }

    pub fn write_to_buffers(&mut self, device: &wgpu::Device) {
        if self.gpu.is_some() {
            return;
        }
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        self.gpu = Some(GpuMesh {
            vertex_buffer,
            index_buffer,
            num_elements: self.indices.len() as u32,
        });
    }
}

#[derive(Debug)]
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
}

pub trait DrawModel {
    fn draw_mesh(&mut self, mesh: &GpuMesh, material: &GpuMaterial, transform: &wgpu::Buffer);
}

impl DrawModel for wgpu::RenderPass<'_> {
    fn draw_mesh(&mut self, mesh: &GpuMesh, material: &GpuMaterial, transform: &wgpu::Buffer) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_vertex_buffer(1, transform.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(0, &material.bind_group, &[]);
        self.draw_indexed(0..mesh.num_elements, 0, 0..1);
    }
}

/// A parsed model: the node hierarchy plus the tables its meshes index into.
pub struct LoadedModel {
    pub name: String,
    pub root: Box<dyn SceneNode>,
    pub materials: Vec<Material>,
    pub images: Vec<ImageData>,
    gpu_materials: Vec<GpuMaterial>,
}

impl LoadedModel {
    pub fn new(
        name: &str,
        root: Box<dyn SceneNode>,
        materials: Vec<Material>,
        images: Vec<ImageData>,
    ) -> Self {
        Self {
            name: name.to_string(),
            root,
            materials,
            images,
            gpu_materials: Vec::new(),
        }
    }

    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        crate::data_structures::scene_graph::visit(self.root.as_ref(), &mut |node| {
            count += node.get_meshes().len()
        });
        count
    }

    /// Create missing GPU resources and re-upload everything that changed since
    /// the last call: dirty materials and every node's world transform.
    pub fn write_to_buffers(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        placeholder: &Texture,
    ) {
        if self.gpu_materials.len() != self.materials.len() {
            let textures: Vec<Texture> = self
                .images
                .iter()
                .map(|image| Texture::from_image(device, queue, image))
                .collect();
            self.gpu_materials = self
                .materials
                .iter_mut()
                .map(|material| {
                    let texture = material
                        .base_color_texture
                        .and_then(|idx| textures.get(idx))
                        .unwrap_or(placeholder);
                    material.needs_update = false;
                    GpuMaterial::new(device, layout, material, texture)
                })
                .collect();
        } else {
            self.materials
                .iter_mut()
                .zip(self.gpu_materials.iter())
                .filter(|(material, _)| material.needs_update)
                .for_each(|(material, gpu)| {
                    gpu.write(queue, material);
                    material.needs_update = false;
                });
        }
        self.root.update_world_transforms(&Matrix4::identity());
        self.root.write_to_buffers(queue, device);
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.gpu_materials.is_empty() {
            return;
        }
        self.root.draw(&self.gpu_materials, render_pass);
    }
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("name", &self.name)
            .field("materials", &self.materials.len())
            .field("images", &self.images.len())
            .finish()
    }
}

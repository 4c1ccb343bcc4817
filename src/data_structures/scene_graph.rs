//! Scene graph and hierarchical scene organization.
//!
//! A loaded model is a tree of [`SceneNode`] trait objects. Container nodes only
//! group and transform their children, mesh nodes additionally own geometry.
//! The tree is built once by the glTF loader, adjusted by the normalizer and the
//! auto-framer, and from then on only read by the renderer.

use cgmath::{Matrix4, SquareMatrix};
use log::warn;
use wgpu::util::DeviceExt;

use crate::data_structures::{
    bounds::Aabb,
    material::GpuMaterial,
    model::{DrawModel, Mesh},
    transform::{Transform, TransformRaw},
};

pub trait SceneNode: Send {
    fn name(&self) -> &str;

    fn get_local_transform(&self) -> &Transform;

    fn set_local_transform(&mut self, transform: Transform);

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>);

    fn get_meshes(&self) -> &[Mesh];

    /// Recompute the cached world transform of `self` and all descendants.
    fn update_world_transforms(&mut self, parents_world_transform: &Matrix4<f32>);

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device);

    fn draw(&self, materials: &[GpuMaterial], render_pass: &mut wgpu::RenderPass<'_>);
}

/// Depth-first, parent-before-children traversal.
pub fn visit(node: &dyn SceneNode, f: &mut dyn FnMut(&dyn SceneNode)) {
    f(node);
    for child in node.get_children() {
        visit(child.as_ref(), f);
    }
}

/**
 * World-space bounds of every vertex below `node`.
 *
 * Transforms are composed on the fly instead of relying on the cached world
 * transforms, so the result is valid right after the root was moved.
 */
pub fn world_bounds(node: &dyn SceneNode, parents_world_transform: &Matrix4<f32>) -> Aabb {
    let world = parents_world_transform * node.get_local_transform().to_matrix();
    let own = Aabb::from_points(
        node.get_meshes()
            .iter()
            .flat_map(|mesh| mesh.positions())
            .map(|position| cgmath::Transform::transform_point(&world, position)),
    );
    node.get_children()
        .iter()
        .map(|child| world_bounds(child.as_ref(), &world))
        .fold(own, |aabb, child| aabb.union(&child))
}

pub struct ContainerNode {
    name: String,
    local: Transform,
    world: Matrix4<f32>,
    pub children: Vec<Box<dyn SceneNode>>,
}

impl ContainerNode {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            local: Transform::default(),
            world: Matrix4::identity(),
            children: Vec::new(),
        }
    }
}

impl SceneNode for ContainerNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_local_transform(&self) -> &Transform {
        &self.local
    }

    fn set_local_transform(&mut self, transform: Transform) {
        self.local = transform;
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn get_meshes(&self) -> &[Mesh] {
        &[]
    }

    fn update_world_transforms(&mut self, parents_world_transform: &Matrix4<f32>) {
        self.world = parents_world_transform * self.local.to_matrix();
        let world = self.world;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&world);
        }
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue, device));
    }

    fn draw(&self, materials: &[GpuMaterial], render_pass: &mut wgpu::RenderPass<'_>) {
        for child in &self.children {
            child.draw(materials, render_pass);
        }
    }
}

pub struct MeshNode {
    name: String,
    local: Transform,
    world: Matrix4<f32>,
    meshes: Vec<Mesh>,
    children: Vec<Box<dyn SceneNode>>,
    transform_buffer: Option<wgpu::Buffer>,
}

impl MeshNode {
    pub fn new(name: &str, meshes: Vec<Mesh>) -> Self {
        Self {
            name: name.to_string(),
            local: Transform::default(),
            world: Matrix4::identity(),
            meshes,
            children: Vec::new(),
            transform_buffer: None,
        }
    }
}

impl SceneNode for MeshNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_local_transform(&self) -> &Transform {
        &self.local
    }

    fn set_local_transform(&mut self, transform: Transform) {
        self.local = transform;
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn get_meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    fn update_world_transforms(&mut self, parents_world_transform: &Matrix4<f32>) {
        self.world = parents_world_transform * self.local.to_matrix();
        let world = self.world;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&world);
        }
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        let raw: [TransformRaw; 1] = [TransformRaw::new(&self.world)];
        match &self.transform_buffer {
            Some(buffer) => queue.write_buffer(buffer, 0, bytemuck::cast_slice(&raw)),
            None => {
                self.transform_buffer = Some(device.create_buffer_init(
                    &wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{} Transform Buffer", self.name)),
                        contents: bytemuck::cast_slice(&raw),
                        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    },
                ))
            }
        }
        self.meshes
            .iter_mut()
            .for_each(|mesh| mesh.write_to_buffers(device));
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue, device));
    }

    fn draw(&self, materials: &[GpuMaterial], render_pass: &mut wgpu::RenderPass<'_>) {
        if let Some(transform) = &self.transform_buffer {
            for mesh in &self.meshes {
                let (Some(gpu), Some(material)) = (&mesh.gpu, materials.get(mesh.material)) else {
                    warn!(
                        "mesh {} of node {} has no GPU data or references a missing material",
                        mesh.name, self.name
                    );
                    continue;
                };
                render_pass.draw_mesh(gpu, material, transform);
            }
        }
        for child in &self.children {
            child.draw(materials, render_pass);
        }
    }
}

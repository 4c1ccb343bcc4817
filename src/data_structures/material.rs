//! Surface parameters of a mesh and their GPU counterpart.
//!
//! A [`Material`] mirrors the subset of glTF's metallic-roughness model the
//! viewer renders. Reflectivity fields are optional so that materials which do
//! not expose them stay untouched by the normalizer.

use wgpu::util::DeviceExt;

use crate::data_structures::texture::Texture;

/// CPU-side material state.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    /// Linear RGBA base colour factor.
    pub base_color: Option<[f32; 4]>,
    pub metalness: Option<f32>,
    pub roughness: Option<f32>,
    pub env_map_intensity: f32,
    /// Index into the owning model's decoded images.
    pub base_color_texture: Option<usize>,
    /// Set whenever a field changed and the GPU copy is stale.
    pub needs_update: bool,
    /// Set once the base colour has been scaled by the normalizer.
    pub dimmed: bool,
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            base_color: None,
            metalness: None,
            roughness: None,
            env_map_intensity: 1.0,
            base_color_texture: None,
            needs_update: true,
            dimmed: false,
        }
    }

    /// glTF's default material: opaque white, fully metallic and rough.
    pub fn gltf_default() -> Self {
        Self {
            base_color: Some([1.0, 1.0, 1.0, 1.0]),
            metalness: Some(1.0),
            roughness: Some(1.0),
            ..Self::new("default")
        }
    }

    pub fn to_uniform(&self) -> MaterialUniform {
        MaterialUniform {
            base_color: self.base_color.unwrap_or([1.0, 1.0, 1.0, 1.0]),
            // Materials that expose no reflectivity render as a plain diffuse surface
            metalness: self.metalness.unwrap_or(0.0),
            roughness: self.roughness.unwrap_or(1.0),
            env_map_intensity: self.env_map_intensity,
            has_texture: if self.base_color_texture.is_some() { 1 } else { 0 },
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    base_color: [f32; 4],
    metalness: f32,
    roughness: f32,
    env_map_intensity: f32,
    has_texture: u32,
}

/// Decoded RGBA8 image referenced by materials.
#[derive(Clone, Debug)]
pub struct ImageData {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// GPU resources of a single material.
#[derive(Debug)]
pub struct GpuMaterial {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl GpuMaterial {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        material: &Material,
        texture: &Texture,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Material Buffer", material.name)),
            contents: bytemuck::cast_slice(&[material.to_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
            label: Some(&material.name),
        });
        Self { buffer, bind_group }
    }

    pub fn write(&self, queue: &wgpu::Queue, material: &Material) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[material.to_uniform()]));
    }
}

pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("material_bind_group_layout"),
    })
}

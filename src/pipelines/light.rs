use cgmath::InnerSpace;
use wgpu::util::DeviceExt;

use crate::{config::ViewerConfig, data_structures::texture::Texture};

/// Scene lighting shared by the PBR and background passes: a hemisphere
/// light, one directional light, the environment panorama and the tone
/// mapping exposure.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    sky_color: [f32; 3],
    hemisphere_intensity: f32,
    ground_color: [f32; 3],
    exposure: f32,
    /// Unit vector pointing towards the light.
    direction: [f32; 3],
    directional_intensity: f32,
    color: [f32; 3],
    has_environment: u32,
}

impl LightUniform {
    pub fn new(config: &ViewerConfig) -> Self {
        let hemisphere = config.hemisphere_light;
        let directional = config.directional_light;
        let direction = cgmath::Vector3::from(directional.position);
        let direction = if direction.magnitude2() > 0.0 {
            direction.normalize()
        } else {
            cgmath::Vector3::unit_y()
        };
        Self {
            sky_color: hemisphere.sky_color,
            hemisphere_intensity: hemisphere.intensity,
            ground_color: hemisphere.ground_color,
            exposure: config.exposure,
            direction: direction.into(),
            directional_intensity: directional.intensity,
            color: directional.color,
            has_environment: 0,
        }
    }
}

pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
    environment: Texture,
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
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
        label: Some("light_bind_group_layout"),
    })
}

fn mk_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    environment: &Texture,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&environment.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&environment.sampler),
            },
        ],
        label: Some("light_bind_group"),
    })
}

impl LightResources {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, config: &ViewerConfig) -> Self {
        let uniform = LightUniform::new(config);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = mk_bind_group_layout(device);
        let environment = Texture::create_default_environment(device, queue);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer, &environment);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
            environment,
        }
    }

    pub fn has_environment(&self) -> bool {
        self.uniform.has_environment != 0
    }

    /// Swap in a new environment texture and enable image-based lighting.
    pub fn set_environment(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, environment: Texture) {
        self.environment = environment;
        self.bind_group = mk_bind_group(device, &self.bind_group_layout, &self.buffer, &self.environment);
        self.uniform.has_environment = 1;
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

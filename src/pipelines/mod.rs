//! Render pipelines and the WGSL shaders behind them.
//!
//! - `pbr` draws the model with a metallic-roughness shader lit by the
//!   environment and the scene lights
//! - `background` paints the environment panorama behind everything
//! - `light` holds the lighting uniform both passes share

pub mod background;
pub mod light;
pub mod pbr;

pub struct Pipelines {
    pub pbr: wgpu::RenderPipeline,
    pub background: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        material_bind_group_layout: &wgpu::BindGroupLayout,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        light_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            pbr: pbr::mk_pbr_pipeline(
                device,
                color_format,
                material_bind_group_layout,
                camera_bind_group_layout,
                light_bind_group_layout,
            ),
            background: background::mk_background_pipeline(
                device,
                color_format,
                camera_bind_group_layout,
                light_bind_group_layout,
            ),
        }
    }
}

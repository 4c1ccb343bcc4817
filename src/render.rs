//! Frame rendering.
//!
//! The [`Renderer`] owns every GPU resource except the window surface, so the
//! same code draws into the swap chain and into off-screen textures. A frame
//! has two steps: [`Renderer::prepare`] uploads whatever changed in the
//! session (camera, environment, materials, transforms) and
//! [`Renderer::encode`] records the background and model draws.

use crate::{
    camera::CameraResources,
    data_structures::{material::material_layout, texture::Texture},
    pipelines::{Pipelines, light::LightResources},
    session::ViewerSession,
};

pub struct Renderer {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub format: wgpu::TextureFormat,
    pub clear_colour: wgpu::Color,
    camera: CameraResources,
    light: LightResources,
    pipelines: Pipelines,
    material_layout: wgpu::BindGroupLayout,
    placeholder: Texture,
    depth_texture: Texture,
    environment_generation: u64,
}

impl Renderer {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        format: wgpu::TextureFormat,
        session: &ViewerSession,
    ) -> Self {
        let (width, height) = session.surface_size();
        let camera = CameraResources::new(&device, &session.camera, &session.projection);
        let light = LightResources::new(&device, &queue, &session.config);
        let material_layout = material_layout(&device);
        let pipelines = Pipelines::new(
            &device,
            format,
            &material_layout,
            &camera.bind_group_layout,
            &light.bind_group_layout,
        );
        let placeholder = Texture::create_placeholder(&device, &queue);
        let depth_texture =
            Texture::create_depth_texture(&device, [width.max(1), height.max(1)], "depth_texture");
        Self {
            device,
            queue,
            format,
            clear_colour: session.config.clear_colour,
            camera,
            light,
            pipelines,
            material_layout,
            placeholder,
            depth_texture,
            environment_generation: 0,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.depth_texture =
                Texture::create_depth_texture(&self.device, [width, height], "depth_texture");
        }
    }

    /// Upload everything the next frame needs from `session`.
    pub fn prepare(&mut self, session: &mut ViewerSession) {
        self.camera
            .write(&self.queue, &session.camera, &session.projection);

        if session.environment_generation() != self.environment_generation {
            if let Some(environment) = session.environment() {
                let texture = Texture::from_environment(&self.device, &self.queue, environment);
                self.light.set_environment(&self.device, &self.queue, texture);
            }
            self.environment_generation = session.environment_generation();
        }

        if let Some(model) = session.model_mut() {
            model.write_to_buffers(
                &self.device,
                &self.queue,
                &self.material_layout,
                &self.placeholder,
            );
        }
    }

    /// Record the draws of one frame into `view`.
    pub fn encode(
        &self,
        session: &ViewerSession,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_colour),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        if session.config.environment_background && self.light.has_environment() {
            render_pass.set_pipeline(&self.pipelines.background);
            render_pass.set_bind_group(0, &self.camera.bind_group, &[]);
            render_pass.set_bind_group(1, &self.light.bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }

        if let Some(model) = session.model() {
            render_pass.set_pipeline(&self.pipelines.pbr);
            render_pass.set_bind_group(1, &self.camera.bind_group, &[]);
            render_pass.set_bind_group(2, &self.light.bind_group, &[]);
            model.draw(&mut render_pass);
        }
    }

    /// Prepare, encode and submit a frame into `view`.
    pub fn render_to_view(&mut self, session: &mut ViewerSession, view: &wgpu::TextureView) {
        self.prepare(session);
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        self.encode(session, &mut encoder, view);
        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

use std::convert::Infallible;

use raytracer_lib::{
    animation::Animations,
    application::{AppState, Application, Layer, Screen},
    camera::{CameraController, InputHandler},
    config::RendererConfig,
    demo,
    renderer::{self, IndexBuffer, VertexBuffer, QUAD_INDICES, QUAD_VERTICES},
    scene::Scene,
    shader::{ShaderProgram, RAYTRACE_TEMPLATE},
    sync::{SceneBuffers, WgpuBackend},
    texture::TextureSlots,
};
use tracing_subscriber::EnvFilter;
use wgpu::{
    CommandEncoderDescriptor, RenderPassColorAttachment, RenderPassDescriptor,
    TextureViewDescriptor,
};
use winit::dpi::PhysicalSize;

struct RayTracer {
    scene: Scene,
    camera: CameraController,
    animations: Animations,
    buffers: SceneBuffers<wgpu::Buffer>,
    scene_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
    render_pipeline: wgpu::RenderPipeline,
    vertex_buffer: VertexBuffer,
    index_buffer: IndexBuffer,
    textures: TextureSlots,
}

impl Layer for RayTracer {
    type LayerErr = Infallible;

    fn start(
        screen: &mut Screen,
        _app: &AppState,
        config: &RendererConfig,
    ) -> raytracer_lib::Result<Self> {
        let (scene, animations) = demo::build_scene(config);
        let defines = scene.snapshot_defines();

        let program = ShaderProgram::build(RAYTRACE_TEMPLATE, &defines)?;
        let shader = program.create_module(&screen.device);

        let mut backend = WgpuBackend::new(&screen.device, &screen.queue);
        let buffers = SceneBuffers::bind(&mut backend, program.blocks(), &scene)?;
        let scene_layout = buffers.bind_group_layout(&screen.device);
        let scene_bind_group = buffers.bind_group(&screen.device, &scene_layout);

        let textures = TextureSlots::load(
            &screen.device,
            &screen.queue,
            &config.texture_dir,
            &demo::TEXTURE_FILES,
        );
        let texture_layout = textures.bind_group_layout(&screen.device);
        let texture_bind_group = textures.bind_group(&screen.device, &texture_layout);

        let render_pipeline = renderer::raytrace_pipeline(
            &screen.device,
            screen.config.format,
            &shader,
            &[&scene_layout, &texture_layout],
        );

        let vertex_buffer = VertexBuffer::init_immediate(
            &screen.device,
            bytemuck::cast_slice(QUAD_VERTICES),
            Some("Vertex Buffer"),
        );
        let index_buffer =
            IndexBuffer::init_immediate_u16(&screen.device, QUAD_INDICES, Some("Index Buffer"));

        let camera = CameraController::new(config.camera, scene.global.camera_pos);

        Ok(Self {
            scene,
            camera,
            animations,
            buffers,
            scene_bind_group,
            texture_bind_group,
            render_pipeline,
            vertex_buffer,
            index_buffer,
            textures,
        })
    }

    fn input(&mut self) -> &mut dyn InputHandler {
        &mut self.camera
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>, _app: &AppState, _screen: &mut Screen) {
        tracing::debug!(
            "surface resized to {}x{}, canvas stays {}x{}",
            new_size.width,
            new_size.height,
            self.scene.global.canvas_width,
            self.scene.global.canvas_height
        );
    }

    fn update(&mut self, app: &AppState, screen: &mut Screen) {
        let frame = app.frame_time();
        self.camera.update(frame.elapsed, &mut self.scene.global);
        self.animations.run(&mut self.scene, frame);
        self.buffers.push(
            &mut WgpuBackend::new(&screen.device, &screen.queue),
            &self.scene,
        );
    }

    fn render(&mut self, _app: &AppState, screen: &mut Screen) -> Result<(), wgpu::SurfaceError> {
        let output = screen.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&TextureViewDescriptor::default());
        let mut encoder = screen
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
            render_pass.set_bind_group(1, &self.texture_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.buffer().slice(..));
            render_pass.set_index_buffer(
                self.index_buffer.buffer().slice(..),
                self.index_buffer.format(),
            );
            render_pass.draw_indexed(0..self.index_buffer.count(), 0, 0..1);
        }

        screen.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn shutdown(&mut self, _app: &AppState, _screen: &mut Screen) -> Result<(), Self::LayerErr> {
        tracing::info!(
            "exiting, camera at {:?} with {} textures bound",
            self.camera.position(),
            self.textures.len()
        );
        Ok(())
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = RendererConfig::from_env();
    if let Err(err) = pollster::block_on(Application::<RayTracer>::init(config)) {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

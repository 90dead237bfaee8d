//! Interactive viewer: blits the software-rendered frame to a window.
//!
//! The engine rasterizes each frame on the CPU into its [`Canvas`]; the
//! viewer's only GPU work is uploading those bytes to a texture and
//! drawing one fullscreen triangle. The simulation ticks at the window's
//! physical resolution, so the blit is 1:1.
//!
//! Controls:
//! - `Space` pause / resume
//! - `Left` / `Right` previous / next device
//! - `F` cycle particle fidelity
//! - `,` / `.` halve / double animation speed
//! - `R` reset the current device
//! - `S` save a PNG screenshot
//! - `Esc` quit
//!
//! # Example
//!
//! ```ignore
//! use mwpe::descriptor::DeviceId;
//! use mwpe::simulation::Simulation;
//!
//! let sim = Simulation::new(DeviceId::ReflexKlystron);
//! mwpe::window::run(sim)?;
//! ```

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::canvas::Canvas;
use crate::descriptor::DeviceId;
use crate::error::ViewerError;
use crate::simulation::Simulation;
use crate::time::FrameClock;

const WINDOW_TITLE: &str = "Microwave Device Particle Engine";
const DEFAULT_SIZE: (u32, u32) = (1280, 720);

/// Fullscreen-triangle blit of the frame texture.
const BLIT_SHADER: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    var corners = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    let pos = corners[index];
    var out: VertexOutput;
    out.clip_position = vec4<f32>(pos, 0.0, 1.0);
    out.uv = vec2<f32>(pos.x * 0.5 + 0.5, 0.5 - pos.y * 0.5);
    return out;
}

@group(0) @binding(0) var frame_tex: texture_2d<f32>;
@group(0) @binding(1) var frame_samp: sampler;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(frame_tex, frame_samp, in.uv);
}
"#;

/// Run the viewer with the given engine. Blocks until the window closes.
pub fn run(sim: Simulation) -> Result<(), ViewerError> {
    run_sized(sim, DEFAULT_SIZE)
}

/// Like [`run`], with an explicit initial window size in logical pixels.
pub fn run_sized(sim: Simulation, size: (u32, u32)) -> Result<(), ViewerError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(sim, size);
    event_loop.run_app(&mut app)?;
    Ok(())
}

struct App {
    sim: Simulation,
    clock: FrameClock,
    initial_size: (u32, u32),
    window: Option<Arc<Window>>,
    gfx: Option<FrameSurface>,
    title: String,
}

impl App {
    fn new(sim: Simulation, initial_size: (u32, u32)) -> Self {
        Self {
            sim,
            clock: FrameClock::new(),
            initial_size: (initial_size.0.max(1), initial_size.1.max(1)),
            window: None,
            gfx: None,
            title: String::new(),
        }
    }

    fn handle_key(&mut self, code: KeyCode, event_loop: &ActiveEventLoop) {
        match code {
            KeyCode::Space => self.sim.toggle_running(),
            KeyCode::ArrowRight => self.switch_device(self.sim.device().next()),
            KeyCode::ArrowLeft => self.switch_device(self.sim.device().prev()),
            KeyCode::KeyF => {
                let fidelity = self.sim.fidelity().next();
                self.sim.set_fidelity(fidelity);
                log::info!("fidelity: {}", fidelity.label());
            }
            KeyCode::Comma => {
                let scale = self.sim.time_scale() * 0.5;
                self.sim.set_time_scale(scale);
                log::info!("speed: {:.2}x", self.sim.time_scale());
            }
            KeyCode::Period => {
                let scale = self.sim.time_scale() * 2.0;
                self.sim.set_time_scale(scale);
                log::info!("speed: {:.2}x", self.sim.time_scale());
            }
            KeyCode::KeyR => self.switch_device(self.sim.device()),
            KeyCode::KeyS => self.save_frame(),
            KeyCode::Escape => event_loop.exit(),
            _ => {}
        }
    }

    fn switch_device(&mut self, device: DeviceId) {
        self.sim.set_device(device);
        log::info!("device: {}", device.name());
        for readout in self.sim.readouts() {
            log::info!("  {}: {} {}", readout.label, readout.value, readout.unit);
        }
    }

    fn save_frame(&self) {
        let path = format!(
            "{}-{:05}.png",
            self.sim.device().as_str(),
            self.sim.frame_count() as u64
        );
        match self.sim.canvas().save_png(&path) {
            Ok(()) => log::info!("saved {}", path),
            Err(e) => log::error!("screenshot failed: {}", e),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = &self.window else { return };
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return; // minimized
        }

        self.clock.tick();
        self.sim.tick(size.width, size.height);

        if let Some(gfx) = &mut self.gfx {
            match gfx.render(self.sim.canvas()) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gfx.resize(size),
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("GPU reported out of memory");
                    event_loop.exit();
                }
                Err(e) => log::warn!("frame dropped: {:?}", e),
            }
        }

        let paused = if self.sim.is_running() { "" } else { " [paused]" };
        let title = format!(
            "{} | {} | {:.0} fps{}",
            WINDOW_TITLE,
            self.sim.device().name(),
            self.clock.fps(),
            paused
        );
        if title != self.title {
            window.set_title(&title);
            self.title = title;
        }

        window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(self.initial_size.0, self.initial_size.1));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("window creation failed: {}", e);
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        match pollster::block_on(FrameSurface::new(window)) {
            Ok(gfx) => {
                log::info!("viewer ready ({}x{})", self.initial_size.0, self.initial_size.1);
                self.gfx = Some(gfx);
            }
            Err(e) => {
                log::error!("GPU setup failed: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("closing");
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gfx) = &mut self.gfx {
                    gfx.resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(code, event_loop),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

/// GPU surface plus the texture the canvas is streamed into each frame.
struct FrameSurface {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    bind_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    frame_texture: wgpu::Texture,
    frame_bind: wgpu::BindGroup,
    frame_size: (u32, u32),
}

impl FrameSurface {
    async fn new(window: Arc<Window>) -> Result<Self, ViewerError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Viewer Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Blit Shader"),
            source: wgpu::ShaderSource::Wgsl(BLIT_SHADER.into()),
        });

        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Blit Pipeline Layout"),
            bind_group_layouts: &[&bind_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Blit Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Frame Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let frame_size = (size.width.max(1), size.height.max(1));
        let (frame_texture, frame_bind) =
            create_frame_texture(&device, &bind_layout, &sampler, frame_size.0, frame_size.1);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            bind_layout,
            sampler,
            frame_texture,
            frame_bind,
            frame_size,
        })
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Upload the canvas and present it.
    fn render(&mut self, canvas: &Canvas) -> Result<(), wgpu::SurfaceError> {
        let (width, height) = (canvas.width(), canvas.height());
        if width == 0 || height == 0 {
            return Ok(());
        }

        if (width, height) != self.frame_size {
            let (texture, bind) =
                create_frame_texture(&self.device, &self.bind_layout, &self.sampler, width, height);
            self.frame_texture = texture;
            self.frame_bind = bind;
            self.frame_size = (width, height);
        }

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.frame_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            canvas.bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Blit Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Blit Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.frame_bind, &[]);
            pass.draw(0..3, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn create_frame_texture(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::BindGroup) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Frame Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Frame Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });
    (texture, bind)
}

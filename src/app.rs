use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{CursorGrabMode, Window},
};

use crate::config::DemoConfig;
use crate::controller::input::native;
use crate::controller::{FrameLoop, InputState};
use crate::error::AppError;
use crate::model::Scene;
use crate::ui;
use crate::view::{GpuContext, Renderer, UiFrame};

struct App {
    config: DemoConfig,

    // Core GPU resources
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    surface_config: wgpu::SurfaceConfiguration,
    window: Arc<Window>,
    renderer: Renderer,

    // egui
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,

    // Demo state
    scene: Scene,
    frame_loop: FrameLoop,
    input_state: InputState,

    // Frame timing
    frame_interval: Duration,
    last_frame_time: Instant,
    fps: f32,
    frame_count: u32,
    fps_timer: f32,
}

impl App {
    async fn new(window: Arc<Window>, config: DemoConfig) -> Result<Self, AppError> {
        let gpu = GpuContext::new(window.clone(), config.msaa_samples).await?;
        let (width, height) = (gpu.config.width, gpu.config.height);

        let scene = Scene::new(&config, width, height);
        let renderer = Renderer::new(&gpu.device, gpu.format, gpu.sample_count, width, height, &scene);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let app = Self {
            frame_loop: FrameLoop::new(config.variant),
            frame_interval: Duration::from_secs_f64(1.0 / config.target_fps.max(1) as f64),
            config,
            surface: gpu.surface,
            device: gpu.device,
            queue: gpu.queue,
            surface_config: gpu.config,
            window,
            renderer,
            egui_state,
            egui_ctx,
            scene,
            input_state: InputState::new(),
            last_frame_time: Instant::now(),
            fps: 0.0,
            frame_count: 0,
            fps_timer: 0.0,
        };
        app.apply_cursor_capture(app.scene.cursor_captured);
        Ok(app)
    }

    /// Returns true when the event was fully handled here
    fn input(&mut self, event: &WindowEvent) -> bool {
        let input = native::window_event_to_input(event);

        // egui only sees input while the cursor is free
        if !self.scene.cursor_captured && self.egui_state.on_window_event(&self.window, event).consumed {
            if let Some(input) = &input {
                self.input_state.process_consumed_event(input);
            }
            return true;
        }

        match input {
            Some(input) => {
                self.input_state.process_event(&input);
                matches!(event, WindowEvent::KeyboardInput { .. })
            }
            None => false,
        }
    }

    fn apply_cursor_capture(&self, captured: bool) {
        if captured {
            let grabbed = self
                .window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                warn!("cursor grab unavailable: {e}");
            }
            self.window.set_cursor_visible(false);
        } else {
            if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::None) {
                warn!("cursor release failed: {e}");
            }
            self.window.set_cursor_visible(true);
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.surface_config.width = new_size.width;
            self.surface_config.height = new_size.height;
            self.surface.configure(&self.device, &self.surface_config);
            self.renderer.resize(&self.device, new_size.width, new_size.height);
            self.scene.camera.set_aspect(new_size.width, new_size.height);
        }
    }

    /// Returns true when the exit key was pressed
    fn update(&mut self, dt: f32) -> bool {
        // Update FPS
        self.frame_count += 1;
        self.fps_timer += dt;
        if self.fps_timer >= 1.0 {
            self.fps = self.frame_count as f32 / self.fps_timer;
            self.frame_count = 0;
            self.fps_timer = 0.0;
        }

        let outcome = self.frame_loop.update(&mut self.scene, &mut self.input_state, dt);
        if let Some(captured) = outcome.cursor_captured {
            self.apply_cursor_capture(captured);
        }
        outcome.exit_requested
    }

    fn render_ui(&mut self) -> UiFrame {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let output = ui::build_ui(&self.egui_ctx, raw_input, &mut self.scene, self.config.variant, self.fps);
        self.egui_state.handle_platform_output(&self.window, output.platform_output);

        let pixels_per_point = output.pixels_per_point;
        UiFrame {
            primitives: self.egui_ctx.tessellate(output.shapes, pixels_per_point),
            textures_delta: output.textures_delta,
            pixels_per_point,
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let ui_frame = self.render_ui();
        self.renderer
            .render(&self.device, &self.queue, &self.surface, &mut self.scene, ui_frame)
    }

    fn next_frame_at(&self) -> Instant {
        self.last_frame_time + self.frame_interval
    }
}

/// Open the demo window and run until it is closed.
pub fn run(config: DemoConfig) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let window_attributes = Window::default_attributes()
        .with_title(config.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));
    let window = Arc::new(event_loop.create_window(window_attributes)?);

    info!(variant = ?config.variant, "starting demo");
    let mut app = pollster::block_on(App::new(window, config))?;

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { ref event, window_id } if window_id == app.window.id() => {
            if !app.input(event) {
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(physical_size) => app.resize(*physical_size),
                    WindowEvent::RedrawRequested => {
                        let now = Instant::now();
                        let dt = (now - app.last_frame_time).as_secs_f32();
                        app.last_frame_time = now;

                        if app.update(dt) {
                            info!("exit key pressed");
                            elwt.exit();
                            return;
                        }

                        match app.render() {
                            Ok(_) => {}
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                app.resize(app.window.inner_size())
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                            Err(e) => warn!("frame skipped: {e:?}"),
                        }
                    }
                    _ => {}
                }
            }
        }
        Event::DeviceEvent { ref event, .. } => {
            if app.scene.cursor_captured {
                if let Some(input) = native::device_event_to_input(event) {
                    app.input_state.process_event(&input);
                }
            }
        }
        Event::AboutToWait => {
            // Pace frames to the target rate
            let next = app.next_frame_at();
            if Instant::now() >= next {
                app.window.request_redraw();
            } else {
                elwt.set_control_flow(ControlFlow::WaitUntil(next));
            }
        }
        Event::LoopExiting => info!("window closed, releasing GPU resources"),
        _ => {}
    })?;

    Ok(())
}

use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::config::{GRID_HEIGHT, GRID_WIDTH, MAX_FRAME_DT, TUNE_STEP_FRACTION};
use crate::error::Result;
use crate::gpu::{GpuContext, GpuTrail, RenderParams, RenderPipeline};
use crate::simulation::params::ink_color;
use crate::simulation::{
    FrameOutcome, ProbeInput, ProbeTracker, SimSettings, SimulationDriver, TrailBackend, Tunable,
    ViewportProjection,
};

/// Everything that only exists once the window and device are up
struct Graphics {
    window: Arc<Window>,
    gpu: GpuContext,
    driver: SimulationDriver<GpuTrail>,
    render_pipeline: RenderPipeline,
}

/// Application state
pub struct App {
    graphics: Option<Graphics>,
    input: ProbeInput,
    tracker: ProbeTracker,
    settings: SimSettings,
    last_frame: Option<Instant>,
    fps_counter: FpsCounter,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            graphics: None,
            input: ProbeInput::default(),
            tracker: ProbeTracker::default(),
            settings: SimSettings::default(),
            last_frame: None,
            fps_counter: FpsCounter::new(),
        }
    }

    fn init_graphics(event_loop: &ActiveEventLoop) -> Result<Graphics> {
        let window_attrs = Window::default_attributes()
            .with_title("Ink Trail - Initializing...")
            .with_inner_size(winit::dpi::LogicalSize::new(1024, 1024));

        let window = Arc::new(event_loop.create_window(window_attrs)?);

        log::info!("Creating GPU context...");
        let gpu = pollster::block_on(GpuContext::new(window.clone()))?;

        log::info!("Allocating trail grids...");
        let trail = GpuTrail::new(gpu.device.clone(), gpu.queue.clone(), GRID_WIDTH, GRID_HEIGHT)?;

        log::info!("Creating render pipeline...");
        let render_pipeline = RenderPipeline::new(&gpu.device, gpu.format(), trail.buffers());

        Ok(Graphics {
            window,
            gpu,
            driver: SimulationDriver::new(trail),
            render_pipeline,
        })
    }

    fn projection(&self) -> Option<ViewportProjection> {
        self.graphics.as_ref().map(|g| {
            let size = g.window.inner_size();
            ViewportProjection {
                width: size.width as f32,
                height: size.height as f32,
            }
        })
    }

    fn pointer_moved(&mut self, x: f64, y: f64) {
        if let Some(projection) = self.projection() {
            self.input.pointer_moved(&projection, x as f32, y as f32);
        }
    }

    fn render(&mut self) {
        let now = Instant::now();
        let dt = self
            .last_frame
            .map(|last| now.duration_since(last).as_secs_f32().min(MAX_FRAME_DT))
            .unwrap_or(0.0);
        self.last_frame = Some(now);

        let Some(graphics) = self.graphics.as_mut() else {
            return;
        };

        // 1. Probe, 2. simulation step, 3. floor pass reading the new grid
        let probe = self
            .tracker
            .update(self.input.take_position(), self.input.is_pressed(), dt);
        if graphics.driver.advance(dt, &probe, &self.settings) == FrameOutcome::Skipped {
            log::debug!("Rendering stale grid");
        }

        let gpu = &graphics.gpu;
        let trail = graphics.driver.backend();
        let params = RenderParams::new(
            trail.grid_size(),
            &probe,
            self.settings.thickness,
            ink_color(graphics.driver.time()),
        );
        trail.buffers().write_render_params(&gpu.queue, &params);

        let output = match gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("floor-encoder"),
            });

        graphics
            .render_pipeline
            .draw(&mut encoder, &view, trail.buffers().active_index());

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if let Some(fps) = self.fps_counter.tick() {
            let (w, h) = trail.grid_size();
            graphics.window.set_title(&format!(
                "Ink Trail - {:.0} FPS - {}x{} - persistence {:.3} thickness {:.4}",
                fps, w, h, self.settings.persistence, self.settings.thickness
            ));
        }
    }

    fn nudge(&mut self, tunable: Tunable, direction: f32) {
        let (lo, hi) = tunable.range();
        let value = self.settings.get(tunable) + direction * (hi - lo) * TUNE_STEP_FRACTION;
        let stored = self.settings.set(tunable, value.clamp(lo, hi));
        log::info!("{}: {:.4}", tunable.name(), stored);
    }

    fn handle_key(&mut self, key_code: KeyCode) {
        match key_code {
            KeyCode::Digit1 => self.nudge(Tunable::Persistence, -1.0),
            KeyCode::Digit2 => self.nudge(Tunable::Persistence, 1.0),
            KeyCode::Digit3 => self.nudge(Tunable::Thickness, -1.0),
            KeyCode::Digit4 => self.nudge(Tunable::Thickness, 1.0),
            KeyCode::Digit5 => self.nudge(Tunable::WaterQuantity, -1.0),
            KeyCode::Digit6 => self.nudge(Tunable::WaterQuantity, 1.0),
            KeyCode::Digit7 => self.nudge(Tunable::WaterDiffusion, -1.0),
            KeyCode::Digit8 => self.nudge(Tunable::WaterDiffusion, 1.0),
            KeyCode::Digit9 => self.nudge(Tunable::Gravity, -1.0),
            KeyCode::Digit0 => self.nudge(Tunable::Gravity, 1.0),

            KeyCode::KeyR => {
                self.settings = SimSettings::default();
                log::info!("Tunables reset");
            }

            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }

        log::info!("Initializing Ink Trail...");
        log::info!("Grid size: {}x{}", GRID_WIDTH, GRID_HEIGHT);

        match Self::init_graphics(event_loop) {
            Ok(graphics) => {
                log::info!("Initialization complete!");
                log::info!("Controls:");
                log::info!("  Mouse/touch: move the probe, hold to press");
                log::info!("  1/2: Persistence  3/4: Thickness  5/6: Water quantity");
                log::info!("  7/8: Water diffusion  9/0: Gravity");
                log::info!("  R: Reset tunables");
                log::info!("  Escape: Quit");
                graphics.window.request_redraw();
                self.graphics = Some(graphics);
            }
            Err(e) => {
                log::error!("Initialization failed: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() {
                    if let PhysicalKey::Code(key_code) = event.physical_key {
                        if key_code == KeyCode::Escape {
                            log::info!("Escape pressed, exiting...");
                            event_loop.exit();
                        } else {
                            self.handle_key(key_code);
                        }
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_moved(position.x, position.y);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => self.input.pointer_down(),
                ElementState::Released => self.input.pointer_up(),
            },
            WindowEvent::Touch(touch) => {
                self.pointer_moved(touch.location.x, touch.location.y);
                match touch.phase {
                    TouchPhase::Started => self.input.pointer_down(),
                    TouchPhase::Ended | TouchPhase::Cancelled => self.input.pointer_up(),
                    TouchPhase::Moved => {}
                }
            }
            WindowEvent::Resized(new_size) => {
                if let Some(graphics) = &mut self.graphics {
                    log::info!("Window resized to {}x{}", new_size.width, new_size.height);
                    graphics.gpu.resize(new_size);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
                if let Some(graphics) = &self.graphics {
                    graphics.window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Simple FPS counter
struct FpsCounter {
    last_update: Instant,
    frame_count: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
        }
    }

    /// Tick the counter, returns Some(fps) every second
    fn tick(&mut self) -> Option<f64> {
        self.frame_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed.as_secs_f64() >= 1.0 {
            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.frame_count = 0;
            self.last_update = Instant::now();
            Some(fps)
        } else {
            None
        }
    }
}

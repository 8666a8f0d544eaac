//! Shoreline: a third-person character running, jumping and swimming around a small
//! island, followed by an orbiting chase camera.

mod camera_rig;
mod character;
mod config;
mod environment;
mod error;
mod events;
mod simulation;
mod water;

use anyhow::Result;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use simulation::Simulation;

/// Everything that exists once the window is up.
struct GameState {
    window: Arc<Window>,
    sim: Simulation,
    running: bool,
}

impl GameState {
    fn new(window: Arc<Window>, config: config::GameConfig) -> Result<Self> {
        let size = window.inner_size();
        let mut sim = Simulation::new(config, (size.width.max(1), size.height.max(1)))?;
        sim.request_assets();
        Ok(Self {
            window,
            sim,
            running: true,
        })
    }

    /// Advance the simulation and hand the camera to the renderer boundary.
    fn frame(&mut self) {
        let report = self.sim.update();
        let camera = self.sim.camera_uniform();
        log::trace!(
            "Frame {}: {} steps (alpha {:.2}), {:?}, camera at {:?}",
            self.sim.time.frame_count(),
            report.steps,
            report.alpha,
            report.motion_state,
            camera.position
        );
        if self.sim.time.frame_count() % 600 == 0 {
            log::debug!(
                "{:.0} fps, {} scene nodes, {} loads pending",
                self.sim.time.fps(),
                self.sim.scene.node_count(),
                self.sim.pending_assets()
            );
        }
    }
}

/// Application handler for winit.
struct App {
    config: config::GameConfig,
    state: Option<GameState>,
}

impl App {
    fn new(config: config::GameConfig) -> Self {
        Self { config, state: None }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_none() {
            let config = self.config.clone();
            let window_attrs = Window::default_attributes()
                .with_title(config.window.title.clone())
                .with_inner_size(winit::dpi::LogicalSize::new(config.window.width, config.window.height));

            let window = match event_loop.create_window(window_attrs) {
                Ok(w) => Arc::new(w),
                Err(e) => {
                    log::error!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            match GameState::new(window.clone(), config) {
                Ok(s) => {
                    self.state = Some(s);
                    window.request_redraw();
                }
                Err(e) => {
                    log::error!("Failed to initialize game: {}", e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(state) = &mut self.state {
            if state.handle_window_event(event) || !state.running {
                event_loop.exit();
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config::GameConfig::load();

    println!("Shoreline controls:");
    println!("  WASD        - Move (relative to the camera)");
    println!("  Space       - Jump / swim up");
    println!("  {:<11} - Orbit camera", controls_drag_label(config.input.drag_button));
    println!("  Mouse wheel - Zoom");

    log::info!("Starting Shoreline");

    let event_loop = EventLoop::new()?;
    // Poll so frames keep coming without input.
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}

fn controls_drag_label(button: config::DragButtonConfig) -> String {
    format!("{:?} drag", button)
}

// Window and render loop for the figure demo.
// Setup, per-frame work and teardown all live here; drawing is in renderer.rs.

pub mod app;
pub mod gpu;
pub mod input;
pub mod logging;
pub mod model;
pub mod renderer;
pub mod settings;
pub mod shader;
pub mod transform;

use std::{iter, sync::Arc};

use anyhow::{Context, Result};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    app::AppState,
    gpu::{Gpu, SurfaceErrorAction},
    input::HeldKeys,
    renderer::Renderer,
    settings::Settings,
    shader::ShaderSources,
};

/// Everything that exists only while the window does.
struct State {
    // Dropped in field order: GPU objects go before the window they draw into.
    renderer: Renderer,
    gpu: Gpu,
    window: Arc<Window>,
}

impl State {
    async fn new(window: Arc<Window>, settings: &Settings) -> Result<State> {
        let gpu = Gpu::new(window.clone()).await?;
        let renderer = Renderer::new(
            gpu.device(),
            gpu.format(),
            settings.clear_color,
            ShaderSources::default(),
        )
        .await;

        Ok(Self {
            renderer,
            gpu,
            window,
        })
    }

    fn window(&self) -> &Window {
        &self.window
    }

    fn render(&self, app: &AppState) -> Result<(), wgpu::SurfaceError> {
        let output = self.gpu.acquire()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.write_transform(self.gpu.queue(), app.transform());

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        self.renderer.record(&mut encoder, &view);

        self.gpu.queue().submit(iter::once(encoder.finish()));
        self.window.pre_present_notify();
        output.present();

        Ok(())
    }
}

/// Drives the demo from winit callbacks.
pub struct App {
    settings: Settings,
    app_state: AppState,
    held: HeldKeys,
    state: Option<State>,
    error: Option<anyhow::Error>,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            app_state: AppState::new(),
            held: HeldKeys::default(),
            state: None,
            error: None,
        }
    }

    fn bootstrap(&self, event_loop: &ActiveEventLoop) -> Result<State> {
        let attrs = Window::default_attributes()
            .with_title(self.settings.title.as_str())
            .with_inner_size(self.settings.size);
        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        pollster::block_on(State::new(Arc::new(window), &self.settings))
    }

    /// One loop iteration: input, draw, present, then the loop condition check.
    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        if !self.app_state.is_running() {
            return;
        }
        let Some(state) = self.state.as_mut() else {
            return;
        };

        input::process_input(&self.held, &mut self.app_state, &self.settings);

        if state.gpu.is_configured() {
            match state.render(&self.app_state) {
                Ok(()) => {}
                Err(err) => {
                    if state.gpu.handle_surface_error(err) == SurfaceErrorAction::Fatal {
                        self.app_state.request_close();
                    }
                }
            }
        }

        if self.app_state.check_close() {
            log::debug!("close requested, leaving render loop");
            event_loop.exit();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        match self.bootstrap(event_loop) {
            Ok(state) => {
                state.window().request_redraw();
                self.state = Some(state);
            }
            Err(err) => {
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        match &self.state {
            Some(state) if state.window().id() == window_id => {}
            _ => return,
        }

        if input::handle_input(&mut self.held, &event) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.app_state.request_close();
                if self.app_state.check_close() {
                    event_loop.exit();
                }
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(state) = self.state.as_mut() {
                    state.gpu.resize(physical_size);
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(state) = self.state.as_mut() {
                    let size = state.window().inner_size();
                    state.gpu.resize(size);
                }
            }
            WindowEvent::RedrawRequested => self.frame(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);
        if let Some(state) = &self.state {
            if self.app_state.is_running() {
                state.window().request_redraw();
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.state.take();
    }
}

/// Opens the window and runs until it is closed or Escape is pressed.
///
/// Window or GPU bootstrap failures come back as `Err`.
pub fn run() -> Result<()> {
    logging::init_logging(logging::LoggingConfig::default());

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let mut app = App::new(Settings::default());

    event_loop
        .run_app(&mut app)
        .context("event loop terminated with error")?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition, PhysicalSize},
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, KeyCode, PhysicalKey},
    window::{Window, WindowAttributes},
};

use crate::{
    config::SceneConfig,
    error::AppError,
    gfx::rendering::RenderEngine,
    orchestrator::{Frame, FrameRenderer, SceneOrchestrator, Viewport},
    ui::{status_panel, StatusInfo, UiManager},
};

/// Cursor travel (physical pixels) beyond which a press/release is a drag
const CLICK_SLOP: f64 = 4.0;

type UiDraw = fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView);

/// Desktop host for the scene: window, GPU renderer, overlay and input
pub struct DayNightApp {
    config: SceneConfig,
}

struct AppState {
    config: SceneConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    orchestrator: Option<SceneOrchestrator>,
    cursor: PhysicalPosition<f64>,
    press_origin: Option<PhysicalPosition<f64>>,
    error: Option<AppError>,
}

impl DayNightApp {
    pub fn new(config: SceneConfig) -> Self {
        Self { config }
    }

    /// Opens the window and runs the event loop until it exits
    ///
    /// # Errors
    /// Fails if the event loop, window or GPU device cannot be created.
    pub fn run(self) -> Result<(), AppError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut state = AppState {
            config: self.config,
            window: None,
            render_engine: None,
            ui_manager: None,
            orchestrator: None,
            cursor: PhysicalPosition::new(0.0, 0.0),
            press_origin: None,
            error: None,
        };
        event_loop.run_app(&mut state)?;

        match state.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let (width, height) = self.config.window_size;
        let window = event_loop.create_window(
            WindowAttributes::default()
                .with_title(self.config.window_title.clone())
                .with_inner_size(LogicalSize::new(width, height)),
        )?;
        let window_handle = Arc::new(window);

        let PhysicalSize { width, height } = window_handle.inner_size();
        let renderer = pollster::block_on(RenderEngine::new(window_handle.clone(), width, height))?;

        let ui_manager = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window_handle,
        );

        let mut orchestrator =
            SceneOrchestrator::new(self.config.clone(), Viewport::new(width, height));
        orchestrator.start_model_load();

        self.window = Some(window_handle);
        self.render_engine = Some(renderer);
        self.ui_manager = Some(ui_manager);
        self.orchestrator = Some(orchestrator);
        Ok(())
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.init(event_loop) {
            log::error!("Startup failed: {}", e);
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let (Some(window), Some(render_engine), Some(orchestrator)) = (
            self.window.as_ref(),
            self.render_engine.as_mut(),
            self.orchestrator.as_mut(),
        ) else {
            return;
        };

        // Handle UI input first
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            if ui_manager.handle_input(window, &ui_event) {
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key,
                        logical_key,
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if physical_key == PhysicalKey::Code(KeyCode::Escape) {
                    event_loop.exit();
                } else if let Key::Character(text) = logical_key {
                    orchestrator.handle_key(text.as_str());
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                orchestrator
                    .camera_manager_mut()
                    .controller
                    .set_shift_held(modifiers.state().shift_key());
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = position;
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let pressed = state == ElementState::Pressed;
                orchestrator
                    .camera_manager_mut()
                    .controller
                    .set_mouse_pressed(pressed);

                if pressed {
                    self.press_origin = Some(self.cursor);
                } else if let Some(origin) = self.press_origin.take() {
                    let travel = (self.cursor.x - origin.x).hypot(self.cursor.y - origin.y);
                    if travel <= CLICK_SLOP {
                        orchestrator.handle_click(self.cursor.x as f32, self.cursor.y as f32);
                    }
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if orchestrator.handle_resize(width, height) {
                    render_engine.resize(width, height);
                    if let Some(ui_manager) = self.ui_manager.as_mut() {
                        ui_manager.update_display_size(width, height);
                    }
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                orchestrator.poll_model_load();

                let mut renderer = ViewportRenderer {
                    engine: render_engine,
                    ui_manager: self.ui_manager.as_mut(),
                    window,
                    model_pending: orchestrator.model_pending(),
                    model_failed: !orchestrator.diagnostics().is_empty(),
                };
                orchestrator.tick(&mut renderer);
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: winit::event::DeviceEvent,
    ) {
        let Some(orchestrator) = self.orchestrator.as_mut() else {
            return;
        };

        // Don't orbit while the pointer is over the overlay
        if self.ui_manager.as_ref().is_some_and(UiManager::wants_input) {
            return;
        }

        orchestrator.camera_manager_mut().process_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}

/// Draws orchestrator frames with the wgpu engine and the status overlay
struct ViewportRenderer<'a> {
    engine: &'a mut RenderEngine,
    ui_manager: Option<&'a mut UiManager>,
    window: &'a Window,
    model_pending: bool,
    model_failed: bool,
}

impl FrameRenderer for ViewportRenderer<'_> {
    fn render(&mut self, frame: &Frame<'_>) {
        let status = StatusInfo {
            label: frame.status_label,
            model_pending: self.model_pending,
            model_failed: self.model_failed,
        };

        match self.ui_manager.as_deref_mut() {
            Some(ui_manager) => {
                let window = self.window;
                self.engine.render_frame(
                    frame.scene,
                    frame.camera,
                    Some(
                        |device: &wgpu::Device,
                         queue: &wgpu::Queue,
                         encoder: &mut wgpu::CommandEncoder,
                         view: &wgpu::TextureView| {
                            ui_manager.draw(device, queue, encoder, window, view, |ui| {
                                status_panel(ui, status)
                            });
                        },
                    ),
                );
            }
            None => self.engine.render_frame(frame.scene, frame.camera, None::<UiDraw>),
        }
    }
}

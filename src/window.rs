//! Window and frame loop.
//!
//! [`run`] opens a window, builds the renderer once the event loop resumes,
//! and then drives one synchronous frame per redraw: tick the clock, apply
//! input, advance the scene, draw.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{CursorIcon, Window, WindowId},
};

use crate::attributes::SpriteInstance;
use crate::audio::AudioController;
use crate::config::SceneConfig;
use crate::error::RunError;
use crate::gallery::PhotoSelection;
use crate::gpu::camera::CameraRig;
use crate::gpu::Renderer;
use crate::hit::Ray;
use crate::input::{Action, Input};
use crate::overlay::OverlayIntent;
use crate::scene::{ClickOutcome, HoverTarget, Scene, SceneEvent};
use crate::time::Time;

#[cfg(feature = "egui")]
use crate::gpu::EguiIntegration;
#[cfg(feature = "egui")]
use crate::overlay::{Overlay, OverlayState};

/// Open a window and run the scene until it is closed.
pub fn run(config: SceneConfig) -> Result<(), RunError> {
    let scene = Scene::new(&config)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, scene);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct App {
    config: SceneConfig,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    scene: Option<Scene>,
    camera: CameraRig,
    time: Time,
    input: Input,
    audio: AudioController,
    selected_photo: Option<PhotoSelection>,
    hover: HoverTarget,
    sprites: Vec<SpriteInstance>,
    #[cfg(feature = "egui")]
    egui: Option<EguiIntegration>,
    #[cfg(feature = "egui")]
    overlay: Overlay,
    error: Option<RunError>,
}

impl App {
    fn new(config: SceneConfig, scene: Scene) -> Self {
        let camera = CameraRig::new(&config.camera, scene.mode());
        let time = Time::with_max_delta(config.time.max_delta);
        let audio = AudioController::from_config(&config.audio);
        let sprites = Vec::with_capacity(scene.sprite_count());
        Self {
            config,
            window: None,
            renderer: None,
            scene: Some(scene),
            camera,
            time,
            input: Input::new(),
            audio,
            selected_photo: None,
            hover: HoverTarget::Nothing,
            sprites,
            #[cfg(feature = "egui")]
            egui: None,
            #[cfg(feature = "egui")]
            overlay: Overlay::default(),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: RunError) {
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    /// Tear down in dependency order: UI and GPU first, then the scene.
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        log::info!("Shutting down");
        self.audio.stop();
        #[cfg(feature = "egui")]
        {
            self.egui = None;
        }
        self.renderer = None;
        self.scene = None;
        self.window = None;
        event_loop.exit();
    }

    fn cursor_ray(&self) -> Option<Ray> {
        let renderer = self.renderer.as_ref()?;
        self.input.mouse_position()?;
        let ndc = self.input.mouse_ndc();
        Some(self.camera.ray_from_ndc(ndc.x, ndc.y, renderer.aspect()))
    }

    fn apply_intent(&mut self, intent: OverlayIntent) {
        match intent {
            OverlayIntent::ToggleAudio => {
                let playing = self.audio.toggle();
                log::debug!("Audio playing: {}", playing);
            }
            OverlayIntent::SetViewMode(mode) => {
                if let Some(scene) = self.scene.as_mut() {
                    scene.set_mode(mode);
                }
            }
            OverlayIntent::ClosePhoto => {
                self.selected_photo = None;
            }
        }
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::ToggleMode => {
                if let Some(scene) = self.scene.as_mut() {
                    scene.toggle_mode();
                }
            }
            Action::ToggleAudio => self.apply_intent(OverlayIntent::ToggleAudio),
            Action::ClosePhoto => self.apply_intent(OverlayIntent::ClosePhoto),
            Action::TogglePause => {
                self.time.toggle_pause();
                log::info!("Time {}", if self.time.is_paused() { "paused" } else { "resumed" });
            }
        }
    }

    fn pointer_blocked(&self) -> bool {
        #[cfg(feature = "egui")]
        {
            if let Some(egui) = &self.egui {
                return egui.wants_pointer();
            }
        }
        false
    }

    /// Route this frame's input to the scene.
    fn handle_input(&mut self) {
        let actions: Vec<Action> = self.input.actions().collect();
        for action in actions {
            self.apply_action(action);
        }

        let blocked = self.pointer_blocked();
        if self.input.cursor_moved() || self.input.clicked() {
            let ray = if blocked { None } else { self.cursor_ray() };
            if let Some(scene) = self.scene.as_mut() {
                let hover = scene.hover(ray.as_ref());
                if hover.is_interactive() != self.hover.is_interactive() {
                    if let Some(window) = &self.window {
                        let icon = if hover.is_interactive() {
                            CursorIcon::Pointer
                        } else {
                            CursorIcon::Default
                        };
                        window.set_cursor(icon);
                    }
                }
                self.hover = hover;

                if self.input.clicked() {
                    if let Some(ray) = ray {
                        if let ClickOutcome::Photo(selection) = scene.click(&ray) {
                            self.selected_photo = Some(selection);
                        }
                    }
                }
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (elapsed, delta) = self.time.update();
        self.handle_input();

        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        scene.advance_to(elapsed, delta);
        self.camera.update(scene.time(), delta, scene.mode());

        for event in scene.drain_events() {
            match event {
                SceneEvent::ModeChanged(mode) => log::debug!("Scene mode changed to {}", mode),
                SceneEvent::PhotoSelected(selection) => {
                    log::debug!("Opening photo {}", selection.uri);
                    self.selected_photo = Some(selection);
                }
            }
        }

        self.sprites.clear();
        scene.write_sprites(&mut self.sprites);

        #[cfg(feature = "egui")]
        let ui_output = {
            let state = OverlayState {
                audio_playing: self.audio.is_playing(),
                view_mode: scene.mode(),
                selected_photo: self.selected_photo.clone(),
                elapsed: scene.time(),
            };
            let mut intents = Vec::new();
            let output = match (&mut self.egui, &self.window) {
                (Some(egui), Some(window)) => {
                    egui.begin_frame(window);
                    self.overlay.ui(&egui.ctx, &state, &mut intents);
                    Some(egui.end_frame(window))
                }
                _ => None,
            };
            for intent in intents {
                self.apply_intent(intent);
            }
            output
        };

        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        renderer.upload(&self.sprites);

        #[cfg(feature = "egui")]
        let egui = &mut self.egui;
        let size = [renderer.config.width, renderer.config.height];
        let result = renderer.render(&self.camera, elapsed, delta, |device, queue, encoder, view| {
            #[cfg(feature = "egui")]
            {
                if let (Some(egui), Some(output)) = (egui.as_mut(), ui_output.as_ref()) {
                    egui.paint(device, queue, encoder, view, size, output);
                }
            }
            #[cfg(not(feature = "egui"))]
            let _ = (device, queue, encoder, view, size);
        });

        match result {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = winit::dpi::PhysicalSize::new(size[0], size[1]);
                renderer.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }

        self.input.begin_frame();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let renderer = match pollster::block_on(Renderer::new(window.clone(), self.config.post)) {
            Ok(renderer) => renderer,
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let size = window.inner_size();
        self.input.set_window_size(size.width, size.height);

        #[cfg(feature = "egui")]
        {
            self.egui = Some(EguiIntegration::new(renderer.device(), renderer.format(), &window));
        }

        self.renderer = Some(renderer);
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        #[cfg(feature = "egui")]
        let consumed = match (&mut self.egui, &self.window) {
            (Some(egui), Some(window)) => egui.on_window_event(window, &event),
            _ => false,
        };
        #[cfg(not(feature = "egui"))]
        let consumed = false;

        match event {
            WindowEvent::CloseRequested => {
                self.shutdown(event_loop);
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
                self.input
                    .set_window_size(physical_size.width, physical_size.height);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            other => {
                if !consumed {
                    self.input.handle_event(&other);
                }
            }
        }
    }
}

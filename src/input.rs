//! Keyboard and pointer state for the viewer window.
//!
//! The `Input` struct folds raw window events into per-frame state: keys
//! just pressed, the cursor position in pixels and NDC, and whether the left
//! button was clicked. [`Action::for_key`] maps the handful of bound keys to
//! what the app should do with them.

use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

use crate::gpu::camera::cursor_to_ndc;

/// Keys the viewer cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    A,
    M,
    P,
    Space,
    Escape,
    Other(u32),
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::KeyA => KeyCode::A,
            WinitKeyCode::KeyM => KeyCode::M,
            WinitKeyCode::KeyP => KeyCode::P,
            WinitKeyCode::Space => KeyCode::Space,
            WinitKeyCode::Escape => KeyCode::Escape,
            _ => KeyCode::Other(key as u32),
        }
    }
}

/// What a key press asks the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ToggleMode,
    ToggleAudio,
    ClosePhoto,
    TogglePause,
}

impl Action {
    /// Binding for `key`, if any.
    pub fn for_key(key: KeyCode) -> Option<Action> {
        match key {
            KeyCode::Space | KeyCode::M => Some(Action::ToggleMode),
            KeyCode::A => Some(Action::ToggleAudio),
            KeyCode::Escape => Some(Action::ClosePhoto),
            KeyCode::P => Some(Action::TogglePause),
            KeyCode::Other(_) => None,
        }
    }
}

/// Input state tracking for keyboard and pointer.
#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    keys_pressed: Vec<KeyCode>,

    clicked: bool,
    cursor_moved: bool,

    // Cursor position
    mouse_position: Option<Vec2>,
    mouse_ndc: Vec2,

    // Window size for NDC calculation
    window_size: (u32, u32),
}

impl Input {
    /// Create a new input tracker.
    pub fn new() -> Self {
        Self {
            window_size: (800, 600),
            ..Default::default()
        }
    }

    /// Keys that went down this frame, in order. Repeats are filtered out.
    pub fn keys_pressed(&self) -> &[KeyCode] {
        &self.keys_pressed
    }

    /// Actions bound to this frame's key presses.
    pub fn actions(&self) -> impl Iterator<Item = Action> + '_ {
        self.keys_pressed.iter().filter_map(|k| Action::for_key(*k))
    }

    /// Check if a key is currently held down.
    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Whether the left button went down this frame.
    pub fn clicked(&self) -> bool {
        self.clicked
    }

    /// Whether the cursor moved this frame.
    pub fn cursor_moved(&self) -> bool {
        self.cursor_moved
    }

    /// Cursor position in physical pixels, `None` once it leaves the window.
    pub fn mouse_position(&self) -> Option<Vec2> {
        self.mouse_position
    }

    /// Cursor position in normalized device coordinates (-1 to 1).
    ///
    /// Origin is at center of window. X increases to the right, Y increases upward.
    pub fn mouse_ndc(&self) -> Vec2 {
        self.mouse_ndc
    }

    /// Called at the start of each frame to clear per-frame state.
    pub(crate) fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.clicked = false;
        self.cursor_moved = false;
    }

    /// Update window size for NDC calculations.
    pub(crate) fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
        if let Some(p) = self.mouse_position {
            self.update_ndc(p);
        }
    }

    fn update_ndc(&mut self, p: Vec2) {
        let (w, h) = self.window_size;
        let (x, y) = cursor_to_ndc(p.x as f64, p.y as f64, w, h);
        self.mouse_ndc = Vec2::new(x, y);
    }

    fn move_cursor(&mut self, p: Vec2) {
        self.mouse_position = Some(p);
        self.cursor_moved = true;
        self.update_ndc(p);
    }

    fn press_key(&mut self, key: KeyCode) {
        // Only fire pressed event if not already held (no repeat)
        if self.keys_held.insert(key) {
            self.keys_pressed.push(key);
        }
    }

    fn release_key(&mut self, key: KeyCode) {
        self.keys_held.remove(&key);
    }

    /// Process a winit window event.
    pub(crate) fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    let key = KeyCode::from(keycode);
                    match event.state {
                        ElementState::Pressed => self.press_key(key),
                        ElementState::Released => self.release_key(key),
                    }
                }
            }

            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.clicked = true;
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.move_cursor(Vec2::new(position.x as f32, position.y as f32));
            }

            WindowEvent::CursorLeft { .. } => {
                self.mouse_position = None;
                self.cursor_moved = true;
            }

            WindowEvent::Focused(false) => {
                self.keys_held.clear();
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_repeat_is_filtered() {
        let mut input = Input::new();
        input.press_key(KeyCode::Space);
        input.press_key(KeyCode::Space);
        assert_eq!(input.keys_pressed(), &[KeyCode::Space]);
        assert!(input.key_held(KeyCode::Space));

        // After begin_frame, pressed is cleared but held remains
        input.begin_frame();
        assert!(input.keys_pressed().is_empty());
        assert!(input.key_held(KeyCode::Space));

        input.release_key(KeyCode::Space);
        input.press_key(KeyCode::Space);
        assert_eq!(input.keys_pressed(), &[KeyCode::Space]);
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(Action::for_key(KeyCode::Space), Some(Action::ToggleMode));
        assert_eq!(Action::for_key(KeyCode::M), Some(Action::ToggleMode));
        assert_eq!(Action::for_key(KeyCode::A), Some(Action::ToggleAudio));
        assert_eq!(Action::for_key(KeyCode::Escape), Some(Action::ClosePhoto));
        assert_eq!(Action::for_key(KeyCode::P), Some(Action::TogglePause));
        assert_eq!(Action::for_key(KeyCode::Other(7)), None);
    }

    #[test]
    fn test_actions_follow_press_order() {
        let mut input = Input::new();
        input.press_key(KeyCode::A);
        input.press_key(KeyCode::Other(3));
        input.press_key(KeyCode::M);
        let actions: Vec<_> = input.actions().collect();
        assert_eq!(actions, vec![Action::ToggleAudio, Action::ToggleMode]);
    }

    #[test]
    fn test_mouse_ndc() {
        let mut input = Input::new();
        input.set_window_size(800, 600);
        input.move_cursor(Vec2::new(400.0, 300.0));
        assert!(input.mouse_ndc().x.abs() < 0.01);
        assert!(input.mouse_ndc().y.abs() < 0.01);

        // Resizing re-derives NDC from the last pixel position.
        input.set_window_size(1600, 600);
        assert!((input.mouse_ndc().x + 0.5).abs() < 0.01);
    }
}

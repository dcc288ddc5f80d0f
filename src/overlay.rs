//! UI overlay and photo modal.
//!
//! The overlay reads a small snapshot of scene state and answers with
//! intents; it never touches the scene directly. The egui rendering lives
//! behind the `egui` feature, while the typing animation and the state/intent
//! types are plain data so they can be tested headless.

use crate::gallery::PhotoSelection;
use crate::mode::ViewMode;

/// The code banner that types itself out once the tree has assembled.
pub const CODE_SNIPPET: &str = r#"
import { Christmas } from '@universe/holidays';
import { Magic } from '@fantasy/particles';

function MerryChristmas() {
  const spirit = new Magic.Spirit({
    joy: 100,
    warmth: Infinity,
    hope: true
  });

  const tree = new Christmas.Tree({
    type: 'Evergreen',
    decorations: ['Lights', 'Star', 'Love'],
    height: '100vh'
  });

  // Initializing magical sequence...
  // Loading assets...
  // Compiling shaders...
  // 00:00:01 - System Ready.

  return spirit.bless(tree);
}

// Executing miracle...
// ...
"#;

/// Typewriter effect as a pure function of elapsed time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypedText {
    text: &'static str,
    /// Seconds before the first character appears.
    pub start_delay: f32,
    /// Seconds per character.
    pub char_interval: f32,
}

impl Default for TypedText {
    fn default() -> Self {
        Self::new(CODE_SNIPPET)
    }
}

impl TypedText {
    pub fn new(text: &'static str) -> Self {
        Self {
            text,
            start_delay: 4.5,
            char_interval: 0.03,
        }
    }

    /// Number of characters visible at `elapsed` seconds.
    pub fn visible_chars(&self, elapsed: f32) -> usize {
        if elapsed < self.start_delay || self.char_interval <= 0.0 {
            return 0;
        }
        let typed = ((elapsed - self.start_delay) / self.char_interval).floor() as usize;
        typed.min(self.text.chars().count())
    }

    /// The typed prefix at `elapsed` seconds.
    pub fn visible(&self, elapsed: f32) -> &'static str {
        let n = self.visible_chars(elapsed);
        match self.text.char_indices().nth(n) {
            Some((byte, _)) => &self.text[..byte],
            None => self.text,
        }
    }

    /// Whether every character has been typed.
    pub fn is_complete(&self, elapsed: f32) -> bool {
        self.visible_chars(elapsed) == self.text.chars().count()
    }
}

/// What the overlay is shown each frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayState {
    pub audio_playing: bool,
    pub view_mode: ViewMode,
    /// Photo open in the modal, if any.
    pub selected_photo: Option<PhotoSelection>,
    /// Seconds since start, drives the typing effect.
    pub elapsed: f32,
}

/// Requests the overlay sends back to the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayIntent {
    ToggleAudio,
    SetViewMode(ViewMode),
    ClosePhoto,
}

/// Overlay and modal.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    typed: TypedText,
}

impl Overlay {
    pub fn new(typed: TypedText) -> Self {
        Self { typed }
    }

    pub fn typed(&self) -> &TypedText {
        &self.typed
    }

    /// Draw the overlay, collecting intents into `out`.
    #[cfg(feature = "egui")]
    pub fn ui(&self, ctx: &egui::Context, state: &OverlayState, out: &mut Vec<OverlayIntent>) {
        let cyan = egui::Color32::from_rgb(0x22, 0xd3, 0xee);
        let slate = egui::Color32::from_rgb(0xcb, 0xd5, 0xe1);
        let panel = egui::Frame::NONE
            .fill(egui::Color32::from_rgba_unmultiplied(15, 23, 42, 200))
            .inner_margin(egui::Margin::same(12))
            .corner_radius(8.0);

        egui::Area::new(egui::Id::new("code_banner"))
            .anchor(egui::Align2::LEFT_TOP, egui::vec2(24.0, 24.0))
            .interactable(false)
            .show(ctx, |ui| {
                panel.show(ui, |ui| {
                    ui.set_max_width(420.0);
                    let text = format!("{}_", self.typed.visible(state.elapsed));
                    ui.label(egui::RichText::new(text).monospace().size(12.0).color(cyan));
                });
            });

        egui::Area::new(egui::Id::new("title"))
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-24.0, 24.0))
            .interactable(false)
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new("MERRY\nCHRISTMAS")
                        .size(34.0)
                        .strong()
                        .color(egui::Color32::from_rgb(0x67, 0xe8, 0xf9)),
                );
            });

        egui::Area::new(egui::Id::new("controls"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-24.0, -24.0))
            .show(ctx, |ui| {
                panel.show(ui, |ui| {
                    ui.horizontal(|ui| {
                        for mode in [ViewMode::Tree, ViewMode::Universe] {
                            let label = egui::RichText::new(mode.to_string().to_uppercase())
                                .monospace()
                                .color(slate);
                            if ui.selectable_label(state.view_mode == mode, label).clicked()
                                && state.view_mode != mode
                            {
                                out.push(OverlayIntent::SetViewMode(mode));
                            }
                        }
                        ui.separator();
                        let audio = if state.audio_playing {
                            "PAUSE MUSIC"
                        } else {
                            "PLAY MUSIC"
                        };
                        if ui
                            .button(egui::RichText::new(audio).monospace().color(slate))
                            .clicked()
                        {
                            out.push(OverlayIntent::ToggleAudio);
                        }
                    });
                });
            });

        if let Some(photo) = &state.selected_photo {
            let mut open = true;
            egui::Window::new("Memory")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .open(&mut open)
                .show(ctx, |ui| {
                    ui.label(egui::RichText::new(&photo.uri).monospace().color(cyan));
                    ui.label(format!("#{}", photo.index + 1));
                    if ui.button("Close").clicked() {
                        out.push(OverlayIntent::ClosePhoto);
                    }
                });
            if !open {
                out.push(OverlayIntent::ClosePhoto);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_typed_before_delay() {
        let typed = TypedText::default();
        assert_eq!(typed.visible(0.0), "");
        assert_eq!(typed.visible(4.49), "");
        assert_eq!(typed.visible_chars(4.5), 0);
    }

    #[test]
    fn test_one_char_per_interval() {
        let typed = TypedText::new("hello");
        assert_eq!(typed.visible(4.5 + 0.031), "h");
        assert_eq!(typed.visible(4.5 + 0.061), "he");
        assert!(!typed.is_complete(4.6));
        assert_eq!(typed.visible(60.0), "hello");
        assert!(typed.is_complete(60.0));
    }

    #[test]
    fn test_typing_is_monotonic() {
        let typed = TypedText::default();
        let mut last = 0;
        for i in 0..2000 {
            let n = typed.visible_chars(i as f32 * 0.01);
            assert!(n >= last);
            last = n;
        }
        assert!(typed.is_complete(4.5 + CODE_SNIPPET.len() as f32 * 0.03 + 0.1));
    }

    #[test]
    fn test_default_state() {
        let state = OverlayState::default();
        assert!(!state.audio_playing);
        assert_eq!(state.view_mode, ViewMode::Tree);
        assert!(state.selected_photo.is_none());
    }
}

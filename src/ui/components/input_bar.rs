//! Text input, record toggle, and send controls.

use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, Key, RichText, Vec2};

pub struct InputBar<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> InputBar<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(self.theme.bg_secondary)
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.spacing)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    self.show_record_button(ui);
                    ui.add_space(self.theme.spacing_sm);
                    self.show_text_input(ui);
                    ui.add_space(self.theme.spacing_sm);
                    self.show_send_button(ui);
                });
            });
    }

    fn show_record_button(&mut self, ui: &mut egui::Ui) {
        let is_recording = self.state.is_recording();

        let (icon, tooltip, color) = if is_recording {
            ("⏹", "Stop recording", self.theme.recording)
        } else {
            ("🎤", "Record a voice message", self.theme.text_secondary)
        };

        let button = egui::Button::new(RichText::new(icon).size(20.0).color(color))
            .min_size(Vec2::splat(44.0))
            .rounding(self.theme.button_rounding);

        let button = if is_recording {
            button.fill(self.theme.recording.gamma_multiply(0.2))
        } else {
            button
        };

        let response = ui.add(button);
        let button_rect = response.rect;

        // One click toggles: idle -> recording -> dispatch.
        if response.clicked() {
            self.state.toggle_recording();
        }

        response.on_hover_text(tooltip);

        // Pulsing ring while the microphone is live.
        if is_recording {
            let t = ui.ctx().input(|i| i.time);
            let pulse = ((t * 3.0).sin() * 0.5 + 0.5) as f32;

            let painter = ui.painter();
            let center = button_rect.center();
            let radius = button_rect.width() / 2.0 + 2.0 + pulse * 3.0;

            painter.circle_stroke(
                center,
                radius,
                egui::Stroke::new(
                    2.0 * pulse,
                    self.theme.recording.gamma_multiply(1.0 - pulse * 0.5),
                ),
            );

            ui.ctx().request_repaint();
        }
    }

    fn show_text_input(&mut self, ui: &mut egui::Ui) {
        // Reserve space for the send button.
        let available_width = ui.available_width() - 60.0;

        let text_edit = egui::TextEdit::singleline(&mut self.state.input_text)
            .hint_text("Type a message...")
            .desired_width(available_width)
            .font(egui::TextStyle::Body)
            .margin(egui::Margin::symmetric(12.0, 8.0));

        let response = ui.add(text_edit);

        if response.has_focus() && !self.state.input_text.trim().is_empty() {
            let enter_pressed = ui.input(|i| i.key_pressed(Key::Enter));
            let shift_held = ui.input(|i| i.modifiers.shift);

            if enter_pressed && !shift_held {
                self.state.send_message();
            }
        }
    }

    fn show_send_button(&mut self, ui: &mut egui::Ui) {
        let can_send = !self.state.input_text.trim().is_empty();

        let button_color = if can_send {
            self.theme.primary
        } else {
            self.theme.text_muted
        };

        let button = egui::Button::new(RichText::new("➤").size(18.0).color(egui::Color32::WHITE))
            .min_size(Vec2::splat(44.0))
            .rounding(self.theme.button_rounding)
            .fill(button_color);

        let response = ui.add_enabled(can_send, button);

        if response.clicked() {
            self.state.send_message();
        }

        response.on_hover_text("Send message (Enter)");
    }
}

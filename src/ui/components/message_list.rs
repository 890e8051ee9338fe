//! Conversation transcript.
//!
//! Renders the message list with text bubbles, playable audio entries, and
//! locally attached images. New entries keep the view pinned to the bottom.

use crate::messages::{
    AudioAttachment, AudioClip, AudioSource, ImageData, Message, MessageContent, Sender,
};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, Align, Color32, Pos2, Rect, RichText, Sense, Vec2};

pub struct MessageList<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> MessageList<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let messages = self.state.messages();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.add_space(self.theme.spacing);

                    if messages.is_empty() {
                        self.show_empty_state(ui);
                    } else {
                        for message in &messages {
                            self.show_message(ui, message);
                            ui.add_space(self.theme.spacing_sm);
                        }
                    }

                    ui.add_space(self.theme.spacing);
                });
            });
    }

    fn show_empty_state(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(100.0);

            ui.label(
                RichText::new("Penchat")
                    .size(24.0)
                    .color(self.theme.text_primary),
            );

            ui.add_space(self.theme.spacing);

            ui.label(
                RichText::new("Type a message or tap the microphone to start talking.")
                    .size(14.0)
                    .color(self.theme.text_muted),
            );
        });
    }

    fn show_message(&self, ui: &mut egui::Ui, message: &Message) {
        let is_user = matches!(message.sender, Sender::User);
        let bubble_color = if is_user {
            self.theme.user_bubble
        } else {
            self.theme.bot_bubble
        };
        let text_color = if is_user {
            Color32::WHITE
        } else {
            self.theme.text_primary
        };

        let align = if is_user { Align::RIGHT } else { Align::LEFT };

        ui.with_layout(egui::Layout::top_down(align), |ui| {
            ui.label(
                RichText::new(if is_user { "You" } else { "Bot" })
                    .size(12.0)
                    .color(self.theme.text_muted),
            );

            ui.add_space(2.0);

            let max_width = ui.available_width() * 0.75;

            egui::Frame::none()
                .fill(bubble_color)
                .rounding(self.theme.bubble_rounding)
                .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                .show(ui, |ui| {
                    ui.set_max_width(max_width);

                    match &message.content {
                        MessageContent::Text(text) => {
                            ui.label(RichText::new(text).color(text_color));
                        }
                        MessageContent::Audio(audio) => {
                            self.show_audio_message(ui, audio, text_color);
                        }
                        MessageContent::Image(image) => {
                            self.show_image_message(ui, image, text_color);
                        }
                    }
                });

            let time_str = message.timestamp.format("%H:%M").to_string();
            ui.label(
                RichText::new(time_str)
                    .size(10.0)
                    .color(self.theme.text_muted),
            );
        });
    }

    fn show_audio_message(&self, ui: &mut egui::Ui, audio: &AudioAttachment, text_color: Color32) {
        ui.horizontal(|ui| {
            let play_btn = ui.add(
                egui::Button::new(RichText::new("▶").size(16.0).color(text_color))
                    .min_size(Vec2::splat(32.0)),
            );

            if play_btn.clicked() {
                match &audio.source {
                    AudioSource::Remote(url) => self.state.play_remote(url.clone()),
                    AudioSource::Clip(clip) => self.state.play_clip(clip.clone()),
                }
            }

            ui.vertical(|ui| {
                ui.label(RichText::new("Voice message").color(text_color).strong());

                if let AudioSource::Clip(clip) = &audio.source {
                    ui.label(
                        RichText::new(format!("{:.1}s", clip.duration_seconds()))
                            .size(12.0)
                            .color(text_color.gamma_multiply(0.8)),
                    );
                }
            });

            if let AudioSource::Clip(clip) = &audio.source {
                let (rect, _) = ui.allocate_exact_size(Vec2::new(80.0, 24.0), Sense::hover());
                self.draw_mini_waveform(ui, rect, clip);
            }
        });
    }

    fn draw_mini_waveform(&self, ui: &mut egui::Ui, rect: Rect, clip: &AudioClip) {
        let painter = ui.painter();
        painter.rect_filled(rect, 4.0, self.theme.bg_tertiary);

        let samples = &clip.samples;
        if samples.is_empty() {
            return;
        }

        let bar_count = 20;
        let samples_per_bar = samples.len() / bar_count;
        if samples_per_bar == 0 {
            return;
        }

        let bar_width = rect.width() / bar_count as f32;
        let center_y = rect.center().y;
        let max_height = rect.height() * 0.8;

        for i in 0..bar_count {
            let start = i * samples_per_bar;
            let end = (start + samples_per_bar).min(samples.len());

            let rms: f32 =
                samples[start..end].iter().map(|s| s * s).sum::<f32>() / (end - start) as f32;
            let rms = rms.sqrt();

            let height = (rms * max_height * 4.0).min(max_height);
            let x = rect.left() + i as f32 * bar_width + bar_width * 0.5;

            painter.line_segment(
                [
                    Pos2::new(x, center_y - height / 2.0),
                    Pos2::new(x, center_y + height / 2.0),
                ],
                egui::Stroke::new(2.0, self.theme.primary),
            );
        }
    }

    fn show_image_message(&self, ui: &mut egui::Ui, image: &ImageData, text_color: Color32) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("🖼").size(24.0));
            ui.vertical(|ui| {
                ui.label(RichText::new(&image.name).color(text_color).strong());
                ui.label(
                    RichText::new(format!("{} · {} KiB", image.format, image.data.len() / 1024))
                        .size(11.0)
                        .color(text_color.gamma_multiply(0.7)),
                );
            });
        });
    }
}

//! Main application struct and eframe integration.

use crate::ui::components::{InputBar, MessageList};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, CentralPanel, RichText, TopBottomPanel};

pub struct PenchatApp {
    state: AppState,
    theme: Theme,
    /// Whether the stored conversation has been requested.
    history_requested: bool,
}

impl PenchatApp {
    pub fn new(cc: &eframe::CreationContext<'_>, state: AppState) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);

        // Let background dispatch tasks wake the frame loop.
        state.view().attach_repaint(cc.egui_ctx.clone());

        Self {
            state,
            theme,
            history_requested: false,
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("header")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .inner_margin(12.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("Penchat")
                            .size(20.0)
                            .strong()
                            .color(self.theme.text_primary),
                    );

                    ui.label(
                        RichText::new("Voice Chat")
                            .size(14.0)
                            .color(self.theme.text_muted),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if self.state.is_recording() {
                            ui.label(
                                RichText::new("● REC")
                                    .size(12.0)
                                    .color(self.theme.recording),
                            );
                        }

                        // Status line for the most recent failure.
                        if let Some(message) = self.state.view().last_error() {
                            ui.label(
                                RichText::new(message).size(12.0).color(self.theme.error),
                            );
                        }
                    });
                });
            });
    }

    fn show_input_area(&mut self, ctx: &egui::Context) {
        TopBottomPanel::bottom("input_area")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                InputBar::new(&mut self.state, &self.theme).show(ui);
            });
    }

    fn show_content(&mut self, ctx: &egui::Context) {
        CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.bg_primary))
            .show(ctx, |ui| {
                MessageList::new(&self.state, &self.theme).show(ui);
            });
    }

    /// Display any image files dropped onto the window.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            if let Some(path) = file.path {
                self.state.attach_image(&path);
            }
        }
    }
}

impl eframe::App for PenchatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.history_requested {
            self.state.load_history();
            self.history_requested = true;
        }

        self.state.poll();
        self.handle_dropped_files(ctx);

        self.show_header(ctx);
        self.show_input_area(ctx);
        self.show_content(ctx);

        // Keep pumping captured audio fragments while recording.
        if self.state.is_recording() {
            ctx.request_repaint();
        }
    }
}

use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{HostAction, Outcome, Step, ViewportMark};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::reducer::{StepMarker, ViewModel};

const VIEWPORT_SIZE: egui::Vec2 = egui::vec2(480.0, 270.0);

pub struct LivenessApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    view: ViewModel,
    notice: String,
    last_error: Option<UiError>,
}

impl LivenessApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            view: ViewModel::default(),
            notice: String::new(),
            last_error: None,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => self.notice = message,
                UiEvent::Session(event) => self.view.apply(&event),
                UiEvent::Error(err) => {
                    tracing::warn!(context = ?err.context(), "ui error: {}", err.message());
                    self.last_error = Some(err);
                }
            }
        }
    }

    fn send_action(&mut self, action: HostAction) {
        if matches!(
            action,
            HostAction::PlaceholderClicked | HostAction::RetryClicked
        ) {
            self.last_error = None;
        }
        dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Action(action),
            &mut self.notice,
        );
    }

    fn viewport_fill(&self) -> egui::Color32 {
        match self.view.viewport {
            ViewportMark::Idle => egui::Color32::from_gray(40),
            ViewportMark::Active => egui::Color32::from_rgb(20, 32, 48),
            ViewportMark::Success => egui::Color32::from_rgb(18, 64, 36),
            ViewportMark::Error => egui::Color32::from_rgb(72, 22, 22),
        }
    }

    fn show_viewport(&mut self, ui: &mut egui::Ui) {
        let (rect, response) = ui.allocate_exact_size(VIEWPORT_SIZE, egui::Sense::click());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 8.0, self.viewport_fill());

        if !self.view.camera_visible() {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "\u{1f4f7}  Click to enable camera",
                egui::FontId::proportional(18.0),
                egui::Color32::LIGHT_GRAY,
            );
            if response.clicked() {
                self.send_action(HostAction::PlaceholderClicked);
            }
            return;
        }

        painter.text(
            rect.left_top() + egui::vec2(12.0, 12.0),
            egui::Align2::LEFT_TOP,
            "simulated camera",
            egui::FontId::proportional(12.0),
            egui::Color32::GRAY,
        );
        if self.view.face_guide_visible {
            let guide_color = match self.view.viewport {
                ViewportMark::Success => egui::Color32::from_rgb(80, 200, 120),
                ViewportMark::Error => egui::Color32::from_rgb(220, 80, 80),
                _ => egui::Color32::from_rgb(120, 170, 255),
            };
            painter.circle_stroke(
                rect.center(),
                rect.height() * 0.35,
                egui::Stroke::new(3.0, guide_color),
            );
        }
    }

    fn show_steps(&self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("Steps").strong());
        ui.add_space(4.0);
        for step in Step::ALL {
            let marker = self.view.marker(step);
            let text = format!("{}  {}", marker.glyph(), step.label());
            let text = match marker {
                StepMarker::Active => egui::RichText::new(text).strong(),
                StepMarker::Completed => egui::RichText::new(text).weak(),
                StepMarker::Pending => egui::RichText::new(text),
            };
            ui.label(text);
        }
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) {
        let controls = self.view.controls;
        ui.horizontal(|ui| {
            if controls.start_visible
                && ui
                    .add_enabled(
                        controls.start_enabled,
                        egui::Button::new("Start Verification"),
                    )
                    .clicked()
            {
                self.send_action(HostAction::StartClicked);
            }
            if controls.retry_visible && ui.button("Try Again").clicked() {
                self.send_action(HostAction::RetryClicked);
            }
        });
    }

    fn show_result_modal(&mut self, ctx: &egui::Context) {
        let Some(result) = self.view.result.clone() else {
            return;
        };

        let (title, default_body) = match result.outcome {
            Outcome::Success => ("Verification successful", "Your identity has been verified."),
            Outcome::Failure => (
                "Verification failed",
                "We could not verify your identity. Please try again.",
            ),
        };
        let body = result.message.as_deref().unwrap_or(default_body);

        let mut close_requested = false;
        egui::Window::new("verification_result")
            .title_bar(false)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.heading(title);
                ui.add_space(6.0);
                ui.label(body);
                ui.add_space(10.0);
                if ui.button("Close").clicked() {
                    close_requested = true;
                }
            });

        if close_requested {
            self.send_action(HostAction::CloseClicked);
        }
    }
}

impl eframe::App for LivenessApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::bottom("status_strip").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.label(self.view.status.as_str());
            ui.add(
                egui::ProgressBar::new(f32::from(self.view.progress) / 100.0).show_percentage(),
            );
            if let Some(err) = &self.last_error {
                ui.colored_label(egui::Color32::from_rgb(220, 80, 80), err.message());
                if err.is_recoverable_by_user() {
                    ui.small("Click the camera area to try again.");
                }
            } else if !self.notice.is_empty() {
                ui.small(egui::RichText::new(&self.notice).weak());
            }
            ui.add_space(4.0);
        });

        egui::SidePanel::right("steps_panel")
            .resizable(false)
            .min_width(180.0)
            .show(ctx, |ui| self.show_steps(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Face verification");
            ui.add_space(8.0);
            self.show_viewport(ui);
            ui.add_space(8.0);
            self.show_controls(ui);
        });

        self.show_result_modal(ctx);

        if self.view.controls.start_visible && !self.view.controls.start_enabled {
            ctx.request_repaint_after(Duration::from_millis(250));
        } else {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

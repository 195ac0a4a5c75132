//! Main window: image picker, diagnose button and the panels below.

mod results;
mod settings;

use eframe::{App, Frame, egui};
use plant_core::upload::{SUPPORTED_EXTENSIONS, is_supported_image};
use plant_core::{AppConfig, Presenter, UploadedImage};
use rfd::FileDialog;
use std::path::Path;
use std::time::Duration;

const PREVIEW_MAX: f32 = 360.0;
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Panel {
    Diagnose,
    Settings,
}

pub struct UiApp {
    presenter: Presenter,
    config: AppConfig,
    panel: Panel,
    status: String,
    pending_threshold: f32,
    app_version: &'static str,
    /// URI of the preview handed to the image loaders last frame.
    shown_preview: Option<String>,
}

impl UiApp {
    pub fn new(presenter: Presenter, config: AppConfig) -> Self {
        let pending_threshold = config.low_confidence_threshold;
        Self {
            presenter,
            config,
            panel: Panel::Diagnose,
            status: String::new(),
            pending_threshold,
            app_version: env!("PLANT_DOCTOR_VERSION"),
            shown_preview: None,
        }
    }

    fn pick_image(&mut self) {
        let Some(path) = FileDialog::new()
            .add_filter("Images", &SUPPORTED_EXTENSIONS)
            .set_directory(".")
            .pick_file()
        else {
            return;
        };
        self.load_image(&path);
    }

    fn load_image(&mut self, path: &Path) {
        if !is_supported_image(path) {
            self.status = format!("Unsupported file type: {}", path.display());
            return;
        }
        match UploadedImage::from_path(path) {
            Ok(image) => {
                self.status = format!("Selected {}", image.name);
                self.presenter.select_image(Some(image));
            }
            Err(e) => {
                tracing::warn!("Failed to read image {}: {e}", path.display());
                self.status = format!("Could not read {}: {e}", path.display());
                self.presenter.select_image(None);
            }
        }
    }

    fn render_preview(&self, ui: &mut egui::Ui) {
        if let Some(image) = self.presenter.image() {
            let bytes = egui::load::Bytes::Shared(image.bytes.clone());
            ui.add(
                egui::Image::from_bytes(image.preview_uri(), bytes)
                    .max_width(PREVIEW_MAX)
                    .max_height(PREVIEW_MAX),
            );
        }
    }

    /// Drop the cached decode of a preview that is no longer selected.
    fn release_stale_preview(&mut self, ctx: &egui::Context) {
        let current = self.presenter.image().map(UploadedImage::preview_uri);
        if let Some(old) = swap_preview(&mut self.shown_preview, current) {
            ctx.forget_image(&old);
        }
    }

    fn render_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = self.presenter.alert().map(str::to_owned) else {
            return;
        };
        let modal = egui::Modal::new(egui::Id::new("alert")).show(ctx, |ui| {
            ui.set_max_width(320.0);
            ui.label(message.as_str());
            ui.add_space(8.0);
            ui.button("OK").clicked()
        });
        if modal.inner || modal.should_close() {
            self.presenter.dismiss_alert();
        }
    }
}

impl App for UiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.presenter.poll();
        self.release_stale_preview(ctx);

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Choose image...").clicked() {
                    self.pick_image();
                }

                let label = self.presenter.diagnose_label();
                if ui
                    .add_enabled(self.presenter.diagnose_enabled(), egui::Button::new(label))
                    .clicked()
                {
                    self.presenter.request_diagnosis();
                }

                ui.separator();
                ui.selectable_value(&mut self.panel, Panel::Diagnose, "Diagnose");
                ui.selectable_value(&mut self.panel, Panel::Settings, "Settings");

                if !self.status.is_empty() {
                    ui.label(&self.status);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.panel {
            Panel::Diagnose => {
                egui::ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .show(ui, |ui| {
                        if let Some(message) = self.presenter.load_error() {
                            ui.colored_label(ui.visuals().error_fg_color, message);
                            ui.add_space(8.0);
                        }
                        self.render_preview(ui);
                        ui.add_space(12.0);
                        results::render_results(ui, self.presenter.results());
                    });
            }
            Panel::Settings => self.render_settings_panel(ui),
        });

        self.render_alert(ctx);

        if self.presenter.needs_polling() {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
    }
}

/// Record `current` as shown and return the URI it replaces, if any.
fn swap_preview(shown: &mut Option<String>, current: Option<String>) -> Option<String> {
    if *shown == current {
        return None;
    }
    std::mem::replace(shown, current)
}

//! Settings panel: classifier details, knowledge base coverage and the
//! low-confidence threshold.

use super::{Panel, UiApp};
use eframe::egui;
use plant_core::{KnowledgeState, LowConfidencePolicy};

impl UiApp {
    /// Renders the settings screen.
    pub(super) fn render_settings_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Settings");
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            let slider = egui::Slider::new(&mut self.pending_threshold, 0.0..=1.0)
                .text("Low-confidence threshold")
                .custom_formatter(|v, _| format!("{:.0}%", v * 100.0));
            ui.add(slider);
            if ui.button("Apply").clicked() {
                let policy = LowConfidencePolicy {
                    threshold: self.pending_threshold,
                    count: self.config.alternatives,
                };
                self.presenter.set_policy(policy);
                self.status = format!(
                    "Low-confidence threshold applied: {:.0}%",
                    policy.threshold * 100.0
                );
                self.panel = Panel::Diagnose;
            }
        });
        ui.label("Predictions below this confidence list alternative diagnoses.");

        ui.add_space(12.0);
        ui.separator();
        ui.add_space(6.0);
        ui.heading("Classifier");
        let classifier = self.presenter.service().classifier();
        ui.label(format!("Backend: {}", classifier.name()));
        ui.label(format!("Classes: {}", classifier.labels().len()));
        if classifier.is_simulated() {
            ui.label(format!(
                "Simulated predictions are random and take {} ms.",
                self.config.simulated_delay_ms
            ));
        } else {
            ui.label(format!("Model: {}", self.config.model_path.display()));
            ui.label(format!("Input size: {}px", self.config.input_size));
        }

        ui.add_space(12.0);
        ui.separator();
        ui.add_space(6.0);
        ui.heading("Knowledge base");
        ui.label(format!("File: {}", self.config.knowledge_base.display()));
        match self.presenter.knowledge() {
            KnowledgeState::Loading(_) => {
                ui.label("Loading...");
            }
            KnowledgeState::Failed(e) => {
                ui.colored_label(ui.visuals().error_fg_color, format!("Failed to load: {e}"));
            }
            KnowledgeState::Ready(kb) => {
                ui.label(format!("Entries: {}", kb.len()));
                let missing = kb.missing_labels(classifier.labels());
                if missing.is_empty() {
                    ui.label("Every class has advice.");
                } else {
                    ui.label(format!("{} classes without advice:", missing.len()));
                    for label in missing {
                        ui.label(format!("• {}", label.display()));
                    }
                }
            }
        }

        ui.add_space(16.0);
        ui.separator();
        ui.add_space(6.0);
        ui.label(format!("App version: {}", self.app_version));
    }
}

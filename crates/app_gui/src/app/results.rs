//! Results region: diagnosis fields plus low-confidence alternatives.

use eframe::egui;
use plant_core::presenter::PROCESSING;
use plant_core::{Diagnosis, ResultsView};

const PENDING: &str = "...";

/// Text for each field of the results region.
#[derive(Debug, PartialEq)]
struct ResultFields<'a> {
    plant: &'a str,
    disease: &'a str,
    confidence: &'a str,
    advice: &'a str,
    medicine: &'a str,
    alternatives: Vec<String>,
}

fn result_fields(view: &ResultsView) -> Option<ResultFields<'_>> {
    match view {
        ResultsView::Hidden => None,
        ResultsView::Processing => Some(ResultFields {
            plant: PROCESSING,
            disease: PROCESSING,
            confidence: PENDING,
            advice: PENDING,
            medicine: PENDING,
            alternatives: Vec::new(),
        }),
        ResultsView::Ready(d) => Some(ready_fields(d)),
    }
}

fn ready_fields(d: &Diagnosis) -> ResultFields<'_> {
    ResultFields {
        plant: &d.plant_name,
        disease: &d.disease_name,
        confidence: &d.confidence_text,
        advice: &d.advice,
        medicine: &d.medicine,
        alternatives: d.alternatives.iter().map(|l| l.display()).collect(),
    }
}

pub(super) fn render_results(ui: &mut egui::Ui, view: &ResultsView) {
    let Some(fields) = result_fields(view) else {
        return;
    };
    ui.heading("Diagnosis");
    ui.add_space(6.0);
    egui::Grid::new("diagnosis-fields")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.strong("Plant");
            ui.label(fields.plant);
            ui.end_row();
            ui.strong("Disease");
            ui.label(fields.disease);
            ui.end_row();
            ui.strong("Confidence");
            ui.label(fields.confidence);
            ui.end_row();
        });

    ui.add_space(10.0);
    ui.strong("Advice");
    ui.label(egui::RichText::new(fields.advice).monospace());
    ui.add_space(6.0);
    ui.strong("Medicine");
    ui.label(egui::RichText::new(fields.medicine).monospace());

    if !fields.alternatives.is_empty() {
        ui.add_space(10.0);
        ui.strong("Alternative Possibilities (Low Confidence):");
        for alt in &fields.alternatives {
            ui.label(format!("• {alt}"));
        }
    }
}

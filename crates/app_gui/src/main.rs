mod app;

use anyhow::{Context, Result};
use app::UiApp;
use directories_next::ProjectDirs;
use eframe::{NativeOptions, egui};
use plant_core::{AppConfig, DiagnosisService, KnowledgeBase, Presenter};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const CONFIG_FILE: &str = "plant_doctor.toml";
const CONFIG_ENV: &str = "PLANT_DOCTOR_CONFIG";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    if let Err(e) = run() {
        tracing::error!("{e:#}");
        eprintln!("Application stopped with error: {e:#}");
    }
}

fn run() -> Result<()> {
    let cwd = std::env::current_dir().context("current directory unavailable")?;
    let user_dir = ProjectDirs::from("org", "PlantDoctor", "PlantDoctor")
        .map(|dirs| dirs.config_dir().to_path_buf());
    let config = match find_config(std::env::var_os(CONFIG_ENV), &cwd, user_dir.as_deref()) {
        Some(path) => {
            tracing::info!("Using config {}", path.display());
            AppConfig::load(&path).with_context(|| format!("invalid config {}", path.display()))?
        }
        None => {
            tracing::info!("No {CONFIG_FILE} found; using defaults");
            AppConfig::default()
        }
    };

    let classifier = config
        .build_classifier()
        .context("classifier could not be initialised")?;
    tracing::info!("Classifier backend: {}", classifier.name());
    let knowledge = KnowledgeBase::load_in_background(
        config.knowledge_base.clone(),
        classifier.labels().clone(),
    );
    let presenter = Presenter::new(DiagnosisService::new(classifier, config.policy()), knowledge);
    let app = UiApp::new(presenter, config);

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([900.0, 720.0]),
        ..NativeOptions::default()
    };
    eframe::run_native(
        "Plant Doctor",
        options,
        Box::new(|cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

/// First existing config: the env override, then the working directory,
/// then the per-user config directory.
fn find_config(env: Option<OsString>, cwd: &Path, user_dir: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = env {
        // an explicit override is used even if missing so the error surfaces
        return Some(PathBuf::from(path));
    }
    let local = cwd.join(CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    user_dir
        .map(|dir| dir.join(CONFIG_FILE))
        .filter(|p| p.is_file())
}

use crate::alternatives::LowConfidencePolicy;
use crate::classifier::{Classifier, SimulatedClassifier};
use crate::error::{Error, Result};
use crate::labels::LabelSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound for `alternatives`; more would not fit on the results panel.
pub const MAX_ALTERNATIVES: usize = 10;

/// Which classifier implementation to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Simulated,
    Onnx,
}

/// Settings read from `plant_doctor.toml`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub knowledge_base: PathBuf,
    pub backend: Backend,
    pub simulated_delay_ms: u64,
    pub model_path: PathBuf,
    /// One label per line, in model output order. Built-in list when unset.
    pub labels_path: Option<PathBuf>,
    pub input_size: u32,
    pub low_confidence_threshold: f32,
    pub alternatives: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            knowledge_base: PathBuf::from("assets/knowledge_base.json"),
            backend: Backend::Simulated,
            simulated_delay_ms: 1000,
            model_path: PathBuf::from("models/plant_village.onnx"),
            labels_path: None,
            input_size: 224,
            low_confidence_threshold: 0.75,
            alternatives: 2,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`. Relative paths inside the file resolve against the
    /// file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&raw)?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        Ok(config)
    }

    fn rebase(&mut self, base: &Path) {
        let join = |p: &Path| {
            if p.is_relative() {
                base.join(p)
            } else {
                p.to_path_buf()
            }
        };
        self.knowledge_base = join(&self.knowledge_base);
        self.model_path = join(&self.model_path);
        self.labels_path = self.labels_path.as_deref().map(join);
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.low_confidence_threshold) {
            return Err(Error::Config(format!(
                "low_confidence_threshold must be within [0, 1], got {}",
                self.low_confidence_threshold
            )));
        }
        if self.alternatives > MAX_ALTERNATIVES {
            return Err(Error::Config(format!(
                "alternatives must be at most {MAX_ALTERNATIVES}, got {}",
                self.alternatives
            )));
        }
        if self.input_size == 0 {
            return Err(Error::Config("input_size must be positive".into()));
        }
        Ok(())
    }

    pub fn policy(&self) -> LowConfidencePolicy {
        LowConfidencePolicy {
            threshold: self.low_confidence_threshold,
            count: self.alternatives,
        }
    }

    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }

    pub fn labels(&self) -> Result<LabelSet> {
        match &self.labels_path {
            Some(path) => LabelSet::from_lines(&fs::read_to_string(path)?),
            None => Ok(LabelSet::plant_village()),
        }
    }

    pub fn build_classifier(&self) -> Result<Arc<dyn Classifier>> {
        let labels = self.labels()?;
        match self.backend {
            Backend::Simulated => {
                tracing::warn!("Using SIMULATED classifier; predictions are random.");
                Ok(Arc::new(SimulatedClassifier::new(labels, self.simulated_delay())))
            }
            Backend::Onnx => self.build_onnx(labels),
        }
    }

    #[cfg(feature = "ort")]
    fn build_onnx(&self, labels: LabelSet) -> Result<Arc<dyn Classifier>> {
        let clf = crate::onnx::OnnxClassifier::new(&self.model_path, labels, self.input_size)?;
        Ok(Arc::new(clf))
    }

    #[cfg(not(feature = "ort"))]
    fn build_onnx(&self, _labels: LabelSet) -> Result<Arc<dyn Classifier>> {
        Err(Error::Config(
            "backend \"onnx\" requires building with the `ort` feature".into(),
        ))
    }
}

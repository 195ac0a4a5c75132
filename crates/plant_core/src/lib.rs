//! Plant disease diagnosis core: label enumeration, knowledge base,
//! classifier backends and the state behind the diagnose screen.

pub mod alternatives;
pub mod classifier;
pub mod config;
pub mod diagnosis;
pub mod error;
pub mod job;
pub mod knowledge;
pub mod labels;
#[cfg(feature = "ort")]
pub mod onnx;
pub mod presenter;
pub mod upload;

pub use alternatives::LowConfidencePolicy;
pub use classifier::{Classifier, Prediction, SimulatedClassifier};
pub use config::{AppConfig, Backend};
pub use diagnosis::{Diagnosis, DiagnosisService, format_confidence};
pub use error::{Error, Result};
pub use job::Job;
pub use knowledge::{Advice, KnowledgeBase, KnowledgeEntry};
pub use labels::{ClassLabel, LabelSet, PLANT_VILLAGE_CLASSES};
#[cfg(feature = "ort")]
pub use onnx::OnnxClassifier;
pub use presenter::{KnowledgeState, Presenter, ResultsView};
pub use upload::UploadedImage;

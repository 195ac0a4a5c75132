use crate::alternatives::LowConfidencePolicy;
use crate::classifier::{Classifier, Prediction};
use crate::error::{Error, Result};
use crate::job::Job;
use crate::knowledge::KnowledgeBase;
use crate::labels::ClassLabel;
use crate::upload::UploadedImage;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex};

/// Everything the results region shows for one diagnosis.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosis {
    pub label: ClassLabel,
    pub plant_name: String,
    pub disease_name: String,
    pub confidence: f32,
    pub confidence_text: String,
    pub advice: String,
    pub medicine: String,
    /// Other candidates, only filled for low-confidence predictions.
    pub alternatives: Vec<ClassLabel>,
}

impl Diagnosis {
    pub fn render(
        prediction: &Prediction,
        alternatives: Vec<ClassLabel>,
        knowledge: &KnowledgeBase,
    ) -> Self {
        let advice = knowledge.lookup(&prediction.label);
        if !advice.found {
            tracing::warn!("No knowledge base entry for {}", prediction.label);
        }
        Self {
            label: prediction.label.clone(),
            plant_name: prediction.label.plant(),
            disease_name: prediction.label.condition(),
            confidence: prediction.confidence,
            confidence_text: format_confidence(prediction.confidence),
            advice: advice.advice,
            medicine: advice.medicine,
            alternatives,
        }
    }
}

/// `0.8123` -> `81.23%`.
pub fn format_confidence(confidence: f32) -> String {
    format!("{:.2}%", confidence * 100.0)
}

/// Runs a classifier and turns its prediction into a [`Diagnosis`].
#[derive(Clone)]
pub struct DiagnosisService {
    classifier: Arc<dyn Classifier>,
    policy: LowConfidencePolicy,
    rng: Arc<Mutex<StdRng>>,
}

impl DiagnosisService {
    pub fn new(classifier: Arc<dyn Classifier>, policy: LowConfidencePolicy) -> Self {
        Self {
            classifier,
            policy,
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
        }
    }

    pub fn with_seed(
        classifier: Arc<dyn Classifier>,
        policy: LowConfidencePolicy,
        seed: u64,
    ) -> Self {
        Self {
            classifier,
            policy,
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn policy(&self) -> LowConfidencePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: LowConfidencePolicy) {
        self.policy = policy;
    }

    /// Classify `image` and render the result. Blocks for as long as the
    /// classifier does.
    pub fn diagnose(&self, image: &UploadedImage, knowledge: &KnowledgeBase) -> Result<Diagnosis> {
        let prediction = self.classifier.predict(image)?;
        let labels = self.classifier.labels();
        let alternatives = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| Error::Inference("alternatives rng poisoned".into()))?;
            self.policy
                .pick(&mut *rng, prediction.index, prediction.confidence, labels.len())
        };
        let alternatives: Vec<ClassLabel> = alternatives
            .into_iter()
            .filter_map(|i| labels.get(i).cloned())
            .collect();
        if !alternatives.is_empty() {
            tracing::warn!(
                "Low confidence {:.3} for {}; offering {} alternatives",
                prediction.confidence,
                prediction.label,
                alternatives.len()
            );
        }
        Ok(Diagnosis::render(&prediction, alternatives, knowledge))
    }

    /// Run [`Self::diagnose`] on a worker thread.
    pub fn spawn(&self, image: UploadedImage, knowledge: Arc<KnowledgeBase>) -> Job<Diagnosis> {
        let service = self.clone();
        Job::spawn("diagnosis", move || service.diagnose(&image, &knowledge))
    }
}

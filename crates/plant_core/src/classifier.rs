use crate::error::{Error, Result};
use crate::labels::{ClassLabel, LabelSet};
use crate::upload::UploadedImage;
use image::{DynamicImage, imageops::FilterType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;

/// Lower bound (inclusive) of simulated confidences.
pub const SIMULATED_CONFIDENCE_MIN: f32 = 0.65;
/// Upper bound (exclusive) of simulated confidences.
pub const SIMULATED_CONFIDENCE_MAX: f32 = 0.99;
/// Fixed time a simulated prediction takes.
pub const SIMULATED_DELAY: Duration = Duration::from_millis(1000);

/// Classifier output for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Position of `label` in the classifier's label set.
    pub index: usize,
    pub label: ClassLabel,
    /// Confidence in [0,1].
    pub confidence: f32,
}

/// Anything that turns an uploaded image into a [`Prediction`].
///
/// `predict` may block; callers run it off the UI thread.
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    fn labels(&self) -> &LabelSet;

    fn predict(&self, image: &UploadedImage) -> Result<Prediction>;

    /// True for backends that never look at the image.
    fn is_simulated(&self) -> bool {
        false
    }
}

/// Stand-in classifier that ignores the image and picks a random label.
pub struct SimulatedClassifier {
    labels: LabelSet,
    delay: Duration,
    rng: Mutex<StdRng>,
}

impl SimulatedClassifier {
    pub fn new(labels: LabelSet, delay: Duration) -> Self {
        Self {
            labels,
            delay,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic variant for tests and reproducible demos.
    pub fn with_seed(labels: LabelSet, delay: Duration, seed: u64) -> Self {
        Self {
            labels,
            delay,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for SimulatedClassifier {
    fn default() -> Self {
        Self::new(LabelSet::plant_village(), SIMULATED_DELAY)
    }
}

impl Classifier for SimulatedClassifier {
    fn name(&self) -> &str {
        "simulated"
    }

    fn labels(&self) -> &LabelSet {
        &self.labels
    }

    fn predict(&self, image: &UploadedImage) -> Result<Prediction> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let (index, confidence) = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| Error::Inference("simulated rng poisoned".into()))?;
            let index = rng.gen_range(0..self.labels.len());
            let confidence = rng.gen_range(SIMULATED_CONFIDENCE_MIN..SIMULATED_CONFIDENCE_MAX);
            (index, confidence)
        };
        let label = self
            .labels
            .get(index)
            .cloned()
            .ok_or_else(|| Error::Inference(format!("label index {index} out of range")))?;
        tracing::debug!(
            "Simulated prediction for {}: {label} ({confidence:.3})",
            image.name
        );
        Ok(Prediction {
            index,
            label,
            confidence,
        })
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

/// Highest score and its index. Ties keep the first index; NaN never wins.
pub fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, best_score)) if score > best_score => best = Some((idx, score)),
            None => best = Some((idx, score)),
            _ => {}
        }
    }
    best
}

/// Map a score vector onto a prediction for `labels`.
pub fn prediction_from_scores(labels: &LabelSet, scores: &[f32]) -> Result<Prediction> {
    if scores.len() != labels.len() {
        return Err(Error::ClassCountMismatch {
            expected: labels.len(),
            actual: scores.len(),
        });
    }
    let (index, confidence) =
        argmax(scores).ok_or_else(|| Error::Inference("model returned no usable scores".into()))?;
    let label = labels
        .get(index)
        .cloned()
        .ok_or_else(|| Error::Inference(format!("label index {index} out of range")))?;
    Ok(Prediction {
        index,
        label,
        confidence,
    })
}

/// Resize to `size`x`size` (nearest neighbour) and lay out as NHWC floats in
/// [0,1], i.e. a `[1, size, size, 3]` tensor flattened row by row.
pub fn preprocess(img: &DynamicImage, size: u32) -> Vec<f32> {
    let resized = img.resize_exact(size, size, FilterType::Nearest).to_rgb8();
    resized
        .pixels()
        .flat_map(|p| p.0)
        .map(|channel| channel as f32 / 255.0)
        .collect()
}

//! ONNX Runtime backed classifier. Built with the `ort` feature.

use crate::classifier::{Classifier, Prediction, prediction_from_scores, preprocess};
use crate::error::{Error, Result};
use crate::labels::LabelSet;
use crate::upload::UploadedImage;
use ndarray::{Array, CowArray, Ix4};
use ort::{
    GraphOptimizationLevel, SessionBuilder, environment::Environment, session::Session,
    tensor::OrtOwnedTensor, value::Value,
};
use std::path::Path;
use std::sync::Arc;

fn ort_error(e: ort::OrtError) -> Error {
    Error::Inference(e.to_string())
}

/// Image classifier whose output index `i` corresponds to label `i`.
pub struct OnnxClassifier {
    // keeps the runtime alive for the session
    _env: Arc<Environment>,
    session: Session,
    labels: LabelSet,
    input_size: u32,
}

impl OnnxClassifier {
    pub fn new(model_path: &Path, labels: LabelSet, input_size: u32) -> Result<Self> {
        if !model_path.exists() {
            return Err(Error::Config(format!(
                "model file missing: {}",
                model_path.display()
            )));
        }
        let env = Environment::builder()
            .with_name("plant-doctor")
            .build()
            .map_err(ort_error)?
            .into_arc();
        let session = SessionBuilder::new(&env)
            .map_err(ort_error)?
            .with_optimization_level(GraphOptimizationLevel::Level1)
            .map_err(ort_error)?
            .with_model_from_file(model_path)
            .map_err(ort_error)?;
        tracing::info!(
            "ONNX model loaded from {} ({} labels, input {input_size}px)",
            model_path.display(),
            labels.len()
        );
        Ok(Self {
            _env: env,
            session,
            labels,
            input_size,
        })
    }

    fn input_tensor(&self, image: &UploadedImage) -> Result<Array<f32, Ix4>> {
        let decoded = image::load_from_memory(&image.bytes)?;
        let size = self.input_size as usize;
        Array::from_shape_vec((1, size, size, 3), preprocess(&decoded, self.input_size))
            .map_err(|e| Error::Inference(format!("could not shape input tensor: {e}")))
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        "onnx"
    }

    fn labels(&self) -> &LabelSet {
        &self.labels
    }

    fn predict(&self, image: &UploadedImage) -> Result<Prediction> {
        let input = self.input_tensor(image)?.into_dyn();
        let cow = CowArray::from(input.view());
        let value = Value::from_array(self.session.allocator(), &cow).map_err(ort_error)?;
        let outputs: Vec<Value> = self.session.run(vec![value]).map_err(ort_error)?;
        let first = outputs
            .first()
            .ok_or_else(|| Error::Inference("model produced no output".into()))?;
        let scores: OrtOwnedTensor<f32, _> = first.try_extract().map_err(ort_error)?;
        let scores: Vec<f32> = scores.view().iter().copied().collect();
        let prediction = prediction_from_scores(&self.labels, &scores)?;
        tracing::debug!(
            "ONNX prediction for {}: {} ({:.3})",
            image.name,
            prediction.label,
            prediction.confidence
        );
        Ok(prediction)
    }
}

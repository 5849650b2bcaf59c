//! Classifier adapter: turns an uploaded X-ray into a (label, confidence)
//! prediction.
//!
//! The model itself is opaque: anything implementing [`Classifier`] maps a
//! fixed-size normalized tensor to one score per [`Label`]. With the
//! `onnx-classifier` feature, [`OnnxClassifier`] runs an exported model via
//! ONNX Runtime.

pub mod preprocess;

#[cfg(feature = "onnx-classifier")]
pub mod onnx;

pub use preprocess::*;

#[cfg(feature = "onnx-classifier")]
pub use onnx::OnnxClassifier;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::care::Label;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Image rejected: {0}")]
    InvalidImage(String),

    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    #[error("Classifier model not found at {0}")]
    ModelNotFound(PathBuf),

    #[error("Classifier initialization failed: {0}")]
    ModelInit(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Expected {expected} class scores, got {actual}")]
    OutputShape { expected: usize, actual: usize },

    #[error("Classifier produced a non-finite score")]
    NonFiniteScore,
}

/// One score per label, in [`Label::ALL`] order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityVector(Vec<f32>);

impl ProbabilityVector {
    pub fn new(scores: Vec<f32>) -> Self {
        Self(scores)
    }

    pub fn scores(&self) -> &[f32] {
        &self.0
    }

    /// Arg-max label with its score as a percentage.
    pub fn top(&self) -> Result<Prediction, ClassifierError> {
        if self.0.len() != Label::ALL.len() {
            return Err(ClassifierError::OutputShape {
                expected: Label::ALL.len(),
                actual: self.0.len(),
            });
        }
        if self.0.iter().any(|s| !s.is_finite()) {
            return Err(ClassifierError::NonFiniteScore);
        }

        let (index, score) = self
            .0
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, s)| if s > best.1 { (i, s) } else { best });

        let label = Label::from_index(index).ok_or(ClassifierError::OutputShape {
            expected: Label::ALL.len(),
            actual: self.0.len(),
        })?;

        Ok(Prediction {
            label,
            confidence_percent: f64::from(score) * 100.0,
        })
    }
}

/// Top label and its confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Label,
    pub confidence_percent: f64,
}

pub trait Classifier: Send + Sync {
    fn classify(&self, image: &ImageTensor) -> Result<ProbabilityVector, ClassifierError>;
}

/// Classifier that always returns the same scores. Used in tests and for
/// running the service without a model.
pub struct FixedClassifier {
    scores: ProbabilityVector,
}

impl FixedClassifier {
    pub fn new(scores: Vec<f32>) -> Self {
        Self {
            scores: ProbabilityVector::new(scores),
        }
    }
}

impl Classifier for FixedClassifier {
    fn classify(&self, _image: &ImageTensor) -> Result<ProbabilityVector, ClassifierError> {
        Ok(self.scores.clone())
    }
}

/// Decode, preprocess and classify an uploaded image.
pub fn predict(classifier: &dyn Classifier, image_bytes: &[u8]) -> Result<Prediction, ClassifierError> {
    let tensor = prepare_image(image_bytes)?;
    let scores = classifier.classify(&tensor)?;
    tracing::debug!(shape = ?tensor.shape(), scores = ?scores.scores(), "Classifier scores");
    let prediction = scores.top()?;
    tracing::info!(
        label = %prediction.label,
        confidence = format!("{:.2}", prediction.confidence_percent),
        "X-ray classified"
    );
    Ok(prediction)
}

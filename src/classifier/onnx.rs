use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::TensorRef;

use super::{Classifier, ClassifierError, ImageTensor, ProbabilityVector};
use crate::care::Label;

/// Chest X-ray classifier exported to ONNX.
///
/// Expects a single `[1, 224, 224, 3]` float input and a `[1, 4]` softmax
/// output in [`Label::ALL`] order.
///
/// Uses interior mutability (Mutex) because `ort::Session::run` requires
/// `&mut self` but [`Classifier`] exposes `&self` for shared use across requests.
pub struct OnnxClassifier {
    session: Mutex<Session>,
}

impl OnnxClassifier {
    pub fn load(model_path: &Path) -> Result<Self, ClassifierError> {
        if !model_path.exists() {
            return Err(ClassifierError::ModelNotFound(model_path.to_path_buf()));
        }

        let session = Session::builder()
            .map_err(|e: ort::Error| ClassifierError::ModelInit(e.to_string()))?
            .with_intra_threads(2)
            .map_err(|e: ort::Error| ClassifierError::ModelInit(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e: ort::Error| ClassifierError::ModelInit(format!("ONNX load failed: {e}")))?;

        tracing::info!("ONNX classifier loaded from {}", model_path.display());

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl Classifier for OnnxClassifier {
    fn classify(&self, image: &ImageTensor) -> Result<ProbabilityVector, ClassifierError> {
        let input = ndarray::Array4::from_shape_vec(image.shape(), image.data.clone())
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let input_tensor = TensorRef::from_array_view(&input)
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifierError::Inference("Session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ClassifierError::Inference(format!("ONNX inference failed: {e}")))?;

        let (shape, scores) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(format!("Output extraction: {e}")))?;

        if scores.len() != Label::ALL.len() {
            return Err(ClassifierError::OutputShape {
                expected: Label::ALL.len(),
                actual: scores.len(),
            });
        }
        tracing::debug!(?shape, "Classifier output extracted");

        Ok(ProbabilityVector::new(scores.to_vec()))
    }
}

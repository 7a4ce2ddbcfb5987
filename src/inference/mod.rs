//! Model boundary: tensor contract, model capability and the inference engine.
//!
//! Nothing outside this module depends on a concrete inference runtime; the
//! reconciler only ever sees the flat score vector returned by
//! [`InferenceEngine::infer`].

mod dense;
mod engine;
mod loader;

use std::path::PathBuf;

use thiserror::Error;

pub use dense::{Activation, DenseLayer, DenseModel};
pub use engine::InferenceEngine;
pub use loader::{load_model, model_exists};

/// Conceptual name of the model input tensor.
pub const INPUT_TENSOR: &str = "input";
/// Conceptual name of the model output tensor.
pub const OUTPUT_TENSOR: &str = "output";

/// Errors raised while loading or running a model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// No artifact at the configured location.
    #[error("Model not found at {path}")]
    NotFound {
        /// Configured model path.
        path: PathBuf,
    },
    /// The artifact exists but could not be read.
    #[error("Failed to read model {path}: {source}")]
    Read {
        /// Model path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// The artifact is not valid JSON for the expected model type.
    #[error("Invalid model file {path}: {source}")]
    Parse {
        /// Model path.
        path: PathBuf,
        /// JSON parse error.
        source: serde_json::Error,
    },
    /// No adapter knows how to open this artifact.
    #[error("Unsupported model format at {path}")]
    UnsupportedFormat {
        /// Model path.
        path: PathBuf,
    },
    /// The model parameters are inconsistent.
    #[error("Invalid model: {0}")]
    Invalid(String),
    /// A tensor did not have the shape the contract requires.
    #[error("Tensor '{name}' has shape {actual:?}, expected {expected:?}")]
    Shape {
        /// Tensor name.
        name: String,
        /// Required shape.
        expected: Vec<usize>,
        /// Received shape.
        actual: Vec<usize>,
    },
    /// The runtime failed while executing the model.
    #[error("Inference backend error: {0}")]
    Backend(String),
}

/// Named dense float tensor exchanged with a [`ScoreModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    /// Tensor name.
    pub name: String,
    /// Dimensions, outermost first.
    pub shape: Vec<usize>,
    /// Row-major values.
    pub data: Vec<f32>,
}

impl Tensor {
    /// Build a tensor, checking that `data` fills `shape` exactly.
    pub fn new(name: &str, shape: Vec<usize>, data: Vec<f32>) -> Result<Self, ModelError> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(ModelError::Shape {
                name: name.to_string(),
                expected: shape,
                actual: vec![data.len()],
            });
        }
        Ok(Self {
            name: name.to_string(),
            shape,
            data,
        })
    }

    /// Fail unless the tensor has exactly `expected` dimensions.
    pub fn expect_shape(&self, expected: &[usize]) -> Result<(), ModelError> {
        if self.shape != expected {
            return Err(ModelError::Shape {
                name: self.name.clone(),
                expected: expected.to_vec(),
                actual: self.shape.clone(),
            });
        }
        Ok(())
    }
}

/// Opaque multi-class classifier: `[1, F]` features in, `[1, C]` scores out.
pub trait ScoreModel: Send + Sync {
    /// Feature length the model accepts, when it declares one.
    fn input_len(&self) -> Option<usize>;
    /// Number of raw classes (C).
    fn output_len(&self) -> usize;
    /// Run the model on one `[1, F]` input tensor.
    fn infer(&self, input: &Tensor) -> Result<Tensor, ModelError>;
    /// Whether `infer` may run on several threads at once.
    fn concurrent_safe(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tensor_rejects_mismatched_data() {
        assert!(Tensor::new(INPUT_TENSOR, vec![1, 3], vec![0.0; 2]).is_err());
        let tensor = Tensor::new(INPUT_TENSOR, vec![1, 2], vec![0.0; 2]).unwrap();
        assert!(tensor.expect_shape(&[1, 2]).is_ok());
        assert!(matches!(
            tensor.expect_shape(&[2, 1]),
            Err(ModelError::Shape { .. })
        ));
    }
}

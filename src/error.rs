//! Error kinds produced along the classification pipeline.
//!
//! Every kind here is recoverable at the [`crate::AudioActivityClassifier`]
//! boundary: the orchestrator logs it and degrades to an empty result.

use std::time::Duration;

use thiserror::Error;

use crate::inference::ModelError;

/// Failures raised by a single classification call.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The source format cannot be converted to the canonical analysis format.
    #[error("Unsupported audio format: {reason}")]
    UnsupportedAudioFormat {
        /// Which property of the source format was rejected.
        reason: String,
    },
    /// Decoding produced zero samples.
    #[error("Audio input is empty after decoding")]
    EmptyAudioInput,
    /// Inference was requested before a model was supplied.
    #[error("Classification model is not loaded")]
    ModelNotLoaded,
    /// The model did not answer within the configured time budget.
    #[error("Inference timed out after {timeout:?}")]
    InferenceTimeout {
        /// Budget that elapsed.
        timeout: Duration,
    },
    /// The feature vector does not fit the model input.
    #[error("Feature vector has length {actual}, model expects {expected}")]
    InputShape {
        /// Input width declared by the model.
        expected: usize,
        /// Length of the extracted feature vector.
        actual: usize,
    },
    /// The inference backend failed.
    #[error("Inference failed: {0}")]
    Inference(#[from] ModelError),
}

impl ClassifyError {
    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedAudioFormat {
            reason: reason.into(),
        }
    }
}

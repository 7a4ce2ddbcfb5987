use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use tracing::warn;

use super::{INPUT_TENSOR, ModelError, ScoreModel, Tensor};
use crate::analysis::FeatureVector;
use crate::error::ClassifyError;

const CALL_RUNNING: u8 = 0;
const CALL_ABANDONED: u8 = 1;
const CALL_DONE: u8 = 2;

/// Adapts feature vectors to the model tensor contract.
///
/// The engine never loads models itself; callers hand it a ready model or
/// build it [`unloaded`](Self::unloaded). Models that are not safe for
/// concurrent use are serialized through an internal mutex, which bounds
/// throughput to one inference at a time for those models. While a timed-out
/// call of such a model is still running, further calls fail at once with
/// `InferenceTimeout` instead of queueing behind it.
#[derive(Clone)]
pub struct InferenceEngine {
    model: Option<Arc<dyn ScoreModel>>,
    timeout: Option<Duration>,
    gate: Arc<Mutex<()>>,
    abandoned: Arc<AtomicUsize>,
}

impl InferenceEngine {
    /// Engine over an already loaded model, without a time budget.
    pub fn new(model: Arc<dyn ScoreModel>) -> Self {
        Self {
            model: Some(model),
            timeout: None,
            gate: Arc::new(Mutex::new(())),
            abandoned: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Engine with no model; every `infer` fails with `ModelNotLoaded`.
    pub fn unloaded() -> Self {
        Self {
            model: None,
            timeout: None,
            gate: Arc::new(Mutex::new(())),
            abandoned: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Bound each inference call; `None` waits for the model indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    /// True once a model is available.
    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    /// Feature length the model declares, if loaded and declared.
    pub fn input_width(&self) -> Option<usize> {
        self.model.as_ref().and_then(|model| model.input_len())
    }

    /// Number of raw classes the model reports, if loaded.
    pub fn output_width(&self) -> Option<usize> {
        self.model.as_ref().map(|model| model.output_len())
    }

    /// Run the model on one feature vector and return the flat score vector.
    pub fn infer(&self, features: &FeatureVector) -> Result<Vec<f32>, ClassifyError> {
        let model = self.model.as_ref().ok_or(ClassifyError::ModelNotLoaded)?;
        if let Some(expected) = model.input_len() {
            if expected != features.len() {
                return Err(ClassifyError::InputShape {
                    expected,
                    actual: features.len(),
                });
            }
        }
        let input = Tensor::new(INPUT_TENSOR, vec![1, features.len()], features.values.clone())?;
        let output = self.run(model, input)?;
        let width = model.output_len();
        output.expect_shape(&[1, width])?;
        Ok(output.data)
    }

    fn run(&self, model: &Arc<dyn ScoreModel>, input: Tensor) -> Result<Tensor, ClassifyError> {
        let Some(timeout) = self.timeout else {
            return Ok(invoke(model.as_ref(), &self.gate, &input)?);
        };
        if !model.concurrent_safe() && self.abandoned.load(Ordering::Acquire) > 0 {
            warn!("Inference skipped: an earlier timed-out call still holds the model");
            return Err(ClassifyError::InferenceTimeout { timeout });
        }
        let (tx, rx) = mpsc::channel();
        let state = Arc::new(AtomicU8::new(CALL_RUNNING));
        let worker_state = Arc::clone(&state);
        let abandoned = Arc::clone(&self.abandoned);
        let model = Arc::clone(model);
        let gate = Arc::clone(&self.gate);
        thread::Builder::new()
            .name("activity-inference".to_string())
            .spawn(move || {
                let result = invoke(model.as_ref(), &gate, &input);
                if worker_state.swap(CALL_DONE, Ordering::AcqRel) == CALL_ABANDONED {
                    abandoned.fetch_sub(1, Ordering::AcqRel);
                }
                // The receiver is gone once the caller timed out; the late result is dropped.
                let _ = tx.send(result);
            })
            .map_err(|err| {
                ModelError::Backend(format!("Failed to spawn inference thread: {err}"))
            })?;
        match rx.recv_timeout(timeout) {
            Ok(result) => Ok(result?),
            Err(RecvTimeoutError::Timeout) => {
                let marked = state
                    .compare_exchange(
                        CALL_RUNNING,
                        CALL_ABANDONED,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    )
                    .is_ok();
                if marked {
                    self.abandoned.fetch_add(1, Ordering::AcqRel);
                }
                Err(ClassifyError::InferenceTimeout { timeout })
            }
            Err(RecvTimeoutError::Disconnected) => Err(ModelError::Backend(
                "Inference thread exited without a result".to_string(),
            )
            .into()),
        }
    }
}

fn invoke(model: &dyn ScoreModel, gate: &Mutex<()>, input: &Tensor) -> Result<Tensor, ModelError> {
    if model.concurrent_safe() {
        return model.infer(input);
    }
    let _guard = gate.lock().unwrap_or_else(PoisonError::into_inner);
    model.infer(input)
}

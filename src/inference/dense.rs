use std::path::Path;

use burn::backend::NdArray;
use burn::backend::ndarray::NdArrayDevice;
use burn::tensor::{Tensor as BurnTensor, TensorData, activation};
use serde::{Deserialize, Serialize};

use super::{INPUT_TENSOR, ModelError, OUTPUT_TENSOR, ScoreModel, Tensor};

type DenseBackend = NdArray;

/// Non-linearity applied after a dense layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Identity.
    #[default]
    Linear,
    /// max(0, x).
    Relu,
    /// Independent per-class probabilities.
    Sigmoid,
    /// Probabilities summing to one across classes.
    Softmax,
}

/// Fully connected layer with row-major `[output_len, input_len]` weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayer {
    pub input_len: usize,
    pub output_len: usize,
    pub weights: Vec<f32>,
    pub bias: Vec<f32>,
    #[serde(default)]
    pub activation: Activation,
}

/// Feed-forward classifier stored as JSON and executed on burn's ndarray backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseModel {
    pub model_version: i64,
    pub input_len: usize,
    /// Optional display names, index-aligned with the outputs.
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub feature_mean: Option<Vec<f32>>,
    #[serde(default)]
    pub feature_std: Option<Vec<f32>>,
    pub layers: Vec<DenseLayer>,
}

impl DenseModel {
    /// Read and validate a JSON model artifact.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let model: Self = serde_json::from_str(&text).map_err(|source| ModelError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        model.validate()?;
        Ok(model)
    }

    /// Validate layer chaining and parameter lengths.
    pub fn validate(&self) -> Result<(), ModelError> {
        let invalid = |msg: String| Err(ModelError::Invalid(msg));
        if self.layers.is_empty() {
            return invalid("no layers defined".to_string());
        }
        let mut expected_in = self.input_len;
        for (idx, layer) in self.layers.iter().enumerate() {
            if layer.input_len != expected_in {
                return invalid(format!(
                    "layer {idx} takes {} inputs, previous stage yields {expected_in}",
                    layer.input_len
                ));
            }
            if layer.output_len == 0 {
                return invalid(format!("layer {idx} has no outputs"));
            }
            if layer.weights.len() != layer.input_len * layer.output_len {
                return invalid(format!("layer {idx} weights length mismatch"));
            }
            if layer.bias.len() != layer.output_len {
                return invalid(format!("layer {idx} bias length mismatch"));
            }
            expected_in = layer.output_len;
        }
        if !self.classes.is_empty() && self.classes.len() != expected_in {
            return invalid(format!(
                "{} class names for {expected_in} outputs",
                self.classes.len()
            ));
        }
        for (name, stats) in [
            ("feature_mean", &self.feature_mean),
            ("feature_std", &self.feature_std),
        ] {
            if stats.as_ref().is_some_and(|v| v.len() != self.input_len) {
                return invalid(format!("{name} length mismatch"));
            }
        }
        Ok(())
    }

    fn standardize(&self, features: &[f32]) -> Vec<f32> {
        features
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let mean = self.feature_mean.as_ref().map_or(0.0, |m| m[i]);
                let std = self.feature_std.as_ref().map_or(1.0, |s| s[i].max(1e-6));
                (value - mean) / std
            })
            .collect()
    }

    fn forward(&self, features: &[f32]) -> Result<Vec<f32>, ModelError> {
        let device = NdArrayDevice::default();
        let mut x = BurnTensor::<DenseBackend, 2>::from_data(
            TensorData::new(self.standardize(features), [1, self.input_len]),
            &device,
        );
        for layer in &self.layers {
            let weights = BurnTensor::<DenseBackend, 2>::from_data(
                TensorData::new(layer.weights.clone(), [layer.output_len, layer.input_len]),
                &device,
            );
            let bias = BurnTensor::<DenseBackend, 2>::from_data(
                TensorData::new(layer.bias.clone(), [1, layer.output_len]),
                &device,
            );
            x = x.matmul(weights.transpose()).add(bias);
            x = match layer.activation {
                Activation::Linear => x,
                Activation::Relu => activation::relu(x),
                Activation::Sigmoid => activation::sigmoid(x),
                Activation::Softmax => activation::softmax(x, 1),
            };
        }
        x.into_data()
            .to_vec::<f32>()
            .map_err(|err| ModelError::Backend(format!("Failed to read dense output: {err:?}")))
    }
}

impl ScoreModel for DenseModel {
    fn input_len(&self) -> Option<usize> {
        Some(self.input_len)
    }

    fn output_len(&self) -> usize {
        self.layers.last().map_or(0, |layer| layer.output_len)
    }

    fn infer(&self, input: &Tensor) -> Result<Tensor, ModelError> {
        input.expect_shape(&[1, self.input_len])?;
        if input.name != INPUT_TENSOR {
            return Err(ModelError::Backend(format!(
                "unknown input tensor '{}'",
                input.name
            )));
        }
        let scores = self.forward(&input.data)?;
        Tensor::new(OUTPUT_TENSOR, vec![1, self.output_len()], scores)
    }
}

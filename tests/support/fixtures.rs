use std::path::{Path, PathBuf};

use audio_activity::inference::{Activation, DenseLayer, DenseModel};

/// Model whose sigmoid outputs equal `scores` for any input.
pub fn constant_model(input_len: usize, scores: &[f32]) -> DenseModel {
    DenseModel {
        model_version: 1,
        input_len,
        classes: Vec::new(),
        feature_mean: None,
        feature_std: None,
        layers: vec![DenseLayer {
            input_len,
            output_len: scores.len(),
            weights: vec![0.0; input_len * scores.len()],
            bias: scores.iter().map(|&p| (p / (1.0 - p)).ln()).collect(),
            activation: Activation::Sigmoid,
        }],
    }
}

pub fn write_constant_model(dir: &Path, input_len: usize, scores: &[f32]) -> PathBuf {
    let path = dir.join("model.json");
    let json = serde_json::to_string(&constant_model(input_len, scores)).expect("serialize model");
    std::fs::write(&path, json).expect("write model");
    path
}

pub fn write_mapping(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).expect("write mapping");
    path
}

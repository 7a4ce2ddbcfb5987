use std::path::PathBuf;

use crate::analysis::{DEFAULT_MFCC_COEFFICIENTS, DEFAULT_MFCC_FRAMES, DEFAULT_SAMPLE_RATE};

pub(super) fn default_false() -> bool {
    false
}

pub(super) fn default_model_path() -> PathBuf {
    PathBuf::from("models/audio_classification/model.json")
}

pub(super) fn default_mapping_path() -> PathBuf {
    PathBuf::from("models/audio_classification/activity_mapping.csv")
}

pub(super) fn default_threshold() -> f32 {
    0.5
}

pub(super) fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

pub(super) fn default_mfcc_coefficients() -> usize {
    DEFAULT_MFCC_COEFFICIENTS
}

pub(super) fn default_mfcc_frames() -> usize {
    DEFAULT_MFCC_FRAMES
}

pub(super) fn default_inference_timeout_ms() -> u64 {
    2_000
}

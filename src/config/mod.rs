//! Classifier settings stored as TOML in the app directory.

mod defaults;
mod errors;
mod load;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::analysis::MFCC_MEL_BANDS;

use defaults::{
    default_false, default_inference_timeout_ms, default_mapping_path, default_mfcc_coefficients,
    default_mfcc_frames, default_model_path, default_sample_rate, default_threshold,
};

pub use errors::ConfigError;
pub use load::{config_path, load_from_path, load_or_default};

/// Default filename of the classifier settings.
pub const CONFIG_FILE_NAME: &str = "classifier.toml";

/// Everything needed to assemble an [`crate::AudioActivityClassifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierSettings {
    /// Run audio activity detection at all.
    #[serde(default = "default_false")]
    pub enabled: bool,
    /// Model artifact location.
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    /// Mapping table source.
    #[serde(default = "default_mapping_path")]
    pub mapping_path: PathBuf,
    /// Threshold for mapping entries without an explicit `*threshold`.
    #[serde(default = "default_threshold")]
    pub default_threshold: f32,
    /// Canonical analysis sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Cepstral coefficients per frame.
    #[serde(default = "default_mfcc_coefficients")]
    pub mfcc_coefficients: usize,
    /// Frames per feature vector.
    #[serde(default = "default_mfcc_frames")]
    pub mfcc_frames: usize,
    /// Per-call inference budget in milliseconds (0 = wait indefinitely).
    #[serde(default = "default_inference_timeout_ms")]
    pub inference_timeout_ms: u64,
    /// Replaces the built-in activity vocabulary when set.
    #[serde(default)]
    pub activities: Option<Vec<String>>,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            enabled: default_false(),
            model_path: default_model_path(),
            mapping_path: default_mapping_path(),
            default_threshold: default_threshold(),
            sample_rate: default_sample_rate(),
            mfcc_coefficients: default_mfcc_coefficients(),
            mfcc_frames: default_mfcc_frames(),
            inference_timeout_ms: default_inference_timeout_ms(),
            activities: None,
        }
    }
}

impl ClassifierSettings {
    /// Inference budget, `None` when disabled.
    pub fn inference_timeout(&self) -> Option<Duration> {
        (self.inference_timeout_ms > 0).then(|| Duration::from_millis(self.inference_timeout_ms))
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.default_threshold) {
            return Err(invalid(
                "default_threshold",
                format!("{} is outside [0, 1]", self.default_threshold),
            ));
        }
        if self.sample_rate == 0 {
            return Err(invalid("sample_rate", "must be greater than zero".to_string()));
        }
        if self.mfcc_coefficients == 0 || self.mfcc_coefficients > MFCC_MEL_BANDS {
            return Err(invalid(
                "mfcc_coefficients",
                format!("must be between 1 and {MFCC_MEL_BANDS}"),
            ));
        }
        if self.mfcc_frames == 0 {
            return Err(invalid("mfcc_frames", "must be greater than zero".to_string()));
        }
        if self
            .activities
            .as_ref()
            .is_some_and(|labels| labels.iter().all(|label| label.trim().is_empty()))
        {
            return Err(invalid("activities", "override lists no activity".to_string()));
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        for path in [&mut self.model_path, &mut self.mapping_path] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

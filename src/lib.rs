//! Audio to activity classification.
//!
//! Raw PCM is normalized and turned into MFCC features, scored by a pluggable
//! classifier model, and the per-class scores are mapped onto domain
//! activities through a thresholded mapping table.
/// Activity vocabulary.
pub mod activity;
/// Audio normalization and feature extraction.
pub mod analysis;
/// Application directory resolution.
pub mod app_dirs;
/// End-to-end orchestrator.
pub mod classifier;
/// Classifier settings.
pub mod config;
/// Pipeline error kinds.
pub mod error;
/// Model boundary and inference engine.
pub mod inference;
/// Tracing setup.
pub mod logging;
/// Raw class to activity mapping table.
pub mod mapping;
/// Score to activity reconciliation.
pub mod reconcile;

pub use activity::{ActivityVocabulary, UnknownActivityLabel};
pub use analysis::{AudioFormat, ByteOrder, FeatureExtractor, FeatureVector, SampleEncoding};
pub use classifier::AudioActivityClassifier;
pub use config::ClassifierSettings;
pub use error::ClassifyError;
pub use inference::{InferenceEngine, ModelError, ScoreModel, Tensor};
pub use mapping::{ActivityMappingTable, LoadReport, MappingError, RecordError, ThresholdEntry};
pub use reconcile::{ActivityReconciler, ActivityResult, Reconciliation};

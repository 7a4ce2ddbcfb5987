//! End-to-end audio to activity classification.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, error, info, warn};

use crate::activity::ActivityVocabulary;
use crate::analysis::{AudioFormat, FeatureExtractor};
use crate::config::ClassifierSettings;
use crate::error::ClassifyError;
use crate::inference::{InferenceEngine, load_model};
use crate::mapping::{ActivityMappingTable, LoadReport, MappingError};
use crate::reconcile::{ActivityReconciler, ActivityResult};

/// Composes feature extraction, inference and reconciliation.
///
/// `classify` never fails: a disabled pipeline, a missing model and every
/// stage failure all produce an empty result. The mapping table is an
/// immutable snapshot; reloads publish a new one and in-flight calls keep
/// the snapshot they started with.
pub struct AudioActivityClassifier {
    enabled: bool,
    extractor: FeatureExtractor,
    engine: InferenceEngine,
    reconciler: ActivityReconciler,
    mapping: RwLock<Arc<ActivityMappingTable>>,
    mapping_source: Option<PathBuf>,
    default_threshold: f32,
}

impl AudioActivityClassifier {
    /// Enabled classifier over explicit parts.
    pub fn new(
        extractor: FeatureExtractor,
        engine: InferenceEngine,
        reconciler: ActivityReconciler,
        table: ActivityMappingTable,
    ) -> Self {
        let classifier = Self {
            enabled: true,
            extractor,
            engine,
            reconciler,
            mapping: RwLock::new(Arc::new(table)),
            mapping_source: None,
            default_threshold: 0.5,
        };
        classifier.check_model_fit();
        classifier.check_indices(&classifier.mapping_snapshot());
        classifier
    }

    /// Classifier that always answers with an empty result.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            extractor: FeatureExtractor::default(),
            engine: InferenceEngine::unloaded(),
            reconciler: ActivityReconciler::default(),
            mapping: RwLock::new(Arc::new(ActivityMappingTable::empty())),
            mapping_source: None,
            default_threshold: 0.5,
        }
    }

    /// Set the file `reload_mapping` reads from.
    pub fn with_mapping_source(mut self, path: impl Into<PathBuf>, default_threshold: f32) -> Self {
        self.mapping_source = Some(path.into());
        self.default_threshold = default_threshold;
        self
    }

    /// Assemble the pipeline described by `settings`.
    ///
    /// Load failures are logged and leave the classifier in its empty-result
    /// state instead of failing construction.
    pub fn from_settings(settings: &ClassifierSettings) -> Self {
        if !settings.enabled {
            info!("Audio activity detection disabled");
            return Self::disabled();
        }
        let extractor = FeatureExtractor::new(
            settings.sample_rate,
            settings.mfcc_coefficients,
            settings.mfcc_frames,
        );
        let engine = match load_model(&settings.model_path) {
            Ok(model) => InferenceEngine::new(model),
            Err(err) => {
                error!("Audio activity model unavailable, detection will report nothing: {err}");
                InferenceEngine::unloaded()
            }
        }
        .with_timeout(settings.inference_timeout());
        let vocabulary = settings
            .activities
            .as_ref()
            .map(ActivityVocabulary::new)
            .unwrap_or_default();
        let loaded =
            ActivityMappingTable::load_path(&settings.mapping_path, settings.default_threshold);
        let table = match loaded {
            Ok((table, _report)) => table,
            Err(err) => {
                error!("Activity mapping unavailable: {err}");
                ActivityMappingTable::empty()
            }
        };
        Self::new(extractor, engine, ActivityReconciler::new(vocabulary), table)
            .with_mapping_source(&settings.mapping_path, settings.default_threshold)
    }

    /// True when `classify` can produce non-empty results.
    pub fn is_active(&self) -> bool {
        self.enabled && self.engine.is_ready()
    }

    /// Classify one audio buffer; any failure yields an empty result.
    pub fn classify(&self, bytes: &[u8], format: &AudioFormat) -> ActivityResult {
        if !self.is_active() {
            debug!("Audio activity detection inactive, returning no activities");
            return ActivityResult::new();
        }
        match self.try_classify(bytes, format) {
            Ok(result) => result,
            Err(err) => {
                warn!("Audio activity classification failed: {err}");
                ActivityResult::new()
            }
        }
    }

    /// Classify one audio buffer and surface the failing stage.
    ///
    /// A disabled classifier answers `Ok` with an empty result.
    pub fn try_classify(
        &self,
        bytes: &[u8],
        format: &AudioFormat,
    ) -> Result<ActivityResult, ClassifyError> {
        if !self.enabled {
            return Ok(ActivityResult::new());
        }
        if !self.engine.is_ready() {
            return Err(ClassifyError::ModelNotLoaded);
        }
        let table = self.mapping_snapshot();
        let features = self.extractor.extract(bytes, format)?;
        let scores = self.engine.infer(&features)?;
        let result = self.reconciler.reconcile(&scores, &table);
        debug!(
            "Classified {} bytes into {} activities from {} raw classes",
            bytes.len(),
            result.len(),
            scores.len()
        );
        Ok(result)
    }

    /// Current mapping table; stays valid across later reloads.
    pub fn mapping_snapshot(&self) -> Arc<ActivityMappingTable> {
        Arc::clone(&self.mapping.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Re-read the configured mapping source and swap it in.
    pub fn reload_mapping(&self) -> Result<LoadReport, MappingError> {
        let path = self.mapping_source.as_deref().ok_or(MappingError::NoSource)?;
        self.reload_mapping_from(path)
    }

    /// Read `path` completely, then replace the table in one step.
    ///
    /// On a read failure the current table stays in place.
    pub fn reload_mapping_from(&self, path: &Path) -> Result<LoadReport, MappingError> {
        let (table, report) = ActivityMappingTable::load_path(path, self.default_threshold)?;
        self.check_indices(&table);
        let table = Arc::new(table);
        *self.mapping.write().unwrap_or_else(PoisonError::into_inner) = table;
        info!("Activity mapping reloaded from {}", path.display());
        Ok(report)
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    fn check_model_fit(&self) {
        if let Some(expected) = self.engine.input_width() {
            let produced = self.extractor.feature_len();
            if expected != produced {
                error!(
                    "Audio activity model expects {expected} features \
                     but extraction produces {produced}"
                );
            }
        }
    }

    fn check_indices(&self, table: &ActivityMappingTable) {
        let Some(width) = self.engine.output_width() else {
            return;
        };
        let beyond = table.out_of_range(width);
        if !beyond.is_empty() {
            error!(
                "Activity mapping references raw classes {beyond:?} \
                 beyond model output width {width}; they will never match"
            );
        }
    }
}

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use super::{DenseModel, ModelError, ScoreModel};

/// True when a model artifact exists at `path`.
pub fn model_exists(path: &Path) -> bool {
    let exists = path.is_file();
    if !exists {
        warn!("Model file not found: {}", path.display());
    }
    exists
}

/// Open the model artifact at `path` with the adapter matching its extension.
pub fn load_model(path: &Path) -> Result<Arc<dyn ScoreModel>, ModelError> {
    if !model_exists(path) {
        return Err(ModelError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("json") => {
            let model = DenseModel::load(path)?;
            info!(
                "Loaded dense model v{} from {} ({} inputs, {} classes)",
                model.model_version,
                path.display(),
                model.input_len,
                model.output_len()
            );
            Ok(Arc::new(model))
        }
        _ => Err(ModelError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{Activation, DenseLayer};

    #[test]
    fn missing_model_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(!model_exists(&path));
        assert!(matches!(load_model(&path), Err(ModelError::NotFound { .. })));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.tflite");
        std::fs::write(&path, b"binary").unwrap();
        assert!(matches!(
            load_model(&path),
            Err(ModelError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn json_artifact_loads_as_dense_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Model.JSON");
        let model = DenseModel {
            model_version: 3,
            input_len: 4,
            classes: Vec::new(),
            feature_mean: None,
            feature_std: None,
            layers: vec![DenseLayer {
                input_len: 4,
                output_len: 5,
                weights: vec![0.0; 20],
                bias: vec![0.0; 5],
                activation: Activation::Softmax,
            }],
        };
        std::fs::write(&path, serde_json::to_string(&model).unwrap()).unwrap();
        let loaded = load_model(&path).unwrap();
        assert_eq!(loaded.output_len(), 5);
        assert_eq!(loaded.input_len(), Some(4));
    }

    #[test]
    fn corrupt_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_model(&path), Err(ModelError::Parse { .. })));
    }
}

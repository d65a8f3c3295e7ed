//! Model loaders: where the vocabulary and network come from.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use stepscout_core::error::ModelError;
use tracing::info;

use crate::engine::LoadedModel;
use crate::vocab::Vocabulary;

/// Produces a ready-to-run model. Called at most once per engine.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self) -> Result<LoadedModel, ModelError>;
}

/// Loads the vocabulary JSON and ONNX graph from disk.
#[derive(Debug, Clone)]
pub struct FileModelLoader {
    model_path: PathBuf,
    vocab_path: PathBuf,
}

impl FileModelLoader {
    pub fn new(model_path: impl Into<PathBuf>, vocab_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            vocab_path: vocab_path.into(),
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn vocab_path(&self) -> &Path {
        &self.vocab_path
    }
}

#[async_trait]
impl ModelLoader for FileModelLoader {
    async fn load(&self) -> Result<LoadedModel, ModelError> {
        info!(path = %self.vocab_path.display(), "Loading vocabulary");
        let vocabulary = Vocabulary::from_file(&self.vocab_path).await?;

        if !self.model_path.exists() {
            return Err(ModelError::LoadFailed(format!(
                "Model file not found: {}",
                self.model_path.display()
            )));
        }

        let model = load_model(self.model_path.clone()).await?;
        info!(
            words = vocabulary.len(),
            model = model.name(),
            "Local classifier loaded"
        );
        Ok(LoadedModel::new(vocabulary, model))
    }
}

#[cfg(feature = "onnx")]
async fn load_model(
    path: PathBuf,
) -> Result<Box<dyn stepscout_core::SentenceModel>, ModelError> {
    info!(path = %path.display(), "Loading ONNX model");
    let model = tokio::task::spawn_blocking(move || crate::onnx::OnnxModel::load(&path))
        .await
        .map_err(|e| ModelError::LoadFailed(format!("Model load task failed: {e}")))??;
    Ok(Box::new(model))
}

#[cfg(not(feature = "onnx"))]
async fn load_model(
    _path: PathBuf,
) -> Result<Box<dyn stepscout_core::SentenceModel>, ModelError> {
    Err(ModelError::LoadFailed(
        "built without onnx support (rebuild with `--features onnx`)".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn missing_vocabulary_fails() {
        let loader = FileModelLoader::new("/nonexistent/model.onnx", "/nonexistent/vocab.json");
        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, ModelError::LoadFailed(msg) if msg.contains("vocab.json")));
    }

    #[tokio::test]
    async fn missing_model_file_fails_after_vocabulary() {
        let mut vocab = NamedTempFile::new().unwrap();
        write!(vocab, r#"{{"<OOV>": 1, "stir": 4}}"#).unwrap();

        let loader = FileModelLoader::new("/nonexistent/model.onnx", vocab.path());
        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, ModelError::LoadFailed(msg) if msg.contains("model.onnx")));
    }

    #[cfg(not(feature = "onnx"))]
    #[tokio::test]
    async fn without_onnx_feature_load_fails() {
        let mut vocab = NamedTempFile::new().unwrap();
        write!(vocab, r#"{{"<OOV>": 1}}"#).unwrap();
        let model = NamedTempFile::new().unwrap();

        let loader = FileModelLoader::new(model.path(), vocab.path());
        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, ModelError::LoadFailed(msg) if msg.contains("onnx")));
    }
}

//! Inference engine: a lazily-initialized handle to the local classifier.
//!
//! The first caller of [`InferenceEngine::ready`] triggers the load; every
//! concurrent caller awaits that same load. The outcome is kept for the
//! lifetime of the engine, so a failed load is reported again on every later
//! call instead of being retried.

use std::sync::Arc;

use stepscout_core::error::ModelError;
use stepscout_core::{MAX_SEQUENCE_LEN, SentenceModel, TokenSequence};
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

use crate::loader::ModelLoader;
use crate::tokenizer::tokenize;
use crate::vocab::Vocabulary;

/// A vocabulary paired with the network that consumes its ids.
pub struct LoadedModel {
    vocabulary: Vocabulary,
    model: Box<dyn SentenceModel>,
    run_gate: Mutex<()>,
}

impl LoadedModel {
    pub fn new(vocabulary: Vocabulary, model: Box<dyn SentenceModel>) -> Self {
        Self {
            vocabulary,
            model,
            run_gate: Mutex::new(()),
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Tokenize `text` into a model-sized sequence.
    pub fn tokenize(&self, text: &str) -> TokenSequence {
        tokenize(&self.vocabulary, text, MAX_SEQUENCE_LEN)
    }

    /// Run one forward pass and return a confidence in `[0, 1]`.
    ///
    /// Forward passes never overlap; a missing or NaN output counts as 0.
    pub async fn classify(&self, input: &TokenSequence) -> Result<f64, ModelError> {
        let _running = self.run_gate.lock().await;
        let raw = self.model.forward(input).await?;
        Ok(normalize(raw))
    }
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("words", &self.vocabulary.len())
            .field("model", &self.model.name())
            .finish()
    }
}

fn normalize(raw: Option<f32>) -> f64 {
    match raw {
        Some(value) if !value.is_nan() => f64::from(value).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

/// Shared handle to the classifier. Cheap to share behind an `Arc`.
pub struct InferenceEngine {
    loader: Arc<dyn ModelLoader>,
    state: OnceCell<Result<Arc<LoadedModel>, ModelError>>,
}

impl InferenceEngine {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            state: OnceCell::new(),
        }
    }

    /// Build an engine around an already-loaded model.
    pub fn preloaded(model: LoadedModel) -> Self {
        struct Unused;

        #[async_trait::async_trait]
        impl ModelLoader for Unused {
            async fn load(&self) -> Result<LoadedModel, ModelError> {
                Err(ModelError::LoadFailed("engine was preloaded".into()))
            }
        }

        Self {
            loader: Arc::new(Unused),
            state: OnceCell::new_with(Some(Ok(Arc::new(model)))),
        }
    }

    /// The loaded model, loading it on first use.
    pub async fn ready(&self) -> Result<Arc<LoadedModel>, ModelError> {
        self.state
            .get_or_init(|| async {
                info!("Loading local classifier on first request...");
                match self.loader.load().await {
                    Ok(model) => {
                        debug!(model = ?model, "Local classifier ready");
                        Ok(Arc::new(model))
                    }
                    Err(e) => {
                        warn!(error = %e, "Local classifier failed to load");
                        Err(e)
                    }
                }
            })
            .await
            .clone()
    }

    /// Whether a load has completed, successfully or not.
    pub fn is_initialized(&self) -> bool {
        self.state.initialized()
    }

    /// Whether the model is loaded and usable.
    pub fn is_loaded(&self) -> bool {
        matches!(self.state.get(), Some(Ok(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FixedModel(Option<f32>);

    #[async_trait]
    impl SentenceModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn forward(&self, _input: &TokenSequence) -> Result<Option<f32>, ModelError> {
            Ok(self.0)
        }
    }

    /// Counts forward passes running at the same time.
    struct OverlapProbe {
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    struct ProbeModel(Arc<OverlapProbe>);

    #[async_trait]
    impl SentenceModel for ProbeModel {
        fn name(&self) -> &str {
            "probe"
        }

        async fn forward(&self, _input: &TokenSequence) -> Result<Option<f32>, ModelError> {
            let now = self.0.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.0.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.0.running.fetch_sub(1, Ordering::SeqCst);
            Ok(Some(0.5))
        }
    }

    struct CountingLoader {
        loads: AtomicUsize,
        fail: bool,
    }

    impl CountingLoader {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                loads: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl ModelLoader for CountingLoader {
        async fn load(&self) -> Result<LoadedModel, ModelError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail {
                return Err(ModelError::LoadFailed("corrupt model".into()));
            }
            Ok(loaded(Some(0.8)))
        }
    }

    fn loaded(output: Option<f32>) -> LoadedModel {
        let mut ids = HashMap::new();
        ids.insert("<OOV>".to_string(), 1);
        ids.insert("stir".to_string(), 5);
        LoadedModel::new(Vocabulary::from_map(ids), Box::new(FixedModel(output)))
    }

    #[tokio::test]
    async fn concurrent_ready_calls_load_once() {
        let loader = CountingLoader::new(false);
        let engine = Arc::new(InferenceEngine::new(loader.clone()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move { engine.ready().await }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        assert!(engine.is_loaded());
    }

    #[tokio::test]
    async fn load_failure_is_cached() {
        let loader = CountingLoader::new(true);
        let engine = InferenceEngine::new(loader.clone());

        let first = engine.ready().await.unwrap_err();
        let second = engine.ready().await.unwrap_err();

        assert_eq!(first, ModelError::LoadFailed("corrupt model".into()));
        assert_eq!(first, second);
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        assert!(engine.is_initialized());
        assert!(!engine.is_loaded());
    }

    #[tokio::test]
    async fn nothing_loads_before_first_use() {
        let loader = CountingLoader::new(false);
        let engine = InferenceEngine::new(loader.clone());
        assert!(!engine.is_initialized());
        assert_eq!(loader.loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn classify_passes_output_through() {
        let model = loaded(Some(0.8));
        let seq = model.tokenize("Stir gently");
        assert_eq!(seq.len(), MAX_SEQUENCE_LEN);
        assert_eq!(&seq.ids()[..3], &[5, 1, 0]);

        let confidence = model.classify(&seq).await.unwrap();
        assert!((confidence - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    async fn classify_normalizes_bad_outputs() {
        let seq = TokenSequence::from_ids(std::iter::empty(), MAX_SEQUENCE_LEN);
        assert_eq!(loaded(None).classify(&seq).await.unwrap(), 0.0);
        assert_eq!(loaded(Some(f32::NAN)).classify(&seq).await.unwrap(), 0.0);
        assert_eq!(loaded(Some(1.7)).classify(&seq).await.unwrap(), 1.0);
        assert_eq!(loaded(Some(-0.2)).classify(&seq).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn forward_passes_never_overlap() {
        let probe = Arc::new(OverlapProbe {
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let model = Arc::new(LoadedModel::new(
            Vocabulary::from_map(HashMap::new()),
            Box::new(ProbeModel(probe.clone())),
        ));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let model = model.clone();
            handles.push(tokio::spawn(async move {
                let seq = model.tokenize("one two");
                model.classify(&seq).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(probe.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn preloaded_engine_is_ready() {
        let engine = InferenceEngine::preloaded(loaded(Some(0.3)));
        assert!(engine.is_loaded());
        let model = engine.ready().await.unwrap();
        assert_eq!(model.model_name(), "fixed");
    }
}

use crate::inference_engine::interface::InferenceEngine;
use crate::model_loader::interface::{LoadedModel, ModelLoadError, ModelLoader};
use crate::model_loader::metadata::parse_labels;
use crate::ranker::LabelSet;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Hands out a prepared engine. Scripted failures are returned first, one per
/// `load` call.
pub struct ModelLoaderFake {
    engine: Arc<dyn InferenceEngine + Send + Sync>,
    metadata: Option<String>,
    failures: Mutex<VecDeque<ModelLoadError>>,
    attempts: AtomicUsize,
}

impl ModelLoaderFake {
    pub fn new(engine: Arc<dyn InferenceEngine + Send + Sync>, metadata: Option<&str>) -> Self {
        Self {
            engine,
            metadata: metadata.map(str::to_string),
            failures: Mutex::new(VecDeque::new()),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn push_failure(&self, error: ModelLoadError) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push_back(error);
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl ModelLoader for ModelLoaderFake {
    fn load(&self) -> Result<LoadedModel, ModelLoadError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self
            .failures
            .lock()
            .ok()
            .and_then(|mut failures| failures.pop_front())
        {
            return Err(error);
        }

        let labels = self
            .metadata
            .as_deref()
            .and_then(|json| parse_labels(json).ok().flatten());

        Ok(LoadedModel {
            engine: self.engine.clone(),
            labels: LabelSet::resolve(labels, self.engine.output_width()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference_engine::impl_fake::InferenceEngineFake;

    #[test]
    fn test_metadata_labels() {
        let loader = ModelLoaderFake::new(
            Arc::new(InferenceEngineFake::new(vec![0.82, 0.18])),
            Some(r#"{"labels":["Phone","NoPhone"]}"#),
        );

        let model = loader.load().unwrap();

        assert_eq!(model.labels.iter().collect::<Vec<_>>(), vec!["Phone", "NoPhone"]);
    }

    #[test]
    fn test_unparsable_metadata_falls_back_to_placeholders() {
        let loader = ModelLoaderFake::new(
            Arc::new(InferenceEngineFake::random(3)),
            Some("{labels: oops"),
        );

        let model = loader.load().unwrap();

        assert_eq!(
            model.labels.iter().collect::<Vec<_>>(),
            vec!["Class 0", "Class 1", "Class 2"]
        );
    }

    #[test]
    fn test_missing_metadata_falls_back_to_placeholders() {
        let loader = ModelLoaderFake::new(Arc::new(InferenceEngineFake::random(3)), None);

        let model = loader.load().unwrap();

        assert_eq!(
            model.labels.iter().collect::<Vec<_>>(),
            vec!["Class 0", "Class 1", "Class 2"]
        );
    }

    #[test]
    fn test_failure_then_retry() {
        let loader = ModelLoaderFake::new(Arc::new(InferenceEngineFake::random(2)), None);
        loader.push_failure(ModelLoadError::Model("network down".to_string()));

        assert!(loader.load().is_err());
        assert!(loader.load().is_ok());
        assert_eq!(loader.attempts(), 2);
    }
}

use crate::inference_engine::impl_tract_onnx::InferenceEngineTractOnnx;
use crate::inference_engine::interface::InferenceEngine;
use crate::library::logger::interface::Logger;
use crate::model_loader::interface::{LoadedModel, ModelLoadError, ModelLoader};
use crate::model_loader::metadata::parse_labels;
use crate::model_loader::model_config::ModelConfig;
use crate::ranker::LabelSet;
use std::sync::Arc;

pub struct ModelLoaderTractOnnx {
    config: ModelConfig,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl ModelLoaderTractOnnx {
    pub fn new(config: ModelConfig, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            config,
            logger: logger.with_namespace("model_loader"),
        }
    }

    /// Metadata problems are never fatal; the caller falls back to
    /// placeholder labels.
    fn read_labels(&self) -> Option<Vec<String>> {
        let path = self.config.metadata_path.as_ref()?;
        let _ = self.logger.info(&format!("Loading metadata from {}", path));

        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                let _ = self
                    .logger
                    .warn(&format!("Could not read metadata {}: {}", path, e));
                return None;
            }
        };

        match parse_labels(&json) {
            Ok(Some(labels)) => Some(labels),
            Ok(None) => {
                let _ = self.logger.warn("Metadata has no labels");
                None
            }
            Err(e) => {
                let _ = self
                    .logger
                    .warn(&format!("Could not parse metadata {}: {}", path, e));
                None
            }
        }
    }
}

impl ModelLoader for ModelLoaderTractOnnx {
    fn load(&self) -> Result<LoadedModel, ModelLoadError> {
        let labels = self.read_labels();

        let _ = self.logger.info(&format!(
            "Loading model from {}",
            self.config.onnx_model_path
        ));
        let engine = InferenceEngineTractOnnx::new(&self.config).map_err(|e| {
            let _ = self.logger.error(&e.to_string());
            e
        })?;

        let output_width = engine.output_width();
        if let Some(labels) = &labels {
            if labels.len() != output_width {
                let _ = self.logger.warn(&format!(
                    "Metadata lists {} labels, model outputs {} scores",
                    labels.len(),
                    output_width
                ));
            }
        }

        let labels = LabelSet::resolve(labels, output_width);
        let _ = self.logger.info(&format!(
            "Model loaded: {} classes ({})",
            labels.len(),
            labels.iter().collect::<Vec<_>>().join(", ")
        ));

        Ok(LoadedModel {
            engine: Arc::new(engine),
            labels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::logger::impl_fake::LoggerFake;

    #[test]
    fn test_missing_model_is_load_failure() {
        let logger = LoggerFake::new();
        let loader = ModelLoaderTractOnnx::new(
            ModelConfig {
                onnx_model_path: "./does/not/exist.onnx".to_string(),
                metadata_path: Some("./does/not/exist.json".to_string()),
                input_shape: (224, 224),
            },
            Arc::new(logger.clone()),
        );

        let result = loader.load();

        assert!(matches!(result, Err(ModelLoadError::Model(_))));
        assert!(logger.contains("Could not read metadata"));
    }
}

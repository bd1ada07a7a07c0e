use crate::inference_engine::interface::InferenceEngine;
use crate::ranker::LabelSet;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelLoadError {
    Model(String),
}

impl fmt::Display for ModelLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelLoadError::Model(msg) => write!(f, "ModelLoadFailure: {msg}"),
        }
    }
}

impl std::error::Error for ModelLoadError {}

/// Model acquisition progress, shown to the user before the loop can start.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelStatus {
    Loading,
    Ready { classes: usize },
    Failed(String),
}

#[derive(Clone)]
pub struct LoadedModel {
    pub engine: Arc<dyn InferenceEngine + Send + Sync>,
    pub labels: LabelSet,
}

pub trait ModelLoader: Send + Sync {
    fn load(&self) -> Result<LoadedModel, ModelLoadError>;
}

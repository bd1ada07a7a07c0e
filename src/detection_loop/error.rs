use crate::frame_source::interface::FrameSourceError;
use crate::inference_engine::interface::InferenceError;
use crate::preprocessor::preprocess::PreprocessError;
use std::fmt;

/// Per-iteration failures. The loop logs them and keeps going.
#[derive(Debug, Clone, PartialEq)]
pub enum IterationError {
    InvalidFrame(PreprocessError),
    InferenceFailure(InferenceError),
}

impl fmt::Display for IterationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IterationError::InvalidFrame(e) => write!(f, "{e}"),
            IterationError::InferenceFailure(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for IterationError {}

impl From<PreprocessError> for IterationError {
    fn from(err: PreprocessError) -> Self {
        IterationError::InvalidFrame(err)
    }
}

impl From<InferenceError> for IterationError {
    fn from(err: InferenceError) -> Self {
        IterationError::InferenceFailure(err)
    }
}

/// Error signal handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopError {
    /// Camera could not be acquired or was lost. The loop is back to idle.
    Device(FrameSourceError),
    Iteration(IterationError),
}

impl LoopError {
    pub fn is_transient(&self) -> bool {
        matches!(self, LoopError::Iteration(_))
    }
}

impl fmt::Display for LoopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopError::Device(e) => write!(f, "{e}"),
            LoopError::Iteration(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LoopError {}

use crate::preprocessor::tensor::Tensor;
use std::fmt;

/// One score per label index.
pub type ProbabilityVector = Vec<f32>;

#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    InvalidShape {
        expected: [usize; 4],
        actual: [usize; 4],
    },
    OutputWidth {
        expected: usize,
        actual: usize,
    },
    Backend(String),
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferenceError::InvalidShape { expected, actual } => write!(
                f,
                "InferenceFailure: tensor shape {actual:?}, model expects {expected:?}"
            ),
            InferenceError::OutputWidth { expected, actual } => write!(
                f,
                "InferenceFailure: model returned {actual} scores, declared {expected}"
            ),
            InferenceError::Backend(msg) => write!(f, "InferenceFailure: {msg}"),
        }
    }
}

impl std::error::Error for InferenceError {}

/// Opaque image classifier. Loaded once and shared read-only; callers keep
/// ownership of the input tensor.
pub trait InferenceEngine: Send + Sync {
    /// Number of scores every `classify` call returns.
    fn output_width(&self) -> usize;

    fn classify(&self, tensor: &Tensor) -> Result<ProbabilityVector, InferenceError>;
}

/// Rejects tensors whose shape does not match what the model was built for.
pub fn check_input_shape(tensor: &Tensor, expected: [usize; 4]) -> Result<(), InferenceError> {
    if tensor.shape() != expected {
        return Err(InferenceError::InvalidShape {
            expected,
            actual: tensor.shape(),
        });
    }
    Ok(())
}

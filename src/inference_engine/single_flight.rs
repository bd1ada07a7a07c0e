use crate::inference_engine::interface::{InferenceEngine, InferenceError, ProbabilityVector};
use crate::preprocessor::tensor::Tensor;
use std::sync::{Arc, Mutex};

/// Serializes `classify` so at most one call reaches the backend at a time,
/// whichever thread it comes from.
pub struct SingleFlight {
    inner: Arc<dyn InferenceEngine + Send + Sync>,
    gate: Mutex<()>,
}

impl SingleFlight {
    pub fn new(inner: Arc<dyn InferenceEngine + Send + Sync>) -> Self {
        Self {
            inner,
            gate: Mutex::new(()),
        }
    }
}

impl InferenceEngine for SingleFlight {
    fn output_width(&self) -> usize {
        self.inner.output_width()
    }

    fn classify(&self, tensor: &Tensor) -> Result<ProbabilityVector, InferenceError> {
        // A panic inside a previous call leaves nothing to repair.
        let _guard = match self.gate.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        self.inner.classify(tensor)
    }
}

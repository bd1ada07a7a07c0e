use crate::detection_loop::core::LoopState;
use crate::detection_loop::error::LoopError;
use crate::model_loader::interface::ModelStatus;
use crate::ranker::RankedPredictions;

/// Presentation boundary. Called from the app and loop threads, so
/// implementations must not block for long.
pub trait ResultSink: Send + Sync {
    fn model_status(&self, status: &ModelStatus);

    fn loop_state(&self, state: LoopState);

    /// Ranked output of one iteration, highest probability first.
    fn predictions(&self, predictions: &RankedPredictions);

    fn error(&self, error: &LoopError);
}

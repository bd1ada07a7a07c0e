use crate::detection_loop::core::LoopState;
use crate::detection_loop::error::LoopError;
use crate::model_loader::interface::ModelStatus;
use crate::ranker::RankedPredictions;
use crate::result_sink::interface::ResultSink;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum SinkSignal {
    ModelStatus(ModelStatus),
    LoopState(LoopState),
    Predictions(RankedPredictions),
    Error(LoopError),
}

/// Forwards everything it receives to a channel so tests can wait on it.
pub struct ResultSinkFake {
    sender: Mutex<Sender<SinkSignal>>,
}

impl ResultSinkFake {
    pub fn new() -> (Self, Receiver<SinkSignal>) {
        let (sender, receiver) = channel();
        (
            Self {
                sender: Mutex::new(sender),
            },
            receiver,
        )
    }

    fn send(&self, signal: SinkSignal) {
        if let Ok(sender) = self.sender.lock() {
            let _ = sender.send(signal);
        }
    }
}

impl ResultSink for ResultSinkFake {
    fn model_status(&self, status: &ModelStatus) {
        self.send(SinkSignal::ModelStatus(status.clone()));
    }

    fn loop_state(&self, state: LoopState) {
        self.send(SinkSignal::LoopState(state));
    }

    fn predictions(&self, predictions: &RankedPredictions) {
        self.send(SinkSignal::Predictions(predictions.clone()));
    }

    fn error(&self, error: &LoopError) {
        self.send(SinkSignal::Error(error.clone()));
    }
}

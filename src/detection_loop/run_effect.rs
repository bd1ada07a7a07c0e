use super::main::DetectionLoop;
use crate::detection_loop::core::{Effect, Event, IterationOutcome};
use crate::detection_loop::error::IterationError;
use crate::frame_source::interface::Frame;
use crate::inference_engine::interface::InferenceError;
use crate::ranker::{rank, RankedPredictions};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::time::Instant;

impl DetectionLoop {
    pub fn run_effect(&self, effect: Effect) {
        if !matches!(effect, Effect::RunIteration { .. } | Effect::PublishPredictions(_)) {
            let _ = self.logger.info(&format!("Running effect: {:?}", effect));
        }

        match effect {
            Effect::SubscribeTick => {
                while !self.exited.load(Ordering::SeqCst) {
                    std::thread::sleep(self.config.tick_rate);
                    if self.event_sender.send(Event::Tick(Instant::now())).is_err() {
                        break;
                    }
                }
            }
            Effect::StartCamera { session } => {
                let result = self.frame_source.start();
                let _ = self
                    .event_sender
                    .send(Event::CameraStartDone { session, result });
            }
            Effect::StopCamera => {
                self.frame_source.stop();
                let _ = self.event_sender.send(Event::CameraStopDone);
            }
            Effect::RunIteration { session } => {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run_iteration(session)))
                    .unwrap_or_else(|_| {
                        let error = IterationError::InferenceFailure(InferenceError::Backend(
                            "iteration panicked".to_string(),
                        ));
                        let _ = self.logger.error(&format!("Iteration failed: {}", error));
                        IterationOutcome::Failed(error)
                    });

                let _ = self
                    .event_sender
                    .send(Event::IterationDone { session, outcome });
            }
            Effect::PublishPredictions(predictions) => self.sink.predictions(&predictions),
            Effect::PublishError(error) => {
                if error.is_transient() {
                    let _ = self.logger.warn(&error.to_string());
                } else {
                    let _ = self.logger.error(&error.to_string());
                }
                self.sink.error(&error);
            }
            Effect::Exit => self.exited.store(true, Ordering::SeqCst),
        }
    }

    /// One frame through preprocess, inference and ranking. Every tensor made
    /// here is dropped before this returns, whatever the outcome.
    pub fn run_iteration(&self, session: u64) -> IterationOutcome {
        if self.current_model().state.running_session() != Some(session) {
            return IterationOutcome::Cancelled;
        }

        let frame = match self.frame_source.current_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => return IterationOutcome::NoFrame,
            Err(error) => {
                let _ = self.logger.warn(&format!("Camera lost: {}", error));
                return IterationOutcome::DeviceLost(error);
            }
        };

        match self.classify_frame(&frame) {
            Ok(predictions) => IterationOutcome::Ranked(predictions),
            Err(error) => {
                let _ = self.logger.warn(&format!("Iteration failed: {}", error));
                IterationOutcome::Failed(error)
            }
        }
    }

    fn classify_frame(&self, frame: &Frame) -> Result<RankedPredictions, IterationError> {
        let tensor = self.preprocessor.prepare(frame)?;
        let probabilities = self.engine.classify(&tensor);
        drop(tensor);
        let probabilities = probabilities?;

        let expected = self.engine.output_width();
        if probabilities.len() != expected {
            return Err(InferenceError::OutputWidth {
                expected,
                actual: probabilities.len(),
            }
            .into());
        }

        Ok(rank(&probabilities, &self.labels))
    }
}

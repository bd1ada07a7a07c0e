use crate::inference_engine::interface::{InferenceEngine, InferenceError, ProbabilityVector};
use crate::preprocessor::tensor::Tensor;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

enum Scores {
    Fixed(ProbabilityVector),
    Random(usize),
}

/// Classifier stand-in. Counts calls and records the highest number of calls
/// that were ever running at once.
pub struct InferenceEngineFake {
    scores: Scores,
    latency: Duration,
    failures: Mutex<VecDeque<InferenceError>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl InferenceEngineFake {
    pub fn new(probabilities: ProbabilityVector) -> Self {
        Self::with_scores(Scores::Fixed(probabilities))
    }

    /// Random scores that sum to one.
    pub fn random(output_width: usize) -> Self {
        Self::with_scores(Scores::Random(output_width))
    }

    fn with_scores(scores: Scores) -> Self {
        Self {
            scores,
            latency: Duration::ZERO,
            failures: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// The next call fails with `error`.
    pub fn push_failure(&self, error: InferenceError) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push_back(error);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn scores(&self) -> ProbabilityVector {
        match &self.scores {
            Scores::Fixed(probabilities) => probabilities.clone(),
            Scores::Random(width) => {
                let raw: Vec<f32> = (0..*width).map(|_| rand::random::<f32>() + 1e-3).collect();
                let total: f32 = raw.iter().sum();
                raw.into_iter().map(|v| v / total).collect()
            }
        }
    }
}

impl InferenceEngine for InferenceEngineFake {
    fn output_width(&self) -> usize {
        match &self.scores {
            Scores::Fixed(probabilities) => probabilities.len(),
            Scores::Random(width) => *width,
        }
    }

    fn classify(&self, _tensor: &Tensor) -> Result<ProbabilityVector, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }

        let failure = self
            .failures
            .lock()
            .ok()
            .and_then(|mut failures| failures.pop_front());

        let result = match failure {
            Some(error) => Err(error),
            None => Ok(self.scores()),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

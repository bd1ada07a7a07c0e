use crate::config::Config;
use crate::detection_loop::core::LoopState;
use crate::detection_loop::main::{DetectionLoop, DetectionLoopHandle};
use crate::frame_source::impl_fake::{FakeFrames, FrameSourceFake};
use crate::frame_source::interface::Frame;
use crate::inference_engine::impl_fake::InferenceEngineFake;
use crate::library::logger::impl_fake::LoggerFake;
use crate::model_loader::interface::LoadedModel;
use crate::ranker::LabelSet;
use crate::result_sink::impl_fake::{ResultSinkFake, SinkSignal};
use image::RgbImage;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

pub const TIMEOUT: Duration = Duration::from_secs(5);

#[allow(dead_code)]
pub struct Fixture {
    pub config: Config,
    pub logger: LoggerFake,
    pub frame_source: Arc<FrameSourceFake>,
    pub engine: Arc<InferenceEngineFake>,
    pub signals: Receiver<SinkSignal>,
    pub detection_loop: DetectionLoop,
}

impl Fixture {
    pub fn new() -> Self {
        Self::build(
            Duration::from_millis(1),
            FrameSourceFake::new(
                Arc::new(LoggerFake::new()),
                FakeFrames::Fixed(frame(64, 48)),
            ),
            InferenceEngineFake::new(vec![0.82, 0.18]),
        )
    }

    pub fn build(
        tick_rate: Duration,
        frame_source: FrameSourceFake,
        engine: InferenceEngineFake,
    ) -> Self {
        let config = Config {
            tick_rate,
            ..Config::default()
        };
        let logger = LoggerFake::new();
        let frame_source = Arc::new(frame_source);
        let engine = Arc::new(engine);
        let (sink, signals) = ResultSinkFake::new();

        let loaded = LoadedModel {
            engine: engine.clone(),
            labels: LabelSet::new(vec!["Phone".to_string(), "NoPhone".to_string()]),
        };

        let detection_loop = DetectionLoop::new(
            config.clone(),
            Arc::new(logger.clone()),
            frame_source.clone(),
            loaded,
            Arc::new(sink),
        );

        Self {
            config,
            logger,
            frame_source,
            engine,
            signals,
            detection_loop,
        }
    }

    /// Runs the loop on its own thread.
    pub fn spawn(&self) -> (DetectionLoopHandle, JoinHandle<()>) {
        let detection_loop = self.detection_loop.clone();
        let running = std::thread::spawn(move || {
            let _ = detection_loop.run();
        });
        (self.detection_loop.handle(), running)
    }

    /// Skips signals until one matches.
    pub fn wait_for(&self, matches: impl Fn(&SinkSignal) -> bool) -> SinkSignal {
        loop {
            match self.signals.recv_timeout(TIMEOUT) {
                Ok(signal) if matches(&signal) => return signal,
                Ok(_) => continue,
                Err(e) => panic!("timed out waiting for signal: {}", e),
            }
        }
    }

    pub fn wait_for_state(&self, state: LoopState) {
        self.wait_for(|signal| *signal == SinkSignal::LoopState(state));
    }

    /// Collects every loop state published until `last` shows up.
    pub fn states_until(&self, last: LoopState) -> Vec<LoopState> {
        let mut states = Vec::new();
        loop {
            match self.signals.recv_timeout(TIMEOUT) {
                Ok(SinkSignal::LoopState(state)) => {
                    states.push(state);
                    if state == last {
                        return states;
                    }
                }
                Ok(_) => continue,
                Err(e) => panic!("timed out after states {:?}: {}", states, e),
            }
        }
    }
}

pub fn frame(width: u32, height: u32) -> Frame {
    Frame::new(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }))
}

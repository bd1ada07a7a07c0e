use crate::frame_source::interface::{CameraRequest, Frame, FrameSource, FrameSourceError};
use crate::library::logger::interface::Logger;
use image::RgbImage;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum FakeFrames {
    /// The device never delivers a frame.
    Never,
    Fixed(Frame),
    /// A fresh frame of random pixels on every pull.
    Noise { width: u32, height: u32 },
}

pub struct FrameSourceFake {
    logger: Arc<dyn Logger + Send + Sync>,
    frames: Mutex<FakeFrames>,
    start_results: Mutex<VecDeque<Result<(), FrameSourceError>>>,
    start_delay: Duration,
    active: AtomicBool,
    lost: AtomicBool,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
}

impl FrameSourceFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>, frames: FakeFrames) -> Self {
        Self {
            logger: logger.with_namespace("camera").with_namespace("fake"),
            frames: Mutex::new(frames),
            start_results: Mutex::new(VecDeque::new()),
            start_delay: Duration::ZERO,
            active: AtomicBool::new(false),
            lost: AtomicBool::new(false),
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
        }
    }

    /// Noise frames at the requested size. The facing hint is only logged.
    pub fn from_request(logger: Arc<dyn Logger + Send + Sync>, request: CameraRequest) -> Self {
        let _ = logger.info(&format!(
            "Fake camera for {}x{} {:?}-facing request",
            request.width, request.height, request.facing
        ));
        Self::new(
            logger,
            FakeFrames::Noise {
                width: request.width,
                height: request.height,
            },
        )
    }

    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    /// Queues the outcome of the next `start` call. Unscripted calls succeed.
    pub fn push_start_result(&self, result: Result<(), FrameSourceError>) {
        if let Ok(mut results) = self.start_results.lock() {
            results.push_back(result);
        }
    }

    pub fn set_frames(&self, frames: FakeFrames) {
        if let Ok(mut current) = self.frames.lock() {
            *current = frames;
        }
    }

    /// Simulates the device being unplugged while capturing.
    pub fn lose_device(&self) {
        self.lost.store(true, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

impl FrameSource for FrameSourceFake {
    fn start(&self) -> Result<(), FrameSourceError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        let _ = self.logger.info("Starting camera...");

        if !self.start_delay.is_zero() {
            std::thread::sleep(self.start_delay);
        }

        let scripted = self
            .start_results
            .lock()
            .ok()
            .and_then(|mut results| results.pop_front());

        if let Some(Err(error)) = scripted {
            let _ = self.logger.error(&format!("Camera failed to start: {}", error));
            return Err(error);
        }

        self.lost.store(false, Ordering::SeqCst);
        self.active.store(true, Ordering::SeqCst);
        let _ = self.logger.info("Camera started");
        Ok(())
    }

    fn stop(&self) {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        if self.active.swap(false, Ordering::SeqCst) {
            let _ = self.logger.info("Camera stopped");
        }
    }

    fn current_frame(&self) -> Result<Option<Frame>, FrameSourceError> {
        if !self.is_active() {
            return Ok(None);
        }

        if self.lost.load(Ordering::SeqCst) {
            return Err(FrameSourceError::DeviceUnavailable(
                "fake camera disconnected".to_string(),
            ));
        }

        let frames = match self.frames.lock() {
            Ok(frames) => frames.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };

        let frame = match frames {
            FakeFrames::Never => None,
            FakeFrames::Fixed(frame) => Some(frame),
            FakeFrames::Noise { width, height } => Some(noise_frame(width, height)),
        };

        Ok(frame)
    }
}

fn noise_frame(width: u32, height: u32) -> Frame {
    Frame::new(RgbImage::from_fn(width, height, |_, _| {
        image::Rgb([rand::random::<u8>(), rand::random::<u8>(), rand::random::<u8>()])
    }))
}

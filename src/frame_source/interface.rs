use image::RgbImage;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Front,
    /// Rear-facing camera on devices that have one.
    Rear,
}

/// What the loop asks of the capture device. Backends treat these as hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraRequest {
    pub width: u32,
    pub height: u32,
    pub facing: Facing,
}

/// Immutable snapshot of one decoded RGB frame. Cloning shares the pixels.
#[derive(Debug, Clone)]
pub struct Frame {
    image: Arc<RgbImage>,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameSourceError {
    DeviceUnavailable(String),
    PermissionDenied,
}

impl fmt::Display for FrameSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameSourceError::DeviceUnavailable(msg) => write!(f, "camera unavailable: {msg}"),
            FrameSourceError::PermissionDenied => write!(f, "camera permission denied"),
        }
    }
}

impl std::error::Error for FrameSourceError {}

pub trait FrameSource: Send + Sync {
    /// Acquires the device. Calling it while already started is a no-op.
    fn start(&self) -> Result<(), FrameSourceError>;

    /// Releases the device. Idempotent and infallible.
    fn stop(&self);

    /// The most recent frame, or `None` until the device has produced one
    /// since `start`. `Err` means the device went away while running.
    fn current_frame(&self) -> Result<Option<Frame>, FrameSourceError>;
}

use crate::frame_source::interface::Frame;
use crate::preprocessor::tensor::{Tensor, TensorAllocations};
use image::imageops::{self, FilterType};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreprocessError {
    InvalidFrame { width: u32, height: u32 },
}

impl fmt::Display for PreprocessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreprocessError::InvalidFrame { width, height } => {
                write!(f, "InvalidFrame: {width}x{height} frame has no pixels")
            }
        }
    }
}

impl std::error::Error for PreprocessError {}

/// Turns camera frames into `[1, height, width, 3]` tensors with values in
/// `[0, 1]`.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    width: u32,
    height: u32,
    allocations: TensorAllocations,
}

impl Preprocessor {
    /// `input_shape` is `(height, width)`.
    pub fn new(input_shape: (u32, u32)) -> Self {
        Self {
            height: input_shape.0,
            width: input_shape.1,
            allocations: TensorAllocations::new(),
        }
    }

    /// Tensors created by this preprocessor that have not been dropped yet.
    pub fn outstanding(&self) -> usize {
        self.allocations.outstanding()
    }

    pub fn prepare(&self, frame: &Frame) -> Result<Tensor, PreprocessError> {
        if frame.is_empty() {
            return Err(PreprocessError::InvalidFrame {
                width: frame.width(),
                height: frame.height(),
            });
        }

        // Triangle is bilinear. The frame is stretched, not letterboxed.
        let resized = imageops::resize(frame.image(), self.width, self.height, FilterType::Triangle);

        let data = resized
            .as_raw()
            .iter()
            .map(|&value| f32::from(value) / 255.0)
            .collect();

        Ok(self.allocations.tensor(
            [1, self.height as usize, self.width as usize, 3],
            data,
        ))
    }
}

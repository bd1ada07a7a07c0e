use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts tensors that are alive right now. Every `Tensor` holds a slot
/// until it is dropped.
#[derive(Debug, Clone, Default)]
pub struct TensorAllocations {
    live: Arc<AtomicUsize>,
}

impl TensorAllocations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outstanding(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn tensor(&self, shape: [usize; 4], data: Vec<f32>) -> Tensor {
        debug_assert_eq!(shape.iter().product::<usize>(), data.len());
        self.live.fetch_add(1, Ordering::SeqCst);
        Tensor {
            shape,
            data,
            live: self.live.clone(),
        }
    }
}

/// Dense `f32` buffer in NHWC layout.
#[derive(Debug)]
pub struct Tensor {
    shape: [usize; 4],
    data: Vec<f32>,
    live: Arc<AtomicUsize>,
}

impl Tensor {
    /// `[batch, height, width, channels]`
    pub fn shape(&self) -> [usize; 4] {
        self.shape
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[cfg(test)]
    pub fn get(&self, y: usize, x: usize, c: usize) -> Option<f32> {
        let [_, height, width, channels] = self.shape;
        if y >= height || x >= width || c >= channels {
            return None;
        }
        self.data.get((y * width + x) * channels + c).copied()
    }
}

impl Drop for Tensor {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub onnx_model_path: String,
    /// JSON document carrying the class names. Optional.
    pub metadata_path: Option<String>,
    /// `(height, width)` the model was trained on.
    pub input_shape: (u32, u32),
}

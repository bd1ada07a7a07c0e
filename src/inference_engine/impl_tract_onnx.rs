use crate::inference_engine::interface::{
    check_input_shape, InferenceEngine, InferenceError, ProbabilityVector,
};
use crate::model_loader::interface::ModelLoadError;
use crate::model_loader::model_config::ModelConfig;
use crate::preprocessor::tensor::Tensor;
use tract_onnx::prelude::*;

/// ONNX classifier taking `[1, height, width, 3]` input in `[0, 1]` and
/// producing one score per class.
pub struct InferenceEngineTractOnnx {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>,
    input_shape: [usize; 4],
    output_width: usize,
}

impl InferenceEngineTractOnnx {
    pub fn new(config: &ModelConfig) -> Result<Self, ModelLoadError> {
        let (height, width) = config.input_shape;
        let input_shape = [1, height as usize, width as usize, 3];

        let model = tract_onnx::onnx()
            .model_for_path(&config.onnx_model_path)
            .and_then(|model| model.with_input_fact(0, f32::fact(input_shape).into()))
            .and_then(|model| model.into_optimized())
            .map_err(|e| ModelLoadError::Model(format!("{}: {}", config.onnx_model_path, e)))?;

        let output_width = model
            .output_fact(0)
            .ok()
            .and_then(|fact| fact.shape.as_concrete().and_then(|dims| dims.last().copied()))
            .ok_or_else(|| {
                ModelLoadError::Model(format!(
                    "{}: output shape is not concrete",
                    config.onnx_model_path
                ))
            })?;

        let model = model
            .into_runnable()
            .map_err(|e| ModelLoadError::Model(e.to_string()))?;

        Ok(Self {
            model,
            input_shape,
            output_width,
        })
    }
}

impl InferenceEngine for InferenceEngineTractOnnx {
    fn output_width(&self) -> usize {
        self.output_width
    }

    fn classify(&self, tensor: &Tensor) -> Result<ProbabilityVector, InferenceError> {
        check_input_shape(tensor, self.input_shape)?;

        let [batch, height, width, channels] = self.input_shape;
        let input = tract_ndarray::Array4::from_shape_vec(
            (batch, height, width, channels),
            tensor.as_slice().to_vec(),
        )
        .map_err(|e| InferenceError::Backend(e.to_string()))?
        .into_tensor();

        let outputs = self
            .model
            .run(tvec!(input.into_tvalue()))
            .map_err(|e| InferenceError::Backend(e.to_string()))?;

        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::Backend("model produced no output".to_string()))?
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::Backend(e.to_string()))?;

        Ok(output.iter().copied().collect())
    }
}

use chrono::Offset;
use crate::frame_source::interface::{CameraRequest, Facing};
use crate::model_loader::model_config::ModelConfig;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayKind {
    Console,
    Gui,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Cadence of the detection loop; one tick per display refresh.
    pub tick_rate: Duration,
    pub camera: CameraRequest,
    /// Serve this image file as the camera frame instead of synthetic frames.
    pub still_image_path: Option<String>,
    pub model: ModelConfig,
    pub display: DisplayKind,
    pub logger_timezone: chrono::FixedOffset,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_rate: Duration::from_millis(16),
            camera: CameraRequest {
                width: 640,
                height: 480,
                facing: Facing::Rear,
            },
            still_image_path: None,
            model: ModelConfig {
                onnx_model_path: "./models/model.onnx".to_string(),
                metadata_path: Some("./models/metadata.json".to_string()),
                input_shape: (224, 224),
            },
            display: DisplayKind::Console,
            logger_timezone: utc(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("LIVE_CLASSIFIER_MODEL") {
            config.model.onnx_model_path = path;
        }

        if let Ok(path) = std::env::var("LIVE_CLASSIFIER_METADATA") {
            config.model.metadata_path = if path.is_empty() { None } else { Some(path) };
        }

        if let Ok(path) = std::env::var("LIVE_CLASSIFIER_IMAGE") {
            config.still_image_path = Some(path);
        }

        if let Ok(facing) = std::env::var("LIVE_CLASSIFIER_FACING") {
            config.camera.facing = match facing.to_lowercase().as_str() {
                "front" | "user" => Facing::Front,
                _ => Facing::Rear,
            };
        }

        if let Ok(display) = std::env::var("LIVE_CLASSIFIER_DISPLAY") {
            config.display = match display.to_lowercase().as_str() {
                "gui" => DisplayKind::Gui,
                _ => DisplayKind::Console,
            };
        }

        config
    }
}

fn utc() -> chrono::FixedOffset {
    chrono::Utc.fix()
}

use crate::frame_source::interface::{Frame, FrameSource, FrameSourceError};
use crate::library::logger::interface::Logger;
use std::sync::{Arc, Mutex};

/// Serves a single decoded image file as the live frame. Stands in for a
/// camera on machines without one.
pub struct FrameSourceStillImage {
    path: String,
    logger: Arc<dyn Logger + Send + Sync>,
    frame: Mutex<Option<Frame>>,
}

impl FrameSourceStillImage {
    pub fn new(path: impl Into<String>, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            path: path.into(),
            logger: logger.with_namespace("camera").with_namespace("still_image"),
            frame: Mutex::new(None),
        }
    }
}

impl FrameSource for FrameSourceStillImage {
    fn start(&self) -> Result<(), FrameSourceError> {
        let _ = self.logger.info(&format!("Opening {}", self.path));

        let image = image::open(&self.path).map_err(|e| match &e {
            image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
                FrameSourceError::PermissionDenied
            }
            _ => FrameSourceError::DeviceUnavailable(format!("{}: {}", self.path, e)),
        })?;
        let frame = Frame::new(image.to_rgb8());

        let _ = self.logger.info(&format!(
            "Serving {}x{} frame",
            frame.width(),
            frame.height()
        ));

        let mut current = self
            .frame
            .lock()
            .map_err(|_| FrameSourceError::DeviceUnavailable("frame slot poisoned".to_string()))?;
        *current = Some(frame);
        Ok(())
    }

    fn stop(&self) {
        let mut current = match self.frame.lock() {
            Ok(current) => current,
            Err(poisoned) => poisoned.into_inner(),
        };
        if current.take().is_some() {
            let _ = self.logger.info("Released frame");
        }
    }

    fn current_frame(&self) -> Result<Option<Frame>, FrameSourceError> {
        let current = match self.frame.lock() {
            Ok(current) => current,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(current.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::logger::impl_fake::LoggerFake;

    #[test]
    fn test_missing_file_is_device_unavailable() {
        let source = FrameSourceStillImage::new(
            "./does/not/exist.png",
            Arc::new(LoggerFake::new()),
        );

        assert!(matches!(
            source.start(),
            Err(FrameSourceError::DeviceUnavailable(_))
        ));
        assert!(source.current_frame().unwrap().is_none());
    }

    #[test]
    fn test_serves_decoded_image_until_stopped() {
        let path = std::env::temp_dir().join("live_classifier_still_image_test.png");
        image::RgbImage::from_pixel(8, 6, image::Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let source = FrameSourceStillImage::new(
            path.to_string_lossy().to_string(),
            Arc::new(LoggerFake::new()),
        );
        source.start().unwrap();

        let frame = source.current_frame().unwrap().unwrap();
        assert_eq!((frame.width(), frame.height()), (8, 6));
        assert_eq!(frame.image().get_pixel(0, 0).0, [10, 20, 30]);

        source.stop();
        assert!(source.current_frame().unwrap().is_none());

        let _ = std::fs::remove_file(path);
    }
}

use crate::config::Config;
use crate::detection_loop::core::LoopState;
use crate::detection_loop::main::DetectionLoop;
use crate::frame_source::interface::FrameSource;
use crate::library::logger::interface::Logger;
use crate::model_loader::interface::{LoadedModel, ModelLoader, ModelStatus};
use crate::result_sink::interface::ResultSink;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

/// Requests coming from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Reload the model after a failed load.
    Retry,
    Start,
    Stop,
    Shutdown,
}

pub struct App {
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    loader: Arc<dyn ModelLoader + Send + Sync>,
    frame_source: Arc<dyn FrameSource + Send + Sync>,
    sink: Arc<dyn ResultSink + Send + Sync>,
}

impl App {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        loader: Arc<dyn ModelLoader + Send + Sync>,
        frame_source: Arc<dyn FrameSource + Send + Sync>,
        sink: Arc<dyn ResultSink + Send + Sync>,
    ) -> Self {
        Self {
            config,
            logger,
            loader,
            frame_source,
            sink,
        }
    }

    /// Loads the model, then drives the detection loop from `commands` until
    /// `Shutdown` arrives or every sender is gone.
    pub fn run(
        &self,
        commands: Receiver<Command>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let loaded = match self.load_model(&commands) {
            Some(loaded) => loaded,
            None => {
                let _ = self.logger.info("Shut down before the model was ready");
                return Ok(());
            }
        };

        let detection_loop = DetectionLoop::new(
            self.config.clone(),
            self.logger.clone(),
            self.frame_source.clone(),
            loaded,
            self.sink.clone(),
        );
        let handle = detection_loop.handle();
        let worker = std::thread::spawn(move || detection_loop.run());

        for command in commands.iter() {
            let sent = match command {
                Command::Start => {
                    let state = handle.loop_state();
                    if state != LoopState::Idle {
                        let _ = self
                            .logger
                            .info(&format!("Start ignored while {:?}", state));
                    }
                    handle.start()
                }
                Command::Stop => handle.stop(),
                Command::Retry => Ok(()),
                Command::Shutdown => break,
            };

            if sent.is_err() {
                break;
            }
        }

        let _ = self.logger.info("Shutting down...");
        let _ = handle.shutdown();

        match worker.join() {
            Ok(result) => result,
            Err(_) => Err("detection loop panicked".into()),
        }
    }

    /// Returns `None` when told to shut down before a load succeeded.
    fn load_model(&self, commands: &Receiver<Command>) -> Option<LoadedModel> {
        loop {
            self.sink.model_status(&ModelStatus::Loading);
            let _ = self.logger.info("Loading model...");

            match self.loader.load() {
                Ok(loaded) => {
                    let classes = loaded.labels.len();
                    let _ = self
                        .logger
                        .info(&format!("Model ready with {} classes", classes));
                    self.sink.model_status(&ModelStatus::Ready { classes });
                    return Some(loaded);
                }
                Err(error) => {
                    let _ = self.logger.error(&error.to_string());
                    self.sink.model_status(&ModelStatus::Failed(error.to_string()));
                }
            }

            loop {
                match commands.recv() {
                    Ok(Command::Retry) => break,
                    Ok(Command::Shutdown) | Err(_) => return None,
                    Ok(command) => {
                        let _ = self
                            .logger
                            .warn(&format!("Ignoring {:?}, model is not loaded", command));
                    }
                }
            }
        }
    }
}

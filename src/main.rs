use app::{App, Command};
use config::{Config, DisplayKind};
use frame_source::impl_fake::FrameSourceFake;
use frame_source::impl_still_image::FrameSourceStillImage;
use frame_source::interface::FrameSource;
use library::logger::impl_console::LoggerConsole;
use library::logger::interface::Logger;
use model_loader::impl_tract_onnx::ModelLoaderTractOnnx;
use result_sink::impl_console::{spawn_stdin_controls, ResultSinkConsole};
use result_sink::impl_gui::{run_window, ResultSinkGui};
use std::sync::mpsc::channel;
use std::sync::Arc;

mod app;
mod config;
mod detection_loop;
mod frame_source;
mod inference_engine;
mod library;
mod model_loader;
mod preprocessor;
mod ranker;
mod result_sink;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env();

    let logger: Arc<dyn Logger + Send + Sync> =
        Arc::new(LoggerConsole::new(config.logger_timezone));

    let frame_source: Arc<dyn FrameSource + Send + Sync> = match &config.still_image_path {
        Some(path) => Arc::new(FrameSourceStillImage::new(path, logger.clone())),
        None => Arc::new(FrameSourceFake::from_request(logger.clone(), config.camera)),
    };

    let loader = Arc::new(ModelLoaderTractOnnx::new(config.model.clone(), logger.clone()));

    let (commands, receiver) = channel();

    match config.display {
        DisplayKind::Console => {
            let sink = Arc::new(ResultSinkConsole::default());
            let app = App::new(config, logger, loader, frame_source, sink);

            let _ = commands.send(Command::Start);
            spawn_stdin_controls(commands);

            app.run(receiver)
        }
        DisplayKind::Gui => {
            let sink = Arc::new(ResultSinkGui::new());
            let window = sink.window(commands.clone());
            let app = App::new(config, logger.clone(), loader, frame_source, sink);

            let running = std::thread::spawn(move || app.run(receiver));

            if let Err(e) = run_window(window) {
                let _ = logger.error(&format!("Window failed: {}", e));
            }

            let _ = commands.send(Command::Shutdown);
            match running.join() {
                Ok(result) => result,
                Err(_) => Err("app thread panicked".into()),
            }
        }
    }
}

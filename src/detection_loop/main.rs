use crate::config::Config;
use crate::detection_loop::core::{init, transition, Effect, Event, LoopState, Model};
use crate::frame_source::interface::FrameSource;
use crate::inference_engine::interface::InferenceEngine;
use crate::inference_engine::single_flight::SingleFlight;
use crate::library::logger::interface::Logger;
use crate::model_loader::interface::LoadedModel;
use crate::preprocessor::preprocess::Preprocessor;
use crate::ranker::LabelSet;
use crate::result_sink::interface::ResultSink;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, SendError, Sender};
use std::sync::{Arc, Mutex};

/// Owns the loop state. `run` blocks the calling thread until shutdown;
/// everything else talks to it through a `DetectionLoopHandle`.
#[derive(Clone)]
pub struct DetectionLoop {
    pub config: Config,
    pub logger: Arc<dyn Logger + Send + Sync>,
    pub frame_source: Arc<dyn FrameSource + Send + Sync>,
    pub preprocessor: Preprocessor,
    pub engine: Arc<dyn InferenceEngine + Send + Sync>,
    pub labels: LabelSet,
    pub sink: Arc<dyn ResultSink + Send + Sync>,
    pub model: Arc<Mutex<Model>>,
    pub event_sender: Sender<Event>,
    pub event_receiver: Arc<Mutex<Receiver<Event>>>,
    pub exited: Arc<AtomicBool>,
}

/// Cheap to clone. Sends fail only once the loop has exited.
#[derive(Clone)]
pub struct DetectionLoopHandle {
    event_sender: Sender<Event>,
    model: Arc<Mutex<Model>>,
}

impl DetectionLoopHandle {
    pub fn start(&self) -> Result<(), SendError<Event>> {
        self.event_sender.send(Event::StartRequested)
    }

    pub fn stop(&self) -> Result<(), SendError<Event>> {
        self.event_sender.send(Event::StopRequested)
    }

    pub fn shutdown(&self) -> Result<(), SendError<Event>> {
        self.event_sender.send(Event::Shutdown)
    }

    pub fn loop_state(&self) -> LoopState {
        snapshot(&self.model).state.loop_state()
    }
}

fn snapshot(model: &Mutex<Model>) -> Model {
    match model.lock() {
        Ok(model) => model.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

impl DetectionLoop {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        frame_source: Arc<dyn FrameSource + Send + Sync>,
        loaded: LoadedModel,
        sink: Arc<dyn ResultSink + Send + Sync>,
    ) -> Self {
        let (event_sender, event_receiver) = channel();
        let preprocessor = Preprocessor::new(config.model.input_shape);

        Self {
            logger: logger.with_namespace("detection_loop"),
            frame_source,
            preprocessor,
            engine: Arc::new(SingleFlight::new(loaded.engine)),
            labels: loaded.labels,
            sink,
            model: Arc::new(Mutex::new(init().0)),
            event_sender,
            event_receiver: Arc::new(Mutex::new(event_receiver)),
            exited: Arc::new(AtomicBool::new(false)),
            config,
        }
    }

    pub fn handle(&self) -> DetectionLoopHandle {
        DetectionLoopHandle {
            event_sender: self.event_sender.clone(),
            model: self.model.clone(),
        }
    }

    pub fn current_model(&self) -> Model {
        snapshot(&self.model)
    }

    /// Tensors currently alive. Zero whenever no iteration is in flight.
    pub fn outstanding_tensors(&self) -> usize {
        self.preprocessor.outstanding()
    }

    fn set_model(&self, model: Model) {
        match self.model.lock() {
            Ok(mut current) => *current = model,
            Err(poisoned) => *poisoned.into_inner() = model,
        }
    }

    pub fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let receiver = self
            .event_receiver
            .lock()
            .map_err(|e| format!("event receiver poisoned: {}", e))?;

        let (initial, effects) = init();
        self.set_model(initial.clone());
        self.exited.store(false, Ordering::SeqCst);
        self.sink.loop_state(initial.state.loop_state());
        self.run_effects(effects);

        let mut current_model = initial;

        loop {
            let event = receiver.recv()?;

            if !event.is_noisy() {
                let _ = self
                    .logger
                    .info(&format!("event: {}", event.to_display_string()));
            }

            let previous = current_model.state.loop_state();
            let (new_model, effects) = transition(current_model, event);
            self.set_model(new_model.clone());

            let next = new_model.state.loop_state();
            if next != previous {
                let _ = self
                    .logger
                    .info(&format!("state: {:?} -> {:?}", previous, next));
                self.sink.loop_state(next);
            }

            current_model = new_model;

            let exit = effects.contains(&Effect::Exit);
            self.run_effects(effects);

            if exit {
                return Ok(());
            }
        }
    }

    /// Effects that may block run on their own thread and report back as
    /// events. The rest run inline, in order.
    fn run_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubscribeTick | Effect::StartCamera { .. } | Effect::RunIteration { .. } => {
                    let self_clone = self.clone();
                    std::thread::spawn(move || self_clone.run_effect(effect));
                }
                _ => self.run_effect(effect),
            }
        }
    }
}

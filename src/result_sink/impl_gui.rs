use crate::app::Command;
use crate::detection_loop::core::LoopState;
use crate::detection_loop::error::LoopError;
use crate::model_loader::interface::ModelStatus;
use crate::ranker::RankedPredictions;
use crate::result_sink::interface::ResultSink;
use eframe::egui;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

const GREEN: egui::Color32 = egui::Color32::from_rgb(76, 175, 80);
const AMBER: egui::Color32 = egui::Color32::from_rgb(255, 193, 7);
const RED: egui::Color32 = egui::Color32::from_rgb(244, 67, 54);

#[derive(Debug, Clone, Default)]
struct View {
    model_status: Option<ModelStatus>,
    loop_state: LoopState,
    predictions: Option<RankedPredictions>,
    last_error: Option<String>,
}

fn lock(view: &Mutex<View>) -> MutexGuard<'_, View> {
    match view.lock() {
        Ok(view) => view,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub fn top_color(probability: f32) -> egui::Color32 {
    if probability > 0.5 {
        GREEN
    } else {
        AMBER
    }
}

/// Caption shown above the results once the model is loaded.
fn classes_caption(status: Option<&ModelStatus>) -> Option<String> {
    match status {
        Some(ModelStatus::Ready { classes }) => Some(format!("{} classes detected", classes)),
        _ => None,
    }
}

pub fn row_color(probability: f32) -> egui::Color32 {
    if probability > 0.7 {
        GREEN
    } else if probability > 0.4 {
        AMBER
    } else {
        RED
    }
}

/// Sink side of the window. Writes into the shared view the window draws.
pub struct ResultSinkGui {
    view: Arc<Mutex<View>>,
    context: Arc<Mutex<Option<egui::Context>>>,
}

impl ResultSinkGui {
    pub fn new() -> Self {
        Self {
            view: Arc::new(Mutex::new(View::default())),
            context: Arc::new(Mutex::new(None)),
        }
    }

    /// The window reads the same view this sink writes and sends button
    /// presses to `commands`.
    pub fn window(&self, commands: Sender<Command>) -> ClassifierWindow {
        ClassifierWindow {
            view: self.view.clone(),
            context: self.context.clone(),
            commands,
        }
    }

    fn update(&self, apply: impl FnOnce(&mut View)) {
        apply(&mut lock(&self.view));

        if let Ok(context) = self.context.lock() {
            if let Some(context) = context.as_ref() {
                context.request_repaint();
            }
        }
    }
}

impl Default for ResultSinkGui {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultSink for ResultSinkGui {
    fn model_status(&self, status: &ModelStatus) {
        self.update(|view| view.model_status = Some(status.clone()));
    }

    fn loop_state(&self, state: LoopState) {
        self.update(|view| {
            if state == LoopState::Starting {
                view.predictions = None;
                view.last_error = None;
            }
            view.loop_state = state;
        });
    }

    fn predictions(&self, predictions: &RankedPredictions) {
        self.update(|view| {
            view.predictions = Some(predictions.clone());
            view.last_error = None;
        });
    }

    fn error(&self, error: &LoopError) {
        self.update(|view| view.last_error = Some(error.to_string()));
    }
}

pub struct ClassifierWindow {
    view: Arc<Mutex<View>>,
    context: Arc<Mutex<Option<egui::Context>>>,
    commands: Sender<Command>,
}

impl ClassifierWindow {
    fn send(&self, command: Command) {
        let _ = self.commands.send(command);
    }

    fn model_panel(&self, ui: &mut egui::Ui, status: Option<&ModelStatus>) -> bool {
        match status {
            None | Some(ModelStatus::Loading) => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading model...");
                });
                false
            }
            Some(ModelStatus::Failed(message)) => {
                ui.colored_label(RED, format!("Model failed to load: {}", message));
                if ui.button("Retry").clicked() {
                    self.send(Command::Retry);
                }
                false
            }
            Some(ModelStatus::Ready { .. }) => true,
        }
    }

    fn controls(&self, ui: &mut egui::Ui, state: LoopState) {
        ui.horizontal(|ui| {
            let idle = state == LoopState::Idle;
            if ui.add_enabled(idle, egui::Button::new("Start")).clicked() {
                self.send(Command::Start);
            }
            let active = matches!(state, LoopState::Starting | LoopState::Running);
            if ui.add_enabled(active, egui::Button::new("Stop")).clicked() {
                self.send(Command::Stop);
            }
            ui.label(format!("{:?}", state));
        });
    }

    fn predictions_panel(&self, ui: &mut egui::Ui, view: &View) {
        let predictions = match &view.predictions {
            Some(predictions) if view.loop_state == LoopState::Running => predictions,
            _ => {
                if view.loop_state == LoopState::Running {
                    ui.label("Analyzing...");
                }
                return;
            }
        };

        if let Some(caption) = classes_caption(view.model_status.as_ref()) {
            ui.label(caption);
        }

        if let Some(top) = predictions.top() {
            ui.label(
                egui::RichText::new(format!(
                    "{} {:.1}%",
                    top.label,
                    top.probability * 100.0
                ))
                .size(28.0)
                .strong()
                .color(top_color(top.probability)),
            );
        }

        ui.add_space(8.0);

        for prediction in predictions.as_slice() {
            ui.horizontal(|ui| {
                ui.add_sized([140.0, 18.0], egui::Label::new(prediction.label.as_str()));

                let (rect, _) =
                    ui.allocate_exact_size(egui::vec2(200.0, 14.0), egui::Sense::hover());
                let painter = ui.painter();
                painter.rect_filled(rect, 3.0, egui::Color32::from_gray(60));
                let filled = egui::Rect::from_min_size(
                    rect.min,
                    egui::vec2(
                        rect.width() * prediction.probability.clamp(0.0, 1.0),
                        rect.height(),
                    ),
                );
                painter.rect_filled(filled, 3.0, row_color(prediction.probability));

                ui.label(format!("{:.1}%", prediction.probability * 100.0));
            });
        }
    }
}

impl eframe::App for ClassifierWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Ok(mut context) = self.context.lock() {
            if context.is_none() {
                *context = Some(ctx.clone());
            }
        }

        let view = lock(&self.view).clone();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Live classifier");
            ui.separator();

            if !self.model_panel(ui, view.model_status.as_ref()) {
                return;
            }

            self.controls(ui, view.loop_state);

            if let Some(error) = &view.last_error {
                ui.colored_label(AMBER, error.as_str());
            }

            ui.separator();
            self.predictions_panel(ui, &view);
        });

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

pub fn run_window(window: ClassifierWindow) -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([420.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Live classifier",
        options,
        Box::new(|_cc| Box::new(window)),
    )
}

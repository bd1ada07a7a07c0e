use crate::app::Command;
use crate::detection_loop::core::LoopState;
use crate::detection_loop::error::LoopError;
use crate::model_loader::interface::ModelStatus;
use crate::ranker::RankedPredictions;
use crate::result_sink::interface::ResultSink;
use std::io::BufRead;
use std::sync::mpsc::Sender;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const BAR_WIDTH: usize = 20;
const LABEL_WIDTH: usize = 16;

/// Text rendering of the ranked list. Predictions arrive once per frame, so
/// repeats inside `min_interval` are dropped.
pub struct ResultSinkConsole {
    min_interval: Duration,
    last_printed: Mutex<Option<Instant>>,
}

impl ResultSinkConsole {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_printed: Mutex::new(None),
        }
    }

    fn should_print(&self) -> bool {
        let mut last_printed = match self.last_printed.lock() {
            Ok(last_printed) => last_printed,
            Err(poisoned) => poisoned.into_inner(),
        };

        let due = last_printed.map_or(true, |at| at.elapsed() >= self.min_interval);
        if due {
            *last_printed = Some(Instant::now());
        }
        due
    }
}

impl Default for ResultSinkConsole {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

impl ResultSink for ResultSinkConsole {
    fn model_status(&self, status: &ModelStatus) {
        match status {
            ModelStatus::Loading => println!("Loading model..."),
            ModelStatus::Ready { classes } => println!("Model ready ({} classes)", classes),
            ModelStatus::Failed(message) => {
                println!("Model failed to load: {}", message);
                println!("Type 'r' and press enter to retry.");
            }
        }
    }

    fn loop_state(&self, state: LoopState) {
        match state {
            LoopState::Starting => println!("Starting camera..."),
            LoopState::Running => println!("Analyzing..."),
            LoopState::Stopping => println!("Stopping..."),
            LoopState::Idle => println!("Idle. Type 'start' to begin."),
        }
    }

    fn predictions(&self, predictions: &RankedPredictions) {
        if predictions.is_empty() || !self.should_print() {
            return;
        }

        for line in render_lines(predictions) {
            println!("{}", line);
        }
    }

    fn error(&self, error: &LoopError) {
        println!("Error: {}", error);
    }
}

pub fn render_lines(predictions: &RankedPredictions) -> Vec<String> {
    let rows: Vec<String> = predictions
        .iter()
        .map(|prediction| {
            let probability = prediction.probability.clamp(0.0, 1.0);
            let filled = (probability * BAR_WIDTH as f32).round() as usize;
            let label: String = prediction.label.chars().take(LABEL_WIDTH).collect();
            format!(
                "│ {:<label_width$} {}{} {:>5.1}% │",
                label,
                "█".repeat(filled),
                "░".repeat(BAR_WIDTH - filled),
                probability * 100.0,
                label_width = LABEL_WIDTH,
            )
        })
        .collect();

    // label + bar + percentage + separating spaces
    let inner = LABEL_WIDTH + BAR_WIDTH + 6 + 4;
    let mut lines = Vec::with_capacity(predictions.len() + 2);
    lines.push(format!("┌{}┐", "─".repeat(inner)));
    lines.extend(rows);
    lines.push(format!("└{}┘", "─".repeat(inner)));
    lines
}

/// Reads line commands from stdin: `start`, `stop`, `r`/`retry`, `q`/`quit`.
/// End of input stops reading without shutting anything down.
pub fn spawn_stdin_controls(commands: Sender<Command>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };

            let command = match parse_command(&line) {
                Some(command) => command,
                None => continue,
            };

            let quit = command == Command::Shutdown;
            if commands.send(command).is_err() || quit {
                break;
            }
        }
    })
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_lowercase().as_str() {
        "start" | "s" => Some(Command::Start),
        "stop" | "x" => Some(Command::Stop),
        "retry" | "r" => Some(Command::Retry),
        "quit" | "q" => Some(Command::Shutdown),
        _ => None,
    }
}

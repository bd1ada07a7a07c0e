use crate::detection_loop::error::{IterationError, LoopError};
use crate::frame_source::interface::FrameSourceError;
use crate::ranker::RankedPredictions;
use std::time::Instant;

/// Coarse loop state exposed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Idle,
    Starting,
    Running,
    Stopping,
}

/// Every start opens a new session. Results carry the session they were
/// produced in so late ones can be told apart.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum State {
    #[default]
    Idle,
    Starting {
        session: u64,
    },
    Running {
        session: u64,
    },
    Stopping {
        session: u64,
        /// The camera start for this session has not reported back yet.
        awaiting_start: bool,
    },
}

impl State {
    pub fn loop_state(&self) -> LoopState {
        match self {
            State::Idle => LoopState::Idle,
            State::Starting { .. } => LoopState::Starting,
            State::Running { .. } => LoopState::Running,
            State::Stopping { .. } => LoopState::Stopping,
        }
    }

    pub fn running_session(&self) -> Option<u64> {
        match self {
            State::Running { session, .. } => Some(*session),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Model {
    pub state: State,
    pub last_session: u64,
    /// Shutdown was requested while a camera start was still pending.
    pub exiting: bool,
    /// An iteration is running, whichever session it belongs to. It keeps
    /// its tensor until `IterationDone` arrives, so a restarted session has
    /// to wait for it as well.
    pub iteration_in_flight: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IterationOutcome {
    Ranked(RankedPredictions),
    /// The camera has not delivered a frame yet.
    NoFrame,
    /// The session ended before the iteration started.
    Cancelled,
    Failed(IterationError),
    DeviceLost(FrameSourceError),
}

#[derive(Debug)]
pub enum Event {
    StartRequested,
    StopRequested,
    Shutdown,
    Tick(Instant),
    CameraStartDone {
        session: u64,
        result: Result<(), FrameSourceError>,
    },
    CameraStopDone,
    IterationDone {
        session: u64,
        outcome: IterationOutcome,
    },
}

impl Event {
    /// Events that fire every frame and would flood the log.
    pub fn is_noisy(&self) -> bool {
        matches!(
            self,
            Event::Tick(_)
                | Event::IterationDone {
                    outcome: IterationOutcome::Ranked(_) | IterationOutcome::NoFrame,
                    ..
                }
        )
    }

    pub fn to_display_string(&self) -> String {
        match self {
            Event::IterationDone {
                session,
                outcome: IterationOutcome::Ranked(predictions),
            } => format!(
                "IterationDone {{ session: {}, top: {:?} }}",
                session,
                predictions.top()
            ),
            event => format!("{:?}", event),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SubscribeTick,
    StartCamera { session: u64 },
    StopCamera,
    RunIteration { session: u64 },
    PublishPredictions(RankedPredictions),
    PublishError(LoopError),
    Exit,
}

pub fn init() -> (Model, Vec<Effect>) {
    (Model::default(), vec![Effect::SubscribeTick])
}

pub fn transition(model: Model, event: Event) -> (Model, Vec<Effect>) {
    let Model {
        state,
        last_session,
        exiting,
        iteration_in_flight,
    } = model;

    let with = |state: State| Model {
        state,
        last_session,
        exiting,
        iteration_in_flight,
    };

    match (state, event) {
        // Lifecycle
        (State::Idle, Event::StartRequested) => {
            let session = last_session + 1;
            (
                Model {
                    state: State::Starting { session },
                    last_session: session,
                    exiting,
                    iteration_in_flight,
                },
                vec![Effect::StartCamera { session }],
            )
        }
        (State::Starting { session }, Event::CameraStartDone { session: done, result })
            if session == done =>
        {
            match result {
                Ok(()) => (with(State::Running { session }), vec![]),
                Err(error) => (
                    with(State::Idle),
                    vec![Effect::PublishError(LoopError::Device(error))],
                ),
            }
        }
        (State::Starting { session }, Event::StopRequested) => (
            with(State::Stopping {
                session,
                awaiting_start: true,
            }),
            vec![],
        ),
        (
            State::Stopping {
                session,
                awaiting_start: true,
            },
            Event::CameraStartDone { session: done, .. },
        ) if session == done => {
            if exiting {
                (with(State::Idle), vec![Effect::StopCamera, Effect::Exit])
            } else {
                (
                    with(State::Stopping {
                        session,
                        awaiting_start: false,
                    }),
                    vec![Effect::StopCamera],
                )
            }
        }
        (State::Running { session, .. }, Event::StopRequested) => (
            with(State::Stopping {
                session,
                awaiting_start: false,
            }),
            vec![Effect::StopCamera],
        ),
        (
            State::Stopping {
                awaiting_start: false,
                ..
            },
            Event::CameraStopDone,
        ) => (with(State::Idle), vec![]),

        // A pending camera start must finish before the device can be released.
        (State::Starting { session }, Event::Shutdown)
        | (
            State::Stopping {
                session,
                awaiting_start: true,
            },
            Event::Shutdown,
        ) => (
            Model {
                state: State::Stopping {
                    session,
                    awaiting_start: true,
                },
                last_session,
                exiting: true,
                iteration_in_flight,
            },
            vec![],
        ),
        (State::Running { .. }, Event::Shutdown) => {
            (with(State::Idle), vec![Effect::StopCamera, Effect::Exit])
        }
        (_, Event::Shutdown) => (with(State::Idle), vec![Effect::Exit]),

        // Main loop
        (State::Running { session }, Event::Tick(_)) if !iteration_in_flight => (
            Model {
                state: State::Running { session },
                last_session,
                exiting,
                iteration_in_flight: true,
            },
            vec![Effect::RunIteration { session }],
        ),
        (state, Event::IterationDone { session: done, outcome }) => {
            let model = Model {
                state,
                last_session,
                exiting,
                iteration_in_flight: false,
            };
            if model.state.running_session() != Some(done) {
                return (model, vec![]);
            }

            match outcome {
                IterationOutcome::Ranked(predictions) => {
                    (model, vec![Effect::PublishPredictions(predictions)])
                }
                IterationOutcome::NoFrame | IterationOutcome::Cancelled => (model, vec![]),
                IterationOutcome::Failed(error) => (
                    model,
                    vec![Effect::PublishError(LoopError::Iteration(error))],
                ),
                IterationOutcome::DeviceLost(error) => (
                    Model {
                        state: State::Stopping {
                            session: done,
                            awaiting_start: false,
                        },
                        ..model
                    },
                    vec![
                        Effect::StopCamera,
                        Effect::PublishError(LoopError::Device(error)),
                    ],
                ),
            }
        }

        // Ticks while busy, repeated start/stop requests
        (state, _) => (with(state), vec![]),
    }
}

use crate::detection_loop::core::{
    init, transition, Effect, Event, IterationOutcome, LoopState, Model, State,
};
use crate::detection_loop::error::{IterationError, LoopError};
use crate::frame_source::interface::FrameSourceError;
use crate::preprocessor::preprocess::PreprocessError;
use crate::ranker::{rank, LabelSet};
use std::time::Instant;

fn run(model: Model, events: Vec<Event>) -> (Model, Vec<Effect>) {
    events
        .into_iter()
        .fold((model, vec![]), |(model, _), event| transition(model, event))
}

fn running(session: u64) -> Model {
    Model {
        state: State::Running { session },
        last_session: session,
        exiting: false,
        iteration_in_flight: false,
    }
}

fn in_flight(session: u64) -> Model {
    Model {
        iteration_in_flight: true,
        ..running(session)
    }
}

#[test]
fn test_init() {
    let (model, effects) = init();

    assert_eq!(model.state, State::Idle);
    assert_eq!(effects, vec![Effect::SubscribeTick]);
}

#[test]
fn test_start_opens_a_new_session() {
    let (model, _) = init();

    let (model, effects) = transition(model, Event::StartRequested);
    assert_eq!(model.state, State::Starting { session: 1 });
    assert_eq!(effects, vec![Effect::StartCamera { session: 1 }]);

    let (model, effects) = transition(
        model,
        Event::CameraStartDone {
            session: 1,
            result: Ok(()),
        },
    );
    assert_eq!(model, running(1));
    assert!(effects.is_empty());
}

#[test]
fn test_start_failure_returns_to_idle() {
    let (model, effects) = run(
        init().0,
        vec![
            Event::StartRequested,
            Event::CameraStartDone {
                session: 1,
                result: Err(FrameSourceError::PermissionDenied),
            },
        ],
    );

    assert_eq!(model.state, State::Idle);
    assert_eq!(
        effects,
        vec![Effect::PublishError(LoopError::Device(
            FrameSourceError::PermissionDenied
        ))]
    );
}

#[test]
fn test_start_is_ignored_unless_idle() {
    let (model, effects) = transition(running(1), Event::StartRequested);
    assert_eq!(model, running(1));
    assert!(effects.is_empty());

    let (starting, _) = transition(init().0, Event::StartRequested);
    let (model, effects) = transition(starting.clone(), Event::StartRequested);
    assert_eq!(model, starting);
    assert!(effects.is_empty());
}

#[test]
fn test_tick_runs_one_iteration_at_a_time() {
    let (model, effects) = transition(running(1), Event::Tick(Instant::now()));
    assert_eq!(model, in_flight(1));
    assert_eq!(effects, vec![Effect::RunIteration { session: 1 }]);

    // Ticks while busy are dropped
    let (model, effects) = transition(model, Event::Tick(Instant::now()));
    assert_eq!(model, in_flight(1));
    assert!(effects.is_empty());
}

#[test]
fn test_ranked_iteration_is_published() {
    let predictions = rank(&[0.82, 0.18], &LabelSet::resolve(None, 2));

    let (model, effects) = transition(
        in_flight(1),
        Event::IterationDone {
            session: 1,
            outcome: IterationOutcome::Ranked(predictions.clone()),
        },
    );

    assert_eq!(model, running(1));
    assert_eq!(effects, vec![Effect::PublishPredictions(predictions)]);
}

#[test]
fn test_no_frame_waits_for_next_tick() {
    let (model, effects) = transition(
        in_flight(1),
        Event::IterationDone {
            session: 1,
            outcome: IterationOutcome::NoFrame,
        },
    );

    assert_eq!(model, running(1));
    assert!(effects.is_empty());
}

#[test]
fn test_iteration_failure_keeps_running() {
    let error = IterationError::InvalidFrame(PreprocessError::InvalidFrame {
        width: 0,
        height: 0,
    });

    let (model, effects) = transition(
        in_flight(1),
        Event::IterationDone {
            session: 1,
            outcome: IterationOutcome::Failed(error.clone()),
        },
    );

    assert_eq!(model, running(1));
    assert_eq!(effects, vec![Effect::PublishError(LoopError::Iteration(error))]);
}

#[test]
fn test_device_lost_stops_the_loop() {
    let error = FrameSourceError::DeviceUnavailable("unplugged".to_string());

    let (model, effects) = transition(
        in_flight(1),
        Event::IterationDone {
            session: 1,
            outcome: IterationOutcome::DeviceLost(error.clone()),
        },
    );

    assert_eq!(
        model.state,
        State::Stopping {
            session: 1,
            awaiting_start: false
        }
    );
    assert_eq!(
        effects,
        vec![
            Effect::StopCamera,
            Effect::PublishError(LoopError::Device(error))
        ]
    );

    let (model, _) = transition(model, Event::CameraStopDone);
    assert_eq!(model.state, State::Idle);
}

#[test]
fn test_stop_discards_in_flight_result() {
    let (model, effects) = transition(in_flight(1), Event::StopRequested);
    assert_eq!(effects, vec![Effect::StopCamera]);

    let predictions = rank(&[0.5, 0.5], &LabelSet::resolve(None, 2));
    let (model, effects) = transition(
        model,
        Event::IterationDone {
            session: 1,
            outcome: IterationOutcome::Ranked(predictions),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(model.state.loop_state(), LoopState::Stopping);
    assert!(!model.iteration_in_flight);

    let (model, _) = transition(model, Event::CameraStopDone);
    assert_eq!(model.state, State::Idle);
}

#[test]
fn test_stale_session_results_are_discarded() {
    let predictions = rank(&[0.9, 0.1], &LabelSet::resolve(None, 2));

    let (model, effects) = transition(
        Model {
            iteration_in_flight: true,
            ..running(2)
        },
        Event::IterationDone {
            session: 1,
            outcome: IterationOutcome::Ranked(predictions),
        },
    );

    assert_eq!(model, running(2));
    assert!(effects.is_empty());
}

#[test]
fn test_restart_waits_for_previous_iteration() {
    let (model, _) = run(
        in_flight(1),
        vec![
            Event::StopRequested,
            Event::CameraStopDone,
            Event::StartRequested,
            Event::CameraStartDone {
                session: 2,
                result: Ok(()),
            },
        ],
    );
    assert_eq!(model.state, State::Running { session: 2 });
    assert!(model.iteration_in_flight);

    let (model, effects) = transition(model, Event::Tick(Instant::now()));
    assert!(effects.is_empty());

    let predictions = rank(&[0.9, 0.1], &LabelSet::resolve(None, 2));
    let (model, effects) = transition(
        model,
        Event::IterationDone {
            session: 1,
            outcome: IterationOutcome::Ranked(predictions),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(model, running(2));

    let (model, effects) = transition(model, Event::Tick(Instant::now()));
    assert_eq!(model, in_flight(2));
    assert_eq!(effects, vec![Effect::RunIteration { session: 2 }]);
}

#[test]
fn test_stop_is_idempotent_and_safe_from_idle() {
    let (model, effects) = transition(init().0, Event::StopRequested);
    assert_eq!(model.state, State::Idle);
    assert!(effects.is_empty());

    let (model, _) = transition(running(1), Event::StopRequested);
    let (again, effects) = transition(model.clone(), Event::StopRequested);
    assert_eq!(again, model);
    assert!(effects.is_empty());
}

#[test]
fn test_stop_while_starting_waits_for_camera() {
    let (model, _) = transition(init().0, Event::StartRequested);

    let (model, effects) = transition(model, Event::StopRequested);
    assert_eq!(
        model.state,
        State::Stopping {
            session: 1,
            awaiting_start: true
        }
    );
    assert!(effects.is_empty());

    // Ticks never start an iteration while stopping
    let (model, effects) = transition(model, Event::Tick(Instant::now()));
    assert!(effects.is_empty());

    let (model, effects) = transition(
        model,
        Event::CameraStartDone {
            session: 1,
            result: Ok(()),
        },
    );
    assert_eq!(effects, vec![Effect::StopCamera]);

    let (model, _) = transition(model, Event::CameraStopDone);
    assert_eq!(model.state, State::Idle);

    // The next start gets a fresh session
    let (model, effects) = transition(model, Event::StartRequested);
    assert_eq!(model.state, State::Starting { session: 2 });
    assert_eq!(effects, vec![Effect::StartCamera { session: 2 }]);
}

#[test]
fn test_shutdown() {
    let (model, effects) = transition(init().0, Event::Shutdown);
    assert_eq!(model.state, State::Idle);
    assert_eq!(effects, vec![Effect::Exit]);

    let (model, effects) = transition(in_flight(3), Event::Shutdown);
    assert_eq!(model.state, State::Idle);
    assert_eq!(effects, vec![Effect::StopCamera, Effect::Exit]);
}

#[test]
fn test_shutdown_while_starting_releases_camera_once_started() {
    let (model, _) = transition(init().0, Event::StartRequested);

    let (model, effects) = transition(model, Event::Shutdown);
    assert!(effects.is_empty());
    assert!(model.exiting);

    let (model, effects) = transition(
        model,
        Event::CameraStartDone {
            session: 1,
            result: Ok(()),
        },
    );
    assert_eq!(model.state, State::Idle);
    assert_eq!(effects, vec![Effect::StopCamera, Effect::Exit]);
}

#[test]
fn test_noisy_events() {
    assert!(Event::Tick(Instant::now()).is_noisy());
    assert!(Event::IterationDone {
        session: 1,
        outcome: IterationOutcome::NoFrame
    }
    .is_noisy());
    assert!(!Event::StartRequested.is_noisy());
    assert!(!Event::IterationDone {
        session: 1,
        outcome: IterationOutcome::DeviceLost(FrameSourceError::PermissionDenied)
    }
    .is_noisy());
}

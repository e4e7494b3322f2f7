//! # Walk test module
//!
//! The walk test replays a [`TrajectoryScript`] against the motion engine, one command at a time,
//! holding each command for its duration in control frames. Once the script is exhausted (or the
//! test is aborted) the robot is sat down.
//!
//! The driver is a simple state machine:
//!
//! ```text
//! Idle --start--> Running { script_index } --script exhausted / abort--> Finished
//! ```
//!
//! Each call to [`WalkTest::step`] processes exactly one control frame.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod state;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use motion_if::{TrajectoryCommand, TrajectoryScript};
use serde::Serialize;
use std::fmt;

use crate::gait::{RobotId, Role};

pub use state::WalkTest;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Summary of a walk test run, suitable for archiving.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalkTestReport {
    /// The gait the run used, if a run has been started.
    pub gait: Option<GaitSummary>,

    pub script_len: usize,

    pub script_frames: u64,

    /// Number of frames processed, including the frame in which the run finished.
    pub ticks: u64,

    /// Number of script commands entered.
    pub commands_dispatched: usize,

    pub final_state: FiniteState,

    /// True if the run was ended by [`WalkTest::abort`].
    pub aborted: bool,

    pub events: Vec<DriverEvent>,
}

/// The identifying parts of a selected gait.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaitSummary {
    pub robot: RobotId,
    pub requested_role: Role,
    pub role: Role,
    pub name: String,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The state of the walk test driver.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FiniteState {
    /// No run is executing.
    Idle,

    /// Executing the command at `script_index`.
    Running { script_index: usize },

    /// The run is over and the robot has been told to sit.
    Finished,
}

/// Anomalies noticed during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DriverEvent {
    /// A command which relies on a degraded engine feature was issued.
    DegradedCommand {
        tick: u64,
        script_index: usize,
        kind: String,
    },

    /// A command of an unknown kind was skipped.
    UnrecognisedCommand {
        tick: u64,
        script_index: usize,
        kind: String,
    },

    /// The engine declined a request.
    EngineRejected {
        tick: u64,
        request: EngineRequest,
        reason: String,
    },
}

/// The engine requests the driver makes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineRequest {
    SetGait,
    SetVelocity,
    RequestSteps,
    PlayPosture,
    StopHeadTracking,
}

#[derive(Debug, thiserror::Error)]
pub enum WalkTestError {
    #[error("A walk test is already running, abort it or wait for it to finish first")]
    RunInProgress,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl fmt::Display for FiniteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FiniteState::Idle => write!(f, "Idle"),
            FiniteState::Running { script_index } => write!(f, "Running({})", script_index),
            FiniteState::Finished => write!(f, "Finished"),
        }
    }
}

impl fmt::Display for EngineRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EngineRequest::SetGait => "set_gait",
            EngineRequest::SetVelocity => "set_velocity",
            EngineRequest::RequestSteps => "request_steps",
            EngineRequest::PlayPosture => "play_posture",
            EngineRequest::StopHeadTracking => "stop_head_tracking",
        };

        write!(f, "{}", s)
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// The standard walk regression script.
///
/// Walks forwards, sideways and diagonally, then finishes with two velocities far beyond any
/// gait's limits to check the engine clips them.
pub fn unit_test_1() -> TrajectoryScript {
    TrajectoryScript::new(vec![
        TrajectoryCommand::walk(6.0, 0.0, 0.0, 100),
        TrajectoryCommand::walk(0.0, 6.0, 0.0, 50),
        TrajectoryCommand::walk(10.5, -10.0, 30.0, 75),
        TrajectoryCommand::walk(-4.0, 6.0, 15.0, 50),
        TrajectoryCommand::walk(1.1, 2.4, 4.5, 50),
        TrajectoryCommand::walk(100.1, 250.4, 445.5, 75),
        TrajectoryCommand::walk(-100.1, 550.4, -645.5, 75),
    ])
    .expect("Built-in script durations are all non-zero")
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_unit_test_1_matches_script_file() {
        let script = unit_test_1();
        assert_eq!(script.len(), 7);
        assert_eq!(script.total_frames(), 475);

        let from_file =
            util::script_interpreter::parse_script(include_str!("../../../scripts/unit_test_1.wts"))
                .unwrap();
        assert_eq!(from_file, script);
    }

    #[test]
    fn test_event_json() {
        let event = DriverEvent::EngineRejected {
            tick: 3,
            request: EngineRequest::SetVelocity,
            reason: String::from("no gait"),
        };

        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"event":"engine_rejected","tick":3,"request":"set_velocity","reason":"no gait"}"#
        );
    }
}

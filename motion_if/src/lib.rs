//! # Motion interface crate.
//!
//! Provides the interface between the behaviour side of the software and the external motion
//! engine, along with the scripted trajectory definitions used to drive walk tests.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// The consumed motion engine interface
pub mod engine;

/// Serialisable records of the commands issued to a motion engine
pub mod cmd;

/// Scripted trajectory definitions
pub mod script;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use cmd::MotionCmd;
pub use engine::{EngineError, MotionEngine, Posture, StepRequest, WalkVector};
pub use script::{CommandAction, ScriptBuildError, TrajectoryCommand, TrajectoryScript};

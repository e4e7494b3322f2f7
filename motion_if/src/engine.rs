//! # Motion engine interface
//!
//! The walking engine itself (ZMP preview control, joint solving, sensor compensation) lives
//! outside this workspace. Everything here talks to it through the narrow [`MotionEngine`] trait,
//! which is a set of fire-and-forget requests.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Commands accepted by the external motion engine.
///
/// None of the methods block. An `Err` means the engine declined the request, it does not mean
/// the request is still in flight.
pub trait MotionEngine {
    /// The gait parameter set the engine accepts.
    type Gait;

    /// Install the active locomotion parameter set.
    ///
    /// Must be idempotent and safe to call before any walk command.
    fn set_gait(&mut self, gait: &Self::Gait) -> Result<(), EngineError>;

    /// Set a continuous walk target.
    fn set_velocity(&mut self, vel: WalkVector) -> Result<(), EngineError>;

    /// Request a discrete set of steps.
    fn request_steps(&mut self, req: StepRequest) -> Result<(), EngineError>;

    /// Execute a one-shot posture.
    fn play_posture(&mut self, posture: Posture) -> Result<(), EngineError>;

    /// Disable any independent head aiming behaviour.
    fn stop_head_tracking(&mut self) -> Result<(), EngineError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A walk velocity target.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WalkVector {
    /// Forward speed.
    ///
    /// Units: centimeters/second
    pub x: f64,

    /// Leftward speed.
    ///
    /// Units: centimeters/second
    pub y: f64,

    /// Turn rate, positive counter clockwise.
    ///
    /// Units: degrees/second
    pub theta: f64,
}

/// A request for a discrete number of steps.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRequest {
    /// Units: centimeters
    pub x: f64,

    /// Units: centimeters
    pub y: f64,

    /// Units: degrees
    pub theta: f64,

    /// Duration of each step.
    ///
    /// Units: seconds
    pub step_time: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Postures the engine can play as a one-shot move.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Posture {
    /// The safe resting posture, robot seated with low stiffness.
    Sit,
}

/// Reasons the engine may decline a request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("No gait has been installed in the engine")]
    NoGait,

    #[error("The active gait is a non-walking (stationary) gait")]
    NonWalkingGait,

    #[error("The request contains a non-finite value in {0}")]
    NonFinite(&'static str),

    #[error("The engine rejected the request: {0}")]
    Rejected(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl WalkVector {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }

    /// True if every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.theta.is_finite()
    }
}

impl StepRequest {
    /// True if every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.theta.is_finite()
            && self.step_time.is_finite()
    }
}

impl fmt::Display for WalkVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.theta)
    }
}

impl fmt::Display for Posture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Posture::Sit => write!(f, "sit"),
        }
    }
}

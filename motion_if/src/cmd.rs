//! # Motion commands
//!
//! A serialisable record of a single request made to a motion engine. Engines which keep a log of
//! what they were asked to do (for example the dry-run engine) store these so the log can be
//! archived alongside the session.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::engine::{Posture, StepRequest, WalkVector};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// One request made to a motion engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum MotionCmd {
    /// Install a gait, given as the flattened bundles in assembly order.
    SetGait { bundles: Vec<Vec<f64>> },

    /// Set a continuous walk target.
    SetVelocity(WalkVector),

    /// Request discrete steps.
    RequestSteps(StepRequest),

    /// Play a one-shot posture.
    PlayPosture { posture: Posture },

    /// Disable head tracking.
    StopHeadTracking,
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

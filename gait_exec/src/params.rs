//! # Gait Executable Parameters
//!
//! This module provides parameters for the gait executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaitExecParams {
    /// The robot to run as, unless given on the command line
    pub robot: String,

    /// The gait role to use for walk tests, unless given on the command line
    pub role: String,

    /// Gait parameter file, relative to the params directory
    pub gait_params: String,

    /// Target period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Minimum level of log messages, one of "info", "debug" or "trace"
    pub log_level: String,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GaitExecParams {
    /// The control cycle period, or `None` if `cycle_period_s` is not a positive finite number of
    /// seconds.
    pub fn cycle_period(&self) -> Option<Duration> {
        let p = self.cycle_period_s;

        if p.is_finite() && p > 0.0 && p < u64::MAX as f64 {
            Some(Duration::from_secs_f64(p))
        } else {
            None
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_shipped_params() {
        let params: GaitExecParams =
            util::params::from_str(include_str!("../../params/gait_exec.toml")).unwrap();

        assert!(params.robot.parse::<crate::gait::RobotId>().is_ok());
        assert!(params.role.parse::<crate::gait::Role>().is_ok());
        let period = params.cycle_period().unwrap();
        assert!((period.as_secs_f64() - 0.01).abs() < 1e-9);
        assert!(params.log_level.parse::<log::LevelFilter>().is_ok());
    }

    #[test]
    fn test_cycle_period_checks() {
        let mut params: GaitExecParams =
            util::params::from_str(include_str!("../../params/gait_exec.toml")).unwrap();

        for bad in [0.0, -0.01, std::f64::NAN, std::f64::INFINITY, 1e300].iter() {
            params.cycle_period_s = *bad;
            assert_eq!(params.cycle_period(), None, "{} accepted", bad);
        }

        params.cycle_period_s = 0.5;
        assert_eq!(params.cycle_period(), Some(Duration::from_millis(500)));
    }
}

//! # Gait configuration module
//!
//! A gait is the complete set of tuning parameters the walking engine needs for one style of
//! walk. It is built from eight parameter bundles (stance, step, ZMP, joint hack, sensor feedback,
//! stiffness, odometry and arm swing) and selected per robot and per situation (the gait's role).
//!
//! - [`bundles`] - the individual parameter bundles.
//! - [`command`] - the assembled [`GaitCommand`] and derivation of variants.
//! - [`registry`] - the startup-time [`GaitRegistry`] mapping robots and roles to gaits.
//! - [`params`] - the parameter file layout the registry is built from.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod bundles;
pub mod command;
pub mod params;
pub mod registry;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub use bundles::*;
pub use command::{GaitCommand, GaitOverrides};
pub use params::GaitParams;
pub use registry::{CatalogueEntry, GaitRegistry, SelectedGait};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Length of one walking engine frame.
///
/// Units: seconds
pub const MOTION_FRAME_LENGTH_S: f64 = 0.01;

/// Every role a robot may be asked for.
pub const ALL_ROLES: [Role; 5] = [
    Role::Default,
    Role::Slow,
    Role::Dribble,
    Role::Fast,
    Role::Medium,
];

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Identity of a physical (or simulated) robot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotId {
    Trillian,
    Zaphod,
    Slarti,
    Marvin,
    /// The Webots simulated robot
    Webots,
}

/// The situational purpose of a gait.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Whatever the robot's configured default role resolves to.
    Default,
    Slow,
    Dribble,
    Fast,
    Medium,
}

/// Errors in the gait configuration.
///
/// All of these are fatal at startup, no part of the system falls back to another gait.
#[derive(Debug, thiserror::Error)]
pub enum GaitConfigError {
    #[error("Failed to load the gait parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("{kind} bundle \"{name}\" has {found} fields, expected {expected}")]
    BundleArity {
        kind: BundleKind,
        name: String,
        expected: usize,
        found: usize,
    },

    #[error(
        "Sensor feedback bundle \"{name}\" has model selector {value}, expected 1.0 (spring) \
        or 0.0 (legacy)"
    )]
    SensorSelector { name: String, value: f64 },

    #[error(
        "Step bundle \"{name}\" has walking flag {value}, expected 1.0 (walking) or 0.0 \
        (non-walking)"
    )]
    WalkingFlag { name: String, value: f64 },

    #[error("Gait \"{gait}\" references unknown {kind} bundle \"{name}\"")]
    UnknownBundle {
        gait: String,
        kind: BundleKind,
        name: String,
    },

    #[error("\"{referenced_by}\" references unknown gait \"{name}\"")]
    UnknownGait { referenced_by: String, name: String },

    #[error("Gait \"{0}\" is part of a cycle of base gaits")]
    BaseCycle(String),

    #[error("Gait \"{gait}\" has no base and no {kind} bundle")]
    IncompleteGait { gait: String, kind: BundleKind },

    #[error("\"{0}\" is not a known robot")]
    UnknownRobot(String),

    #[error("\"{0}\" is not a known gait role")]
    UnknownRole(String),

    #[error("No gait is configured for robot {robot} in role {role}")]
    MissingRole { robot: RobotId, role: Role },

    #[error("Robot {0} has its default role set to \"default\"")]
    DefaultRoleIsDefault(RobotId),

    #[error("Robot {0} assigns a gait to the \"default\" role directly, use default_role instead")]
    ExplicitDefaultRole(RobotId),

    #[error("Robot {robot} has default role {role} but no gait is assigned to that role")]
    DefaultRoleUnassigned { robot: RobotId, role: Role },

    #[error("Robot {robot} assigns the disabled gait \"{gait}\" to role {role}")]
    DisabledGaitAssigned {
        robot: RobotId,
        role: Role,
        gait: String,
    },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RobotId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RobotId::Trillian => "trillian",
            RobotId::Zaphod => "zaphod",
            RobotId::Slarti => "slarti",
            RobotId::Marvin => "marvin",
            RobotId::Webots => "webots",
        }
    }
}

impl fmt::Display for RobotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RobotId {
    type Err = GaitConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trillian" => Ok(RobotId::Trillian),
            "zaphod" => Ok(RobotId::Zaphod),
            "slarti" => Ok(RobotId::Slarti),
            "marvin" => Ok(RobotId::Marvin),
            "webots" => Ok(RobotId::Webots),
            _ => Err(GaitConfigError::UnknownRobot(s.to_string())),
        }
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Default => "default",
            Role::Slow => "slow",
            Role::Dribble => "dribble",
            Role::Fast => "fast",
            Role::Medium => "medium",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = GaitConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Role::Default),
            "slow" => Ok(Role::Slow),
            "dribble" => Ok(Role::Dribble),
            "fast" => Ok(Role::Fast),
            "medium" => Ok(Role::Medium),
            _ => Err(GaitConfigError::UnknownRole(s.to_string())),
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
    fn test_robot_role_from_str() {
        assert_eq!("Marvin".parse::<RobotId>().unwrap(), RobotId::Marvin);
        assert_eq!("webots".parse::<RobotId>().unwrap(), RobotId::Webots);
        assert!(matches!(
            "ford".parse::<RobotId>(),
            Err(GaitConfigError::UnknownRobot(_))
        ));

        for role in ALL_ROLES.iter() {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), *role);
        }
        assert!(matches!(
            "sprint".parse::<Role>(),
            Err(GaitConfigError::UnknownRole(_))
        ));
    }
}

//! # Trajectory scripts
//!
//! A trajectory script is an ordered list of timed motion commands used for scripted regression
//! testing of the walking engine. Each command is held for a number of control frames before the
//! next one is issued.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use serde_json::{self, Value};
use thiserror::Error;

// Internal
use crate::engine::{StepRequest, WalkVector};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single scripted command and the number of frames it is held for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryCommand {
    /// What to ask the engine to do when this command is entered.
    pub action: CommandAction,

    /// Number of control frames the command lasts for. Must be greater than zero.
    pub duration_frames: u32,
}

/// An ordered, finite sequence of trajectory commands.
///
/// Once built the script cannot be modified.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TrajectoryScript {
    cmds: Vec<TrajectoryCommand>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The action performed when a trajectory command is entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandAction {
    /// Walk continuously at the given velocity.
    Walk(WalkVector),

    /// Take discrete steps.
    ///
    /// Known to be unreliable against the navigation layer, the driver reports every use.
    Step(StepRequest),

    /// A command kind the parser did not recognise. Kept so that a malformed script can still be
    /// run to completion.
    Unrecognised { kind: String },
}

/// Errors raised when building a script or parsing a command.
#[derive(Debug, Error)]
pub enum ScriptBuildError {
    #[error("Command {0} has a duration of zero frames")]
    ZeroDuration(usize),

    #[error("Command contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Command is missing a string \"kind\" field")]
    MissingKind,

    #[error("Command vector is invalid: {0}")]
    InvalidVector(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TrajectoryCommand {
    /// A walk command.
    pub fn walk(x: f64, y: f64, theta: f64, duration_frames: u32) -> Self {
        Self {
            action: CommandAction::Walk(WalkVector::new(x, y, theta)),
            duration_frames,
        }
    }

    /// A step command.
    pub fn step(x: f64, y: f64, theta: f64, step_time: f64, duration_frames: u32) -> Self {
        Self {
            action: CommandAction::Step(StepRequest {
                x,
                y,
                theta,
                step_time,
            }),
            duration_frames,
        }
    }

    /// Parse a command from its JSON form.
    ///
    /// The JSON shall be an object with a `kind` string and a `vector` array, for example
    /// `{"kind": "walk", "vector": [6.0, 0.0, 0.0]}`. Walk vectors have 3 or 4 elements (the 4th
    /// is ignored), step vectors have exactly 4 (x, y, theta, step time). Unknown kinds are not an
    /// error and produce [`CommandAction::Unrecognised`].
    pub fn from_json(json_str: &str, duration_frames: u32) -> Result<Self, ScriptBuildError> {
        let val: Value = match serde_json::from_str(json_str) {
            Ok(v) => v,
            Err(e) => return Err(ScriptBuildError::InvalidJson(e)),
        };

        let kind = match val["kind"].as_str() {
            Some(k) => k.to_lowercase(),
            None => return Err(ScriptBuildError::MissingKind),
        };

        let action = match kind.as_str() {
            "walk" => {
                let v = parse_vector(&val["vector"], &[3, 4])?;
                CommandAction::Walk(WalkVector::new(v[0], v[1], v[2]))
            }
            "step" => {
                let v = parse_vector(&val["vector"], &[4])?;
                CommandAction::Step(StepRequest {
                    x: v[0],
                    y: v[1],
                    theta: v[2],
                    step_time: v[3],
                })
            }
            _ => CommandAction::Unrecognised { kind },
        };

        Ok(Self {
            action,
            duration_frames,
        })
    }

    /// Short name of the command kind, used in log messages.
    pub fn kind_name(&self) -> &str {
        match self.action {
            CommandAction::Walk(_) => "walk",
            CommandAction::Step(_) => "step",
            CommandAction::Unrecognised { ref kind } => kind.as_str(),
        }
    }
}

impl TrajectoryScript {
    /// Build a new script, checking every command has a non-zero duration.
    pub fn new(cmds: Vec<TrajectoryCommand>) -> Result<Self, ScriptBuildError> {
        if let Some(i) = cmds.iter().position(|c| c.duration_frames == 0) {
            return Err(ScriptBuildError::ZeroDuration(i));
        }

        Ok(Self { cmds })
    }

    /// Get the command at the given index, or `None` past the end of the script.
    pub fn get(&self, index: usize) -> Option<&TrajectoryCommand> {
        self.cmds.get(index)
    }

    /// Number of commands in the script.
    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Total number of frames the script lasts for.
    pub fn total_frames(&self) -> u64 {
        self.cmds.iter().map(|c| c.duration_frames as u64).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrajectoryCommand> {
        self.cmds.iter()
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Read a numeric array whose length is one of `allowed_lens`.
fn parse_vector(val: &Value, allowed_lens: &[usize]) -> Result<Vec<f64>, ScriptBuildError> {
    let arr = match val.as_array() {
        Some(a) => a,
        None => {
            return Err(ScriptBuildError::InvalidVector(String::from(
                "expected \"vector\" to be an array",
            )))
        }
    };

    if !allowed_lens.contains(&arr.len()) {
        return Err(ScriptBuildError::InvalidVector(format!(
            "expected {:?} elements, found {}",
            allowed_lens,
            arr.len()
        )));
    }

    arr.iter()
        .map(|v| {
            v.as_f64().ok_or_else(|| {
                ScriptBuildError::InvalidVector(format!("{} is not a number", v))
            })
        })
        .collect()
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_json() {
        let walk = TrajectoryCommand::from_json(r#"{"kind": "walk", "vector": [6, 0, 0]}"#, 100)
            .unwrap();
        assert_eq!(walk, TrajectoryCommand::walk(6.0, 0.0, 0.0, 100));

        // The trailing element of a 4-vector walk is ignored
        let walk4 =
            TrajectoryCommand::from_json(r#"{"kind": "WALK", "vector": [0, 6, 0, 5]}"#, 50)
                .unwrap();
        assert_eq!(walk4, TrajectoryCommand::walk(0.0, 6.0, 0.0, 50));

        let step =
            TrajectoryCommand::from_json(r#"{"kind": "step", "vector": [2, 0, 0, 0.4]}"#, 10)
                .unwrap();
        assert_eq!(step, TrajectoryCommand::step(2.0, 0.0, 0.0, 0.4, 10));
        assert_eq!(step.kind_name(), "step");

        let unknown =
            TrajectoryCommand::from_json(r#"{"kind": "kick", "vector": []}"#, 10).unwrap();
        assert_eq!(
            unknown.action,
            CommandAction::Unrecognised {
                kind: String::from("kick")
            }
        );
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            TrajectoryCommand::from_json("{not json", 1),
            Err(ScriptBuildError::InvalidJson(_))
        ));
        assert!(matches!(
            TrajectoryCommand::from_json(r#"{"vector": [1, 2, 3]}"#, 1),
            Err(ScriptBuildError::MissingKind)
        ));
        assert!(matches!(
            TrajectoryCommand::from_json(r#"{"kind": "step", "vector": [1, 2, 3]}"#, 1),
            Err(ScriptBuildError::InvalidVector(_))
        ));
        assert!(matches!(
            TrajectoryCommand::from_json(r#"{"kind": "walk", "vector": [1, "a", 3]}"#, 1),
            Err(ScriptBuildError::InvalidVector(_))
        ));
    }

    #[test]
    fn test_script_new() {
        let script = TrajectoryScript::new(vec![
            TrajectoryCommand::walk(6.0, 0.0, 0.0, 100),
            TrajectoryCommand::walk(0.0, 6.0, 0.0, 50),
        ])
        .unwrap();
        assert_eq!(script.len(), 2);
        assert_eq!(script.total_frames(), 150);
        assert!(script.get(2).is_none());

        assert!(matches!(
            TrajectoryScript::new(vec![
                TrajectoryCommand::walk(6.0, 0.0, 0.0, 100),
                TrajectoryCommand::walk(0.0, 6.0, 0.0, 0),
            ]),
            Err(ScriptBuildError::ZeroDuration(1))
        ));

        assert!(TrajectoryScript::new(vec![]).unwrap().is_empty());
    }
}

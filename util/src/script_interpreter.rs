//! # Walk test script interpreter module
//!
//! This module loads walk test scripts from disk into a [`TrajectoryScript`].
//!
//! A script is a text file containing one entry per command, in the form
//!
//! ```text
//! <duration_frames>: <command json>;
//! ```
//!
//! for example `100: {"kind": "walk", "vector": [6, 0, 0]};`. Anything which doesn't match this
//! pattern (such as `#` comment lines) is ignored.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use regex::RegexBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use motion_if::script::{ScriptBuildError, TrajectoryCommand, TrajectoryScript};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error(
        "Script contains an invalid duration: {0}. \
        Should be a positive whole number of frames (like 100)")]
    InvalidDuration(String),

    #[error("Script contains an invalid command at index {0}: {1}")]
    InvalidCommand(usize, ScriptBuildError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a script from the given path.
pub fn load_script<P: AsRef<Path>>(script_path: P) -> Result<TrajectoryScript, ScriptError> {

    // Get the path in a buffer
    let path = PathBuf::from(script_path.as_ref());

    // Check that the script file exists.
    if !path.exists() {
        return Err(ScriptError::ScriptNotFound(path));
    }

    // Load the script into a string
    let script = match fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => return Err(ScriptError::ScriptLoadError(e))
    };

    parse_script(&script)
}

/// Parse the contents of a script.
///
/// An empty script is not an error. It parses to an empty [`TrajectoryScript`], which the walk
/// test finishes immediately.
pub fn parse_script(script: &str) -> Result<TrajectoryScript, ScriptError> {

    let mut cmds: Vec<TrajectoryCommand> = vec![];

    // Go through the script executing __the magic regex__.
    //
    // Durations are matched as any run of non-space characters so that bad
    // numbers (like `1.5` or `-3`) produce an error rather than being skipped.
    let re = RegexBuilder::
        new(r"^\s*([^\s:#]+)\s*:\s*([^;]*);")
        .multi_line(true)
        .build()
        .expect("script regex is valid");

    for cap in re.captures_iter(script) {
        // Parse the duration
        let dur_str = &cap[1];
        let duration_frames: u32 = match dur_str.parse() {
            Ok(0) | Err(_) => return Err(
                ScriptError::InvalidDuration(dur_str.to_string())),
            Ok(d) => d
        };

        // Parse the command from the payload
        let cmd = TrajectoryCommand::from_json(&cap[2], duration_frames)
            .map_err(|e| ScriptError::InvalidCommand(cmds.len(), e))?;

        cmds.push(cmd);
    }

    if cmds.is_empty() {
        warn!("The walk test script is empty, the test will finish immediately");
    }

    // Durations are already checked to be non-zero
    TrajectoryScript::new(cmds)
        .map_err(|e| ScriptError::InvalidCommand(0, e))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

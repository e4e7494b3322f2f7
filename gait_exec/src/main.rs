//! Main gait executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session and logging
//!     - Load the executable and gait parameters, building the gait registry
//!     - Select the gait for the robot and role
//!     - Load the walk test script (or use the built-in regression script)
//!     - Main loop, one iteration per control frame:
//!         - Walk test processing against the dry-run engine
//!     - Archive the run report and engine command log
//!
//! # Usage
//!
//! ```text
//! gait_exec [--robot <robot>] [--role <role>] [--params <file>] [script]
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use gait_lib::{
    gait::{GaitRegistry, RobotId, Role, ALL_ROLES},
    params::GaitExecParams,
    sim_engine::SimEngine,
    walk_test::{unit_test_1, FiniteState, WalkTest},
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    script_interpreter,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name of the executable's parameter file.
const EXEC_PARAMS_FILE: &str = "gait_exec.toml";

/// Number of consecutive cycle overruns after which a warning is raised.
const OVERRUN_WARN_LIMIT: u64 = 100;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Run a scripted walk test against the dry-run motion engine.
#[derive(Debug, StructOpt)]
#[structopt(name = "gait_exec")]
struct Opt {
    /// Robot to run as (trillian, zaphod, slarti, marvin or webots)
    #[structopt(long)]
    robot: Option<String>,

    /// Gait role to walk with (default, slow, dribble, fast or medium)
    #[structopt(long)]
    role: Option<String>,

    /// Gait parameter file, relative to the params directory
    #[structopt(long)]
    params: Option<String>,

    /// Walk test script to run. The built-in regression script is used if none is given.
    #[structopt(parse(from_os_str))]
    script: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    let opt = Opt::from_args();

    // Load parameters before the logger so the log level can be set from them
    let exec_params: GaitExecParams =
        util::params::load(EXEC_PARAMS_FILE).wrap_err("Could not load exec params")?;

    let log_level: LevelFilter = exec_params
        .log_level
        .parse()
        .map_err(|_| eyre!("Invalid log level \"{}\"", exec_params.log_level))?;

    let cycle_period: Duration = exec_params.cycle_period().ok_or_else(|| {
        eyre!(
            "Invalid cycle period {} s, expected a positive number of seconds",
            exec_params.cycle_period_s
        )
    })?;

    // Initialise session
    let session = Session::new("gait_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(log_level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Biped Gait Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opt);

    // ---- GAIT SELECTION ----

    let robot: RobotId = opt
        .robot
        .as_ref()
        .unwrap_or(&exec_params.robot)
        .parse()
        .wrap_err("Invalid robot")?;
    let role: Role = opt
        .role
        .as_ref()
        .unwrap_or(&exec_params.role)
        .parse()
        .wrap_err("Invalid gait role")?;
    let gait_params = opt.params.as_ref().unwrap_or(&exec_params.gait_params);

    let registry = GaitRegistry::load(gait_params).wrap_err("Failed to build the gait registry")?;

    // Check every role now rather than failing part way through a match
    registry
        .require_roles(robot, &ALL_ROLES)
        .wrap_err_with(|| format!("Gait configuration for {} is incomplete", robot))?;

    let selected = registry
        .select(robot, role)
        .wrap_err("Could not select a gait")?;

    info!(
        "Robot {} using gait \"{}\" for role {} (resolved to {})",
        robot, selected.name, role, selected.role
    );

    // ---- LOAD SCRIPT ----

    let script = match opt.script {
        Some(ref path) => {
            info!("Loading script from {:?}", path);
            script_interpreter::load_script(path).wrap_err("Failed to load script")?
        }
        None => {
            info!("No script provided, using the built-in walk regression script");
            unit_test_1()
        }
    };

    info!(
        "Script contains {} commands and lasts {} frames ({:.02} s)\n",
        script.len(),
        script.total_frames(),
        script.total_frames() as f64 * exec_params.cycle_period_s
    );

    // ---- INITIALISE MODULES ----

    let mut engine = SimEngine::new();
    let mut walk_test = WalkTest::new();

    walk_test
        .start_scripted_test(script, selected)
        .wrap_err("Failed to start the walk test")?;

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    let mut num_consec_cycle_overruns: u64 = 0;
    let mut num_cycles: u64 = 0;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- WALK TEST PROCESSING ----

        let state = walk_test.step(&mut engine);
        num_cycles += 1;

        if state == FiniteState::Finished {
            info!("Walk test finished after {} cycles", num_cycles);
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                num_consec_cycle_overruns += 1;

                if num_consec_cycle_overruns == OVERRUN_WARN_LIMIT {
                    warn!(
                        "{} consecutive cycle overruns, the last by {:.06} s",
                        num_consec_cycle_overruns,
                        (cycle_dur - cycle_period).as_secs_f64()
                    );
                }
            }
        }
    }

    // ---- SHUTDOWN ----

    let report = walk_test.report();
    if !report.events.is_empty() {
        warn!("Walk test recorded {} events", report.events.len());
        for event in report.events.iter() {
            warn!("    {:?}", event);
        }
    }

    session.save("walk_test_report.json", report);
    session.save("motion_cmds.json", engine.take_cmd_log());

    session.exit();

    info!("End of execution");

    Ok(())
}

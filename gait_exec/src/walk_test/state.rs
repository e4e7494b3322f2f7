//! Walk test driver state

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info, warn};
use motion_if::{
    CommandAction, EngineError, MotionEngine, Posture, TrajectoryCommand, TrajectoryScript,
};

use super::*;
use crate::gait::{GaitCommand, SelectedGait};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Scripted walk test driver.
#[derive(Debug, Default)]
pub struct WalkTest {
    /// Current state of the driver
    state: FiniteState,

    /// The script of the loaded run
    script: Option<TrajectoryScript>,

    /// The gait of the loaded run
    selected: Option<SelectedGait>,

    driver: DriverState,

    /// Set by `abort`, handled in the next frame
    abort_requested: bool,

    aborted: bool,

    /// Frames processed in this run
    ticks: u64,

    commands_dispatched: usize,

    events: Vec<DriverEvent>,
}

/// Position within the running script.
#[derive(Debug, Default, Copy, Clone)]
struct DriverState {
    script_index: usize,

    /// Frames spent on the current command so far
    frames_elapsed: u32,

    /// If true the command at `script_index` is issued in the next frame
    dispatch_pending: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for FiniteState {
    fn default() -> Self {
        FiniteState::Idle
    }
}

impl WalkTest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a new run, which begins on the next call to [`WalkTest::step`].
    ///
    /// Starting a run while another is still running is an error, the running one must first be
    /// aborted or allowed to finish. Starting after a run has finished discards everything about
    /// the previous run.
    pub fn start_scripted_test(
        &mut self,
        script: TrajectoryScript,
        selected_gait: SelectedGait,
    ) -> Result<(), WalkTestError> {
        match self.state {
            FiniteState::Running { .. } => return Err(WalkTestError::RunInProgress),
            FiniteState::Idle if self.script.is_some() => {
                warn!("Replacing a walk test which was loaded but never started");
            }
            _ => (),
        }

        info!(
            "Walk test loaded: {} commands over {} frames, gait \"{}\" ({} {})",
            script.len(),
            script.total_frames(),
            selected_gait.name,
            selected_gait.robot,
            selected_gait.role
        );

        *self = Self {
            script: Some(script),
            selected: Some(selected_gait),
            ..Self::default()
        };

        Ok(())
    }

    /// Process one control frame, returning the state at the end of the frame.
    pub fn step<E>(&mut self, engine: &mut E) -> FiniteState
    where
        E: MotionEngine<Gait = GaitCommand>,
    {
        // Mode execution, each mode function sets the next state itself
        match self.state {
            FiniteState::Idle => self.mode_idle(engine),
            FiniteState::Running { .. } => self.mode_running(engine),
            FiniteState::Finished => (),
        }

        self.state
    }

    /// Stop the run in the next frame, sitting the robot down.
    ///
    /// A run that was loaded but not yet started is discarded without issuing anything to the
    /// engine. Has no effect once finished.
    pub fn abort(&mut self) {
        match self.state {
            FiniteState::Running { .. } => {
                info!("Walk test abort requested");
                self.abort_requested = true;
            }
            FiniteState::Idle if self.script.is_some() => {
                info!("Walk test aborted before it started");
                self.script = None;
                self.selected = None;
            }
            _ => (),
        }
    }

    pub fn state(&self) -> FiniteState {
        self.state
    }

    /// The gait of the current (or last) run.
    pub fn selected_gait(&self) -> Option<&SelectedGait> {
        self.selected.as_ref()
    }

    /// Anomalies recorded during the current (or last) run.
    pub fn events(&self) -> &[DriverEvent] {
        &self.events
    }

    pub fn report(&self) -> WalkTestReport {
        WalkTestReport {
            gait: self.selected.as_ref().map(|s| GaitSummary {
                robot: s.robot,
                requested_role: s.requested_role,
                role: s.role,
                name: s.name.clone(),
            }),
            script_len: self.script.as_ref().map(|s| s.len()).unwrap_or(0),
            script_frames: self.script.as_ref().map(|s| s.total_frames()).unwrap_or(0),
            ticks: self.ticks,
            commands_dispatched: self.commands_dispatched,
            final_state: self.state,
            aborted: self.aborted,
            events: self.events.clone(),
        }
    }

    // ---- MODES ----

    /// Start the loaded run, if there is one, and run its first frame.
    fn mode_idle<E>(&mut self, engine: &mut E)
    where
        E: MotionEngine<Gait = GaitCommand>,
    {
        let gait = match self.selected {
            Some(ref s) if self.script.is_some() => s.gait.clone(),
            _ => return,
        };

        self.ticks += 1;

        let res = engine.stop_head_tracking();
        self.check_engine(EngineRequest::StopHeadTracking, res);
        let res = engine.set_gait(&gait);
        self.check_engine(EngineRequest::SetGait, res);

        self.driver = DriverState {
            script_index: 0,
            frames_elapsed: 0,
            dispatch_pending: true,
        };
        self.state = FiniteState::Running { script_index: 0 };

        info!("Walk test started");

        self.run_frame(engine);
    }

    fn mode_running<E>(&mut self, engine: &mut E)
    where
        E: MotionEngine<Gait = GaitCommand>,
    {
        self.ticks += 1;
        self.run_frame(engine);
    }

    /// Dispatch and count a single frame of the running script.
    fn run_frame<E>(&mut self, engine: &mut E)
    where
        E: MotionEngine<Gait = GaitCommand>,
    {
        if self.abort_requested {
            info!("Walk test aborted at command {}", self.driver.script_index);
            self.aborted = true;
            self.enter_finished(engine);
            return;
        }

        if self.driver.dispatch_pending {
            let cmd = match self.script.as_ref().and_then(|s| s.get(self.driver.script_index)) {
                Some(c) => c.clone(),
                None => {
                    info!("Walk test script complete");
                    self.enter_finished(engine);
                    return;
                }
            };

            self.dispatch(engine, &cmd);
            self.driver.dispatch_pending = false;
            self.state = FiniteState::Running {
                script_index: self.driver.script_index,
            };
        }

        let duration = self
            .script
            .as_ref()
            .and_then(|s| s.get(self.driver.script_index))
            .map(|c| c.duration_frames)
            .unwrap_or(0);

        self.driver.frames_elapsed += 1;

        // No pause frames, the next command is issued in the very next frame
        if self.driver.frames_elapsed >= duration {
            self.driver.script_index += 1;
            self.driver.frames_elapsed = 0;
            self.driver.dispatch_pending = true;
        }
    }

    /// Issue the engine request for a newly entered command.
    fn dispatch<E>(&mut self, engine: &mut E, cmd: &TrajectoryCommand)
    where
        E: MotionEngine<Gait = GaitCommand>,
    {
        let index = self.driver.script_index;
        self.commands_dispatched += 1;

        match cmd.action {
            CommandAction::Walk(vel) => {
                debug!("Command {}: walk {}", index, vel);
                let res = engine.set_velocity(vel);
                self.check_engine(EngineRequest::SetVelocity, res);
            }
            CommandAction::Step(req) => {
                warn!(
                    "Command {}: {} commands are unreliable and may not be executed as expected",
                    index,
                    cmd.kind_name()
                );
                self.events.push(DriverEvent::DegradedCommand {
                    tick: self.ticks,
                    script_index: index,
                    kind: cmd.kind_name().to_string(),
                });

                let res = engine.request_steps(req);
                self.check_engine(EngineRequest::RequestSteps, res);
            }
            CommandAction::Unrecognised { .. } => {
                warn!(
                    "Command {}: unrecognised command kind \"{}\", skipping it",
                    index,
                    cmd.kind_name()
                );
                self.events.push(DriverEvent::UnrecognisedCommand {
                    tick: self.ticks,
                    script_index: index,
                    kind: cmd.kind_name().to_string(),
                });
            }
        }
    }

    /// Sit the robot down and end the run.
    fn enter_finished<E>(&mut self, engine: &mut E)
    where
        E: MotionEngine<Gait = GaitCommand>,
    {
        let res = engine.play_posture(Posture::Sit);
        self.check_engine(EngineRequest::PlayPosture, res);
        let res = engine.stop_head_tracking();
        self.check_engine(EngineRequest::StopHeadTracking, res);

        self.abort_requested = false;
        self.state = FiniteState::Finished;

        info!(
            "Walk test finished after {} frames ({} events)",
            self.ticks,
            self.events.len()
        );
    }

    /// Record an engine rejection. Rejections are not retried.
    fn check_engine(&mut self, request: EngineRequest, res: Result<(), EngineError>) {
        if let Err(e) = res {
            warn!("Engine rejected {}: {}", request, e);
            self.events.push(DriverEvent::EngineRejected {
                tick: self.ticks,
                request,
                reason: e.to_string(),
            });
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

//! # Dry-run motion engine
//!
//! An in-process stand-in for the walking engine. It keeps track of the active gait and walk
//! target, applies the same request checks the real engine does, and records every accepted
//! request as a [`MotionCmd`] so a walk test can be checked without a robot.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info, trace};
use motion_if::{EngineError, MotionCmd, MotionEngine, Posture, StepRequest, WalkVector};

use crate::gait::{GaitCommand, MOTION_FRAME_LENGTH_S};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct SimEngine {
    gait: Option<GaitCommand>,

    /// Current walk target, after clipping
    velocity: WalkVector,

    /// Last posture played
    posture: Option<Posture>,

    head_tracking: bool,

    /// Every accepted request, in order
    cmd_log: Vec<MotionCmd>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimEngine {
    /// A new engine with no gait installed and head tracking enabled.
    pub fn new() -> Self {
        Self {
            head_tracking: true,
            ..Self::default()
        }
    }

    pub fn active_gait(&self) -> Option<&GaitCommand> {
        self.gait.as_ref()
    }

    /// The walk target currently being followed.
    pub fn velocity(&self) -> WalkVector {
        self.velocity
    }

    pub fn posture(&self) -> Option<Posture> {
        self.posture
    }

    pub fn head_tracking(&self) -> bool {
        self.head_tracking
    }

    pub fn cmd_log(&self) -> &[MotionCmd] {
        &self.cmd_log
    }

    /// Take the command log, leaving it empty.
    pub fn take_cmd_log(&mut self) -> Vec<MotionCmd> {
        std::mem::take(&mut self.cmd_log)
    }

    /// Get the active gait if it is able to walk.
    fn walking_gait(&self) -> Result<&GaitCommand, EngineError> {
        match self.gait {
            Some(ref g) if g.is_walking() => Ok(g),
            Some(_) => Err(EngineError::NonWalkingGait),
            None => Err(EngineError::NoGait),
        }
    }
}

impl MotionEngine for SimEngine {
    type Gait = GaitCommand;

    fn set_gait(&mut self, gait: &GaitCommand) -> Result<(), EngineError> {
        let frames = gait.step().frame_lengths(MOTION_FRAME_LENGTH_S);
        info!(
            "Gait installed: {} step ({} frames, {} double support)",
            if gait.is_walking() {
                "walking"
            } else {
                "stationary"
            },
            frames.step_frames,
            frames.double_support_frames
        );

        self.gait = Some(*gait);
        self.cmd_log.push(MotionCmd::SetGait {
            bundles: gait.to_flat(),
        });

        Ok(())
    }

    fn set_velocity(&mut self, vel: WalkVector) -> Result<(), EngineError> {
        if !vel.is_finite() {
            return Err(EngineError::NonFinite("walk vector"));
        }

        let clipped = self.walking_gait()?.step().clip_velocity(vel);
        if clipped != vel {
            debug!("Walk target {} clipped to {}", vel, clipped);
        }

        self.velocity = clipped;
        self.cmd_log.push(MotionCmd::SetVelocity(clipped));

        Ok(())
    }

    fn request_steps(&mut self, req: StepRequest) -> Result<(), EngineError> {
        if !req.is_finite() {
            return Err(EngineError::NonFinite("step request"));
        }

        self.walking_gait()?;

        if req.step_time <= 0.0 {
            return Err(EngineError::Rejected(format!(
                "step time must be positive, got {}",
                req.step_time
            )));
        }

        trace!("Steps requested: {:?}", req);
        self.cmd_log.push(MotionCmd::RequestSteps(req));

        Ok(())
    }

    fn play_posture(&mut self, posture: Posture) -> Result<(), EngineError> {
        info!("Playing posture: {}", posture);

        // Postures replace any walk in progress
        self.velocity = WalkVector::default();
        self.posture = Some(posture);
        self.cmd_log.push(MotionCmd::PlayPosture { posture });

        Ok(())
    }

    fn stop_head_tracking(&mut self) -> Result<(), EngineError> {
        self.head_tracking = false;
        self.cmd_log.push(MotionCmd::StopHeadTracking);

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::gait::{bundles::*, GaitOverrides};

    fn walking_gait() -> GaitCommand {
        GaitCommand::assemble(
            StanceBundle::new(31.0, 1.45, 10.0, 3.0, 0.0, 0.1),
            StepBundle::new(
                0.4, 0.25, 0.9, 0.0, 7.0, -7.0, 3.5, 20.0, 7.0, 7.0, 20.0, GaitMode::Walking,
            ),
            ZmpBundle::new(0.0, 0.4, 0.4, 0.4, 0.01, 6.6),
            JointHackBundle::new(5.5, 5.5),
            SensorFeedbackBundle::legacy(0.5, 0.3, 7.0, 3.0, 45.0),
            StiffnessBundle::new(0.85, 0.3, 0.4, 0.3, 0.1, 0.1),
            OdometryBundle::new(1.0, 1.0, 1.0),
            ArmSwingBundle::new(0.0),
        )
    }

    #[test]
    fn test_rejections() {
        let mut engine = SimEngine::new();
        assert!(engine.head_tracking());

        // Nothing walks without a gait
        assert_eq!(
            engine.set_velocity(WalkVector::new(1.0, 0.0, 0.0)),
            Err(EngineError::NoGait)
        );

        // Nor with a stationary one
        let stationary = walking_gait().derive_variant(&GaitOverrides::new().step(
            StepBundle::new(
                0.4, 0.25, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, GaitMode::NonWalking,
            ),
        ));
        engine.set_gait(&stationary).unwrap();
        assert_eq!(
            engine.set_velocity(WalkVector::new(1.0, 0.0, 0.0)),
            Err(EngineError::NonWalkingGait)
        );
        let req = StepRequest {
            x: 1.0,
            y: 0.0,
            theta: 0.0,
            step_time: 0.4,
        };
        assert_eq!(engine.request_steps(req), Err(EngineError::NonWalkingGait));

        engine.set_gait(&walking_gait()).unwrap();
        assert_eq!(
            engine.set_velocity(WalkVector::new(std::f64::NAN, 0.0, 0.0)),
            Err(EngineError::NonFinite("walk vector"))
        );
        assert!(matches!(
            engine.request_steps(StepRequest {
                step_time: 0.0,
                ..req
            }),
            Err(EngineError::Rejected(_))
        ));
        assert!(engine.request_steps(req).is_ok());

        // Only accepted requests are logged
        assert_eq!(engine.cmd_log().len(), 3);
        assert_eq!(engine.cmd_log()[2], MotionCmd::RequestSteps(req));
    }

    #[test]
    fn test_velocity_clipping() {
        let mut engine = SimEngine::new();
        engine.set_gait(&walking_gait()).unwrap();

        engine.set_velocity(WalkVector::new(3.0, 1.0, 5.0)).unwrap();
        assert_eq!(engine.velocity(), WalkVector::new(3.0, 1.0, 5.0));

        engine
            .set_velocity(WalkVector::new(100.1, 250.4, 445.5))
            .unwrap();
        let v = engine.velocity();
        assert!(v.x < 7.0 && v.y < 3.5 && v.theta < 20.0);
        assert_eq!(
            engine.cmd_log().last(),
            Some(&MotionCmd::SetVelocity(v))
        );

        engine.play_posture(Posture::Sit).unwrap();
        assert_eq!(engine.velocity(), WalkVector::default());
        assert_eq!(engine.posture(), Some(Posture::Sit));

        engine.stop_head_tracking().unwrap();
        assert!(!engine.head_tracking());

        let log = engine.take_cmd_log();
        assert_eq!(log.len(), 5);
        assert_eq!(
            log[0],
            MotionCmd::SetGait {
                bundles: walking_gait().to_flat()
            }
        );
        assert!(engine.cmd_log().is_empty());
    }
}

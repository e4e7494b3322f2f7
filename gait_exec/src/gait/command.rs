//! # Gait command
//!
//! The complete parameter set for one style of walk, assembled from the eight bundles in their
//! fixed order.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;

use super::bundles::*;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A complete gait.
///
/// A gait can only be built with all eight bundles, and never changes once built. Variants of an
/// existing gait are made with [`GaitCommand::derive_variant`].
///
/// Each bundle position has its own type, so bundles given in the wrong order are rejected at
/// compile time:
///
/// ```compile_fail
/// use gait_lib::gait::*;
///
/// let stance = StanceBundle::new(31.0, 1.45, 10.0, 3.0, 0.0, 0.1);
/// let zmp = ZmpBundle::new(0.0, 0.4, 0.4, 0.4, 0.01, 6.6);
/// let step = StepBundle::new(
///     0.4, 0.25, 0.9, 0.0, 7.0, -7.0, 3.5, 20.0, 7.0, 7.0, 20.0, GaitMode::Walking,
/// );
///
/// // ZMP and step swapped
/// let gait = GaitCommand::assemble(
///     stance,
///     zmp,
///     step,
///     JointHackBundle::new(5.5, 5.5),
///     SensorFeedbackBundle::legacy(0.5, 0.5, 15.0, 15.0, 75.0),
///     StiffnessBundle::new(0.85, 0.3, 0.4, 0.3, 0.1, 0.1),
///     OdometryBundle::new(1.0, 1.0, 1.0),
///     ArmSwingBundle::new(0.0),
/// );
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct GaitCommand {
    stance: StanceBundle,
    step: StepBundle,
    zmp: ZmpBundle,
    joint_hack: JointHackBundle,
    sensor_feedback: SensorFeedbackBundle,
    stiffness: StiffnessBundle,
    odometry: OdometryBundle,
    arm_swing: ArmSwingBundle,
}

/// Bundles to replace when deriving a variant of a gait.
///
/// Any bundle left as `None` is taken from the base gait.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct GaitOverrides {
    pub stance: Option<StanceBundle>,
    pub step: Option<StepBundle>,
    pub zmp: Option<ZmpBundle>,
    pub joint_hack: Option<JointHackBundle>,
    pub sensor_feedback: Option<SensorFeedbackBundle>,
    pub stiffness: Option<StiffnessBundle>,
    pub odometry: Option<OdometryBundle>,
    pub arm_swing: Option<ArmSwingBundle>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GaitCommand {
    /// Assemble a gait from its bundles, given in the engine's fixed order.
    #[allow(clippy::too_many_arguments)]
    pub const fn assemble(
        stance: StanceBundle,
        step: StepBundle,
        zmp: ZmpBundle,
        joint_hack: JointHackBundle,
        sensor_feedback: SensorFeedbackBundle,
        stiffness: StiffnessBundle,
        odometry: OdometryBundle,
        arm_swing: ArmSwingBundle,
    ) -> Self {
        Self {
            stance,
            step,
            zmp,
            joint_hack,
            sensor_feedback,
            stiffness,
            odometry,
            arm_swing,
        }
    }

    /// Build a new gait equal to this one except for the bundles given in `overrides`.
    pub fn derive_variant(&self, overrides: &GaitOverrides) -> Self {
        Self {
            stance: overrides.stance.unwrap_or(self.stance),
            step: overrides.step.unwrap_or(self.step),
            zmp: overrides.zmp.unwrap_or(self.zmp),
            joint_hack: overrides.joint_hack.unwrap_or(self.joint_hack),
            sensor_feedback: overrides.sensor_feedback.unwrap_or(self.sensor_feedback),
            stiffness: overrides.stiffness.unwrap_or(self.stiffness),
            odometry: overrides.odometry.unwrap_or(self.odometry),
            arm_swing: overrides.arm_swing.unwrap_or(self.arm_swing),
        }
    }

    pub fn stance(&self) -> &StanceBundle {
        &self.stance
    }

    pub fn step(&self) -> &StepBundle {
        &self.step
    }

    pub fn zmp(&self) -> &ZmpBundle {
        &self.zmp
    }

    pub fn joint_hack(&self) -> &JointHackBundle {
        &self.joint_hack
    }

    pub fn sensor_feedback(&self) -> &SensorFeedbackBundle {
        &self.sensor_feedback
    }

    pub fn stiffness(&self) -> &StiffnessBundle {
        &self.stiffness
    }

    pub fn odometry(&self) -> &OdometryBundle {
        &self.odometry
    }

    pub fn arm_swing(&self) -> &ArmSwingBundle {
        &self.arm_swing
    }

    /// True if the gait can walk, false for a stationary configuration.
    pub fn is_walking(&self) -> bool {
        self.step.is_walking()
    }

    /// The gait as the engine receives it, one flat array per bundle in assembly order.
    pub fn to_flat(&self) -> Vec<Vec<f64>> {
        vec![
            self.stance.to_flat(),
            self.step.to_flat(),
            self.zmp.to_flat(),
            self.joint_hack.to_flat(),
            self.sensor_feedback.to_flat(),
            self.stiffness.to_flat(),
            self.odometry.to_flat(),
            self.arm_swing.to_flat(),
        ]
    }
}

impl GaitOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stance(mut self, stance: StanceBundle) -> Self {
        self.stance = Some(stance);
        self
    }

    pub fn step(mut self, step: StepBundle) -> Self {
        self.step = Some(step);
        self
    }

    pub fn zmp(mut self, zmp: ZmpBundle) -> Self {
        self.zmp = Some(zmp);
        self
    }

    pub fn joint_hack(mut self, joint_hack: JointHackBundle) -> Self {
        self.joint_hack = Some(joint_hack);
        self
    }

    pub fn sensor_feedback(mut self, sensor_feedback: SensorFeedbackBundle) -> Self {
        self.sensor_feedback = Some(sensor_feedback);
        self
    }

    pub fn stiffness(mut self, stiffness: StiffnessBundle) -> Self {
        self.stiffness = Some(stiffness);
        self
    }

    pub fn odometry(mut self, odometry: OdometryBundle) -> Self {
        self.odometry = Some(odometry);
        self
    }

    pub fn arm_swing(mut self, arm_swing: ArmSwingBundle) -> Self {
        self.arm_swing = Some(arm_swing);
        self
    }

    /// True if no bundle is overridden.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const STANCE: StanceBundle = StanceBundle::new(31.0, 1.45, 10.0, 3.0, 0.0, 0.1);
    const STEP: StepBundle = StepBundle::new(
        0.4, 0.25, 0.9, 0.0, 7.0, -7.0, 3.5, 20.0, 7.0, 7.0, 20.0, GaitMode::Walking,
    );
    const STATIONARY_STEP: StepBundle = StepBundle::new(
        0.4, 0.25, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, GaitMode::NonWalking,
    );

    fn webots_gait() -> GaitCommand {
        GaitCommand::assemble(
            STANCE,
            StepBundle::new(
                0.4, 0.25, 1.1, 0.0, 10.0, -6.0, 5.0, 30.0, 5.0, 5.0, 20.0, GaitMode::Walking,
            ),
            ZmpBundle::new(0.0, 0.4, 0.0, 0.0, 0.01, 6.6),
            JointHackBundle::new(0.0, 0.0),
            SensorFeedbackBundle::legacy(0.5, 0.5, 15.0, 15.0, 75.0),
            StiffnessBundle::new(0.85, 0.3, 0.4, 0.3, 0.1, 0.1),
            OdometryBundle::new(1.0, 1.0, 1.0),
            ArmSwingBundle::new(0.0),
        )
    }

    #[test]
    fn test_assemble_order() {
        let gait = webots_gait();
        let flat = gait.to_flat();

        let arities: Vec<usize> = flat.iter().map(|b| b.len()).collect();
        assert_eq!(arities, vec![6, 12, 6, 2, 8, 6, 3, 1]);
        assert_eq!(flat[0], STANCE.to_flat());
        assert_eq!(flat[4][0], LEGACY_FEEDBACK);
        assert!(gait.is_walking());
    }

    #[test]
    fn test_derive_variant() {
        let base = webots_gait();
        let stationary = base.derive_variant(&GaitOverrides::new().step(STATIONARY_STEP));

        // The base is untouched
        assert!(base.is_walking());
        assert_ne!(base, stationary);

        assert!(!stationary.is_walking());
        assert_eq!(stationary.step(), &STATIONARY_STEP);
        assert_eq!(stationary.stance(), base.stance());
        assert_eq!(stationary.zmp(), base.zmp());
        assert_eq!(stationary.joint_hack(), base.joint_hack());
        assert_eq!(stationary.sensor_feedback(), base.sensor_feedback());
        assert_eq!(stationary.stiffness(), base.stiffness());
        assert_eq!(stationary.odometry(), base.odometry());
        assert_eq!(stationary.arm_swing(), base.arm_swing());

        // No overrides is an identical copy
        assert!(GaitOverrides::default().is_empty());
        assert_eq!(base.derive_variant(&GaitOverrides::default()), base);

        // Overriding with the same step as the base also gives an equal gait
        let same = base.derive_variant(&GaitOverrides::new().step(*base.step()));
        assert_eq!(same, base);
    }

    #[test]
    fn test_gait_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GaitCommand>();
    }
}

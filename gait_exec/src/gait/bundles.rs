//! Gait parameter bundles
//!
//! Each bundle is a small immutable record of physically tuned constants. Values are not range
//! checked, they are chosen by engineers and validated on the field rather than at runtime.
//!
//! Every bundle can also be converted to and from its flat form, the ordered list of numbers the
//! walking engine consumes. The flat order is the documented field order of each struct.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use motion_if::WalkVector;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::GaitConfigError;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Step bundle walking flag value for a walking gait.
pub const WALKING: f64 = 1.0;

/// Step bundle walking flag value for a stationary gait.
pub const NON_WALKING: f64 = 0.0;

/// Sensor feedback selector value for the spring model.
pub const SPRING_FEEDBACK: f64 = 1.0;

/// Sensor feedback selector value for the legacy angle compensation model.
pub const LEGACY_FEEDBACK: f64 = 0.0;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Common interface of all parameter bundles.
pub trait Bundle: Sized + Copy {
    /// Which kind of bundle this is.
    const KIND: BundleKind;

    /// Number of values in the flat form.
    const ARITY: usize;

    /// Build the bundle from its flat form.
    ///
    /// `name` is only used to identify the bundle in errors.
    fn from_flat(name: &str, vals: &[f64]) -> Result<Self, GaitConfigError>;

    /// Get the flat form of the bundle.
    fn to_flat(&self) -> Vec<f64>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Static standing configuration, used when transitioning into and out of walking.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StanceBundle {
    /// Height of the centre of mass.
    ///
    /// Units: centimeters
    pub com_height_cm: f64,

    /// Forward displacement of the centre of mass.
    ///
    /// Units: centimeters
    pub com_offset_x_cm: f64,

    /// Horizontal distance between the feet.
    ///
    /// Units: centimeters
    pub feet_separation_cm: f64,

    /// Body angle around the y axis.
    ///
    /// Units: degrees
    pub body_pitch_deg: f64,

    /// Angle between the feet.
    ///
    /// Units: degrees
    pub feet_angle_deg: f64,

    /// Time to transition to/from this stance.
    ///
    /// Units: seconds
    pub transition_time_s: f64,
}

/// Step timing and speed limits.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepBundle {
    /// Units: seconds
    pub duration_s: f64,

    /// Fraction of each step spent in double support.
    pub double_support_fraction: f64,

    /// Units: centimeters
    pub step_height_cm: f64,

    /// Units: centimeters
    pub step_lift_cm: f64,

    /// Maximum forwards speed.
    ///
    /// Units: centimeters/second
    pub max_x_speed: f64,

    /// Maximum backwards speed, given as a negative number.
    ///
    /// Units: centimeters/second
    pub min_x_speed: f64,

    /// Units: centimeters/second
    pub max_y_speed: f64,

    /// Units: degrees/second
    pub max_theta_speed: f64,

    /// Units: centimeters/second^2
    pub max_x_accel: f64,

    /// Units: centimeters/second^2
    pub max_y_accel: f64,

    /// Units: degrees/second^2
    pub max_theta_accel: f64,

    /// Whether this is a true walking gait or a stationary configuration.
    pub mode: GaitMode,
}

/// Step durations expressed in engine frames.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StepFrames {
    pub step_frames: u32,
    pub double_support_frames: u32,
    pub single_support_frames: u32,
}

/// Zero moment point reference offsets.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZmpBundle {
    /// Units: centimeters
    pub foot_center_x_cm: f64,

    /// Fraction of double support during which the ZMP is held static.
    pub static_fraction: f64,

    /// Units: centimeters
    pub left_offset_y_cm: f64,

    /// Units: centimeters
    pub right_offset_y_cm: f64,

    /// Lateral offset added while strafing, no units.
    pub strafe_offset: f64,

    /// Offset added while turning.
    pub turn_offset: f64,
}

/// Joint angle additions compensating for hardware backlash.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JointHackBundle {
    /// Units: degrees
    pub left_swing_hip_roll_deg: f64,

    /// Units: degrees
    pub right_swing_hip_roll_deg: f64,
}

/// Joint stiffnesses, each between 0 (limp) and 1 (fully stiff).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StiffnessBundle {
    pub hip: f64,
    pub knee: f64,
    pub ankle_pitch: f64,
    pub ankle_roll: f64,
    pub arm: f64,
    pub arm_pitch: f64,
}

/// Odometry scale factors.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OdometryBundle {
    pub x_scale: f64,
    pub y_scale: f64,
    pub theta_scale: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArmSwingBundle {
    /// Units: degrees
    pub amplitude_deg: f64,
}

/// Positions of the feet relative to the centre of mass in the default stance.
///
/// Units: centimeters
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FootPositions {
    pub left: [f64; 3],
    pub right: [f64; 3],
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The kinds of bundle that make up a gait, in assembly order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleKind {
    Stance,
    Step,
    Zmp,
    JointHack,
    SensorFeedback,
    Stiffness,
    Odometry,
    ArmSwing,
}

/// Distinguishes a true walking gait from a stationary configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GaitMode {
    Walking,
    /// Zero step height and zero speed limits, the robot only stands.
    NonWalking,
}

/// Sensor feedback configuration.
///
/// The two models interpret their parameters differently so they are kept apart, a value can
/// never be read under the wrong model.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum SensorFeedbackBundle {
    /// Spring model, body angle errors are corrected through virtual springs.
    Spring {
        /// Angle X scale (gamma)
        gamma_x: f64,
        /// Angle Y scale (gamma)
        gamma_y: f64,
        /// X spring constant.
        ///
        /// Units: kg/s^2
        k_x: f64,
        /// Y spring constant.
        ///
        /// Units: kg/s^2
        k_y: f64,
        /// Units: degrees
        max_angle_x_deg: f64,
        /// Units: degrees
        max_angle_y_deg: f64,
        /// Maximum change in compensation.
        ///
        /// Units: degrees/second
        max_angle_vel_degs: f64,
    },

    /// Legacy angle compensation with fixed scale factors.
    Legacy {
        scale_x: f64,
        scale_y: f64,
        /// Units: degrees
        max_angle_x_deg: f64,
        /// Units: degrees
        max_angle_y_deg: f64,
        /// Units: degrees/second
        max_angle_vel_degs: f64,
    },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl BundleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BundleKind::Stance => "stance",
            BundleKind::Step => "step",
            BundleKind::Zmp => "zmp",
            BundleKind::JointHack => "joint_hack",
            BundleKind::SensorFeedback => "sensor_feedback",
            BundleKind::Stiffness => "stiffness",
            BundleKind::Odometry => "odometry",
            BundleKind::ArmSwing => "arm_swing",
        }
    }
}

impl fmt::Display for BundleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl GaitMode {
    /// Value of the walking flag in the flat form.
    pub fn as_flag(&self) -> f64 {
        match self {
            GaitMode::Walking => WALKING,
            GaitMode::NonWalking => NON_WALKING,
        }
    }
}

impl StanceBundle {
    pub const fn new(
        com_height_cm: f64,
        com_offset_x_cm: f64,
        feet_separation_cm: f64,
        body_pitch_deg: f64,
        feet_angle_deg: f64,
        transition_time_s: f64,
    ) -> Self {
        Self {
            com_height_cm,
            com_offset_x_cm,
            feet_separation_cm,
            body_pitch_deg,
            feet_angle_deg,
            transition_time_s,
        }
    }

    /// Foot positions relative to the centre of mass when standing in this stance.
    pub fn foot_positions(&self) -> FootPositions {
        let half_sep = self.feet_separation_cm * 0.5;

        FootPositions {
            left: [-self.com_offset_x_cm, half_sep, -self.com_height_cm],
            right: [-self.com_offset_x_cm, -half_sep, -self.com_height_cm],
        }
    }
}

impl StepBundle {
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        duration_s: f64,
        double_support_fraction: f64,
        step_height_cm: f64,
        step_lift_cm: f64,
        max_x_speed: f64,
        min_x_speed: f64,
        max_y_speed: f64,
        max_theta_speed: f64,
        max_x_accel: f64,
        max_y_accel: f64,
        max_theta_accel: f64,
        mode: GaitMode,
    ) -> Self {
        Self {
            duration_s,
            double_support_fraction,
            step_height_cm,
            step_lift_cm,
            max_x_speed,
            min_x_speed,
            max_y_speed,
            max_theta_speed,
            max_x_accel,
            max_y_accel,
            max_theta_accel,
            mode,
        }
    }

    pub fn is_walking(&self) -> bool {
        self.mode == GaitMode::Walking
    }

    /// Split the step duration into engine frames.
    pub fn frame_lengths(&self, frame_length_s: f64) -> StepFrames {
        let step_frames = (self.duration_s / frame_length_s).round().max(0.0) as u32;
        let double_support_frames = ((step_frames as f64) * self.double_support_fraction)
            .round()
            .max(0.0)
            .min(step_frames as f64) as u32;

        StepFrames {
            step_frames,
            double_support_frames,
            single_support_frames: step_frames - double_support_frames,
        }
    }

    /// Clip a velocity onto the ellipse bounded by this step's speed limits.
    ///
    /// The direction of the velocity is preserved. Axes with a zero limit are zeroed.
    pub fn clip_velocity(&self, vel: WalkVector) -> WalkVector {
        let x_limit = if vel.x >= 0.0 {
            self.max_x_speed
        } else {
            self.min_x_speed.abs()
        };

        let mut comps = [vel.x, vel.y, vel.theta];
        let limits = [x_limit, self.max_y_speed.abs(), self.max_theta_speed.abs()];

        let mut norm_sq = 0.0;
        for (c, l) in comps.iter_mut().zip(limits.iter()) {
            if *l <= 0.0 {
                *c = 0.0;
            } else {
                norm_sq += (*c / *l).powi(2);
            }
        }

        if norm_sq > 1.0 {
            let scale = 1.0 / norm_sq.sqrt();
            for c in comps.iter_mut() {
                *c *= scale;
            }
        }

        WalkVector::new(comps[0], comps[1], comps[2])
    }
}

impl ZmpBundle {
    pub const fn new(
        foot_center_x_cm: f64,
        static_fraction: f64,
        left_offset_y_cm: f64,
        right_offset_y_cm: f64,
        strafe_offset: f64,
        turn_offset: f64,
    ) -> Self {
        Self {
            foot_center_x_cm,
            static_fraction,
            left_offset_y_cm,
            right_offset_y_cm,
            strafe_offset,
            turn_offset,
        }
    }
}

impl JointHackBundle {
    pub const fn new(left_swing_hip_roll_deg: f64, right_swing_hip_roll_deg: f64) -> Self {
        Self {
            left_swing_hip_roll_deg,
            right_swing_hip_roll_deg,
        }
    }
}

impl SensorFeedbackBundle {
    /// Spring model feedback.
    pub const fn spring(
        gamma_x: f64,
        gamma_y: f64,
        k_x: f64,
        k_y: f64,
        max_angle_x_deg: f64,
        max_angle_y_deg: f64,
        max_angle_vel_degs: f64,
    ) -> Self {
        SensorFeedbackBundle::Spring {
            gamma_x,
            gamma_y,
            k_x,
            k_y,
            max_angle_x_deg,
            max_angle_y_deg,
            max_angle_vel_degs,
        }
    }

    /// Legacy angle compensation feedback.
    pub const fn legacy(
        scale_x: f64,
        scale_y: f64,
        max_angle_x_deg: f64,
        max_angle_y_deg: f64,
        max_angle_vel_degs: f64,
    ) -> Self {
        SensorFeedbackBundle::Legacy {
            scale_x,
            scale_y,
            max_angle_x_deg,
            max_angle_y_deg,
            max_angle_vel_degs,
        }
    }

    /// Value of the model selector in the flat form.
    pub fn selector(&self) -> f64 {
        match self {
            SensorFeedbackBundle::Spring { .. } => SPRING_FEEDBACK,
            SensorFeedbackBundle::Legacy { .. } => LEGACY_FEEDBACK,
        }
    }
}

impl StiffnessBundle {
    pub const fn new(
        hip: f64,
        knee: f64,
        ankle_pitch: f64,
        ankle_roll: f64,
        arm: f64,
        arm_pitch: f64,
    ) -> Self {
        Self {
            hip,
            knee,
            ankle_pitch,
            ankle_roll,
            arm,
            arm_pitch,
        }
    }
}

impl OdometryBundle {
    pub const fn new(x_scale: f64, y_scale: f64, theta_scale: f64) -> Self {
        Self {
            x_scale,
            y_scale,
            theta_scale,
        }
    }
}

impl ArmSwingBundle {
    pub const fn new(amplitude_deg: f64) -> Self {
        Self { amplitude_deg }
    }
}

// ---- FLAT FORMS ----

impl Bundle for StanceBundle {
    const KIND: BundleKind = BundleKind::Stance;
    const ARITY: usize = 6;

    fn from_flat(name: &str, vals: &[f64]) -> Result<Self, GaitConfigError> {
        check_arity::<Self>(name, vals)?;
        Ok(Self::new(vals[0], vals[1], vals[2], vals[3], vals[4], vals[5]))
    }

    fn to_flat(&self) -> Vec<f64> {
        vec![
            self.com_height_cm,
            self.com_offset_x_cm,
            self.feet_separation_cm,
            self.body_pitch_deg,
            self.feet_angle_deg,
            self.transition_time_s,
        ]
    }
}

impl Bundle for StepBundle {
    const KIND: BundleKind = BundleKind::Step;
    const ARITY: usize = 12;

    fn from_flat(name: &str, vals: &[f64]) -> Result<Self, GaitConfigError> {
        check_arity::<Self>(name, vals)?;

        let mode = if vals[11] == WALKING {
            GaitMode::Walking
        } else if vals[11] == NON_WALKING {
            GaitMode::NonWalking
        } else {
            return Err(GaitConfigError::WalkingFlag {
                name: name.to_string(),
                value: vals[11],
            });
        };

        Ok(Self::new(
            vals[0], vals[1], vals[2], vals[3], vals[4], vals[5], vals[6], vals[7], vals[8],
            vals[9], vals[10], mode,
        ))
    }

    fn to_flat(&self) -> Vec<f64> {
        vec![
            self.duration_s,
            self.double_support_fraction,
            self.step_height_cm,
            self.step_lift_cm,
            self.max_x_speed,
            self.min_x_speed,
            self.max_y_speed,
            self.max_theta_speed,
            self.max_x_accel,
            self.max_y_accel,
            self.max_theta_accel,
            self.mode.as_flag(),
        ]
    }
}

impl Bundle for ZmpBundle {
    const KIND: BundleKind = BundleKind::Zmp;
    const ARITY: usize = 6;

    fn from_flat(name: &str, vals: &[f64]) -> Result<Self, GaitConfigError> {
        check_arity::<Self>(name, vals)?;
        Ok(Self::new(vals[0], vals[1], vals[2], vals[3], vals[4], vals[5]))
    }

    fn to_flat(&self) -> Vec<f64> {
        vec![
            self.foot_center_x_cm,
            self.static_fraction,
            self.left_offset_y_cm,
            self.right_offset_y_cm,
            self.strafe_offset,
            self.turn_offset,
        ]
    }
}

impl Bundle for JointHackBundle {
    const KIND: BundleKind = BundleKind::JointHack;
    const ARITY: usize = 2;

    fn from_flat(name: &str, vals: &[f64]) -> Result<Self, GaitConfigError> {
        check_arity::<Self>(name, vals)?;
        Ok(Self::new(vals[0], vals[1]))
    }

    fn to_flat(&self) -> Vec<f64> {
        vec![self.left_swing_hip_roll_deg, self.right_swing_hip_roll_deg]
    }
}

impl Bundle for SensorFeedbackBundle {
    const KIND: BundleKind = BundleKind::SensorFeedback;
    const ARITY: usize = 8;

    /// The selector is the first value. For the legacy model the two spring constant slots
    /// (values 3 and 4) are ignored.
    fn from_flat(name: &str, vals: &[f64]) -> Result<Self, GaitConfigError> {
        check_arity::<Self>(name, vals)?;

        if vals[0] == SPRING_FEEDBACK {
            Ok(Self::spring(
                vals[1], vals[2], vals[3], vals[4], vals[5], vals[6], vals[7],
            ))
        } else if vals[0] == LEGACY_FEEDBACK {
            Ok(Self::legacy(vals[1], vals[2], vals[5], vals[6], vals[7]))
        } else {
            Err(GaitConfigError::SensorSelector {
                name: name.to_string(),
                value: vals[0],
            })
        }
    }

    fn to_flat(&self) -> Vec<f64> {
        match *self {
            SensorFeedbackBundle::Spring {
                gamma_x,
                gamma_y,
                k_x,
                k_y,
                max_angle_x_deg,
                max_angle_y_deg,
                max_angle_vel_degs,
            } => vec![
                SPRING_FEEDBACK,
                gamma_x,
                gamma_y,
                k_x,
                k_y,
                max_angle_x_deg,
                max_angle_y_deg,
                max_angle_vel_degs,
            ],
            SensorFeedbackBundle::Legacy {
                scale_x,
                scale_y,
                max_angle_x_deg,
                max_angle_y_deg,
                max_angle_vel_degs,
            } => vec![
                LEGACY_FEEDBACK,
                scale_x,
                scale_y,
                0.0,
                0.0,
                max_angle_x_deg,
                max_angle_y_deg,
                max_angle_vel_degs,
            ],
        }
    }
}

impl Bundle for StiffnessBundle {
    const KIND: BundleKind = BundleKind::Stiffness;
    const ARITY: usize = 6;

    fn from_flat(name: &str, vals: &[f64]) -> Result<Self, GaitConfigError> {
        check_arity::<Self>(name, vals)?;
        Ok(Self::new(vals[0], vals[1], vals[2], vals[3], vals[4], vals[5]))
    }

    fn to_flat(&self) -> Vec<f64> {
        vec![
            self.hip,
            self.knee,
            self.ankle_pitch,
            self.ankle_roll,
            self.arm,
            self.arm_pitch,
        ]
    }
}

impl Bundle for OdometryBundle {
    const KIND: BundleKind = BundleKind::Odometry;
    const ARITY: usize = 3;

    fn from_flat(name: &str, vals: &[f64]) -> Result<Self, GaitConfigError> {
        check_arity::<Self>(name, vals)?;
        Ok(Self::new(vals[0], vals[1], vals[2]))
    }

    fn to_flat(&self) -> Vec<f64> {
        vec![self.x_scale, self.y_scale, self.theta_scale]
    }
}

impl Bundle for ArmSwingBundle {
    const KIND: BundleKind = BundleKind::ArmSwing;
    const ARITY: usize = 1;

    fn from_flat(name: &str, vals: &[f64]) -> Result<Self, GaitConfigError> {
        check_arity::<Self>(name, vals)?;
        Ok(Self::new(vals[0]))
    }

    fn to_flat(&self) -> Vec<f64> {
        vec![self.amplitude_deg]
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn check_arity<B: Bundle>(name: &str, vals: &[f64]) -> Result<(), GaitConfigError> {
    if vals.len() != B::ARITY {
        return Err(GaitConfigError::BundleArity {
            kind: B::KIND,
            name: name.to_string(),
            expected: B::ARITY,
            found: vals.len(),
        });
    }

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const STEP: StepBundle = StepBundle::new(
        0.4, 0.25, 0.9, 0.0, 7.0, -7.0, 3.5, 20.0, 7.0, 7.0, 20.0, GaitMode::Walking,
    );

    const STATIONARY_STEP: StepBundle = StepBundle::new(
        0.4, 0.25, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, GaitMode::NonWalking,
    );

    #[test]
    fn test_step_flat_form() {
        let flat = STEP.to_flat();
        assert_eq!(flat.len(), StepBundle::ARITY);
        assert_eq!(flat[11], WALKING);
        assert_eq!(StepBundle::from_flat("step", &flat).unwrap(), STEP);

        let stationary = StepBundle::from_flat("stationary", &STATIONARY_STEP.to_flat()).unwrap();
        assert!(!stationary.is_walking());
        assert_eq!(stationary.to_flat()[11], NON_WALKING);

        // A step tuple with a duplicated trailing speed limit, as found in some hand written
        // configurations, must not be silently accepted.
        let mut thirteen = STEP.to_flat();
        thirteen.insert(11, 20.0);
        match StepBundle::from_flat("med_step", &thirteen) {
            Err(GaitConfigError::BundleArity {
                kind,
                expected,
                found,
                ..
            }) => {
                assert_eq!(kind, BundleKind::Step);
                assert_eq!(expected, 12);
                assert_eq!(found, 13);
            }
            r => panic!("Expected an arity error, got {:?}", r),
        }

        let mut bad_flag = STEP.to_flat();
        bad_flag[11] = 20.0;
        assert!(matches!(
            StepBundle::from_flat("bad", &bad_flag),
            Err(GaitConfigError::WalkingFlag { .. })
        ));
    }

    #[test]
    fn test_sensor_feedback_models() {
        let spring = SensorFeedbackBundle::from_flat(
            "spring",
            &[1.0, 0.1, 0.2, 150.0, 250.0, 15.0, 15.0, 75.0],
        )
        .unwrap();
        assert_eq!(
            spring,
            SensorFeedbackBundle::spring(0.1, 0.2, 150.0, 250.0, 15.0, 15.0, 75.0)
        );
        assert_eq!(spring.selector(), SPRING_FEEDBACK);

        // Spring slots are ignored by the legacy model
        let legacy = SensorFeedbackBundle::from_flat(
            "legacy",
            &[0.0, 0.5, 0.3, 99.0, 99.0, 7.0, 3.0, 45.0],
        )
        .unwrap();
        assert_eq!(legacy, SensorFeedbackBundle::legacy(0.5, 0.3, 7.0, 3.0, 45.0));
        assert_eq!(
            legacy.to_flat(),
            vec![0.0, 0.5, 0.3, 0.0, 0.0, 7.0, 3.0, 45.0]
        );

        assert!(matches!(
            SensorFeedbackBundle::from_flat("odd", &[0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
            Err(GaitConfigError::SensorSelector { .. })
        ));
        assert!(matches!(
            SensorFeedbackBundle::from_flat("short", &[1.0, 0.1]),
            Err(GaitConfigError::BundleArity { expected: 8, found: 2, .. })
        ));
    }

    #[test]
    fn test_other_arities() {
        assert!(ArmSwingBundle::from_flat("arm", &[10.0]).is_ok());
        assert!(ArmSwingBundle::from_flat("arm", &[]).is_err());
        assert!(JointHackBundle::from_flat("hack", &[6.5, 6.5]).is_ok());
        assert!(JointHackBundle::from_flat("hack", &[5.5, 5.5, 5.5]).is_err());
        assert!(OdometryBundle::from_flat("odo", &[1.0, 1.0, 1.0]).is_ok());
        assert!(ZmpBundle::from_flat("zmp", &[0.0, 0.4, 0.4, 0.4, 0.01]).is_err());
        assert!(StiffnessBundle::from_flat("stiff", &[0.85, 0.3, 0.4, 0.3, 0.1, 0.1]).is_ok());
        assert!(StanceBundle::from_flat("stance", &[31.0, 1.45, 10.0, 3.0, 0.0, 0.1]).is_ok());
    }

    #[test]
    fn test_foot_positions() {
        let stance = StanceBundle::new(31.0, 1.45, 10.0, 3.0, 0.0, 0.1);
        let feet = stance.foot_positions();
        assert_eq!(feet.left, [-1.45, 5.0, -31.0]);
        assert_eq!(feet.right, [-1.45, -5.0, -31.0]);
    }

    #[test]
    fn test_frame_lengths() {
        let frames = STEP.frame_lengths(0.01);
        assert_eq!(frames.step_frames, 40);
        assert_eq!(frames.double_support_frames, 10);
        assert_eq!(frames.single_support_frames, 30);
    }

    #[test]
    fn test_clip_velocity() {
        // Inside the ellipse nothing changes
        let v = WalkVector::new(3.5, 1.75, 0.0);
        assert_eq!(STEP.clip_velocity(v), v);

        // Along one axis the limit is hit exactly
        let v = STEP.clip_velocity(WalkVector::new(14.0, 0.0, 0.0));
        assert!((v.x - 7.0).abs() < 1e-9);
        assert_eq!(v.y, 0.0);

        // Backwards uses the minimum x speed
        let v = STEP.clip_velocity(WalkVector::new(-21.0, 0.0, 0.0));
        assert!((v.x + 7.0).abs() < 1e-9);

        // Diagonal stays on the ellipse with its direction preserved
        let v = STEP.clip_velocity(WalkVector::new(100.1, 250.4, 445.5));
        let norm = (v.x / 7.0).powi(2) + (v.y / 3.5).powi(2) + (v.theta / 20.0).powi(2);
        assert!((norm - 1.0).abs() < 1e-9);
        assert!((v.y / v.x - 250.4 / 100.1).abs() < 1e-9);

        // A stationary gait allows no motion at all
        let v = STATIONARY_STEP.clip_velocity(WalkVector::new(6.0, 6.0, 6.0));
        assert_eq!(v, WalkVector::new(0.0, 0.0, 0.0));
    }
}

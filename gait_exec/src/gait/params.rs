//! Gait parameter file layout
//!
//! The gait parameters are a TOML file with three tables:
//!
//! - `bundles.<kind>.<name>` - named bundles, either as a table of named fields or as the flat
//!   array the engine consumes.
//! - `gaits.<name>` - gaits, either naming all eight bundles or naming a `base` gait and the
//!   bundles which differ from it.
//! - `robots.<robot>` - the default role of each robot and the gait assigned to each role.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;
use std::collections::BTreeMap;

use super::{bundles::*, GaitConfigError};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Complete gait parameter file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GaitParams {
    #[serde(default)]
    pub bundles: BundleTables,

    #[serde(default)]
    pub gaits: BTreeMap<String, GaitDef>,

    #[serde(default)]
    pub robots: BTreeMap<String, RobotDef>,
}

/// Named bundles of every kind.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundleTables {
    pub stance: BTreeMap<String, BundleDef<StanceBundle>>,
    pub step: BTreeMap<String, BundleDef<StepBundle>>,
    pub zmp: BTreeMap<String, BundleDef<ZmpBundle>>,
    pub joint_hack: BTreeMap<String, BundleDef<JointHackBundle>>,
    pub sensor_feedback: BTreeMap<String, BundleDef<SensorFeedbackBundle>>,
    pub stiffness: BTreeMap<String, BundleDef<StiffnessBundle>>,
    pub odometry: BTreeMap<String, BundleDef<OdometryBundle>>,
    pub arm_swing: BTreeMap<String, BundleDef<ArmSwingBundle>>,
}

/// Definition of a single gait.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GaitDef {
    /// Disabled gaits are kept in the catalogue but may not be assigned to a robot.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Gait this one is derived from. Without a base every bundle must be given.
    pub base: Option<String>,

    pub stance: Option<String>,
    pub step: Option<String>,
    pub zmp: Option<String>,
    pub joint_hack: Option<String>,
    pub sensor_feedback: Option<String>,
    pub stiffness: Option<String>,
    pub odometry: Option<String>,
    pub arm_swing: Option<String>,
}

/// Gait assignments of one robot.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RobotDef {
    /// The role used when the default gait is requested.
    pub default_role: String,

    /// Map from role name to gait name.
    #[serde(default)]
    pub roles: BTreeMap<String, String>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A bundle as written in the parameter file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BundleDef<B> {
    /// Positional form, in the bundle's documented field order.
    Flat(Vec<f64>),

    /// Named field form.
    Named(B),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<B: Bundle> BundleDef<B> {
    /// Get the bundle, converting from the flat form if needed.
    pub fn to_bundle(&self, name: &str) -> Result<B, GaitConfigError> {
        match self {
            BundleDef::Flat(vals) => B::from_flat(name, vals),
            BundleDef::Named(b) => Ok(*b),
        }
    }
}

impl BundleTables {
    /// Convert every bundle in every table, whether or not a gait refers to it.
    pub fn check(&self) -> Result<(), GaitConfigError> {
        check_table(&self.stance)?;
        check_table(&self.step)?;
        check_table(&self.zmp)?;
        check_table(&self.joint_hack)?;
        check_table(&self.sensor_feedback)?;
        check_table(&self.stiffness)?;
        check_table(&self.odometry)?;
        check_table(&self.arm_swing)
    }
}

/// Find a bundle by name in one of the bundle tables.
pub(crate) fn find_bundle<B: Bundle>(
    table: &BTreeMap<String, BundleDef<B>>,
    gait: &str,
    name: &str,
) -> Result<B, GaitConfigError> {
    match table.get(name) {
        Some(def) => def.to_bundle(name),
        None => Err(GaitConfigError::UnknownBundle {
            gait: gait.to_string(),
            kind: B::KIND,
            name: name.to_string(),
        }),
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn check_table<B: Bundle>(
    table: &BTreeMap<String, BundleDef<B>>,
) -> Result<(), GaitConfigError> {
    for (name, def) in table.iter() {
        def.to_bundle(name)?;
    }

    Ok(())
}

fn default_enabled() -> bool {
    true
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

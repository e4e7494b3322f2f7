//! # Gait registry
//!
//! The registry maps each robot and role to a gait. It is built once at startup from the gait
//! parameters and is read only afterwards. Every configuration mistake is reported while building
//! the registry, so a registry that exists is always complete and consistent.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::{
    params::{find_bundle, GaitDef, GaitParams},
    GaitCommand, GaitConfigError, GaitOverrides, RobotId, Role,
};
use crate::gait::bundles::BundleKind;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Read only lookup of the gait to use for each robot and role.
#[derive(Debug, Clone)]
pub struct GaitRegistry {
    catalogue: BTreeMap<String, CatalogueEntry>,

    default_roles: HashMap<RobotId, Role>,

    assignments: HashMap<(RobotId, Role), String>,
}

/// A named gait in the catalogue.
#[derive(Debug, Clone)]
pub struct CatalogueEntry {
    pub name: String,

    /// Disabled gaits cannot be assigned to a robot.
    pub enabled: bool,

    pub gait: Arc<GaitCommand>,
}

/// The result of selecting a gait, recording how it was reached.
#[derive(Debug, Clone)]
pub struct SelectedGait {
    pub robot: RobotId,

    /// The role that was asked for, which may be [`Role::Default`].
    pub requested_role: Role,

    /// The concrete role the request resolved to, never [`Role::Default`].
    pub role: Role,

    /// Catalogue name of the gait.
    pub name: String,

    pub gait: Arc<GaitCommand>,
}

/// Working state while resolving the gaits of a parameter file.
struct GaitResolver<'p> {
    params: &'p GaitParams,
    resolved: HashMap<String, GaitCommand>,
    in_progress: Vec<String>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GaitRegistry {
    /// Load the gait parameters from the given params file and build the registry.
    pub fn load(param_file: &str) -> Result<Self, GaitConfigError> {
        let params: GaitParams =
            util::params::load(param_file).map_err(GaitConfigError::ParamLoadError)?;

        Self::from_params(&params)
    }

    /// Build the registry from already loaded parameters.
    pub fn from_params(params: &GaitParams) -> Result<Self, GaitConfigError> {
        params.bundles.check()?;

        // Resolve every gait, including ones no robot uses, so that mistakes in unused gaits are
        // still found.
        let mut resolver = GaitResolver {
            params,
            resolved: HashMap::new(),
            in_progress: Vec::new(),
        };

        let mut catalogue = BTreeMap::new();
        for (name, def) in params.gaits.iter() {
            let gait = resolver.resolve(name, "gaits")?;

            debug!(
                "Gait \"{}\" resolved ({})",
                name,
                if def.enabled { "enabled" } else { "disabled" }
            );

            catalogue.insert(
                name.clone(),
                CatalogueEntry {
                    name: name.clone(),
                    enabled: def.enabled,
                    gait: Arc::new(gait),
                },
            );
        }

        let mut default_roles = HashMap::new();
        let mut assignments = HashMap::new();

        for (robot_name, robot_def) in params.robots.iter() {
            let robot: RobotId = robot_name.parse()?;
            let default_role: Role = robot_def.default_role.parse()?;

            if default_role == Role::Default {
                return Err(GaitConfigError::DefaultRoleIsDefault(robot));
            }

            for (role_name, gait_name) in robot_def.roles.iter() {
                let role: Role = role_name.parse()?;

                if role == Role::Default {
                    return Err(GaitConfigError::ExplicitDefaultRole(robot));
                }

                let entry = match catalogue.get(gait_name) {
                    Some(e) => e,
                    None => {
                        return Err(GaitConfigError::UnknownGait {
                            referenced_by: format!("robots.{}.roles.{}", robot, role),
                            name: gait_name.clone(),
                        })
                    }
                };

                if !entry.enabled {
                    return Err(GaitConfigError::DisabledGaitAssigned {
                        robot,
                        role,
                        gait: gait_name.clone(),
                    });
                }

                assignments.insert((robot, role), gait_name.clone());
            }

            if !assignments.contains_key(&(robot, default_role)) {
                return Err(GaitConfigError::DefaultRoleUnassigned {
                    robot,
                    role: default_role,
                });
            }

            default_roles.insert(robot, default_role);
        }

        info!(
            "Gait registry built with {} gaits for {} robots",
            catalogue.len(),
            default_roles.len()
        );

        Ok(Self {
            catalogue,
            default_roles,
            assignments,
        })
    }

    /// Get the gait for the given robot and role.
    ///
    /// [`Role::Default`] is resolved through [`GaitRegistry::resolve_default_gait`]. A pair with no
    /// assigned gait is an error, there is no fallback to another role.
    pub fn select_gait(
        &self,
        robot: RobotId,
        role: Role,
    ) -> Result<Arc<GaitCommand>, GaitConfigError> {
        self.select(robot, role).map(|s| s.gait)
    }

    /// Get the gait for the given robot and role, along with its name and resolved role.
    pub fn select(&self, robot: RobotId, role: Role) -> Result<SelectedGait, GaitConfigError> {
        let resolved_role = match role {
            Role::Default => self.resolve_default_gait(robot)?,
            r => r,
        };

        let entry = self
            .assignments
            .get(&(robot, resolved_role))
            .and_then(|name| self.catalogue.get(name))
            .ok_or(GaitConfigError::MissingRole {
                robot,
                role: resolved_role,
            })?;

        Ok(SelectedGait {
            robot,
            requested_role: role,
            role: resolved_role,
            name: entry.name.clone(),
            gait: entry.gait.clone(),
        })
    }

    /// Get the role the given robot uses as its default.
    pub fn resolve_default_gait(&self, robot: RobotId) -> Result<Role, GaitConfigError> {
        self.default_roles
            .get(&robot)
            .copied()
            .ok_or(GaitConfigError::MissingRole {
                robot,
                role: Role::Default,
            })
    }

    /// Check that every one of the given roles has a gait for the robot.
    pub fn require_roles(&self, robot: RobotId, roles: &[Role]) -> Result<(), GaitConfigError> {
        for role in roles {
            self.select(robot, *role)?;
        }

        Ok(())
    }

    /// Get a gait from the catalogue by name, whether or not it is enabled.
    pub fn catalogue_entry(&self, name: &str) -> Option<&CatalogueEntry> {
        self.catalogue.get(name)
    }

    /// Iterate over every gait in the catalogue, in name order.
    pub fn catalogue(&self) -> impl Iterator<Item = &CatalogueEntry> {
        self.catalogue.values()
    }

    /// Get all robots with gait assignments.
    pub fn robots(&self) -> Vec<RobotId> {
        let mut robots: Vec<RobotId> = self.default_roles.keys().copied().collect();
        robots.sort();
        robots
    }
}

impl<'p> GaitResolver<'p> {
    /// Resolve the named gait, resolving its base first if it has one.
    fn resolve(&mut self, name: &str, referenced_by: &str) -> Result<GaitCommand, GaitConfigError> {
        if let Some(g) = self.resolved.get(name) {
            return Ok(*g);
        }

        let def = match self.params.gaits.get(name) {
            Some(d) => d,
            None => {
                return Err(GaitConfigError::UnknownGait {
                    referenced_by: referenced_by.to_string(),
                    name: name.to_string(),
                })
            }
        };

        if self.in_progress.iter().any(|n| n == name) {
            return Err(GaitConfigError::BaseCycle(name.to_string()));
        }
        self.in_progress.push(name.to_string());

        let overrides = self.overrides(name, def)?;

        let gait = match def.base {
            Some(ref base) => {
                if overrides.is_empty() {
                    debug!("Gait \"{}\" is an alias of \"{}\"", name, base);
                }
                self.resolve(base, name)?.derive_variant(&overrides)
            }
            None => assemble_complete(name, &overrides)?,
        };

        self.in_progress.pop();
        self.resolved.insert(name.to_string(), gait);

        Ok(gait)
    }

    /// Look up every bundle the gait names.
    fn overrides(&self, name: &str, def: &GaitDef) -> Result<GaitOverrides, GaitConfigError> {
        let tables = &self.params.bundles;
        let mut o = GaitOverrides::new();

        if let Some(ref b) = def.stance {
            o = o.stance(find_bundle(&tables.stance, name, b)?);
        }
        if let Some(ref b) = def.step {
            o = o.step(find_bundle(&tables.step, name, b)?);
        }
        if let Some(ref b) = def.zmp {
            o = o.zmp(find_bundle(&tables.zmp, name, b)?);
        }
        if let Some(ref b) = def.joint_hack {
            o = o.joint_hack(find_bundle(&tables.joint_hack, name, b)?);
        }
        if let Some(ref b) = def.sensor_feedback {
            o = o.sensor_feedback(find_bundle(&tables.sensor_feedback, name, b)?);
        }
        if let Some(ref b) = def.stiffness {
            o = o.stiffness(find_bundle(&tables.stiffness, name, b)?);
        }
        if let Some(ref b) = def.odometry {
            o = o.odometry(find_bundle(&tables.odometry, name, b)?);
        }
        if let Some(ref b) = def.arm_swing {
            o = o.arm_swing(find_bundle(&tables.arm_swing, name, b)?);
        }

        Ok(o)
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Assemble a gait which has no base, requiring every bundle to be present.
fn assemble_complete(name: &str, o: &GaitOverrides) -> Result<GaitCommand, GaitConfigError> {
    let missing = |kind| GaitConfigError::IncompleteGait {
        gait: name.to_string(),
        kind,
    };

    Ok(GaitCommand::assemble(
        o.stance.ok_or_else(|| missing(BundleKind::Stance))?,
        o.step.ok_or_else(|| missing(BundleKind::Step))?,
        o.zmp.ok_or_else(|| missing(BundleKind::Zmp))?,
        o.joint_hack.ok_or_else(|| missing(BundleKind::JointHack))?,
        o.sensor_feedback
            .ok_or_else(|| missing(BundleKind::SensorFeedback))?,
        o.stiffness.ok_or_else(|| missing(BundleKind::Stiffness))?,
        o.odometry.ok_or_else(|| missing(BundleKind::Odometry))?,
        o.arm_swing.ok_or_else(|| missing(BundleKind::ArmSwing))?,
    ))
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::gait::{bundles::*, params::BundleDef, ALL_ROLES};

    const GAITS_TOML: &str = include_str!("../../../params/gaits.toml");

    /// A minimal parameter file with one complete gait, to be extended by each test.
    const MINIMAL_TOML: &str = r#"
        [bundles.stance]
        standard = [31.0, 1.45, 10.0, 3.0, 0.0, 0.1]
        [bundles.step]
        standard = [0.4, 0.25, 0.9, 0.0, 7.0, -7.0, 3.5, 20.0, 7.0, 7.0, 20.0, 1.0]
        stationary = [0.4, 0.25, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        [bundles.zmp]
        standard = [0.0, 0.4, 0.4, 0.4, 0.01, 6.6]
        [bundles.joint_hack]
        standard = [5.5, 5.5]
        [bundles.sensor_feedback]
        legacy = [0.0, 0.5, 0.5, 0.0, 0.0, 15.0, 15.0, 75.0]
        [bundles.stiffness]
        standard = [0.85, 0.3, 0.4, 0.3, 0.1, 0.1]
        [bundles.odometry]
        unit = [1.0, 1.0, 1.0]
        [bundles.arm_swing]
        still = [0.0]

        [gaits.standard]
        stance = "standard"
        step = "standard"
        zmp = "standard"
        joint_hack = "standard"
        sensor_feedback = "legacy"
        stiffness = "standard"
        odometry = "unit"
        arm_swing = "still"
    "#;

    fn build(extra: &str) -> Result<GaitRegistry, GaitConfigError> {
        let params: GaitParams = util::params::from_str(&format!("{}\n{}", MINIMAL_TOML, extra))
            .map_err(GaitConfigError::ParamLoadError)?;
        GaitRegistry::from_params(&params)
    }

    fn robot_gait(registry: &GaitRegistry, robot: RobotId, role: Role) -> String {
        registry.select(robot, role).unwrap().name
    }

    #[test]
    fn test_shipped_gaits() {
        let params: GaitParams = util::params::from_str(GAITS_TOML).unwrap();
        let registry = GaitRegistry::from_params(&params).unwrap();

        assert_eq!(
            registry.robots(),
            vec![
                RobotId::Trillian,
                RobotId::Zaphod,
                RobotId::Slarti,
                RobotId::Marvin,
                RobotId::Webots
            ]
        );

        // Every robot has a gait for every role
        for robot in registry.robots() {
            registry.require_roles(robot, &ALL_ROLES).unwrap();
        }

        for robot in [RobotId::Trillian, RobotId::Zaphod, RobotId::Slarti].iter() {
            assert_eq!(registry.resolve_default_gait(*robot).unwrap(), Role::Medium);
            assert_eq!(robot_gait(&registry, *robot, Role::Default), "medium");
            assert_eq!(robot_gait(&registry, *robot, Role::Dribble), "duck");
            assert_eq!(robot_gait(&registry, *robot, Role::Slow), "new");
            assert_eq!(robot_gait(&registry, *robot, Role::Fast), "fast");
        }

        // Marvin walks with the same gaits as the others
        assert_eq!(robot_gait(&registry, RobotId::Marvin, Role::Default), "medium");
        assert_eq!(robot_gait(&registry, RobotId::Marvin, Role::Slow), "new");
        assert_eq!(robot_gait(&registry, RobotId::Marvin, Role::Dribble), "duck");
        let marvin = registry.select_gait(RobotId::Marvin, Role::Default).unwrap();
        assert_eq!(marvin.stance().body_pitch_deg, 5.0);
        assert_eq!(robot_gait(&registry, RobotId::Webots, Role::Default), "webots");

        // Several robots share a single gait instance
        let trillian = registry.select_gait(RobotId::Trillian, Role::Medium).unwrap();
        let zaphod = registry.select_gait(RobotId::Zaphod, Role::Default).unwrap();
        assert!(Arc::ptr_eq(&trillian, &zaphod));

        // The default medium gait values
        assert_eq!(
            trillian.stance(),
            &StanceBundle::new(31.0, 1.45, 10.0, 5.0, 0.0, 0.1)
        );
        assert_eq!(trillian.step().max_x_speed, 10.0);
        assert_eq!(trillian.step().min_x_speed, -5.0);
        assert_eq!(
            trillian.sensor_feedback(),
            &SensorFeedbackBundle::spring(0.08, 0.08, 100.0, 100.0, 7.0, 7.0, 45.0)
        );
        assert_eq!(trillian.arm_swing(), &ArmSwingBundle::new(0.0));

        let fast = registry.select_gait(RobotId::Slarti, Role::Fast).unwrap();
        assert_eq!(fast.arm_swing(), &ArmSwingBundle::new(10.0));
        assert_eq!(fast.joint_hack(), &JointHackBundle::new(6.5, 6.5));

        // The slow gait uses the Marvin stance and legacy sensor feedback
        let slow = registry.select_gait(RobotId::Trillian, Role::Slow).unwrap();
        assert_eq!(slow.stance().body_pitch_deg, 6.0);
        assert_eq!(
            slow.sensor_feedback(),
            &SensorFeedbackBundle::legacy(0.5, 0.3, 7.0, 3.0, 45.0)
        );

        // The stationary webots gait differs from the base only in its step
        let webots = registry.catalogue_entry("webots").unwrap();
        let stationary = registry.catalogue_entry("webots_stationary").unwrap();
        assert!(webots.gait.is_walking());
        assert!(!stationary.gait.is_walking());
        assert_eq!(webots.gait.zmp(), stationary.gait.zmp());
        assert_eq!(webots.gait.stance(), stationary.gait.stance());

        // The Marvin tunings are catalogued but not assigned
        for name in ["marvin_medium", "marvin_new"].iter() {
            let entry = registry.catalogue_entry(name).unwrap();
            assert!(entry.enabled);
            assert_eq!(entry.gait.stance().body_pitch_deg, 6.0);
            for robot in registry.robots() {
                for role in ALL_ROLES.iter() {
                    assert_ne!(robot_gait(&registry, robot, *role), *name);
                }
            }
        }

        // The centre of mass gait is kept but never assigned
        let com = registry.catalogue_entry("com").unwrap();
        assert!(!com.enabled);
        for robot in registry.robots() {
            for role in ALL_ROLES.iter() {
                assert_ne!(robot_gait(&registry, robot, *role), "com");
            }
        }
    }

    #[test]
    fn test_default_role_rules() {
        let registry = build(
            r#"
            [robots.zaphod]
            default_role = "slow"
            [robots.zaphod.roles]
            slow = "standard"
            "#,
        )
        .unwrap();

        let sel = registry.select(RobotId::Zaphod, Role::Default).unwrap();
        assert_eq!(sel.requested_role, Role::Default);
        assert_eq!(sel.role, Role::Slow);
        assert_eq!(sel.name, "standard");

        // Unassigned pairs and unconfigured robots are errors
        assert!(matches!(
            registry.select_gait(RobotId::Zaphod, Role::Fast),
            Err(GaitConfigError::MissingRole {
                robot: RobotId::Zaphod,
                role: Role::Fast
            })
        ));
        assert!(matches!(
            registry.select_gait(RobotId::Marvin, Role::Default),
            Err(GaitConfigError::MissingRole {
                robot: RobotId::Marvin,
                role: Role::Default
            })
        ));
        assert!(registry
            .require_roles(RobotId::Zaphod, &[Role::Default, Role::Slow])
            .is_ok());
        assert!(registry.require_roles(RobotId::Zaphod, &ALL_ROLES).is_err());

        assert!(matches!(
            build(
                r#"
                [robots.zaphod]
                default_role = "default"
                [robots.zaphod.roles]
                slow = "standard"
                "#
            ),
            Err(GaitConfigError::DefaultRoleIsDefault(RobotId::Zaphod))
        ));

        assert!(matches!(
            build(
                r#"
                [robots.zaphod]
                default_role = "fast"
                [robots.zaphod.roles]
                slow = "standard"
                "#
            ),
            Err(GaitConfigError::DefaultRoleUnassigned {
                robot: RobotId::Zaphod,
                role: Role::Fast
            })
        ));

        assert!(matches!(
            build(
                r#"
                [robots.zaphod]
                default_role = "slow"
                [robots.zaphod.roles]
                default = "standard"
                slow = "standard"
                "#
            ),
            Err(GaitConfigError::ExplicitDefaultRole(RobotId::Zaphod))
        ));

        assert!(matches!(
            build(
                r#"
                [robots.ford]
                default_role = "slow"
                "#
            ),
            Err(GaitConfigError::UnknownRobot(_))
        ));
    }

    #[test]
    fn test_gait_reference_errors() {
        assert!(matches!(
            build(
                r#"
                [gaits.broken]
                base = "standard"
                zmp = "wobbly"
                "#
            ),
            Err(GaitConfigError::UnknownBundle {
                kind: BundleKind::Zmp,
                ..
            })
        ));

        assert!(matches!(
            build(
                r#"
                [gaits.orphan]
                base = "missing"
                "#
            ),
            Err(GaitConfigError::UnknownGait { .. })
        ));

        assert!(matches!(
            build(
                r#"
                [gaits.a]
                base = "b"
                [gaits.b]
                base = "a"
                "#
            ),
            Err(GaitConfigError::BaseCycle(_))
        ));

        assert!(matches!(
            build(
                r#"
                [gaits.half]
                stance = "standard"
                step = "standard"
                "#
            ),
            Err(GaitConfigError::IncompleteGait {
                kind: BundleKind::Zmp,
                ..
            })
        ));

        assert!(matches!(
            build(
                r#"
                [robots.trillian]
                default_role = "medium"
                [robots.trillian.roles]
                medium = "nonexistent"
                "#
            ),
            Err(GaitConfigError::UnknownGait { .. })
        ));
    }

    #[test]
    fn test_disabled_gaits() {
        // A disabled gait is still resolved and catalogued
        let registry = build(
            r#"
            [gaits.parked]
            enabled = false
            base = "standard"
            step = "stationary"
            "#,
        )
        .unwrap();

        let parked = registry.catalogue_entry("parked").unwrap();
        assert!(!parked.enabled);
        assert!(!parked.gait.is_walking());
        assert_eq!(registry.catalogue().count(), 2);

        assert!(matches!(
            build(
                r#"
                [gaits.parked]
                enabled = false
                base = "standard"

                [robots.slarti]
                default_role = "medium"
                [robots.slarti.roles]
                medium = "parked"
                "#
            ),
            Err(GaitConfigError::DisabledGaitAssigned {
                robot: RobotId::Slarti,
                role: Role::Medium,
                ..
            })
        ));
    }

    #[test]
    fn test_unused_bundles_checked() {
        let params: GaitParams = util::params::from_str(MINIMAL_TOML).unwrap();
        assert!(GaitRegistry::from_params(&params).is_ok());

        // A step array with a duplicated field, which no gait uses
        let mut bad_step = params.clone();
        bad_step.bundles.step.insert(
            String::from("thirteen"),
            BundleDef::Flat(vec![
                0.4, 0.25, 0.9, 0.0, 7.0, -7.0, 3.5, 20.0, 7.0, 7.0, 20.0, 20.0, 1.0,
            ]),
        );
        assert!(matches!(
            GaitRegistry::from_params(&bad_step),
            Err(GaitConfigError::BundleArity {
                kind: BundleKind::Step,
                expected: 12,
                found: 13,
                ..
            })
        ));

        let mut bad_sensor = params;
        bad_sensor.bundles.sensor_feedback.insert(
            String::from("halfway"),
            BundleDef::Flat(vec![0.5, 0.5, 0.5, 0.0, 0.0, 15.0, 15.0, 75.0]),
        );
        assert!(matches!(
            GaitRegistry::from_params(&bad_sensor),
            Err(GaitConfigError::SensorSelector { .. })
        ));
    }
}

//! # Gait library.
//!
//! This library allows other crates in the workspace (and the benchmarks) to access items defined
//! inside the gait executable crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Gait configuration - parameter bundles, gait assembly and the per-robot gait registry
pub mod gait;

/// Executable parameters
pub mod params;

/// Dry-run motion engine - stands in for the walking engine when no robot is attached
pub mod sim_engine;

/// Walk test driver - replays a trajectory script against the motion engine
pub mod walk_test;

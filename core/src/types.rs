//! Shared primitive types used across the entire simulation.

/// A simulation step. One step = one simulated hour.
pub type Step = u64;

/// A stable, unique identifier for any actor in the simulation.
pub type ActorId = String;

/// The canonical run identifier.
pub type RunId = String;

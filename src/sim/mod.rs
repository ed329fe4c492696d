//! Simulation engines: occupancy chain, appliance duty cycles, lighting.

/// Appliance duty-cycle automaton and engine.
pub mod appliance;
/// Per-bulb lighting decision process.
pub mod lighting;
/// Active-occupancy Markov chain.
pub mod occupancy;
pub mod pdf;
pub mod random;
pub mod types;

// Re-export the main types for convenience
pub use appliance::{Appliance, ApplianceEngine};
pub use lighting::{Bulb, LightingEngine};
pub use occupancy::{DayOccupancy, simulate_occupancy};
pub use pdf::DiscretePdf;
pub use types::DayType;

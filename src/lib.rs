//! Synthetic one-day electricity demand profiles for a single household.
//!
//! Three coupled stochastic sub-models compose the profile: an
//! active-occupancy Markov chain at ten-minute resolution, a per-appliance
//! duty-cycle automaton, and a per-bulb lighting decision process, all at
//! one-minute output resolution over a single day.

pub mod config;
pub mod error;
pub mod io;
pub mod runner;
/// Occupancy, appliance, and lighting engines plus sampling primitives.
pub mod sim;
/// In-memory input tables and their CSV loaders.
pub mod tables;

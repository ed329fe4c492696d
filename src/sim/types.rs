//! Core simulation types and day-geometry constants.

use std::fmt;

use serde::Deserialize;

/// Minutes in one simulated day. Every entity's consumption series has
/// exactly this many entries.
pub const MINUTES_PER_DAY: usize = 1440;

/// Ten-minute periods in one simulated day, the occupancy model's native
/// resolution.
pub const PERIODS_PER_DAY: usize = 144;

/// Minutes in one occupancy period.
pub const PERIOD_MINUTES: usize = 10;

/// States in the occupancy Markov chain (0 through 6 active occupants).
pub const CHAIN_STATES: usize = 7;

/// Largest household size the input tables are defined for.
pub const MAX_RESIDENTS: u8 = 5;

/// Day category being simulated. Occupancy and activity statistics differ
/// between working days and weekends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    /// Short label used in table file names and export output.
    pub fn label(self) -> &'static str {
        match self {
            DayType::Weekday => "weekday",
            DayType::Weekend => "weekend",
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

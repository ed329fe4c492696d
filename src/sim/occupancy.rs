//! Active-occupancy Markov chain.
//!
//! Produces the number of active (at home and awake) occupants for each
//! ten-minute period of one day. The chain has seven states (0..6) driven by
//! externally supplied transition matrices; output values are clamped to the
//! household size. Both downstream engines read the result without mutating
//! it.

use rand::Rng;

use crate::error::Result;
use crate::sim::pdf::DiscretePdf;
use crate::sim::types::{DayType, MAX_RESIDENTS, PERIOD_MINUTES, PERIODS_PER_DAY};
use crate::tables::OccupancyTables;

/// One day of active-occupant counts at ten-minute resolution.
///
/// Index 0 covers minutes 0-9, index 143 covers minutes 1430-1439.
#[derive(Debug, Clone)]
pub struct DayOccupancy {
    states: Vec<u8>,
}

impl DayOccupancy {
    /// Active-occupant count for a ten-minute period.
    pub fn state(&self, period: usize) -> u8 {
        self.states[period]
    }

    /// Active-occupant count covering a minute of the day.
    pub fn at_minute(&self, minute: usize) -> u8 {
        self.states[minute / PERIOD_MINUTES]
    }

    pub fn states(&self) -> &[u8] {
        &self.states
    }

    #[cfg(test)]
    pub(crate) fn fixed(state: u8) -> Self {
        Self {
            states: vec![state; PERIODS_PER_DAY],
        }
    }

    #[cfg(test)]
    pub(crate) fn from_states(states: Vec<u8>) -> Self {
        assert_eq!(states.len(), PERIODS_PER_DAY);
        Self { states }
    }
}

/// Simulates one day of active occupancy for a household.
///
/// The period-0 state is drawn from the (household size, day type)
/// start-state distribution; each later period draws from the transition row
/// keyed by the previous period and the current state. Remaining in the same
/// state is just one of the sampled outcomes.
///
/// # Errors
///
/// Fails if the tables lack the requested (household size, day type) entries
/// or a probability row sums to zero.
pub fn simulate_occupancy(
    tables: &OccupancyTables,
    residents: u8,
    day_type: DayType,
    rng: &mut impl Rng,
) -> Result<DayOccupancy> {
    let residents = residents.clamp(1, MAX_RESIDENTS);

    let start = DiscretePdf::new(&tables.start_weights(residents, day_type)?)?;
    let mut state = (start.sample(rng) as u8).min(residents);

    let mut states = Vec::with_capacity(PERIODS_PER_DAY);
    states.push(state);

    for period in 1..PERIODS_PER_DAY {
        let row = tables.transition_row(residents, day_type, period - 1, state)?;
        let pdf = DiscretePdf::new(row)?;
        state = (pdf.sample(rng) as u8).min(residents);
        states.push(state);
    }

    Ok(DayOccupancy { states })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::tables::Dataset;

    #[test]
    fn sequence_has_one_state_per_period() {
        let data = Dataset::demo();
        let mut rng = StdRng::seed_from_u64(1);
        let occ = simulate_occupancy(&data.occupancy, 3, DayType::Weekday, &mut rng).unwrap();
        assert_eq!(occ.states().len(), PERIODS_PER_DAY);
    }

    #[test]
    fn states_never_exceed_household_size() {
        let data = Dataset::demo();
        for residents in 1..=MAX_RESIDENTS {
            let mut rng = StdRng::seed_from_u64(u64::from(residents));
            let occ =
                simulate_occupancy(&data.occupancy, residents, DayType::Weekend, &mut rng)
                    .unwrap();
            assert!(occ.states().iter().all(|s| *s <= residents));
        }
    }

    #[test]
    fn same_seed_reproduces_the_sequence() {
        let data = Dataset::demo();
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        let occ_a = simulate_occupancy(&data.occupancy, 2, DayType::Weekday, &mut a).unwrap();
        let occ_b = simulate_occupancy(&data.occupancy, 2, DayType::Weekday, &mut b).unwrap();
        assert_eq!(occ_a.states(), occ_b.states());
    }

    #[test]
    fn minute_lookup_maps_to_its_period() {
        let data = Dataset::demo();
        let mut rng = StdRng::seed_from_u64(8);
        let occ = simulate_occupancy(&data.occupancy, 4, DayType::Weekday, &mut rng).unwrap();
        assert_eq!(occ.at_minute(0), occ.state(0));
        assert_eq!(occ.at_minute(9), occ.state(0));
        assert_eq!(occ.at_minute(10), occ.state(1));
        assert_eq!(occ.at_minute(1439), occ.state(143));
    }

    #[test]
    fn oversized_household_clamps_to_table_ceiling() {
        let data = Dataset::demo();
        let mut rng = StdRng::seed_from_u64(3);
        let occ = simulate_occupancy(&data.occupancy, 9, DayType::Weekday, &mut rng).unwrap();
        assert!(occ.states().iter().all(|s| *s <= MAX_RESIDENTS));
    }
}

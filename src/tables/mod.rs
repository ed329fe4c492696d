//! In-memory input tables consumed by the simulation engines.
//!
//! The core never reads files itself; it consumes these already-parsed
//! structures. [`load`] provides CSV loaders for the documented layouts and
//! [`Dataset::demo`] builds a small structurally complete dataset so the
//! binary and the integration tests can run without external data.

pub mod load;

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::sim::types::{
    CHAIN_STATES, DayType, MAX_RESIDENTS, MINUTES_PER_DAY, PERIODS_PER_DAY,
};

/// Transition rows cover periods 0..143 (the move into period p is keyed by
/// p - 1), one row per (period, current state).
pub const TRANSITION_ROWS: usize = (PERIODS_PER_DAY - 1) * CHAIN_STATES;

/// Start-state distributions and transition matrices for the occupancy chain.
#[derive(Debug, Clone, Default)]
pub struct OccupancyTables {
    /// `start[day_type][state][residents - 1]` weight of beginning the day in
    /// `state`.
    start: HashMap<DayType, Vec<Vec<f64>>>,
    transitions: HashMap<(u8, DayType), TransitionTable>,
}

impl OccupancyTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the start-state matrix for one day type: one row per chain
    /// state, one column per household size 1..=5.
    pub fn set_start_states(&mut self, day_type: DayType, rows: Vec<Vec<f64>>) -> Result<()> {
        if rows.len() != CHAIN_STATES {
            return Err(Error::Table(format!(
                "start-state table for {day_type} has {} rows, expected {CHAIN_STATES}",
                rows.len()
            )));
        }
        for (state, row) in rows.iter().enumerate() {
            if row.len() != MAX_RESIDENTS as usize {
                return Err(Error::Table(format!(
                    "start-state row for state {state} has {} columns, expected {MAX_RESIDENTS}",
                    row.len()
                )));
            }
        }
        self.start.insert(day_type, rows);
        Ok(())
    }

    /// Installs the transition matrix for one (household size, day type)
    /// pair.
    pub fn set_transitions(
        &mut self,
        residents: u8,
        day_type: DayType,
        table: TransitionTable,
    ) -> Result<()> {
        if !(1..=MAX_RESIDENTS).contains(&residents) {
            return Err(Error::Table(format!(
                "transition matrix registered for unsupported household size {residents}"
            )));
        }
        self.transitions.insert((residents, day_type), table);
        Ok(())
    }

    /// Start-state weight column for a household size, one weight per chain
    /// state.
    pub fn start_weights(&self, residents: u8, day_type: DayType) -> Result<Vec<f64>> {
        let rows = self.start.get(&day_type).ok_or_else(|| {
            Error::Table(format!("no start-state table loaded for {day_type}"))
        })?;
        let col = usize::from(residents.clamp(1, MAX_RESIDENTS)) - 1;
        Ok(rows.iter().map(|row| row[col]).collect())
    }

    /// Next-state probability row for (current state, period).
    pub fn transition_row(
        &self,
        residents: u8,
        day_type: DayType,
        period: usize,
        state: u8,
    ) -> Result<&[f64]> {
        let table = self.transitions.get(&(residents, day_type)).ok_or_else(|| {
            Error::Table(format!(
                "no transition matrix loaded for {residents} residents on a {day_type}"
            ))
        })?;
        Ok(table.row(period, state))
    }
}

/// One (household size, day type) transition matrix: rows indexed by
/// `period * 7 + current_state`, each a probability vector over next states.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    rows: Vec<Vec<f64>>,
}

impl TransitionTable {
    /// # Errors
    ///
    /// Rejects matrices that do not cover every (period, state) pair.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        if rows.len() != TRANSITION_ROWS {
            return Err(Error::Table(format!(
                "transition matrix has {} rows, expected {TRANSITION_ROWS}",
                rows.len()
            )));
        }
        for (i, row) in rows.iter().enumerate() {
            if row.is_empty() || row.len() > CHAIN_STATES {
                return Err(Error::Table(format!(
                    "transition row {i} has {} entries, expected 1..={CHAIN_STATES}",
                    row.len()
                )));
            }
        }
        Ok(Self { rows })
    }

    /// Probability vector for leaving `state` at `period` (zero-padded to at
    /// most 7 entries by the provider).
    pub fn row(&self, period: usize, state: u8) -> &[f64] {
        &self.rows[period * CHAIN_STATES + usize::from(state)]
    }
}

/// Composite key for activity-probability lookups, built once at load time so
/// lookups are a single hash probe instead of a linear scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActivityKey {
    pub day_type: DayType,
    pub occupants: u8,
    pub profile: String,
}

/// Population-level probability that at least one occupant is engaged in the
/// activity behind an appliance profile, per ten-minute period.
#[derive(Debug, Clone, Default)]
pub struct ActivityTable {
    entries: HashMap<ActivityKey, Vec<f64>>,
}

impl ActivityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Rejects sequences that are not exactly 144 probabilities in [0, 1].
    pub fn insert(
        &mut self,
        day_type: DayType,
        occupants: u8,
        profile: &str,
        probabilities: Vec<f64>,
    ) -> Result<()> {
        if probabilities.len() != PERIODS_PER_DAY {
            return Err(Error::Table(format!(
                "activity entry ({day_type}, {occupants}, {profile}) has {} probabilities, \
                 expected {PERIODS_PER_DAY}",
                probabilities.len()
            )));
        }
        if probabilities.iter().any(|p| !(0.0..=1.0).contains(p)) {
            return Err(Error::Table(format!(
                "activity entry ({day_type}, {occupants}, {profile}) has a probability \
                 outside [0, 1]"
            )));
        }
        let key = ActivityKey {
            day_type,
            occupants,
            profile: profile.to_uppercase(),
        };
        self.entries.insert(key, probabilities);
        Ok(())
    }

    /// Activity probability for a period. Occupant counts above the table's
    /// five-resident ceiling clamp to five.
    ///
    /// # Errors
    ///
    /// A missing entry is a configuration-data error and is surfaced as
    /// [`Error::ActivityLookup`], never defaulted.
    pub fn probability(
        &self,
        day_type: DayType,
        occupants: u8,
        profile: &str,
        period: usize,
    ) -> Result<f64> {
        let key = ActivityKey {
            day_type,
            occupants: occupants.min(MAX_RESIDENTS),
            profile: profile.to_uppercase(),
        };
        match self.entries.get(&key) {
            Some(probabilities) => Ok(probabilities[period]),
            None => Err(Error::ActivityLookup {
                day_type,
                occupants: key.occupants,
                profile: key.profile,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Static catalog row for one appliance.
#[derive(Debug, Clone)]
pub struct ApplianceSpec {
    pub name: String,
    /// Profile identifier deciding start-condition and cycle-length policy.
    pub profile: String,
    /// Probability the household owns this appliance.
    pub ownership: f64,
    pub standby_w: f64,
    pub mean_power_w: f64,
    pub cycles_per_year: f64,
    /// Nominal duty-cycle length in minutes.
    pub cycle_minutes: u32,
    /// Minimum off-time after a completed cycle, in minutes.
    pub restart_delay: u32,
    /// Scalar tuning start-event frequency against empirical statistics.
    pub calibration: f64,
}

/// Bulb configurations for sampled households; one row per sample household,
/// each a list of bulb power ratings in Watts.
#[derive(Debug, Clone)]
pub struct BulbCatalog {
    households: Vec<Vec<f64>>,
}

impl BulbCatalog {
    /// # Errors
    ///
    /// Rejects an empty catalog or a household with no bulbs.
    pub fn new(households: Vec<Vec<f64>>) -> Result<Self> {
        if households.is_empty() {
            return Err(Error::Table("bulb catalog has no sample households".into()));
        }
        if households.iter().any(Vec::is_empty) {
            return Err(Error::Table(
                "bulb catalog contains a household with zero bulbs".into(),
            ));
        }
        Ok(Self { households })
    }

    pub fn household_count(&self) -> usize {
        self.households.len()
    }

    /// Bulb ratings of one sample household.
    pub fn household(&self, index: usize) -> &[f64] {
        &self.households[index]
    }
}

/// Global irradiance in W/m² per minute of day and month of year.
#[derive(Debug, Clone)]
pub struct IrradianceTable {
    /// `minutes[minute][month - 1]`
    minutes: Vec<[f64; 12]>,
}

impl IrradianceTable {
    /// # Errors
    ///
    /// Rejects series that do not cover all 1440 minutes.
    pub fn new(minutes: Vec<[f64; 12]>) -> Result<Self> {
        if minutes.len() != MINUTES_PER_DAY {
            return Err(Error::Table(format!(
                "irradiance table has {} rows, expected {MINUTES_PER_DAY}",
                minutes.len()
            )));
        }
        Ok(Self { minutes })
    }

    pub fn at(&self, minute: usize, month: u32) -> f64 {
        self.minutes[minute][(month as usize).clamp(1, 12) - 1]
    }
}

/// Everything the engines need, fully materialized before simulation begins.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub occupancy: OccupancyTables,
    pub activities: ActivityTable,
    pub appliances: Vec<ApplianceSpec>,
    pub bulbs: BulbCatalog,
    pub irradiance: IrradianceTable,
}

impl Dataset {
    /// Builds the built-in demo dataset: small synthetic tables that are
    /// structurally identical to a full data pack. Backs the default run and
    /// the integration tests.
    pub fn demo() -> Self {
        let mut occupancy = OccupancyTables::new();
        let mut activities = ActivityTable::new();

        for day_type in [DayType::Weekday, DayType::Weekend] {
            occupancy
                .set_start_states(day_type, demo_start_states(day_type))
                .expect("demo start states are well-formed");
            for residents in 1..=MAX_RESIDENTS {
                occupancy
                    .set_transitions(residents, day_type, demo_transitions(residents, day_type))
                    .expect("demo transition matrix is well-formed");
            }
            for occupants in 0..=MAX_RESIDENTS {
                for profile in ["TV", "ACT_COOKING", "ACT_LAUNDRY"] {
                    activities
                        .insert(day_type, occupants, profile, demo_activity(profile, occupants))
                        .expect("demo activity entry is well-formed");
                }
            }
        }

        Self {
            occupancy,
            activities,
            appliances: demo_appliances(),
            bulbs: BulbCatalog::new(vec![
                vec![60.0, 60.0, 40.0, 40.0, 25.0],
                vec![100.0, 60.0, 60.0, 40.0, 40.0, 25.0, 11.0],
                vec![60.0, 40.0, 11.0],
            ])
            .expect("demo bulb catalog is well-formed"),
            irradiance: demo_irradiance(),
        }
    }
}

/// Start-state weights loosely shaped on survey data: most households start
/// the day (midnight) with everyone asleep.
fn demo_start_states(day_type: DayType) -> Vec<Vec<f64>> {
    let awake_bias = match day_type {
        DayType::Weekday => 0.10,
        DayType::Weekend => 0.18,
    };
    (0..CHAIN_STATES)
        .map(|state| {
            (1..=MAX_RESIDENTS)
                .map(|residents| {
                    if state == 0 {
                        1.0 - awake_bias
                    } else if state as u8 <= residents {
                        awake_bias / f64::from(residents)
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect()
}

/// Sticky transition rows with a day-shaped pull: occupants gravitate to
/// zero active at night and toward the household size during waking hours.
fn demo_transitions(residents: u8, day_type: DayType) -> TransitionTable {
    let wake_shift = match day_type {
        DayType::Weekday => 0,
        DayType::Weekend => 6, // later mornings
    };
    let mut rows = Vec::with_capacity(TRANSITION_ROWS);
    for period in 0..PERIODS_PER_DAY - 1 {
        let night = period < 36 + wake_shift || period >= 138;
        for state in 0..CHAIN_STATES as u8 {
            let row: Vec<f64> = (0..CHAIN_STATES as u8)
                .map(|next| {
                    if next > residents {
                        return 0.0;
                    }
                    // Strong self-loop, mild pull toward the attractor.
                    let attractor = if night { 0 } else { residents };
                    let stay = if next == state { 6.0 } else { 0.0 };
                    let pull = 2.0 / (1.0 + f64::from(next.abs_diff(attractor)));
                    stay + pull
                })
                .collect();
            rows.push(row);
        }
    }
    TransitionTable::new(rows).expect("demo transition rows are well-formed")
}

/// Flat activity probability with an evening bump for television and a
/// daytime bump for cooking and laundry.
fn demo_activity(profile: &str, occupants: u8) -> Vec<f64> {
    let scale = if occupants == 0 { 0.0 } else { 1.0 };
    (0..PERIODS_PER_DAY)
        .map(|period| {
            let base = match profile {
                "TV" => {
                    if (102..138).contains(&period) {
                        0.35
                    } else {
                        0.05
                    }
                }
                "ACT_COOKING" => {
                    if (66..78).contains(&period) || (102..114).contains(&period) {
                        0.25
                    } else {
                        0.02
                    }
                }
                _ => {
                    if (48..120).contains(&period) {
                        0.08
                    } else {
                        0.01
                    }
                }
            };
            base * scale
        })
        .collect()
}

fn demo_appliances() -> Vec<ApplianceSpec> {
    let spec = |name: &str,
                profile: &str,
                ownership: f64,
                standby_w: f64,
                mean_power_w: f64,
                cycles_per_year: f64,
                cycle_minutes: u32,
                restart_delay: u32,
                calibration: f64| ApplianceSpec {
        name: name.to_string(),
        profile: profile.to_string(),
        ownership,
        standby_w,
        mean_power_w,
        cycles_per_year,
        cycle_minutes,
        restart_delay,
        calibration,
    };
    vec![
        spec("FRIDGE", "LEVEL", 1.0, 0.0, 110.0, 18_000.0, 18, 24, 0.076),
        spec("FREEZER", "LEVEL", 0.65, 0.0, 155.0, 15_000.0, 22, 18, 0.065),
        spec("TV1", "TV", 0.98, 3.0, 124.0, 380.0, 73, 0, 0.0095),
        spec("TV2", "TV", 0.58, 3.0, 124.0, 320.0, 73, 0, 0.0080),
        spec("COOKER", "ACT_COOKING", 0.88, 1.0, 2400.0, 450.0, 30, 0, 0.035),
        spec(
            "WASHING_MACHINE",
            "ACT_LAUNDRY",
            0.93,
            1.0,
            406.0,
            194.0,
            138,
            0,
            0.0046,
        ),
        spec(
            "WASHER_DRYER",
            "ACT_LAUNDRY",
            0.15,
            1.0,
            792.0,
            104.0,
            198,
            0,
            0.0034,
        ),
        spec(
            "ELEC_SPACE_HEATING",
            "ACTIVE_OCC",
            0.06,
            0.0,
            3000.0,
            300.0,
            60,
            30,
            0.0015,
        ),
        spec("STORAGE_HEATER", "CUSTOM", 0.05, 0.0, 2550.0, 120.0, 420, 0, 1.0),
    ]
}

/// Sinusoidal daylight curve with a month-dependent peak and day length.
fn demo_irradiance() -> IrradianceTable {
    // Midday peaks in W/m², January through December.
    const PEAKS: [f64; 12] = [
        120.0, 180.0, 280.0, 400.0, 500.0, 560.0, 540.0, 470.0, 360.0, 240.0, 140.0, 100.0,
    ];
    let minutes = (0..MINUTES_PER_DAY)
        .map(|minute| {
            let mut row = [0.0; 12];
            for (month, peak) in PEAKS.iter().enumerate() {
                // Half day length varies from 4.5h (winter) to 8h (summer).
                let half = 270.0 + 210.0 * (std::f64::consts::PI * month as f64 / 11.0).sin();
                let offset = minute as f64 - 720.0;
                if offset.abs() < half {
                    let phase = std::f64::consts::FRAC_PI_2 * offset / half;
                    row[month] = peak * phase.cos().powi(2);
                }
            }
            row
        })
        .collect();
    IrradianceTable::new(minutes).expect("demo irradiance covers the whole day")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_dataset_is_structurally_complete() {
        let data = Dataset::demo();
        for day_type in [DayType::Weekday, DayType::Weekend] {
            for residents in 1..=MAX_RESIDENTS {
                let weights = data.occupancy.start_weights(residents, day_type).unwrap();
                assert_eq!(weights.len(), CHAIN_STATES);
                assert!(weights.iter().sum::<f64>() > 0.0);
                let row = data
                    .occupancy
                    .transition_row(residents, day_type, 0, 0)
                    .unwrap();
                assert!(row.iter().sum::<f64>() > 0.0);
            }
        }
        assert!(!data.appliances.is_empty());
        assert!(data.bulbs.household_count() > 0);
    }

    #[test]
    fn demo_transitions_never_exceed_household_size() {
        let data = Dataset::demo();
        for residents in 1..=MAX_RESIDENTS {
            for period in 0..PERIODS_PER_DAY - 1 {
                for state in 0..CHAIN_STATES as u8 {
                    let row = data
                        .occupancy
                        .transition_row(residents, DayType::Weekday, period, state)
                        .unwrap();
                    for (next, weight) in row.iter().enumerate() {
                        if next as u8 > residents {
                            assert_eq!(*weight, 0.0);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn activity_lookup_miss_is_fatal() {
        let data = Dataset::demo();
        let err = data
            .activities
            .probability(DayType::Weekday, 2, "ACT_IRONING", 0)
            .unwrap_err();
        assert!(matches!(err, Error::ActivityLookup { .. }));
    }

    #[test]
    fn activity_lookup_clamps_occupants_to_table_ceiling() {
        let data = Dataset::demo();
        let at_five = data
            .activities
            .probability(DayType::Weekday, 5, "TV", 110)
            .unwrap();
        let above = data
            .activities
            .probability(DayType::Weekday, 6, "TV", 110)
            .unwrap();
        assert_eq!(at_five, above);
    }

    #[test]
    fn transition_table_rejects_short_matrices() {
        let rows = vec![vec![1.0; CHAIN_STATES]; 10];
        assert!(matches!(TransitionTable::new(rows), Err(Error::Table(_))));
    }

    #[test]
    fn irradiance_is_dark_at_midnight_and_bright_at_noon() {
        let data = Dataset::demo();
        assert_eq!(data.irradiance.at(0, 6), 0.0);
        assert!(data.irradiance.at(720, 6) > 400.0);
    }

    #[test]
    fn bulb_catalog_rejects_empty_households() {
        assert!(BulbCatalog::new(vec![]).is_err());
        assert!(BulbCatalog::new(vec![vec![60.0], vec![]]).is_err());
    }
}

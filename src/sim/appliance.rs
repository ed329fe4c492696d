//! Appliance duty-cycle engine.
//!
//! Each appliance is a three-state automaton walked minute by minute over one
//! day: idle, running a duty cycle, or cooling down behind a restart delay.
//! Start events are gated on active occupancy and an activity probability;
//! cycle lengths and rated powers carry appliance-class-specific randomness.

use rand::Rng;

use crate::error::Result;
use crate::sim::occupancy::DayOccupancy;
use crate::sim::random::normal_trunc;
use crate::sim::types::{DayType, MINUTES_PER_DAY, PERIOD_MINUTES};
use crate::tables::{ActivityTable, ApplianceSpec};

/// Relative monthly temperature modifiers for unit electric space heating,
/// January through December. Derived from Met Office Midlands temperature
/// records.
const MONTHLY_TEMPERATURE_FACTOR: [f64; 12] = [
    1.63, 1.821, 1.595, 0.867, 0.763, 0.191, 0.156, 0.087, 0.399, 0.936, 1.561, 1.994,
];

/// Cumulative days at the end of each month, non-leap year.
const MONTH_END_DAY: [i64; 12] = [31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334, 365];

/// Storage heaters pivot their seasonal window on the coldest day of the
/// year, assumed to be January 14th.
const COLDEST_DAY_OF_YEAR: i64 = 14;

/// Use-profile category controlling an appliance's start condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UseProfile {
    /// Start probability is independent of occupancy and activity tables.
    Level,
    /// Requires active occupants but no activity table entry.
    ActiveOcc,
    /// Bespoke start logic (storage heaters).
    Custom,
    /// Keyed into the activity-probability table.
    Activity(String),
}

impl UseProfile {
    pub fn parse(raw: &str) -> Self {
        match raw.to_uppercase().as_str() {
            "LEVEL" => UseProfile::Level,
            "ACTIVE_OCC" => UseProfile::ActiveOcc,
            "CUSTOM" => UseProfile::Custom,
            other => UseProfile::Activity(other.to_string()),
        }
    }

    /// Profiles whose start probability defaults to one instead of an
    /// activity lookup.
    fn fixed_unit_probability(&self) -> bool {
        matches!(
            self,
            UseProfile::Level | UseProfile::ActiveOcc | UseProfile::Custom
        )
    }

    /// Profiles that keep running (rather than freezing) when the house
    /// empties: level loads, laundry cycles, and custom appliances.
    fn runs_unattended(&self) -> bool {
        match self {
            UseProfile::Level | UseProfile::Custom => true,
            UseProfile::Activity(id) => id == "ACT_LAUNDRY",
            UseProfile::ActiveOcc => false,
        }
    }
}

/// Behavioral class derived from the catalog name, deciding cycle-length and
/// power-curve policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApplianceClass {
    Television,
    WashingMachine,
    WasherDryer,
    SpaceHeating,
    StorageHeater,
    Standard,
}

impl ApplianceClass {
    fn from_name(name: &str) -> Self {
        match name {
            "TV1" | "TV2" | "TV3" => ApplianceClass::Television,
            "WASHING_MACHINE" => ApplianceClass::WashingMachine,
            "WASHER_DRYER" => ApplianceClass::WasherDryer,
            "ELEC_SPACE_HEATING" => ApplianceClass::SpaceHeating,
            "STORAGE_HEATER" => ApplianceClass::StorageHeater,
            _ => ApplianceClass::Standard,
        }
    }
}

/// Duty-cycle automaton state. The tagged representation makes the
/// idle/cooldown/running distinction explicit instead of implying it from a
/// pair of counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DutyState {
    Idle,
    Running { minutes_left: u32 },
    Cooldown { minutes_left: u32 },
}

/// One simulated appliance and its per-day state.
#[derive(Debug, Clone)]
pub struct Appliance {
    name: String,
    profile: UseProfile,
    class: ApplianceClass,
    ownership: f64,
    standby_w: f64,
    mean_power_w: f64,
    cycles_per_year: f64,
    cycle_minutes: u32,
    restart_delay: u32,
    calibration: f64,
    owned: bool,
    rated_power_w: f64,
    state: DutyState,
    window_evaluated: bool,
    consumption: Vec<f64>,
}

impl Appliance {
    pub fn new(spec: &ApplianceSpec) -> Self {
        let name = spec.name.to_uppercase();
        Self {
            class: ApplianceClass::from_name(&name),
            profile: UseProfile::parse(&spec.profile),
            name,
            ownership: spec.ownership,
            standby_w: spec.standby_w,
            mean_power_w: spec.mean_power_w,
            cycles_per_year: spec.cycles_per_year,
            cycle_minutes: spec.cycle_minutes,
            restart_delay: spec.restart_delay,
            calibration: spec.calibration,
            owned: false,
            rated_power_w: spec.mean_power_w,
            state: DutyState::Idle,
            window_evaluated: false,
            consumption: vec![0.0; MINUTES_PER_DAY],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// Minute-by-minute power series in Watts; all zeros for an unowned
    /// appliance.
    pub fn consumption(&self) -> &[f64] {
        &self.consumption
    }

    /// Draws whether this household owns the appliance.
    fn assign_ownership(&mut self, rng: &mut impl Rng) {
        self.owned = rng.random::<f64>() < self.ownership;
    }

    /// Per-day setup: the day begins somewhere inside an implicit cooldown
    /// (expected value equal to the stated restart delay), and the realized
    /// rated power varies around the catalog mean.
    fn prepare_day(&mut self, rng: &mut impl Rng) {
        let delay = (rng.random::<f64>() * f64::from(self.restart_delay) * 2.0) as u32;
        self.state = if delay > 0 {
            DutyState::Cooldown {
                minutes_left: delay,
            }
        } else {
            DutyState::Idle
        };
        self.rated_power_w =
            f64::from(normal_trunc(rng, self.mean_power_w, self.mean_power_w / 10.0));
        self.window_evaluated = false;
    }

    /// Duty-cycle length drawn at a start event.
    ///
    /// Televisions follow a heavy-tailed viewing-duration curve with a mean
    /// of roughly 73 minutes; heating cycles vary normally around the
    /// nominal length; everything else uses the nominal length exactly.
    fn draw_cycle_length(&self, rng: &mut impl Rng) -> u32 {
        match self.class {
            ApplianceClass::Television => {
                let u: f64 = rng.random();
                (70.0 * (-(1.0 - u).ln()).powf(1.1)).round() as u32
            }
            ApplianceClass::StorageHeater | ApplianceClass::SpaceHeating => normal_trunc(
                rng,
                f64::from(self.cycle_minutes),
                f64::from(self.cycle_minutes) / 10.0,
            ),
            _ => self.cycle_minutes,
        }
    }

    /// Power draw given the minutes remaining in the current cycle.
    ///
    /// Washing machines and washer-dryers index a fixed phase table by the
    /// elapsed position in the cycle; everything else draws rated power.
    fn power_at(&self, minutes_left: u32) -> f64 {
        let total = match self.class {
            ApplianceClass::WashingMachine => 138,
            ApplianceClass::WasherDryer => 198,
            _ => return self.rated_power_w,
        };
        let elapsed = total - i64::from(minutes_left) + 1;
        if elapsed < 1 || elapsed > total {
            return self.standby_w;
        }
        match elapsed {
            1..=8 => 73.0,     // start-up and fill
            9..=29 => 2056.0,  // heating
            30..=81 => 73.0,   // wash and drain
            82..=92 => 73.0,   // spin
            93..=94 => 250.0,  // rinse
            95..=105 => 73.0,  // spin
            106..=107 => 250.0, // rinse
            108..=118 => 73.0, // spin
            119..=120 => 250.0, // rinse
            121..=131 => 73.0, // spin
            132..=133 => 250.0, // rinse
            134..=138 => 568.0, // fast spin
            139..=198 => 2500.0, // drying
            _ => self.standby_w,
        }
    }

    /// Transition taken at a start event: power the first minute and enter
    /// the cycle. A zero-length draw still powers its start minute.
    fn start(&mut self, rng: &mut impl Rng) -> f64 {
        let length = self.draw_cycle_length(rng).max(1);
        let power = self.power_at(length);
        self.state = self.after_tick(length);
        power
    }

    /// State following one consumed cycle minute.
    fn after_tick(&self, minutes_left: u32) -> DutyState {
        if minutes_left > 1 {
            DutyState::Running {
                minutes_left: minutes_left - 1,
            }
        } else if self.restart_delay > 0 {
            DutyState::Cooldown {
                minutes_left: self.restart_delay,
            }
        } else {
            DutyState::Idle
        }
    }
}

/// Simulates every catalog appliance over one day.
pub struct ApplianceEngine<'a> {
    activities: &'a ActivityTable,
    month: u32,
    day_type: DayType,
}

impl<'a> ApplianceEngine<'a> {
    pub fn new(activities: &'a ActivityTable, month: u32, day_type: DayType) -> Self {
        Self {
            activities,
            month,
            day_type,
        }
    }

    /// Runs the duty-cycle automaton for each appliance in catalog order.
    ///
    /// Ownership is drawn for the whole catalog first, then each owned
    /// appliance consumes its per-day setup and minute draws, keeping the
    /// draw sequence a pure function of the seed.
    ///
    /// # Errors
    ///
    /// Propagates activity-table lookup misses; these indicate a
    /// table/profile mismatch and abort the run.
    pub fn simulate(
        &self,
        specs: &[ApplianceSpec],
        occupancy: &DayOccupancy,
        rng: &mut impl Rng,
    ) -> Result<Vec<Appliance>> {
        let mut appliances: Vec<Appliance> = specs.iter().map(Appliance::new).collect();
        for appliance in &mut appliances {
            appliance.assign_ownership(rng);
        }
        for appliance in &mut appliances {
            if appliance.owned {
                self.simulate_day(appliance, occupancy, rng)?;
            }
        }
        Ok(appliances)
    }

    fn simulate_day(
        &self,
        a: &mut Appliance,
        occupancy: &DayOccupancy,
        rng: &mut impl Rng,
    ) -> Result<()> {
        a.prepare_day(rng);

        for minute in 0..MINUTES_PER_DAY {
            // Ten-minute index lags the minute by one, clamped at the day
            // start, so a period's occupancy governs minutes p*10+1..=p*10+10.
            let period = minute.saturating_sub(1) / PERIOD_MINUTES;
            let active = occupancy.state(period);

            let mut power = a.standby_w;
            a.state = match a.state {
                DutyState::Cooldown { minutes_left } => {
                    if minutes_left > 1 {
                        DutyState::Cooldown {
                            minutes_left: minutes_left - 1,
                        }
                    } else {
                        DutyState::Idle
                    }
                }
                DutyState::Idle => {
                    if (active > 0 && a.profile != UseProfile::Custom)
                        || a.profile == UseProfile::Level
                    {
                        let probability = self.start_probability(a, active, period)?;
                        if rng.random::<f64>() < a.calibration * probability {
                            power = a.start(rng);
                            a.state
                        } else {
                            DutyState::Idle
                        }
                    } else if a.profile == UseProfile::Custom
                        && a.class == ApplianceClass::StorageHeater
                        && period == 4
                        && !a.window_evaluated
                    {
                        // Evaluated at most once per day, when the overnight
                        // tariff window opens.
                        a.window_evaluated = true;
                        let probability = self.storage_heater_probability(a.cycles_per_year);
                        if rng.random::<f64>() < probability {
                            power = a.start(rng);
                            a.state
                        } else {
                            DutyState::Idle
                        }
                    } else {
                        DutyState::Idle
                    }
                }
                DutyState::Running { minutes_left } => {
                    if active == 0 && !a.profile.runs_unattended() {
                        // Occupant absence pauses the cycle; it resumes when
                        // someone is active again.
                        DutyState::Running { minutes_left }
                    } else {
                        power = a.power_at(minutes_left);
                        a.after_tick(minutes_left)
                    }
                }
            };

            a.consumption[minute] = power;
        }
        Ok(())
    }

    /// Start-event probability for the gated idle branch.
    ///
    /// Activity-profile appliances look up the table entry for (day type,
    /// active occupants, profile) at this period. LEVEL, ACTIVE_OCC, and
    /// CUSTOM profiles default to one, overridden by the monthly temperature
    /// factor for unit electric space heating.
    fn start_probability(&self, a: &Appliance, active: u8, period: usize) -> Result<f64> {
        match &a.profile {
            UseProfile::Activity(id) => {
                self.activities
                    .probability(self.day_type, active, id, period)
            }
            _ if a.class == ApplianceClass::SpaceHeating => {
                Ok(MONTHLY_TEMPERATURE_FACTOR[(self.month as usize).clamp(1, 12) - 1])
            }
            _ => Ok(1.0),
        }
    }

    /// Seasonal on/off window for storage heaters.
    ///
    /// The annual cycle count spreads half its days either side of the
    /// January 14th pivot. The boundary months get a 0.05 probability (a 50%
    /// chance at month resolution, scaled to the ten-minute evaluation
    /// window); months strictly inside the window are summer (never on); the
    /// rest is winter (always on).
    fn storage_heater_probability(&self, cycles_per_year: f64) -> f64 {
        let half_span = (cycles_per_year / 2.0) as i64;
        let off_month = month_of_year_day(COLDEST_DAY_OF_YEAR + half_span);
        let on_month = month_of_year_day(COLDEST_DAY_OF_YEAR - half_span);
        let month = self.month;
        if month == off_month || month == on_month {
            0.05
        } else if month > off_month && month < on_month {
            0.0
        } else {
            1.0
        }
    }
}

/// Month (1-12) containing a day-of-year offset, wrapping across year
/// boundaries.
fn month_of_year_day(day: i64) -> u32 {
    let mut day = day.rem_euclid(365);
    if day == 0 {
        day = 365;
    }
    for (month, end) in MONTH_END_DAY.iter().enumerate() {
        if day <= *end {
            return month as u32 + 1;
        }
    }
    12
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::sim::types::PERIODS_PER_DAY;
    use crate::tables::Dataset;

    fn spec(name: &str, profile: &str) -> ApplianceSpec {
        ApplianceSpec {
            name: name.to_string(),
            profile: profile.to_string(),
            ownership: 1.0,
            standby_w: 1.0,
            mean_power_w: 500.0,
            cycles_per_year: 200.0,
            cycle_minutes: 20,
            restart_delay: 15,
            calibration: 1.0,
        }
    }

    fn engine(data: &Dataset, month: u32) -> ApplianceEngine<'_> {
        ApplianceEngine::new(&data.activities, month, DayType::Weekday)
    }

    #[test]
    fn series_always_covers_the_whole_day() {
        let data = Dataset::demo();
        let mut rng = StdRng::seed_from_u64(2);
        let occ = DayOccupancy::fixed(2);
        let appliances = engine(&data, 1)
            .simulate(&data.appliances, &occ, &mut rng)
            .unwrap();
        assert_eq!(appliances.len(), data.appliances.len());
        for a in &appliances {
            assert_eq!(a.consumption().len(), MINUTES_PER_DAY);
        }
    }

    #[test]
    fn unowned_appliance_yields_all_zeros() {
        let data = Dataset::demo();
        let mut s = spec("TV1", "TV");
        s.ownership = 0.0;
        let mut rng = StdRng::seed_from_u64(4);
        let occ = DayOccupancy::fixed(2);
        let appliances = engine(&data, 1).simulate(&[s], &occ, &mut rng).unwrap();
        assert!(!appliances[0].is_owned());
        assert!(appliances[0].consumption().iter().all(|w| *w == 0.0));
    }

    #[test]
    fn missing_activity_entry_aborts_the_run() {
        let data = Dataset::demo();
        let s = spec("KETTLE", "ACT_IRONING");
        let mut rng = StdRng::seed_from_u64(6);
        let occ = DayOccupancy::fixed(1);
        let err = engine(&data, 1).simulate(&[s], &occ, &mut rng).unwrap_err();
        assert!(matches!(err, crate::error::Error::ActivityLookup { .. }));
    }

    #[test]
    fn level_profile_starts_without_occupancy() {
        let data = Dataset::demo();
        let mut s = spec("HOB", "LEVEL");
        s.restart_delay = 0;
        let mut rng = StdRng::seed_from_u64(10);
        let occ = DayOccupancy::fixed(0);
        let appliances = engine(&data, 4).simulate(&[s], &occ, &mut rng).unwrap();
        let powered = appliances[0]
            .consumption()
            .iter()
            .filter(|w| **w > 1.0)
            .count();
        assert!(powered > 0, "a LEVEL appliance ignores occupancy gating");
    }

    #[test]
    fn restart_delay_is_honored_between_cycles() {
        let data = Dataset::demo();
        // Calibration 1 makes every idle evaluation a start event, so the
        // trace must be an exact cycle/cooldown lattice.
        let mut s = spec("HOB", "LEVEL");
        s.cycle_minutes = 5;
        s.restart_delay = 12;
        let mut rng = StdRng::seed_from_u64(20);
        let occ = DayOccupancy::fixed(1);
        let appliances = engine(&data, 4).simulate(&[s], &occ, &mut rng).unwrap();
        let series = appliances[0].consumption();

        // Skip the randomized initial cooldown, then check each cycle is
        // followed by at least 12 standby minutes.
        let mut t = series.iter().position(|w| *w > 1.0).unwrap();
        while t + 17 < MINUTES_PER_DAY {
            for i in 0..5 {
                assert!(series[t + i] > 1.0, "minute {} should be in-cycle", t + i);
            }
            for i in 5..17 {
                assert!(
                    series[t + i] <= 1.0,
                    "minute {} should be cooling down",
                    t + i
                );
            }
            t += 17;
        }
    }

    #[test]
    fn absence_pauses_an_occupancy_dependent_cycle() {
        let data = Dataset::demo();
        let mut s = spec("PORTABLE_HEATER", "ACTIVE_OCC");
        s.cycle_minutes = 60;
        s.restart_delay = 0;
        // Occupied for the first period only; the cycle must freeze at
        // standby once the house empties.
        let mut states = vec![0u8; PERIODS_PER_DAY];
        states[0] = 2;
        let occ = DayOccupancy::from_states(states);
        let mut rng = StdRng::seed_from_u64(30);
        let appliances = engine(&data, 1).simulate(&[s], &occ, &mut rng).unwrap();
        let series = appliances[0].consumption();
        let active_minutes = series.iter().filter(|w| **w > 1.0).count();
        // Period 0 governs minutes 0..=10; the start fires at minute 0
        // (calibration 1) and the freeze hits at minute 11.
        assert_eq!(active_minutes, 11);
        assert!(series[200] <= 1.0);
    }

    #[test]
    fn washing_machine_reproduces_the_phase_table() {
        let a = Appliance::new(&spec("WASHING_MACHINE", "ACT_LAUNDRY"));
        let expected: Vec<(std::ops::RangeInclusive<i64>, f64)> = vec![
            (1..=8, 73.0),
            (9..=29, 2056.0),
            (30..=81, 73.0),
            (82..=92, 73.0),
            (93..=94, 250.0),
            (95..=105, 73.0),
            (106..=107, 250.0),
            (108..=118, 73.0),
            (119..=120, 250.0),
            (121..=131, 73.0),
            (132..=133, 250.0),
            (134..=138, 568.0),
        ];
        for elapsed in 1..=138i64 {
            let minutes_left = (138 - elapsed + 1) as u32;
            let want = expected
                .iter()
                .find(|(range, _)| range.contains(&elapsed))
                .map(|(_, w)| *w)
                .unwrap();
            assert_eq!(a.power_at(minutes_left), want, "elapsed minute {elapsed}");
        }
        // Beyond the table the machine falls back to standby.
        assert_eq!(a.power_at(0), a.standby_w);
    }

    #[test]
    fn washer_dryer_appends_a_drying_phase() {
        let a = Appliance::new(&spec("WASHER_DRYER", "ACT_LAUNDRY"));
        // Elapsed 139..=198 is the 2500 W drying phase.
        assert_eq!(a.power_at(60), 2500.0);
        assert_eq!(a.power_at(1), 2500.0);
        // Elapsed 1 (fresh start) is fill.
        assert_eq!(a.power_at(198), 73.0);
    }

    #[test]
    fn storage_heater_evaluates_at_most_once_per_day() {
        let data = Dataset::demo();
        let mut s = spec("STORAGE_HEATER", "CUSTOM");
        s.cycles_per_year = 120.0;
        s.cycle_minutes = 120;
        s.restart_delay = 0;
        // January with cycles 120 gives a winter window: probability one, so
        // exactly one start event, at the first minute of period 4.
        let occ = DayOccupancy::fixed(0);
        let mut rng = StdRng::seed_from_u64(40);
        let appliances = engine(&data, 1).simulate(&[s], &occ, &mut rng).unwrap();
        let series = appliances[0].consumption();
        let first_on = series.iter().position(|w| *w > 1.0).unwrap();
        assert_eq!(first_on, 41, "period 4 opens at minute 41");
        // One contiguous block only.
        let blocks = series
            .windows(2)
            .filter(|w| w[0] <= 1.0 && w[1] > 1.0)
            .count();
        assert_eq!(blocks, 1);
    }

    #[test]
    fn storage_heater_stays_off_in_summer() {
        let data = Dataset::demo();
        let mut s = spec("STORAGE_HEATER", "CUSTOM");
        s.cycles_per_year = 120.0;
        let occ = DayOccupancy::fixed(0);
        let mut rng = StdRng::seed_from_u64(41);
        // July sits strictly inside the off window for a 120-cycle heater.
        let appliances = engine(&data, 7).simulate(&[s], &occ, &mut rng).unwrap();
        assert!(appliances[0].consumption().iter().all(|w| *w <= 1.0));
    }

    #[test]
    fn seasonal_window_boundaries() {
        let data = Dataset::demo();
        let e = engine(&data, 3);
        // 120 cycles: off month = day 74 (March), on month = day 319
        // (November).
        assert_eq!(e.storage_heater_probability(120.0), 0.05);
        assert_eq!(engine(&data, 11).storage_heater_probability(120.0), 0.05);
        assert_eq!(engine(&data, 7).storage_heater_probability(120.0), 0.0);
        assert_eq!(engine(&data, 1).storage_heater_probability(120.0), 1.0);
        assert_eq!(engine(&data, 12).storage_heater_probability(120.0), 1.0);
    }

    #[test]
    fn month_of_year_day_wraps() {
        assert_eq!(month_of_year_day(14), 1);
        assert_eq!(month_of_year_day(74), 3);
        assert_eq!(month_of_year_day(-46), 11);
        assert_eq!(month_of_year_day(365), 12);
        assert_eq!(month_of_year_day(366), 1);
    }

    #[test]
    fn television_cycle_length_has_the_documented_mean() {
        let a = Appliance::new(&spec("TV1", "TV"));
        let mut rng = StdRng::seed_from_u64(50);
        let n = 20_000;
        let total: u64 = (0..n)
            .map(|_| u64::from(a.draw_cycle_length(&mut rng)))
            .sum();
        let mean = total as f64 / n as f64;
        assert!((mean - 73.0).abs() < 3.0, "mean viewing time was {mean}");
    }

    #[test]
    fn fixed_length_appliances_use_the_nominal_cycle() {
        let a = Appliance::new(&spec("COOKER", "ACT_COOKING"));
        let mut rng = StdRng::seed_from_u64(60);
        for _ in 0..10 {
            assert_eq!(a.draw_cycle_length(&mut rng), 20);
        }
    }
}

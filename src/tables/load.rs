//! CSV loaders for the input tables.
//!
//! Thin glue between delimited files and the in-memory tables in
//! [`crate::tables`]. Lines starting with `#` are comments in every layout.
//! A structurally invalid file is fatal; a missing per-combination file only
//! fails later, when a run actually asks for that combination.

use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{Error, Result};
use crate::sim::types::{DayType, MAX_RESIDENTS};
use crate::tables::{
    ActivityTable, ApplianceSpec, BulbCatalog, Dataset, IrradianceTable, OccupancyTables,
    TransitionTable,
};

impl Dataset {
    /// Loads a full dataset from a directory using the standard file names:
    /// `occ_start_states_{weekday,weekend}.csv`, `tpm_<residents>_<day>.csv`,
    /// `activities.csv`, `appliances.csv`, `bulbs.csv`, `irradiance.csv`.
    ///
    /// Transition matrices are optional per (household size, day type) pair;
    /// everything else must be present.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut occupancy = OccupancyTables::new();
        for day_type in [DayType::Weekday, DayType::Weekend] {
            let start = load_start_states(&dir.join(format!(
                "occ_start_states_{}.csv",
                day_type.label()
            )))?;
            occupancy.set_start_states(day_type, start)?;

            for residents in 1..=MAX_RESIDENTS {
                let path = dir.join(format!("tpm_{residents}_{}.csv", day_type.label()));
                if path.is_file() {
                    occupancy.set_transitions(residents, day_type, load_transitions(&path)?)?;
                }
            }
        }

        Ok(Self {
            occupancy,
            activities: load_activities(&dir.join("activities.csv"))?,
            appliances: load_appliances(&dir.join("appliances.csv"))?,
            bulbs: load_bulbs(&dir.join("bulbs.csv"))?,
            irradiance: load_irradiance(&dir.join("irradiance.csv"))?,
        })
    }
}

fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_path(path)
        .map_err(|e| Error::Table(format!("cannot open {}: {e}", path.display())))
}

fn parse_f64(field: &str, path: &Path, row: usize) -> Result<f64> {
    field.trim().parse().map_err(|_| {
        Error::Table(format!(
            "{} row {row}: \"{field}\" is not a number",
            path.display()
        ))
    })
}

fn parse_u32(field: &str, path: &Path, row: usize) -> Result<u32> {
    field.trim().parse().map_err(|_| {
        Error::Table(format!(
            "{} row {row}: \"{field}\" is not an integer",
            path.display()
        ))
    })
}

fn parse_day_type(field: &str, path: &Path, row: usize) -> Result<DayType> {
    match field.trim().to_lowercase().as_str() {
        "weekday" | "wd" => Ok(DayType::Weekday),
        "weekend" | "we" => Ok(DayType::Weekend),
        other => Err(Error::Table(format!(
            "{} row {row}: unknown day type \"{other}\"",
            path.display()
        ))),
    }
}

/// Layout: one row per chain state, columns = weights for household sizes
/// 1 through 5.
fn load_start_states(path: &Path) -> Result<Vec<Vec<f64>>> {
    let mut rows = Vec::new();
    for (i, record) in reader(path)?.records().enumerate() {
        let record = record?;
        let row: Vec<f64> = record
            .iter()
            .map(|field| parse_f64(field, path, i))
            .collect::<Result<_>>()?;
        rows.push(row);
    }
    Ok(rows)
}

/// Layout: `period,state,p0..p6` — the probability vector over next states
/// for leaving `state` at `period`. Rows must be ordered by (period, state).
fn load_transitions(path: &Path) -> Result<TransitionTable> {
    let mut rows = Vec::new();
    for (i, record) in reader(path)?.records().enumerate() {
        let record = record?;
        if record.len() < 3 {
            return Err(Error::Table(format!(
                "{} row {i}: expected period, state, and probabilities",
                path.display()
            )));
        }
        let probabilities: Vec<f64> = record
            .iter()
            .skip(2)
            .map(|field| parse_f64(field, path, i))
            .collect::<Result<_>>()?;
        rows.push(probabilities);
    }
    TransitionTable::new(rows)
}

/// Layout: `day_type,occupants,profile,p1..p144`.
fn load_activities(path: &Path) -> Result<ActivityTable> {
    let mut table = ActivityTable::new();
    for (i, record) in reader(path)?.records().enumerate() {
        let record = record?;
        if record.len() < 4 {
            return Err(Error::Table(format!(
                "{} row {i}: expected day type, occupants, profile, probabilities",
                path.display()
            )));
        }
        let day_type = parse_day_type(&record[0], path, i)?;
        let occupants = parse_u32(&record[1], path, i)? as u8;
        let profile = record[2].trim().to_string();
        let probabilities: Vec<f64> = record
            .iter()
            .skip(3)
            .map(|field| parse_f64(field, path, i))
            .collect::<Result<_>>()?;
        table.insert(day_type, occupants, &profile, probabilities)?;
    }
    if table.is_empty() {
        return Err(Error::Table(format!(
            "{} contains no activity entries",
            path.display()
        )));
    }
    Ok(table)
}

/// Layout: `name,profile,ownership,standby_w,mean_power_w,cycles_per_year,
/// cycle_minutes,restart_delay,calibration`.
fn load_appliances(path: &Path) -> Result<Vec<ApplianceSpec>> {
    let mut specs = Vec::new();
    for (i, record) in reader(path)?.records().enumerate() {
        let record = record?;
        if record.len() != 9 {
            return Err(Error::Table(format!(
                "{} row {i}: expected 9 fields, found {}",
                path.display(),
                record.len()
            )));
        }
        specs.push(ApplianceSpec {
            name: record[0].trim().to_string(),
            profile: record[1].trim().to_string(),
            ownership: parse_f64(&record[2], path, i)?,
            standby_w: parse_f64(&record[3], path, i)?,
            mean_power_w: parse_f64(&record[4], path, i)?,
            cycles_per_year: parse_f64(&record[5], path, i)?,
            cycle_minutes: parse_u32(&record[6], path, i)?,
            restart_delay: parse_u32(&record[7], path, i)?,
            calibration: parse_f64(&record[8], path, i)?,
        });
    }
    if specs.is_empty() {
        return Err(Error::Table(format!(
            "{} contains no appliances",
            path.display()
        )));
    }
    Ok(specs)
}

/// Layout: `house,count,r1..rN` — a ragged array padded with zeros; `count`
/// says how many ratings are valid.
fn load_bulbs(path: &Path) -> Result<BulbCatalog> {
    let mut households = Vec::new();
    for (i, record) in reader(path)?.records().enumerate() {
        let record = record?;
        if record.len() < 3 {
            return Err(Error::Table(format!(
                "{} row {i}: expected house, count, ratings",
                path.display()
            )));
        }
        let count = parse_u32(&record[1], path, i)? as usize;
        if record.len() < 2 + count {
            return Err(Error::Table(format!(
                "{} row {i}: declares {count} bulbs but lists {}",
                path.display(),
                record.len() - 2
            )));
        }
        let ratings: Vec<f64> = record
            .iter()
            .skip(2)
            .take(count)
            .map(|field| parse_f64(field, path, i))
            .collect::<Result<_>>()?;
        households.push(ratings);
    }
    BulbCatalog::new(households)
}

/// Layout: `minute,jan..dec` — 1440 rows of W/m² per month.
fn load_irradiance(path: &Path) -> Result<IrradianceTable> {
    let mut minutes = Vec::new();
    for (i, record) in reader(path)?.records().enumerate() {
        let record = record?;
        if record.len() != 13 {
            return Err(Error::Table(format!(
                "{} row {i}: expected minute plus 12 month columns, found {}",
                path.display(),
                record.len()
            )));
        }
        let mut row = [0.0; 12];
        for (month, field) in record.iter().skip(1).enumerate() {
            row[month] = parse_f64(field, path, i)?;
        }
        minutes.push(row);
    }
    IrradianceTable::new(minutes)
}

//! CSV export for simulation results.
//!
//! Demand series are written one row per entity: a label field followed by
//! 1440 per-minute values in Watts. The occupancy sequence is written as
//! (period, state) rows.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::Result;
use crate::sim::occupancy::DayOccupancy;

/// A labeled 1440-entry demand series ready for export.
pub type LabeledSeries = (String, Vec<f64>);

/// Exports demand series to a CSV file at the given path.
///
/// # Errors
///
/// Surfaces file-creation and CSV write failures.
pub fn export_series(rows: &[LabeledSeries], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_series(rows, buf)
}

/// Writes demand series as CSV to any writer. Produces deterministic output
/// for identical inputs.
pub fn write_series(rows: &[LabeledSeries], writer: impl Write) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    for (label, series) in rows {
        let mut record = Vec::with_capacity(series.len() + 1);
        record.push(label.clone());
        record.extend(series.iter().map(|w| format!("{w:.1}")));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Exports the occupancy sequence to a CSV file at the given path.
pub fn export_occupancy(occupancy: &DayOccupancy, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_occupancy(occupancy, buf)
}

/// Writes the occupancy sequence as (period, active occupants) rows.
pub fn write_occupancy(occupancy: &DayOccupancy, writer: impl Write) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    for (period, state) in occupancy.states().iter().enumerate() {
        wtr.write_record(&[(period + 1).to_string(), state.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::types::{MINUTES_PER_DAY, PERIODS_PER_DAY};

    fn make_rows() -> Vec<LabeledSeries> {
        vec![
            ("TV1".to_string(), vec![3.0; MINUTES_PER_DAY]),
            ("FRIDGE".to_string(), vec![110.0; MINUTES_PER_DAY]),
        ]
    }

    #[test]
    fn one_row_per_entity_with_label_and_values() {
        let mut buf = Vec::new();
        write_series(&make_rows(), &mut buf).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert_eq!(line.split(',').count(), MINUTES_PER_DAY + 1);
        }
        assert!(lines[0].starts_with("TV1,3.0,"));
        assert!(lines[1].starts_with("FRIDGE,110.0,"));
    }

    #[test]
    fn deterministic_output() {
        let rows = make_rows();
        let mut a = Vec::new();
        let mut b = Vec::new();
        write_series(&rows, &mut a).unwrap();
        write_series(&rows, &mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn occupancy_rows_cover_all_periods() {
        let occ = DayOccupancy::fixed(2);
        let mut buf = Vec::new();
        write_occupancy(&occ, &mut buf).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), PERIODS_PER_DAY);
        assert_eq!(lines[0], "1,2");
        assert_eq!(lines[143], "144,2");
    }
}

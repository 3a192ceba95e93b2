//! CSV export for dispatch schedules.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::dispatch::ScheduleRow;

/// Column header for CSV schedule export.
const HEADER: &str =
    "timestamp,price,power_mw,soc,profit,energy_charged_mwh,energy_discharged_mwh";

/// Exports a schedule to a CSV file at the given path.
///
/// Writes a header row followed by one data row per interval. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(rows: &[ScheduleRow], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(rows, buf)
}

/// Writes a schedule as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(rows: &[ScheduleRow], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;

    for r in rows {
        wtr.write_record(&[
            r.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
            format!("{:.4}", r.price),
            format!("{:.4}", r.power_mw),
            format!("{:.6}", r.soc),
            format!("{:.6}", r.profit),
            format!("{:.6}", r.energy_charged_mwh),
            format!("{:.6}", r.energy_discharged_mwh),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

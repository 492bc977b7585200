use std::fs::File;
use std::path::Path;

use crate::error::Result;
use crate::processor::Signal;

/// Reads a signal stored as `Index,Value` rows. The header is skipped, and so
/// are rows whose value does not parse.
pub fn read_signal<P: AsRef<Path>>(path: P) -> Result<Signal> {
    read_signal_column_by_index(path, 1)
}

/// Reads a column of f64 values from a CSV file by column name, skipping invalid/missing values.
///
/// Falls back to the first column if `column` is not in the header.
pub fn read_signal_column<P: AsRef<Path>>(path: P, column: &str) -> Result<Signal> {
    let file = File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);

    let headers = rdr.headers()?.clone();
    let col_index = headers.iter().position(|h| h == column).unwrap_or(0);

    collect_column(&mut rdr, col_index)
}

/// Reads a column of f64 values from a CSV file by column index, skipping invalid/missing values.
pub fn read_signal_column_by_index<P: AsRef<Path>>(path: P, col_index: usize) -> Result<Signal> {
    let file = File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);
    collect_column(&mut rdr, col_index)
}

fn collect_column<R: std::io::Read>(rdr: &mut csv::Reader<R>, col_index: usize) -> Result<Signal> {
    let mut values = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if let Some(val) = record.get(col_index).and_then(|f| f.trim().parse::<f64>().ok()) {
            values.push(val);
        }
    }
    Ok(values)
}

/// Writes `signal` as `Index,Value` rows with a header line.
pub fn write_signal<P: AsRef<Path>>(path: P, signal: &[f64]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["Index", "Value"])?;
    for (i, value) in signal.iter().enumerate() {
        wtr.write_record([i.to_string(), value.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

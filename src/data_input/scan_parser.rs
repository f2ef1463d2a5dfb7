// src/data_input/scan_parser.rs

use csv::ReaderBuilder;
use ndarray::Array1;
use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::constants::{POSITION_COUNTS_PER_MM, SCAN_HEADER_LINES};
use crate::data_input::scan_data::ScanData;

// Column layout of the tab-separated instrument rows.
const COL_POSITION: usize = 0;
const COL_X_VOLTS: usize = 1;
const COL_Y_VOLTS: usize = 2;
const COL_MAGNITUDE: usize = 3;
const COL_PHASE: usize = 4;
const COL_TEMPERATURE: usize = 6;

/// Parses one scan file into position, channel voltage and temperature data.
///
/// The instrument writes five header lines before the numeric rows. Rows
/// whose position or channel cells do not parse are skipped with a warning,
/// as are rows that are too short. Positions are re-zeroed to the first
/// valid row and converted from encoder counts to millimeters.
pub fn parse_scan_file(path: &Path) -> Result<ScanData, Box<dyn Error>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    // Consume the instrument header before handing the reader to csv.
    let mut header_line = String::new();
    for _ in 0..SCAN_HEADER_LINES {
        header_line.clear();
        if reader.read_line(&mut header_line)? == 0 {
            return Err(format!(
                "'{}' ended inside the {}-line instrument header",
                path.display(),
                SCAN_HEADER_LINES
            )
            .into());
        }
    }

    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut position_counts: Vec<f64> = Vec::new();
    let mut x_volts: Vec<f64> = Vec::new();
    let mut y_volts: Vec<f64> = Vec::new();
    let mut magnitude_volts: Vec<f64> = Vec::new();
    let mut phase_deg: Vec<f64> = Vec::new();
    let mut temperature_samples: Vec<f64> = Vec::new();

    for (row_index, result) in csv_reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                eprintln!(
                    "Warning: Skipping row {} of '{}' due to read error: {}",
                    row_index + 1,
                    path.display(),
                    e
                );
                continue;
            }
        };

        let parse_f64 = |col: usize| -> Option<f64> {
            record.get(col).and_then(|cell| cell.parse::<f64>().ok())
        };

        let row = (
            parse_f64(COL_POSITION),
            parse_f64(COL_X_VOLTS),
            parse_f64(COL_Y_VOLTS),
            parse_f64(COL_MAGNITUDE),
            parse_f64(COL_PHASE),
        );
        let (Some(pos), Some(x), Some(y), Some(r), Some(theta)) = row else {
            eprintln!(
                "Warning: Skipping row {} of '{}' due to missing or invalid cells",
                row_index + 1,
                path.display()
            );
            continue;
        };

        position_counts.push(pos);
        x_volts.push(x);
        y_volts.push(y);
        magnitude_volts.push(r);
        phase_deg.push(theta);

        // The temperature column is optional and may hold NaN.
        if let Some(temperature) = parse_f64(COL_TEMPERATURE) {
            if temperature.is_finite() {
                temperature_samples.push(temperature);
            }
        }
    }

    if position_counts.is_empty() {
        return Err(format!("'{}' contains no valid data rows", path.display()).into());
    }

    // Zero at the first position, then convert counts to millimeters.
    let first_position = position_counts[0];
    let position_mm: Vec<f64> = position_counts
        .iter()
        .map(|&p| (p - first_position) / POSITION_COUNTS_PER_MM)
        .collect();

    Ok(ScanData {
        position_mm: Array1::from(position_mm),
        x_volts: Array1::from(x_volts),
        y_volts: Array1::from(y_volts),
        magnitude_volts: Array1::from(magnitude_volts),
        phase_deg: Array1::from(phase_deg),
        temperature_samples,
    })
}

// src/data_input/scan_parser.rs

// tests/scan_parser_test.rs

use std::fs;
use std::path::Path;

use ac_susceptibility_render::data_input::scan_parser::parse_scan_file;

const HEADER: &str = "AC Susceptometer v2.1\nSample: test\nDate: 2018-06-01\nLock-in: SR830\nColumns: pos X Y R theta aux T\n";

fn write_scan(path: &Path, rows: &[&str]) {
    let mut content = String::from(HEADER);
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(path, content).unwrap();
}

#[test]
fn positions_are_rezeroed_and_converted_to_millimeters() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("120Hz.txt");
    write_scan(
        &file,
        &[
            "1000\t0.001\t0.002\t0.0022\t63.4\t0\t300.1",
            "1250\t0.002\t0.003\t0.0036\t56.3\t0\t299.9",
            "1500\t0.003\t0.004\t0.0050\t53.1\t0\t300.0",
        ],
    );

    let scan = parse_scan_file(&file).unwrap();
    assert_eq!(scan.len(), 3);
    assert_eq!(scan.position_mm[0], 0.0);
    assert_eq!(scan.position_mm[1], 1.0);
    assert_eq!(scan.position_mm[2], 2.0);
    assert_eq!(scan.x_volts[2], 0.003);
    assert_eq!(scan.y_volts[0], 0.002);
}

#[test]
fn invalid_rows_are_skipped_and_nan_temperatures_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("240Hz.txt");
    write_scan(
        &file,
        &[
            "1000\t0.001\t0.002\t0.0022\t63.4\t0\t300.0",
            "not\ta\tvalid\trow",
            "1250\t0.002\t0.003\t0.0036\t56.3\t0\tnan",
            "1500\t0.003\t0.004\t0.0050\t53.1\t0\t302.0",
        ],
    );

    let scan = parse_scan_file(&file).unwrap();
    assert_eq!(scan.len(), 3);
    // The nan cell contributes nothing to the temperature samples.
    assert_eq!(scan.temperature_samples, vec![300.0, 302.0]);
    assert_eq!(scan.mean_temperature(), Some(301.0));
}

#[test]
fn scan_without_valid_rows_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("360Hz.txt");
    write_scan(&file, &["only\tgarbage\there"]);
    assert!(parse_scan_file(&file).is_err());
}

#[test]
fn truncated_header_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("480Hz.txt");
    fs::write(&file, "too\nshort\n").unwrap();
    assert!(parse_scan_file(&file).is_err());
}

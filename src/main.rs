// src/main.rs

use std::env;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use ac_susceptibility_render::data_analysis::calibration::Calibration;
use ac_susceptibility_render::data_analysis::voltage_fit::fit_voltage;
use ac_susceptibility_render::data_input::organize::organize;
use ac_susceptibility_render::data_input::scan_parser::parse_scan_file;
use ac_susceptibility_render::plot_functions::plot_magnetization::{
    plot_magnetization, TemperatureSeries,
};
use ac_susceptibility_render::plot_functions::plot_voltage::plot_voltage;

struct CliOptions {
    skip_voltage: bool,
    calibrated: bool,
    data_path: PathBuf,
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [-s|--skip-voltage] [-c|--calibrated] [-d|--data-path <dir>]", program);
    eprintln!("  -s, --skip-voltage     don't render the per-scan voltage plots");
    eprintln!("  -c, --calibrated       fit with the reference coil calibration");
    eprintln!("  -d, --data-path <dir>  path to the data folder (default: ./data)");
}

fn parse_args() -> CliOptions {
    let args: Vec<String> = env::args().collect();
    let mut options = CliOptions {
        skip_voltage: false,
        calibrated: false,
        data_path: PathBuf::from("data"),
    };

    let mut index = 1;
    while index < args.len() {
        match args[index].as_str() {
            "-s" | "--skip-voltage" => options.skip_voltage = true,
            "-c" | "--calibrated" => options.calibrated = true,
            "-d" | "--data-path" => {
                index += 1;
                match args.get(index) {
                    Some(path) => options.data_path = PathBuf::from(path),
                    None => {
                        eprintln!("Error: {} requires a directory argument.", args[index - 1]);
                        print_usage(&args[0]);
                        process::exit(1);
                    }
                }
            }
            "-h" | "--help" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            unknown => {
                eprintln!("Error: Unknown argument '{}'.", unknown);
                print_usage(&args[0]);
                process::exit(1);
            }
        }
        index += 1;
    }

    options
}

fn main() -> Result<(), Box<dyn Error>> {
    let options = parse_args();
    let input_folder = options.data_path.join("input");
    if !input_folder.is_dir() {
        return Err(format!(
            "Data folder '{}' has no 'input' subfolder.",
            options.data_path.display()
        )
        .into());
    }

    println!("--- Organizing Input Data ---");
    organize(&options.data_path)?;

    println!("\n--- Fitting and Plotting ---");
    let output_folder = options.data_path.join("output");
    let calibration = if options.calibrated {
        Some(Calibration::reference())
    } else {
        None
    };

    let mut measurement_folders: Vec<PathBuf> = fs::read_dir(&input_folder)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .collect();
    measurement_folders.sort();

    if measurement_folders.is_empty() {
        println!("No measurement folders found in '{}'.", input_folder.display());
        return Ok(());
    }

    for measurement_folder in &measurement_folders {
        process_measurement(
            measurement_folder,
            &output_folder,
            options.skip_voltage,
            calibration.as_ref(),
        )?;
    }

    Ok(())
}

/// Fits every scan of one measurement folder and renders its plots.
fn process_measurement(
    measurement_folder: &Path,
    output_folder: &Path,
    skip_voltage: bool,
    calibration: Option<&Calibration>,
) -> Result<(), Box<dyn Error>> {
    let measurement_name = measurement_folder
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    println!("\nProcessing measurement '{}'...", measurement_name);

    let mut magnetization_data: Vec<TemperatureSeries> = Vec::new();

    for temperature_folder in sorted_temperature_folders(measurement_folder)? {
        let temperature_label = temperature_folder
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut temperature_series = TemperatureSeries {
            label: temperature_label.clone(),
            frequency_hz: Vec::new(),
            amplitude: [Vec::new(), Vec::new(), Vec::new()],
            phase_deg: [Vec::new(), Vec::new(), Vec::new()],
        };

        for (frequency, scan_file) in sorted_scan_files(&temperature_folder)? {
            let scan = match parse_scan_file(&scan_file) {
                Ok(scan) => scan,
                Err(e) => {
                    eprintln!("Warning: Skipping scan '{}': {}", scan_file.display(), e);
                    continue;
                }
            };
            let fit = match fit_voltage(&scan, calibration) {
                Ok(fit) => fit,
                Err(e) => {
                    eprintln!(
                        "Warning: Voltage fit failed for '{}': {}",
                        scan_file.display(),
                        e
                    );
                    continue;
                }
            };

            if !skip_voltage {
                let scan_stem = scan_file
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let voltage_plot_path = output_folder
                    .join("voltage")
                    .join(&measurement_name)
                    .join(&temperature_label)
                    .join(format!("{}.png", scan_stem));
                plot_voltage(&scan, &fit, &voltage_plot_path)?;
            }

            temperature_series.frequency_hz.push(frequency);
            for component in 0..3 {
                temperature_series.amplitude[component].push(fit.amplitude[component]);
                temperature_series.phase_deg[component].push(fit.phase_deg[component]);
            }
        }

        if temperature_series.frequency_hz.is_empty() {
            eprintln!(
                "Warning: No usable scans in '{}', skipping temperature.",
                temperature_folder.display()
            );
            continue;
        }
        magnetization_data.push(temperature_series);
    }

    let magnetization_plot_path = output_folder
        .join("magnetization")
        .join(format!("{}.png", measurement_name));
    plot_magnetization(&magnetization_data, &measurement_name, &magnetization_plot_path)
}

/// Temperature subfolders ordered by their numeric kelvin value.
fn sorted_temperature_folders(
    measurement_folder: &Path,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut folders: Vec<(f64, PathBuf)> = Vec::new();
    for entry in fs::read_dir(measurement_folder)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(kelvin) = name
            .strip_suffix('K')
            .and_then(|value| value.parse::<f64>().ok())
        else {
            eprintln!(
                "Warning: Ignoring folder '{}': name is not a temperature label.",
                path.display()
            );
            continue;
        };
        folders.push((kelvin, path));
    }
    folders.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(folders.into_iter().map(|(_, path)| path).collect())
}

/// Scan files of a temperature folder with their drive frequency, ordered
/// by frequency. The frequency is the numeric file stem before "Hz".
fn sorted_scan_files(temperature_folder: &Path) -> Result<Vec<(f64, PathBuf)>, Box<dyn Error>> {
    let mut files: Vec<(f64, PathBuf)> = Vec::new();
    for entry in fs::read_dir(temperature_folder)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("txt") {
            continue;
        }
        let frequency = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.strip_suffix("Hz"))
            .and_then(|value| value.parse::<f64>().ok());
        match frequency {
            Some(frequency) => files.push((frequency, path)),
            None => {
                eprintln!(
                    "Warning: Ignoring file '{}': stem is not '<freq>Hz'.",
                    path.display()
                );
            }
        }
    }
    files.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(files)
}

// src/main.rs

// src/plot_functions/plot_voltage.rs

use std::error::Error;
use std::fs;
use std::path::Path;

use crate::constants::{
    COLOR_VOLTAGE_DATA, COLOR_VOLTAGE_FIT, LINE_WIDTH_PLOT, VOLTAGE_PLOT_HEIGHT,
    VOLTAGE_PLOT_WIDTH, VOLTS_TO_MILLIVOLTS,
};
use crate::data_analysis::voltage_fit::VoltageFit;
use crate::data_input::scan_data::ScanData;
use crate::plot_framework::{calculate_range, draw_grid_plot, PanelConfig, PlotSeries};

/// Generates the two-panel voltage plot of one scan: measured X and Y
/// channel millivolts versus sample position, with the fitted curves.
pub fn plot_voltage(
    scan: &ScanData,
    fit: &VoltageFit,
    output_path: &Path,
) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let root_name = output_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let channels = [
        ("X Channel (mV)", &scan.x_volts, &fit.x_fit),
        ("Y Channel (mV)", &scan.y_volts, &fit.y_fit),
    ];

    let mut panels: Vec<Option<PanelConfig>> = Vec::new();
    for (y_label, measured, fitted) in channels {
        let data_series: Vec<(f64, f64)> = scan
            .position_mm
            .iter()
            .zip(measured.iter())
            .map(|(&p, &v)| (p, v * VOLTS_TO_MILLIVOLTS))
            .collect();
        let fit_series: Vec<(f64, f64)> = scan
            .position_mm
            .iter()
            .zip(fitted.iter())
            .map(|(&p, &v)| (p, v * VOLTS_TO_MILLIVOLTS))
            .collect();

        let mut pos_min = f64::INFINITY;
        let mut pos_max = f64::NEG_INFINITY;
        let mut val_min = f64::INFINITY;
        let mut val_max = f64::NEG_INFINITY;
        for &(p, v) in data_series.iter().chain(fit_series.iter()) {
            pos_min = pos_min.min(p);
            pos_max = pos_max.max(p);
            val_min = val_min.min(v);
            val_max = val_max.max(v);
        }

        if pos_min.is_infinite() || val_min.is_infinite() {
            panels.push(None);
            continue;
        }

        let (value_min, value_max) = calculate_range(val_min, val_max);
        panels.push(Some(PanelConfig {
            title: y_label.trim_end_matches(" (mV)").to_string(),
            x_range: pos_min..pos_max.max(pos_min + 1e-9),
            y_range: value_min..value_max,
            log_x: false,
            series: vec![
                PlotSeries {
                    data: fit_series,
                    label: "Fit".to_string(),
                    color: *COLOR_VOLTAGE_FIT,
                    stroke_width: LINE_WIDTH_PLOT,
                    markers: false,
                },
                PlotSeries {
                    data: data_series,
                    label: "Measured".to_string(),
                    color: *COLOR_VOLTAGE_DATA,
                    stroke_width: LINE_WIDTH_PLOT,
                    markers: true,
                },
            ],
            x_label: "Position (mm)".to_string(),
            y_label: y_label.to_string(),
        }));
    }

    draw_grid_plot(
        output_path,
        &root_name,
        "Voltage",
        (VOLTAGE_PLOT_WIDTH, VOLTAGE_PLOT_HEIGHT),
        (1, 2),
        move |panel_index| panels.get(panel_index).cloned().flatten(),
    )
}

// src/plot_functions/plot_voltage.rs

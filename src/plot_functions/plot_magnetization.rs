// src/plot_functions/plot_magnetization.rs

use plotters::style::{Color, Palette, Palette99, RGBColor};
use std::error::Error;
use std::fs;
use std::path::Path;

use crate::constants::{
    LINE_WIDTH_PLOT, MAGNETIZATION_PLOT_HEIGHT, MAGNETIZATION_PLOT_WIDTH,
};
use crate::plot_framework::{calculate_range, draw_grid_plot, PanelConfig, PlotSeries};

/// Fitted amplitudes and phases of one temperature folder, ordered by
/// drive frequency. Component index 0 is the baseline, 1 and 2 the peaks.
#[derive(Debug, Clone)]
pub struct TemperatureSeries {
    /// Temperature folder name, e.g. "300K"; used as the legend label.
    pub label: String,
    pub frequency_hz: Vec<f64>,
    pub amplitude: [Vec<f64>; 3],
    pub phase_deg: [Vec<f64>; 3],
}

const COMPONENT_NAMES: [&str; 3] = ["Baseline", "Peak #1", "Peak #2"];

/// Divides each amplitude by its drive frequency and rescales the curves
/// to a common unit: baseline curves by the largest first-frequency
/// baseline across temperatures, both peak curves by the largest
/// first-frequency peak magnitude across temperatures.
pub fn normalized_amplitudes(series: &[TemperatureSeries]) -> Vec<[Vec<f64>; 3]> {
    let mut per_frequency: Vec<[Vec<f64>; 3]> = series
        .iter()
        .map(|temperature| {
            let scale = |component: &Vec<f64>| -> Vec<f64> {
                component
                    .iter()
                    .zip(&temperature.frequency_hz)
                    .map(|(&amp, &freq)| amp / freq)
                    .collect()
            };
            [
                scale(&temperature.amplitude[0]),
                scale(&temperature.amplitude[1]),
                scale(&temperature.amplitude[2]),
            ]
        })
        .collect();

    let first_value = |curve: &Vec<f64>| curve.first().copied().unwrap_or(0.0);

    let max_baseline = per_frequency
        .iter()
        .map(|curves| first_value(&curves[0]))
        .fold(f64::NEG_INFINITY, f64::max);
    let max_peaks = per_frequency
        .iter()
        .flat_map(|curves| [first_value(&curves[1]).abs(), first_value(&curves[2]).abs()])
        .fold(f64::NEG_INFINITY, f64::max);

    for curves in &mut per_frequency {
        if max_baseline.is_finite() && max_baseline != 0.0 {
            for value in &mut curves[0] {
                *value /= max_baseline;
            }
        }
        if max_peaks.is_finite() && max_peaks != 0.0 {
            for component in 1..3 {
                for value in &mut curves[component] {
                    *value /= max_peaks;
                }
            }
        }
    }

    per_frequency
}

fn temperature_color(index: usize) -> RGBColor {
    let rgba = Palette99::pick(index).to_rgba();
    RGBColor(rgba.0, rgba.1, rgba.2)
}

/// Generates the magnetization summary plot of one measurement: a 3x2 grid
/// of normalized amplitude and phase versus frequency, one colored series
/// per temperature, log-frequency axis.
pub fn plot_magnetization(
    series: &[TemperatureSeries],
    measurement_name: &str,
    output_path: &Path,
) -> Result<(), Box<dyn Error>> {
    if series.is_empty() {
        return Err(format!(
            "measurement '{}' has no fitted temperature data to plot",
            measurement_name
        )
        .into());
    }
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let normalized = normalized_amplitudes(series);

    // Shared log-frequency range across every panel.
    let mut freq_min = f64::INFINITY;
    let mut freq_max = f64::NEG_INFINITY;
    for temperature in series {
        for &freq in &temperature.frequency_hz {
            if freq > 0.0 {
                freq_min = freq_min.min(freq);
                freq_max = freq_max.max(freq);
            }
        }
    }
    if !freq_min.is_finite() {
        return Err(format!(
            "measurement '{}' has no positive drive frequencies",
            measurement_name
        )
        .into());
    }
    let x_range = (freq_min * 0.9)..(freq_max * 1.1);

    // Panels are row-major: amplitude left, phase right, one row per
    // component (baseline, peak 1, peak 2).
    let mut panels: Vec<Option<PanelConfig>> = Vec::new();
    for component in 0..3 {
        for phase_column in [false, true] {
            let mut val_min = f64::INFINITY;
            let mut val_max = f64::NEG_INFINITY;
            let mut panel_series: Vec<PlotSeries> = Vec::new();

            for (temp_index, temperature) in series.iter().enumerate() {
                let values: &[f64] = if phase_column {
                    &temperature.phase_deg[component]
                } else {
                    &normalized[temp_index][component]
                };

                let data: Vec<(f64, f64)> = temperature
                    .frequency_hz
                    .iter()
                    .zip(values)
                    .filter(|(&freq, _)| freq > 0.0)
                    .map(|(&freq, &value)| (freq, value))
                    .collect();

                for &(_, value) in &data {
                    val_min = val_min.min(value);
                    val_max = val_max.max(value);
                }

                panel_series.push(PlotSeries {
                    data,
                    label: temperature.label.clone(),
                    color: temperature_color(temp_index),
                    stroke_width: LINE_WIDTH_PLOT,
                    markers: false,
                });
            }

            if val_min.is_infinite() {
                panels.push(None);
                continue;
            }

            let (value_min, value_max) = calculate_range(val_min, val_max);
            let (title, y_label) = if phase_column {
                (
                    format!("Phase {}", COMPONENT_NAMES[component]),
                    "Phase (°)".to_string(),
                )
            } else {
                (
                    format!("Amplitude {}", COMPONENT_NAMES[component]),
                    "Amplitude / Frequency (AU)".to_string(),
                )
            };

            panels.push(Some(PanelConfig {
                title,
                x_range: x_range.clone(),
                y_range: value_min..value_max,
                log_x: true,
                series: panel_series,
                x_label: "Frequency (Hz)".to_string(),
                y_label,
            }));
        }
    }

    draw_grid_plot(
        output_path,
        measurement_name,
        "Magnetization",
        (MAGNETIZATION_PLOT_WIDTH, MAGNETIZATION_PLOT_HEIGHT),
        (3, 2),
        move |panel_index| panels.get(panel_index).cloned().flatten(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(label: &str, freqs: &[f64], baseline: &[f64], p1: &[f64], p2: &[f64]) -> TemperatureSeries {
        TemperatureSeries {
            label: label.to_string(),
            frequency_hz: freqs.to_vec(),
            amplitude: [baseline.to_vec(), p1.to_vec(), p2.to_vec()],
            phase_deg: [vec![0.0; freqs.len()], vec![0.0; freqs.len()], vec![0.0; freqs.len()]],
        }
    }

    #[test]
    fn largest_first_frequency_baseline_normalizes_to_one() {
        let warm = series("300K", &[10.0, 100.0], &[2.0, 10.0], &[1.0, 5.0], &[-1.0, -5.0]);
        let cold = series("4K", &[10.0, 100.0], &[1.0, 8.0], &[0.5, 4.0], &[-0.5, -4.0]);

        let normalized = normalized_amplitudes(&[warm, cold]);

        // Warm baseline starts at 2.0/10.0 = 0.2, the largest first value.
        assert!((normalized[0][0][0] - 1.0).abs() < 1e-12);
        assert!((normalized[1][0][0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn peaks_share_a_common_scale() {
        let only = series("77K", &[10.0, 100.0], &[4.0, 20.0], &[1.0, 5.0], &[-2.0, -10.0]);
        let normalized = normalized_amplitudes(&[only]);

        // Peak scale is |first peak2| = 0.2; peak1 starts at 0.1 of frequency units.
        assert!((normalized[0][1][0] - 0.5).abs() < 1e-12);
        assert!((normalized[0][2][0] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn amplitudes_are_divided_by_frequency_before_scaling() {
        let only = series("77K", &[10.0, 100.0], &[1.0, 10.0], &[1.0, 10.0], &[-1.0, -10.0]);
        let normalized = normalized_amplitudes(&[only]);

        // 1.0/10Hz and 10.0/100Hz coincide after the frequency division,
        // so the baseline curve is flat at 1.0 once scaled.
        assert!((normalized[0][0][0] - 1.0).abs() < 1e-12);
        assert!((normalized[0][0][1] - 1.0).abs() < 1e-12);
    }
}

// src/plot_functions/plot_magnetization.rs

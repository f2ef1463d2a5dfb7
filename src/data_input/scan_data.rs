// src/data_input/scan_data.rs

use ndarray::Array1;

/// One position scan of the lock-in amplifier at a fixed drive frequency.
///
/// Positions are re-zeroed to the first row and converted to millimeters.
/// The magnitude and phase columns are the instrument's own polar reading
/// of the X/Y channels; they are carried along for completeness.
#[derive(Debug, Clone)]
pub struct ScanData {
    pub position_mm: Array1<f64>,
    pub x_volts: Array1<f64>,
    pub y_volts: Array1<f64>,
    pub magnitude_volts: Array1<f64>,
    pub phase_deg: Array1<f64>,
    /// Finite bath temperature samples (kelvin) found in the scan.
    pub temperature_samples: Vec<f64>,
}

impl ScanData {
    pub fn len(&self) -> usize {
        self.position_mm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position_mm.is_empty()
    }

    /// Mean of the finite temperature samples, if any were recorded.
    pub fn mean_temperature(&self) -> Option<f64> {
        if self.temperature_samples.is_empty() {
            return None;
        }
        let sum: f64 = self.temperature_samples.iter().sum();
        Some(sum / self.temperature_samples.len() as f64)
    }
}

// src/data_input/scan_data.rs

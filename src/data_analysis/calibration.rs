// src/data_analysis/calibration.rs

/// Fixed coil geometry for one lock-in channel, from a calibration run.
///
/// The centers are offsets relative to a shared position shift, so a
/// calibrated fit only has to find the shift, not all four centers.
#[derive(Debug, Clone, Copy)]
pub struct ChannelCalibration {
    pub center_offsets_mm: [f64; 4],
    pub widths_mm: [f64; 4],
}

/// Calibration of both lock-in channels.
#[derive(Debug, Clone, Copy)]
pub struct Calibration {
    pub x_channel: ChannelCalibration,
    pub y_channel: ChannelCalibration,
}

impl Calibration {
    /// Coil geometry measured on the reference sample.
    pub fn reference() -> Self {
        Self {
            x_channel: ChannelCalibration {
                center_offsets_mm: [
                    -1.31482959e1,
                    -1.87763231e1,
                    -2.52376225e1,
                    -3.07832386e1,
                ],
                widths_mm: [2.66677577, 2.75115124, 2.52019421, 3.20146748],
            },
            y_channel: ChannelCalibration {
                center_offsets_mm: [
                    -1.31740494e1,
                    -1.87372536e1,
                    -2.51468752e1,
                    -3.08226837e1,
                ],
                widths_mm: [2.77568482, 2.87184774, 2.50477186, 3.11997439],
            },
        }
    }
}

// src/data_analysis/calibration.rs

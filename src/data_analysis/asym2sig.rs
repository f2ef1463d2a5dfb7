// src/data_analysis/asym2sig.rs

use ndarray::Array1;
use ndarray_stats::QuantileExt;
use std::error::Error;

use crate::constants::INITIAL_SIGMOID_WIDTH_MM;

/// Number of free parameters of the asymmetric double sigmoid.
pub const N_PARAMS: usize = 11;

// Parameter layout: [u0, umax, umin, xc1, xc2, xc3, xc4, w1, w2, w3, w4].
pub const P_BASELINE: usize = 0;
pub const P_PEAK_MAX: usize = 1;
pub const P_PEAK_MIN: usize = 2;
pub const P_WIDTHS: std::ops::Range<usize> = 7..11;

/// Evaluates the asymmetric double sigmoid at each position.
///
/// The model is the difference of two independent sigmoids, written as
/// hyperbolic tangents: a positive lobe between centers `xc1`/`xc2` and a
/// negative lobe between `xc3`/`xc4`, on top of the baseline `u0`.
pub fn asym2sig(position: &Array1<f64>, params: &[f64]) -> Array1<f64> {
    let (u0, umax, umin) = (params[P_BASELINE], params[P_PEAK_MAX], params[P_PEAK_MIN]);
    let (xc1, xc2, xc3, xc4) = (params[3], params[4], params[5], params[6]);
    let (w1, w2, w3, w4) = (params[7], params[8], params[9], params[10]);

    position.mapv(|p| {
        u0 + umax * (((p - xc1) / w1).tanh() - ((p - xc2) / w2).tanh()) / 2.0
            + umin * (((p - xc3) / w3).tanh() - ((p - xc4) / w4).tanh()) / 2.0
    })
}

/// Initial parameter guess from the channel extrema.
///
/// The positive lobe is centered around the position of the voltage
/// maximum, the negative lobe around the minimum, with lobe half-widths of
/// a quarter of the extrema separation and fixed initial transition widths.
pub fn initial_params(
    position: &Array1<f64>,
    voltage: &Array1<f64>,
) -> Result<[f64; N_PARAMS], Box<dyn Error>> {
    if position.len() != voltage.len() || voltage.len() < 2 {
        return Err("need at least two samples to seed the voltage fit".into());
    }

    let pos_max = position[voltage.argmax()?];
    let pos_min = position[voltage.argmin()?];
    let v_max = *voltage.max()?;
    let v_min = *voltage.min()?;

    let baseline = (v_max + v_min) / 2.0;
    let quarter_span = (pos_min - pos_max) / 4.0;

    Ok([
        baseline,
        v_max - baseline,
        v_min - baseline,
        pos_max - quarter_span,
        pos_max + quarter_span,
        pos_min - quarter_span,
        pos_min + quarter_span,
        INITIAL_SIGMOID_WIDTH_MM,
        INITIAL_SIGMOID_WIDTH_MM,
        INITIAL_SIGMOID_WIDTH_MM,
        INITIAL_SIGMOID_WIDTH_MM,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linspace(start: f64, end: f64, num: usize) -> Array1<f64> {
        Array1::linspace(start, end, num)
    }

    #[test]
    fn baseline_recovered_far_from_lobes() {
        let params = [0.5, 1.0, -1.0, 10.0, 12.0, 20.0, 22.0, 1.0, 1.0, 1.0, 1.0];
        let position = Array1::from(vec![-100.0, 200.0]);
        let values = asym2sig(&position, &params);
        // Both lobes vanish far away from their centers.
        assert!((values[0] - 0.5).abs() < 1e-9);
        assert!((values[1] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn positive_lobe_peaks_between_its_centers() {
        let params = [0.0, 2.0, 0.0, 10.0, 14.0, 30.0, 34.0, 1.0, 1.0, 1.0, 1.0];
        let position = linspace(0.0, 40.0, 401);
        let values = asym2sig(&position, &params);
        let peak_index = values.argmax().unwrap();
        let peak_position = position[peak_index];
        assert!(peak_position > 10.0 && peak_position < 14.0);
        assert!((values[peak_index] - 2.0).abs() < 0.1);
    }

    #[test]
    fn initial_params_bracket_the_extrema() {
        let truth = [0.1, 1.5, -1.2, 8.0, 12.0, 24.0, 28.0, 2.0, 2.0, 2.0, 2.0];
        let position = linspace(0.0, 40.0, 201);
        let voltage = asym2sig(&position, &truth);
        let guess = initial_params(&position, &voltage).unwrap();

        // Baseline guess between the extrema, amplitudes with the right signs.
        assert!(guess[P_PEAK_MAX] > 0.0);
        assert!(guess[P_PEAK_MIN] < 0.0);
        // Positive lobe centers around the maximum, negative around the minimum.
        assert!(guess[3] < guess[4]);
        assert!(guess[5] < guess[6]);
        for w in &guess[P_WIDTHS] {
            assert_eq!(*w, INITIAL_SIGMOID_WIDTH_MM);
        }
    }
}

// src/data_analysis/asym2sig.rs

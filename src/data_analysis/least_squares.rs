// src/data_analysis/least_squares.rs

use ndarray::{Array1, Array2};
use std::error::Error;

use crate::constants::{
    FIT_DAMPING_DECREASE, FIT_DAMPING_INCREASE, FIT_FD_STEP, FIT_INITIAL_DAMPING,
    FIT_MAX_DAMPING, FIT_MAX_ITERATIONS, FIT_TOLERANCE,
};

#[derive(Debug, Clone)]
pub struct FitConfig {
    pub max_iterations: usize,
    /// Relative cost improvement below which the fit is considered converged.
    pub tolerance: f64,
    /// Relative step used for the finite-difference Jacobian.
    pub fd_step: f64,
    pub initial_damping: f64,
    pub damping_increase: f64,
    pub damping_decrease: f64,
    pub max_damping: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_iterations: FIT_MAX_ITERATIONS,
            tolerance: FIT_TOLERANCE,
            fd_step: FIT_FD_STEP,
            initial_damping: FIT_INITIAL_DAMPING,
            damping_increase: FIT_DAMPING_INCREASE,
            damping_decrease: FIT_DAMPING_DECREASE,
            max_damping: FIT_MAX_DAMPING,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FitResult {
    pub params: Array1<f64>,
    /// Final sum of squared residuals.
    pub residual: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Minimizes the squared norm of `residuals` over the parameter vector.
///
/// Levenberg-Marquardt style damped Gauss-Newton: the Jacobian is estimated
/// by forward differences, the damped normal equations are solved for the
/// step, and the damping factor is lowered after an accepted step or raised
/// until one is found. Returns the best parameters seen even when the
/// iteration budget runs out before convergence.
pub fn least_squares<F>(
    residuals: F,
    initial: &Array1<f64>,
    config: &FitConfig,
) -> Result<FitResult, Box<dyn Error>>
where
    F: Fn(&Array1<f64>) -> Array1<f64>,
{
    if initial.is_empty() {
        return Err("least squares fit needs at least one parameter".into());
    }

    let mut params = initial.clone();
    let mut residual_vec = residuals(&params);
    if residual_vec.len() < params.len() {
        return Err(format!(
            "underdetermined fit: {} residuals for {} parameters",
            residual_vec.len(),
            params.len()
        )
        .into());
    }

    let mut cost = residual_vec.dot(&residual_vec);
    let mut damping = config.initial_damping;
    let mut converged = false;
    let mut iterations = 0;

    for iteration in 1..=config.max_iterations {
        iterations = iteration;

        let jacobian = fd_jacobian(&residuals, &params, &residual_vec, config.fd_step);
        let jtj = jacobian.t().dot(&jacobian);
        let gradient = jacobian.t().dot(&residual_vec);

        // Raise the damping until a step lowers the cost.
        let mut step_accepted = false;
        while damping <= config.max_damping {
            let mut damped = jtj.clone();
            for k in 0..params.len() {
                damped[[k, k]] += damping * jtj[[k, k]].max(1e-12);
            }

            let delta = match solve_linear_system(&damped, &gradient) {
                Ok(delta) => delta,
                Err(_) => {
                    damping *= config.damping_increase;
                    continue;
                }
            };

            let candidate = &params - &delta;
            let candidate_residuals = residuals(&candidate);
            let candidate_cost = candidate_residuals.dot(&candidate_residuals);

            if candidate_cost.is_finite() && candidate_cost < cost {
                let improvement = (cost - candidate_cost) / cost.max(f64::MIN_POSITIVE);
                params = candidate;
                residual_vec = candidate_residuals;
                cost = candidate_cost;
                damping = (damping * config.damping_decrease).max(f64::MIN_POSITIVE);
                step_accepted = true;
                if improvement < config.tolerance {
                    converged = true;
                }
                break;
            }
            damping *= config.damping_increase;
        }

        if !step_accepted {
            // No descent direction left at maximum damping.
            converged = true;
            break;
        }
        if converged {
            break;
        }
    }

    Ok(FitResult {
        params,
        residual: cost,
        iterations,
        converged,
    })
}

/// Forward-difference Jacobian of the residual vector.
fn fd_jacobian<F>(
    residuals: &F,
    params: &Array1<f64>,
    base: &Array1<f64>,
    fd_step: f64,
) -> Array2<f64>
where
    F: Fn(&Array1<f64>) -> Array1<f64>,
{
    let mut jacobian = Array2::<f64>::zeros((base.len(), params.len()));
    for j in 0..params.len() {
        let step = fd_step * params[j].abs().max(1.0);
        let mut perturbed = params.clone();
        perturbed[j] += step;
        let shifted = residuals(&perturbed);
        for i in 0..base.len() {
            jacobian[[i, j]] = (shifted[i] - base[i]) / step;
        }
    }
    jacobian
}

/// Solves `a * x = b` by Gaussian elimination with partial pivoting.
fn solve_linear_system(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, Box<dyn Error>> {
    let n = b.len();
    if a.shape() != [n, n] {
        return Err("linear system dimensions mismatch".into());
    }

    let mut matrix = a.clone();
    let mut rhs = b.clone();

    for col in 0..n {
        // Partial pivoting.
        let mut pivot_row = col;
        let mut pivot_mag = matrix[[col, col]].abs();
        for row in col + 1..n {
            let mag = matrix[[row, col]].abs();
            if mag > pivot_mag {
                pivot_row = row;
                pivot_mag = mag;
            }
        }
        if pivot_mag < 1e-300 {
            return Err("singular normal equations in least squares step".into());
        }
        if pivot_row != col {
            for k in 0..n {
                let tmp = matrix[[col, k]];
                matrix[[col, k]] = matrix[[pivot_row, k]];
                matrix[[pivot_row, k]] = tmp;
            }
            rhs.swap(col, pivot_row);
        }

        for row in col + 1..n {
            let factor = matrix[[row, col]] / matrix[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                matrix[[row, k]] -= factor * matrix[[col, k]];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut solution = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let mut acc = rhs[row];
        for k in row + 1..n {
            acc -= matrix[[row, k]] * solution[k];
        }
        solution[row] = acc / matrix[[row, row]];
    }
    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_small_linear_system() {
        let a = ndarray::arr2(&[[2.0, 1.0], [1.0, 3.0]]);
        let b = ndarray::arr1(&[5.0, 10.0]);
        let x = solve_linear_system(&a, &b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn singular_system_is_rejected() {
        let a = ndarray::arr2(&[[1.0, 2.0], [2.0, 4.0]]);
        let b = ndarray::arr1(&[1.0, 2.0]);
        assert!(solve_linear_system(&a, &b).is_err());
    }

    #[test]
    fn recovers_exponential_decay_parameters() {
        let xs: Vec<f64> = (0..50).map(|i| i as f64 * 0.1).collect();
        let truth = (3.0, 0.7);
        let data: Vec<f64> = xs.iter().map(|&x| truth.0 * (-truth.1 * x).exp()).collect();

        let xs_for_fit = xs.clone();
        let residuals = move |p: &Array1<f64>| {
            Array1::from(
                xs_for_fit
                    .iter()
                    .zip(&data)
                    .map(|(&x, &d)| d - p[0] * (-p[1] * x).exp())
                    .collect::<Vec<f64>>(),
            )
        };

        let initial = ndarray::arr1(&[1.0, 0.1]);
        let result = least_squares(residuals, &initial, &FitConfig::default()).unwrap();
        assert!(result.converged);
        assert!((result.params[0] - truth.0).abs() < 1e-4);
        assert!((result.params[1] - truth.1).abs() < 1e-4);
    }

    #[test]
    fn underdetermined_fit_is_rejected() {
        let residuals = |p: &Array1<f64>| Array1::from(vec![p[0]]);
        let initial = ndarray::arr1(&[0.0, 0.0]);
        assert!(least_squares(residuals, &initial, &FitConfig::default()).is_err());
    }
}

// src/data_analysis/least_squares.rs

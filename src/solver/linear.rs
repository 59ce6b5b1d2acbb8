//! Linear solve with staged fallback for singular systems.
//!
//! Stage order: exact LU, LU on a ridge-shifted matrix, SVD least squares.
//! The last stage always produces an answer, so a degenerate network
//! (a floating island, a self-shorted element) yields a least-norm
//! solution instead of an error.

use nalgebra::{DMatrix, DVector};

use super::config::SolverConfig;
use super::mna::MnaMatrix;

/// Which stage produced the solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStage {
    Exact,
    Ridge,
    PseudoInverse,
}

/// Solution vector plus the stage that produced it.
#[derive(Debug, Clone)]
pub struct LinearSolution {
    pub x: Vec<f64>,
    pub stage: SolveStage,
}

/// Solve `A x = b`. Never fails.
pub fn solve_linear(matrix: &mut MnaMatrix, config: &SolverConfig) -> LinearSolution {
    if matrix.size == 0 {
        return LinearSolution {
            x: Vec::new(),
            stage: SolveStage::Exact,
        };
    }

    match try_lu(matrix, config.pivot_tolerance) {
        Ok(x) => {
            return LinearSolution {
                x,
                stage: SolveStage::Exact,
            }
        }
        Err(reason) => tracing::debug!(%reason, "exact solve failed, retrying with ridge"),
    }

    let mut ridged = matrix.clone();
    ridged.add_diagonal(config.ridge);
    match try_lu(&mut ridged, config.pivot_tolerance) {
        Ok(x) => {
            return LinearSolution {
                x,
                stage: SolveStage::Ridge,
            }
        }
        Err(reason) => tracing::debug!(%reason, "ridge solve failed"),
    }

    tracing::warn!(size = matrix.size, "falling back to pseudo-inverse solve");
    LinearSolution {
        x: least_squares(matrix, config.pinv_tolerance),
        stage: SolveStage::PseudoInverse,
    }
}

fn try_lu(matrix: &mut MnaMatrix, tolerance: f64) -> Result<Vec<f64>, String> {
    matrix.factor(tolerance).map_err(|e| e.to_string())?;
    let x = matrix.solve_factored();
    if x.iter().all(|v| v.is_finite()) {
        Ok(x)
    } else {
        Err("non-finite solution".to_string())
    }
}

/// Minimum-norm least-squares solution via SVD.
///
/// Rows are equilibrated first and singular values are cut relative to the
/// largest one, so the cutoff does not depend on the circuit's impedance range.
fn least_squares(matrix: &MnaMatrix, tolerance: f64) -> Vec<f64> {
    let n = matrix.size;
    let mut a = DMatrix::from_row_slice(n, n, &matrix.a);
    let mut b = DVector::from_column_slice(&matrix.b);
    for i in 0..n {
        let scale = matrix.row_scale(i);
        if scale > 0.0 {
            a.row_mut(i).scale_mut(1.0 / scale);
            b[i] /= scale;
        }
    }

    let svd = a.svd(true, true);
    let sigma_max = svd.singular_values.amax();
    let cutoff = tolerance.max(n as f64 * f64::EPSILON) * sigma_max;

    match svd.solve(&b, cutoff) {
        Ok(x) => x.iter().map(|v| if v.is_finite() { *v } else { 0.0 }).collect(),
        Err(reason) => {
            tracing::error!(reason, "SVD solve failed, returning zero solution");
            vec![0.0; n]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_regular_system_solves_exactly() {
        let mut m = MnaMatrix::new(2);
        m.stamp_conductance(Some(0), None, 1.0);
        m.stamp_conductance(Some(0), Some(1), 1.0);
        m.stamp_current_source(None, Some(1), 1.0);
        let sol = solve_linear(&mut m, &SolverConfig::default());
        assert_eq!(sol.stage, SolveStage::Exact);
        assert_abs_diff_eq!(sol.x[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sol.x[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_floating_island_uses_ridge() {
        // Node 0 grounded through 1 ohm with 1A injected; nodes 1-2 float
        let mut m = MnaMatrix::new(3);
        m.stamp_conductance(Some(0), None, 1.0);
        m.stamp_current_source(None, Some(0), 1.0);
        m.stamp_conductance(Some(1), Some(2), 1.0);
        let sol = solve_linear(&mut m, &SolverConfig::default());
        assert_eq!(sol.stage, SolveStage::Ridge);
        assert_abs_diff_eq!(sol.x[0], 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sol.x[1], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sol.x[2], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_ridge_falls_through_to_pseudo_inverse() {
        let mut m = MnaMatrix::new(2);
        m.stamp_conductance(Some(0), None, 2.0);
        m.stamp_current_source(None, Some(0), 4.0);
        let config = SolverConfig::default().with_ridge(0.0);
        let sol = solve_linear(&mut m, &config);
        assert_eq!(sol.stage, SolveStage::PseudoInverse);
        assert_abs_diff_eq!(sol.x[0], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sol.x[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mixed_impedance_network_solves_exactly() {
        // 1 V source on node 0 shunted by 1 uOhm; node 1 is 2 GOhm fed by 1 nA
        let mut m = MnaMatrix::new(3);
        m.stamp_conductance(Some(0), None, 1e6);
        m.stamp_voltage_source(Some(0), None, 2, 1.0);
        m.stamp_conductance(Some(1), None, 5e-10);
        m.stamp_current_source(None, Some(1), 1e-9);
        let sol = solve_linear(&mut m, &SolverConfig::default());
        assert_eq!(sol.stage, SolveStage::Exact);
        assert_abs_diff_eq!(sol.x[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sol.x[1], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sol.x[2], -1e6, epsilon = 1e-6);
    }

    #[test]
    fn test_pseudo_inverse_keeps_small_well_posed_modes() {
        // Node 2 has no path anywhere, so LU fails even with the ridge disabled
        let mut m = MnaMatrix::new(3);
        m.stamp_conductance(Some(0), None, 1e6);
        m.stamp_current_source(None, Some(0), 1.0);
        m.stamp_conductance(Some(1), None, 5e-10);
        m.stamp_current_source(None, Some(1), 1e-9);
        let config = SolverConfig::default().with_ridge(0.0);
        let sol = solve_linear(&mut m, &config);
        assert_eq!(sol.stage, SolveStage::PseudoInverse);
        assert_abs_diff_eq!(sol.x[0], 1e-6, epsilon = 1e-15);
        assert_abs_diff_eq!(sol.x[1], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sol.x[2], 0.0, epsilon = 1e-12);
    }
}

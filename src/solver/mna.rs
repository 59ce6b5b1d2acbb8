//! MNA matrix storage, stamping primitives and dense LU.
//!
//! Node indices are `Option<usize>`: `None` is ground and is never stamped.

use std::fmt;

/// MNA matrix system Ax = b.
#[derive(Debug, Clone)]
pub struct MnaMatrix {
    /// System matrix A (row-major)
    pub a: Vec<f64>,
    /// Source vector b
    pub b: Vec<f64>,
    /// Matrix dimension
    pub size: usize,
    /// LU decomposition of A
    lu: Vec<f64>,
    /// Pivot indices for LU decomposition
    pivots: Vec<usize>,
}

/// LU factorization hit a pivot below tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingularMatrix {
    /// Elimination step at which the pivot vanished
    pub step: usize,
    /// Magnitude of the best pivot found
    pub pivot: f64,
}

impl fmt::Display for SingularMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "singular at step {} (pivot {:.2e})", self.step, self.pivot)
    }
}

impl MnaMatrix {
    /// Create a zeroed system of the given dimension.
    pub fn new(size: usize) -> Self {
        Self {
            a: vec![0.0; size * size],
            b: vec![0.0; size],
            size,
            lu: vec![0.0; size * size],
            pivots: vec![0; size],
        }
    }

    /// Get matrix element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.a[row * self.size + col]
    }

    /// Add to matrix element at (row, col).
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        self.a[row * self.size + col] += value;
    }

    /// Add to source vector element.
    pub fn add_source(&mut self, row: usize, value: f64) {
        self.b[row] += value;
    }

    /// Add `value` to every diagonal entry.
    pub fn add_diagonal(&mut self, value: f64) {
        for i in 0..self.size {
            self.add(i, i, value);
        }
    }

    /// Largest absolute entry in one row of A.
    pub fn row_scale(&self, row: usize) -> f64 {
        self.a[row * self.size..(row + 1) * self.size]
            .iter()
            .fold(0.0_f64, |m, v| m.max(v.abs()))
    }

    /// Stamp a conductance between two nodes.
    /// For a conductance G between nodes n1 and n2:
    ///   A[n1,n1] += G
    ///   A[n2,n2] += G
    ///   A[n1,n2] -= G
    ///   A[n2,n1] -= G
    pub fn stamp_conductance(&mut self, n1: Option<usize>, n2: Option<usize>, g: f64) {
        if let Some(i) = n1 {
            self.add(i, i, g);
        }
        if let Some(j) = n2 {
            self.add(j, j, g);
        }
        if let (Some(i), Some(j)) = (n1, n2) {
            self.add(i, j, -g);
            self.add(j, i, -g);
        }
    }

    /// Stamp the incidence of a branch current: it leaves `n_pos` and enters
    /// `n_neg` (KCL columns), and the branch row reads V[n+] - V[n-].
    fn stamp_branch_incidence(&mut self, n_pos: Option<usize>, n_neg: Option<usize>, br: usize) {
        if let Some(i) = n_pos {
            self.add(br, i, 1.0);
            self.add(i, br, 1.0);
        }
        if let Some(j) = n_neg {
            self.add(br, j, -1.0);
            self.add(j, br, -1.0);
        }
    }

    /// Stamp a voltage source between two nodes with branch current at index br.
    /// V[n+] - V[n-] = E
    pub fn stamp_voltage_source(
        &mut self,
        n_pos: Option<usize>,
        n_neg: Option<usize>,
        br: usize,
        voltage: f64,
    ) {
        self.stamp_branch_incidence(n_pos, n_neg, br);
        self.b[br] = voltage;
    }

    /// Stamp a current source between two nodes.
    /// Current flows from n+ to n- through the source.
    pub fn stamp_current_source(&mut self, n_pos: Option<usize>, n_neg: Option<usize>, current: f64) {
        if let Some(i) = n_pos {
            self.add_source(i, -current);
        }
        if let Some(j) = n_neg {
            self.add_source(j, current);
        }
    }

    /// Stamp a VCVS (Voltage-Controlled Voltage Source).
    /// V[out+] - V[out-] = A * (V[ctrl+] - V[ctrl-])
    pub fn stamp_vcvs(
        &mut self,
        n_out_pos: Option<usize>,
        n_out_neg: Option<usize>,
        n_ctrl_pos: Option<usize>,
        n_ctrl_neg: Option<usize>,
        br: usize,
        gain: f64,
    ) {
        self.stamp_branch_incidence(n_out_pos, n_out_neg, br);

        if let Some(i) = n_ctrl_pos {
            self.add(br, i, -gain);
        }
        if let Some(j) = n_ctrl_neg {
            self.add(br, j, gain);
        }
        self.b[br] = 0.0;
    }

    /// Stamp a VCCS (Voltage-Controlled Current Source).
    /// I(out+ -> out-) = gm * (V[ctrl+] - V[ctrl-])
    pub fn stamp_vccs(
        &mut self,
        n_out_pos: Option<usize>,
        n_out_neg: Option<usize>,
        n_ctrl_pos: Option<usize>,
        n_ctrl_neg: Option<usize>,
        gm: f64,
    ) {
        if let (Some(i), Some(k)) = (n_out_pos, n_ctrl_pos) {
            self.add(i, k, gm);
        }
        if let (Some(i), Some(l)) = (n_out_pos, n_ctrl_neg) {
            self.add(i, l, -gm);
        }
        if let (Some(j), Some(k)) = (n_out_neg, n_ctrl_pos) {
            self.add(j, k, -gm);
        }
        if let (Some(j), Some(l)) = (n_out_neg, n_ctrl_neg) {
            self.add(j, l, gm);
        }
    }

    /// Stamp a CCVS (Current-Controlled Voltage Source).
    /// V[out+] - V[out-] = r * x[ref]
    ///
    /// `r` already includes the orientation sign of the reference branch.
    pub fn stamp_ccvs(
        &mut self,
        n_out_pos: Option<usize>,
        n_out_neg: Option<usize>,
        br: usize,
        ref_col: usize,
        r: f64,
    ) {
        self.stamp_branch_incidence(n_out_pos, n_out_neg, br);
        self.add(br, ref_col, -r);
        self.b[br] = 0.0;
    }

    /// Stamp a CCCS (Current-Controlled Current Source).
    /// I(out+ -> out-) = k * x[ref]
    pub fn stamp_cccs(&mut self, n_out_pos: Option<usize>, n_out_neg: Option<usize>, ref_col: usize, k: f64) {
        if let Some(i) = n_out_pos {
            self.add(i, ref_col, k);
        }
        if let Some(j) = n_out_neg {
            self.add(j, ref_col, -k);
        }
    }

    /// Perform LU decomposition with scaled partial pivoting.
    ///
    /// Each candidate pivot is measured against the largest entry of its own
    /// row in A, so a micro-ohm branch elsewhere in the circuit cannot make a
    /// high-impedance node look singular. A pivot is treated as zero when that
    /// ratio is at most `max(tolerance, n * EPSILON)`.
    pub fn factor(&mut self, tolerance: f64) -> Result<(), SingularMatrix> {
        let n = self.size;
        self.lu.copy_from_slice(&self.a);
        let threshold = tolerance.max(n as f64 * f64::EPSILON);
        let mut scales: Vec<f64> = (0..n).map(|i| self.row_scale(i)).collect();

        for i in 0..n {
            self.pivots[i] = i;
        }

        for k in 0..n {
            // Find pivot, relative to its row scale
            let mut max_val = scaled(self.lu[k * n + k], scales[k]);
            let mut max_row = k;

            for i in (k + 1)..n {
                let val = scaled(self.lu[i * n + k], scales[i]);
                if val > max_val {
                    max_val = val;
                    max_row = i;
                }
            }

            if max_val.is_nan() || max_val <= threshold {
                return Err(SingularMatrix {
                    step: k,
                    pivot: max_val,
                });
            }

            // Swap rows if needed
            if max_row != k {
                self.pivots.swap(k, max_row);
                scales.swap(k, max_row);
                for j in 0..n {
                    self.lu.swap(k * n + j, max_row * n + j);
                }
            }

            // Eliminate
            let pivot = self.lu[k * n + k];
            for i in (k + 1)..n {
                let factor = self.lu[i * n + k] / pivot;
                self.lu[i * n + k] = factor;
                for j in (k + 1)..n {
                    self.lu[i * n + j] -= factor * self.lu[k * n + j];
                }
            }
        }

        Ok(())
    }

    /// Solve using the LU decomposition from the last successful [`factor`](Self::factor).
    pub fn solve_factored(&self) -> Vec<f64> {
        let n = self.size;
        let mut x: Vec<f64> = self.pivots.iter().map(|&p| self.b[p]).collect();

        // Forward substitution (L * y = Pb)
        for i in 0..n {
            for j in 0..i {
                x[i] -= self.lu[i * n + j] * x[j];
            }
        }

        // Back substitution (U * x = y)
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                x[i] -= self.lu[i * n + j] * x[j];
            }
            x[i] /= self.lu[i * n + i];
        }

        x
    }
}

/// `|value| / scale`, with an all-zero row counting as zero.
fn scaled(value: f64, scale: f64) -> f64 {
    if scale > 0.0 {
        value.abs() / scale
    } else {
        0.0
    }
}

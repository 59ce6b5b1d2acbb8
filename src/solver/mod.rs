//! MNA (Modified Nodal Analysis) DC solver.
//!
//! This module provides the numerical engine for DC analysis.
//!
//! ## Modified Nodal Analysis
//!
//! MNA assembles a system of equations Ax = b where:
//! - x contains node voltages and branch currents
//! - A is the conductance/coefficient matrix
//! - b is the source vector
//!
//! The matrix structure is:
//! ```text
//! [ G   B ] [ v ]   [ i ]
//! [ C   D ] [ j ] = [ e ]
//! ```
//!
//! where:
//! - G is the conductance matrix (node equations, VCCS/CCCS terms)
//! - B, C connect voltage-defining branches to nodes
//! - D holds CCVS transresistances and duplicate-branch regularization
//! - v is the vector of non-ground net voltages (lexicographic net order)
//! - j is the vector of branch currents: sources, VCVS, CCVS, ammeters,
//!   then synthesized sensing branches
//! - i is the sum of current sources into each node
//! - e is the vector of voltage source values
//!
//! The pipeline is: resolve nets, gate on eligibility, build, solve
//! (exact, then ridge, then pseudo-inverse), extract.

mod builder;
mod config;
mod extract;
mod linear;
mod mna;
mod thevenin;

pub use builder::{build_system, MnaSystem, ReferenceCurrent, SensingBranch};
pub use config::SolverConfig;
pub use extract::{extract, DcSolution};
pub use linear::{solve_linear, LinearSolution, SolveStage};
pub use mna::{MnaMatrix, SingularMatrix};
pub use thevenin::{thevenin, thevenin_with_config, TheveninResult};

use crate::circuit::{require_dc_eligible, ComponentSpec, NetIndex, NetSpec};
use crate::error::Result;

/// Row-relative perturbation for duplicate voltage-defining branches.
pub const DEFAULT_DUPLICATE_EPSILON: f64 = 1e-12;

/// Diagonal ridge for the second solve attempt.
pub const DEFAULT_RIDGE: f64 = 1e-12;

/// Row-relative LU pivot tolerance.
pub const DEFAULT_PIVOT_TOLERANCE: f64 = 1e-15;

/// Singular value cutoff for the least-squares fallback.
pub const DEFAULT_PINV_TOLERANCE: f64 = 1e-12;

/// Resistance inserted across a Thevenin port for the short-circuit run.
pub const DEFAULT_SHORT_RESISTANCE: f64 = 1e-6;

/// Short-circuit current treated as zero.
pub const DEFAULT_OPEN_CURRENT_THRESHOLD: f64 = 1e-12;

/// Rth reported for an open port.
pub const DEFAULT_OPEN_RESISTANCE: f64 = 1e12;

/// Solve the DC operating point with default tolerances.
pub fn solve_dc(components: &[ComponentSpec], nets: &[NetSpec]) -> Result<DcSolution> {
    solve_dc_with_config(components, nets, &SolverConfig::default())
}

/// Solve the DC operating point.
pub fn solve_dc_with_config(
    components: &[ComponentSpec],
    nets: &[NetSpec],
    config: &SolverConfig,
) -> Result<DcSolution> {
    let _span = tracing::info_span!("dc_solve", components = components.len()).entered();

    let index = NetIndex::resolve(components, nets)?;
    require_dc_eligible(components)?;
    let mut system = build_system(components, &index, config)?;
    let solution = solve_linear(&mut system.matrix, config);

    tracing::debug!(stage = ?solution.stage, "linear solve finished");

    Ok(extract(&system, &index, &solution.x))
}

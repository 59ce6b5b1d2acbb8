//! Numeric tolerances for a solve.

use super::{
    DEFAULT_DUPLICATE_EPSILON, DEFAULT_OPEN_CURRENT_THRESHOLD, DEFAULT_OPEN_RESISTANCE,
    DEFAULT_PINV_TOLERANCE, DEFAULT_PIVOT_TOLERANCE, DEFAULT_RIDGE, DEFAULT_SHORT_RESISTANCE,
};

/// Configuration for the DC solver and Thevenin analyzer.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Diagonal perturbation for duplicate voltage-defining branches,
    /// relative to the largest entry of the perturbed row.
    pub duplicate_epsilon: f64,
    /// Diagonal ridge added on the second solve attempt.
    pub ridge: f64,
    /// Pivot magnitude, relative to its own row, below which LU declares the
    /// matrix singular.
    pub pivot_tolerance: f64,
    /// Singular value cutoff for the pseudo-inverse fallback, relative to the
    /// largest singular value of the row-equilibrated matrix.
    pub pinv_tolerance: f64,
    /// Resistor placed across the port for the short-circuit run (ohms).
    pub short_resistance: f64,
    /// Short-circuit current at or below which the port is considered open (amps).
    pub open_current_threshold: f64,
    /// Rth reported for an open port (ohms).
    pub open_resistance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            duplicate_epsilon: DEFAULT_DUPLICATE_EPSILON,
            ridge: DEFAULT_RIDGE,
            pivot_tolerance: DEFAULT_PIVOT_TOLERANCE,
            pinv_tolerance: DEFAULT_PINV_TOLERANCE,
            short_resistance: DEFAULT_SHORT_RESISTANCE,
            open_current_threshold: DEFAULT_OPEN_CURRENT_THRESHOLD,
            open_resistance: DEFAULT_OPEN_RESISTANCE,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duplicate-branch regularization epsilon.
    pub fn with_duplicate_epsilon(mut self, epsilon: f64) -> Self {
        self.duplicate_epsilon = epsilon;
        self
    }

    /// Set the ridge used on the second solve attempt.
    pub fn with_ridge(mut self, ridge: f64) -> Self {
        self.ridge = ridge;
        self
    }

    /// Set the relative LU pivot tolerance.
    pub fn with_pivot_tolerance(mut self, tolerance: f64) -> Self {
        self.pivot_tolerance = tolerance;
        self
    }

    /// Set the pseudo-inverse singular value cutoff.
    pub fn with_pinv_tolerance(mut self, tolerance: f64) -> Self {
        self.pinv_tolerance = tolerance;
        self
    }

    /// Set the port short resistance used by Thevenin analysis.
    pub fn with_short_resistance(mut self, ohms: f64) -> Self {
        self.short_resistance = ohms;
        self
    }

    /// Set the open-port current threshold and the Rth reported for it.
    pub fn with_open_port(mut self, threshold: f64, resistance: f64) -> Self {
        self.open_current_threshold = threshold;
        self.open_resistance = resistance;
        self
    }
}

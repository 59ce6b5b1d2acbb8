//! # Dcnet Core
//!
//! DC operating-point and Thevenin analysis for lumped-element networks.
//!
//! This library provides:
//! - Validation and indexing of pre-grouped nets, including ground detection
//! - A classifier gating circuits onto the linear DC path
//! - Modified Nodal Analysis (MNA) assembly with independent sources and
//!   all four linear controlled sources (VCVS, VCCS, CCVS, CCCS)
//! - A linear solve that degrades gracefully on singular networks
//! - Thevenin/Norton equivalents of any one-port
//!
//! ## Architecture
//!
//! - [`circuit`] - Request types, net resolution and eligibility
//! - [`components`] - Component models with only the parameters they stamp
//! - [`solver`] - MNA assembly, linear solve, result extraction, Thevenin
//!
//! ## Usage
//!
//! ### Library
//!
//! ```
//! use dcnet_core::{solve_dc, ComponentSpec, SolveRequest};
//!
//! let request = SolveRequest::from_components(vec![
//!     ComponentSpec::new("V1", "vsource_dc").param("dc", 9.0).connect("p", "in").connect("n", "gnd"),
//!     ComponentSpec::new("R1", "resistor").param("value", 3e3).connect("p", "in").connect("n", "n1"),
//!     ComponentSpec::new("R2", "resistor").param("value", 6e3).connect("p", "n1").connect("n", "gnd"),
//! ]);
//! let solution = solve_dc(&request.components, &request.nets).unwrap();
//! assert!((solution.voltage("n1").unwrap() - 6.0).abs() < 1e-9);
//! ```
//!
//! ### Native CLI
//!
//! ```bash
//! dcnet request.json --pretty
//! RUST_LOG=dcnet_core=debug dcnet request.json --port out
//! ```
//!
//! ## Solve Method
//!
//! 1. Resolve nets and pick the ground net
//! 2. Stamp every component into A and b, synthesizing zero-volt sensing
//!    branches for current-controlled sources that need them
//! 3. Solve Ax = b: exact LU, then LU with a diagonal ridge, then an SVD
//!    pseudo-inverse
//! 4. Map x back to net voltages and component currents

pub mod circuit;
pub mod components;
pub mod error;
pub mod solver;

// Re-export main types for convenience
pub use circuit::{ComponentSpec, NetSpec, Port, SolveRequest};
pub use error::{DcError, Result};
pub use solver::{solve_dc, solve_dc_with_config, thevenin, DcSolution, SolverConfig, TheveninResult};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::{solve_dc_json, thevenin_json};

/// Result of running a [`SolveRequest`].
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Analysis {
    Dc(DcSolution),
    Thevenin(TheveninResult),
}

impl SolveRequest {
    /// Run a Thevenin analysis when a port is present, a plain DC solve otherwise.
    pub fn run(&self, config: &SolverConfig) -> Result<Analysis> {
        match &self.port {
            Some(port) => {
                solver::thevenin_with_config(&self.components, &self.nets, port, config).map(Analysis::Thevenin)
            }
            None => solve_dc_with_config(&self.components, &self.nets, config).map(Analysis::Dc),
        }
    }
}

//! Circuit description, net resolution and eligibility.
//!
//! This module turns the caller's component and net listings into a
//! validated [`NetIndex`] and decides whether the linear DC path can take
//! the circuit at all.

mod classify;
mod netlist;
mod resolve;
mod types;

pub use classify::{classify, is_dc_eligible, require_dc_eligible, Eligibility};
pub use netlist::{derive_nets, ComponentSpec, NetSpec, Port, SolveRequest};
pub use resolve::{NetIndex, GROUND_NET};
pub use types::*;

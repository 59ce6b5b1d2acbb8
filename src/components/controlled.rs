//! Linear controlled sources.
//!
//! | Kind | Output | Control |
//! |------|--------|---------|
//! | VCVS | voltage, own branch | voltage across `cp`/`cn` |
//! | VCCS | current | voltage across `cp`/`cn` |
//! | CCVS | voltage, own branch | current through the `cp`/`cn` port |
//! | CCCS | current | current through the `cp`/`cn` port |
//!
//! Current-controlled sources read a reference current from a branch
//! unknown; the builder decides which one.

use crate::circuit::{BranchId, ComponentId, NetId};

/// Voltage-controlled voltage source: V(p, n) = gain * V(cp, cn).
#[derive(Debug, Clone)]
pub struct Vcvs {
    pub id: ComponentId,
    pub name: String,
    pub nodes: [NetId; 2],
    pub control: [NetId; 2],
    pub gain: f64,
    pub branch: BranchId,
}

impl Vcvs {
    pub fn new(
        id: ComponentId,
        name: String,
        nodes: [NetId; 2],
        control: [NetId; 2],
        gain: f64,
        branch: BranchId,
    ) -> Self {
        Self {
            id,
            name,
            nodes,
            control,
            gain,
            branch,
        }
    }
}

/// Voltage-controlled current source: I(p -> n) = gm * V(cp, cn).
#[derive(Debug, Clone)]
pub struct Vccs {
    pub id: ComponentId,
    pub name: String,
    pub nodes: [NetId; 2],
    pub control: [NetId; 2],
    pub gm: f64,
}

impl Vccs {
    pub fn new(id: ComponentId, name: String, nodes: [NetId; 2], control: [NetId; 2], gm: f64) -> Self {
        Self {
            id,
            name,
            nodes,
            control,
            gm,
        }
    }

    /// Output current for a given control voltage.
    pub fn current(&self, v_ctrl: f64) -> f64 {
        self.gm * v_ctrl
    }
}

/// Current-controlled voltage source: V(p, n) = gain * I(cp -> cn).
///
/// Results report the current it delivers through its own branch, not
/// `gain * I_ref`, which is a voltage and would break KCL at its terminals.
#[derive(Debug, Clone)]
pub struct Ccvs {
    pub id: ComponentId,
    pub name: String,
    pub nodes: [NetId; 2],
    pub control: [NetId; 2],
    /// Transresistance in ohms
    pub gain: f64,
    pub branch: BranchId,
}

impl Ccvs {
    pub fn new(
        id: ComponentId,
        name: String,
        nodes: [NetId; 2],
        control: [NetId; 2],
        gain: f64,
        branch: BranchId,
    ) -> Self {
        Self {
            id,
            name,
            nodes,
            control,
            gain,
            branch,
        }
    }
}

/// Current-controlled current source: I(p -> n) = gain * I(cp -> cn).
#[derive(Debug, Clone)]
pub struct Cccs {
    pub id: ComponentId,
    pub name: String,
    pub nodes: [NetId; 2],
    pub control: [NetId; 2],
    pub gain: f64,
}

impl Cccs {
    pub fn new(id: ComponentId, name: String, nodes: [NetId; 2], control: [NetId; 2], gain: f64) -> Self {
        Self {
            id,
            name,
            nodes,
            control,
            gain,
        }
    }

    /// Output current for a given reference current.
    pub fn current(&self, i_ref: f64) -> f64 {
        self.gain * i_ref
    }
}

//! Mapping a solution vector back to named voltages and currents.
//!
//! Current sign conventions:
//! - resistors, current sources, VCCS, CCCS and ammeter probes report the
//!   current flowing from `p` to `n` through the element;
//! - DC voltage sources, VCVS and CCVS report the current they deliver out
//!   of `p` into the rest of the network.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::builder::MnaSystem;
use crate::circuit::{NetId, NetIndex, GROUND_NET};
use crate::components::Component;

/// Result of a DC solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcSolution {
    /// Net name -> voltage; ground appears under its own name and as `gnd`
    pub node_voltages: BTreeMap<String, f64>,
    /// Component id -> branch current
    pub branch_currents: BTreeMap<String, f64>,
}

impl DcSolution {
    /// Voltage of a net by name.
    pub fn voltage(&self, net: &str) -> Option<f64> {
        self.node_voltages.get(net).copied()
    }

    /// Branch current of a component by id.
    pub fn current(&self, component: &str) -> Option<f64> {
        self.branch_currents.get(component).copied()
    }
}

/// Build the named result maps from a solution vector.
pub fn extract(system: &MnaSystem, index: &NetIndex, x: &[f64]) -> DcSolution {
    let voltage = |net: NetId| index.node_index(net).map_or(0.0, |i| x[i]);
    let branch = |b| x[system.branch_index(b)];

    let mut node_voltages = BTreeMap::new();
    node_voltages.insert(index.ground().to_string(), 0.0);
    node_voltages.insert(GROUND_NET.to_string(), 0.0);
    for (i, name) in index.names().iter().enumerate() {
        node_voltages.insert(name.clone(), x[i]);
    }

    let mut branch_currents = BTreeMap::new();
    for comp in &system.components {
        let current = match comp {
            Component::Resistor(r) => Some(r.current(voltage(r.nodes[0]), voltage(r.nodes[1]))),
            Component::VoltageSource(v) => Some(-branch(v.branch)),
            Component::CurrentSource(i) => Some(i.current()),
            Component::Vcvs(e) => Some(-branch(e.branch)),
            Component::Vccs(g) => Some(g.current(voltage(g.control[0]) - voltage(g.control[1]))),
            Component::Ccvs(h) => Some(-branch(h.branch)),
            Component::Cccs(f) => system
                .reference(f.id)
                .map(|r| f.current(r.sign() * branch(r.branch()))),
            Component::CurrentProbe(p) => p.branch.map(branch),
            Component::Ground(_) | Component::VoltageProbe(_) => None,
        };
        if let Some(current) = current {
            branch_currents.insert(comp.name().to_string(), current);
        }
    }

    DcSolution {
        node_voltages,
        branch_currents,
    }
}

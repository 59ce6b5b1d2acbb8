//! Ground and measurement markers.

use crate::circuit::{BranchId, ComponentId, NetId};

/// Ground symbol. Stamps nothing; its net becomes the reference.
#[derive(Debug, Clone)]
pub struct Ground {
    pub id: ComponentId,
    pub name: String,
    pub node: NetId,
}

impl Ground {
    pub fn new(id: ComponentId, name: String, node: NetId) -> Self {
        Self { id, name, node }
    }
}

/// Voltage probe. Reads a net; stamps nothing.
#[derive(Debug, Clone)]
pub struct VoltageProbe {
    pub id: ComponentId,
    pub name: String,
    pub node: Option<NetId>,
}

impl VoltageProbe {
    pub fn new(id: ComponentId, name: String, node: Option<NetId>) -> Self {
        Self { id, name, node }
    }
}

/// Current probe.
///
/// Wired in series (both terminals connected) it is an ammeter: a zero-volt
/// source with its own branch unknown. Otherwise it is a passive marker.
#[derive(Debug, Clone)]
pub struct CurrentProbe {
    pub id: ComponentId,
    pub name: String,
    pub nodes: Option<[NetId; 2]>,
    pub branch: Option<BranchId>,
}

impl CurrentProbe {
    /// An in-series ammeter between `nodes[0]` and `nodes[1]`.
    pub fn ammeter(id: ComponentId, name: String, nodes: [NetId; 2], branch: BranchId) -> Self {
        Self {
            id,
            name,
            nodes: Some(nodes),
            branch: Some(branch),
        }
    }

    /// A probe that is not in series with anything.
    pub fn marker(id: ComponentId, name: String) -> Self {
        Self {
            id,
            name,
            nodes: None,
            branch: None,
        }
    }

    pub fn is_ammeter(&self) -> bool {
        self.branch.is_some()
    }
}

//! Linear passive components.

use crate::circuit::{ComponentId, NetId};

/// A resistor component.
#[derive(Debug, Clone)]
pub struct Resistor {
    pub id: ComponentId,
    pub name: String,
    pub nodes: [NetId; 2], // [positive, negative]
    pub resistance: f64,
}

impl Resistor {
    /// Create a new resistor.
    pub fn new(id: ComponentId, name: String, nodes: [NetId; 2], resistance: f64) -> Self {
        Self {
            id,
            name,
            nodes,
            resistance,
        }
    }

    /// Get the conductance (1/R).
    pub fn conductance(&self) -> f64 {
        1.0 / self.resistance
    }

    /// Current flowing from the positive to the negative terminal.
    pub fn current(&self, v_pos: f64, v_neg: f64) -> f64 {
        (v_pos - v_neg) / self.resistance
    }
}

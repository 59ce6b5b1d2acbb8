//! Solve request data as handed over by the editor boundary.
//!
//! These types mirror the JSON wire shape one to one, so a request can be
//! deserialized straight into them. No validation happens here; see
//! [`NetIndex::resolve`](super::NetIndex::resolve) for that.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// One placed component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    /// Unique component id
    pub id: String,
    /// Type tag, e.g. `resistor` or `vcvs`
    #[serde(rename = "type")]
    pub component_type: String,
    /// Named real-valued parameters (`value`, `dc`, `gain`, ...)
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
    /// Terminal name -> net name
    #[serde(default)]
    pub connections: BTreeMap<String, String>,
}

impl ComponentSpec {
    /// Create a component with no parameters and no connections.
    pub fn new(id: impl Into<String>, component_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            component_type: component_type.into(),
            parameters: BTreeMap::new(),
            connections: BTreeMap::new(),
        }
    }

    /// Set a parameter.
    pub fn param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    /// Connect a terminal to a net.
    pub fn connect(mut self, terminal: impl Into<String>, net: impl Into<String>) -> Self {
        self.connections.insert(terminal.into(), net.into());
        self
    }
}

/// A group of terminals at the same potential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetSpec {
    pub name: String,
    /// `(component id, terminal name)` pairs
    pub nodes: Vec<(String, String)>,
}

/// A one-port for Thevenin analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub positive: String,
    /// Defaults to the ground net when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative: Option<String>,
}

impl Port {
    /// A port measured against ground.
    pub fn to_ground(positive: impl Into<String>) -> Self {
        Self {
            positive: positive.into(),
            negative: None,
        }
    }

    /// A port between two nets.
    pub fn between(positive: impl Into<String>, negative: impl Into<String>) -> Self {
        Self {
            positive: positive.into(),
            negative: Some(negative.into()),
        }
    }
}

/// A complete solve request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveRequest {
    pub components: Vec<ComponentSpec>,
    /// Derived from component connections when omitted
    #[serde(default)]
    pub nets: Vec<NetSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<Port>,
}

impl SolveRequest {
    /// Build a request whose nets are derived from the component connections.
    pub fn from_components(components: Vec<ComponentSpec>) -> Self {
        let nets = derive_nets(&components);
        Self {
            components,
            nets,
            port: None,
        }
    }

    /// Attach a Thevenin port.
    pub fn with_port(mut self, port: Port) -> Self {
        self.port = Some(port);
        self
    }

    /// Fill in the net list from component connections if the caller left it empty.
    pub fn ensure_nets(&mut self) {
        if self.nets.is_empty() {
            self.nets = derive_nets(&self.components);
        }
    }
}

/// Group component terminals into nets by the net names they declare.
///
/// Nets come out in first-seen order; members keep component order.
pub fn derive_nets(components: &[ComponentSpec]) -> Vec<NetSpec> {
    let mut order: Vec<String> = Vec::new();
    let mut members: HashMap<String, Vec<(String, String)>> = HashMap::new();

    for comp in components {
        for (terminal, net) in &comp.connections {
            let entry = members.entry(net.clone()).or_insert_with(|| {
                order.push(net.clone());
                Vec::new()
            });
            entry.push((comp.id.clone(), terminal.clone()));
        }
    }

    order
        .into_iter()
        .map(|name| {
            let nodes = members.remove(&name).unwrap_or_default();
            NetSpec { name, nodes }
        })
        .collect()
}

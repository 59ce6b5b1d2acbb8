//! Component models for DC analysis.
//!
//! This module provides models for every component the linear DC path can stamp:
//! - Linear: Resistor
//! - Sources: DC Voltage Source, DC Current Source
//! - Controlled: VCVS, VCCS, CCVS, CCCS
//! - Markers: Ground, Voltage Probe, Current Probe
//!
//! Each model carries only the parameters its stamp needs. The full palette
//! tag set lives in [`ComponentKind`] so the classifier can name components
//! the DC path rejects.

mod controlled;
mod linear;
mod probes;
mod sources;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use controlled::{Cccs, Ccvs, Vccs, Vcvs};
pub use linear::Resistor;
pub use probes::{CurrentProbe, Ground, VoltageProbe};
pub use sources::{CurrentSource, VoltageSource};

use crate::circuit::{BranchId, ComponentId, ComponentSpec, NetId, NetIndex};
use crate::error::{DcError, Result};

/// Accepted names for the positive terminal.
pub const POS_TERMINALS: &[&str] = &["p", "pos", "positive", "+"];
/// Accepted names for the negative terminal.
pub const NEG_TERMINALS: &[&str] = &["n", "neg", "negative", "-"];
/// Accepted names for the positive control terminal.
pub const CTRL_POS_TERMINALS: &[&str] = &["cp", "ctrl_p", "control_pos"];
/// Accepted names for the negative control terminal.
pub const CTRL_NEG_TERMINALS: &[&str] = &["cn", "ctrl_n", "control_neg"];

/// Type tag of a palette component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Resistor,
    Capacitor,
    Inductor,
    VsourceDc,
    VsourceAc,
    IsourceDc,
    IsourceAc,
    Vcvs,
    Ccvs,
    Vccs,
    Cccs,
    Ground,
    VoltageProbe,
    CurrentProbe,
}

impl ComponentKind {
    /// All palette kinds.
    pub const ALL: [ComponentKind; 14] = [
        ComponentKind::Resistor,
        ComponentKind::Capacitor,
        ComponentKind::Inductor,
        ComponentKind::VsourceDc,
        ComponentKind::VsourceAc,
        ComponentKind::IsourceDc,
        ComponentKind::IsourceAc,
        ComponentKind::Vcvs,
        ComponentKind::Ccvs,
        ComponentKind::Vccs,
        ComponentKind::Cccs,
        ComponentKind::Ground,
        ComponentKind::VoltageProbe,
        ComponentKind::CurrentProbe,
    ];

    /// Wire tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Resistor => "resistor",
            ComponentKind::Capacitor => "capacitor",
            ComponentKind::Inductor => "inductor",
            ComponentKind::VsourceDc => "vsource_dc",
            ComponentKind::VsourceAc => "vsource_ac",
            ComponentKind::IsourceDc => "isource_dc",
            ComponentKind::IsourceAc => "isource_ac",
            ComponentKind::Vcvs => "vcvs",
            ComponentKind::Ccvs => "ccvs",
            ComponentKind::Vccs => "vccs",
            ComponentKind::Cccs => "cccs",
            ComponentKind::Ground => "ground",
            ComponentKind::VoltageProbe => "voltage_probe",
            ComponentKind::CurrentProbe => "current_probe",
        }
    }

    /// Look up a kind by wire tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == tag)
    }

    /// Look up the kind of a component, failing on unknown tags.
    pub fn parse(spec: &ComponentSpec) -> Result<Self> {
        Self::from_tag(&spec.component_type).ok_or_else(|| DcError::UnknownComponentType {
            component: spec.id.clone(),
            component_type: spec.component_type.clone(),
        })
    }

    /// Whether the linear DC path can stamp this kind.
    pub fn is_dc_eligible(&self) -> bool {
        !matches!(
            self,
            ComponentKind::Capacitor
                | ComponentKind::Inductor
                | ComponentKind::VsourceAc
                | ComponentKind::IsourceAc
        )
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A component the DC path can stamp.
#[derive(Debug, Clone)]
pub enum Component {
    Resistor(Resistor),
    VoltageSource(VoltageSource),
    CurrentSource(CurrentSource),
    Vcvs(Vcvs),
    Vccs(Vccs),
    Ccvs(Ccvs),
    Cccs(Cccs),
    Ground(Ground),
    VoltageProbe(VoltageProbe),
    CurrentProbe(CurrentProbe),
}

impl Component {
    /// Create a component from its request entry.
    ///
    /// Voltage-defining components take the next branch index from
    /// `branch_counter`.
    pub fn from_spec(
        id: ComponentId,
        spec: &ComponentSpec,
        nets: &NetIndex,
        branch_counter: &mut usize,
    ) -> Result<Self> {
        let kind = ComponentKind::parse(spec)?;
        let mut next_branch = || {
            let branch = BranchId(*branch_counter);
            *branch_counter += 1;
            branch
        };

        match kind {
            ComponentKind::Resistor => {
                let value = param(spec, &["value", "resistance"])?;
                if value <= 0.0 {
                    return Err(DcError::invalid_parameter(
                        &spec.id,
                        "value",
                        "resistance must be positive",
                    ));
                }
                Ok(Component::Resistor(Resistor::new(
                    id,
                    spec.id.clone(),
                    two_terminals(spec, nets)?,
                    value,
                )))
            }

            ComponentKind::VsourceDc => {
                let value = param(spec, &["dc", "value"])?;
                let nodes = two_terminals(spec, nets)?;
                Ok(Component::VoltageSource(VoltageSource::new(
                    id,
                    spec.id.clone(),
                    nodes,
                    value,
                    next_branch(),
                )))
            }

            ComponentKind::IsourceDc => {
                let value = param(spec, &["dc", "value"])?;
                Ok(Component::CurrentSource(CurrentSource::new(
                    id,
                    spec.id.clone(),
                    two_terminals(spec, nets)?,
                    value,
                )))
            }

            ComponentKind::Vcvs => {
                let gain = param(spec, &["gain"])?;
                let (nodes, control) = four_terminals(spec, nets)?;
                Ok(Component::Vcvs(Vcvs::new(
                    id,
                    spec.id.clone(),
                    nodes,
                    control,
                    gain,
                    next_branch(),
                )))
            }

            ComponentKind::Vccs => {
                let gm = param(spec, &["gain"])?;
                let (nodes, control) = four_terminals(spec, nets)?;
                Ok(Component::Vccs(Vccs::new(id, spec.id.clone(), nodes, control, gm)))
            }

            ComponentKind::Ccvs => {
                let gain = param(spec, &["gain"])?;
                let (nodes, control) = four_terminals(spec, nets)?;
                Ok(Component::Ccvs(Ccvs::new(
                    id,
                    spec.id.clone(),
                    nodes,
                    control,
                    gain,
                    next_branch(),
                )))
            }

            ComponentKind::Cccs => {
                let gain = param(spec, &["gain"])?;
                let (nodes, control) = four_terminals(spec, nets)?;
                Ok(Component::Cccs(Cccs::new(id, spec.id.clone(), nodes, control, gain)))
            }

            ComponentKind::Ground => {
                let net = spec
                    .connections
                    .values()
                    .next()
                    .ok_or_else(|| DcError::unconnected(&spec.id, "gnd"))?;
                Ok(Component::Ground(Ground::new(
                    id,
                    spec.id.clone(),
                    lookup(spec, "gnd", net, nets)?,
                )))
            }

            ComponentKind::VoltageProbe => {
                let node = match spec.connections.iter().next() {
                    Some((terminal, net)) => Some(lookup(spec, terminal, net, nets)?),
                    None => None,
                };
                Ok(Component::VoltageProbe(VoltageProbe::new(id, spec.id.clone(), node)))
            }

            ComponentKind::CurrentProbe => {
                let pos = optional_terminal(spec, nets, POS_TERMINALS)?;
                let neg = optional_terminal(spec, nets, NEG_TERMINALS)?;
                match (pos, neg) {
                    (Some(p), Some(n)) => Ok(Component::CurrentProbe(CurrentProbe::ammeter(
                        id,
                        spec.id.clone(),
                        [p, n],
                        next_branch(),
                    ))),
                    _ => Ok(Component::CurrentProbe(CurrentProbe::marker(id, spec.id.clone()))),
                }
            }

            ComponentKind::Capacitor
            | ComponentKind::Inductor
            | ComponentKind::VsourceAc
            | ComponentKind::IsourceAc => Err(DcError::Ineligible {
                component: spec.id.clone(),
                component_type: kind.as_str().to_string(),
            }),
        }
    }

    /// Get the component ID.
    pub fn id(&self) -> ComponentId {
        match self {
            Component::Resistor(r) => r.id,
            Component::VoltageSource(v) => v.id,
            Component::CurrentSource(i) => i.id,
            Component::Vcvs(e) => e.id,
            Component::Vccs(g) => g.id,
            Component::Ccvs(h) => h.id,
            Component::Cccs(f) => f.id,
            Component::Ground(g) => g.id,
            Component::VoltageProbe(p) => p.id,
            Component::CurrentProbe(p) => p.id,
        }
    }

    /// Get the component name (the caller's id string).
    pub fn name(&self) -> &str {
        match self {
            Component::Resistor(r) => &r.name,
            Component::VoltageSource(v) => &v.name,
            Component::CurrentSource(i) => &i.name,
            Component::Vcvs(e) => &e.name,
            Component::Vccs(g) => &g.name,
            Component::Ccvs(h) => &h.name,
            Component::Cccs(f) => &f.name,
            Component::Ground(g) => &g.name,
            Component::VoltageProbe(p) => &p.name,
            Component::CurrentProbe(p) => &p.name,
        }
    }

    /// The branch unknown and `[pos, neg]` nets of a voltage-defining component.
    pub fn voltage_branch(&self) -> Option<(BranchId, [NetId; 2])> {
        match self {
            Component::VoltageSource(v) => Some((v.branch, v.nodes)),
            Component::Vcvs(e) => Some((e.branch, e.nodes)),
            Component::Ccvs(h) => Some((h.branch, h.nodes)),
            Component::CurrentProbe(p) => p.branch.zip(p.nodes),
            _ => None,
        }
    }

    /// Control net pair of a current-controlled source.
    pub fn current_control(&self) -> Option<[NetId; 2]> {
        match self {
            Component::Ccvs(h) => Some(h.control),
            Component::Cccs(f) => Some(f.control),
            _ => None,
        }
    }
}

/// Read a required, finite parameter. The first name is canonical.
fn param(spec: &ComponentSpec, names: &[&str]) -> Result<f64> {
    let value = names
        .iter()
        .find_map(|n| spec.parameters.get(*n))
        .copied()
        .ok_or_else(|| DcError::missing_parameter(&spec.id, names[0]))?;
    if !value.is_finite() {
        return Err(DcError::invalid_parameter(&spec.id, names[0], "value must be finite"));
    }
    Ok(value)
}

fn lookup(spec: &ComponentSpec, terminal: &str, net: &str, nets: &NetIndex) -> Result<NetId> {
    nets.find(net).ok_or_else(|| DcError::UnknownNet {
        component: spec.id.clone(),
        terminal: terminal.to_string(),
        net: net.to_string(),
    })
}

fn optional_terminal(spec: &ComponentSpec, nets: &NetIndex, names: &[&str]) -> Result<Option<NetId>> {
    for name in names {
        if let Some(net) = spec.connections.get(*name) {
            return lookup(spec, name, net, nets).map(Some);
        }
    }
    Ok(None)
}

fn terminal(spec: &ComponentSpec, nets: &NetIndex, names: &[&str]) -> Result<NetId> {
    optional_terminal(spec, nets, names)?.ok_or_else(|| DcError::unconnected(&spec.id, names[0]))
}

fn two_terminals(spec: &ComponentSpec, nets: &NetIndex) -> Result<[NetId; 2]> {
    Ok([
        terminal(spec, nets, POS_TERMINALS)?,
        terminal(spec, nets, NEG_TERMINALS)?,
    ])
}

fn four_terminals(spec: &ComponentSpec, nets: &NetIndex) -> Result<([NetId; 2], [NetId; 2])> {
    let nodes = two_terminals(spec, nets)?;
    let control = [
        terminal(spec, nets, CTRL_POS_TERMINALS)?,
        terminal(spec, nets, CTRL_NEG_TERMINALS)?,
    ];
    Ok((nodes, control))
}

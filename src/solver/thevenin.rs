//! Thevenin/Norton equivalent of a one-port.
//!
//! Two DC solves: the unmodified circuit gives the open-circuit voltage,
//! then a near-short across the port gives the short-circuit current.

use serde::{Deserialize, Serialize};

use super::config::SolverConfig;
use super::solve_dc_with_config;
use crate::circuit::{ComponentSpec, NetIndex, NetSpec, Port};
use crate::error::{DcError, Result};

/// Id prefix of the resistor inserted across the port.
const PORT_SHORT_ID: &str = "__port_short";

/// Thevenin equivalent seen from a port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheveninResult {
    /// Open-circuit voltage V(positive) - V(negative)
    pub vth: f64,
    /// Equivalent resistance; the open-port sentinel when no current flows
    pub rth: f64,
    /// The port, with `negative` filled in
    pub port: Port,
}

impl TheveninResult {
    /// Norton current `vth / rth`.
    pub fn norton_current(&self) -> f64 {
        self.vth / self.rth
    }
}

/// Thevenin equivalent with default tolerances.
pub fn thevenin(components: &[ComponentSpec], nets: &[NetSpec], port: &Port) -> Result<TheveninResult> {
    thevenin_with_config(components, nets, port, &SolverConfig::default())
}

/// Thevenin equivalent of the network seen between `port.positive` and
/// `port.negative` (ground when omitted).
pub fn thevenin_with_config(
    components: &[ComponentSpec],
    nets: &[NetSpec],
    port: &Port,
    config: &SolverConfig,
) -> Result<TheveninResult> {
    let _span = tracing::info_span!("thevenin", positive = %port.positive).entered();

    let index = NetIndex::resolve(components, nets)?;
    let positive = port_net(&index, &port.positive)?;
    let negative = match &port.negative {
        Some(name) => port_net(&index, name)?,
        None => index.ground().to_string(),
    };
    if positive == negative {
        return Err(DcError::invalid_port(format!(
            "positive and negative both resolve to net '{positive}'"
        )));
    }

    let open = solve_dc_with_config(components, nets, config)?;
    let vth = open.voltage(&positive).unwrap_or(0.0) - open.voltage(&negative).unwrap_or(0.0);

    let short_id = unique_id(components);
    let (shorted, shorted_nets) = with_port_short(components, nets, &short_id, &positive, &negative, config);
    let closed = solve_dc_with_config(&shorted, &shorted_nets, config)?;
    let isc = closed.current(&short_id).unwrap_or(0.0);

    let rth = if isc.abs() <= config.open_current_threshold {
        tracing::debug!(isc, "port is open");
        config.open_resistance
    } else {
        (vth / isc).abs()
    };

    tracing::debug!(vth, isc, rth, "thevenin equivalent");

    Ok(TheveninResult {
        vth,
        rth,
        port: Port {
            positive,
            negative: Some(negative),
        },
    })
}

/// Canonical (declared) name of a port net.
fn port_net(index: &NetIndex, name: &str) -> Result<String> {
    index
        .find(name)
        .map(|net| index.name(net).to_string())
        .ok_or_else(|| DcError::invalid_port(format!("net '{name}' does not exist")))
}

fn unique_id(components: &[ComponentSpec]) -> String {
    let taken = |id: &str| components.iter().any(|c| c.id == id);
    let mut id = PORT_SHORT_ID.to_string();
    let mut n = 1;
    while taken(&id) {
        id = format!("{PORT_SHORT_ID}_{n}");
        n += 1;
    }
    id
}

/// Copy of the circuit with a `short_resistance` resistor from `positive` to `negative`.
fn with_port_short(
    components: &[ComponentSpec],
    nets: &[NetSpec],
    id: &str,
    positive: &str,
    negative: &str,
    config: &SolverConfig,
) -> (Vec<ComponentSpec>, Vec<NetSpec>) {
    let mut components = components.to_vec();
    components.push(
        ComponentSpec::new(id, "resistor")
            .param("value", config.short_resistance)
            .connect("p", positive)
            .connect("n", negative),
    );

    let mut nets = nets.to_vec();
    for net in nets.iter_mut() {
        if net.name == positive {
            net.nodes.push((id.to_string(), "p".to_string()));
        } else if net.name == negative {
            net.nodes.push((id.to_string(), "n".to_string()));
        }
    }

    (components, nets)
}

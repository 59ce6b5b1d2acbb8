//! Shared circuit builders for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use dcnet_core::circuit::derive_nets;
use dcnet_core::{solve_dc, ComponentSpec, DcSolution};

pub fn resistor(id: &str, ohms: f64, p: &str, n: &str) -> ComponentSpec {
    ComponentSpec::new(id, "resistor")
        .param("value", ohms)
        .connect("p", p)
        .connect("n", n)
}

pub fn vsource(id: &str, volts: f64, p: &str, n: &str) -> ComponentSpec {
    ComponentSpec::new(id, "vsource_dc")
        .param("dc", volts)
        .connect("p", p)
        .connect("n", n)
}

pub fn isource(id: &str, amps: f64, p: &str, n: &str) -> ComponentSpec {
    ComponentSpec::new(id, "isource_dc")
        .param("dc", amps)
        .connect("p", p)
        .connect("n", n)
}

pub fn ground(id: &str, net: &str) -> ComponentSpec {
    ComponentSpec::new(id, "ground").connect("t", net)
}

/// A controlled source; `nodes` is `[p, n, cp, cn]`.
pub fn controlled(id: &str, kind: &str, gain: f64, nodes: [&str; 4]) -> ComponentSpec {
    ComponentSpec::new(id, kind)
        .param("gain", gain)
        .connect("p", nodes[0])
        .connect("n", nodes[1])
        .connect("cp", nodes[2])
        .connect("cn", nodes[3])
}

/// Solve with nets derived from the component connections.
pub fn solve(components: &[ComponentSpec]) -> DcSolution {
    solve_dc(components, &derive_nets(components)).expect("DC solve failed")
}

/// Signed current leaving each non-ground net through the reported branches.
pub fn kcl_residuals(components: &[ComponentSpec], solution: &DcSolution, ground: &str) -> BTreeMap<String, f64> {
    let mut residuals = BTreeMap::new();
    for comp in components {
        let Some(reported) = solution.current(&comp.id) else {
            continue;
        };
        // Voltage-defining sources report delivered current (n -> p inside)
        let through = match comp.component_type.as_str() {
            "vsource_dc" | "vcvs" | "ccvs" => -reported,
            _ => reported,
        };
        let p = &comp.connections["p"];
        let n = &comp.connections["n"];
        *residuals.entry(p.clone()).or_insert(0.0) += through;
        *residuals.entry(n.clone()).or_insert(0.0) -= through;
    }
    residuals.remove(ground);
    residuals
}

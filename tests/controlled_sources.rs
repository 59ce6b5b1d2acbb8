//! VCVS, VCCS, CCVS and CCCS behaviour, including reference-current sensing.

mod common;

use approx::assert_abs_diff_eq;
use common::*;

#[test]
fn test_vcvs_amplifies_control_voltage() {
    let comps = vec![
        vsource("V1", 1.0, "a", "gnd"),
        resistor("RA", 1e3, "a", "gnd"),
        controlled("E1", "vcvs", 5.0, ["out", "gnd", "a", "gnd"]),
        resistor("RL", 1e3, "out", "gnd"),
    ];
    let sol = solve(&comps);
    assert_abs_diff_eq!(sol.voltage("out").unwrap(), 5.0, epsilon = 1e-9);
    assert_abs_diff_eq!(sol.current("E1").unwrap(), 5e-3, epsilon = 1e-12);
}

#[test]
fn test_vccs_drives_load() {
    let comps = vec![
        vsource("V1", 1.0, "a", "gnd"),
        resistor("RA", 1e3, "a", "gnd"),
        controlled("G1", "vccs", 1e-3, ["gnd", "out", "a", "gnd"]),
        resistor("RL", 1e3, "out", "gnd"),
    ];
    let sol = solve(&comps);
    assert_abs_diff_eq!(sol.voltage("out").unwrap(), 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(sol.current("G1").unwrap(), 1e-3, epsilon = 1e-12);
}

#[test]
fn test_cccs_with_synthesized_sensing_branch() {
    // 1 mA flows b -> gnd through the control port
    let comps = vec![
        vsource("V1", 1.0, "a", "gnd"),
        resistor("R1", 1e3, "a", "b"),
        controlled("F1", "cccs", 2.0, ["gnd", "out", "b", "gnd"]),
        resistor("RL", 1e3, "out", "gnd"),
    ];
    let sol = solve(&comps);
    assert_abs_diff_eq!(sol.voltage("b").unwrap(), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(sol.voltage("out").unwrap(), 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(sol.current("F1").unwrap(), 2e-3, epsilon = 1e-12);
    // Only user components are reported
    let ids: Vec<&str> = sol.branch_currents.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["F1", "R1", "RL", "V1"]);
}

#[test]
fn test_ccvs_with_synthesized_sensing_branch() {
    let comps = vec![
        vsource("V1", 1.0, "a", "gnd"),
        resistor("R1", 1e3, "a", "b"),
        controlled("H1", "ccvs", 1e3, ["out", "gnd", "b", "gnd"]),
        resistor("RL", 500.0, "out", "gnd"),
    ];
    let sol = solve(&comps);
    assert_abs_diff_eq!(sol.voltage("out").unwrap(), 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(sol.current("H1").unwrap(), 2e-3, epsilon = 1e-12);
}

#[test]
fn test_cccs_reuses_source_branch() {
    // V1 delivers 1 mA, so the current through it from a to gnd is -1 mA
    let comps = vec![
        vsource("V1", 1.0, "a", "gnd"),
        resistor("R1", 1e3, "a", "gnd"),
        controlled("F1", "cccs", 1.0, ["gnd", "out", "a", "gnd"]),
        resistor("RL", 1e3, "out", "gnd"),
    ];
    let sol = solve(&comps);
    assert_abs_diff_eq!(sol.voltage("a").unwrap(), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(sol.current("F1").unwrap(), -1e-3, epsilon = 1e-12);
    assert_abs_diff_eq!(sol.voltage("out").unwrap(), -1.0, epsilon = 1e-9);
}

#[test]
fn test_reversed_control_flips_reference() {
    let forward = vec![
        vsource("V1", 1.0, "a", "gnd"),
        resistor("R1", 1e3, "a", "b"),
        controlled("F1", "cccs", 2.0, ["gnd", "out", "b", "gnd"]),
        resistor("RL", 1e3, "out", "gnd"),
    ];
    let reversed = vec![
        vsource("V1", 1.0, "a", "gnd"),
        resistor("R1", 1e3, "a", "b"),
        controlled("F1", "cccs", 2.0, ["gnd", "out", "gnd", "b"]),
        resistor("RL", 1e3, "out", "gnd"),
    ];
    let f = solve(&forward);
    let r = solve(&reversed);
    assert_abs_diff_eq!(f.voltage("out").unwrap(), -r.voltage("out").unwrap(), epsilon = 1e-9);
}

#[test]
fn test_kcl_holds_with_every_source_kind() {
    let comps = vec![
        vsource("V1", 12.0, "a", "gnd"),
        resistor("R1", 1e3, "a", "b"),
        dcnet_core::ComponentSpec::new("P1", "current_probe")
            .connect("p", "b")
            .connect("n", "c"),
        resistor("R2", 2e3, "c", "gnd"),
        isource("I1", 1e-3, "gnd", "c"),
        controlled("E1", "vcvs", 2.0, ["d", "gnd", "c", "gnd"]),
        resistor("R3", 1e3, "d", "gnd"),
        controlled("G1", "vccs", 1e-3, ["gnd", "e", "b", "gnd"]),
        resistor("R4", 1e3, "e", "gnd"),
        controlled("F1", "cccs", 0.5, ["gnd", "f", "b", "c"]),
        resistor("R5", 1e3, "f", "gnd"),
        controlled("H1", "ccvs", 100.0, ["g", "gnd", "a", "gnd"]),
        resistor("R6", 1e3, "g", "gnd"),
    ];
    let sol = solve(&comps);
    for (net, residual) in kcl_residuals(&comps, &sol, "gnd") {
        assert!(residual.abs() < 1e-9, "KCL violated at {net}: {residual:e}");
    }
    // F1 reuses the ammeter branch as its reference
    assert_abs_diff_eq!(
        sol.current("F1").unwrap(),
        0.5 * sol.current("P1").unwrap(),
        epsilon = 1e-12
    );
}

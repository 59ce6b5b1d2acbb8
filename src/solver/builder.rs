//! MNA system assembly.
//!
//! Branch unknowns are laid out as: every voltage-defining component in
//! request order (DC voltage sources, VCVS, CCVS, ammeter probes), then the
//! sensing branches synthesized for current-controlled sources.

use std::collections::BTreeMap;

use super::config::SolverConfig;
use super::mna::MnaMatrix;
use crate::circuit::{BranchId, ComponentId, ComponentSpec, NetId, NetIndex, VarIndex};
use crate::components::Component;
use crate::error::Result;

/// Where a current-controlled source reads its reference current.
///
/// `sign` is +1 when the branch is oriented `cp -> cn` and -1 when it runs
/// the other way, so the reference current is always `sign * x[branch]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReferenceCurrent {
    /// The single voltage-defining branch already spanning the control nets
    Reused { branch: BranchId, sign: f64 },
    /// A zero-volt sensing branch inserted across the control nets
    Synthesized { branch: BranchId, sign: f64 },
}

impl ReferenceCurrent {
    pub fn branch(&self) -> BranchId {
        match self {
            ReferenceCurrent::Reused { branch, .. } | ReferenceCurrent::Synthesized { branch, .. } => *branch,
        }
    }

    pub fn sign(&self) -> f64 {
        match self {
            ReferenceCurrent::Reused { sign, .. } | ReferenceCurrent::Synthesized { sign, .. } => *sign,
        }
    }

    pub fn is_synthesized(&self) -> bool {
        matches!(self, ReferenceCurrent::Synthesized { .. })
    }
}

/// A zero-volt source that exists only to expose a branch current.
/// Never reported in results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensingBranch {
    /// `[cp, cn]` of the first source that asked for it
    pub control: [NetId; 2],
    pub branch: BranchId,
}

/// An assembled system ready for the linear solver.
#[derive(Debug, Clone)]
pub struct MnaSystem {
    pub matrix: MnaMatrix,
    pub components: Vec<Component>,
    /// Reference current per component, `Some` exactly for CCVS/CCCS
    pub references: Vec<Option<ReferenceCurrent>>,
    pub sensing: Vec<SensingBranch>,
    /// Branches that received duplicate-pair regularization
    pub regularized: Vec<BranchId>,
    /// Number of non-ground nets
    pub num_nets: usize,
    /// Number of branch unknowns, sensing branches included
    pub num_branches: usize,
}

impl MnaSystem {
    /// Matrix index for a branch current.
    pub fn branch_index(&self, branch: BranchId) -> usize {
        VarIndex::Current(branch).to_index(self.num_nets)
    }

    /// Reference current of a component, if it is current-controlled.
    pub fn reference(&self, id: ComponentId) -> Option<ReferenceCurrent> {
        self.references.get(id.0).copied().flatten()
    }
}

/// Build the MNA system for a validated component list.
pub fn build_system(components: &[ComponentSpec], index: &NetIndex, config: &SolverConfig) -> Result<MnaSystem> {
    let mut branch_counter = 0usize;
    let parts = components
        .iter()
        .enumerate()
        .map(|(i, spec)| Component::from_spec(ComponentId(i), spec, index, &mut branch_counter))
        .collect::<Result<Vec<_>>>()?;

    let voltage_branches: Vec<(BranchId, [NetId; 2])> =
        parts.iter().filter_map(Component::voltage_branch).collect();

    let mut sensing: Vec<SensingBranch> = Vec::new();
    let references: Vec<Option<ReferenceCurrent>> = parts
        .iter()
        .map(|comp| {
            comp.current_control().map(|control| {
                let reference = resolve_reference(control, &voltage_branches, &mut sensing, &mut branch_counter);
                tracing::debug!(component = comp.name(), ?reference, "reference current");
                reference
            })
        })
        .collect();

    let num_nets = index.num_nets();
    let num_branches = branch_counter;
    let mut matrix = MnaMatrix::new(num_nets + num_branches);

    tracing::debug!(
        nets = num_nets,
        branches = num_branches,
        sensing = sensing.len(),
        "assembling MNA system"
    );

    let node = |net: NetId| index.node_index(net);
    let col = |branch: BranchId| VarIndex::Current(branch).to_index(num_nets);

    for (comp, reference) in parts.iter().zip(&references) {
        match (comp, reference) {
            (Component::Resistor(r), _) => {
                matrix.stamp_conductance(node(r.nodes[0]), node(r.nodes[1]), r.conductance());
            }

            (Component::VoltageSource(v), _) => {
                matrix.stamp_voltage_source(node(v.nodes[0]), node(v.nodes[1]), col(v.branch), v.voltage());
            }

            (Component::CurrentSource(i), _) => {
                matrix.stamp_current_source(node(i.nodes[0]), node(i.nodes[1]), i.current());
            }

            (Component::Vcvs(e), _) => {
                matrix.stamp_vcvs(
                    node(e.nodes[0]),
                    node(e.nodes[1]),
                    node(e.control[0]),
                    node(e.control[1]),
                    col(e.branch),
                    e.gain,
                );
            }

            (Component::Vccs(g), _) => {
                matrix.stamp_vccs(
                    node(g.nodes[0]),
                    node(g.nodes[1]),
                    node(g.control[0]),
                    node(g.control[1]),
                    g.gm,
                );
            }

            (Component::Ccvs(h), Some(reference)) => {
                matrix.stamp_ccvs(
                    node(h.nodes[0]),
                    node(h.nodes[1]),
                    col(h.branch),
                    col(reference.branch()),
                    h.gain * reference.sign(),
                );
            }

            (Component::Cccs(f), Some(reference)) => {
                matrix.stamp_cccs(
                    node(f.nodes[0]),
                    node(f.nodes[1]),
                    col(reference.branch()),
                    f.gain * reference.sign(),
                );
            }

            (Component::Ccvs(_) | Component::Cccs(_), None) => {
                unreachable!("every current-controlled source is assigned a reference branch")
            }

            (Component::CurrentProbe(p), _) => {
                if let (Some(branch), Some([pos, neg])) = (p.branch, p.nodes) {
                    matrix.stamp_voltage_source(node(pos), node(neg), col(branch), 0.0);
                }
            }

            (Component::Ground(_), _) | (Component::VoltageProbe(_), _) => {}
        }
    }

    for s in &sensing {
        matrix.stamp_voltage_source(node(s.control[0]), node(s.control[1]), col(s.branch), 0.0);
    }

    let all_branches = voltage_branches
        .iter()
        .copied()
        .chain(sensing.iter().map(|s| (s.branch, s.control)));
    let regularized = regularize_duplicates(&mut matrix, all_branches, num_nets, config.duplicate_epsilon);

    Ok(MnaSystem {
        matrix,
        components: parts,
        references,
        sensing,
        regularized,
        num_nets,
        num_branches,
    })
}

/// Pick the reference branch for a control net pair.
///
/// Exactly one existing voltage-defining branch across the pair is reused.
/// Otherwise the pair gets a sensing branch, shared with any earlier source
/// controlled through the same pair.
fn resolve_reference(
    control: [NetId; 2],
    voltage_branches: &[(BranchId, [NetId; 2])],
    sensing: &mut Vec<SensingBranch>,
    branch_counter: &mut usize,
) -> ReferenceCurrent {
    let orientation = |pos: NetId| if pos == control[0] { 1.0 } else { -1.0 };

    let mut candidates = voltage_branches
        .iter()
        .filter(|(_, nodes)| same_pair(*nodes, control));
    if let (Some(&(branch, [pos, _])), None) = (candidates.next(), candidates.next()) {
        return ReferenceCurrent::Reused {
            branch,
            sign: orientation(pos),
        };
    }

    if let Some(existing) = sensing.iter().find(|s| same_pair(s.control, control)) {
        return ReferenceCurrent::Synthesized {
            branch: existing.branch,
            sign: orientation(existing.control[0]),
        };
    }

    let branch = BranchId(*branch_counter);
    *branch_counter += 1;
    sensing.push(SensingBranch { control, branch });
    tracing::info!(%branch, ctrl_pos = %control[0], ctrl_neg = %control[1], "synthesized sensing branch");
    ReferenceCurrent::Synthesized { branch, sign: 1.0 }
}

fn same_pair(a: [NetId; 2], b: [NetId; 2]) -> bool {
    (a[0] == b[0] && a[1] == b[1]) || (a[0] == b[1] && a[1] == b[0])
}

/// Perturb the constraint row of every voltage-defining branch that shares
/// its unordered net pair with an earlier one.
///
/// The diagonal entry added is `epsilon` times the row's largest entry, the
/// same scale LU measures that row's pivot against.
fn regularize_duplicates<I>(matrix: &mut MnaMatrix, branches: I, num_nets: usize, epsilon: f64) -> Vec<BranchId>
where
    I: IntoIterator<Item = (BranchId, [NetId; 2])>,
{
    let mut groups: BTreeMap<(NetId, NetId), Vec<BranchId>> = BTreeMap::new();
    for (branch, [a, b]) in branches {
        groups.entry((a.min(b), a.max(b))).or_default().push(branch);
    }

    let mut regularized = Vec::new();
    for ((a, b), group) in groups {
        for &branch in group.iter().skip(1) {
            let k = VarIndex::Current(branch).to_index(num_nets);
            let delta = epsilon * matrix.row_scale(k);
            matrix.add(k, k, delta);
            tracing::info!(%branch, net_a = %a, net_b = %b, delta, "regularized duplicate branch");
            regularized.push(branch);
        }
    }
    regularized.sort();
    regularized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::derive_nets;
    use crate::solver::{solve_linear, SolveStage};

    fn build(comps: &[ComponentSpec]) -> (MnaSystem, NetIndex) {
        let index = NetIndex::resolve(comps, &derive_nets(comps)).unwrap();
        let system = build_system(comps, &index, &SolverConfig::default()).unwrap();
        (system, index)
    }

    fn vsource(id: &str, v: f64, p: &str, n: &str) -> ComponentSpec {
        ComponentSpec::new(id, "vsource_dc")
            .param("dc", v)
            .connect("p", p)
            .connect("n", n)
    }

    fn resistor(id: &str, r: f64, p: &str, n: &str) -> ComponentSpec {
        ComponentSpec::new(id, "resistor")
            .param("value", r)
            .connect("p", p)
            .connect("n", n)
    }

    fn cccs(id: &str, gain: f64, nodes: [&str; 4]) -> ComponentSpec {
        ComponentSpec::new(id, "cccs")
            .param("gain", gain)
            .connect("p", nodes[0])
            .connect("n", nodes[1])
            .connect("cp", nodes[2])
            .connect("cn", nodes[3])
    }

    #[test]
    fn test_voltage_source_stamp_layout() {
        let comps = vec![
            vsource("V1", 9.0, "in", "gnd"),
            resistor("R1", 3e3, "in", "out"),
            resistor("R2", 6e3, "out", "gnd"),
        ];
        let (sys, index) = build(&comps);
        assert_eq!(sys.matrix.size, 3);
        let vin = index.node_index(index.find("in").unwrap()).unwrap();
        let k = sys.branch_index(BranchId(0));
        assert_eq!(sys.matrix.get(vin, k), 1.0);
        assert_eq!(sys.matrix.get(k, vin), 1.0);
        assert_eq!(sys.matrix.b[k], 9.0);
    }

    #[test]
    fn test_cccs_reuses_unique_source_branch() {
        let comps = vec![
            vsource("V1", 1.0, "a", "gnd"),
            resistor("R1", 1e3, "a", "gnd"),
            cccs("F1", 2.0, ["gnd", "out", "gnd", "a"]),
            resistor("RL", 1e3, "out", "gnd"),
        ];
        let (sys, _) = build(&comps);
        assert_eq!(
            sys.reference(ComponentId(2)),
            Some(ReferenceCurrent::Reused {
                branch: BranchId(0),
                sign: -1.0
            })
        );
        assert!(sys.sensing.is_empty());
    }

    #[test]
    fn test_cccs_synthesizes_sensing_branch() {
        let comps = vec![
            vsource("V1", 1.0, "a", "gnd"),
            resistor("R1", 1e3, "a", "b"),
            cccs("F1", 2.0, ["gnd", "out", "b", "gnd"]),
            resistor("RL", 1e3, "out", "gnd"),
        ];
        let (sys, _) = build(&comps);
        let reference = sys.reference(ComponentId(2)).unwrap();
        assert!(reference.is_synthesized());
        assert_eq!(reference.branch(), BranchId(1));
        assert_eq!(sys.sensing.len(), 1);
        assert_eq!(sys.num_branches, 2);
    }

    #[test]
    fn test_sensing_branch_shared_between_sources() {
        let comps = vec![
            vsource("V1", 1.0, "a", "gnd"),
            resistor("R1", 1e3, "a", "b"),
            cccs("F1", 2.0, ["gnd", "out", "b", "gnd"]),
            cccs("F2", 3.0, ["gnd", "out", "gnd", "b"]),
            resistor("RL", 1e3, "out", "gnd"),
        ];
        let (sys, _) = build(&comps);
        let r1 = sys.reference(ComponentId(2)).unwrap();
        let r2 = sys.reference(ComponentId(3)).unwrap();
        assert_eq!(r1.branch(), r2.branch());
        assert_eq!(r1.sign(), 1.0);
        assert_eq!(r2.sign(), -1.0);
        assert_eq!(sys.sensing.len(), 1);
    }

    #[test]
    fn test_ambiguous_candidates_fall_back_to_sensing() {
        let comps = vec![
            vsource("V1", 1.0, "a", "gnd"),
            vsource("V2", 1.0, "gnd", "a"),
            resistor("R1", 1e3, "a", "gnd"),
            cccs("F1", 1.0, ["gnd", "out", "a", "gnd"]),
            resistor("RL", 1e3, "out", "gnd"),
        ];
        let (sys, _) = build(&comps);
        assert!(sys.reference(ComponentId(3)).unwrap().is_synthesized());
    }

    #[test]
    fn test_duplicate_branches_regularized() {
        let comps = vec![
            vsource("V1", 5.0, "a", "gnd"),
            vsource("V2", 5.0, "gnd", "a"),
            vsource("V3", 5.0, "a", "gnd"),
            resistor("R1", 1e3, "a", "gnd"),
        ];
        let (sys, _) = build(&comps);
        assert_eq!(sys.regularized, vec![BranchId(1), BranchId(2)]);
        let k0 = sys.branch_index(BranchId(0));
        let k1 = sys.branch_index(BranchId(1));
        assert_eq!(sys.matrix.get(k0, k0), 0.0);
        assert_eq!(sys.matrix.get(k1, k1), DEFAULT_EPS);
    }

    #[test]
    fn test_duplicate_epsilon_follows_row_scale() {
        let comps = vec![
            vsource("V1", 5.0, "a", "gnd"),
            ComponentSpec::new("E1", "vcvs")
                .param("gain", 4.0)
                .connect("p", "a")
                .connect("n", "gnd")
                .connect("cp", "b")
                .connect("cn", "gnd"),
            vsource("VB", 1.0, "b", "gnd"),
            resistor("R1", 1e-3, "a", "gnd"),
        ];
        let (sys, _) = build(&comps);
        assert_eq!(sys.regularized, vec![BranchId(1)]);
        // E1's row holds the incidence 1 and the gain 4
        let k1 = sys.branch_index(BranchId(1));
        assert_eq!(sys.matrix.get(k1, k1), DEFAULT_EPS * 4.0);
    }

    #[test]
    fn test_duplicate_sources_across_milliohm_load_solve_exactly() {
        let comps = vec![
            vsource("V1", 5.0, "a", "gnd"),
            vsource("V2", 5.0, "a", "gnd"),
            resistor("RL", 1e-3, "a", "gnd"),
        ];
        let (mut sys, _) = build(&comps);
        let sol = solve_linear(&mut sys.matrix, &SolverConfig::default());
        assert_eq!(sol.stage, SolveStage::Exact);
        assert!((sol.x[0] - 5.0).abs() < 1e-12);
        assert!((sol.x[1] + sol.x[2] + 5e3).abs() < 1e-9);
    }

    const DEFAULT_EPS: f64 = crate::solver::DEFAULT_DUPLICATE_EPSILON;
}

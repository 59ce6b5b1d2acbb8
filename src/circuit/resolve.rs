//! Net validation and indexing.

use std::collections::{BTreeSet, HashMap, HashSet};

use super::netlist::{ComponentSpec, NetSpec};
use super::types::{NetId, VarIndex};
use crate::components::ComponentKind;
use crate::error::{DcError, Result};

/// Literal name that marks a net as ground.
pub const GROUND_NET: &str = "gnd";

/// Validated nets with a stable index per net.
///
/// Non-ground nets are numbered 1..=n in lexicographic name order; ground is
/// always [`NetId::GROUND`].
#[derive(Debug, Clone)]
pub struct NetIndex {
    /// Name of the ground net as declared
    ground: String,
    /// Non-ground net names, sorted
    names: Vec<String>,
    /// Name -> id (ground included, plus the `gnd` alias)
    map: HashMap<String, NetId>,
}

impl NetIndex {
    /// Validate the declared nets against the components and index them.
    ///
    /// Checks:
    /// - component ids and net names are unique
    /// - every net has at least two members, each naming an existing component
    /// - net listings agree with the components' own connection maps
    /// - every connection names a declared net
    /// - exactly one ground candidate exists
    pub fn resolve(components: &[ComponentSpec], nets: &[NetSpec]) -> Result<Self> {
        let mut by_id: HashMap<&str, &ComponentSpec> = HashMap::with_capacity(components.len());
        for comp in components {
            if by_id.insert(comp.id.as_str(), comp).is_some() {
                return Err(DcError::DuplicateComponent {
                    id: comp.id.clone(),
                });
            }
        }

        let mut declared: HashSet<&str> = HashSet::with_capacity(nets.len());
        for net in nets {
            if !declared.insert(net.name.as_str()) {
                return Err(DcError::DuplicateNet {
                    name: net.name.clone(),
                });
            }

            let members: BTreeSet<&(String, String)> = net.nodes.iter().collect();
            if members.len() < 2 {
                return Err(DcError::NetTooSmall {
                    net: net.name.clone(),
                    members: members.len(),
                });
            }

            for (comp_id, terminal) in members {
                let comp = by_id.get(comp_id.as_str()).ok_or_else(|| DcError::UnknownComponent {
                    net: net.name.clone(),
                    component: comp_id.clone(),
                })?;
                match comp.connections.get(terminal) {
                    Some(on) if *on == net.name => {}
                    other => {
                        return Err(DcError::MembershipMismatch {
                            component: comp_id.clone(),
                            terminal: terminal.clone(),
                            declared: other.cloned().unwrap_or_else(|| "<none>".to_string()),
                            listed: net.name.clone(),
                        });
                    }
                }
            }
        }

        for comp in components {
            for (terminal, net) in &comp.connections {
                if !declared.contains(net.as_str()) {
                    return Err(DcError::UnknownNet {
                        component: comp.id.clone(),
                        terminal: terminal.clone(),
                        net: net.clone(),
                    });
                }
            }
        }

        let ground = find_ground(components, nets)?;

        let mut names: Vec<String> = nets
            .iter()
            .map(|n| n.name.clone())
            .filter(|n| *n != ground)
            .collect();
        names.sort();

        let mut map = HashMap::with_capacity(names.len() + 2);
        map.insert(ground.clone(), NetId::GROUND);
        for (i, name) in names.iter().enumerate() {
            map.insert(name.clone(), NetId(i + 1));
        }
        // The alias only applies when no real net already owns the name
        map.entry(GROUND_NET.to_string()).or_insert(NetId::GROUND);

        tracing::debug!(ground = %ground, nets = names.len(), "resolved nets");

        Ok(Self { ground, names, map })
    }

    /// Declared name of the ground net.
    pub fn ground(&self) -> &str {
        &self.ground
    }

    /// Non-ground net names in index order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of non-ground nets.
    pub fn num_nets(&self) -> usize {
        self.names.len()
    }

    /// Find a net by name (the `gnd` alias resolves to ground).
    pub fn find(&self, name: &str) -> Option<NetId> {
        self.map.get(name).copied()
    }

    /// Get the declared name of a net.
    pub fn name(&self, net: NetId) -> &str {
        if net.is_ground() {
            &self.ground
        } else {
            &self.names[net.0 - 1]
        }
    }

    /// Matrix row/column for a net voltage; `None` for ground.
    pub fn node_index(&self, net: NetId) -> Option<usize> {
        if net.is_ground() {
            None
        } else {
            Some(VarIndex::Voltage(net).to_index(self.num_nets()))
        }
    }
}

/// Pick the single ground net.
///
/// A net literally named `gnd` is a candidate, as is every net holding a
/// `ground` component terminal. Anything other than exactly one distinct
/// candidate is an error.
fn find_ground(components: &[ComponentSpec], nets: &[NetSpec]) -> Result<String> {
    let mut candidates: BTreeSet<String> = BTreeSet::new();

    if nets.iter().any(|n| n.name == GROUND_NET) {
        candidates.insert(GROUND_NET.to_string());
    }

    for comp in components {
        if ComponentKind::from_tag(&comp.component_type) == Some(ComponentKind::Ground) {
            candidates.extend(comp.connections.values().cloned());
        }
    }

    let mut iter = candidates.into_iter();
    match (iter.next(), iter.next()) {
        (Some(ground), None) => Ok(ground),
        (None, _) => Err(DcError::MissingGround),
        (Some(first), Some(second)) => {
            let mut all = vec![first, second];
            all.extend(iter);
            Err(DcError::AmbiguousGround { candidates: all })
        }
    }
}

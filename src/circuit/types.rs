//! Core index types for the assembled system.

use std::fmt;

/// A resolved net. Net 0 is always ground; nets 1..=n follow the
/// lexicographic order of the non-ground net names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetId(pub usize);

impl NetId {
    /// The ground net (always index 0).
    pub const GROUND: NetId = NetId(0);

    /// Check if this is the ground net.
    pub fn is_ground(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ground() {
            write!(f, "GND")
        } else {
            write!(f, "N{}", self.0)
        }
    }
}

/// Position of a component in the request's component list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub usize);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// Index of an auxiliary branch-current unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchId(pub usize);

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I{}", self.0)
    }
}

/// Variable index in the MNA solution vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarIndex {
    /// Net voltage variable
    Voltage(NetId),
    /// Branch current variable
    Current(BranchId),
}

impl VarIndex {
    /// Raw index into the solution vector given the number of non-ground nets.
    /// Net voltages come first (excluding ground), then branch currents.
    pub fn to_index(&self, num_nets: usize) -> usize {
        match self {
            VarIndex::Voltage(NetId(n)) => {
                debug_assert!(*n > 0, "Ground net is not in the solution vector");
                n - 1
            }
            VarIndex::Current(BranchId(b)) => num_nets + b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_index_layout() {
        assert_eq!(VarIndex::Voltage(NetId(1)).to_index(3), 0);
        assert_eq!(VarIndex::Voltage(NetId(3)).to_index(3), 2);
        assert_eq!(VarIndex::Current(BranchId(0)).to_index(3), 3);
        assert_eq!(VarIndex::Current(BranchId(2)).to_index(3), 5);
    }
}

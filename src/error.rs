//! Error types for the DC network solver.
//!
//! This module provides a unified error type [`DcError`] covering the
//! topology, schema and eligibility failures a solve request can hit.
//! Numerical degeneracy is deliberately absent: the linear solver absorbs it.

use thiserror::Error;

/// Result type alias using [`DcError`].
pub type Result<T> = std::result::Result<T, DcError>;

/// Unified error type for all solve operations.
#[derive(Error, Debug)]
pub enum DcError {
    // ============ Topology Errors ============
    /// A net has fewer than two terminals
    #[error("Net '{net}' has {members} member(s); at least 2 are required")]
    NetTooSmall { net: String, members: usize },

    /// No ground net could be identified
    #[error("Circuit has no ground (name a net 'gnd' or add a ground component)")]
    MissingGround,

    /// More than one net claims to be ground
    #[error("Ambiguous ground: nets {candidates:?} are all ground candidates")]
    AmbiguousGround { candidates: Vec<String> },

    /// A component terminal references a net that was never declared
    #[error("Component '{component}' terminal '{terminal}' references undeclared net '{net}'")]
    UnknownNet {
        component: String,
        terminal: String,
        net: String,
    },

    /// A net lists a component that does not exist
    #[error("Net '{net}' references unknown component '{component}'")]
    UnknownComponent { net: String, component: String },

    /// A component's declared connection disagrees with the net listing
    #[error("Component '{component}' terminal '{terminal}' is declared on net '{declared}' but listed in net '{listed}'")]
    MembershipMismatch {
        component: String,
        terminal: String,
        declared: String,
        listed: String,
    },

    /// Duplicate component id
    #[error("Duplicate component id '{id}'")]
    DuplicateComponent { id: String },

    /// Duplicate net name
    #[error("Duplicate net name '{name}'")]
    DuplicateNet { name: String },

    /// Thevenin port is not usable
    #[error("Invalid port: {message}")]
    InvalidPort { message: String },

    // ============ Schema Errors ============
    /// Unknown component type tag
    #[error("Unknown component type '{component_type}' for component '{component}'")]
    UnknownComponentType {
        component: String,
        component_type: String,
    },

    /// Required parameter absent
    #[error("Component '{component}' is missing required parameter '{param}'")]
    MissingParameter { component: String, param: String },

    /// Invalid parameter value
    #[error("Invalid parameter '{param}' for component '{component}': {message}")]
    InvalidParameter {
        component: String,
        param: String,
        message: String,
    },

    /// Required terminal not connected
    #[error("Component '{component}' terminal '{terminal}' is not connected")]
    UnconnectedTerminal { component: String, terminal: String },

    // ============ Eligibility Errors ============
    /// Component type not supported by the linear DC path
    #[error("Component '{component}' of type '{component_type}' is not supported by DC analysis")]
    Ineligible {
        component: String,
        component_type: String,
    },

    // ============ Boundary Errors ============
    /// Malformed JSON request
    #[error("Invalid request JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Error reading a request file
    #[error("Failed to read request file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl DcError {
    /// Create a missing parameter error
    pub fn missing_parameter(component: impl Into<String>, param: impl Into<String>) -> Self {
        Self::MissingParameter {
            component: component.into(),
            param: param.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        component: impl Into<String>,
        param: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            component: component.into(),
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create an unconnected terminal error
    pub fn unconnected(component: impl Into<String>, terminal: impl Into<String>) -> Self {
        Self::UnconnectedTerminal {
            component: component.into(),
            terminal: terminal.into(),
        }
    }

    /// Create an invalid port error
    pub fn invalid_port(message: impl Into<String>) -> Self {
        Self::InvalidPort {
            message: message.into(),
        }
    }

    /// Whether this error is a topology, schema or eligibility failure
    /// (as opposed to a transport problem at the boundary).
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Json(_) | Self::FileReadError { .. })
    }
}

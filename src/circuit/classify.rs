//! Gate between the linear DC path and the transient path.

use super::netlist::ComponentSpec;
use crate::components::ComponentKind;
use crate::error::{DcError, Result};

/// Which solver a circuit must be routed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// Every component can be stamped by the linear DC builder
    LinearDc,
    /// At least one component needs the transient path
    Transient {
        /// `(component id, kind)` of every offending component
        offending: Vec<(String, ComponentKind)>,
    },
}

impl Eligibility {
    pub fn is_linear_dc(&self) -> bool {
        matches!(self, Eligibility::LinearDc)
    }
}

/// Pure predicate over a multiset of component kinds.
pub fn is_dc_eligible<I>(kinds: I) -> bool
where
    I: IntoIterator<Item = ComponentKind>,
{
    kinds.into_iter().all(|k| k.is_dc_eligible())
}

/// Classify a component list. Unknown type tags are schema errors.
pub fn classify(components: &[ComponentSpec]) -> Result<Eligibility> {
    let mut offending = Vec::new();
    for comp in components {
        let kind = ComponentKind::parse(comp)?;
        if !kind.is_dc_eligible() {
            offending.push((comp.id.clone(), kind));
        }
    }

    if offending.is_empty() {
        Ok(Eligibility::LinearDc)
    } else {
        Ok(Eligibility::Transient { offending })
    }
}

/// Fail with [`DcError::Ineligible`] on the first component the DC path cannot take.
pub fn require_dc_eligible(components: &[ComponentSpec]) -> Result<()> {
    let offending = match classify(components)? {
        Eligibility::LinearDc => return Ok(()),
        Eligibility::Transient { offending } => offending,
    };
    match offending.into_iter().next() {
        Some((component, kind)) => Err(DcError::Ineligible {
            component,
            component_type: kind.as_str().to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resistive_network_is_eligible() {
        let comps = vec![
            ComponentSpec::new("R1", "resistor"),
            ComponentSpec::new("V1", "vsource_dc"),
            ComponentSpec::new("F1", "cccs"),
            ComponentSpec::new("P1", "voltage_probe"),
        ];
        assert_eq!(classify(&comps).unwrap(), Eligibility::LinearDc);
    }

    #[test]
    fn test_reactive_component_routes_to_transient() {
        let comps = vec![
            ComponentSpec::new("R1", "resistor"),
            ComponentSpec::new("C1", "capacitor"),
            ComponentSpec::new("V2", "vsource_ac"),
        ];
        let verdict = classify(&comps).unwrap();
        assert_eq!(
            verdict,
            Eligibility::Transient {
                offending: vec![
                    ("C1".to_string(), ComponentKind::Capacitor),
                    ("V2".to_string(), ComponentKind::VsourceAc),
                ],
            }
        );
        let err = require_dc_eligible(&comps).unwrap_err();
        assert!(matches!(err, DcError::Ineligible { ref component, .. } if component == "C1"));
    }

    #[test]
    fn test_unknown_type_is_schema_error() {
        let comps = vec![ComponentSpec::new("X1", "memristor")];
        assert!(matches!(
            classify(&comps),
            Err(DcError::UnknownComponentType { .. })
        ));
    }

    #[test]
    fn test_kind_predicate() {
        assert!(is_dc_eligible([ComponentKind::Resistor, ComponentKind::Ground]));
        assert!(!is_dc_eligible([ComponentKind::Resistor, ComponentKind::Inductor]));
    }
}

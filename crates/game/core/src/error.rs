//! Common error infrastructure for ability-core.
//!
//! Domain-specific errors (e.g. `ComponentError`, `TriggerError`) live next to
//! the code that produces them. They all implement [`GameError`] so hosts can
//! decide how loudly to report a failure without matching every variant.
//!
//! # Categories
//!
//! - **ConfigurationAbsent**: a modifier template or hero configuration is
//!   unset; the operation continues with a no-op application
//! - **BindingMisuse**: a component is initialized twice or used unbound; the
//!   call is rejected
//! - **InvalidReference**: an actor, ability system or effect handle does not
//!   resolve; the call returns early without side effects
//! - **ContractViolation**: a reference that must exist by construction is
//!   missing; surfaced to the host instead of being absorbed

use crate::state::EntityId;

/// Category of a gameplay failure, used for logging and recovery decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    /// A required template or configuration entry is unset.
    ConfigurationAbsent,

    /// A component was re-initialized or used while unbound.
    BindingMisuse,

    /// An actor, ability system or handle failed to resolve.
    InvalidReference,

    /// A structurally required reference was missing.
    ContractViolation,
}

impl ErrorCategory {
    /// Returns true if the failure is absorbed locally (logged, no propagation).
    pub const fn is_absorbed(&self) -> bool {
        !matches!(self, Self::ContractViolation)
    }
}

/// Common trait for all ability-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Report the actor involved when one is known
/// - Classify by how the caller should react, not by impact
pub trait GameError: std::fmt::Display + std::fmt::Debug {
    /// Returns the category of this error.
    fn category(&self) -> ErrorCategory;

    /// Returns the actor the failure concerns, if any.
    fn actor(&self) -> Option<EntityId> {
        None
    }

    /// Returns a static identifier for this error variant.
    fn error_code(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_contract_violations_propagate() {
        assert!(ErrorCategory::ConfigurationAbsent.is_absorbed());
        assert!(ErrorCategory::BindingMisuse.is_absorbed());
        assert!(ErrorCategory::InvalidReference.is_absorbed());
        assert!(!ErrorCategory::ContractViolation.is_absorbed());
    }

    #[test]
    fn categories_render_in_snake_case() {
        assert_eq!(
            ErrorCategory::ConfigurationAbsent.to_string(),
            "configuration_absent"
        );
        assert_eq!(ErrorCategory::BindingMisuse.as_ref(), "binding_misuse");
    }
}

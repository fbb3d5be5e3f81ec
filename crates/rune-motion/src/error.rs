//! Error types for motion orchestration.

use thiserror::Error;

use crate::types::{ComponentId, ElementId, StateName};

/// Result type for motion operations.
pub type Result<T> = std::result::Result<T, MotionError>;

/// Errors that can occur while wiring or attaching motion.
///
/// `UnknownVariant` and `MissingState` are configuration mistakes and surface at
/// construction time. `ObserverAttachFailure` is environmental: the runtime logs it
/// and reveals the component instead of propagating it.
#[derive(Error, Debug)]
pub enum MotionError {
    /// Variant name is not registered (or not a recognised name at all).
    #[error("unknown variant: {name}")]
    UnknownVariant { name: String },

    /// Variant lacks a state the orchestrator needs.
    #[error("variant `{variant}` has no `{state}` state")]
    MissingState { variant: String, state: StateName },

    /// Target element could not be observed.
    #[error("failed to observe element {element}: {reason}")]
    ObserverAttachFailure { element: ElementId, reason: String },

    /// Component is not mounted, or cannot take the requested role.
    #[error("{component} is not {expected}")]
    InvalidComponent {
        component: ComponentId,
        expected: &'static str,
    },

    /// Variant definition could not be parsed.
    #[error("invalid variant definition: {0}")]
    InvalidDefinition(#[from] serde_json::Error),
}

impl MotionError {
    pub fn unknown_variant(name: impl Into<String>) -> Self {
        Self::UnknownVariant { name: name.into() }
    }

    pub fn attach(element: ElementId, reason: impl Into<String>) -> Self {
        Self::ObserverAttachFailure {
            element,
            reason: reason.into(),
        }
    }

    /// Returns true for errors that indicate a wiring mistake rather than an
    /// environmental fault.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::ObserverAttachFailure { .. })
    }
}

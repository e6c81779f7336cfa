//! Error types for retrofitting
//!
//! Adaptation failures are [`RetrofitError`]s and are fatal to the
//! adaptation. Failures of a single call on a handle are
//! [`Fault`](retrofit_reflect::Fault)s.

use retrofit_reflect::{EnvironmentRef, MethodContract, TypeKind, TypeName};
use retrofit_resolve::UnresolvedSet;

/// Main retrofitting error type
#[derive(Debug, thiserror::Error)]
pub enum RetrofitError {
    /// Rejected before any resolution work
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),

    /// Complete adaptation found contracts with no compatible method
    #[error("methods not implemented: {0}")]
    MethodsNotImplemented(UnresolvedSet),

    /// Every candidate environment failed to host the handle
    #[error("no suitable environment for retrofitting ({} attempt(s) failed)", .faults.len())]
    NoSuitableEnvironment {
        /// One fault per failed attempt, in attempt order
        faults: Vec<StructuralFault>,
    },

    /// Malformed configuration
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl RetrofitError {
    /// Check if the caller passed bad input
    #[inline]
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Unresolved contracts, if validation failed
    #[must_use]
    pub fn unresolved(&self) -> Option<&UnresolvedSet> {
        match self {
            Self::MethodsNotImplemented(set) => Some(set),
            _ => None,
        }
    }

    /// Structural faults, if materialization failed
    #[must_use]
    pub fn structural_faults(&self) -> &[StructuralFault] {
        match self {
            Self::NoSuitableEnvironment { faults } => faults,
            _ => &[],
        }
    }
}

/// Bad input to the façade
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidArgument {
    /// Target is `Value::Null`
    #[error("target object cannot be null")]
    NullTarget,

    /// Target is a plain value, not an object
    #[error("target must be an object, found {found}")]
    NotAnObject {
        /// Runtime type of the value passed
        found: TypeName,
    },

    /// Capability list is empty
    #[error("at least one capability is required")]
    NoCapabilities,

    /// A listed type cannot be used as a capability
    #[error("entry {index} ({name}) is a {kind:?}, not a capability")]
    NotACapability {
        /// Position in the capability list
        index: usize,
        /// Offending type
        name: TypeName,
        /// Its actual kind
        kind: TypeKind,
    },
}

/// Why one environment could not host a handle
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StructuralFault {
    /// An exposed type is not a capability
    #[error("{environment}: {name} is not a capability")]
    NotACapability {
        /// Environment attempted
        environment: EnvironmentRef,
        /// Offending type
        name: TypeName,
    },

    /// The environment cannot see an exposed capability
    #[error("{environment}: {capability} is not visible")]
    NotVisible {
        /// Environment attempted
        environment: EnvironmentRef,
        /// Invisible capability (possibly a super-capability)
        capability: TypeName,
    },

    /// Two exposed contracts clash on return type
    #[error("{environment}: {first} conflicts with {second}")]
    ConflictingReturn {
        /// Environment attempted
        environment: EnvironmentRef,
        /// Contract seen first
        first: MethodContract,
        /// Clashing contract
        second: MethodContract,
    },
}

impl StructuralFault {
    /// Environment the fault was recorded for
    #[must_use]
    pub fn environment(&self) -> &EnvironmentRef {
        match self {
            Self::NotACapability { environment, .. }
            | Self::NotVisible { environment, .. }
            | Self::ConflictingReturn { environment, .. } => environment,
        }
    }
}

/// Result alias for retrofitting
pub type RetrofitResult<T> = Result<T, RetrofitError>;

//! Call-time faults

use crate::descriptor::MethodContract;
use crate::name::TypeName;

/// Failure of a single dynamic call
///
/// Faults raised by method bodies travel back to the caller untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Fault {
    /// Raised by target code
    #[error("{kind}: {message}")]
    Raised {
        /// Fault category chosen by the method body
        kind: String,
        /// Human readable detail
        message: String,
    },

    /// The called contract has no compatible method on the target
    #[error("unsupported operation: {contract}")]
    UnsupportedOperation {
        /// Contract that could not be dispatched
        contract: MethodContract,
    },

    /// Method body was handed an object of another Rust type
    #[error("receiver mismatch: {class} does not hold a {expected}")]
    ReceiverMismatch {
        /// Class of the receiving object
        class: TypeName,
        /// Rust state type the method body expected
        expected: &'static str,
    },

    /// Arguments do not fit the called signature
    #[error("argument mismatch calling {method}: {reason}")]
    ArgumentMismatch {
        /// Method being called
        method: String,
        /// Which argument failed and why
        reason: String,
    },

    /// No exposed method accepts this call
    #[error("no method '{name}' taking {arity} argument(s) on {on}")]
    NoSuchMethod {
        /// Requested method name
        name: String,
        /// Number of arguments supplied
        arity: usize,
        /// Description of the receiver
        on: String,
    },
}

impl Fault {
    /// Create a fault raised by target code
    pub fn raised(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Raised {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create an argument mismatch fault
    pub fn argument_mismatch(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ArgumentMismatch {
            method: method.into(),
            reason: reason.into(),
        }
    }

    /// Check if this fault came from target code
    #[inline]
    #[must_use]
    pub fn is_raised(&self) -> bool {
        matches!(self, Self::Raised { .. })
    }

    /// Check if this is an unsupported-operation fault
    #[inline]
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedOperation { .. })
    }
}

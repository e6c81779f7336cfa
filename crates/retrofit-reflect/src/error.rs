//! Registry errors

use crate::descriptor::MethodContract;
use crate::name::{NameError, TypeName};

/// Errors while registering types or creating objects
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeError {
    /// Name already defined in the environment
    #[error("type '{name}' already defined in environment '{environment}'")]
    DuplicateDefinition {
        /// Clashing name
        name: TypeName,
        /// Environment already holding it
        environment: String,
    },

    /// Two methods with the same name and parameter types
    #[error("duplicate method '{method}' on {owner}")]
    DuplicateMethod {
        /// Type declaring the method twice
        owner: TypeName,
        /// Rendered signature
        method: String,
    },

    /// Supertype of the wrong kind or layout
    #[error("invalid supertype {supertype} for {owner}: {reason}")]
    InvalidSupertype {
        /// Type being registered
        owner: TypeName,
        /// Rejected supertype
        supertype: TypeName,
        /// Rule it breaks
        reason: &'static str,
    },

    /// Class declares a capability without a conforming method
    #[error("class {class} declares {contract} without implementing it")]
    MissingImplementation {
        /// Class being registered
        class: TypeName,
        /// First contract with no conforming method
        contract: MethodContract,
    },

    /// Objects can only be created from classes
    #[error("not a class: {0}")]
    NotAClass(TypeName),

    /// Object state does not match the class registration
    #[error("class {class} cannot hold state of type {actual}")]
    StateMismatch {
        /// Class the object was created from
        class: TypeName,
        /// Rust type of the supplied state
        actual: &'static str,
    },

    /// Malformed type name
    #[error("invalid type name: {0}")]
    InvalidName(#[from] NameError),
}

/// Result alias for registry operations
pub type TypeResult<T> = Result<T, TypeError>;

//! Retrofit Reflection Model
//!
//! Explicit, queryable type registry standing in for runtime reflection.
//!
//! # Core Concepts
//!
//! - [`Environment`]: Namespace that defines types and decides visibility
//! - [`TypeDescriptor`]: Registered primitive, capability or class
//! - [`MethodContract`]: One method a capability requires
//! - [`MethodDescriptor`]: Invocable method bound on a class
//! - [`Object`]: Instance of a class, the thing being adapted
//! - [`Value`]: Dynamic argument and return value
//! - [`Capable`]: Anything callable by name through its capabilities
//! - [`Fault`]: Failure of a single call
//!
//! # Example
//!
//! ```rust
//! use retrofit_reflect::{builtins, CapabilityBuilder, ClassBuilder, Environment, Object, Value};
//!
//! struct Circle { radius: f64 }
//!
//! let env = Environment::root("app");
//! let shape = CapabilityBuilder::new("geom.Shape")
//!     .in_environment(&env)
//!     .method("area", &[], &builtins::number())
//!     .build()
//!     .unwrap();
//! let circle = ClassBuilder::<Circle>::new("geom.Circle")
//!     .in_environment(&env)
//!     .method("area", &[], &builtins::float(), |c, _| {
//!         Ok(Value::Float(std::f64::consts::PI * c.radius * c.radius))
//!     })
//!     .build()
//!     .unwrap();
//!
//! let target = Object::new(&circle, Circle { radius: 1.0 }).unwrap();
//! assert_eq!(shape.contracts().len(), 1);
//! assert!(!target.class().is_assignable_to(&shape));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod builtins;

mod builder;
mod capable;
mod descriptor;
mod environment;
mod error;
mod fault;
mod name;
mod object;
mod value;

// Re-exports
pub use builder::{CapabilityBuilder, ClassBuilder};
pub use capable::Capable;
pub use descriptor::{
    Invoker, MethodContract, MethodDescriptor, Signature, TypeDescriptor, TypeKey, TypeKind,
    TypeRef,
};
pub use environment::{Environment, EnvironmentId, EnvironmentRef};
pub use error::{TypeError, TypeResult};
pub use fault::Fault;
pub use name::{NameError, TypeName};
pub use object::{Object, ObjectRef};
pub use value::Value;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for describing types and targets
    pub use crate::builtins;
    pub use crate::{
        Capable, CapabilityBuilder, ClassBuilder, Environment, EnvironmentRef, Fault,
        MethodContract, Object, ObjectRef, TypeRef, Value,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

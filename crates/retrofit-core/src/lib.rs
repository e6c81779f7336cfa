//! Retrofit Core
//!
//! Adapts an object to capabilities its class never declared, as long as
//! the class has compatible methods.
//!
//! - [`Retrofitter::complete`] checks up front that every contract resolves
//!   and reports all misses at once
//! - [`Retrofitter::partial`] always succeeds; unresolvable contracts fail
//!   with [`Fault::UnsupportedOperation`] when called
//!
//! # Example
//!
//! ```rust
//! use retrofit_core::prelude::*;
//!
//! struct Square { side: i64 }
//!
//! let env = Environment::root("geom");
//! let shape = CapabilityBuilder::new("geom.Shape")
//!     .in_environment(&env)
//!     .method("area", &[], &builtins::number())
//!     .build()
//!     .unwrap();
//! let square = ClassBuilder::<Square>::new("geom.Square")
//!     .in_environment(&env)
//!     .method("area", &[], &builtins::int(), |s, _| Ok(Value::Int(s.side * s.side)))
//!     .build()
//!     .unwrap();
//!
//! let target = Value::from(Object::new(&square, Square { side: 4 }).unwrap());
//! let handle = retrofit_core::complete(&target, &[shape]).unwrap();
//! assert_eq!(handle.call("area", &[]).unwrap(), Value::Int(16));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod materializer;
pub mod retrofitter;

// Re-exports for convenience
pub use config::{CachePolicy, RetrofitConfig};
pub use dispatcher::{AdapterDispatcher, Mode};
pub use error::{InvalidArgument, RetrofitError, RetrofitResult, StructuralFault};
pub use handle::{AdaptedHandle, HandleId};
pub use materializer::{ProxyMaterializer, ProxyShape};
pub use retrofit_reflect::{Capable, Fault};
pub use retrofitter::Retrofitter;

use once_cell::sync::Lazy;
use retrofit_reflect::{TypeRef, Value};

static DEFAULT: Lazy<Retrofitter> = Lazy::new(Retrofitter::cached);

/// Complete adaptation with the process-wide cached retrofitter
///
/// # Errors
/// See [`Retrofitter::complete`]
pub fn complete(target: &Value, capabilities: &[TypeRef]) -> RetrofitResult<AdaptedHandle> {
    DEFAULT.complete(target, capabilities)
}

/// Partial adaptation with the process-wide cached retrofitter
///
/// # Errors
/// See [`Retrofitter::partial`]
pub fn partial(target: &Value, capabilities: &[TypeRef]) -> RetrofitResult<AdaptedHandle> {
    DEFAULT.partial(target, capabilities)
}

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for retrofitting
    pub use crate::{
        AdaptedHandle, Capable, Fault, Mode, RetrofitConfig, RetrofitError, Retrofitter,
    };
    pub use retrofit_reflect::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Retrofit Resolution
//!
//! Decides which class method serves each capability contract.
//!
//! # Pipeline
//!
//! 1. [`SignatureMatcher`] ranks compatible candidates and yields a [`Resolution`]
//! 2. [`ResolutionCache`] memoizes resolutions per `(type, contract, policy)`
//! 3. [`CompletionValidator`] resolves a whole capability set up front and
//!    produces a [`DispatchTable`] or the full [`UnresolvedSet`]

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod cache;
mod matcher;
mod plan;
mod validation;

// Re-exports
pub use cache::{
    CacheKey, CacheStats, MethodResolutionCache, NoCache, ResolutionCache, DEFAULT_CAPACITY,
};
pub use matcher::{MatchPolicy, SignatureMatcher};
pub use plan::{Ambiguity, CallPlan, Resolution};
pub use validation::{CompletionValidator, DispatchTable, UnresolvedSet};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for resolving contracts
    pub use crate::{
        CompletionValidator, DispatchTable, MatchPolicy, MethodResolutionCache, Resolution,
        ResolutionCache, SignatureMatcher, UnresolvedSet,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use retrofit_reflect::{builtins, CapabilityBuilder, ClassBuilder, Object, Value};
    use std::sync::Arc;

    #[derive(Debug)]
    struct Square {
        side: i64,
    }

    #[test]
    fn validated_table_dispatches_through_cache() {
        let cache = Arc::new(MethodResolutionCache::new());
        let matcher = SignatureMatcher::new(cache.clone());

        let shape = CapabilityBuilder::new("r.Shape")
            .method("area", &[], &builtins::number())
            .build()
            .unwrap();
        let square = ClassBuilder::<Square>::new("r.Square")
            .method("area", &[], &builtins::int(), |s, _| Ok(Value::Int(s.side * s.side)))
            .build()
            .unwrap();

        let table = CompletionValidator::new()
            .validate_complete(&matcher, &[shape.clone()], &square)
            .unwrap();
        let (contract, plan) = table.iter().next().unwrap();
        let target = Object::new(&square, Square { side: 3 }).unwrap();

        assert_eq!(plan.invoke(&target, &[]).unwrap(), Value::Int(9));
        assert!(matcher.resolve(contract, &square).is_resolved());
        assert_eq!(cache.stats().hits, 1);
    }
}

//! Retrofitter façade
//!
//! Validates arguments, optionally checks completeness, then materializes a
//! handle.

use crate::config::{CachePolicy, RetrofitConfig};
use crate::dispatcher::AdapterDispatcher;
use crate::error::{InvalidArgument, RetrofitError, RetrofitResult};
use crate::handle::AdaptedHandle;
use crate::materializer::ProxyMaterializer;
use retrofit_reflect::{ObjectRef, TypeRef, Value};
use retrofit_resolve::{
    CacheStats, CompletionValidator, MethodResolutionCache, NoCache, ResolutionCache,
    SignatureMatcher,
};
use std::slice;
use std::sync::Arc;

/// Adapts objects to capabilities they never declared
#[derive(Debug, Clone)]
pub struct Retrofitter {
    config: RetrofitConfig,
    matcher: SignatureMatcher,
    validator: CompletionValidator,
    materializer: ProxyMaterializer,
}

impl Retrofitter {
    /// Create retrofitter with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RetrofitConfig::default())
    }

    /// Create retrofitter from configuration
    #[must_use]
    pub fn with_config(config: RetrofitConfig) -> Self {
        let cache: Arc<dyn ResolutionCache> = match config.cache {
            CachePolicy::Disabled => Arc::new(NoCache),
            CachePolicy::Shared => MethodResolutionCache::global(),
            CachePolicy::Dedicated => {
                Arc::new(MethodResolutionCache::with_capacity(config.cache_capacity))
            }
        };
        let matcher = SignatureMatcher::new(cache).with_policy(config.match_policy());
        let materializer = ProxyMaterializer::new()
            .with_skip_duplicate_environments(config.skip_duplicate_environments);

        Self {
            config,
            matcher,
            validator: CompletionValidator::new(),
            materializer,
        }
    }

    /// Retrofitter backed by the process-wide cache
    #[must_use]
    pub fn cached() -> Self {
        Self::with_config(RetrofitConfig::new().with_cache(CachePolicy::Shared))
    }

    /// Retrofitter that resolves every contract afresh
    #[must_use]
    pub fn uncached() -> Self {
        Self::with_config(RetrofitConfig::new().with_cache(CachePolicy::Disabled))
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RetrofitConfig {
        &self.config
    }

    /// Resolution cache statistics
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.matcher.cache().stats()
    }

    /// Drop every cached resolution
    pub fn clear_cache(&self) {
        self.matcher.cache().clear();
    }

    /// Adapt `target`, requiring every contract to resolve
    ///
    /// # Errors
    /// - [`RetrofitError::InvalidArgument`] for a bad target or capability list
    /// - [`RetrofitError::MethodsNotImplemented`] with every unresolvable contract
    /// - [`RetrofitError::NoSuitableEnvironment`] if no environment can host
    ///   the handle
    #[tracing::instrument(skip_all, fields(capabilities = capabilities.len()))]
    pub fn complete(&self, target: &Value, capabilities: &[TypeRef]) -> RetrofitResult<AdaptedHandle> {
        let object = check_arguments(target, capabilities)?;
        let table = self
            .validator
            .validate_complete(&self.matcher, capabilities, object.class())
            .map_err(|unresolved| {
                tracing::debug!(unresolved = %unresolved, "complete adaptation rejected");
                RetrofitError::MethodsNotImplemented(unresolved)
            })?;

        let dispatcher = AdapterDispatcher::complete(object, self.matcher.clone(), table);
        let handle = self.materializer.materialize(dispatcher, capabilities)?;
        tracing::info!(handle = %handle.id(), adapted = %handle, "retrofitted");
        Ok(handle)
    }

    /// Adapt `target` to a single capability, requiring every contract
    ///
    /// # Errors
    /// Same as [`Retrofitter::complete`]
    pub fn complete_one(&self, target: &Value, capability: &TypeRef) -> RetrofitResult<AdaptedHandle> {
        self.complete(target, slice::from_ref(capability))
    }

    /// Adapt `target`, resolving contracts on first call
    ///
    /// Unresolvable contracts fail with
    /// [`Fault::UnsupportedOperation`](retrofit_reflect::Fault::UnsupportedOperation)
    /// when called.
    ///
    /// # Errors
    /// - [`RetrofitError::InvalidArgument`] for a bad target or capability list
    /// - [`RetrofitError::NoSuitableEnvironment`] if no environment can host
    ///   the handle
    #[tracing::instrument(skip_all, fields(capabilities = capabilities.len()))]
    pub fn partial(&self, target: &Value, capabilities: &[TypeRef]) -> RetrofitResult<AdaptedHandle> {
        let object = check_arguments(target, capabilities)?;
        let dispatcher = AdapterDispatcher::partial(object, self.matcher.clone());
        let handle = self.materializer.materialize(dispatcher, capabilities)?;
        tracing::info!(handle = %handle.id(), adapted = %handle, "retrofitted");
        Ok(handle)
    }

    /// Adapt `target` to a single capability, resolving lazily
    ///
    /// # Errors
    /// Same as [`Retrofitter::partial`]
    pub fn partial_one(&self, target: &Value, capability: &TypeRef) -> RetrofitResult<AdaptedHandle> {
        self.partial(target, slice::from_ref(capability))
    }
}

impl Default for Retrofitter {
    fn default() -> Self {
        Self::new()
    }
}

fn check_arguments(target: &Value, capabilities: &[TypeRef]) -> Result<ObjectRef, InvalidArgument> {
    let object = match target {
        Value::Null => return Err(InvalidArgument::NullTarget),
        Value::Object(object) => Arc::clone(object),
        other => {
            return Err(InvalidArgument::NotAnObject {
                found: other.type_of().name().clone(),
            })
        }
    };

    if capabilities.is_empty() {
        return Err(InvalidArgument::NoCapabilities);
    }
    if let Some((index, entry)) = capabilities
        .iter()
        .enumerate()
        .find(|(_, c)| !c.is_capability())
    {
        return Err(InvalidArgument::NotACapability {
            index,
            name: entry.name().clone(),
            kind: entry.kind(),
        });
    }
    Ok(object)
}

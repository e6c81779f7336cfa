//! Handle materialization
//!
//! Picks the environment an adapted handle lives in. Candidates are tried in
//! order (the target class's environment, then each requested capability's)
//! and the first one able to host every exposed capability wins.

use crate::dispatcher::AdapterDispatcher;
use crate::error::{RetrofitError, RetrofitResult, StructuralFault};
use crate::handle::AdaptedHandle;
use indexmap::IndexSet;
use retrofit_reflect::{EnvironmentRef, MethodContract, ObjectRef, TypeRef};
use std::sync::Arc;

/// Capabilities and environment of a materialized handle
#[derive(Debug, Clone)]
pub struct ProxyShape {
    capabilities: Vec<TypeRef>,
    contracts: IndexSet<MethodContract>,
    environment: EnvironmentRef,
}

impl ProxyShape {
    /// Exposed capabilities, requested ones first
    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> &[TypeRef] {
        &self.capabilities
    }

    /// Every contract callable through the handle
    #[inline]
    #[must_use]
    pub fn contracts(&self) -> &IndexSet<MethodContract> {
        &self.contracts
    }

    /// Environment hosting the handle
    #[inline]
    #[must_use]
    pub fn environment(&self) -> &EnvironmentRef {
        &self.environment
    }
}

/// Builds handles inside a suitable environment
#[derive(Debug, Clone, Copy)]
pub struct ProxyMaterializer {
    skip_duplicate_environments: bool,
}

impl ProxyMaterializer {
    /// Create materializer that attempts each distinct environment once
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            skip_duplicate_environments: true,
        }
    }

    /// Set whether repeated environments are attempted again
    #[inline]
    #[must_use]
    pub fn with_skip_duplicate_environments(mut self, skip: bool) -> Self {
        self.skip_duplicate_environments = skip;
        self
    }

    /// Requested capabilities followed by the target's own, without repeats
    #[must_use]
    pub fn exposed_capabilities(target: &ObjectRef, requested: &[TypeRef]) -> Vec<TypeRef> {
        let mut out: Vec<TypeRef> = Vec::new();
        for capability in requested
            .iter()
            .cloned()
            .chain(target.class().declared_capabilities())
        {
            if !out.iter().any(|c| c.key() == capability.key()) {
                out.push(capability);
            }
        }
        out
    }

    /// Environments to attempt, in order
    ///
    /// Bootstrap types have no environment and contribute no candidate.
    #[must_use]
    pub fn candidate_environments(
        &self,
        target: &ObjectRef,
        requested: &[TypeRef],
    ) -> Vec<EnvironmentRef> {
        let mut out: Vec<EnvironmentRef> = Vec::new();
        let owners = std::iter::once(target.class()).chain(requested);

        for env in owners.filter_map(|ty| ty.environment()) {
            if self.skip_duplicate_environments && out.iter().any(|e| e.id() == env.id()) {
                continue;
            }
            out.push(Arc::clone(env));
        }
        out
    }

    /// Find an environment for the exposed capabilities and wrap `dispatcher`
    ///
    /// # Errors
    /// Returns [`RetrofitError::NoSuitableEnvironment`] with one fault per
    /// failed attempt when no candidate works
    pub fn materialize(
        &self,
        dispatcher: AdapterDispatcher,
        requested: &[TypeRef],
    ) -> RetrofitResult<AdaptedHandle> {
        let target = dispatcher.target();
        let capabilities = Self::exposed_capabilities(target, requested);
        let mut faults = Vec::new();

        for environment in self.candidate_environments(target, requested) {
            match attempt(&environment, &capabilities) {
                Ok(contracts) => {
                    tracing::debug!(
                        environment = %environment,
                        capabilities = capabilities.len(),
                        "environment accepted handle"
                    );
                    let shape = ProxyShape {
                        capabilities,
                        contracts,
                        environment,
                    };
                    return Ok(AdaptedHandle::new(shape, dispatcher));
                }
                Err(fault) => {
                    tracing::debug!(fault = %fault, "environment rejected handle");
                    faults.push(fault);
                }
            }
        }

        tracing::warn!(
            target_class = %target.class().name(),
            attempts = faults.len(),
            "no suitable environment"
        );
        Err(RetrofitError::NoSuitableEnvironment { faults })
    }
}

impl Default for ProxyMaterializer {
    fn default() -> Self {
        Self::new()
    }
}

fn attempt(
    environment: &EnvironmentRef,
    capabilities: &[TypeRef],
) -> Result<IndexSet<MethodContract>, StructuralFault> {
    for capability in capabilities {
        if !capability.is_capability() {
            return Err(StructuralFault::NotACapability {
                environment: Arc::clone(environment),
                name: capability.name().clone(),
            });
        }
        if let Some(hidden) = invisible_in(environment, capability) {
            return Err(StructuralFault::NotVisible {
                environment: Arc::clone(environment),
                capability: hidden.name().clone(),
            });
        }
    }

    let mut contracts: IndexSet<MethodContract> = IndexSet::new();
    for contract in capabilities.iter().flat_map(|c| c.contracts()) {
        if let Some(clash) = contracts.iter().find(|c| conflicts(c, &contract)) {
            return Err(StructuralFault::ConflictingReturn {
                environment: Arc::clone(environment),
                first: clash.clone(),
                second: contract,
            });
        }
        contracts.insert(contract);
    }
    Ok(contracts)
}

/// First of `capability` and its super-capabilities the environment cannot see
fn invisible_in<'a>(environment: &EnvironmentRef, capability: &'a TypeRef) -> Option<&'a TypeRef> {
    if !environment.sees(capability) {
        return Some(capability);
    }
    capability
        .supertypes()
        .iter()
        .filter(|s| s.is_capability())
        .find_map(|s| invisible_in(environment, s))
}

/// Same name and parameters with unrelated return types
fn conflicts(a: &MethodContract, b: &MethodContract) -> bool {
    a.signature().same_parameters(b.signature())
        && !a.return_type().is_assignable_to(b.return_type())
        && !b.return_type().is_assignable_to(a.return_type())
}

#[cfg(test)]
mod tests {
    use super::*;
    use retrofit_reflect::{builtins, CapabilityBuilder, ClassBuilder, Environment, Object};
    use retrofit_resolve::SignatureMatcher;

    #[derive(Debug)]
    struct Widget;

    fn widget_in(env: &EnvironmentRef, implements: Option<&TypeRef>) -> ObjectRef {
        let mut builder = ClassBuilder::<Widget>::new("m.Widget").in_environment(env);
        if let Some(capability) = implements {
            builder = builder.implements(capability);
        }
        Object::new(&builder.build().unwrap(), Widget).unwrap()
    }

    fn dispatcher(target: &ObjectRef) -> AdapterDispatcher {
        AdapterDispatcher::partial(Arc::clone(target), SignatureMatcher::uncached())
    }

    #[test]
    fn exposed_set_appends_own_capabilities() {
        let env = Environment::root("app");
        let own = CapabilityBuilder::new("m.Own").in_environment(&env).build().unwrap();
        let asked = CapabilityBuilder::new("m.Asked").in_environment(&env).build().unwrap();
        let target = widget_in(&env, Some(&own));

        let exposed =
            ProxyMaterializer::exposed_capabilities(&target, &[asked.clone(), own.clone(), asked]);
        let names: Vec<_> = exposed.iter().map(|c| c.name().as_str()).collect();
        assert_eq!(names, vec!["m.Asked", "m.Own"]);
    }

    #[test]
    fn candidates_skip_bootstrap_and_duplicates() {
        let env = Environment::root("app");
        let other = Environment::root("other");
        let target = widget_in(&env, None);
        let a = CapabilityBuilder::new("m.A").in_environment(&env).build().unwrap();
        let b = CapabilityBuilder::new("m.B").in_environment(&other).build().unwrap();
        let boot = CapabilityBuilder::new("m.Boot").build().unwrap();

        let requested = [boot, a, b];
        let deduped = ProxyMaterializer::new().candidate_environments(&target, &requested);
        assert_eq!(deduped, vec![env.clone(), other.clone()]);

        let all = ProxyMaterializer::new()
            .with_skip_duplicate_environments(false)
            .candidate_environments(&target, &requested);
        assert_eq!(all, vec![env.clone(), env, other]);
    }

    #[test]
    fn falls_back_to_capability_environment() {
        let platform = Environment::root("platform");
        let plugin = Environment::root("plugin");
        let cap = CapabilityBuilder::new("m.Plugged")
            .in_environment(&plugin)
            .build()
            .unwrap();
        let target = widget_in(&platform, None);

        // platform cannot see m.Plugged
        let handle = ProxyMaterializer::new()
            .materialize(dispatcher(&target), &[cap])
            .unwrap();
        assert_eq!(handle.environment(), &plugin);
    }

    #[test]
    fn invisible_super_capability_is_a_fault() {
        let hidden = Environment::root("hidden");
        let app = Environment::root("app");
        let base = CapabilityBuilder::new("m.Base")
            .in_environment(&hidden)
            .build()
            .unwrap();
        let derived = CapabilityBuilder::new("m.Derived")
            .in_environment(&app)
            .extends(&base)
            .build()
            .unwrap();
        let target = widget_in(&app, None);

        let err = ProxyMaterializer::new()
            .materialize(dispatcher(&target), &[derived])
            .unwrap_err();
        assert_eq!(
            err.structural_faults(),
            &[StructuralFault::NotVisible {
                environment: app,
                capability: base.name().clone(),
            }]
        );
    }

    #[test]
    fn conflicting_returns_are_rejected() {
        let env = Environment::root("app");
        let left = CapabilityBuilder::new("m.Left")
            .in_environment(&env)
            .method("value", &[], &builtins::int())
            .build()
            .unwrap();
        let right = CapabilityBuilder::new("m.Right")
            .in_environment(&env)
            .method("value", &[], &builtins::string())
            .build()
            .unwrap();
        let target = widget_in(&env, None);

        let err = ProxyMaterializer::new()
            .materialize(dispatcher(&target), &[left, right])
            .unwrap_err();
        assert!(matches!(
            err.structural_faults(),
            [StructuralFault::ConflictingReturn { .. }]
        ));
    }

    #[test]
    fn covariant_duplicates_are_compatible() {
        let env = Environment::root("app");
        let wide = CapabilityBuilder::new("m.Wide")
            .in_environment(&env)
            .method("value", &[], &builtins::number())
            .build()
            .unwrap();
        let narrow = CapabilityBuilder::new("m.Narrow")
            .in_environment(&env)
            .method("value", &[], &builtins::int())
            .build()
            .unwrap();
        let target = widget_in(&env, None);

        let handle = ProxyMaterializer::new()
            .materialize(dispatcher(&target), &[wide, narrow])
            .unwrap();
        assert_eq!(handle.contracts().count(), 2);
    }

    #[test]
    fn all_bootstrap_exhausts_without_attempts() {
        let class = ClassBuilder::<Widget>::new("m.BootWidget").build().unwrap();
        let target = Object::new(&class, Widget).unwrap();
        let cap = CapabilityBuilder::new("m.BootCap").build().unwrap();

        let err = ProxyMaterializer::new()
            .materialize(dispatcher(&target), &[cap])
            .unwrap_err();
        assert!(matches!(err, RetrofitError::NoSuitableEnvironment { ref faults } if faults.is_empty()));
    }
}

//! Signature matching
//!
//! Decides which class method, if any, serves a capability contract.
//!
//! # Matching
//! A candidate is compatible when its name and arity equal the contract's,
//! every contract parameter type is assignable to the candidate's parameter
//! type, and the candidate's return type is assignable to the contract's.
//! A contract returning `unit` may also accept any return type, depending on
//! [`MatchPolicy`].
//!
//! # Selection
//! Among compatible candidates the most specific by parameter types wins.
//! Remaining ties are broken by, in order:
//! 1. declaring class specificity (subclass over superclass)
//! 2. return type specificity
//! 3. collection order (own methods in declaration order, then each
//!    superclass's)
//!
//! A tie-break is recorded on the plan as an [`Ambiguity`].

use crate::cache::{CacheKey, NoCache, ResolutionCache};
use crate::plan::{Ambiguity, CallPlan, Resolution};
use retrofit_reflect::{builtins, MethodContract, MethodDescriptor, TypeDescriptor, TypeRef};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Matching knobs that change outcomes (and therefore cache keys)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchPolicy {
    /// A `unit` contract accepts any return type and discards the value
    pub unit_return_accepts_any: bool,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            unit_return_accepts_any: true,
        }
    }
}

/// Class method considered for a contract
#[derive(Debug, Clone)]
struct Candidate {
    method: MethodDescriptor,
    declaring: TypeRef,
}

impl Candidate {
    fn params(&self) -> &[TypeRef] {
        self.method.signature().params()
    }

    fn describe(&self) -> String {
        format!("{}::{}", self.declaring.name(), self.method.signature())
    }
}

/// Resolves contracts against class method tables
#[derive(Debug, Clone)]
pub struct SignatureMatcher {
    cache: Arc<dyn ResolutionCache>,
    policy: MatchPolicy,
}

impl SignatureMatcher {
    /// Create matcher consulting `cache`
    #[inline]
    #[must_use]
    pub fn new(cache: Arc<dyn ResolutionCache>) -> Self {
        Self {
            cache,
            policy: MatchPolicy::default(),
        }
    }

    /// Create matcher that recomputes every resolution
    #[inline]
    #[must_use]
    pub fn uncached() -> Self {
        Self::new(Arc::new(NoCache))
    }

    /// Set matching policy
    #[inline]
    #[must_use]
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Matching policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Backing cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &Arc<dyn ResolutionCache> {
        &self.cache
    }

    /// Resolve `contract` against `class`
    ///
    /// Never fails: no compatible method yields [`Resolution::Unresolvable`].
    pub fn resolve(&self, contract: &MethodContract, class: &TypeRef) -> Resolution {
        let key = CacheKey::new(class.key(), contract.clone(), self.policy);
        if let Some(hit) = self.cache.get(&key) {
            return hit;
        }

        let resolution = self.compute(contract, class);
        self.cache.insert(key, resolution.clone());
        resolution
    }

    fn compute(&self, contract: &MethodContract, class: &TypeRef) -> Resolution {
        let compatible: Vec<Candidate> = candidates(class)
            .into_iter()
            .filter(|c| self.accepts(contract, c))
            .collect();

        if compatible.is_empty() {
            tracing::debug!(contract = %contract, class = %class.name(), "no compatible method");
            return Resolution::Unresolvable;
        }

        // Keep candidates no other candidate is strictly more specific than
        let maximal: Vec<&Candidate> = compatible
            .iter()
            .filter(|c| {
                !compatible
                    .iter()
                    .any(|other| strictly_more_specific(other.params(), c.params()))
            })
            .collect();

        let mut chosen = maximal[0];
        for &candidate in &maximal[1..] {
            if wins_tie(candidate, chosen) {
                chosen = candidate;
            }
        }

        let ambiguity = (maximal.len() > 1).then(|| Ambiguity {
            passed_over: maximal
                .iter()
                .filter(|c| !std::ptr::eq(**c, chosen))
                .map(|c| c.describe())
                .collect(),
        });
        if let Some(ambiguity) = &ambiguity {
            tracing::warn!(
                contract = %contract,
                chosen = %chosen.describe(),
                passed_over = ?ambiguity.passed_over,
                "ambiguous resolution settled by tie-break"
            );
        }

        let discard_return = is_unit(contract.return_type())
            && !is_unit(chosen.method.signature().return_type());

        tracing::debug!(contract = %contract, chosen = %chosen.describe(), "resolved");
        Resolution::Plan(Arc::new(CallPlan::new(
            contract.clone(),
            chosen.method.clone(),
            Arc::clone(&chosen.declaring),
            discard_return,
            ambiguity,
        )))
    }

    fn accepts(&self, contract: &MethodContract, candidate: &Candidate) -> bool {
        let sig = candidate.method.signature();
        if sig.name() != contract.name() || sig.arity() != contract.params().len() {
            return false;
        }

        let params_fit = contract
            .params()
            .iter()
            .zip(sig.params())
            .all(|(wanted, offered)| wanted.is_assignable_to(offered));
        if !params_fit {
            return false;
        }

        sig.return_type().is_assignable_to(contract.return_type())
            || (self.policy.unit_return_accepts_any && is_unit(contract.return_type()))
    }
}

impl Default for SignatureMatcher {
    fn default() -> Self {
        Self::uncached()
    }
}

/// Methods visible on `class`, own first, then each superclass's
///
/// A superclass method with the same name and parameters as one already
/// collected is overridden and skipped.
fn candidates(class: &TypeRef) -> Vec<Candidate> {
    let mut out: Vec<Candidate> = Vec::new();
    let owners = std::iter::once(Arc::clone(class)).chain(class.superclasses());

    for owner in owners {
        for method in owner.methods() {
            let overridden = out
                .iter()
                .any(|c| c.method.signature().same_parameters(method.signature()));
            if !overridden {
                out.push(Candidate {
                    method: method.clone(),
                    declaring: Arc::clone(&owner),
                });
            }
        }
    }
    out
}

fn is_unit(ty: &TypeDescriptor) -> bool {
    ty.key() == builtins::unit().key()
}

fn pairwise_assignable(a: &[TypeRef], b: &[TypeRef]) -> bool {
    a.iter().zip(b).all(|(x, y)| x.is_assignable_to(y))
}

fn strictly_more_specific(a: &[TypeRef], b: &[TypeRef]) -> bool {
    pairwise_assignable(a, b) && !pairwise_assignable(b, a)
}

fn strictly_narrower(a: &TypeDescriptor, b: &TypeDescriptor) -> bool {
    a.is_assignable_to(b) && !b.is_assignable_to(a)
}

/// Whether `challenger` displaces the current choice among equally specific
/// candidates. Earlier collection order wins when nothing else decides.
fn wins_tie(challenger: &Candidate, current: &Candidate) -> bool {
    if strictly_narrower(&challenger.declaring, &current.declaring) {
        return true;
    }
    if strictly_narrower(&current.declaring, &challenger.declaring) {
        return false;
    }
    strictly_narrower(
        challenger.method.signature().return_type(),
        current.method.signature().return_type(),
    )
}

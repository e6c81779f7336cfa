//! Completion validation
//!
//! Checks up front that every contract of every requested capability
//! resolves, and reports all misses at once.

use crate::matcher::SignatureMatcher;
use crate::plan::{CallPlan, Resolution};
use indexmap::{IndexMap, IndexSet};
use retrofit_reflect::{MethodContract, TypeRef};
use std::fmt;
use std::sync::Arc;

/// Contracts with no compatible method
///
/// Ordered as the contracts were required; never partially built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnresolvedSet(IndexSet<MethodContract>);

impl UnresolvedSet {
    /// Check if every contract resolved
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of unresolved contracts
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check membership
    #[inline]
    #[must_use]
    pub fn contains(&self, contract: &MethodContract) -> bool {
        self.0.contains(contract)
    }

    /// Iterate in requirement order
    pub fn iter(&self) -> impl Iterator<Item = &MethodContract> {
        self.0.iter()
    }

    /// Names of the unresolved methods
    #[must_use]
    pub fn method_names(&self) -> Vec<&str> {
        self.0.iter().map(MethodContract::name).collect()
    }
}

impl fmt::Display for UnresolvedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, contract) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{contract}")?;
        }
        Ok(())
    }
}

impl FromIterator<MethodContract> for UnresolvedSet {
    fn from_iter<I: IntoIterator<Item = MethodContract>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Pre-resolved plans for a `(class, capabilities)` combination
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    entries: IndexMap<MethodContract, Arc<CallPlan>>,
}

impl DispatchTable {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the plan for a contract
    #[inline]
    #[must_use]
    pub fn get(&self, contract: &MethodContract) -> Option<&Arc<CallPlan>> {
        self.entries.get(contract)
    }

    /// Number of plans
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if table is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate plans in requirement order
    pub fn iter(&self) -> impl Iterator<Item = (&MethodContract, &Arc<CallPlan>)> {
        self.entries.iter()
    }

    fn insert(&mut self, contract: MethodContract, plan: Arc<CallPlan>) {
        self.entries.insert(contract, plan);
    }
}

/// Up-front resolvability check for complete adaptation
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionValidator;

impl CompletionValidator {
    /// Create new validator instance
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Union of the contracts of `capabilities`, in order, without duplicates
    #[must_use]
    pub fn required_contracts(capabilities: &[TypeRef]) -> IndexSet<MethodContract> {
        capabilities.iter().flat_map(|c| c.contracts()).collect()
    }

    /// Resolve every required contract against `class`
    ///
    /// # Returns
    /// - `Ok(DispatchTable)` with a plan for every contract
    /// - `Err(UnresolvedSet)` with every contract that has none
    pub fn validate_complete(
        &self,
        matcher: &SignatureMatcher,
        capabilities: &[TypeRef],
        class: &TypeRef,
    ) -> Result<DispatchTable, UnresolvedSet> {
        let required = Self::required_contracts(capabilities);
        let mut table = DispatchTable::new();
        let mut unresolved = IndexSet::new();

        for contract in required {
            match matcher.resolve(&contract, class) {
                Resolution::Plan(plan) => table.insert(contract, plan),
                Resolution::Unresolvable => {
                    unresolved.insert(contract);
                }
            }
        }

        if unresolved.is_empty() {
            tracing::debug!(class = %class.name(), plans = table.len(), "all contracts resolved");
            Ok(table)
        } else {
            tracing::debug!(
                class = %class.name(),
                unresolved = unresolved.len(),
                "contracts left unresolved"
            );
            Err(UnresolvedSet(unresolved))
        }
    }
}

//! Call dispatch for adapted handles

use retrofit_reflect::{Fault, MethodContract, ObjectRef, Value};
use retrofit_resolve::{CallPlan, DispatchTable, SignatureMatcher};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// How a handle was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Every requested contract was validated up front
    Complete,

    /// Contracts are resolved on first call
    Partial,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => f.write_str("complete"),
            Self::Partial => f.write_str("partial"),
        }
    }
}

/// Routes contract calls to the target's methods
///
/// Holds nothing mutable: a pre-resolved table (complete mode) and a matcher
/// sharing the resolution cache.
#[derive(Debug, Clone)]
pub struct AdapterDispatcher {
    target: ObjectRef,
    matcher: SignatureMatcher,
    table: Option<Arc<DispatchTable>>,
}

impl AdapterDispatcher {
    /// Dispatcher backed by a validated table
    #[must_use]
    pub fn complete(target: ObjectRef, matcher: SignatureMatcher, table: DispatchTable) -> Self {
        Self {
            target,
            matcher,
            table: Some(Arc::new(table)),
        }
    }

    /// Dispatcher resolving every contract lazily
    #[must_use]
    pub fn partial(target: ObjectRef, matcher: SignatureMatcher) -> Self {
        Self {
            target,
            matcher,
            table: None,
        }
    }

    /// Adaptation mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> Mode {
        if self.table.is_some() {
            Mode::Complete
        } else {
            Mode::Partial
        }
    }

    /// Adapted object
    #[inline]
    #[must_use]
    pub fn target(&self) -> &ObjectRef {
        &self.target
    }

    /// Plan serving `contract`, if any
    ///
    /// Contracts outside the validated table (for example those of the
    /// target's own capabilities) fall back to lazy resolution.
    #[must_use]
    pub fn plan_for(&self, contract: &MethodContract) -> Option<Arc<CallPlan>> {
        if let Some(plan) = self.table.as_ref().and_then(|t| t.get(contract)) {
            return Some(Arc::clone(plan));
        }
        self.matcher
            .resolve(contract, self.target.class())
            .into_plan()
    }

    /// Invoke `contract` on the target
    ///
    /// # Errors
    /// - [`Fault::UnsupportedOperation`] when no method serves the contract
    /// - [`Fault::ArgumentMismatch`] when `args` do not fit the contract
    /// - any fault raised by the target, unchanged
    pub fn invoke(&self, contract: &MethodContract, args: &[Value]) -> Result<Value, Fault> {
        let Some(plan) = self.plan_for(contract) else {
            tracing::debug!(contract = %contract, "unsupported operation");
            return Err(Fault::UnsupportedOperation {
                contract: contract.clone(),
            });
        };

        check_arguments(contract, args)?;
        plan.invoke(&self.target, args)
    }
}

/// Check `args` against the contract's parameter types
pub(crate) fn check_arguments(contract: &MethodContract, args: &[Value]) -> Result<(), Fault> {
    let params = contract.params();
    if params.len() != args.len() {
        return Err(Fault::argument_mismatch(
            contract.to_string(),
            format!("expected {} argument(s), got {}", params.len(), args.len()),
        ));
    }

    for (index, (param, arg)) in params.iter().zip(args).enumerate() {
        if !arg.is_instance_of(param) {
            return Err(Fault::argument_mismatch(
                contract.to_string(),
                format!(
                    "argument {index} is {}, expected {}",
                    arg.type_of().name(),
                    param.name()
                ),
            ));
        }
    }
    Ok(())
}

//! Call plans
//!
//! A [`CallPlan`] binds one [`MethodContract`] to the class method that
//! serves it. Plans are immutable and shared through [`Resolution`].

use retrofit_reflect::{Fault, MethodContract, MethodDescriptor, Object, TypeRef, Value};
use std::fmt;
use std::sync::Arc;

/// Resolved binding from a contract to a target method
#[derive(Debug, Clone)]
pub struct CallPlan {
    contract: MethodContract,
    method: MethodDescriptor,
    declaring: TypeRef,
    discard_return: bool,
    ambiguity: Option<Ambiguity>,
}

impl CallPlan {
    pub(crate) fn new(
        contract: MethodContract,
        method: MethodDescriptor,
        declaring: TypeRef,
        discard_return: bool,
        ambiguity: Option<Ambiguity>,
    ) -> Self {
        Self {
            contract,
            method,
            declaring,
            discard_return,
            ambiguity,
        }
    }

    /// Contract this plan serves
    #[inline]
    #[must_use]
    pub fn contract(&self) -> &MethodContract {
        &self.contract
    }

    /// Chosen target method
    #[inline]
    #[must_use]
    pub fn method(&self) -> &MethodDescriptor {
        &self.method
    }

    /// Class declaring the chosen method
    #[inline]
    #[must_use]
    pub fn declaring(&self) -> &TypeRef {
        &self.declaring
    }

    /// Whether the target's return value is replaced by unit
    #[inline]
    #[must_use]
    pub fn discards_return(&self) -> bool {
        self.discard_return
    }

    /// Tie report, if several candidates were equally specific
    #[inline]
    #[must_use]
    pub fn ambiguity(&self) -> Option<&Ambiguity> {
        self.ambiguity.as_ref()
    }

    /// Check if the choice was a tie-break
    #[inline]
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        self.ambiguity.is_some()
    }

    /// Run the target method
    ///
    /// # Errors
    /// Returns the target's fault unchanged
    pub fn invoke(&self, target: &Object, args: &[Value]) -> Result<Value, Fault> {
        let value = self.method.invoke(target, args)?;
        if self.discard_return {
            Ok(Value::Unit)
        } else {
            Ok(value)
        }
    }
}

impl PartialEq for CallPlan {
    fn eq(&self, other: &Self) -> bool {
        self.contract == other.contract
            && self.declaring.key() == other.declaring.key()
            && self.method.signature() == other.method.signature()
            && self.discard_return == other.discard_return
    }
}

impl fmt::Display for CallPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} => {}::{}",
            self.contract,
            self.declaring.name(),
            self.method.signature()
        )
    }
}

/// Candidates left tied after specificity ranking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity {
    /// Candidates passed over by the tie-break, as `Class::signature`
    pub passed_over: Vec<String>,
}

/// Outcome of resolving one contract against one type
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Compatible method found
    Plan(Arc<CallPlan>),

    /// No compatible method
    Unresolvable,
}

impl Resolution {
    /// Check if a plan exists
    #[inline]
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Plan(_))
    }

    /// Borrow the plan
    #[inline]
    #[must_use]
    pub fn plan(&self) -> Option<&Arc<CallPlan>> {
        match self {
            Self::Plan(plan) => Some(plan),
            Self::Unresolvable => None,
        }
    }

    /// Take the plan
    #[inline]
    #[must_use]
    pub fn into_plan(self) -> Option<Arc<CallPlan>> {
        match self {
            Self::Plan(plan) => Some(plan),
            Self::Unresolvable => None,
        }
    }
}

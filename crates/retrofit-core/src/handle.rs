//! Adapted handles
//!
//! An [`AdaptedHandle`] presents a target object as the union of its exposed
//! capabilities. Every call goes through the handle's dispatcher.

use crate::dispatcher::{AdapterDispatcher, Mode};
use crate::materializer::ProxyShape;
use retrofit_reflect::{
    builtins, Capable, EnvironmentRef, Fault, MethodContract, ObjectRef, TypeDescriptor, TypeRef,
    Value,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Unique handle identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleId(Uuid);

impl HandleId {
    /// Generate new random ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get inner UUID
    #[inline]
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for HandleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle_{}", self.0)
    }
}

/// Object adapted to a set of capabilities
#[derive(Debug, Clone)]
pub struct AdaptedHandle {
    id: HandleId,
    shape: ProxyShape,
    dispatcher: AdapterDispatcher,
}

impl AdaptedHandle {
    pub(crate) fn new(shape: ProxyShape, dispatcher: AdapterDispatcher) -> Self {
        Self {
            id: HandleId::new(),
            shape,
            dispatcher,
        }
    }

    /// Handle identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Adapted object
    #[inline]
    #[must_use]
    pub fn target(&self) -> &ObjectRef {
        self.dispatcher.target()
    }

    /// Adaptation mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.dispatcher.mode()
    }

    /// Environment hosting the handle
    #[inline]
    #[must_use]
    pub fn environment(&self) -> &EnvironmentRef {
        self.shape.environment()
    }

    /// Exposed capabilities, requested ones first
    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> &[TypeRef] {
        self.shape.capabilities()
    }

    /// Every contract callable through this handle
    pub fn contracts(&self) -> impl Iterator<Item = &MethodContract> {
        self.shape.contracts().iter()
    }

    /// Invoke one exposed contract
    ///
    /// # Errors
    /// - [`Fault::NoSuchMethod`] if `contract` is not exposed by this handle
    /// - otherwise whatever the dispatcher reports
    pub fn invoke(&self, contract: &MethodContract, args: &[Value]) -> Result<Value, Fault> {
        if !self.shape.contracts().contains(contract) {
            return Err(Fault::NoSuchMethod {
                name: contract.name().to_owned(),
                arity: contract.params().len(),
                on: self.to_string(),
            });
        }
        self.dispatcher.invoke(contract, args)
    }
}

impl Capable for AdaptedHandle {
    /// First requested capability
    fn runtime_type(&self) -> TypeRef {
        self.capabilities()
            .first()
            .cloned()
            .unwrap_or_else(builtins::any)
    }

    fn satisfies(&self, capability: &TypeDescriptor) -> bool {
        self.capabilities()
            .iter()
            .any(|c| c.is_assignable_to(capability))
    }

    fn call(&self, name: &str, args: &[Value]) -> Result<Value, Fault> {
        let contract = self
            .shape
            .contracts()
            .iter()
            .find(|c| {
                c.name() == name
                    && c.params().len() == args.len()
                    && c.params().iter().zip(args).all(|(p, a)| a.is_instance_of(p))
            })
            .ok_or_else(|| Fault::NoSuchMethod {
                name: name.to_owned(),
                arity: args.len(),
                on: self.to_string(),
            })?;
        self.dispatcher.invoke(contract, args)
    }
}

impl From<AdaptedHandle> for Value {
    fn from(handle: AdaptedHandle) -> Self {
        Value::Capable(Arc::new(handle))
    }
}

impl fmt::Display for AdaptedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} adapting {} as [", self.mode(), self.target().class().name())?;
        for (i, capability) in self.capabilities().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", capability.name())?;
        }
        f.write_str("]")
    }
}

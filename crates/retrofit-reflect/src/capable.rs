//! Values usable through their capabilities

use crate::descriptor::{TypeDescriptor, TypeRef};
use crate::fault::Fault;
use crate::object::ObjectRef;
use crate::value::Value;
use std::fmt::Debug;
use std::sync::Arc;

/// Anything that can be asked about capabilities and called by name
///
/// Implemented by plain objects here and by adapted handles downstream, so
/// either can travel as a [`Value::Capable`] argument.
pub trait Capable: Send + Sync + Debug {
    /// Type reported for this value in diagnostics
    fn runtime_type(&self) -> TypeRef;

    /// Whether this value can be used as `capability`
    fn satisfies(&self, capability: &TypeDescriptor) -> bool;

    /// Call the first method named `name` accepting `args`
    ///
    /// # Errors
    /// Returns [`Fault::NoSuchMethod`] if nothing accepts the call, or the
    /// callee's fault
    fn call(&self, name: &str, args: &[Value]) -> Result<Value, Fault>;
}

impl Capable for ObjectRef {
    fn runtime_type(&self) -> TypeRef {
        Arc::clone(self.class())
    }

    fn satisfies(&self, capability: &TypeDescriptor) -> bool {
        self.class().is_assignable_to(capability)
    }

    fn call(&self, name: &str, args: &[Value]) -> Result<Value, Fault> {
        let class = self.class();
        let owners = std::iter::once(Arc::clone(class)).chain(class.superclasses());
        for owner in owners {
            let found = owner.methods().iter().find(|m| {
                let sig = m.signature();
                sig.name() == name
                    && sig.arity() == args.len()
                    && sig.params().iter().zip(args).all(|(p, a)| a.is_instance_of(p))
            });
            if let Some(method) = found {
                return method.invoke(self, args);
            }
        }

        Err(Fault::NoSuchMethod {
            name: name.to_owned(),
            arity: args.len(),
            on: class.name().to_string(),
        })
    }
}

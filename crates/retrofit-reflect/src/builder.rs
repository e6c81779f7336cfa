//! Type registration
//!
//! [`CapabilityBuilder`] declares method contracts; [`ClassBuilder`] binds
//! Rust closures as the method bodies of a class. Errors are collected while
//! chaining and reported by `build()`.

use crate::descriptor::{
    Invoker, MethodContract, MethodDescriptor, Signature, TypeDescriptor, TypeKey, TypeKind,
    TypeRef,
};
use crate::environment::EnvironmentRef;
use crate::error::TypeError;
use crate::fault::Fault;
use crate::name::TypeName;
use crate::object::Object;
use crate::value::Value;
use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

/// Builder for capability types
#[derive(Debug)]
pub struct CapabilityBuilder {
    name: Result<TypeName, TypeError>,
    environment: Option<EnvironmentRef>,
    supertypes: Vec<TypeRef>,
    signatures: Vec<Signature>,
}

impl CapabilityBuilder {
    /// Start a capability named `name`
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: TypeName::new(name).map_err(TypeError::from),
            environment: None,
            supertypes: Vec::new(),
            signatures: Vec::new(),
        }
    }

    /// Define the capability in `env` (bootstrap otherwise)
    #[inline]
    #[must_use]
    pub fn in_environment(mut self, env: &EnvironmentRef) -> Self {
        self.environment = Some(Arc::clone(env));
        self
    }

    /// Inherit every contract of `parent`
    #[inline]
    #[must_use]
    pub fn extends(mut self, parent: &TypeRef) -> Self {
        self.supertypes.push(Arc::clone(parent));
        self
    }

    /// Declare a method contract
    #[inline]
    #[must_use]
    pub fn method(mut self, name: &str, params: &[TypeRef], return_type: &TypeRef) -> Self {
        self.signatures.push(Signature::new(name, params, return_type));
        self
    }

    /// Register the capability
    ///
    /// # Errors
    /// Returns error on a malformed name, a non-capability supertype, a
    /// duplicate method, or a name clash in the environment
    pub fn build(self) -> Result<TypeRef, TypeError> {
        let name = self.name?;

        for sup in &self.supertypes {
            if !sup.is_capability() {
                return Err(TypeError::InvalidSupertype {
                    owner: name,
                    supertype: sup.name().clone(),
                    reason: "capabilities can only extend capabilities",
                });
            }
        }
        check_unique(&name, self.signatures.iter())?;

        let key = TypeKey::next();
        if let Some(env) = &self.environment {
            env.define(&name, key)?;
        }

        Ok(Arc::new(TypeDescriptor::new(
            key,
            name,
            TypeKind::Capability,
            self.environment,
            self.supertypes,
            self.signatures,
            Vec::new(),
            None,
        )))
    }
}

/// Builder for class types holding Rust state `T`
pub struct ClassBuilder<T> {
    name: Result<TypeName, TypeError>,
    environment: Option<EnvironmentRef>,
    supertypes: Vec<TypeRef>,
    methods: Vec<MethodDescriptor>,
    _state: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> ClassBuilder<T> {
    /// Start a class named `name`
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: TypeName::new(name).map_err(TypeError::from),
            environment: None,
            supertypes: Vec::new(),
            methods: Vec::new(),
            _state: PhantomData,
        }
    }

    /// Define the class in `env` (bootstrap otherwise)
    #[inline]
    #[must_use]
    pub fn in_environment(mut self, env: &EnvironmentRef) -> Self {
        self.environment = Some(Arc::clone(env));
        self
    }

    /// Inherit methods of `superclass`
    ///
    /// The superclass must hold the same Rust state type.
    #[inline]
    #[must_use]
    pub fn extends(mut self, superclass: &TypeRef) -> Self {
        self.supertypes.push(Arc::clone(superclass));
        self
    }

    /// Declare a capability natively
    #[inline]
    #[must_use]
    pub fn implements(mut self, capability: &TypeRef) -> Self {
        self.supertypes.push(Arc::clone(capability));
        self
    }

    /// Bind a method body
    #[must_use]
    pub fn method<F>(mut self, name: &str, params: &[TypeRef], return_type: &TypeRef, body: F) -> Self
    where
        F: Fn(&T, &[Value]) -> Result<Value, Fault> + Send + Sync + 'static,
    {
        let invoker: Invoker = Arc::new(move |target: &Object, args: &[Value]| {
            let state = target.state::<T>().ok_or_else(|| Fault::ReceiverMismatch {
                class: target.class().name().clone(),
                expected: std::any::type_name::<T>(),
            })?;
            body(state, args)
        });
        self.methods.push(MethodDescriptor::new(
            Signature::new(name, params, return_type),
            invoker,
        ));
        self
    }

    /// Register the class
    ///
    /// # Errors
    /// Returns error on a malformed name, an invalid supertype, a duplicate
    /// method, a declared capability contract with no conforming method, or a
    /// name clash in the environment
    pub fn build(self) -> Result<TypeRef, TypeError> {
        let name = self.name?;
        let state_type = std::any::TypeId::of::<T>();

        let mut superclasses = 0usize;
        for sup in &self.supertypes {
            let reason = match sup.kind() {
                TypeKind::Primitive => Some("primitives cannot be extended"),
                TypeKind::Capability => None,
                TypeKind::Class if sup.state_type() != Some(state_type) => {
                    Some("superclass holds a different state type")
                }
                TypeKind::Class => {
                    superclasses += 1;
                    (superclasses > 1).then_some("at most one superclass")
                }
            };
            if let Some(reason) = reason {
                return Err(TypeError::InvalidSupertype {
                    owner: name,
                    supertype: sup.name().clone(),
                    reason,
                });
            }
        }
        check_unique(&name, self.methods.iter().map(MethodDescriptor::signature))?;

        let key = TypeKey::next();
        let class = TypeDescriptor::new(
            key,
            name,
            TypeKind::Class,
            self.environment,
            self.supertypes,
            Vec::new(),
            self.methods,
            Some(state_type),
        );
        if let Some(contract) = unimplemented_contract(&class) {
            return Err(TypeError::MissingImplementation {
                class: class.name().clone(),
                contract,
            });
        }
        if let Some(env) = class.environment() {
            env.define(class.name(), key)?;
        }

        Ok(Arc::new(class))
    }
}

/// First contract of a declared capability that no visible method conforms to
///
/// Own methods hide superclass methods with the same name and parameters. A
/// conforming method has the contract's name and arity, accepts every
/// contract parameter, and returns something assignable to the contract's
/// return type.
fn unimplemented_contract(class: &TypeDescriptor) -> Option<MethodContract> {
    let superclasses = class.superclasses();
    let mut visible: Vec<&Signature> = Vec::new();
    let inherited = superclasses.iter().flat_map(|s| s.methods());
    for sig in class.methods().iter().chain(inherited).map(MethodDescriptor::signature) {
        if !visible.iter().any(|v| v.same_parameters(sig)) {
            visible.push(sig);
        }
    }

    let required: Vec<MethodContract> = class
        .declared_capabilities()
        .iter()
        .flat_map(|c| c.contracts())
        .collect();
    required
        .into_iter()
        .find(|contract| !visible.iter().any(|sig| conforms(sig, contract)))
}

fn conforms(sig: &Signature, contract: &MethodContract) -> bool {
    sig.name() == contract.name()
        && sig.arity() == contract.params().len()
        && contract
            .params()
            .iter()
            .zip(sig.params())
            .all(|(wanted, offered)| wanted.is_assignable_to(offered))
        && sig.return_type().is_assignable_to(contract.return_type())
}

fn check_unique<'a>(
    owner: &TypeName,
    signatures: impl Iterator<Item = &'a Signature>,
) -> Result<(), TypeError> {
    let mut seen: Vec<&Signature> = Vec::new();
    for sig in signatures {
        if seen.iter().any(|s| s.same_parameters(sig)) {
            return Err(TypeError::DuplicateMethod {
                owner: owner.clone(),
                method: sig.to_string(),
            });
        }
        seen.push(sig);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins;
    use crate::environment::Environment;

    #[derive(Debug)]
    struct Circle {
        radius: f64,
    }

    #[test]
    fn capability_registers_in_environment() {
        let env = Environment::root("app");
        let cap = CapabilityBuilder::new("geom.Shape")
            .in_environment(&env)
            .method("area", &[], &builtins::number())
            .build()
            .unwrap();

        assert!(cap.is_capability());
        assert!(env.defines(cap.name()));
        assert_eq!(cap.signatures().len(), 1);
    }

    #[test]
    fn capability_rejects_class_supertype() {
        let class = ClassBuilder::<Circle>::new("b.Circle").build().unwrap();
        let result = CapabilityBuilder::new("b.Shape").extends(&class).build();
        assert!(matches!(result, Err(TypeError::InvalidSupertype { .. })));
    }

    #[test]
    fn capability_rejects_overload_with_same_params() {
        let result = CapabilityBuilder::new("b.Shape")
            .method("area", &[], &builtins::number())
            .method("area", &[], &builtins::float())
            .build();
        assert!(matches!(result, Err(TypeError::DuplicateMethod { .. })));
    }

    #[test]
    fn capability_allows_overload_with_other_params() {
        let cap = CapabilityBuilder::new("b.Scale")
            .method("scale", &[builtins::int()], &builtins::unit())
            .method("scale", &[builtins::float()], &builtins::unit())
            .build()
            .unwrap();
        assert_eq!(cap.contracts().len(), 2);
    }

    #[test]
    fn invalid_name_reported_on_build() {
        let result = CapabilityBuilder::new("bad name").build();
        assert!(matches!(result, Err(TypeError::InvalidName(_))));
    }

    #[test]
    fn class_method_invokes_body() {
        let class = ClassBuilder::<Circle>::new("b.Circle2")
            .method("radius", &[], &builtins::float(), |c, _| Ok(Value::Float(c.radius)))
            .build()
            .unwrap();
        let obj = Object::new(&class, Circle { radius: 2.0 }).unwrap();

        let result = class.methods()[0].invoke(&obj, &[]).unwrap();
        assert_eq!(result, Value::Float(2.0));
    }

    #[test]
    fn class_rejects_two_superclasses() {
        let a = ClassBuilder::<Circle>::new("b.A").build().unwrap();
        let b = ClassBuilder::<Circle>::new("b.B").build().unwrap();
        let result = ClassBuilder::<Circle>::new("b.C").extends(&a).extends(&b).build();
        assert!(matches!(result, Err(TypeError::InvalidSupertype { .. })));
    }

    #[test]
    fn class_rejects_superclass_with_other_state() {
        let base = ClassBuilder::<String>::new("b.Text").build().unwrap();
        let result = ClassBuilder::<Circle>::new("b.Round").extends(&base).build();
        assert!(matches!(
            result,
            Err(TypeError::InvalidSupertype {
                reason: "superclass holds a different state type",
                ..
            })
        ));
    }

    #[test]
    fn class_must_implement_declared_capability() {
        let env = Environment::root("app");
        let named = CapabilityBuilder::new("b.Named")
            .method("name", &[], &builtins::string())
            .build()
            .unwrap();
        let result = ClassBuilder::<Circle>::new("b.Nameless")
            .in_environment(&env)
            .implements(&named)
            .build();

        match result {
            Err(TypeError::MissingImplementation { class, contract }) => {
                assert_eq!(class.as_str(), "b.Nameless");
                assert_eq!(contract.to_string(), "b.Named::name() -> string");
            }
            other => panic!("expected missing implementation, got {other:?}"),
        }
        assert!(!env.defines(&TypeName::new("b.Nameless").unwrap()));
    }

    #[test]
    fn class_may_implement_through_superclass_and_covariance() {
        let named = CapabilityBuilder::new("b.Sized")
            .method("size", &[builtins::int()], &builtins::number())
            .build()
            .unwrap();
        let base = ClassBuilder::<Circle>::new("b.Base")
            .method("size", &[builtins::number()], &builtins::int(), |_, _| Ok(Value::Int(1)))
            .build()
            .unwrap();
        let derived = ClassBuilder::<Circle>::new("b.Derived")
            .extends(&base)
            .implements(&named)
            .build();
        assert!(derived.is_ok());
    }

    #[test]
    fn override_breaking_inherited_capability_is_rejected() {
        let named = CapabilityBuilder::new("b.Titled")
            .method("title", &[], &builtins::string())
            .build()
            .unwrap();
        let base = ClassBuilder::<Circle>::new("b.Doc")
            .implements(&named)
            .method("title", &[], &builtins::string(), |_, _| Ok(Value::from("doc")))
            .build()
            .unwrap();
        let result = ClassBuilder::<Circle>::new("b.Broken")
            .extends(&base)
            .method("title", &[], &builtins::int(), |_, _| Ok(Value::Int(0)))
            .build();
        assert!(matches!(result, Err(TypeError::MissingImplementation { .. })));
    }

    #[test]
    fn class_rejects_primitive_supertype() {
        let result = ClassBuilder::<Circle>::new("b.Num")
            .extends(&builtins::int())
            .build();
        assert!(matches!(result, Err(TypeError::InvalidSupertype { .. })));
    }
}

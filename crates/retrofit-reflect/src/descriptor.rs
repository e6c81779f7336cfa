//! Type descriptors and method signatures
//!
//! The explicit, queryable registry that stands in for runtime reflection.
//! Every registered type is a [`TypeDescriptor`] shared as a [`TypeRef`].

use crate::environment::EnvironmentRef;
use crate::fault::Fault;
use crate::name::TypeName;
use crate::object::Object;
use crate::value::Value;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared handle to a type descriptor
pub type TypeRef = Arc<TypeDescriptor>;

/// Callable body of a class method
///
/// Receives the target object and the already type-checked arguments.
pub type Invoker = Arc<dyn Fn(&Object, &[Value]) -> Result<Value, Fault> + Send + Sync>;

static NEXT_TYPE_KEY: AtomicU64 = AtomicU64::new(1);

/// Process-unique type identity
///
/// Two environments may define the same [`TypeName`]; the key tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeKey(u64);

impl TypeKey {
    pub(crate) fn next() -> Self {
        Self(NEXT_TYPE_KEY.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    #[inline]
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Builtin value type (`int`, `string`, ...)
    Primitive,

    /// Named set of method contracts
    Capability,

    /// Concrete type with invocable methods
    Class,
}

/// Method name, parameter types and return type
#[derive(Clone)]
pub struct Signature {
    name: Arc<str>,
    params: Vec<TypeRef>,
    return_type: TypeRef,
}

impl Signature {
    /// Create signature
    #[must_use]
    pub fn new(name: &str, params: &[TypeRef], return_type: &TypeRef) -> Self {
        Self {
            name: Arc::from(name),
            params: params.to_vec(),
            return_type: Arc::clone(return_type),
        }
    }

    /// Method name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered parameter types
    #[inline]
    #[must_use]
    pub fn params(&self) -> &[TypeRef] {
        &self.params
    }

    /// Number of parameters
    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Return type
    #[inline]
    #[must_use]
    pub fn return_type(&self) -> &TypeRef {
        &self.return_type
    }

    /// Same name and identical parameter types (return type ignored)
    #[must_use]
    pub fn same_parameters(&self, other: &Self) -> bool {
        self.name == other.name
            && self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| a.key() == b.key())
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.same_parameters(other) && self.return_type.key() == other.return_type.key()
    }
}

impl Eq for Signature {}

impl Hash for Signature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        for param in &self.params {
            param.key().hash(state);
        }
        self.return_type.key().hash(state);
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param.name())?;
        }
        write!(f, ") -> {}", self.return_type.name())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

/// Invocable method declared on a class
#[derive(Clone)]
pub struct MethodDescriptor {
    signature: Signature,
    invoker: Invoker,
}

impl MethodDescriptor {
    pub(crate) fn new(signature: Signature, invoker: Invoker) -> Self {
        Self { signature, invoker }
    }

    /// Method signature
    #[inline]
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Call the method body
    ///
    /// # Errors
    /// Returns whatever fault the body raises
    #[inline]
    pub fn invoke(&self, target: &Object, args: &[Value]) -> Result<Value, Fault> {
        (self.invoker)(target, args)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Registered type
pub struct TypeDescriptor {
    key: TypeKey,
    name: TypeName,
    kind: TypeKind,
    environment: Option<EnvironmentRef>,
    supertypes: Vec<TypeRef>,
    signatures: Vec<Signature>,
    methods: Vec<MethodDescriptor>,
    state_type: Option<std::any::TypeId>,
}

impl TypeDescriptor {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        key: TypeKey,
        name: TypeName,
        kind: TypeKind,
        environment: Option<EnvironmentRef>,
        supertypes: Vec<TypeRef>,
        signatures: Vec<Signature>,
        methods: Vec<MethodDescriptor>,
        state_type: Option<std::any::TypeId>,
    ) -> Self {
        Self {
            key,
            name,
            kind,
            environment,
            supertypes,
            signatures,
            methods,
            state_type,
        }
    }

    /// Type identity
    #[inline]
    #[must_use]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Qualified name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &TypeName {
        &self.name
    }

    /// Type kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Defining environment (`None` for bootstrap types)
    #[inline]
    #[must_use]
    pub fn environment(&self) -> Option<&EnvironmentRef> {
        self.environment.as_ref()
    }

    /// Direct supertypes in declaration order
    #[inline]
    #[must_use]
    pub fn supertypes(&self) -> &[TypeRef] {
        &self.supertypes
    }

    /// Method contracts declared directly on a capability
    #[inline]
    #[must_use]
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// Methods declared directly on a class
    #[inline]
    #[must_use]
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Rust type of instance state (classes only)
    #[inline]
    #[must_use]
    pub fn state_type(&self) -> Option<std::any::TypeId> {
        self.state_type
    }

    /// Check if this is a capability
    #[inline]
    #[must_use]
    pub fn is_capability(&self) -> bool {
        self.kind == TypeKind::Capability
    }

    /// Check if this is a class
    #[inline]
    #[must_use]
    pub fn is_class(&self) -> bool {
        self.kind == TypeKind::Class
    }

    /// Check if this is a builtin primitive
    #[inline]
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.kind == TypeKind::Primitive
    }

    /// Whether a value of this type can be used where `target` is expected
    ///
    /// `any` accepts everything; otherwise the types must be identical or
    /// `target` must be reachable through the supertype graph.
    #[must_use]
    pub fn is_assignable_to(&self, target: &TypeDescriptor) -> bool {
        if self.key == target.key || target.key == crate::builtins::any().key() {
            return true;
        }
        self.supertypes.iter().any(|s| s.is_assignable_to(target))
    }

    /// Superclasses, nearest first, depth-first in declaration order
    #[must_use]
    pub fn superclasses(&self) -> Vec<TypeRef> {
        let mut out: Vec<TypeRef> = Vec::new();
        collect_supers(self, TypeKind::Class, &mut out);
        out
    }

    /// Every capability contract this capability requires
    ///
    /// Own signatures first, then inherited ones from super-capabilities.
    /// Duplicates (same signature reached through several paths) are dropped.
    #[must_use]
    pub fn contracts(self: &Arc<Self>) -> Vec<MethodContract> {
        let mut out: Vec<MethodContract> = Vec::new();
        if !self.is_capability() {
            return out;
        }

        let mut owners = vec![Arc::clone(self)];
        collect_supers(self, TypeKind::Capability, &mut owners);

        for owner in owners {
            for sig in owner.signatures() {
                let contract = MethodContract::new(sig.clone(), &owner);
                if !out.contains(&contract) {
                    out.push(contract);
                }
            }
        }
        out
    }

    /// Capabilities a class declares natively
    ///
    /// Direct declarations first, then those declared by superclasses.
    #[must_use]
    pub fn declared_capabilities(&self) -> Vec<TypeRef> {
        let mut out: Vec<TypeRef> = Vec::new();
        let mut push_caps = |ty: &TypeDescriptor| {
            for sup in ty.supertypes() {
                if sup.is_capability() && !out.iter().any(|c| c.key() == sup.key()) {
                    out.push(Arc::clone(sup));
                }
            }
        };

        push_caps(self);
        for class in self.superclasses() {
            push_caps(&class);
        }
        out
    }
}

fn collect_supers(ty: &TypeDescriptor, kind: TypeKind, out: &mut Vec<TypeRef>) {
    for sup in ty.supertypes() {
        if sup.kind() == kind && !out.iter().any(|t| t.key() == sup.key()) {
            out.push(Arc::clone(sup));
            collect_supers(sup, kind, out);
        }
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("environment", &self.environment.as_ref().map(|e| e.name()))
            .finish_non_exhaustive()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One method a capability requires
///
/// Identity is the signature plus the declaring capability.
#[derive(Clone)]
pub struct MethodContract {
    signature: Signature,
    declaring: TypeRef,
}

impl MethodContract {
    /// Create contract
    #[must_use]
    pub fn new(signature: Signature, declaring: &TypeRef) -> Self {
        Self {
            signature,
            declaring: Arc::clone(declaring),
        }
    }

    /// Method signature
    #[inline]
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Method name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.signature.name()
    }

    /// Ordered parameter types
    #[inline]
    #[must_use]
    pub fn params(&self) -> &[TypeRef] {
        self.signature.params()
    }

    /// Return type
    #[inline]
    #[must_use]
    pub fn return_type(&self) -> &TypeRef {
        self.signature.return_type()
    }

    /// Declaring capability
    #[inline]
    #[must_use]
    pub fn declaring(&self) -> &TypeRef {
        &self.declaring
    }
}

impl PartialEq for MethodContract {
    fn eq(&self, other: &Self) -> bool {
        self.declaring.key() == other.declaring.key() && self.signature == other.signature
    }
}

impl Eq for MethodContract {}

impl Hash for MethodContract {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.declaring.key().hash(state);
        self.signature.hash(state);
    }
}

impl fmt::Display for MethodContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.declaring.name(), self.signature)
    }
}

impl fmt::Debug for MethodContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodContract({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{CapabilityBuilder, ClassBuilder};
    use crate::builtins;

    #[derive(Debug)]
    struct Plain;

    #[test]
    fn primitives_assignable_to_number_and_any() {
        assert!(builtins::int().is_assignable_to(&builtins::number()));
        assert!(builtins::float().is_assignable_to(&builtins::number()));
        assert!(builtins::string().is_assignable_to(&builtins::any()));
        assert!(!builtins::number().is_assignable_to(&builtins::int()));
        assert!(!builtins::int().is_assignable_to(&builtins::float()));
    }

    #[test]
    fn class_assignable_to_declared_capability() {
        let named = CapabilityBuilder::new("t.Named").build().unwrap();
        let base = ClassBuilder::<Plain>::new("t.Base")
            .implements(&named)
            .build()
            .unwrap();
        let derived = ClassBuilder::<Plain>::new("t.Derived")
            .extends(&base)
            .build()
            .unwrap();

        assert!(derived.is_assignable_to(&base));
        assert!(derived.is_assignable_to(&named));
        assert!(!base.is_assignable_to(&derived));
    }

    #[test]
    fn contracts_include_inherited_once() {
        let named = CapabilityBuilder::new("t.Named")
            .method("name", &[], &builtins::string())
            .build()
            .unwrap();
        let labelled = CapabilityBuilder::new("t.Labelled")
            .extends(&named)
            .method("label", &[], &builtins::string())
            .build()
            .unwrap();
        let both = CapabilityBuilder::new("t.Both")
            .extends(&labelled)
            .extends(&named)
            .build()
            .unwrap();

        let names: Vec<String> = both.contracts().iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["label", "name"]);
        assert_eq!(both.contracts()[1].declaring().name().as_str(), "t.Named");
    }

    #[test]
    fn declared_capabilities_walk_superclasses() {
        let a = CapabilityBuilder::new("t.A").build().unwrap();
        let b = CapabilityBuilder::new("t.B").build().unwrap();
        let base = ClassBuilder::<Plain>::new("t.Base")
            .implements(&a)
            .build()
            .unwrap();
        let derived = ClassBuilder::<Plain>::new("t.Derived")
            .extends(&base)
            .implements(&b)
            .implements(&a)
            .build()
            .unwrap();

        let caps: Vec<String> = derived
            .declared_capabilities()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(caps, vec!["t.B", "t.A"]);
    }

    #[test]
    fn contract_display() {
        let shape = CapabilityBuilder::new("geom.Shape")
            .method("scale", &[builtins::float()], &builtins::unit())
            .build()
            .unwrap();
        let contract = &shape.contracts()[0];
        assert_eq!(contract.to_string(), "geom.Shape::scale(float) -> unit");
    }

    #[test]
    fn contract_identity_includes_declaring_capability() {
        let a = CapabilityBuilder::new("t.A")
            .method("run", &[], &builtins::unit())
            .build()
            .unwrap();
        let b = CapabilityBuilder::new("t.B")
            .method("run", &[], &builtins::unit())
            .build()
            .unwrap();

        assert_eq!(a.contracts()[0].signature(), b.contracts()[0].signature());
        assert_ne!(a.contracts()[0], b.contracts()[0]);
    }
}

//! Type environments
//!
//! An [`Environment`] is a namespace that defines types and resolves names
//! with parent-first delegation. A type is only usable from an environment
//! that resolves its name back to the very same definition.

use crate::descriptor::{TypeKey, TypeRef};
use crate::error::TypeError;
use crate::name::TypeName;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared handle to an environment
pub type EnvironmentRef = Arc<Environment>;

static NEXT_ENVIRONMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique environment identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnvironmentId(u64);

impl EnvironmentId {
    fn next() -> Self {
        Self(NEXT_ENVIRONMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    #[inline]
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Type namespace with optional parent
///
/// Types without an environment belong to the bootstrap namespace and are
/// visible from everywhere.
pub struct Environment {
    id: EnvironmentId,
    name: String,
    parent: Option<EnvironmentRef>,
    defined: RwLock<HashMap<TypeName, TypeKey>>,
}

impl Environment {
    /// Create a root environment
    #[must_use]
    pub fn root(name: impl Into<String>) -> EnvironmentRef {
        Arc::new(Self {
            id: EnvironmentId::next(),
            name: name.into(),
            parent: None,
            defined: RwLock::new(HashMap::new()),
        })
    }

    /// Create an environment delegating to `parent` first
    #[must_use]
    pub fn child(name: impl Into<String>, parent: &EnvironmentRef) -> EnvironmentRef {
        Arc::new(Self {
            id: EnvironmentId::next(),
            name: name.into(),
            parent: Some(Arc::clone(parent)),
            defined: RwLock::new(HashMap::new()),
        })
    }

    /// Environment identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> EnvironmentId {
        self.id
    }

    /// Display name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent environment, if any
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<&EnvironmentRef> {
        self.parent.as_ref()
    }

    /// Record a definition
    ///
    /// # Errors
    /// Returns error if this environment already defines `name`
    pub(crate) fn define(&self, name: &TypeName, key: TypeKey) -> Result<(), TypeError> {
        let mut defined = self.defined.write();
        if defined.contains_key(name) {
            return Err(TypeError::DuplicateDefinition {
                name: name.clone(),
                environment: self.name.clone(),
            });
        }
        defined.insert(name.clone(), key);
        Ok(())
    }

    /// Resolve a name, asking the parent chain first
    #[must_use]
    pub fn resolve(&self, name: &TypeName) -> Option<TypeKey> {
        if let Some(key) = self.parent.as_ref().and_then(|p| p.resolve(name)) {
            return Some(key);
        }
        self.defined.read().get(name).copied()
    }

    /// Whether this environment defines `name` itself
    #[must_use]
    pub fn defines(&self, name: &TypeName) -> bool {
        self.defined.read().contains_key(name)
    }

    /// Whether `ty` is usable from this environment
    ///
    /// Bootstrap types are always visible. Anything else must resolve by name
    /// to the same definition; a same-named type from an unrelated environment
    /// does not count.
    #[must_use]
    pub fn sees(&self, ty: &TypeRef) -> bool {
        if ty.environment().is_none() {
            return true;
        }
        self.resolve(ty.name()) == Some(ty.key())
    }

    /// Number of types defined directly here
    #[must_use]
    pub fn len(&self) -> usize {
        self.defined.read().len()
    }

    /// Check if nothing is defined directly here
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartialEq for Environment {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Environment {}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id.0)
    }
}

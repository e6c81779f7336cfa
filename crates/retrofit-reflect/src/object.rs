//! Target objects

use crate::descriptor::TypeRef;
use crate::error::TypeError;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Shared handle to an object
pub type ObjectRef = Arc<Object>;

/// Instance of a registered class
///
/// The state is opaque to dispatch; only the class's method bodies look
/// inside it.
pub struct Object {
    class: TypeRef,
    state: Box<dyn Any + Send + Sync>,
}

impl Object {
    /// Wrap `state` as an instance of `class`
    ///
    /// # Errors
    /// Returns error if `class` is not a class or was registered for a
    /// different Rust state type
    pub fn new<T: Any + Send + Sync>(class: &TypeRef, state: T) -> Result<ObjectRef, TypeError> {
        if !class.is_class() {
            return Err(TypeError::NotAClass(class.name().clone()));
        }
        if class.state_type() != Some(std::any::TypeId::of::<T>()) {
            return Err(TypeError::StateMismatch {
                class: class.name().clone(),
                actual: std::any::type_name::<T>(),
            });
        }

        Ok(Arc::new(Self {
            class: Arc::clone(class),
            state: Box::new(state),
        }))
    }

    /// Runtime class
    #[inline]
    #[must_use]
    pub fn class(&self) -> &TypeRef {
        &self.class
    }

    /// Borrow the state as `T`
    #[inline]
    #[must_use]
    pub fn state<T: Any>(&self) -> Option<&T> {
        self.state.downcast_ref::<T>()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("class", self.class.name())
            .finish_non_exhaustive()
    }
}

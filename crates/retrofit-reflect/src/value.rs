//! Dynamic values passed through dispatch

use crate::builtins;
use crate::capable::Capable;
use crate::descriptor::{TypeDescriptor, TypeRef};
use crate::object::ObjectRef;
use std::fmt;
use std::sync::Arc;

/// Argument or return value of a dynamic call
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent reference
    #[default]
    Null,

    /// No meaningful value
    Unit,

    /// Boolean
    Bool(bool),

    /// Integer
    Int(i64),

    /// Float
    Float(f64),

    /// String
    Str(Arc<str>),

    /// Registered object
    Object(ObjectRef),

    /// Something usable through its capabilities, such as an adapted handle
    Capable(Arc<dyn Capable>),
}

impl Value {
    /// Runtime type of this value (`any` for null)
    #[must_use]
    pub fn type_of(&self) -> TypeRef {
        match self {
            Self::Null => builtins::any(),
            Self::Unit => builtins::unit(),
            Self::Bool(_) => builtins::bool(),
            Self::Int(_) => builtins::int(),
            Self::Float(_) => builtins::float(),
            Self::Str(_) => builtins::string(),
            Self::Object(obj) => Arc::clone(obj.class()),
            Self::Capable(c) => c.runtime_type(),
        }
    }

    /// Whether this value may be passed where `ty` is expected
    ///
    /// Null fits any reference type (strings, classes, capabilities, `any`)
    /// but no value primitive. A capable value fits whatever it satisfies.
    #[must_use]
    pub fn is_instance_of(&self, ty: &TypeDescriptor) -> bool {
        match self {
            Self::Null => {
                !ty.is_primitive()
                    || ty.key() == builtins::any().key()
                    || ty.key() == builtins::string().key()
            }
            Self::Capable(c) => c.satisfies(ty),
            other => other.type_of().is_assignable_to(ty),
        }
    }

    /// Check for null
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Integer payload
    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric payload, widening integers
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Boolean payload
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// String payload
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Object payload
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }

    /// View as something callable by name (objects and capable values)
    #[must_use]
    pub fn as_capable(&self) -> Option<&dyn Capable> {
        match self {
            Self::Object(v) => Some(v as &dyn Capable),
            Self::Capable(c) => Some(c.as_ref()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) | (Self::Unit, Self::Unit) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            (Self::Capable(a), Self::Capable(b)) => {
                Arc::as_ptr(a).cast::<()>() == Arc::as_ptr(b).cast::<()>()
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Unit => f.write_str("()"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v:?}"),
            Self::Object(obj) => write!(f, "<{}>", obj.class().name()),
            Self::Capable(c) => write!(f, "<{} capable>", c.runtime_type().name()),
        }
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Unit
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(Arc::from(v))
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Self::Object(v)
    }
}

impl From<Arc<dyn Capable>> for Value {
    fn from(v: Arc<dyn Capable>) -> Self {
        Self::Capable(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{CapabilityBuilder, ClassBuilder};
    use crate::object::Object;

    #[derive(Debug)]
    struct Point;

    #[test]
    fn value_types() {
        assert_eq!(Value::Int(1).type_of().name().as_str(), "int");
        assert_eq!(Value::from(1.5).type_of().name().as_str(), "float");
        assert_eq!(Value::from("x").type_of().name().as_str(), "string");
        assert_eq!(Value::Null.type_of().name().as_str(), "any");
    }

    #[test]
    fn int_is_a_number_but_not_a_float() {
        assert!(Value::Int(3).is_instance_of(&builtins::number()));
        assert!(!Value::Int(3).is_instance_of(&builtins::float()));
    }

    #[test]
    fn null_fits_references_only() {
        let cap = CapabilityBuilder::new("v.Cap").build().unwrap();
        assert!(Value::Null.is_instance_of(&cap));
        assert!(Value::Null.is_instance_of(&builtins::string()));
        assert!(!Value::Null.is_instance_of(&builtins::int()));
    }

    #[test]
    fn object_instance_of_class_and_capability() {
        let cap = CapabilityBuilder::new("v.Located").build().unwrap();
        let class = ClassBuilder::<Point>::new("v.Point")
            .implements(&cap)
            .build()
            .unwrap();
        let value = Value::from(Object::new(&class, Point).unwrap());

        assert!(value.is_instance_of(&class));
        assert!(value.is_instance_of(&cap));
        assert!(!value.is_instance_of(&builtins::string()));
    }

    #[test]
    fn object_equality_is_identity() {
        let class = ClassBuilder::<Point>::new("v.Point2").build().unwrap();
        let a = Object::new(&class, Point).unwrap();
        let b = Object::new(&class, Point).unwrap();

        assert_eq!(Value::from(Arc::clone(&a)), Value::from(Arc::clone(&a)));
        assert_ne!(Value::from(a), Value::from(b));
    }

    #[test]
    fn capable_value_uses_its_own_answers() {
        let cap = CapabilityBuilder::new("v.Drawable").build().unwrap();
        let class = ClassBuilder::<Point>::new("v.Sprite")
            .implements(&cap)
            .build()
            .unwrap();
        let obj: Arc<dyn Capable> = Arc::new(Object::new(&class, Point).unwrap());
        let value = Value::from(Arc::clone(&obj));

        assert!(value.is_instance_of(&cap));
        assert!(!value.is_instance_of(&builtins::string()));
        assert_eq!(value.type_of().key(), class.key());
        assert!(value.as_object().is_none());
        assert!(value.as_capable().is_some());
        assert_eq!(value, Value::Capable(obj));
        assert_eq!(value.to_string(), "<v.Sprite capable>");
    }

    #[test]
    fn numeric_accessors() {
        assert_eq!(Value::Int(2).as_f64(), Some(2.0));
        assert_eq!(Value::Float(2.5).as_int(), None);
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from("hi").as_str(), Some("hi"));
    }
}

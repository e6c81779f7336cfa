//! Builtin primitive types
//!
//! Bootstrap types shared by every environment: `any` is the root of the
//! hierarchy, `int` and `float` are both `number`s.

use crate::descriptor::{TypeDescriptor, TypeKey, TypeKind, TypeRef};
use crate::name::TypeName;
use once_cell::sync::Lazy;
use std::sync::Arc;

struct Builtins {
    any: TypeRef,
    unit: TypeRef,
    bool: TypeRef,
    number: TypeRef,
    int: TypeRef,
    float: TypeRef,
    string: TypeRef,
}

static BUILTINS: Lazy<Builtins> = Lazy::new(|| {
    let any = primitive("any", Vec::new());
    let number = primitive("number", Vec::new());
    Builtins {
        unit: primitive("unit", Vec::new()),
        bool: primitive("bool", Vec::new()),
        int: primitive("int", vec![Arc::clone(&number)]),
        float: primitive("float", vec![Arc::clone(&number)]),
        string: primitive("string", Vec::new()),
        number,
        any,
    }
});

fn primitive(name: &str, supertypes: Vec<TypeRef>) -> TypeRef {
    Arc::new(TypeDescriptor::new(
        TypeKey::next(),
        TypeName(Arc::from(name)),
        TypeKind::Primitive,
        None,
        supertypes,
        Vec::new(),
        Vec::new(),
        None,
    ))
}

/// Root type; everything is assignable to it
#[must_use]
pub fn any() -> TypeRef {
    Arc::clone(&BUILTINS.any)
}

/// No meaningful value
#[must_use]
pub fn unit() -> TypeRef {
    Arc::clone(&BUILTINS.unit)
}

/// Boolean
#[must_use]
pub fn bool() -> TypeRef {
    Arc::clone(&BUILTINS.bool)
}

/// Common supertype of `int` and `float`
#[must_use]
pub fn number() -> TypeRef {
    Arc::clone(&BUILTINS.number)
}

/// 64-bit signed integer
#[must_use]
pub fn int() -> TypeRef {
    Arc::clone(&BUILTINS.int)
}

/// 64-bit float
#[must_use]
pub fn float() -> TypeRef {
    Arc::clone(&BUILTINS.float)
}

/// UTF-8 string
#[must_use]
pub fn string() -> TypeRef {
    Arc::clone(&BUILTINS.string)
}

/// Look up a builtin by name
#[must_use]
pub fn by_name(name: &str) -> Option<TypeRef> {
    let b = &*BUILTINS;
    let found = match name {
        "any" => &b.any,
        "unit" => &b.unit,
        "bool" => &b.bool,
        "number" => &b.number,
        "int" => &b.int,
        "float" => &b.float,
        "string" => &b.string,
        _ => return None,
    };
    Some(Arc::clone(found))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_stable() {
        assert_eq!(int().key(), int().key());
        assert_ne!(int().key(), float().key());
    }

    #[test]
    fn builtins_live_in_bootstrap() {
        for name in ["any", "unit", "bool", "number", "int", "float", "string"] {
            let ty = by_name(name).unwrap();
            assert!(ty.environment().is_none());
            assert!(ty.is_primitive());
            assert_eq!(ty.name().as_str(), name);
        }
    }

    #[test]
    fn by_name_unknown() {
        assert!(by_name("geom.Shape").is_none());
    }
}

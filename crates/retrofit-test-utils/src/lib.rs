//! Testing utilities for the retrofit workspace
//!
//! Shared fixtures: a geometry environment with shape capabilities, a
//! circle class that never declares them, and tracing setup.

#![allow(missing_docs)]

use retrofit_reflect::{
    builtins, CapabilityBuilder, ClassBuilder, Environment, EnvironmentRef, Fault, Object,
    ObjectRef, TypeRef, Value,
};

/// Install a fmt subscriber honouring `RUST_LOG`; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub radius: f64,
}

impl Circle {
    pub fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }
}

/// Geometry types living in one environment
#[derive(Debug, Clone)]
pub struct Geometry {
    pub env: EnvironmentRef,
    /// `area() -> number`
    pub shape: TypeRef,
    /// `area() -> number`, `perimeter() -> number`, `describe() -> unit`
    pub shape2: TypeRef,
    /// `name() -> string`, declared natively by `circle`
    pub named: TypeRef,
    /// `area() -> float`, `name() -> string`, `describe() -> string`,
    /// `fail() -> unit`; implements `named` only
    pub circle: TypeRef,
}

impl Geometry {
    /// Build every geometry type inside `env`
    pub fn in_environment(env: &EnvironmentRef) -> Self {
        let shape = CapabilityBuilder::new("geom.Shape")
            .in_environment(env)
            .method("area", &[], &builtins::number())
            .build()
            .unwrap();
        let shape2 = CapabilityBuilder::new("geom.Shape2")
            .in_environment(env)
            .method("area", &[], &builtins::number())
            .method("perimeter", &[], &builtins::number())
            .method("describe", &[], &builtins::unit())
            .build()
            .unwrap();
        let named = CapabilityBuilder::new("geom.Named")
            .in_environment(env)
            .method("name", &[], &builtins::string())
            .build()
            .unwrap();
        let circle = ClassBuilder::<Circle>::new("geom.Circle")
            .in_environment(env)
            .implements(&named)
            .method("area", &[], &builtins::float(), |c, _| Ok(Value::Float(c.area())))
            .method("name", &[], &builtins::string(), |_, _| Ok(Value::from("circle")))
            .method("describe", &[], &builtins::string(), |c, _| {
                Ok(Value::from(format!("circle r={}", c.radius)))
            })
            .method("fail", &[], &builtins::unit(), |_, _| {
                Err(Fault::raised("geom.Degenerate", "radius must be positive"))
            })
            .build()
            .unwrap();

        Self {
            env: env.clone(),
            shape,
            shape2,
            named,
            circle,
        }
    }

    /// Build every geometry type in a fresh root environment
    pub fn new() -> Self {
        Self::in_environment(&Environment::root("geometry"))
    }

    pub fn circle_object(&self, radius: f64) -> ObjectRef {
        Object::new(&self.circle, Circle { radius }).unwrap()
    }

    pub fn circle_value(&self, radius: f64) -> Value {
        Value::from(self.circle_object(radius))
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

/// Platform environment with a plugin child
pub fn platform_and_plugin() -> (EnvironmentRef, EnvironmentRef) {
    let platform = Environment::root("platform");
    let plugin = Environment::child("plugin", &platform);
    (platform, plugin)
}

pub fn assert_float_eq(actual: &Value, expected: f64) {
    let actual = actual.as_f64().unwrap();
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

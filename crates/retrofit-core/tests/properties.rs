//! Property tests for resolution and dispatch.

use proptest::prelude::*;
use retrofit_core::prelude::*;
use retrofit_core::CachePolicy;
use retrofit_test_utils::Geometry;

fn number_type() -> impl Strategy<Value = TypeRef> {
    prop_oneof![
        Just(builtins::int()),
        Just(builtins::float()),
        Just(builtins::number()),
        Just(builtins::any()),
    ]
}

proptest! {
    /// Resolvable calls return the target's own value for any radius.
    #[test]
    fn adapted_area_equals_direct_area(radius in 0.0f64..1.0e6) {
        let geo = Geometry::new();
        let circle = geo.circle_object(radius);
        let handle = retrofit_core::complete(&Value::from(circle.clone()), &[geo.shape.clone()]).unwrap();

        prop_assert_eq!(handle.call("area", &[]).unwrap(), circle.call("area", &[]).unwrap());
    }

    /// Completeness agrees with assignability of the declared return type.
    #[test]
    fn completeness_follows_return_assignability(declared in number_type()) {
        let geo = Geometry::new();
        let wanted = CapabilityBuilder::new("prop.Area")
            .in_environment(&geo.env)
            .method("area", &[], &declared)
            .build()
            .unwrap();
        let retrofitter = Retrofitter::with_config(
            RetrofitConfig::new().with_cache(CachePolicy::Dedicated),
        );

        let outcome = retrofitter.complete_one(&geo.circle_value(1.0), &wanted);
        prop_assert_eq!(outcome.is_ok(), builtins::float().is_assignable_to(&declared));
    }

    /// Repeated adaptation with a cache resolves the same way every time.
    #[test]
    fn repeated_partial_calls_are_stable(rounds in 1usize..16) {
        let geo = Geometry::new();
        let retrofitter = Retrofitter::with_config(
            RetrofitConfig::new().with_cache(CachePolicy::Dedicated),
        );
        let target = geo.circle_value(2.0);

        for _ in 0..rounds {
            let handle = retrofitter.partial_one(&target, &geo.shape2).unwrap();
            prop_assert!(handle.call("perimeter", &[]).unwrap_err().is_unsupported());
            prop_assert!(handle.call("area", &[]).is_ok());
        }
    }
}

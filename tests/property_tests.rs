//! Property-based tests for the core round-trip guarantees
//!
//! Rendering then parsing gives back the same value, serde types survive the
//! text form, and flattened paths rebuild the tree they came from.

use jsonbind::path::flatten;
use jsonbind::{from_str, parse, to_string, Builder, Map, Value};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(
    value: &T,
) -> bool {
    match to_string(value) {
        Ok(serialized) => match from_str::<T>(&serialized) {
            Ok(deserialized) => *value == deserialized,
            Err(e) => {
                eprintln!("Deserialize failed: {}", e);
                eprintln!("Serialized was: {}", serialized);
                false
            }
        },
        Err(e) => {
            eprintln!("Serialize failed: {}", e);
            false
        }
    }
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1.0e9f64..1.0e9).prop_map(Value::Float),
        any::<String>().prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..6).prop_map(|members| {
                let mut map = Map::new();
                for (key, value) in members {
                    map.insert(key, value);
                }
                Value::Object(map)
            }),
        ]
    })
}

// Flattened leaves are text, so the tree holds strings only. Empty containers
// are excluded because they leave no path behind.
fn arb_string_tree() -> impl Strategy<Value = Value> {
    let leaf = "[ -~]{0,8}".prop_map(Value::String);
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z.]{1,5}", inner, 1..4).prop_map(|members| {
                let mut map = Map::new();
                for (key, value) in members {
                    map.insert(key, value);
                }
                Value::Object(map)
            }),
        ]
    })
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Event {
    id: u32,
    name: String,
    score: Option<i64>,
    tags: Vec<String>,
}

proptest! {
    #[test]
    fn prop_render_then_parse(value in arb_value()) {
        let text = value.to_string();
        prop_assert_eq!(parse(&text).unwrap(), value);
    }

    #[test]
    fn prop_rendering_is_ascii(s in any::<String>()) {
        prop_assert!(Value::String(s).to_string().is_ascii());
    }

    #[test]
    fn prop_flatten_then_build(value in arb_string_tree().prop_filter("root must be an object", Value::is_object)) {
        let rebuilt: Builder = flatten(&value).into_iter().collect();
        prop_assert_eq!(rebuilt.build(), value);
    }

    #[test]
    fn prop_i32(n in any::<i32>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_i64(n in any::<i64>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_u32(n in any::<u32>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_bool(b in any::<bool>()) {
        prop_assert!(roundtrip(&b));
    }

    #[test]
    fn prop_string(s in any::<String>()) {
        prop_assert!(roundtrip(&s));
    }

    #[test]
    fn prop_vec_i32(v in prop::collection::vec(any::<i32>(), 0..20)) {
        prop_assert!(roundtrip(&v));
    }

    #[test]
    fn prop_option_i32(opt in proptest::option::of(any::<i32>())) {
        prop_assert!(roundtrip(&opt));
    }

    #[test]
    fn prop_map(m in prop::collection::btree_map("[a-z]{1,8}", any::<i32>(), 0..10)) {
        prop_assert!(roundtrip::<BTreeMap<String, i32>>(&m));
    }

    #[test]
    fn prop_map_integer_keys(m in prop::collection::btree_map(any::<u32>(), any::<bool>(), 0..10)) {
        prop_assert!(roundtrip::<BTreeMap<u32, bool>>(&m));
    }

    #[test]
    fn prop_map_signed_keys(m in prop::collection::btree_map(any::<i64>(), "[a-z]{0,4}", 0..10)) {
        prop_assert!(roundtrip::<BTreeMap<i64, String>>(&m));
    }

    #[test]
    fn prop_map_bool_keys(m in prop::collection::btree_map(any::<bool>(), any::<i32>(), 0..3)) {
        prop_assert!(roundtrip::<BTreeMap<bool, i32>>(&m));
    }

    #[test]
    fn prop_struct(
        id in any::<u32>(),
        name in any::<String>(),
        score in proptest::option::of(any::<i64>()),
        tags in prop::collection::vec("[a-z]{0,5}", 0..5),
    ) {
        let event = Event { id, name, score, tags };
        prop_assert!(roundtrip(&event));
    }

    #[test]
    fn prop_tuple_i32_bool(t in (any::<i32>(), any::<bool>())) {
        prop_assert!(roundtrip(&t));
    }
}

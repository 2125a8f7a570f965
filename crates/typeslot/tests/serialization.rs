// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serialization engine and JSON wire format.

#![allow(clippy::unwrap_used)] // Tests can panic
#![allow(clippy::expect_used)] // Tests can panic
#![allow(clippy::float_cmp)] // Exact values are asserted on purpose

mod common;

use common::{setup, status_member};
use indexmap::IndexMap;
use std::sync::Arc;
use typeslot::{
    from_dict, json_decode, json_encode, kwargs, serialize, to_dict, Array, CallError,
    ErrorValue, FrozenMap, NumericArray, Object, SerializeConfig, SerializeError, Serializer,
    SlotType, Value,
};

fn round_trip(inst: Arc<dyn typeslot::Serializable>) {
    let class = inst.class();
    let dict = to_dict(inst.as_ref()).unwrap();
    let rebuilt = from_dict(&class, &dict, &[]).unwrap();
    assert_eq!(
        Object::Instance(Arc::clone(&inst)),
        Object::Instance(Arc::clone(&rebuilt)),
        "{} did not survive a round trip",
        inst.repr()
    );
    assert_eq!(to_dict(rebuilt.as_ref()).unwrap(), dict);

    // serializing plain data again changes nothing
    let value = serialize(&Object::Instance(inst)).unwrap();
    assert_eq!(value, Value::Mapping(dict));
    assert_eq!(serialize(&Object::from(value.clone())).unwrap(), value);
}

#[test]
fn test_simple_json() {
    setup();
    let inst = common::simple_class()
        .call(kwargs! {"exposure" => 0.1})
        .unwrap();
    assert_eq!(
        json_encode(&Object::Instance(Arc::clone(&inst))).unwrap(),
        r#"{"exposure": 0.1, "path": "/tmp/file.txt"}"#
    );

    let simple = inst.downcast_ref::<common::Simple>().unwrap();
    assert_eq!(simple.exposure, 0.1);
    assert_eq!(simple.path, "/tmp/file.txt");
}

#[test]
fn test_to_dict_order_and_typeid() {
    setup();
    let inst = common::dummy();
    let dict = to_dict(inst.as_ref()).unwrap();
    assert_eq!(
        dict.keys().collect::<Vec<_>>(),
        vec!["typeid", "boo", "bar", "NOT_CAMEL"]
    );
    assert_eq!(Value::Mapping(dict), common::dummy_expected());
    assert_eq!(inst.keys(), vec!["boo", "bar", "NOT_CAMEL"]);
}

#[test]
fn test_get_item() {
    setup();
    let inst = common::dummy();
    assert_eq!(inst.get_item("boo").unwrap(), Object::Int(3));
    assert_eq!(
        inst.get_item("typeid").unwrap(),
        Object::Str("foo:1.0".into())
    );
    let err = inst.get_item("not_camel").unwrap_err();
    assert_eq!(err.to_string(), "KeyError: 'not_camel'");
}

#[test]
fn test_round_trips() {
    setup();
    round_trip(common::dummy());
    round_trip(
        common::simple_class()
            .call(kwargs! {"exposure" => 2.5, "path" => "/data/scan.h5"})
            .unwrap(),
    );
    round_trip(
        common::long_class()
            .call(kwargs! {
                "axes" => vec!["x", "y"],
                "units" => vec!["mm", "deg"],
                "start" => vec![0.0, 1.0],
                "stop" => vec![5.0, 10.0],
                "size" => 10,
            })
            .unwrap(),
    );
    round_trip(
        common::enum_taker_class()
            .call(kwargs! {"status" => status_member("good")})
            .unwrap(),
    );
    round_trip(common::empty_class().call(kwargs! {}).unwrap());
}

#[test]
fn test_nested_array_of_instances() {
    setup();
    let inst = common::nested_class()
        .call(kwargs! {"boo" => 13, "dsarray" => common::dummy()})
        .unwrap();
    let nested = inst.downcast_ref::<common::NestedSerializable>().unwrap();
    assert_eq!(nested.dsarray.len(), 1);

    let value = serialize(&Object::Instance(Arc::clone(&inst))).unwrap();
    let expected = Value::Mapping(FrozenMap::from_pairs([
        ("typeid", Value::from("nested:1.0")),
        ("boo", Value::Int(13)),
        ("dsarray", Value::Sequence(vec![common::dummy_expected()])),
    ]));
    assert_eq!(value, expected);

    let check = [SlotType::from(common::nested_class())];
    let rebuilt = typeslot::deserialize(&value, Some(&check[..])).unwrap();
    assert_eq!(rebuilt, Object::Instance(Arc::clone(&inst)));

    round_trip(inst);
}

#[test]
fn test_mapping_of_instances() {
    setup();
    let table = common::layout_table_class()
        .call(kwargs! {
            "name" => "BRICK",
            "mri" => "ML-BRICK-01",
            "x" => 0.5,
            "y" => 32.0,
            "visible" => true,
        })
        .unwrap();
    let mut layout = IndexMap::new();
    layout.insert("part".to_string(), Object::Instance(table));
    let manager = common::layout_manager_class()
        .call(kwargs! {"part_layout" => Object::Mapping(layout)})
        .unwrap();

    let dict = to_dict(manager.as_ref()).unwrap();
    let part = dict["part_layout"].as_mapping().unwrap()["part"]
        .as_mapping()
        .unwrap()
        .clone();
    assert_eq!(part["typeid"], Value::from("layout_table:1.0"));
    assert_eq!(part["x"], Value::from(vec![0.5]));
    assert_eq!(part["visible"], Value::from(vec![true]));

    round_trip(manager);
}

#[test]
fn test_unit_default_and_null() {
    setup();
    let inst = common::many_args_class()
        .call(kwargs! {
            "axes" => "x",
            "start" => 0.0,
            "stop" => 1.0,
            "size" => 5,
        })
        .unwrap();
    let args = inst.downcast_ref::<common::ManyArgs>().unwrap();
    assert_eq!(args.units.to_string(), r#"["mm"]"#);
    assert_eq!(args.axes.to_string(), r#"["x"]"#);
    assert_eq!(args.start.as_slice(), &[Object::Float(0.0)]);

    let err = common::many_args_class()
        .call(kwargs! {
            "axes" => Object::Null,
            "start" => 0.0,
            "stop" => 1.0,
            "size" => 5,
        })
        .unwrap_err();
    assert!(err.to_string().starts_with("axes [], units [\"mm\"]"));
}

#[test]
fn test_unequal_lengths_message() {
    setup();
    let err = common::many_args_class()
        .call(kwargs! {
            "axes" => vec!["x", "y"],
            "start" => 0.0,
            "stop" => 1.0,
            "size" => 5,
        })
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"axes ["x", "y"], units ["mm"], start [0.0], stop [1.0] are not the same length"#
    );

    // through from_dict the message is wrapped in the construction error
    let map = FrozenMap::from_pairs([
        ("axes", Value::from(vec!["x", "y"])),
        ("start", Value::from(0.0)),
        ("stop", Value::from(1.0)),
        ("size", Value::from(5i64)),
    ]);
    let err = from_dict(&common::many_args_class(), &map, &[]).unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"ManyArgs raised error: axes ["x", "y"], units ["mm"], start [0.0], stop [1.0] are not the same length"#
    );
}

#[test]
fn test_enum_serializes_to_value() {
    setup();
    let inst = common::enum_taker_class()
        .call(kwargs! {"status" => status_member("good")})
        .unwrap();
    assert_eq!(
        json_encode(&Object::Instance(inst)).unwrap(),
        r#"{"status": 0}"#
    );

    let err = common::enum_taker_class()
        .call(kwargs! {"status" => status_member("bad")})
        .unwrap_err();
    assert_eq!(err, CallError::Invalid("Status.bad".into()));
}

#[test]
fn test_leaf_values() {
    let err = Object::from(ErrorValue::new("ValueError", "Bad value"));
    assert_eq!(serialize(&err).unwrap(), Value::from("ValueError: Bad value"));

    let numeric = Object::numeric(NumericArray::from(vec![1.5, 2.5]));
    assert_eq!(serialize(&numeric).unwrap(), Value::from(vec![1.5, 2.5]));

    let array = Object::Array(Array::new(
        SlotType::Int,
        vec![Object::Int(1), Object::Int(2)],
    ));
    assert_eq!(json_encode(&array).unwrap(), "[1, 2]");

    let mut map = IndexMap::new();
    map.insert("b".to_string(), Object::Bool(true));
    map.insert("a".to_string(), Object::Null);
    assert_eq!(
        json_encode(&Object::Mapping(map)).unwrap(),
        r#"{"b": true, "a": null}"#
    );
}

#[test]
fn test_json_decode_then_deserialize() {
    setup();
    let text = json_encode(&Object::Instance(common::dummy())).unwrap();
    assert_eq!(
        text,
        r#"{"typeid": "foo:1.0", "boo": 3, "bar": {"a": 42, "b": 42}, "NOT_CAMEL": [42, 42]}"#
    );
    let map = json_decode(&text).unwrap();
    let obj = typeslot::deserialize(&Value::Mapping(map), None).unwrap();
    assert_eq!(obj, Object::Instance(common::dummy()));
}

#[test]
fn test_nested_bar_values_are_rebuilt() {
    setup();
    let text = r#"{"typeid": "foo:1.0", "boo": 1,
        "bar": {"typeid": "ignored", "inner": {"typeid": "empty:1.0"}},
        "NOT_CAMEL": []}"#;
    let obj = typeslot::deserialize(&Value::Mapping(json_decode(text).unwrap()), None).unwrap();
    let dummy = obj
        .as_instance()
        .and_then(|i| i.downcast_ref::<common::DummySerializable>())
        .unwrap();
    assert_eq!(dummy.bar.keys().collect::<Vec<_>>(), vec!["inner"]);
    assert!(dummy.bar["inner"]
        .as_instance()
        .unwrap()
        .is::<common::EmptySerializable>());
    assert!(dummy.not_camel.is_empty());
}

#[test]
fn test_depth_limit() {
    let serializer = Serializer::with_config(
        typeslot::Registry::global(),
        SerializeConfig::default().max_depth(3),
    );
    let mut value = Object::Int(1);
    for _ in 0..5 {
        value = Object::List(vec![value]);
    }
    assert_eq!(
        serializer.serialize(&value).unwrap_err(),
        SerializeError::DepthExceeded(3)
    );
    assert!(serialize(&value).is_ok());
}

#[test]
fn test_config_from_file() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max_depth = 16\npretty_json = true").unwrap();
    let config = SerializeConfig::from_file(file.path()).unwrap();
    assert_eq!(config.max_depth, 16);
    assert!(config.pretty_json);

    let serializer = Serializer::with_config(typeslot::Registry::global(), config);
    let mut map = IndexMap::new();
    map.insert("a".to_string(), Object::Int(1));
    assert_eq!(
        serializer.json_encode(&Object::Mapping(map)).unwrap(),
        "{\n  \"a\": 1\n}"
    );

    let mut bad = tempfile::NamedTempFile::new().unwrap();
    writeln!(bad, "max_depth = 0").unwrap();
    assert!(SerializeConfig::from_file(bad.path()).is_err());
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Annotated fixture classes shared by the integration tests.

#![allow(dead_code)]
#![allow(clippy::missing_panics_doc)] // Fixtures panic on bad definitions

use indexmap::IndexMap;
use std::sync::{Arc, OnceLock};
use typeslot::{
    register, Array, CallArgs, CallError, Class, ClassRef, EnumDescriptor, EnumLike, EnumValue,
    EnumVariant, Namespace, Object, Serializable, Slot, SlotType, TypeExpr, Value,
};

/// Install a test logger and make sure every fixture class is bound and
/// registered.
pub fn setup() {
    let _ = env_logger::builder().is_test(true).try_init();
    simple_class();
    long_class();
    many_args_class();
    composition_class();
    enum_taker_class();
    layout_table_class();
    layout_manager_class();
    dummy_class();
    empty_class();
    nested_class();
}

pub fn slot(name: &str) -> Arc<Slot> {
    namespace()
        .slot(name)
        .unwrap_or_else(|| panic!("{} is not a slot", name))
}

pub fn status() -> Arc<EnumDescriptor> {
    static STATUS: OnceLock<Arc<EnumDescriptor>> = OnceLock::new();
    STATUS
        .get_or_init(|| {
            Arc::new(EnumDescriptor::new(
                "Status",
                vec![
                    EnumVariant::new("good", 0i64),
                    EnumVariant::new("bad", 1i64),
                    EnumVariant::new("ugly", 2i64),
                ],
            ))
        })
        .clone()
}

/// Type aliases used by the fixtures.
pub fn namespace() -> &'static Namespace {
    static NS: OnceLock<Namespace> = OnceLock::new();
    NS.get_or_init(build_namespace)
}

fn build_namespace() -> Namespace {
    let mut ns = Namespace::new();

    ns.capture("The exposure to be active for", |s| {
        s.bind("Exposure", SlotType::Float);
    })
    .expect("Exposure");
    ns.capture("The full path to the text file to write", |s| {
        s.bind("Path", SlotType::Str);
    })
    .expect("Path");

    let aliases = [
        ("Axes", "The scannable axes, e.g. ['x', 'y'] or 'x'", TypeExpr::SequenceOf(SlotType::Str)),
        ("Units", "The scannable units, e.g. ['mm', 'deg'] or 'mm'", TypeExpr::SequenceOf(SlotType::Str)),
        ("Start", "The first point to be generated, e.g. [0., 2.4] or 1.", TypeExpr::SequenceOf(SlotType::Float)),
        ("Stop", "The final point to be generated, e.g. [-8., 6.4] or 5.", TypeExpr::SequenceOf(SlotType::Float)),
        ("Size", "The number of points to generate, e.g. 5", TypeExpr::Bare(SlotType::Int)),
        ("Alternate", "Whether to reverse on alternate runs", TypeExpr::Bare(SlotType::Bool)),
        ("AStatus", "The status", TypeExpr::Bare(SlotType::Enum(status()))),
        ("Name", "Name of layout part", TypeExpr::SequenceOf(SlotType::Str)),
        ("MRI", "Malcolm full name of child block", TypeExpr::SequenceOf(SlotType::Str)),
        ("X", "X Coordinate of child block", TypeExpr::SequenceOf(SlotType::Float)),
        ("Y", "Y Coordinate of child block", TypeExpr::SequenceOf(SlotType::Float)),
        ("Visible", "Whether child block is visible", TypeExpr::SequenceOf(SlotType::Bool)),
        (
            "PartLayout",
            "Layouts for objects",
            TypeExpr::MappingOf(
                SlotType::Str,
                SlotType::Class(ClassRef::of::<LayoutTable>("LayoutTable")),
            ),
        ),
        ("ABoo", "A Boo", TypeExpr::Bare(SlotType::Int)),
        ("ABar", "A Bar", TypeExpr::MappingOf(SlotType::Str, SlotType::Any)),
        ("ANotCamel", "A Not Camel", TypeExpr::SequenceOf(SlotType::Int)),
        (
            "ADSArray",
            "A DSArray",
            TypeExpr::SequenceOf(SlotType::Class(ClassRef::of::<DummySerializable>(
                "DummySerializable",
            ))),
        ),
    ];
    for (name, description, expr) in aliases {
        ns.define(name, description, expr).expect(name);
    }

    let not_camel = ns.get("ANotCamel").cloned().expect("ANotCamel");
    ns.bind(
        "UNotCamel",
        TypeExpr::Union(vec![not_camel, TypeExpr::SequenceOf(SlotType::Int)]),
    );
    ns
}

fn union_of(alias: &str, seq: SlotType, single: SlotType) -> TypeExpr {
    TypeExpr::Union(vec![
        TypeExpr::Slot(slot(alias)),
        TypeExpr::SequenceOf(seq),
        TypeExpr::Bare(single),
    ])
}

// ---------------------------------------------------------------------------
// Simple
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, typeslot::Serializable)]
#[serializable(class = "simple_class")]
pub struct Simple {
    pub exposure: f64,
    pub path: String,
}

pub fn simple_class() -> Arc<Class> {
    static CLASS: OnceLock<Arc<Class>> = OnceLock::new();
    CLASS
        .get_or_init(|| {
            Class::builder("Simple")
                .param("exposure", slot("Exposure"))
                .param_with_default("path", slot("Path"), "/tmp/file.txt")
                .constructor(|args| {
                    Ok(Simple {
                        exposure: args.take("exposure")?,
                        path: args.take("path")?,
                    })
                })
                .bind::<Simple>()
                .expect("Simple")
        })
        .clone()
}

// ---------------------------------------------------------------------------
// Long: typed by a tuple type comment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, typeslot::Serializable)]
#[serializable(class = "long_class")]
pub struct Long {
    pub axes: Array,
    pub units: Array,
    pub start: Array,
    pub stop: Array,
    pub size: i64,
    pub alternate: bool,
}

pub const LONG_SOURCE: &str = "\
def __init__(self, axes, units, start, stop, size, alternate=False):
    # type: (Axes, Units, Start, Stop, Size, Alternate) -> None
    self.axes = axes
";

pub fn long_class() -> Arc<Class> {
    static CLASS: OnceLock<Arc<Class>> = OnceLock::new();
    CLASS
        .get_or_init(|| {
            Class::builder("Long")
                .untyped_param("self")
                .untyped_param("axes")
                .untyped_param("units")
                .untyped_param("start")
                .untyped_param("stop")
                .untyped_param("size")
                .untyped_param_with_default("alternate", false)
                .type_comments(LONG_SOURCE)
                .namespace(namespace())
                .constructor(|args| {
                    Ok(Long {
                        axes: args.take_array("axes")?,
                        units: args.take_array("units")?,
                        start: args.take_array("start")?,
                        stop: args.take_array("stop")?,
                        size: args.take("size")?,
                        alternate: args.take("alternate")?,
                    })
                })
                .bind::<Long>()
                .expect("Long")
        })
        .clone()
}

// ---------------------------------------------------------------------------
// ManyArgs: union declarations, equal-length arrays
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, typeslot::Serializable)]
#[serializable(class = "many_args_class")]
pub struct ManyArgs {
    pub axes: Array,
    pub start: Array,
    pub stop: Array,
    pub size: i64,
    pub units: Array,
    pub alternate: bool,
}

pub fn many_args_class() -> Arc<Class> {
    static CLASS: OnceLock<Arc<Class>> = OnceLock::new();
    CLASS
        .get_or_init(|| {
            Class::builder("ManyArgs")
                .param("axes", union_of("Axes", SlotType::Str, SlotType::Str))
                .param("start", union_of("Start", SlotType::Float, SlotType::Float))
                .param("stop", union_of("Stop", SlotType::Float, SlotType::Float))
                .param("size", slot("Size"))
                .param_with_default(
                    "units",
                    union_of("Units", SlotType::Str, SlotType::Str),
                    Value::from(vec!["mm"]),
                )
                .param_with_default("alternate", slot("Alternate"), false)
                .constructor(|args| {
                    let inst = ManyArgs {
                        axes: args.take_array("axes")?,
                        start: args.take_array("start")?,
                        stop: args.take_array("stop")?,
                        size: args.take("size")?,
                        units: args.take_array("units")?,
                        alternate: args.take("alternate")?,
                    };
                    let n = inst.axes.len();
                    if inst.units.len() != n || inst.start.len() != n || inst.stop.len() != n {
                        return Err(CallError::Invalid(format!(
                            "axes {}, units {}, start {}, stop {} are not the same length",
                            inst.axes, inst.units, inst.start, inst.stop
                        )));
                    }
                    Ok(inst)
                })
                .bind::<ManyArgs>()
                .expect("ManyArgs")
        })
        .clone()
}

// ---------------------------------------------------------------------------
// CompositionClass: holds a child that is not part of its signature
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, typeslot::Serializable)]
#[serializable(class = "composition_class")]
pub struct CompositionClass {
    pub exposure: f64,
    pub path: String,
    #[serializable(skip)]
    pub child: Simple,
}

pub fn composition_class() -> Arc<Class> {
    static CLASS: OnceLock<Arc<Class>> = OnceLock::new();
    CLASS
        .get_or_init(|| {
            Class::builder("CompositionClass")
                .untyped_param("self")
                .untyped_param("exposure")
                .untyped_param("path")
                .type_comments(
                    "def __init__(self, exposure, path):\n    # type: (Exposure, Path) -> None\n",
                )
                .namespace(namespace())
                .constructor(|args| {
                    let exposure: f64 = args.take("exposure")?;
                    let path: String = args.take("path")?;
                    Ok(CompositionClass {
                        child: Simple {
                            exposure,
                            path: path.clone(),
                        },
                        exposure,
                        path,
                    })
                })
                .bind::<CompositionClass>()
                .expect("CompositionClass")
        })
        .clone()
}

// ---------------------------------------------------------------------------
// EnumTaker
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, typeslot::Serializable)]
#[serializable(class = "enum_taker_class")]
pub struct EnumTaker {
    pub status: EnumValue,
}

pub fn status_member(variant: &str) -> EnumValue {
    let desc = status();
    let v = desc
        .variant(variant)
        .unwrap_or_else(|| panic!("no Status.{}", variant));
    EnumValue::new(desc.name.clone(), v.name.clone(), v.value.clone())
}

fn take_status(args: &mut CallArgs<'_>) -> Result<EnumValue, CallError> {
    let value = args.take_object("status")?;
    let got = value.kind_name();
    let member = match value {
        Object::Enum(e) => Some(EnumValue::new(e.enum_name(), e.variant(), e.value())),
        other => other.as_plain().and_then(|v| {
            let desc = status();
            desc.variant_by_value(&v)
                .map(|var| EnumValue::new(desc.name.clone(), var.name.clone(), var.value.clone()))
        }),
    };
    member.ok_or_else(|| CallError::Conversion {
        name: "status".into(),
        expected: "Status".into(),
        got,
    })
}

pub fn enum_taker_class() -> Arc<Class> {
    static CLASS: OnceLock<Arc<Class>> = OnceLock::new();
    CLASS
        .get_or_init(|| {
            Class::builder("EnumTaker")
                .param("status", slot("AStatus"))
                .constructor(|args| {
                    let status = take_status(args)?;
                    if status.variant() != "good" {
                        return Err(CallError::Invalid(format!("Status.{}", status.variant())));
                    }
                    Ok(EnumTaker { status })
                })
                .bind::<EnumTaker>()
                .expect("EnumTaker")
        })
        .clone()
}

// ---------------------------------------------------------------------------
// LayoutTable / LayoutManager: mapping of registered instances
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, typeslot::Serializable)]
#[serializable(class = "layout_table_class")]
pub struct LayoutTable {
    pub name: Array,
    pub mri: Array,
    pub x: Array,
    pub y: Array,
    pub visible: Array,
}

pub fn layout_table_class() -> Arc<Class> {
    static CLASS: OnceLock<Arc<Class>> = OnceLock::new();
    CLASS
        .get_or_init(|| {
            let class = Class::builder("LayoutTable")
                .untyped_param("self")
                .untyped_param("name")
                .untyped_param("mri")
                .untyped_param("x")
                .untyped_param("y")
                .untyped_param("visible")
                .type_comments(
                    "def __init__(self, name, mri, x, y, visible):\n    # type: (Name, MRI, X, Y, Visible) -> None\n",
                )
                .namespace(namespace())
                .constructor(|args| {
                    Ok(LayoutTable {
                        name: args.take_array("name")?,
                        mri: args.take_array("mri")?,
                        x: args.take_array("x")?,
                        y: args.take_array("y")?,
                        visible: args.take_array("visible")?,
                    })
                })
                .bind::<LayoutTable>()
                .expect("LayoutTable");
            register("layout_table:1.0", &class)
        })
        .clone()
}

#[derive(Debug, Clone, typeslot::Serializable)]
#[serializable(class = "layout_manager_class")]
pub struct LayoutManager {
    pub part_layout: IndexMap<String, LayoutTable>,
}

pub fn layout_manager_class() -> Arc<Class> {
    static CLASS: OnceLock<Arc<Class>> = OnceLock::new();
    CLASS
        .get_or_init(|| {
            Class::builder("LayoutManager")
                .param("part_layout", slot("PartLayout"))
                .constructor(|args| {
                    Ok(LayoutManager {
                        part_layout: args.take("part_layout")?,
                    })
                })
                .bind::<LayoutManager>()
                .expect("LayoutManager")
        })
        .clone()
}

// ---------------------------------------------------------------------------
// Registered serializables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, typeslot::Serializable)]
#[serializable(class = "dummy_class")]
pub struct DummySerializable {
    pub boo: i64,
    pub bar: IndexMap<String, Object>,
    #[serializable(rename = "NOT_CAMEL")]
    pub not_camel: Array,
}

pub fn dummy_class() -> Arc<Class> {
    static CLASS: OnceLock<Arc<Class>> = OnceLock::new();
    CLASS
        .get_or_init(|| {
            let class = Class::builder("DummySerializable")
                .untyped_param("self")
                .untyped_param("boo")
                .untyped_param("bar")
                .untyped_param("NOT_CAMEL")
                .type_comments(
                    "def __init__(self, boo, bar, NOT_CAMEL):\n    # type: (ABoo, ABar, UNotCamel) -> None\n",
                )
                .namespace(namespace())
                .constructor(|args| {
                    let boo = args.take("boo")?;
                    let bar = match args.take_object("bar")? {
                        Object::Mapping(map) => {
                            let mut out = IndexMap::new();
                            for (k, v) in map {
                                if k != typeslot::TYPEID_KEY {
                                    out.insert(k, args.deserialize(v)?);
                                }
                            }
                            out
                        }
                        other => {
                            return Err(CallError::Conversion {
                                name: "bar".into(),
                                expected: "mapping".into(),
                                got: other.kind_name(),
                            })
                        }
                    };
                    Ok(DummySerializable {
                        boo,
                        bar,
                        not_camel: args.take_array("NOT_CAMEL")?,
                    })
                })
                .bind::<DummySerializable>()
                .expect("DummySerializable");
            register("foo:1.0", &class)
        })
        .clone()
}

#[derive(Debug, Clone, typeslot::Serializable)]
#[serializable(class = "empty_class")]
pub struct EmptySerializable {}

pub fn empty_class() -> Arc<Class> {
    static CLASS: OnceLock<Arc<Class>> = OnceLock::new();
    CLASS
        .get_or_init(|| {
            let class = Class::builder("EmptySerializable")
                .constructor(|_| Ok(EmptySerializable {}))
                .bind::<EmptySerializable>()
                .expect("EmptySerializable");
            register("empty:1.0", &class)
        })
        .clone()
}

#[derive(Debug, Clone, typeslot::Serializable)]
#[serializable(class = "nested_class")]
pub struct NestedSerializable {
    pub boo: i64,
    pub dsarray: Array,
}

pub fn nested_class() -> Arc<Class> {
    static CLASS: OnceLock<Arc<Class>> = OnceLock::new();
    CLASS
        .get_or_init(|| {
            let dsarray = TypeExpr::Union(vec![
                TypeExpr::Slot(slot("ADSArray")),
                TypeExpr::SequenceOf(SlotType::Class(ClassRef::of::<DummySerializable>(
                    "DummySerializable",
                ))),
            ]);
            let class = Class::builder("NestedSerializable")
                .param("boo", slot("ABoo"))
                .param("dsarray", dsarray)
                .constructor(|args| {
                    Ok(NestedSerializable {
                        boo: args.take("boo")?,
                        dsarray: args.take_array("dsarray")?,
                    })
                })
                .bind::<NestedSerializable>()
                .expect("NestedSerializable");
            register("nested:1.0", &class)
        })
        .clone()
}

/// `DummySerializable(3, {"a": 42, "b": 42}, [42, 42])`.
pub fn dummy() -> Arc<dyn Serializable> {
    dummy_class()
        .call(typeslot::kwargs! {
            "boo" => 3,
            "bar" => Value::Mapping(typeslot::FrozenMap::from_pairs([("a", 42i64), ("b", 42i64)])),
            "NOT_CAMEL" => vec![42i64, 42],
        })
        .expect("DummySerializable")
}

/// Expected `to_dict` of [`dummy`].
pub fn dummy_expected() -> Value {
    Value::Mapping(typeslot::FrozenMap::from_pairs([
        ("typeid", Value::from("foo:1.0")),
        ("boo", Value::Int(3)),
        (
            "bar",
            Value::Mapping(typeslot::FrozenMap::from_pairs([("a", 42i64), ("b", 42i64)])),
        ),
        ("NOT_CAMEL", Value::from(vec![42i64, 42])),
    ]))
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # typeslot - runtime type metadata and serialization
//!
//! Describe parameters and return values of callables and class
//! constructors with [`Slot`]s (description, declared type, sequence or
//! mapping shape, default), discover them at runtime, and walk annotated
//! instances to and from an ordered plain-data tree.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::{Arc, OnceLock};
//! use typeslot::{define_type, Class, Object, Serializable, SlotType, TypeExpr};
//!
//! #[derive(Debug, Clone, Serializable)]
//! #[serializable(class = "simple_class")]
//! struct Simple {
//!     exposure: f64,
//!     path: String,
//! }
//!
//! fn simple_class() -> Arc<Class> {
//!     static CLASS: OnceLock<Arc<Class>> = OnceLock::new();
//!     CLASS
//!         .get_or_init(|| {
//!             let exposure = define_type("Exposure", "The exposure to be active for",
//!                 TypeExpr::Bare(SlotType::Float)).unwrap();
//!             let path = define_type("Path", "The full path to the text file to write",
//!                 TypeExpr::Bare(SlotType::Str)).unwrap();
//!             Class::builder("Simple")
//!                 .param("exposure", exposure)
//!                 .param_with_default("path", path, "/tmp/file.txt")
//!                 .constructor(|args| Ok(Simple {
//!                     exposure: args.take("exposure")?,
//!                     path: args.take("path")?,
//!                 }))
//!                 .bind::<Simple>()
//!                 .unwrap()
//!         })
//!         .clone()
//! }
//!
//! let inst = simple_class().call(typeslot::kwargs! {"exposure" => 0.1}).unwrap();
//! assert_eq!(
//!     typeslot::json_encode(&Object::Instance(inst)).unwrap(),
//!     r#"{"exposure": 0.1, "path": "/tmp/file.txt"}"#
//! );
//! ```
//!
//! ## Modules Overview
//!
//! - [`slot`] - slots, declared types and shapes
//! - [`capture`] - turning type aliases into slots
//! - [`signature`] - signature extraction (inline and `# type:` comments)
//! - [`binding`] - annotated classes, keyword construction, annotated functions
//! - [`serialize`] - object graph to plain data and back
//! - [`registry`] - typeid to class lookup
//! - [`json`] - JSON wire format

extern crate self as typeslot;

pub mod array;
pub mod binding;
pub mod capture;
pub mod config;
pub mod error;
pub mod json;
pub mod object;
pub mod registry;
pub mod serialize;
pub mod signature;
pub mod slot;
pub mod value;
pub mod widgets;

pub use array::{to_array, Array};
pub use binding::{
    add_call_types, class_of, make_repr, register, AnnotatedFn, CallArgs, Class, ClassBuilder,
    Constructor, Kwargs,
};
pub use capture::{define_type, Namespace, TypeExpr};
pub use config::SerializeConfig;
pub use error::{
    CallError, CaptureError, ConfigError, Error, JsonError, KeyError, RegistryError, Result,
    SerializeError, ShapeError, SignatureError, WidgetError,
};
pub use json::{json_decode, json_encode};
pub use object::{
    EnumLike, EnumValue, ErrorValue, FromObject, NumericArray, NumericArrayLike, Object,
    ScalarKind, Serializable, ToObject,
};
pub use registry::{Registry, TYPEID_KEY};
pub use serialize::{deserialize, from_dict, serialize, to_dict, Serializer};
pub use signature::{extract_signature, CallableDecl, ParamDecl, Signature};
pub use slot::{ClassRef, EnumDescriptor, EnumVariant, Slot, SlotDefault, SlotShape, SlotType, TypeRef};
pub use value::{FrozenMap, Value};
pub use widgets::{Widget, WidgetRegistry};

pub use typeslot_codegen::Serializable;

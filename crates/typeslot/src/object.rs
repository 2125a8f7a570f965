// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Live values walked by the serialization engine.
//!
//! [`Object`] is a closed tagged variant over everything the engine knows
//! how to reduce to plain data. Open-ended participants plug in through the
//! capability traits [`Serializable`], [`EnumLike`] and [`NumericArrayLike`].

use crate::array::Array;
use crate::binding::Class;
use crate::error::CallError;
use crate::value::{FrozenMap, Value};
use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Capability traits
// ---------------------------------------------------------------------------

/// An instance of an annotated class.
///
/// Usually implemented with `#[derive(Serializable)]`.
pub trait Serializable: Any + fmt::Debug + Send + Sync {
    /// The bound class (signature, typeid, constructor).
    fn class(&self) -> Arc<Class>;

    /// Current value of attribute `name`, or `None` if it is not set.
    fn attr(&self, name: &str) -> Option<Object>;

    fn as_any(&self) -> &dyn Any;
}

/// An enumeration member.
pub trait EnumLike: fmt::Debug + Send + Sync {
    /// Name of the enumeration type.
    fn enum_name(&self) -> &str;
    /// Name of this member.
    fn variant(&self) -> &str;
    /// Underlying scalar value.
    fn value(&self) -> Value;
}

/// Element kind of a foreign numeric array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
}

/// A foreign numeric array that can convert itself to a list.
pub trait NumericArrayLike: fmt::Debug + Send + Sync {
    fn dtype(&self) -> ScalarKind;
    fn to_list(&self) -> Vec<Value>;
}

// ---------------------------------------------------------------------------
// Concrete helpers
// ---------------------------------------------------------------------------

/// Simple [`EnumLike`] member.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub enum_name: String,
    pub variant: String,
    pub value: Value,
}

impl EnumValue {
    pub fn new(
        enum_name: impl Into<String>,
        variant: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            enum_name: enum_name.into(),
            variant: variant.into(),
            value: value.into(),
        }
    }
}

impl EnumLike for EnumValue {
    fn enum_name(&self) -> &str {
        &self.enum_name
    }

    fn variant(&self) -> &str {
        &self.variant
    }

    fn value(&self) -> Value {
        self.value.clone()
    }
}

/// A captured error: its kind and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorValue {
    pub kind: String,
    pub message: String,
}

impl ErrorValue {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Capture a Rust error under the given kind name.
    pub fn from_error(kind: impl Into<String>, err: &dyn std::error::Error) -> Self {
        Self::new(kind, err.to_string())
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Owned numeric buffer implementing [`NumericArrayLike`].
#[derive(Debug, Clone, PartialEq)]
pub enum NumericArray {
    Bool(Vec<bool>),
    Int(Vec<i64>),
    Float(Vec<f64>),
}

impl NumericArrayLike for NumericArray {
    fn dtype(&self) -> ScalarKind {
        match self {
            Self::Bool(_) => ScalarKind::Bool,
            Self::Int(_) => ScalarKind::Int,
            Self::Float(_) => ScalarKind::Float,
        }
    }

    fn to_list(&self) -> Vec<Value> {
        match self {
            Self::Bool(v) => v.iter().map(|x| Value::Bool(*x)).collect(),
            Self::Int(v) => v.iter().map(|x| Value::Int(*x)).collect(),
            Self::Float(v) => v.iter().map(|x| Value::Float(*x)).collect(),
        }
    }
}

impl From<Vec<i64>> for NumericArray {
    fn from(v: Vec<i64>) -> Self {
        Self::Int(v)
    }
}

impl From<Vec<f64>> for NumericArray {
    fn from(v: Vec<f64>) -> Self {
        Self::Float(v)
    }
}

impl From<Vec<bool>> for NumericArray {
    fn from(v: Vec<bool>) -> Self {
        Self::Bool(v)
    }
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// A live value.
#[derive(Debug, Clone, Default)]
pub enum Object {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Instance of an annotated class.
    Instance(Arc<dyn Serializable>),
    /// Element-typed sequence container.
    Array(Array),
    /// Insertion-ordered mapping.
    Mapping(IndexMap<String, Object>),
    /// Untyped sequence.
    List(Vec<Object>),
    NumericArray(Arc<dyn NumericArrayLike>),
    Error(ErrorValue),
    Enum(Arc<dyn EnumLike>),
}

impl Object {
    /// Wrap an annotated instance.
    pub fn instance<T: Serializable>(inst: T) -> Self {
        Self::Instance(Arc::new(inst))
    }

    /// Wrap an enumeration member.
    pub fn enumeration<E: EnumLike + 'static>(member: E) -> Self {
        Self::Enum(Arc::new(member))
    }

    /// Wrap a numeric array.
    pub fn numeric<N: NumericArrayLike + 'static>(array: N) -> Self {
        Self::NumericArray(Arc::new(array))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> String {
        match self {
            Self::Null => "null".into(),
            Self::Bool(_) => "bool".into(),
            Self::Int(_) => "int".into(),
            Self::Float(_) => "float".into(),
            Self::Str(_) => "str".into(),
            Self::Instance(inst) => inst.class().name().to_string(),
            Self::Array(a) => format!("Array[{}]", a.typ()),
            Self::Mapping(_) => "mapping".into(),
            Self::List(_) => "list".into(),
            Self::NumericArray(_) => "numeric array".into(),
            Self::Error(e) => e.kind.clone(),
            Self::Enum(e) => e.enum_name().to_string(),
        }
    }

    /// The value as plain data, if it already is plain data.
    pub fn as_plain(&self) -> Option<Value> {
        match self {
            Self::Null => Some(Value::Null),
            Self::Bool(v) => Some(Value::Bool(*v)),
            Self::Int(v) => Some(Value::Int(*v)),
            Self::Float(v) => Some(Value::Float(*v)),
            Self::Str(v) => Some(Value::Str(v.clone())),
            _ => None,
        }
    }

    /// Try to get the annotated instance.
    pub fn as_instance(&self) -> Option<&Arc<dyn Serializable>> {
        match self {
            Self::Instance(inst) => Some(inst),
            _ => None,
        }
    }

    /// Number of elements for sequence-like values.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Array(a) => Some(a.len()),
            Self::List(v) => Some(v.len()),
            Self::Mapping(m) => Some(m.len()),
            Self::NumericArray(n) => Some(n.to_list().len()),
            _ => None,
        }
    }
}

impl From<Value> for Object {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(v) => Self::Bool(v),
            Value::Int(v) => Self::Int(v),
            Value::Float(v) => Self::Float(v),
            Value::Str(v) => Self::Str(v),
            Value::Sequence(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Mapping(map) => Self::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<FrozenMap> for Object {
    fn from(map: FrozenMap) -> Self {
        Self::from(Value::Mapping(map))
    }
}

impl From<Array> for Object {
    fn from(array: Array) -> Self {
        Self::Array(array)
    }
}

impl From<ErrorValue> for Object {
    fn from(err: ErrorValue) -> Self {
        Self::Error(err)
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Instance(a), Self::Instance(b)) => instances_eq(a.as_ref(), b.as_ref()),
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Mapping(a), Self::Mapping(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            (Self::List(a), Self::List(b)) => a == b,
            (Self::NumericArray(a), Self::NumericArray(b)) => {
                a.dtype() == b.dtype() && a.to_list() == b.to_list()
            }
            (Self::Error(a), Self::Error(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => {
                a.enum_name() == b.enum_name() && a.variant() == b.variant()
            }
            _ => false,
        }
    }
}

/// Field-wise equality: same class name and equal values for every
/// signature parameter.
fn instances_eq(a: &dyn Serializable, b: &dyn Serializable) -> bool {
    let (ca, cb) = (a.class(), b.class());
    if ca.name() != cb.name() {
        return false;
    }
    let same = ca
        .signature()
        .names()
        .all(|name| a.attr(name) == b.attr(name));
    same
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{:?}", v),
            Self::Str(v) => write!(f, "{:?}", v),
            Self::Instance(inst) => f.write_str(&inst.repr()),
            Self::Array(a) => write!(f, "{}", a),
            Self::Mapping(m) => {
                f.write_str("{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                f.write_str("}")
            }
            Self::List(items) => write_list(f, items),
            Self::NumericArray(n) => write!(f, "{}", Value::Sequence(n.to_list())),
            Self::Error(e) => write!(f, "{}", e),
            Self::Enum(e) => write!(f, "{}.{}", e.enum_name(), e.variant()),
        }
    }
}

pub(crate) fn write_list(f: &mut fmt::Formatter<'_>, items: &[Object]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str("]")
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Trait for converting a field into an [`Object`].
pub trait ToObject {
    fn to_object(&self) -> Object;
}

/// Trait for converting an [`Object`] back into a field.
pub trait FromObject: Sized {
    /// Short type name used in conversion errors.
    const TYPE_NAME: &'static str;

    fn from_object(value: Object) -> Option<Self>;
}

/// Convert `value` for argument `name`, mapping failure to [`CallError::Conversion`].
pub fn convert<T: FromObject>(name: &str, value: Object) -> Result<T, CallError> {
    let got = value.kind_name();
    T::from_object(value).ok_or_else(|| CallError::Conversion {
        name: name.to_string(),
        expected: T::TYPE_NAME.to_string(),
        got,
    })
}

macro_rules! impl_int_object {
    ($($ty:ty),*) => {
        $(
            impl ToObject for $ty {
                fn to_object(&self) -> Object {
                    Object::Int(i64::from(*self))
                }
            }

            impl FromObject for $ty {
                const TYPE_NAME: &'static str = "int";

                fn from_object(value: Object) -> Option<Self> {
                    match value {
                        Object::Int(v) => <$ty>::try_from(v).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_int_object!(i8, i16, i32, i64, u8, u16, u32);

impl ToObject for bool {
    fn to_object(&self) -> Object {
        Object::Bool(*self)
    }
}

impl FromObject for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_object(value: Object) -> Option<Self> {
        match value {
            Object::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl ToObject for f64 {
    fn to_object(&self) -> Object {
        Object::Float(*self)
    }
}

impl FromObject for f64 {
    const TYPE_NAME: &'static str = "float";

    fn from_object(value: Object) -> Option<Self> {
        match value {
            Object::Float(v) => Some(v),
            Object::Int(v) => Some(v as f64),
            _ => None,
        }
    }
}

impl ToObject for f32 {
    fn to_object(&self) -> Object {
        Object::Float(f64::from(*self))
    }
}

impl ToObject for String {
    fn to_object(&self) -> Object {
        Object::Str(self.clone())
    }
}

impl ToObject for &str {
    fn to_object(&self) -> Object {
        Object::Str((*self).to_string())
    }
}

impl FromObject for String {
    const TYPE_NAME: &'static str = "str";

    fn from_object(value: Object) -> Option<Self> {
        match value {
            Object::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl ToObject for Object {
    fn to_object(&self) -> Object {
        self.clone()
    }
}

impl FromObject for Object {
    const TYPE_NAME: &'static str = "Any";

    fn from_object(value: Object) -> Option<Self> {
        Some(value)
    }
}

impl ToObject for Value {
    fn to_object(&self) -> Object {
        Object::from(self.clone())
    }
}

impl ToObject for Array {
    fn to_object(&self) -> Object {
        Object::Array(self.clone())
    }
}

impl FromObject for Array {
    const TYPE_NAME: &'static str = "Array";

    fn from_object(value: Object) -> Option<Self> {
        match value {
            Object::Array(a) => Some(a),
            _ => None,
        }
    }
}

impl ToObject for ErrorValue {
    fn to_object(&self) -> Object {
        Object::Error(self.clone())
    }
}

impl ToObject for EnumValue {
    fn to_object(&self) -> Object {
        Object::Enum(Arc::new(self.clone()))
    }
}

impl ToObject for Arc<dyn Serializable> {
    fn to_object(&self) -> Object {
        Object::Instance(Arc::clone(self))
    }
}

impl FromObject for Arc<dyn Serializable> {
    const TYPE_NAME: &'static str = "instance";

    fn from_object(value: Object) -> Option<Self> {
        match value {
            Object::Instance(inst) => Some(inst),
            _ => None,
        }
    }
}

impl ToObject for Arc<dyn EnumLike> {
    fn to_object(&self) -> Object {
        Object::Enum(Arc::clone(self))
    }
}

impl<T: ToObject> ToObject for Option<T> {
    fn to_object(&self) -> Object {
        self.as_ref().map_or(Object::Null, ToObject::to_object)
    }
}

impl<T: FromObject> FromObject for Option<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;

    fn from_object(value: Object) -> Option<Self> {
        match value {
            Object::Null => Some(None),
            other => T::from_object(other).map(Some),
        }
    }
}

impl<T: ToObject> ToObject for Vec<T> {
    fn to_object(&self) -> Object {
        Object::List(self.iter().map(ToObject::to_object).collect())
    }
}

impl<T: FromObject> FromObject for Vec<T> {
    const TYPE_NAME: &'static str = "list";

    fn from_object(value: Object) -> Option<Self> {
        let items: Vec<Object> = match value {
            Object::List(items) => items,
            Object::Array(a) => a.iter().cloned().collect(),
            Object::NumericArray(n) => n.to_list().into_iter().map(Object::from).collect(),
            _ => return None,
        };
        items.into_iter().map(T::from_object).collect()
    }
}

impl<T: ToObject> ToObject for IndexMap<String, T> {
    fn to_object(&self) -> Object {
        Object::Mapping(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_object()))
                .collect(),
        )
    }
}

impl<T: FromObject> FromObject for IndexMap<String, T> {
    const TYPE_NAME: &'static str = "mapping";

    fn from_object(value: Object) -> Option<Self> {
        match value {
            Object::Mapping(m) => m
                .into_iter()
                .map(|(k, v)| T::from_object(v).map(|v| (k, v)))
                .collect(),
            _ => None,
        }
    }
}

impl ToObject for FrozenMap {
    fn to_object(&self) -> Object {
        Object::from(self.clone())
    }
}

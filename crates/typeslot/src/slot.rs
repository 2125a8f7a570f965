// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Slots: described, typed, possibly-defaulted value positions.

use crate::array::to_array;
use crate::binding::Class;
use crate::error::ShapeError;
use crate::object::Object;
use crate::value::Value;
use crate::widgets::{self, Widget};
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

/// Declared type of a slot position.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotType {
    /// Anything goes.
    Any,
    Bool,
    Int,
    Float,
    Str,
    /// Enumeration.
    Enum(Arc<EnumDescriptor>),
    /// Annotated class.
    Class(ClassRef),
    /// Error/exception kind.
    Error(String),
    /// Nested slot (composite declarations).
    Slot(Arc<Slot>),
}

impl SlotType {
    /// Whether elements of this type serialize through their own protocol
    /// rather than passing through as plain data.
    pub fn is_structured(&self) -> bool {
        match self {
            Self::Enum(_) | Self::Class(_) | Self::Error(_) => true,
            Self::Slot(inner) => match inner.shape() {
                SlotShape::Plain(t) | SlotShape::Sequence(t) => t.is_structured(),
                SlotShape::Mapping(_, v) => v.is_structured(),
            },
            _ => false,
        }
    }

    /// Whether a live value is an instance of this type.
    ///
    /// Classes match by name and, when both sides know it, Rust type.
    pub fn accepts(&self, obj: &Object) -> bool {
        match (self, obj) {
            (Self::Any, _) => true,
            (Self::Bool, Object::Bool(_))
            | (Self::Int, Object::Int(_))
            | (Self::Float, Object::Float(_))
            | (Self::Str, Object::Str(_)) => true,
            (Self::Enum(desc), Object::Enum(member)) => member.enum_name() == desc.name,
            (Self::Class(class), Object::Instance(inst)) => {
                let other = inst.class().class_ref();
                class.name == other.name
                    && match (class.type_id, other.type_id) {
                        (Some(a), Some(b)) => a == b,
                        _ => true,
                    }
            }
            (Self::Error(kind), Object::Error(err)) => &err.kind == kind,
            (Self::Slot(slot), obj) => match slot.shape() {
                SlotShape::Plain(t) => t.accepts(obj),
                SlotShape::Sequence(_) => matches!(obj, Object::Array(_) | Object::List(_)),
                SlotShape::Mapping(..) => matches!(obj, Object::Mapping(_)),
            },
            _ => false,
        }
    }
}

impl From<Arc<Class>> for SlotType {
    fn from(class: Arc<Class>) -> Self {
        Self::Class(class.class_ref())
    }
}

impl From<&Class> for SlotType {
    fn from(class: &Class) -> Self {
        Self::Class(class.class_ref())
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("Any"),
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Str => f.write_str("str"),
            Self::Enum(e) => f.write_str(&e.name),
            Self::Class(c) => f.write_str(&c.name),
            Self::Error(kind) => f.write_str(kind),
            Self::Slot(s) => f.write_str(s.name().unwrap_or("<anonymous>")),
        }
    }
}

/// Reference to an annotated class by name (and Rust type, when known).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassRef {
    pub name: String,
    pub type_id: Option<TypeId>,
}

impl ClassRef {
    /// Refer to a class by name only.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_id: None,
        }
    }

    /// Refer to a class backed by Rust type `T`.
    pub fn of<T: 'static>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_id: Some(TypeId::of::<T>()),
        }
    }
}

/// Enumeration type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    /// Enum name.
    pub name: String,
    /// Enum variants.
    pub variants: Vec<EnumVariant>,
}

impl EnumDescriptor {
    /// Create enum descriptor.
    pub fn new(name: impl Into<String>, variants: Vec<EnumVariant>) -> Self {
        Self {
            name: name.into(),
            variants,
        }
    }

    /// Get variant by name.
    pub fn variant(&self, name: &str) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Get variant by underlying value.
    pub fn variant_by_value(&self, value: &Value) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| &v.value == value)
    }
}

/// Enum variant.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumVariant {
    /// Variant name.
    pub name: String,
    /// Underlying scalar value.
    pub value: Value,
}

impl EnumVariant {
    /// Create enum variant.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Shape of a slot. Exactly one holds, fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotShape {
    Plain(SlotType),
    Sequence(SlotType),
    Mapping(SlotType, SlotType),
}

impl fmt::Display for SlotShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(t) => write!(f, "{}", t),
            Self::Sequence(t) => write!(f, "Array[{}]", t),
            Self::Mapping(k, v) => write!(f, "Mapping[{}, {}]", k, v),
        }
    }
}

/// Default carried by a slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SlotDefault {
    /// No default: the position is required.
    #[default]
    NoDefault,
    /// Return position: infer the default shape from an empty/null value.
    Infer,
    /// Concrete default.
    Value(Value),
}

/// Borrowed view of a slot's declared type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeRef<'a> {
    Single(&'a SlotType),
    Pair(&'a SlotType, &'a SlotType),
}

/// One named, typed, described value position.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    description: String,
    name: Option<String>,
    shape: SlotShape,
    default: SlotDefault,
}

impl Slot {
    /// Create an unnamed slot without default.
    pub fn new(description: impl Into<String>, shape: SlotShape) -> Self {
        Self {
            description: description.into(),
            name: None,
            shape,
            default: SlotDefault::NoDefault,
        }
    }

    /// Set the name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Copy of this slot carrying `default`. The receiver is left untouched.
    pub fn with_default(&self, default: SlotDefault) -> Self {
        let mut copy = self.clone();
        copy.default = default;
        copy
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn shape(&self) -> &SlotShape {
        &self.shape
    }

    pub fn default(&self) -> &SlotDefault {
        &self.default
    }

    /// The concrete default value, if any.
    pub fn default_value(&self) -> Option<&Value> {
        match &self.default {
            SlotDefault::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Whether a caller may omit this position.
    pub fn has_default(&self) -> bool {
        matches!(self.default, SlotDefault::Value(_))
    }

    /// Declared type: element type for plain/sequence, (key, value) for mappings.
    pub fn typ(&self) -> TypeRef<'_> {
        match &self.shape {
            SlotShape::Plain(t) | SlotShape::Sequence(t) => TypeRef::Single(t),
            SlotShape::Mapping(k, v) => TypeRef::Pair(k, v),
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.shape, SlotShape::Sequence(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self.shape, SlotShape::Mapping(..))
    }

    /// Coerce `value` into this slot's shape.
    ///
    /// Sequence slots wrap scalars and nulls via [`to_array`]; mapping slots
    /// cannot be instantiated; plain slots pass the value through.
    pub fn coerce(&self, value: Object) -> Result<Object, ShapeError> {
        match &self.shape {
            SlotShape::Sequence(t) => to_array(t, value).map(Object::Array),
            SlotShape::Mapping(..) => Err(ShapeError::MappingNotInstantiable),
            SlotShape::Plain(_) => Ok(value),
        }
    }

    /// Default input widget for this slot's type.
    pub fn widget(&self) -> Option<Widget> {
        widgets::default_widget(self)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Slot(name={:?}, typ={}, description={:?})",
            self.name.as_deref().unwrap_or(""),
            self.shape,
            self.description
        )
    }
}

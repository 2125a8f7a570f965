// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Slot definition capture.
//!
//! A type alias becomes a [`Slot`] either directly through [`define_type`],
//! or through a [`Namespace`] whose [`capture`](Namespace::capture) block
//! introduces exactly one new name:
//!
//! ```
//! use typeslot::{Namespace, SlotType, TypeExpr};
//!
//! let mut ns = Namespace::new();
//! let axes = ns
//!     .capture("The scannable axes, e.g. ['x', 'y'] or 'x'", |scope| {
//!         scope.bind("Axes", TypeExpr::SequenceOf(SlotType::Str));
//!     })
//!     .unwrap();
//! assert!(axes.is_sequence());
//! assert_eq!(ns.slot("Axes").unwrap().name(), Some("Axes"));
//! ```

use crate::error::CaptureError;
use crate::slot::{Slot, SlotDefault, SlotShape, SlotType};
use crate::value::Value;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// A bare type expression, before it is turned into a [`Slot`].
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// A plain type.
    Bare(SlotType),
    /// Sequence of a type.
    SequenceOf(SlotType),
    /// Mapping from key type to value type.
    MappingOf(SlotType, SlotType),
    /// Union of alternatives, in declaration order.
    Union(Vec<TypeExpr>),
    /// A previously captured slot.
    Slot(Arc<Slot>),
    /// The none type. As a return type it means void.
    NoneType,
}

impl TypeExpr {
    /// `Union[inner, None]`.
    pub fn optional(inner: TypeExpr) -> Self {
        Self::Union(vec![inner, Self::NoneType])
    }

    /// Whether this is a union that admits none.
    pub fn is_optional(&self) -> bool {
        match self {
            Self::Union(members) => members.iter().any(|m| *m == Self::NoneType),
            _ => false,
        }
    }
}

impl From<Arc<Slot>> for TypeExpr {
    fn from(slot: Arc<Slot>) -> Self {
        Self::Slot(slot)
    }
}

impl From<SlotType> for TypeExpr {
    fn from(typ: SlotType) -> Self {
        Self::Bare(typ)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bare(t) => write!(f, "{}", t),
            Self::SequenceOf(t) => write!(f, "Sequence[{}]", t),
            Self::MappingOf(k, v) => write!(f, "Mapping[{}, {}]", k, v),
            Self::Union(members) => {
                if let [inner, Self::NoneType] = members.as_slice() {
                    return write!(f, "Optional[{}]", inner);
                }
                f.write_str("Union[")?;
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", m)?;
                }
                f.write_str("]")
            }
            Self::Slot(slot) => match slot.name() {
                Some(name) => f.write_str(name),
                None => write!(f, "{}", slot),
            },
            Self::NoneType => f.write_str("None"),
        }
    }
}

/// Turn `expr` into a named slot.
///
/// Accepted shapes: bare type, sequence, mapping, a slot alias, and
/// `Optional[Slot]` (which takes the inner slot's shape and defaults to null).
pub fn define_type(
    name: impl Into<String>,
    description: impl Into<String>,
    expr: TypeExpr,
) -> Result<Arc<Slot>, CaptureError> {
    let name = name.into();
    let (shape, default) = match expr {
        TypeExpr::Bare(t) => (SlotShape::Plain(t), SlotDefault::NoDefault),
        TypeExpr::SequenceOf(t) => (SlotShape::Sequence(t), SlotDefault::NoDefault),
        TypeExpr::MappingOf(k, v) => (SlotShape::Mapping(k, v), SlotDefault::NoDefault),
        TypeExpr::Slot(inner) => (
            SlotShape::Plain(SlotType::Slot(inner)),
            SlotDefault::NoDefault,
        ),
        TypeExpr::Union(ref members) => match members.as_slice() {
            [TypeExpr::Slot(inner), TypeExpr::NoneType]
            | [TypeExpr::NoneType, TypeExpr::Slot(inner)] => (
                inner.shape().clone(),
                SlotDefault::Value(Value::Null),
            ),
            _ => return Err(CaptureError::UnsupportedShape(expr.to_string())),
        },
        TypeExpr::NoneType => return Err(CaptureError::UnsupportedShape(expr.to_string())),
    };
    log::debug!("[capture] {} = {}", name, shape);
    let slot = Slot::new(description, shape).named(name);
    Ok(Arc::new(slot.with_default(default)))
}

/// Explicit name table that type aliases are captured into and type
/// expressions are resolved against.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    bindings: IndexMap<String, TypeExpr>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `expr`, replacing any previous binding.
    pub fn bind(&mut self, name: impl Into<String>, expr: impl Into<TypeExpr>) -> &mut Self {
        self.bindings.insert(name.into(), expr.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&TypeExpr> {
        self.bindings.get(name)
    }

    /// The slot bound to `name`, if `name` is bound to a slot.
    pub fn slot(&self, name: &str) -> Option<Arc<Slot>> {
        match self.bindings.get(name) {
            Some(TypeExpr::Slot(slot)) => Some(Arc::clone(slot)),
            _ => None,
        }
    }

    /// Bound names in binding order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Copy every binding of `other` into this namespace.
    pub fn extend(&mut self, other: &Namespace) -> &mut Self {
        for (name, expr) in &other.bindings {
            self.bindings.insert(name.clone(), expr.clone());
        }
        self
    }

    /// Define `name` as a slot and bind it.
    pub fn define(
        &mut self,
        name: &str,
        description: &str,
        expr: TypeExpr,
    ) -> Result<Arc<Slot>, CaptureError> {
        let slot = define_type(name, description, expr)?;
        self.bindings
            .insert(name.to_string(), TypeExpr::Slot(Arc::clone(&slot)));
        Ok(slot)
    }

    /// Run `block`, which must introduce exactly one new binding, and
    /// replace that binding with a slot described by `description`.
    pub fn capture<F>(&mut self, description: &str, block: F) -> Result<Arc<Slot>, CaptureError>
    where
        F: FnOnce(&mut Namespace),
    {
        let before: HashSet<String> = self.bindings.keys().cloned().collect();
        block(self);
        let mut defined: Vec<String> = self
            .bindings
            .keys()
            .filter(|name| !before.contains(*name))
            .cloned()
            .collect();
        let name = match defined.len() {
            0 => return Err(CaptureError::NoBinding),
            1 => defined.remove(0),
            _ => return Err(CaptureError::MultipleBindings(defined)),
        };
        let expr = self
            .bindings
            .get(&name)
            .cloned()
            .ok_or(CaptureError::NoBinding)?;
        self.define(&name, description, expr)
    }
}

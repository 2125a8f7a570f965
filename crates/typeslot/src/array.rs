// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Element-typed immutable sequences.

use crate::error::ShapeError;
use crate::object::{write_list, Object, ScalarKind};
use crate::slot::SlotType;
use std::fmt;
use std::sync::Arc;

/// Immutable sequence whose elements are declared to be of type `typ`.
///
/// Cloning is cheap: the element storage is shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    typ: SlotType,
    seq: Arc<[Object]>,
}

impl Array {
    pub fn new(typ: SlotType, seq: impl Into<Vec<Object>>) -> Self {
        Self {
            typ,
            seq: Arc::from(seq.into()),
        }
    }

    /// Empty array of `typ`.
    pub fn empty(typ: SlotType) -> Self {
        Self::new(typ, Vec::new())
    }

    pub fn typ(&self) -> &SlotType {
        &self.typ
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Object> {
        self.seq.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Object> {
        self.seq.iter()
    }

    pub fn as_slice(&self) -> &[Object] {
        &self.seq
    }
}

impl std::ops::Index<usize> for Array {
    type Output = Object;

    fn index(&self, index: usize) -> &Object {
        &self.seq[index]
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Object;
    type IntoIter = std::slice::Iter<'a, Object>;

    fn into_iter(self) -> Self::IntoIter {
        self.seq.iter()
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, &self.seq)
    }
}

fn dtype_matches(typ: &SlotType, dtype: ScalarKind) -> bool {
    match typ {
        SlotType::Any => true,
        SlotType::Float => dtype == ScalarKind::Float,
        SlotType::Int => dtype == ScalarKind::Int,
        SlotType::Bool => dtype == ScalarKind::Bool,
        _ => false,
    }
}

/// Coerce `value` into an [`Array`] of element type `typ`.
///
/// - an `Array` of the same element type is returned as-is;
/// - null becomes an empty array;
/// - lists are wrapped element for element;
/// - numeric arrays must have a dtype of exactly `typ`;
/// - anything else (strings included) becomes a one-element array.
pub fn to_array(typ: &SlotType, value: Object) -> Result<Array, ShapeError> {
    match value {
        Object::Array(array) => {
            if &array.typ == typ || *typ == SlotType::Any {
                Ok(array)
            } else {
                Err(ShapeError::ElementType {
                    expected: typ.to_string(),
                    got: array.typ.to_string(),
                })
            }
        }
        Object::Null => Ok(Array::empty(typ.clone())),
        Object::List(items) => Ok(Array::new(typ.clone(), items)),
        Object::NumericArray(numeric) => {
            let dtype = numeric.dtype();
            if !dtype_matches(typ, dtype) {
                return Err(ShapeError::ElementType {
                    expected: typ.to_string(),
                    got: format!("{:?}", dtype).to_lowercase(),
                });
            }
            let items: Vec<Object> = numeric.to_list().into_iter().map(Object::from).collect();
            Ok(Array::new(typ.clone(), items))
        }
        other => Ok(Array::new(typ.clone(), vec![other])),
    }
}

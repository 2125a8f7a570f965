// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Signature extraction.
//!
//! A [`CallableDecl`] describes a callable's parameter list as written:
//! names, optional inline type declarations, declared defaults, and
//! optionally the source lines carrying legacy `# type:` comments.
//! [`extract_signature`] turns it into an ordered name → [`Slot`] mapping
//! plus a return slot.

mod comments;

use crate::capture::{Namespace, TypeExpr};
use crate::error::SignatureError;
use crate::slot::{Slot, SlotDefault};
use crate::value::Value;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;

pub use comments::{evaluate_type_expr, parse_type_comments};

/// Name of the receiver parameter, never part of a signature.
pub const SELF_PARAM: &str = "self";

/// One declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: String,
    pub annotation: Option<TypeExpr>,
    pub default: Option<Value>,
}

impl ParamDecl {
    /// Parameter without inline type declaration.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: None,
            default: None,
        }
    }

    pub fn annotated(name: impl Into<String>, annotation: impl Into<TypeExpr>) -> Self {
        Self {
            name: name.into(),
            annotation: Some(annotation.into()),
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// A callable's declared parameter list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallableDecl {
    pub name: String,
    pub params: Vec<ParamDecl>,
    pub returns: Option<TypeExpr>,
    /// Source lines holding `# type:` comments, used when no inline
    /// declarations are present.
    pub type_comments: Option<String>,
}

impl CallableDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add an inline-typed parameter.
    pub fn param(mut self, name: impl Into<String>, annotation: impl Into<TypeExpr>) -> Self {
        self.params.push(ParamDecl::annotated(name, annotation));
        self
    }

    /// Add an inline-typed parameter with a declared default.
    pub fn param_with_default(
        mut self,
        name: impl Into<String>,
        annotation: impl Into<TypeExpr>,
        default: impl Into<Value>,
    ) -> Self {
        self.params
            .push(ParamDecl::annotated(name, annotation).with_default(default));
        self
    }

    /// Add a parameter without inline type declaration.
    pub fn untyped_param(mut self, name: impl Into<String>) -> Self {
        self.params.push(ParamDecl::untyped(name));
        self
    }

    /// Add a parameter without inline type declaration but with a default.
    pub fn untyped_param_with_default(
        mut self,
        name: impl Into<String>,
        default: impl Into<Value>,
    ) -> Self {
        self.params
            .push(ParamDecl::untyped(name).with_default(default));
        self
    }

    pub fn arg(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self
    }

    /// Inline return type. `TypeExpr::NoneType` declares a void callable.
    pub fn returns(mut self, returns: impl Into<TypeExpr>) -> Self {
        self.returns = Some(returns.into());
        self
    }

    pub fn type_comments(mut self, source: impl Into<String>) -> Self {
        self.type_comments = Some(source.into());
        self
    }

    fn has_inline_types(&self) -> bool {
        self.returns.is_some() || self.params.iter().any(|p| p.annotation.is_some())
    }
}

/// Ordered parameter slots plus the return slot of one callable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    pub params: IndexMap<String, Arc<Slot>>,
    pub returns: Option<Arc<Slot>>,
}

impl Signature {
    /// Parameter names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Slot>> {
        self.params.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Slot>)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn returns(&self) -> Option<&Arc<Slot>> {
        self.returns.as_ref()
    }
}

/// Which default to apply when matching a declaration against a slot.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclaredDefault {
    /// Required parameter.
    NoDefault,
    /// Return position.
    Return,
    Value(Value),
}

impl From<Option<Value>> for DeclaredDefault {
    fn from(value: Option<Value>) -> Self {
        value.map_or(Self::NoDefault, Self::Value)
    }
}

/// Resolve a declared type to a slot carrying the right default.
///
/// Shared alias slots are never modified: a new slot is produced whenever
/// a default has to be applied.
pub fn anno_with_default(
    callable: &str,
    param: &str,
    anno: &TypeExpr,
    default: DeclaredDefault,
) -> Result<Arc<Slot>, SignatureError> {
    let mut default = default;
    let slot = match anno {
        TypeExpr::Slot(slot) => Arc::clone(slot),
        TypeExpr::Union(members) => {
            let slot = match members.first() {
                Some(TypeExpr::Slot(slot)) => Arc::clone(slot),
                _ => return Err(SignatureError::BadUnion(anno.to_string())),
            };
            if anno.is_optional() {
                match &default {
                    DeclaredDefault::Return | DeclaredDefault::NoDefault => {
                        default = DeclaredDefault::Value(Value::Null);
                    }
                    DeclaredDefault::Value(Value::Null) => {}
                    DeclaredDefault::Value(other) => {
                        return Err(SignatureError::OptionalDefault {
                            anno: anno.to_string(),
                            default: other.to_string(),
                        });
                    }
                }
            }
            slot
        }
        other => {
            return Err(SignatureError::NotAnAnnotation {
                callable: callable.to_string(),
                param: param.to_string(),
                ty: other.to_string(),
            });
        }
    };
    Ok(match default {
        DeclaredDefault::NoDefault => slot,
        DeclaredDefault::Return => Arc::new(slot.with_default(SlotDefault::Infer)),
        DeclaredDefault::Value(v) => Arc::new(slot.with_default(SlotDefault::Value(v))),
    })
}

/// Extract the signature of `decl`, resolving names against `namespace`.
///
/// Inline declarations win; without any, the `# type:` comments in
/// `decl.type_comments` are parsed.
pub fn extract_signature(
    decl: &CallableDecl,
    namespace: &Namespace,
) -> Result<Signature, SignatureError> {
    let params: Vec<&ParamDecl> = decl
        .params
        .iter()
        .filter(|p| p.name != SELF_PARAM)
        .collect();

    let mut seen: Vec<&str> = Vec::with_capacity(params.len());
    for p in &params {
        if seen.contains(&p.name.as_str()) {
            return Err(SignatureError::DuplicateParameter {
                callable: decl.name.clone(),
                param: p.name.clone(),
            });
        }
        seen.push(&p.name);
    }

    let (annotations, returns): (HashMap<String, TypeExpr>, Option<TypeExpr>) =
        if decl.has_inline_types() {
            let annotations = params
                .iter()
                .filter_map(|p| p.annotation.clone().map(|a| (p.name.clone(), a)))
                .collect();
            (annotations, decl.returns.clone())
        } else if let Some(source) = &decl.type_comments {
            let names: Vec<String> = params.iter().map(|p| p.name.clone()).collect();
            let (annotations, returns) = parse_type_comments(source, &names, namespace)?;
            (annotations, Some(returns))
        } else {
            (HashMap::new(), None)
        };

    let mut signature = Signature::default();
    for p in params {
        let anno = annotations
            .get(&p.name)
            .ok_or_else(|| SignatureError::Undeclared {
                callable: decl.name.clone(),
                param: p.name.clone(),
            })?;
        let slot = anno_with_default(&decl.name, &p.name, anno, p.default.clone().into())?;
        signature.params.insert(p.name.clone(), slot);
    }

    signature.returns = match returns {
        None | Some(TypeExpr::NoneType) => None,
        Some(anno) => Some(anno_with_default(
            &decl.name,
            "return",
            &anno,
            DeclaredDefault::Return,
        )?),
    };

    log::trace!(
        "[signature] {}({}) -> {}",
        decl.name,
        signature.names().collect::<Vec<_>>().join(", "),
        signature
            .returns
            .as_ref()
            .and_then(|s| s.name())
            .unwrap_or("None")
    );
    Ok(signature)
}

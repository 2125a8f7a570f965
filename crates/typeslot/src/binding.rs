// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Construct-time binding.
//!
//! A [`Class`] carries the extracted constructor [`Signature`] of an
//! annotated type, its synthesized return slot and a keyword constructor.
//! Typeids live in the [`Registry`] the class is registered with. Free
//! functions get the same treatment through [`add_call_types`].

use crate::array::Array;
use crate::capture::{Namespace, TypeExpr};
use crate::error::{CallError, KeyError, SignatureError};
use crate::object::{convert, FromObject, Object, Serializable};
use crate::registry::{Registry, TYPEID_KEY};
use crate::serialize::Serializer;
use crate::signature::{extract_signature, CallableDecl, Signature};
use crate::slot::{ClassRef, Slot, SlotDefault, SlotShape, SlotType};
use crate::value::Value;
use dashmap::DashMap;
use indexmap::IndexMap;
use std::any::TypeId;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Keyword arguments.
pub type Kwargs = IndexMap<String, Object>;

/// Keyword constructor of a class.
pub type Constructor =
    Arc<dyn Fn(&mut CallArgs<'_>) -> Result<Arc<dyn Serializable>, CallError> + Send + Sync>;

static BINDINGS: OnceLock<DashMap<TypeId, Arc<Class>>> = OnceLock::new();

fn bindings() -> &'static DashMap<TypeId, Arc<Class>> {
    BINDINGS.get_or_init(DashMap::new)
}

/// The class bound to Rust type `T` with [`ClassBuilder::bind`].
pub fn class_of<T: 'static>() -> Option<Arc<Class>> {
    bindings()
        .get(&TypeId::of::<T>())
        .map(|entry| Arc::clone(entry.value()))
}

/// Build a [`Kwargs`] map: `kwargs!{"exposure" => 0.1, "path" => "/tmp"}`.
#[macro_export]
macro_rules! kwargs {
    () => {
        $crate::Kwargs::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::Kwargs::new();
        $(
            map.insert(
                ::std::string::String::from($key),
                $crate::ToObject::to_object(&$value),
            );
        )+
        map
    }};
}

// ---------------------------------------------------------------------------
// Class
// ---------------------------------------------------------------------------

/// An annotated class.
pub struct Class {
    name: String,
    type_id: Option<TypeId>,
    signature: Signature,
    constructor: Option<Constructor>,
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("typeid", &self.typeid())
            .field("params", &self.signature.names().collect::<Vec<_>>())
            .field("has_constructor", &self.constructor.is_some())
            .finish()
    }
}

impl Class {
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rust type the class is bound to, if any.
    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Typeid of the class in [`Registry::global`]. `None` for classes that
    /// do not take part in polymorphic deserialization.
    pub fn typeid(&self) -> Option<String> {
        Registry::global().typeid_of(self)
    }

    pub fn class_ref(&self) -> ClassRef {
        ClassRef {
            name: self.name.clone(),
            type_id: self.type_id,
        }
    }

    /// Construct an instance from keyword arguments.
    ///
    /// Nested mappings carrying a typeid are rebuilt through the global
    /// registry.
    pub fn call(&self, kwargs: Kwargs) -> Result<Arc<dyn Serializable>, CallError> {
        self.construct(Serializer::global(), kwargs, 0)
    }

    pub(crate) fn construct(
        &self,
        serializer: &Serializer,
        kwargs: Kwargs,
        depth: usize,
    ) -> Result<Arc<dyn Serializable>, CallError> {
        let constructor = self
            .constructor
            .as_ref()
            .ok_or_else(|| CallError::NoConstructor(self.name.clone()))?;
        let mut args = CallArgs::bind(&self.name, &self.signature, kwargs, serializer, depth)?;
        constructor(&mut args)
    }
}

// ---------------------------------------------------------------------------
// ClassBuilder
// ---------------------------------------------------------------------------

/// Builder for [`Class`].
pub struct ClassBuilder {
    decl: CallableDecl,
    namespace: Namespace,
    constructor: Option<Constructor>,
}

impl ClassBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            decl: CallableDecl::new(name),
            namespace: Namespace::new(),
            constructor: None,
        }
    }

    /// Add a constructor parameter declared with `annotation`.
    pub fn param(
        mut self,
        name: impl Into<String>,
        annotation: impl Into<TypeExpr>,
    ) -> Self {
        self.decl = self.decl.param(name, annotation);
        self
    }

    pub fn param_with_default(
        mut self,
        name: impl Into<String>,
        annotation: impl Into<TypeExpr>,
        default: impl Into<Value>,
    ) -> Self {
        self.decl = self.decl.param_with_default(name, annotation, default);
        self
    }

    /// Add a parameter typed by the `# type:` comments.
    pub fn untyped_param(mut self, name: impl Into<String>) -> Self {
        self.decl = self.decl.untyped_param(name);
        self
    }

    pub fn untyped_param_with_default(
        mut self,
        name: impl Into<String>,
        default: impl Into<Value>,
    ) -> Self {
        self.decl = self.decl.untyped_param_with_default(name, default);
        self
    }

    /// Constructor source lines holding `# type:` comments.
    pub fn type_comments(mut self, source: impl Into<String>) -> Self {
        self.decl = self.decl.type_comments(source);
        self
    }

    /// Names visible to `# type:` comments.
    pub fn namespace(mut self, namespace: &Namespace) -> Self {
        self.namespace.extend(namespace);
        self
    }

    /// Keyword constructor.
    pub fn constructor<T, F>(mut self, f: F) -> Self
    where
        T: Serializable,
        F: Fn(&mut CallArgs<'_>) -> Result<T, CallError> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(move |args: &mut CallArgs<'_>| {
            f(args).map(|inst| Arc::new(inst) as Arc<dyn Serializable>)
        }));
        self
    }

    /// Extract the signature and build the class.
    pub fn build(self) -> Result<Arc<Class>, SignatureError> {
        self.finish(None)
    }

    /// Build the class and bind it to Rust type `T`, so that
    /// [`class_of::<T>()`](class_of) returns it.
    pub fn bind<T: 'static>(self) -> Result<Arc<Class>, SignatureError> {
        let type_id = TypeId::of::<T>();
        let class = self.finish(Some(type_id))?;
        bindings().insert(type_id, Arc::clone(&class));
        Ok(class)
    }

    fn finish(self, type_id: Option<TypeId>) -> Result<Arc<Class>, SignatureError> {
        let name = self.decl.name.clone();
        let mut signature = extract_signature(&self.decl, &self.namespace)?;
        let instance = Slot::new(
            "Class instance",
            SlotShape::Plain(SlotType::Class(ClassRef {
                name: name.clone(),
                type_id,
            })),
        )
        .named("Instance");
        signature.returns = Some(Arc::new(instance.with_default(SlotDefault::Infer)));
        log::debug!(
            "[binding] bound {}({})",
            name,
            signature.names().collect::<Vec<_>>().join(", ")
        );
        Ok(Arc::new(Class {
            name,
            type_id,
            signature,
            constructor: self.constructor,
        }))
    }
}

// ---------------------------------------------------------------------------
// CallArgs
// ---------------------------------------------------------------------------

/// Keyword arguments bound against a signature, defaults filled in.
pub struct CallArgs<'a> {
    callable: String,
    signature: &'a Signature,
    values: Kwargs,
    serializer: &'a Serializer,
    depth: usize,
}

impl<'a> CallArgs<'a> {
    /// Bind `kwargs` against `signature`.
    pub fn bind(
        callable: &str,
        signature: &'a Signature,
        mut kwargs: Kwargs,
        serializer: &'a Serializer,
        depth: usize,
    ) -> Result<Self, CallError> {
        if let Some(name) = kwargs.keys().find(|k| !signature.contains(k)) {
            return Err(CallError::UnexpectedKeyword {
                callable: callable.to_string(),
                name: name.clone(),
            });
        }
        let mut values = Kwargs::with_capacity(signature.len());
        for (name, slot) in signature.iter() {
            let value = match kwargs.shift_remove(name) {
                Some(v) => v,
                None => match slot.default_value() {
                    Some(default) => Object::from(default.clone()),
                    None => {
                        return Err(CallError::MissingArgument {
                            callable: callable.to_string(),
                            name: name.to_string(),
                        });
                    }
                },
            };
            values.insert(name.to_string(), value);
        }
        Ok(Self {
            callable: callable.to_string(),
            signature,
            values,
            serializer,
            depth,
        })
    }

    pub fn callable(&self) -> &str {
        &self.callable
    }

    /// Whether `name` is still available.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Take argument `name` as a raw object.
    pub fn take_object(&mut self, name: &str) -> Result<Object, CallError> {
        self.values
            .shift_remove(name)
            .ok_or_else(|| CallError::MissingArgument {
                callable: self.callable.clone(),
                name: name.to_string(),
            })
    }

    /// Take argument `name` converted to `T`. Serialized instances nested
    /// in the value are rebuilt first.
    pub fn take<T: FromObject>(&mut self, name: &str) -> Result<T, CallError> {
        let value = self.take_object(name)?;
        let value = self.deserialize(value)?;
        convert(name, value)
    }

    /// Take argument `name` coerced through its slot, e.g. a scalar into a
    /// one-element array for sequence slots.
    pub fn take_array(&mut self, name: &str) -> Result<Array, CallError> {
        let value = self.take_object(name)?;
        let value = self.deserialize(value)?;
        let coerced = match self.signature.get(name) {
            Some(slot) => slot.coerce(value)?,
            None => value,
        };
        convert(name, coerced)
    }

    /// Take argument `name` as an annotated instance of `T`, rebuilding it
    /// from a serialized mapping if needed.
    pub fn take_instance<T: Serializable + Clone>(&mut self, name: &str) -> Result<T, CallError> {
        let value = self.take_object(name)?;
        let got = value.kind_name();
        let value = self.deserialize(value)?;
        value
            .as_instance()
            .and_then(|inst| inst.downcast_ref::<T>())
            .cloned()
            .ok_or_else(|| CallError::Conversion {
                name: name.to_string(),
                expected: std::any::type_name::<T>()
                    .rsplit("::")
                    .next()
                    .unwrap_or("instance")
                    .to_string(),
                got,
            })
    }

    /// Rebuild serialized instances nested in `value`.
    pub fn deserialize(&self, value: Object) -> Result<Object, CallError> {
        self.serializer
            .deserialize_object(value, self.depth + 1)
            .map_err(|e| CallError::Nested(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Annotated free functions
// ---------------------------------------------------------------------------

type Body<R> = Box<dyn Fn(&mut CallArgs<'_>) -> Result<R, CallError> + Send + Sync>;

/// A free function with an attached signature.
pub struct AnnotatedFn<R> {
    name: String,
    signature: Signature,
    body: Body<R>,
}

impl<R> fmt::Debug for AnnotatedFn<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotatedFn")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish()
    }
}

/// Extract the signature of `decl` and attach it to `body`.
pub fn add_call_types<R, F>(
    decl: CallableDecl,
    namespace: &Namespace,
    body: F,
) -> Result<AnnotatedFn<R>, SignatureError>
where
    F: Fn(&mut CallArgs<'_>) -> Result<R, CallError> + Send + Sync + 'static,
{
    let signature = extract_signature(&decl, namespace)?;
    Ok(AnnotatedFn {
        name: decl.name,
        signature,
        body: Box::new(body),
    })
}

impl<R> AnnotatedFn<R> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Call with keyword arguments.
    pub fn call(&self, kwargs: Kwargs) -> Result<R, CallError> {
        self.call_with(Serializer::global(), kwargs)
    }

    pub fn call_with(&self, serializer: &Serializer, kwargs: Kwargs) -> Result<R, CallError> {
        let mut args = CallArgs::bind(&self.name, &self.signature, kwargs, serializer, 0)?;
        (self.body)(&mut args)
    }
}

// ---------------------------------------------------------------------------
// Instance helpers
// ---------------------------------------------------------------------------

/// `ClassName(key=value, ...)` over the signature, skipping unset attributes.
pub fn make_repr(inst: &dyn Serializable) -> String {
    let class = inst.class();
    let args: Vec<String> = class
        .signature()
        .names()
        .filter_map(|name| inst.attr(name).map(|v| format!("{}={}", name, v)))
        .collect();
    format!("{}({})", class.name(), args.join(", "))
}

impl dyn Serializable {
    /// Typeid of the instance's class.
    pub fn typeid(&self) -> Option<String> {
        self.class().typeid()
    }

    /// Exposed attribute names, in signature order.
    pub fn keys(&self) -> Vec<String> {
        self.class()
            .signature()
            .names()
            .map(str::to_string)
            .collect()
    }

    /// Dictionary-style access to exposed attributes.
    pub fn get_item(&self, key: &str) -> Result<Object, KeyError> {
        let class = self.class();
        if key == TYPEID_KEY {
            return class
                .typeid()
                .map(Object::Str)
                .ok_or_else(|| KeyError(key.to_string()));
        }
        if !class.signature().contains(key) {
            return Err(KeyError(key.to_string()));
        }
        self.attr(key).ok_or_else(|| KeyError(key.to_string()))
    }

    pub fn repr(&self) -> String {
        make_repr(self)
    }

    pub fn is<T: Serializable>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Serializable>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Register `class` in the global registry under `typeid`.
pub fn register(typeid: &str, class: &Arc<Class>) -> Arc<Class> {
    Registry::global().register(typeid, class)
}

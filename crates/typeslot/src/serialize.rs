// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serialization engine.
//!
//! [`Serializer::serialize`] reduces an [`Object`] graph to a plain [`Value`]
//! tree; [`Serializer::deserialize`] rebuilds annotated instances from
//! mappings carrying a `typeid`, resolved through the serializer's
//! [`Registry`].
//!
//! Dispatch order when serializing:
//!
//! 1. annotated instances → `to_dict`
//! 2. arrays → element-wise
//! 3. mappings → ordered [`FrozenMap`]
//! 4. plain lists → element-wise
//! 5. numeric arrays → their list form
//! 6. errors → `"Kind: message"`
//! 7. enumeration members → underlying value
//! 8. everything else passes through

use crate::binding::{Class, Kwargs};
use crate::config::SerializeConfig;
use crate::error::{RegistryError, SerializeError};
use crate::object::{Object, Serializable};
use crate::registry::{Registry, TYPEID_KEY};
use crate::slot::SlotType;
use crate::value::{FrozenMap, Value};
use std::sync::{Arc, OnceLock};

static GLOBAL: OnceLock<Serializer> = OnceLock::new();

/// Serialization engine bound to a registry and a configuration.
#[derive(Debug, Clone)]
pub struct Serializer {
    registry: Arc<Registry>,
    config: SerializeConfig,
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new(Arc::new(Registry::new()))
    }
}

impl Serializer {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_config(registry, SerializeConfig::default())
    }

    pub fn with_config(registry: Arc<Registry>, config: SerializeConfig) -> Self {
        Self { registry, config }
    }

    /// Serializer over [`Registry::global`] with the default configuration.
    pub fn global() -> &'static Serializer {
        GLOBAL.get_or_init(|| Serializer::new(Registry::global()))
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn config(&self) -> &SerializeConfig {
        &self.config
    }

    /// Typeid of `class` in this serializer's registry, falling back to the
    /// global registry for classes registered only there.
    pub fn typeid_of(&self, class: &Class) -> Option<String> {
        self.registry.typeid_of(class).or_else(|| class.typeid())
    }

    fn check_depth(&self, depth: usize) -> Result<(), SerializeError> {
        if depth > self.config.max_depth {
            log::warn!("[serialize] depth limit {} exceeded", self.config.max_depth);
            return Err(SerializeError::DepthExceeded(self.config.max_depth));
        }
        Ok(())
    }

    /// Reduce `obj` to plain data.
    pub fn serialize(&self, obj: &Object) -> Result<Value, SerializeError> {
        self.serialize_at(obj, 0)
    }

    fn serialize_at(&self, obj: &Object, depth: usize) -> Result<Value, SerializeError> {
        self.check_depth(depth)?;
        let next = depth + 1;
        Ok(match obj {
            Object::Instance(inst) => {
                Value::Mapping(self.entries(inst.as_ref(), depth)?.into_iter().collect())
            }
            // plain elements pass through unchanged either way
            Object::Array(array) => Value::Sequence(
                array
                    .iter()
                    .map(|item| self.serialize_at(item, next))
                    .collect::<Result<_, _>>()?,
            ),
            Object::Mapping(map) => Value::Mapping(
                map.iter()
                    .map(|(k, v)| Ok((k.clone(), self.serialize_at(v, next)?)))
                    .collect::<Result<FrozenMap, SerializeError>>()?,
            ),
            Object::List(items) => Value::Sequence(
                items
                    .iter()
                    .map(|item| self.serialize_at(item, next))
                    .collect::<Result<_, _>>()?,
            ),
            Object::NumericArray(numeric) => Value::Sequence(numeric.to_list()),
            Object::Error(err) => Value::Str(err.to_string()),
            Object::Enum(member) => member.value(),
            Object::Null => Value::Null,
            Object::Bool(v) => Value::Bool(*v),
            Object::Int(v) => Value::Int(*v),
            Object::Float(v) => Value::Float(*v),
            Object::Str(v) => Value::Str(v.clone()),
        })
    }

    fn entries(
        &self,
        inst: &dyn Serializable,
        depth: usize,
    ) -> Result<Vec<(String, Value)>, SerializeError> {
        let class = inst.class();
        let mut out = Vec::with_capacity(class.signature().len() + 1);
        if let Some(typeid) = self.typeid_of(&class) {
            out.push((TYPEID_KEY.to_string(), Value::Str(typeid)));
        }
        for name in class.signature().names() {
            let value = inst
                .attr(name)
                .ok_or_else(|| SerializeError::MissingAttribute {
                    class: class.name().to_string(),
                    name: name.to_string(),
                })?;
            out.push((name.to_string(), self.serialize_at(&value, depth + 1)?));
        }
        Ok(out)
    }

    /// Ordered mapping of `inst`: `typeid` first when declared, then one
    /// entry per signature parameter.
    pub fn to_dict(&self, inst: &dyn Serializable) -> Result<FrozenMap, SerializeError> {
        self.to_dict_with(inst)
    }

    /// [`to_dict`](Self::to_dict) into any map type.
    pub fn to_dict_with<M>(&self, inst: &dyn Serializable) -> Result<M, SerializeError>
    where
        M: FromIterator<(String, Value)>,
    {
        Ok(self.entries(inst, 0)?.into_iter().collect())
    }

    /// Construct an instance of `class` from `map`, skipping keys in `ignore`.
    pub fn from_dict(
        &self,
        class: &Class,
        map: &FrozenMap,
        ignore: &[&str],
    ) -> Result<Arc<dyn Serializable>, SerializeError> {
        let objects: Kwargs = map
            .iter()
            .map(|(k, v)| (k.to_string(), Object::from(v.clone())))
            .collect();
        self.from_object_map(class, objects, ignore, 0)
    }

    fn from_object_map(
        &self,
        class: &Class,
        map: Kwargs,
        ignore: &[&str],
        depth: usize,
    ) -> Result<Arc<dyn Serializable>, SerializeError> {
        self.check_depth(depth)?;
        let expected = self.typeid_of(class);
        let mut filtered = Kwargs::with_capacity(map.len());
        for (k, v) in map {
            if k == TYPEID_KEY {
                // only a string equal to the class typeid is accepted
                let matches = match (&v, &expected) {
                    (Object::Str(got), Some(expected)) => got == expected,
                    _ => false,
                };
                if !matches {
                    return Err(SerializeError::TypeidMismatch {
                        got: match v {
                            Object::Str(got) => got,
                            other => other.to_string(),
                        },
                        class: class.name().to_string(),
                        expected: expected.unwrap_or_else(|| "None".into()),
                    });
                }
            } else if !ignore.contains(&k.as_str()) {
                filtered.insert(k, v);
            }
        }
        class
            .construct(self, filtered, depth)
            .map_err(|e| SerializeError::Construction {
                typeid: expected.unwrap_or_else(|| class.name().to_string()),
                message: e.to_string(),
            })
    }

    /// Rebuild `value`: mappings are looked up in the registry by typeid and
    /// constructed, anything else passes through.
    ///
    /// With `type_check`, the result must be accepted by one of the given
    /// types: classes (`SlotType::from(class)`) or plain kinds.
    pub fn deserialize(
        &self,
        value: &Value,
        type_check: Option<&[SlotType]>,
    ) -> Result<Object, SerializeError> {
        let obj = match value {
            Value::Mapping(map) => {
                let class = self.registry.lookup(map)?;
                Object::Instance(self.from_dict(&class, map, &[])?)
            }
            other => Object::from(other.clone()),
        };
        if let Some(types) = type_check {
            if !types.iter().any(|t| t.accepts(&obj)) {
                return Err(SerializeError::TypeMismatch {
                    expected: types
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(" or "),
                    got: obj.kind_name(),
                });
            }
        }
        Ok(obj)
    }

    /// Deserialize `value` as an instance of `T`.
    pub fn deserialize_as<T: Serializable + Clone>(&self, value: &Value) -> Result<T, SerializeError> {
        let obj = self.deserialize(value, None)?;
        obj.as_instance()
            .and_then(|inst| inst.downcast_ref::<T>())
            .cloned()
            .ok_or_else(|| SerializeError::TypeMismatch {
                expected: crate::binding::class_of::<T>()
                    .map(|c| c.name().to_string())
                    .unwrap_or_else(|| std::any::type_name::<T>().to_string()),
                got: obj.kind_name(),
            })
    }

    /// Rebuild instances nested in a live object: mappings carrying a
    /// typeid are constructed, other mappings and lists are walked.
    pub(crate) fn deserialize_object(&self, obj: Object, depth: usize) -> Result<Object, SerializeError> {
        self.check_depth(depth)?;
        match obj {
            Object::Mapping(map) => {
                let typeid = match map.get(TYPEID_KEY) {
                    Some(Object::Str(typeid)) => Some(typeid.clone()),
                    Some(other) => return Err(RegistryError::InvalidTypeid(other.to_string()).into()),
                    None => None,
                };
                match typeid {
                    Some(typeid) => {
                        let class = self.registry.lookup_typeid(&typeid)?;
                        Ok(Object::Instance(self.from_object_map(&class, map, &[], depth + 1)?))
                    }
                    None => Ok(Object::Mapping(
                        map.into_iter()
                            .map(|(k, v)| Ok((k, self.deserialize_object(v, depth + 1)?)))
                            .collect::<Result<_, SerializeError>>()?,
                    )),
                }
            }
            Object::List(items) => Ok(Object::List(
                items
                    .into_iter()
                    .map(|v| self.deserialize_object(v, depth + 1))
                    .collect::<Result<_, _>>()?,
            )),
            other => Ok(other),
        }
    }
}

impl dyn Serializable {
    /// [`Serializer::to_dict`] over the global serializer.
    pub fn to_dict(&self) -> Result<FrozenMap, SerializeError> {
        Serializer::global().to_dict(self)
    }
}

/// Reduce `obj` to plain data using the global serializer.
pub fn serialize(obj: &Object) -> Result<Value, SerializeError> {
    Serializer::global().serialize(obj)
}

/// Ordered mapping of `inst` using the global serializer.
pub fn to_dict(inst: &dyn Serializable) -> Result<FrozenMap, SerializeError> {
    Serializer::global().to_dict(inst)
}

/// Construct `class` from `map` using the global serializer.
pub fn from_dict(
    class: &Class,
    map: &FrozenMap,
    ignore: &[&str],
) -> Result<Arc<dyn Serializable>, SerializeError> {
    Serializer::global().from_dict(class, map, ignore)
}

/// Rebuild `value` through the global registry.
pub fn deserialize(
    value: &Value,
    type_check: Option<&[SlotType]>,
) -> Result<Object, SerializeError> {
    Serializer::global().deserialize(value, type_check)
}

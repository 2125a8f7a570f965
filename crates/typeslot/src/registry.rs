// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Subclass registry: typeid → class lookup for polymorphic deserialization.

use crate::binding::Class;
use crate::error::RegistryError;
use crate::value::{FrozenMap, Value};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Key that carries the typeid in serialized mappings.
pub const TYPEID_KEY: &str = "typeid";

static GLOBAL: OnceLock<Arc<Registry>> = OnceLock::new();

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Append-only table from typeid to class.
///
/// Writes are serialized by an internal lock, so classes can be registered
/// from any thread. Each registry keeps its own class → typeid index, so one
/// class can carry different typeids in independent registries.
#[derive(Debug, Default)]
pub struct Registry {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    classes: HashMap<String, Arc<Class>>,
    // keyed by class address; entries hold the Arc, so the address is stable
    typeids: HashMap<usize, String>,
}

fn class_key(class: &Class) -> usize {
    class as *const Class as usize
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry used by the free serialization functions.
    pub fn global() -> Arc<Registry> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Registry::new())))
    }

    /// Register `class` under `typeid`.
    ///
    /// Registering a typeid twice replaces the earlier class. A class
    /// registered under a second typeid reports the latest one.
    pub fn register(&self, typeid: &str, class: &Arc<Class>) -> Arc<Class> {
        let previous = {
            let mut tables = self.tables.write();
            let previous = tables
                .classes
                .insert(typeid.to_string(), Arc::clone(class));
            if let Some(prev) = &previous {
                let key = class_key(prev);
                if tables.typeids.get(&key).map(String::as_str) == Some(typeid) {
                    tables.typeids.remove(&key);
                }
            }
            tables
                .typeids
                .insert(class_key(class), typeid.to_string());
            previous
        };
        match previous {
            Some(prev) if !Arc::ptr_eq(&prev, class) => {
                log::warn!(
                    "[registry] typeid '{}' re-registered: {} replaces {}",
                    typeid,
                    class.name(),
                    prev.name()
                );
            }
            _ => log::debug!("[registry] registered '{}' -> {}", typeid, class.name()),
        }
        Arc::clone(class)
    }

    /// Look up the class for a serialized mapping by its `typeid` entry.
    pub fn lookup(&self, mapping: &FrozenMap) -> Result<Arc<Class>, RegistryError> {
        match mapping.get(TYPEID_KEY) {
            None => Err(RegistryError::TypeidMissing(
                mapping.keys().map(str::to_string).collect(),
            )),
            Some(Value::Str(typeid)) => self.lookup_typeid(typeid),
            Some(other) => Err(RegistryError::InvalidTypeid(other.to_string())),
        }
    }

    /// Look up a class by typeid.
    pub fn lookup_typeid(&self, typeid: &str) -> Result<Arc<Class>, RegistryError> {
        self.tables
            .read()
            .classes
            .get(typeid)
            .cloned()
            .ok_or_else(|| RegistryError::InvalidTypeid(typeid.to_string()))
    }

    /// Typeid `class` is registered under here, if any.
    pub fn typeid_of(&self, class: &Class) -> Option<String> {
        self.tables.read().typeids.get(&class_key(class)).cloned()
    }

    pub fn contains(&self, typeid: &str) -> bool {
        self.tables.read().classes.contains_key(typeid)
    }

    /// Registered typeids, sorted.
    pub fn typeids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.tables.read().classes.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.tables.read().classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.read().classes.is_empty()
    }
}

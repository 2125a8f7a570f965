// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Default input widgets for slot types.
//!
//! A [`WidgetRegistry`] maps a [`TypeKind`] to the widget a UI should offer
//! for it. The process-wide table returned by [`WidgetRegistry::global`]
//! is pre-populated with the stock widgets.

use crate::error::WidgetError;
use crate::slot::{Slot, SlotShape, SlotType};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Input widget.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Widget {
    TextInput,
    Combo,
    CheckBox,
    Table,
    /// Widget supplied by an application.
    Custom(String),
}

impl fmt::Display for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TextInput => f.write_str("textinput"),
            Self::Combo => f.write_str("combo"),
            Self::CheckBox => f.write_str("checkbox"),
            Self::Table => f.write_str("table"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

/// Coarse classification of a slot type for widget lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Str,
    Int,
    Float,
    Bool,
    Enum,
    Mapping,
}

impl TypeKind {
    /// Classify a slot. Sequences take the kind of their element type.
    pub fn of(slot: &Slot) -> Option<Self> {
        match slot.shape() {
            SlotShape::Mapping(..) => Some(Self::Mapping),
            SlotShape::Plain(t) | SlotShape::Sequence(t) => Self::of_type(t),
        }
    }

    fn of_type(typ: &SlotType) -> Option<Self> {
        match typ {
            SlotType::Str => Some(Self::Str),
            SlotType::Int => Some(Self::Int),
            SlotType::Float => Some(Self::Float),
            SlotType::Bool => Some(Self::Bool),
            SlotType::Enum(_) => Some(Self::Enum),
            SlotType::Slot(inner) => Self::of(inner),
            SlotType::Any | SlotType::Class(_) | SlotType::Error(_) => None,
        }
    }
}

/// Table of supported widgets and the types they are the default for.
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    widgets: Vec<Widget>,
    defaults: HashMap<TypeKind, Widget>,
}

impl WidgetRegistry {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table pre-populated with the stock widgets.
    pub fn with_defaults() -> Result<Self, WidgetError> {
        let reg = Self::new();
        reg.register_types(
            Widget::TextInput,
            &[TypeKind::Str, TypeKind::Int, TypeKind::Float],
        )?;
        reg.register_types(Widget::Combo, &[TypeKind::Enum])?;
        reg.register_types(Widget::CheckBox, &[TypeKind::Bool])?;
        reg.register_types(Widget::Table, &[TypeKind::Mapping])?;
        Ok(reg)
    }

    /// Process-wide table with the stock widgets.
    pub fn global() -> &'static WidgetRegistry {
        static GLOBAL: OnceLock<WidgetRegistry> = OnceLock::new();
        GLOBAL.get_or_init(|| Self::with_defaults().unwrap_or_default())
    }

    /// Register `widget` as the default for each of `kinds`.
    ///
    /// A widget can only be registered once.
    pub fn register_types(&self, widget: Widget, kinds: &[TypeKind]) -> Result<(), WidgetError> {
        let mut inner = self.inner.write();
        if inner.widgets.contains(&widget) {
            return Err(WidgetError::AlreadyRegistered(widget.to_string()));
        }
        log::debug!("[widgets] register {} for {:?}", widget, kinds);
        inner.widgets.push(widget.clone());
        for kind in kinds {
            inner.defaults.insert(*kind, widget.clone());
        }
        Ok(())
    }

    /// Supported widgets in registration order.
    pub fn widgets(&self) -> Vec<Widget> {
        self.inner.read().widgets.clone()
    }

    pub fn default_for(&self, kind: TypeKind) -> Option<Widget> {
        self.inner.read().defaults.get(&kind).cloned()
    }
}

/// Default widget for `slot` from the global table.
pub fn default_widget(slot: &Slot) -> Option<Widget> {
    TypeKind::of(slot).and_then(|kind| WidgetRegistry::global().default_for(kind))
}

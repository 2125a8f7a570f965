// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types.
//!
//! One enum per concern, plus the crate-wide [`Error`] umbrella.

use thiserror::Error;

/// Slot definition capture failed. Always fatal to the defining code.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CaptureError {
    #[error("Expected a single type to be defined, got []")]
    NoBinding,

    #[error("Expected a single type to be defined, got {0:?}")]
    MultipleBindings(Vec<String>),

    #[error("Cannot annotate a type with shape {0}")]
    UnsupportedShape(String),
}

/// Signature extraction failed at definition time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignatureError {
    #[error("{callable}: argument {param} has type {ty} which is not an Annotation")]
    NotAnAnnotation {
        callable: String,
        param: String,
        ty: String,
    },

    #[error("{callable}: argument {param} has no type declaration")]
    Undeclared { callable: String, param: String },

    #[error("Expected Optional[Anno], Union[Anno,...] or Anno, got {0}")]
    BadUnion(String),

    #[error("Expected Optional[Anno] with default=None, got {anno} with default={default}")]
    OptionalDefault { anno: String, default: String },

    #[error("Got to the end of the function without seeing ->")]
    MissingReturn,

    #[error("Expected {expected} types for ({params}), got {got}")]
    TypeCountMismatch {
        expected: usize,
        got: usize,
        params: String,
    },

    #[error("Error evaluating {expr:?}: {reason}")]
    Evaluation { expr: String, reason: String },

    #[error("{callable}: duplicate argument {param}")]
    DuplicateParameter { callable: String, param: String },
}

/// A value could not be coerced into the declared sequence/mapping shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("Expected Array[{expected}], got Array[{got}]")]
    ElementType { expected: String, got: String },

    #[error("Type Mapping cannot be instantiated")]
    MappingNotInstantiable,
}

/// Calling a constructor or annotated function failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    #[error("{callable}() got an unexpected keyword argument '{name}'")]
    UnexpectedKeyword { callable: String, name: String },

    #[error("{callable}() missing required argument '{name}'")]
    MissingArgument { callable: String, name: String },

    #[error("argument '{name}': expected {expected}, got {got}")]
    Conversion {
        name: String,
        expected: String,
        got: String,
    },

    #[error("{0} has no constructor")]
    NoConstructor(String),

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("{0}")]
    Nested(String),
}

/// Typeid lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("typeid not present in keys {0:?}")]
    TypeidMissing(Vec<String>),

    #[error("'{0}' not a valid typeid")]
    InvalidTypeid(String),
}

/// Serialization or deserialization failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SerializeError {
    #[error("{class} has no attribute '{name}'")]
    MissingAttribute { class: String, name: String },

    #[error("object graph deeper than {0} levels")]
    DepthExceeded(usize),

    #[error("Dict has typeid {got} but {class} has typeid {expected}")]
    TypeidMismatch {
        got: String,
        class: String,
        expected: String,
    },

    #[error("{typeid} raised error: {message}")]
    Construction { typeid: String, message: String },

    #[error("Expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// JSON encode/decode failed.
#[derive(Debug, Error)]
pub enum JsonError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a JSON object at top level, got {0}")]
    NotAMapping(&'static str),

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error("JSON output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Dict-view access to an attribute that is not exposed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("KeyError: '{0}'")]
pub struct KeyError(pub String);

/// Widget table misuse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    #[error("Widget {0} already registered")]
    AlreadyRegistered(String),
}

/// Crate-wide error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Signature(#[from] SignatureError),
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Call(#[from] CallError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Serialize(#[from] SerializeError),
    #[error(transparent)]
    Json(#[from] JsonError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Widget(#[from] WidgetError),
}

/// Crate-wide result.
pub type Result<T, E = Error> = std::result::Result<T, E>;

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON wire format.
//!
//! Compact output uses `", "` and `": "` separators:
//! `{"exposure": 0.1, "path": "/tmp/f.txt"}`.

use crate::error::JsonError;
use crate::object::Object;
use crate::serialize::Serializer;
use crate::value::{FrozenMap, Value};
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use std::io;

/// Compact formatter with a space after each separator.
#[derive(Debug, Clone, Copy, Default)]
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Encode a plain value.
pub fn encode_value(value: &Value, pretty: bool) -> Result<String, JsonError> {
    let mut out = Vec::with_capacity(128);
    if pretty {
        let mut ser = serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"  "));
        value.serialize(&mut ser)?;
    } else {
        let mut ser = serde_json::Serializer::with_formatter(&mut out, SpacedFormatter);
        value.serialize(&mut ser)?;
    }
    Ok(String::from_utf8(out)?)
}

impl Serializer {
    /// Serialize `obj` and encode it as JSON.
    pub fn json_encode(&self, obj: &Object) -> Result<String, JsonError> {
        let value = self.serialize(obj)?;
        encode_value(&value, self.config().pretty_json)
    }
}

/// Serialize `obj` with the global serializer and encode it as JSON.
pub fn json_encode(obj: &Object) -> Result<String, JsonError> {
    Serializer::global().json_encode(obj)
}

/// Decode JSON text whose top level must be an object.
pub fn json_decode(text: &str) -> Result<FrozenMap, JsonError> {
    match serde_json::from_str::<Value>(text)? {
        Value::Mapping(map) => Ok(map),
        other => Err(JsonError::NotAMapping(other.kind_name())),
    }
}

// Copyright 2023 Datafuse Labs.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// This file contains the conversions between field values and what the
// database stores or binds.

use std::fmt::Debug;
use std::io;
use std::sync::Arc;

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::Serializer;

use crate::backend::Backend;
use crate::fragment::SqlParam;
use crate::Error;
use crate::Value;

/// Renders values that JSON has no representation for.
pub trait Encoder: Debug + Send + Sync {
    /// Converts an extension value (a date or a timestamp) to JSON.
    fn encode_extension(&self, value: &Value) -> Result<serde_json::Value, Error>;
}

/// Refuses extension values, like a plain JSON serializer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEncoder;

impl Encoder for DefaultEncoder {
    fn encode_extension(&self, value: &Value) -> Result<serde_json::Value, Error> {
        Err(Error::Unserializable(format!(
            "object of type {} is not JSON serializable",
            value.type_name()
        )))
    }
}

/// Renders dates as `YYYY-MM-DD` and timestamps as ISO 8601 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoEncoder;

impl Encoder for IsoEncoder {
    fn encode_extension(&self, value: &Value) -> Result<serde_json::Value, Error> {
        match value {
            Value::Date(date) => Ok(serde_json::Value::String(
                date.format("%Y-%m-%d").to_string(),
            )),
            Value::Timestamp(ts) => Ok(serde_json::Value::String(
                ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            )),
            _ => DefaultEncoder.encode_extension(value),
        }
    }
}

/// Parses stored JSON text.
pub trait Decoder: Debug + Send + Sync {
    fn decode(&self, text: &str) -> Result<Value, Error>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl Decoder for JsonDecoder {
    fn decode(&self, text: &str) -> Result<Value, Error> {
        loads(text)
    }
}

/// A JSON document handed to a driver that marshals JSON natively.
///
/// Dumping goes through the field's encoder, so custom serialization still
/// applies on backends where encoding is otherwise a pass-through.
#[derive(Debug, Clone)]
pub struct JsonAdapter {
    value: Value,
    encoder: Arc<dyn Encoder>,
}

impl JsonAdapter {
    pub fn new(value: Value, encoder: Arc<dyn Encoder>) -> Self {
        Self { value, encoder }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn dumps(&self) -> Result<String, Error> {
        dumps(&self.value, self.encoder.as_ref())
    }
}

impl PartialEq for JsonAdapter {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

/// What a driver returns for a JSON column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stored {
    /// SQL NULL.
    Null,
    /// JSON text, as returned for text and function-based JSON columns.
    Text(String),
    /// A value the driver already decoded.
    Decoded(Value),
}

impl From<&str> for Stored {
    fn from(v: &str) -> Self {
        Stored::Text(v.to_string())
    }
}

impl From<String> for Stored {
    fn from(v: String) -> Self {
        Stored::Text(v)
    }
}

impl From<Value> for Stored {
    fn from(v: Value) -> Self {
        Stored::Decoded(v)
    }
}

impl<T: Into<Stored>> From<Option<T>> for Stored {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Stored::Null)
    }
}

// Separators the function-based backend uses when it renders JSON as text.
struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
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

/// Converts a value to a `serde_json` tree, rendering extension values
/// with the encoder. Object members are emitted in sorted key order.
pub fn to_json(value: &Value, encoder: &dyn Encoder) -> Result<serde_json::Value, Error> {
    let json = match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(v) => serde_json::Value::Bool(*v),
        Value::Number(n) => serde_json::Value::Number(n.clone()),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(values) => serde_json::Value::Array(
            values
                .iter()
                .map(|v| to_json(v, encoder))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Object(obj) => {
            let mut map = serde_json::Map::new();
            for (k, v) in obj {
                map.insert(k.clone(), to_json(v, encoder)?);
            }
            serde_json::Value::Object(map)
        }
        Value::Date(_) | Value::Timestamp(_) => encoder.encode_extension(value)?,
    };
    Ok(json)
}

/// Serializes a value to canonical JSON text: sorted keys, `", "` between
/// items and `": "` between keys and values.
pub fn dumps(value: &Value, encoder: &dyn Encoder) -> Result<String, Error> {
    let json = to_json(value, encoder)?;
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, CanonicalFormatter);
    json.serialize(&mut ser)
        .map_err(|e| Error::Unserializable(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| Error::Unserializable(e.to_string()))
}

/// Parses JSON text.
pub fn loads(text: &str) -> Result<Value, Error> {
    serde_json::from_str::<serde_json::Value>(text)
        .map(Value::from)
        .map_err(|e| Error::MalformedValue(e.to_string()))
}

/// Encodes a value for storage on the given backend.
///
/// The rich backend receives a [`JsonAdapter`] for its driver to marshal,
/// the others receive canonical JSON text. A missing value stays SQL NULL.
pub fn encode(
    value: Option<&Value>,
    backend: Backend,
    encoder: &Arc<dyn Encoder>,
) -> Result<SqlParam, Error> {
    let Some(value) = value else {
        return Ok(SqlParam::Null);
    };
    log::trace!("encode {} value for {} backend", value.type_name(), backend);
    match backend {
        Backend::RichJson => Ok(SqlParam::Json(JsonAdapter::new(
            value.clone(),
            encoder.clone(),
        ))),
        Backend::FunctionJson | Backend::Generic => {
            Ok(SqlParam::Text(dumps(value, encoder.as_ref())?))
        }
    }
}

/// Decodes a stored value.
///
/// The same rule holds for every backend: SQL NULL is no value, values the
/// driver already decoded pass through unchanged and JSON text is parsed.
pub fn decode(stored: Stored, decoder: &dyn Decoder) -> Result<Option<Value>, Error> {
    match stored {
        Stored::Null => Ok(None),
        Stored::Decoded(value) => Ok(Some(value)),
        Stored::Text(text) => {
            log::trace!("decode {} bytes of JSON text", text.len());
            decoder.decode(&text).map(Some)
        }
    }
}

/// Turns JSON text into the parameter a comparison needs.
///
/// The function-based backend hands out extracted members as JSON text, so
/// a comparison operand is decoded to its logical scalar first. Structured
/// results are re-encoded to canonical text.
pub fn decode_for_compare(text: &str) -> Result<SqlParam, Error> {
    let value = loads(text)?;
    scalar_param(&value)
}

/// Binds a decoded value as a native scalar parameter.
pub(crate) fn scalar_param(value: &Value) -> Result<SqlParam, Error> {
    let param = match value {
        Value::Null => SqlParam::Null,
        Value::Bool(v) => SqlParam::Bool(*v),
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                SqlParam::Int(v)
            } else if let Some(v) = n.as_u64() {
                SqlParam::UInt(v)
            } else {
                SqlParam::Float(n.as_f64().unwrap_or_default())
            }
        }
        Value::String(s) => SqlParam::Text(s.clone()),
        Value::Array(_) | Value::Object(_) | Value::Date(_) | Value::Timestamp(_) => {
            SqlParam::Text(dumps(value, &DefaultEncoder)?)
        }
    };
    Ok(param)
}

/// The text a pattern operator compares against: strings as they are,
/// everything else as canonical JSON.
pub(crate) fn text_operand(value: &Value, encoder: &dyn Encoder) -> Result<String, Error> {
    match value {
        Value::String(s) => Ok(s.clone()),
        _ => match to_json(value, encoder)? {
            serde_json::Value::String(s) => Ok(s),
            _ => dumps(value, encoder),
        },
    }
}

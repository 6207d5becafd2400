/*
Copyright 2024-2025 The Airport Flight Authors

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

     https://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! The closed logical-type enum and value parser for the filter compiler.
//! Type-id normalization maps DuckDB aliases
//! (`TIMESTAMP WITH TIME ZONE`, `INT4`, `BOOL`, ...) to canonical ids.

use crate::error::AirportError;
use base64::Engine;
use serde_json::Value as Json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampUnit {
    Sec,
    Ms,
    Us,
    Ns,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogicalType {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    HugeInt,
    UTinyInt,
    USmallInt,
    UInteger,
    UBigInt,
    UHugeInt,
    Float,
    Double,
    Decimal { width: u8, scale: u8 },
    Varchar,
    Char,
    Blob,
    Date,
    Time { with_tz: bool },
    Timestamp { unit: TimestampUnit, tz: Option<String> },
    Interval,
    Uuid,
    List(Box<LogicalType>),
    Array(Box<LogicalType>, usize),
    Struct(Vec<(String, LogicalType)>),
    Map(Box<LogicalType>, Box<LogicalType>),
    Enum(Vec<String>),
}

impl LogicalType {
    /// Normalizes a DuckDB-ish type-id string to the canonical
    /// [`LogicalType`], reading child-type/size fields from `extra` when
    /// needed (LIST/ARRAY/STRUCT/MAP/DECIMAL/ENUM).
    pub fn parse(id: &str, extra: &Json) -> Result<LogicalType, AirportError> {
        let canonical = canonical_type_id(id);
        Ok(match canonical.as_str() {
            "BOOLEAN" => LogicalType::Boolean,
            "TINYINT" => LogicalType::TinyInt,
            "SMALLINT" => LogicalType::SmallInt,
            "INTEGER" => LogicalType::Integer,
            "BIGINT" => LogicalType::BigInt,
            "HUGEINT" => LogicalType::HugeInt,
            "UTINYINT" => LogicalType::UTinyInt,
            "USMALLINT" => LogicalType::USmallInt,
            "UINTEGER" => LogicalType::UInteger,
            "UBIGINT" => LogicalType::UBigInt,
            "UHUGEINT" => LogicalType::UHugeInt,
            "FLOAT" => LogicalType::Float,
            "DOUBLE" => LogicalType::Double,
            "DECIMAL" => LogicalType::Decimal {
                width: extra_u8(extra, "width").unwrap_or(18),
                scale: extra_u8(extra, "scale").unwrap_or(3),
            },
            "VARCHAR" => LogicalType::Varchar,
            "CHAR" => LogicalType::Char,
            "BLOB" => LogicalType::Blob,
            "DATE" => LogicalType::Date,
            "TIME" => LogicalType::Time { with_tz: false },
            "TIMETZ" => LogicalType::Time { with_tz: true },
            "TIMESTAMP_S" => LogicalType::Timestamp {
                unit: TimestampUnit::Sec,
                tz: None,
            },
            "TIMESTAMP_MS" => LogicalType::Timestamp {
                unit: TimestampUnit::Ms,
                tz: None,
            },
            "TIMESTAMP" | "TIMESTAMP_US" => LogicalType::Timestamp {
                unit: TimestampUnit::Us,
                tz: None,
            },
            "TIMESTAMP_NS" => LogicalType::Timestamp {
                unit: TimestampUnit::Ns,
                tz: None,
            },
            "TIMESTAMPTZ" => LogicalType::Timestamp {
                unit: TimestampUnit::Us,
                tz: Some(
                    extra
                        .get("timezone")
                        .and_then(Json::as_str)
                        .unwrap_or("UTC")
                        .to_string(),
                ),
            },
            "INTERVAL" => LogicalType::Interval,
            "UUID" => LogicalType::Uuid,
            "LIST" => {
                let child = extra
                    .get("child")
                    .ok_or_else(|| AirportError::invalid_argument("LIST type missing 'child'"))?;
                LogicalType::List(Box::new(parse_nested_type(child)?))
            }
            "ARRAY" => {
                let child = extra
                    .get("child")
                    .ok_or_else(|| AirportError::invalid_argument("ARRAY type missing 'child'"))?;
                let size = extra_u8(extra, "size").unwrap_or(0) as usize;
                LogicalType::Array(Box::new(parse_nested_type(child)?), size)
            }
            "STRUCT" => {
                let fields = extra
                    .get("fields")
                    .and_then(Json::as_array)
                    .ok_or_else(|| AirportError::invalid_argument("STRUCT type missing 'fields'"))?;
                let mut parsed = Vec::with_capacity(fields.len());
                for field in fields {
                    let name = field
                        .get("name")
                        .and_then(Json::as_str)
                        .ok_or_else(|| AirportError::invalid_argument("STRUCT field missing 'name'"))?
                        .to_string();
                    parsed.push((name, parse_nested_type(field)?));
                }
                LogicalType::Struct(parsed)
            }
            "MAP" => {
                let key = extra
                    .get("key")
                    .ok_or_else(|| AirportError::invalid_argument("MAP type missing 'key'"))?;
                let value = extra
                    .get("value")
                    .ok_or_else(|| AirportError::invalid_argument("MAP type missing 'value'"))?;
                LogicalType::Map(
                    Box::new(parse_nested_type(key)?),
                    Box::new(parse_nested_type(value)?),
                )
            }
            "ENUM" => {
                let values = extra
                    .get("values")
                    .and_then(Json::as_array)
                    .ok_or_else(|| AirportError::invalid_argument("ENUM type missing 'values'"))?
                    .iter()
                    .filter_map(Json::as_str)
                    .map(str::to_string)
                    .collect();
                LogicalType::Enum(values)
            }
            other => {
                return Err(AirportError::invalid_argument(format!(
                    "unrecognized logical type id: {other}"
                )))
            }
        })
    }
}

fn parse_nested_type(node: &Json) -> Result<LogicalType, AirportError> {
    let id = node
        .get("type_id")
        .or_else(|| node.get("type"))
        .and_then(Json::as_str)
        .ok_or_else(|| AirportError::invalid_argument("nested type missing 'type_id'"))?;
    LogicalType::parse(id, node)
}

fn extra_u8(extra: &Json, key: &str) -> Option<u8> {
    extra.get(key).and_then(Json::as_u64).map(|v| v as u8)
}

/// Maps known DuckDB aliases onto the canonical id recognized by
/// [`LogicalType::parse`].
fn canonical_type_id(id: &str) -> String {
    let upper = id.to_ascii_uppercase();
    match upper.as_str() {
        "BOOL" => "BOOLEAN".to_string(),
        "INT1" => "TINYINT".to_string(),
        "INT2" | "SHORT" => "SMALLINT".to_string(),
        "INT4" | "INT" | "SIGNED" => "INTEGER".to_string(),
        "INT8" | "LONG" => "BIGINT".to_string(),
        "FLOAT4" | "REAL" => "FLOAT".to_string(),
        "FLOAT8" => "DOUBLE".to_string(),
        "STRING" | "TEXT" | "BPCHAR" => "VARCHAR".to_string(),
        "TIMESTAMP WITH TIME ZONE" | "TIMESTAMPTZ" => "TIMESTAMPTZ".to_string(),
        "TIME WITH TIME ZONE" => "TIMETZ".to_string(),
        "BYTEA" | "BINARY" | "VARBINARY" => "BLOB".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int128(i128),
    UInt128(u128),
    Double(f64),
    String(String),
    Blob(Vec<u8>),
    Date(i32),
    Time(i64),
    Timestamp(i64),
    Interval { months: i32, days: i32, micros: i64 },
    Uuid(uuid::Uuid),
    List(Vec<Value>),
    Struct(Vec<(String, Value)>),
    Map(Vec<(Value, Value)>),
}

/// Parses a JSON value against its declared logical type.
///
/// Non-UTF8 strings arrive as `{"base64": "..."}`; HUGEINT/UHUGEINT arrive
/// as `{"upper": ..., "lower": ...}` and are reassembled into 128-bit
/// arithmetic.
pub fn parse_value(logical_type: &LogicalType, json: &Json) -> Result<Value, AirportError> {
    if json.is_null() {
        return Ok(Value::Null);
    }

    Ok(match logical_type {
        LogicalType::Boolean => Value::Boolean(
            json.as_bool()
                .ok_or_else(|| AirportError::invalid_argument("expected boolean value"))?,
        ),
        LogicalType::TinyInt
        | LogicalType::SmallInt
        | LogicalType::Integer
        | LogicalType::BigInt => Value::Int128(
            json.as_i64()
                .ok_or_else(|| AirportError::invalid_argument("expected signed integer value"))?
                as i128,
        ),
        LogicalType::UTinyInt | LogicalType::USmallInt | LogicalType::UInteger | LogicalType::UBigInt => {
            Value::UInt128(
                json.as_u64()
                    .ok_or_else(|| AirportError::invalid_argument("expected unsigned integer value"))?
                    as u128,
            )
        }
        LogicalType::HugeInt => Value::Int128(parse_hugeint(json)?),
        LogicalType::UHugeInt => Value::UInt128(parse_uhugeint(json)?),
        LogicalType::Float | LogicalType::Double | LogicalType::Decimal { .. } => Value::Double(
            json.as_f64()
                .ok_or_else(|| AirportError::invalid_argument("expected numeric value"))?,
        ),
        LogicalType::Varchar | LogicalType::Char | LogicalType::Enum(_) => Value::String(parse_string(json)?),
        LogicalType::Blob => Value::Blob(parse_blob(json)?),
        LogicalType::Date => Value::Date(
            json.as_i64()
                .ok_or_else(|| AirportError::invalid_argument("expected DATE as days-since-epoch"))?
                as i32,
        ),
        LogicalType::Time { .. } => Value::Time(
            json.as_i64()
                .ok_or_else(|| AirportError::invalid_argument("expected TIME as microseconds"))?,
        ),
        LogicalType::Timestamp { .. } => Value::Timestamp(
            json.as_i64()
                .ok_or_else(|| AirportError::invalid_argument("expected TIMESTAMP value"))?,
        ),
        LogicalType::Interval => {
            let months = json
                .get("months")
                .and_then(Json::as_i64)
                .ok_or_else(|| AirportError::invalid_argument("INTERVAL missing 'months'"))?
                as i32;
            let days = json
                .get("days")
                .and_then(Json::as_i64)
                .ok_or_else(|| AirportError::invalid_argument("INTERVAL missing 'days'"))?
                as i32;
            let micros = json
                .get("micros")
                .and_then(Json::as_i64)
                .ok_or_else(|| AirportError::invalid_argument("INTERVAL missing 'micros'"))?;
            Value::Interval {
                months,
                days,
                micros,
            }
        }
        LogicalType::Uuid => {
            let text = json
                .as_str()
                .ok_or_else(|| AirportError::invalid_argument("expected UUID string"))?;
            Value::Uuid(
                uuid::Uuid::parse_str(text)
                    .map_err(|e| AirportError::invalid_argument(format!("invalid UUID: {e}")))?,
            )
        }
        LogicalType::List(child) | LogicalType::Array(child, _) => {
            let items = json
                .as_array()
                .ok_or_else(|| AirportError::invalid_argument("expected array value"))?;
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(parse_value(child, item)?);
            }
            Value::List(values)
        }
        LogicalType::Struct(fields) => {
            let obj = json
                .as_object()
                .ok_or_else(|| AirportError::invalid_argument("expected struct object"))?;
            let mut values = Vec::with_capacity(fields.len());
            for (name, field_type) in fields {
                let field_json = obj.get(name).unwrap_or(&Json::Null);
                values.push((name.clone(), parse_value(field_type, field_json)?));
            }
            Value::Struct(values)
        }
        LogicalType::Map(key_type, value_type) => {
            let entries = json
                .as_array()
                .ok_or_else(|| AirportError::invalid_argument("expected MAP entry array"))?;
            let mut values = Vec::with_capacity(entries.len());
            for entry in entries {
                let key = entry
                    .get("key")
                    .ok_or_else(|| AirportError::invalid_argument("MAP entry missing 'key'"))?;
                let value = entry
                    .get("value")
                    .ok_or_else(|| AirportError::invalid_argument("MAP entry missing 'value'"))?;
                values.push((parse_value(key_type, key)?, parse_value(value_type, value)?));
            }
            Value::Map(values)
        }
    })
}

fn parse_string(json: &Json) -> Result<String, AirportError> {
    if let Some(s) = json.as_str() {
        return Ok(s.to_string());
    }
    if let Some(obj) = json.as_object() {
        if let Some(b64) = obj.get("base64").and_then(Json::as_str) {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(b64)
                .map_err(|e| AirportError::invalid_argument(format!("invalid base64 string: {e}")))?;
            return String::from_utf8(bytes)
                .map_err(|e| AirportError::invalid_argument(format!("non-UTF8 string payload: {e}")));
        }
    }
    Err(AirportError::invalid_argument("expected string value"))
}

fn parse_blob(json: &Json) -> Result<Vec<u8>, AirportError> {
    let text = json
        .as_str()
        .ok_or_else(|| AirportError::invalid_argument("expected base64-encoded BLOB"))?;
    base64::engine::general_purpose::STANDARD
        .decode(text)
        .map_err(|e| AirportError::invalid_argument(format!("invalid base64 blob: {e}")))
}

fn parse_hugeint(json: &Json) -> Result<i128, AirportError> {
    let upper = json
        .get("upper")
        .and_then(Json::as_i64)
        .ok_or_else(|| AirportError::invalid_argument("HUGEINT missing 'upper'"))?;
    let lower = json
        .get("lower")
        .and_then(Json::as_u64)
        .ok_or_else(|| AirportError::invalid_argument("HUGEINT missing 'lower'"))?;
    Ok(((upper as i128) << 64) | (lower as i128))
}

fn parse_uhugeint(json: &Json) -> Result<u128, AirportError> {
    let upper = json
        .get("upper")
        .and_then(Json::as_u64)
        .ok_or_else(|| AirportError::invalid_argument("UHUGEINT missing 'upper'"))?;
    let lower = json
        .get("lower")
        .and_then(Json::as_u64)
        .ok_or_else(|| AirportError::invalid_argument("UHUGEINT missing 'lower'"))?;
    Ok(((upper as u128) << 64) | (lower as u128))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_aliases() {
        let t = LogicalType::parse("BOOL", &Json::Null).expect("parse");
        assert_eq!(t, LogicalType::Boolean);
        let t = LogicalType::parse("INT4", &Json::Null).expect("parse");
        assert_eq!(t, LogicalType::Integer);
    }

    #[test]
    fn reassembles_hugeint() {
        let json = json!({"upper": 1, "lower": 0});
        let value = parse_value(&LogicalType::HugeInt, &json).expect("parse");
        assert_eq!(value, Value::Int128(1i128 << 64));
    }

    #[test]
    fn decodes_non_utf8_string_payload() {
        let encoded = base64::engine::general_purpose::STANDARD.encode("hello");
        let json = json!({"base64": encoded});
        let value = parse_value(&LogicalType::Varchar, &json).expect("parse");
        assert_eq!(value, Value::String("hello".to_string()));
    }

    #[test]
    fn rejects_unknown_type_id() {
        let err = LogicalType::parse("NOT_A_TYPE", &Json::Null).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);
    }
}

//! JSON ingestion and export.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"type":"circle","radius":5}, ...]`
//! - A single object
//! - Newline-delimited JSON (NDJSON): one object per line
//!
//! Shape records need a string `type`. `circle` needs `radius`, `square` needs `width`,
//! `rectangle` needs `width` and `height`; other kinds are kept as-is and only fail if a
//! geometry operation is applied to them. `x` / `y` are optional numbers (default `0`). Every
//! other key becomes an attribute.
//!
//! Operation records with a `property` are filters (`operator` and `value` required). Records
//! with an `action` instead are transforms; their remaining keys are parameters. The
//! informational `type` key (`"filter"` / `"transform"`) is ignored.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Map;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{FilterOperation, Geometry, Operation, Operator, Shape, TransformOperation, Value};

type JsonObject = Map<String, serde_json::Value>;

/// Read shapes from a JSON/NDJSON file.
pub fn shapes_from_json_path(path: impl AsRef<Path>) -> IngestionResult<Vec<Shape>> {
    let text = fs::read_to_string(path)?;
    shapes_from_json_str(&text)
}

/// Read shapes from an in-memory JSON/NDJSON string.
pub fn shapes_from_json_str(input: &str) -> IngestionResult<Vec<Shape>> {
    parse_records(input)?
        .iter()
        .enumerate()
        .map(|(idx0, v)| shape_from_json(idx0 + 1, v))
        .collect()
}

/// Read operations from a JSON/NDJSON file.
pub fn operations_from_json_path(path: impl AsRef<Path>) -> IngestionResult<Vec<Operation>> {
    let text = fs::read_to_string(path)?;
    operations_from_json_str(&text)
}

/// Read operations from an in-memory JSON/NDJSON string.
pub fn operations_from_json_str(input: &str) -> IngestionResult<Vec<Operation>> {
    parse_records(input)?
        .iter()
        .enumerate()
        .map(|(idx0, v)| operation_from_json(idx0 + 1, v))
        .collect()
}

/// Serialize shapes as a pretty-printed JSON array.
///
/// Integral numbers are written without a fractional part.
pub fn shapes_to_json_string(shapes: &[Shape]) -> IngestionResult<String> {
    Ok(serde_json::to_string_pretty(shapes)?)
}

fn parse_records(input: &str) -> IngestionResult<Vec<serde_json::Value>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(IngestionError::SchemaMismatch {
            message: "json input is empty".to_string(),
        });
    }

    // First try parsing as a single JSON value (array or object).
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return match v {
            serde_json::Value::Array(items) => Ok(items),
            serde_json::Value::Object(_) => Ok(vec![v]),
            _ => Err(IngestionError::SchemaMismatch {
                message: "json must be an object, an array of objects, or NDJSON".to_string(),
            }),
        };
    }

    // Fall back to NDJSON.
    let mut values = Vec::new();
    for (i, line) in trimmed.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let v = serde_json::from_str::<serde_json::Value>(line).map_err(|e| IngestionError::SchemaMismatch {
            message: format!("invalid ndjson at line {}: {}", i + 1, e),
        })?;
        values.push(v);
    }
    Ok(values)
}

fn as_object(record: usize, v: &serde_json::Value) -> IngestionResult<&JsonObject> {
    v.as_object().ok_or_else(|| IngestionError::SchemaMismatch {
        message: format!("record {record} is not a json object"),
    })
}

fn shape_from_json(record: usize, v: &serde_json::Value) -> IngestionResult<Shape> {
    let obj = as_object(record, v)?;
    let kind = required_str(record, obj, "type")?;

    let geometry = match kind {
        "circle" => Geometry::Circle {
            radius: required_number(record, obj, "radius")?,
        },
        "square" => Geometry::Square {
            width: required_number(record, obj, "width")?,
        },
        "rectangle" => Geometry::Rectangle {
            width: required_number(record, obj, "width")?,
            height: required_number(record, obj, "height")?,
        },
        other => Geometry::Other {
            kind: other.to_string(),
        },
    };
    let mut shape = Shape::new(geometry);
    shape.x = optional_number(record, obj, "x")?.unwrap_or(0.0);
    shape.y = optional_number(record, obj, "y")?.unwrap_or(0.0);

    for (key, jv) in obj {
        if shape.is_structural_field(key) {
            continue;
        }
        shape.attributes.insert(key.clone(), convert_json_value(record, key, jv)?);
    }
    Ok(shape)
}

fn operation_from_json(record: usize, v: &serde_json::Value) -> IngestionResult<Operation> {
    let obj = as_object(record, v)?;

    if is_present(obj, "property") {
        let property = required_str(record, obj, "property")?.to_string();
        let operator = Operator::parse(required_str(record, obj, "operator")?);
        let raw = obj.get("value").ok_or_else(|| IngestionError::SchemaMismatch {
            message: format!("record {record} missing required field 'value'"),
        })?;
        return Ok(Operation::Filter(FilterOperation {
            property,
            operator,
            value: convert_json_value(record, "value", raw)?,
        }));
    }

    if is_present(obj, "action") {
        let action = required_str(record, obj, "action")?.to_string();
        let mut params = BTreeMap::new();
        for (key, jv) in obj {
            if matches!(key.as_str(), "action" | "type" | "property") {
                continue;
            }
            params.insert(key.clone(), convert_json_value(record, key, jv)?);
        }
        return Ok(Operation::Transform(TransformOperation { action, params }));
    }

    Err(IngestionError::SchemaMismatch {
        message: format!("record {record} has neither 'property' nor 'action'"),
    })
}

/// `null` counts as absent, so `{"property": null, "action": ...}` is a transform.
fn is_present(obj: &JsonObject, field: &str) -> bool {
    obj.get(field).is_some_and(|v| !v.is_null())
}

fn required_str<'a>(record: usize, obj: &'a JsonObject, field: &str) -> IngestionResult<&'a str> {
    let v = obj.get(field).ok_or_else(|| IngestionError::SchemaMismatch {
        message: format!("record {record} missing required field '{field}'"),
    })?;
    v.as_str().ok_or_else(|| parse_error(record, field, v, "expected string"))
}

fn required_number(record: usize, obj: &JsonObject, field: &str) -> IngestionResult<f64> {
    optional_number(record, obj, field)?.ok_or_else(|| IngestionError::SchemaMismatch {
        message: format!("record {record} missing required field '{field}'"),
    })
}

fn optional_number(record: usize, obj: &JsonObject, field: &str) -> IngestionResult<Option<f64>> {
    match obj.get(field) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| parse_error(record, field, v, "expected number")),
    }
}

fn convert_json_value(record: usize, field: &str, v: &serde_json::Value) -> IngestionResult<Value> {
    Ok(match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(f) => Value::Number(f),
            None => return Err(parse_error(record, field, v, "number out of range")),
        },
        serde_json::Value::String(s) => Value::Text(s.clone()),
        serde_json::Value::Array(items) => Value::List(
            items
                .iter()
                .map(|item| convert_json_value(record, field, item))
                .collect::<IngestionResult<_>>()?,
        ),
        serde_json::Value::Object(_) => {
            return Err(parse_error(record, field, v, "nested objects are not supported"));
        }
    })
}

fn parse_error(record: usize, field: &str, v: &serde_json::Value, message: &str) -> IngestionError {
    IngestionError::ParseError {
        record,
        field: field.to_string(),
        raw: v.to_string(),
        message: message.to_string(),
    }
}

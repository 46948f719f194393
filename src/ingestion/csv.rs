//! CSV ingestion of shape records.

use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{Geometry, Shape, Value};

/// Read shapes from a CSV file.
///
/// Rules:
///
/// - CSV must have headers, including `type`.
/// - `radius`, `width`, `height`, `x`, `y` are numeric columns; the size columns a kind needs
///   must be non-empty for that row. `x` / `y` default to `0`.
/// - Any other non-empty cell, including size columns the row's kind doesn't use, becomes an
///   attribute: a number if it parses as one, text otherwise.
pub fn shapes_from_csv_path(path: impl AsRef<Path>) -> IngestionResult<Vec<Shape>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    shapes_from_csv_reader(&mut rdr)
}

/// Read shapes from an existing CSV reader.
pub fn shapes_from_csv_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> IngestionResult<Vec<Shape>> {
    let headers = rdr.headers()?.clone();
    let type_idx = headers
        .iter()
        .position(|h| h == "type")
        .ok_or_else(|| IngestionError::SchemaMismatch {
            message: format!(
                "missing required column 'type'. headers={:?}",
                headers.iter().collect::<Vec<_>>()
            ),
        })?;

    let mut shapes = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // 1-based, and the header is row 1.
        let row = row_idx0 + 2;
        let record = result?;
        let cell = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .and_then(|idx| record.get(idx))
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };
        let number = |name: &str| -> IngestionResult<Option<f64>> {
            cell(name)
                .map(|raw| {
                    raw.parse::<f64>().map_err(|e| IngestionError::ParseError {
                        record: row,
                        field: name.to_string(),
                        raw: raw.to_string(),
                        message: e.to_string(),
                    })
                })
                .transpose()
        };
        let required = |name: &str| -> IngestionResult<f64> {
            number(name)?.ok_or_else(|| IngestionError::SchemaMismatch {
                message: format!("row {row} missing required value '{name}'"),
            })
        };

        let kind = record.get(type_idx).map(str::trim).unwrap_or("");
        let geometry = match kind {
            "" => {
                return Err(IngestionError::SchemaMismatch {
                    message: format!("row {row} has an empty 'type'"),
                });
            }
            "circle" => Geometry::Circle {
                radius: required("radius")?,
            },
            "square" => Geometry::Square {
                width: required("width")?,
            },
            "rectangle" => Geometry::Rectangle {
                width: required("width")?,
                height: required("height")?,
            },
            other => Geometry::Other {
                kind: other.to_string(),
            },
        };

        let geometry_fields = geometry.size_fields();
        let mut shape = Shape::new(geometry);
        shape.x = number("x")?.unwrap_or(0.0);
        shape.y = number("y")?.unwrap_or(0.0);

        for (name, raw) in headers.iter().zip(record.iter()) {
            let raw = raw.trim();
            if raw.is_empty() || matches!(name, "type" | "x" | "y") || geometry_fields.contains(&name) {
                continue;
            }
            let value = raw
                .parse::<f64>()
                .map(Value::Number)
                .unwrap_or_else(|_| Value::Text(raw.to_string()));
            shape.attributes.insert(name.to_string(), value);
        }
        shapes.push(shape);
    }

    Ok(shapes)
}

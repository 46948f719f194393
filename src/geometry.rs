//! Per-kind geometry routines: derived metrics (area, circumference) and in-place mutations
//! (scale, move).
//!
//! All derived metrics are rounded to whole numbers with [`round_half_up`]. Kinds without a
//! routine ([`Geometry::Other`]) report [`HandlerError::MissingHandler`]; there is no default
//! geometry.

use std::f64::consts::PI;

use crate::error::HandlerError;
use crate::types::{Geometry, Shape};

/// Round to the nearest integer, with ties going toward positive infinity.
///
/// This differs from [`f64::round`] for negative ties: `round_half_up(-2.5) == -2.0`.
pub fn round_half_up(x: f64) -> f64 {
    let floor = x.floor();
    if x - floor >= 0.5 { floor + 1.0 } else { floor }
}

/// Rounded area of the shape.
pub fn area(shape: &Shape) -> Result<f64, HandlerError> {
    match &shape.geometry {
        Geometry::Circle { radius } => Ok(round_half_up(radius.powi(2) * PI)),
        Geometry::Square { width } => Ok(round_half_up(width.powi(2))),
        Geometry::Rectangle { width, height } => Ok(round_half_up(width * height)),
        Geometry::Other { kind } => Err(missing(kind)),
    }
}

/// Rounded circumference of the shape.
///
/// Rectangles round `width + height` before doubling, so a half-unit sum contributes a full
/// extra unit (`1.5 x 1.0` gives `6`, not `5`).
pub fn circumference(shape: &Shape) -> Result<f64, HandlerError> {
    match &shape.geometry {
        Geometry::Circle { radius } => Ok(round_half_up(radius * 2.0 * PI)),
        Geometry::Square { width } => Ok(round_half_up(width * 4.0)),
        Geometry::Rectangle { width, height } => Ok(round_half_up(width + height) * 2.0),
        Geometry::Other { kind } => Err(missing(kind)),
    }
}

/// Multiply every size field by `factor` and round the result in place.
///
/// Zero and negative results are kept as-is.
pub fn scale(shape: &mut Shape, factor: f64) -> Result<(), HandlerError> {
    match &mut shape.geometry {
        Geometry::Circle { radius } => *radius = round_half_up(factor * *radius),
        Geometry::Square { width } => *width = round_half_up(factor * *width),
        Geometry::Rectangle { width, height } => {
            *width = round_half_up(factor * *width);
            *height = round_half_up(factor * *height);
        }
        Geometry::Other { kind } => return Err(missing(kind.as_str())),
    }
    Ok(())
}

/// Shift the shape's position. Works for every kind.
pub fn translate(shape: &mut Shape, dx: f64, dy: f64) {
    shape.x += dx;
    shape.y += dy;
}

fn missing(kind: &str) -> HandlerError {
    HandlerError::MissingHandler {
        kind: kind.to_string(),
    }
}

//! Core data model: shapes, attribute values and pipeline operations.
//!
//! Shapes and operations are plain owned values. Cloning either is a full structural copy, which
//! is what deep-mode evaluation relies on to keep caller data untouched.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A dynamically typed value used for shape attributes, filter operands and transform
/// parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Any number; geometry is computed in `f64`.
    Number(f64),
    /// UTF-8 string.
    Text(String),
    /// Ordered list, e.g. the `[low, high]` operand of an `in` filter.
    List(Vec<Value>),
}

impl Value {
    /// Returns the number if this is a [`Value::Number`].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string slice if this is a [`Value::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => serialize_number(*n, serializer),
            Self::Text(s) => serializer.serialize_str(s),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// Integral numbers are written as JSON integers so exported records match their source.
fn serialize_number<S: Serializer>(n: f64, serializer: S) -> Result<S::Ok, S::Error> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        serializer.serialize_i64(n as i64)
    } else {
        serializer.serialize_f64(n)
    }
}

/// Kind-specific geometry of a [`Shape`].
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Circle { radius: f64 },
    Square { width: f64 },
    Rectangle { width: f64, height: f64 },
    /// A kind the geometry routines don't know. Its size fields (if any) live in the shape's
    /// attributes; area/circumference/scale on it fail with a missing-handler error.
    Other { kind: String },
}

impl Geometry {
    /// The shape kind string (`"circle"`, `"square"`, `"rectangle"`, or the custom kind).
    pub fn kind(&self) -> &str {
        match self {
            Self::Circle { .. } => "circle",
            Self::Square { .. } => "square",
            Self::Rectangle { .. } => "rectangle",
            Self::Other { kind } => kind,
        }
    }

    /// Names of the record fields this geometry is built from.
    pub fn size_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Circle { .. } => &["radius"],
            Self::Square { .. } => &["width"],
            Self::Rectangle { .. } => &["width", "height"],
            Self::Other { .. } => &[],
        }
    }
}

/// A geometric shape record.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// Kind and size fields.
    pub geometry: Geometry,
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Free-form attributes (`color`, ...) available to custom filters.
    pub attributes: BTreeMap<String, Value>,
}

impl Shape {
    /// Create a shape at the origin with no attributes.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            x: 0.0,
            y: 0.0,
            attributes: BTreeMap::new(),
        }
    }

    pub fn circle(radius: f64) -> Self {
        Self::new(Geometry::Circle { radius })
    }

    pub fn square(width: f64) -> Self {
        Self::new(Geometry::Square { width })
    }

    pub fn rectangle(width: f64, height: f64) -> Self {
        Self::new(Geometry::Rectangle { width, height })
    }

    /// Set the position.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Set (or replace) an attribute.
    ///
    /// Attributes named like a structural field (`type`, `x`, `y` or one of this kind's size
    /// fields) are kept for custom filters but never shadow the real field; see [`Shape::field`].
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// The shape kind string.
    pub fn kind(&self) -> &str {
        self.geometry.kind()
    }

    /// Returns an attribute by name, if present.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Whether `name` is one of this shape's record fields rather than a free-form attribute.
    pub fn is_structural_field(&self, name: &str) -> bool {
        matches!(name, "type" | "x" | "y") || self.geometry.size_fields().contains(&name)
    }

    /// Resolve a record field by name: `type`, `x`, `y` and the kind's size fields first, then
    /// [`Shape::attributes`].
    pub fn field(&self, name: &str) -> Option<Value> {
        match (name, &self.geometry) {
            ("type", _) => Some(Value::from(self.kind())),
            ("x", _) => Some(Value::Number(self.x)),
            ("y", _) => Some(Value::Number(self.y)),
            ("radius", Geometry::Circle { radius }) => Some(Value::Number(*radius)),
            ("width", Geometry::Square { width } | Geometry::Rectangle { width, .. }) => {
                Some(Value::Number(*width))
            }
            ("height", Geometry::Rectangle { height, .. }) => Some(Value::Number(*height)),
            _ => self.attributes.get(name).cloned(),
        }
    }
}

impl Serialize for Shape {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.kind())?;
        match &self.geometry {
            Geometry::Circle { radius } => map.serialize_entry("radius", &Value::Number(*radius))?,
            Geometry::Square { width } => map.serialize_entry("width", &Value::Number(*width))?,
            Geometry::Rectangle { width, height } => {
                map.serialize_entry("width", &Value::Number(*width))?;
                map.serialize_entry("height", &Value::Number(*height))?;
            }
            Geometry::Other { .. } => {}
        }
        map.serialize_entry("x", &Value::Number(self.x))?;
        map.serialize_entry("y", &Value::Number(self.y))?;
        for (name, value) in &self.attributes {
            if self.is_structural_field(name) {
                continue;
            }
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Comparison operator of a filter operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Gt,
    Lt,
    Eq,
    Neq,
    /// Exclusive range check against a `[low, high]` operand.
    In,
    /// Any other operator name. Built-in filters fail closed on it; custom filters may interpret
    /// it.
    Other(String),
}

impl Operator {
    /// Parse an operator name (case-sensitive, like the operation records themselves).
    pub fn parse(name: &str) -> Self {
        match name {
            "gt" => Self::Gt,
            "lt" => Self::Lt,
            "eq" => Self::Eq,
            "neq" => Self::Neq,
            "in" => Self::In,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::In => "in",
            Self::Other(name) => name,
        }
    }
}

/// A filter step: `{ property, operator, value }`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOperation {
    /// Registry key of the filter handler (e.g. `area`).
    pub property: String,
    pub operator: Operator,
    /// Scalar threshold, or `[low, high]` for [`Operator::In`].
    pub value: Value,
}

/// A transform step: `{ action, ...params }`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOperation {
    /// Registry key of the transform handler (e.g. `scale`).
    pub action: String,
    pub params: BTreeMap<String, Value>,
}

impl TransformOperation {
    /// Returns a parameter by name, if present.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }
}

/// One pipeline step.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Filter(FilterOperation),
    Transform(TransformOperation),
}

impl Operation {
    /// Build a filter operation.
    pub fn filter(property: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self::Filter(FilterOperation {
            property: property.into(),
            operator,
            value: value.into(),
        })
    }

    /// Build an `in` filter with an exclusive `(low, high)` range.
    pub fn filter_in(property: impl Into<String>, low: f64, high: f64) -> Self {
        Self::Filter(FilterOperation {
            property: property.into(),
            operator: Operator::In,
            value: Value::List(vec![Value::Number(low), Value::Number(high)]),
        })
    }

    /// Build a transform operation with the given parameters.
    pub fn transform<I, K>(action: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::Transform(TransformOperation {
            action: action.into(),
            params: params.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        })
    }

    /// `{ action: "scale", factor }`.
    pub fn scale(factor: f64) -> Self {
        Self::transform("scale", [("factor", Value::Number(factor))])
    }

    /// `{ action: "move", x, y }`.
    pub fn translate(dx: f64, dy: f64) -> Self {
        Self::transform("move", [("x", Value::Number(dx)), ("y", Value::Number(dy))])
    }

    /// Registry key: the filter `property`, or the transform `action`.
    pub fn key(&self) -> &str {
        match self {
            Self::Filter(f) => &f.property,
            Self::Transform(t) => &t.action,
        }
    }

    pub fn as_filter(&self) -> Option<&FilterOperation> {
        match self {
            Self::Filter(f) => Some(f),
            Self::Transform(_) => None,
        }
    }

    pub fn as_transform(&self) -> Option<&TransformOperation> {
        match self {
            Self::Transform(t) => Some(t),
            Self::Filter(_) => None,
        }
    }
}

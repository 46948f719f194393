//! Operation registry: maps operation keys to handlers.
//!
//! A [`Registry`] is an explicit value handed to each pipeline run, so different runs (or
//! threads) can use different handler sets without touching shared state. Cloning a registry
//! is cheap (handlers are reference-counted) and gives an independent snapshot.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::HandlerError;
use crate::geometry;
use crate::processing::compare::compare;
use crate::types::{FilterOperation, Operation, Operator, Shape, TransformOperation, Value};

/// Keys registered by [`Registry::with_builtins`].
pub const BUILTIN_KEYS: [&str; 4] = ["area", "circumference", "scale", "move"];

/// A pipeline step implementation.
///
/// Returning `Ok(false)` excludes the shape from the result. Transforms mutate `shape` and
/// return `Ok(true)`.
///
/// Any `Fn(&mut Shape, &Operation) -> Result<bool, HandlerError>` is a handler.
pub trait OperationHandler: Send + Sync {
    fn apply(&self, shape: &mut Shape, operation: &Operation) -> Result<bool, HandlerError>;
}

impl<F> OperationHandler for F
where
    F: Fn(&mut Shape, &Operation) -> Result<bool, HandlerError> + Send + Sync,
{
    fn apply(&self, shape: &mut Shape, operation: &Operation) -> Result<bool, HandlerError> {
        self(shape, operation)
    }
}

/// Mapping from operation key to handler. Lookup is by exact key.
#[derive(Clone)]
pub struct Registry {
    handlers: HashMap<String, Arc<dyn OperationHandler>>,
}

impl Registry {
    /// A registry with no handlers at all.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// A registry with the built-in `area`, `circumference`, `scale` and `move` handlers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register_fn("area", area_filter);
        registry.register_fn("circumference", circumference_filter);
        registry.register_fn("scale", scale_transform);
        registry.register_fn("move", move_transform);
        registry
    }

    /// Install `handler` under `key`, silently replacing any existing handler.
    ///
    /// Returns the replaced handler, if there was one.
    pub fn register<H>(&mut self, key: impl Into<String>, handler: H) -> Option<Arc<dyn OperationHandler>>
    where
        H: OperationHandler + 'static,
    {
        self.handlers.insert(key.into(), Arc::new(handler))
    }

    /// Same as [`Self::register`], but pins the closure signature so parameter types can be
    /// left to inference.
    pub fn register_fn<F>(&mut self, key: impl Into<String>, handler: F) -> Option<Arc<dyn OperationHandler>>
    where
        F: Fn(&mut Shape, &Operation) -> Result<bool, HandlerError> + Send + Sync + 'static,
    {
        self.register(key, handler)
    }

    /// Remove the handler for `key`.
    pub fn unregister(&mut self, key: &str) -> Option<Arc<dyn OperationHandler>> {
        self.handlers.remove(key)
    }

    /// Returns the handler for `key`, if registered.
    pub fn get(&self, key: &str) -> Option<&Arc<dyn OperationHandler>> {
        self.handlers.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("keys", &self.keys()).finish()
    }
}

/// Filter on a named shape field (e.g. `color`, or `x`), resolved through [`Shape::field`].
///
/// - `eq`: the attribute equals the operand.
/// - `neq`: the attribute differs from the operand.
/// - any other operator: passes.
///
/// A missing field compares as [`Value::Null`].
#[derive(Debug, Clone)]
pub struct AttributeFilter {
    name: String,
}

impl AttributeFilter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl OperationHandler for AttributeFilter {
    fn apply(&self, shape: &mut Shape, operation: &Operation) -> Result<bool, HandlerError> {
        let filter = require_filter(operation)?;
        let actual = shape.field(&self.name).unwrap_or(Value::Null);
        Ok(match filter.operator {
            Operator::Eq => actual == filter.value,
            Operator::Neq => actual != filter.value,
            _ => true,
        })
    }
}

fn area_filter(shape: &mut Shape, operation: &Operation) -> Result<bool, HandlerError> {
    let filter = require_filter(operation)?;
    let value = geometry::area(shape)?;
    compare(&filter.operator, &filter.value, value)
}

fn circumference_filter(shape: &mut Shape, operation: &Operation) -> Result<bool, HandlerError> {
    let filter = require_filter(operation)?;
    let value = geometry::circumference(shape)?;
    compare(&filter.operator, &filter.value, value)
}

fn scale_transform(shape: &mut Shape, operation: &Operation) -> Result<bool, HandlerError> {
    let transform = require_transform(operation)?;
    let factor = number_param(transform, "factor")?;
    geometry::scale(shape, factor)?;
    Ok(true)
}

fn move_transform(shape: &mut Shape, operation: &Operation) -> Result<bool, HandlerError> {
    let transform = require_transform(operation)?;
    let dx = number_param(transform, "x")?;
    let dy = number_param(transform, "y")?;
    geometry::translate(shape, dx, dy);
    Ok(true)
}

fn require_filter(operation: &Operation) -> Result<&FilterOperation, HandlerError> {
    operation.as_filter().ok_or_else(|| {
        HandlerError::malformed(format!(
            "'{}' is a filter and needs property/operator/value",
            operation.key()
        ))
    })
}

fn require_transform(operation: &Operation) -> Result<&TransformOperation, HandlerError> {
    operation.as_transform().ok_or_else(|| {
        HandlerError::malformed(format!("'{}' is a transform and needs an action", operation.key()))
    })
}

fn number_param(transform: &TransformOperation, name: &str) -> Result<f64, HandlerError> {
    match transform.param(name) {
        Some(Value::Number(n)) => Ok(*n),
        Some(other) => Err(HandlerError::malformed(format!(
            "parameter '{name}' must be a number, got {other:?}"
        ))),
        None => Err(HandlerError::malformed(format!("missing parameter '{name}'"))),
    }
}

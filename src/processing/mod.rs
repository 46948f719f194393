//! Pipeline evaluation over in-memory shapes.
//!
//! - [`compare()`]: the relational check shared by numeric filters (`gt`, `lt`, `eq`, `neq`, `in`)
//! - [`Registry`]: operation key → handler table, with the built-in `area`, `circumference`,
//!   `scale` and `move` handlers
//! - [`process()`] / [`process_in_place()`]: run an ordered operation list over shapes
//!
//! ## Example: scale, then filter, with a custom attribute filter
//!
//! ```rust
//! use shape_pipeline::processing::{process, AttributeFilter, Registry};
//! use shape_pipeline::types::{Operation, Operator, Shape};
//!
//! let mut registry = Registry::default();
//! registry.register("color", AttributeFilter::new("color"));
//!
//! let shapes = vec![
//!     Shape::circle(4.0).with_attribute("color", "blue"),
//!     Shape::square(3.0).with_attribute("color", "red"),
//!     Shape::square(2.0).with_attribute("color", "blue"),
//! ];
//! let operations = vec![
//!     Operation::scale(2.0),
//!     Operation::filter("area", Operator::Gt, 50.0),
//!     Operation::filter("color", Operator::Neq, "red"),
//! ];
//!
//! let out = process(&shapes, &operations, &registry).unwrap();
//! assert_eq!(out, vec![Shape::circle(8.0).with_attribute("color", "blue")]);
//! // Caller data is untouched.
//! assert_eq!(shapes[0], Shape::circle(4.0).with_attribute("color", "blue"));
//! ```

pub mod compare;
pub mod evaluate;
pub mod registry;

pub use compare::compare;
pub use evaluate::{evaluate_shape, process, process_in_place, process_with_mode, ProcessMode};
pub use registry::{AttributeFilter, OperationHandler, Registry, BUILTIN_KEYS};

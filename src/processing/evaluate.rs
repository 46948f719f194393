//! Pipeline evaluation: runs an ordered operation list over every shape.

use crate::error::{PipelineError, PipelineResult};
use crate::processing::registry::Registry;
use crate::types::{Operation, Shape};

/// Whether a run works on copies of the caller's shapes or on the shapes themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProcessMode {
    /// Clone every shape before evaluating it; caller data is never mutated.
    #[default]
    Deep,
    /// Evaluate the caller's shapes directly; transforms mutate them, including shapes that are
    /// rejected by a later filter.
    InPlace,
}

/// Run `operations` over copies of `shapes` and return the copies that pass every filter.
///
/// For each shape (in input order) operations run left to right. A handler returning `false`
/// drops the shape and skips its remaining operations. Transforms earlier in the list mutate the
/// copy before later filters see it, so operation order matters.
///
/// Fails on the first error; no partial result is returned.
pub fn process(
    shapes: &[Shape],
    operations: &[Operation],
    registry: &Registry,
) -> PipelineResult<Vec<Shape>> {
    let mut out = Vec::new();
    for (index, shape) in shapes.iter().enumerate() {
        let mut copy = shape.clone();
        if evaluate_shape(&mut copy, index, operations, registry)? {
            out.push(copy);
        }
    }
    Ok(out)
}

/// Run `operations` directly over `shapes` and return references to the survivors.
///
/// Transforms mutate the caller's shapes in place; the returned references alias them.
/// On error, shapes before the failing one have already been mutated.
pub fn process_in_place<'a>(
    shapes: &'a mut [Shape],
    operations: &[Operation],
    registry: &Registry,
) -> PipelineResult<Vec<&'a Shape>> {
    let survivors = survivor_indices(shapes, 0, operations, registry)?;
    let shapes: &'a [Shape] = shapes;
    Ok(survivors.into_iter().map(|index| &shapes[index]).collect())
}

/// Run a pipeline with an explicit [`ProcessMode`], returning owned survivors either way.
pub fn process_with_mode(
    shapes: &mut [Shape],
    operations: &[Operation],
    registry: &Registry,
    mode: ProcessMode,
) -> PipelineResult<Vec<Shape>> {
    match mode {
        ProcessMode::Deep => process(shapes, operations, registry),
        ProcessMode::InPlace => {
            process_in_place(shapes, operations, registry).map(|kept| kept.into_iter().cloned().collect())
        }
    }
}

/// Evaluate every operation against one shape; `Ok(false)` means the shape was filtered out.
///
/// `index` is only used to label errors.
pub fn evaluate_shape(
    shape: &mut Shape,
    index: usize,
    operations: &[Operation],
    registry: &Registry,
) -> PipelineResult<bool> {
    for operation in operations {
        let key = operation.key();
        let handler = registry
            .get(key)
            .ok_or_else(|| PipelineError::UnknownOperation {
                key: key.to_string(),
                shape_index: index,
            })?;
        let passed = handler
            .apply(shape, operation)
            .map_err(|e| PipelineError::from_handler(e, key, index))?;
        if !passed {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Evaluate a run of shapes in place and return the indices (offset by `first_index`) of the
/// ones that pass.
pub(crate) fn survivor_indices(
    shapes: &mut [Shape],
    first_index: usize,
    operations: &[Operation],
    registry: &Registry,
) -> PipelineResult<Vec<usize>> {
    let mut survivors = Vec::new();
    for (offset, shape) in shapes.iter_mut().enumerate() {
        let index = first_index + offset;
        if evaluate_shape(shape, index, operations, registry)? {
            survivors.push(index);
        }
    }
    Ok(survivors)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::{process, process_in_place, process_with_mode, ProcessMode};
    use crate::error::PipelineError;
    use crate::processing::registry::{AttributeFilter, Registry};
    use crate::types::{Geometry, Operation, Operator, Shape};

    fn circle_and_square() -> Vec<Shape> {
        vec![Shape::circle(5.0), Shape::square(10.0)]
    }

    #[test]
    fn area_threshold_keeps_only_the_square() {
        let ops = vec![Operation::filter("area", Operator::Gt, 90.0)];
        let out = process(&circle_and_square(), &ops, &Registry::default()).unwrap();
        assert_eq!(out, vec![Shape::square(10.0)]);
    }

    #[test]
    fn survivors_keep_input_order() {
        let shapes = vec![
            Shape::square(10.0),
            Shape::circle(1.0),
            Shape::rectangle(5.0, 5.0),
            Shape::circle(5.0),
        ];
        let ops = vec![Operation::filter("area", Operator::Gt, 20.0)];
        let out = process(&shapes, &ops, &Registry::default()).unwrap();
        assert_eq!(
            out,
            vec![Shape::square(10.0), Shape::rectangle(5.0, 5.0), Shape::circle(5.0)]
        );
    }

    #[test]
    fn empty_operation_list_keeps_everything() {
        let shapes = circle_and_square();
        assert_eq!(process(&shapes, &[], &Registry::default()).unwrap(), shapes);
    }

    #[test]
    fn operation_order_is_significant() {
        // radius 4: area 50 (not > 50); scaled to radius 8: area 201.
        let shapes = vec![Shape::circle(4.0)];
        let registry = Registry::default();
        let area_gt_50 = Operation::filter("area", Operator::Gt, 50.0);

        let scale_first = vec![Operation::scale(2.0), area_gt_50.clone()];
        let filter_first = vec![area_gt_50, Operation::scale(2.0)];

        assert_eq!(
            process(&shapes, &scale_first, &registry).unwrap(),
            vec![Shape::circle(8.0)]
        );
        assert!(process(&shapes, &filter_first, &registry).unwrap().is_empty());
    }

    #[test]
    fn failing_filter_short_circuits_remaining_operations() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let mut registry = Registry::default();
        registry.register_fn("count", move |_shape, _op| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        });

        let ops = vec![
            Operation::filter("area", Operator::Gt, 90.0),
            Operation::filter("count", Operator::Eq, 0.0),
        ];
        let out = process(&circle_and_square(), &ops, &registry).unwrap();
        assert_eq!(out.len(), 1);
        // Only the square reached the second operation.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn deep_mode_leaves_caller_shapes_untouched() {
        let shapes = vec![Shape::circle(5.0).at(0.0, 0.0)];
        let ops = vec![Operation::scale(3.0), Operation::translate(1.0, 1.0)];
        let out = process(&shapes, &ops, &Registry::default()).unwrap();

        assert_eq!(out, vec![Shape::circle(15.0).at(1.0, 1.0)]);
        assert_eq!(shapes, vec![Shape::circle(5.0)]);
    }

    #[test]
    fn in_place_mode_mutates_caller_shapes_even_when_rejected() {
        let mut shapes = vec![Shape::circle(5.0), Shape::circle(1.0)];
        let ops = vec![
            Operation::scale(2.0),
            Operation::filter("area", Operator::Gt, 100.0),
        ];
        let kept = process_in_place(&mut shapes, &ops, &Registry::default()).unwrap();
        assert_eq!(kept, vec![&Shape::circle(10.0)]);
        assert_eq!(shapes, vec![Shape::circle(10.0), Shape::circle(2.0)]);
    }

    #[test]
    fn process_with_mode_honours_mode() {
        let ops = vec![Operation::translate(5.0, 0.0)];
        let registry = Registry::default();

        let mut shapes = vec![Shape::square(1.0)];
        let out = process_with_mode(&mut shapes, &ops, &registry, ProcessMode::default()).unwrap();
        assert_eq!(out[0].x, 5.0);
        assert_eq!(shapes[0].x, 0.0);

        let out = process_with_mode(&mut shapes, &ops, &registry, ProcessMode::InPlace).unwrap();
        assert_eq!(out[0].x, 5.0);
        assert_eq!(shapes[0].x, 5.0);
    }

    #[test]
    fn filters_are_idempotent() {
        let shapes = circle_and_square();
        let ops = vec![
            Operation::filter("circumference", Operator::Lt, 35.0),
            Operation::filter_in("area", 50.0, 150.0),
        ];
        let registry = Registry::default();
        let first = process(&shapes, &ops, &registry).unwrap();
        let second = process(&shapes, &ops, &registry).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, vec![Shape::circle(5.0)]);
    }

    #[test]
    fn in_filter_bounds_are_exclusive() {
        let shapes = vec![Shape::square(10.0)];
        let registry = Registry::default();
        for (low, high) in [(100.0, 200.0), (50.0, 100.0)] {
            let ops = vec![Operation::filter_in("area", low, high)];
            assert!(process(&shapes, &ops, &registry).unwrap().is_empty());
        }
        let ops = vec![Operation::filter_in("area", 99.0, 101.0)];
        assert_eq!(process(&shapes, &ops, &registry).unwrap().len(), 1);
    }

    #[test]
    fn custom_attribute_filter_excludes_red_shapes() {
        let mut registry = Registry::default();
        registry.register("color", AttributeFilter::new("color"));
        let shapes = vec![
            Shape::circle(5.0).with_attribute("color", "red"),
            Shape::square(10.0).with_attribute("color", "blue"),
        ];
        let ops = vec![Operation::filter("color", Operator::Neq, "red")];
        let out = process(&shapes, &ops, &registry).unwrap();
        assert_eq!(out, vec![Shape::square(10.0).with_attribute("color", "blue")]);
    }

    #[test]
    fn unknown_operation_aborts_the_run() {
        let ops = vec![Operation::filter("volume", Operator::Gt, 1.0)];
        let err = process(&circle_and_square(), &ops, &Registry::default()).unwrap_err();
        assert_eq!(
            err,
            PipelineError::UnknownOperation {
                key: "volume".to_string(),
                shape_index: 0
            }
        );
    }

    #[test]
    fn unknown_shape_kind_reports_missing_handler_with_index() {
        let shapes = vec![
            Shape::circle(1.0),
            Shape::new(Geometry::Other {
                kind: "triangle".to_string(),
            }),
        ];
        let ops = vec![Operation::filter("area", Operator::Gt, 0.0)];
        let err = process(&shapes, &ops, &Registry::default()).unwrap_err();
        assert_eq!(
            err,
            PipelineError::MissingHandler {
                key: "area".to_string(),
                kind: "triangle".to_string(),
                shape_index: 1
            }
        );
        assert!(err.to_string().contains("shape #1"));
    }

    #[test]
    fn malformed_in_operand_aborts_the_run() {
        let ops = vec![Operation::filter("area", Operator::In, 10.0)];
        let err = process(&circle_and_square(), &ops, &Registry::default()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MalformedOperation { ref key, shape_index: 0, .. } if key == "area"
        ));
    }

    #[test]
    fn empty_registry_rejects_builtin_keys() {
        let ops = vec![Operation::scale(2.0)];
        let err = process(&circle_and_square(), &ops, &Registry::empty()).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownOperation { .. }));
    }
}

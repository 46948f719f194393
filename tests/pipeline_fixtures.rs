use shape_pipeline::ingestion::json::{operations_from_json_path, shapes_from_json_path};
use shape_pipeline::processing::{process, process_in_place, AttributeFilter, Registry};
use shape_pipeline::types::{Geometry, Operation, Operator, Shape, Value};
use shape_pipeline::PipelineError;

fn fixtures() -> (Vec<Shape>, Vec<Operation>) {
    let shapes = shapes_from_json_path("tests/fixtures/shapes.json").unwrap();
    let operations = operations_from_json_path("tests/fixtures/operations.json").unwrap();
    (shapes, operations)
}

fn expected_output() -> serde_json::Value {
    let text = std::fs::read_to_string("tests/fixtures/output.json").unwrap();
    serde_json::from_str(&text).unwrap()
}

fn ids(shapes: &[Shape]) -> Vec<f64> {
    shapes
        .iter()
        .filter_map(|s| s.attribute("id").and_then(Value::as_number))
        .collect()
}

#[test]
fn fixture_pipeline_matches_expected_output() {
    let (shapes, operations) = fixtures();
    let out = process(&shapes, &operations, &Registry::default()).unwrap();
    assert_eq!(serde_json::to_value(&out).unwrap(), expected_output());
}

#[test]
fn custom_color_filter_drops_red_shapes() {
    let (shapes, mut operations) = fixtures();
    let mut registry = Registry::default();
    registry.register("color", AttributeFilter::new("color"));
    operations.push(Operation::filter("color", Operator::Neq, "red"));

    let out = process(&shapes, &operations, &registry).unwrap();
    assert_eq!(ids(&out), vec![3.0]);
    assert_eq!(out[0].attribute("color"), Some(&Value::from("green")));
}

#[test]
fn custom_filter_registered_as_closure() {
    let (shapes, _) = fixtures();
    let mut registry = Registry::default();
    registry.register_fn("color", |shape, op| {
        let filter = op.as_filter().expect("color is a filter");
        let color = shape.attribute("color").and_then(Value::as_text);
        Ok(match filter.operator {
            Operator::Eq => color == filter.value.as_text(),
            Operator::Neq => color != filter.value.as_text(),
            _ => true,
        })
    });

    let ops = vec![Operation::filter("color", Operator::Eq, "red")];
    let out = process(&shapes, &ops, &registry).unwrap();
    assert_eq!(ids(&out), vec![1.0, 4.0, 6.0]);
}

#[test]
fn removing_a_custom_filter_makes_it_unknown_again() {
    let (shapes, _) = fixtures();
    let mut registry = Registry::default();
    registry.register("color", AttributeFilter::new("color"));
    registry.unregister("color");

    let ops = vec![Operation::filter("color", Operator::Neq, "red")];
    let err = process(&shapes, &ops, &registry).unwrap_err();
    assert_eq!(
        err,
        PipelineError::UnknownOperation {
            key: "color".to_string(),
            shape_index: 0
        }
    );
}

#[test]
fn deep_run_leaves_fixture_shapes_untouched() {
    let (shapes, operations) = fixtures();
    let before = shapes.clone();
    let _ = process(&shapes, &operations, &Registry::default()).unwrap();
    assert_eq!(shapes, before);
}

#[test]
fn in_place_run_mutates_fixture_shapes() {
    let (mut shapes, operations) = fixtures();
    let kept_ids = {
        let kept = process_in_place(&mut shapes, &operations, &Registry::default()).unwrap();
        kept.iter()
            .filter_map(|s| s.attribute("id").and_then(Value::as_number))
            .collect::<Vec<_>>()
    };
    assert_eq!(kept_ids, vec![1.0, 3.0, 6.0]);

    // Survivors were scaled and moved.
    assert_eq!(shapes[0].geometry, Geometry::Circle { radius: 8.0 });
    assert_eq!((shapes[0].x, shapes[0].y), (1.0, -1.0));
    // The square passed the area filter and was scaled before the circumference filter
    // rejected it.
    assert_eq!(shapes[1].geometry, Geometry::Square { width: 15.0 });
    assert_eq!((shapes[1].x, shapes[1].y), (10.0, 10.0));
    // Rejected by the first filter: untouched.
    assert_eq!(shapes[3].geometry, Geometry::Circle { radius: 2.0 });
}

#[test]
fn filter_only_runs_are_repeatable() {
    let (shapes, _) = fixtures();
    let ops = vec![
        Operation::filter("area", Operator::Gt, 20.0),
        Operation::filter("circumference", Operator::Lt, 40.0),
    ];
    let registry = Registry::default();
    let first = process(&shapes, &ops, &registry).unwrap();
    let second = process(&shapes, &ops, &registry).unwrap();
    assert_eq!(first, second);
    assert_eq!(ids(&first), vec![1.0, 3.0, 6.0]);
}

#[test]
fn moving_the_scale_changes_the_outcome() {
    let (shapes, _) = fixtures();
    let registry = Registry::default();
    let scale = Operation::scale(2.0);
    let area = Operation::filter("area", Operator::Gt, 50.0);

    let scale_first = process(&shapes, &[scale.clone(), area.clone()], &registry).unwrap();
    let filter_first = process(&shapes, &[area, scale], &registry).unwrap();

    // Doubling lifts both rectangles over 50; the radius-4 circle lands exactly on 50.
    assert_eq!(ids(&scale_first), vec![1.0, 2.0, 3.0, 6.0]);
    assert_eq!(ids(&filter_first), vec![1.0, 2.0]);
}

#[test]
fn ndjson_operations_match_array_form() {
    let from_ndjson = operations_from_json_path("tests/fixtures/operations.ndjson").unwrap();
    let (_, from_array) = fixtures();
    assert_eq!(from_ndjson, from_array);
}

#[test]
fn unknown_kind_aborts_the_whole_run() {
    let (mut shapes, operations) = fixtures();
    shapes.insert(
        2,
        Shape::new(Geometry::Other {
            kind: "hexagon".to_string(),
        }),
    );
    let err = process(&shapes, &operations, &Registry::default()).unwrap_err();
    assert_eq!(
        err,
        PipelineError::MissingHandler {
            key: "area".to_string(),
            kind: "hexagon".to_string(),
            shape_index: 2
        }
    );
}

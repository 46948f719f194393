use shape_pipeline::ingestion::csv::{shapes_from_csv_path, shapes_from_csv_reader};
use shape_pipeline::ingestion::json::shapes_from_json_path;
use shape_pipeline::types::{Geometry, Shape, Value};

fn reader(input: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes())
}

#[test]
fn csv_fixture_matches_json_fixture() {
    let from_csv = shapes_from_csv_path("tests/fixtures/shapes.csv").unwrap();
    let from_json = shapes_from_json_path("tests/fixtures/shapes.json").unwrap();
    assert_eq!(from_csv.len(), 6);
    assert_eq!(from_csv, from_json);
}

#[test]
fn csv_allows_reordered_and_missing_optional_columns() {
    let mut rdr = reader("color,width,type\nred,4,square\n");
    let shapes = shapes_from_csv_reader(&mut rdr).unwrap();
    assert_eq!(shapes, vec![Shape::square(4.0).with_attribute("color", "red")]);
}

#[test]
fn csv_keeps_unused_size_columns_for_unknown_kinds() {
    let mut rdr = reader("type,width,height,label\ntriangle,3,4,t1\n");
    let shapes = shapes_from_csv_reader(&mut rdr).unwrap();
    assert_eq!(
        shapes[0].geometry,
        Geometry::Other {
            kind: "triangle".to_string()
        }
    );
    assert_eq!(shapes[0].attribute("width"), Some(&Value::Number(3.0)));
    assert_eq!(shapes[0].attribute("label"), Some(&Value::from("t1")));
}

#[test]
fn csv_errors_on_missing_type_column() {
    let mut rdr = reader("radius,x\n1,2\n");
    let msg = shapes_from_csv_reader(&mut rdr).unwrap_err().to_string();
    assert!(msg.contains("schema mismatch"));
    assert!(msg.contains("missing required column 'type'"));
}

#[test]
fn csv_errors_on_missing_size_value() {
    let mut rdr = reader("type,width,height\nrectangle,3,\n");
    let msg = shapes_from_csv_reader(&mut rdr).unwrap_err().to_string();
    assert!(msg.contains("row 2 missing required value 'height'"));
}

#[test]
fn csv_errors_on_non_numeric_size() {
    let mut rdr = reader("type,radius\ncircle,big\n");
    let msg = shapes_from_csv_reader(&mut rdr).unwrap_err().to_string();
    assert!(msg.contains("failed to parse value"));
    assert!(msg.contains("field 'radius'"));
}

//! Relational checks shared by the numeric filters.

use crate::error::HandlerError;
use crate::types::{Operator, Value};

/// Check a computed `value` against a filter's `operator` and `operand`.
///
/// - `gt` / `lt`: strict comparison against a numeric operand.
/// - `eq` / `neq`: exact equality (no epsilon).
/// - `in`: `low < value < high` against a `[low, high]` operand; both bounds exclusive. An
///   inverted range is not validated and simply never matches.
/// - Unknown operators return `Ok(false)`.
///
/// Returns [`HandlerError::Malformed`] when the operand doesn't fit the operator.
pub fn compare(operator: &Operator, operand: &Value, value: f64) -> Result<bool, HandlerError> {
    match operator {
        Operator::Gt => Ok(value > scalar(operator, operand)?),
        Operator::Lt => Ok(value < scalar(operator, operand)?),
        Operator::Eq => Ok(value == scalar(operator, operand)?),
        Operator::Neq => Ok(value != scalar(operator, operand)?),
        Operator::In => {
            let (low, high) = range(operand)?;
            Ok(low < value && value < high)
        }
        Operator::Other(_) => Ok(false),
    }
}

fn scalar(operator: &Operator, operand: &Value) -> Result<f64, HandlerError> {
    operand.as_number().ok_or_else(|| {
        HandlerError::malformed(format!(
            "operator '{}' expects a numeric value, got {operand:?}",
            operator.as_str()
        ))
    })
}

fn range(operand: &Value) -> Result<(f64, f64), HandlerError> {
    match operand {
        Value::List(items) => match items.as_slice() {
            [Value::Number(low), Value::Number(high)] => Ok((*low, *high)),
            _ => Err(HandlerError::malformed(format!(
                "operator 'in' expects [low, high] numbers, got {} element(s)",
                items.len()
            ))),
        },
        other => Err(HandlerError::malformed(format!(
            "operator 'in' expects a [low, high] list, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::compare;
    use crate::error::HandlerError;
    use crate::types::{Operator, Value};

    fn pair(low: f64, high: f64) -> Value {
        Value::List(vec![Value::Number(low), Value::Number(high)])
    }

    #[test]
    fn gt_and_lt_are_strict() {
        let ten = Value::Number(10.0);
        assert!(compare(&Operator::Gt, &ten, 11.0).unwrap());
        assert!(!compare(&Operator::Gt, &ten, 10.0).unwrap());
        assert!(compare(&Operator::Lt, &ten, 9.0).unwrap());
        assert!(!compare(&Operator::Lt, &ten, 10.0).unwrap());
    }

    #[test]
    fn eq_and_neq_are_exact() {
        let ten = Value::Number(10.0);
        assert!(compare(&Operator::Eq, &ten, 10.0).unwrap());
        assert!(!compare(&Operator::Eq, &ten, 10.000001).unwrap());
        assert!(compare(&Operator::Neq, &ten, 10.000001).unwrap());
        assert!(!compare(&Operator::Neq, &ten, 10.0).unwrap());
    }

    #[test]
    fn in_excludes_both_bounds() {
        let r = pair(10.0, 20.0);
        assert!(compare(&Operator::In, &r, 15.0).unwrap());
        assert!(!compare(&Operator::In, &r, 10.0).unwrap());
        assert!(!compare(&Operator::In, &r, 20.0).unwrap());
        assert!(!compare(&Operator::In, &r, 25.0).unwrap());
    }

    #[test]
    fn inverted_range_never_matches() {
        let r = pair(20.0, 10.0);
        assert!(!compare(&Operator::In, &r, 15.0).unwrap());
    }

    #[test]
    fn unknown_operator_fails_closed() {
        let op = Operator::Other("gte".to_string());
        assert!(!compare(&op, &Value::Number(1.0), 100.0).unwrap());
    }

    #[test]
    fn malformed_operands_are_rejected() {
        let three = Value::List(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]);
        assert!(matches!(
            compare(&Operator::In, &three, 1.5),
            Err(HandlerError::Malformed { .. })
        ));
        assert!(matches!(
            compare(&Operator::In, &Value::Number(5.0), 1.5),
            Err(HandlerError::Malformed { .. })
        ));
        assert!(matches!(
            compare(&Operator::Gt, &Value::from("big"), 1.5),
            Err(HandlerError::Malformed { .. })
        ));
    }
}

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn value_display() {
    assert_eq!(Value::Boolean(true).to_string(), "true");
    assert_eq!(Value::Integer(-7).to_string(), "-7");
    assert_eq!(Value::Null.to_string(), "NULL");
    assert_eq!(Value::String("day".into()).to_string(), "'day'");
    assert_eq!(Value::Unsigned(42).to_string(), "42");
}

#[test]
fn value_from_scalar() {
    assert_eq!(Value::from("day"), Value::String("day".into()));
    assert_eq!(Value::from(false), Value::Boolean(false));
    assert_eq!(Value::from(-1_i64), Value::Integer(-1));
    assert_eq!(Value::from(1_u64), Value::Unsigned(1));
}

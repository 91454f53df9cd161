//! Tests for type conversions and data types

use sparkplug_flows::{DataType, MetricValue, ScalarValue};

#[test]
fn test_datatype_wire_constants() {
    assert_eq!(u32::from(DataType::Double), 10);
    assert_eq!(u32::from(DataType::Boolean), 11);
    assert_eq!(u32::from(DataType::String), 12);
    assert_eq!(u32::from(DataType::Int32), 3);
    assert_eq!(u32::from(DataType::Int64), 4);
    assert_eq!(u32::from(DataType::Float), 9);
}

#[test]
fn test_datatype_from_u32() {
    for dt in 1..=14u32 {
        assert_eq!(u32::from(DataType::from(dt)), dt);
    }
    assert_eq!(DataType::from(0), DataType::Unknown);
    assert_eq!(DataType::from(19), DataType::Unknown);
}

#[test]
fn test_datatype_serializes_as_number() {
    assert_eq!(serde_json::to_string(&DataType::Boolean).unwrap(), "11");
    let dt: DataType = serde_json::from_str("12").unwrap();
    assert_eq!(dt, DataType::String);
}

#[test]
fn test_scalar_value_datatypes() {
    assert_eq!(ScalarValue::Double(1.0).datatype(), DataType::Double);
    assert_eq!(ScalarValue::Boolean(false).datatype(), DataType::Boolean);
    assert_eq!(ScalarValue::String(String::new()).datatype(), DataType::String);
}

#[test]
fn test_scalar_value_json_is_untagged() {
    assert_eq!(serde_json::to_string(&ScalarValue::Double(23.5)).unwrap(), "23.5");
    assert_eq!(serde_json::to_string(&ScalarValue::Boolean(true)).unwrap(), "true");

    let v: ScalarValue = serde_json::from_str("42").unwrap();
    assert_eq!(v, ScalarValue::Double(42.0));
    let v: ScalarValue = serde_json::from_str("\"ok\"").unwrap();
    assert_eq!(v, ScalarValue::String("ok".to_string()));
}

#[test]
fn test_scalar_value_coerce() {
    assert_eq!(
        ScalarValue::Double(1.5).coerce(DataType::Double),
        Some(ScalarValue::Double(1.5))
    );
    assert_eq!(ScalarValue::Double(1.5).coerce(DataType::String), None);
}

#[test]
fn test_metric_value_equality() {
    assert_eq!(MetricValue::Int32(42), MetricValue::Int32(42));
    assert_ne!(MetricValue::Int32(42), MetricValue::Int32(43));

    assert_eq!(
        MetricValue::String("test".to_string()),
        MetricValue::String("test".to_string())
    );

    assert_eq!(MetricValue::Null, MetricValue::Null);
    assert!(MetricValue::Null.is_null());
}

#[test]
fn test_metric_value_from_scalar() {
    assert_eq!(MetricValue::from(ScalarValue::Double(2.5)), MetricValue::Double(2.5));
    assert_eq!(MetricValue::from(ScalarValue::Boolean(true)), MetricValue::Boolean(true));
    assert_eq!(
        MetricValue::from(ScalarValue::String("x".to_string())).datatype(),
        DataType::String
    );
}

#[test]
fn test_datatype_copy() {
    let dt1 = DataType::Double;
    let dt2 = dt1; // Should copy, not move
    assert_eq!(dt1, dt2);
    assert_eq!(dt1, DataType::Double); // dt1 still usable
}

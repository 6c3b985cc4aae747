use super::*;

fn department_record() -> Value {
    Value::Record(vec![
        ("id".to_string(), Value::Int(7)),
        ("name".to_string(), Value::Text("Engineering".to_string())),
    ])
}

#[test]
fn record_get_finds_attributes() {
    let record = department_record();
    assert_eq!(record.record_get("id"), Some(&Value::Int(7)));
    assert_eq!(record.record_get("missing"), None);
}

#[test]
fn walk_traverses_nested_records() {
    let user = Value::Record(vec![
        ("name".to_string(), Value::Text("Alice".to_string())),
        ("department".to_string(), department_record()),
    ]);

    assert_eq!(
        user.walk(["department", "name"]),
        Some(Value::Text("Engineering".to_string()))
    );
}

#[test]
fn walk_propagates_null_mid_path() {
    let user = Value::Record(vec![("department".to_string(), Value::Null)]);
    assert_eq!(user.walk(["department", "name"]), Some(Value::Null));
}

#[test]
fn walk_rejects_scalar_mid_path() {
    let user = Value::Record(vec![("name".to_string(), Value::Text("A".to_string()))]);
    assert_eq!(user.walk(["name", "length"]), None);
}

#[test]
fn option_and_vec_conversions() {
    assert_eq!(None::<i64>.to_value(), Value::Null);
    assert_eq!(Some(3i32).to_value(), Value::Int(3));
    assert_eq!(
        vec!["a", "b"].to_value(),
        Value::List(vec![
            Value::Text("a".to_string()),
            Value::Text("b".to_string())
        ])
    );
}

#[test]
fn values_serialize_for_diagnostics() {
    let value = Value::Record(vec![
        ("name".to_string(), Value::Text("Alice".to_string())),
        ("age".to_string(), Value::Int(30)),
    ]);
    let json = serde_json::to_string(&value).unwrap();
    assert!(json.contains("Alice"));
    assert!(json.contains("30"));
}

#[test]
fn float_total_order_is_deterministic() {
    let mut values = [
        Value::Float(2.5.into()),
        Value::Float(f64::NAN.into()),
        Value::Float(1.0.into()),
    ];
    values.sort();
    assert_eq!(values[0], Value::Float(1.0.into()));
    assert_eq!(values[1], Value::Float(2.5.into()));
}

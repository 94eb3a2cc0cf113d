use jsonbind::{json, record, Map, Registry, Value};

#[test]
fn test_json_macro_null() {
    assert_eq!(json!(null), Value::Null);
}

#[test]
fn test_json_macro_booleans() {
    assert_eq!(json!(true), Value::Bool(true));
    assert_eq!(json!(false), Value::Bool(false));
}

#[test]
fn test_json_macro_numbers() {
    assert_eq!(json!(42), Value::Int(42));
    assert_eq!(json!(3.5), Value::Float(3.5));
    assert_eq!(json!(-123), Value::Int(-123));
}

#[test]
fn test_json_macro_strings() {
    assert_eq!(json!("hello world"), Value::from("hello world"));
    assert_eq!(json!(""), Value::String(String::new()));
}

#[test]
fn test_json_macro_arrays() {
    assert_eq!(json!([]), Value::Array(vec![]));
    assert_eq!(
        json!([1, "two", null, [true]]),
        Value::Array(vec![
            Value::Int(1),
            Value::from("two"),
            Value::Null,
            Value::Array(vec![Value::Bool(true)]),
        ])
    );
}

#[test]
fn test_json_macro_objects() {
    assert_eq!(json!({}), Value::Object(Map::new()));

    let value = json!({
        "name": "Alice",
        "nested": { "zeta": 1, "alpha": [2.5] },
    });
    assert_eq!(value.keys(), vec!["name", "nested"]);
    assert_eq!(value.member("nested").keys(), vec!["zeta", "alpha"]);
    assert_eq!(
        value.to_string(),
        r#"{"name":"Alice","nested":{"zeta":1,"alpha":[2.5]}}"#
    );
}

#[test]
fn test_json_macro_interpolates_expressions() {
    let port = 8080u16;
    let tags = vec!["a", "b"];
    let missing: Option<i32> = None;
    let value = json!({ "port": port, "tags": tags, "missing": missing });
    assert_eq!(value.to_string(), r#"{"port":8080,"tags":["a","b"],"missing":null}"#);
}

#[test]
fn test_json_macro_unrepresentable_becomes_null() {
    let too_big = u64::MAX;
    assert_eq!(json!(too_big), Value::Null);
}

#[derive(Debug, Default, PartialEq)]
struct Account {
    id: i64,
    display_name: String,
    roles: Vec<String>,
    manager: Option<Box<Account>>,
}

record!(Account {
    id,
    display_name => "displayName",
    roles,
    manager,
});

#[test]
fn test_record_macro_round_trip() {
    let registry = Registry::new();
    let account = Account {
        id: 7,
        display_name: "Dana".to_string(),
        roles: vec!["ops".to_string()],
        manager: Some(Box::new(Account {
            id: 1,
            display_name: "Lee".to_string(),
            ..Account::default()
        })),
    };

    let text = registry.marshal_to_string(&account).unwrap();
    assert_eq!(
        text,
        r#"{"id":7,"displayName":"Dana","roles":["ops"],"manager":{"id":1,"displayName":"Lee","roles":[],"manager":null}}"#
    );
    assert_eq!(registry.unmarshal_str::<Account>(&text).unwrap(), account);
}

#[test]
fn test_record_macro_missing_members_keep_defaults() {
    let registry = Registry::new();
    let account: Account = registry.unmarshal_str(r#"{"displayName":"Sam"}"#).unwrap();
    assert_eq!(
        account,
        Account {
            display_name: "Sam".to_string(),
            ..Account::default()
        }
    );
}

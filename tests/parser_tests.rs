use jsonbind::{parse, parse_all, parse_with_options, Error, Map, ParseOptions, Parser, Value};

#[test]
fn test_scalars() {
    assert_eq!(parse("null").unwrap(), Value::Null);
    assert_eq!(parse("true").unwrap(), Value::Bool(true));
    assert_eq!(parse("false").unwrap(), Value::Bool(false));
    assert_eq!(parse(r#""hi""#).unwrap(), Value::from("hi"));
    assert_eq!(parse("  \n\t 7").unwrap(), Value::Int(7));
}

#[test]
fn test_number_kinds() {
    assert_eq!(parse("42").unwrap(), Value::Int(42));
    assert_eq!(parse("-0").unwrap(), Value::Int(0));
    assert_eq!(parse("42.0").unwrap(), Value::Float(42.0));
    assert_eq!(parse("4.2e1").unwrap(), Value::Float(42.0));
    assert_eq!(parse("1E-2").unwrap(), Value::Float(0.01));
    assert_eq!(parse("-2.5e+3").unwrap(), Value::Float(-2500.0));
    assert!(parse("42").unwrap().is_int());
    assert!(parse("42.0").unwrap().is_float());
}

#[test]
fn test_integer_limits() {
    assert_eq!(parse("9223372036854775807").unwrap(), Value::Int(i64::MAX));
    assert_eq!(parse("-9223372036854775808").unwrap(), Value::Int(i64::MIN));
    match parse("9223372036854775808") {
        Err(Error::InvalidNumber { offset, literal }) => {
            assert_eq!(offset, 0);
            assert_eq!(literal, "9223372036854775808");
        }
        other => panic!("expected InvalidNumber, got {:?}", other),
    }
    assert!(matches!(parse("1e999"), Err(Error::InvalidNumber { .. })));
}

#[test]
fn test_malformed_numbers() {
    for input in ["-", "1.", ".5", "1e", "1e+", "+1"] {
        let err = parse(input).unwrap_err();
        assert!(err.is_syntax(), "{} gave {:?}", input, err);
    }
}

#[test]
fn test_surrogate_pair() {
    let value = parse(r#""\ud83e\udd20""#).unwrap();
    assert_eq!(value.as_string(), "\u{1F920}");
    assert_eq!(value.as_string().chars().count(), 1);
    assert_eq!(value.to_string(), r#""\ud83e\udd20""#);
}

#[test]
fn test_lone_surrogates() {
    assert!(matches!(
        parse(r#""\udd20""#),
        Err(Error::LoneSurrogate { offset: 1, unit: 0xDD20 })
    ));
    assert!(matches!(
        parse(r#""\ud83e""#),
        Err(Error::LoneSurrogate { unit: 0xD83E, .. })
    ));
    assert!(matches!(
        parse(r#""\ud83ex""#),
        Err(Error::LoneSurrogate { .. })
    ));
    assert!(matches!(
        parse(r#""\ud83eA""#),
        Err(Error::LoneSurrogate { .. })
    ));
}

#[test]
fn test_escapes() {
    let value = parse(r#""a\"b\\c\/d\b\f\n\r\té""#).unwrap();
    assert_eq!(value.as_string(), "a\"b\\c/d\u{8}\u{c}\n\r\t\u{e9}");
    assert!(matches!(parse(r#""\x""#), Err(Error::InvalidEscape { .. })));
    assert!(matches!(parse(r#""\u12G4""#), Err(Error::InvalidEscape { .. })));
}

#[test]
fn test_rendering_escapes() {
    let value = Value::from("quote\" back\\ nl\n tab\t bell\u{7} del\u{7f} slash/ é");
    assert_eq!(
        value.to_string(),
        r#""quote\" back\\ nl\n tab\t bell\u0007 del\u007f slash/ \u00e9""#
    );
    assert_eq!(parse(&value.to_string()).unwrap(), value);
}

#[test]
fn test_object_keeps_order_and_last_duplicate() {
    let value = parse(r#"{"b": 1, "a": 2, "b": 3}"#).unwrap();
    assert_eq!(value.keys(), vec!["b", "a"]);
    assert_eq!(value.member("b"), &Value::Int(3));
    assert_eq!(value.to_string(), r#"{"b":3,"a":2}"#);
}

#[test]
fn test_nested_structures() {
    let value = parse(r#" { "list" : [ 1 , [ ] , { } , "x" ] , "obj" : { "k" : null } } "#).unwrap();
    assert_eq!(value.member("list").len(), 4);
    assert_eq!(value.member("list").element(1), &Value::Array(vec![]));
    assert_eq!(value.member("list").element(2), &Value::Object(Map::new()));
    assert!(value.member("obj").member("k").is_null());
    assert_eq!(value.to_string(), r#"{"list":[1,[],{},"x"],"obj":{"k":null}}"#);
}

#[test]
fn test_syntax_error_reports_position() {
    match parse("[1, 2, ?]") {
        Err(Error::Syntax {
            offset,
            found,
            context,
        }) => {
            assert_eq!(offset, 7);
            assert_eq!(found, '?');
            assert_eq!(context, "[1, 2, ");
        }
        other => panic!("expected Syntax, got {:?}", other),
    }
}

#[test]
fn test_trailing_commas_rejected() {
    assert!(matches!(parse("[1,]"), Err(Error::Syntax { found: ']', .. })));
    assert!(matches!(parse(r#"{"a":1,}"#), Err(Error::Syntax { found: '}', .. })));
}

#[test]
fn test_unexpected_eof() {
    for input in ["", "[", "[1", r#"{"a""#, r#"{"a":"#, r#""open"#, "tru"] {
        assert!(
            matches!(parse(input), Err(Error::UnexpectedEof { .. })),
            "{:?}",
            input
        );
    }
}

#[test]
fn test_literal_typos() {
    assert!(matches!(parse("nul1"), Err(Error::Syntax { found: '1', .. })));
    assert!(matches!(parse("True"), Err(Error::Syntax { found: 'T', .. })));
}

#[test]
fn test_single_value_per_call() {
    let mut parser = Parser::new(r#"{"a":1} [2] "three""#.chars());
    assert_eq!(parser.parse().unwrap().to_string(), r#"{"a":1}"#);
    assert_eq!(parser.parse().unwrap().to_string(), "[2]");
    assert_eq!(parser.parse().unwrap(), Value::from("three"));
    assert!(matches!(parser.parse(), Err(Error::UnexpectedEof { .. })));
}

#[test]
fn test_parse_all() {
    let values = parse_all("1 2.5\n\"x\" [true] {}  ").unwrap();
    assert_eq!(
        values,
        vec![
            Value::Int(1),
            Value::Float(2.5),
            Value::from("x"),
            Value::Array(vec![Value::Bool(true)]),
            Value::Object(Map::new()),
        ]
    );
    assert_eq!(parse_all("   ").unwrap(), Vec::<Value>::new());
    assert!(parse_all("1 ]").is_err());
}

#[test]
fn test_depth_limit() {
    let deep = format!("{}{}", "[".repeat(600), "]".repeat(600));
    assert!(matches!(parse(&deep), Err(Error::DepthLimit { limit: 512, .. })));

    let options = ParseOptions::new().with_max_depth(1000);
    assert!(parse_with_options(&deep, options).is_ok());
}

#[test]
fn test_strict_control_characters() {
    let input = "\"a\u{1}b\"";
    assert_eq!(parse(input).unwrap().as_string(), "a\u{1}b");

    let strict = ParseOptions::new().with_strict_control(true);
    assert!(matches!(
        parse_with_options(input, strict),
        Err(Error::Syntax { found: '\u{1}', .. })
    ));
}

#[test]
fn test_offsets_count_characters() {
    match parse("[\"é\", x]") {
        Err(Error::Syntax { offset, .. }) => assert_eq!(offset, 6),
        other => panic!("expected Syntax, got {:?}", other),
    }
}

#[test]
fn test_canonical_output_matches_serde_json() {
    let inputs = [
        r#"{"name":"x","list":[1,2.5,null,true],"nested":{"k":"v\n"}}"#,
        r#"[-1,0,1e-7,123456.789]"#,
        r#""tab\tquote\"""#,
    ];
    for input in inputs {
        let ours = parse(input).unwrap();
        let theirs: serde_json::Value = serde_json::from_str(input).unwrap();
        let reparsed: serde_json::Value = serde_json::from_str(&ours.to_string()).unwrap();
        assert_eq!(reparsed, theirs, "{}", input);
    }
}

#[test]
fn test_float_rendering_reparses_as_float() {
    for f in [1.0, -0.5, 1e21, 1.5e-9, 123456789.0] {
        let text = Value::Float(f).to_string();
        assert_eq!(parse(&text).unwrap(), Value::Float(f), "{}", text);
    }
    assert_eq!(Value::Float(f64::NAN).to_string(), "null");
}

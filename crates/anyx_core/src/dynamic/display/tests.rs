use crate::anyx_slice;
use crate::dynamic::Value;

#[test]
fn plain_form_is_compact_json() {
	assert_eq!(Value::Int(3).to_string(), "3");
	assert_eq!(Value::Nil.to_string(), "null");
	assert_eq!(Value::from("a\"b").to_string(), r#""a\"b""#);
	assert_eq!(anyx_slice![1_i64, "x"].to_string(), r#"[1,"x"]"#);
	assert_eq!(Value::from_json(b"1.250").expect("number").to_string(), "1.250");
}

#[test]
fn alternate_form_names_the_kind() {
	assert_eq!(format!("{:#}", Value::from("a")), r#"Any{string: "a"}"#);
	assert_eq!(format!("{:#}", Value::Nil), "Any{nil: null}");
	assert_eq!(format!("{:#}", Value::of(vec![1_u8])), "Any{slice: [1]}");
}

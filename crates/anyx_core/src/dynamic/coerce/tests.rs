use chrono::{DateTime, Utc};
use proptest::prelude::*;

use crate::dynamic::{Value, parse_bool};

fn number(text: &str) -> Value {
	let value = Value::from_json(text.as_bytes()).expect("numeric json");
	assert_eq!(value.kind_name(), "number", "{text} decodes lazily");
	value
}

#[test]
fn primitives_convert_across_numeric_types() {
	let value = Value::Float(3.9);
	assert_eq!(value.int(), 3);
	assert_eq!(value.uint(), 3);
	assert_eq!(value.float(), 3.9);
	assert!(value.bool());

	assert_eq!(Value::Bool(true).int(), 1);
	assert_eq!(Value::Bool(false).float(), 0.0);
	assert_eq!(Value::Uint(7).int(), 7);
	assert_eq!(Value::Int(-1).uint(), u64::MAX);
	assert!(!Value::Int(0).bool());
	assert!(Value::Uint(2).bool());
}

#[test]
fn text_parses_strictly() {
	assert_eq!(Value::from("12").int(), 12);
	assert_eq!(Value::from("+12").int(), 12);
	assert_eq!(Value::from("12.5").int(), 0, "integer accessor does not truncate text");
	assert_eq!(Value::from("12.5").float(), 12.5);
	assert_eq!(Value::from("abc").float(), 0.0);
	assert_eq!(Value::from("-3").uint(), 0);
	assert!(Value::from("True").bool());
	assert!(!Value::from("yes").bool());
}

#[test]
fn neutral_values_for_non_scalars() {
	for value in [Value::Nil, Value::Seq(vec![Value::Int(1)]), Value::Time(DateTime::<Utc>::default())] {
		assert_eq!(value.int(), 0);
		assert_eq!(value.uint(), 0);
		assert_eq!(value.float(), 0.0);
		assert!(!value.bool());
		assert_eq!(value.string(), "");
		assert!(!value.is_number());
	}
}

#[test]
fn string_is_text_only() {
	assert_eq!(Value::from("hello").string(), "hello");
	assert_eq!(Value::from("hello").as_str(), Some("hello"));
	assert_eq!(Value::Int(5).string(), "");
	assert_eq!(number("5").string(), "");
	assert_eq!(Value::of(vec!["a".to_owned()]).get(0_usize).expect("element").string(), "a");
}

#[test]
fn number_detection() {
	assert!(Value::Int(1).is_number());
	assert!(Value::Float(0.0).is_number());
	assert!(Value::from("42abc").is_number(), "leading digit is enough");
	assert!(Value::from("-x").is_number());
	assert!(!Value::from("x42").is_number());
	assert!(!Value::from("").is_number());
	assert!(!Value::Bool(true).is_number());
	assert!(number("1e3").is_number());
}

#[test]
fn decoded_numbers_parse_on_demand() {
	let value = number("1.5e3");
	assert_eq!(value.int(), 0, "integer accessors do not truncate floats");
	assert_eq!(value.uint(), 0);
	assert_eq!(value.float(), 1500.0);
	assert!(value.bool());

	let big = number("18446744073709551615");
	assert_eq!(big.uint(), u64::MAX);
	assert_eq!(big.int(), 0, "out of range for i64");

	let negative = number("-5");
	assert_eq!(negative.int(), -5);
	assert_eq!(negative.uint(), 0, "negative text has no unsigned reading");
	assert_eq!(number("1.5").int(), 0);
	assert!(!number("0").bool());
	assert!(number("-0.1").bool());
}

#[test]
fn decoded_numbers_match_text_readings() {
	for text in ["-5", "1.5", "18446744073709551615", "9223372036854775808", "1e3", "0"] {
		let decoded = number(text);
		let literal = Value::from(text);
		assert_eq!(decoded.int(), literal.int(), "int of {text}");
		assert_eq!(decoded.uint(), literal.uint(), "uint of {text}");
		assert_eq!(decoded.float(), literal.float(), "float of {text}");
		assert!(matches!(&decoded, Value::Number(raw) if raw.as_str() == text), "{text} is left unparsed");
	}
}

#[test]
fn bool_grammar() {
	for text in ["1", "t", "T", "TRUE", "true", "True"] {
		assert_eq!(parse_bool(text), Some(true), "{text}");
	}
	for text in ["0", "f", "F", "FALSE", "false", "False"] {
		assert_eq!(parse_bool(text), Some(false), "{text}");
	}
	assert_eq!(parse_bool("tRUE"), None);
	assert_eq!(parse_bool(""), None);
}

proptest! {
	#[test]
	fn decoded_integers_parse_like_their_text(n in any::<i64>()) {
		let text = n.to_string();
		let decoded = number(&text);

		prop_assert_eq!(decoded.int(), n);
		prop_assert_eq!(decoded.uint(), text.parse::<u64>().unwrap_or_default());
		prop_assert_eq!(decoded.float(), n as f64);
		prop_assert_eq!(decoded.bool(), n != 0);
		prop_assert!(decoded.is_number());
	}

	#[test]
	fn decoded_unsigned_readings_round_trip(n in any::<u64>()) {
		let text = n.to_string();
		let decoded = number(&text);

		prop_assert_eq!(decoded.uint(), n);
		prop_assert_eq!(decoded.int(), i64::try_from(n).unwrap_or_default());
		prop_assert_eq!(decoded.float(), n as f64);
	}
}

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use crate::dynamic::{DecodeOptions, Error, Value};
use crate::{anyx_map, anyx_slice};

#[derive(Debug, Clone, Default)]
struct Meta {
	label: String,
	weight: f64,
}

crate::reflect_record!(Meta { label, weight });

#[derive(Debug, Clone, Default)]
struct Item {
	id: i64,
	meta: Meta,
	secret: String,
	tags: Vec<String>,
	parent: Option<Box<Item>>,
}

crate::reflect_record!(Item {
	id,
	#[embed]
	meta: Meta,
	#[skip]
	secret,
	tags,
	parent,
});

fn nested_arrays(depth: usize) -> Vec<u8> {
	format!("{}{}", "[".repeat(depth), "]".repeat(depth)).into_bytes()
}

mod decode {
	use super::*;

	#[test]
	fn empty_input_is_a_no_op() {
		let mut value = Value::Int(3);
		value.decode(b"").expect("empty buffer");
		assert_eq!(value, Value::Int(3));
	}

	#[test]
	fn empty_collections_short_circuit() {
		assert_eq!(Value::from_json(b"[]").expect("array"), Value::Seq(Vec::new()));
		assert_eq!(Value::from_json(b"{}").expect("object"), Value::Map(Default::default()));
		assert_eq!(Value::from_json(b" [ ] ").expect("spaced array"), Value::Seq(Vec::new()));
	}

	#[test]
	fn classifies_by_first_byte() {
		assert_eq!(Value::from_json(b"\"a\\nb\"").expect("string"), Value::from("a\nb"));
		assert_eq!(Value::from_json(b"true").expect("true"), Value::Bool(true));
		assert_eq!(Value::from_json(b"false").expect("false"), Value::Bool(false));
		assert!(Value::from_json(b"null").expect("null").is_nil());
		assert_eq!(Value::from_json(b"-0.50").expect("number").kind_name(), "number");
	}

	#[test]
	fn nested_numbers_stay_deferred() {
		let value = Value::from_json(br#"{"a": [1, {"b": 2.50}], "c": "x"}"#).expect("object");
		let b = value.get_in(["a".into(), crate::dynamic::Key::Index(1), "b".into()]).expect("nested");
		assert_eq!(b.kind_name(), "number");
		assert_eq!(b.float(), 2.5);
		assert_eq!(value.get("c").expect("c").string(), "x");
	}

	#[test]
	fn failures_reset_to_nil() {
		let mut value = Value::Int(1);
		let err = value.decode(br#"{"a":"#).expect_err("truncated");
		assert!(matches!(err, Error::Decode(_)), "got {err:?}");
		assert!(!err.is_precondition());
		assert!(value.is_nil());

		assert!(matches!(Value::from_json(b"tru"), Err(Error::Decode(_))));
		assert!(matches!(Value::from_json(b"[1,]"), Err(Error::Decode(_))));
	}

	#[test]
	fn depth_limit_is_configurable() {
		let mut value = Value::Nil;
		value.decode_with(&nested_arrays(8), &DecodeOptions::shallow()).expect("at the limit");

		let err = value.decode_with(&nested_arrays(9), &DecodeOptions::shallow()).expect_err("past the limit");
		assert!(matches!(err, Error::DecodeDepthExceeded { max_depth: 8 }), "got {err:?}");
		assert!(value.is_nil());

		Value::from_json(&nested_arrays(9)).expect("default depth");
	}

	#[test]
	fn serde_deserialize_matches_decode() {
		let value: Value = serde_json::from_str(r#"{"n": 12.0, "s": "t"}"#).expect("deserialize");
		assert_eq!(value.get("n").expect("n").kind_name(), "number");
		assert_eq!(value.encode_string().expect("encode").len(), r#"{"n":12.0,"s":"t"}"#.len());
	}
}

mod encode {
	use super::*;

	#[test]
	fn numbers_are_written_verbatim() {
		for text in ["1.50", "-0", "1e400", "18446744073709551616", "0.1000000000000000000001"] {
			let value = Value::from_json(text.as_bytes()).expect("number");
			assert_eq!(value.encode_string().expect("encode"), text);
		}
	}

	#[test]
	fn primitives_and_times() {
		let at = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).single().expect("valid instant");
		assert_eq!(Value::Time(at).encode_string().expect("time"), r#""2023-11-14T22:13:20Z""#);
		assert_eq!(Value::Nil.encode_string().expect("nil"), "null");
		assert_eq!(Value::Uint(u64::MAX).encode_string().expect("uint"), "18446744073709551615");
		assert_eq!(anyx_slice![1_i64, "a", true, Value::Nil].encode_string().expect("seq"), r#"[1,"a",true,null]"#);
		assert_eq!(anyx_map! { "k" => 1.5_f64 }.encode().expect("map"), br#"{"k":1.5}"#.to_vec());
	}

	#[test]
	fn records_flatten_embedded_fields() {
		let item = Item {
			id: 1,
			meta: Meta {
				label: "x".to_owned(),
				weight: 0.5,
			},
			secret: "hidden".to_owned(),
			tags: vec!["a".to_owned()],
			parent: None,
		};
		assert_eq!(item.secret, "hidden");
		assert_eq!(
			Value::of(item).encode_string().expect("record"),
			r#"{"id":1,"label":"x","weight":0.5,"tags":["a"],"parent":null}"#
		);
	}

	#[test]
	fn reflected_pointers_and_arrays() {
		assert_eq!(Value::of(vec![None, Some(1_i64)]).encode_string().expect("options"), "[null,1]");
		assert_eq!(Value::of([[1_u8, 2], [3, 4]]).encode_string().expect("arrays"), "[[1,2],[3,4]]");
		assert_eq!(Value::slice_of(vec![1_i64, 2]).encode_string().expect("adapter"), "[1,2]");
		assert_eq!(Value::map_of(std::collections::HashMap::from([(7_u8, "x".to_owned())])).encode_string().expect("adapter map"), r#"{"7":"x"}"#);
	}
}

fn leaf() -> impl Strategy<Value = Value> {
	prop_oneof![
		Just(Value::Nil),
		any::<bool>().prop_map(Value::Bool),
		any::<i64>().prop_map(Value::Int),
		(-1.0e12_f64..1.0e12).prop_map(Value::Float),
		any::<String>().prop_map(Value::String),
	]
}

fn tree() -> impl Strategy<Value = Value> {
	leaf().prop_recursive(4, 48, 6, |inner| {
		prop_oneof![
			prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Seq),
			prop::collection::hash_map("[a-z]{1,6}", inner, 0..6).prop_map(Value::Map),
		]
	})
}

/// Compare every leaf of `decoded` against `original` through the coercions.
///
/// Float leaves come back as numeric text, which has no integer reading, so
/// their integer accessors are not compared.
fn leaves_agree(original: &Value, decoded: &Value) -> Result<(), TestCaseError> {
	match original {
		Value::Seq(items) => {
			prop_assert_eq!(decoded.len(), Some(items.len()));
			for (idx, item) in items.iter().enumerate() {
				let child = decoded.get(idx).map_err(|err| TestCaseError::fail(err.to_string()))?;
				leaves_agree(item, &child)?;
			}
		}
		Value::Map(entries) => {
			prop_assert_eq!(decoded.len(), Some(entries.len()));
			for (name, item) in entries {
				prop_assert!(decoded.has(name.as_str()), "missing key {}", name);
				let child = decoded.get(name.as_str()).map_err(|err| TestCaseError::fail(err.to_string()))?;
				leaves_agree(item, &child)?;
			}
		}
		leaf => {
			if !matches!(leaf, Value::Float(_)) {
				prop_assert_eq!(decoded.int(), leaf.int());
			}
			prop_assert_eq!(decoded.float(), leaf.float());
			prop_assert_eq!(decoded.string(), leaf.string());
			prop_assert_eq!(decoded.bool(), leaf.bool());
			prop_assert_eq!(decoded.is_nil(), leaf.is_nil());
		}
	}
	Ok(())
}

proptest! {
	#[test]
	fn integers_round_trip_through_text(n in any::<i64>()) {
		let text = n.to_string();
		let value = Value::from_json(text.as_bytes()).expect("number");
		prop_assert_eq!(value.encode_string().expect("encode"), text);
	}

	#[test]
	fn nested_values_keep_leaf_readings(value in tree()) {
		let decoded = Value::from_json(&value.encode().expect("encode")).expect("decode");
		leaves_agree(&value, &decoded)?;
	}
}

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::dynamic::{Error, Value};

#[derive(Debug, Clone, Default, PartialEq)]
struct Point {
	x: i64,
	y: i64,
}

crate::reflect_record!(Point { x, y });

mod normalization {
	use super::*;

	#[test]
	fn scalars_become_primitives() {
		assert_eq!(Value::of(5_u8), Value::Uint(5));
		assert_eq!(Value::of(-5_i32), Value::Int(-5));
		assert_eq!(Value::of(0.25_f32), Value::Float(0.25));
		assert_eq!(Value::of("hi".to_owned()), Value::String("hi".to_owned()));
		assert_eq!(Value::of(DateTime::<Utc>::default()), Value::Time(DateTime::<Utc>::default()));
	}

	#[test]
	fn pointers_to_scalars_are_dereferenced() {
		assert_eq!(Value::of(Some(3_i64)), Value::Int(3));
		assert_eq!(Value::of(Box::new(2.5_f64)), Value::Float(2.5));
		assert_eq!(Value::of(None::<i64>), Value::Nil);
		assert_eq!(Value::of(None::<Point>), Value::Nil);
	}

	#[test]
	fn canonical_collections_pass_through() {
		assert_eq!(Value::of(Value::Int(1)), Value::Int(1));
		assert_eq!(Value::of(vec![Value::Int(1)]), Value::Seq(vec![Value::Int(1)]));
		let entries = HashMap::from([("a".to_owned(), Value::Bool(true))]);
		assert_eq!(Value::of(entries.clone()), Value::Map(entries));
	}

	#[test]
	fn aggregates_stay_reflected() {
		let items = Value::of(vec![1_i64, 2]);
		assert!(matches!(items, Value::Reflected(_)), "got {items:?}");
		assert_eq!(items.kind_name(), "slice");

		let point = Value::of(Some(Point { x: 1, y: 2 }));
		assert!(matches!(point, Value::Reflected(_)), "pointer to record is preserved");
		assert_eq!(point.kind_name(), "struct");
		assert_eq!(point.get("y").expect("field").int(), 2);
	}

	#[test]
	fn set_of_ignores_nil_pointers() {
		let mut value = Value::Int(3);
		value.set_of(None::<Point>);
		assert_eq!(value, Value::Int(3));

		value.set_of(Some(4_u16));
		assert_eq!(value, Value::Uint(4));
		value.set("text");
		assert_eq!(value, Value::String("text".to_owned()));
		value.set(None::<i64>);
		assert!(value.is_nil());
	}

	#[test]
	fn json_values_convert_by_number_shape() {
		let json = serde_json::json!({"a": [1, -2, 1.5, 18446744073709551615_u64], "b": null});
		let value = Value::from(json);
		let items = value.get("a").expect("a").into_owned();
		assert_eq!(items, Value::Seq(vec![Value::Int(1), Value::Int(-2), Value::Float(1.5), Value::Uint(u64::MAX)]));
		assert!(value.get("b").expect("b").is_nil());
	}
}

mod mutators {
	use super::*;

	#[test]
	fn append_upgrades_non_sequences() {
		let mut value = Value::Nil;
		value.append(1_i64).expect("append to nil");
		value.append("two").expect("append to seq");
		assert_eq!(value, Value::Seq(vec![Value::Int(1), Value::String("two".to_owned())]));

		let mut scalar = Value::Bool(true);
		scalar.append(3_u8).expect("replace scalar");
		assert_eq!(scalar, Value::Seq(vec![Value::Uint(3)]));
	}

	#[test]
	fn set_at_pads_new_sequences_but_never_grows() {
		let mut value = Value::Nil;
		value.set_at(2, "x").expect("pad nil");
		assert_eq!(value, Value::Seq(vec![Value::Nil, Value::Nil, Value::String("x".to_owned())]));

		value.set_at(0, 1_i64).expect("overwrite");
		assert_eq!(value.get(0_usize).expect("first").int(), 1);

		let err = value.set_at(5, 1_i64).expect_err("past the end");
		assert!(matches!(err, Error::IndexOutOfRange { index: 5, len: 3 }), "got {err:?}");
	}

	#[test]
	fn set_at_rejects_unallocatable_indexes() {
		for index in [usize::MAX, usize::MAX / 2] {
			let mut value = Value::Nil;
			let err = value.set_at(index, 1_i64).expect_err("index too large");
			assert!(matches!(err, Error::IndexOutOfRange { index: got, len: 0 } if got == index), "got {err:?}");
			assert!(err.is_precondition());
			assert!(value.is_nil(), "failed write leaves value untouched");
		}
	}

	#[test]
	fn set_key_val_upgrades_and_checks_keys() {
		let mut value = Value::Nil;
		let err = value.set_key_val(1_i64, 1_i64).expect_err("integer key on mapping");
		assert!(matches!(err, Error::KeyType { expected: "string", .. }), "got {err:?}");
		assert!(value.is_nil(), "failed write leaves value untouched");

		value.set_key_val("a", 1_i64).expect("upgrade nil");
		value.set_key_val("b", Point { x: 1, y: 1 }).expect("record entry");
		assert_eq!(value.len(), Some(2));
		assert_eq!(value.get("b").expect("b").kind_name(), "struct");
	}

	#[test]
	fn reflected_shapes_reject_foreign_mutators() {
		let mut items = Value::of(vec![1_i64]);
		let err = items.set_key_val("a", 1_i64).expect_err("sequence has no keys");
		assert!(matches!(err, Error::WrongMutator { op: "set_key_val", kind: "slice" }), "got {err:?}");
		items.append(2_i64).expect("append to reflected vec");
		assert_eq!(items.len(), Some(2));

		let mut entries = Value::map_of(HashMap::from([("a".to_owned(), 1_i64)]));
		let err = entries.append(1_i64).expect_err("map adapter does not append");
		assert!(matches!(err, Error::WrongMutator { op: "append", kind: "map" }), "got {err:?}");
	}

	#[test]
	fn assign_writes_through_shared_storage() {
		let shared = Arc::new(RwLock::new(7_i64));
		let mut value = Value::shared(Arc::clone(&shared));
		assert_eq!(value.int(), 7);

		value.assign(9_i64).expect("same type");
		assert_eq!(*shared.read(), 9);
		assert_eq!(value.int(), 9);

		let err = value.assign("nine").expect_err("different type");
		assert!(matches!(err, Error::TypeMismatch { .. }), "got {err:?}");
	}
}

#[test]
fn kind_names_follow_representation() {
	assert_eq!(Value::Nil.kind_name(), "nil");
	assert_eq!(Value::Int(1).kind_name(), "int64");
	assert_eq!(Value::Uint(1).kind_name(), "uint64");
	assert_eq!(Value::Float(1.0).kind_name(), "float64");
	assert_eq!(Value::Seq(Vec::new()).kind_name(), "slice");
	assert_eq!(Value::slice_of(vec![1_u8]).kind_name(), "slice");
	assert_eq!(Value::map_of(HashMap::from([(1_i64, true)])).kind_name(), "map");
	assert_eq!(Value::of([1_i64, 2]).kind_name(), "array");
}

#[test]
fn reflected_equality_is_identity() {
	let point = Value::of(Point { x: 1, y: 2 });
	let alias = point.clone();
	let other = Value::of(Point { x: 1, y: 2 });

	assert_eq!(point, alias);
	assert_ne!(point, other);
}

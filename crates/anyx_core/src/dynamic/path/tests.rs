use crate::dynamic::{Error, Key, KeyPath, Value};

#[test]
fn parses_names_and_selectors() {
	let path = KeyPath::parse("lines[1].sku").expect("valid path");
	assert_eq!(path.keys, [Key::from("lines"), Key::Index(1), Key::from("sku")]);

	let path = KeyPath::parse("[0][2].first-name").expect("leading selector");
	assert_eq!(path.keys, [Key::Index(0), Key::Index(2), Key::from("first-name")]);
}

#[test]
fn rejects_malformed_paths() {
	for input in ["", "a.", ".a", "a..b", "a[", "a[x]", "a[1", "a]", "a[1]b", "a.[0]"] {
		let err = KeyPath::parse(input).expect_err(input);
		assert!(matches!(err, Error::InvalidPath { ref path } if path == input), "{input}: {err:?}");
	}
}

#[test]
fn lookup_resolves_against_values() {
	let value = Value::from_json(br#"{"lines": [{"sku": "W-1"}, {"sku": "W-2", "qty": 3}]}"#).expect("json");

	assert_eq!(value.lookup("lines[1].sku").expect("sku").string(), "W-2");
	assert_eq!(value.lookup("lines[1].qty").expect("qty").int(), 3);
	assert!(value.lookup("lines[0].qty").expect("absent").is_nil());
	assert!(matches!(value.lookup("lines[5]"), Err(Error::IndexOutOfRange { index: 5, len: 2 })));
	assert!(matches!(value.lookup("lines..sku"), Err(Error::InvalidPath { .. })));
}

use std::collections::HashMap;

use crate::dynamic::{Error, Result, Value};

impl Value {
	/// Build a mapping from alternating key/value items.
	///
	/// Keys must be text. An empty list yields [`Value::Nil`].
	pub fn map<I>(pairs: I) -> Result<Self>
	where
		I: IntoIterator,
		I::Item: Into<Value>,
	{
		let items: Vec<Value> = pairs.into_iter().map(Into::into).collect();
		if items.len() % 2 != 0 {
			return Err(Error::OddPairs { len: items.len() });
		}
		if items.is_empty() {
			return Ok(Self::Nil);
		}

		let mut entries = HashMap::with_capacity(items.len() / 2);
		let mut items = items.into_iter();
		while let (Some(key), Some(value)) = (items.next(), items.next()) {
			let Self::String(name) = key else {
				return Err(Error::KeyType {
					expected: "string",
					got: key.kind_name().to_owned(),
				});
			};
			entries.insert(name, value);
		}
		Ok(Self::Map(entries))
	}

	/// Build a sequence.
	pub fn slice<I>(items: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<Value>,
	{
		Self::Seq(items.into_iter().map(Into::into).collect())
	}
}

/// Fill an empty slot, returning whether it was filled.
pub fn set_if_none<T>(slot: &mut Option<T>, value: T) -> bool {
	if slot.is_some() {
		return false;
	}
	*slot = Some(value);
	true
}

/// Build a [`Value::Map`] from `key => value` pairs.
///
/// Keys convert with `String::from`; values go through [`Value::of`].
///
/// ```
/// let value = anyx::anyx_map! { "name" => "widget", "count" => 3_i64 };
/// assert_eq!(value.get("count").expect("map get").int(), 3);
/// ```
#[macro_export]
macro_rules! anyx_map {
	() => {
		$crate::dynamic::Value::Map(::std::collections::HashMap::new())
	};
	($($key:expr => $value:expr),+ $(,)?) => {
		$crate::dynamic::Value::Map(::std::collections::HashMap::from([
			$((::std::string::String::from($key), $crate::dynamic::Value::of($value))),+
		]))
	};
}

/// Build a [`Value::Seq`]; items go through [`Value::of`].
#[macro_export]
macro_rules! anyx_slice {
	($($item:expr),* $(,)?) => {
		$crate::dynamic::Value::Seq(::std::vec![$($crate::dynamic::Value::of($item)),*])
	};
}

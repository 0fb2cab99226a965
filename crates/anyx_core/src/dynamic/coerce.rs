//! Total conversions from dynamic values to fixed types.
//!
//! Every accessor returns the target type's neutral value (`0`, `false`, `""`,
//! the epoch) when the held value cannot be converted. Decoded numbers are
//! parsed here, on demand.

use chrono::{DateTime, Utc};

use crate::dynamic::time::{self, TimeLayout, TimeLayouts};
use crate::dynamic::{Scalar, Value};

pub(crate) fn to_i64(scalar: Option<Scalar<'_>>) -> i64 {
	match scalar {
		Some(Scalar::Int(v)) => v,
		Some(Scalar::Uint(v)) => v as i64,
		Some(Scalar::Float(v)) => v as i64,
		Some(Scalar::Bool(v)) => i64::from(v),
		Some(Scalar::Str(text) | Scalar::Number(text)) => text.parse().unwrap_or_default(),
		Some(Scalar::Time(_)) | None => 0,
	}
}

pub(crate) fn to_u64(scalar: Option<Scalar<'_>>) -> u64 {
	match scalar {
		Some(Scalar::Int(v)) => v as u64,
		Some(Scalar::Uint(v)) => v,
		Some(Scalar::Float(v)) => v as u64,
		Some(Scalar::Bool(v)) => u64::from(v),
		Some(Scalar::Str(text) | Scalar::Number(text)) => text.parse().unwrap_or_default(),
		Some(Scalar::Time(_)) | None => 0,
	}
}

pub(crate) fn to_f64(scalar: Option<Scalar<'_>>) -> f64 {
	match scalar {
		Some(Scalar::Int(v)) => v as f64,
		Some(Scalar::Uint(v)) => v as f64,
		Some(Scalar::Float(v)) => v,
		Some(Scalar::Bool(v)) => f64::from(u8::from(v)),
		Some(Scalar::Str(text) | Scalar::Number(text)) => text.parse().unwrap_or_default(),
		Some(Scalar::Time(_)) | None => 0.0,
	}
}

pub(crate) fn to_bool(scalar: Option<Scalar<'_>>) -> bool {
	match scalar {
		Some(Scalar::Bool(v)) => v,
		Some(Scalar::Int(v)) => v != 0,
		Some(Scalar::Uint(v)) => v != 0,
		Some(Scalar::Float(v)) => v != 0.0,
		Some(Scalar::Str(text)) => parse_bool(text).unwrap_or_default(),
		Some(number @ Scalar::Number(_)) => to_f64(Some(number)) != 0.0,
		Some(Scalar::Time(_)) | None => false,
	}
}

pub(crate) fn is_number(scalar: Option<Scalar<'_>>) -> bool {
	match scalar {
		Some(Scalar::Int(_) | Scalar::Uint(_) | Scalar::Float(_)) => true,
		Some(Scalar::Str(text) | Scalar::Number(text)) => text.bytes().next().is_some_and(|b| b.is_ascii_digit() || b == b'+' || b == b'-'),
		Some(Scalar::Bool(_) | Scalar::Time(_)) | None => false,
	}
}

pub(crate) fn to_time(scalar: Option<Scalar<'_>>, layouts: &[TimeLayout], defaults: &TimeLayouts) -> DateTime<Utc> {
	if let Some(Scalar::Time(t)) = scalar
		&& t != time::zero_time()
	{
		return t;
	}
	let n = to_i64(scalar);
	if n > 0
		&& let Some(t) = time::from_unix(n)
	{
		return t;
	}
	if let Some(Scalar::Str(text)) = scalar
		&& !text.is_empty()
	{
		let layouts = if layouts.is_empty() { defaults.for_text(text) } else { layouts };
		if let Some(t) = time::parse_text(text, layouts) {
			return t;
		}
	}
	time::zero_time()
}

/// Boolean text grammar: `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(text: &str) -> Option<bool> {
	match text {
		"1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
		"0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
		_ => None,
	}
}

impl Value {
	/// Signed integer reading, `0` when not convertible.
	pub fn int(&self) -> i64 {
		self.with_scalar(to_i64)
	}

	/// Unsigned integer reading, `0` when not convertible.
	pub fn uint(&self) -> u64 {
		self.with_scalar(to_u64)
	}

	/// Float reading, `0.0` when not convertible.
	pub fn float(&self) -> f64 {
		self.with_scalar(to_f64)
	}

	/// Truthiness: booleans as-is, non-zero numbers, and boolean text.
	pub fn bool(&self) -> bool {
		self.with_scalar(to_bool)
	}

	/// Text content; empty for anything that is not text.
	pub fn string(&self) -> String {
		self.with_scalar(|scalar| match scalar {
			Some(Scalar::Str(text)) => text.to_owned(),
			_ => String::new(),
		})
	}

	/// Borrowed text of an owned [`Value::String`].
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(text) => Some(text),
			_ => None,
		}
	}

	/// Return whether the value is numeric or text that starts like a number.
	pub fn is_number(&self) -> bool {
		self.with_scalar(is_number)
	}

	/// Timestamp reading using the default layouts.
	///
	/// Timestamps are returned as-is, positive integers are read as Unix time
	/// by magnitude, and text is parsed. Anything else yields the epoch.
	pub fn time(&self) -> DateTime<Utc> {
		self.time_with(&[])
	}

	/// Timestamp reading with explicit text layouts.
	///
	/// An empty list selects the default layouts.
	pub fn time_with(&self, layouts: &[TimeLayout]) -> DateTime<Utc> {
		self.time_with_layouts(layouts, &TimeLayouts::default())
	}

	/// Timestamp reading with explicit layouts and configurable fallbacks.
	pub fn time_with_layouts(&self, layouts: &[TimeLayout], defaults: &TimeLayouts) -> DateTime<Utc> {
		self.with_scalar(|scalar| to_time(scalar, layouts, defaults))
	}
}

#[cfg(test)]
mod tests;

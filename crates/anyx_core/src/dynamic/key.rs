use std::fmt;

use crate::dynamic::{Error, Result};

/// Index or key used to address a child of a dynamic value.
///
/// Sequences accept non-negative integral keys; mappings and records accept
/// `Str`. Reflected maps accept whatever their key type converts from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
	/// Zero-based position.
	Index(usize),
	/// Signed integral key.
	Int(i64),
	/// Unsigned integral key.
	Uint(u64),
	/// Text key or field name.
	Str(String),
	/// Boolean key.
	Bool(bool),
}

impl Key {
	/// Interpret the key as a sequence position.
	pub fn as_index(&self) -> Option<usize> {
		match self {
			Self::Index(idx) => Some(*idx),
			Self::Int(v) => usize::try_from(*v).ok(),
			Self::Uint(v) => usize::try_from(*v).ok(),
			_ => None,
		}
	}

	/// Interpret the key as text.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(v) => Some(v),
			_ => None,
		}
	}

	/// Interpret the key as a signed integer.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Index(v) => i64::try_from(*v).ok(),
			Self::Int(v) => Some(*v),
			Self::Uint(v) => i64::try_from(*v).ok(),
			_ => None,
		}
	}

	/// Interpret the key as an unsigned integer.
	pub fn as_u64(&self) -> Option<u64> {
		match self {
			Self::Index(v) => u64::try_from(*v).ok(),
			Self::Int(v) => u64::try_from(*v).ok(),
			Self::Uint(v) => Some(*v),
			_ => None,
		}
	}

	pub(crate) fn require_index(&self) -> Result<usize> {
		self.as_index().ok_or_else(|| Error::KeyType {
			expected: "index",
			got: self.to_string(),
		})
	}

	pub(crate) fn require_str(&self) -> Result<&str> {
		self.as_str().ok_or_else(|| Error::KeyType {
			expected: "string",
			got: self.to_string(),
		})
	}
}

impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Index(v) => write!(f, "{v}"),
			Self::Int(v) => write!(f, "{v}"),
			Self::Uint(v) => write!(f, "{v}"),
			Self::Str(v) => write!(f, "{v:?}"),
			Self::Bool(v) => write!(f, "{v}"),
		}
	}
}

impl From<usize> for Key {
	fn from(value: usize) -> Self {
		Self::Index(value)
	}
}

impl From<i64> for Key {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<i32> for Key {
	fn from(value: i32) -> Self {
		Self::Int(i64::from(value))
	}
}

impl From<u64> for Key {
	fn from(value: u64) -> Self {
		Self::Uint(value)
	}
}

impl From<u32> for Key {
	fn from(value: u32) -> Self {
		Self::Uint(u64::from(value))
	}
}

impl From<bool> for Key {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<&str> for Key {
	fn from(value: &str) -> Self {
		Self::Str(value.to_owned())
	}
}

impl From<String> for Key {
	fn from(value: String) -> Self {
		Self::Str(value)
	}
}

impl From<&String> for Key {
	fn from(value: &String) -> Self {
		Self::Str(value.clone())
	}
}

impl From<&Key> for Key {
	fn from(value: &Key) -> Self {
		value.clone()
	}
}

/// Typed map key that converts to and from [`Key`].
///
/// Implemented for the key types reflected maps and map adapters support.
pub trait MapKey: Sized {
	/// Convert a dynamic key into this key type, if it fits.
	fn from_key(key: &Key) -> Option<Self>;
	/// Convert this key into its dynamic form.
	fn to_key(&self) -> Key;
}

impl MapKey for String {
	fn from_key(key: &Key) -> Option<Self> {
		key.as_str().map(str::to_owned)
	}

	fn to_key(&self) -> Key {
		Key::Str(self.clone())
	}
}

impl MapKey for bool {
	fn from_key(key: &Key) -> Option<Self> {
		match key {
			Key::Bool(v) => Some(*v),
			_ => None,
		}
	}

	fn to_key(&self) -> Key {
		Key::Bool(*self)
	}
}

macro_rules! signed_map_key {
	($($ty:ty),*) => {
		$(
			impl MapKey for $ty {
				fn from_key(key: &Key) -> Option<Self> {
					key.as_i64().and_then(|v| <$ty>::try_from(v).ok())
				}

				fn to_key(&self) -> Key {
					Key::Int(i64::from(*self))
				}
			}
		)*
	};
}

macro_rules! unsigned_map_key {
	($($ty:ty),*) => {
		$(
			impl MapKey for $ty {
				fn from_key(key: &Key) -> Option<Self> {
					key.as_u64().and_then(|v| <$ty>::try_from(v).ok())
				}

				fn to_key(&self) -> Key {
					Key::Uint(u64::from(*self))
				}
			}
		)*
	};
}

signed_map_key!(i8, i16, i32, i64);
unsigned_map_key!(u8, u16, u32, u64);

impl MapKey for usize {
	fn from_key(key: &Key) -> Option<Self> {
		key.as_index()
	}

	fn to_key(&self) -> Key {
		Key::Index(*self)
	}
}

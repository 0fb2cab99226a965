use std::any::{Any, TypeId, type_name};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::dynamic::{Error, Key, MapKey, Result};

/// Runtime shape category of a reflected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
	/// Unit-like absence of a value.
	Nil,
	/// Boolean scalar.
	Bool,
	/// Signed integer scalar of any width.
	Int,
	/// Unsigned integer scalar of any width.
	Uint,
	/// Floating point scalar.
	Float,
	/// Text scalar.
	String,
	/// Timestamp scalar.
	Time,
	/// Struct-like record with named fields.
	Record,
	/// Keyed map.
	Map,
	/// Growable ordered sequence.
	Sequence,
	/// Fixed-length ordered sequence.
	Array,
	/// Optional or owning indirection (`Option`, `Box`, `Arc`).
	Pointer,
	/// Value whose shape cannot be enumerated.
	Opaque,
}

impl Kind {
	/// Short lowercase name used in errors and [`crate::dynamic::Value::kind_name`].
	pub fn name(self) -> &'static str {
		match self {
			Self::Nil => "nil",
			Self::Bool => "bool",
			Self::Int => "int",
			Self::Uint => "uint",
			Self::Float => "float",
			Self::String => "string",
			Self::Time => "time",
			Self::Record => "struct",
			Self::Map => "map",
			Self::Sequence => "slice",
			Self::Array => "array",
			Self::Pointer => "ptr",
			Self::Opaque => "opaque",
		}
	}

	/// Return whether values of this kind carry a [`Scalar`].
	pub fn is_scalar(self) -> bool {
		matches!(self, Self::Bool | Self::Int | Self::Uint | Self::Float | Self::String | Self::Time)
	}
}

/// Borrowed scalar content of a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
	/// Boolean.
	Bool(bool),
	/// Signed integer widened to 64 bits.
	Int(i64),
	/// Unsigned integer widened to 64 bits.
	Uint(u64),
	/// Float widened to 64 bits.
	Float(f64),
	/// Text.
	Str(&'a str),
	/// Timestamp.
	Time(DateTime<Utc>),
	/// Unparsed numeric text captured by the decoder.
	Number(&'a str),
}

impl Scalar<'_> {
	/// Kind matching this scalar.
	pub fn kind(&self) -> Kind {
		match self {
			Self::Bool(_) => Kind::Bool,
			Self::Int(_) => Kind::Int,
			Self::Uint(_) => Kind::Uint,
			Self::Float(_) | Self::Number(_) => Kind::Float,
			Self::Str(_) => Kind::String,
			Self::Time(_) => Kind::Time,
		}
	}
}

/// Type-erased value handed to reflective and adapter writes.
///
/// Writes into typed storage require the payload to be exactly the stored
/// type; [`Payload::downcast`] reports anything else as [`Error::TypeMismatch`].
pub struct Payload {
	value: Box<dyn Any + Send + Sync>,
	type_name: &'static str,
}

impl Payload {
	/// Erase a concrete value.
	pub fn new<T: Any + Send + Sync>(value: T) -> Self {
		Self {
			value: Box::new(value),
			type_name: type_name::<T>(),
		}
	}

	/// Name of the erased concrete type.
	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	/// Return whether the erased value is a `T`.
	pub fn is<T: Any>(&self) -> bool {
		self.value.is::<T>()
	}

	/// Recover the concrete value.
	pub fn downcast<T: Any>(self) -> Result<T> {
		let got = self.type_name;
		match self.value.downcast::<T>() {
			Ok(value) => Ok(*value),
			Err(_) => {
				let expected = type_name::<T>();
				tracing::debug!(expected, got, "payload type mismatch");
				Err(Error::TypeMismatch { expected, got })
			}
		}
	}
}

impl fmt::Debug for Payload {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Payload").field("type_name", &self.type_name).finish_non_exhaustive()
	}
}

/// Static description of a record type.
#[derive(Debug, Clone, Copy)]
pub struct RecordType {
	/// Identity used as the field cache key.
	pub id: TypeId,
	/// Type name.
	pub name: &'static str,
	/// Fields in declaration order.
	pub fields: &'static [FieldDef],
}

/// One declared record field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
	/// Field name; embedded fields use their type name.
	pub name: &'static str,
	/// Whether reflective access may see this field.
	pub exported: bool,
	/// Descriptor of the embedded record, for embedded fields.
	pub embedded: Option<fn() -> RecordType>,
}

impl FieldDef {
	/// Exported named field.
	pub const fn named(name: &'static str) -> Self {
		Self {
			name,
			exported: true,
			embedded: None,
		}
	}

	/// Declared field hidden from reflective access.
	pub const fn private(name: &'static str) -> Self {
		Self {
			name,
			exported: false,
			embedded: None,
		}
	}

	/// Embedded record whose exported fields are promoted into the parent.
	pub const fn embedded(type_name: &'static str, record: fn() -> RecordType) -> Self {
		Self {
			name: type_name,
			exported: true,
			embedded: Some(record),
		}
	}
}

/// Record types with a static field layout.
///
/// Usually implemented through [`crate::reflect_record`].
pub trait Record {
	/// Describe the record layout.
	fn record_type() -> RecordType
	where
		Self: Sized;
}

/// Runtime shape access for externally-owned values.
///
/// Every method has a neutral default so implementors only provide the
/// accessors matching their [`Kind`]. Writes take a [`Payload`] and must reject
/// anything that is not exactly the stored type.
pub trait Reflect: Any + Send + Sync {
	/// Shape category.
	fn kind(&self) -> Kind;

	/// Scalar content for scalar kinds.
	fn scalar(&self) -> Option<Scalar<'_>> {
		None
	}

	/// Layout of a record.
	fn record_type(&self) -> Option<RecordType> {
		None
	}

	/// Record field by declaration position.
	fn field(&self, index: usize) -> Option<&dyn Reflect> {
		let _ = index;
		None
	}

	/// Mutable record field by declaration position.
	fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
		let _ = index;
		None
	}

	/// Element or entry count for maps, sequences, and arrays.
	fn len(&self) -> Option<usize> {
		None
	}

	/// Sequence or array element.
	fn element(&self, index: usize) -> Option<&dyn Reflect> {
		let _ = index;
		None
	}

	/// Mutable sequence or array element.
	fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
		let _ = index;
		None
	}

	/// Map keys.
	fn keys(&self) -> Vec<Key> {
		Vec::new()
	}

	/// Map entry by key.
	fn entry(&self, key: &Key) -> Option<&dyn Reflect> {
		let _ = key;
		None
	}

	/// Mutable map entry by key.
	fn entry_mut(&mut self, key: &Key) -> Option<&mut dyn Reflect> {
		let _ = key;
		None
	}

	/// Target of a pointer kind; `None` for a nil pointer.
	fn pointee(&self) -> Option<&dyn Reflect> {
		None
	}

	/// Mutable target of a pointer kind.
	fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
		None
	}

	/// Replace this value with the payload.
	fn assign(&mut self, value: Payload) -> Result<()> {
		let _ = value;
		Err(wrong_mutator("set", self.kind()))
	}

	/// Append the payload to a sequence.
	fn push(&mut self, value: Payload) -> Result<()> {
		let _ = value;
		Err(wrong_mutator("append", self.kind()))
	}

	/// Insert the payload into a map.
	fn insert(&mut self, key: Key, value: Payload) -> Result<()> {
		let _ = (key, value);
		Err(wrong_mutator("set_key_val", self.kind()))
	}

	/// Dynamic value stored inside a reflected aggregate.
	fn as_value(&self) -> Option<&crate::dynamic::Value> {
		None
	}
}

pub(crate) fn wrong_mutator(op: &'static str, kind: Kind) -> Error {
	tracing::debug!(op, kind = kind.name(), "mutator does not fit reflected shape");
	Error::WrongMutator { op, kind: kind.name() }
}

/// Follow pointer kinds to their target; `None` when a nil pointer is hit.
pub fn indirect(mut node: &dyn Reflect) -> Option<&dyn Reflect> {
	while node.kind() == Kind::Pointer {
		node = node.pointee()?;
	}
	Some(node)
}

/// Mutable counterpart of [`indirect`].
pub fn indirect_mut(mut node: &mut dyn Reflect) -> Option<&mut dyn Reflect> {
	while node.kind() == Kind::Pointer {
		node = node.pointee_mut()?;
	}
	Some(node)
}

/// Return whether a value holds the zero value of its type.
///
/// Collections count as zero when empty, arrays and records when every
/// visible element or field is zero.
pub fn is_zero(node: &dyn Reflect) -> bool {
	if let Some(value) = node.as_value() {
		return value.is_nil();
	}
	if let Some(scalar) = node.scalar() {
		return match scalar {
			Scalar::Bool(v) => !v,
			Scalar::Int(v) => v == 0,
			Scalar::Uint(v) => v == 0,
			Scalar::Float(v) => v == 0.0,
			Scalar::Str(v) => v.is_empty(),
			Scalar::Time(v) => v == DateTime::<Utc>::default(),
			Scalar::Number(v) => v.parse::<f64>().is_ok_and(|n| n == 0.0),
		};
	}
	match node.kind() {
		Kind::Nil => true,
		Kind::Pointer => node.pointee().is_none(),
		Kind::Map | Kind::Sequence => node.len() == Some(0),
		Kind::Array => (0..node.len().unwrap_or(0)).all(|idx| node.element(idx).is_none_or(is_zero)),
		Kind::Record => {
			let Some(record) = node.record_type() else {
				return false;
			};
			(0..record.fields.len()).all(|idx| node.field(idx).is_none_or(is_zero))
		}
		_ => false,
	}
}

macro_rules! reflect_scalar {
	($kind:ident, $variant:ident, $conv:expr, $($ty:ty),*) => {
		$(
			impl Reflect for $ty {
				fn kind(&self) -> Kind {
					Kind::$kind
				}

				fn scalar(&self) -> Option<Scalar<'_>> {
					let conv: fn(&$ty) -> _ = $conv;
					Some(Scalar::$variant(conv(self)))
				}

				fn assign(&mut self, value: Payload) -> Result<()> {
					*self = value.downcast::<$ty>()?;
					Ok(())
				}
			}
		)*
	};
}

reflect_scalar!(Int, Int, |v| i64::from(*v), i8, i16, i32, i64);
reflect_scalar!(Int, Int, |v| *v as i64, isize);
reflect_scalar!(Uint, Uint, |v| u64::from(*v), u8, u16, u32, u64);
reflect_scalar!(Uint, Uint, |v| *v as u64, usize);
reflect_scalar!(Float, Float, |v| f64::from(*v), f32, f64);
reflect_scalar!(Bool, Bool, |v| *v, bool);
reflect_scalar!(Time, Time, |v| *v, DateTime<Utc>);

impl Reflect for String {
	fn kind(&self) -> Kind {
		Kind::String
	}

	fn scalar(&self) -> Option<Scalar<'_>> {
		Some(Scalar::Str(self))
	}

	fn assign(&mut self, value: Payload) -> Result<()> {
		*self = value.downcast::<String>()?;
		Ok(())
	}
}

impl Reflect for &'static str {
	fn kind(&self) -> Kind {
		Kind::String
	}

	fn scalar(&self) -> Option<Scalar<'_>> {
		Some(Scalar::Str(self))
	}

	fn assign(&mut self, value: Payload) -> Result<()> {
		*self = value.downcast::<&'static str>()?;
		Ok(())
	}
}

impl Reflect for () {
	fn kind(&self) -> Kind {
		Kind::Nil
	}
}

impl<T: Reflect> Reflect for Vec<T> {
	fn kind(&self) -> Kind {
		Kind::Sequence
	}

	fn len(&self) -> Option<usize> {
		Some(<[T]>::len(self))
	}

	fn element(&self, index: usize) -> Option<&dyn Reflect> {
		self.get(index).map(|item| item as &dyn Reflect)
	}

	fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
		self.get_mut(index).map(|item| item as &mut dyn Reflect)
	}

	fn assign(&mut self, value: Payload) -> Result<()> {
		*self = value.downcast::<Vec<T>>()?;
		Ok(())
	}

	fn push(&mut self, value: Payload) -> Result<()> {
		Vec::push(self, value.downcast::<T>()?);
		Ok(())
	}
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
	fn kind(&self) -> Kind {
		Kind::Array
	}

	fn len(&self) -> Option<usize> {
		Some(N)
	}

	fn element(&self, index: usize) -> Option<&dyn Reflect> {
		self.get(index).map(|item| item as &dyn Reflect)
	}

	fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
		self.get_mut(index).map(|item| item as &mut dyn Reflect)
	}

	fn assign(&mut self, value: Payload) -> Result<()> {
		*self = value.downcast::<[T; N]>()?;
		Ok(())
	}
}

macro_rules! reflect_map {
	($map:ident, $($bound:path),*) => {
		impl<K, V> Reflect for $map<K, V>
		where
			K: MapKey $(+ $bound)* + Send + Sync + 'static,
			V: Reflect,
		{
			fn kind(&self) -> Kind {
				Kind::Map
			}

			fn len(&self) -> Option<usize> {
				Some($map::len(self))
			}

			fn keys(&self) -> Vec<Key> {
				$map::keys(self).map(MapKey::to_key).collect()
			}

			fn entry(&self, key: &Key) -> Option<&dyn Reflect> {
				let key = K::from_key(key)?;
				self.get(&key).map(|item| item as &dyn Reflect)
			}

			fn entry_mut(&mut self, key: &Key) -> Option<&mut dyn Reflect> {
				let key = K::from_key(key)?;
				self.get_mut(&key).map(|item| item as &mut dyn Reflect)
			}

			fn assign(&mut self, value: Payload) -> Result<()> {
				*self = value.downcast::<$map<K, V>>()?;
				Ok(())
			}

			fn insert(&mut self, key: Key, value: Payload) -> Result<()> {
				let typed = K::from_key(&key).ok_or_else(|| Error::KeyType {
					expected: type_name::<K>(),
					got: key.to_string(),
				})?;
				$map::insert(self, typed, value.downcast::<V>()?);
				Ok(())
			}
		}
	};
}

reflect_map!(HashMap, Eq, Hash);
reflect_map!(BTreeMap, Ord);

impl<T: Reflect> Reflect for Option<T> {
	fn kind(&self) -> Kind {
		Kind::Pointer
	}

	fn pointee(&self) -> Option<&dyn Reflect> {
		self.as_ref().map(|item| item as &dyn Reflect)
	}

	fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
		self.as_mut().map(|item| item as &mut dyn Reflect)
	}

	/// Accepts either `Option<T>` or a bare `T`, which is stored as `Some`.
	fn assign(&mut self, value: Payload) -> Result<()> {
		if value.is::<T>() {
			*self = Some(value.downcast::<T>()?);
		} else {
			*self = value.downcast::<Option<T>>()?;
		}
		Ok(())
	}
}

impl<T: Reflect> Reflect for Box<T> {
	fn kind(&self) -> Kind {
		Kind::Pointer
	}

	fn pointee(&self) -> Option<&dyn Reflect> {
		Some(self.as_ref())
	}

	fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
		Some(self.as_mut())
	}
}

impl<T: Reflect> Reflect for Arc<T> {
	fn kind(&self) -> Kind {
		Kind::Pointer
	}

	fn pointee(&self) -> Option<&dyn Reflect> {
		Some(self.as_ref())
	}

	fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
		Arc::get_mut(self).map(|item| item as &mut dyn Reflect)
	}
}

/// Implement [`Record`] and [`Reflect`] for a struct with named fields.
///
/// Fields are listed by name. `#[skip] name` declares a field hidden from
/// reflective access; `#[embed] name: Type` declares an embedded record whose
/// exported fields are promoted into the parent and which is itself addressed
/// by its type name. Every listed field that is not skipped must implement
/// [`Reflect`].
///
/// ```
/// use anyx::dynamic::Value;
///
/// #[derive(Clone, Default)]
/// struct Point {
/// 	x: i64,
/// 	y: i64,
/// }
///
/// anyx::reflect_record!(Point { x, y });
///
/// let value = Value::of(Point { x: 3, y: 4 });
/// assert_eq!(value.get("y").expect("record get").int(), 4);
/// ```
#[macro_export]
macro_rules! reflect_record {
	($ty:ident { $($(#[$attr:ident])? $field:ident $(: $embedded:ident)?),* $(,)? }) => {
		impl $crate::dynamic::Record for $ty {
			fn record_type() -> $crate::dynamic::RecordType {
				const FIELDS: &[$crate::dynamic::FieldDef] = &[$($crate::__anyx_field_def!($(#[$attr])? $field $(: $embedded)?)),*];
				$crate::dynamic::RecordType {
					id: ::std::any::TypeId::of::<$ty>(),
					name: stringify!($ty),
					fields: FIELDS,
				}
			}
		}

		impl $crate::dynamic::Reflect for $ty {
			fn kind(&self) -> $crate::dynamic::Kind {
				$crate::dynamic::Kind::Record
			}

			fn record_type(&self) -> Option<$crate::dynamic::RecordType> {
				Some(<$ty as $crate::dynamic::Record>::record_type())
			}

			fn field(&self, index: usize) -> Option<&dyn $crate::dynamic::Reflect> {
				let fields: &[Option<&dyn $crate::dynamic::Reflect>] = &[$($crate::__anyx_field_ref!(self, $(#[$attr])? $field)),*];
				fields.get(index).copied().flatten()
			}

			fn field_mut(&mut self, index: usize) -> Option<&mut dyn $crate::dynamic::Reflect> {
				let fields: ::std::vec::Vec<Option<&mut dyn $crate::dynamic::Reflect>> = ::std::vec![$($crate::__anyx_field_mut!(self, $(#[$attr])? $field)),*];
				fields.into_iter().nth(index).flatten()
			}

			fn assign(&mut self, value: $crate::dynamic::Payload) -> $crate::dynamic::Result<()> {
				*self = value.downcast::<$ty>()?;
				Ok(())
			}
		}
	};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __anyx_field_def {
	(#[skip] $field:ident) => {
		$crate::dynamic::FieldDef::private(stringify!($field))
	};
	(#[embed] $field:ident : $embedded:ident) => {
		$crate::dynamic::FieldDef::embedded(stringify!($embedded), <$embedded as $crate::dynamic::Record>::record_type)
	};
	($field:ident) => {
		$crate::dynamic::FieldDef::named(stringify!($field))
	};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __anyx_field_ref {
	($this:ident, #[skip] $field:ident) => {
		None
	};
	($this:ident, $(#[embed])? $field:ident) => {
		Some(&$this.$field as &dyn $crate::dynamic::Reflect)
	};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __anyx_field_mut {
	($this:ident, #[skip] $field:ident) => {
		None
	};
	($this:ident, $(#[embed])? $field:ident) => {
		Some(&mut $this.$field as &mut dyn $crate::dynamic::Reflect)
	};
}

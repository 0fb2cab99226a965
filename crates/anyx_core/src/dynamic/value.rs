use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::dynamic::reflect::indirect;
use crate::dynamic::{Adapter, Error, FieldCache, Handle, Key, Kind, Payload, Reflect, Result, Scalar};

/// Numeric text captured verbatim by the decoder.
///
/// Parsed on demand by the coercion accessors and written back unchanged on
/// encode. Only the decoder creates these.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawNumber(Box<str>);

impl RawNumber {
	pub(crate) fn new(text: &str) -> Self {
		Self(text.into())
	}

	/// Original numeric text.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

/// Dynamic value container.
///
/// Primitives and the canonical `Seq`/`Map` collections are owned outright.
/// `Adapter` wraps a typed collection behind the uniform protocol and
/// `Reflected` is a live view into an externally-owned aggregate.
#[derive(Debug, Clone, Default)]
pub enum Value {
	/// Absent value.
	#[default]
	Nil,
	/// Boolean.
	Bool(bool),
	/// Signed integer.
	Int(i64),
	/// Unsigned integer.
	Uint(u64),
	/// Float.
	Float(f64),
	/// Text.
	String(String),
	/// Timestamp.
	Time(DateTime<Utc>),
	/// Decoded numeric text, parsed on demand.
	Number(RawNumber),
	/// Ordered sequence of values.
	Seq(Vec<Value>),
	/// Text-keyed mapping of values.
	Map(HashMap<String, Value>),
	/// Typed collection behind the access protocol.
	Adapter(Box<dyn Adapter>),
	/// View into an externally-owned aggregate.
	Reflected(Handle),
}

/// Move `value` out as a `U` when it is one.
fn cast<T: Any, U: Any>(value: T) -> std::result::Result<U, T> {
	let mut slot = Some(value);
	let taken = (&mut slot as &mut dyn Any).downcast_mut::<Option<U>>().and_then(Option::take);
	match (taken, slot) {
		(Some(out), _) => Ok(out),
		(None, Some(value)) => Err(value),
		(None, None) => unreachable!("slot is only emptied by a successful cast"),
	}
}

impl Value {
	/// Normalize a typed value into a dynamic one.
	///
	/// `Value`, `Vec<Value>` and `HashMap<String, Value>` are taken as-is,
	/// scalars become primitives, nil pointers become [`Value::Nil`], pointers
	/// to scalars are dereferenced, and every other aggregate is kept as a
	/// [`Value::Reflected`] view owning the value. Uses the global field cache.
	pub fn of<T: Reflect>(value: T) -> Self {
		Self::of_in(value, &FieldCache::global())
	}

	/// [`Value::of`] with an explicit field cache for record lookups.
	pub fn of_in<T: Reflect>(value: T, cache: &Arc<FieldCache>) -> Self {
		let value = match cast::<T, Value>(value) {
			Ok(value) => return value,
			Err(value) => value,
		};
		let value = match cast::<T, Vec<Value>>(value) {
			Ok(items) => return Self::Seq(items),
			Err(value) => value,
		};
		let value = match cast::<T, HashMap<String, Value>>(value) {
			Ok(entries) => return Self::Map(entries),
			Err(value) => value,
		};
		if let Some(normalized) = Self::from_node(&value) {
			return normalized;
		}
		let root: Arc<RwLock<dyn Reflect>> = Arc::new(RwLock::new(value));
		Self::Reflected(Handle::new(root, Arc::clone(cache)))
	}

	/// View a caller-owned aggregate; writes through the view land in `shared`.
	pub fn shared<T: Reflect>(shared: Arc<RwLock<T>>) -> Self {
		Self::shared_in(shared, &FieldCache::global())
	}

	/// [`Value::shared`] with an explicit field cache.
	pub fn shared_in<T: Reflect>(shared: Arc<RwLock<T>>, cache: &Arc<FieldCache>) -> Self {
		let root: Arc<RwLock<dyn Reflect>> = shared;
		Self::Reflected(Handle::new(root, Arc::clone(cache)))
	}

	/// Direct conversion for nodes that need no live view.
	pub(crate) fn from_node(node: &dyn Reflect) -> Option<Self> {
		let Some(node) = indirect(node) else {
			return Some(Self::Nil);
		};
		if let Some(value) = node.as_value() {
			return Some(value.clone());
		}
		if let Some(scalar) = node.scalar() {
			return Some(Self::from(scalar));
		}
		(node.kind() == Kind::Nil).then_some(Self::Nil)
	}

	/// Replace the held value.
	pub fn set(&mut self, value: impl Into<Value>) {
		*self = value.into();
	}

	/// Replace the held value with a normalized typed value.
	///
	/// A nil pointer leaves the current value unchanged.
	pub fn set_of<T: Reflect>(&mut self, value: T) {
		if value.kind() == Kind::Pointer && indirect(&value).is_none() {
			return;
		}
		*self = Self::of(value);
	}

	/// Write `value` into the viewed storage of a [`Value::Reflected`].
	///
	/// The value must be exactly the stored type. Any other representation is
	/// simply replaced, as with [`Value::set_of`].
	pub fn assign<T: Reflect>(&mut self, value: T) -> Result<()> {
		match self {
			Self::Reflected(handle) => handle.assign(Payload::new(value)),
			_ => {
				self.set_of(value);
				Ok(())
			}
		}
	}

	/// Append to a sequence.
	///
	/// Non-sequence owned values are replaced by a one-element sequence. A
	/// reflected or adapted value of another shape is an error.
	pub fn append<T: Reflect>(&mut self, value: T) -> Result<()> {
		match self {
			Self::Seq(items) => {
				items.push(Self::of(value));
				Ok(())
			}
			Self::Adapter(adapter) => adapter.append(Payload::new(value)),
			Self::Reflected(handle) => handle.push(Payload::new(value)),
			_ => {
				*self = Self::Seq(vec![Self::of(value)]);
				Ok(())
			}
		}
	}

	/// Write the element at `index` of a sequence.
	///
	/// Non-sequence owned values are replaced by a sequence of `index + 1`
	/// nils before the write; an index too large to allocate is
	/// [`Error::IndexOutOfRange`]. Existing sequences are never grown.
	pub fn set_at<T: Reflect>(&mut self, index: usize, value: T) -> Result<()> {
		match self {
			Self::Seq(items) => {
				let len = items.len();
				let slot = items.get_mut(index).ok_or(Error::IndexOutOfRange { index, len })?;
				*slot = Self::of(value);
				Ok(())
			}
			Self::Adapter(adapter) => adapter.set_at(index, Payload::new(value)),
			Self::Reflected(handle) => handle.set_at(index, Payload::new(value)),
			_ => {
				let mut items: Vec<Value> = Vec::new();
				index
					.checked_add(1)
					.and_then(|len| items.try_reserve_exact(len).ok())
					.ok_or(Error::IndexOutOfRange { index, len: 0 })?;
				items.resize(index, Self::Nil);
				items.push(Self::of(value));
				*self = Self::Seq(items);
				Ok(())
			}
		}
	}

	/// Write an entry of a mapping.
	///
	/// Non-mapping owned values are replaced by an empty mapping first.
	/// Reflected records accept field names and assign the field.
	pub fn set_key_val<T: Reflect>(&mut self, key: impl Into<Key>, value: T) -> Result<()> {
		let key = key.into();
		match self {
			Self::Map(entries) => {
				let name = key.require_str()?;
				entries.insert(name.to_owned(), Self::of(value));
				Ok(())
			}
			Self::Adapter(adapter) => adapter.set_key_val(key, Payload::new(value)),
			Self::Reflected(handle) => handle.set_key_val(key, Payload::new(value)),
			_ => {
				let name = key.require_str()?;
				*self = Self::Map(HashMap::from([(name.to_owned(), Self::of(value))]));
				Ok(())
			}
		}
	}

	/// Return whether the value is [`Value::Nil`] or a view of a nil pointer.
	pub fn is_nil(&self) -> bool {
		match self {
			Self::Nil => true,
			Self::Reflected(handle) => handle.read(|_| ()).is_none(),
			_ => false,
		}
	}

	/// Short name of the held representation.
	///
	/// Views report the kind of the node they resolve to.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Self::Nil => "nil",
			Self::Bool(_) => "bool",
			Self::Int(_) => "int64",
			Self::Uint(_) => "uint64",
			Self::Float(_) => "float64",
			Self::String(_) => "string",
			Self::Time(_) => "time",
			Self::Number(_) => "number",
			Self::Seq(_) => "slice",
			Self::Map(_) => "map",
			Self::Adapter(adapter) if adapter.is_sequence() => "slice",
			Self::Adapter(_) => "map",
			Self::Reflected(handle) => handle.kind().name(),
		}
	}

	/// Borrowed scalar of an owned primitive.
	pub(crate) fn own_scalar(&self) -> Option<Scalar<'_>> {
		match self {
			Self::Bool(v) => Some(Scalar::Bool(*v)),
			Self::Int(v) => Some(Scalar::Int(*v)),
			Self::Uint(v) => Some(Scalar::Uint(*v)),
			Self::Float(v) => Some(Scalar::Float(*v)),
			Self::String(v) => Some(Scalar::Str(v)),
			Self::Time(v) => Some(Scalar::Time(*v)),
			Self::Number(v) => Some(Scalar::Number(v.as_str())),
			_ => None,
		}
	}

	/// Run `f` on the scalar this value holds or views.
	pub(crate) fn with_scalar<R>(&self, f: impl FnOnce(Option<Scalar<'_>>) -> R) -> R {
		match self {
			Self::Reflected(handle) => {
				let guard = handle.lock();
				f(handle.resolve(&*guard).and_then(|node| node.scalar()))
			}
			_ => f(self.own_scalar()),
		}
	}
}

impl PartialEq for Value {
	/// Structural equality; views compare equal only when they view the same node.
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Nil, Self::Nil) => true,
			(Self::Bool(a), Self::Bool(b)) => a == b,
			(Self::Int(a), Self::Int(b)) => a == b,
			(Self::Uint(a), Self::Uint(b)) => a == b,
			(Self::Float(a), Self::Float(b)) => a == b,
			(Self::String(a), Self::String(b)) => a == b,
			(Self::Time(a), Self::Time(b)) => a == b,
			(Self::Number(a), Self::Number(b)) => a == b,
			(Self::Seq(a), Self::Seq(b)) => a == b,
			(Self::Map(a), Self::Map(b)) => a == b,
			(Self::Adapter(a), Self::Adapter(b)) => a.is_sequence() == b.is_sequence() && a.keys() == b.keys() && a.values() == b.values(),
			(Self::Reflected(a), Self::Reflected(b)) => a.same_node(b),
			_ => false,
		}
	}
}

impl Reflect for Value {
	fn kind(&self) -> Kind {
		match self {
			Self::Nil => Kind::Nil,
			Self::Bool(_) => Kind::Bool,
			Self::Int(_) => Kind::Int,
			Self::Uint(_) => Kind::Uint,
			Self::Float(_) | Self::Number(_) => Kind::Float,
			Self::String(_) => Kind::String,
			Self::Time(_) => Kind::Time,
			Self::Seq(_) => Kind::Sequence,
			Self::Map(_) => Kind::Map,
			Self::Adapter(_) | Self::Reflected(_) => Kind::Opaque,
		}
	}

	fn scalar(&self) -> Option<Scalar<'_>> {
		self.own_scalar()
	}

	fn len(&self) -> Option<usize> {
		match self {
			Self::Seq(items) => Some(items.len()),
			Self::Map(entries) => Some(entries.len()),
			_ => None,
		}
	}

	fn element(&self, index: usize) -> Option<&dyn Reflect> {
		match self {
			Self::Seq(items) => items.get(index).map(|item| item as &dyn Reflect),
			_ => None,
		}
	}

	fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
		match self {
			Self::Seq(items) => items.get_mut(index).map(|item| item as &mut dyn Reflect),
			_ => None,
		}
	}

	fn keys(&self) -> Vec<Key> {
		match self {
			Self::Map(entries) => entries.keys().map(|key| Key::Str(key.clone())).collect(),
			_ => Vec::new(),
		}
	}

	fn entry(&self, key: &Key) -> Option<&dyn Reflect> {
		match self {
			Self::Map(entries) => entries.get(key.as_str()?).map(|item| item as &dyn Reflect),
			_ => None,
		}
	}

	fn entry_mut(&mut self, key: &Key) -> Option<&mut dyn Reflect> {
		match self {
			Self::Map(entries) => entries.get_mut(key.as_str()?).map(|item| item as &mut dyn Reflect),
			_ => None,
		}
	}

	fn assign(&mut self, value: Payload) -> Result<()> {
		*self = value.downcast::<Value>()?;
		Ok(())
	}

	fn push(&mut self, value: Payload) -> Result<()> {
		match self {
			Self::Seq(items) => {
				items.push(value.downcast::<Value>()?);
				Ok(())
			}
			_ => Err(crate::dynamic::reflect::wrong_mutator("append", self.kind())),
		}
	}

	fn insert(&mut self, key: Key, value: Payload) -> Result<()> {
		match self {
			Self::Map(entries) => {
				let name = key.require_str()?.to_owned();
				entries.insert(name, value.downcast::<Value>()?);
				Ok(())
			}
			_ => Err(crate::dynamic::reflect::wrong_mutator("set_key_val", self.kind())),
		}
	}

	fn as_value(&self) -> Option<&Value> {
		Some(self)
	}
}

impl From<Scalar<'_>> for Value {
	fn from(scalar: Scalar<'_>) -> Self {
		match scalar {
			Scalar::Bool(v) => Self::Bool(v),
			Scalar::Int(v) => Self::Int(v),
			Scalar::Uint(v) => Self::Uint(v),
			Scalar::Float(v) => Self::Float(v),
			Scalar::Str(v) => Self::String(v.to_owned()),
			Scalar::Time(v) => Self::Time(v),
			Scalar::Number(v) => Self::Number(RawNumber::new(v)),
		}
	}
}

macro_rules! value_from {
	($variant:ident, $wide:ty, $($ty:ty),*) => {
		$(
			impl From<$ty> for Value {
				fn from(value: $ty) -> Self {
					Self::$variant(<$wide>::from(value))
				}
			}
		)*
	};
}

value_from!(Int, i64, i8, i16, i32, i64);
value_from!(Uint, u64, u8, u16, u32, u64);
value_from!(Float, f64, f32, f64);
value_from!(Bool, bool, bool);
value_from!(String, String, &str, String);
value_from!(Time, DateTime<Utc>, DateTime<Utc>);

impl From<()> for Value {
	fn from((): ()) -> Self {
		Self::Nil
	}
}

impl From<isize> for Value {
	fn from(value: isize) -> Self {
		Self::Int(value as i64)
	}
}

impl From<usize> for Value {
	fn from(value: usize) -> Self {
		Self::Uint(value as u64)
	}
}

impl From<Vec<Value>> for Value {
	fn from(items: Vec<Value>) -> Self {
		Self::Seq(items)
	}
}

impl From<HashMap<String, Value>> for Value {
	fn from(entries: HashMap<String, Value>) -> Self {
		Self::Map(entries)
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Nil, Into::into)
	}
}

impl From<serde_json::Value> for Value {
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => Self::Nil,
			serde_json::Value::Bool(v) => Self::Bool(v),
			serde_json::Value::Number(n) => {
				if let Some(v) = n.as_i64() {
					Self::Int(v)
				} else if let Some(v) = n.as_u64() {
					Self::Uint(v)
				} else {
					Self::Float(n.as_f64().unwrap_or_default())
				}
			}
			serde_json::Value::String(v) => Self::String(v),
			serde_json::Value::Array(items) => Self::Seq(items.into_iter().map(Self::from).collect()),
			serde_json::Value::Object(entries) => Self::Map(entries.into_iter().map(|(key, value)| (key, Self::from(value))).collect()),
		}
	}
}

#[cfg(test)]
mod tests;

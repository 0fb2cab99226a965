use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::dynamic::{Error, Key, MapKey, Payload, Reflect, Result, Value};

/// Typed collection exposed through the uniform access protocol.
///
/// Reads return normalized [`Value`]s; writes take a [`Payload`] that must be
/// exactly the element type. Mutators that do not fit the collection shape
/// report [`Error::WrongMutator`].
pub trait Adapter: Send + Sync {
	/// Return whether this adapts a sequence rather than a mapping.
	fn is_sequence(&self) -> bool;
	/// Element or entry count.
	fn len(&self) -> usize;
	/// Return whether the collection is empty.
	fn is_empty(&self) -> bool {
		self.len() == 0
	}
	/// Read a child; missing map keys yield [`Value::Nil`].
	fn get(&self, key: &Key) -> Result<Value>;
	/// Return whether the key addresses a child.
	fn has(&self, key: &Key) -> bool;
	/// Map keys; empty for sequences.
	fn keys(&self) -> Vec<Key>;
	/// Children in iteration order.
	fn values(&self) -> Vec<Value>;
	/// Insert a map entry.
	fn set_key_val(&mut self, key: Key, value: Payload) -> Result<()> {
		let _ = (key, value);
		Err(self.wrong("set_key_val"))
	}
	/// Append to a sequence.
	fn append(&mut self, value: Payload) -> Result<()> {
		let _ = value;
		Err(self.wrong("append"))
	}
	/// Write a sequence element.
	fn set_at(&mut self, index: usize, value: Payload) -> Result<()> {
		let _ = (index, value);
		Err(self.wrong("set_at"))
	}
	/// Clone behind a fresh box.
	fn clone_box(&self) -> Box<dyn Adapter>;
	/// Borrow as [`Any`] to recover the concrete adapter.
	fn as_any(&self) -> &dyn Any;
	/// Mutably borrow as [`Any`].
	fn as_any_mut(&mut self) -> &mut dyn Any;

	#[doc(hidden)]
	fn wrong(&self, op: &'static str) -> Error {
		let kind = if self.is_sequence() { "slice" } else { "map" };
		tracing::debug!(op, kind, "mutator does not fit adapted collection");
		Error::WrongMutator { op, kind }
	}
}

impl Clone for Box<dyn Adapter> {
	fn clone(&self) -> Self {
		self.clone_box()
	}
}

impl fmt::Debug for dyn Adapter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_sequence() {
			f.debug_list().entries(self.values()).finish()
		} else {
			f.debug_map().entries(self.keys().into_iter().map(|key| {
				let value = self.get(&key).unwrap_or_default();
				(key, value)
			}))
			.finish()
		}
	}
}

/// Typed `HashMap` behind the access protocol.
#[derive(Debug, Clone, Default)]
pub struct MapAdapter<K, V>(pub HashMap<K, V>);

impl<K, V> MapAdapter<K, V> {
	/// Wrap a map.
	pub fn new(entries: HashMap<K, V>) -> Self {
		Self(entries)
	}

	/// Borrow the wrapped map.
	pub fn inner(&self) -> &HashMap<K, V> {
		&self.0
	}

	/// Unwrap the map.
	pub fn into_inner(self) -> HashMap<K, V> {
		self.0
	}
}

impl<K, V> MapAdapter<K, V>
where
	K: MapKey,
{
	fn typed_key(key: &Key) -> Result<K> {
		K::from_key(key).ok_or_else(|| Error::KeyType {
			expected: type_name::<K>(),
			got: key.to_string(),
		})
	}
}

impl<K, V> Adapter for MapAdapter<K, V>
where
	K: MapKey + Eq + Hash + Clone + Send + Sync + 'static,
	V: Reflect + Clone,
{
	fn is_sequence(&self) -> bool {
		false
	}

	fn len(&self) -> usize {
		self.0.len()
	}

	fn get(&self, key: &Key) -> Result<Value> {
		let key = Self::typed_key(key)?;
		Ok(self.0.get(&key).cloned().map_or(Value::Nil, Value::of))
	}

	fn has(&self, key: &Key) -> bool {
		K::from_key(key).is_some_and(|key| self.0.contains_key(&key))
	}

	fn keys(&self) -> Vec<Key> {
		self.0.keys().map(MapKey::to_key).collect()
	}

	fn values(&self) -> Vec<Value> {
		self.0.values().cloned().map(Value::of).collect()
	}

	fn set_key_val(&mut self, key: Key, value: Payload) -> Result<()> {
		let key = Self::typed_key(&key)?;
		self.0.insert(key, value.downcast::<V>()?);
		Ok(())
	}

	fn clone_box(&self) -> Box<dyn Adapter> {
		Box::new(self.clone())
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn as_any_mut(&mut self) -> &mut dyn Any {
		self
	}
}

/// Typed `Vec` behind the access protocol.
#[derive(Debug, Clone, Default)]
pub struct SeqAdapter<E>(pub Vec<E>);

impl<E> SeqAdapter<E> {
	/// Wrap a vector.
	pub fn new(items: Vec<E>) -> Self {
		Self(items)
	}

	/// Borrow the wrapped vector.
	pub fn inner(&self) -> &[E] {
		&self.0
	}

	/// Unwrap the vector.
	pub fn into_inner(self) -> Vec<E> {
		self.0
	}
}

impl<E: PartialEq> SeqAdapter<E> {
	/// Return whether an element equal to `item` is present.
	pub fn contains(&self, item: &E) -> bool {
		self.0.contains(item)
	}
}

impl<E> Adapter for SeqAdapter<E>
where
	E: Reflect + Clone,
{
	fn is_sequence(&self) -> bool {
		true
	}

	fn len(&self) -> usize {
		self.0.len()
	}

	fn get(&self, key: &Key) -> Result<Value> {
		let index = key.require_index()?;
		self.0.get(index).cloned().map(Value::of).ok_or(Error::IndexOutOfRange { index, len: self.0.len() })
	}

	fn has(&self, key: &Key) -> bool {
		key.as_index().is_some_and(|idx| idx < self.0.len())
	}

	fn keys(&self) -> Vec<Key> {
		Vec::new()
	}

	fn values(&self) -> Vec<Value> {
		self.0.iter().cloned().map(Value::of).collect()
	}

	fn append(&mut self, value: Payload) -> Result<()> {
		self.0.push(value.downcast::<E>()?);
		Ok(())
	}

	fn set_at(&mut self, index: usize, value: Payload) -> Result<()> {
		let len = self.0.len();
		let slot = self.0.get_mut(index).ok_or(Error::IndexOutOfRange { index, len })?;
		*slot = value.downcast::<E>()?;
		Ok(())
	}

	fn clone_box(&self) -> Box<dyn Adapter> {
		Box::new(self.clone())
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn as_any_mut(&mut self) -> &mut dyn Any {
		self
	}
}

impl Value {
	/// Wrap a typed map in a [`Value::Adapter`].
	pub fn map_of<K, V>(entries: HashMap<K, V>) -> Self
	where
		K: MapKey + Eq + Hash + Clone + Send + Sync + 'static,
		V: Reflect + Clone,
	{
		Self::Adapter(Box::new(MapAdapter::new(entries)))
	}

	/// Wrap a typed vector in a [`Value::Adapter`].
	pub fn slice_of<E>(items: Vec<E>) -> Self
	where
		E: Reflect + Clone,
	{
		Self::Adapter(Box::new(SeqAdapter::new(items)))
	}

	/// Borrow the concrete adapter when this value wraps an `A`.
	pub fn adapter<A: Adapter + 'static>(&self) -> Option<&A> {
		match self {
			Self::Adapter(adapter) => adapter.as_any().downcast_ref::<A>(),
			_ => None,
		}
	}

	/// Mutably borrow the concrete adapter when this value wraps an `A`.
	pub fn adapter_mut<A: Adapter + 'static>(&mut self) -> Option<&mut A> {
		match self {
			Self::Adapter(adapter) => adapter.as_any_mut().downcast_mut::<A>(),
			_ => None,
		}
	}
}

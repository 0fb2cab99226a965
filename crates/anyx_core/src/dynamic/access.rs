use std::borrow::Cow;
use std::collections::hash_map;
use std::iter::Enumerate;
use std::ops::ControlFlow;
use std::slice;
use std::vec;

use crate::dynamic::handle::Hop;
use crate::dynamic::{Adapter, Handle, Key, Result, Value};

impl Value {
	/// Child count of a collection; `None` for anything else.
	pub fn len(&self) -> Option<usize> {
		match self {
			Self::Seq(items) => Some(items.len()),
			Self::Map(entries) => Some(entries.len()),
			Self::Adapter(adapter) => Some(adapter.len()),
			Self::Reflected(handle) => handle.len(),
			_ => None,
		}
	}

	/// Return whether the value is a collection with no children.
	pub fn is_empty(&self) -> bool {
		self.len() == Some(0)
	}

	/// Read a child by key or index.
	///
	/// Absent map keys and non-collections yield [`Value::Nil`]. Sequences
	/// reject non-index keys and out-of-range indexes.
	pub fn get(&self, key: impl Into<Key>) -> Result<Cow<'_, Value>> {
		let key = key.into();
		match self {
			Self::Seq(items) => {
				let index = key.require_index()?;
				items.get(index).map(Cow::Borrowed).ok_or(crate::dynamic::Error::IndexOutOfRange { index, len: items.len() })
			}
			Self::Map(entries) => {
				let name = key.require_str()?;
				Ok(entries.get(name).map_or(Cow::Owned(Self::Nil), Cow::Borrowed))
			}
			Self::Adapter(adapter) => adapter.get(&key).map(Cow::Owned),
			Self::Reflected(handle) => handle.get(&key).map(Cow::Owned),
			_ => Ok(Cow::Owned(Self::Nil)),
		}
	}

	/// Follow a chain of keys, stopping with an error at the first bad step.
	pub fn get_in<I>(&self, keys: I) -> Result<Value>
	where
		I: IntoIterator,
		I::Item: Into<Key>,
	{
		let mut current = Cow::Borrowed(self);
		for key in keys {
			current = match current {
				Cow::Borrowed(value) => value.get(key)?,
				Cow::Owned(value) => Cow::Owned(value.get(key)?.into_owned()),
			};
		}
		Ok(current.into_owned())
	}

	/// Return whether the key addresses an existing child.
	///
	/// Sequences check bounds; keys of the wrong kind are simply absent.
	pub fn has(&self, key: impl Into<Key>) -> bool {
		let key = key.into();
		match self {
			Self::Seq(items) => key.as_index().is_some_and(|idx| idx < items.len()),
			Self::Map(entries) => key.as_str().is_some_and(|name| entries.contains_key(name)),
			Self::Adapter(adapter) => adapter.has(&key),
			Self::Reflected(handle) => handle.has(&key),
			_ => false,
		}
	}

	/// Keys of a mapping or names of every visible record field, zero-valued ones included.
	pub fn keys(&self) -> Vec<Key> {
		match self {
			Self::Map(entries) => entries.keys().map(|name| Key::Str(name.clone())).collect(),
			Self::Adapter(adapter) => adapter.keys(),
			Self::Reflected(handle) => handle.keys(),
			_ => Vec::new(),
		}
	}

	/// Children in iteration order.
	pub fn values(&self) -> Vec<Value> {
		match self {
			Self::Seq(items) => items.clone(),
			Self::Map(entries) => entries.values().cloned().collect(),
			Self::Adapter(adapter) => adapter.values(),
			Self::Reflected(handle) => handle.children(false).into_iter().map(|(_, hops)| handle.child(hops).into_value()).collect(),
			_ => Vec::new(),
		}
	}

	/// Visit children until `f` breaks.
	///
	/// Records skip fields that hold their zero value.
	pub fn for_each<F>(&self, mut f: F)
	where
		F: FnMut(Key, &Value) -> ControlFlow<()>,
	{
		for (key, value) in self.iter() {
			if f(key, &value).is_break() {
				break;
			}
		}
	}

	/// Lazy iterator over `(key, child)` pairs, as visited by [`Value::for_each`].
	pub fn iter(&self) -> Iter<'_> {
		let inner = match self {
			Self::Seq(items) => Inner::Seq(items.iter().enumerate()),
			Self::Map(entries) => Inner::Map(entries.iter()),
			Self::Adapter(adapter) => {
				let keys = if adapter.is_sequence() {
					(0..adapter.len()).map(Key::Index).collect()
				} else {
					adapter.keys()
				};
				Inner::Adapter {
					adapter: &**adapter,
					keys: keys.into_iter(),
				}
			}
			Self::Reflected(handle) => Inner::Reflected {
				handle,
				children: handle.children(true).into_iter(),
			},
			_ => Inner::Empty,
		};
		Iter { inner }
	}
}

/// Iterator returned by [`Value::iter`].
///
/// Owned collections are borrowed in place. Adapter and reflected children
/// are produced one at a time; the set of keys is fixed when iteration starts.
pub struct Iter<'a> {
	inner: Inner<'a>,
}

enum Inner<'a> {
	Empty,
	Seq(Enumerate<slice::Iter<'a, Value>>),
	Map(hash_map::Iter<'a, String, Value>),
	Adapter { adapter: &'a dyn Adapter, keys: vec::IntoIter<Key> },
	Reflected { handle: &'a Handle, children: vec::IntoIter<(Key, Vec<Hop>)> },
}

impl<'a> Iterator for Iter<'a> {
	type Item = (Key, Cow<'a, Value>);

	fn next(&mut self) -> Option<Self::Item> {
		match &mut self.inner {
			Inner::Empty => None,
			Inner::Seq(items) => items.next().map(|(idx, item)| (Key::Index(idx), Cow::Borrowed(item))),
			Inner::Map(entries) => entries.next().map(|(name, item)| (Key::Str(name.clone()), Cow::Borrowed(item))),
			Inner::Adapter { adapter, keys } => keys.by_ref().find_map(|key| {
				let value = adapter.get(&key).ok()?;
				Some((key, Cow::Owned(value)))
			}),
			Inner::Reflected { handle, children } => children.next().map(|(key, hops)| (key, Cow::Owned(handle.child(hops).into_value()))),
		}
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		match &self.inner {
			Inner::Empty => (0, Some(0)),
			Inner::Seq(items) => items.size_hint(),
			Inner::Map(entries) => entries.size_hint(),
			Inner::Adapter { keys, .. } => (0, keys.size_hint().1),
			Inner::Reflected { children, .. } => children.size_hint(),
		}
	}
}

impl<'a> IntoIterator for &'a Value {
	type Item = (Key, Cow<'a, Value>);
	type IntoIter = Iter<'a>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

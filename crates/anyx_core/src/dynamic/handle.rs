use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::dynamic::reflect::{indirect, indirect_mut, wrong_mutator};
use crate::dynamic::{Error, FieldCache, FieldIndex, Key, Kind, Payload, Reflect, Result, Value, is_zero};

/// One step from an aggregate to a child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Hop {
	/// Record field by declaration position.
	Field(usize),
	/// Sequence or array element.
	Index(usize),
	/// Map entry.
	Entry(Key),
}

/// Live view into an externally-owned aggregate.
///
/// The handle holds the shared root plus the hops leading to the viewed
/// node. Children extend the path, so every handle derived from the same root
/// observes the same storage and writes through any of them are visible to
/// all others.
#[derive(Clone)]
pub struct Handle {
	root: Arc<RwLock<dyn Reflect>>,
	path: Vec<Hop>,
	cache: Arc<FieldCache>,
}

impl Handle {
	pub(crate) fn new(root: Arc<RwLock<dyn Reflect>>, cache: Arc<FieldCache>) -> Self {
		Self {
			root,
			path: Vec::new(),
			cache,
		}
	}

	/// Field cache used for record lookups through this handle.
	pub fn cache(&self) -> &Arc<FieldCache> {
		&self.cache
	}

	/// Return whether both handles view the same node of the same root.
	pub fn same_node(&self, other: &Handle) -> bool {
		Arc::ptr_eq(&self.root, &other.root) && self.path == other.path
	}

	pub(crate) fn lock(&self) -> RwLockReadGuard<'_, dyn Reflect> {
		self.root.read()
	}

	/// Resolve this handle's node inside a locked root, following pointers.
	pub(crate) fn resolve<'a>(&self, root: &'a dyn Reflect) -> Option<&'a dyn Reflect> {
		let mut node = root;
		for hop in &self.path {
			node = indirect(node)?;
			node = match hop {
				Hop::Field(idx) => node.field(*idx)?,
				Hop::Index(idx) => node.element(*idx)?,
				Hop::Entry(key) => node.entry(key)?,
			};
		}
		indirect(node)
	}

	fn resolve_mut<'a>(&self, root: &'a mut dyn Reflect) -> Option<&'a mut dyn Reflect> {
		let mut node = root;
		for hop in &self.path {
			node = indirect_mut(node)?;
			node = match hop {
				Hop::Field(idx) => node.field_mut(*idx)?,
				Hop::Index(idx) => node.element_mut(*idx)?,
				Hop::Entry(key) => node.entry_mut(key)?,
			};
		}
		indirect_mut(node)
	}

	/// Run `f` on the resolved node under the read lock.
	///
	/// Returns `None` when the path no longer resolves or ends at a nil pointer.
	pub(crate) fn read<R>(&self, f: impl FnOnce(&dyn Reflect) -> R) -> Option<R> {
		let guard = self.root.read();
		self.resolve(&*guard).map(f)
	}

	/// Run `f` on the resolved node under the write lock.
	pub(crate) fn write<R>(&self, f: impl FnOnce(&mut dyn Reflect) -> Result<R>) -> Result<R> {
		let mut guard = self.root.write();
		let node = self.resolve_mut(&mut *guard).ok_or(Error::Detached)?;
		f(node)
	}

	pub(crate) fn child(&self, hops: impl IntoIterator<Item = Hop>) -> Handle {
		let mut path = self.path.clone();
		path.extend(hops);
		Handle {
			root: Arc::clone(&self.root),
			path,
			cache: Arc::clone(&self.cache),
		}
	}

	/// Kind of the resolved node; [`Kind::Nil`] when it does not resolve.
	pub fn kind(&self) -> Kind {
		self.read(|node| node.kind()).unwrap_or(Kind::Nil)
	}

	fn record_index(&self, node: &dyn Reflect) -> Option<Arc<FieldIndex>> {
		node.record_type().map(|record| self.cache.index_for(record))
	}

	/// Turn this handle into a value, unwrapping scalars and nil pointers.
	pub(crate) fn into_value(self) -> Value {
		match self.read(Value::from_node) {
			Some(Some(value)) => value,
			Some(None) => Value::Reflected(self),
			None => Value::Nil,
		}
	}

	/// Hops addressing `key` in the resolved node, or `None` when absent.
	fn hops_for(&self, node: &dyn Reflect, key: &Key) -> Result<Option<Vec<Hop>>> {
		match node.kind() {
			Kind::Record => {
				let (Some(name), Some(index)) = (key.as_str(), self.record_index(node)) else {
					return Ok(None);
				};
				Ok(index.path(name).map(|path| path.iter().map(|idx| Hop::Field(*idx)).collect()))
			}
			Kind::Map => Ok(node.entry(key).map(|_| vec![Hop::Entry(key.clone())])),
			Kind::Sequence | Kind::Array => {
				let idx = key.require_index()?;
				let len = node.len().unwrap_or(0);
				if idx >= len {
					return Err(Error::IndexOutOfRange { index: idx, len });
				}
				Ok(Some(vec![Hop::Index(idx)]))
			}
			_ => Ok(None),
		}
	}

	pub(crate) fn get(&self, key: &Key) -> Result<Value> {
		match self.read(|node| self.hops_for(node, key)) {
			Some(Ok(Some(hops))) => Ok(self.child(hops).into_value()),
			Some(Ok(None)) | None => Ok(Value::Nil),
			Some(Err(err)) => Err(err),
		}
	}

	pub(crate) fn has(&self, key: &Key) -> bool {
		self.read(|node| match node.kind() {
			Kind::Record => key.as_str().zip(self.record_index(node)).is_some_and(|(name, index)| index.contains(name)),
			Kind::Map => node.entry(key).is_some(),
			Kind::Sequence | Kind::Array => key.as_index().is_some_and(|idx| idx < node.len().unwrap_or(0)),
			_ => false,
		})
		.unwrap_or(false)
	}

	pub(crate) fn len(&self) -> Option<usize> {
		self.read(|node| match node.kind() {
			Kind::Map | Kind::Sequence | Kind::Array => node.len(),
			_ => None,
		})
		.flatten()
	}

	pub(crate) fn keys(&self) -> Vec<Key> {
		self.read(|node| match node.kind() {
			Kind::Map => node.keys(),
			Kind::Record => self
				.record_index(node)
				.map(|index| index.fields().iter().map(|(name, _)| Key::Str((*name).to_owned())).collect())
				.unwrap_or_default(),
			_ => Vec::new(),
		})
		.unwrap_or_default()
	}

	/// Child addresses in iteration order.
	///
	/// Record fields holding their zero value are left out when `skip_zero` is set.
	pub(crate) fn children(&self, skip_zero: bool) -> Vec<(Key, Vec<Hop>)> {
		self.read(|node| match node.kind() {
			Kind::Map => node.keys().into_iter().map(|key| (key.clone(), vec![Hop::Entry(key)])).collect(),
			Kind::Sequence | Kind::Array => (0..node.len().unwrap_or(0)).map(|idx| (Key::Index(idx), vec![Hop::Index(idx)])).collect(),
			Kind::Record => {
				let Some(index) = self.record_index(node) else {
					return Vec::new();
				};
				index
					.fields()
					.iter()
					.filter(|(_, path)| !skip_zero || !field_at(node, path).is_none_or(is_zero))
					.map(|(name, path)| (Key::Str((*name).to_owned()), path.iter().map(|idx| Hop::Field(*idx)).collect()))
					.collect()
			}
			_ => Vec::new(),
		})
		.unwrap_or_default()
	}

	pub(crate) fn push(&self, value: Payload) -> Result<()> {
		self.write(|node| match node.kind() {
			Kind::Sequence => node.push(value),
			kind => Err(wrong_mutator("append", kind)),
		})
	}

	pub(crate) fn set_at(&self, index: usize, value: Payload) -> Result<()> {
		self.write(|node| match node.kind() {
			Kind::Sequence | Kind::Array => {
				let len = node.len().unwrap_or(0);
				let slot = node.element_mut(index).ok_or(Error::IndexOutOfRange { index, len })?;
				slot.assign(value)
			}
			kind => Err(wrong_mutator("set_at", kind)),
		})
	}

	/// Insert into a reflected map, or assign a record field by name.
	pub(crate) fn set_key_val(&self, key: Key, value: Payload) -> Result<()> {
		let cache = Arc::clone(&self.cache);
		self.write(|node| match node.kind() {
			Kind::Map => node.insert(key, value),
			Kind::Record => {
				let name = key.require_str()?;
				let index = node.record_type().map(|record| cache.index_for(record));
				let Some(path) = index.as_deref().and_then(|index| index.path(name)) else {
					return Err(Error::KeyType {
						expected: "field name",
						got: key.to_string(),
					});
				};
				let mut slot = node;
				for idx in path {
					slot = indirect_mut(slot).and_then(|inner| inner.field_mut(*idx)).ok_or(Error::Detached)?;
				}
				slot.assign(value)
			}
			kind => Err(wrong_mutator("set_key_val", kind)),
		})
	}

	/// Replace the viewed node.
	pub(crate) fn assign(&self, value: Payload) -> Result<()> {
		self.write(|node| node.assign(value))
	}
}

fn field_at<'a>(node: &'a dyn Reflect, path: &[usize]) -> Option<&'a dyn Reflect> {
	let mut node = node;
	for idx in path {
		node = indirect(node)?.field(*idx)?;
	}
	Some(node)
}

impl fmt::Debug for Handle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Handle").field("kind", &self.kind()).field("path", &self.path).finish()
	}
}

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;

use crate::dynamic::RecordType;

static GLOBAL: LazyLock<Arc<FieldCache>> = LazyLock::new(|| Arc::new(FieldCache::new()));

/// Name-to-position index for one record type.
///
/// Top-level exported fields come first in declaration order. Exported fields
/// of embedded records are promoted when no shallower field has the same name;
/// a name promoted from two embedded records at the same depth is ambiguous
/// and left out.
#[derive(Debug)]
pub struct FieldIndex {
	type_name: &'static str,
	fields: Vec<(&'static str, Vec<usize>)>,
	paths: HashMap<&'static str, Vec<usize>>,
}

impl FieldIndex {
	/// Build the index for a record layout.
	pub fn build(record: RecordType) -> Self {
		let mut fields = Vec::new();
		let mut paths: HashMap<&'static str, Vec<usize>> = HashMap::new();
		let mut level = Vec::new();

		for (idx, field) in record.fields.iter().enumerate() {
			if !field.exported {
				continue;
			}
			fields.push((field.name, vec![idx]));
			paths.insert(field.name, vec![idx]);
			if let Some(embedded) = field.embedded {
				level.push((embedded(), vec![idx]));
			}
		}

		let mut visited = HashSet::from([record.id]);
		let mut ambiguous = HashSet::new();
		while !level.is_empty() {
			let mut found: HashMap<&'static str, Option<Vec<usize>>> = HashMap::new();
			let mut next = Vec::new();
			for (inner, prefix) in level {
				if !visited.insert(inner.id) {
					continue;
				}
				for (idx, field) in inner.fields.iter().enumerate() {
					if !field.exported || paths.contains_key(field.name) || ambiguous.contains(field.name) {
						continue;
					}
					let mut path = prefix.clone();
					path.push(idx);
					found
						.entry(field.name)
						.and_modify(|slot| *slot = None)
						.or_insert_with(|| Some(path.clone()));
					if let Some(embedded) = field.embedded {
						next.push((embedded(), path));
					}
				}
			}
			for (name, path) in found {
				match path {
					Some(path) => {
						paths.insert(name, path);
					}
					None => {
						ambiguous.insert(name);
					}
				}
			}
			level = next;
		}

		Self {
			type_name: record.name,
			fields,
			paths,
		}
	}

	/// Record type name.
	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	/// Field position path for a name, including promoted fields.
	pub fn path(&self, name: &str) -> Option<&[usize]> {
		self.paths.get(name).map(Vec::as_slice)
	}

	/// Return whether a name resolves to a field.
	pub fn contains(&self, name: &str) -> bool {
		self.paths.contains_key(name)
	}

	/// Top-level exported fields in declaration order.
	pub fn fields(&self) -> &[(&'static str, Vec<usize>)] {
		&self.fields
	}
}

/// Shared cache of [`FieldIndex`] values keyed by record type.
///
/// Lookups take the read lock; a miss rechecks under the write lock before
/// building, so each type is indexed once however many threads race for it.
#[derive(Debug, Default)]
pub struct FieldCache {
	indexes: RwLock<HashMap<TypeId, Arc<FieldIndex>>>,
	builds: AtomicUsize,
}

impl FieldCache {
	/// Create an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Process-wide cache used by values built without an explicit cache.
	pub fn global() -> Arc<Self> {
		Arc::clone(&GLOBAL)
	}

	/// Get or build the index for a record layout.
	pub fn index_for(&self, record: RecordType) -> Arc<FieldIndex> {
		if let Some(index) = self.indexes.read().get(&record.id) {
			return Arc::clone(index);
		}

		let mut indexes = self.indexes.write();
		if let Some(index) = indexes.get(&record.id) {
			return Arc::clone(index);
		}

		let index = Arc::new(FieldIndex::build(record));
		self.builds.fetch_add(1, Ordering::Relaxed);
		tracing::debug!(record = record.name, fields = index.paths.len(), "indexed record fields");
		indexes.insert(record.id, Arc::clone(&index));
		index
	}

	/// Number of indexes built so far.
	pub fn builds(&self) -> usize {
		self.builds.load(Ordering::Relaxed)
	}

	/// Number of cached record types.
	pub fn len(&self) -> usize {
		self.indexes.read().len()
	}

	/// Return whether nothing has been cached yet.
	pub fn is_empty(&self) -> bool {
		self.indexes.read().is_empty()
	}
}

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::Deserializer;
use serde::ser::{Error as _, SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::dynamic::reflect::indirect;
use crate::dynamic::value::RawNumber;
use crate::dynamic::{Error, Key, Kind, Reflect, Result, Scalar, Value};

/// Decoder configuration.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
	/// Maximum nesting of arrays and objects.
	pub max_depth: u32,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self { max_depth: 128 }
	}
}

impl DecodeOptions {
	/// Preset for small, flat payloads such as config fragments.
	pub fn shallow() -> Self {
		Self { max_depth: 8 }
	}
}

impl Value {
	/// Decode JSON into a new value.
	pub fn from_json(buf: &[u8]) -> Result<Self> {
		let mut value = Self::Nil;
		value.decode(buf)?;
		Ok(value)
	}

	/// Decode JSON in place with default options.
	pub fn decode(&mut self, buf: &[u8]) -> Result<()> {
		self.decode_with(buf, &DecodeOptions::default())
	}

	/// Decode JSON in place.
	///
	/// An empty buffer leaves the value untouched. Numbers are kept as their
	/// original text until read. On failure the value is reset to [`Value::Nil`].
	pub fn decode_with(&mut self, buf: &[u8], options: &DecodeOptions) -> Result<()> {
		match buf {
			[] => return Ok(()),
			b"[]" => {
				*self = Self::Seq(Vec::new());
				return Ok(());
			}
			b"{}" => {
				*self = Self::Map(HashMap::new());
				return Ok(());
			}
			_ => {}
		}

		let decoded = serde_json::from_slice::<&RawValue>(buf)
			.map_err(Error::from)
			.and_then(|raw| decode_raw(raw.get(), options, 0));
		match decoded {
			Ok(value) => {
				*self = value;
				Ok(())
			}
			Err(err) => {
				tracing::debug!(error = %err, len = buf.len(), "decode failed");
				*self = Self::Nil;
				Err(err)
			}
		}
	}

	/// Encode as compact JSON.
	pub fn encode(&self) -> Result<Vec<u8>> {
		Ok(serde_json::to_vec(self)?)
	}

	/// Encode as a compact JSON string.
	pub fn encode_string(&self) -> Result<String> {
		Ok(serde_json::to_string(self)?)
	}
}

/// Classify validated JSON text by its first byte.
fn decode_raw(text: &str, options: &DecodeOptions, depth: u32) -> Result<Value> {
	match text.as_bytes().first() {
		Some(b'"') => Ok(Value::String(serde_json::from_str(text)?)),
		Some(b'[') => {
			let depth = descend(options, depth)?;
			let items: Vec<&RawValue> = serde_json::from_str(text)?;
			items.into_iter().map(|item| decode_raw(item.get(), options, depth)).collect::<Result<Vec<_>>>().map(Value::Seq)
		}
		Some(b'{') => {
			let depth = descend(options, depth)?;
			let entries: HashMap<String, &RawValue> = serde_json::from_str(text)?;
			entries
				.into_iter()
				.map(|(name, item)| Ok((name, decode_raw(item.get(), options, depth)?)))
				.collect::<Result<HashMap<_, _>>>()
				.map(Value::Map)
		}
		Some(b'0'..=b'9' | b'-' | b'+' | b'.') => Ok(Value::Number(RawNumber::new(text))),
		Some(b't' | b'T') => Ok(Value::Bool(true)),
		Some(b'f' | b'F') => Ok(Value::Bool(false)),
		_ => Ok(Value::from(serde_json::from_str::<serde_json::Value>(text)?)),
	}
}

fn descend(options: &DecodeOptions, depth: u32) -> Result<u32> {
	if depth >= options.max_depth {
		return Err(Error::DecodeDepthExceeded { max_depth: options.max_depth });
	}
	Ok(depth + 1)
}

fn time_text(t: &DateTime<Utc>) -> String {
	t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn key_text(key: &Key) -> String {
	match key {
		Key::Str(name) => name.clone(),
		other => other.to_string(),
	}
}

fn serialize_number<S: Serializer>(text: &str, serializer: S) -> std::result::Result<S::Ok, S::Error> {
	RawValue::from_string(text.to_owned()).map_err(S::Error::custom)?.serialize(serializer)
}

fn serialize_scalar<S: Serializer>(scalar: Scalar<'_>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
	match scalar {
		Scalar::Bool(v) => serializer.serialize_bool(v),
		Scalar::Int(v) => serializer.serialize_i64(v),
		Scalar::Uint(v) => serializer.serialize_u64(v),
		Scalar::Float(v) => serializer.serialize_f64(v),
		Scalar::Str(v) => serializer.serialize_str(v),
		Scalar::Time(v) => serializer.serialize_str(&time_text(&v)),
		Scalar::Number(v) => serialize_number(v, serializer),
	}
}

impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		match self {
			Self::Nil => serializer.serialize_unit(),
			Self::Seq(items) => serializer.collect_seq(items),
			Self::Map(entries) => serializer.collect_map(entries),
			Self::Adapter(adapter) if adapter.is_sequence() => serializer.collect_seq(adapter.values()),
			Self::Adapter(adapter) => serializer.collect_map(adapter.keys().into_iter().map(|key| {
				let value = adapter.get(&key).unwrap_or_default();
				(key_text(&key), value)
			})),
			Self::Reflected(handle) => {
				let guard = handle.lock();
				match handle.resolve(&*guard) {
					Some(node) => ReflectView { node }.serialize(serializer),
					None => serializer.serialize_unit(),
				}
			}
			_ => match self.own_scalar() {
				Some(scalar) => serialize_scalar(scalar, serializer),
				None => serializer.serialize_unit(),
			},
		}
	}
}

/// Serializes a reflected node in place, under the caller's lock.
struct ReflectView<'a> {
	node: &'a dyn Reflect,
}

impl Serialize for ReflectView<'_> {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		let Some(node) = indirect(self.node) else {
			return serializer.serialize_unit();
		};
		if let Some(value) = node.as_value() {
			return value.serialize(serializer);
		}
		if let Some(scalar) = node.scalar() {
			return serialize_scalar(scalar, serializer);
		}
		match node.kind() {
			Kind::Record => {
				let mut map = serializer.serialize_map(None)?;
				write_record(&mut map, node)?;
				map.end()
			}
			Kind::Map => {
				let keys = node.keys();
				let mut map = serializer.serialize_map(Some(keys.len()))?;
				for key in keys {
					if let Some(child) = node.entry(&key) {
						map.serialize_entry(&key_text(&key), &ReflectView { node: child })?;
					}
				}
				map.end()
			}
			Kind::Sequence | Kind::Array => {
				let len = node.len().unwrap_or(0);
				let mut seq = serializer.serialize_seq(Some(len))?;
				for child in (0..len).filter_map(|idx| node.element(idx)) {
					seq.serialize_element(&ReflectView { node: child })?;
				}
				seq.end()
			}
			_ => serializer.serialize_unit(),
		}
	}
}

/// Write exported record fields, flattening embedded records into the parent.
fn write_record<M: SerializeMap>(map: &mut M, node: &dyn Reflect) -> std::result::Result<(), M::Error> {
	let Some(record) = node.record_type() else {
		return Ok(());
	};
	for (idx, field) in record.fields.iter().enumerate() {
		let Some(child) = node.field(idx).filter(|_| field.exported) else {
			continue;
		};
		if field.embedded.is_some()
			&& let Some(inner) = indirect(child).filter(|inner| inner.kind() == Kind::Record)
		{
			write_record(map, inner)?;
			continue;
		}
		map.serialize_entry(field.name, &ReflectView { node: child })?;
	}
	Ok(())
}

impl<'de> Deserialize<'de> for Value {
	/// Decodes through [`Value::decode`] semantics; only JSON deserializers are supported.
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let raw = Box::<RawValue>::deserialize(deserializer)?;
		decode_raw(raw.get(), &DecodeOptions::default(), 0).map_err(serde::de::Error::custom)
	}
}

#[cfg(test)]
mod tests;

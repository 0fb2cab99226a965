use crate::dynamic::{Error, Key, Result, Value};

/// Parsed key path such as `items[2].name` or `[0].id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
	/// Keys in traversal order.
	pub keys: Vec<Key>,
}

impl KeyPath {
	/// Parse dotted names with optional `[index]` selectors.
	///
	/// Names run until the next `.` or `[`; a path may open with a selector.
	pub fn parse(input: &str) -> Result<Self> {
		let invalid = || Error::InvalidPath { path: input.to_owned() };
		if input.is_empty() {
			return Err(invalid());
		}

		let bytes = input.as_bytes();
		let mut idx = 0_usize;
		let mut keys = Vec::new();

		while idx < bytes.len() {
			let start = idx;
			while idx < bytes.len() && !matches!(bytes[idx], b'.' | b'[' | b']') {
				idx += 1;
			}
			if idx > start {
				keys.push(Key::Str(input[start..idx].to_owned()));
			} else if !(start == 0 && bytes[idx] == b'[') {
				return Err(invalid());
			}

			while idx < bytes.len() && bytes[idx] == b'[' {
				idx += 1;
				let n_start = idx;
				while idx < bytes.len() && bytes[idx].is_ascii_digit() {
					idx += 1;
				}
				if idx == n_start || idx >= bytes.len() || bytes[idx] != b']' {
					return Err(invalid());
				}
				let number = input[n_start..idx].parse::<usize>().map_err(|_| invalid())?;
				keys.push(Key::Index(number));
				idx += 1;
			}

			if idx < bytes.len() {
				if bytes[idx] != b'.' {
					return Err(invalid());
				}
				idx += 1;
				if idx >= bytes.len() {
					return Err(invalid());
				}
			}
		}

		Ok(Self { keys })
	}
}

impl Value {
	/// Resolve a textual key path; see [`KeyPath::parse`] for the syntax.
	pub fn lookup(&self, path: &str) -> Result<Value> {
		self.get_in(KeyPath::parse(path)?.keys)
	}
}

#[cfg(test)]
mod tests;

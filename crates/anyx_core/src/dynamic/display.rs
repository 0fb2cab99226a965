use std::fmt;

use crate::dynamic::Value;

/// Compact JSON rendering; the alternate form `{:#}` wraps it as `Any{kind: value}`.
impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let text = self.encode_string().map_err(|_| fmt::Error)?;
		if f.alternate() {
			write!(f, "Any{{{}: {text}}}", self.kind_name())
		} else {
			f.write_str(&text)
		}
	}
}

#[cfg(test)]
mod tests;

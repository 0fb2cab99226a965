use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while accessing, mutating, and decoding dynamic values.
///
/// Most variants are precondition violations: the caller handed a key, index,
/// or payload that does not fit the held representation. Only the decode
/// variants describe failures of the input itself; see [`Error::is_precondition`].
#[derive(Debug, Error)]
pub enum Error {
	/// Sequence index past the end.
	#[error("index {index} out of range for length {len}")]
	IndexOutOfRange {
		/// Requested index.
		index: usize,
		/// Current sequence length.
		len: usize,
	},
	/// Key kind does not fit the addressed collection.
	#[error("key type mismatch: expected {expected}, got {got}")]
	KeyType {
		/// Key kind the collection accepts.
		expected: &'static str,
		/// Rendered key that was supplied.
		got: String,
	},
	/// Map builder received an odd-length pair list.
	#[error("odd number of map pair arguments: {len}")]
	OddPairs {
		/// Length of the supplied list.
		len: usize,
	},
	/// Written payload is not exactly the collection's element type.
	#[error("type mismatch: expected {expected}, got {got}")]
	TypeMismatch {
		/// Concrete type the collection stores.
		expected: &'static str,
		/// Concrete type that was supplied.
		got: &'static str,
	},
	/// Mutator does not apply to the held reflected shape.
	#[error("{op} is not supported on reflected {kind}")]
	WrongMutator {
		/// Mutator name.
		op: &'static str,
		/// Kind name of the reflected value.
		kind: &'static str,
	},
	/// Key path text could not be parsed.
	#[error("invalid key path: {path}")]
	InvalidPath {
		/// Path text as supplied.
		path: String,
	},
	/// Reflected path no longer resolves in its backing aggregate.
	#[error("reflected value is detached from its backing aggregate")]
	Detached,
	/// JSON input failed to parse.
	#[error("decode: {0}")]
	Decode(#[from] serde_json::Error),
	/// Nested decoding went deeper than the configured limit.
	#[error("decode depth exceeded (max={max_depth})")]
	DecodeDepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
}

impl Error {
	/// Return whether this error reports a caller contract violation.
	///
	/// Precondition errors mean the caller should have checked shape or type
	/// first (`len`, `has`, `kind_name`); retrying them is pointless.
	pub fn is_precondition(&self) -> bool {
		!matches!(self, Self::Decode(_) | Self::DecodeDepthExceeded { .. })
	}
}

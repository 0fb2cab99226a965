mod access;
mod adapter;
mod builder;
mod codec;
mod coerce;
mod display;
mod error;
mod field_cache;
mod handle;
mod key;
mod path;
mod reflect;
mod time;
mod value;

/// Lazy child iteration.
pub use access::Iter;
/// Typed collection adapters.
pub use adapter::{Adapter, MapAdapter, SeqAdapter};
/// Slot helper.
pub use builder::set_if_none;
/// JSON decoder configuration.
pub use codec::DecodeOptions;
/// Boolean text grammar shared by the coercions.
pub use coerce::parse_bool;
/// Error and result aliases.
pub use error::{Error, Result};
/// Per-type field index cache.
pub use field_cache::{FieldCache, FieldIndex};
/// Live view into a reflected aggregate.
pub use handle::Handle;
/// Child addressing keys.
pub use key::{Key, MapKey};
/// Textual key paths.
pub use path::KeyPath;
/// Reflection contract and record descriptors.
pub use reflect::{FieldDef, Kind, Payload, Record, RecordType, Reflect, Scalar, indirect, indirect_mut, is_zero};
/// Timestamp layouts and unit thresholds.
pub use time::{MILLIS_THRESHOLD, NANOS_THRESHOLD, TimeLayout, TimeLayouts, from_unix, zero_time};
/// Dynamic value container.
pub use value::{RawNumber, Value};

//! Dynamic values with uniform access, lenient coercion, and lazily parsed JSON numbers.

/// Dynamic value container, reflection layer, adapters, and JSON bridge.
pub mod dynamic;

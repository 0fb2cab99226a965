use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Integers at or above this are read as Unix nanoseconds.
pub const NANOS_THRESHOLD: i64 = 1_000_000_000_000_000_000;
/// Integers at or above this (and below [`NANOS_THRESHOLD`]) are read as Unix milliseconds.
pub const MILLIS_THRESHOLD: i64 = 10_000_000_000;

/// Layout used to parse timestamp text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeLayout {
	/// RFC 3339 with optional fractional seconds.
	Rfc3339,
	/// RFC 2822 / RFC 1123 style, with either a zone name or numeric offset.
	Rfc2822,
	/// `chrono` strftime pattern.
	///
	/// Patterns with an offset yield that instant; patterns without one are
	/// read as UTC, and date-only patterns as UTC midnight.
	Format(Cow<'static, str>),
}

impl TimeLayout {
	/// Build a strftime layout.
	pub fn format(pattern: impl Into<Cow<'static, str>>) -> Self {
		Self::Format(pattern.into())
	}

	/// Parse `text` with this layout.
	pub fn parse(&self, text: &str) -> Option<DateTime<Utc>> {
		match self {
			Self::Rfc3339 => DateTime::parse_from_rfc3339(text).ok().map(|t| t.with_timezone(&Utc)),
			Self::Rfc2822 => DateTime::parse_from_rfc2822(text).ok().map(|t| t.with_timezone(&Utc)),
			Self::Format(pattern) => {
				if let Ok(t) = DateTime::parse_from_str(text, pattern) {
					return Some(t.with_timezone(&Utc));
				}
				if let Ok(naive) = NaiveDateTime::parse_from_str(text, pattern) {
					return Some(Utc.from_utc_datetime(&naive));
				}
				let date = NaiveDate::parse_from_str(text, pattern).ok()?;
				Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
			}
		}
	}
}

/// Fallback layouts used when a time coercion gets no explicit layouts.
///
/// Text of exactly ten bytes is tried against `short`, anything else against `full`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeLayouts {
	/// Layouts for full timestamps.
	pub full: Vec<TimeLayout>,
	/// Layouts for ten-byte date-only text.
	pub short: Vec<TimeLayout>,
}

impl Default for TimeLayouts {
	fn default() -> Self {
		Self {
			full: vec![TimeLayout::Rfc3339, TimeLayout::Rfc2822],
			short: vec![TimeLayout::format("%Y-%m-%d"), TimeLayout::format("%Y/%m/%d")],
		}
	}
}

impl TimeLayouts {
	/// Layouts only accepting RFC 3339 timestamps and ISO dates.
	pub fn strict() -> Self {
		Self {
			full: vec![TimeLayout::Rfc3339],
			short: vec![TimeLayout::format("%Y-%m-%d")],
		}
	}

	/// Layout list applying to `text`.
	pub fn for_text(&self, text: &str) -> &[TimeLayout] {
		if text.len() == 10 { &self.short } else { &self.full }
	}
}

/// The zero timestamp, the Unix epoch.
pub fn zero_time() -> DateTime<Utc> {
	DateTime::<Utc>::default()
}

/// Read a positive integer as a Unix timestamp.
///
/// The unit is chosen by magnitude: nanoseconds from [`NANOS_THRESHOLD`],
/// milliseconds from [`MILLIS_THRESHOLD`], seconds below that.
pub fn from_unix(n: i64) -> Option<DateTime<Utc>> {
	if n >= NANOS_THRESHOLD {
		DateTime::from_timestamp(n / 1_000_000_000, (n % 1_000_000_000) as u32)
	} else if n >= MILLIS_THRESHOLD {
		DateTime::from_timestamp(n / 1_000, 0)
	} else {
		DateTime::from_timestamp(n, 0)
	}
}

/// First non-zero parse of `text` across `layouts`.
pub fn parse_text(text: &str, layouts: &[TimeLayout]) -> Option<DateTime<Utc>> {
	layouts.iter().filter_map(|layout| layout.parse(text)).find(|t| *t != zero_time())
}

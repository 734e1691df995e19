//! Built-in converter set.
//!
//! Every converter here is a pure function registered at
//! [`Priority::BUILTIN`], so any other registration for the same type takes
//! precedence without further ceremony.
//!
//! | Type | Rule |
//! |---|---|
//! | `bool` | `true`, `yes`, `y`, `on`, `1` (any case) are true; everything else is false |
//! | integers | decimal, failing on overflow or non-numeric text |
//! | `f32`, `f64` | decimal with `.` as the fractional separator; `Infinity` and `NaN` are the only non-numeric spellings |
//! | `String` | identity |
//! | [`chrono::TimeDelta`], [`std::time::Duration`] | ISO-8601 duration, see [`parse_duration`] |
//! | [`chrono::NaiveDate`], [`chrono::NaiveTime`], [`chrono::NaiveDateTime`] | ISO-8601 local profiles |
//! | [`chrono::DateTime<FixedOffset>`], [`OffsetTime`] | ISO-8601 offset profiles |
//! | [`chrono::DateTime<Utc>`] | ISO-8601 instant, normalized to UTC |
//! | [`url::Url`] | WHATWG URL parsing, absolute only |
//! | [`Uri`] | RFC 3986 URI reference, relative or absolute |

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};

use crate::converter::{Converter, InvalidValue};
use crate::priority::Priority;
use crate::registry::{ConverterRegistry, ConverterSource};

mod duration;
mod temporal;
mod uri;

pub use duration::{parse_duration, parse_std_duration};
pub use temporal::{
	OffsetTime, parse_date, parse_date_time, parse_instant, parse_offset_date_time,
	parse_offset_time, parse_time,
};
pub use uri::{Uri, parse_uri};

/// Strings that convert to `true`, compared case-insensitively.
pub const TRUE_VALUES: &[&str] = &["true", "yes", "y", "on", "1"];

fn builtin<T: 'static>(registry: &ConverterRegistry, f: fn(&str) -> Result<T, InvalidValue>) {
	let converter: Arc<dyn Converter<T>> = Arc::new(f);
	registry.register_from(ConverterSource::Builtin, converter, Some(Priority::BUILTIN));
}

macro_rules! builtin_integers {
	($registry:expr, $($ty:ty),+ $(,)?) => {
		$( builtin::<$ty>($registry, parse_integer::<$ty>); )+
	};
}

/// Registers the full built-in set into `registry`.
pub(crate) fn install(registry: &ConverterRegistry) {
	builtin::<bool>(registry, parse_bool);
	builtin_integers!(registry, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
	builtin::<f32>(registry, parse_float::<f32>);
	builtin::<f64>(registry, parse_float::<f64>);
	builtin::<String>(registry, |value| Ok(value.to_owned()));

	builtin::<TimeDelta>(registry, parse_duration);
	builtin::<std::time::Duration>(registry, parse_std_duration);
	builtin::<NaiveDate>(registry, parse_date);
	builtin::<NaiveTime>(registry, parse_time);
	builtin::<NaiveDateTime>(registry, parse_date_time);
	builtin::<DateTime<FixedOffset>>(registry, parse_offset_date_time);
	builtin::<OffsetTime>(registry, parse_offset_time);
	builtin::<DateTime<Utc>>(registry, parse_instant);
	builtin::<url::Url>(registry, parse_url);
	builtin::<Uri>(registry, parse_uri);

	tracing::debug!(count = registry.len(), "builtin converters installed");
}

/// Parses a boolean. Never fails: anything outside [`TRUE_VALUES`] is false.
pub fn parse_bool(value: &str) -> Result<bool, InvalidValue> {
	Ok(TRUE_VALUES.iter().any(|t| t.eq_ignore_ascii_case(value)))
}

/// Parses a decimal integer of any primitive width.
pub fn parse_integer<T>(value: &str) -> Result<T, InvalidValue>
where
	T: std::str::FromStr<Err = std::num::ParseIntError>,
{
	value
		.parse::<T>()
		.map_err(|e| InvalidValue::caused_by(format!("invalid integer: '{value}'"), e))
}

/// Parses a decimal floating point number with `.` as the fractional separator.
///
/// Besides digits, only `Infinity` and `NaN` are accepted, optionally signed
/// and spelled exactly so.
pub fn parse_float<T>(value: &str) -> Result<T, InvalidValue>
where
	T: std::str::FromStr<Err = std::num::ParseFloatError>,
{
	let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
	let named = unsigned.starts_with(|c: char| c.is_ascii_alphabetic());
	if named && !matches!(unsigned, "Infinity" | "NaN") {
		return Err(InvalidValue::new(format!("invalid number: '{value}'")));
	}
	value
		.parse::<T>()
		.map_err(|e| InvalidValue::caused_by(format!("invalid number: '{value}'"), e))
}

pub fn parse_url(value: &str) -> Result<url::Url, InvalidValue> {
	url::Url::parse(value).map_err(|e| InvalidValue::caused_by(format!("invalid URL: '{value}'"), e))
}

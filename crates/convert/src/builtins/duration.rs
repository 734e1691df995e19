//! ISO-8601 durations.
//!
//! Grammar, case-insensitive: `[+-]P[nD][T[nH][nM][n[.f]S]]`. Every numeric
//! component may carry its own sign; a leading sign negates the whole value.
//! The fraction takes up to nine digits with `.` or `,` and follows the sign
//! of its seconds component. `P`, `PT` and `P1DT` are rejected since at least
//! one component must be present on each side of a `T`.

use std::sync::LazyLock;

use chrono::TimeDelta;
use regex::Regex;

use crate::converter::InvalidValue;

const NANOS_PER_SEC: i128 = 1_000_000_000;

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"(?i)^([-+]?)P(?:([-+]?[0-9]+)D)?(T(?:([-+]?[0-9]+)H)?(?:([-+]?[0-9]+)M)?(?:([-+]?[0-9]+)(?:[.,]([0-9]{0,9}))?S)?)?$",
	)
	.expect("duration pattern is valid")
});

/// Total signed length of a duration, in nanoseconds.
fn parse_nanos(value: &str) -> Result<i128, InvalidValue> {
	let invalid = || InvalidValue::new(format!("invalid ISO-8601 duration: '{value}'"));
	let caps = DURATION.captures(value).ok_or_else(invalid)?;

	let days = caps.get(2);
	let hours = caps.get(4);
	let minutes = caps.get(5);
	let seconds = caps.get(6);
	if caps.get(3).is_some() && hours.is_none() && minutes.is_none() && seconds.is_none() {
		return Err(invalid());
	}
	if days.is_none() && hours.is_none() && minutes.is_none() && seconds.is_none() {
		return Err(invalid());
	}

	let component = |m: Option<regex::Match>, unit: i128| -> Result<i128, InvalidValue> {
		match m {
			None => Ok(0),
			Some(m) => m
				.as_str()
				.parse::<i64>()
				.map(|n| i128::from(n) * unit)
				.map_err(|e| InvalidValue::caused_by(format!("duration component out of range: '{value}'"), e)),
		}
	};

	let secs = component(days, 86_400)?
		+ component(hours, 3_600)?
		+ component(minutes, 60)?
		+ component(seconds, 1)?;

	let mut fraction = 0i128;
	if let Some(frac) = caps.get(7).map(|m| m.as_str()).filter(|f| !f.is_empty()) {
		let padded = format!("{frac:0<9}");
		fraction = padded.parse::<i128>().map_err(|_| invalid())?;
		if seconds.is_some_and(|s| s.as_str().starts_with('-')) {
			fraction = -fraction;
		}
	}

	let total = secs * NANOS_PER_SEC + fraction;
	Ok(if &caps[1] == "-" { -total } else { total })
}

/// Parses an ISO-8601 duration into a signed [`TimeDelta`].
pub fn parse_duration(value: &str) -> Result<TimeDelta, InvalidValue> {
	let total = parse_nanos(value)?;
	let secs = i64::try_from(total.div_euclid(NANOS_PER_SEC)).ok();
	let nanos = u32::try_from(total.rem_euclid(NANOS_PER_SEC)).ok();
	secs.zip(nanos)
		.and_then(|(s, n)| TimeDelta::new(s, n))
		.ok_or_else(|| InvalidValue::new(format!("duration out of range: '{value}'")))
}

/// Parses an ISO-8601 duration into an unsigned [`std::time::Duration`].
///
/// Negative durations are rejected.
pub fn parse_std_duration(value: &str) -> Result<std::time::Duration, InvalidValue> {
	let total = parse_nanos(value)?;
	if total < 0 {
		return Err(InvalidValue::new(format!("negative duration: '{value}'")));
	}
	let secs = u64::try_from(total / NANOS_PER_SEC)
		.map_err(|_| InvalidValue::new(format!("duration out of range: '{value}'")))?;
	let nanos = (total % NANOS_PER_SEC) as u32;
	Ok(std::time::Duration::new(secs, nanos))
}

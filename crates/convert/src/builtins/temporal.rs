//! ISO-8601 date and time profiles.
//!
//! | Profile | Shape | Example |
//! |---|---|---|
//! | date | `YYYY-MM-DD` | `2007-12-03` |
//! | time | `HH:MM[:SS[.f]]` | `10:15:30` |
//! | date-time | `<date>T<time>` | `2007-12-03T10:15:30` |
//! | offset time | `<time><offset>` | `10:15:30+01:00` |
//! | offset date-time | `<date>T<time><offset>` | `2007-12-03T10:15:30+01:00` |
//! | instant | offset date-time normalized to UTC | `2007-12-03T10:15:30Z` |
//!
//! Every field has a fixed width: four-digit years, two-digit months, days,
//! hours, minutes and seconds, and a fraction of one to nine digits after
//! `.`. Surrounding whitespace, signs and leap seconds are rejected.
//!
//! Offsets are `Z` or `±HH[:MM[:SS]]`, bounded by ±18:00. The `T` and `Z`
//! separators are case-insensitive.

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
use regex::Regex;

use crate::converter::InvalidValue;

const MAX_OFFSET_SECS: i32 = 18 * 3_600;

static DATE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").expect("date pattern is valid"));

static TIME: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^([0-9]{2}):([0-9]{2})(?::([0-9]{2})(?:\.([0-9]{1,9}))?)?$").expect("time pattern is valid")
});

/// A wall-clock time paired with a fixed UTC offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OffsetTime {
	pub time: NaiveTime,
	pub offset: FixedOffset,
}

impl OffsetTime {
	pub fn new(time: NaiveTime, offset: FixedOffset) -> Self {
		Self { time, offset }
	}
}

impl std::fmt::Display for OffsetTime {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}{}", self.time, self.offset)
	}
}

impl std::str::FromStr for OffsetTime {
	type Err = InvalidValue;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		parse_offset_time(s)
	}
}

pub fn parse_date(value: &str) -> Result<NaiveDate, InvalidValue> {
	let invalid = || InvalidValue::new(format!("invalid ISO-8601 date: '{value}'"));
	let caps = DATE.captures(value).ok_or_else(invalid)?;
	let year = caps[1].parse::<i32>().ok();
	let month = caps[2].parse::<u32>().ok();
	let day = caps[3].parse::<u32>().ok();
	year.zip(month)
		.zip(day)
		.and_then(|((y, m), d)| NaiveDate::from_ymd_opt(y, m, d))
		.ok_or_else(invalid)
}

pub fn parse_time(value: &str) -> Result<NaiveTime, InvalidValue> {
	let invalid = || InvalidValue::new(format!("invalid ISO-8601 time: '{value}'"));
	let caps = TIME.captures(value).ok_or_else(invalid)?;
	let field = |idx: usize| caps.get(idx).map_or(Some(0), |m| m.as_str().parse::<u32>().ok());
	let nanos = caps
		.get(4)
		.map_or(Some(0), |m| format!("{:0<9}", m.as_str()).parse::<u32>().ok());

	// Second 60 is out of range for from_hms_nano_opt.
	let time = match (field(1), field(2), field(3), nanos) {
		(Some(h), Some(m), Some(s), Some(n)) => NaiveTime::from_hms_nano_opt(h, m, s, n),
		_ => None,
	};
	time.ok_or_else(invalid)
}

pub fn parse_date_time(value: &str) -> Result<NaiveDateTime, InvalidValue> {
	let (date, time) = split_date_time(value)?;
	Ok(NaiveDateTime::new(parse_date(date)?, parse_time(time)?))
}

pub fn parse_offset_time(value: &str) -> Result<OffsetTime, InvalidValue> {
	let (time, offset) = split_offset(value)?;
	Ok(OffsetTime::new(parse_time(time)?, offset))
}

pub fn parse_offset_date_time(value: &str) -> Result<DateTime<FixedOffset>, InvalidValue> {
	let (date, rest) = split_date_time(value)?;
	let (time, offset) = split_offset(rest)?;
	let local = NaiveDateTime::new(parse_date(date)?, parse_time(time)?);
	local
		.and_local_timezone(offset)
		.single()
		.ok_or_else(|| InvalidValue::new(format!("date-time out of range: '{value}'")))
}

pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, InvalidValue> {
	parse_offset_date_time(value).map(|dt| dt.with_timezone(&Utc))
}

fn split_date_time(value: &str) -> Result<(&str, &str), InvalidValue> {
	value
		.split_once(['T', 't'])
		.ok_or_else(|| InvalidValue::new(format!("missing 'T' separator: '{value}'")))
}

/// Splits a trailing UTC offset off a time.
fn split_offset(value: &str) -> Result<(&str, FixedOffset), InvalidValue> {
	if let Some(head) = value.strip_suffix(['Z', 'z']) {
		return Ok((head, Utc.fix()));
	}
	let idx = value
		.rfind(['+', '-'])
		.ok_or_else(|| InvalidValue::new(format!("missing UTC offset: '{value}'")))?;
	let offset = parse_offset(&value[idx..])
		.ok_or_else(|| InvalidValue::new(format!("invalid UTC offset in '{value}'")))?;
	Ok((&value[..idx], offset))
}

/// Parses `±HH[:MM[:SS]]`.
fn parse_offset(text: &str) -> Option<FixedOffset> {
	let (sign, rest) = match text.as_bytes().first()? {
		b'+' => (1, &text[1..]),
		b'-' => (-1, &text[1..]),
		_ => return None,
	};

	let mut parts = rest.split(':');
	let mut field = |max: i32| -> Option<Option<i32>> {
		match parts.next() {
			None => Some(None),
			Some(p) if p.len() == 2 && p.bytes().all(|b| b.is_ascii_digit()) => {
				let n: i32 = p.parse().ok()?;
				(n <= max).then_some(Some(n))
			}
			Some(_) => None,
		}
	};

	let hours = field(18)??;
	let minutes = field(59)?.unwrap_or(0);
	let seconds = field(59)?.unwrap_or(0);
	if parts.next().is_some() {
		return None;
	}

	let total = hours * 3_600 + minutes * 60 + seconds;
	if total > MAX_OFFSET_SECS {
		return None;
	}
	FixedOffset::east_opt(sign * total)
}

//! The converter contract.

use std::error::Error as StdError;

/// Boxed error carried as the cause of an [`InvalidValue`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Converts the textual form of a property value into `T`.
///
/// Implementations must be pure functions of their input: they are shared
/// across threads, cached, and invoked concurrently.
///
/// Any `Fn(&str) -> Result<T, InvalidValue> + Send + Sync` is a converter.
pub trait Converter<T>: Send + Sync {
	/// Parses a present value.
	///
	/// # Errors
	///
	/// Returns [`InvalidValue`] when `value` does not satisfy the grammar of `T`.
	fn convert(&self, value: &str) -> Result<T, InvalidValue>;

	/// Parses an optional value. An absent value converts to `None` without
	/// being parsed, keeping "absent" distinct from "present but empty".
	fn convert_optional(&self, value: Option<&str>) -> Result<Option<T>, InvalidValue> {
		value.map(|v| self.convert(v)).transpose()
	}
}

impl<T, F> Converter<T> for F
where
	F: Fn(&str) -> Result<T, InvalidValue> + Send + Sync,
{
	fn convert(&self, value: &str) -> Result<T, InvalidValue> {
		self(value)
	}
}

/// A present value that does not satisfy the target type's grammar.
#[derive(Debug, thiserror::Error)]
#[error("{reason}")]
pub struct InvalidValue {
	reason: String,
	#[source]
	source: Option<BoxError>,
}

impl InvalidValue {
	pub fn new(reason: impl Into<String>) -> Self {
		Self {
			reason: reason.into(),
			source: None,
		}
	}

	/// Wraps a parser error, keeping it as the source.
	pub fn caused_by(reason: impl Into<String>, source: impl Into<BoxError>) -> Self {
		Self {
			reason: reason.into(),
			source: Some(source.into()),
		}
	}

	pub fn reason(&self) -> &str {
		&self.reason
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn even(value: &str) -> Result<u8, InvalidValue> {
		let n: u8 = value
			.parse()
			.map_err(|e| InvalidValue::caused_by(format!("not a number: '{value}'"), e))?;
		if n % 2 == 0 {
			Ok(n)
		} else {
			Err(InvalidValue::new(format!("odd: {n}")))
		}
	}

	#[test]
	fn closures_are_converters() {
		let conv: &dyn Converter<u8> = &even;
		assert_eq!(conv.convert("4").unwrap(), 4);
		assert_eq!(conv.convert("3").unwrap_err().reason(), "odd: 3");
	}

	#[test]
	fn absent_value_is_not_parsed() {
		let conv: &dyn Converter<u8> = &|_: &str| -> Result<u8, InvalidValue> {
			panic!("absent values must not reach convert")
		};
		assert!(conv.convert_optional(None).unwrap().is_none());
	}

	#[test]
	fn present_empty_value_is_parsed() {
		let conv: &dyn Converter<u8> = &even;
		assert!(conv.convert_optional(Some("")).is_err());
		assert_eq!(conv.convert_optional(Some("8")).unwrap(), Some(8));
	}

	#[test]
	fn source_error_is_kept() {
		let err = even("x").unwrap_err();
		assert_eq!(err.to_string(), "not a number: 'x'");
		assert!(StdError::source(&err).is_some());
	}
}

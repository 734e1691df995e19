//! RFC 3986 URI references.
//!
//! Unlike [`url::Url`], a [`Uri`] keeps relative references (`/a/b`,
//! `../c?q`) and opaque forms such as `urn:isbn:0451450523`.

use crate::converter::InvalidValue;

/// A syntactically valid URI reference, absolute or relative.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uri(String);

impl Uri {
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Scheme of an absolute reference, as written.
	pub fn scheme(&self) -> Option<&str> {
		// A relative reference cannot carry ':' in its first segment.
		let (head, _) = self.0.split_once(':')?;
		(!head.is_empty() && !head.contains(['/', '?', '#'])).then_some(head)
	}

	pub fn is_relative(&self) -> bool {
		self.scheme().is_none()
	}
}

impl std::fmt::Display for Uri {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

impl std::str::FromStr for Uri {
	type Err = InvalidValue;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		parse_uri(s)
	}
}

impl AsRef<str> for Uri {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

pub fn parse_uri(value: &str) -> Result<Uri, InvalidValue> {
	fluent_uri::Uri::parse(value)
		.map(|_| Uri(value.to_owned()))
		.map_err(|e| InvalidValue::new(format!("invalid URI: '{value}' ({e})")))
}

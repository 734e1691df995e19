use crate::converter::InvalidValue;
use crate::target::TargetType;

/// Failure of a single conversion request.
///
/// Both variants are terminal for the request that raised them. Neither
/// leaves state behind in the registry or the implicit cache.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
	/// The raw value does not satisfy the target type's grammar, or the
	/// selected implicit mechanism failed while parsing it.
	#[error("cannot convert '{value}' to {target}: {source}")]
	Malformed {
		value: String,
		target: TargetType,
		#[source]
		source: InvalidValue,
	},

	/// Neither the registry nor implicit synthesis can service the type.
	#[error("no converter available for type {target}")]
	NoConverter { target: TargetType },
}

impl ConversionError {
	pub(crate) fn malformed(value: &str, target: TargetType, source: InvalidValue) -> Self {
		Self::Malformed {
			value: value.to_owned(),
			target,
			source,
		}
	}

	/// Stable code for programmatic handling.
	pub fn error_code(&self) -> &'static str {
		match self {
			Self::Malformed { .. } => "MALFORMED_VALUE",
			Self::NoConverter { .. } => "NO_CONVERTER",
		}
	}

	pub fn target(&self) -> TargetType {
		match self {
			Self::Malformed { target, .. } | Self::NoConverter { target } => *target,
		}
	}

	pub fn is_malformed(&self) -> bool {
		matches!(self, Self::Malformed { .. })
	}

	pub fn is_no_converter(&self) -> bool {
		matches!(self, Self::NoConverter { .. })
	}
}

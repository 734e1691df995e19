//! Implicit converters for types without a registered converter.
//!
//! # Purpose
//!
//! Derive a converter from what a type declares about itself, once per type,
//! when the registry has nothing for it.
//!
//! # Mental model
//!
//! * A [`TypeDescriptor`] lists the mechanisms a type offers. It comes from
//!   the [`DescriptorCatalog`], never from runtime reflection.
//! * [`synthesize`] checks mechanisms in [`Mechanism::SELECTION_ORDER`]:
//!   constructor, `value_of`, `parse`, enum member. The first declared one is
//!   the converter. A failure while parsing with it is a malformed value; the
//!   remaining mechanisms are not tried.
//! * The result goes into the [`ImplicitCache`] before use.
//!
//! # Failure modes
//!
//! * No descriptor, or a descriptor with no mechanism: "no converter
//!   available". Nothing is cached, so a later call tries again, which lets a
//!   descriptor added afterwards take effect.

mod cache;
mod catalog;
mod descriptor;

pub use cache::ImplicitCache;
pub use catalog::{DescriptorCatalog, DescriptorReg};
pub use descriptor::{ImplicitConverter, Introspect, Mechanism, TypeDescriptor};

use crate::error::ConversionError;
use crate::target::TargetType;

/// Builds the implicit converter for `T` from its catalogued descriptor.
///
/// # Errors
///
/// [`ConversionError::NoConverter`] when `T` has no descriptor or declares no
/// mechanism.
pub fn synthesize<T: 'static>(catalog: &DescriptorCatalog) -> Result<ImplicitConverter<T>, ConversionError> {
	let target = TargetType::of::<T>();
	let Some(descriptor) = catalog.describe::<T>() else {
		tracing::debug!(ty = %target, "no descriptor for implicit conversion");
		return Err(ConversionError::NoConverter { target });
	};
	match descriptor.select() {
		Some(converter) => {
			tracing::debug!(ty = %target, mechanism = %converter.mechanism(), "implicit converter synthesized");
			Ok(converter)
		}
		None => {
			tracing::debug!(ty = %target, "descriptor declares no mechanism");
			Err(ConversionError::NoConverter { target })
		}
	}
}

//! Typed conversion of configuration property values.
//!
//! A configuration service hands this crate raw property text and a target
//! type; [`Converters::convert_to`] picks the converter and runs it.
//!
//! # Modules
//!
//! - [`registry`] - Ranked per-type converter table with atomic publication
//! - [`builtins`] - Converters shipped with the crate, at [`Priority::BUILTIN`]
//! - [`implicit`] - Converters synthesized from a type's [`TypeDescriptor`]
//! - [`plugin`] - Link-time converter discovery via [`converter_plugin!`]
//! - [`config`] - TOML configuration for plugin installation
//!
//! # Extending
//!
//! - Register a converter at runtime with [`Converters::register`].
//! - Ship one from any linked crate with [`converter_plugin!`], then build
//!   with [`ConvertersBuilder::discover_plugins`].
//! - Describe a type's own parsing with [`Introspect`] and [`implicit_type!`].

pub mod builtins;
pub mod config;
mod converter;
mod error;
mod facade;
pub mod implicit;
pub mod plugin;
mod priority;
pub mod registry;
mod target;

pub use builtins::{OffsetTime, Uri};
pub use config::{ConfigError, ConvertConfig, PluginsConfig};
pub use converter::{BoxError, Converter, InvalidValue};
pub use error::ConversionError;
pub use facade::{Converters, ConvertersBuilder, ResolutionPath, Resolved};
pub use implicit::{DescriptorReg, ImplicitConverter, Introspect, Mechanism, TypeDescriptor};
pub use plugin::{ConverterPlugin, InstalledPlugin};
pub use priority::Priority;
pub use registry::{ConverterRegistry, ConverterSource, EntryInfo, RegisteredConverter, RegistrationId};
pub use target::TargetType;

#[doc(hidden)]
pub mod __private {
	pub use {inventory, paste};
}

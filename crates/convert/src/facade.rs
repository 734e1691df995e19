//! The conversion entry point.
//!
//! # Role
//!
//! [`Converters`] owns one registry, one descriptor catalog and one implicit
//! cache, and answers "turn this raw property value into a `T`".
//!
//! # Resolution order
//!
//! For a present value, the first step that yields a converter serves the
//! request:
//!
//! 1. The registry's active converter for exactly `T`. Registered converters
//!    outrank the built-ins by priority, so this covers both.
//! 2. The cached implicit converter for `T`.
//! 3. A freshly synthesized implicit converter, cached before use.
//!
//! An absent value converts to `None` before any of this runs.
//!
//! # Invariants
//!
//! - A converter failure is reported as [`ConversionError::Malformed`] and
//!   never retried with another converter.
//! - A failed synthesis leaves the cache untouched.

use std::sync::Arc;

use crate::config::ConvertConfig;
use crate::converter::Converter;
use crate::error::ConversionError;
use crate::implicit::{self, DescriptorCatalog, ImplicitCache, Introspect, TypeDescriptor};
use crate::plugin::{self, InstalledPlugin};
use crate::priority::Priority;
use crate::registry::{ConverterRegistry, ConverterSource, RegistrationId};
use crate::target::TargetType;

/// How a converter was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolutionPath {
	/// Active registry entry.
	Registered { source: ConverterSource, priority: Priority },
	/// Implicit converter synthesized by an earlier request.
	CachedImplicit,
	/// Implicit converter synthesized by this request.
	SynthesizedImplicit,
}

/// A converter chosen for `T`, together with how it was chosen.
pub struct Resolved<T> {
	converter: Arc<dyn Converter<T>>,
	path: ResolutionPath,
}

impl<T> Clone for Resolved<T> {
	fn clone(&self) -> Self {
		Self {
			converter: self.converter.clone(),
			path: self.path,
		}
	}
}

impl<T> std::fmt::Debug for Resolved<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Resolved").field("path", &self.path).finish_non_exhaustive()
	}
}

impl<T> Resolved<T> {
	pub fn path(&self) -> ResolutionPath {
		self.path
	}

	pub fn converter(&self) -> &Arc<dyn Converter<T>> {
		&self.converter
	}
}

impl<T> Converter<T> for Resolved<T> {
	fn convert(&self, value: &str) -> Result<T, crate::converter::InvalidValue> {
		self.converter.convert(value)
	}
}

/// Converter resolution and selection for one configuration service.
pub struct Converters {
	registry: ConverterRegistry,
	catalog: DescriptorCatalog,
	implicit: ImplicitCache,
	plugins: Vec<InstalledPlugin>,
}

impl Default for Converters {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Converters {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Converters")
			.field("registry", &self.registry)
			.field("implicit", &self.implicit.len())
			.field("plugins", &self.plugins.len())
			.finish_non_exhaustive()
	}
}

impl Converters {
	/// Built-in converters only; no plugin discovery.
	pub fn new() -> Self {
		Self::from_registry(ConverterRegistry::with_builtins(), Vec::new())
	}

	pub fn builder() -> ConvertersBuilder {
		ConvertersBuilder::default()
	}

	fn from_registry(registry: ConverterRegistry, plugins: Vec<InstalledPlugin>) -> Self {
		Self {
			registry,
			catalog: DescriptorCatalog::new(),
			implicit: ImplicitCache::default(),
			plugins,
		}
	}

	/// Converts an optional raw value.
	///
	/// `None` yields `Ok(None)` without resolving or invoking a converter.
	///
	/// # Errors
	///
	/// - [`ConversionError::Malformed`] when the selected converter rejects the value.
	/// - [`ConversionError::NoConverter`] when nothing can convert to `T`.
	pub fn convert_to<T: 'static>(&self, raw: Option<&str>) -> Result<Option<T>, ConversionError> {
		match raw {
			Some(raw) => self.convert(raw).map(Some),
			None => Ok(None),
		}
	}

	/// Converts a present raw value.
	pub fn convert<T: 'static>(&self, raw: &str) -> Result<T, ConversionError> {
		let resolved = self.resolve::<T>()?;
		resolved
			.converter
			.convert(raw)
			.map_err(|e| ConversionError::malformed(raw, TargetType::of::<T>(), e))
	}

	/// Selects the converter `convert` would use for `T`.
	///
	/// May synthesize and cache an implicit converter.
	pub fn resolve<T: 'static>(&self) -> Result<Resolved<T>, ConversionError> {
		let target = TargetType::of::<T>();

		if let Some(registered) = self.registry.resolve::<T>() {
			tracing::trace!(ty = %target, id = %registered.id(), "resolved from registry");
			return Ok(Resolved {
				path: ResolutionPath::Registered {
					source: registered.source(),
					priority: registered.priority(),
				},
				converter: registered.converter().clone(),
			});
		}

		if let Some(cached) = self.implicit.get::<T>() {
			tracing::trace!(ty = %target, mechanism = %cached.mechanism(), "resolved from implicit cache");
			return Ok(Resolved {
				converter: cached,
				path: ResolutionPath::CachedImplicit,
			});
		}

		let synthesized = implicit::synthesize::<T>(&self.catalog)?;
		let converter = self.implicit.insert(synthesized);
		tracing::trace!(ty = %target, mechanism = %converter.mechanism(), "resolved by synthesis");
		Ok(Resolved {
			converter,
			path: ResolutionPath::SynthesizedImplicit,
		})
	}

	/// Registers a converter for `T`. See [`ConverterRegistry::register`].
	pub fn register<T: 'static>(&self, converter: Arc<dyn Converter<T>>, priority: Option<Priority>) -> RegistrationId {
		self.registry.register(converter, priority)
	}

	pub fn deregister(&self, id: RegistrationId) -> bool {
		self.registry.deregister(id)
	}

	/// Removes every non-built-in converter registered for `T`.
	pub fn deregister_all<T: 'static>(&self) -> usize {
		self.registry.deregister_all::<T>()
	}

	/// Makes `T` eligible for implicit conversion through its [`Introspect`] impl.
	///
	/// Has no effect on a type whose implicit converter is already cached.
	pub fn describe<T: Introspect>(&self) {
		self.catalog.insert::<T, _>(T::describe);
	}

	/// Like [`describe`](Self::describe), for types that cannot implement [`Introspect`].
	pub fn describe_with<T, F>(&self, factory: F)
	where
		T: Send + Sync + 'static,
		F: Fn() -> TypeDescriptor<T> + Send + Sync + 'static,
	{
		self.catalog.insert::<T, F>(factory);
	}

	pub fn registry(&self) -> &ConverterRegistry {
		&self.registry
	}

	pub fn catalog(&self) -> &DescriptorCatalog {
		&self.catalog
	}

	pub fn implicit_cache(&self) -> &ImplicitCache {
		&self.implicit
	}

	/// Plugins installed when this instance was built, in installation order.
	pub fn installed_plugins(&self) -> &[InstalledPlugin] {
		&self.plugins
	}
}

/// Builds a [`Converters`] with optional plugin discovery.
#[derive(Debug, Default)]
pub struct ConvertersBuilder {
	config: ConvertConfig,
	discover: bool,
}

impl ConvertersBuilder {
	pub fn config(mut self, config: ConvertConfig) -> Self {
		self.config = config;
		self
	}

	/// Installs every linked [`converter_plugin!`](crate::converter_plugin) submission.
	pub fn discover_plugins(mut self) -> Self {
		self.discover = true;
		self
	}

	pub fn build(self) -> Converters {
		let registry = ConverterRegistry::with_builtins();
		let plugins = if self.discover {
			plugin::install_discovered(&registry, &self.config)
		} else {
			Vec::new()
		};
		Converters::from_registry(registry, plugins)
	}
}

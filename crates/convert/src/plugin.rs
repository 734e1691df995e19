//! Link-time discovery of converter plugins.
//!
//! A plugin is a converter submitted with [`converter_plugin!`](crate::converter_plugin)
//! from any crate linked into the final binary. Its id, `module_path::name`,
//! is the name configuration refers to it by.
//!
//! Installation order is ascending id, independent of link order, so
//! equal-priority plugins for one type always tie-break the same way.

use rustc_hash::FxHashSet;

use crate::config::ConvertConfig;
use crate::priority::Priority;
use crate::registry::{ConverterRegistry, ConverterSource, RegistrationId};
use crate::target::TargetType;

/// Installs one plugin's converter into a registry.
pub type InstallFn = fn(&ConverterRegistry, ConverterSource, Option<Priority>) -> RegistrationId;

/// A converter submitted for discovery.
///
/// Built by [`converter_plugin!`](crate::converter_plugin).
pub struct ConverterPlugin {
	pub id: &'static str,
	pub target: fn() -> TargetType,
	/// Declared priority; `None` means [`Priority::DEFAULT`].
	pub priority: Option<Priority>,
	pub install: InstallFn,
}

inventory::collect!(ConverterPlugin);

/// Outcome of installing one discovered plugin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstalledPlugin {
	pub id: &'static str,
	pub target: TargetType,
	pub priority: Priority,
	pub registration: RegistrationId,
}

/// Every submitted plugin, sorted by id.
pub fn discovered() -> Vec<&'static ConverterPlugin> {
	let mut plugins: Vec<&'static ConverterPlugin> = inventory::iter::<ConverterPlugin>.into_iter().collect();
	plugins.sort_by_key(|p| p.id);
	plugins
}

/// Installs discovered plugins into `registry`, honouring `config`.
pub fn install_discovered(registry: &ConverterRegistry, config: &ConvertConfig) -> Vec<InstalledPlugin> {
	install_plugins(registry, config, discovered())
}

pub(crate) fn install_plugins<I>(registry: &ConverterRegistry, config: &ConvertConfig, plugins: I) -> Vec<InstalledPlugin>
where
	I: IntoIterator<Item = &'static ConverterPlugin>,
{
	let mut seen: FxHashSet<&str> = FxHashSet::default();
	let mut installed = Vec::new();

	for plugin in plugins {
		seen.insert(plugin.id);
		if config.is_disabled(plugin.id) {
			tracing::debug!(plugin = plugin.id, "converter plugin disabled by configuration");
			continue;
		}

		let priority = config.priority_override(plugin.id).or(plugin.priority);
		let registration = (plugin.install)(registry, ConverterSource::Plugin(plugin.id), priority);
		let target = (plugin.target)();
		tracing::debug!(plugin = plugin.id, ty = %target, id = %registration, "converter plugin installed");
		installed.push(InstalledPlugin {
			id: plugin.id,
			target,
			priority: Priority::or_default(priority),
			registration,
		});
	}

	for id in config.referenced_plugins() {
		if !seen.contains(id) {
			tracing::warn!(plugin = id, "configuration refers to an unknown converter plugin");
		}
	}

	installed
}

/// Selects a provided value or falls back to a default.
#[doc(hidden)]
#[macro_export]
macro_rules! __convert_opt {
	({$val:expr}, $default:expr) => {
		$val
	};
	(, $default:expr) => {
		$default
	};
}

/// Submits a converter for link-time discovery.
///
/// ```ignore
/// converter_plugin!(hex_color, Color, HexColorConverter, priority: 150);
/// ```
///
/// The id is `concat!(module_path!(), "::", "hex_color")`. Without
/// `priority:` the plugin declares none and installs at the default.
#[macro_export]
macro_rules! converter_plugin {
	($name:ident, $ty:ty, $converter:expr $(, priority: $priority:expr)? $(,)?) => {
		$crate::__private::paste::paste! {
			#[allow(non_snake_case)]
			fn [<__converter_plugin_install_ $name>](
				registry: &$crate::ConverterRegistry,
				source: $crate::ConverterSource,
				priority: ::core::option::Option<$crate::Priority>,
			) -> $crate::RegistrationId {
				let converter: ::std::sync::Arc<dyn $crate::Converter<$ty>> = ::std::sync::Arc::new($converter);
				registry.register_from(source, converter, priority)
			}

			$crate::__private::inventory::submit! {
				$crate::ConverterPlugin {
					id: concat!(module_path!(), "::", stringify!($name)),
					target: $crate::TargetType::of::<$ty>,
					priority: $crate::__convert_opt!(
						$({ ::core::option::Option::Some($crate::Priority::new($priority)) })?,
						::core::option::Option::None
					),
					install: [<__converter_plugin_install_ $name>],
				}
			}
		}
	};
}

/// Submits [`Introspect`](crate::Introspect) types to the link-time descriptor catalog.
#[macro_export]
macro_rules! implicit_type {
	($($ty:ty),+ $(,)?) => {
		$(
			$crate::__private::inventory::submit! {
				$crate::DescriptorReg {
					origin: module_path!(),
					target: $crate::TargetType::of::<$ty>,
					describe: $crate::DescriptorReg::erased_describe::<$ty>,
				}
			}
		)+
	};
}

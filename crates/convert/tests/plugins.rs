//! Link-time discovery: converters and descriptors submitted from this crate.

use pretty_assertions::assert_eq;
use tessel_convert::{
	ConversionError, ConvertConfig, Converter, Converters, ConverterSource, InvalidValue, Introspect,
	Priority, ResolutionPath, TargetType, TypeDescriptor, converter_plugin, implicit_type, plugin,
};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Color(u8, u8, u8);

/// `#RRGGBB`.
struct HexColor;

impl Converter<Color> for HexColor {
	fn convert(&self, value: &str) -> Result<Color, InvalidValue> {
		let hex = value
			.strip_prefix('#')
			.filter(|h| h.len() == 6 && h.is_ascii())
			.ok_or_else(|| InvalidValue::new(format!("expected #RRGGBB, got '{value}'")))?;
		let channel = |at: usize| {
			u8::from_str_radix(&hex[at..at + 2], 16).map_err(|e| InvalidValue::caused_by("invalid hex channel", e))
		};
		Ok(Color(channel(0)?, channel(2)?, channel(4)?))
	}
}

/// A handful of CSS names.
struct NamedColor;

impl Converter<Color> for NamedColor {
	fn convert(&self, value: &str) -> Result<Color, InvalidValue> {
		match value {
			"red" => Ok(Color(255, 0, 0)),
			"green" => Ok(Color(0, 128, 0)),
			"blue" => Ok(Color(0, 0, 255)),
			other => Err(InvalidValue::new(format!("unknown color name '{other}'"))),
		}
	}
}

converter_plugin!(hex_color, Color, HexColor, priority: 150);
converter_plugin!(named_color, Color, NamedColor);

#[derive(Debug, Clone, PartialEq)]
struct Label(String);

impl Introspect for Label {
	fn describe() -> TypeDescriptor<Self> {
		TypeDescriptor::new().construct_from_string()
	}
}

impl From<String> for Label {
	fn from(value: String) -> Self {
		Self(value)
	}
}

implicit_type!(Label);

#[allow(dead_code)]
struct Opaque;

fn plugin_id(name: &str) -> String {
	format!("{}::{name}", module_path!())
}

fn discovering(config: ConvertConfig) -> Converters {
	Converters::builder().config(config).discover_plugins().build()
}

#[test]
fn discovered_plugins_are_sorted_by_id() {
	let ids: Vec<&str> = plugin::discovered().iter().map(|p| p.id).collect();
	assert_eq!(ids, vec![plugin_id("hex_color"), plugin_id("named_color")]);
}

#[test]
fn highest_priority_plugin_serves_the_type() {
	let converters = discovering(ConvertConfig::default());

	assert_eq!(converters.convert::<Color>("#FF0000").unwrap(), Color(255, 0, 0));
	let err = converters.convert::<Color>("red").unwrap_err();
	assert!(err.is_malformed());

	let hex = plugin_id("hex_color");
	let resolved = converters.resolve::<Color>().unwrap();
	assert_eq!(resolved.path(), ResolutionPath::Registered {
		source: ConverterSource::Plugin(plugin::discovered()[0].id),
		priority: Priority::new(150),
	});
	assert_eq!(converters.installed_plugins()[0].id, hex);
}

#[test]
fn plugin_without_priority_installs_at_default() {
	let converters = discovering(ConvertConfig::default());
	let named = converters
		.installed_plugins()
		.iter()
		.find(|p| p.id == plugin_id("named_color"))
		.unwrap();
	assert_eq!(named.priority, Priority::DEFAULT);
	assert_eq!(named.target, TargetType::of::<Color>());
}

#[test]
fn disabled_plugin_is_not_installed() {
	let config = ConvertConfig::from_toml_str(&format!(
		"[plugins]\ndisabled = [\"{}\"]\n",
		plugin_id("hex_color")
	))
	.unwrap();
	let converters = discovering(config);

	assert_eq!(converters.installed_plugins().len(), 1);
	assert_eq!(converters.convert::<Color>("red").unwrap(), Color(255, 0, 0));
	assert!(converters.convert::<Color>("#FF0000").unwrap_err().is_malformed());
}

#[test]
fn configured_priority_overrides_declared_one() {
	let config = ConvertConfig::from_toml_str(&format!(
		"[plugins.priority]\n\"{}\" = 250\n",
		plugin_id("named_color")
	))
	.unwrap();
	let converters = discovering(config);

	assert_eq!(converters.convert::<Color>("blue").unwrap(), Color(0, 0, 255));
	let entries = converters.registry().entries::<Color>();
	assert_eq!(entries.iter().map(|e| e.priority.get()).collect::<Vec<_>>(), vec![250, 150]);
}

#[test]
fn unknown_plugin_ids_in_config_are_tolerated() {
	let config = ConvertConfig::from_toml_str("[plugins]\ndisabled = [\"nowhere::missing\"]\n").unwrap();
	let converters = discovering(config);
	assert_eq!(converters.installed_plugins().len(), 2);
}

#[test]
fn deregister_all_removes_plugin_converters() {
	let converters = discovering(ConvertConfig::default());
	assert_eq!(converters.deregister_all::<Color>(), 2);
	assert!(converters.convert::<Color>("#FF0000").unwrap_err().is_no_converter());
}

#[test]
fn plugins_need_discovery() {
	let err = Converters::new().convert::<Color>("#FF0000").unwrap_err();
	assert!(matches!(err, ConversionError::NoConverter { .. }));
}

#[test]
fn submitted_descriptor_enables_implicit_conversion() {
	let converters = Converters::new();
	assert_eq!(converters.convert::<Label>("release").unwrap(), Label("release".into()));
	assert_eq!(converters.resolve::<Label>().unwrap().path(), ResolutionPath::CachedImplicit);
	assert!(converters.catalog().contains(TargetType::of::<Label>()));
}

#[test]
fn absent_value_never_reaches_plugins() {
	let converters = discovering(ConvertConfig::default());
	assert_eq!(converters.convert_to::<Color>(None).unwrap(), None);
	assert_eq!(converters.convert_to::<Opaque>(None).map(|v| v.is_none()).ok(), Some(true));
}

#[test]
fn type_without_any_converter_reports_no_converter() {
	let err = discovering(ConvertConfig::default())
		.convert_to::<Opaque>(Some("anything"))
		.map(|_| ())
		.unwrap_err();
	assert_eq!(err.error_code(), "NO_CONVERTER");
	assert_eq!(err.to_string(), format!("no converter available for type {}", TargetType::of::<Opaque>()));
}

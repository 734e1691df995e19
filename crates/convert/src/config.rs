//! Configuration of the conversion subsystem.
//!
//! Format-neutral structures deserialized from TOML. Reading the file is the
//! caller's job; this module only parses text that was already loaded.
//!
//! ```toml
//! [plugins]
//! disabled = ["my_crate::color::hex_color"]
//!
//! [plugins.priority]
//! "my_crate::color::rgb_color" = 250
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::priority::Priority;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
	pub plugins: PluginsConfig,
}

/// Controls which discovered plugins get installed and at what priority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PluginsConfig {
	/// Plugin ids that are never installed.
	pub disabled: Vec<String>,
	/// Per-plugin priority, replacing the declared one.
	pub priority: BTreeMap<String, i32>,
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to parse conversion config: {0}")]
	Parse(#[from] toml::de::Error),

	#[error("plugin '{id}' is both disabled and given a priority")]
	Conflicting { id: String },
}

impl ConvertConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		match self.plugins.disabled.iter().find(|id| self.plugins.priority.contains_key(*id)) {
			Some(id) => Err(ConfigError::Conflicting { id: id.clone() }),
			None => Ok(()),
		}
	}

	pub fn is_disabled(&self, plugin_id: &str) -> bool {
		self.plugins.disabled.iter().any(|id| id == plugin_id)
	}

	pub fn priority_override(&self, plugin_id: &str) -> Option<Priority> {
		self.plugins.priority.get(plugin_id).copied().map(Priority::new)
	}

	/// Every plugin id mentioned anywhere in the configuration.
	pub fn referenced_plugins(&self) -> impl Iterator<Item = &str> {
		self.plugins
			.disabled
			.iter()
			.chain(self.plugins.priority.keys())
			.map(String::as_str)
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered generator configuration: defaults, TOML file, environment and
//! command line.
//!
//! Environment variables follow `DOCDB_GEN_<FIELD>`.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::ConfigError;

pub const ENV_PERMISSIONS_ENABLED: &str = "DOCDB_GEN_PERMISSIONS_ENABLED";
pub const ENV_BUILTIN_PERMISSIONS: &str = "DOCDB_GEN_BUILTIN_PERMISSIONS";
pub const ENV_DROP_ON_ERROR: &str = "DOCDB_GEN_DROP_ON_ERROR";
pub const ENV_LOG_LEVEL: &str = "DOCDB_GEN_LOG_LEVEL";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GenConfigLayer {
	pub permissions_enabled: Option<bool>,
	pub builtin_permissions: Option<PathBuf>,
	pub drop_on_error: Option<bool>,
	pub log_level: Option<String>,
}

impl GenConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.permissions_enabled.is_some() {
			self.permissions_enabled = other.permissions_enabled;
		}
		if other.builtin_permissions.is_some() {
			self.builtin_permissions = other.builtin_permissions;
		}
		if other.drop_on_error.is_some() {
			self.drop_on_error = other.drop_on_error;
		}
		if other.log_level.is_some() {
			self.log_level = other.log_level;
		}
	}

	pub fn finalize(self) -> GenConfig {
		GenConfig {
			permissions_enabled: self.permissions_enabled,
			builtin_permissions: self.builtin_permissions,
			drop_on_error: self.drop_on_error.unwrap_or(true),
			log_level: self.log_level.unwrap_or_else(|| "info".to_string()),
		}
	}
}

/// Fully resolved generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenConfig {
	/// Overrides `permissionsEnabled` from the built-in permissions file.
	pub permissions_enabled: Option<bool>,
	/// JSON engine configuration seeded before loading.
	pub builtin_permissions: Option<PathBuf>,
	/// Remove the output image when the build fails.
	pub drop_on_error: bool,
	pub log_level: String,
}

impl Default for GenConfig {
	fn default() -> Self {
		GenConfigLayer::default().finalize()
	}
}

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
	CommandLine = 90,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<GenConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<GenConfigLayer, ConfigError> {
		Ok(GenConfigLayer::default())
	}
}

/// TOML file source. A missing file contributes nothing.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<GenConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(GenConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: GenConfigLayer = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: self.path.clone(),
			source: e,
		})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
pub struct EnvSource {
	vars: Option<HashMap<String, String>>,
}

impl EnvSource {
	/// Reads the process environment.
	pub fn process() -> Self {
		Self { vars: None }
	}

	/// Reads from a fixed set of variables instead of the process
	/// environment.
	pub fn from_vars<I, K, V>(vars: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			vars: Some(
				vars
					.into_iter()
					.map(|(k, v)| (k.into(), v.into()))
					.collect(),
			),
		}
	}

	fn var(&self, name: &str) -> Option<String> {
		let value = match &self.vars {
			Some(vars) => vars.get(name).cloned(),
			None => std::env::var(name).ok(),
		};
		value.filter(|s| !s.is_empty())
	}

	fn bool_var(&self, name: &str) -> Result<Option<bool>, ConfigError> {
		self.var(name).map(|v| parse_bool(name, &v)).transpose()
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<GenConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(GenConfigLayer {
			permissions_enabled: self.bool_var(ENV_PERMISSIONS_ENABLED)?,
			builtin_permissions: self.var(ENV_BUILTIN_PERMISSIONS).map(PathBuf::from),
			drop_on_error: self.bool_var(ENV_DROP_ON_ERROR)?,
			log_level: self.var(ENV_LOG_LEVEL),
		})
	}
}

/// Values given on the command line.
pub struct CliSource(pub GenConfigLayer);

impl ConfigSource for CliSource {
	fn name(&self) -> &'static str {
		"command-line"
	}

	fn precedence(&self) -> Precedence {
		Precedence::CommandLine
	}

	fn load(&self) -> Result<GenConfigLayer, ConfigError> {
		Ok(self.0.clone())
	}
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
	match value.to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(ConfigError::invalid_value(
			key,
			format!("invalid boolean value '{value}'"),
		)),
	}
}

/// Merges `sources` in precedence order and resolves the result.
pub fn load_config(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<GenConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = GenConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	Ok(merged.finalize())
}

/// Standard source stack: defaults, optional config file, process
/// environment, then the command line.
pub fn load_config_with_cli(
	config_path: Option<PathBuf>,
	cli: GenConfigLayer,
) -> Result<GenConfig, ConfigError> {
	let mut sources: Vec<Box<dyn ConfigSource>> =
		vec![Box::new(DefaultsSource), Box::new(EnvSource::process())];
	if let Some(path) = config_path {
		sources.push(Box::new(TomlSource::new(path)));
	}
	sources.push(Box::new(CliSource(cli)));

	load_config(sources)
}

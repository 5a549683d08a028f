//! The configuration record and its file loaders.
//!
//! A config file always contains the full shape of [`Configuration`]; loading one replaces
//! the defaults outright. Missing fields fall back to their defaults and unknown fields
//! are rejected.
//!
//! # Example TOML
//! ```toml
//! [server]
//! bind_host = "127.0.0.1"
//! bind_port = 9000
//! url_host_port = "maps.example.org"
//!
//! [providers]
//! data = "data/world.gpkg"
//! ```

use crate::BootstrapError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

/// Port used when no layer supplies one.
pub const DEFAULT_BIND_PORT: u16 = 8080;

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
	/// HTTP server configuration
	#[serde(default)]
	pub server: ServerConfig,

	/// Data provider configuration
	#[serde(default)]
	pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct ServerConfig {
	/// Interface to listen on. Empty means all interfaces.
	pub bind_host: String,

	/// TCP port to listen on.
	pub bind_port: u16,

	/// `host:port` used when generating result URLs.
	/// Empty means the host of the inbound request is used.
	pub url_host_port: String,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			bind_host: String::new(),
			bind_port: DEFAULT_BIND_PORT,
			url_host_port: String::new(),
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct ProvidersConfig {
	/// Path to a GeoPackage file or a PostGIS connection string.
	pub data: String,
}

enum FileFormat {
	Toml,
	Yaml,
}

impl FileFormat {
	fn from_path(path: &Path) -> Self {
		let extension = path
			.extension()
			.unwrap_or_default()
			.to_string_lossy()
			.to_ascii_lowercase();
		match extension.as_str() {
			"yml" | "yaml" => FileFormat::Yaml,
			_ => FileFormat::Toml,
		}
	}
}

impl Configuration {
	pub fn from_toml_str(text: &str) -> Result<Self> {
		Ok(toml::from_str(text)?)
	}

	pub fn from_yaml_str(text: &str) -> Result<Self> {
		Ok(serde_yaml_ng::from_str(text)?)
	}

	/// Load a configuration file. `.yml`/`.yaml` files are parsed as YAML, everything else as TOML.
	pub fn from_path(path: &Path) -> Result<Self, BootstrapError> {
		Self::read_path(path).map_err(|cause| BootstrapError::ConfigLoad {
			path: path.to_path_buf(),
			cause,
		})
	}

	fn read_path(path: &Path) -> Result<Self> {
		log::debug!("load config {path:?}");

		let text = fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
		match FileFormat::from_path(path) {
			FileFormat::Toml => Self::from_toml_str(&text),
			FileFormat::Yaml => Self::from_yaml_str(&text),
		}
	}
}

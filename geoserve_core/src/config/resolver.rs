//! Ordered merge of the configuration layers.
//!
//! 1. defaults, or the config file if one is given (a broken file is fatal)
//! 2. `GEOSERVE_*` environment variables (a malformed value is logged and skipped)
//! 3. command line flags

use super::{CliOverrides, Configuration, process_env};
use crate::BootstrapError;
use std::{ffi::OsString, path::PathBuf};

#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
	config_file: Option<PathBuf>,
	env_vars: Vec<(String, OsString)>,
	cli: CliOverrides,
}

impl ConfigResolver {
	pub fn new(cli: CliOverrides) -> Self {
		Self {
			cli,
			..Self::default()
		}
	}

	pub fn with_config_file(mut self, config_file: Option<PathBuf>) -> Self {
		self.config_file = config_file;
		self
	}

	pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<OsString>,
	{
		self.env_vars = vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
		self
	}

	/// Use the `GEOSERVE_*` variables of the running process.
	pub fn with_process_env(self) -> Self {
		self.with_env_vars(process_env())
	}

	pub fn resolve(self) -> Result<Configuration, BootstrapError> {
		let mut config = match &self.config_file {
			Some(path) => Configuration::from_path(path)?,
			None => Configuration::default(),
		};

		let env_vars = self.env_vars.iter().map(|(k, v)| (k.as_str(), v.as_os_str()));
		if let Err(err) = config.server.overlay_env(env_vars) {
			log::warn!("error while reading environment configs: {err}");
		}

		config.apply_cli(&self.cli);

		log::debug!("resolved configuration: {config:?}");
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_fs::{NamedTempFile, prelude::*};
	use pretty_assertions::assert_eq;

	fn config_file(content: &str) -> NamedTempFile {
		let file = NamedTempFile::new("geoserve.toml").unwrap();
		file.write_str(content).unwrap();
		file
	}

	#[test]
	fn defaults_without_any_layer() -> Result<(), BootstrapError> {
		let config = ConfigResolver::new(CliOverrides::default()).resolve()?;
		assert_eq!(config, Configuration::default());
		assert_eq!(config.server.bind_port, 8080);
		assert_eq!(config.server.bind_host, "");
		assert_eq!(config.server.url_host_port, "");
		assert_eq!(config.providers.data, "");
		Ok(())
	}

	#[test]
	fn environment_beats_file() -> Result<(), BootstrapError> {
		let file = config_file("[server]\nurl_host_port = \"file.example.org\"\n");
		let config = ConfigResolver::new(CliOverrides::default())
			.with_config_file(Some(file.path().to_path_buf()))
			.with_env_vars([("GEOSERVE_URL_HOST_PORT", "env.example.org")])
			.resolve()?;
		assert_eq!(config.server.url_host_port, "env.example.org");
		Ok(())
	}

	#[test]
	fn command_line_beats_environment_and_file() -> Result<(), BootstrapError> {
		let file = config_file("[server]\nurl_host_port = \"file.example.org\"\n");
		let config = ConfigResolver::new(CliOverrides {
			url_host_port: String::from("cli.example.org"),
			..CliOverrides::default()
		})
		.with_config_file(Some(file.path().to_path_buf()))
		.with_env_vars([("GEOSERVE_URL_HOST_PORT", "env.example.org")])
		.resolve()?;
		assert_eq!(config.server.url_host_port, "cli.example.org");
		Ok(())
	}

	#[test]
	fn empty_command_line_values_keep_earlier_layers() -> Result<(), BootstrapError> {
		let file = config_file("[providers]\ndata = \"from-file.gpkg\"\n");
		let config = ConfigResolver::new(CliOverrides::default())
			.with_config_file(Some(file.path().to_path_buf()))
			.resolve()?;
		assert_eq!(config.providers.data, "from-file.gpkg");
		Ok(())
	}

	#[test]
	fn command_line_port_overrides_file_and_environment() -> Result<(), BootstrapError> {
		let file = config_file("[server]\nbind_host = \"10.0.0.1\"\nbind_port = 9000\n");
		let config = ConfigResolver::new(CliOverrides::default())
			.with_config_file(Some(file.path().to_path_buf()))
			.with_env_vars([("GEOSERVE_BIND_PORT", "9100")])
			.resolve()?;
		assert_eq!(config.server.bind_host, "");
		assert_eq!(config.server.bind_port, 8080);
		Ok(())
	}

	#[test]
	fn malformed_environment_is_not_fatal() -> Result<(), BootstrapError> {
		let file = config_file("[server]\nurl_host_port = \"file.example.org\"\n");
		let config = ConfigResolver::new(CliOverrides::default())
			.with_config_file(Some(file.path().to_path_buf()))
			.with_env_vars([
				("GEOSERVE_URL_HOST_PORT", "env.example.org"),
				("GEOSERVE_BIND_PORT", "not-a-port"),
			])
			.resolve()?;
		assert_eq!(config.server.url_host_port, "file.example.org");
		Ok(())
	}

	#[cfg(unix)]
	#[test]
	fn non_unicode_environment_is_not_fatal() -> Result<(), BootstrapError> {
		use std::os::unix::ffi::OsStrExt;

		let config = ConfigResolver::new(CliOverrides::default())
			.with_env_vars([
				("GEOSERVE_URL_HOST_PORT", OsString::from("env.example.org")),
				("GEOSERVE_BIND_HOST", std::ffi::OsStr::from_bytes(b"\xfe").to_os_string()),
			])
			.resolve()?;
		assert_eq!(config.server.url_host_port, "");
		Ok(())
	}

	#[test]
	fn broken_config_file_is_fatal() {
		let file = config_file("[server\n");
		let err = ConfigResolver::new(CliOverrides::default())
			.with_config_file(Some(file.path().to_path_buf()))
			.resolve()
			.unwrap_err();
		assert!(matches!(err, BootstrapError::ConfigLoad { .. }));
	}
}

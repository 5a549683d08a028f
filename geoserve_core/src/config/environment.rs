//! Overlay of `GEOSERVE_*` environment variables onto the server section.
//!
//! | variable                 | field                  |
//! |--------------------------|------------------------|
//! | `GEOSERVE_BIND_HOST`     | `server.bind_host`     |
//! | `GEOSERVE_BIND_PORT`     | `server.bind_port`     |
//! | `GEOSERVE_URL_HOST_PORT` | `server.url_host_port` |
//!
//! Unset variables leave their field untouched. Other `GEOSERVE_` variables are ignored.
//! A known variable whose value is not valid unicode is malformed like an unparsable port.

use super::ServerConfig;
use crate::BootstrapError;
use std::{
	env,
	ffi::{OsStr, OsString},
};

pub const ENV_PREFIX: &str = "GEOSERVE_";

/// All variables of the current process that start with [`ENV_PREFIX`].
///
/// Values are kept as raw OS strings, so that [`ServerConfig::overlay_env`] can report
/// values that are not valid unicode.
pub fn process_env() -> Vec<(String, OsString)> {
	env::vars_os()
		.filter_map(|(key, value)| Some((key.into_string().ok()?, value)))
		.filter(|(key, _)| key.starts_with(ENV_PREFIX))
		.collect()
}

fn unicode_value<'a>(variable: &str, value: &'a OsStr) -> Result<&'a str, BootstrapError> {
	value.to_str().ok_or_else(|| BootstrapError::EnvOverlay {
		variable: variable.to_string(),
		value: value.to_string_lossy().to_string(),
		reason: String::from("value is not valid unicode"),
	})
}

impl ServerConfig {
	/// Overlay environment variables onto this section.
	///
	/// Either every variable is applied or, if one of them is malformed, none is.
	pub fn overlay_env<I, K, V>(&mut self, vars: I) -> Result<(), BootstrapError>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<OsStr>,
	{
		let mut next = self.clone();

		for (key, value) in vars {
			let (key, value) = (key.as_ref(), value.as_ref());
			let Some(field) = key.strip_prefix(ENV_PREFIX) else {
				continue;
			};

			match field {
				"BIND_HOST" => next.bind_host = unicode_value(key, value)?.to_string(),
				"BIND_PORT" => {
					let value = unicode_value(key, value)?;
					next.bind_port = value.trim().parse().map_err(|err| BootstrapError::EnvOverlay {
						variable: key.to_string(),
						value: value.to_string(),
						reason: format!("{err}"),
					})?;
				}
				"URL_HOST_PORT" => next.url_host_port = unicode_value(key, value)?.to_string(),
				_ => log::debug!("ignoring unknown environment variable {key}"),
			}
		}

		*self = next;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn base() -> ServerConfig {
		ServerConfig {
			bind_host: String::from("10.0.0.1"),
			bind_port: 9000,
			url_host_port: String::from("file.example.org"),
		}
	}

	#[test]
	fn overlays_known_variables() -> Result<(), BootstrapError> {
		let mut server = base();
		server.overlay_env([
			("GEOSERVE_BIND_HOST", "127.0.0.1"),
			("GEOSERVE_BIND_PORT", "9100"),
			("GEOSERVE_URL_HOST_PORT", "env.example.org:80"),
		])?;
		assert_eq!(
			server,
			ServerConfig {
				bind_host: String::from("127.0.0.1"),
				bind_port: 9100,
				url_host_port: String::from("env.example.org:80"),
			}
		);
		Ok(())
	}

	#[test]
	fn unset_variables_keep_values() -> Result<(), BootstrapError> {
		let mut server = base();
		server.overlay_env([("GEOSERVE_BIND_PORT", " 9200 ")])?;
		assert_eq!(server.bind_host, "10.0.0.1");
		assert_eq!(server.bind_port, 9200);
		assert_eq!(server.url_host_port, "file.example.org");
		Ok(())
	}

	#[test]
	fn foreign_and_unknown_variables_are_ignored() -> Result<(), BootstrapError> {
		let mut server = base();
		server.overlay_env([("PATH", "/usr/bin"), ("BIND_PORT", "1"), ("GEOSERVE_VERBOSE", "1")])?;
		assert_eq!(server, base());
		Ok(())
	}

	#[test]
	fn malformed_value_keeps_all_previous_values() {
		let mut server = base();
		let err = server
			.overlay_env([("GEOSERVE_BIND_HOST", "127.0.0.1"), ("GEOSERVE_BIND_PORT", "eighty")])
			.unwrap_err();
		assert!(matches!(err, BootstrapError::EnvOverlay { ref variable, .. } if variable == "GEOSERVE_BIND_PORT"));
		assert_eq!(server, base());
	}

	#[test]
	fn port_out_of_range() {
		let mut server = base();
		assert!(server.overlay_env([("GEOSERVE_BIND_PORT", "65536")]).is_err());
		assert_eq!(server.bind_port, 9000);
	}

	#[cfg(unix)]
	#[test]
	fn non_unicode_value_keeps_all_previous_values() {
		use std::os::unix::ffi::OsStrExt;

		let mut server = base();
		let err = server
			.overlay_env([
				("GEOSERVE_BIND_PORT", OsStr::new("9100")),
				("GEOSERVE_URL_HOST_PORT", OsStr::from_bytes(b"maps\xff.example.org")),
			])
			.unwrap_err();
		assert!(matches!(err, BootstrapError::EnvOverlay { ref variable, .. } if variable == "GEOSERVE_URL_HOST_PORT"));
		assert!(err.to_string().contains("value is not valid unicode"));
		assert_eq!(server, base());
	}

	#[test]
	fn process_env_only_returns_prefixed_variables() {
		assert!(process_env().iter().all(|(key, _)| key.starts_with(ENV_PREFIX)));
	}
}

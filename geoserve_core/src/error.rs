//! Errors raised while bootstrapping the server.
//!
//! Every variant except [`BootstrapError::EnvOverlay`] is fatal: the binary propagates it
//! out of `main` and terminates without starting the server. `EnvOverlay` is logged by
//! the resolver and the previous configuration values are kept.

use crate::ProviderKind;
use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootstrapError {
	/// The config file could not be read or parsed.
	#[error("failed to load config file '{}': {cause:#}", path.display())]
	ConfigLoad { path: PathBuf, cause: anyhow::Error },

	/// An environment variable carried a value that does not fit its field.
	#[error("invalid value '{value}' in environment variable {variable}: {reason}")]
	EnvOverlay {
		variable: String,
		value: String,
		reason: String,
	},

	/// The working directory is needed to absolutize a relative data source.
	#[error("failed to determine the working directory: {0}")]
	PathResolution(#[source] io::Error),

	#[error("no data source configured and no *.gpkg file found in {}", format_dirs(searched))]
	NoDataSource { searched: Vec<PathBuf> },

	#[error("no data provider registered for data sources of kind '{0}'")]
	UnregisteredProvider(ProviderKind),

	#[error("data provider auto-config failure for '{data_source}': {cause:#}")]
	AutoConfig { data_source: String, cause: anyhow::Error },

	#[error("data provider creation error for '{data_source}': {cause:#}")]
	ProviderConstruction { data_source: String, cause: anyhow::Error },
}

fn format_dirs(dirs: &[PathBuf]) -> String {
	dirs
		.iter()
		.map(|dir| format!("'{}'", dir.display()))
		.collect::<Vec<_>>()
		.join(", ")
}

#[cfg(test)]
mod tests {
	use super::*;
	use anyhow::anyhow;

	#[test]
	fn messages_name_the_data_source_and_cause() {
		let err = BootstrapError::AutoConfig {
			data_source: String::from("/data/world.gpkg"),
			cause: anyhow!("no such table: gpkg_contents"),
		};
		assert_eq!(
			err.to_string(),
			"data provider auto-config failure for '/data/world.gpkg': no such table: gpkg_contents"
		);

		let err = BootstrapError::ProviderConstruction {
			data_source: String::from("host=db"),
			cause: anyhow!("pool closed").context("opening pool"),
		};
		assert_eq!(
			err.to_string(),
			"data provider creation error for 'host=db': opening pool: pool closed"
		);
	}

	#[test]
	fn no_data_source_lists_searched_directories() {
		let err = BootstrapError::NoDataSource {
			searched: vec![PathBuf::from("/srv"), PathBuf::from("/srv/data")],
		};
		assert_eq!(
			err.to_string(),
			"no data source configured and no *.gpkg file found in '/srv', '/srv/data'"
		);
	}
}

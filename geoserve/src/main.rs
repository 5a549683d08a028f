mod server;

use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use geoserve_core::{CliOverrides, ConfigResolver, DEFAULT_BIND_PORT};
use geoserve_provider::ProviderBootstrapper;
use server::FeatureServer;
use std::{path::PathBuf, sync::Arc};
use tokio::time::{Duration, sleep};

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about,
	long_about = None,
	disable_help_subcommand = true,
)]
struct Cli {
	/// Interface to listen on. Empty means all interfaces.
	#[arg(short = 'b', long, default_value = "", hide_default_value = true, display_order = 0)]
	bind_host: String,

	/// Port to listen on.
	#[arg(short = 'p', long, default_value_t = DEFAULT_BIND_PORT, display_order = 0)]
	port: u16,

	/// "host:port" used to generate result URLs.
	/// Empty means the Host header of each request is used.
	#[arg(short = 's', long, default_value = "", hide_default_value = true, display_order = 1)]
	serve_address: String,

	/// Path to a GeoPackage or a PostGIS connection string.
	/// Empty means the first *.gpkg in ".", "data/" or "test_data/" is used.
	#[arg(short = 'd', long, default_value = "", hide_default_value = true, display_order = 1)]
	data_source: String,

	/// Configuration file (TOML, or YAML for *.yml/*.yaml). Empty means none.
	/// Environment variables (GEOSERVE_*) and command line arguments override it.
	#[arg(short = 'c', long, value_name = "FILE", default_value = "", hide_default_value = true, display_order = 2)]
	config: String,

	/// Shutdown server automatically after x milliseconds.
	#[arg(long, value_name = "MILLISECONDS", display_order = 3)]
	auto_shutdown: Option<u64>,

	#[command(flatten)]
	verbose: Verbosity<WarnLevel>,
}

impl Cli {
	fn overrides(&self) -> CliOverrides {
		CliOverrides {
			bind_host: self.bind_host.clone(),
			bind_port: self.port,
			url_host_port: self.serve_address.clone(),
			data_source: self.data_source.clone(),
		}
	}

	fn config_file(&self) -> Option<PathBuf> {
		(!self.config.is_empty()).then(|| PathBuf::from(&self.config))
	}
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	run(cli)
}

#[tokio::main]
async fn run(cli: Cli) -> Result<()> {
	let mut config = ConfigResolver::new(cli.overrides())
		.with_config_file(cli.config_file())
		.with_process_env()
		.resolve()?;

	let provider = ProviderBootstrapper::default().bootstrap(&mut config)?;

	let mut server = FeatureServer::new(Arc::new(config), provider);
	server.start().await?;

	match cli.auto_shutdown {
		Some(milliseconds) => sleep(Duration::from_millis(milliseconds)).await,
		None => tokio::signal::ctrl_c().await?,
	}

	server.stop().await;

	Ok(())
}

#[cfg(test)]
mod tests {
	use crate::{Cli, run};
	use anyhow::Result;
	use assert_fs::TempDir;
	use clap::Parser;
	use geoserve_provider::testing::create_geopackage;
	use std::path::PathBuf;

	pub fn run_command(arg_vec: Vec<&str>) -> Result<String> {
		let cli = Cli::try_parse_from(arg_vec)?;
		let msg = format!("{:?}", cli);
		run(cli)?;
		Ok(msg)
	}

	#[test]
	fn help() {
		let err = run_command(vec!["geoserve", "--help"]).unwrap_err().to_string();
		assert!(err.starts_with("Bootstraps a geospatial feature server"));
		assert!(err.contains("\nUsage: geoserve [OPTIONS]"));
		assert!(err.contains("--data-source <DATA_SOURCE>"));
		assert!(err.contains("--serve-address <SERVE_ADDRESS>"));
	}

	#[test]
	fn version() {
		let err = run_command(vec!["geoserve", "-V"]).unwrap_err().to_string();
		assert!(err.starts_with("geoserve "));
	}

	#[test]
	fn empty_config_path_means_no_config_file() -> Result<()> {
		let cli = Cli::try_parse_from(["geoserve", "-c", ""])?;
		assert_eq!(cli.config_file(), None);

		let cli = Cli::try_parse_from(["geoserve", "-c", "geoserve.toml"])?;
		assert_eq!(cli.config_file(), Some(PathBuf::from("geoserve.toml")));

		let cli = Cli::try_parse_from(["geoserve"])?;
		assert_eq!(cli.config_file(), None);
		Ok(())
	}

	#[test]
	fn invalid_port() {
		assert!(run_command(vec!["geoserve", "-p", "65536"]).is_err());
	}

	#[test]
	fn serve_geopackage() -> Result<()> {
		let dir = TempDir::new()?;
		let path = dir.path().join("world.gpkg");
		create_geopackage(&path, &["roads"])?;

		run_command(vec![
			"geoserve",
			"-b",
			"127.0.0.1",
			"-p",
			"0",
			"--auto-shutdown",
			"200",
			"-d",
			path.to_str().unwrap(),
		])?;
		Ok(())
	}

	#[test]
	fn missing_file_is_fatal() {
		let err = run_command(vec!["geoserve", "-p", "0", "-d", "/does/not/exist.gpkg"]).unwrap_err();
		assert_eq!(
			err.to_string(),
			"data provider auto-config failure for '/does/not/exist.gpkg': parsing PostGIS connection string: '/does/not/exist.gpkg' is not a key=value pair"
		);
	}
}

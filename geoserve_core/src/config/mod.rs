//! geoserve configuration system.
//!
//! - [`Configuration`]: the record with its `server` and `providers` sections and the
//!   file loaders (TOML or YAML)
//! - [`ServerConfig::overlay_env`]: overlay of `GEOSERVE_*` environment variables
//! - [`CliOverrides`]: the values parsed from the command line
//! - [`ConfigResolver`]: applies file, environment and command line in increasing precedence

mod command_line;
mod configuration;
mod environment;
mod resolver;

pub use command_line::CliOverrides;
pub use configuration::{Configuration, DEFAULT_BIND_PORT, ProvidersConfig, ServerConfig};
pub use environment::{ENV_PREFIX, process_env};
pub use resolver::ConfigResolver;

//! Shared building blocks of the geoserve bootstrap.
//!
//! - [`Configuration`]: the resolved server/provider configuration record
//! - [`ConfigResolver`]: merges config file, environment and command line in that order
//! - [`BootstrapError`]: every error that can abort the startup sequence
//! - [`Dict`] and [`Dicter`]: the key/value settings passed from auto-configuration to
//!   provider construction
//! - [`ProviderKind`]: whether a data source is a file or a database connection

pub mod config;
pub use config::*;

mod dict;
pub use dict::*;

mod error;
pub use error::*;

mod kind;
pub use kind::*;

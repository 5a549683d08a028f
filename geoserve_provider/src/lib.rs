//! geoserve provider: turn a data-source descriptor into a live feature provider.
//!
//! The pieces, in the order the bootstrap uses them:
//! - [`DataSourceClassifier`]: absolutizes the descriptor, decides between file path and
//!   connection string, or discovers a default GeoPackage
//! - [`ProviderRegistry`]: maps each [`ProviderKind`](geoserve_core::ProviderKind) to a
//!   [`ProviderFactory`]
//! - [`ProviderFactory`]: auto-configures settings from the descriptor, then constructs the
//!   [`FeatureProvider`]
//! - [`ProviderBootstrapper`]: runs the whole sequence and writes the resolved descriptor
//!   back into the configuration
//!
//! # Quick start
//! ```rust,no_run
//! use geoserve_core::{CliOverrides, ConfigResolver};
//! use geoserve_provider::ProviderBootstrapper;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut config = ConfigResolver::new(CliOverrides::default()).with_process_env().resolve()?;
//! let provider = ProviderBootstrapper::default().bootstrap(&mut config)?;
//! println!("serving {} layers from {}", provider.layers().len(), config.providers.data);
//! # Ok(())
//! # }
//! ```

mod bootstrap;
pub use bootstrap::*;

mod data_source;
pub use data_source::*;

mod factories;
pub use factories::*;

mod provider;
pub use provider::*;

mod registry;
pub use registry::*;

#[cfg(any(test, feature = "test"))]
pub mod testing;

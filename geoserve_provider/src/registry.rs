//! `ProviderRegistry` maps each [`ProviderKind`] to the [`ProviderFactory`] that handles it.
//!
//! The default registry knows GeoPackage files and PostGIS connection strings. Custom
//! factories can replace them, which is how tests count auto-config and construction calls.
//!
//! ```rust
//! use geoserve_core::ProviderKind;
//! use geoserve_provider::ProviderRegistry;
//!
//! let registry = ProviderRegistry::default();
//! assert_eq!(registry.get(ProviderKind::FilePath).unwrap().name(), "gpkg");
//! assert_eq!(registry.get(ProviderKind::ConnectionString).unwrap().name(), "postgis");
//! ```

use crate::{FeatureProvider, GeoPackageFactory, PostgisFactory};
use anyhow::Result;
use geoserve_core::{Dict, Dicter, ProviderKind};
use std::{collections::HashMap, sync::Arc};

/// Two-step construction protocol of a provider kind.
///
/// `auto_configure` inspects the raw descriptor and describes the provider as settings;
/// `construct` performs the expensive setup (opening files or connection pools) from them.
pub trait ProviderFactory: Send + Sync {
	fn kind(&self) -> ProviderKind;

	/// Short name, used in logs and as the `type` setting.
	fn name(&self) -> &'static str;

	fn auto_configure(&self, data_source: &str) -> Result<Dict>;

	fn construct(&self, settings: &dyn Dicter) -> Result<Box<dyn FeatureProvider>>;
}

#[derive(Clone)]
pub struct ProviderRegistry {
	factories: HashMap<ProviderKind, Arc<dyn ProviderFactory>>,
}

impl ProviderRegistry {
	pub fn new_empty() -> Self {
		Self {
			factories: HashMap::new(),
		}
	}

	/// Register `factory` for its kind, replacing any previous registration.
	pub fn register<F: ProviderFactory + 'static>(&mut self, factory: F) -> &mut Self {
		self.register_arc(Arc::new(factory))
	}

	pub fn register_arc(&mut self, factory: Arc<dyn ProviderFactory>) -> &mut Self {
		log::debug!("register provider factory '{}' for {}", factory.name(), factory.kind());
		self.factories.insert(factory.kind(), factory);
		self
	}

	pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn ProviderFactory>> {
		self.factories.get(&kind).cloned()
	}
}

impl Default for ProviderRegistry {
	fn default() -> Self {
		let mut registry = Self::new_empty();
		registry.register(GeoPackageFactory);
		registry.register(PostgisFactory);
		registry
	}
}

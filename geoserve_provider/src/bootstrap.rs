//! The provider bootstrap: classify the configured data source, auto-configure the
//! matching provider kind and construct exactly one provider.

use crate::{DataSourceClassifier, FeatureProvider, ProviderRegistry};
use geoserve_core::{BootstrapError, Configuration};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct ProviderBootstrapper {
	registry: ProviderRegistry,
	classifier: DataSourceClassifier,
}

impl ProviderBootstrapper {
	pub fn new(registry: ProviderRegistry, classifier: DataSourceClassifier) -> Self {
		Self { registry, classifier }
	}

	/// Turn `config.providers.data` into a live provider.
	///
	/// The resolved descriptor (absolute path or connection string) is written back into
	/// `config.providers.data` before the provider is auto-configured. The factory's
	/// `construct` is called once, and only when `auto_configure` succeeded.
	pub fn bootstrap(&self, config: &mut Configuration) -> Result<Arc<dyn FeatureProvider>, BootstrapError> {
		let source = self.classifier.classify(&config.providers.data)?;
		config.providers.data.clone_from(&source.data_source);

		let factory = self
			.registry
			.get(source.kind)
			.ok_or(BootstrapError::UnregisteredProvider(source.kind))?;
		log::info!("data source is a {}, using the '{}' provider", source.kind, factory.name());

		let settings = factory
			.auto_configure(&source.data_source)
			.map_err(|cause| BootstrapError::AutoConfig {
				data_source: source.data_source.clone(),
				cause,
			})?;
		log::debug!(
			"auto-configured '{}' provider with settings: {}",
			factory.name(),
			settings.keys().collect::<Vec<_>>().join(", ")
		);

		let provider = factory
			.construct(&settings)
			.map_err(|cause| BootstrapError::ProviderConstruction {
				data_source: source.data_source.clone(),
				cause,
			})?;
		log::info!(
			"provider '{}' ready with {} layer(s)",
			provider.name(),
			provider.layers().len()
		);

		Ok(Arc::from(provider))
	}
}

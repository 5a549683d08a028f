//! PostGIS provider for data sources classified as connection strings.
//!
//! Auto-configuration parses the connection string (see [`ConnectionSettings`]) into:
//!
//! ```json
//! {
//!   "type": "postgis", "name": "postgis",
//!   "host": "db", "port": 5432, "database": "world", "user": "gis", "password": "secret",
//!   "sslmode": "require", "max_connections": 10, "layers": []
//! }
//! ```
//!
//! Construction builds a lazily connecting pool, so bootstrap does not wait for the
//! database. It has to run inside a tokio runtime.

mod connection;

pub use connection::*;

use crate::{FeatureProvider, LayerInfo, ProviderFactory};
use anyhow::{Context, Result, anyhow};
use geoserve_core::{Dict, Dicter, ProviderKind};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use std::fmt::{self, Debug};

pub struct PostgisFactory;

impl ProviderFactory for PostgisFactory {
	fn kind(&self) -> ProviderKind {
		ProviderKind::ConnectionString
	}

	fn name(&self) -> &'static str {
		"postgis"
	}

	fn auto_configure(&self, data_source: &str) -> Result<Dict> {
		log::debug!("auto-config PostGIS connection");
		let settings = ConnectionSettings::parse(data_source).context("parsing PostGIS connection string")?;
		Ok(settings.to_dict())
	}

	fn construct(&self, settings: &dyn Dicter) -> Result<Box<dyn FeatureProvider>> {
		Ok(PostgisProvider::open(settings)?.boxed())
	}
}

/// A PostGIS database reached through a `sqlx` connection pool.
pub struct PostgisProvider {
	name: String,
	host: String,
	port: u16,
	database: String,
	user: String,
	pool: PgPool,
	layers: Vec<LayerInfo>,
}

impl PostgisProvider {
	pub fn open(settings: &dyn Dicter) -> Result<Self> {
		tokio::runtime::Handle::try_current().map_err(|_| anyhow!("the PostGIS provider must be created inside a tokio runtime"))?;

		let host = settings.get_string("host")?.unwrap_or_else(|| DEFAULT_HOST.to_string());
		let port = match settings.get_int("port")? {
			Some(port) => u16::try_from(port).with_context(|| format!("invalid port {port}"))?,
			None => DEFAULT_PORT,
		};
		let user = settings.get_string("user")?.unwrap_or_else(|| DEFAULT_USER.to_string());
		let database = settings.get_string("database")?.unwrap_or_else(|| user.clone());
		let max_connections = match settings.get_int("max_connections")? {
			Some(max) => u32::try_from(max).with_context(|| format!("invalid max_connections {max}"))?,
			None => DEFAULT_MAX_CONNECTIONS,
		};

		let mut options = PgConnectOptions::new().port(port).username(&user).database(&database);
		options = if host.starts_with('/') {
			options.socket(&host)
		} else {
			options.host(&host)
		};
		if let Some(password) = settings.get_string("password")? {
			options = options.password(&password);
		}
		if let Some(sslmode) = settings.get_string("sslmode")? {
			let mode = sslmode
				.parse::<PgSslMode>()
				.with_context(|| format!("invalid sslmode '{sslmode}'"))?;
			options = options.ssl_mode(mode);
		}
		if let Some(application_name) = settings.get_string("application_name")? {
			options = options.application_name(&application_name);
		}

		let layers = settings
			.get_dicts("layers")?
			.iter()
			.map(|layer| LayerInfo::from_dict(layer))
			.collect::<Result<Vec<LayerInfo>>>()?;

		log::debug!("open PostGIS pool for {user}@{host}:{port}/{database}");
		let pool = PgPoolOptions::new()
			.max_connections(max_connections)
			.connect_lazy_with(options);

		Ok(Self {
			name: settings.get_string("name")?.unwrap_or_else(|| String::from("postgis")),
			host,
			port,
			database,
			user,
			pool,
			layers,
		})
	}
}

impl FeatureProvider for PostgisProvider {
	fn name(&self) -> &str {
		&self.name
	}

	fn kind(&self) -> ProviderKind {
		ProviderKind::ConnectionString
	}

	fn source(&self) -> String {
		format!("postgres://{}@{}:{}/{}", self.user, self.host, self.port, self.database)
	}

	fn layers(&self) -> &[LayerInfo] {
		&self.layers
	}
}

impl Debug for PostgisProvider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PostgisProvider")
			.field("name", &self.name)
			.field("source", &self.source())
			.field("layers", &self.layers)
			.field("open_connections", &self.pool.size())
			.finish_non_exhaustive()
	}
}

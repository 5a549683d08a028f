//! GeoPackage (SQLite) provider for data sources classified as file paths.
//!
//! Auto-configuration opens the file read-only and lists every feature table registered in
//! `gpkg_contents` together with its geometry column from `gpkg_geometry_columns`:
//!
//! ```json
//! {
//!   "type": "gpkg",
//!   "name": "world",
//!   "filepath": "/data/world.gpkg",
//!   "layers": [
//!     { "name": "roads", "tablename": "roads", "id_fieldname": "fid",
//!       "geometry_fieldname": "geom", "geometry_type": "LINESTRING", "srid": 4326,
//!       "bounds": [-10.0, -5.0, 10.0, 5.0] }
//!   ]
//! }
//! ```
//!
//! Construction opens a connection pool on the file and checks that every configured
//! layer table exists.
//!
//! ## Errors
//! - the path is not absolute or is not a file
//! - the file is not a GeoPackage (no `gpkg_contents` table) or has no feature tables
//! - a configured layer table is missing

use crate::{FeatureProvider, LayerInfo, ProviderFactory};
use anyhow::{Context, Result, ensure};
use geoserve_core::{Dict, Dicter, ProviderKind};
use r2d2::Pool;
use r2d2_sqlite::{
	SqliteConnectionManager,
	rusqlite::{Connection, OpenFlags},
};
use serde_json::Value;
use std::{
	fmt::{self, Debug},
	path::{Path, PathBuf},
};

const FEATURE_LAYERS_SQL: &str = "SELECT c.table_name, g.column_name, g.geometry_type_name, g.srs_id, c.min_x, c.min_y, c.max_x, c.max_y \
	FROM gpkg_contents c JOIN gpkg_geometry_columns g ON c.table_name = g.table_name \
	WHERE c.data_type = 'features' ORDER BY c.table_name";

pub struct GeoPackageFactory;

impl ProviderFactory for GeoPackageFactory {
	fn kind(&self) -> ProviderKind {
		ProviderKind::FilePath
	}

	fn name(&self) -> &'static str {
		"gpkg"
	}

	fn auto_configure(&self, data_source: &str) -> Result<Dict> {
		auto_config(Path::new(data_source))
	}

	fn construct(&self, settings: &dyn Dicter) -> Result<Box<dyn FeatureProvider>> {
		Ok(GeoPackageProvider::open(settings)?.boxed())
	}
}

/// Describe the GeoPackage at the **absolute** `path` as provider settings.
pub fn auto_config(path: &Path) -> Result<Dict> {
	log::debug!("auto-config GeoPackage {path:?}");

	ensure!(path.is_absolute(), "path {path:?} must be absolute");
	ensure!(path.is_file(), "{path:?} is not a file");

	let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX)
		.with_context(|| format!("opening {path:?}"))?;
	let layers = read_feature_layers(&conn).with_context(|| format!("reading feature tables of {path:?}"))?;
	ensure!(!layers.is_empty(), "GeoPackage {path:?} contains no feature tables");

	let mut settings = Dict::new();
	settings
		.set("type", "gpkg")
		.set("name", file_stem(path))
		.set("filepath", path.to_string_lossy().to_string())
		.set(
			"layers",
			layers.iter().map(|layer| Value::from(layer.to_dict())).collect::<Vec<Value>>(),
		);
	Ok(settings)
}

fn read_feature_layers(conn: &Connection) -> Result<Vec<LayerInfo>> {
	let mut stmt = conn.prepare(FEATURE_LAYERS_SQL)?;
	let rows = stmt.query_map([], |row| {
		let table_name: String = row.get(0)?;
		let bounds = match (
			row.get::<_, Option<f64>>(4)?,
			row.get::<_, Option<f64>>(5)?,
			row.get::<_, Option<f64>>(6)?,
			row.get::<_, Option<f64>>(7)?,
		) {
			(Some(min_x), Some(min_y), Some(max_x), Some(max_y)) => Some([min_x, min_y, max_x, max_y]),
			_ => None,
		};
		Ok(LayerInfo {
			name: table_name.clone(),
			table_name,
			id_field: String::from(crate::DEFAULT_ID_FIELD),
			geometry_field: row.get(1)?,
			geometry_type: row.get(2)?,
			srid: row.get(3)?,
			bounds,
		})
	})?;

	Ok(rows.collect::<Result<Vec<LayerInfo>, _>>()?)
}

fn file_stem(path: &Path) -> String {
	path
		.file_stem()
		.map_or_else(|| String::from("gpkg"), |stem| stem.to_string_lossy().to_string())
}

/// A GeoPackage file opened through a read-only connection pool.
pub struct GeoPackageProvider {
	name: String,
	path: PathBuf,
	pool: Pool<SqliteConnectionManager>,
	layers: Vec<LayerInfo>,
}

impl GeoPackageProvider {
	/// Open the provider described by `settings` (see [`auto_config`]).
	pub fn open(settings: &dyn Dicter) -> Result<Self> {
		let path = PathBuf::from(settings.require_string("filepath")?);
		log::debug!("open GeoPackage {path:?}");

		ensure!(path.is_file(), "GeoPackage {path:?} does not exist");

		let layers = settings
			.get_dicts("layers")?
			.iter()
			.map(|layer| LayerInfo::from_dict(layer))
			.collect::<Result<Vec<LayerInfo>>>()?;
		ensure!(!layers.is_empty(), "no layers configured for GeoPackage {path:?}");

		let manager = SqliteConnectionManager::file(&path)
			.with_flags(OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX);
		let pool = Pool::builder()
			.max_size(10)
			.build(manager)
			.with_context(|| format!("opening connection pool for {path:?}"))?;

		let provider = Self {
			name: settings.get_string("name")?.unwrap_or_else(|| file_stem(&path)),
			path,
			pool,
			layers,
		};
		provider.check_layers()?;

		Ok(provider)
	}

	fn check_layers(&self) -> Result<()> {
		let conn = self.pool.get()?;
		for layer in &self.layers {
			let count: i64 = conn.query_row(
				"SELECT count(*) FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1",
				[&layer.table_name],
				|row| row.get(0),
			)?;
			ensure!(
				count > 0,
				"table '{}' of layer '{}' not found in {:?}",
				layer.table_name,
				layer.name,
				self.path
			);
		}
		Ok(())
	}
}

impl FeatureProvider for GeoPackageProvider {
	fn name(&self) -> &str {
		&self.name
	}

	fn kind(&self) -> ProviderKind {
		ProviderKind::FilePath
	}

	fn source(&self) -> String {
		self.path.to_string_lossy().to_string()
	}

	fn layers(&self) -> &[LayerInfo] {
		&self.layers
	}
}

impl Debug for GeoPackageProvider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("GeoPackageProvider")
			.field("name", &self.name)
			.field("path", &self.path)
			.field("layers", &self.layers)
			.finish_non_exhaustive()
	}
}

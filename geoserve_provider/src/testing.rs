//! GeoPackage fixtures shared by the unit tests of this crate and the end-to-end tests of
//! the binary (via the `test` feature).

use anyhow::{Context, Result};
use r2d2_sqlite::rusqlite::{Connection, params};
use std::path::Path;

/// Create a minimal GeoPackage at `path`.
///
/// Every name in `feature_tables` becomes a feature table (`fid`, `geom`, `name`)
/// registered in `gpkg_contents` with SRID 4326, geometry type `GEOMETRY` and bounds
/// `[-10, -5, 10, 5]`. An attribute table `notes` is registered as well and must never
/// show up as a layer.
pub fn create_geopackage(path: &Path, feature_tables: &[&str]) -> Result<()> {
	let conn = Connection::open(path).with_context(|| format!("creating {path:?}"))?;
	conn.execute_batch(
		"CREATE TABLE gpkg_contents (
			table_name TEXT NOT NULL PRIMARY KEY,
			data_type TEXT NOT NULL,
			identifier TEXT UNIQUE,
			description TEXT DEFAULT '',
			last_change DATETIME NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
			min_x DOUBLE, min_y DOUBLE, max_x DOUBLE, max_y DOUBLE,
			srs_id INTEGER
		);
		CREATE TABLE gpkg_geometry_columns (
			table_name TEXT NOT NULL,
			column_name TEXT NOT NULL,
			geometry_type_name TEXT NOT NULL,
			srs_id INTEGER NOT NULL,
			z TINYINT NOT NULL,
			m TINYINT NOT NULL,
			PRIMARY KEY (table_name, column_name)
		);
		CREATE TABLE notes (id INTEGER PRIMARY KEY, text TEXT);
		INSERT INTO gpkg_contents (table_name, data_type, identifier) VALUES ('notes', 'attributes', 'notes');",
	)?;

	for table in feature_tables {
		conn.execute_batch(&format!(
			"CREATE TABLE \"{table}\" (fid INTEGER PRIMARY KEY AUTOINCREMENT, geom BLOB, name TEXT);"
		))?;
		conn.execute(
			"INSERT INTO gpkg_contents (table_name, data_type, identifier, min_x, min_y, max_x, max_y, srs_id)
			VALUES (?1, 'features', ?1, -10, -5, 10, 5, 4326)",
			params![table],
		)?;
		conn.execute(
			"INSERT INTO gpkg_geometry_columns (table_name, column_name, geometry_type_name, srs_id, z, m)
			VALUES (?1, 'geom', 'GEOMETRY', 4326, 0, 0)",
			params![table],
		)?;
	}

	Ok(())
}

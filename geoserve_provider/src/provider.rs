use anyhow::{Result, ensure};
use geoserve_core::{Dict, Dicter, ProviderKind};
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt::Debug;

/// Name of the feature id column used when the settings do not name one.
pub const DEFAULT_ID_FIELD: &str = "fid";

/// A constructed data provider that the server answers feature queries with.
pub trait FeatureProvider: Debug + Send + Sync {
	/// Short name, e.g. the GeoPackage file stem.
	fn name(&self) -> &str;

	fn kind(&self) -> ProviderKind;

	/// Human readable description of where the data comes from. Never contains secrets.
	fn source(&self) -> String;

	fn layers(&self) -> &[LayerInfo];

	fn json_info(&self) -> Value {
		json!({
			"name": self.name(),
			"kind": self.kind().as_str(),
			"source": self.source(),
			"layers": self.layers(),
		})
	}

	fn boxed(self) -> Box<dyn FeatureProvider>
	where
		Self: Sized + 'static,
	{
		Box::new(self)
	}
}

/// One feature layer offered by a provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerInfo {
	pub name: String,
	pub table_name: String,
	pub id_field: String,
	pub geometry_field: String,
	pub geometry_type: String,
	pub srid: i64,
	/// `[min_x, min_y, max_x, max_y]` in the layer's SRID.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub bounds: Option<[f64; 4]>,
}

impl LayerInfo {
	/// Read a layer from its settings entry.
	///
	/// `name` is required; `tablename` defaults to the name, `id_fieldname` to `fid`,
	/// `geometry_fieldname` to `geom`, `geometry_type` to `GEOMETRY` and `srid` to 0.
	pub fn from_dict(dict: &dyn Dicter) -> Result<Self> {
		let name = dict.require_string("name")?;
		let bounds = match dict.get_floats("bounds")? {
			None => None,
			Some(values) => {
				ensure!(values.len() == 4, "bounds of layer '{name}' must have 4 values, found {}", values.len());
				Some([values[0], values[1], values[2], values[3]])
			}
		};

		Ok(Self {
			table_name: dict.get_string("tablename")?.unwrap_or_else(|| name.clone()),
			id_field: dict
				.get_string("id_fieldname")?
				.unwrap_or_else(|| DEFAULT_ID_FIELD.to_string()),
			geometry_field: dict
				.get_string("geometry_fieldname")?
				.unwrap_or_else(|| String::from("geom")),
			geometry_type: dict
				.get_string("geometry_type")?
				.unwrap_or_else(|| String::from("GEOMETRY")),
			srid: dict.get_int("srid")?.unwrap_or(0),
			bounds,
			name,
		})
	}

	pub fn to_dict(&self) -> Dict {
		let mut dict = Dict::new();
		dict
			.set("name", self.name.as_str())
			.set("tablename", self.table_name.as_str())
			.set("id_fieldname", self.id_field.as_str())
			.set("geometry_fieldname", self.geometry_field.as_str())
			.set("geometry_type", self.geometry_type.as_str())
			.set("srid", self.srid);
		if let Some(bounds) = self.bounds {
			dict.set("bounds", bounds.to_vec());
		}
		dict
	}
}

//! Key/value settings handed from provider auto-configuration to provider construction.
//!
//! Auto-configuration produces a [`Dict`] (a JSON object under the hood, so nested layer
//! lists are natural). Constructors only see the [`Dicter`] capability, which offers typed
//! lookups that fail with a descriptive error when a value has the wrong type.

use anyhow::{Result, anyhow, bail};
use serde_json::{Map, Value};
use std::fmt::{self, Display};

/// Typed read access to a settings dictionary.
pub trait Dicter {
	/// Raw value stored under `key`.
	fn get_value(&self, key: &str) -> Option<&Value>;

	fn get_string(&self, key: &str) -> Result<Option<String>> {
		match self.get_value(key) {
			None | Some(Value::Null) => Ok(None),
			Some(Value::String(s)) => Ok(Some(s.clone())),
			Some(other) => bail!("key '{key}' must be a string, found {other}"),
		}
	}

	fn get_int(&self, key: &str) -> Result<Option<i64>> {
		match self.get_value(key) {
			None | Some(Value::Null) => Ok(None),
			Some(Value::Number(n)) => n
				.as_i64()
				.map(Some)
				.ok_or_else(|| anyhow!("key '{key}' must be an integer, found {n}")),
			Some(other) => bail!("key '{key}' must be an integer, found {other}"),
		}
	}

	fn get_floats(&self, key: &str) -> Result<Option<Vec<f64>>> {
		match self.get_value(key) {
			None | Some(Value::Null) => Ok(None),
			Some(Value::Array(items)) => items
				.iter()
				.map(|item| {
					item
						.as_f64()
						.ok_or_else(|| anyhow!("key '{key}' must only contain numbers, found {item}"))
				})
				.collect::<Result<Vec<f64>>>()
				.map(Some),
			Some(other) => bail!("key '{key}' must be an array of numbers, found {other}"),
		}
	}

	/// Nested dictionaries stored as an array of objects. A missing key yields an empty list.
	fn get_dicts(&self, key: &str) -> Result<Vec<Dict>> {
		match self.get_value(key) {
			None | Some(Value::Null) => Ok(Vec::new()),
			Some(Value::Array(items)) => items
				.iter()
				.map(|item| match item {
					Value::Object(map) => Ok(Dict::from(map.clone())),
					other => bail!("key '{key}' must only contain objects, found {other}"),
				})
				.collect(),
			Some(other) => bail!("key '{key}' must be an array of objects, found {other}"),
		}
	}

	fn require_string(&self, key: &str) -> Result<String> {
		self
			.get_string(key)?
			.ok_or_else(|| anyhow!("required key '{key}' is missing"))
	}
}

/// A JSON-object backed settings dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dict(Map<String, Value>);

impl Dict {
	pub fn new() -> Self {
		Self(Map::new())
	}

	/// Store `value` under `key`, replacing any previous value.
	pub fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
		self.0.insert(key.to_string(), value.into());
		self
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn into_value(self) -> Value {
		Value::Object(self.0)
	}
}

impl Dicter for Dict {
	fn get_value(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}
}

impl From<Map<String, Value>> for Dict {
	fn from(map: Map<String, Value>) -> Self {
		Self(map)
	}
}

impl From<Dict> for Value {
	fn from(dict: Dict) -> Self {
		dict.into_value()
	}
}

impl TryFrom<Value> for Dict {
	type Error = anyhow::Error;

	fn try_from(value: Value) -> Result<Self> {
		match value {
			Value::Object(map) => Ok(Self(map)),
			other => bail!("expected a JSON object, found {other}"),
		}
	}
}

impl Display for Dict {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", Value::Object(self.0.clone()))
	}
}

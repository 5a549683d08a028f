use std::fmt::{self, Display};

/// The two kinds of data source a descriptor can denote.
///
/// The kind is not derived from the syntax of the descriptor: a value that exists on the
/// filesystem is a [`ProviderKind::FilePath`], anything else is treated as a
/// [`ProviderKind::ConnectionString`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
	/// A GeoPackage file on the local filesystem.
	FilePath,
	/// A PostGIS connection string.
	ConnectionString,
}

impl ProviderKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			ProviderKind::FilePath => "file path",
			ProviderKind::ConnectionString => "connection string",
		}
	}
}

impl Display for ProviderKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

//! Classification of the raw `providers.data` descriptor.
//!
//! The descriptor is either a path to a GeoPackage or a PostGIS connection string, and the
//! only way to tell them apart is to look at the filesystem:
//!
//! - a relative descriptor is joined with the working directory and normalized
//! - if the resulting path exists, the descriptor is a [`ProviderKind::FilePath`]
//! - otherwise it is a [`ProviderKind::ConnectionString`] and the raw value is kept
//! - an empty descriptor triggers the search for a default `*.gpkg` in the working
//!   directory, then `data/`, then `test_data/`
//!
//! Only [`ProviderKind::FilePath`] results carry the absolutized path. A relative value
//! that does not exist (`foo.gpkg`) is reported and written back exactly as configured,
//! not joined with the working directory, so keyword connection strings stay intact.

use geoserve_core::{BootstrapError, ProviderKind};
use std::{
	env, fs,
	path::{Component, Path, PathBuf},
};

/// Directories searched for a default data file, relative to the working directory, in order.
pub const DEFAULT_SEARCH_DIRS: [&str; 3] = [".", "data", "test_data"];

/// File extension of default data files.
pub const DEFAULT_DATA_EXTENSION: &str = "gpkg";

/// A descriptor together with its kind.
///
/// For [`ProviderKind::FilePath`] the descriptor is an absolute path, for
/// [`ProviderKind::ConnectionString`] it is the value exactly as configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedSource {
	pub kind: ProviderKind,
	pub data_source: String,
}

impl ClassifiedSource {
	pub fn new(kind: ProviderKind, data_source: impl Into<String>) -> Self {
		Self {
			kind,
			data_source: data_source.into(),
		}
	}

	fn from_path(path: &Path) -> Self {
		Self::new(ProviderKind::FilePath, path.to_string_lossy())
	}
}

#[derive(Debug, Clone, Default)]
pub struct DataSourceClassifier {
	working_dir: Option<PathBuf>,
}

impl DataSourceClassifier {
	/// A classifier that resolves relative descriptors against the process working directory.
	pub fn new() -> Self {
		Self::default()
	}

	/// A classifier that resolves relative descriptors against `working_dir`.
	pub fn with_working_dir(working_dir: impl Into<PathBuf>) -> Self {
		Self {
			working_dir: Some(working_dir.into()),
		}
	}

	fn working_dir(&self) -> Result<PathBuf, BootstrapError> {
		match &self.working_dir {
			Some(dir) => Ok(dir.clone()),
			None => env::current_dir().map_err(BootstrapError::PathResolution),
		}
	}

	pub fn classify(&self, raw: &str) -> Result<ClassifiedSource, BootstrapError> {
		if raw.is_empty() {
			let working_dir = self.working_dir()?;
			return match find_default_data_file(&working_dir) {
				Some(path) => {
					log::info!("no data source configured, using {path:?}");
					Ok(ClassifiedSource::from_path(&path))
				}
				None => Err(BootstrapError::NoDataSource {
					searched: DEFAULT_SEARCH_DIRS
						.iter()
						.map(|dir| normalize(&working_dir.join(dir)))
						.collect(),
				}),
			};
		}

		let path = if Path::new(raw).is_absolute() {
			PathBuf::from(raw)
		} else {
			absolutize(raw, &self.working_dir()?)
		};

		// Anything that is not provably absent counts as a file.
		if matches!(path.try_exists(), Ok(false)) {
			log::debug!("{path:?} does not exist, treating '{raw}' as a connection string");
			Ok(ClassifiedSource::new(ProviderKind::ConnectionString, raw))
		} else {
			Ok(ClassifiedSource::from_path(&path))
		}
	}
}

/// Join a relative descriptor with `working_dir` and normalize the result.
/// Absolute descriptors are returned unchanged.
pub fn absolutize(raw: &str, working_dir: &Path) -> PathBuf {
	let path = Path::new(raw);
	if path.is_absolute() {
		path.to_path_buf()
	} else {
		normalize(&working_dir.join(path))
	}
}

/// The first `*.gpkg` file in the working directory, `data/` or `test_data/`.
///
/// Directories are scanned in that order and the scan stops at the first directory that
/// contains a match. Within a directory, file names are compared lexicographically.
pub fn find_default_data_file(working_dir: &Path) -> Option<PathBuf> {
	DEFAULT_SEARCH_DIRS
		.iter()
		.find_map(|dir| first_data_file_in(&normalize(&working_dir.join(dir))))
}

fn first_data_file_in(dir: &Path) -> Option<PathBuf> {
	let entries = fs::read_dir(dir).ok()?;
	entries
		.filter_map(|entry| entry.ok().map(|e| e.path()))
		.filter(|path| path.is_file() && has_data_extension(path))
		.min()
}

fn has_data_extension(path: &Path) -> bool {
	path
		.extension()
		.is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(DEFAULT_DATA_EXTENSION))
}

/// Lexically collapse `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
	let mut result = PathBuf::new();
	let mut depth: usize = 0;
	for component in path.components() {
		match component {
			Component::Prefix(_) | Component::RootDir => result.push(component.as_os_str()),
			Component::CurDir => {}
			Component::ParentDir => {
				if depth > 0 {
					result.pop();
					depth -= 1;
				} else if !result.has_root() {
					result.push("..");
				}
			}
			Component::Normal(part) => {
				result.push(part);
				depth += 1;
			}
		}
	}
	result
}

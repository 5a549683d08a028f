#![allow(unused)]

use assert_cmd::{Command, cargo};
use geoserve_provider::testing::create_geopackage;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

/// Helper to create a Command for the geoserve binary, without inherited `GEOSERVE_*` variables.
pub fn geoserve_cmd() -> Command {
	let mut cmd = Command::new(cargo::cargo_bin!("geoserve"));
	for key in ["GEOSERVE_BIND_HOST", "GEOSERVE_BIND_PORT", "GEOSERVE_URL_HOST_PORT"] {
		cmd.env_remove(key);
	}
	cmd
}

/// Helper to create an empty working directory.
pub fn empty_dir() -> TempDir {
	tempdir().expect("failed to create temp dir")
}

/// Helper to create a working directory containing `relative_path` as a GeoPackage with a `roads` layer.
pub fn dir_with_geopackage(relative_path: &str) -> (TempDir, PathBuf) {
	let dir = empty_dir();
	let path = dir.path().join(relative_path);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).unwrap();
	}
	create_geopackage(&path, &["roads"]).unwrap();
	(dir, path)
}

/// A free TCP port on localhost.
pub fn free_port() -> u16 {
	std::net::TcpListener::bind("127.0.0.1:0")
		.unwrap()
		.local_addr()
		.unwrap()
		.port()
}

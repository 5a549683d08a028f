mod test_utilities;

use serde_json::Value;
use std::{process::Child, thread, time::Duration};
use tempfile::TempDir;
use test_utilities::*;

#[tokio::test]
async fn landing_document_describes_the_geopackage() {
	let (dir, _) = dir_with_geopackage("world.gpkg");
	let server = Server::new(&dir, &["-d", "world.gpkg"]).await;

	assert_eq!(server.get_text("/status").await, "ready!");

	let doc = server.get_json("/").await;
	assert_eq!(doc["title"], "world");
	assert!(doc["data_source"].as_str().unwrap().ends_with("/world.gpkg"));
	assert_eq!(doc["provider"]["kind"], "file path");
	assert_eq!(doc["links"][0]["href"], format!("{}/", server.host));
	assert_eq!(doc["collections"][0]["id"], "roads");
	assert_eq!(doc["collections"][0]["srid"], 4326);
}

#[tokio::test]
async fn serve_address_is_used_for_links() {
	let (dir, _) = dir_with_geopackage("test_data/world.gpkg");
	let server = Server::new(&dir, &["-s", "maps.example.org"]).await;

	let doc = server.get_json("/").await;
	assert_eq!(doc["links"][1]["href"], "http://maps.example.org/status");
}

#[tokio::test]
async fn config_file_supplies_data_and_url() {
	let (dir, _) = dir_with_geopackage("layers/world.gpkg");
	std::fs::write(
		dir.path().join("geoserve.yaml"),
		"server:\n  url_host_port: file.example.org\nproviders:\n  data: layers/world.gpkg\n",
	)
	.unwrap();
	let server = Server::new(&dir, &["-c", "geoserve.yaml"]).await;

	let doc = server.get_json("/").await;
	assert_eq!(doc["links"][0]["href"], "http://file.example.org/");
	assert_eq!(doc["title"], "world");
}

struct Server {
	host: String,
	child: Child,
}

impl Server {
	async fn new(dir: &TempDir, args: &[&str]) -> Self {
		let port = free_port();
		let mut cmd = std::process::Command::new(assert_cmd::cargo::cargo_bin!("geoserve"));
		cmd.current_dir(dir.path())
			.env_remove("GEOSERVE_URL_HOST_PORT")
			.args(["-b", "127.0.0.1", "-p", &port.to_string()])
			.args(args);
		let mut child = cmd.spawn().unwrap();

		loop {
			thread::sleep(Duration::from_millis(100));
			assert!(child.try_wait().unwrap().is_none(), "server process exited prematurely");
			if reqwest::get(&format!("http://127.0.0.1:{port}/status")).await.is_ok() {
				break;
			}
		}

		Self {
			host: format!("http://127.0.0.1:{port}"),
			child,
		}
	}

	async fn get_text(&self, path: &str) -> String {
		let resp = reqwest::get(format!("{}{}", self.host, path)).await.unwrap();
		assert_eq!(resp.status(), 200);
		resp.text().await.unwrap()
	}

	async fn get_json(&self, path: &str) -> Value {
		serde_json::from_str(&self.get_text(path).await).unwrap()
	}
}

impl Drop for Server {
	fn drop(&mut self) {
		let _ = self.child.kill();
		let _ = self.child.wait();
	}
}

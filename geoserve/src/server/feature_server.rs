//! Lifecycle of the HTTP server: bind, serve, graceful shutdown.

use super::landing::{LandingState, serve_landing};
use anyhow::{Context, Result};
use axum::{Router, routing::get};
use geoserve_core::Configuration;
use geoserve_provider::FeatureProvider;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

/// Address used when `bind_host` is empty.
const ALL_INTERFACES: &str = "0.0.0.0";

/// Serves the landing document and a `/status` probe for the bootstrapped provider.
///
/// Starting a running server restarts it; stopping a stopped server is a no-op.
pub struct FeatureServer {
	ip: String,
	port: u16,
	url_host_port: String,
	provider: Arc<dyn FeatureProvider>,
	exit_signal: Option<oneshot::Sender<()>>,
	join: Option<JoinHandle<()>>,
	local_addr: Option<SocketAddr>,
}

impl FeatureServer {
	pub fn new(config: Arc<Configuration>, provider: Arc<dyn FeatureProvider>) -> FeatureServer {
		let server = &config.server;
		let ip = if server.bind_host.is_empty() {
			ALL_INTERFACES.to_string()
		} else {
			server.bind_host.clone()
		};

		FeatureServer {
			ip,
			port: server.bind_port,
			url_host_port: server.url_host_port.clone(),
			provider,
			exit_signal: None,
			join: None,
			local_addr: None,
		}
	}

	/// The address the server listens on, once started.
	pub fn local_addr(&self) -> Option<SocketAddr> {
		self.local_addr
	}

	pub async fn start(&mut self) -> Result<()> {
		if self.exit_signal.is_some() || self.join.is_some() {
			self.stop().await;
		}

		log::info!("starting server");

		let listener = TcpListener::bind((self.ip.as_str(), self.port))
			.await
			.with_context(|| format!("binding to {}:{}", self.ip, self.port))?;
		let local_addr = listener.local_addr()?;

		let state = Arc::new(LandingState {
			provider: Arc::clone(&self.provider),
			url_host_port: self.url_host_port.clone(),
			bind_address: local_addr.to_string(),
		});
		let router = Router::new()
			.route("/status", get(|| async { "ready!" }))
			.route("/", get(serve_landing))
			.with_state(state);

		log::info!("server listening on {local_addr}");

		let (tx, rx) = oneshot::channel::<()>();
		let handle = tokio::spawn(async move {
			if let Err(err) = axum::serve(listener, router.into_make_service())
				.with_graceful_shutdown(async {
					rx.await.ok();
				})
				.await
			{
				log::error!("server task exited with error: {err}");
			}
		});

		self.exit_signal = Some(tx);
		self.join = Some(handle);
		self.local_addr = Some(local_addr);

		Ok(())
	}

	/// Signal graceful shutdown and wait up to ten seconds for the server task.
	pub async fn stop(&mut self) {
		if self.exit_signal.is_none() && self.join.is_none() {
			return;
		}

		log::info!("stopping server");

		if let Some(tx) = self.exit_signal.take() {
			let _ = tx.send(());
		}

		if let Some(handle) = self.join.take() {
			match tokio::time::timeout(Duration::from_secs(10), handle).await {
				Ok(Err(join_err)) => log::warn!("server task join error: {join_err}"),
				Ok(Ok(())) => {}
				Err(_) => log::warn!("server task did not shut down within timeout"),
			}
		}

		self.local_addr = None;
	}
}

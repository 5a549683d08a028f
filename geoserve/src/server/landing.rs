//! The landing document served at `/`.
//!
//! It describes the bootstrapped provider and links the endpoints of this server. Link
//! hrefs are absolute; their base is chosen by [`base_url`].

use axum::{
	Json,
	extract::State,
	http::{HeaderMap, header::HOST},
};
use geoserve_provider::FeatureProvider;
use serde_json::{Value, json};
use std::sync::Arc;

pub struct LandingState {
	pub provider: Arc<dyn FeatureProvider>,
	pub url_host_port: String,
	pub bind_address: String,
}

pub async fn serve_landing(State(state): State<Arc<LandingState>>, headers: HeaderMap) -> Json<Value> {
	let host = headers.get(HOST).and_then(|value| value.to_str().ok());
	let base = base_url(&state.url_host_port, host, &state.bind_address);
	Json(landing_document(state.provider.as_ref(), &base))
}

/// `http://` followed by the configured `url_host_port`, or the `Host` header of the
/// request, or the address the server is bound to, whichever is the first non-empty one.
pub fn base_url(url_host_port: &str, host_header: Option<&str>, bind_address: &str) -> String {
	let authority = [url_host_port, host_header.unwrap_or_default()]
		.into_iter()
		.find(|candidate| !candidate.is_empty())
		.unwrap_or(bind_address);
	format!("http://{}", authority.trim_end_matches('/'))
}

pub fn landing_document(provider: &dyn FeatureProvider, base: &str) -> Value {
	let collections = provider
		.layers()
		.iter()
		.map(|layer| {
			let mut collection = json!({
				"id": layer.name,
				"title": layer.name,
				"geometry_type": layer.geometry_type,
				"srid": layer.srid,
			});
			if let Some(bounds) = layer.bounds {
				collection["bounds"] = json!(bounds);
			}
			collection
		})
		.collect::<Vec<Value>>();

	json!({
		"title": provider.name(),
		"data_source": provider.source(),
		"provider": provider.json_info(),
		"links": [
			{ "href": format!("{base}/"), "rel": "self", "type": "application/json", "title": "this document" },
			{ "href": format!("{base}/status"), "rel": "status", "type": "text/plain", "title": "server status" },
		],
		"collections": collections,
	})
}

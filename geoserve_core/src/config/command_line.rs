use super::{Configuration, DEFAULT_BIND_PORT};

/// Values parsed from the command line flags `-b`, `-p`, `-s` and `-d`.
///
/// `bind_host` and `bind_port` always carry a value (the flag defaults), so they always
/// override earlier layers. The other two only override when non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOverrides {
	pub bind_host: String,
	pub bind_port: u16,
	pub url_host_port: String,
	pub data_source: String,
}

impl Default for CliOverrides {
	fn default() -> Self {
		Self {
			bind_host: String::new(),
			bind_port: DEFAULT_BIND_PORT,
			url_host_port: String::new(),
			data_source: String::new(),
		}
	}
}

impl Configuration {
	pub fn apply_cli(&mut self, cli: &CliOverrides) {
		self.server.bind_host.clone_from(&cli.bind_host);
		self.server.bind_port = cli.bind_port;

		if !cli.url_host_port.is_empty() {
			self.server.url_host_port.clone_from(&cli.url_host_port);
		}
		if !cli.data_source.is_empty() {
			self.providers.data.clone_from(&cli.data_source);
		}
	}
}

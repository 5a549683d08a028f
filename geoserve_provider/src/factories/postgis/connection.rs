//! Parsing of PostGIS connection strings.
//!
//! Two notations are accepted:
//! - libpq keyword/value pairs: `host=db port=5432 dbname=world user=gis password='s3 cret'`
//! - URIs: `postgres://gis:secret@db:5432/world?sslmode=require`

use anyhow::{Context, Result, anyhow, bail, ensure};
use geoserve_core::Dict;
use percent_encoding::percent_decode_str;
use std::{iter::Peekable, str::Chars};
use url::Url;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_USER: &str = "postgres";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

const SSL_MODES: [&str; 6] = ["disable", "allow", "prefer", "require", "verify-ca", "verify-full"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
	pub host: String,
	pub port: u16,
	pub database: String,
	pub user: String,
	pub password: Option<String>,
	pub sslmode: Option<String>,
	pub application_name: Option<String>,
}

impl ConnectionSettings {
	pub fn parse(input: &str) -> Result<Self> {
		let input = input.trim();
		let pairs = if input.starts_with("postgres://") || input.starts_with("postgresql://") {
			parse_uri(input)?
		} else {
			parse_keywords(input)?
		};
		Self::from_pairs(pairs)
	}

	fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self> {
		let mut host = None;
		let mut port = None;
		let mut database = None;
		let mut user = None;
		let mut password = None;
		let mut sslmode = None;
		let mut application_name = None;

		for (key, value) in pairs {
			match key.as_str() {
				"host" => host = Some(value),
				"port" => {
					port = Some(
						value
							.parse::<u16>()
							.with_context(|| format!("invalid port '{value}'"))?,
					);
				}
				"dbname" => database = Some(value),
				"user" => user = Some(value),
				"password" => password = Some(value),
				"sslmode" => {
					ensure!(
						SSL_MODES.contains(&value.as_str()),
						"invalid sslmode '{value}', expected one of: {}",
						SSL_MODES.join(", ")
					);
					sslmode = Some(value);
				}
				"application_name" => application_name = Some(value),
				_ => bail!("unknown connection option '{key}'"),
			}
		}

		let user = user.unwrap_or_else(|| DEFAULT_USER.to_string());
		Ok(Self {
			host: host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
			port: port.unwrap_or(DEFAULT_PORT),
			database: database.unwrap_or_else(|| user.clone()),
			user,
			password,
			sslmode,
			application_name,
		})
	}

	/// Provider settings, see the `postgis` module documentation.
	pub fn to_dict(&self) -> Dict {
		let mut dict = Dict::new();
		dict
			.set("type", "postgis")
			.set("name", "postgis")
			.set("host", self.host.as_str())
			.set("port", self.port)
			.set("database", self.database.as_str())
			.set("user", self.user.as_str())
			.set("max_connections", DEFAULT_MAX_CONNECTIONS)
			.set("layers", Vec::<serde_json::Value>::new());
		if let Some(password) = &self.password {
			dict.set("password", password.as_str());
		}
		if let Some(sslmode) = &self.sslmode {
			dict.set("sslmode", sslmode.as_str());
		}
		if let Some(application_name) = &self.application_name {
			dict.set("application_name", application_name.as_str());
		}
		dict
	}
}

fn parse_uri(input: &str) -> Result<Vec<(String, String)>> {
	let url = Url::parse(input).with_context(|| "invalid connection URI")?;
	let mut pairs = Vec::new();

	if let Some(host) = url.host_str().filter(|h| !h.is_empty()) {
		pairs.push((String::from("host"), host.to_string()));
	}
	if let Some(port) = url.port() {
		pairs.push((String::from("port"), port.to_string()));
	}
	if !url.username().is_empty() {
		pairs.push((String::from("user"), decode(url.username(), "user")?));
	}
	if let Some(password) = url.password() {
		pairs.push((String::from("password"), decode(password, "password")?));
	}
	let database = url.path().trim_start_matches('/');
	if !database.is_empty() {
		pairs.push((String::from("dbname"), decode(database, "dbname")?));
	}
	for (key, value) in url.query_pairs() {
		pairs.push((key.to_string(), value.to_string()));
	}

	Ok(pairs)
}

/// Userinfo and path of a URI are percent-encoded, query pairs are decoded by `url` already.
fn decode(part: &str, key: &str) -> Result<String> {
	Ok(percent_decode_str(part)
		.decode_utf8()
		.with_context(|| format!("invalid percent-encoding in '{key}'"))?
		.into_owned())
}

fn parse_keywords(input: &str) -> Result<Vec<(String, String)>> {
	let mut chars = input.chars().peekable();
	let mut pairs = Vec::new();

	loop {
		skip_whitespace(&mut chars);
		if chars.peek().is_none() {
			break;
		}

		let mut key = String::new();
		while let Some(&c) = chars.peek() {
			if c == '=' || c.is_whitespace() {
				break;
			}
			key.push(c);
			chars.next();
		}

		skip_whitespace(&mut chars);
		if chars.next() != Some('=') {
			bail!("'{key}' is not a key=value pair");
		}
		skip_whitespace(&mut chars);

		let value = if chars.peek() == Some(&'\'') {
			chars.next();
			read_quoted(&mut chars).ok_or_else(|| anyhow!("unterminated quoted value for '{key}'"))?
		} else {
			read_unquoted(&mut chars)
		};

		pairs.push((key, value));
	}

	ensure!(!pairs.is_empty(), "connection string is empty");
	Ok(pairs)
}

fn skip_whitespace(chars: &mut Peekable<Chars>) {
	while chars.peek().is_some_and(|c| c.is_whitespace()) {
		chars.next();
	}
}

fn read_quoted(chars: &mut Peekable<Chars>) -> Option<String> {
	let mut value = String::new();
	loop {
		match chars.next()? {
			'\\' => value.push(chars.next()?),
			'\'' => return Some(value),
			c => value.push(c),
		}
	}
}

fn read_unquoted(chars: &mut Peekable<Chars>) -> String {
	let mut value = String::new();
	while let Some(&c) = chars.peek() {
		if c.is_whitespace() {
			break;
		}
		chars.next();
		if c == '\\' {
			if let Some(escaped) = chars.next() {
				value.push(escaped);
			}
		} else {
			value.push(c);
		}
	}
	value
}

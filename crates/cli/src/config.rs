use std::path::Path;

use anyhow::{Context, Result};
use foxrdp::SessionConfig;

use crate::cli::Cli;

/// Builds the session config: file values first, then command line overrides.
pub fn resolve(cli: &Cli) -> Result<SessionConfig> {
	let mut config = match &cli.config {
		Some(path) => load(path)?,
		None => SessionConfig::default(),
	};

	if let Some(host) = &cli.host {
		config.host = host.clone();
	}
	if let Some(port) = cli.port {
		config.port = port;
	}
	if cli.log_messages {
		config.log_messages = true;
	}
	Ok(config)
}

fn load(path: &Path) -> Result<SessionConfig> {
	let raw = std::fs::read_to_string(path)
		.with_context(|| format!("reading config {}", path.display()))?;
	serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use clap::Parser;
	use tempfile::NamedTempFile;

	use super::*;

	fn config_file(json: &str) -> NamedTempFile {
		let mut file = NamedTempFile::new().unwrap();
		file.write_all(json.as_bytes()).unwrap();
		file
	}

	#[test]
	fn no_file_no_flags_gives_defaults() {
		let cli = Cli::try_parse_from(["foxrdp", "watch"]).unwrap();
		assert_eq!(resolve(&cli).unwrap(), SessionConfig::default());
	}

	#[test]
	fn file_values_fill_partial_config() {
		let file = config_file(r#"{"port": 6000, "logMessages": true}"#);
		let path = file.path().to_str().unwrap();
		let cli = Cli::try_parse_from(["foxrdp", "watch", "--config", path]).unwrap();

		let config = resolve(&cli).unwrap();
		assert_eq!(config.host, "127.0.0.1");
		assert_eq!(config.port, 6000);
		assert!(config.log_messages);
	}

	#[test]
	fn flags_override_file() {
		let file = config_file(r#"{"host": "10.0.0.5", "port": 6000}"#);
		let path = file.path().to_str().unwrap();
		let cli = Cli::try_parse_from(["foxrdp", "list", "--config", path, "--port", "7000"]).unwrap();

		let config = resolve(&cli).unwrap();
		assert_eq!(config.host, "10.0.0.5");
		assert_eq!(config.port, 7000);
	}

	#[test]
	fn missing_file_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("absent.json");
		let cli = Cli::try_parse_from(["foxrdp", "watch", "--config", path.to_str().unwrap()]).unwrap();

		let err = resolve(&cli).unwrap_err();
		assert!(format!("{err:#}").contains("reading config"));
	}

	#[test]
	fn malformed_file_is_an_error() {
		let file = config_file("{ not json");
		let path = file.path().to_str().unwrap();
		let cli = Cli::try_parse_from(["foxrdp", "watch", "--config", path]).unwrap();

		let err = resolve(&cli).unwrap_err();
		assert!(format!("{err:#}").contains("parsing config"));
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: files, environment, CLI, defaults.

use std::path::PathBuf;

use tracing::{debug, trace, warn};

use crate::layer::ConfigLayer;
use crate::paths::{PathsConfig, SYSTEM_CONFIG_FILE};
use crate::ConfigError;

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	SystemFile = 20,
	UserFile = 30,
	WorkspaceFile = 40,
	ExplicitFile = 45,
	Environment = 50,
	Cli = 60,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	/// Name for logging
	fn name(&self) -> &'static str;

	fn precedence(&self) -> Precedence;

	/// Load configuration layer from this source
	fn load(&self) -> Result<ConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading defaults");
		// Defaults are applied when the runtime config is built
		Ok(ConfigLayer::default())
	}
}

/// File-based configuration source (TOML).
pub struct FileSource {
	path: PathBuf,
	precedence: Precedence,
	name: &'static str,
}

impl FileSource {
	/// System config: /etc/sockchat/config.toml
	pub fn system() -> Self {
		Self::custom(
			PathBuf::from(SYSTEM_CONFIG_FILE),
			Precedence::SystemFile,
			"system-config",
		)
	}

	/// User config: ~/.config/sockchat/config.toml
	pub fn user(paths: &PathsConfig) -> Self {
		Self::custom(
			paths.user_config_file.clone(),
			Precedence::UserFile,
			"user-config",
		)
	}

	/// Workspace config: .sockchat/config.toml under the working directory
	pub fn workspace(paths: &PathsConfig) -> Option<Self> {
		let path = paths.workspace_config_file.clone()?;
		Some(Self::custom(
			path,
			Precedence::WorkspaceFile,
			"workspace-config",
		))
	}

	/// File passed with `--config`.
	pub fn explicit(path: PathBuf) -> Self {
		Self::custom(path, Precedence::ExplicitFile, "explicit-config")
	}

	pub fn custom(path: PathBuf, precedence: Precedence, name: &'static str) -> Self {
		Self {
			path,
			precedence,
			name,
		}
	}
}

impl ConfigSource for FileSource {
	fn name(&self) -> &'static str {
		self.name
	}
	fn precedence(&self) -> Precedence {
		self.precedence
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		if !self.path.exists() {
			if self.precedence == Precedence::ExplicitFile {
				return Err(ConfigError::Io(std::io::Error::new(
					std::io::ErrorKind::NotFound,
					format!("config file {} not found", self.path.display()),
				)));
			}
			debug!(path = %self.path.display(), source = self.name, "config file not found, skipping");
			return Ok(ConfigLayer::default());
		}

		debug!(path = %self.path.display(), source = self.name, "loading config file");

		let content = std::fs::read_to_string(&self.path)?;
		let layer: ConfigLayer = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: self.path.clone(),
			source: e,
		})?;

		trace!(source = self.name, "parsed config layer");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Reads `SOCKCHAT_*` variables from the process environment.
pub struct EnvSource {
	vars: Option<Vec<(String, String)>>,
}

impl EnvSource {
	pub fn new() -> Self {
		Self { vars: None }
	}

	/// Use a fixed set of variables instead of the process environment.
	pub fn from_vars<I, K, V>(vars: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			vars: Some(
				vars
					.into_iter()
					.map(|(k, v)| (k.into(), v.into()))
					.collect(),
			),
		}
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading environment variables");
		let mut layer = ConfigLayer::default();

		let vars: Vec<(String, String)> = match &self.vars {
			Some(vars) => vars.clone(),
			None => std::env::vars().collect(),
		};

		for (key, value) in vars {
			if !key.starts_with("SOCKCHAT_") {
				continue;
			}

			let value = value.trim().to_string();
			if value.is_empty() {
				continue;
			}

			trace!(key = %key, "processing env var");

			match key.as_str() {
				"SOCKCHAT_ENDPOINT" => layer.session_mut().endpoint = Some(value),
				"SOCKCHAT_TYPING_WINDOW_MS" => match value.parse() {
					Ok(v) => layer.session_mut().typing_window_ms = Some(v),
					Err(_) => warn!(key = %key, value = %value, "ignoring non-numeric value"),
				},
				"SOCKCHAT_CONNECT_TIMEOUT_SECS" => match value.parse() {
					Ok(v) => layer.session_mut().connect_timeout_secs = Some(v),
					Err(_) => warn!(key = %key, value = %value, "ignoring non-numeric value"),
				},
				"SOCKCHAT_TYPING_PREVIEW" => match parse_bool(&value) {
					Some(v) => layer.session_mut().typing_preview = Some(v),
					None => warn!(key = %key, value = %value, "ignoring non-boolean value"),
				},
				"SOCKCHAT_LOG_LEVEL" => layer.logging_mut().level = Some(value),
				"SOCKCHAT_LOG_FORMAT" => layer.logging_mut().format = Some(value),
				_ => {
					// Unknown SOCKCHAT_ variable, ignore
				}
			}
		}

		Ok(layer)
	}
}

fn parse_bool(value: &str) -> Option<bool> {
	match value.to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Some(true),
		"0" | "false" | "no" | "off" => Some(false),
		_ => None,
	}
}

/// CLI override source.
pub struct CliSource {
	overrides: CliOverrides,
}

/// CLI argument overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
	pub endpoint: Option<String>,
	pub typing_window_ms: Option<u64>,
	pub typing_preview: Option<bool>,
	pub log_level: Option<String>,
	pub log_format: Option<String>,
	pub config_file: Option<PathBuf>,
}

impl CliSource {
	pub fn new(overrides: CliOverrides) -> Self {
		Self { overrides }
	}
}

impl ConfigSource for CliSource {
	fn name(&self) -> &'static str {
		"cli"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Cli
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading CLI overrides");
		let mut layer = ConfigLayer::default();

		if let Some(ref endpoint) = self.overrides.endpoint {
			layer.session_mut().endpoint = Some(endpoint.clone());
		}
		if let Some(window) = self.overrides.typing_window_ms {
			layer.session_mut().typing_window_ms = Some(window);
		}
		if let Some(preview) = self.overrides.typing_preview {
			layer.session_mut().typing_preview = Some(preview);
		}
		if let Some(ref level) = self.overrides.log_level {
			layer.logging_mut().level = Some(level.clone());
		}
		if let Some(ref format) = self.overrides.log_format {
			layer.logging_mut().format = Some(format.clone());
		}

		Ok(layer)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::tempdir;

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Cli > Precedence::Environment);
		assert!(Precedence::Environment > Precedence::ExplicitFile);
		assert!(Precedence::ExplicitFile > Precedence::WorkspaceFile);
		assert!(Precedence::WorkspaceFile > Precedence::UserFile);
		assert!(Precedence::UserFile > Precedence::SystemFile);
		assert!(Precedence::SystemFile > Precedence::Defaults);
	}

	#[test]
	fn test_defaults_source_returns_empty_layer() {
		let layer = DefaultsSource.load().unwrap();
		assert_eq!(layer, ConfigLayer::default());
	}

	#[test]
	fn test_file_source_missing_file_returns_empty() {
		let source = FileSource::custom(
			PathBuf::from("/nonexistent/config.toml"),
			Precedence::UserFile,
			"test",
		);
		assert_eq!(source.load().unwrap(), ConfigLayer::default());
	}

	#[test]
	fn test_missing_explicit_file_is_an_error() {
		let source = FileSource::explicit(PathBuf::from("/nonexistent/config.toml"));
		assert!(matches!(source.load(), Err(ConfigError::Io(_))));
	}

	#[test]
	fn test_workspace_source_follows_paths() {
		let paths = PathsConfig {
			user_config_file: "/home/u/.config/sockchat/config.toml".into(),
			system_config_file: SYSTEM_CONFIG_FILE.into(),
			workspace_config_file: None,
		};
		assert!(FileSource::workspace(&paths).is_none());
	}

	#[test]
	fn test_file_source_reads_toml() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("config.toml");
		fs::write(&path, "[session]\ntyping_preview = true\n").unwrap();

		let layer = FileSource::explicit(path).load().unwrap();
		assert_eq!(layer.session.unwrap().typing_preview, Some(true));
	}

	#[test]
	fn test_file_source_reports_parse_errors() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("config.toml");
		fs::write(&path, "[session\n").unwrap();

		let err = FileSource::explicit(path).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
	}

	#[test]
	fn test_env_source_reads_prefixed_vars() {
		let source = EnvSource::from_vars([
			("SOCKCHAT_ENDPOINT", "ws://env.test"),
			("SOCKCHAT_TYPING_WINDOW_MS", "750"),
			("SOCKCHAT_TYPING_PREVIEW", "yes"),
			("SOCKCHAT_LOG_FORMAT", "json"),
			("OTHER_ENDPOINT", "ws://ignored.test"),
		]);
		let layer = source.load().unwrap();

		let session = layer.session.unwrap();
		assert_eq!(session.endpoint.as_deref(), Some("ws://env.test"));
		assert_eq!(session.typing_window_ms, Some(750));
		assert_eq!(session.typing_preview, Some(true));
		assert_eq!(layer.logging.unwrap().format.as_deref(), Some("json"));
	}

	#[test]
	fn test_env_source_skips_blank_and_malformed_values() {
		let source = EnvSource::from_vars([
			("SOCKCHAT_ENDPOINT", "   "),
			("SOCKCHAT_CONNECT_TIMEOUT_SECS", "soon"),
			("SOCKCHAT_TYPING_PREVIEW", "maybe"),
		]);
		let layer = source.load().unwrap();
		assert_eq!(layer.session.unwrap_or_default(), Default::default());
	}

	#[test]
	fn test_cli_source_sets_only_given_fields() {
		let layer = CliSource::new(CliOverrides {
			endpoint: Some("wss://cli.test".to_string()),
			log_level: Some("trace".to_string()),
			..Default::default()
		})
		.load()
		.unwrap();

		let session = layer.session.unwrap();
		assert_eq!(session.endpoint.as_deref(), Some("wss://cli.test"));
		assert_eq!(session.typing_window_ms, None);
		assert_eq!(layer.logging.unwrap().level.as_deref(), Some("trace"));
	}
}

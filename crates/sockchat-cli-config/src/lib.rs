// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for the sockchat terminal client.
//!
//! This crate provides:
//! - XDG Base Directory compliant path resolution
//! - Layered configuration from multiple sources
//! - TOML configuration file parsing
//! - Environment variable overrides
//! - Configuration validation

pub mod defaults;
pub mod error;
pub mod layer;
pub mod paths;
pub mod registry;
pub mod runtime;
pub mod sources;
pub mod validation;

pub use defaults::{ensure_default_config, DEFAULT_CONFIG_TEMPLATE};
pub use error::ConfigError;
pub use layer::ConfigLayer;
pub use paths::PathsConfig;
pub use registry::ConfigRegistry;
pub use runtime::{LogFormat, LogLevel, LoggingConfig, SockchatConfig};
pub use sources::{CliOverrides, ConfigSource, Precedence};

/// Load configuration from all sources with default precedence.
pub fn load_config() -> Result<SockchatConfig, ConfigError> {
	load_config_with_cli(CliOverrides::default())
}

/// Load configuration with CLI overrides.
///
/// If no user config file exists, a default one is created at
/// `~/.config/sockchat/config.toml`.
pub fn load_config_with_cli(cli: CliOverrides) -> Result<SockchatConfig, ConfigError> {
	let paths = paths::resolve_xdg_paths()?;

	if let Err(e) = defaults::ensure_default_config(&paths.user_config_file) {
		tracing::warn!(
			path = %paths.user_config_file.display(),
			error = %e,
			"could not write default config file"
		);
	}

	let mut registry = ConfigRegistry::new();

	registry.register(Box::new(sources::DefaultsSource));
	registry.register(Box::new(sources::FileSource::system()));
	registry.register(Box::new(sources::FileSource::user(&paths)));
	if let Some(ws) = sources::FileSource::workspace(&paths) {
		registry.register(Box::new(ws));
	}
	if let Some(ref path) = cli.config_file {
		registry.register(Box::new(sources::FileSource::explicit(path.clone())));
	}
	registry.register(Box::new(sources::EnvSource::new()));
	registry.register(Box::new(sources::CliSource::new(cli)));

	registry.load(Some(paths))
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! XDG Base Directory compliant path resolution.

use std::path::PathBuf;

use crate::ConfigError;

pub const SYSTEM_CONFIG_FILE: &str = "/etc/sockchat/config.toml";
pub const WORKSPACE_CONFIG_FILE: &str = ".sockchat/config.toml";

/// Resolved configuration file locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathsConfig {
	/// User config file: ~/.config/sockchat/config.toml
	pub user_config_file: PathBuf,
	/// System config file: /etc/sockchat/config.toml
	pub system_config_file: PathBuf,
	/// Workspace config file: ./.sockchat/config.toml
	pub workspace_config_file: Option<PathBuf>,
}

impl PathsConfig {
	pub fn config_dir(&self) -> PathBuf {
		self
			.user_config_file
			.parent()
			.map(|p| p.to_path_buf())
			.unwrap_or_else(|| self.user_config_file.clone())
	}
}

/// Resolve paths using `XDG_CONFIG_HOME`, falling back to `~/.config`.
pub fn resolve_xdg_paths() -> Result<PathsConfig, ConfigError> {
	let config_home = match std::env::var_os("XDG_CONFIG_HOME") {
		Some(dir) if !dir.is_empty() => PathBuf::from(dir),
		_ => dirs::home_dir()
			.ok_or(ConfigError::HomeDirNotFound)?
			.join(".config"),
	};

	let workspace_config_file = std::env::current_dir()
		.ok()
		.map(|cwd| cwd.join(WORKSPACE_CONFIG_FILE));

	tracing::debug!(config_home = %config_home.display(), "resolved XDG paths");

	Ok(PathsConfig {
		user_config_file: config_home.join("sockchat/config.toml"),
		system_config_file: PathBuf::from(SYSTEM_CONFIG_FILE),
		workspace_config_file,
	})
}

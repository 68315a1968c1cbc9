// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Default configuration file generation.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::ConfigError;

/// Default configuration file template.
///
/// Written to ~/.config/sockchat/config.toml when no user config exists.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"#
# sockchat configuration
# Location: ~/.config/sockchat/config.toml
#
# Every value below is the built-in default. Environment variables
# (SOCKCHAT_*) and command line flags override this file.
#

[session]
# Chat server to connect to (ws:// or wss://)
endpoint = "wss://socket-chat-iuwl.onrender.com"

# How long the peer typing indicator stays up after the last signal (ms)
typing_window_ms = 2000

# Give up connecting after this many seconds
connect_timeout_secs = 10

# Send the current draft along with typing signals
typing_preview = false

[logging]
# Log level: error, warn, info, debug, trace
level = "info"

# Log format: compact, pretty, json
format = "compact"
"#;

/// Create a default config file if none exists.
///
/// Returns `true` if a new config file was created, `false` if one already existed.
pub fn ensure_default_config(config_file_path: &Path) -> Result<bool, ConfigError> {
	if config_file_path.exists() {
		debug!(path = %config_file_path.display(), "config file already exists");
		return Ok(false);
	}

	if let Some(parent) = config_file_path.parent() {
		if !parent.exists() {
			debug!(path = %parent.display(), "creating config directory");
			fs::create_dir_all(parent)?;
		}
	}

	info!(path = %config_file_path.display(), "creating default config file");
	fs::write(config_file_path, DEFAULT_CONFIG_TEMPLATE)?;

	Ok(true)
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration validation rules.

use std::time::Duration;

use tracing::warn;
use url::Url;

use crate::runtime::SockchatConfig;
use crate::ConfigError;

const MIN_TYPING_WINDOW: Duration = Duration::from_millis(1);
const MAX_TYPING_WINDOW: Duration = Duration::from_secs(60);
const MIN_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(300);

/// Validate the configuration.
pub fn validate_config(config: &SockchatConfig) -> Result<(), ConfigError> {
	validate_endpoint(&config.session.endpoint)?;
	validate_session_timings(config)?;
	Ok(())
}

fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
	let url = Url::parse(endpoint)
		.map_err(|e| ConfigError::invalid_value("session.endpoint", e.to_string()))?;

	match url.scheme() {
		"wss" => Ok(()),
		"ws" => {
			if !matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]")) {
				warn!(endpoint = %endpoint, "endpoint uses unencrypted ws://");
			}
			Ok(())
		}
		other => Err(ConfigError::invalid_value(
			"session.endpoint",
			format!("scheme must be ws or wss, got {other}"),
		)),
	}
}

fn validate_session_timings(config: &SockchatConfig) -> Result<(), ConfigError> {
	let session = &config.session;

	if !(MIN_TYPING_WINDOW..=MAX_TYPING_WINDOW).contains(&session.typing_window) {
		return Err(ConfigError::invalid_value(
			"session.typing_window_ms",
			"must be between 1 and 60000",
		));
	}

	if !(MIN_CONNECT_TIMEOUT..=MAX_CONNECT_TIMEOUT).contains(&session.connect_timeout) {
		return Err(ConfigError::invalid_value(
			"session.connect_timeout_secs",
			"must be between 1 and 300",
		));
	}

	Ok(())
}

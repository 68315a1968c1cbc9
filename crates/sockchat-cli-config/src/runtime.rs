// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Runtime configuration types with resolved defaults.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sockchat_common_core::{
	SessionConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_ENDPOINT, DEFAULT_TYPING_WINDOW,
};

use crate::error::ConfigError;
use crate::layer::*;
use crate::paths::PathsConfig;

/// The final, validated configuration for sockchat.
#[derive(Debug, Clone, Serialize)]
pub struct SockchatConfig {
	pub session: SessionConfig,
	pub logging: LoggingConfig,

	/// Resolved XDG paths (not serialized)
	#[serde(skip)]
	pub paths: Option<PathsConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
	pub level: LogLevel,
	pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
	Error,
	Warn,
	#[default]
	Info,
	Debug,
	Trace,
}

impl LogLevel {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Error => "error",
			Self::Warn => "warn",
			Self::Info => "info",
			Self::Debug => "debug",
			Self::Trace => "trace",
		}
	}
}

impl fmt::Display for LogLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Compact,
	Pretty,
	Json,
}

impl SockchatConfig {
	/// Build runtime config from a merged layer.
	///
	/// Fails on a log level or format that is not one of the known names.
	pub fn from_layer(layer: ConfigLayer, paths: Option<PathsConfig>) -> Result<Self, ConfigError> {
		Ok(Self {
			session: build_session_config(layer.session),
			logging: build_logging_config(layer.logging)?,
			paths,
		})
	}
}

impl Default for SockchatConfig {
	fn default() -> Self {
		Self {
			session: SessionConfig::default(),
			logging: LoggingConfig::default(),
			paths: None,
		}
	}
}

fn build_session_config(layer: Option<SessionLayer>) -> SessionConfig {
	let layer = layer.unwrap_or_default();
	SessionConfig {
		endpoint: layer
			.endpoint
			.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
		typing_window: layer
			.typing_window_ms
			.map(Duration::from_millis)
			.unwrap_or(DEFAULT_TYPING_WINDOW),
		connect_timeout: layer
			.connect_timeout_secs
			.map(Duration::from_secs)
			.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
		typing_preview: layer.typing_preview.unwrap_or(false),
	}
}

fn build_logging_config(layer: Option<LoggingLayer>) -> Result<LoggingConfig, ConfigError> {
	let layer = layer.unwrap_or_default();
	Ok(LoggingConfig {
		level: parse_log_level(layer.level.as_deref())?,
		format: parse_log_format(layer.format.as_deref())?,
	})
}

fn parse_log_level(s: Option<&str>) -> Result<LogLevel, ConfigError> {
	let Some(s) = s else {
		return Ok(LogLevel::default());
	};
	match s.trim().to_ascii_lowercase().as_str() {
		"error" => Ok(LogLevel::Error),
		"warn" => Ok(LogLevel::Warn),
		"info" => Ok(LogLevel::Info),
		"debug" => Ok(LogLevel::Debug),
		"trace" => Ok(LogLevel::Trace),
		_ => Err(ConfigError::invalid_value(
			"logging.level",
			format!("unknown log level '{s}', expected error, warn, info, debug or trace"),
		)),
	}
}

fn parse_log_format(s: Option<&str>) -> Result<LogFormat, ConfigError> {
	let Some(s) = s else {
		return Ok(LogFormat::default());
	};
	match s.trim().to_ascii_lowercase().as_str() {
		"json" => Ok(LogFormat::Json),
		"pretty" => Ok(LogFormat::Pretty),
		"compact" => Ok(LogFormat::Compact),
		_ => Err(ConfigError::invalid_value(
			"logging.format",
			format!("unknown log format '{s}', expected compact, pretty or json"),
		)),
	}
}

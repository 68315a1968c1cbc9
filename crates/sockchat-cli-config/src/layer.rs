// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration layer for merging from multiple sources.

use serde::Deserialize;

/// Partial configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
	#[serde(default)]
	pub session: Option<SessionLayer>,
	#[serde(default)]
	pub logging: Option<LoggingLayer>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionLayer {
	#[serde(default)]
	pub endpoint: Option<String>,
	#[serde(default)]
	pub typing_window_ms: Option<u64>,
	#[serde(default)]
	pub connect_timeout_secs: Option<u64>,
	#[serde(default)]
	pub typing_preview: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingLayer {
	#[serde(default)]
	pub level: Option<String>,
	#[serde(default)]
	pub format: Option<String>,
}

impl ConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: ConfigLayer) {
		merge_option(&mut self.session, other.session, SessionLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingLayer::merge);
	}

	pub fn session_mut(&mut self) -> &mut SessionLayer {
		self.session.get_or_insert_with(SessionLayer::default)
	}

	pub fn logging_mut(&mut self) -> &mut LoggingLayer {
		self.logging.get_or_insert_with(LoggingLayer::default)
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

impl SessionLayer {
	fn merge(&mut self, other: SessionLayer) {
		if other.endpoint.is_some() {
			self.endpoint = other.endpoint;
		}
		if other.typing_window_ms.is_some() {
			self.typing_window_ms = other.typing_window_ms;
		}
		if other.connect_timeout_secs.is_some() {
			self.connect_timeout_secs = other.connect_timeout_secs;
		}
		if other.typing_preview.is_some() {
			self.typing_preview = other.typing_preview;
		}
	}
}

impl LoggingLayer {
	fn merge(&mut self, other: LoggingLayer) {
		if other.level.is_some() {
			self.level = other.level;
		}
		if other.format.is_some() {
			self.format = other.format;
		}
	}
}

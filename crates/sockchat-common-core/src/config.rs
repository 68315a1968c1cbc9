// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Endpoint the original chat widget talks to.
pub const DEFAULT_ENDPOINT: &str = "wss://socket-chat-iuwl.onrender.com";

/// Quiescence window after the last inbound typing signal.
pub const DEFAULT_TYPING_WINDOW: Duration = Duration::from_millis(2000);

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a chat session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
	pub endpoint: String,
	#[serde(with = "millis_serde")]
	pub typing_window: Duration,
	#[serde(with = "secs_serde")]
	pub connect_timeout: Duration,
	/// Include the local draft text in outbound typing envelopes.
	pub typing_preview: bool,
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			endpoint: DEFAULT_ENDPOINT.to_string(),
			typing_window: DEFAULT_TYPING_WINDOW,
			connect_timeout: DEFAULT_CONNECT_TIMEOUT,
			typing_preview: false,
		}
	}
}

mod millis_serde {
	use serde::ser::Error as _;
	use serde::{Deserialize, Deserializer, Serialize, Serializer};
	use std::time::Duration;

	pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		u64::try_from(duration.as_millis())
			.map_err(|_| S::Error::custom(format!("{duration:?} does not fit in u64 milliseconds")))?
			.serialize(serializer)
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
	where
		D: Deserializer<'de>,
	{
		let millis = u64::deserialize(deserializer)?;
		Ok(Duration::from_millis(millis))
	}
}

mod secs_serde {
	use serde::{Deserialize, Deserializer, Serialize, Serializer};
	use std::time::Duration;

	pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		duration.as_secs().serialize(serializer)
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
	where
		D: Deserializer<'de>,
	{
		let secs = u64::deserialize(deserializer)?;
		Ok(Duration::from_secs(secs))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_observed_widget() {
		let config = SessionConfig::default();
		assert_eq!(config.endpoint, "wss://socket-chat-iuwl.onrender.com");
		assert_eq!(config.typing_window, Duration::from_millis(2000));
		assert!(!config.typing_preview);
	}

	#[test]
	fn durations_serialize_as_integers() {
		let json = serde_json::to_value(SessionConfig::default()).unwrap();
		assert_eq!(json["typing_window"], 2000);
		assert_eq!(json["connect_timeout"], 10);

		let back: SessionConfig = serde_json::from_value(json).unwrap();
		assert_eq!(back, SessionConfig::default());
	}

	#[test]
	fn oversized_typing_window_fails_to_serialize() {
		let config = SessionConfig {
			typing_window: Duration::MAX,
			..SessionConfig::default()
		};
		let err = serde_json::to_value(config).unwrap_err();
		assert!(err.to_string().contains("does not fit in u64 milliseconds"));
	}
}

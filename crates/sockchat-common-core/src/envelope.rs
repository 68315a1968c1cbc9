// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Wire envelope exchanged over the duplex channel and the inbound decode
//! policy.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::trace;

/// JSON wrapper distinguishing a chat message from a typing signal.
///
/// ```json
/// {"type": "message", "text": "hello"}
/// {"type": "typing"}
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Envelope {
	Message {
		text: String,
	},
	Typing {
		#[serde(
			default,
			deserialize_with = "string_or_none",
			skip_serializing_if = "Option::is_none"
		)]
		text: Option<String>,
	},
}

/// Envelopes written by the local side.
pub type OutboundEnvelope = Envelope;

/// Envelopes parsed from the remote side.
pub type InboundEnvelope = Envelope;

impl Envelope {
	pub fn message(text: impl Into<String>) -> Self {
		Self::Message { text: text.into() }
	}

	pub fn typing() -> Self {
		Self::Typing { text: None }
	}

	pub fn typing_with_preview(text: impl Into<String>) -> Self {
		Self::Typing {
			text: Some(text.into()),
		}
	}

	/// Serializes the envelope into a text frame.
	pub fn to_frame(&self) -> String {
		serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
	}
}

/// Typing previews from legacy senders are not always strings; anything else
/// is dropped rather than failing the whole envelope.
fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<serde_json::Value>::deserialize(deserializer)?;
	Ok(match value {
		Some(serde_json::Value::String(s)) => Some(s),
		_ => None,
	})
}

/// Result of decoding one inbound payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundPayload {
	/// A well-formed envelope.
	Envelope(InboundEnvelope),
	/// Anything else; the whole payload is treated as chat text.
	RawText(String),
}

/// Decodes an inbound text payload.
///
/// Payloads that are not JSON, have no `type`, carry an unknown `type`, or
/// a `message` without string `text` fall back to [`InboundPayload::RawText`].
pub fn decode_inbound(raw: &str) -> InboundPayload {
	match serde_json::from_str::<InboundEnvelope>(raw) {
		Ok(envelope) => InboundPayload::Envelope(envelope),
		Err(e) => {
			trace!(error = %e, "payload is not an envelope, treating as raw text");
			InboundPayload::RawText(raw.to_string())
		}
	}
}

/// A frame as delivered by the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundFrame {
	Text(String),
	Binary(Vec<u8>),
}

impl InboundFrame {
	/// Decodes the frame to text. Binary frames are read as UTF-8, with
	/// invalid sequences replaced.
	pub fn into_text(self) -> String {
		match self {
			Self::Text(text) => text,
			Self::Binary(bytes) => match String::from_utf8(bytes) {
				Ok(text) => text,
				Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn message_envelope_frame_shape() {
		assert_eq!(
			Envelope::message("hi").to_frame(),
			r#"{"type":"message","text":"hi"}"#
		);
	}

	#[test]
	fn typing_envelope_omits_absent_text() {
		assert_eq!(Envelope::typing().to_frame(), r#"{"type":"typing"}"#);
		assert_eq!(
			Envelope::typing_with_preview("dra").to_frame(),
			r#"{"type":"typing","text":"dra"}"#
		);
	}

	#[test]
	fn decodes_message_envelope() {
		assert_eq!(
			decode_inbound(r#"{"type":"message","text":"hi"}"#),
			InboundPayload::Envelope(Envelope::message("hi"))
		);
	}

	#[test]
	fn decodes_typing_envelope_with_and_without_text() {
		assert_eq!(
			decode_inbound(r#"{"type":"typing"}"#),
			InboundPayload::Envelope(Envelope::typing())
		);
		assert_eq!(
			decode_inbound(r#"{"type":"typing","text":"hel"}"#),
			InboundPayload::Envelope(Envelope::typing_with_preview("hel"))
		);
	}

	#[test]
	fn non_string_typing_text_is_dropped() {
		assert_eq!(
			decode_inbound(r#"{"type":"typing","text":42}"#),
			InboundPayload::Envelope(Envelope::typing())
		);
	}

	#[test]
	fn extra_fields_are_ignored() {
		assert_eq!(
			decode_inbound(r#"{"type":"message","text":"hi","id":7}"#),
			InboundPayload::Envelope(Envelope::message("hi"))
		);
	}

	#[test]
	fn plain_text_falls_back_to_raw() {
		assert_eq!(
			decode_inbound("not json at all"),
			InboundPayload::RawText("not json at all".to_string())
		);
	}

	#[test]
	fn missing_or_unknown_type_falls_back_to_raw() {
		for raw in [
			r#"{"text":"hi"}"#,
			r#"{"type":"presence","text":"hi"}"#,
			r#"{"type":"message"}"#,
			r#"{"type":"message","text":5}"#,
			r#""just a string""#,
			"42",
			"",
		] {
			assert_eq!(
				decode_inbound(raw),
				InboundPayload::RawText(raw.to_string()),
				"payload {raw:?} should fall back"
			);
		}
	}

	#[test]
	fn binary_frames_decode_to_text() {
		let frame = InboundFrame::Binary(br#"{"type":"typing"}"#.to_vec());
		assert_eq!(frame.into_text(), r#"{"type":"typing"}"#);
	}

	#[test]
	fn invalid_utf8_is_replaced() {
		let frame = InboundFrame::Binary(vec![b'o', b'k', 0xff]);
		assert_eq!(frame.into_text(), "ok\u{fffd}");
	}
}

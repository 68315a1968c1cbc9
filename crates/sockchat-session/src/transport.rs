// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Duplex channel abstraction the controller drives.

use async_trait::async_trait;
use sockchat_common_core::{InboundFrame, SessionError, SessionResult, TransportError};
use url::Url;

/// Establishes channels to a chat endpoint.
#[async_trait]
pub trait Connector: Send + Sync {
	/// Open a channel to `url`. Resolves once the channel is usable.
	async fn connect(&self, url: &Url) -> Result<Box<dyn Channel>, TransportError>;
}

/// An established, ordered, text-framed duplex channel.
#[async_trait]
pub trait Channel: Send {
	/// Write one text frame.
	async fn send(&mut self, frame: String) -> Result<(), TransportError>;

	/// Wait for the next inbound frame.
	///
	/// Returns `None` once the peer has closed the channel. Must be
	/// cancel-safe: dropping the future loses no frame.
	async fn recv(&mut self) -> Option<Result<InboundFrame, TransportError>>;

	/// Close the channel gracefully.
	async fn close(&mut self) -> Result<(), TransportError>;
}

/// Parses an endpoint, accepting only `ws` and `wss` URLs.
pub fn parse_endpoint(endpoint: &str) -> SessionResult<Url> {
	let url = Url::parse(endpoint.trim())
		.map_err(|e| SessionError::invalid_endpoint(endpoint, e.to_string()))?;

	match url.scheme() {
		"ws" | "wss" => Ok(url),
		other => Err(SessionError::invalid_endpoint(
			endpoint,
			format!("expected ws or wss scheme, got {other}"),
		)),
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! WebSocket transport built on tokio-tungstenite.

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use sockchat_common_core::{InboundFrame, TransportError, DEFAULT_CONNECT_TIMEOUT};
use tokio::net::TcpStream;
use tokio_tungstenite::{
	connect_async,
	tungstenite::{Error as WsError, Message},
	MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, trace};
use url::Url;

use crate::transport::{Channel, Connector};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connects to `ws://` and `wss://` endpoints.
#[derive(Clone, Debug)]
pub struct WebSocketConnector {
	connect_timeout: Duration,
}

impl WebSocketConnector {
	pub fn new(connect_timeout: Duration) -> Self {
		Self { connect_timeout }
	}
}

impl Default for WebSocketConnector {
	fn default() -> Self {
		Self::new(DEFAULT_CONNECT_TIMEOUT)
	}
}

#[async_trait]
impl Connector for WebSocketConnector {
	async fn connect(&self, url: &Url) -> Result<Box<dyn Channel>, TransportError> {
		if !matches!(url.scheme(), "ws" | "wss") {
			return Err(TransportError::UnsupportedScheme(url.scheme().to_string()));
		}

		debug!(url = %url, timeout = ?self.connect_timeout, "connecting websocket");
		let (stream, response) = tokio::time::timeout(self.connect_timeout, connect_async(url.as_str()))
			.await
			.map_err(|_| TransportError::ConnectTimeout(self.connect_timeout))?
			.map_err(|e| TransportError::Connect(e.to_string()))?;

		debug!(url = %url, status = %response.status(), "websocket handshake complete");
		Ok(Box::new(WebSocketChannel { stream }))
	}
}

/// An open WebSocket connection.
pub struct WebSocketChannel {
	stream: WsStream,
}

#[async_trait]
impl Channel for WebSocketChannel {
	async fn send(&mut self, frame: String) -> Result<(), TransportError> {
		trace!(len = frame.len(), "sending text frame");
		self
			.stream
			.send(Message::Text(frame))
			.await
			.map_err(|e| TransportError::Send(e.to_string()))
	}

	async fn recv(&mut self) -> Option<Result<InboundFrame, TransportError>> {
		loop {
			match self.stream.next().await? {
				Ok(Message::Text(text)) => return Some(Ok(InboundFrame::Text(text))),
				Ok(Message::Binary(bytes)) => return Some(Ok(InboundFrame::Binary(bytes))),
				Ok(Message::Close(frame)) => {
					debug!(?frame, "peer sent close frame");
					return None;
				}
				Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => continue,
				Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => return None,
				Err(e) => return Some(Err(TransportError::Receive(e.to_string()))),
			}
		}
	}

	async fn close(&mut self) -> Result<(), TransportError> {
		match self.stream.close(None).await {
			Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
			Err(e) => Err(TransportError::Close(e.to_string())),
		}
	}
}

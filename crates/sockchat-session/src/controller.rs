// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The chat session controller.
//!
//! [`ChatSession`] owns the channel, the typing timer and the
//! [`SessionState`]. Every input, whether a client request or something
//! arriving on the channel, goes through
//! [`SessionState::handle_event`]; the controller then carries out the
//! returned [`SessionAction`]s and publishes a snapshot to subscribers.

use std::collections::VecDeque;
use std::future;
use std::sync::Arc;

use sockchat_common_core::{
	ChatMessage, Envelope, IgnoreReason, InboundFrame, Notifier, Outcome, SessionAction,
	SessionConfig, SessionError, SessionEvent, SessionResult, SessionState, SessionStatus,
	TracingNotifier, TransportError, TypingIndicator,
};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::debounce::Debounce;
use crate::transport::{parse_endpoint, Channel, Connector};
use crate::websocket::WebSocketConnector;

/// A single chat session over a duplex channel.
///
/// All operations take `&mut self`; the owner drives inbound traffic and
/// the typing timer by awaiting [`next_update`](ChatSession::next_update),
/// typically inside a `tokio::select!` loop next to its own input source.
///
/// Dropping the session drops the channel.
pub struct ChatSession {
	config: SessionConfig,
	state: SessionState,
	connector: Arc<dyn Connector>,
	endpoint: Option<String>,
	channel: Option<Box<dyn Channel>>,
	typing_timer: Debounce<()>,
	notifier: Arc<dyn Notifier>,
	updates: watch::Sender<SessionState>,
}

impl ChatSession {
	pub fn new(config: SessionConfig, connector: Arc<dyn Connector>) -> Self {
		let state = SessionState::new();
		let (updates, _) = watch::channel(state.clone());
		Self {
			typing_timer: Debounce::new(config.typing_window),
			config,
			state,
			connector,
			endpoint: None,
			channel: None,
			notifier: Arc::new(TracingNotifier),
			updates,
		}
	}

	/// A session that connects over WebSocket.
	pub fn websocket(config: SessionConfig) -> Self {
		let connector = Arc::new(WebSocketConnector::new(config.connect_timeout));
		Self::new(config, connector)
	}

	pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
		self.notifier = notifier;
		self
	}

	pub fn config(&self) -> &SessionConfig {
		&self.config
	}

	/// The endpoint of the most recent accepted [`open`](ChatSession::open).
	pub fn endpoint(&self) -> Option<&str> {
		self.endpoint.as_deref()
	}

	pub fn state(&self) -> &SessionState {
		&self.state
	}

	pub fn status(&self) -> SessionStatus {
		self.state.status()
	}

	pub fn messages(&self) -> &[ChatMessage] {
		self.state.messages()
	}

	pub fn typing(&self) -> &TypingIndicator {
		self.state.typing()
	}

	/// Receives a snapshot after every change.
	pub fn subscribe(&self) -> watch::Receiver<SessionState> {
		self.updates.subscribe()
	}

	/// True once there is neither a channel nor a pending typing expiry.
	pub fn is_finished(&self) -> bool {
		self.channel.is_none() && !self.typing_timer.is_armed()
	}

	/// Opens the configured endpoint.
	pub async fn connect(&mut self) -> SessionResult<Outcome> {
		let endpoint = self.config.endpoint.clone();
		self.open(&endpoint).await
	}

	/// Opens a channel to `endpoint` and waits for it to settle.
	///
	/// Fails with [`SessionError::AlreadyOpen`] while a channel is connecting
	/// or open, whatever `endpoint` is, and otherwise with
	/// [`SessionError::InvalidEndpoint`] for anything but a `ws`/`wss` URL.
	/// A failed connection is not an error: the session ends up
	/// [`SessionStatus::Errored`].
	pub async fn open(&mut self, endpoint: &str) -> SessionResult<Outcome> {
		if self.state.status().is_live() {
			return Err(SessionError::AlreadyOpen);
		}
		let url = parse_endpoint(endpoint)?.to_string();
		self.endpoint = Some(url.clone());
		self
			.dispatch(SessionEvent::OpenRequested { endpoint: url })
			.await
	}

	/// Sends a chat message. Ignored unless the channel is open and `text`
	/// is non-empty.
	pub async fn send_message(&mut self, text: impl Into<String>) -> Outcome {
		self.request(SessionEvent::SendRequested(text.into())).await
	}

	/// Tells the peer the local user is typing.
	pub async fn notify_typing(&mut self) -> Outcome {
		self
			.request(SessionEvent::TypingRequested { preview: None })
			.await
	}

	/// Tells the peer the local user is typing, including the current draft.
	pub async fn notify_typing_with_preview(&mut self, draft: impl Into<String>) -> Outcome {
		self
			.request(SessionEvent::TypingRequested {
				preview: Some(draft.into()),
			})
			.await
	}

	/// Closes the channel. Closing a closed session is a no-op.
	pub async fn close(&mut self) -> Outcome {
		self.request(SessionEvent::CloseRequested).await
	}

	/// Waits for the next inbound frame, channel failure or typing expiry
	/// and applies it.
	///
	/// Returns the resulting snapshot, or `None` when the session has
	/// nothing left to wait for. Cancel-safe.
	pub async fn next_update(&mut self) -> Option<SessionState> {
		if self.is_finished() {
			return None;
		}

		let event = tokio::select! {
			received = recv_or_pending(self.channel.as_mut()) => inbound_event(received),
			() = self.typing_timer.fire() => SessionEvent::TypingExpired,
		};

		self.request(event).await;
		Some(self.state.clone())
	}

	async fn request(&mut self, event: SessionEvent) -> Outcome {
		match self.dispatch(event).await {
			Ok(outcome) => outcome,
			Err(e) => {
				warn!(error = %e, "event rejected");
				Outcome::Ignored(IgnoreReason::Rejected)
			}
		}
	}

	/// Runs an event and every follow-up event its actions produce.
	async fn dispatch(&mut self, event: SessionEvent) -> SessionResult<Outcome> {
		let actions = self.state.handle_event(event)?;
		let outcome = Outcome::from_actions(&actions);
		self.publish();

		let mut pending = VecDeque::new();
		self.execute_all(actions, &mut pending).await;

		while let Some(event) = pending.pop_front() {
			match self.state.handle_event(event) {
				Ok(actions) => {
					self.publish();
					self.execute_all(actions, &mut pending).await;
				}
				Err(e) => warn!(error = %e, "follow-up event rejected"),
			}
		}

		Ok(outcome)
	}

	async fn execute_all(
		&mut self,
		actions: Vec<SessionAction>,
		pending: &mut VecDeque<SessionEvent>,
	) {
		for action in actions {
			if let Some(event) = self.execute(action).await {
				pending.push_back(event);
			}
		}
	}

	async fn execute(&mut self, action: SessionAction) -> Option<SessionEvent> {
		match action {
			SessionAction::Connect { endpoint } => {
				let url = match parse_endpoint(&endpoint) {
					Ok(url) => url,
					Err(e) => {
						return Some(SessionEvent::TransportErrored {
							reason: e.to_string(),
						})
					}
				};
				match self.connector.connect(&url).await {
					Ok(channel) => {
						self.channel = Some(channel);
						Some(SessionEvent::TransportOpened)
					}
					Err(e) => {
						warn!(endpoint = %url, error = %e, "failed to open channel");
						Some(SessionEvent::TransportErrored {
							reason: e.to_string(),
						})
					}
				}
			}
			SessionAction::Transmit(envelope) => {
				let Some(channel) = self.channel.as_mut() else {
					debug!("no channel to transmit on");
					return None;
				};
				match channel.send(envelope.to_frame()).await {
					Ok(()) => match envelope {
						Envelope::Message { text } => Some(SessionEvent::MessageTransmitted(text)),
						Envelope::Typing { .. } => None,
					},
					Err(e) => {
						warn!(error = %e, "failed to send frame");
						Some(SessionEvent::TransportErrored {
							reason: e.to_string(),
						})
					}
				}
			}
			SessionAction::ArmTypingTimer => {
				self.typing_timer.arm(());
				None
			}
			SessionAction::CancelTypingTimer => {
				self.typing_timer.cancel();
				None
			}
			SessionAction::CloseChannel => {
				if let Some(mut channel) = self.channel.take() {
					if let Err(e) = channel.close().await {
						debug!(error = %e, "error while closing channel");
					}
				}
				None
			}
			SessionAction::Notify(notice) => {
				self.notifier.notify(&notice);
				None
			}
			SessionAction::Ignored(reason) => {
				debug!(?reason, status = %self.state.status(), "request ignored");
				None
			}
		}
	}

	fn publish(&self) {
		let state = &self.state;
		self.updates.send_if_modified(|current| {
			if current == state {
				false
			} else {
				*current = state.clone();
				true
			}
		});
	}
}

impl std::fmt::Debug for ChatSession {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ChatSession")
			.field("endpoint", &self.endpoint)
			.field("status", &self.state.status())
			.field("messages", &self.state.messages().len())
			.field("has_channel", &self.channel.is_some())
			.finish()
	}
}

async fn recv_or_pending(
	channel: Option<&mut Box<dyn Channel>>,
) -> Option<Result<InboundFrame, TransportError>> {
	match channel {
		Some(channel) => channel.recv().await,
		None => future::pending().await,
	}
}

fn inbound_event(received: Option<Result<InboundFrame, TransportError>>) -> SessionEvent {
	match received {
		Some(Ok(frame)) => {
			let text = frame.into_text();
			debug!(len = text.len(), "frame received");
			SessionEvent::PayloadReceived(text)
		}
		Some(Err(e)) => {
			warn!(error = %e, "channel failed");
			SessionEvent::TransportErrored {
				reason: e.to_string(),
			}
		}
		None => SessionEvent::TransportClosed,
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Chat session state machine.
//!
//! [`SessionState::handle_event`] is a pure transition function: it mutates
//! the state and returns the [`SessionAction`]s the owner of the transport
//! must perform. Nothing in here touches a socket or a clock.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::envelope::{decode_inbound, Envelope, InboundPayload};
use crate::error::{SessionError, SessionResult};
use crate::message::ChatMessage;
use crate::notice::SessionNotice;

/// Connection status of the session's channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
	Connecting,
	Open,
	Closed,
	Errored,
}

impl SessionStatus {
	pub fn name(&self) -> &'static str {
		match self {
			Self::Connecting => "Connecting",
			Self::Open => "Open",
			Self::Closed => "Closed",
			Self::Errored => "Errored",
		}
	}

	/// True while a channel exists or is being established.
	pub fn is_live(&self) -> bool {
		matches!(self, Self::Connecting | Self::Open)
	}
}

impl fmt::Display for SessionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Whether the remote peer is currently typing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypingIndicator {
	active: bool,
	preview: Option<String>,
}

impl TypingIndicator {
	pub fn is_active(&self) -> bool {
		self.active
	}

	/// Draft text sent along with the typing signal, if any.
	pub fn preview(&self) -> Option<&str> {
		self.preview.as_deref()
	}

	fn start(&mut self, preview: Option<String>) {
		self.active = true;
		self.preview = preview;
	}

	/// Returns whether the indicator was active.
	fn clear(&mut self) -> bool {
		let was_active = self.active;
		self.active = false;
		self.preview = None;
		was_active
	}
}

/// Why a request produced no effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
	ChannelNotOpen,
	EmptyMessage,
	AlreadyClosed,
	/// The state machine refused the event outright.
	Rejected,
}

/// Result of a request that never raises.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
	Applied,
	Ignored(IgnoreReason),
}

impl Outcome {
	/// Collapses the actions of a single transition into an outcome.
	pub fn from_actions(actions: &[SessionAction]) -> Self {
		actions
			.iter()
			.find_map(|action| match action {
				SessionAction::Ignored(reason) => Some(Outcome::Ignored(*reason)),
				_ => None,
			})
			.unwrap_or(Outcome::Applied)
	}

	pub fn is_applied(&self) -> bool {
		matches!(self, Self::Applied)
	}
}

/// Inputs to the state machine: client intents and transport callbacks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
	OpenRequested { endpoint: String },
	TransportOpened,
	TransportErrored { reason: String },
	TransportClosed,
	PayloadReceived(String),
	SendRequested(String),
	/// A chat message reached the channel.
	MessageTransmitted(String),
	TypingRequested { preview: Option<String> },
	TypingExpired,
	CloseRequested,
}

impl SessionEvent {
	pub fn name(&self) -> &'static str {
		match self {
			Self::OpenRequested { .. } => "OpenRequested",
			Self::TransportOpened => "TransportOpened",
			Self::TransportErrored { .. } => "TransportErrored",
			Self::TransportClosed => "TransportClosed",
			Self::PayloadReceived(_) => "PayloadReceived",
			Self::SendRequested(_) => "SendRequested",
			Self::MessageTransmitted(_) => "MessageTransmitted",
			Self::TypingRequested { .. } => "TypingRequested",
			Self::TypingExpired => "TypingExpired",
			Self::CloseRequested => "CloseRequested",
		}
	}
}

/// Work the owner of the channel must carry out after a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionAction {
	/// Establish the channel.
	Connect { endpoint: String },
	/// Write an envelope onto the channel.
	Transmit(Envelope),
	/// Arm (or re-arm) the typing expiry timer.
	ArmTypingTimer,
	/// Cancel any armed typing expiry timer.
	CancelTypingTimer,
	/// Close and release the channel.
	CloseChannel,
	/// Forward a notice to the notification surface.
	Notify(SessionNotice),
	/// The event was accepted but had no effect.
	Ignored(IgnoreReason),
}

/// Observable state of one chat session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
	status: SessionStatus,
	messages: Vec<ChatMessage>,
	typing: TypingIndicator,
}

impl Default for SessionState {
	fn default() -> Self {
		Self::new()
	}
}

impl SessionState {
	/// A session without a channel reports `Closed`.
	pub fn new() -> Self {
		Self {
			status: SessionStatus::Closed,
			messages: Vec::new(),
			typing: TypingIndicator::default(),
		}
	}

	pub fn status(&self) -> SessionStatus {
		self.status
	}

	/// The ordered, append-only conversation log.
	pub fn messages(&self) -> &[ChatMessage] {
		&self.messages
	}

	pub fn typing(&self) -> &TypingIndicator {
		&self.typing
	}

	pub fn is_peer_typing(&self) -> bool {
		self.typing.is_active()
	}

	/// Applies an event and returns the actions the caller must perform.
	///
	/// The only error is [`SessionError::AlreadyOpen`], returned for an open
	/// request while a channel is live; the state is left untouched.
	pub fn handle_event(&mut self, event: SessionEvent) -> SessionResult<Vec<SessionAction>> {
		let from = self.status;
		debug!(status = from.name(), event = event.name(), "handling event");

		let actions = match event {
			SessionEvent::OpenRequested { endpoint } => {
				if from.is_live() {
					return Err(SessionError::AlreadyOpen);
				}
				self.messages.clear();
				self.typing.clear();
				self.transition(SessionStatus::Connecting);
				vec![
					SessionAction::CancelTypingTimer,
					SessionAction::Notify(SessionNotice::Connecting {
						endpoint: endpoint.clone(),
					}),
					SessionAction::Connect { endpoint },
				]
			}

			SessionEvent::TransportOpened => {
				self.transition(SessionStatus::Open);
				vec![SessionAction::Notify(SessionNotice::Connected)]
			}

			SessionEvent::TransportErrored { reason } => {
				self.typing.clear();
				self.transition(SessionStatus::Errored);
				vec![
					SessionAction::CancelTypingTimer,
					SessionAction::CloseChannel,
					SessionAction::Notify(SessionNotice::Errored { reason }),
				]
			}

			SessionEvent::TransportClosed => {
				if from == SessionStatus::Closed {
					vec![]
				} else {
					self.typing.clear();
					self.transition(SessionStatus::Closed);
					vec![
						SessionAction::CancelTypingTimer,
						SessionAction::CloseChannel,
						SessionAction::Notify(SessionNotice::Disconnected),
					]
				}
			}

			SessionEvent::PayloadReceived(raw) => {
				if from != SessionStatus::Open {
					vec![SessionAction::Ignored(IgnoreReason::ChannelNotOpen)]
				} else {
					self.apply_inbound(raw)
				}
			}

			SessionEvent::SendRequested(text) => {
				if from != SessionStatus::Open {
					vec![SessionAction::Ignored(IgnoreReason::ChannelNotOpen)]
				} else if text.is_empty() {
					vec![SessionAction::Ignored(IgnoreReason::EmptyMessage)]
				} else {
					self.messages.push(ChatMessage::local(text.clone()));
					vec![SessionAction::Transmit(Envelope::message(text))]
				}
			}

			SessionEvent::MessageTransmitted(text) => {
				if from == SessionStatus::Open {
					vec![SessionAction::Notify(SessionNotice::MessageSent { text })]
				} else {
					vec![]
				}
			}

			SessionEvent::TypingRequested { preview } => {
				if from != SessionStatus::Open {
					vec![SessionAction::Ignored(IgnoreReason::ChannelNotOpen)]
				} else {
					vec![SessionAction::Transmit(Envelope::Typing { text: preview })]
				}
			}

			SessionEvent::TypingExpired => {
				if self.typing.clear() {
					debug!("peer typing indicator expired");
				}
				vec![]
			}

			SessionEvent::CloseRequested => {
				if from == SessionStatus::Closed {
					vec![SessionAction::Ignored(IgnoreReason::AlreadyClosed)]
				} else {
					self.typing.clear();
					self.transition(SessionStatus::Closed);
					vec![
						SessionAction::CancelTypingTimer,
						SessionAction::CloseChannel,
						SessionAction::Notify(SessionNotice::Disconnected),
					]
				}
			}
		};

		Ok(actions)
	}

	fn apply_inbound(&mut self, raw: String) -> Vec<SessionAction> {
		let text = match decode_inbound(&raw) {
			InboundPayload::Envelope(Envelope::Typing { text }) => {
				self.typing.start(text);
				return vec![SessionAction::ArmTypingTimer];
			}
			InboundPayload::Envelope(Envelope::Message { text }) => text,
			InboundPayload::RawText(text) => text,
		};

		self.messages.push(ChatMessage::remote(text.clone()));
		let mut actions = Vec::with_capacity(2);
		if self.typing.clear() {
			actions.push(SessionAction::CancelTypingTimer);
		}
		actions.push(SessionAction::Notify(SessionNotice::MessageReceived { text }));
		actions
	}

	fn transition(&mut self, to: SessionStatus) {
		if self.status != to {
			info!(from = self.status.name(), to = to.name(), "state transition");
		}
		self.status = to;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::message::Sender;
	use proptest::prelude::*;

	fn open_state() -> SessionState {
		let mut state = SessionState::new();
		state
			.handle_event(SessionEvent::OpenRequested {
				endpoint: "wss://chat.test".into(),
			})
			.unwrap();
		state.handle_event(SessionEvent::TransportOpened).unwrap();
		state
	}

	fn receive(state: &mut SessionState, raw: &str) -> Vec<SessionAction> {
		state
			.handle_event(SessionEvent::PayloadReceived(raw.to_string()))
			.unwrap()
	}

	fn transmitted(actions: &[SessionAction]) -> Vec<&Envelope> {
		actions
			.iter()
			.filter_map(|a| match a {
				SessionAction::Transmit(envelope) => Some(envelope),
				_ => None,
			})
			.collect()
	}

	/// A fresh session has no channel, so it reports `Closed` with an empty
	/// log.
	#[test]
	fn test_new_session_is_closed_and_empty() {
		let state = SessionState::new();
		assert_eq!(state.status(), SessionStatus::Closed);
		assert!(state.messages().is_empty());
		assert!(!state.is_peer_typing());
	}

	#[test]
	fn test_open_requested_transitions_to_connecting() {
		let mut state = SessionState::new();
		let actions = state
			.handle_event(SessionEvent::OpenRequested {
				endpoint: "wss://chat.test".into(),
			})
			.unwrap();

		assert_eq!(state.status(), SessionStatus::Connecting);
		assert_eq!(
			actions.last(),
			Some(&SessionAction::Connect {
				endpoint: "wss://chat.test".into()
			})
		);
		assert!(actions.contains(&SessionAction::Notify(SessionNotice::Connecting {
			endpoint: "wss://chat.test".into()
		})));
	}

	#[test]
	fn test_transport_opened_transitions_to_open() {
		let state = open_state();
		assert_eq!(state.status(), SessionStatus::Open);
	}

	/// Opening while a channel is live is rejected and leaves the log,
	/// status and typing flag exactly as they were.
	#[test]
	fn test_open_while_open_fails_with_already_open() {
		let mut state = open_state();
		receive(&mut state, r#"{"type":"message","text":"kept"}"#);
		receive(&mut state, r#"{"type":"typing"}"#);
		let before = state.clone();

		let result = state.handle_event(SessionEvent::OpenRequested {
			endpoint: "wss://other.test".into(),
		});

		assert_eq!(result, Err(SessionError::AlreadyOpen));
		assert_eq!(state, before);
	}

	#[test]
	fn test_open_while_connecting_fails_with_already_open() {
		let mut state = SessionState::new();
		state
			.handle_event(SessionEvent::OpenRequested {
				endpoint: "wss://chat.test".into(),
			})
			.unwrap();

		let result = state.handle_event(SessionEvent::OpenRequested {
			endpoint: "wss://chat.test".into(),
		});
		assert_eq!(result, Err(SessionError::AlreadyOpen));
		assert_eq!(state.status(), SessionStatus::Connecting);
	}

	/// A new session after a terminal status discards the previous log.
	#[test]
	fn test_reopen_after_close_starts_fresh_session() {
		let mut state = open_state();
		state
			.handle_event(SessionEvent::SendRequested("old".into()))
			.unwrap();
		state.handle_event(SessionEvent::CloseRequested).unwrap();

		state
			.handle_event(SessionEvent::OpenRequested {
				endpoint: "wss://chat.test".into(),
			})
			.unwrap();

		assert_eq!(state.status(), SessionStatus::Connecting);
		assert!(state.messages().is_empty());
	}

	#[test]
	fn test_send_while_open_appends_local_and_transmits() {
		let mut state = open_state();
		let actions = state
			.handle_event(SessionEvent::SendRequested("hello".into()))
			.unwrap();

		assert_eq!(state.messages(), &[ChatMessage::local("hello")]);
		assert_eq!(transmitted(&actions), vec![&Envelope::message("hello")]);
		assert!(!actions
			.iter()
			.any(|action| matches!(action, SessionAction::Notify(_))));
		assert_eq!(Outcome::from_actions(&actions), Outcome::Applied);
	}

	#[test]
	fn test_message_sent_notice_follows_transmission() {
		let mut state = open_state();
		state
			.handle_event(SessionEvent::SendRequested("hello".into()))
			.unwrap();

		let actions = state
			.handle_event(SessionEvent::MessageTransmitted("hello".into()))
			.unwrap();
		assert_eq!(
			actions,
			vec![SessionAction::Notify(SessionNotice::MessageSent {
				text: "hello".into()
			})]
		);
		assert_eq!(state.messages(), &[ChatMessage::local("hello")]);
	}

	#[test]
	fn test_transmission_after_error_is_silent() {
		let mut state = open_state();
		state
			.handle_event(SessionEvent::TransportErrored {
				reason: "reset".into(),
			})
			.unwrap();

		let actions = state
			.handle_event(SessionEvent::MessageTransmitted("late".into()))
			.unwrap();
		assert!(actions.is_empty());
	}

	/// Sends while not open produce no traffic and no log mutation, for
	/// empty and non-empty text alike.
	#[test]
	fn test_send_while_not_open_is_ignored() {
		let mut connecting = SessionState::new();
		connecting
			.handle_event(SessionEvent::OpenRequested {
				endpoint: "wss://chat.test".into(),
			})
			.unwrap();
		let mut closed = SessionState::new();
		let mut errored = open_state();
		errored
			.handle_event(SessionEvent::TransportErrored {
				reason: "boom".into(),
			})
			.unwrap();

		for state in [&mut connecting, &mut closed, &mut errored] {
			for text in ["", "hello"] {
				let actions = state
					.handle_event(SessionEvent::SendRequested(text.into()))
					.unwrap();
				assert_eq!(
					actions,
					vec![SessionAction::Ignored(IgnoreReason::ChannelNotOpen)]
				);
				assert!(state.messages().is_empty());
			}
		}
	}

	#[test]
	fn test_send_empty_text_while_open_is_ignored() {
		let mut state = open_state();
		let actions = state
			.handle_event(SessionEvent::SendRequested(String::new()))
			.unwrap();
		assert_eq!(
			Outcome::from_actions(&actions),
			Outcome::Ignored(IgnoreReason::EmptyMessage)
		);
		assert!(state.messages().is_empty());
	}

	#[test]
	fn test_typing_request_transmits_without_local_change() {
		let mut state = open_state();
		let before = state.clone();
		let actions = state
			.handle_event(SessionEvent::TypingRequested { preview: None })
			.unwrap();

		assert_eq!(transmitted(&actions), vec![&Envelope::typing()]);
		assert_eq!(state, before);
	}

	#[test]
	fn test_typing_request_while_not_open_is_ignored() {
		let mut state = SessionState::new();
		let actions = state
			.handle_event(SessionEvent::TypingRequested { preview: None })
			.unwrap();
		assert_eq!(
			actions,
			vec![SessionAction::Ignored(IgnoreReason::ChannelNotOpen)]
		);
	}

	#[test]
	fn test_inbound_raw_text_becomes_remote_message() {
		let mut state = open_state();
		let actions = receive(&mut state, "not json at all");

		assert_eq!(state.messages(), &[ChatMessage::remote("not json at all")]);
		assert!(actions.contains(&SessionAction::Notify(
			SessionNotice::MessageReceived {
				text: "not json at all".into()
			}
		)));
	}

	#[test]
	fn test_inbound_message_envelope_appends_remote_text() {
		let mut state = open_state();
		receive(&mut state, r#"{"type":"message","text":"hi"}"#);

		assert_eq!(state.messages().len(), 1);
		assert_eq!(state.messages()[0].text(), "hi");
		assert_eq!(state.messages()[0].sender(), Sender::Remote);
	}

	#[test]
	fn test_inbound_typing_sets_flag_and_arms_timer() {
		let mut state = open_state();
		let actions = receive(&mut state, r#"{"type":"typing","text":"dra"}"#);

		assert!(state.is_peer_typing());
		assert_eq!(state.typing().preview(), Some("dra"));
		assert_eq!(actions, vec![SessionAction::ArmTypingTimer]);
		assert!(state.messages().is_empty());
	}

	#[test]
	fn test_repeated_typing_rearms_timer() {
		let mut state = open_state();
		receive(&mut state, r#"{"type":"typing"}"#);
		let actions = receive(&mut state, r#"{"type":"typing"}"#);
		assert_eq!(actions, vec![SessionAction::ArmTypingTimer]);
		assert!(state.is_peer_typing());
	}

	#[test]
	fn test_inbound_message_clears_typing() {
		let mut state = open_state();
		receive(&mut state, r#"{"type":"typing"}"#);
		let actions = receive(&mut state, r#"{"type":"message","text":"hi"}"#);

		assert!(!state.is_peer_typing());
		assert_eq!(actions[0], SessionAction::CancelTypingTimer);
		assert_eq!(state.messages(), &[ChatMessage::remote("hi")]);
	}

	#[test]
	fn test_raw_fallback_also_clears_typing() {
		let mut state = open_state();
		receive(&mut state, r#"{"type":"typing"}"#);
		receive(&mut state, "plain");
		assert!(!state.is_peer_typing());
	}

	#[test]
	fn test_typing_expired_clears_flag() {
		let mut state = open_state();
		receive(&mut state, r#"{"type":"typing"}"#);
		let actions = state.handle_event(SessionEvent::TypingExpired).unwrap();

		assert!(actions.is_empty());
		assert!(!state.is_peer_typing());
		assert_eq!(state.typing().preview(), None);
	}

	#[test]
	fn test_payload_while_not_open_is_ignored() {
		let mut state = SessionState::new();
		let actions = receive(&mut state, r#"{"type":"message","text":"late"}"#);
		assert_eq!(
			actions,
			vec![SessionAction::Ignored(IgnoreReason::ChannelNotOpen)]
		);
		assert!(state.messages().is_empty());
	}

	#[test]
	fn test_transport_error_transitions_to_errored() {
		let mut state = open_state();
		receive(&mut state, r#"{"type":"typing"}"#);
		let actions = state
			.handle_event(SessionEvent::TransportErrored {
				reason: "reset".into(),
			})
			.unwrap();

		assert_eq!(state.status(), SessionStatus::Errored);
		assert!(!state.is_peer_typing());
		assert!(actions.contains(&SessionAction::CancelTypingTimer));
		assert!(actions.contains(&SessionAction::CloseChannel));
		assert!(actions.contains(&SessionAction::Notify(SessionNotice::Errored {
			reason: "reset".into()
		})));
	}

	#[test]
	fn test_transport_closed_transitions_to_closed() {
		let mut state = open_state();
		let actions = state.handle_event(SessionEvent::TransportClosed).unwrap();
		assert_eq!(state.status(), SessionStatus::Closed);
		assert!(actions.contains(&SessionAction::Notify(SessionNotice::Disconnected)));
	}

	#[test]
	fn test_transport_closed_after_error_transitions_to_closed() {
		let mut state = open_state();
		state
			.handle_event(SessionEvent::TransportErrored {
				reason: "reset".into(),
			})
			.unwrap();
		state.handle_event(SessionEvent::TransportClosed).unwrap();
		assert_eq!(state.status(), SessionStatus::Closed);
	}

	#[test]
	fn test_close_twice_tears_down_once() {
		let mut state = open_state();
		let first = state.handle_event(SessionEvent::CloseRequested).unwrap();
		let second = state.handle_event(SessionEvent::CloseRequested).unwrap();

		assert_eq!(state.status(), SessionStatus::Closed);
		assert!(first.contains(&SessionAction::CloseChannel));
		assert_eq!(
			second,
			vec![SessionAction::Ignored(IgnoreReason::AlreadyClosed)]
		);
	}

	#[test]
	fn test_close_keeps_log() {
		let mut state = open_state();
		state
			.handle_event(SessionEvent::SendRequested("bye".into()))
			.unwrap();
		state.handle_event(SessionEvent::CloseRequested).unwrap();
		assert_eq!(state.messages(), &[ChatMessage::local("bye")]);
	}

	#[test]
	fn test_close_from_errored_transitions_to_closed() {
		let mut state = open_state();
		state
			.handle_event(SessionEvent::TransportErrored {
				reason: "reset".into(),
			})
			.unwrap();
		let actions = state.handle_event(SessionEvent::CloseRequested).unwrap();
		assert_eq!(state.status(), SessionStatus::Closed);
		assert!(actions.contains(&SessionAction::CloseChannel));
	}

	#[test]
	fn test_peer_close_after_local_close_is_silent() {
		let mut state = open_state();
		state.handle_event(SessionEvent::CloseRequested).unwrap();
		let actions = state.handle_event(SessionEvent::TransportClosed).unwrap();
		assert!(actions.is_empty());
	}

	#[derive(Clone, Debug)]
	enum Step {
		Local(String),
		Remote(String),
	}

	fn step_strategy() -> impl Strategy<Value = Step> {
		prop_oneof![
			"[a-z]{1,12}".prop_map(Step::Local),
			"[a-z]{1,12}".prop_map(Step::Remote),
		]
	}

	proptest! {
		/// **Property: N inbound messages interleaved with M local sends
		/// yield exactly N+M entries in call order**
		#[test]
		fn log_preserves_interleaving(steps in proptest::collection::vec(step_strategy(), 0..40)) {
			let mut state = open_state();
			for step in &steps {
				match step {
					Step::Local(text) => {
						state.handle_event(SessionEvent::SendRequested(text.clone())).unwrap();
					}
					Step::Remote(text) => {
						let raw = Envelope::message(text.clone()).to_frame();
						state.handle_event(SessionEvent::PayloadReceived(raw)).unwrap();
					}
				}
			}

			prop_assert_eq!(state.messages().len(), steps.len());
			for (entry, step) in state.messages().iter().zip(&steps) {
				let expected = match step {
					Step::Local(text) => ChatMessage::local(text.clone()),
					Step::Remote(text) => ChatMessage::remote(text.clone()),
				};
				prop_assert_eq!(entry, &expected);
			}
		}

		/// **Property: every arbitrary inbound payload lands in the log or
		/// toggles typing, never both and never an error**
		#[test]
		fn any_payload_is_absorbed(raw in ".*") {
			let mut state = open_state();
			let result = state.handle_event(SessionEvent::PayloadReceived(raw.clone()));
			prop_assert!(result.is_ok());
			prop_assert!(state.messages().len() + usize::from(state.is_peer_typing()) == 1);
		}

		/// **Property: nothing but open/close changes status while not open**
		#[test]
		fn intents_never_mutate_closed_session(text in ".*", preview in proptest::option::of(".*")) {
			let mut state = SessionState::new();
			let before = state.clone();
			state.handle_event(SessionEvent::SendRequested(text)).unwrap();
			state.handle_event(SessionEvent::TypingRequested { preview }).unwrap();
			prop_assert_eq!(state, before);
		}
	}
}

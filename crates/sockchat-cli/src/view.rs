// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Line-oriented rendering of a chat session.

use sockchat_common_core::{
	ChatMessage, IgnoreReason, Notifier, Outcome, Sender, SessionNotice, SessionState, SessionStatus,
};
use tracing::debug;

/// Tracks what has already been printed so each snapshot only emits what
/// changed.
#[derive(Debug, Default)]
pub struct ChatView {
	rendered: usize,
	peer_typing: bool,
}

impl ChatView {
	/// Lines to print for `state` since the previous call.
	pub fn render(&mut self, state: &SessionState) -> Vec<String> {
		let messages = state.messages();
		if messages.len() < self.rendered {
			// A new session started with an empty log.
			self.rendered = 0;
		}

		let mut lines: Vec<String> = messages[self.rendered..].iter().map(render_message).collect();
		self.rendered = messages.len();

		let typing = state.typing();
		if typing.is_active() && !self.peer_typing {
			lines.push(match typing.preview() {
				Some(preview) => format!("  peer is typing: {preview}"),
				None => "  peer is typing...".to_string(),
			});
		}
		self.peer_typing = typing.is_active();

		lines
	}

	pub fn print(&mut self, state: &SessionState) {
		for line in self.render(state) {
			println!("{line}");
		}
	}
}

pub fn render_message(message: &ChatMessage) -> String {
	match message.sender() {
		Sender::Local => format!("you:  {}", message.text()),
		Sender::Remote => format!("peer: {}", message.text()),
	}
}

/// One-line summary for `/status`.
pub fn status_line(state: &SessionState, endpoint: &str) -> String {
	let mut line = format!(
		"{} ({endpoint}), {} message{}",
		state.status(),
		state.messages().len(),
		if state.messages().len() == 1 { "" } else { "s" },
	);
	if state.is_peer_typing() {
		line.push_str(", peer typing");
	}
	line
}

/// What to tell the user about a request that did nothing.
pub fn describe_outcome(outcome: Outcome, status: SessionStatus) -> Option<String> {
	match outcome {
		Outcome::Applied => None,
		Outcome::Ignored(IgnoreReason::ChannelNotOpen) => Some(match status {
			SessionStatus::Connecting => "not connected yet, still connecting".to_string(),
			_ => "not connected (use /connect)".to_string(),
		}),
		Outcome::Ignored(IgnoreReason::EmptyMessage) => Some("nothing to send".to_string()),
		Outcome::Ignored(IgnoreReason::AlreadyClosed) => Some("already disconnected".to_string()),
		Outcome::Ignored(IgnoreReason::Rejected) => Some("request rejected".to_string()),
	}
}

/// Prints connection notices as toast-style lines.
///
/// Message notices are left to [`ChatView`], which already shows the text.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl TerminalNotifier {
	pub fn toast(notice: &SessionNotice) -> Option<String> {
		match notice {
			SessionNotice::Connecting { .. }
			| SessionNotice::Connected
			| SessionNotice::Disconnected
			| SessionNotice::Errored { .. } => Some(format!("* {notice}")),
			SessionNotice::MessageSent { .. } | SessionNotice::MessageReceived { .. } => None,
		}
	}
}

impl Notifier for TerminalNotifier {
	fn notify(&self, notice: &SessionNotice) {
		match Self::toast(notice) {
			Some(line) => println!("{line}"),
			None => debug!(notice = %notice, "session notice"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use sockchat_common_core::SessionEvent;

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

	fn receive(state: &mut SessionState, raw: &str) {
		state
			.handle_event(SessionEvent::PayloadReceived(raw.into()))
			.unwrap();
	}

	#[test]
	fn renders_only_new_messages() {
		let mut view = ChatView::default();
		let mut state = open_state();
		receive(&mut state, "hi");
		assert_eq!(view.render(&state), vec!["peer: hi"]);

		state
			.handle_event(SessionEvent::SendRequested("hey".into()))
			.unwrap();
		assert_eq!(view.render(&state), vec!["you:  hey"]);
		assert!(view.render(&state).is_empty());
	}

	#[test]
	fn typing_is_announced_once() {
		let mut view = ChatView::default();
		let mut state = open_state();
		receive(&mut state, r#"{"type":"typing","text":"wai"}"#);
		assert_eq!(view.render(&state), vec!["  peer is typing: wai"]);

		receive(&mut state, r#"{"type":"typing"}"#);
		assert!(view.render(&state).is_empty());

		state.handle_event(SessionEvent::TypingExpired).unwrap();
		assert!(view.render(&state).is_empty());

		receive(&mut state, r#"{"type":"typing"}"#);
		assert_eq!(view.render(&state), vec!["  peer is typing..."]);
	}

	#[test]
	fn new_session_restarts_rendering() {
		let mut view = ChatView::default();
		let mut state = open_state();
		receive(&mut state, "one");
		receive(&mut state, "two");
		view.render(&state);

		state.handle_event(SessionEvent::CloseRequested).unwrap();
		state
			.handle_event(SessionEvent::OpenRequested {
				endpoint: "wss://chat.test".into(),
			})
			.unwrap();
		state.handle_event(SessionEvent::TransportOpened).unwrap();
		receive(&mut state, "fresh");
		assert_eq!(view.render(&state), vec!["peer: fresh"]);
	}

	#[test]
	fn status_line_summarises_state() {
		let mut state = open_state();
		receive(&mut state, "hi");
		receive(&mut state, r#"{"type":"typing"}"#);
		assert_eq!(
			status_line(&state, "wss://chat.test"),
			"Open (wss://chat.test), 1 message, peer typing"
		);
		assert_eq!(
			status_line(&SessionState::new(), "wss://chat.test"),
			"Closed (wss://chat.test), 0 messages"
		);
	}

	#[test]
	fn ignored_sends_explain_themselves() {
		assert_eq!(describe_outcome(Outcome::Applied, SessionStatus::Open), None);
		assert_eq!(
			describe_outcome(
				Outcome::Ignored(IgnoreReason::ChannelNotOpen),
				SessionStatus::Closed
			)
			.as_deref(),
			Some("not connected (use /connect)")
		);
	}

	#[test]
	fn only_connection_notices_toast() {
		assert_eq!(
			TerminalNotifier::toast(&SessionNotice::Connected).as_deref(),
			Some("* WebSocket connected")
		);
		assert_eq!(
			TerminalNotifier::toast(&SessionNotice::MessageReceived { text: "x".into() }),
			None
		);
	}
}

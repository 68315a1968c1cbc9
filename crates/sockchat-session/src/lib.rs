// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Chat session controller for sockchat.
//!
//! Drives the [`sockchat_common_core::SessionState`] machine over a
//! [`Channel`], normally a WebSocket opened by [`WebSocketConnector`].

pub mod controller;
pub mod debounce;
pub mod transport;
pub mod websocket;

pub use controller::ChatSession;
pub use debounce::Debounce;
pub use transport::{parse_endpoint, Channel, Connector};
pub use websocket::{WebSocketChannel, WebSocketConnector};

pub use sockchat_common_core::{
	ChatMessage, IgnoreReason, Notifier, NullNotifier, Outcome, Sender, SessionConfig, SessionError,
	SessionNotice, SessionResult, SessionState, SessionStatus, TracingNotifier, TransportError,
	TypingIndicator,
};

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Fire-and-forget notifications for an observing notification surface.

use std::fmt;

use tracing::info;

/// Something a notification surface (toasts, status line) may want to show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionNotice {
	Connecting { endpoint: String },
	Connected,
	Disconnected,
	Errored { reason: String },
	MessageSent { text: String },
	MessageReceived { text: String },
}

impl fmt::Display for SessionNotice {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Connecting { endpoint } => write!(f, "Connecting to {endpoint}"),
			Self::Connected => f.write_str("WebSocket connected"),
			Self::Disconnected => f.write_str("WebSocket disconnected"),
			Self::Errored { reason } => write!(f, "WebSocket error: {reason}"),
			Self::MessageSent { .. } => f.write_str("Message sent"),
			Self::MessageReceived { text } => write!(f, "Message: {text}"),
		}
	}
}

/// Receives session notices. Purely observational.
pub trait Notifier: Send + Sync {
	fn notify(&self, notice: &SessionNotice);
}

/// Forwards notices to the tracing subscriber.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
	fn notify(&self, notice: &SessionNotice) {
		info!(notice = %notice, "session notice");
	}
}

/// Discards every notice.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
	fn notify(&self, _notice: &SessionNotice) {}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors a caller can receive from a chat session.
///
/// Transport failures are not in here: they are absorbed into
/// [`SessionStatus::Errored`](crate::SessionStatus::Errored).
#[derive(Clone, Error, Debug, PartialEq, Eq)]
pub enum SessionError {
	#[error("a channel is already open for this session")]
	AlreadyOpen,

	#[error("invalid endpoint {endpoint:?}: {reason}")]
	InvalidEndpoint { endpoint: String, reason: String },
}

impl SessionError {
	pub fn invalid_endpoint(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::InvalidEndpoint {
			endpoint: endpoint.into(),
			reason: reason.into(),
		}
	}
}

/// Errors raised by a duplex channel implementation.
#[derive(Clone, Error, Debug, PartialEq, Eq)]
pub enum TransportError {
	#[error("connect failed: {0}")]
	Connect(String),

	#[error("connect timed out after {0:?}")]
	ConnectTimeout(std::time::Duration),

	#[error("unsupported URL scheme: {0}")]
	UnsupportedScheme(String),

	#[error("send failed: {0}")]
	Send(String),

	#[error("receive failed: {0}")]
	Receive(String),

	#[error("close failed: {0}")]
	Close(String),
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

/// Which side of the channel produced a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
	Local,
	Remote,
}

/// A single entry of the conversation log. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
	text: String,
	sender: Sender,
}

impl ChatMessage {
	pub fn local(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			sender: Sender::Local,
		}
	}

	pub fn remote(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			sender: Sender::Remote,
		}
	}

	pub fn text(&self) -> &str {
		&self.text
	}

	pub fn sender(&self) -> Sender {
		self.sender
	}

	pub fn is_local(&self) -> bool {
		self.sender == Sender::Local
	}
}

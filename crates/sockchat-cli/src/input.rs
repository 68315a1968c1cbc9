// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Parsing of lines typed at the chat prompt.

/// What a line of terminal input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
	/// Blank line.
	Empty,
	/// Chat text to send as-is.
	Send(String),
	/// `/typing [draft]`
	Typing(Option<String>),
	/// `/connect [endpoint]`
	Connect(Option<String>),
	/// `/status`
	Status,
	/// `/help`
	Help,
	/// `/quit` or `/exit`
	Quit,
	/// A `/word` that is not a known command.
	Unknown(String),
}

pub const HELP: &str = "commands: /typing [draft], /status, /connect [endpoint], /quit";

/// Parses one line of input. Text not starting with `/` is sent verbatim;
/// `//` escapes a leading slash.
pub fn parse_input(line: &str) -> InputCommand {
	let line = line.trim_end_matches(['\r', '\n']);
	if line.trim().is_empty() {
		return InputCommand::Empty;
	}

	if let Some(escaped) = line.strip_prefix("//") {
		return InputCommand::Send(format!("/{escaped}"));
	}

	let Some(command) = line.strip_prefix('/') else {
		return InputCommand::Send(line.to_string());
	};

	let (name, rest) = match command.split_once(char::is_whitespace) {
		Some((name, rest)) => (name, rest.trim()),
		None => (command, ""),
	};
	let argument = (!rest.is_empty()).then(|| rest.to_string());

	match name {
		"typing" => InputCommand::Typing(argument),
		"connect" => InputCommand::Connect(argument),
		"status" => InputCommand::Status,
		"help" => InputCommand::Help,
		"quit" | "exit" => InputCommand::Quit,
		other => InputCommand::Unknown(other.to_string()),
	}
}

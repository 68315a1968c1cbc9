// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! sockchat - terminal client for WebSocket chat rooms
//!
//! Lines typed at the prompt are sent as chat messages; lines starting with
//! `/` are commands. Logs go to stderr so the conversation on stdout stays
//! readable.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sockchat_cli_config::{load_config_with_cli, CliOverrides, LogFormat, LogLevel, SockchatConfig};
use sockchat_session::{ChatSession, SessionError, SessionStatus};

mod input;
mod view;

use input::{parse_input, InputCommand, HELP};
use view::{describe_outcome, status_line, ChatView, TerminalNotifier};

/// sockchat - chat over a WebSocket from the terminal
#[derive(Parser, Debug)]
#[command(name = "sockchat", version, about, long_about = None)]
struct Args {
	/// Path to custom configuration file
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Chat server endpoint (ws:// or wss://)
	#[arg(short, long)]
	endpoint: Option<String>,

	/// How long the peer typing indicator lasts, in milliseconds
	#[arg(long)]
	typing_window_ms: Option<u64>,

	/// Send the draft text along with /typing
	#[arg(long)]
	typing_preview: bool,

	/// Log level (overrides config)
	#[arg(short, long)]
	log_level: Option<String>,

	/// Output logs as JSON (overrides config)
	#[arg(long)]
	json_logs: bool,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Join the chat (default)
	Chat,

	/// Print the resolved configuration
	Config {
		/// Print as JSON
		#[arg(long)]
		json: bool,
	},
}

impl From<&Args> for CliOverrides {
	fn from(args: &Args) -> Self {
		Self {
			endpoint: args.endpoint.clone(),
			typing_window_ms: args.typing_window_ms,
			typing_preview: args.typing_preview.then_some(true),
			log_level: args.log_level.clone(),
			log_format: if args.json_logs {
				Some("json".to_string())
			} else {
				None
			},
			config_file: args.config.clone(),
		}
	}
}

fn log_level_to_tracing(level: LogLevel) -> tracing::Level {
	match level {
		LogLevel::Trace => tracing::Level::TRACE,
		LogLevel::Debug => tracing::Level::DEBUG,
		LogLevel::Info => tracing::Level::INFO,
		LogLevel::Warn => tracing::Level::WARN,
		LogLevel::Error => tracing::Level::ERROR,
	}
}

/// Warnings raised while configuration loads, before [`init_tracing`] runs.
fn bootstrap_subscriber<W>(make_writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
	W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
	fmt::Subscriber::builder()
		.with_max_level(tracing::Level::WARN)
		.with_writer(make_writer)
		.compact()
		.finish()
}

fn init_tracing(logging: &sockchat_cli_config::LoggingConfig) {
	let level = log_level_to_tracing(logging.level);
	// Every crate in the workspace has a `sockchat` target prefix.
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(format!("sockchat={level}")));

	match logging.format {
		LogFormat::Json => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().json().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Compact => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().compact().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Pretty => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().pretty().with_writer(std::io::stderr))
				.init();
		}
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();

	let overrides = CliOverrides::from(&args);
	let config = tracing::subscriber::with_default(bootstrap_subscriber(std::io::stderr), || {
		load_config_with_cli(overrides)
	})
	.context("failed to load configuration")?;

	init_tracing(&config.logging);

	match args.command {
		None | Some(Command::Chat) => run_chat(config).await,
		Some(Command::Config { json }) => print_config(&config, json),
	}
}

fn print_config(config: &SockchatConfig, json: bool) -> Result<()> {
	if json {
		let rendered =
			serde_json::to_string_pretty(config).context("failed to serialize configuration")?;
		println!("{rendered}");
		return Ok(());
	}

	let session = &config.session;
	println!("endpoint             {}", session.endpoint);
	println!("typing_window_ms     {}", session.typing_window.as_millis());
	println!("connect_timeout_secs {}", session.connect_timeout.as_secs());
	println!("typing_preview       {}", session.typing_preview);
	println!("log_level            {}", config.logging.level);
	if let Some(paths) = &config.paths {
		println!("user_config          {}", paths.user_config_file.display());
	}
	Ok(())
}

/// Reads stdin on a dedicated thread; tokio's stdin would hold up runtime
/// shutdown while a read is pending.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
	let (tx, rx) = mpsc::channel(16);
	std::thread::spawn(move || {
		let stdin = std::io::stdin();
		for line in stdin.lock().lines() {
			match line {
				Ok(line) => {
					if tx.blocking_send(line).is_err() {
						break;
					}
				}
				Err(e) => {
					warn!(error = %e, "failed to read stdin");
					break;
				}
			}
		}
	});
	rx
}

async fn open(session: &mut ChatSession, endpoint: &str) {
	match session.open(endpoint).await {
		Ok(_) => {}
		Err(SessionError::AlreadyOpen) => println!("already connected; /quit first"),
		Err(e) => println!("{e}"),
	}
}

async fn run_chat(config: SockchatConfig) -> Result<()> {
	let endpoint = config.session.endpoint.clone();
	let typing_preview = config.session.typing_preview;

	info!(endpoint = %endpoint, "starting sockchat");

	let mut session = ChatSession::websocket(config.session).with_notifier(Arc::new(TerminalNotifier));
	let mut view = ChatView::default();
	let mut lines = spawn_stdin_reader();

	let ctrl_c = tokio::signal::ctrl_c();
	tokio::pin!(ctrl_c);

	println!("{HELP}");
	open(&mut session, &endpoint).await;
	view.print(session.state());

	loop {
		tokio::select! {
			line = lines.recv() => {
				let Some(line) = line else {
					debug!("stdin closed");
					break;
				};

				let outcome = match parse_input(&line) {
					InputCommand::Empty => None,
					InputCommand::Quit => break,
					InputCommand::Help => {
						println!("{HELP}");
						None
					}
					InputCommand::Unknown(name) => {
						println!("unknown command /{name}; {HELP}");
						None
					}
					InputCommand::Status => {
						let current = session.endpoint().unwrap_or(&endpoint);
						println!("{}", status_line(session.state(), current));
						None
					}
					InputCommand::Connect(target) => {
						let target = target.unwrap_or_else(|| endpoint.clone());
						open(&mut session, &target).await;
						None
					}
					InputCommand::Typing(Some(draft)) if typing_preview => {
						Some(session.notify_typing_with_preview(draft).await)
					}
					InputCommand::Typing(_) => Some(session.notify_typing().await),
					InputCommand::Send(text) => Some(session.send_message(text).await),
				};

				if let Some(message) = outcome.and_then(|o| describe_outcome(o, session.status())) {
					println!("{message}");
				}
			}

			update = session.next_update(), if !session.is_finished() => {
				if let Some(state) = update {
					debug!(status = %state.status(), "session updated");
				}
			}

			result = &mut ctrl_c => {
				if let Err(e) = result {
					warn!(error = %e, "failed to listen for ctrl-c");
				}
				info!("interrupted");
				break;
			}
		}

		view.print(session.state());
	}

	if session.status() != SessionStatus::Closed {
		session.close().await;
	}
	view.print(session.state());
	Ok(())
}

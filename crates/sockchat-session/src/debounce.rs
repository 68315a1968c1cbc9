// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! A single re-armable deadline.

use std::future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{sleep, Instant, Sleep};

/// Fires once, `window` after the most recent [`arm`](Debounce::arm).
///
/// Arming again replaces the previous deadline, so a burst of arms fires
/// once after the burst goes quiet. The deadline lives inside the struct:
/// dropping a pending [`fire`](Debounce::fire) future leaves it armed.
#[derive(Debug)]
pub struct Debounce<T> {
	window: Duration,
	armed: Option<(Pin<Box<Sleep>>, T)>,
}

impl<T> Debounce<T> {
	pub fn new(window: Duration) -> Self {
		Self {
			window,
			armed: None,
		}
	}

	pub fn window(&self) -> Duration {
		self.window
	}

	/// Cancels any pending deadline and arms a new one.
	pub fn arm(&mut self, value: T) {
		self.armed = Some((Box::pin(sleep(self.window)), value));
	}

	/// Disarms the timer, returning the value it held.
	pub fn cancel(&mut self) -> Option<T> {
		self.armed.take().map(|(_, value)| value)
	}

	pub fn is_armed(&self) -> bool {
		self.armed.is_some()
	}

	pub fn deadline(&self) -> Option<Instant> {
		self.armed.as_ref().map(|(timer, _)| timer.deadline())
	}

	/// Waits for the deadline and disarms. Pending forever while unarmed.
	pub async fn fire(&mut self) -> T {
		match self.armed.as_mut() {
			Some((timer, _)) => timer.as_mut().await,
			None => future::pending::<()>().await,
		}

		match self.armed.take() {
			Some((_, value)) => value,
			None => future::pending().await,
		}
	}
}

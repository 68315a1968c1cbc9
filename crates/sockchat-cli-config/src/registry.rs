// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration registry - manages sources and merges layers.

use tracing::{debug, info, warn};

use crate::layer::ConfigLayer;
use crate::paths::PathsConfig;
use crate::runtime::SockchatConfig;
use crate::sources::{ConfigSource, Precedence};
use crate::validation::validate_config;
use crate::ConfigError;

/// Registry that manages configuration sources and merges them.
pub struct ConfigRegistry {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl ConfigRegistry {
	pub fn new() -> Self {
		Self {
			sources: Vec::new(),
		}
	}

	pub fn register(&mut self, source: Box<dyn ConfigSource>) {
		debug!(source = source.name(), precedence = ?source.precedence(), "registering config source");
		self.sources.push(source);
	}

	/// Load configuration from all sources, merge, and validate.
	///
	/// Sources are sorted by precedence (lowest first) and merged
	/// so higher precedence sources override lower ones. A broken ambient
	/// file is skipped with a warning; a broken explicit file is an error.
	pub fn load(&self, paths: Option<PathsConfig>) -> Result<SockchatConfig, ConfigError> {
		let mut sorted_sources: Vec<_> = self.sources.iter().collect();
		sorted_sources.sort_by_key(|s| s.precedence());

		info!(
			source_count = sorted_sources.len(),
			"loading configuration from sources"
		);

		let mut merged = ConfigLayer::default();
		for source in &sorted_sources {
			match source.load() {
				Ok(layer) => {
					debug!(source = source.name(), "merging config layer");
					merged.merge(layer);
				}
				Err(e) if source.precedence() == Precedence::ExplicitFile => return Err(e),
				Err(e) => {
					warn!(source = source.name(), error = %e, "failed to load source, skipping");
				}
			}
		}

		let config = SockchatConfig::from_layer(merged, paths)?;
		validate_config(&config)?;

		info!(
			endpoint = %config.session.endpoint,
			typing_window_ms = config.session.typing_window.as_millis() as u64,
			log_level = %config.logging.level,
			"configuration loaded successfully"
		);

		Ok(config)
	}

	pub fn source_count(&self) -> usize {
		self.sources.len()
	}
}

impl Default for ConfigRegistry {
	fn default() -> Self {
		Self::new()
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Builder pattern for configuring the global tracing subscriber

use std::error::Error;

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Output format of the installed subscriber
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TracingFormat {
	Compact,
	Pretty,
	Json,
}

/// Builder for the process-wide tracing subscriber
#[derive(Debug, Clone)]
pub struct TracingBuilder {
	level: Level,
	filter: Option<String>,
	format: TracingFormat,
	with_target: bool,
	with_thread_names: bool,
	test_writer: bool,
}

impl TracingBuilder {
	/// Create a new tracing builder with default settings
	pub fn new() -> Self {
		Self {
			level: Level::INFO,
			filter: None,
			format: TracingFormat::Compact,
			with_target: true,
			with_thread_names: false,
			test_writer: false,
		}
	}

	/// Builder preset for test binaries: debug level, output captured by the
	/// test harness
	pub fn testing() -> Self {
		Self::new().level(Level::DEBUG).test_writer(true)
	}

	pub fn level(mut self, level: Level) -> Self {
		self.level = level;
		self
	}

	/// Additional `EnvFilter` directives, e.g. `replica_store_differential=trace`
	pub fn filter(mut self, directive: impl Into<String>) -> Self {
		self.filter = Some(directive.into());
		self
	}

	pub fn format(mut self, format: TracingFormat) -> Self {
		self.format = format;
		self
	}

	pub fn with_target(mut self, with_target: bool) -> Self {
		self.with_target = with_target;
		self
	}

	pub fn with_thread_names(mut self, with_thread_names: bool) -> Self {
		self.with_thread_names = with_thread_names;
		self
	}

	pub fn test_writer(mut self, test_writer: bool) -> Self {
		self.test_writer = test_writer;
		self
	}

	/// `RUST_LOG` wins when set; otherwise the configured level and filter
	/// directives apply.
	pub fn env_filter(&self) -> EnvFilter {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directive()))
	}

	fn directive(&self) -> String {
		let mut directive = self.level.to_string().to_lowercase();
		if let Some(filter) = &self.filter {
			directive.push(',');
			directive.push_str(filter);
		}
		directive
	}

	/// Install the subscriber globally. Fails if one is already installed.
	pub fn try_init(self) -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
		let builder = tracing_subscriber::fmt()
			.with_env_filter(self.env_filter())
			.with_target(self.with_target)
			.with_thread_names(self.with_thread_names);

		match (self.format, self.test_writer) {
			(TracingFormat::Compact, false) => builder.compact().try_init(),
			(TracingFormat::Compact, true) => builder.compact().with_test_writer().try_init(),
			(TracingFormat::Pretty, false) => builder.pretty().try_init(),
			(TracingFormat::Pretty, true) => builder.pretty().with_test_writer().try_init(),
			(TracingFormat::Json, false) => builder.json().try_init(),
			(TracingFormat::Json, true) => builder.json().with_test_writer().try_init(),
		}
	}
}

impl Default for TracingBuilder {
	fn default() -> Self {
		Self::new()
	}
}

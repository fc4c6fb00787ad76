// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

use replica_store_consolidated::ConsolidationMode;
use replica_store_differential::DifferentialConfig;

/// Configuration for a [`VersionedStore`](crate::VersionedStore).
#[derive(Debug, Clone)]
pub struct StoreConfig {
	/// How long an apply waits for the lock of its key.
	pub lock_timeout: Duration,
	pub differential: DifferentialConfig,
	/// Where evicted versions go. With a queued worker, a full queue stalls
	/// the evicting apply and every apply or read hitting the same map shard
	/// for up to the worker's `enqueue_timeout`.
	pub consolidation: ConsolidationMode,
}

impl Default for StoreConfig {
	fn default() -> Self {
		Self {
			lock_timeout: Duration::from_secs(4),
			differential: DifferentialConfig::default(),
			consolidation: ConsolidationMode::default(),
		}
	}
}

impl StoreConfig {
	pub fn lock_timeout(mut self, timeout: Duration) -> Self {
		self.lock_timeout = timeout;
		self
	}

	pub fn differential(mut self, config: DifferentialConfig) -> Self {
		self.differential = config;
		self
	}

	pub fn consolidation(mut self, mode: ConsolidationMode) -> Self {
		self.consolidation = mode;
		self
	}
}

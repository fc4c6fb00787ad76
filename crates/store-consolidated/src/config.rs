// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

/// Configuration for the consolidation worker.
#[derive(Debug, Clone)]
pub struct ConsolidationWorkerConfig {
	/// Maximum number of evicted versions waiting in the channel.
	pub channel_capacity: usize,
	/// How many evicted versions to merge per batch.
	pub batch_size: usize,
	/// Maximum time to wait before merging a partial batch.
	pub flush_interval: Duration,
	/// How long an evicting writer may wait for room in a full channel.
	///
	/// The writer holds the map shard of its key while it waits, so reads
	/// and writes of every key in that shard stall for up to this long.
	pub enqueue_timeout: Duration,
}

impl Default for ConsolidationWorkerConfig {
	fn default() -> Self {
		Self {
			channel_capacity: 10_000,
			batch_size: 100,
			flush_interval: Duration::from_millis(50),
			enqueue_timeout: Duration::from_millis(50),
		}
	}
}

/// Where evicted versions are merged.
#[derive(Debug, Clone, Default)]
pub enum ConsolidationMode {
	/// Merge on the evicting thread.
	#[default]
	Inline,
	/// Queue for a background worker.
	Queued(ConsolidationWorkerConfig),
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

/// Sizing of the differential key map.
#[derive(Debug, Clone)]
pub struct DifferentialConfig {
	/// Number of keys the map is sized for up front.
	pub initial_capacity: usize,
	/// Number of independently locked map shards. Rounded up to a power of
	/// two, minimum two.
	pub shard_amount: usize,
}

impl Default for DifferentialConfig {
	fn default() -> Self {
		Self {
			initial_capacity: 1024,
			shard_amount: 64,
		}
	}
}

impl DifferentialConfig {
	pub fn initial_capacity(mut self, capacity: usize) -> Self {
		self.initial_capacity = capacity;
		self
	}

	pub fn shard_amount(mut self, shards: usize) -> Self {
		self.shard_amount = shards;
		self
	}

	pub(crate) fn effective_shard_amount(&self) -> usize {
		self.shard_amount.max(2).next_power_of_two()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_shard_amount_is_normalised() {
		assert_eq!(DifferentialConfig::default().shard_amount(0).effective_shard_amount(), 2);
		assert_eq!(DifferentialConfig::default().shard_amount(12).effective_shard_amount(), 16);
		assert_eq!(DifferentialConfig::default().effective_shard_amount(), 64);
	}
}

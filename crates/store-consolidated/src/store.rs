// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::HashMap,
	hash::Hash,
	sync::{
		Arc,
		atomic::{AtomicU64, Ordering},
	},
};

use parking_lot::RwLock;
use replica_store_differential::{Consolidate, VersionedItem};
use replica_type::{Result, SequenceNumber};
use tracing::trace;
use xxhash_rust::xxh3::Xxh3Builder;

/// Base store holding the newest consolidated version of every key.
///
/// Deletions are kept as tombstones so that a late merge of an older version
/// cannot resurrect a removed key.
pub struct ConsolidatedStore<K, V> {
	entries: RwLock<HashMap<K, Arc<VersionedItem<V>>, Xxh3Builder>>,
	last_merged: AtomicU64,
}

impl<K, V> ConsolidatedStore<K, V>
where
	K: Eq + Hash,
{
	pub fn new() -> Self {
		Self {
			entries: RwLock::new(HashMap::with_hasher(Xxh3Builder::new())),
			last_merged: AtomicU64::new(0),
		}
	}

	/// Merges `item` as the version of `key`, unless an equal or newer
	/// version is already present. Returns whether the item was taken.
	pub fn merge(&self, key: K, item: Arc<VersionedItem<V>>) -> bool {
		let sequence = item.sequence_number();
		let mut entries = self.entries.write();
		if let Some(existing) = entries.get(&key) {
			if existing.sequence_number() >= sequence {
				trace!(%sequence, existing = %existing.sequence_number(), "ignoring stale merge");
				return false;
			}
		}
		entries.insert(key, item);
		self.last_merged.fetch_max(sequence.0, Ordering::AcqRel);
		true
	}

	/// The live version of `key`; tombstoned keys read as absent.
	pub fn get(&self, key: &K) -> Option<Arc<VersionedItem<V>>> {
		self.entries.read().get(key).filter(|item| !item.is_deleted()).cloned()
	}

	pub fn contains_key(&self, key: &K) -> bool {
		self.get(key).is_some()
	}

	/// Number of keys with a live value.
	pub fn len(&self) -> usize {
		self.entries.read().values().filter(|item| !item.is_deleted()).count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Highest sequence number merged so far.
	pub fn last_merged_sequence(&self) -> SequenceNumber {
		SequenceNumber(self.last_merged.load(Ordering::Acquire))
	}
}

impl<K, V> ConsolidatedStore<K, V>
where
	K: Eq + Hash,
	V: Clone,
{
	pub fn get_value(&self, key: &K) -> Option<V> {
		self.get(key).and_then(|item| item.value().ok().cloned())
	}
}

impl<K, V> Default for ConsolidatedStore<K, V>
where
	K: Eq + Hash,
{
	fn default() -> Self {
		Self::new()
	}
}

impl<K, V> Consolidate<K, V> for ConsolidatedStore<K, V>
where
	K: Eq + Hash + Clone + Send + Sync,
	V: Send + Sync,
{
	fn consolidate(&self, key: &K, item: Arc<VersionedItem<V>>) -> Result<()> {
		self.merge(key.clone(), item);
		Ok(())
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{fmt::Debug, hash::Hash, sync::Arc};

use replica_store_consolidated::{ConsolidatedStore, Consolidator};
use replica_store_differential::{DifferentialStoreComponent, VersionChain};
use replica_type::{Result, SequenceNumber};
use serde::de::DeserializeOwned;
use tracing::{instrument, trace};

use crate::{ApplyContext, KeyLockManager, LockContext, OperationRecord, StoreConfig};

/// Replicated key-value store layering the differential component over a
/// consolidated base store.
pub struct VersionedStore<K, V>
where
	K: Eq + Hash,
{
	differential: DifferentialStoreComponent<K, V>,
	consolidator: Consolidator<K, V>,
	locks: KeyLockManager<K>,
}

impl<K, V> VersionedStore<K, V>
where
	K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
	V: Send + Sync + 'static,
{
	pub fn new(config: StoreConfig) -> Result<Self> {
		let consolidator = Consolidator::new(config.consolidation, Arc::new(ConsolidatedStore::new()))?;
		Ok(Self {
			differential: DifferentialStoreComponent::with_config(config.differential),
			consolidator,
			locks: KeyLockManager::new(config.lock_timeout),
		})
	}

	/// Applies `record` at `sequence` under the lock of its key.
	///
	/// On success the key stays locked until the returned context is passed
	/// to [`Self::unlock`] or dropped. On failure the lock is already
	/// released.
	#[instrument(
		name = "store::apply",
		level = "trace",
		skip(self, record),
		fields(key = ?record.key, modification = %record.modification)
	)]
	pub fn apply(
		&self,
		sequence: SequenceNumber,
		record: OperationRecord<K>,
		context: ApplyContext,
	) -> Result<LockContext<K>>
	where
		V: DeserializeOwned,
	{
		let lock = self.locks.acquire(&record.key, sequence, context)?;

		match context {
			ApplyContext::Primary | ApplyContext::Secondary => {
				let (key, item) = record.into_item(sequence)?;
				self.differential.add(key, item, &self.consolidator)?;
			}
			ApplyContext::SecondaryFalseProgress => {
				let outcome =
					self.differential.undo_false_progress(&record.key, sequence, record.modification)?;
				trace!(?outcome, "false progress undone");
			}
		}

		Ok(lock)
	}

	pub fn unlock(&self, context: LockContext<K>) {
		context.release();
	}

	/// Recent versions of `key`; `None` when the key has none in the
	/// differential layer.
	pub fn read_versions(&self, key: &K) -> Option<VersionChain<V>> {
		self.differential.read_versions(key)
	}

	/// Merges every chain of the differential layer into the base store and
	/// waits for the merge to land. Returns the number of keys moved.
	///
	/// A chain leaves the differential layer only after all of its versions
	/// were handed off, so a failed hand-off keeps every unmerged key
	/// readable. Chains written concurrently stay behind.
	pub fn consolidate(&self) -> Result<usize> {
		let keys = self.differential.consolidate_into(&self.consolidator)?;
		self.consolidator.flush()?;
		Ok(keys)
	}

	pub fn differential(&self) -> &DifferentialStoreComponent<K, V> {
		&self.differential
	}

	pub fn consolidated(&self) -> &Arc<ConsolidatedStore<K, V>> {
		self.consolidator.store()
	}

	pub fn locks(&self) -> &KeyLockManager<K> {
		&self.locks
	}
}

impl<K, V> VersionedStore<K, V>
where
	K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
	V: Clone + Send + Sync + 'static,
{
	/// Latest value of `key`. The differential layer answers when it holds
	/// the key; otherwise the base store does.
	pub fn get(&self, key: &K) -> Result<Option<V>> {
		if let Some(current) = self.differential.read_versions(key).and_then(|chain| chain.current().cloned()) {
			if current.is_deleted() {
				return Ok(None);
			}
			return current.value().cloned().map(Some);
		}
		Ok(self.consolidated().get_value(key))
	}

	pub fn contains_key(&self, key: &K) -> Result<bool> {
		Ok(self.get(key)?.is_some())
	}
}

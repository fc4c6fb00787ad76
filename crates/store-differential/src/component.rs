// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::Debug,
	hash::{BuildHasher, Hash},
	mem,
	sync::Arc,
};

use dashmap::{DashMap, mapref::entry::Entry};
use replica_type::{Error, Result, SequenceNumber, StoreModification};
use tracing::{debug, error, instrument, trace};
use xxhash_rust::xxh3::Xxh3Builder;

use crate::{Consolidate, DifferentialConfig, Slot, VersionChain, VersionedItem};

/// How an undo request changed the chain of its key.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UndoOutcome {
	/// The current version was undone and the previous version took its place.
	Promoted,
	/// The only resident version was undone and the key left the layer.
	Removed,
	/// An already superseded version was dropped from the previous slot.
	ClearedPrevious,
	/// The targeted version is no longer resident; it was consolidated or
	/// never reached this layer.
	Evicted,
	/// The key has no chain in this layer.
	NoChain,
}

impl UndoOutcome {
	pub fn is_noop(&self) -> bool {
		matches!(self, UndoOutcome::Evicted | UndoOutcome::NoChain)
	}
}

/// Key to version-chain map of the differential layer.
///
/// The component takes no locks of its own beyond the internal sharding of
/// the map; callers serialize mutations per key.
pub struct DifferentialStoreComponent<K, V, S = Xxh3Builder> {
	chains: DashMap<K, VersionChain<V>, S>,
}

impl<K, V> DifferentialStoreComponent<K, V, Xxh3Builder>
where
	K: Eq + Hash,
{
	pub fn new() -> Self {
		Self::with_config(DifferentialConfig::default())
	}

	pub fn with_config(config: DifferentialConfig) -> Self {
		Self::with_config_and_hasher(config, Xxh3Builder::new())
	}
}

impl<K, V> Default for DifferentialStoreComponent<K, V, Xxh3Builder>
where
	K: Eq + Hash,
{
	fn default() -> Self {
		Self::new()
	}
}

impl<K, V, S> DifferentialStoreComponent<K, V, S>
where
	K: Eq + Hash,
	S: BuildHasher + Clone,
{
	/// Creates a component hashing keys with `hasher` for its whole
	/// lifetime.
	pub fn with_hasher(hasher: S) -> Self {
		Self::with_config_and_hasher(DifferentialConfig::default(), hasher)
	}

	pub fn with_config_and_hasher(config: DifferentialConfig, hasher: S) -> Self {
		Self {
			chains: DashMap::with_capacity_and_hasher_and_shard_amount(
				config.initial_capacity,
				hasher,
				config.effective_shard_amount(),
			),
		}
	}

	pub fn len(&self) -> usize {
		self.chains.len()
	}

	pub fn is_empty(&self) -> bool {
		self.chains.is_empty()
	}

	pub fn contains_key(&self, key: &K) -> bool {
		self.chains.contains_key(key)
	}

	/// Point-in-time copy of the chain for `key`.
	///
	/// `None` only says the key has no recent versions; it may still exist
	/// in the consolidated base store.
	pub fn read_versions(&self, key: &K) -> Option<VersionChain<V>> {
		self.chains.get(key).map(|chain| chain.value().clone())
	}
}

impl<K, V, S> DifferentialStoreComponent<K, V, S>
where
	K: Eq + Hash + Debug,
	S: BuildHasher + Clone,
{
	/// Records `item` as the newest version of `key`.
	///
	/// When the chain is full, the previous version is handed to
	/// `consolidator` before the chain shifts. A consolidator failure leaves
	/// the chain untouched.
	#[instrument(
		name = "differential::add",
		level = "trace",
		skip_all,
		fields(key = ?key, sequence = %item.sequence_number(), kind = %item.kind())
	)]
	pub fn add<C>(&self, key: K, item: VersionedItem<V>, consolidator: &C) -> Result<()>
	where
		C: Consolidate<K, V> + ?Sized,
	{
		let item = Arc::new(item);
		match self.chains.entry(key) {
			Entry::Vacant(entry) => {
				trace!("starting new chain");
				entry.insert(VersionChain::new(item));
			}
			Entry::Occupied(mut entry) => {
				if let Some(current) = entry.get().newest_sequence() {
					if item.sequence_number() <= current {
						error!(%current, "out of order apply");
						return Err(Error::OutOfOrderApply {
							key: format!("{:?}", entry.key()),
							current,
							attempted: item.sequence_number(),
						});
					}
				}

				if let Some(previous) = entry.get().previous().cloned() {
					debug!(evicted = %previous.sequence_number(), "handing previous version to consolidation");
					consolidator.consolidate(entry.key(), previous)?;
				}

				entry.get_mut().push(item);
				trace!("shifted chain");
			}
		}
		Ok(())
	}

	/// Reverses the operation applied at `sequence` on `key`.
	///
	/// `modification` is checked against the kind of the matching version; a
	/// disagreement means the undo was misrouted and is reported as
	/// [`Error::UndoKindMismatch`] without touching the chain. Targets that
	/// are no longer resident are benign no-ops.
	#[instrument(name = "differential::undo_false_progress", level = "trace", skip(self))]
	pub fn undo_false_progress(
		&self,
		key: &K,
		sequence: SequenceNumber,
		modification: StoreModification,
	) -> Result<UndoOutcome> {
		let expected = modification.record_kind();
		let mut outcome = Ok(UndoOutcome::NoChain);

		self.chains.remove_if_mut(key, |key, chain| {
			let (slot, found) = match chain.locate(sequence) {
				Some((slot, item)) => (slot, item.kind()),
				None => {
					outcome = Ok(UndoOutcome::Evicted);
					return false;
				}
			};

			if found != expected {
				error!(%expected, %found, "undo request does not match the resident version");
				outcome = Err(Error::UndoKindMismatch {
					key: format!("{:?}", key),
					sequence,
					expected,
					found,
				});
				return false;
			}

			chain.discard(slot);
			outcome = Ok(match (slot, chain.is_empty()) {
				(Slot::Current, true) => UndoOutcome::Removed,
				(Slot::Current, false) => UndoOutcome::Promoted,
				(Slot::Previous, _) => UndoOutcome::ClearedPrevious,
			});
			chain.is_empty()
		});

		match &outcome {
			Ok(UndoOutcome::Evicted) => debug!("undo target already left the differential layer"),
			Ok(UndoOutcome::NoChain) => debug!("no chain to undo"),
			Ok(outcome) => trace!(?outcome, "undo applied"),
			Err(_) => {}
		}
		outcome
	}
}

impl<K, V, S> DifferentialStoreComponent<K, V, S>
where
	K: Eq + Hash + Clone,
	S: BuildHasher + Clone,
{
	/// Removes every chain from the layer and returns them.
	///
	/// Shards are drained one after another, so chains added concurrently
	/// may or may not be included; callers quiesce writers first.
	pub fn drain(&self) -> Vec<(K, VersionChain<V>)> {
		let mut drained = Vec::with_capacity(self.chains.len());
		self.chains.retain(|key, chain| {
			drained.push((key.clone(), mem::replace(chain, VersionChain::empty())));
			false
		});
		drained
	}

	/// Hands every resident version to `consolidator`, oldest first per key,
	/// and retires each chain once all of its versions were accepted.
	///
	/// A chain is only retired if its current version is still the one that
	/// was handed off. The first failed hand-off aborts the pass; its chain
	/// and every chain not yet visited stay in the layer. Returns the number
	/// of chains retired.
	pub fn consolidate_into<C>(&self, consolidator: &C) -> Result<usize>
	where
		C: Consolidate<K, V> + ?Sized,
	{
		let keys: Vec<K> = self.chains.iter().map(|entry| entry.key().clone()).collect();
		let mut retired = 0;

		for key in keys {
			let Some(chain) = self.read_versions(&key) else {
				continue;
			};
			let handed_off = chain.current().cloned();

			for item in chain.into_items() {
				consolidator.consolidate(&key, item)?;
			}

			let retire = self.chains.remove_if(&key, |_, chain| match (chain.current(), &handed_off) {
				(Some(current), Some(handed_off)) => Arc::ptr_eq(current, handed_off),
				_ => false,
			});
			if retire.is_some() {
				retired += 1;
			} else {
				trace!("chain changed during consolidation, kept");
			}
		}

		debug!(retired, "consolidated differential layer");
		Ok(retired)
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Mutex;

	use replica_type::RecordKind;

	use super::*;

	#[derive(Default)]
	struct Collect(Mutex<Vec<(i32, SequenceNumber)>>);

	impl Consolidate<i32, i32> for Collect {
		fn consolidate(&self, key: &i32, item: Arc<VersionedItem<i32>>) -> Result<()> {
			self.0.lock().unwrap().push((*key, item.sequence_number()));
			Ok(())
		}
	}

	struct Refuse;

	impl Consolidate<i32, i32> for Refuse {
		fn consolidate(&self, _key: &i32, _item: Arc<VersionedItem<i32>>) -> Result<()> {
			Err(Error::ConsolidationStopped)
		}
	}

	#[test]
	fn test_add_to_empty_key() {
		let component = DifferentialStoreComponent::new();
		component.add(5, VersionedItem::inserted(0u64, 2, 4), &Collect::default()).unwrap();

		let chain = component.read_versions(&5).unwrap();
		assert!(chain.previous().is_none());
		assert_eq!(*chain.current().unwrap().value().unwrap(), 2);
	}

	#[test]
	fn test_third_add_evicts_oldest() {
		let consolidated = Collect::default();
		let component = DifferentialStoreComponent::new();
		component.add(5, VersionedItem::inserted(1u64, 2, 4), &consolidated).unwrap();
		component.add(5, VersionedItem::updated(2u64, 6, 4), &consolidated).unwrap();
		assert!(consolidated.0.lock().unwrap().is_empty());

		component.add(5, VersionedItem::updated(3u64, 9, 4), &consolidated).unwrap();
		assert_eq!(*consolidated.0.lock().unwrap(), vec![(5, SequenceNumber(1))]);
	}

	#[test]
	fn test_out_of_order_add_is_rejected() {
		let component = DifferentialStoreComponent::new();
		component.add(5, VersionedItem::inserted(4u64, 2, 4), &Collect::default()).unwrap();

		let err = component.add(5, VersionedItem::updated(4u64, 3, 4), &Collect::default()).unwrap_err();
		assert_eq!(
			err,
			Error::OutOfOrderApply {
				key: "5".to_string(),
				current: SequenceNumber(4),
				attempted: SequenceNumber(4),
			}
		);
		assert_eq!(component.read_versions(&5).unwrap().len(), 1);
	}

	#[test]
	fn test_failed_consolidation_leaves_chain_untouched() {
		let component = DifferentialStoreComponent::new();
		component.add(5, VersionedItem::inserted(1u64, 2, 4), &Refuse).unwrap();
		component.add(5, VersionedItem::updated(2u64, 6, 4), &Refuse).unwrap();

		assert_eq!(
			component.add(5, VersionedItem::updated(3u64, 9, 4), &Refuse),
			Err(Error::ConsolidationStopped)
		);

		let chain = component.read_versions(&5).unwrap();
		assert_eq!(chain.newest_sequence(), Some(SequenceNumber(2)));
		assert_eq!(chain.previous().unwrap().sequence_number(), SequenceNumber(1));
	}

	#[test]
	fn test_undo_kind_mismatch_is_reported() {
		let component = DifferentialStoreComponent::new();
		component.add(5, VersionedItem::inserted(1u64, 2, 4), &Collect::default()).unwrap();

		let err = component.undo_false_progress(&5, SequenceNumber(1), StoreModification::Remove).unwrap_err();
		assert_eq!(
			err,
			Error::UndoKindMismatch {
				key: "5".to_string(),
				sequence: SequenceNumber(1),
				expected: RecordKind::Deleted,
				found: RecordKind::Inserted,
			}
		);
		assert!(component.contains_key(&5));
	}

	#[test]
	fn test_undo_without_chain_is_noop() {
		let component: DifferentialStoreComponent<i32, i32> = DifferentialStoreComponent::new();
		let outcome = component.undo_false_progress(&5, SequenceNumber(1), StoreModification::Add).unwrap();
		assert_eq!(outcome, UndoOutcome::NoChain);
		assert!(outcome.is_noop());
	}

	#[test]
	fn test_drain_empties_the_layer() {
		let component = DifferentialStoreComponent::new();
		for key in 0..10 {
			component.add(key, VersionedItem::inserted(1u64, key, 4), &Collect::default()).unwrap();
		}

		let mut drained = component.drain();
		drained.sort_by_key(|(key, _)| *key);
		assert_eq!(drained.len(), 10);
		assert_eq!(*drained[3].1.current().unwrap().value().unwrap(), 3);
		assert!(component.is_empty());
	}
}

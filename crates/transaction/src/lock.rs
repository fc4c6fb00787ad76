// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Debug, Formatter},
	hash::Hash,
	sync::Arc,
	time::Duration,
};

use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};
use replica_type::{Error, Result, SequenceNumber};
use self_cell::self_cell;
use tracing::{trace, warn};
use xxhash_rust::xxh3::Xxh3Builder;

use crate::ApplyContext;

type LockTable<K> = DashMap<K, Arc<Mutex<()>>, Xxh3Builder>;

type Guard<'a> = MutexGuard<'a, ()>;

// Owns both the key's mutex and the guard borrowing from it
self_cell! {
	struct HeldLock {
		owner: Arc<Mutex<()>>,

		#[covariant]
		dependent: Guard,
	}
}

/// Exclusive per-key locks serializing applies on the same key.
///
/// A key's mutex lives in the table only while someone holds or waits for
/// it.
pub struct KeyLockManager<K>
where
	K: Eq + Hash,
{
	locks: Arc<LockTable<K>>,
	timeout: Duration,
}

impl<K> KeyLockManager<K>
where
	K: Eq + Hash + Clone + Debug,
{
	pub fn new(timeout: Duration) -> Self {
		Self {
			locks: Arc::new(DashMap::with_hasher(Xxh3Builder::new())),
			timeout,
		}
	}

	/// Takes the lock of `key`, waiting at most the configured timeout.
	pub fn acquire(&self, key: &K, sequence: SequenceNumber, context: ApplyContext) -> Result<LockContext<K>> {
		let lock = Arc::clone(self.locks.entry(key.clone()).or_default().value());

		match HeldLock::try_new(lock, |lock| lock.try_lock_for(self.timeout).ok_or(())) {
			Ok(held) => {
				trace!(?key, %sequence, %context, "key locked");
				Ok(LockContext {
					key: key.clone(),
					sequence,
					context,
					held: Some(held),
					locks: Arc::clone(&self.locks),
				})
			}
			Err(()) => {
				reclaim(&self.locks, key);
				warn!(?key, %sequence, timeout = ?self.timeout, "timed out waiting for key lock");
				Err(Error::LockTimeout {
					key: format!("{:?}", key),
					timeout: self.timeout,
				})
			}
		}
	}

	pub fn is_locked(&self, key: &K) -> bool {
		self.locks.get(key).is_some_and(|lock| lock.is_locked())
	}

	/// Number of keys currently locked or waited on.
	pub fn len(&self) -> usize {
		self.locks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.locks.is_empty()
	}
}

fn reclaim<K: Eq + Hash>(locks: &LockTable<K>, key: &K) {
	locks.remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
}

/// Lock token of an applied operation.
///
/// Holds the key's lock until passed to
/// [`VersionedStore::unlock`](crate::VersionedStore::unlock) or dropped.
pub struct LockContext<K>
where
	K: Eq + Hash,
{
	key: K,
	sequence: SequenceNumber,
	context: ApplyContext,
	held: Option<HeldLock>,
	locks: Arc<LockTable<K>>,
}

impl<K> LockContext<K>
where
	K: Eq + Hash,
{
	pub fn key(&self) -> &K {
		&self.key
	}

	pub fn sequence_number(&self) -> SequenceNumber {
		self.sequence
	}

	pub fn apply_context(&self) -> ApplyContext {
		self.context
	}

	pub fn release(self) {
		drop(self)
	}
}

impl<K> Drop for LockContext<K>
where
	K: Eq + Hash,
{
	fn drop(&mut self) {
		if let Some(held) = self.held.take() {
			drop(held);
			reclaim(&self.locks, &self.key);
		}
	}
}

impl<K> Debug for LockContext<K>
where
	K: Eq + Hash + Debug,
{
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LockContext")
			.field("key", &self.key)
			.field("sequence", &self.sequence)
			.field("context", &self.context)
			.finish()
	}
}

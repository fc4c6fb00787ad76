// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::{
	Arc,
	atomic::{AtomicBool, Ordering},
};

use parking_lot::Mutex;
use replica_store_differential::{Consolidate, VersionedItem};
use replica_type::{Error, Result, SequenceNumber};

/// Consolidation collaborator that records every hand-off in order.
///
/// Can be switched to refuse hand-offs to exercise the failure path of the
/// differential layer.
pub struct RecordingConsolidator<K, V> {
	received: Mutex<Vec<(K, Arc<VersionedItem<V>>)>>,
	refuse: AtomicBool,
}

impl<K, V> RecordingConsolidator<K, V> {
	pub fn new() -> Self {
		Self {
			received: Mutex::new(Vec::new()),
			refuse: AtomicBool::new(false),
		}
	}

	/// A consolidator that fails every hand-off until [`Self::accept`].
	pub fn refusing() -> Self {
		let consolidator = Self::new();
		consolidator.refuse();
		consolidator
	}

	pub fn refuse(&self) {
		self.refuse.store(true, Ordering::Release);
	}

	pub fn accept(&self) {
		self.refuse.store(false, Ordering::Release);
	}

	pub fn len(&self) -> usize {
		self.received.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.received.lock().is_empty()
	}
}

impl<K: Clone, V> RecordingConsolidator<K, V> {
	/// Keys and sequence numbers received so far, in hand-off order.
	pub fn received(&self) -> Vec<(K, SequenceNumber)> {
		self.received.lock().iter().map(|(key, item)| (key.clone(), item.sequence_number())).collect()
	}
}

impl<K, V> Default for RecordingConsolidator<K, V> {
	fn default() -> Self {
		Self::new()
	}
}

impl<K, V> Consolidate<K, V> for RecordingConsolidator<K, V>
where
	K: Clone + Send + Sync,
	V: Send + Sync,
{
	fn consolidate(&self, key: &K, item: Arc<VersionedItem<V>>) -> Result<()> {
		if self.refuse.load(Ordering::Acquire) {
			return Err(Error::ConsolidationStopped);
		}
		self.received.lock().push((key.clone(), item));
		Ok(())
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{hash::Hash, sync::Arc};

use replica_store_differential::{Consolidate, VersionedItem};
use replica_type::Result;

use crate::{ConsolidatedStore, ConsolidationMode, ConsolidationWorker};

/// Consolidation target selected by [`ConsolidationMode`].
///
/// Uses enum dispatch instead of trait objects so the differential layer
/// calls into a concrete type.
pub enum Consolidator<K, V> {
	/// Merge on the evicting thread
	Inline(Arc<ConsolidatedStore<K, V>>),
	/// Merge on the background worker
	Queued(ConsolidationWorker<K, V>),
}

impl<K, V> Consolidator<K, V>
where
	K: Eq + Hash + Send + Sync + 'static,
	V: Send + Sync + 'static,
{
	pub fn new(mode: ConsolidationMode, store: Arc<ConsolidatedStore<K, V>>) -> Result<Self> {
		match mode {
			ConsolidationMode::Inline => Ok(Self::Inline(store)),
			ConsolidationMode::Queued(config) => Ok(Self::Queued(ConsolidationWorker::new(config, store)?)),
		}
	}
}

impl<K, V> Consolidator<K, V> {
	pub fn store(&self) -> &Arc<ConsolidatedStore<K, V>> {
		match self {
			Self::Inline(store) => store,
			Self::Queued(worker) => worker.store(),
		}
	}

	/// Wait until every handed-off version is visible in the base store.
	pub fn flush(&self) -> Result<()> {
		match self {
			Self::Inline(_) => Ok(()),
			Self::Queued(worker) => worker.flush(),
		}
	}
}

impl<K, V> Consolidate<K, V> for Consolidator<K, V>
where
	K: Eq + Hash + Clone + Send + Sync + 'static,
	V: Send + Sync + 'static,
{
	fn consolidate(&self, key: &K, item: Arc<VersionedItem<V>>) -> Result<()> {
		match self {
			Self::Inline(store) => store.consolidate(key, item),
			Self::Queued(worker) => worker.consolidate(key, item),
		}
	}
}

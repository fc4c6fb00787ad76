// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use replica_type::Result;

use crate::VersionedItem;

/// Receives versions evicted from the differential layer.
///
/// Ownership of the item passes to the implementation, which merges it into
/// the base store or queues it for merging. Implementations must not block
/// beyond a bounded enqueue, and must not call back into the differential
/// layer: the evicting key's map shard is held for the duration of the call.
pub trait Consolidate<K, V>: Send + Sync {
	fn consolidate(&self, key: &K, item: Arc<VersionedItem<V>>) -> Result<()>;
}

impl<K, V, T> Consolidate<K, V> for Arc<T>
where
	T: Consolidate<K, V> + ?Sized,
{
	#[inline]
	fn consolidate(&self, key: &K, item: Arc<VersionedItem<V>>) -> Result<()> {
		(**self).consolidate(key, item)
	}
}

impl<K, V, T> Consolidate<K, V> for &T
where
	T: Consolidate<K, V> + ?Sized,
{
	#[inline]
	fn consolidate(&self, key: &K, item: Arc<VersionedItem<V>>) -> Result<()> {
		(**self).consolidate(key, item)
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::mem::size_of;

use replica_store_differential::VersionedItem;
use replica_sub_tracing::TracingBuilder;

/// Inserted version of `value` at `sequence`, sized as its in-memory width.
pub fn inserted<V>(value: V, sequence: u64) -> VersionedItem<V> {
	VersionedItem::inserted(sequence, value, size_of::<V>())
}

pub fn updated<V>(value: V, sequence: u64) -> VersionedItem<V> {
	VersionedItem::updated(sequence, value, size_of::<V>())
}

pub fn deleted<V>(sequence: u64) -> VersionedItem<V> {
	VersionedItem::deleted(sequence)
}

/// Route tracing output of the current test binary through the test harness.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_tracing() {
	let _ = TracingBuilder::testing().try_init();
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use replica_type::SequenceNumber;

use crate::VersionedItem;

/// Which of the two chain slots a version occupies.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Slot {
	Current,
	Previous,
}

/// The bounded version history of a single key.
///
/// Holds at most two versions. When both slots are occupied the current
/// version always has the higher sequence number. A chain stored in the
/// differential layer always has a current version; a chain whose last
/// version was undone is removed from the layer instead of being kept empty.
#[derive(Debug)]
pub struct VersionChain<V> {
	current: Option<Arc<VersionedItem<V>>>,
	previous: Option<Arc<VersionedItem<V>>>,
}

impl<V> Clone for VersionChain<V> {
	fn clone(&self) -> Self {
		Self {
			current: self.current.clone(),
			previous: self.previous.clone(),
		}
	}
}

impl<V> VersionChain<V> {
	pub(crate) fn new(item: Arc<VersionedItem<V>>) -> Self {
		Self {
			current: Some(item),
			previous: None,
		}
	}

	pub(crate) fn empty() -> Self {
		Self {
			current: None,
			previous: None,
		}
	}

	pub fn current(&self) -> Option<&Arc<VersionedItem<V>>> {
		self.current.as_ref()
	}

	pub fn previous(&self) -> Option<&Arc<VersionedItem<V>>> {
		self.previous.as_ref()
	}

	pub fn newest_sequence(&self) -> Option<SequenceNumber> {
		self.current.as_ref().map(|item| item.sequence_number())
	}

	pub fn len(&self) -> usize {
		self.current.is_some() as usize + self.previous.is_some() as usize
	}

	pub fn is_empty(&self) -> bool {
		self.current.is_none() && self.previous.is_none()
	}

	/// Resident versions, newest first.
	pub fn iter(&self) -> impl Iterator<Item = &Arc<VersionedItem<V>>> {
		self.current.iter().chain(self.previous.iter())
	}

	pub(crate) fn locate(&self, sequence: SequenceNumber) -> Option<(Slot, &Arc<VersionedItem<V>>)> {
		if let Some(current) = &self.current {
			if current.sequence_number() == sequence {
				return Some((Slot::Current, current));
			}
		}
		if let Some(previous) = &self.previous {
			if previous.sequence_number() == sequence {
				return Some((Slot::Previous, previous));
			}
		}
		None
	}

	/// Shifts `item` in as the current version and returns the version that
	/// fell out of the previous slot.
	pub(crate) fn push(&mut self, item: Arc<VersionedItem<V>>) -> Option<Arc<VersionedItem<V>>> {
		debug_assert!(self.newest_sequence().is_none_or(|newest| newest < item.sequence_number()));
		let evicted = self.previous.take();
		self.previous = self.current.replace(item);
		evicted
	}

	/// Drops the version held in `slot`, promoting the previous version when
	/// the current one is discarded.
	pub(crate) fn discard(&mut self, slot: Slot) -> Option<Arc<VersionedItem<V>>> {
		match slot {
			Slot::Current => {
				let discarded = self.current.take();
				self.current = self.previous.take();
				discarded
			}
			Slot::Previous => self.previous.take(),
		}
	}

	pub fn into_items(self) -> impl Iterator<Item = Arc<VersionedItem<V>>> {
		// oldest first, the order a merge must observe
		self.previous.into_iter().chain(self.current)
	}
}

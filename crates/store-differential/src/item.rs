// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use replica_type::{Error, RecordKind, Result, SequenceNumber, StoreModification};
use serde::Serialize;

/// One write to a key, immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionedItem<V> {
	Inserted {
		sequence: SequenceNumber,
		value: V,
		value_size: usize,
	},
	Updated {
		sequence: SequenceNumber,
		value: V,
		value_size: usize,
	},
	Deleted {
		sequence: SequenceNumber,
	},
}

impl<V> VersionedItem<V> {
	pub fn inserted(sequence: impl Into<SequenceNumber>, value: V, value_size: usize) -> Self {
		Self::Inserted {
			sequence: sequence.into(),
			value,
			value_size,
		}
	}

	pub fn updated(sequence: impl Into<SequenceNumber>, value: V, value_size: usize) -> Self {
		Self::Updated {
			sequence: sequence.into(),
			value,
			value_size,
		}
	}

	pub fn deleted(sequence: impl Into<SequenceNumber>) -> Self {
		Self::Deleted {
			sequence: sequence.into(),
		}
	}

	/// Builds an item of the given kind with an explicit value size.
	///
	/// Inserted and updated versions require a value; deleted versions
	/// must not carry one.
	pub fn with_value_size(
		kind: RecordKind,
		sequence: impl Into<SequenceNumber>,
		value: Option<V>,
		value_size: usize,
	) -> Result<Self> {
		let sequence = sequence.into();
		match (kind, value) {
			(RecordKind::Inserted, Some(value)) => Ok(Self::inserted(sequence, value, value_size)),
			(RecordKind::Updated, Some(value)) => Ok(Self::updated(sequence, value, value_size)),
			(RecordKind::Deleted, None) => Ok(Self::deleted(sequence)),
			(RecordKind::Inserted, None) => Err(Error::MissingValue {
				modification: StoreModification::Add,
				sequence,
			}),
			(RecordKind::Updated, None) => Err(Error::MissingValue {
				modification: StoreModification::Update,
				sequence,
			}),
			(RecordKind::Deleted, Some(_)) => Err(Error::UnexpectedValue {
				sequence,
			}),
		}
	}

	pub fn kind(&self) -> RecordKind {
		match self {
			Self::Inserted {
				..
			} => RecordKind::Inserted,
			Self::Updated {
				..
			} => RecordKind::Updated,
			Self::Deleted {
				..
			} => RecordKind::Deleted,
		}
	}

	pub fn sequence_number(&self) -> SequenceNumber {
		match self {
			Self::Inserted {
				sequence,
				..
			}
			| Self::Updated {
				sequence,
				..
			}
			| Self::Deleted {
				sequence,
			} => *sequence,
		}
	}

	/// The value written by this version.
	///
	/// Asking a deleted version for its value is a caller bug and reported
	/// as [`Error::DeletedValueAccess`].
	pub fn value(&self) -> Result<&V> {
		match self {
			Self::Inserted {
				value,
				..
			}
			| Self::Updated {
				value,
				..
			} => Ok(value),
			Self::Deleted {
				sequence,
			} => Err(Error::DeletedValueAccess {
				sequence: *sequence,
			}),
		}
	}

	pub fn into_value(self) -> Result<V> {
		match self {
			Self::Inserted {
				value,
				..
			}
			| Self::Updated {
				value,
				..
			} => Ok(value),
			Self::Deleted {
				sequence,
			} => Err(Error::DeletedValueAccess {
				sequence,
			}),
		}
	}

	/// Serialized size of the value in bytes, zero for deletions.
	pub fn value_size(&self) -> usize {
		match self {
			Self::Inserted {
				value_size,
				..
			}
			| Self::Updated {
				value_size,
				..
			} => *value_size,
			Self::Deleted {
				..
			} => 0,
		}
	}

	pub fn is_deleted(&self) -> bool {
		matches!(self, Self::Deleted { .. })
	}
}

impl<V: Serialize> VersionedItem<V> {
	/// Builds an item of the given kind, measuring the value by its postcard
	/// encoding.
	pub fn create(kind: RecordKind, sequence: impl Into<SequenceNumber>, value: Option<V>) -> Result<Self> {
		let value_size = match &value {
			Some(value) => {
				postcard::to_allocvec(value).map_err(|e| Error::Serialization(e.to_string()))?.len()
			}
			None => 0,
		};
		Self::with_value_size(kind, sequence, value, value_size)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_accessors() {
		let item = VersionedItem::updated(7u64, 42i32, 4);
		assert_eq!(item.kind(), RecordKind::Updated);
		assert_eq!(item.sequence_number(), SequenceNumber(7));
		assert_eq!(*item.value().unwrap(), 42);
		assert_eq!(item.value_size(), 4);
		assert!(!item.is_deleted());
	}

	#[test]
	fn test_deleted_value_access_is_an_error() {
		let item: VersionedItem<i32> = VersionedItem::deleted(3u64);
		assert!(item.is_deleted());
		assert_eq!(item.value_size(), 0);
		assert_eq!(
			item.value(),
			Err(Error::DeletedValueAccess {
				sequence: SequenceNumber(3)
			})
		);
		assert!(item.into_value().is_err());
	}

	#[test]
	fn test_create_measures_postcard_size() {
		let item = VersionedItem::create(RecordKind::Inserted, 1u64, Some("hello".to_string())).unwrap();
		// one length byte followed by five utf-8 bytes
		assert_eq!(item.value_size(), 6);

		let deleted = VersionedItem::<String>::create(RecordKind::Deleted, 2u64, None).unwrap();
		assert_eq!(deleted.value_size(), 0);
	}

	#[test]
	fn test_kind_and_value_presence_must_agree() {
		assert_eq!(
			VersionedItem::<i32>::create(RecordKind::Updated, 4u64, None),
			Err(Error::MissingValue {
				modification: StoreModification::Update,
				sequence: SequenceNumber(4)
			})
		);
		assert_eq!(
			VersionedItem::create(RecordKind::Deleted, 5u64, Some(1i32)),
			Err(Error::UnexpectedValue {
				sequence: SequenceNumber(5)
			})
		);
	}
}

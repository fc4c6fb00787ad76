// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

use crate::{RecordKind, SequenceNumber, StoreModification};

/// Failures surfaced by the differential layer, its consolidation
/// collaborator and the apply dispatcher.
///
/// Keys are generic throughout the store, so they are carried here in their
/// `Debug` rendering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error(
		"undo of {expected} at sequence {sequence} for key {key} found a {found} version; the undo request was misrouted"
	)]
	UndoKindMismatch {
		key: String,
		sequence: SequenceNumber,
		expected: RecordKind,
		found: RecordKind,
	},

	#[error("version at sequence {attempted} for key {key} does not follow the current version at sequence {current}")]
	OutOfOrderApply {
		key: String,
		current: SequenceNumber,
		attempted: SequenceNumber,
	},

	#[error("deleted version at sequence {sequence} has no value")]
	DeletedValueAccess {
		sequence: SequenceNumber,
	},

	#[error("{modification} record at sequence {sequence} carries no value")]
	MissingValue {
		modification: StoreModification,
		sequence: SequenceNumber,
	},

	#[error("REMOVE record at sequence {sequence} must not carry a value")]
	UnexpectedValue {
		sequence: SequenceNumber,
	},

	#[error("record value serialization failed: {0}")]
	Serialization(String),

	#[error("lock on key {key} not acquired within {timeout:?}")]
	LockTimeout {
		key: String,
		timeout: Duration,
	},

	#[error("consolidation queue stayed full for {timeout:?}")]
	ConsolidationBackpressure {
		timeout: Duration,
	},

	#[error("consolidation worker has stopped")]
	ConsolidationStopped,

	#[error("failed to spawn consolidation worker: {0}")]
	WorkerSpawn(String),
}

impl Error {
	/// Stable diagnostic code for the failure.
	pub fn code(&self) -> &'static str {
		match self {
			Error::UndoKindMismatch {
				..
			} => "DIFF_001",
			Error::OutOfOrderApply {
				..
			} => "DIFF_002",
			Error::DeletedValueAccess {
				..
			} => "DIFF_003",
			Error::MissingValue {
				..
			} => "APPLY_001",
			Error::UnexpectedValue {
				..
			} => "APPLY_002",
			Error::Serialization(_) => "APPLY_003",
			Error::LockTimeout {
				..
			} => "LOCK_001",
			Error::ConsolidationBackpressure {
				..
			} => "CONS_001",
			Error::ConsolidationStopped => "CONS_002",
			Error::WorkerSpawn(_) => "CONS_003",
		}
	}

	/// Protocol inconsistencies point at a reconciliation bug upstream and
	/// must never be retried blindly.
	pub fn is_protocol_violation(&self) -> bool {
		matches!(
			self,
			Error::UndoKindMismatch {
				..
			} | Error::OutOfOrderApply {
				..
			}
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_mismatch_message_names_both_kinds() {
		let err = Error::UndoKindMismatch {
			key: "5".to_string(),
			sequence: SequenceNumber(2),
			expected: RecordKind::Updated,
			found: RecordKind::Deleted,
		};
		let message = err.to_string();
		assert!(message.contains("UPDATED"));
		assert!(message.contains("DELETED"));
		assert_eq!(err.code(), "DIFF_001");
		assert!(err.is_protocol_violation());
	}

	#[test]
	fn test_benign_errors_are_not_protocol_violations() {
		assert!(!Error::ConsolidationStopped.is_protocol_violation());
		assert!(!Error::DeletedValueAccess {
			sequence: SequenceNumber(1)
		}
		.is_protocol_violation());
	}
}

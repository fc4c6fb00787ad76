// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt,
	fmt::{Display, Formatter},
};

use serde::{Deserialize, Serialize};

/// Kind of a version resident in a key's chain.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
	Inserted,
	Updated,
	Deleted,
}

impl Display for RecordKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			RecordKind::Inserted => f.write_str("INSERTED"),
			RecordKind::Updated => f.write_str("UPDATED"),
			RecordKind::Deleted => f.write_str("DELETED"),
		}
	}
}

/// Operation carried by a replicated log record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreModification {
	Add,
	Update,
	Remove,
}

impl StoreModification {
	/// The kind of version this operation leaves behind in the chain.
	pub fn record_kind(self) -> RecordKind {
		match self {
			StoreModification::Add => RecordKind::Inserted,
			StoreModification::Update => RecordKind::Updated,
			StoreModification::Remove => RecordKind::Deleted,
		}
	}

	pub fn carries_value(self) -> bool {
		!matches!(self, StoreModification::Remove)
	}
}

impl Display for StoreModification {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			StoreModification::Add => f.write_str("ADD"),
			StoreModification::Update => f.write_str("UPDATE"),
			StoreModification::Remove => f.write_str("REMOVE"),
		}
	}
}

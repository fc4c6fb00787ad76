// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

/// The role in which a replica applies a record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ApplyContext {
	/// The primary applying its own write.
	Primary,
	/// A secondary replaying the primary's log.
	Secondary,
	/// A secondary retracting an operation the primary's log no longer
	/// contains.
	SecondaryFalseProgress,
}

impl Display for ApplyContext {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			ApplyContext::Primary => f.write_str("PRIMARY"),
			ApplyContext::Secondary => f.write_str("SECONDARY"),
			ApplyContext::SecondaryFalseProgress => f.write_str("SECONDARY_FALSE_PROGRESS"),
		}
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt,
	fmt::{Display, Formatter},
	num::ParseIntError,
	str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Visitor};

/// Position in the replicated log at which an operation was applied.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Ord, Eq, Hash, Default)]
pub struct SequenceNumber(pub u64);

impl SequenceNumber {
	pub const ZERO: SequenceNumber = SequenceNumber(0);

	pub fn next(self) -> Self {
		Self(self.0 + 1)
	}
}

impl FromStr for SequenceNumber {
	type Err = ParseIntError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(SequenceNumber(u64::from_str(s)?))
	}
}

impl Display for SequenceNumber {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.0, f)
	}
}

impl PartialEq<u64> for SequenceNumber {
	fn eq(&self, other: &u64) -> bool {
		self.0.eq(other)
	}
}

impl PartialEq<SequenceNumber> for u64 {
	fn eq(&self, other: &SequenceNumber) -> bool {
		self.eq(&other.0)
	}
}

impl From<SequenceNumber> for u64 {
	fn from(value: SequenceNumber) -> Self {
		value.0
	}
}

impl From<u64> for SequenceNumber {
	fn from(value: u64) -> Self {
		Self(value)
	}
}

impl Serialize for SequenceNumber {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_u64(self.0)
	}
}

impl<'de> Deserialize<'de> for SequenceNumber {
	fn deserialize<D>(deserializer: D) -> Result<SequenceNumber, D::Error>
	where
		D: Deserializer<'de>,
	{
		struct U64Visitor;

		impl Visitor<'_> for U64Visitor {
			type Value = SequenceNumber;

			fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
				formatter.write_str("an unsigned 64-bit log sequence number")
			}

			fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
				Ok(SequenceNumber(value))
			}
		}

		deserializer.deserialize_u64(U64Visitor)
	}
}

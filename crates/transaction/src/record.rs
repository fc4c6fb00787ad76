// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use replica_store_differential::VersionedItem;
use replica_type::{Error, Result, SequenceNumber, StoreModification};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// A replicated operation on a single key.
///
/// Values travel as their postcard encoding; the sequence number is assigned
/// by the replication log and supplied separately on apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord<K> {
	pub key: K,
	pub modification: StoreModification,
	pub value: Option<Vec<u8>>,
}

impl<K> OperationRecord<K> {
	pub fn add<V: Serialize>(key: K, value: &V) -> Result<Self> {
		Ok(Self {
			key,
			modification: StoreModification::Add,
			value: Some(encode(value)?),
		})
	}

	pub fn update<V: Serialize>(key: K, value: &V) -> Result<Self> {
		Ok(Self {
			key,
			modification: StoreModification::Update,
			value: Some(encode(value)?),
		})
	}

	pub fn remove(key: K) -> Self {
		Self {
			key,
			modification: StoreModification::Remove,
			value: None,
		}
	}

	/// Decodes the record into the version it writes at `sequence`.
	pub fn into_item<V: DeserializeOwned>(self, sequence: SequenceNumber) -> Result<(K, VersionedItem<V>)> {
		let kind = self.modification.record_kind();
		let item = match self.value {
			Some(_) if !self.modification.carries_value() => {
				return Err(Error::UnexpectedValue {
					sequence,
				});
			}
			Some(bytes) => VersionedItem::with_value_size(kind, sequence, Some(decode(&bytes)?), bytes.len())?,
			None => VersionedItem::with_value_size(kind, sequence, None, 0)?,
		};
		Ok((self.key, item))
	}
}

fn encode<V: Serialize>(value: &V) -> Result<Vec<u8>> {
	postcard::to_allocvec(value).map_err(|e| Error::Serialization(e.to_string()))
}

fn decode<V: DeserializeOwned>(bytes: &[u8]) -> Result<V> {
	postcard::from_bytes(bytes).map_err(|e| Error::Serialization(e.to_string()))
}

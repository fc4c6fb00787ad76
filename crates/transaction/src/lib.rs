// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Apply dispatcher of the replicated versioned store.
//!
//! Every replicated record is applied under an exclusive lock on its key.
//! Primary and secondary applies record a new version in the differential
//! layer; a secondary false-progress apply retracts the version written at
//! the record's sequence number. The lock is handed back to the caller as a
//! [`LockContext`] and released when that context is unlocked or dropped.

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod config;
pub mod context;
pub mod lock;
pub mod record;
pub mod store;

pub use config::StoreConfig;
pub use context::ApplyContext;
pub use lock::{KeyLockManager, LockContext};
pub use record::OperationRecord;
pub use replica_type::{Error, RecordKind, Result, SequenceNumber, StoreModification};
pub use store::VersionedStore;

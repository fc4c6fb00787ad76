// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Differential layer of the replicated versioned store.
//!
//! Every recently written key keeps at most two versions here: the current
//! one and the one it superseded. Anything older has been handed to a
//! [`Consolidate`] collaborator which merges it into the base store. The
//! layer can also retract a falsely progressed operation by sequence number,
//! restoring the chain to the state it had before that operation.

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod chain;
pub mod component;
pub mod config;
pub mod consolidate;
pub mod item;

pub use chain::{Slot, VersionChain};
pub use component::{DifferentialStoreComponent, UndoOutcome};
pub use config::DifferentialConfig;
pub use consolidate::Consolidate;
pub use item::VersionedItem;
pub use replica_type::{Error, RecordKind, Result, SequenceNumber, StoreModification};

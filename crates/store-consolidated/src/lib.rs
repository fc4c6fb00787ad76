// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Consolidation collaborator of the differential layer.
//!
//! Versions evicted from a key's chain are merged into the
//! [`ConsolidatedStore`], either inline on the evicting thread or through a
//! bounded queue drained by a [`ConsolidationWorker`].

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod config;
pub mod consolidator;
pub mod store;
pub mod worker;

pub use config::{ConsolidationMode, ConsolidationWorkerConfig};
pub use consolidator::Consolidator;
pub use store::ConsolidatedStore;
pub use worker::ConsolidationWorker;

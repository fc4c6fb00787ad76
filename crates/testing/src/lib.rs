// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

pub mod consolidator;
pub mod fixture;
pub mod util;

pub use consolidator::RecordingConsolidator;
pub use fixture::{deleted, init_tracing, inserted, updated};

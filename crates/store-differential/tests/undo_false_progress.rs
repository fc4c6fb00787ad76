// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use replica_store_differential::{
	DifferentialStoreComponent, Error, RecordKind, SequenceNumber, StoreModification, UndoOutcome,
};
use replica_testing::{RecordingConsolidator, deleted, init_tracing, inserted, updated};

fn component() -> DifferentialStoreComponent<i32, i32> {
	init_tracing();
	DifferentialStoreComponent::new()
}

#[test]
fn test_undo_add_removes_key() {
	let consolidator = RecordingConsolidator::new();
	let component = component();
	component.add(5, inserted(2, 0), &consolidator).unwrap();

	let versions = component.read_versions(&5).unwrap();
	assert!(versions.previous().is_none());
	assert_eq!(*versions.current().unwrap().value().unwrap(), 2);

	let outcome = component.undo_false_progress(&5, SequenceNumber(0), StoreModification::Add).unwrap();
	assert_eq!(outcome, UndoOutcome::Removed);
	assert!(component.read_versions(&5).is_none());
	assert!(component.is_empty());
}

#[test]
fn test_undo_update_after_add_restores_insert() {
	let consolidator = RecordingConsolidator::new();
	let component = component();
	component.add(5, inserted(2, 1), &consolidator).unwrap();
	component.add(5, updated(6, 2), &consolidator).unwrap();

	let outcome = component.undo_false_progress(&5, SequenceNumber(2), StoreModification::Update).unwrap();
	assert_eq!(outcome, UndoOutcome::Promoted);

	let versions = component.read_versions(&5).unwrap();
	assert!(versions.previous().is_none());
	let current = versions.current().unwrap();
	assert_eq!(*current.value().unwrap(), 2);
	assert_eq!(current.kind(), RecordKind::Inserted);
}

#[test]
fn test_undo_update_after_update_restores_earlier_update() {
	let consolidator = RecordingConsolidator::new();
	let component = component();
	component.add(5, inserted(2, 1), &consolidator).unwrap();
	component.add(5, updated(6, 2), &consolidator).unwrap();
	component.add(5, updated(9, 3), &consolidator).unwrap();

	let versions = component.read_versions(&5).unwrap();
	assert_eq!(*versions.previous().unwrap().value().unwrap(), 6);
	assert_eq!(*versions.current().unwrap().value().unwrap(), 9);
	assert_eq!(consolidator.received(), vec![(5, SequenceNumber(1))]);

	component.undo_false_progress(&5, SequenceNumber(3), StoreModification::Update).unwrap();

	let versions = component.read_versions(&5).unwrap();
	assert!(versions.previous().is_none());
	let current = versions.current().unwrap();
	assert_eq!(*current.value().unwrap(), 6);
	assert_eq!(current.kind(), RecordKind::Updated);
}

#[test]
fn test_undo_superseded_update_keeps_current() {
	let consolidator = RecordingConsolidator::new();
	let component = component();
	component.add(5, inserted(2, 1), &consolidator).unwrap();
	component.add(5, updated(6, 2), &consolidator).unwrap();
	component.add(5, updated(9, 3), &consolidator).unwrap();

	let outcome = component.undo_false_progress(&5, SequenceNumber(2), StoreModification::Update).unwrap();
	assert_eq!(outcome, UndoOutcome::ClearedPrevious);

	let versions = component.read_versions(&5).unwrap();
	assert!(versions.previous().is_none());
	assert_eq!(*versions.current().unwrap().value().unwrap(), 9);
}

#[test]
fn test_undo_remove_after_add_restores_insert() {
	let consolidator = RecordingConsolidator::new();
	let component = component();
	component.add(5, inserted(2, 1), &consolidator).unwrap();
	component.add(5, deleted(2), &consolidator).unwrap();

	let versions = component.read_versions(&5).unwrap();
	assert_eq!(versions.current().unwrap().kind(), RecordKind::Deleted);

	component.undo_false_progress(&5, SequenceNumber(2), StoreModification::Remove).unwrap();

	let versions = component.read_versions(&5).unwrap();
	assert!(versions.previous().is_none());
	let current = versions.current().unwrap();
	assert_eq!(current.kind(), RecordKind::Inserted);
	assert_eq!(*current.value().unwrap(), 2);
}

#[test]
fn test_add_update_undo_add_clears_history() {
	let consolidator = RecordingConsolidator::new();
	let component = component();
	component.add(5, inserted(2, 1), &consolidator).unwrap();
	component.add(5, updated(6, 2), &consolidator).unwrap();

	let outcome = component.undo_false_progress(&5, SequenceNumber(1), StoreModification::Add).unwrap();
	assert_eq!(outcome, UndoOutcome::ClearedPrevious);

	let versions = component.read_versions(&5).unwrap();
	assert!(versions.previous().is_none());
	let current = versions.current().unwrap();
	assert_eq!(*current.value().unwrap(), 6);
	assert_eq!(current.kind(), RecordKind::Updated);
}

#[test]
fn test_repeated_undo_is_benign() {
	let consolidator = RecordingConsolidator::new();
	let component = component();
	component.add(5, inserted(2, 1), &consolidator).unwrap();
	component.add(5, updated(6, 2), &consolidator).unwrap();

	assert_eq!(
		component.undo_false_progress(&5, SequenceNumber(2), StoreModification::Update),
		Ok(UndoOutcome::Promoted)
	);
	assert_eq!(
		component.undo_false_progress(&5, SequenceNumber(2), StoreModification::Update),
		Ok(UndoOutcome::Evicted)
	);
	assert_eq!(*component.read_versions(&5).unwrap().current().unwrap().value().unwrap(), 2);
}

#[test]
fn test_undo_of_evicted_version_is_noop() {
	let consolidator = RecordingConsolidator::new();
	let component = component();
	component.add(5, inserted(2, 1), &consolidator).unwrap();
	component.add(5, updated(6, 2), &consolidator).unwrap();
	component.add(5, updated(9, 3), &consolidator).unwrap();

	let outcome = component.undo_false_progress(&5, SequenceNumber(1), StoreModification::Add).unwrap();
	assert_eq!(outcome, UndoOutcome::Evicted);
	assert!(outcome.is_noop());

	let versions = component.read_versions(&5).unwrap();
	assert_eq!(versions.len(), 2);
	assert_eq!(*versions.current().unwrap().value().unwrap(), 9);
	assert_eq!(*versions.previous().unwrap().value().unwrap(), 6);
}

#[test]
fn test_undo_sole_remove_removes_key() {
	let consolidator = RecordingConsolidator::new();
	let component = component();
	component.add(5, inserted(2, 1), &consolidator).unwrap();
	component.add(5, updated(6, 2), &consolidator).unwrap();
	component.add(5, deleted(3), &consolidator).unwrap();
	component.undo_false_progress(&5, SequenceNumber(2), StoreModification::Update).unwrap();

	let outcome = component.undo_false_progress(&5, SequenceNumber(3), StoreModification::Remove).unwrap();
	assert_eq!(outcome, UndoOutcome::Removed);
	assert!(!component.contains_key(&5));
}

#[test]
fn test_undo_sole_update_removes_key() {
	let consolidator = RecordingConsolidator::new();
	let component = component();
	component.add(5, inserted(2, 1), &consolidator).unwrap();
	component.add(5, updated(6, 2), &consolidator).unwrap();
	component.add(5, updated(9, 3), &consolidator).unwrap();
	component.undo_false_progress(&5, SequenceNumber(2), StoreModification::Update).unwrap();

	let versions = component.read_versions(&5).unwrap();
	assert_eq!(versions.len(), 1);
	assert_eq!(versions.current().unwrap().kind(), RecordKind::Updated);

	let outcome = component.undo_false_progress(&5, SequenceNumber(3), StoreModification::Update).unwrap();
	assert_eq!(outcome, UndoOutcome::Removed);
	assert!(component.read_versions(&5).is_none());
}

#[test]
fn test_kind_mismatch_on_previous_slot_leaves_chain_intact() {
	let consolidator = RecordingConsolidator::new();
	let component = component();
	component.add(5, inserted(2, 1), &consolidator).unwrap();
	component.add(5, updated(6, 2), &consolidator).unwrap();

	let err = component.undo_false_progress(&5, SequenceNumber(1), StoreModification::Update).unwrap_err();
	assert!(err.is_protocol_violation());
	assert!(matches!(
		err,
		Error::UndoKindMismatch {
			expected: RecordKind::Updated,
			found: RecordKind::Inserted,
			..
		}
	));

	let versions = component.read_versions(&5).unwrap();
	assert_eq!(versions.len(), 2);
}

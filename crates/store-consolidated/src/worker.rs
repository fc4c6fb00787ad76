// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Background worker for deferred consolidation.
//!
//! Versions evicted from the differential layer are queued on a bounded
//! channel and merged into the base store off the apply path.

use std::{
	hash::Hash,
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	thread::{self, JoinHandle},
	time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender, bounded};
use replica_store_differential::{Consolidate, VersionedItem};
use replica_type::{Error, Result};
use tracing::{debug, trace};

use crate::{ConsolidatedStore, ConsolidationWorkerConfig};

/// Control messages for the consolidation worker.
enum ConsolidationMessage<K, V> {
	/// An evicted version to merge.
	Merge(K, Arc<VersionedItem<V>>),
	/// Merge everything received so far, then acknowledge.
	Flush(Sender<()>),
	/// Shutdown the worker.
	Shutdown,
}

/// Background worker merging evicted versions into a [`ConsolidatedStore`].
pub struct ConsolidationWorker<K, V> {
	sender: Sender<ConsolidationMessage<K, V>>,
	running: Arc<AtomicBool>,
	worker: Option<JoinHandle<()>>,
	store: Arc<ConsolidatedStore<K, V>>,
	enqueue_timeout: Duration,
}

impl<K, V> ConsolidationWorker<K, V> {
	pub fn store(&self) -> &Arc<ConsolidatedStore<K, V>> {
		&self.store
	}

	/// Queue an evicted version, waiting at most the configured enqueue
	/// timeout for room in the channel.
	pub fn enqueue(&self, key: K, item: Arc<VersionedItem<V>>) -> Result<()> {
		if !self.running.load(Ordering::Acquire) {
			return Err(Error::ConsolidationStopped);
		}

		match self.sender.send_timeout(ConsolidationMessage::Merge(key, item), self.enqueue_timeout) {
			Ok(()) => Ok(()),
			Err(SendTimeoutError::Timeout(_)) => Err(Error::ConsolidationBackpressure {
				timeout: self.enqueue_timeout,
			}),
			Err(SendTimeoutError::Disconnected(_)) => Err(Error::ConsolidationStopped),
		}
	}

	/// Block until every version queued before this call has been merged.
	pub fn flush(&self) -> Result<()> {
		let (ack, acked) = bounded(1);
		self.sender.send(ConsolidationMessage::Flush(ack)).map_err(|_| Error::ConsolidationStopped)?;
		acked.recv().map_err(|_| Error::ConsolidationStopped)
	}

	/// Stop the worker gracefully, merging whatever is still queued.
	pub fn stop(&mut self) {
		if !self.running.swap(false, Ordering::AcqRel) {
			return;
		}

		let _ = self.sender.send(ConsolidationMessage::Shutdown);

		if let Some(worker) = self.worker.take() {
			let _ = worker.join();
		}
	}
}

impl<K, V> ConsolidationWorker<K, V>
where
	K: Eq + Hash + Send + Sync + 'static,
	V: Send + Sync + 'static,
{
	/// Create and start a new consolidation worker.
	pub fn new(config: ConsolidationWorkerConfig, store: Arc<ConsolidatedStore<K, V>>) -> Result<Self> {
		let (sender, receiver) = bounded(config.channel_capacity);
		let running = Arc::new(AtomicBool::new(true));
		let enqueue_timeout = config.enqueue_timeout;

		let worker_store = Arc::clone(&store);
		let worker = thread::Builder::new()
			.name("consolidation-worker".to_string())
			.spawn(move || {
				Self::worker_loop(receiver, worker_store, config);
			})
			.map_err(|e| Error::WorkerSpawn(e.to_string()))?;

		Ok(Self {
			sender,
			running,
			worker: Some(worker),
			store,
			enqueue_timeout,
		})
	}

	fn worker_loop(
		receiver: Receiver<ConsolidationMessage<K, V>>,
		store: Arc<ConsolidatedStore<K, V>>,
		config: ConsolidationWorkerConfig,
	) {
		debug!("Consolidation worker started");

		let mut pending: Vec<(K, Arc<VersionedItem<V>>)> = Vec::with_capacity(config.batch_size);
		let mut last_flush = Instant::now();

		loop {
			match receiver.recv_timeout(Duration::from_millis(10)) {
				Ok(ConsolidationMessage::Merge(key, item)) => {
					pending.push((key, item));
					if pending.len() >= config.batch_size {
						Self::process_batch(&store, &mut pending);
						last_flush = Instant::now();
					}
				}
				Ok(ConsolidationMessage::Flush(ack)) => {
					Self::process_batch(&store, &mut pending);
					last_flush = Instant::now();
					let _ = ack.send(());
				}
				Ok(ConsolidationMessage::Shutdown) => {
					debug!("Consolidation worker received shutdown signal");
					Self::process_batch(&store, &mut pending);
					break;
				}
				Err(RecvTimeoutError::Timeout) => {
					// Check for periodic flush
				}
				Err(RecvTimeoutError::Disconnected) => {
					debug!("Consolidation worker channel disconnected");
					Self::process_batch(&store, &mut pending);
					break;
				}
			}

			if !pending.is_empty() && last_flush.elapsed() >= config.flush_interval {
				Self::process_batch(&store, &mut pending);
				last_flush = Instant::now();
			}
		}

		debug!("Consolidation worker stopped");
	}

	fn process_batch(store: &ConsolidatedStore<K, V>, pending: &mut Vec<(K, Arc<VersionedItem<V>>)>) {
		if pending.is_empty() {
			return;
		}
		trace!("Consolidation worker merging {} versions", pending.len());

		let mut stale = 0usize;
		for (key, item) in pending.drain(..) {
			if !store.merge(key, item) {
				stale += 1;
			}
		}
		if stale > 0 {
			debug!(stale, "Consolidation worker skipped versions superseded in the base store");
		}
	}
}

impl<K, V> Consolidate<K, V> for ConsolidationWorker<K, V>
where
	K: Eq + Hash + Clone + Send + Sync + 'static,
	V: Send + Sync + 'static,
{
	fn consolidate(&self, key: &K, item: Arc<VersionedItem<V>>) -> Result<()> {
		self.enqueue(key.clone(), item)
	}
}

impl<K, V> Drop for ConsolidationWorker<K, V> {
	fn drop(&mut self) {
		self.stop();
	}
}

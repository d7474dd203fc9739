//! One generation-tagged incremental selection sweep at a time.
//!
//! Every sweep captures the session generation it started under. Starting a
//! new sweep, clearing, or stopping bumps the generation and publishes it on
//! a [`watch`] channel; an in-flight sweep races each engine await against
//! that channel and settles with [`SelectionError::Invalidated`] as soon as
//! it observes a newer generation. Results are written into the
//! [`NodeSelection`] only after re-checking the generation under the session
//! lock, so a superseded sweep never mutates visible state.
//!
//! Settlement is tracked per generation. A [`SweepGuard`] marks its
//! generation settled and releases the engine-side sweep on every exit path,
//! including the caller dropping the future.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;

use cadview_protocol::BeginConfig;
use cadview_runtime::{Error, PickEngine, SweepId};
use parking_lot::Mutex;
use tokio::sync::{Notify, watch};
use tracing::{debug, trace};

use super::error::{SelectionError, SelectionResult};
use super::node_selection::NodeSelection;
use super::predicate::SelectionPredicate;
use crate::events::{Dispatcher, ViewerEvent};

/// Counters of a sweep that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
	pub generation: u64,
	/// Candidates the engine produced.
	pub candidates: usize,
	/// Candidates the predicate accepted.
	pub accepted: usize,
	/// Accepted candidates that were not selected before.
	pub added: usize,
}

#[derive(Debug, Default)]
struct SessionState {
	generation: u64,
	in_flight: BTreeSet<u64>,
	pending: Option<(u64, BeginConfig)>,
}

/// Incremental selection session for one key.
pub struct SelectionSession {
	key: Arc<str>,
	engine: Arc<dyn PickEngine>,
	selection: NodeSelection,
	events: Dispatcher,
	predicate_concurrency: usize,
	state: Mutex<SessionState>,
	latest: watch::Sender<u64>,
	settled: Notify,
}

impl SelectionSession {
	pub fn new(
		key: impl Into<Arc<str>>,
		engine: Arc<dyn PickEngine>,
		selection: NodeSelection,
		events: Dispatcher,
		predicate_concurrency: usize,
	) -> Self {
		let (latest, _) = watch::channel(0);
		Self {
			key: key.into(),
			engine,
			selection,
			events,
			predicate_concurrency: predicate_concurrency.max(1),
			state: Mutex::new(SessionState::default()),
			latest,
			settled: Notify::new(),
		}
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	/// Current generation. Bumped by every sweep, clear, and stop.
	pub fn generation(&self) -> u64 {
		self.state.lock().generation
	}

	/// True iff no sweep is in flight.
	pub fn is_idle(&self) -> bool {
		self.state.lock().in_flight.is_empty()
	}

	/// Configuration of the authoritative in-flight sweep, if any.
	pub fn pending_config(&self) -> Option<BeginConfig> {
		self.state.lock().pending.as_ref().map(|(_, config)| config.clone())
	}

	pub fn selection(&self) -> &NodeSelection {
		&self.selection
	}

	/// Runs one sweep over `config`, superseding any sweep in flight.
	///
	/// Accepted candidates are added to the node selection batch by batch.
	///
	/// # Errors
	///
	/// - [`SelectionError::Invalidated`] if a newer sweep, clear, or stop
	///   superseded this one before it completed.
	/// - [`SelectionError::Failed`] with [`Error::InvalidArgument`] for a
	///   degenerate region (the engine is not contacted), or with the engine
	///   or predicate error unchanged.
	pub async fn perform_selection(&self, config: BeginConfig, predicate: Option<SelectionPredicate>) -> SelectionResult<SweepSummary> {
		config.validate().map_err(Error::from)?;

		let generation = {
			let mut state = self.state.lock();
			state.generation += 1;
			let generation = state.generation;
			state.in_flight.insert(generation);
			state.pending = Some((generation, config.clone()));
			self.latest.send_replace(generation);
			generation
		};
		let mut guard = SweepGuard {
			session: self,
			generation,
			sweep: None,
		};
		let mut latest = self.latest.subscribe();

		debug!(
			target = "cadview.session",
			key = %self.key,
			generation,
			kind = config.kind(),
			predicate = predicate.as_ref().map(|p| p.name()),
			"begin sweep"
		);

		let sweep = self.race(&mut latest, generation, self.engine.begin_selection(&config)).await??;
		guard.sweep = Some(sweep);

		let mut summary = SweepSummary {
			generation,
			candidates: 0,
			accepted: 0,
			added: 0,
		};

		while let Some(batch) = self.race(&mut latest, generation, self.engine.next_batch(sweep)).await?? {
			summary.candidates += batch.len();
			let batch = match &predicate {
				Some(predicate) => {
					self.race(&mut latest, generation, predicate.filter(batch, self.predicate_concurrency))
						.await??
				}
				None => batch,
			};
			summary.accepted += batch.len();

			let added = {
				let state = self.state.lock();
				if state.generation != generation {
					return Err(self.invalidated(generation));
				}
				self.selection.insert_silent(batch)
			};
			trace!(target = "cadview.session", key = %self.key, generation, added = added.len(), "applied batch");
			summary.added += added.len();

			if !added.is_empty() {
				self.events.emit(ViewerEvent::SelectionArray(added)).await;
			}
		}

		if self.state.lock().generation != generation {
			return Err(self.invalidated(generation));
		}

		debug!(
			target = "cadview.session",
			key = %self.key,
			generation,
			candidates = summary.candidates,
			accepted = summary.accepted,
			"sweep complete"
		);
		drop(guard);

		self.events
			.emit(ViewerEvent::SelectionBatchEnd {
				key: Arc::clone(&self.key),
				generation,
				accepted: summary.accepted,
			})
			.await;

		Ok(summary)
	}

	/// Invalidates any sweep in flight and clears the node selection.
	///
	/// Returns once the invalidated sweeps have settled, so the session is
	/// idle afterwards unless a newer sweep started meanwhile.
	pub async fn clear_selection(&self) {
		let generation = self.invalidate("clear");
		self.settled_through(generation).await;
		self.selection.clear().await;
	}

	/// Invalidates any sweep in flight, leaving the node selection untouched.
	///
	/// Like [`clear_selection`](Self::clear_selection), returns once the
	/// session has transitioned to idle.
	pub async fn stop_selection(&self) {
		let generation = self.invalidate("stop");
		self.settled_through(generation).await;
	}

	/// Resolves once every sweep that started at or before the generation
	/// current at call time has settled. Sweeps started later are not awaited.
	///
	/// The target generation is captured when this method is called, not when
	/// the returned future is first polled.
	pub fn wait_for_idle(&self) -> impl Future<Output = ()> + Send + '_ {
		self.settled_through(self.generation())
	}

	/// Invalidated sweeps settle at their next poll, so this never waits on
	/// engine latency.
	async fn settled_through(&self, target: u64) {
		loop {
			// Created before the check so a settle in between is not lost.
			let notified = self.settled.notified();

			let outstanding = self.state.lock().in_flight.first().is_some_and(|g| *g <= target);
			if !outstanding {
				return;
			}

			notified.await;
		}
	}

	fn invalidate(&self, reason: &'static str) -> u64 {
		let mut state = self.state.lock();
		state.generation += 1;
		state.pending = None;
		let generation = state.generation;
		self.latest.send_replace(generation);

		if !state.in_flight.is_empty() {
			debug!(
				target = "cadview.session",
				key = %self.key,
				generation,
				in_flight = state.in_flight.len(),
				reason,
				"invalidated sweeps"
			);
		}
		generation
	}

	fn invalidated(&self, generation: u64) -> SelectionError {
		SelectionError::Invalidated {
			key: Arc::clone(&self.key),
			generation,
		}
	}

	/// Awaits `fut` unless the session moves past `generation` first.
	async fn race<T>(&self, latest: &mut watch::Receiver<u64>, generation: u64, fut: impl Future<Output = T>) -> SelectionResult<T> {
		tokio::select! {
			biased;
			() = superseded(latest, generation) => Err(self.invalidated(generation)),
			out = fut => Ok(out),
		}
	}

	fn settle(&self, generation: u64) {
		{
			let mut state = self.state.lock();
			state.in_flight.remove(&generation);
			if state.pending.as_ref().is_some_and(|(g, _)| *g == generation) {
				state.pending = None;
			}
		}
		self.settled.notify_waiters();
	}
}

async fn superseded(latest: &mut watch::Receiver<u64>, generation: u64) {
	// The sender lives as long as the session, which outlives every sweep.
	let _ = latest.wait_for(|current| *current != generation).await;
}

/// Settles a sweep's generation and releases its engine handle on drop.
struct SweepGuard<'a> {
	session: &'a SelectionSession,
	generation: u64,
	sweep: Option<SweepId>,
}

impl Drop for SweepGuard<'_> {
	fn drop(&mut self) {
		if let Some(sweep) = self.sweep.take() {
			self.session.engine.release_selection(sweep);
		}
		self.session.settle(self.generation);
	}
}

impl std::fmt::Debug for SelectionSession {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.state.lock();
		f.debug_struct("SelectionSession")
			.field("key", &self.key)
			.field("generation", &state.generation)
			.field("in_flight", &state.in_flight)
			.finish()
	}
}

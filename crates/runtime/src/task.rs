//! Fire-and-forget tasks with an error sink.
//!
//! UI triggers such as the escape key must not block on the async chain they
//! start, but failures still have to surface somewhere. [`TaskSpawner`]
//! spawns the work on the tokio runtime and routes any error to its sink.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};

/// Receives errors from detached tasks, tagged with the task name.
pub type ErrorSink = Arc<dyn Fn(&'static str, &Error) + Send + Sync>;

#[derive(Default)]
struct Running {
	count: AtomicUsize,
	finished: Notify,
}

/// Decrements the running count when the task ends, including by panic.
struct RunningGuard(Arc<Running>);

impl Drop for RunningGuard {
	fn drop(&mut self) {
		self.0.count.fetch_sub(1, Ordering::AcqRel);
		self.0.finished.notify_waiters();
	}
}

/// Spawns detached tasks and reports their failures.
#[derive(Clone)]
pub struct TaskSpawner {
	sink: ErrorSink,
	running: Arc<Running>,
}

impl Default for TaskSpawner {
	fn default() -> Self {
		Self::new()
	}
}

impl TaskSpawner {
	/// Creates a spawner that logs failures.
	pub fn new() -> Self {
		Self::with_sink(Arc::new(|task, err| {
			tracing::error!(target = "cadview.task", task, error = %err, "Detached task failed");
		}))
	}

	pub fn with_sink(sink: ErrorSink) -> Self {
		Self {
			sink,
			running: Arc::default(),
		}
	}

	/// Spawns `fut` without awaiting it. Errors go to the sink.
	///
	/// Must be called from within a tokio runtime.
	pub fn spawn<F>(&self, name: &'static str, fut: F) -> JoinHandle<()>
	where
		F: Future<Output = Result<()>> + Send + 'static,
	{
		let sink = Arc::clone(&self.sink);
		self.running.count.fetch_add(1, Ordering::AcqRel);
		let guard = RunningGuard(Arc::clone(&self.running));
		tokio::spawn(async move {
			let _guard = guard;
			if let Err(err) = fut.await {
				sink(name, &err);
			}
		})
	}

	/// Number of spawned tasks that have not finished.
	pub fn running(&self) -> usize {
		self.running.count.load(Ordering::Acquire)
	}

	/// Resolves once every task spawned through this spawner (or its clones)
	/// has finished.
	pub async fn wait_for_tasks(&self) {
		loop {
			let finished = self.running.finished.notified();
			if self.running() == 0 {
				return;
			}
			finished.await;
		}
	}
}

impl std::fmt::Debug for TaskSpawner {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TaskSpawner").finish_non_exhaustive()
	}
}

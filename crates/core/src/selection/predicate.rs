//! Async per-candidate filters applied during a sweep.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use cadview_protocol::SelectionItem;
use cadview_runtime::{PickEngine, Result};
use futures_util::{StreamExt, TryStreamExt, stream};

/// Boxed predicate verdict future.
pub type PredicateFuture = Pin<Box<dyn Future<Output = Result<bool>> + Send>>;

type PredicateFn = Arc<dyn Fn(SelectionItem) -> PredicateFuture + Send + Sync>;

/// Accept/reject decision for one candidate.
///
/// A sweep without a predicate accepts every engine candidate.
#[derive(Clone)]
pub struct SelectionPredicate {
	name: &'static str,
	f: PredicateFn,
}

impl SelectionPredicate {
	pub fn new<F, Fut>(name: &'static str, f: F) -> Self
	where
		F: Fn(SelectionItem) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<bool>> + Send + 'static,
	{
		Self {
			name,
			f: Arc::new(move |item| -> PredicateFuture { Box::pin(f(item)) }),
		}
	}

	/// Rejects nodes whose effective opacity is below one.
	pub fn exclude_transparent(engine: Arc<dyn PickEngine>) -> Self {
		Self::new("exclude-transparent", move |item: SelectionItem| {
			let engine = Arc::clone(&engine);
			async move { Ok(engine.node_opacity(item.node_id).await? >= 1.0) }
		})
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub async fn test(&self, item: SelectionItem) -> Result<bool> {
		(self.f)(item).await
	}

	/// Evaluates `batch` with at most `concurrency` verdicts in flight and
	/// returns the accepted items in discovery order.
	///
	/// The first failing verdict aborts the batch.
	pub(crate) async fn filter(&self, batch: Vec<SelectionItem>, concurrency: usize) -> Result<Vec<SelectionItem>> {
		let verdicts: Vec<(SelectionItem, bool)> = stream::iter(batch)
			.map(|item| {
				let f = Arc::clone(&self.f);
				async move {
					let keep = f(item.clone()).await?;
					Ok::<_, cadview_runtime::Error>((item, keep))
				}
			})
			.buffered(concurrency.max(1))
			.try_collect()
			.await?;

		Ok(verdicts.into_iter().filter_map(|(item, keep)| keep.then_some(item)).collect())
	}
}

impl std::fmt::Debug for SelectionPredicate {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SelectionPredicate").field("name", &self.name).finish()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::time::Duration;

	use cadview_protocol::{NodeId, Point2};
	use cadview_runtime::{Error, SceneEngine, SceneNode};

	use super::*;

	fn items(ids: &[u32]) -> Vec<SelectionItem> {
		ids.iter().map(|id| SelectionItem::node(*id)).collect()
	}

	#[tokio::test(start_paused = true)]
	async fn filter_keeps_discovery_order_under_concurrency() {
		// Later items finish first; output order must still follow input order.
		let predicate = SelectionPredicate::new("even", |item: SelectionItem| async move {
			tokio::time::sleep(Duration::from_millis(100 - u64::from(item.node_id.0) * 10)).await;
			Ok(item.node_id.0 % 2 == 0)
		});

		let kept = predicate.filter(items(&[1, 2, 3, 4, 5, 6]), 4).await.unwrap();

		assert_eq!(kept, items(&[2, 4, 6]));
	}

	#[tokio::test]
	async fn filter_bounds_concurrency() {
		let in_flight = Arc::new(AtomicUsize::new(0));
		let peak = Arc::new(AtomicUsize::new(0));
		let (f, p) = (Arc::clone(&in_flight), Arc::clone(&peak));
		let predicate = SelectionPredicate::new("count", move |_item: SelectionItem| {
			let (f, p) = (Arc::clone(&f), Arc::clone(&p));
			async move {
				let now = f.fetch_add(1, Ordering::SeqCst) + 1;
				p.fetch_max(now, Ordering::SeqCst);
				tokio::task::yield_now().await;
				f.fetch_sub(1, Ordering::SeqCst);
				Ok(true)
			}
		});

		let kept = predicate.filter(items(&[1, 2, 3, 4, 5, 6, 7]), 2).await.unwrap();

		assert_eq!(kept.len(), 7);
		assert!(peak.load(Ordering::SeqCst) <= 2);
	}

	#[tokio::test]
	async fn filter_propagates_first_error() {
		let predicate = SelectionPredicate::new("fails", |item: SelectionItem| async move {
			if item.node_id == NodeId(2) {
				Err(Error::Engine("appearance lookup failed".to_string()))
			} else {
				Ok(true)
			}
		});

		let err = predicate.filter(items(&[1, 2, 3]), 2).await.unwrap_err();

		assert!(matches!(err, Error::Engine(_)));
	}

	#[tokio::test]
	async fn exclude_transparent_checks_opacity() {
		let engine: Arc<dyn PickEngine> = Arc::new(SceneEngine::new(vec![
			SceneNode::new(1u32, Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)),
			SceneNode::new(2u32, Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)).opacity(0.4),
		]));
		let predicate = SelectionPredicate::exclude_transparent(engine);

		assert_eq!(predicate.name(), "exclude-transparent");
		assert!(predicate.test(SelectionItem::node(1u32)).await.unwrap());
		assert!(!predicate.test(SelectionItem::node(2u32)).await.unwrap());
		assert!(predicate.test(SelectionItem::node(3u32)).await.is_err());
	}
}

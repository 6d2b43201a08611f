use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Semaphore;
use tracing::warn;

/// Runs `job` on every item with at most `pool_size` jobs in flight and returns the
/// results in the order of `items`, independent of completion order.
///
/// The first failure stops dispatching: jobs that have not started yet are skipped,
/// jobs already running are allowed to finish and their results are dropped. The
/// error returned is the one of the earliest failing item. A panicking job is resumed
/// on the caller.
pub async fn run_ordered<T, R, E, F, Fut>(
    pool_size: usize,
    items: Vec<T>,
    job: F,
) -> Result<Vec<R>, E>
where
    T: Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
{
    let job = Arc::new(job);
    let permits = Arc::new(Semaphore::new(pool_size.max(1)));
    let failed = Arc::new(AtomicBool::new(false));

    let handles: Vec<_> = items
        .into_iter()
        .map(|item| {
            let job = Arc::clone(&job);
            let permits = Arc::clone(&permits);
            let failed = Arc::clone(&failed);

            tokio::spawn(async move {
                let _permit = permits.acquire_owned().await.ok()?;
                if failed.load(Ordering::Acquire) {
                    return None;
                }

                let result = job(item).await;
                if result.is_err() {
                    failed.store(true, Ordering::Release);
                }
                Some(result)
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    let mut failure = None;

    for handle in handles {
        match handle.await {
            Ok(Some(Ok(result))) => results.push(result),
            Ok(Some(Err(e))) => {
                failure.get_or_insert(e);
            }
            Ok(None) => {}
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => warn!("Worker task did not complete: {e}"),
        }
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(results),
    }
}

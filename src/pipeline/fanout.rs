//! Bounded scatter/gather over blocking work.
//!
//! Each item runs on the blocking pool once it holds a semaphore permit.
//! Results come back in submission order. A failing or panicking item only
//! fails its own slot; siblings keep running.

use std::fmt::Display;
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::Semaphore;

/// Run `work` over `items` with at most `limit` in flight.
pub async fn scatter_gather<I, T, E, F>(items: Vec<I>, limit: usize, work: F) -> Vec<Result<T, String>>
where
    I: Send + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
    F: Fn(I) -> Result<T, E> + Send + Sync + 'static,
{
    let gate = Arc::new(Semaphore::new(limit.max(1)));
    let work = Arc::new(work);

    let tasks = items.into_iter().map(|item| {
        let gate = Arc::clone(&gate);
        let work = Arc::clone(&work);
        async move {
            let _permit = gate
                .acquire_owned()
                .await
                .map_err(|e| format!("concurrency gate closed: {e}"))?;
            match tokio::task::spawn_blocking(move || (*work)(item)).await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(e.to_string()),
                Err(join_error) if join_error.is_panic() => {
                    Err(format!("task panicked: {}", panic_message(join_error)))
                }
                Err(join_error) => Err(format!("task cancelled: {join_error}")),
            }
        }
    });

    join_all(tasks).await
}

fn panic_message(error: tokio::task::JoinError) -> String {
    let payload = error.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn results_keep_submission_order() {
        // Later items finish first; order must still follow input.
        let results = scatter_gather(vec![30u64, 20, 10, 0], 4, |ms| {
            std::thread::sleep(Duration::from_millis(ms));
            Ok::<_, String>(ms)
        })
        .await;
        let values: Vec<u64> = results.into_iter().map(Result::unwrap).collect();
        assert_eq!(values, vec![30, 20, 10, 0]);
    }

    #[tokio::test]
    async fn failures_are_isolated() {
        let results = scatter_gather(vec![1, 2, 3], 2, |n| {
            if n == 2 {
                Err(format!("item {n} failed"))
            } else {
                Ok(n * 10)
            }
        })
        .await;
        assert_eq!(results[0], Ok(10));
        assert_eq!(results[1], Err("item 2 failed".to_string()));
        assert_eq!(results[2], Ok(30));
    }

    #[tokio::test]
    async fn panics_are_isolated() {
        let results = scatter_gather(vec![1, 2], 2, |n| {
            if n == 1 {
                panic!("boom on {n}");
            }
            Ok::<_, String>(n)
        })
        .await;
        let err = results[0].clone().unwrap_err();
        assert!(err.contains("panicked"), "got {err}");
        assert!(err.contains("boom on 1"), "got {err}");
        assert_eq!(results[1], Ok(2));
    }

    #[tokio::test]
    async fn concurrency_never_exceeds_limit() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (f, p) = (Arc::clone(&in_flight), Arc::clone(&peak));

        let results = scatter_gather((0..8).collect(), 2, move |_: u32| {
            let now = f.fetch_add(1, Ordering::SeqCst) + 1;
            p.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            f.fetch_sub(1, Ordering::SeqCst);
            Ok::<_, String>(())
        })
        .await;

        assert_eq!(results.len(), 8);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let results = scatter_gather(Vec::<u8>::new(), 3, |n| Ok::<_, String>(n)).await;
        assert!(results.is_empty());
    }
}

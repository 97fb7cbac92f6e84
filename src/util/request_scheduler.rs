//! Sequential request pacing for rate-limited upstream APIs.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// Parameter lists handed to [`zip_params`] had different lengths.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("parameter list length mismatch: {left} vs {right}")]
pub struct ParamLengthMismatch {
    pub left: usize,
    pub right: usize,
}

/// Pairs up two parameter lists, failing before any request is issued if
/// their lengths differ.
pub fn zip_params<A, B>(a: Vec<A>, b: Vec<B>) -> Result<Vec<(A, B)>, ParamLengthMismatch> {
    if a.len() != b.len() {
        return Err(ParamLengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(a.into_iter().zip(b).collect())
}

/// Runs `f` once per parameter, spacing call starts at least `min_interval`
/// apart.
///
/// Calls run strictly in order and results come back in parameter order. A
/// call that takes longer than the interval does not accrue debt; the next
/// call starts immediately. The first failure aborts the run and is returned
/// as-is, with the remaining parameters untouched.
///
/// # Arguments
///
/// * `min_interval` - Minimum gap between consecutive call starts.
/// * `f` - The request to run for each parameter.
/// * `params` - Parameters, one per call.
///
/// # Returns
///
/// Returns all results in parameter order, or the first error produced.
pub async fn schedule_requests<P, T, E, F, Fut>(
    min_interval: Duration,
    mut f: F,
    params: Vec<P>,
) -> Result<Vec<T>, E>
where
    F: FnMut(P) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut results = Vec::with_capacity(params.len());
    let mut last_start: Option<Instant> = None;

    for param in params {
        if let Some(started) = last_start {
            let elapsed = started.elapsed();
            if elapsed < min_interval {
                tokio::time::sleep(min_interval - elapsed).await;
            }
        }

        last_start = Some(Instant::now());
        results.push(f(param).await?);
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn results_come_back_in_order() {
        let results: Result<Vec<i32>, ()> = schedule_requests(
            Duration::from_millis(100),
            |n: i32| async move { Ok(n * 2) },
            vec![1, 2, 3],
        )
        .await;

        assert_eq!(results, Ok(vec![2, 4, 6]));
    }

    #[tokio::test(start_paused = true)]
    async fn spaces_call_starts_by_the_interval() {
        let start = Instant::now();
        let starts: Vec<Duration> = schedule_requests(
            Duration::from_millis(500),
            |_: usize| async move { Ok::<_, ()>(start.elapsed()) },
            vec![0, 1, 2],
        )
        .await
        .unwrap();

        assert_eq!(starts[0], Duration::ZERO);
        assert_eq!(starts[1], Duration::from_millis(500));
        assert_eq!(starts[2], Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_call_does_not_add_extra_delay() {
        let start = Instant::now();
        let starts: Vec<Duration> = schedule_requests(
            Duration::from_millis(100),
            |n: usize| async move {
                if n == 0 {
                    tokio::time::sleep(Duration::from_millis(300)).await;
                }
                Ok::<_, ()>(start.elapsed() - if n == 0 { Duration::from_millis(300) } else { Duration::ZERO })
            },
            vec![0, 1],
        )
        .await
        .unwrap();

        // First call ran 300ms, longer than the interval, so the second
        // starts right after it finishes at t=300ms.
        assert_eq!(starts[0], Duration::ZERO);
        assert_eq!(starts[1], Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn stops_at_the_first_error() {
        let mut calls = 0;
        let result: Result<Vec<i32>, &str> = schedule_requests(
            Duration::from_millis(10),
            |n: i32| {
                calls += 1;
                async move {
                    if n == 2 {
                        Err("boom")
                    } else {
                        Ok(n)
                    }
                }
            },
            vec![1, 2, 3],
        )
        .await;

        assert_eq!(result, Err("boom"));
        assert_eq!(calls, 2);
    }

    #[test]
    fn zip_params_rejects_length_mismatch() {
        let err = zip_params(vec![1, 2], vec!["a"]).unwrap_err();
        assert_eq!(err, ParamLengthMismatch { left: 2, right: 1 });
        assert_eq!(
            zip_params(vec![1], vec!["a"]).unwrap(),
            vec![(1, "a")]
        );
    }
}

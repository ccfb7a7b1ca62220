//! Bounded-concurrency batch runner
//!
//! Runs a list of asynchronous tasks with at most `limit` of them in flight.
//! Tasks are interleaved on the calling task (no spawning), so the only
//! suspension points are the tasks' own awaits.

use futures::stream::{self, StreamExt};
use std::future::Future;
use std::num::NonZeroUsize;

/// Run `tasks` with at most `limit` in flight and collect their outputs.
///
/// Each task is a closure producing a future; the closure is not called
/// until the task is admitted, so task `i + limit` starts only after an
/// earlier task has finished. Tasks are admitted in input order and the
/// outputs are returned in input order, whatever order they complete in.
///
/// The runner never short-circuits: a task that fails should return its
/// error as a value (e.g. `T = Result<_, _>`), and every other task still
/// runs to completion.
pub async fn run_bounded<I, F, Fut, T>(tasks: I, limit: NonZeroUsize) -> Vec<T>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    // buffer_unordered frees a slot on any completion; positions are
    // restored afterwards
    let mut indexed: Vec<(usize, T)> = stream::iter(tasks.into_iter().enumerate())
        .map(|(index, task)| {
            let fut = task();
            async move { (index, fut.await) }
        })
        .buffer_unordered(limit.get())
        .collect()
        .await;

    indexed.sort_unstable_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, output)| output).collect()
}

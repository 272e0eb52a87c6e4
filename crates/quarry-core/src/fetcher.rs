//! Bounded-concurrency fan-out for remote reads.
//!
//! Downloads many files with a hard cap on simultaneously in-flight
//! requests. Results come back in input order regardless of completion
//! order, and the first failure aborts the whole batch: already-settled
//! results are discarded and pending reads are dropped, releasing their
//! slots. The contract is all-or-nothing from the caller's perspective.

use std::future::Future;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use crate::error::Result;

/// Default cap on simultaneously in-flight downloads.
pub const MAX_CONCURRENT_DOWNLOADS: usize = 10;

/// Reads every item through `read`, with at most `max_in_flight`
/// reads outstanding at any time.
///
/// The output vector's order corresponds to the input order. If any
/// single read fails, the overall call fails with that error and no
/// partial results are returned.
pub async fn fetch_all<T, R, F, Fut>(items: Vec<T>, max_in_flight: usize, read: F) -> Result<Vec<R>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    // A zero cap would deadlock the stream; treat it as fully serial.
    let cap = max_in_flight.max(1);

    debug!(items = items.len(), cap, "fetching batch");

    stream::iter(items)
        .map(read)
        .buffered(cap)
        .try_collect()
        .await
}

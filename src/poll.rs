// Condition polling over watch-held observable state.
//
// The hub firmware only acknowledges that a command was accepted, never that
// the motion it started has finished. Completion is therefore discovered by
// re-reading observed state on a fixed interval.

use std::time::Duration;

use tokio::sync::watch;

/// Fixed margin added to every poll interval to ride out event delivery
/// jitter and keep a zero-interval wait from busy-polling.
pub const POLL_MARGIN: Duration = Duration::from_millis(100);

/// Resolve with the current observable value once `predicate` holds.
///
/// The predicate is checked before the first sleep, so an already-satisfied
/// condition returns without suspending. There is no timeout and no retry
/// cap: a predicate that never becomes true suspends forever, and callers
/// needing a bound must impose their own.
pub async fn await_condition<T, F>(
    rx: &watch::Receiver<T>,
    mut predicate: F,
    poll_interval: Duration,
) -> T
where
    T: Clone,
    F: FnMut(&T) -> bool,
{
    loop {
        {
            let current = rx.borrow();
            if predicate(&current) {
                return current.clone();
            }
        }
        tokio::time::sleep(poll_interval + POLL_MARGIN).await;
    }
}

/// Resolve once the sampled value stops changing between two consecutive
/// polls one `interval` apart.
///
/// This is how motor completion is inferred: rotation events stop arriving
/// when the motor stops, so two equal samples mean the commanded motion has
/// physically finished.
pub async fn await_stable<T, F, V>(rx: &watch::Receiver<T>, mut sample: F, interval: Duration)
where
    F: FnMut(&T) -> V,
    V: PartialEq,
{
    loop {
        let before = sample(&rx.borrow());
        tokio::time::sleep(interval).await;
        if sample(&rx.borrow()) == before {
            return;
        }
    }
}

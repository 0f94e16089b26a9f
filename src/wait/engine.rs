//! Watch-based convergence engine: list, watch, silent reconnect, deadline.

use super::access::ObserveResource;
use super::{Classification, Convergence, Outcome, Selector, WaitParams};
use futures::StreamExt;
use kube::api::WatchEvent;
use tokio::time::{Instant, sleep, sleep_until};
use tracing::{debug, warn};

/// Wait until a snapshot of the selected objects classifies as terminal, the
/// deadline elapses, or the client fails.
///
/// The loop lists first and classifies every returned object, so a wait whose
/// target is already terminal returns without opening a watch or sleeping.
/// Otherwise it watches from the list cursor and classifies each event's
/// snapshot the same way. A watch channel that closes without an error is
/// never surfaced: the engine re-lists, refreshes the cursor and re-watches,
/// paced by `params.interval`, for as long as the deadline allows. List and
/// watch-establishment errors abort immediately with [`Outcome::Fatal`].
pub async fn converge<C, F>(
    access: &C,
    selector: &Selector,
    params: &WaitParams,
    classify: F,
) -> Convergence<C::Obj>
where
    C: ObserveResource,
    F: Fn(&C::Obj) -> Classification + Send,
{
    let started = std::time::Instant::now();
    let deadline = Instant::now() + params.timeout;
    let mut last: Option<C::Obj> = None;

    loop {
        let (items, cursor) = match access.list(selector).await {
            Ok(listed) => listed,
            Err(error) => {
                return Convergence {
                    last,
                    outcome: Outcome::Fatal(error),
                    elapsed: started.elapsed(),
                };
            }
        };

        for item in items {
            let classification = classify(&item);
            last = Some(item);
            if let Some(outcome) = classification.terminal() {
                return Convergence {
                    last,
                    outcome,
                    elapsed: started.elapsed(),
                };
            }
        }

        debug!("no terminal state for {selector} in snapshot, watching from cursor {cursor:?}");
        let mut events = match access.watch(selector, &cursor).await {
            Ok(stream) => stream,
            Err(error) => {
                return Convergence {
                    last,
                    outcome: Outcome::Fatal(error),
                    elapsed: started.elapsed(),
                };
            }
        };

        loop {
            tokio::select! {
                () = sleep_until(deadline) => {
                    // drops the stream, releasing the subscription
                    return Convergence {
                        last,
                        outcome: Outcome::TimedOut,
                        elapsed: started.elapsed(),
                    };
                }
                event = events.next() => match event {
                    None => {
                        debug!("watch channel for {selector} closed, re-listing");
                        break;
                    }
                    Some(Err(error)) => {
                        warn!("watch stream for {selector} broke ({error}), re-listing");
                        break;
                    }
                    Some(Ok(WatchEvent::Bookmark(_))) => {}
                    Some(Ok(WatchEvent::Error(response))) => {
                        warn!("watch error event for {selector} ({response:?}), re-listing");
                        break;
                    }
                    Some(Ok(
                        WatchEvent::Added(obj)
                        | WatchEvent::Modified(obj)
                        | WatchEvent::Deleted(obj),
                    )) => {
                        let classification = classify(&obj);
                        last = Some(obj);
                        if let Some(outcome) = classification.terminal() {
                            return Convergence {
                                last,
                                outcome,
                                elapsed: started.elapsed(),
                            };
                        }
                    }
                },
            }
        }
        drop(events);

        // pace the reconnect without extending the deadline
        tokio::select! {
            () = sleep_until(deadline) => {
                return Convergence {
                    last,
                    outcome: Outcome::TimedOut,
                    elapsed: started.elapsed(),
                };
            }
            () = sleep(params.interval) => {}
        }
    }
}

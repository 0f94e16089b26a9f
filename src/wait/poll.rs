//! Fixed-interval poll engine for kinds without a useful live-update channel.

use super::{Convergence, Outcome, WaitParams};
use crate::error::Result;
use std::future::Future;
use tokio::time::{Instant, sleep, sleep_until};

/// One poll tick's verdict.
#[derive(Debug)]
pub enum Tick<T> {
    /// Keep polling, recording the newest observation when there is one.
    NotYet(Option<T>),
    /// Terminal success carrying the satisfying observation.
    Done(T),
    /// The resource reached a terminal bad state; the snapshot exhibiting it
    /// rides along so callers can inspect the observed conditions.
    Failed(T, String),
}

/// Re-evaluate `tick` on a fixed interval until it is terminal or the
/// deadline elapses.
///
/// The first tick runs immediately. A tick returning `Err` is fatal and stops
/// polling at once, with no silent retry: unlike the watch engine, the poll
/// loop has no transient channel to tolerate. Errors a waiter wants treated
/// as pending (`NotFound` before the object is expected to exist) are the
/// tick closure's business.
///
/// Every observation a tick hands back is kept as `last`, so a failure,
/// timeout or late fatal error still reports the final snapshot; `last` is
/// `None` only when no tick ever observed the object.
pub async fn poll<T, F, Fut>(params: &WaitParams, mut tick: F) -> Convergence<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Tick<T>>>,
{
    let started = std::time::Instant::now();
    let deadline = Instant::now() + params.timeout;
    let mut last: Option<T> = None;

    loop {
        match tick().await {
            Err(error) => {
                return Convergence {
                    last,
                    outcome: Outcome::Fatal(error),
                    elapsed: started.elapsed(),
                };
            }
            Ok(Tick::Done(observed)) => {
                return Convergence {
                    last: Some(observed),
                    outcome: Outcome::Succeeded,
                    elapsed: started.elapsed(),
                };
            }
            Ok(Tick::Failed(observed, message)) => {
                return Convergence {
                    last: Some(observed),
                    outcome: Outcome::Failed(message),
                    elapsed: started.elapsed(),
                };
            }
            Ok(Tick::NotYet(observed)) => {
                if observed.is_some() {
                    last = observed;
                }
            }
        }

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

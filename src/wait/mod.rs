//! Generic convergence engines and typed per-kind waiters.
//!
//! One engine, N small classifiers: every waiter is either the watch-based
//! [`engine::converge`] loop (list, watch, silent reconnect, deadline) or the
//! fixed-interval [`poll::poll`] loop, fed by a pure classification function
//! for its resource kind. Callers get back a [`Convergence`] carrying the
//! last observed snapshot, exactly one [`Outcome`], and the elapsed time.

pub mod access;
pub mod build;
pub mod deploy;
pub mod engine;
pub mod image;
pub mod job;
pub mod pods;
pub mod poll;
pub mod quota;

use crate::error::{Error, Result};
use kube::api::{ListParams, WatchParams};
use std::time::Duration;

/// Server-side watch timeout in seconds, just under the 5 minute apiserver
/// default so closures are routine rather than exceptional.
const WATCH_TIMEOUT_SECS: u32 = 294;

/// Scope of a wait: which objects of the kind are observed.
#[derive(Debug, Clone)]
pub enum Selector {
    /// A single object by metadata name (field selector).
    Name(String),
    /// A label selector expression, e.g. `"app=frontend"`.
    Labels(String),
}

impl Selector {
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    #[must_use]
    pub fn labels(selector: impl Into<String>) -> Self {
        Self::Labels(selector.into())
    }

    #[must_use]
    pub fn list_params(&self) -> ListParams {
        match self {
            Self::Name(name) => ListParams::default().fields(&format!("metadata.name={name}")),
            Self::Labels(labels) => ListParams::default().labels(labels),
        }
    }

    #[must_use]
    pub fn watch_params(&self) -> WatchParams {
        let params = WatchParams::default().timeout(WATCH_TIMEOUT_SECS);
        match self {
            Self::Name(name) => params.fields(&format!("metadata.name={name}")),
            Self::Labels(labels) => params.labels(labels),
        }
    }
}

impl core::fmt::Display for Selector {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::Name(name) => write!(fmt, "name={name}"),
            Self::Labels(labels) => write!(fmt, "labels={labels}"),
        }
    }
}

/// Poll/reconnect interval and total deadline for one wait. The deadline is
/// fixed when the wait starts; reconnects never extend it.
#[derive(Debug, Clone, Copy)]
pub struct WaitParams {
    pub interval: Duration,
    pub timeout: Duration,
}

impl WaitParams {
    #[must_use]
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

impl Default for WaitParams {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(300))
    }
}

/// Terminal-or-not classification of one resource snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Not terminal yet, keep observing.
    Pending,
    /// Target state reached.
    Satisfied,
    /// The resource itself reached a terminal bad state; the message embeds
    /// the observed status so diagnostics can reference it.
    Failed(String),
    /// The resource was cancelled out from under the wait.
    Cancelled,
}

impl Classification {
    /// Terminal outcome for this classification, `None` while pending.
    #[must_use]
    pub fn terminal(self) -> Option<Outcome> {
        match self {
            Self::Pending => None,
            Self::Satisfied => Some(Outcome::Succeeded),
            Self::Failed(message) => Some(Outcome::Failed(message)),
            Self::Cancelled => Some(Outcome::Cancelled),
        }
    }
}

/// Build a classifier from positional terminal predicates, evaluated in the
/// fixed order success, failure, cancellation. The ordering is a deliberate
/// tie-break: a snapshot that reads as both succeeded and failed (for
/// example a transitional status) is always treated as succeeded.
pub fn ordered<T>(
    is_ok: impl Fn(&T) -> bool,
    is_failed: impl Fn(&T) -> Option<String>,
    is_cancelled: impl Fn(&T) -> bool,
) -> impl Fn(&T) -> Classification {
    move |snapshot| {
        if is_ok(snapshot) {
            Classification::Satisfied
        } else if let Some(message) = is_failed(snapshot) {
            Classification::Failed(message)
        } else if is_cancelled(snapshot) {
            Classification::Cancelled
        } else {
            Classification::Pending
        }
    }
}

/// How one wait ended. Exactly one outcome per wait.
#[derive(Debug)]
pub enum Outcome {
    Succeeded,
    Failed(String),
    Cancelled,
    /// Deadline elapsed with no terminal classification.
    TimedOut,
    /// Unrecoverable client error; distinct from `TimedOut` so callers can
    /// tell an unobservable wait from a slow resource.
    Fatal(Error),
}

impl Outcome {
    #[must_use]
    pub const fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    #[must_use]
    pub const fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }

    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

/// Result of one wait call.
///
/// `Succeeded`, `Failed` and `Cancelled` always carry the final snapshot in
/// `last`. `TimedOut` carries whatever was last observed, possibly nothing.
/// `Fatal` with `last == None` means the object was never observed at all.
#[derive(Debug)]
pub struct Convergence<T> {
    /// Last snapshot observed before the wait ended.
    pub last: Option<T>,
    pub outcome: Outcome,
    pub elapsed: Duration,
}

impl<T> Convergence<T> {
    /// Collapse into the satisfying snapshot, mapping every non-success
    /// outcome to a descriptive error. `what` names the awaited resource for
    /// the messages.
    ///
    /// # Errors
    ///
    /// Returns the fatal client error, or a `Custom` error describing the
    /// failure, cancellation or timeout.
    pub fn into_result(self, what: &str) -> Result<T> {
        match self.outcome {
            Outcome::Succeeded => self
                .last
                .ok_or_else(|| Error::custom(format!("no snapshot recorded for {what}"))),
            Outcome::Failed(message) => Err(Error::Custom(message)),
            Outcome::Cancelled => Err(Error::custom(format!("{what} was cancelled"))),
            Outcome::TimedOut => Err(Error::custom(format!(
                "timed out waiting for {what} after {:?}",
                self.elapsed
            ))),
            Outcome::Fatal(error) => Err(error),
        }
    }
}

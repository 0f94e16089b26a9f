//! Build waiter and the build outcome aggregator.

use super::access::ObserveResource;
use super::engine::converge;
use super::poll::{Tick, poll};
use super::{Classification, Convergence, Outcome, Selector, WaitParams, ordered};
use crate::diag::AdminCmd;
use crate::error::{Error, Result};
use crate::openshift::build::{Build, BuildPhase};
use kube::ResourceExt;
use std::time::Duration;
use tracing::{info, warn};

/// Returns true if the build succeeded.
#[must_use]
pub fn build_succeeded(build: &Build) -> bool {
    build.phase() == BuildPhase::Complete
}

/// Returns true if the build finished with an error.
#[must_use]
pub fn build_failed(build: &Build) -> bool {
    matches!(build.phase(), BuildPhase::Failed | BuildPhase::Error)
}

/// Returns true if the build was cancelled.
#[must_use]
pub fn build_cancelled(build: &Build) -> bool {
    build.phase() == BuildPhase::Cancelled
}

/// Classify one build snapshot. Success is checked before failure, failure
/// before cancellation.
#[must_use]
pub fn classify_build(build: &Build) -> Classification {
    ordered(
        build_succeeded,
        |b: &Build| {
            build_failed(b).then(|| {
                let detail = b
                    .status
                    .as_ref()
                    .and_then(|s| s.message.clone())
                    .map_or_else(String::new, |m| format!(": {m}"));
                format!("the build {:?} status is {:?}{detail}", b.name_any(), b.phase().as_str())
            })
        },
        build_cancelled,
    )(build)
}

/// Deadlines for the two phases of a build wait: a short existence check
/// (the controller instantiating the build) and a longer completion wait.
#[derive(Debug, Clone, Copy)]
pub struct BuildWaitParams {
    pub exists: WaitParams,
    pub complete: WaitParams,
}

impl Default for BuildWaitParams {
    fn default() -> Self {
        Self {
            exists: WaitParams::new(Duration::from_secs(1), Duration::from_secs(120)),
            complete: WaitParams::new(Duration::from_secs(5), Duration::from_secs(600)),
        }
    }
}

/// Wait for the named build to reach a terminal phase.
///
/// Phase one polls for the build object to exist at all; every get error in
/// this window is treated as pending, since the build controller may not
/// have created the object yet. Expiry here is an unobservable failure
/// ([`Outcome::Fatal`]), with a message distinct from the completion
/// timeout. Phase two drives the watch engine with [`classify_build`].
pub async fn wait_for_build<C>(
    access: &C,
    name: &str,
    params: &BuildWaitParams,
) -> Convergence<Build>
where
    C: ObserveResource<Obj = Build>,
{
    let existence = poll(&params.exists, || async move {
        match access.get(name).await {
            Ok(build) => Ok(Tick::Done(build)),
            Err(_) => Ok(Tick::NotYet(None)),
        }
    })
    .await;

    match existence.outcome {
        Outcome::Succeeded => {}
        Outcome::TimedOut => {
            return Convergence {
                last: None,
                outcome: Outcome::Fatal(Error::custom(format!(
                    "timed out waiting for build {name:?} to be created"
                ))),
                elapsed: existence.elapsed,
            };
        }
        outcome => {
            return Convergence {
                last: existence.last,
                outcome,
                elapsed: existence.elapsed,
            };
        }
    }

    converge(access, &Selector::name(name), &params.complete, classify_build).await
}

/// Accumulated outcome of one build, owned by the caller and updated in
/// place by [`wait_for_build_result`].
///
/// `attempted` means the build object was observed at least once; a result
/// that was never observed is reported as a severe error, never as a
/// timeout. `timed_out` is attempted with none of the terminal flags set.
#[derive(Debug, Default)]
pub struct BuildResult {
    /// Non-resource-qualified build name.
    pub name: String,
    /// Latest observed build. `None` if the wait never observed it.
    pub build: Option<Build>,
    pub attempted: bool,
    pub succeeded: bool,
    pub failed: bool,
    pub cancelled: bool,
    pub timed_out: bool,
}

impl BuildResult {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Fold a finished wait into the flags.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the build was never observed; callers must not
    /// read that as a build failure or timeout.
    pub fn record(&mut self, convergence: Convergence<Build>) -> Result<()> {
        let Some(build) = convergence.last else {
            let reason = match convergence.outcome {
                Outcome::Fatal(error) => error.to_string(),
                other => format!("{other:?}"),
            };
            return Err(Error::custom(format!(
                "severe error waiting for build {:?}: {reason}",
                self.name
            )));
        };

        self.build = Some(build);
        self.attempted = true;
        match convergence.outcome {
            Outcome::Succeeded => self.succeeded = true,
            Outcome::Failed(message) => {
                self.failed = true;
                warn!("build {:?} failed: {message}", self.name);
            }
            Outcome::Cancelled => self.cancelled = true,
            Outcome::TimedOut => {}
            Outcome::Fatal(error) => {
                warn!("client error after observing build {:?}: {error}", self.name);
            }
        }
        self.timed_out = !(self.succeeded || self.failed || self.cancelled);
        Ok(())
    }

    /// One-line summary of the recorded state, for assertions and dumps.
    #[must_use]
    pub fn status_line(&self) -> String {
        let phase = self
            .build
            .as_ref()
            .map_or_else(|| "unobserved".to_string(), |b| b.phase().to_string());
        format!(
            "build {:?} phase={phase} attempted={} succeeded={} failed={} cancelled={} timed_out={}",
            self.name, self.attempted, self.succeeded, self.failed, self.cancelled, self.timed_out
        )
    }

    /// # Panics
    ///
    /// Panics if the build did not succeed.
    pub fn assert_success(&self) -> &Self {
        assert!(self.succeeded, "expected success: {}", self.status_line());
        self
    }

    /// # Panics
    ///
    /// Panics if the build did not fail. Does not trigger on timeouts.
    pub fn assert_failure(&self) -> &Self {
        assert!(self.failed, "expected failure: {}", self.status_line());
        self
    }

    /// Retrieve the build's logs through the administrative client.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the log command cannot be run.
    pub async fn logs(&self, cmd: &AdminCmd) -> Result<String> {
        let path = format!("build/{}", self.name);
        let (stdout, _) = cmd.run(&["logs", &path, "--timestamps"]).await?;
        Ok(stdout)
    }

    /// Log everything retrievable about this build. Read-only; errors are
    /// logged and swallowed.
    pub async fn dump_logs(&self, cmd: &AdminCmd) {
        info!("dumping result: {}", self.status_line());
        crate::diag::dump_resource(cmd, &format!("build/{}", self.name)).await;
        match self.logs(cmd).await {
            Ok(logs) => info!("build logs:\n{logs}"),
            Err(error) => warn!("error during log retrieval: {error}"),
        }
    }
}

/// Wait for the result's build to finish and update it in place.
///
/// # Errors
///
/// Will return `Err` only when the build was unobservable (severe client
/// error or the object was never created). A failed, cancelled or timed-out
/// build is a recorded outcome, not an error.
pub async fn wait_for_build_result<C>(
    access: &C,
    result: &mut BuildResult,
    params: &BuildWaitParams,
) -> Result<()>
where
    C: ObserveResource<Obj = Build>,
{
    info!("waiting for build {:?} to finish", result.name);
    let convergence = wait_for_build(access, &result.name, params).await;
    result.record(convergence)?;
    info!("done waiting: {}", result.status_line());
    Ok(())
}

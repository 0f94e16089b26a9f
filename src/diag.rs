//! Diagnostic side channels: an administrative CLI runner and dump helpers.
//!
//! Nothing here participates in convergence control flow. Dump helpers log
//! what they can retrieve and swallow their own errors; a broken diagnostic
//! must never change a wait's outcome.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use tokio::process::Command;
use tracing::{info, warn};

/// Handle to an administrative client binary (`kubectl`, `oc`), optionally
/// pinned to a namespace. Constructed once by the caller and passed to
/// whatever needs a diagnostic side channel.
#[derive(Debug, Clone)]
pub struct AdminCmd {
    program: String,
    namespace: Option<String>,
}

impl AdminCmd {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            namespace: None,
        }
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Run the client with the given arguments and capture its output.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the binary cannot be spawned or exits nonzero;
    /// the error message carries the captured stderr.
    pub async fn run(&self, args: &[&str]) -> Result<(String, String)> {
        let mut command = Command::new(&self.program);
        if let Some(namespace) = &self.namespace {
            command.arg("--namespace").arg(namespace);
        }
        let output = command.args(args).output().await?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            Ok((stdout, stderr))
        } else {
            Err(Error::custom(format!(
                "{} {} failed ({}): {}",
                self.program,
                args.join(" "),
                output.status,
                stderr.trim()
            )))
        }
    }
}

/// Log the pod states in the command's namespace.
pub async fn dump_pod_states(cmd: &AdminCmd) {
    match cmd.run(&["get", "pods", "-o", "wide"]).await {
        Ok((stdout, _)) => info!("pod states:\n{stdout}"),
        Err(error) => warn!("could not dump pod states: {error}"),
    }
}

/// Log the described state of one resource, e.g. `builds/ruby-1`.
pub async fn dump_resource(cmd: &AdminCmd, path: &str) {
    match cmd.run(&["describe", path]).await {
        Ok((stdout, _)) => info!("description of {path}:\n{stdout}"),
        Err(error) => warn!("could not describe {path}: {error}"),
    }
}

/// Age of a resource given its creation timestamp, for dump output.
#[must_use]
pub fn format_age(creation: Option<&Time>) -> String {
    creation.map_or_else(String::new, |time| {
        let created: DateTime<Utc> = time.0;
        format_duration(Utc::now().signed_duration_since(created))
    })
}

#[must_use]
pub fn format_duration(duration: Duration) -> String {
    if duration.num_days() > 0 {
        format!("{}d", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m", duration.num_minutes())
    } else {
        format!("{}s", duration.num_seconds())
    }
}

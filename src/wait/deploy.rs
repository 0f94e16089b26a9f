//! Deployment rollout waiter.

use super::access::ObserveResource;
use super::poll::{Tick, poll};
use super::{Classification, WaitParams};
use crate::error::Result;
use crate::openshift::deploy::{
    CONDITION_AVAILABLE, CONDITION_FALSE, CONDITION_PROGRESSING, CONDITION_TRUE, DeploymentConfig,
    NEW_RC_AVAILABLE_REASON,
};
use kube::ResourceExt;
use std::time::Duration;
use tracing::info;

/// Default rollout deadline.
#[must_use]
pub fn rollout_params() -> WaitParams {
    WaitParams::new(Duration::from_secs(1), Duration::from_secs(900))
}

/// Classify one deployment config snapshot against a target version.
///
/// Pending until `latestVersion` reaches the target; after that, satisfied
/// once the Progressing condition is true with the reconciliation reason and
/// the Available condition is true. With `enforce_not_progressing`, a
/// Progressing=False condition is a terminal failure instead of a state to
/// wait out.
#[must_use]
pub fn classify_rollout(
    config: &DeploymentConfig,
    version: i64,
    enforce_not_progressing: bool,
) -> Classification {
    let Some(status) = config.status.as_ref() else {
        return Classification::Pending;
    };

    if status.latest_version < version {
        return Classification::Pending;
    }

    let progressing = status.condition(CONDITION_PROGRESSING);
    let available = status.condition(CONDITION_AVAILABLE);

    if enforce_not_progressing
        && progressing.is_some_and(|condition| condition.status == CONDITION_FALSE)
    {
        return Classification::Failed(format!(
            "deploymentconfig {:?} is not progressing",
            config.name_any()
        ));
    }

    let reconciled = progressing.is_some_and(|condition| {
        condition.status == CONDITION_TRUE
            && condition.reason.as_deref() == Some(NEW_RC_AVAILABLE_REASON)
    });
    if reconciled && available.is_some_and(|condition| condition.status == CONDITION_TRUE) {
        Classification::Satisfied
    } else {
        Classification::Pending
    }
}

/// Wait for a deployment config to transition to the given version and
/// report availability.
///
/// Polls `get` on a fixed interval; there is no separate existence phase, so
/// a missing object (or any other client error) is fatal rather than
/// pending.
///
/// # Errors
///
/// Will return `Err` on a client error, a not-progressing rollout when
/// enforced, or deadline expiry.
pub async fn wait_for_deployment_config<C>(
    access: &C,
    name: &str,
    version: i64,
    enforce_not_progressing: bool,
    params: &WaitParams,
) -> Result<DeploymentConfig>
where
    C: ObserveResource<Obj = DeploymentConfig>,
{
    info!("waiting for deploymentconfig {name} to be available with version {version}");
    let convergence = poll(params, || async move {
        let config = access.get(name).await?;
        Ok(match classify_rollout(&config, version, enforce_not_progressing) {
            Classification::Pending | Classification::Cancelled => Tick::NotYet(Some(config)),
            Classification::Satisfied => Tick::Done(config),
            Classification::Failed(message) => Tick::Failed(config, message),
        })
    })
    .await;

    let elapsed = convergence.elapsed;
    let config =
        convergence.into_result(&format!("deploymentconfig {name} at version {version}"))?;
    info!("deploymentconfig {name} available after {elapsed:?}");
    Ok(config)
}

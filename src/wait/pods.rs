//! Pod-set, pod-gone and service-account waiters, and pod predicates.

use super::access::ObserveResource;
use super::poll::{Tick, poll};
use super::{Selector, WaitParams};
use crate::error::Result;
use k8s_openapi::api::core::v1::{Pod, ServiceAccount};
use kube::ResourceExt;
use std::time::Duration;
use tracing::debug;

/// Returns true if the pod is running.
#[must_use]
pub fn is_running(pod: &Pod) -> bool {
    phase(pod) == Some("Running")
}

/// Returns true if the pod ran to completion.
#[must_use]
pub fn is_succeeded(pod: &Pod) -> bool {
    phase(pod) == Some("Succeeded")
}

/// Returns true if the pod is running and its readiness probe passed.
#[must_use]
pub fn is_ready(pod: &Pod) -> bool {
    if !is_running(pod) {
        return false;
    }
    pod.status
        .as_ref()
        .and_then(|status| status.conditions.as_ref())
        .is_some_and(|conditions| {
            conditions
                .iter()
                .any(|condition| condition.type_ == "Ready" && condition.status == "True")
        })
}

/// Matches every pod.
#[must_use]
pub const fn any_pod(_pod: &Pod) -> bool {
    true
}

fn phase(pod: &Pod) -> Option<&str> {
    pod.status
        .as_ref()
        .and_then(|status| status.phase.as_deref())
}

/// Names of the pods matching the selector that satisfy the predicate.
///
/// # Errors
///
/// Will return `Err` if the pods cannot be listed.
pub async fn pod_names_by_filter<C>(
    access: &C,
    selector: &Selector,
    predicate: impl Fn(&Pod) -> bool,
) -> Result<Vec<String>>
where
    C: ObserveResource<Obj = Pod>,
{
    let (pods, _) = access.list(selector).await?;
    Ok(pods
        .iter()
        .filter(|pod| predicate(pod))
        .map(ResourceExt::name_any)
        .collect())
}

/// Wait until exactly `count` pods matching the selector satisfy the
/// predicate, returning their names.
///
/// Re-lists on a fixed interval; a list error stops the wait immediately.
///
/// # Errors
///
/// Will return `Err` on a list error or deadline expiry.
pub async fn wait_for_pods<C>(
    access: &C,
    selector: &Selector,
    predicate: impl Fn(&Pod) -> bool + Copy,
    count: usize,
    params: &WaitParams,
) -> Result<Vec<String>>
where
    C: ObserveResource<Obj = Pod>,
{
    let convergence = poll(params, || async move {
        let names = pod_names_by_filter(access, selector, predicate).await?;
        if names.len() == count {
            Ok(Tick::Done(names))
        } else {
            debug!("{} of {count} pods match {selector}", names.len());
            Ok(Tick::NotYet(Some(names)))
        }
    })
    .await;

    convergence.into_result(&format!("{count} pods matching {selector}"))
}

/// Wait until the named pod disappears.
///
/// # Errors
///
/// Will return `Err` on a non-`NotFound` client error or deadline expiry.
pub async fn wait_until_pod_is_gone<C>(access: &C, name: &str, params: &WaitParams) -> Result<()>
where
    C: ObserveResource<Obj = Pod>,
{
    let convergence = poll(params, || async move {
        match access.get(name).await {
            Ok(_) => Ok(Tick::NotYet(None)),
            Err(error) if error.is_not_found() => Ok(Tick::Done(())),
            Err(error) => Err(error),
        }
    })
    .await;

    convergence.into_result(&format!("pod {name:?} to be deleted"))
}

/// Default cadence for service-account provisioning, which is quick but
/// starts from nothing.
#[must_use]
pub fn service_account_params() -> WaitParams {
    WaitParams::new(Duration::from_millis(100), Duration::from_secs(180))
}

/// Wait until the named service account is fully provisioned, meaning the
/// token controller has minted its dockercfg secret.
///
/// `NotFound` and `Forbidden` are pending here, not fatal: before the
/// controller creates the account neither the object nor the permission to
/// read it need exist yet.
///
/// # Errors
///
/// Will return `Err` on any other client error or deadline expiry.
pub async fn wait_for_service_account<C>(
    access: &C,
    name: &str,
    params: &WaitParams,
) -> Result<ServiceAccount>
where
    C: ObserveResource<Obj = ServiceAccount>,
{
    let convergence = poll(params, || async move {
        let account = match access.get(name).await {
            Ok(account) => account,
            Err(error) if error.is_pending_tolerated() => return Ok(Tick::NotYet(None)),
            Err(error) => return Err(error),
        };
        let provisioned = account.secrets.as_ref().is_some_and(|secrets| {
            secrets
                .iter()
                .any(|secret| secret.name.as_deref().is_some_and(|n| n.contains("dockercfg")))
        });
        if provisioned {
            Ok(Tick::Done(account))
        } else {
            Ok(Tick::NotYet(Some(account)))
        }
    })
    .await;

    convergence.into_result(&format!("service account {name:?}"))
}

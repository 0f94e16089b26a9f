//! Resource quota sync waiter and the masked usage comparator.

use super::access::ObserveResource;
use super::engine::converge;
use super::{Classification, Selector, WaitParams};
use crate::error::Result;
use crate::quantity::less_than_or_equal;
use k8s_openapi::api::core::v1::ResourceQuota;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;

/// Resource-name to quantity mapping, as carried in quota status.
pub type ResourceList = BTreeMap<String, Quantity>;

/// Restrict a usage vector to the given resource names, dropping everything
/// else the quota happens to track.
#[must_use]
pub fn mask(usage: &ResourceList, names: &[String]) -> ResourceList {
    usage
        .iter()
        .filter(|(name, _)| names.contains(name))
        .map(|(name, quantity)| (name.clone(), quantity.clone()))
        .collect()
}

/// Sorted resource names present in a usage vector.
#[must_use]
pub fn resource_names(usage: &ResourceList) -> Vec<String> {
    usage.keys().cloned().collect()
}

/// Elementwise `a <= b`, conjoined across all of `a`'s resource names. A
/// name missing from `b` fails the comparison.
#[must_use]
pub fn usage_less_than_or_equal(a: &ResourceList, b: &ResourceList) -> bool {
    a.iter().all(|(name, quantity)| {
        b.get(name)
            .is_some_and(|other| less_than_or_equal(quantity, other))
    })
}

/// Whether observed usage has synced to the expectation.
///
/// The received vector is masked to the expected resource names first; a
/// masked set shorter than the expectation means the quota controller has
/// not yet recorded all expected resources, which is pending, not failure.
/// In upper-limit mode the usage is expected to rise, so it must have
/// reached the expectation (`expected <= masked`); in lower-limit mode the
/// usage is expected to fall to or below it (`masked <= expected`). One
/// comparator thus serves both increment- and decrement-style expectations.
#[must_use]
pub fn is_usage_synced(received: &ResourceList, expected: &ResourceList, upper_limit: bool) -> bool {
    let masked = mask(received, &resource_names(expected));
    if masked.len() != expected.len() {
        return false;
    }
    if upper_limit {
        usage_less_than_or_equal(expected, &masked)
    } else {
        usage_less_than_or_equal(&masked, expected)
    }
}

/// Observed used vector of a quota, empty until status is recorded.
fn used(quota: &ResourceQuota) -> ResourceList {
    quota
        .status
        .as_ref()
        .and_then(|status| status.used.clone())
        .unwrap_or_default()
}

/// Watch the named quota until its recorded usage syncs to the expected
/// level, returning the masked used values.
///
/// # Errors
///
/// Will return `Err` on a fatal client error or when the deadline elapses
/// before the usage syncs.
pub async fn wait_for_resource_quota_sync<C>(
    access: &C,
    name: &str,
    expected: &ResourceList,
    expected_is_upper_limit: bool,
    params: &WaitParams,
) -> Result<ResourceList>
where
    C: ObserveResource<Obj = ResourceQuota>,
{
    let names = resource_names(expected);
    let convergence = converge(access, &Selector::name(name), params, |quota: &ResourceQuota| {
        if is_usage_synced(&used(quota), expected, expected_is_upper_limit) {
            Classification::Satisfied
        } else {
            Classification::Pending
        }
    })
    .await;

    let quota = convergence.into_result(&format!("resource quota {name:?} to sync"))?;
    Ok(mask(&used(&quota), &names))
}

//! Job completion waiter.

use super::access::ObserveResource;
use super::poll::{Tick, poll};
use super::WaitParams;
use crate::error::Result;
use k8s_openapi::api::batch::v1::Job;

/// Returns true once the job carries a terminal condition (`Complete` or
/// `Failed`) with status `"True"`.
#[must_use]
pub fn job_is_finished(job: &Job) -> bool {
    job.status
        .as_ref()
        .and_then(|status| status.conditions.as_ref())
        .is_some_and(|conditions| {
            conditions.iter().any(|condition| {
                (condition.type_ == "Complete" || condition.type_ == "Failed")
                    && condition.status == "True"
            })
        })
}

/// Wait until the named job finishes, successfully or not.
///
/// A failed job is still a finished job; callers inspect the returned
/// conditions to tell the two apart. Client errors are fatal, there is no
/// existence tolerance.
///
/// # Errors
///
/// Will return `Err` on a client error or deadline expiry.
pub async fn wait_for_job<C>(access: &C, name: &str, params: &WaitParams) -> Result<Job>
where
    C: ObserveResource<Obj = Job>,
{
    let convergence = poll(params, || async move {
        let job = access.get(name).await?;
        if job_is_finished(&job) {
            Ok(Tick::Done(job))
        } else {
            Ok(Tick::NotYet(Some(job)))
        }
    })
    .await;

    convergence.into_result(&format!("job {name:?} to finish"))
}

//! Image stream tag waiter.

use super::access::ObserveResource;
use super::engine::converge;
use super::{Classification, Convergence, Outcome, Selector, WaitParams};
use crate::error::{Error, Result};
use crate::openshift::image::{ImageStream, repository_check_annotation, status_has_tag};
use std::time::Instant;
use tracing::info;

/// Wait until the named image stream has non-empty history for the given
/// tag.
///
/// The importer records failures in the repository-check annotation rather
/// than a phase, so the deadline doubles as the failure predicate: once it
/// passes, the next observed snapshot classifies as failed with the
/// annotation embedded, whatever it says. The engine's own deadline backstops
/// the case where no snapshot arrives at all.
///
/// # Errors
///
/// Will return `Err` on a fatal client error, or with a descriptive timeout
/// message when the tag never populates within `params.timeout`.
pub async fn wait_for_image_stream_tag<C>(
    access: &C,
    name: &str,
    tag: &str,
    params: &WaitParams,
) -> Result<ImageStream>
where
    C: ObserveResource<Obj = ImageStream>,
{
    info!("waiting for an importer to import tag {tag} into stream {name}");
    let started = Instant::now();
    let deadline = params.timeout;

    let convergence = converge(access, &Selector::name(name), params, |stream: &ImageStream| {
        if status_has_tag(stream, tag).is_some_and(|t| !t.items.is_empty()) {
            Classification::Satisfied
        } else if started.elapsed() >= deadline {
            Classification::Failed(format!(
                "the image stream {name:?} status is {:?}",
                repository_check_annotation(stream)
            ))
        } else {
            Classification::Pending
        }
    })
    .await;

    let what = format!("image stream tag {name}:{tag}");
    let Convergence { last, outcome, elapsed } = convergence;
    match outcome {
        // the deadline-triggered failure classification: report it as the
        // timeout it is, with the annotation detail attached
        Outcome::Failed(message) => Err(Error::custom(format!(
            "timed out while waiting for {what} ({message})"
        ))),
        outcome => Convergence { last, outcome, elapsed }.into_result(&what),
    }
}

/// Full image pull spec recorded for the stream's tag.
///
/// # Errors
///
/// Will return `Err` if the stream cannot be fetched or the tag has no
/// history to reference.
pub async fn docker_image_reference<C>(access: &C, name: &str, tag: &str) -> Result<String>
where
    C: ObserveResource<Obj = ImageStream>,
{
    let stream = access.get(name).await?;
    status_has_tag(&stream, tag)
        .and_then(|t| t.items.first())
        .map(|event| event.docker_image_reference.clone())
        .ok_or_else(|| Error::custom(format!("image stream {name:?} does not have tag {tag:?}")))
}

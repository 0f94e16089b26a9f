mod common;

use common::{FakeAccess, WatchScript, api_error, init_tracing};
use kube::api::WatchEvent;
use kubewait::openshift::build::{Build, BuildPhase, BuildSpec, BuildStatus};
use kubewait::openshift::image::{ImageStream, ImageStreamSpec};
use kubewait::wait::build::{BuildResult, BuildWaitParams, classify_build, wait_for_build};
use kubewait::wait::image::wait_for_image_stream_tag;
use kubewait::wait::engine::converge;
use kubewait::wait::{Outcome, Selector, WaitParams};
use std::time::Duration;

fn build_in(phase: BuildPhase) -> Build {
    let mut build = Build::new("sample-1", BuildSpec::default());
    build.status = Some(BuildStatus {
        phase,
        message: None,
        reason: None,
    });
    build
}

fn quick(timeout_ms: u64) -> WaitParams {
    WaitParams::new(Duration::from_millis(20), Duration::from_millis(timeout_ms))
}

#[tokio::test]
async fn immediate_success_never_opens_a_watch() {
    init_tracing();
    let access: FakeAccess<Build> = FakeAccess::new();
    access.push_list(vec![build_in(BuildPhase::Complete)]);

    let result = converge(&access, &Selector::name("sample-1"), &quick(5000), classify_build).await;

    assert!(result.outcome.is_succeeded());
    assert_eq!(access.list_count(), 1);
    assert_eq!(access.watch_count(), 0, "terminal snapshot must not open a watch");
    assert!(result.elapsed < Duration::from_millis(500), "must not sleep");
}

#[tokio::test]
async fn no_matching_object_times_out_at_the_deadline() {
    let access: FakeAccess<Build> = FakeAccess::new();
    access.push_list(vec![]);

    let result = converge(&access, &Selector::name("absent"), &quick(300), classify_build).await;

    assert!(result.outcome.is_timed_out());
    assert!(result.last.is_none());
    assert!(result.elapsed >= Duration::from_millis(300), "must not fire early");
    assert!(result.elapsed < Duration::from_millis(1500));
}

#[tokio::test]
async fn watch_channel_closure_reconnects_silently() {
    let access: FakeAccess<Build> = FakeAccess::new();
    // first cycle sees a pending build, watch delivers progress then closes
    access.push_list(vec![build_in(BuildPhase::Pending)]);
    access.push_list(vec![build_in(BuildPhase::Running)]);
    access.push_watch(WatchScript::EventsThenClose(vec![WatchEvent::Modified(
        build_in(BuildPhase::Running),
    )]));
    access.push_watch(WatchScript::EventsThenHold(vec![WatchEvent::Modified(
        build_in(BuildPhase::Complete),
    )]));

    let result = converge(&access, &Selector::name("sample-1"), &quick(5000), classify_build).await;

    assert!(result.outcome.is_succeeded(), "closure must not surface: {:?}", result.outcome);
    assert_eq!(access.watch_count(), 2, "expected exactly one reconnect");
    assert_eq!(access.list_count(), 2, "reconnect must re-list for a fresh cursor");
}

#[tokio::test]
async fn list_error_is_fatal_and_distinct_from_timeout() {
    let access: FakeAccess<Build> = FakeAccess::new();
    access.push_list_err(api_error(500));

    let result = converge(&access, &Selector::name("sample-1"), &quick(5000), classify_build).await;

    assert!(result.outcome.is_fatal());
    assert!(!result.outcome.is_timed_out());
    assert!(result.last.is_none(), "nothing was ever observed");
    assert!(result.elapsed < Duration::from_millis(500));
}

#[tokio::test]
async fn watch_establishment_error_is_fatal() {
    let access: FakeAccess<Build> = FakeAccess::new();
    access.push_list(vec![build_in(BuildPhase::Pending)]);
    access.push_watch(WatchScript::Fail(api_error(500)));

    let result = converge(&access, &Selector::name("sample-1"), &quick(5000), classify_build).await;

    assert!(result.outcome.is_fatal());
    // the pending build from the list phase was observed
    assert!(result.last.is_some());
}

#[tokio::test]
async fn failure_event_reports_the_observed_phase() {
    let access: FakeAccess<Build> = FakeAccess::new();
    access.push_list(vec![build_in(BuildPhase::Running)]);
    access.push_watch(WatchScript::EventsThenHold(vec![WatchEvent::Modified(
        build_in(BuildPhase::Failed),
    )]));

    let result = converge(&access, &Selector::name("sample-1"), &quick(5000), classify_build).await;

    match result.outcome {
        Outcome::Failed(ref message) => assert!(message.contains("Failed"), "got {message:?}"),
        ref other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn image_tag_timeout_message_is_not_doubly_wrapped() {
    let access: FakeAccess<ImageStream> = FakeAccess::new();
    access.push_list(vec![ImageStream::new("ruby", ImageStreamSpec::default())]);

    let error = wait_for_image_stream_tag(&access, "ruby", "latest", &quick(200))
        .await
        .unwrap_err();

    let message = error.to_string();
    assert_eq!(message.matches("timed out").count(), 1, "got {message:?}");
    assert!(message.contains("image stream tag ruby:latest"), "got {message:?}");
}

fn build_params(exists_ms: u64, complete_ms: u64) -> BuildWaitParams {
    BuildWaitParams {
        exists: quick(exists_ms),
        complete: quick(complete_ms),
    }
}

#[tokio::test]
async fn build_progresses_to_complete_across_watch_events() {
    let access: FakeAccess<Build> = FakeAccess::new();
    access.push_get(build_in(BuildPhase::New));
    access.push_list(vec![build_in(BuildPhase::New)]);
    access.push_watch(WatchScript::EventsThenHold(vec![
        WatchEvent::Modified(build_in(BuildPhase::Pending)),
        WatchEvent::Modified(build_in(BuildPhase::Running)),
        WatchEvent::Modified(build_in(BuildPhase::Complete)),
    ]));

    let convergence = wait_for_build(&access, "sample-1", &build_params(1000, 5000)).await;
    assert!(convergence.elapsed < Duration::from_secs(5));

    let mut result = BuildResult::new("sample-1");
    result.record(convergence).unwrap();
    assert!(result.attempted && result.succeeded);
    assert!(!result.failed && !result.cancelled && !result.timed_out);
    result.assert_success();
}

#[tokio::test]
async fn creation_deadline_is_distinct_from_completion_deadline() {
    // the build is never created: the short existence deadline expires and
    // the wait is unobservable, with a creation-specific message
    let access: FakeAccess<Build> = FakeAccess::new();
    access.push_get_err(api_error(404));

    let convergence = wait_for_build(&access, "sample-1", &build_params(150, 5000)).await;
    let Outcome::Fatal(ref error) = convergence.outcome else {
        panic!("expected unobservable outcome, got {:?}", convergence.outcome);
    };
    assert!(error.to_string().contains("to be created"), "got {error}");
    assert!(convergence.last.is_none());

    let mut result = BuildResult::new("sample-1");
    let severe = result.record(convergence).unwrap_err();
    assert!(severe.to_string().contains("severe error"));
    assert!(!result.timed_out, "creation expiry must not read as a build timeout");

    // the build exists but never finishes: the completion deadline expires
    // as an ordinary timeout on the observed object
    let access: FakeAccess<Build> = FakeAccess::new();
    access.push_get(build_in(BuildPhase::Running));
    access.push_list(vec![build_in(BuildPhase::Running)]);

    let convergence = wait_for_build(&access, "sample-1", &build_params(1000, 250)).await;
    assert!(convergence.outcome.is_timed_out());
    assert!(convergence.last.is_some());

    let mut result = BuildResult::new("sample-1");
    result.record(convergence).unwrap();
    assert!(result.attempted && result.timed_out);
}

#[tokio::test]
async fn cancelled_build_is_a_third_terminal_state() {
    let access: FakeAccess<Build> = FakeAccess::new();
    access.push_get(build_in(BuildPhase::Running));
    access.push_list(vec![build_in(BuildPhase::Running)]);
    access.push_watch(WatchScript::EventsThenHold(vec![WatchEvent::Modified(
        build_in(BuildPhase::Cancelled),
    )]));

    let convergence = wait_for_build(&access, "sample-1", &build_params(1000, 5000)).await;
    let mut result = BuildResult::new("sample-1");
    result.record(convergence).unwrap();
    assert!(result.cancelled);
    assert!(!result.succeeded && !result.failed && !result.timed_out);
}

//! Convergence waiters for Kubernetes and OpenShift resources.
//!
//! An asynchronously reconciled resource (a build, an image stream, a
//! rollout, a resource quota, a pod set) eventually reaches some observable
//! target state. This crate waits for that point: it reconciles a "list now"
//! snapshot with a possibly interrupted "watch for changes" stream, arbitrates
//! a wall-clock deadline against both, and classifies terminal vs. transient
//! vs. fatal conditions per resource kind.
//!
//! The [`wait`] module holds the generic engines and the typed waiters; the
//! [`openshift`] module declares partial typed schemas for the OpenShift
//! kinds the waiters observe.

pub mod client;
pub mod diag;
pub mod error;
pub mod openshift;
pub mod quantity;
pub mod wait;

/// Default user agent - automatically uses the package version.
///
/// All kube clients created through [`client::new`] carry it so waiter API
/// calls can be identified in apiserver audit logs.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

//! Partial typed schemas for the OpenShift API kinds the waiters observe.
//!
//! These are not full OpenShift schemas. The waiters only ever read status
//! fields, so each kind declares the spec/status subset the classifiers
//! touch and lets serde drop the rest. Declared through kube-derive so the
//! generated types plug into `Api<K>` like any other resource.

pub mod build;
pub mod deploy;
pub mod image;

pub use build::{Build, BuildPhase, BuildStatus};
pub use deploy::{DeploymentConfig, DeploymentConfigStatus};
pub use image::ImageStream;

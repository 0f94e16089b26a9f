use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// Build resource from `build.openshift.io/v1`, status subset.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default)]
#[kube(
    group = "build.openshift.io",
    version = "v1",
    kind = "Build",
    namespaced,
    status = "BuildStatus",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct BuildSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatus {
    #[serde(default)]
    pub phase: BuildPhase,
    /// Human-readable detail for failed or cancelled builds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Lifecycle phase of a build. `Failed` is a build that ran and broke,
/// `Error` one the platform could not run at all; waiters treat both as
/// terminal failures.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BuildPhase {
    #[default]
    New,
    Pending,
    Running,
    Complete,
    Failed,
    Error,
    Cancelled,
}

impl BuildPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
            Self::Error => "Error",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl core::fmt::Display for BuildPhase {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::fmt::Result {
        fmt.write_str(self.as_str())
    }
}

impl Build {
    /// Phase of the build, `New` until the status is populated.
    #[must_use]
    pub fn phase(&self) -> BuildPhase {
        self.status.as_ref().map_or(BuildPhase::New, |s| s.phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_roundtrip() {
        let status: BuildStatus =
            k8s_openapi::serde_json::from_str(r#"{"phase":"Complete","message":"done"}"#).unwrap();
        assert_eq!(status.phase, BuildPhase::Complete);
        assert_eq!(status.message.as_deref(), Some("done"));
    }

    #[test]
    fn test_phase_defaults_to_new() {
        let build = Build::new("b-1", BuildSpec::default());
        assert_eq!(build.phase(), BuildPhase::New);
        assert_eq!(build.phase().to_string(), "New");
    }
}

use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// Annotation the image importer stamps with the result of the last
/// repository probe; contains "not" or "error" wording when import failed.
pub const DOCKER_REPOSITORY_CHECK_ANNOTATION: &str = "openshift.io/image.dockerRepositoryCheck";

/// ImageStream resource from `image.openshift.io/v1`, status subset.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default)]
#[kube(
    group = "image.openshift.io",
    version = "v1",
    kind = "ImageStream",
    namespaced,
    status = "ImageStreamStatus",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct ImageStreamSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagReference>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct TagReference {
    pub name: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImageStreamStatus {
    #[serde(default)]
    pub docker_image_repository: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<NamedTagEventList>,
}

/// Import/push history for one status tag, most recent item first.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct NamedTagEventList {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<TagEvent>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct TagEvent {
    #[serde(default)]
    pub docker_image_reference: String,
    #[serde(default)]
    pub image: String,
}

/// Look up a status tag by name.
#[must_use]
pub fn status_has_tag<'a>(stream: &'a ImageStream, tag: &str) -> Option<&'a NamedTagEventList> {
    stream
        .status
        .as_ref()
        .and_then(|status| status.tags.iter().find(|t| t.tag == tag))
}

/// True if the stream has a populated `:latest` status tag.
#[must_use]
pub fn latest_tag_populated(stream: &ImageStream) -> bool {
    status_has_tag(stream, "latest").is_some()
}

/// True if the last repository check recorded an unsuccessful import.
#[must_use]
pub fn tag_not_found(stream: &ImageStream) -> bool {
    let check = repository_check_annotation(stream);
    check.contains("not") || check.contains("error")
}

/// The repository-check annotation value, empty when unset.
#[must_use]
pub fn repository_check_annotation(stream: &ImageStream) -> &str {
    stream
        .metadata
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(DOCKER_REPOSITORY_CHECK_ANNOTATION))
        .map_or("", String::as_str)
}

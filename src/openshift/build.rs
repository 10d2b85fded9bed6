use k8s_openapi::api::core::v1::ObjectReference;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// `build.openshift.io/v1` BuildConfig.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[kube(
    group = "build.openshift.io",
    version = "v1",
    kind = "BuildConfig",
    namespaced,
    derive = "PartialEq",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfigSpec {
    #[serde(default)]
    pub triggers: Vec<BuildTriggerPolicy>,

    #[serde(default)]
    pub source: BuildSource,

    #[serde(default)]
    pub strategy: BuildStrategy,

    #[serde(default)]
    pub output: BuildOutput,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BuildTriggerType {
    #[default]
    ConfigChange,
    ImageChange,
    GitHub,
    Generic,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildTriggerPolicy {
    #[serde(rename = "type")]
    pub type_: BuildTriggerType,

    /// Present (possibly empty) for `ImageChange` triggers. An empty trigger
    /// follows the image the build strategy starts from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_change: Option<ImageChangeTrigger>,
}

impl BuildTriggerPolicy {
    pub fn config_change() -> Self {
        Self {
            type_: BuildTriggerType::ConfigChange,
            image_change: None,
        }
    }

    pub fn image_change() -> Self {
        Self {
            type_: BuildTriggerType::ImageChange,
            image_change: Some(ImageChangeTrigger::default()),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageChangeTrigger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ObjectReference>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct BuildSource {
    #[serde(rename = "type")]
    pub type_: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitBuildSource>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct GitBuildSource {
    /// Empty when the component has no codebase yet.
    #[serde(default)]
    pub uri: String,

    #[serde(rename = "ref", default)]
    pub ref_: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildStrategy {
    #[serde(rename = "type")]
    pub type_: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_strategy: Option<SourceBuildStrategy>,
}

/// Source-to-image strategy.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct SourceBuildStrategy {
    pub from: ObjectReference,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incremental: Option<bool>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct BuildOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<ObjectReference>,
}

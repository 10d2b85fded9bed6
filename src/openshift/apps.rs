use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{ObjectReference, PodTemplateSpec};
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// `apps.openshift.io/v1` DeploymentConfig.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[kube(
    group = "apps.openshift.io",
    version = "v1",
    kind = "DeploymentConfig",
    namespaced,
    derive = "PartialEq",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigSpec {
    #[serde(default)]
    pub strategy: DeploymentStrategy,

    #[serde(default)]
    pub triggers: Vec<DeploymentTriggerPolicy>,

    #[serde(default)]
    pub replicas: i32,

    #[serde(default)]
    pub selector: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PodTemplateSpec>,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeploymentStrategyType {
    #[default]
    Rolling,
    Recreate,
    Custom,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct DeploymentStrategy {
    #[serde(rename = "type")]
    pub type_: DeploymentStrategyType,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeploymentTriggerType {
    #[default]
    ConfigChange,
    ImageChange,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentTriggerPolicy {
    #[serde(rename = "type")]
    pub type_: DeploymentTriggerType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_change_params: Option<DeploymentTriggerImageChangeParams>,
}

impl DeploymentTriggerPolicy {
    pub fn config_change() -> Self {
        Self {
            type_: DeploymentTriggerType::ConfigChange,
            image_change_params: None,
        }
    }
}

/// Redeploys `container_names` whenever the image stream tag in `from` moves.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentTriggerImageChangeParams {
    pub automatic: bool,

    #[serde(default)]
    pub container_names: Vec<String>,

    pub from: ObjectReference,
}

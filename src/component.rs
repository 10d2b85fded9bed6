use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Declarative description of an application to build and run.
///
/// The reconciler derives a builder image stream, an output image stream,
/// a build config and a deployment config from it.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "devconsole.openshift.io",
    version = "v1alpha1",
    kind = "Component",
    namespaced,
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpec {
    /// Build runtime, e.g. `nodejs`. Names both the image stream looked up in the
    /// shared namespace and the key into the runtime image table.
    #[serde(default)]
    pub build_type: String,

    /// Git URI of the source code. May be empty.
    #[serde(default)]
    pub codebase: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::CustomResourceExt;

    #[test]
    fn crd_is_namespaced() {
        let crd = Component::crd();
        assert_eq!(crd.spec.group, "devconsole.openshift.io");
        assert_eq!(crd.spec.scope, "Namespaced");
        assert_eq!(crd.spec.names.kind, "Component");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let component: Component = serde_json::from_value(serde_json::json!({
            "apiVersion": "devconsole.openshift.io/v1alpha1",
            "kind": "Component",
            "metadata": { "name": "MyComp", "namespace": "test-project" },
            "spec": { "buildType": "nodejs" }
        }))
        .unwrap();
        assert_eq!(component.spec.build_type, "nodejs");
        assert_eq!(component.spec.codebase, "");
    }
}

//! Desired state of the objects derived from a [`Component`].
//!
//! Every function here is pure: it only describes an object, creating it is
//! up to the reconciler.

use k8s_openapi::api::core::v1::{
    Container, ContainerPort, ObjectReference, PodSpec, PodTemplateSpec,
};
use kube::ResourceExt;

use crate::component::Component;
use crate::naming::{self, LATEST_TAG};
use crate::oci::RuntimeImages;
use crate::openshift::apps::{
    DeploymentStrategy, DeploymentStrategyType, DeploymentTriggerImageChangeParams,
    DeploymentTriggerPolicy, DeploymentTriggerType,
};
use crate::openshift::build::{
    BuildOutput, BuildSource, BuildStrategy, BuildTriggerPolicy, GitBuildSource,
    SourceBuildStrategy,
};
use crate::openshift::image::{ImageLookupPolicy, TagReference};
use crate::openshift::{
    BuildConfig, BuildConfigSpec, DeploymentConfig, DeploymentConfigSpec, ImageStream,
    ImageStreamSpec,
};

/// Branch checked out by every build.
pub const GIT_REF: &str = "master";

/// Port exposed by the application container.
pub const CONTAINER_PORT: i32 = 8080;

const DOCKER_IMAGE: &str = "DockerImage";
const GIT_SOURCE: &str = "Git";
const SOURCE_STRATEGY: &str = "Source";
const TCP: &str = "TCP";

/// Image stream importing the builder image for the component's build type
/// from an external registry.
///
/// Returns `None` if the build type is empty or has no entry in `runtimes`.
pub fn builder_image(component: &Component, runtimes: &RuntimeImages) -> Option<ImageStream> {
    let build_type = &component.spec.build_type;
    let image = runtimes.resolve(build_type)?;

    Some(ImageStream {
        metadata: naming::object_meta(component, build_type),
        spec: ImageStreamSpec {
            lookup_policy: Some(ImageLookupPolicy { local: false }),
            tags: vec![TagReference {
                name: LATEST_TAG.to_string(),
                from: Some(ObjectReference {
                    kind: Some(DOCKER_IMAGE.to_string()),
                    name: Some(image.to_string()),
                    ..Default::default()
                }),
            }],
        },
    })
}

/// Empty image stream receiving the images produced by the build.
pub fn output_image(component: &Component) -> ImageStream {
    ImageStream {
        metadata: naming::object_meta(component, &component.name_any()),
        spec: ImageStreamSpec::default(),
    }
}

/// Source-to-image build of the component's codebase on top of `builder`,
/// pushing to `<component>:latest`.
pub fn build_config(component: &Component, builder: &ImageStream) -> BuildConfig {
    let name = component.name_any();

    BuildConfig {
        metadata: naming::object_meta(component, &name),
        spec: BuildConfigSpec {
            triggers: vec![
                BuildTriggerPolicy::config_change(),
                BuildTriggerPolicy::image_change(),
            ],
            source: BuildSource {
                type_: GIT_SOURCE.to_string(),
                git: Some(GitBuildSource {
                    uri: component.spec.codebase.clone(),
                    ref_: GIT_REF.to_string(),
                }),
            },
            strategy: BuildStrategy {
                type_: SOURCE_STRATEGY.to_string(),
                source_strategy: Some(SourceBuildStrategy {
                    from: naming::latest_image_stream_tag(
                        &builder.name_any(),
                        builder.namespace(),
                    ),
                    incremental: Some(true),
                }),
            },
            output: BuildOutput {
                to: Some(naming::latest_image_stream_tag(&name, None)),
            },
        },
    }
}

/// Single replica running `<output>:latest`, redeployed whenever the build
/// pushes a new image to that tag.
pub fn deployment_config(component: &Component, output: &ImageStream) -> DeploymentConfig {
    let name = component.name_any();
    let container = output.name_any();

    DeploymentConfig {
        metadata: naming::object_meta(component, &name),
        spec: DeploymentConfigSpec {
            strategy: DeploymentStrategy {
                type_: DeploymentStrategyType::Recreate,
            },
            triggers: vec![
                DeploymentTriggerPolicy::config_change(),
                DeploymentTriggerPolicy {
                    type_: DeploymentTriggerType::ImageChange,
                    image_change_params: Some(DeploymentTriggerImageChangeParams {
                        automatic: true,
                        container_names: vec![container.clone()],
                        from: naming::latest_image_stream_tag(&container, None),
                    }),
                },
            ],
            replicas: 1,
            selector: naming::labels(component),
            template: Some(PodTemplateSpec {
                metadata: Some(naming::object_meta(component, &name)),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: container.clone(),
                        image: Some(naming::latest_tag(&container)),
                        ports: Some(vec![ContainerPort {
                            container_port: CONTAINER_PORT,
                            protocol: Some(TCP.to_string()),
                            ..Default::default()
                        }]),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentSpec;
    use crate::openshift::build::BuildTriggerType;
    use std::collections::BTreeMap;

    fn component(build_type: &str, codebase: &str) -> Component {
        let mut component = Component::new(
            "MyComp",
            ComponentSpec {
                build_type: build_type.into(),
                codebase: codebase.into(),
            },
        );
        component.metadata.namespace = Some("test-project".into());
        component
    }

    fn runtimes() -> RuntimeImages {
        [("nodejs", "nodeshift/centos7-s2i-nodejs:10.x")]
            .into_iter()
            .collect()
    }

    fn app_label() -> Option<BTreeMap<String, String>> {
        Some(BTreeMap::from([("app".to_string(), "MyComp".to_string())]))
    }

    #[test]
    fn builder_image_from_runtime_table() {
        let image = builder_image(&component("nodejs", ""), &runtimes()).unwrap();
        assert_eq!(image.name_any(), "nodejs");
        assert_eq!(image.namespace().as_deref(), Some("test-project"));
        assert_eq!(image.metadata.labels, app_label());
        assert_eq!(image.spec.lookup_policy, Some(ImageLookupPolicy { local: false }));
        assert_eq!(image.spec.tags.len(), 1);

        let tag = &image.spec.tags[0];
        assert_eq!(tag.name, "latest");
        let from = tag.from.as_ref().unwrap();
        assert_eq!(from.kind.as_deref(), Some("DockerImage"));
        assert_eq!(from.name.as_deref(), Some("nodeshift/centos7-s2i-nodejs:10.x"));
    }

    #[test]
    fn builder_image_absent_for_unknown_build_type() {
        assert!(builder_image(&component("", ""), &runtimes()).is_none());
        assert!(builder_image(&component("cobol", ""), &runtimes()).is_none());
    }

    #[test]
    fn output_image_has_no_tags() {
        let image = output_image(&component("nodejs", ""));
        assert_eq!(image.name_any(), "MyComp");
        assert_eq!(image.namespace().as_deref(), Some("test-project"));
        assert_eq!(image.metadata.labels, app_label());
        assert!(image.spec.tags.is_empty());
    }

    #[test]
    fn build_config_from_shared_builder() {
        let mut builder = ImageStream::new("nodejs", ImageStreamSpec::default());
        builder.metadata.namespace = Some("openshift".into());

        let bc = build_config(&component("nodejs", "https://somegit.con/myrepo"), &builder);
        assert_eq!(bc.name_any(), "MyComp");
        assert_eq!(bc.metadata.labels, app_label());

        let git = bc.spec.source.git.as_ref().unwrap();
        assert_eq!(bc.spec.source.type_, "Git");
        assert_eq!(git.uri, "https://somegit.con/myrepo");
        assert_eq!(git.ref_, "master");

        let strategy = bc.spec.strategy.source_strategy.as_ref().unwrap();
        assert_eq!(strategy.from.kind.as_deref(), Some("ImageStreamTag"));
        assert_eq!(strategy.from.name.as_deref(), Some("nodejs:latest"));
        assert_eq!(strategy.from.namespace.as_deref(), Some("openshift"));
        assert_eq!(strategy.incremental, Some(true));

        let to = bc.spec.output.to.as_ref().unwrap();
        assert_eq!(to.kind.as_deref(), Some("ImageStreamTag"));
        assert_eq!(to.name.as_deref(), Some("MyComp:latest"));
    }

    #[test]
    fn build_config_triggers() {
        let component = component("nodejs", "");
        let builder = builder_image(&component, &runtimes()).unwrap();
        let bc = build_config(&component, &builder);

        let types: Vec<_> = bc.spec.triggers.iter().map(|t| t.type_).collect();
        assert_eq!(
            types,
            vec![BuildTriggerType::ConfigChange, BuildTriggerType::ImageChange]
        );
        assert!(bc.spec.triggers[1].image_change.is_some());
        assert_eq!(bc.spec.source.git.unwrap().uri, "");
    }

    #[test]
    fn deployment_config_runs_output_image() {
        let component = component("nodejs", "");
        let dc = deployment_config(&component, &output_image(&component));

        assert_eq!(dc.name_any(), "MyComp");
        assert_eq!(dc.metadata.labels, app_label());
        assert_eq!(dc.spec.replicas, 1);
        assert_eq!(dc.spec.strategy.type_, DeploymentStrategyType::Recreate);
        assert_eq!(Some(dc.spec.selector.clone()), app_label());

        let template = dc.spec.template.as_ref().unwrap();
        assert_eq!(template.metadata.as_ref().unwrap().labels, app_label());
        let containers = &template.spec.as_ref().unwrap().containers;
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0].name, "MyComp");
        assert_eq!(containers[0].image.as_deref(), Some("MyComp:latest"));
        let ports = containers[0].ports.as_ref().unwrap();
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].container_port, 8080);
        assert_eq!(ports[0].protocol.as_deref(), Some("TCP"));
    }

    #[test]
    fn deployment_config_triggers() {
        let component = component("nodejs", "");
        let dc = deployment_config(&component, &output_image(&component));

        assert_eq!(dc.spec.triggers.len(), 2);
        assert_eq!(dc.spec.triggers[0].type_, DeploymentTriggerType::ConfigChange);
        assert_eq!(dc.spec.triggers[1].type_, DeploymentTriggerType::ImageChange);

        let params = dc.spec.triggers[1].image_change_params.as_ref().unwrap();
        assert!(params.automatic);
        assert_eq!(params.container_names, vec!["MyComp".to_string()]);
        assert_eq!(params.from.kind.as_deref(), Some("ImageStreamTag"));
        assert_eq!(params.from.name.as_deref(), Some("MyComp:latest"));
    }

    #[test]
    fn trigger_wire_format() {
        let component = component("nodejs", "");
        let builder = builder_image(&component, &runtimes()).unwrap();
        let bc = serde_json::to_value(build_config(&component, &builder)).unwrap();
        assert_eq!(
            bc["spec"]["triggers"],
            serde_json::json!([{ "type": "ConfigChange" }, { "type": "ImageChange", "imageChange": {} }])
        );
        assert_eq!(bc["spec"]["source"]["git"]["ref"], "master");
        assert_eq!(bc["spec"]["strategy"]["sourceStrategy"]["incremental"], true);
    }
}

//! Labels and names shared by every object derived from a [`Component`].

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::ObjectReference;
use kube::api::ObjectMeta;
use kube::ResourceExt;

use crate::component::Component;

/// Label carrying the owning component's name.
pub const APP_LABEL: &str = "app";

pub const LATEST_TAG: &str = "latest";

const IMAGE_STREAM_TAG: &str = "ImageStreamTag";

pub fn labels(component: &Component) -> BTreeMap<String, String> {
    BTreeMap::from([(APP_LABEL.to_string(), component.name_any())])
}

/// Metadata for an object named `name` in the component's namespace.
pub fn object_meta(component: &Component, name: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: component.namespace(),
        labels: Some(labels(component)),
        ..Default::default()
    }
}

/// `<name>:latest`
pub fn latest_tag(image_stream: &str) -> String {
    format!("{image_stream}:{LATEST_TAG}")
}

/// Reference to the `latest` tag of an image stream. Without a namespace the
/// reference resolves in the namespace of the referring object.
pub fn latest_image_stream_tag(image_stream: &str, namespace: Option<String>) -> ObjectReference {
    ObjectReference {
        kind: Some(IMAGE_STREAM_TAG.to_string()),
        name: Some(latest_tag(image_stream)),
        namespace,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentSpec;

    #[test]
    fn metadata_is_labelled_with_component_name() {
        let mut component = Component::new("MyComp", ComponentSpec::default());
        component.metadata.namespace = Some("test-project".into());

        let meta = object_meta(&component, "nodejs");
        assert_eq!(meta.name.as_deref(), Some("nodejs"));
        assert_eq!(meta.namespace.as_deref(), Some("test-project"));
        assert_eq!(
            meta.labels,
            Some(BTreeMap::from([("app".to_string(), "MyComp".to_string())]))
        );
    }

    #[test]
    fn image_stream_tag_reference() {
        let reference = latest_image_stream_tag("nodejs", Some("openshift".into()));
        assert_eq!(reference.kind.as_deref(), Some("ImageStreamTag"));
        assert_eq!(reference.name.as_deref(), Some("nodejs:latest"));
        assert_eq!(reference.namespace.as_deref(), Some("openshift"));
    }
}

//! Offline rendering of the objects a Component would produce.

use log::debug;
use serde::Serialize;
use thiserror::Error;
use Error::*;

use crate::component::Component;
use crate::oci::RuntimeImages;
use crate::template;

#[derive(Error, Debug)]
pub enum Error {
    #[error("read {path}: {err}")]
    ReadFile {
        err: std::io::Error,
        path: String,
    },

    #[error("deserialize: {0}")]
    ParseYaml(serde_yaml::Error),

    #[error("serialize: {0}")]
    WriteYaml(serde_yaml::Error),

    #[error("no builder image for build type '{0}'")]
    UnresolvableBuilderImage(String),
}

/// Parse a Component manifest. A namespace given here replaces the one in the
/// manifest; without either, `default` is used.
pub fn parse(yaml_string: &str, namespace: Option<&str>) -> Result<Component, Error> {
    let mut component = serde_yaml::from_str::<Component>(yaml_string).map_err(ParseYaml)?;
    if let Some(namespace) = namespace {
        component.metadata.namespace = Some(namespace.to_string());
    }
    if component.metadata.namespace.is_none() {
        component.metadata.namespace = Some("default".to_string());
    }
    Ok(component)
}

pub fn parse_file(path: &str, namespace: Option<&str>) -> Result<Component, Error> {
    debug!("reading component manifest {path}");
    parse(
        &std::fs::read_to_string(path).map_err(|err| ReadFile {
            err,
            path: path.to_string(),
        })?,
        namespace,
    )
}

/// Render the builder image, output image, build config and deployment config
/// of `component` as a multi-document YAML stream.
///
/// The builder image is always declared from `runtimes`, since there is no
/// cluster to look for a shared one in.
pub fn render(component: &Component, runtimes: &RuntimeImages) -> Result<String, Error> {
    let builder = template::builder_image(component, runtimes)
        .ok_or_else(|| UnresolvableBuilderImage(component.spec.build_type.clone()))?;
    let output = template::output_image(component);

    Ok([
        to_yaml(&builder)?,
        to_yaml(&output)?,
        to_yaml(&template::build_config(component, &builder))?,
        to_yaml(&template::deployment_config(component, &output))?,
    ]
    .join("---\n"))
}

fn to_yaml<T: Serialize>(object: &T) -> Result<String, Error> {
    serde_yaml::to_string(object).map_err(WriteYaml)
}

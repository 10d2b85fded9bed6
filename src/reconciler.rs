//! Converges the objects derived from a [`Component`] toward its spec.
//!
//! A pass only ever creates missing objects. Objects that already exist are
//! left as they are, which makes repeated passes safe after a partial failure.

use kube::ResourceExt;
use log::{debug, info};
use thiserror::Error;

use crate::component::Component;
use crate::oci::RuntimeImages;
use crate::openshift::ImageStream;
use crate::store::{self, Object, ObjectKey, Store};
use crate::template;

#[derive(Error, Debug)]
pub enum Error {
    #[error("component {component}: no builder image for build type '{build_type}'")]
    UnresolvableBuilderImage {
        component: ObjectKey,
        build_type: String,
    },

    #[error("store: {0}")]
    Store(#[from] store::Error),
}

/// What a pass did about one derived object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    Created,
    /// Already present before the pass.
    Existing,
    /// Builder image taken from the shared namespace.
    Shared,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub builder_image: Applied,
    pub output_image: Applied,
    pub build_config: Applied,
    pub deployment_config: Applied,
}

impl Report {
    /// True if the pass created at least one object.
    pub fn changed(&self) -> bool {
        [
            self.builder_image,
            self.output_image,
            self.build_config,
            self.deployment_config,
        ]
        .contains(&Applied::Created)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The component no longer exists; nothing was done.
    Gone,
    Converged(Report),
}

pub struct Reconciler<S> {
    store: S,
    runtimes: RuntimeImages,
    shared_namespace: String,
}

impl<S: Store> Reconciler<S> {
    pub fn new(store: S, runtimes: RuntimeImages, shared_namespace: impl Into<String>) -> Self {
        Self {
            store,
            runtimes,
            shared_namespace: shared_namespace.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one pass for the component at `key`.
    ///
    /// Objects are created in dependency order: builder image, output image,
    /// build config, deployment config. The output image does not depend on
    /// the builder, so it is still created when the builder cannot be resolved;
    /// the pass then fails before the build config.
    pub async fn reconcile(&self, key: &ObjectKey) -> Result<Outcome, Error> {
        let Some(component) = self.store.get::<Component>(key).await? else {
            debug!("component {key} not found, assuming it was deleted");
            return Ok(Outcome::Gone);
        };

        let builder = self.resolve_builder_image(&component).await?;

        let output = template::output_image(&component);
        let output_image = self.ensure(&output).await?;

        let Some((builder, builder_image)) = builder else {
            return Err(Error::UnresolvableBuilderImage {
                component: key.clone(),
                build_type: component.spec.build_type.clone(),
            });
        };

        let build_config = self
            .ensure(&template::build_config(&component, &builder))
            .await?;
        let deployment_config = self
            .ensure(&template::deployment_config(&component, &output))
            .await?;

        let report = Report {
            builder_image,
            output_image,
            build_config,
            deployment_config,
        };
        info!("component {key} reconciled: {report:?}");
        Ok(Outcome::Converged(report))
    }

    /// Find the image stream the build starts from.
    ///
    /// An image stream named after the build type in the shared namespace wins.
    /// Otherwise one is declared in the component's namespace from the runtime
    /// image table. `None` if neither applies.
    async fn resolve_builder_image(
        &self,
        component: &Component,
    ) -> Result<Option<(ImageStream, Applied)>, Error> {
        let build_type = &component.spec.build_type;

        // An empty name would address the whole collection.
        if !build_type.is_empty() {
            let shared = ObjectKey::new(&self.shared_namespace, build_type);
            if let Some(image) = self.store.get::<ImageStream>(&shared).await? {
                debug!("using shared builder image {shared}");
                return Ok(Some((image, Applied::Shared)));
            }
        }

        match template::builder_image(component, &self.runtimes) {
            Some(image) => {
                let applied = self.ensure(&image).await?;
                Ok(Some((image, applied)))
            }
            None => Ok(None),
        }
    }

    /// Create `object` unless it already exists.
    async fn ensure<K: Object>(&self, object: &K) -> Result<Applied, Error> {
        match self.store.create(object).await {
            Ok(_) => {
                info!(
                    "created {} {}/{}",
                    K::kind(&()),
                    object.namespace().unwrap_or_default(),
                    object.name_any()
                );
                Ok(Applied::Created)
            }
            Err(store::Error::AlreadyExists { kind, key }) => {
                debug!("{kind} {key} already exists");
                Ok(Applied::Existing)
            }
            Err(err) => Err(err.into()),
        }
    }
}

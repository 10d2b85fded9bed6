//! Runs the reconciler for every Component in the cluster.
//!
//! Components are watched directly. Derived objects are matched back to their
//! component through the `app` label, so deleting one of them triggers a pass
//! that recreates it.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use kube::runtime::controller::Action;
use kube::runtime::reflector::ObjectRef;
use kube::runtime::{watcher, Controller};
use kube::{Api, Client, Resource, ResourceExt};
use log::{debug, info, warn};
use thiserror::Error;

use crate::component::Component;
use crate::config;
use crate::naming::APP_LABEL;
use crate::openshift::{BuildConfig, DeploymentConfig, ImageStream};
use crate::reconciler::{self, Outcome, Reconciler};
use crate::store::{self, ClusterStore, Object, ObjectKey};

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Reconcile(#[from] reconciler::Error),

    #[error(transparent)]
    Store(#[from] store::Error),
}

pub struct Context {
    reconciler: Reconciler<ClusterStore>,
    retry_interval: Duration,
}

impl Context {
    pub fn new(client: Client, cfg: &config::File) -> Self {
        Self {
            reconciler: Reconciler::new(
                ClusterStore::new(client),
                cfg.runtime_images(),
                cfg.shared_namespace.clone(),
            ),
            retry_interval: cfg.retry_interval(),
        }
    }
}

fn api<K: Object>(client: &Client, namespace: Option<&str>) -> Api<K> {
    match namespace {
        Some(namespace) => Api::namespaced(client.clone(), namespace),
        None => Api::all(client.clone()),
    }
}

/// The component an object was derived for, according to its `app` label.
fn owning_component<K: Resource>(object: K) -> Option<ObjectRef<Component>> {
    let name = object.labels().get(APP_LABEL)?;
    let namespace = object.namespace()?;
    Some(ObjectRef::new(name).within(&namespace))
}

async fn reconcile(component: Arc<Component>, ctx: Arc<Context>) -> Result<Action, Error> {
    let key = ObjectKey::of(component.as_ref())?;
    match ctx.reconciler.reconcile(&key).await? {
        Outcome::Gone => debug!("component {key} is gone"),
        Outcome::Converged(report) if report.changed() => info!("component {key} converged"),
        Outcome::Converged(_) => debug!("component {key} up to date"),
    }
    Ok(Action::await_change())
}

fn error_policy(component: Arc<Component>, err: &Error, ctx: Arc<Context>) -> Action {
    warn!(
        "reconcile {}/{} failed: {err}",
        component.namespace().unwrap_or_default(),
        component.name_any()
    );
    Action::requeue(ctx.retry_interval)
}

/// Watch Components, in `namespace` or cluster-wide, until the process is signalled.
pub async fn run(client: Client, cfg: &config::File, namespace: Option<&str>) {
    let derived = watcher::Config::default().labels(APP_LABEL);
    let ctx = Arc::new(Context::new(client.clone(), cfg));

    info!(
        "watching components in {}",
        namespace.unwrap_or("all namespaces")
    );

    Controller::new(api::<Component>(&client, namespace), watcher::Config::default())
        .watches(
            api::<ImageStream>(&client, namespace),
            derived.clone(),
            owning_component,
        )
        .watches(
            api::<BuildConfig>(&client, namespace),
            derived.clone(),
            owning_component,
        )
        .watches(
            api::<DeploymentConfig>(&client, namespace),
            derived,
            owning_component,
        )
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((component, _)) => debug!("reconciled {component}"),
                Err(err) => warn!("reconcile error: {err}"),
            }
        })
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentSpec;
    use crate::openshift::ImageStreamSpec;
    use std::collections::BTreeMap;

    #[test]
    fn derived_object_maps_to_component() {
        let mut image = ImageStream::new("nodejs", ImageStreamSpec::default());
        image.metadata.namespace = Some("test-project".into());
        image.metadata.labels = Some(BTreeMap::from([(
            "app".to_string(),
            "MyComp".to_string(),
        )]));

        let owner = owning_component(image).unwrap();
        assert_eq!(owner, ObjectRef::new("MyComp").within("test-project"));
    }

    #[test]
    fn unlabelled_object_maps_to_nothing() {
        let mut image = ImageStream::new("nodejs", ImageStreamSpec::default());
        image.metadata.namespace = Some("openshift".into());
        assert!(owning_component(image).is_none());

        let component = Component::new("MyComp", ComponentSpec::default());
        assert!(owning_component(component).is_none());
    }
}

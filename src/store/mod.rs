//! Typed access to cluster objects addressed by namespace and name.
//!
//! The reconciler only ever reads and creates, so that is all a store offers.

use std::fmt::{Debug, Display, Formatter};

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use kube::{Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

mod cluster;
mod memory;

pub use cluster::ClusterStore;
pub use memory::MemoryStore;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{kind} {key} already exists")]
    AlreadyExists { kind: String, key: ObjectKey },

    #[error("object has no {0}")]
    MissingObjectKey(&'static str),

    #[error("kubernetes api: {0}")]
    Kube(#[from] kube::Error),

    #[error("serialize object: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Namespaced object that can be kept in a [`Store`].
pub trait Object:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
}

impl<K> Object for K where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static
{
}

/// Namespace and name of an object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn of<K: Resource>(object: &K) -> Result<Self, Error> {
        let name = object
            .meta()
            .name
            .clone()
            .ok_or(Error::MissingObjectKey("metadata.name"))?;
        let namespace = object
            .namespace()
            .ok_or(Error::MissingObjectKey("metadata.namespace"))?;
        Ok(Self { namespace, name })
    }
}

impl Display for ObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Reads an object. A missing object is `Ok(None)`, not an error.
    async fn get<K: Object>(&self, key: &ObjectKey) -> Result<Option<K>, Error>;

    /// Creates an object in the namespace named by its metadata.
    ///
    /// Returns [`Error::AlreadyExists`] if an object of the same kind, namespace
    /// and name is already stored. The stored object is left untouched.
    async fn create<K: Object>(&self, object: &K) -> Result<K, Error>;
}

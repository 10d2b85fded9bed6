use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{Error, Object, ObjectKey, Store};

pub type StorageKey = String; // Format: "Kind/namespace/name"

fn make_storage_key<K: Object>(key: &ObjectKey) -> StorageKey {
    format!("{}/{}", K::kind(&()), key)
}

/// In-memory store holding objects as JSON, the way the API server would.
///
/// Objects round-trip through serde on every access, so a read never hands
/// out a reference to stored state.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<StorageKey, Value>>,
    /// Kinds whose creation fails with [`Error::Unavailable`].
    failing_creates: HashSet<String>,
    /// Kinds whose reads fail with [`Error::Unavailable`].
    failing_gets: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every create of `K` fail as if the backend were unreachable.
    pub fn fail_creates_of<K: Object>(mut self) -> Self {
        self.failing_creates.insert(K::kind(&()).into_owned());
        self
    }

    /// Make every read of `K` fail as if the backend were unreachable.
    pub fn fail_gets_of<K: Object>(mut self) -> Self {
        self.failing_gets.insert(K::kind(&()).into_owned());
        self
    }

    /// Number of stored objects of every kind.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Number of stored objects of kind `K`.
    pub async fn count<K: Object>(&self) -> usize {
        let prefix = format!("{}/", K::kind(&()));
        self.objects
            .read()
            .await
            .keys()
            .filter(|key| key.starts_with(&prefix))
            .count()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get<K: Object>(&self, key: &ObjectKey) -> Result<Option<K>, Error> {
        let kind = K::kind(&());
        if self.failing_gets.contains(kind.as_ref()) {
            return Err(Error::Unavailable(format!("cannot read {kind} {key}")));
        }

        let objects = self.objects.read().await;
        match objects.get(&make_storage_key::<K>(key)) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    async fn create<K: Object>(&self, object: &K) -> Result<K, Error> {
        let key = ObjectKey::of(object)?;
        let kind = K::kind(&()).into_owned();
        if self.failing_creates.contains(&kind) {
            return Err(Error::Unavailable(format!("cannot create {kind} {key}")));
        }

        let storage_key = make_storage_key::<K>(&key);
        let mut objects = self.objects.write().await;
        if objects.contains_key(&storage_key) {
            return Err(Error::AlreadyExists { kind, key });
        }
        debug!("storing {storage_key}");
        objects.insert(storage_key, serde_json::to_value(object)?);
        Ok(object.clone())
    }
}

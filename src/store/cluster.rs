use async_trait::async_trait;
use kube::api::PostParams;
use kube::core::ErrorResponse;
use kube::{Api, Client};

use super::{Error, Object, ObjectKey, Store};

const STATUS_CONFLICT: u16 = 409;
const REASON_ALREADY_EXISTS: &str = "AlreadyExists";

/// A 409 is also returned for update conflicts; only this reason means the
/// object is already there.
fn is_already_exists(response: &ErrorResponse) -> bool {
    response.code == STATUS_CONFLICT && response.reason == REASON_ALREADY_EXISTS
}

/// Store backed by the Kubernetes API server.
#[derive(Clone)]
pub struct ClusterStore {
    client: Client,
}

impl ClusterStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api<K: Object>(&self, namespace: &str) -> Api<K> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl Store for ClusterStore {
    async fn get<K: Object>(&self, key: &ObjectKey) -> Result<Option<K>, Error> {
        Ok(self.api::<K>(&key.namespace).get_opt(&key.name).await?)
    }

    async fn create<K: Object>(&self, object: &K) -> Result<K, Error> {
        let key = ObjectKey::of(object)?;
        match self
            .api::<K>(&key.namespace)
            .create(&PostParams::default(), object)
            .await
        {
            Ok(created) => Ok(created),
            Err(kube::Error::Api(response)) if is_already_exists(&response) => {
                Err(Error::AlreadyExists {
                    kind: K::kind(&()).into_owned(),
                    key,
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(code: u16, reason: &str) -> ErrorResponse {
        ErrorResponse {
            status: "Failure".to_string(),
            message: format!("{reason} ({code})"),
            reason: reason.to_string(),
            code,
        }
    }

    #[test]
    fn only_already_exists_conflicts_are_tolerated() {
        assert!(is_already_exists(&response(409, "AlreadyExists")));
        assert!(!is_already_exists(&response(409, "Conflict")));
        assert!(!is_already_exists(&response(404, "NotFound")));
    }
}

//! Capability interface over the resource store: list, watch, get.
//!
//! The engines never talk to `kube::Api` directly; they drive this trait so
//! the same loops run against a live cluster or a scripted fake in tests.

use super::Selector;
use crate::error::{Error, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use kube::api::WatchEvent;
use kube::{Api, Client};
use serde::de::DeserializeOwned;

/// Live events paired with the list cursor they resume from.
pub type WatchStream<K> = BoxStream<'static, Result<WatchEvent<K>>>;

/// List/watch/get access to one resource kind in one scope.
#[async_trait]
pub trait ObserveResource: Send + Sync {
    type Obj: Send + Sync + std::fmt::Debug;

    /// Snapshot the matching objects together with the resource-version
    /// cursor a subsequent watch resumes from.
    async fn list(&self, selector: &Selector) -> Result<(Vec<Self::Obj>, String)>;

    /// Open a watch at the given cursor. The stream ending without an error
    /// is routine (server-side timeout), not a failure.
    async fn watch(&self, selector: &Selector, cursor: &str) -> Result<WatchStream<Self::Obj>>;

    /// Fetch a single object by name.
    async fn get(&self, name: &str) -> Result<Self::Obj>;
}

/// `ObserveResource` over a namespaced `kube::Api` handle.
pub struct ApiAccess<K> {
    api: Api<K>,
}

impl<K> ApiAccess<K> {
    #[must_use]
    pub const fn new(api: Api<K>) -> Self {
        Self { api }
    }
}

impl<K> ApiAccess<K>
where
    K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
    K::DynamicType: Default,
{
    #[must_use]
    pub fn namespaced(client: Client, namespace: &str) -> Self {
        Self::new(Api::namespaced(client, namespace))
    }
}

#[async_trait]
impl<K> ObserveResource for ApiAccess<K>
where
    K: kube::Resource + Clone + DeserializeOwned + std::fmt::Debug + Send + Sync + 'static,
{
    type Obj = K;

    async fn list(&self, selector: &Selector) -> Result<(Vec<K>, String)> {
        let list = self.api.list(&selector.list_params()).await?;
        let cursor = list.metadata.resource_version.unwrap_or_default();
        Ok((list.items, cursor))
    }

    async fn watch(&self, selector: &Selector, cursor: &str) -> Result<WatchStream<K>> {
        let stream = self.api.watch(&selector.watch_params(), cursor).await?;
        Ok(stream.map_err(Error::from).boxed())
    }

    async fn get(&self, name: &str) -> Result<K> {
        Ok(self.api.get(name).await?)
    }
}

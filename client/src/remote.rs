//! The seam between the store and the network.

use crate::api::{ApiClient, Endpoints, Result};
use async_trait::async_trait;
use optimist_engine::{QueryParams, Resource};
use std::marker::PhantomData;

/// Remote collection of `R` records.
///
/// The store only ever talks to the server through this trait.
#[async_trait]
pub trait Remote<R: Resource>: Send + Sync + 'static {
    /// Fetch a page of records.
    async fn list(&self, params: &QueryParams) -> Result<Vec<R>>;

    /// Fetch one record.
    async fn get(&self, id: &str) -> Result<R>;

    /// Free-text search.
    async fn search(&self, query: &str) -> Result<Vec<R>>;

    /// Create a record; the server assigns its id and timestamps.
    async fn create(&self, draft: &R::Draft) -> Result<R>;

    /// Apply a partial update and return the authoritative record.
    async fn update(&self, id: &str, patch: &R::Patch) -> Result<R>;

    /// Delete a record.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// [`Remote`] backed by a REST API.
#[derive(Debug, Clone)]
pub struct RestRemote<R> {
    client: ApiClient,
    endpoints: Endpoints,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> RestRemote<R> {
    /// Create a remote for the collection at `endpoints`.
    pub fn new(client: ApiClient, endpoints: Endpoints) -> Self {
        Self {
            client,
            endpoints,
            _resource: PhantomData,
        }
    }

    /// The underlying HTTP client.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait]
impl<R: Resource> Remote<R> for RestRemote<R> {
    async fn list(&self, params: &QueryParams) -> Result<Vec<R>> {
        self.client
            .get_with(self.endpoints.list(), params)
            .await
    }

    async fn get(&self, id: &str) -> Result<R> {
        self.client.get(&self.endpoints.detail(id)).await
    }

    async fn search(&self, query: &str) -> Result<Vec<R>> {
        self.client
            .get_with(&self.endpoints.search(), &[("q", query)])
            .await
    }

    async fn create(&self, draft: &R::Draft) -> Result<R> {
        self.client.post(self.endpoints.list(), draft).await
    }

    async fn update(&self, id: &str, patch: &R::Patch) -> Result<R> {
        self.client.put(&self.endpoints.detail(id), patch).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let _: serde_json::Value = self.client.delete(&self.endpoints.detail(id)).await?;
        Ok(())
    }
}

//! Page sources: anything a list view can pull pages from.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use attendify_core::{ListQueryState, PageResult, Resource};
use serde::de::DeserializeOwned;

use crate::client::{ApiClient, group_members_path};
use crate::error::ApiError;

/// Fetches one page of rows for the given query.
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    async fn fetch(&self, query: &ListQueryState) -> Result<PageResult<T>, ApiError>;
}

/// A list endpoint of the API, typically a [`Resource`] collection.
pub struct Collection<T> {
    client: Arc<ApiClient>,
    path: String,
    _rows: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection").field("path", &self.path).finish_non_exhaustive()
    }
}

impl<T> Collection<T> {
    #[must_use]
    pub fn at(client: Arc<ApiClient>, path: impl Into<String>) -> Self {
        Self { client, path: path.into(), _rows: PhantomData }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl<T: Resource> Collection<T> {
    /// The collection at `T::PATH`.
    #[must_use]
    pub fn of(client: Arc<ApiClient>) -> Self {
        Self::at(client, T::PATH)
    }
}

impl Collection<attendify_core::User> {
    /// Members of one group.
    #[must_use]
    pub fn group_members(client: Arc<ApiClient>, group_id: &str) -> Self {
        Self::at(client, group_members_path(group_id))
    }
}

#[async_trait]
impl<T> PageSource<T> for Collection<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch(&self, query: &ListQueryState) -> Result<PageResult<T>, ApiError> {
        self.client.fetch_page_at(&self.path, query).await
    }
}

use std::sync::Arc;

use attendify_core::endpoints;
use attendify_core::{Event, ListQueryState, MembershipInput, PageResult, Resource, User};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::credentials::CredentialStore;
use crate::envelope::{decode_data, decode_page, error_from_body};
use crate::error::ApiError;

/// Client for the attendify REST API.
///
/// Every request carries the access token currently held by the credential
/// store, so a login or logout takes effect on the next call.
pub struct ApiClient {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) credentials: Arc<dyn CredentialStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("client", &self.client)
            .field("base_url", &self.base_url)
            .field("credentials", &"***")
            .finish()
    }
}

impl ApiClient {
    /// Creates a client for `config.api_url`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(config: &ClientConfig, credentials: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::ClientInit(e.to_string()))?;
        Ok(Self { client, base_url: config.api_url.trim_end_matches('/').to_owned(), credentials })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Fetches one page of `T` from its collection path.
    ///
    /// # Errors
    /// Returns `ApiError` on transport failure, a non-success status or a
    /// body that does not match the list schema.
    pub async fn fetch_page<T>(&self, query: &ListQueryState) -> Result<PageResult<T>, ApiError>
    where
        T: Resource + DeserializeOwned,
    {
        self.fetch_page_at(T::PATH, query).await
    }

    /// Fetches one page from an arbitrary list endpoint.
    ///
    /// Only `page`, `pageSize` and `search` are sent; sorting stays local.
    ///
    /// # Errors
    /// See [`ApiClient::fetch_page`].
    pub async fn fetch_page_at<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &ListQueryState,
    ) -> Result<PageResult<T>, ApiError> {
        let context = format!("GET {path}");
        let request = self.request(Method::GET, path).query(&query.request_params());
        let body = self.send(request, &context).await?;
        Ok(decode_page(&body, &context)?)
    }

    /// Fetches a single entity by id: `GET {PATH}/{id}`.
    ///
    /// # Errors
    /// Returns `ApiError::Status` with 404 when the entity does not exist.
    pub async fn fetch_one<T>(&self, id: &str) -> Result<T, ApiError>
    where
        T: Resource + DeserializeOwned,
    {
        self.get_data(&format!("{}/{id}", T::PATH)).await
    }

    /// `GET {path}` returning a `{ data: T }` body.
    ///
    /// # Errors
    /// Returns `ApiError` on transport, status or schema failure.
    pub async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let context = format!("GET {path}");
        let body = self.send(self.request(Method::GET, path), &context).await?;
        Ok(decode_data(&body, &context)?)
    }

    /// `POST {PATH}/create`.
    ///
    /// # Errors
    /// Returns `ApiError` with the server message when the API rejects the body.
    pub async fn create<T, B>(&self, body: &B) -> Result<(), ApiError>
    where
        T: Resource,
        B: Serialize + ?Sized,
    {
        let path = format!("{}/create", T::PATH);
        self.mutate(Method::POST, &path, Some(body)).await
    }

    /// `PUT {PATH}/{id}/edit`.
    ///
    /// # Errors
    /// Returns `ApiError` with the server message when the API rejects the body.
    pub async fn update<T, B>(&self, id: &str, body: &B) -> Result<(), ApiError>
    where
        T: Resource,
        B: Serialize + ?Sized,
    {
        let path = format!("{}/{id}/edit", T::PATH);
        self.mutate(Method::PUT, &path, Some(body)).await
    }

    /// `DELETE {PATH}/{id}/delete`.
    ///
    /// # Errors
    /// Returns `ApiError` when the API refuses the deletion.
    pub async fn delete<T: Resource>(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("{}/{id}/delete", T::PATH);
        self.mutate::<()>(Method::DELETE, &path, None).await
    }

    /// Users matching free text, used by the member pickers.
    ///
    /// # Errors
    /// Returns `ApiError` on transport, status or schema failure.
    pub async fn search_users(&self, search: &str) -> Result<Vec<User>, ApiError> {
        let context = format!("GET {}", endpoints::USERS);
        let request = self.request(Method::GET, endpoints::USERS).query(&[("search", search)]);
        let body = self.send(request, &context).await?;
        let page: PageResult<User> = decode_page(&body, &context)?;
        Ok(page.items)
    }

    /// One page of the members of a group.
    ///
    /// # Errors
    /// Returns `ApiError` on transport, status or schema failure.
    pub async fn group_members(
        &self,
        group_id: &str,
        query: &ListQueryState,
    ) -> Result<PageResult<User>, ApiError> {
        self.fetch_page_at(&group_members_path(group_id), query).await
    }

    /// Replaces the whole membership of a group with `users`.
    ///
    /// # Errors
    /// Returns `ApiError` with the server message when the update is rejected.
    pub async fn replace_group_members(&self, group_id: &str, users: &[User]) -> Result<(), ApiError> {
        let path = format!("{}/{group_id}/edit", endpoints::GROUP_MEMBERSHIP);
        self.mutate(Method::PUT, &path, Some(&MembershipInput::from_users(users))).await
    }

    /// Events overlapping the calendar range.
    ///
    /// # Errors
    /// Returns `ApiError` on transport, status or schema failure.
    pub async fn upcoming_events(
        &self,
        start: NaiveDate,
        end: DateTime<Utc>,
    ) -> Result<Vec<Event>, ApiError> {
        let path = endpoints::PROJECTS_UPCOMING;
        let context = format!("GET {path}");
        let params = [
            ("start", start.format("%Y-%m-%d").to_string()),
            ("end", end.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ];
        let request = self.request(Method::GET, path).query(&params);
        let body = self.send(request, &context).await?;
        Ok(decode_data(&body, &context)?)
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Builds a request carrying the stored bearer token, if any. Unreadable
    /// credentials are logged and the request goes out unauthenticated.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.credentials.load() {
            Ok(Some(credentials)) => builder.bearer_auth(credentials.access_token),
            Ok(None) => builder,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable credentials");
                builder
            },
        }
    }

    /// Sends a mutation and ignores the response body on success.
    pub(crate) async fn mutate<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        let context = format!("{method} {path}");
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(request, &context).await?;
        tracing::info!(%context, "Mutation accepted");
        Ok(())
    }

    /// Sends the request and returns the body of a 2xx response.
    pub(crate) async fn send(&self, request: RequestBuilder, context: &str) -> Result<String, ApiError> {
        tracing::debug!(%context, "Sending request");
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let err = error_from_body(status.as_u16(), &body);
        tracing::warn!(%context, status = status.as_u16(), message = %err.message(), "Request failed");
        Err(err)
    }
}

/// `/user/{group_id}/get-by-group`.
#[must_use]
pub fn group_members_path(group_id: &str) -> String {
    format!("{}/{group_id}/{}", endpoints::USERS, endpoints::USERS_BY_GROUP_SUFFIX)
}

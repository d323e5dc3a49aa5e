//! HTTP client for the Marginalia comments API.
//!
//! Wraps every endpoint under `/api/comments` using [`reqwest`]. Each method
//! issues exactly one request; there is no retry, batching or caching.

mod error;

pub use error::ClientError;

use chrono::{DateTime, Utc};
use marginalia_core::content::RichContent;
use marginalia_core::roles::AuthInfoWithRole;
use marginalia_core::schemas::{ListCommentsQuery, SortOrder};
use marginalia_core::types::UserProfile;
use marginalia_storage::SerializedComment;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::json;

/// Listing options for [`CommentsClient::fetch_comments`].
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Only replies to this comment; top-level comments when `None`.
    pub thread: Option<String>,
    pub sort: Option<SortOrder>,
    /// Exclusive upper bound on creation time.
    pub before: Option<DateTime<Utc>>,
    /// Exclusive lower bound on creation time.
    pub after: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
}

impl From<&FetchOptions> for ListCommentsQuery {
    fn from(options: &FetchOptions) -> Self {
        Self {
            thread: options.thread.clone(),
            sort: options.sort,
            before: options.before.map(|t| t.timestamp_millis()),
            after: options.after.map(|t| t.timestamp_millis()),
            limit: options.limit.map(i64::from),
        }
    }
}

/// HTTP client for one comments API mount point.
#[derive(Debug, Clone)]
pub struct CommentsClient {
    client: reqwest::Client,
    api_url: Url,
    token: Option<String>,
}

impl CommentsClient {
    /// Create a client for the API mounted at `api_url`,
    /// e.g. `https://example.com/api/comments`.
    pub fn new(api_url: &str) -> Result<Self, ClientError> {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: &str) -> Result<Self, ClientError> {
        let api_url = Url::parse(api_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if api_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!(
                "{api_url} cannot be used as a base URL"
            )));
        }
        Ok(Self {
            client,
            api_url,
            token: None,
        })
    }

    /// Send the given session token as a Bearer token on every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Replace or clear the session token.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// List comments of a page.
    ///
    /// Sends `GET {api}/{page}` with the options as query parameters
    /// (timestamps as Unix milliseconds).
    pub async fn fetch_comments(
        &self,
        page: &str,
        options: &FetchOptions,
    ) -> Result<Vec<SerializedComment>, ClientError> {
        let query = ListCommentsQuery::from(options);
        let request = self.request(Method::GET, &[page])?.query(&query);

        Self::parse_response(request.send().await?).await
    }

    /// Post a new comment, optionally as a reply to `thread`.
    pub async fn post_comment(
        &self,
        page: &str,
        content: &RichContent,
        thread: Option<&str>,
    ) -> Result<SerializedComment, ClientError> {
        let mut body = json!({ "content": content });
        if let Some(thread) = thread {
            body["thread"] = json!(thread);
        }

        let response = self.request(Method::POST, &[page])?.json(&body).send().await?;

        Self::parse_response(response).await
    }

    /// Replace the content of one of the caller's comments.
    pub async fn edit_comment(
        &self,
        page: &str,
        id: &str,
        content: &RichContent,
    ) -> Result<(), ClientError> {
        let response = self
            .request(Method::PATCH, &[page, id])?
            .json(&json!({ "content": content }))
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Delete a comment together with its replies.
    pub async fn delete_comment(&self, page: &str, id: &str) -> Result<(), ClientError> {
        let response = self.request(Method::DELETE, &[page, id])?.send().await?;

        Self::check_status(response).await
    }

    /// Like (`true`) or dislike (`false`) a comment, replacing any previous rate.
    pub async fn set_rate(&self, page: &str, id: &str, like: bool) -> Result<(), ClientError> {
        let response = self
            .request(Method::POST, &[page, id, "rate"])?
            .json(&json!({ "like": like }))
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Remove the caller's rate on a comment.
    pub async fn delete_rate(&self, page: &str, id: &str) -> Result<(), ClientError> {
        let response = self
            .request(Method::DELETE, &[page, id, "rate"])?
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Search users by name for mention autocomplete.
    pub async fn query_users(
        &self,
        page: &str,
        name: &str,
    ) -> Result<Vec<UserProfile>, ClientError> {
        let response = self
            .request(Method::GET, &[page, "users"])?
            .query(&[("name", name)])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch the caller's session and role.
    pub async fn get_auth_session(&self, page: &str) -> Result<AuthInfoWithRole, ClientError> {
        let response = self.request(Method::GET, &[page, "auth"])?.send().await?;

        Self::parse_response(response).await
    }

    /// Validate a draft on the server and return its rendered HTML.
    pub async fn preview_comment(
        &self,
        page: &str,
        content: &RichContent,
    ) -> Result<String, ClientError> {
        let response = self
            .request(Method::POST, &[page, "preview"])?
            .json(&json!({ "content": content }))
            .send()
            .await?;

        Ok(Self::ensure_success(response).await?.text().await?)
    }

    // ---- private helpers ----

    /// Build a request to `{api}/{segments...}` with each segment
    /// percent-encoded, attaching the session token if one is set.
    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.api_url.to_string()))?
            .pop_if_empty()
            .extend(segments);

        tracing::debug!(%method, %url, "Comments API request");

        let builder = self.client.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`ClientError::Api`] carrying
    /// the server's message on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: error::error_message(&body),
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ClientError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

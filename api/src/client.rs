use serde::{de::DeserializeOwned, Serialize};

use crate::error::{ApiError, ApiResult, RequestKind};

/// HTTP client for the events platform backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl PartialEq for ApiClient {
    fn eq(&self, other: &Self) -> bool {
        self.base_url == other.base_url
    }
}

impl ApiClient {
    /// * `base_url` - API root, e.g. `https://admin.example.com/api`. A trailing slash is trimmed.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        kind: RequestKind,
        path: &str,
        query: &[(&'static str, String)],
    ) -> ApiResult<T> {
        tracing::debug!(path, ?kind, "GET");
        let response = self.client.get(self.url(path)).query(query).send().await?;
        Self::parse_response(kind, response).await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        kind: RequestKind,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        tracing::debug!(path, ?kind, "POST");
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::parse_response(kind, response).await
    }

    pub(crate) async fn patch_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        kind: RequestKind,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        tracing::debug!(path, ?kind, "PATCH");
        let response = self.client.patch(self.url(path)).json(body).send().await?;
        Self::parse_response(kind, response).await
    }

    pub(crate) async fn delete(&self, kind: RequestKind, path: &str) -> ApiResult<()> {
        tracing::debug!(path, ?kind, "DELETE");
        let response = self.client.delete(self.url(path)).send().await?;
        Self::ensure_success(kind, response).await?;
        Ok(())
    }

    // ---- private helpers ----

    /// Returns the response unchanged on success, or an [`ApiError::Status`] carrying
    /// the status line and body text.
    async fn ensure_success(
        kind: RequestKind,
        response: reqwest::Response,
    ) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), ?kind, "Backend request failed");
            return Err(ApiError::Status {
                kind,
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(
        kind: RequestKind,
        response: reqwest::Response,
    ) -> ApiResult<T> {
        let response = Self::ensure_success(kind, response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slashes() {
        let client = ApiClient::new("https://admin.example.com/api/");
        assert_eq!(
            client.url("/analytics/page_visits"),
            "https://admin.example.com/api/analytics/page_visits"
        );
        assert_eq!(client.base_url(), "https://admin.example.com/api");
    }
}

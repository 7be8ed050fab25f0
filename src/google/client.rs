//! Shared authorized HTTP plumbing for the Google clients.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::google::ApiError;

/// A reqwest client plus the bearer token every Google call carries.
#[derive(Clone)]
pub struct GoogleHttp {
    client: Client,
    token: SecretString,
}

impl GoogleHttp {
    pub fn new(token: SecretString, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, token })
    }

    /// Start a request with the bearer token attached.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(self.token.expose_secret())
    }

    /// Start a request without credentials (API-key endpoints).
    pub fn unauthenticated(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Send and return the response, turning non-2xx into [`ApiError`].
    pub async fn send(&self, label: &str, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!("{} request failed: {}", label, e);
            ApiError::transport(format!("{} request failed: {}", label, e))
        })?;

        let status = response.status();
        tracing::debug!("{} response status: {}", label, status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("{} error body: {}", label, body);
            return Err(ApiError::from_response(status.as_u16(), &body));
        }
        Ok(response)
    }

    /// Send and decode a JSON body.
    pub async fn send_json<R: DeserializeOwned>(
        &self,
        label: &str,
        request: RequestBuilder,
    ) -> Result<R, ApiError> {
        let response = self.send(label, request).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::transport(format!("{} body read failed: {}", label, e)))?;

        serde_json::from_str(&text).map_err(|e| {
            ApiError::transport(format!("{} JSON parse error: {}. Raw: {}", label, e, text))
        })
    }

    /// Send and discard the body.
    pub async fn send_empty(&self, label: &str, request: RequestBuilder) -> Result<(), ApiError> {
        self.send(label, request).await.map(|_| ())
    }
}

/// Join a base URL and a path without doubling slashes.
pub(crate) fn api_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_joins_cleanly() {
        assert_eq!(
            api_url("https://slides.googleapis.com/v1/", "/presentations/p1"),
            "https://slides.googleapis.com/v1/presentations/p1"
        );
        assert_eq!(api_url("http://localhost:8080", "files"), "http://localhost:8080/files");
    }
}

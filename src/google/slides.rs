//! Google Slides API v1 client.

use async_trait::async_trait;
use reqwest::Method;

use crate::google::client::api_url;
use crate::google::{ApiError, BatchReply, GoogleHttp, SlidesApi};
use crate::slides::model::Presentation;
use crate::slides::requests::Request;

pub struct GoogleSlidesClient {
    http: GoogleHttp,
    base_url: String,
}

impl GoogleSlidesClient {
    pub fn new(http: GoogleHttp, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }

    fn presentation_url(&self, presentation_id: &str, suffix: &str) -> String {
        api_url(
            &self.base_url,
            &format!(
                "presentations/{}{}",
                urlencoding::encode(presentation_id),
                suffix
            ),
        )
    }
}

#[async_trait]
impl SlidesApi for GoogleSlidesClient {
    async fn get_presentation(&self, presentation_id: &str) -> Result<Presentation, ApiError> {
        let url = self.presentation_url(presentation_id, "");
        tracing::debug!("Google Slides API: GET {}", url);
        self.http
            .send_json("Google Slides", self.http.request(Method::GET, &url))
            .await
    }

    async fn batch_update(
        &self,
        presentation_id: &str,
        requests: Vec<Request>,
    ) -> Result<BatchReply, ApiError> {
        let url = self.presentation_url(presentation_id, ":batchUpdate");
        tracing::debug!(
            "Google Slides API: POST {} ({} requests)",
            url,
            requests.len()
        );
        let body = serde_json::json!({ "requests": requests });
        self.http
            .send_json(
                "Google Slides",
                self.http.request(Method::POST, &url).json(&body),
            )
            .await
    }

    async fn create_presentation(&self, title: &str) -> Result<Presentation, ApiError> {
        let url = api_url(&self.base_url, "presentations");
        tracing::debug!("Google Slides API: POST {}", url);
        let body = serde_json::json!({ "title": title });
        self.http
            .send_json(
                "Google Slides",
                self.http.request(Method::POST, &url).json(&body),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use secrecy::SecretString;

    #[test]
    fn test_presentation_url_encodes_id() {
        let http = GoogleHttp::new(SecretString::from("t"), Duration::from_secs(1)).unwrap();
        let client = GoogleSlidesClient::new(http, "https://slides.googleapis.com/v1");
        assert_eq!(
            client.presentation_url("abc 1", ":batchUpdate"),
            "https://slides.googleapis.com/v1/presentations/abc%201:batchUpdate"
        );
    }
}

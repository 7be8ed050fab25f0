//! Google Cloud Translation API (v2 basic) client.

use async_trait::async_trait;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::google::{ApiError, GoogleHttp, TranslateApi};

pub struct GoogleTranslateClient {
    http: GoogleHttp,
    base_url: String,
    /// API key; when absent the OAuth bearer token is used instead.
    api_key: Option<SecretString>,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a [String],
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    format: &'static str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Deserialize)]
struct TranslateData {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

impl GoogleTranslateClient {
    pub fn new(http: GoogleHttp, base_url: &str, api_key: Option<SecretString>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl TranslateApi for GoogleTranslateClient {
    async fn translate_batch(
        &self,
        texts: &[String],
        target: &str,
        source: Option<&str>,
    ) -> Result<Vec<String>, ApiError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(
            "Google Translate API: POST {} ({} strings -> {})",
            self.base_url,
            texts.len(),
            target
        );

        let body = TranslateRequest {
            q: texts,
            target,
            source,
            format: "text",
        };
        let request = match &self.api_key {
            Some(key) => self
                .http
                .unauthenticated(Method::POST, &self.base_url)
                .query(&[("key", key.expose_secret())]),
            None => self.http.request(Method::POST, &self.base_url),
        };

        let response: TranslateResponse = self
            .http
            .send_json("Google Translate", request.json(&body))
            .await?;

        let translated: Vec<String> = response
            .data
            .translations
            .into_iter()
            .map(|t| t.translated_text)
            .collect();

        if translated.len() != texts.len() {
            return Err(ApiError::transport(format!(
                "translation returned {} strings for {} inputs",
                translated.len(),
                texts.len()
            )));
        }
        Ok(translated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let texts = vec!["Hello".to_string(), "World".to_string()];
        let body = TranslateRequest {
            q: &texts,
            target: "es",
            source: None,
            format: "text",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"q": ["Hello", "World"], "target": "es", "format": "text"})
        );
    }

    #[test]
    fn test_response_decoding() {
        let response: TranslateResponse = serde_json::from_str(
            r#"{"data": {"translations": [{"translatedText": "Hola", "detectedSourceLanguage": "en"}]}}"#,
        )
        .unwrap();
        assert_eq!(response.data.translations[0].translated_text, "Hola");
    }
}

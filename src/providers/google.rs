use log::debug;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::providers::TranslateProvider;

const FREE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
const KEYED_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";

/// Google Translate adapter.
///
/// Uses the Cloud Translation v2 REST API when a key is configured and the
/// unauthenticated `translate_a/single` endpoint otherwise.
#[derive(Debug)]
pub struct GoogleTranslate {
    client: Client,
    api_key: Option<String>,
}

impl GoogleTranslate {
    /// Create a new Google adapter
    pub fn new(api_key: Option<String>, timeout_ms: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_millis(timeout_ms))
                .build()
                .unwrap_or_default(),
            api_key,
        }
    }

    async fn translate_free(&self, text: &str, target_lang: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(FREE_ENDPOINT)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::request_failed("google", 0, &e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::request_failed("google", status.as_u16(), &body));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::response_invalid("google", e.to_string()))?;

        // Free-endpoint shape: [[["translated", "original", …], …], …]
        let segments = payload
            .get(0)
            .and_then(|v| v.as_array())
            .ok_or_else(|| ProviderError::response_invalid("google", "missing segment array"))?;

        let mut out = String::new();
        for segment in segments {
            if let Some(piece) = segment.get(0).and_then(|v| v.as_str()) {
                out.push_str(piece);
            }
        }
        if out.is_empty() {
            return Err(ProviderError::response_invalid("google", "empty translation"));
        }
        Ok(out)
    }

    async fn translate_keyed(
        &self,
        key: &str,
        text: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError> {
        let body = json!({
            "q": [text],
            "target": target_lang,
            "format": "html",
        });

        let response = self
            .client
            .post(KEYED_ENDPOINT)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::request_failed("google", 0, &e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::request_failed("google", status.as_u16(), &body));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::response_invalid("google", e.to_string()))?;

        payload
            .pointer("/data/translations/0/translatedText")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| ProviderError::response_invalid("google", "missing translatedText"))
    }
}

#[async_trait]
impl TranslateProvider for GoogleTranslate {
    fn name(&self) -> &str {
        "google"
    }

    async fn translate_chunk(
        &self,
        text: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError> {
        match &self.api_key {
            Some(key) => {
                debug!("google: keyed request ({} bytes)", text.len());
                self.translate_keyed(key, text, target_lang).await
            }
            None => {
                debug!("google: free request ({} bytes)", text.len());
                self.translate_free(text, target_lang).await
            }
        }
    }
}

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::providers::TranslateProvider;

const DEFAULT_ENDPOINT: &str = "https://libretranslate.com/translate";

/// LibreTranslate adapter.
///
/// Works against the public instance or a self-hosted one when an endpoint
/// override is configured. A key is optional; public instances reject
/// keyless requests over their rate limit, self-hosted ones usually accept
/// them.
#[derive(Debug)]
pub struct LibreTranslate {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl LibreTranslate {
    /// Create a new LibreTranslate adapter
    pub fn new(endpoint: Option<String>, api_key: Option<String>, timeout_ms: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_millis(timeout_ms))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            api_key,
        }
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TranslateProvider for LibreTranslate {
    fn name(&self) -> &str {
        "libre"
    }

    async fn translate_chunk(
        &self,
        text: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError> {
        let mut form = vec![
            ("q", text),
            ("source", "auto"),
            ("target", target_lang),
            ("format", "html"),
        ];
        if let Some(key) = &self.api_key {
            form.push(("api_key", key.as_str()));
        }

        let response = self
            .client
            .post(self.endpoint())
            .form(&form)
            .send()
            .await
            .map_err(|e| ProviderError::request_failed("libre", 0, &e.to_string()))?;

        let status = response.status();
        if self.api_key.is_some() && matches!(status.as_u16(), 401 | 403) {
            return Err(ProviderError::authentication(
                "libre",
                format!("API key rejected ({})", status.as_u16()),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::request_failed("libre", status.as_u16(), &body));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::response_invalid("libre", e.to_string()))?;

        payload
            .get("translatedText")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| ProviderError::response_invalid("libre", "missing translatedText"))
    }
}

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::providers::TranslateProvider;

const FREE_TIER_ENDPOINT: &str = "https://api-free.deepl.com/v2/translate";
const PRO_ENDPOINT: &str = "https://api.deepl.com/v2/translate";

/// DeepL adapter. Always keyed; free-tier keys carry a `:fx` suffix and
/// route to the free-tier host.
#[derive(Debug)]
pub struct DeepLTranslate {
    client: Client,
    api_key: String,
}

impl DeepLTranslate {
    /// Create a new DeepL adapter
    pub fn new(api_key: String, timeout_ms: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_millis(timeout_ms))
                .build()
                .unwrap_or_default(),
            api_key,
        }
    }

    fn endpoint(&self) -> &'static str {
        if self.api_key.ends_with(":fx") {
            FREE_TIER_ENDPOINT
        } else {
            PRO_ENDPOINT
        }
    }
}

#[async_trait]
impl TranslateProvider for DeepLTranslate {
    fn name(&self) -> &str {
        "deepl"
    }

    async fn translate_chunk(
        &self,
        text: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError> {
        // DeepL expects upper-case target codes ("FR", "PT-BR").
        let target = target_lang.to_uppercase();
        let form = [
            ("text", text),
            ("target_lang", target.as_str()),
            ("tag_handling", "html"),
        ];

        let response = self
            .client
            .post(self.endpoint())
            .header(
                "Authorization",
                format!("DeepL-Auth-Key {}", self.api_key),
            )
            .form(&form)
            .send()
            .await
            .map_err(|e| ProviderError::request_failed("deepl", 0, &e.to_string()))?;

        let status = response.status();
        if matches!(status.as_u16(), 401 | 403) {
            return Err(ProviderError::authentication(
                "deepl",
                format!("API key rejected ({})", status.as_u16()),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::request_failed("deepl", status.as_u16(), &body));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::response_invalid("deepl", e.to_string()))?;

        payload
            .pointer("/translations/0/text")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| ProviderError::response_invalid("deepl", "missing translation text"))
    }
}

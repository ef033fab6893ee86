use log::debug;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::providers::TranslateProvider;
use crate::providers::prompting::{PROMPT_VARIANTS, build_prompt, extract_translation};

const MODEL: &str = "gemini-1.5-flash";

fn endpoint() -> String {
    format!(
        "https://generativelanguage.googleapis.com/v1/models/{}:generateContent",
        MODEL
    )
}

/// Gemini generateContent adapter. Keyed and strict: a malformed model
/// response rejects the chunk rather than falling back.
#[derive(Debug)]
pub struct GeminiTranslate {
    client: Client,
    api_key: String,
}

impl GeminiTranslate {
    /// Create a new Gemini adapter
    pub fn new(api_key: String, timeout_ms: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_millis(timeout_ms))
                .build()
                .unwrap_or_default(),
            api_key,
        }
    }
}

#[async_trait]
impl TranslateProvider for GeminiTranslate {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn translate_chunk(
        &self,
        text: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError> {
        let prompt = build_prompt(&PROMPT_VARIANTS[0], text, target_lang);
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": 0.1 },
        });
        debug!("gemini: sending chunk ({} bytes)", text.len());

        let response = self
            .client
            .post(endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::request_failed("gemini", 0, &e.to_string()))?;

        let status = response.status();
        if matches!(status.as_u16(), 401 | 403) {
            return Err(ProviderError::authentication(
                "gemini",
                format!("API key rejected ({})", status.as_u16()),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::request_failed("gemini", status.as_u16(), &body));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::response_invalid("gemini", e.to_string()))?;

        let content = payload
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProviderError::response_invalid("gemini", "missing candidate text"))?;

        extract_translation(text, content)
            .map_err(|defect| ProviderError::response_invalid("gemini", defect.to_string()))
    }
}

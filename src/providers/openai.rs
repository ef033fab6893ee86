use log::debug;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::providers::TranslateProvider;
use crate::providers::prompting::{PROMPT_VARIANTS, build_prompt, extract_translation};

const ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4o-mini";

/// OpenAI chat-completions adapter. Keyed and strict: a malformed model
/// response rejects the chunk rather than falling back.
#[derive(Debug)]
pub struct OpenAiTranslate {
    client: Client,
    api_key: String,
}

impl OpenAiTranslate {
    /// Create a new OpenAI adapter
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
impl TranslateProvider for OpenAiTranslate {
    fn name(&self) -> &str {
        "openai"
    }

    async fn translate_chunk(
        &self,
        text: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError> {
        let prompt = build_prompt(&PROMPT_VARIANTS[0], text, target_lang);
        let body = json!({
            "model": MODEL,
            "temperature": 0.1,
            "messages": [{ "role": "user", "content": prompt }],
        });
        debug!("openai: sending chunk ({} bytes)", text.len());

        let response = self
            .client
            .post(ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::request_failed("openai", 0, &e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(ProviderError::authentication("openai", "API key rejected (401)"));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::request_failed("openai", status.as_u16(), &body));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::response_invalid("openai", e.to_string()))?;

        let content = payload
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProviderError::response_invalid("openai", "missing message content"))?;

        extract_translation(text, content)
            .map_err(|defect| ProviderError::response_invalid("openai", defect.to_string()))
    }
}

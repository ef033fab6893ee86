use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::providers::TranslateProvider;
use crate::providers::prompting::{PROMPT_VARIANTS, build_prompt, extract_translation};

const BASE: &str = "https://text.pollinations.ai/";

/// Pollinations adapter: a free, keyless LLM endpoint.
///
/// The free tier is best-effort. A malformed response earns one retry with
/// the stricter prompt variant; if that also fails the adapter returns the
/// chunk untranslated rather than failing the run, since sentinel integrity
/// is still checked downstream.
#[derive(Debug)]
pub struct PollinationsTranslate {
    client: Client,
}

impl PollinationsTranslate {
    /// Create a new Pollinations adapter
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_millis(timeout_ms))
                .build()
                .unwrap_or_default(),
        }
    }

    async fn request(&self, prompt: &str) -> Result<String, ProviderError> {
        let mut endpoint = Url::parse(BASE)
            .map_err(|e| ProviderError::response_invalid("pollinations", e.to_string()))?;
        // The prompt travels in the path; Url percent-encodes the segment.
        endpoint
            .path_segments_mut()
            .map_err(|_| ProviderError::response_invalid("pollinations", "invalid base URL"))?
            .push(prompt);

        let response = self
            .client
            .get(endpoint)
            .send()
            .await
            .map_err(|e| ProviderError::request_failed("pollinations", 0, &e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::request_failed(
                "pollinations",
                status.as_u16(),
                &body,
            ));
        }

        let raw = response
            .text()
            .await
            .map_err(|e| ProviderError::response_invalid("pollinations", e.to_string()))?;
        Ok(Self::unwrap_body(&raw))
    }

    /// The endpoint sometimes wraps its answer in JSON and sometimes returns
    /// plain text; accept both.
    fn unwrap_body(raw: &str) -> String {
        if let Ok(payload) = serde_json::from_str::<Value>(raw) {
            for key in ["text", "result", "content", "response"] {
                if let Some(inner) = payload.get(key).and_then(|v| v.as_str()) {
                    return inner.to_string();
                }
            }
            if let Some(inner) = payload.as_str() {
                return inner.to_string();
            }
        }
        raw.to_string()
    }
}

#[async_trait]
impl TranslateProvider for PollinationsTranslate {
    fn name(&self) -> &str {
        "pollinations"
    }

    async fn translate_chunk(
        &self,
        text: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError> {
        for (attempt, variant) in PROMPT_VARIANTS.iter().enumerate() {
            let prompt = build_prompt(variant, text, target_lang);
            debug!("pollinations: attempt {} ({} bytes)", attempt + 1, text.len());
            let body = self.request(&prompt).await?;
            match extract_translation(text, &body) {
                Ok(translation) => return Ok(translation),
                Err(defect) => {
                    warn!("pollinations: attempt {} rejected: {}", attempt + 1, defect);
                }
            }
        }
        // Best-effort tier: pass the chunk through unchanged instead of
        // failing the whole run.
        warn!("pollinations: all prompt variants rejected, passing chunk through");
        Ok(text.to_string())
    }
}

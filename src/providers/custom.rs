use log::debug;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;

use async_trait::async_trait;

use crate::app_config::CustomApiConfig;
use crate::errors::ProviderError;
use crate::providers::TranslateProvider;

/// Adapter for a user-defined translation endpoint.
///
/// The request shape comes entirely from configuration: method, headers,
/// and an optional body template with `{text}` and `{target}` placeholders.
/// Placeholder values are JSON-escaped so templates can inline them inside
/// string literals.
#[derive(Debug)]
pub struct CustomTranslate {
    client: Client,
    api: CustomApiConfig,
}

impl CustomTranslate {
    /// Create a new custom-endpoint adapter
    pub fn new(api: CustomApiConfig, timeout_ms: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_millis(timeout_ms))
                .build()
                .unwrap_or_default(),
            api,
        }
    }

    fn render_body(&self, text: &str, target_lang: &str) -> String {
        match &self.api.body_template {
            Some(template) => template
                .replace("{text}", &json_escape(text))
                .replace("{target}", &json_escape(target_lang)),
            None => json!({ "text": text, "target": target_lang }).to_string(),
        }
    }

    /// Accept the common response shapes without demanding a schema.
    fn unwrap_body(raw: &str) -> String {
        if let Ok(payload) = serde_json::from_str::<Value>(raw) {
            for pointer in [
                "/translation",
                "/translated_text",
                "/text",
                "/result",
                "/data/translation",
                "/translations/0/text",
            ] {
                if let Some(inner) = payload.pointer(pointer).and_then(|v| v.as_str()) {
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

/// Escape a value for insertion inside a JSON string literal
fn json_escape(value: &str) -> String {
    let quoted = serde_json::to_string(value).unwrap_or_default();
    quoted[1..quoted.len() - 1].to_string()
}

#[async_trait]
impl TranslateProvider for CustomTranslate {
    fn name(&self) -> &str {
        "custom"
    }

    async fn translate_chunk(
        &self,
        text: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError> {
        let method = self.api.method.to_uppercase();
        debug!("custom: {} {} ({} bytes)", method, self.api.endpoint, text.len());

        let mut request = if method == "GET" {
            self.client
                .get(&self.api.endpoint)
                .query(&[("text", text), ("target", target_lang)])
        } else {
            self.client
                .post(&self.api.endpoint)
                .header("Content-Type", "application/json")
                .body(self.render_body(text, target_lang))
        };
        for (name, value) in &self.api.headers {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::request_failed("custom", 0, &e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::request_failed("custom", status.as_u16(), &body));
        }

        let raw = response
            .text()
            .await
            .map_err(|e| ProviderError::response_invalid("custom", e.to_string()))?;
        let translation = Self::unwrap_body(&raw);
        if translation.trim().is_empty() {
            return Err(ProviderError::response_invalid("custom", "empty translation"));
        }
        Ok(translation)
    }
}

use log::debug;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::providers::TranslateProvider;
use crate::providers::auth::BearerCache;

const FREE_ENDPOINT: &str = "https://api-edge.cognitive.microsofttranslator.com/translate";
const KEYED_ENDPOINT: &str = "https://api.cognitive.microsofttranslator.com/translate";
const EDGE_AUTH_ENDPOINT: &str = "https://edge.microsoft.com/translate/auth";

// Edge-issued JWTs expire after ten minutes; refresh a little early.
const EDGE_TOKEN_TTL: Duration = Duration::from_secs(8 * 60);

/// Microsoft Translator adapter.
///
/// With a subscription key, calls the Cognitive Services endpoint directly.
/// Without one, fetches a short-lived JWT from the Edge auth endpoint and
/// uses the unauthenticated edge mirror; a rejected token is refreshed and
/// the request retried once.
#[derive(Debug)]
pub struct MicrosoftTranslate {
    client: Client,
    api_key: Option<String>,
    bearer: BearerCache,
}

impl MicrosoftTranslate {
    /// Create a new Microsoft adapter
    pub fn new(api_key: Option<String>, timeout_ms: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_millis(timeout_ms))
                .build()
                .unwrap_or_default(),
            api_key,
            bearer: BearerCache::new(EDGE_TOKEN_TTL),
        }
    }

    async fn edge_token(&self) -> Result<String, ProviderError> {
        if let Some(token) = self.bearer.fresh() {
            return Ok(token);
        }
        debug!("microsoft: fetching edge auth token");
        let response = self
            .client
            .get(EDGE_AUTH_ENDPOINT)
            .send()
            .await
            .map_err(|e| ProviderError::authentication("microsoft", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::authentication(
                "microsoft",
                format!("edge auth endpoint returned {}", status.as_u16()),
            ));
        }

        let token = response
            .text()
            .await
            .map_err(|e| ProviderError::authentication("microsoft", e.to_string()))?
            .trim()
            .to_string();
        if token.is_empty() {
            return Err(ProviderError::authentication(
                "microsoft",
                "edge auth endpoint returned an empty token",
            ));
        }
        self.bearer.store(token.clone());
        Ok(token)
    }

    async fn request(
        &self,
        endpoint: &str,
        auth: Auth<'_>,
        text: &str,
        target_lang: &str,
    ) -> Result<reqwest::Response, ProviderError> {
        let body = json!([{ "Text": text }]);
        let mut request = self
            .client
            .post(endpoint)
            .query(&[("api-version", "3.0"), ("to", target_lang)])
            .json(&body);
        request = match auth {
            Auth::Bearer(token) => request.bearer_auth(token),
            Auth::SubscriptionKey(key) => request.header("Ocp-Apim-Subscription-Key", key),
        };
        request
            .send()
            .await
            .map_err(|e| ProviderError::request_failed("microsoft", 0, &e.to_string()))
    }

    fn parse(payload: Value) -> Result<String, ProviderError> {
        payload
            .pointer("/0/translations/0/text")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| ProviderError::response_invalid("microsoft", "missing translation text"))
    }

    async fn translate_free(&self, text: &str, target_lang: &str) -> Result<String, ProviderError> {
        let token = self.edge_token().await?;
        let mut response = self
            .request(FREE_ENDPOINT, Auth::Bearer(&token), text, target_lang)
            .await?;

        // An expired or revoked JWT earns one refresh-and-retry.
        if matches!(response.status().as_u16(), 401 | 403) {
            debug!("microsoft: token rejected, refreshing once");
            self.bearer.invalidate();
            let token = self.edge_token().await?;
            response = self
                .request(FREE_ENDPOINT, Auth::Bearer(&token), text, target_lang)
                .await?;
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::request_failed("microsoft", status.as_u16(), &body));
        }
        let payload: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::response_invalid("microsoft", e.to_string()))?;
        Self::parse(payload)
    }

    async fn translate_keyed(
        &self,
        key: &str,
        text: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError> {
        let response = self
            .request(KEYED_ENDPOINT, Auth::SubscriptionKey(key), text, target_lang)
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::request_failed("microsoft", status.as_u16(), &body));
        }
        let payload: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::response_invalid("microsoft", e.to_string()))?;
        Self::parse(payload)
    }
}

enum Auth<'a> {
    Bearer(&'a str),
    SubscriptionKey(&'a str),
}

#[async_trait]
impl TranslateProvider for MicrosoftTranslate {
    fn name(&self) -> &str {
        "microsoft"
    }

    async fn translate_chunk(
        &self,
        text: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError> {
        match &self.api_key {
            Some(key) => self.translate_keyed(key, text, target_lang).await,
            None => self.translate_free(text, target_lang).await,
        }
    }
}

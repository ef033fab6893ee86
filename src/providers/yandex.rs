use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::providers::TranslateProvider;
use crate::providers::auth::BearerCache;

const ENDPOINT: &str = "https://translate.yandex.net/api/v1/tr.json/translate";
const WIDGET_ENDPOINT: &str = "https://translate.yandex.net/website-widget/v1/widget.js?widgetId=ytWidget&pageLang=en&widgetTheme=light&autoMode=false";

// The widget script embeds a session id that stays valid for a while;
// re-scrape well before it goes stale.
const SID_TTL: Duration = Duration::from_secs(20 * 60);

static SID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"sid\s*:\s*'([0-9a-f.]+)'").unwrap());

/// Yandex Translate adapter (unauthenticated widget endpoint).
///
/// Requests carry a session id scraped from the public website-widget
/// script. A rejected session id is re-scraped and the request retried
/// once, like the Microsoft edge token.
#[derive(Debug)]
pub struct YandexTranslate {
    client: Client,
    sid: BearerCache,
}

/// Collapse regional language codes the widget endpoint does not accept
fn map_language(lang: &str) -> &str {
    match lang {
        "zh-CN" | "zh-TW" => "zh",
        "fr-CA" => "fr",
        "pt" => "pt-BR",
        "pt-PT" => "pt",
        _ => lang,
    }
}

/// Pull the session id out of the widget script body
fn extract_sid(body: &str) -> Option<String> {
    SID_PATTERN
        .captures(body)
        .map(|caps| caps[1].to_string())
}

impl YandexTranslate {
    /// Create a new Yandex adapter
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_millis(timeout_ms))
                .build()
                .unwrap_or_default(),
            sid: BearerCache::new(SID_TTL),
        }
    }

    async fn session_id(&self) -> Result<String, ProviderError> {
        if let Some(sid) = self.sid.fresh() {
            return Ok(sid);
        }
        debug!("yandex: scraping widget session id");
        let response = self
            .client
            .get(WIDGET_ENDPOINT)
            .send()
            .await
            .map_err(|e| ProviderError::authentication("yandex", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::authentication(
                "yandex",
                format!("widget endpoint returned {}", status.as_u16()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::authentication("yandex", e.to_string()))?;
        let sid = extract_sid(&body).ok_or_else(|| {
            ProviderError::authentication("yandex", "no session id in widget script")
        })?;
        self.sid.store(sid.clone());
        Ok(sid)
    }

    async fn request(
        &self,
        sid: &str,
        text: &str,
        target_lang: &str,
    ) -> Result<reqwest::Response, ProviderError> {
        let lang = map_language(target_lang);
        self.client
            .get(ENDPOINT)
            .query(&[
                ("srv", "tr-url-widget"),
                ("id", &format!("{}-0-0", sid)),
                ("format", "html"),
                ("lang", lang),
                ("text", text),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::request_failed("yandex", 0, &e.to_string()))
    }

    fn parse(payload: Value) -> Result<String, ProviderError> {
        let segments = payload
            .get("text")
            .and_then(|v| v.as_array())
            .ok_or_else(|| ProviderError::response_invalid("yandex", "missing text array"))?;
        let mut out = String::new();
        for segment in segments {
            if let Some(s) = segment.as_str() {
                out.push_str(s);
            }
        }
        if out.is_empty() {
            return Err(ProviderError::response_invalid("yandex", "empty text array"));
        }
        Ok(out)
    }
}

#[async_trait]
impl TranslateProvider for YandexTranslate {
    fn name(&self) -> &str {
        "yandex"
    }

    async fn translate_chunk(
        &self,
        text: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError> {
        let sid = self.session_id().await?;
        let mut response = self.request(&sid, text, target_lang).await?;

        // A rejected session id earns one re-scrape-and-retry.
        if matches!(response.status().as_u16(), 401 | 403) {
            debug!("yandex: session id rejected, re-scraping once");
            self.sid.invalidate();
            let sid = self.session_id().await?;
            response = self.request(&sid, text, target_lang).await?;
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::request_failed("yandex", status.as_u16(), &body));
        }
        let payload: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::response_invalid("yandex", e.to_string()))?;
        Self::parse(payload)
    }
}

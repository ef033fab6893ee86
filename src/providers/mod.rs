/*!
 * Provider adapters for the supported translation backends.
 *
 * Each adapter implements one backend's wire protocol behind a uniform
 * chunk-translation contract:
 * - Google / Microsoft: free web endpoints, or keyed REST when a key is set
 * - DeepL: keyed REST (form-encoded)
 * - LibreTranslate: REST with an optional key and endpoint override
 * - Yandex: free widget endpoint behind a scraped session id
 * - OpenAI / Gemini: keyed prompt-engineered LLM adapters
 * - Pollinations: free prompt-engineered LLM adapter
 * - Custom: user-defined endpoint
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::app_config::{Config, ServiceKind};
use crate::errors::{ProviderError, TranslationError};

/// Common trait for all translation backends
///
/// One call translates one chunk with one HTTP request per attempt; the
/// dispatcher owns chunking, concurrency, and retries beyond the narrow
/// refresh/soft-retry behavior documented per adapter.
#[async_trait]
pub trait TranslateProvider: Send + Sync + Debug {
    /// Provider identifier used in errors and progress events
    fn name(&self) -> &str;

    /// Translate a single chunk of anchored text
    async fn translate_chunk(
        &self,
        text: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError>;
}

pub mod auth;
pub mod custom;
pub mod deepl;
pub mod gemini;
pub mod google;
pub mod libre;
pub mod microsoft;
pub mod mock;
pub mod openai;
pub mod pollinations;
pub mod prompting;
pub mod yandex;

/// Build the adapter for the configured service.
///
/// Keyed-only services fail here, before any network traffic, when no key
/// is configured. Dual free/keyed services transparently choose their free
/// endpoint instead.
pub fn build_provider(config: &Config) -> Result<Box<dyn TranslateProvider>, TranslationError> {
    let key = config.api_key().map(|s| s.to_string());
    let timeout_ms = config.timeout_ms;

    if config.service.requires_api_key() && key.is_none() {
        return Err(TranslationError::Configuration(format!(
            "{} requires an API key",
            config.service.display_name()
        )));
    }

    let provider: Box<dyn TranslateProvider> = match config.service {
        ServiceKind::Google => Box::new(google::GoogleTranslate::new(key, timeout_ms)),
        ServiceKind::Microsoft => Box::new(microsoft::MicrosoftTranslate::new(key, timeout_ms)),
        ServiceKind::DeepL => {
            Box::new(deepl::DeepLTranslate::new(key.unwrap_or_default(), timeout_ms))
        }
        ServiceKind::Libre => Box::new(libre::LibreTranslate::new(
            config.libre_endpoint.clone(),
            key,
            timeout_ms,
        )),
        ServiceKind::Yandex => Box::new(yandex::YandexTranslate::new(timeout_ms)),
        ServiceKind::OpenAI => {
            Box::new(openai::OpenAiTranslate::new(key.unwrap_or_default(), timeout_ms))
        }
        ServiceKind::Gemini => {
            Box::new(gemini::GeminiTranslate::new(key.unwrap_or_default(), timeout_ms))
        }
        ServiceKind::Pollinations => Box::new(pollinations::PollinationsTranslate::new(timeout_ms)),
        ServiceKind::Custom => {
            let api = config.custom_api.clone().ok_or_else(|| {
                TranslationError::Configuration(
                    "Custom service selected but no custom API configured".to_string(),
                )
            })?;
            Box::new(custom::CustomTranslate::new(api, timeout_ms))
        }
    };
    Ok(provider)
}

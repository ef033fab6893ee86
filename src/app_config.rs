use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Application configuration module
/// This module handles the configuration handed to the pipeline by the
/// (external) options UI: the selected service, target languages, API keys,
/// custom-API description, and dispatch overrides.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Selected translation service
    pub service: ServiceKind,

    /// Target language codes (the UI exposes up to five slots)
    #[serde(default)]
    pub target_languages: Vec<String>,

    /// API keys per service identifier
    #[serde(default)]
    pub api_keys: HashMap<String, String>,

    /// Custom API description, used when `service` is `Custom`
    #[serde(default)]
    pub custom_api: Option<CustomApiConfig>,

    /// Self-hosted LibreTranslate endpoint, used when `service` is `Libre`
    #[serde(default)]
    pub libre_endpoint: Option<String>,

    /// Whether formula anchors should be restored with translated variants
    #[serde(default)]
    pub translate_formulas: bool,

    /// Override for the provider's default concurrency
    #[serde(default)]
    pub max_concurrency: Option<usize>,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    30_000
}

/// Maximum number of target language slots the options UI exposes
pub const MAX_TARGET_LANGUAGES: usize = 5;

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceKind::default(),
            target_languages: vec!["en".to_string()],
            api_keys: HashMap::new(),
            custom_api: None,
            libre_endpoint: None,
            translate_formulas: false,
            max_concurrency: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Config {
    /// Validate the configuration before a translation run
    pub fn validate(&self) -> Result<()> {
        if self.target_languages.is_empty() {
            return Err(anyhow!("At least one target language must be configured"));
        }
        if self.target_languages.len() > MAX_TARGET_LANGUAGES {
            return Err(anyhow!(
                "At most {} target languages are supported, got {}",
                MAX_TARGET_LANGUAGES,
                self.target_languages.len()
            ));
        }
        if self.service == ServiceKind::Custom && self.custom_api.is_none() {
            return Err(anyhow!("Custom service selected but no custom API configured"));
        }
        if self.timeout_ms == 0 {
            return Err(anyhow!("timeout_ms must be greater than zero"));
        }
        Ok(())
    }

    /// Look up the API key configured for the selected service, if any
    pub fn api_key(&self) -> Option<&str> {
        self.api_keys
            .get(&self.service.to_lowercase_string())
            .map(|s| s.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    /// First configured target language
    pub fn primary_target_language(&self) -> &str {
        self.target_languages
            .first()
            .map(|s| s.as_str())
            .unwrap_or("en")
    }
}

/// Translation service type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    // @provider: Google Translate (free endpoint, or Cloud Translation with a key)
    #[default]
    Google,
    // @provider: Microsoft Translator (edge endpoint, or Azure with a key)
    Microsoft,
    // @provider: DeepL (keyed only)
    DeepL,
    // @provider: LibreTranslate (public instance, or self-hosted with an endpoint override)
    Libre,
    // @provider: Yandex widget endpoint (free, session id scraped per run)
    Yandex,
    // @provider: OpenAI chat completions (keyed LLM)
    OpenAI,
    // @provider: Google Gemini (keyed LLM)
    Gemini,
    // @provider: Pollinations (free LLM)
    Pollinations,
    // @provider: User-defined endpoint
    Custom,
}

impl ServiceKind {
    // @returns: Capitalized service name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Google => "Google",
            Self::Microsoft => "Microsoft",
            Self::DeepL => "DeepL",
            Self::Libre => "LibreTranslate",
            Self::Yandex => "Yandex",
            Self::OpenAI => "OpenAI",
            Self::Gemini => "Gemini",
            Self::Pollinations => "Pollinations",
            Self::Custom => "Custom",
        }
    }

    // @returns: Lowercase service identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Google => "google".to_string(),
            Self::Microsoft => "microsoft".to_string(),
            Self::DeepL => "deepl".to_string(),
            Self::Libre => "libre".to_string(),
            Self::Yandex => "yandex".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Gemini => "gemini".to_string(),
            Self::Pollinations => "pollinations".to_string(),
            Self::Custom => "custom".to_string(),
        }
    }

    /// Whether this service is backed by a large-language-model and needs
    /// the hallucination repair pass after dispatch
    pub fn is_llm(&self) -> bool {
        matches!(self, Self::OpenAI | Self::Gemini | Self::Pollinations)
    }

    /// Whether this service only works with an API key configured
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::DeepL | Self::OpenAI | Self::Gemini)
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for ServiceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "microsoft" | "bing" => Ok(Self::Microsoft),
            "deepl" => Ok(Self::DeepL),
            "libre" | "libretranslate" => Ok(Self::Libre),
            "yandex" => Ok(Self::Yandex),
            "openai" | "chatgpt" => Ok(Self::OpenAI),
            "gemini" => Ok(Self::Gemini),
            "pollinations" => Ok(Self::Pollinations),
            "custom" => Ok(Self::Custom),
            _ => Err(anyhow!("Invalid service type: {}", s)),
        }
    }
}

/// User-defined translation endpoint description
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CustomApiConfig {
    /// Endpoint URL
    pub endpoint: String,

    /// HTTP method ("GET" or "POST")
    #[serde(default = "default_custom_method")]
    pub method: String,

    /// Extra request headers
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Optional JSON body template; `{text}` and `{target}` are substituted
    #[serde(default)]
    pub body_template: Option<String>,
}

fn default_custom_method() -> String {
    "POST".to_string()
}

/*!
 * Unit tests for configuration parsing and validation.
 */

use anchorlate::app_config::{Config, CustomApiConfig, ServiceKind};

#[test]
fn test_config_should_deserialize_from_json_with_defaults() {
    let json = r#"{
        "service": "deepl",
        "target_languages": ["fr", "de"],
        "api_keys": { "deepl": "abc:fx" }
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.service, ServiceKind::DeepL);
    assert_eq!(config.primary_target_language(), "fr");
    assert_eq!(config.api_key(), Some("abc:fx"));
    assert!(!config.translate_formulas);
    assert_eq!(config.timeout_ms, 30_000);
    assert!(config.max_concurrency.is_none());
}

#[test]
fn test_config_should_round_trip_through_serde() {
    let mut config = Config {
        service: ServiceKind::Custom,
        target_languages: vec!["ja".to_string()],
        translate_formulas: true,
        max_concurrency: Some(2),
        ..Config::default()
    };
    config.custom_api = Some(CustomApiConfig {
        endpoint: "https://example.net/t".to_string(),
        method: "GET".to_string(),
        headers: Default::default(),
        body_template: None,
    });

    let json = serde_json::to_string(&config).unwrap();
    let back: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(back.service, ServiceKind::Custom);
    assert!(back.translate_formulas);
    assert_eq!(back.max_concurrency, Some(2));
    assert_eq!(back.custom_api.unwrap().method, "GET");
}

#[test]
fn test_api_key_should_be_scoped_to_selected_service() {
    let mut config = Config {
        service: ServiceKind::Gemini,
        ..Config::default()
    };
    config
        .api_keys
        .insert("openai".to_string(), "sk-other".to_string());

    // A key for a different service must not leak into this one.
    assert!(config.api_key().is_none());
}

#[test]
fn test_custom_api_method_should_default_to_post() {
    let json = r#"{ "endpoint": "https://example.net/t" }"#;
    let api: CustomApiConfig = serde_json::from_str(json).unwrap();
    assert_eq!(api.method, "POST");
}

#[test]
fn test_service_kind_display_should_match_serde_casing() {
    for service in [
        ServiceKind::Google,
        ServiceKind::Microsoft,
        ServiceKind::DeepL,
        ServiceKind::Libre,
        ServiceKind::Yandex,
        ServiceKind::OpenAI,
        ServiceKind::Gemini,
        ServiceKind::Pollinations,
        ServiceKind::Custom,
    ] {
        let as_json = serde_json::to_string(&service).unwrap();
        assert_eq!(as_json, format!("\"{}\"", service));
    }
}

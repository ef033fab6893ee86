/*!
 * Unit tests for per-service dispatch profiles.
 */

use anchorlate::app_config::ServiceKind;
use anchorlate::translation::ServiceProfile;

const ALL_SERVICES: &[ServiceKind] = &[
    ServiceKind::Google,
    ServiceKind::Microsoft,
    ServiceKind::DeepL,
    ServiceKind::Libre,
    ServiceKind::Yandex,
    ServiceKind::OpenAI,
    ServiceKind::Gemini,
    ServiceKind::Pollinations,
    ServiceKind::Custom,
];

#[test]
fn test_every_service_should_resolve_to_a_usable_profile() {
    for &service in ALL_SERVICES {
        for has_key in [false, true] {
            let profile = ServiceProfile::resolve(service, has_key);
            assert!(profile.max_chars >= 1000, "{:?} max_chars", service);
            assert!(profile.max_chunks >= 40, "{:?} max_chunks", service);
            assert!(profile.concurrency >= 1, "{:?} concurrency", service);
        }
    }
}

#[test]
fn test_keyed_profiles_should_never_be_smaller_than_free() {
    for &service in &[ServiceKind::Google, ServiceKind::Microsoft, ServiceKind::Libre] {
        let free = ServiceProfile::resolve(service, false);
        let keyed = ServiceProfile::resolve(service, true);
        assert!(keyed.max_chars >= free.max_chars);
        assert!(keyed.max_chunks >= free.max_chunks);
        assert!(keyed.concurrency >= free.concurrency);
    }
}

#[test]
fn test_serial_pinning_should_survive_any_override() {
    let profile = ServiceProfile::resolve(ServiceKind::Pollinations, false);
    for user_override in [None, Some(1), Some(4), Some(64)] {
        assert_eq!(profile.effective_concurrency(user_override), 1);
    }
}

#[test]
fn test_parallel_services_should_honor_override() {
    let profile = ServiceProfile::resolve(ServiceKind::OpenAI, true);
    assert_eq!(profile.effective_concurrency(Some(5)), 5);
    assert_eq!(profile.effective_concurrency(None), profile.concurrency);
}

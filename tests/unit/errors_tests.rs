/*!
 * Unit tests for the error taxonomy.
 */

use anchorlate::errors::{ERROR_BODY_LIMIT, ProviderError, TranslationError, truncate_error_body};

#[test]
fn test_request_failed_should_truncate_oversized_bodies() {
    let body = "details ".repeat(200);
    let err = ProviderError::request_failed("deepl", 456, &body);
    match err {
        ProviderError::RequestFailed { body, .. } => {
            assert!(body.len() <= ERROR_BODY_LIMIT + '…'.len_utf8());
        }
        other => panic!("unexpected variant: {:?}", other),
    }
}

#[test]
fn test_provider_error_should_convert_into_translation_error() {
    let err: TranslationError = ProviderError::response_invalid("gemini", "missing text").into();
    assert!(matches!(err, TranslationError::Provider(_)));
    assert!(err.to_string().contains("gemini"));
}

#[test]
fn test_chunk_limit_display_should_name_both_numbers() {
    let err = TranslationError::ChunkLimitExceeded {
        required: 55,
        limit: 40,
    };
    let msg = err.to_string();
    assert!(msg.contains("55"));
    assert!(msg.contains("40"));
}

#[test]
fn test_truncate_error_body_should_respect_char_boundaries() {
    let body = format!("{}é{}", "a".repeat(ERROR_BODY_LIMIT - 1), "tail");
    let truncated = truncate_error_body(&body);
    assert!(truncated.ends_with('…'));
    // Must not have split the two-byte character.
    assert!(truncated.is_char_boundary(truncated.len() - '…'.len_utf8()));
}

/*!
 * End-to-end pipeline tests covering the canonical failure and success
 * scenarios with mock providers.
 */

use anchorlate::app_config::ServiceKind;
use anchorlate::errors::TranslationError;
use anchorlate::providers::mock::MockProvider;
use anchorlate::translation::{PipelineState, TranslationPipeline};

use crate::common::{config_for, init_logging, long_paragraphs, rich_document};

#[test]
fn test_full_run_should_translate_prose_and_restore_every_region() {
    init_logging();
    tokio_test::block_on(async {
        let provider = MockProvider::working();
        let mut pipeline =
            TranslationPipeline::with_provider(config_for(ServiceKind::Google), Box::new(provider));

        let input = rich_document();
        let out = pipeline.translate(&input).await.unwrap();

        assert_eq!(out.region_count, 7);
        assert!(out.text.contains("<math>"));
        assert!(out.text.contains("fn main()"));
        assert!(out.text.contains("<code>parse()</code>"));
        assert!(out.text.contains("[fr]"));
        assert_eq!(pipeline.state(), PipelineState::Done);
    });
}

#[tokio::test]
async fn test_large_selection_should_be_chunked_and_fully_covered() {
    let provider = MockProvider::working();
    let mut pipeline = TranslationPipeline::with_provider(
        config_for(ServiceKind::Google),
        Box::new(provider.clone()),
    );

    // Free Google profile: 4000-char chunks. 24k chars forces ≥6 chunks.
    let input = long_paragraphs(24_000);
    let out = pipeline.translate(&input).await.unwrap();

    assert!(out.chunk_count >= 4, "got {} chunks", out.chunk_count);
    assert_eq!(provider.requests(), out.chunk_count);
    // The output covers the whole document, not just the first chunk.
    assert!(out.text.len() >= input.len());
}

#[tokio::test]
async fn test_llm_duplicate_token_should_be_repaired_end_to_end() {
    let mut pipeline = TranslationPipeline::with_provider(
        config_for(ServiceKind::Pollinations),
        Box::new(MockProvider::duplicating_tokens()),
    );

    let input = "<p>Intro <code>f(x)</code> outro</p>";
    let out = pipeline.translate(input).await.unwrap();

    assert_eq!(out.text.matches("<code>f(x)</code>").count(), 1);
    assert_eq!(pipeline.state(), PipelineState::Done);
}

#[tokio::test]
async fn test_llm_lost_token_should_fail_integrity_not_restore() {
    let mut pipeline = TranslationPipeline::with_provider(
        config_for(ServiceKind::Pollinations),
        Box::new(MockProvider::dropping_tokens()),
    );

    let input = "<p>Intro <code>f(x)</code> outro</p>";
    let result = pipeline.translate(input).await;

    assert!(matches!(result, Err(TranslationError::Integrity { .. })));
    assert_eq!(pipeline.state(), PipelineState::IntegrityFailed);
}

#[tokio::test]
async fn test_oversized_selection_should_fail_before_any_network_call() {
    let provider = MockProvider::working();
    let mut pipeline = TranslationPipeline::with_provider(
        // Pollinations profile: 3000-char chunks, 40-chunk budget.
        config_for(ServiceKind::Pollinations),
        Box::new(provider.clone()),
    );

    let input = long_paragraphs(200_000);
    let result = pipeline.translate(&input).await;

    assert!(matches!(
        result,
        Err(TranslationError::ChunkLimitExceeded { limit: 40, .. })
    ));
    assert_eq!(provider.requests(), 0);
    assert_eq!(pipeline.state(), PipelineState::Error);
}

#[tokio::test]
async fn test_chunk_failure_should_surface_first_error_and_discard_rest() {
    let provider = MockProvider::failing_slowly_at(1, 50, 10);
    let mut pipeline = TranslationPipeline::with_provider(
        config_for(ServiceKind::Google),
        Box::new(provider.clone()),
    );

    let input = long_paragraphs(10_000);
    let result = pipeline.translate(&input).await;

    match result {
        Err(TranslationError::Provider(e)) => assert!(e.to_string().contains("request #1")),
        other => panic!("expected provider error, got {:?}", other.map(|o| o.chunk_count)),
    }
    assert_eq!(pipeline.state(), PipelineState::Error);
}

#[tokio::test]
async fn test_translate_formulas_should_substitute_translated_variant() {
    let provider = MockProvider::working();
    let mut config = config_for(ServiceKind::Google);
    config.translate_formulas = true;
    let mut pipeline = TranslationPipeline::with_provider(config, Box::new(provider));

    let input = "<p>see <math><mi>x</mi></math></p>";
    let out = pipeline.translate(input).await.unwrap();

    // The working mock annotates whatever it is given, formulas included.
    assert!(out.text.contains("[fr] <math><mi>x</mi></math>"));
}

#[test]
fn test_translate_to_should_override_primary_target_language() {
    tokio_test::block_on(async {
        let mut pipeline = TranslationPipeline::with_provider(
            config_for(ServiceKind::Google),
            Box::new(MockProvider::working()),
        );

        let out = pipeline.translate_to("plain words", "de").await.unwrap();
        assert_eq!(out.text, "[de] plain words");
    });
}

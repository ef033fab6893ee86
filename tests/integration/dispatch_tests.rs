/*!
 * Integration tests for bounded-concurrency dispatch with mock providers.
 */

use std::time::Duration;

use anchorlate::chunking::split;
use anchorlate::errors::TranslationError;
use anchorlate::providers::mock::MockProvider;
use anchorlate::translation::{DispatchOptions, ProgressPhase, ProgressSink, dispatch_chunks};

use crate::common::{init_logging, long_paragraphs};

fn options(concurrency: usize) -> DispatchOptions {
    DispatchOptions {
        concurrency,
        timeout: Duration::from_secs(5),
        target_lang: "fr".to_string(),
    }
}

#[tokio::test]
async fn test_dispatch_many_chunks_should_preserve_document_order() {
    init_logging();
    let text = long_paragraphs(12_000);
    let chunks = split(&text, 800);
    assert!(chunks.len() >= 10);

    let provider = MockProvider::working();
    let outputs = dispatch_chunks(&provider, &chunks, &options(4), &ProgressSink::disabled())
        .await
        .unwrap();

    assert_eq!(outputs.len(), chunks.len());
    for (output, chunk) in outputs.iter().zip(&chunks) {
        assert_eq!(output, &format!("[fr] {}", chunk.text));
    }
}

#[tokio::test]
async fn test_failing_chunk_should_reject_and_discard_finished_results() {
    // Request 1 fails slowly; request 2 finishes first but must be thrown
    // away when the call rejects with the first chunk's error.
    let provider = MockProvider::failing_slowly_at(1, 50, 10);
    let text = long_paragraphs(3000);
    let chunks = split(&text, 1200);
    assert!(chunks.len() >= 2);

    let result = dispatch_chunks(&provider, &chunks, &options(2), &ProgressSink::disabled()).await;
    match result {
        Err(TranslationError::Provider(e)) => {
            assert!(e.to_string().contains("request #1"));
        }
        other => panic!("expected provider error, got {:?}", other.map(|v| v.len())),
    }
}

#[tokio::test]
async fn test_no_chunk_should_start_after_first_error_with_serial_dispatch() {
    let provider = MockProvider::failing_at(2);
    let text = long_paragraphs(8000);
    let chunks = split(&text, 900);
    assert!(chunks.len() >= 5);

    let result = dispatch_chunks(&provider, &chunks, &options(1), &ProgressSink::disabled()).await;
    assert!(result.is_err());
    assert_eq!(provider.requests(), 2);
}

#[tokio::test]
async fn test_concurrency_bound_should_hold_under_load() {
    let provider = MockProvider::slow(5);
    let text = long_paragraphs(10_000);
    let chunks = split(&text, 700);

    dispatch_chunks(&provider, &chunks, &options(3), &ProgressSink::disabled())
        .await
        .unwrap();
    assert!(provider.peak_concurrency() <= 3);
    assert_eq!(provider.requests(), chunks.len());
}

#[tokio::test]
async fn test_progress_events_should_cover_the_full_lifecycle() {
    use std::sync::{Arc, Mutex};
    let phases: Arc<Mutex<Vec<ProgressPhase>>> = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&phases);
    let sink = ProgressSink::new(move |event| {
        seen.lock().unwrap().push(event.phase);
    });

    let provider = MockProvider::working();
    let text = long_paragraphs(2500);
    let chunks = split(&text, 1000);
    let total = chunks.len();
    dispatch_chunks(&provider, &chunks, &options(2), &sink)
        .await
        .unwrap();

    let phases = phases.lock().unwrap();
    assert_eq!(phases.first(), Some(&ProgressPhase::Start));
    assert_eq!(phases.last(), Some(&ProgressPhase::Done));
    let done = phases
        .iter()
        .filter(|p| **p == ProgressPhase::ChunkDone)
        .count();
    assert_eq!(done, total);
}

#[tokio::test]
async fn test_hanging_provider_should_fail_via_timeout_not_hang() {
    let provider = MockProvider::slow(5_000);
    let chunks = split("short text", 6000);
    let opts = DispatchOptions {
        concurrency: 1,
        timeout: Duration::from_millis(30),
        target_lang: "fr".to_string(),
    };

    let started = std::time::Instant::now();
    let result = dispatch_chunks(&provider, &chunks, &opts, &ProgressSink::disabled()).await;
    assert!(result.is_err());
    assert!(started.elapsed() < Duration::from_secs(2));
}

/*!
 * Bounded-concurrency chunk dispatch.
 *
 * A fixed pool of workers pulls chunk ordinals from a shared monotonic
 * cursor, so chunks start in order even though they may finish out of
 * order. Results are placed by ordinal and returned in document order.
 *
 * Failure is fail-fast: the first chunk error aborts the run, no further
 * chunks are scheduled, and results already collected are discarded. A
 * per-call timeout bounds how long one chunk may hang.
 */

use futures::future::try_join_all;
use log::{debug, error};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::timeout;

use crate::chunking::Chunk;
use crate::errors::{ProviderError, TranslationError};
use crate::providers::TranslateProvider;
use crate::translation::progress::{ProgressEvent, ProgressPhase, ProgressSink};

/// Per-run dispatch parameters
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Number of workers; 1 means strictly serial
    pub concurrency: usize,
    /// Upper bound on a single provider call
    pub timeout: Duration,
    /// Target language passed to every provider call
    pub target_lang: String,
}

/// Translate all chunks through `provider`, returning outputs in chunk order.
pub async fn dispatch_chunks(
    provider: &dyn TranslateProvider,
    chunks: &[Chunk],
    options: &DispatchOptions,
    progress: &ProgressSink,
) -> Result<Vec<String>, TranslationError> {
    if chunks.is_empty() {
        return Ok(Vec::new());
    }
    let workers = options.concurrency.max(1).min(chunks.len());
    debug!(
        "dispatching {} chunk(s) through {} with {} worker(s)",
        chunks.len(),
        provider.name(),
        workers
    );

    let cursor = Arc::new(AtomicUsize::new(0));
    let aborted = Arc::new(AtomicBool::new(false));
    let completed = Arc::new(AtomicUsize::new(0));
    let results: Arc<Mutex<Vec<Option<String>>>> =
        Arc::new(Mutex::new(vec![None; chunks.len()]));

    progress.emit(ProgressEvent {
        service: provider.name().to_string(),
        phase: ProgressPhase::Start,
        chunk_ordinal: None,
        total_chunks: chunks.len(),
        completed: 0,
    });

    let worker_futures = (0..workers).map(|_| {
        let cursor = Arc::clone(&cursor);
        let aborted = Arc::clone(&aborted);
        let completed = Arc::clone(&completed);
        let results = Arc::clone(&results);
        async move {
            loop {
                if aborted.load(Ordering::SeqCst) {
                    return Ok(());
                }
                let ordinal = cursor.fetch_add(1, Ordering::SeqCst);
                if ordinal >= chunks.len() {
                    return Ok(());
                }
                let chunk = &chunks[ordinal];

                progress.emit(ProgressEvent {
                    service: provider.name().to_string(),
                    phase: ProgressPhase::ChunkStart,
                    chunk_ordinal: Some(ordinal),
                    total_chunks: chunks.len(),
                    completed: completed.load(Ordering::SeqCst),
                });

                let outcome = timeout(
                    options.timeout,
                    provider.translate_chunk(&chunk.text, &options.target_lang),
                )
                .await;

                let translated = match outcome {
                    Ok(Ok(text)) => text,
                    Ok(Err(provider_error)) => {
                        aborted.store(true, Ordering::SeqCst);
                        error!(
                            "chunk {}/{} failed: {}",
                            ordinal + 1,
                            chunks.len(),
                            provider_error
                        );
                        progress.emit(ProgressEvent {
                            service: provider.name().to_string(),
                            phase: ProgressPhase::Error,
                            chunk_ordinal: Some(ordinal),
                            total_chunks: chunks.len(),
                            completed: completed.load(Ordering::SeqCst),
                        });
                        return Err(TranslationError::Provider(provider_error));
                    }
                    Err(_elapsed) => {
                        aborted.store(true, Ordering::SeqCst);
                        error!(
                            "chunk {}/{} timed out after {:?}",
                            ordinal + 1,
                            chunks.len(),
                            options.timeout
                        );
                        progress.emit(ProgressEvent {
                            service: provider.name().to_string(),
                            phase: ProgressPhase::Error,
                            chunk_ordinal: Some(ordinal),
                            total_chunks: chunks.len(),
                            completed: completed.load(Ordering::SeqCst),
                        });
                        return Err(TranslationError::Provider(ProviderError::request_failed(
                            provider.name(),
                            0,
                            &format!("request timed out after {:?}", options.timeout),
                        )));
                    }
                };

                results.lock()[ordinal] = Some(translated);
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                progress.emit(ProgressEvent {
                    service: provider.name().to_string(),
                    phase: ProgressPhase::ChunkDone,
                    chunk_ordinal: Some(ordinal),
                    total_chunks: chunks.len(),
                    completed: done,
                });
            }
        }
    });

    // try_join_all resolves to the first error and drops the remaining
    // worker futures, discarding their in-flight calls.
    try_join_all(worker_futures).await?;

    let collected: Vec<String> = results.lock().iter_mut().filter_map(Option::take).collect();
    if collected.len() != chunks.len() {
        return Err(TranslationError::Provider(ProviderError::response_invalid(
            provider.name(),
            format!(
                "dispatch completed {} of {} chunks",
                collected.len(),
                chunks.len()
            ),
        )));
    }

    progress.emit(ProgressEvent {
        service: provider.name().to_string(),
        phase: ProgressPhase::Done,
        chunk_ordinal: None,
        total_chunks: chunks.len(),
        completed: chunks.len(),
    });
    Ok(collected)
}

/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds, annotating each chunk
 * - `MockProvider::failing_at(n)` - Fails the nth request it receives
 * - `MockProvider::duplicating_tokens()` - Echoes each sentinel token twice
 * - `MockProvider::dropping_tokens()` - Strips sentinel tokens entirely
 * - `MockProvider::slow(ms)` - Delays every response (timeout testing)
 *
 * The mock also tracks concurrent in-flight requests so tests can assert
 * the dispatcher honors its concurrency bound.
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::TranslateProvider;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds, tagging the chunk with the target language
    Working,
    /// Fails the nth request received (1-based), succeeds otherwise
    FailingAt { request: usize },
    /// Succeeds but repeats every sentinel token twice
    DuplicatingTokens,
    /// Succeeds but removes all sentinel tokens
    DroppingTokens,
    /// Succeeds after a fixed delay
    Slow { delay_ms: u64 },
    /// Fails the nth request after `fail_after_ms`; other requests succeed
    /// after `succeed_after_ms`
    FailingSlowlyAt {
        request: usize,
        fail_after_ms: u64,
        succeed_after_ms: u64,
    },
}

/// Mock provider for testing dispatch and pipeline behavior
#[derive(Debug)]
pub struct MockProvider {
    behavior: MockBehavior,
    request_count: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&str, &str) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that fails the nth request it receives (1-based)
    pub fn failing_at(request: usize) -> Self {
        Self::new(MockBehavior::FailingAt { request })
    }

    /// Create a mock that duplicates every sentinel token
    pub fn duplicating_tokens() -> Self {
        Self::new(MockBehavior::DuplicatingTokens)
    }

    /// Create a mock that strips every sentinel token
    pub fn dropping_tokens() -> Self {
        Self::new(MockBehavior::DroppingTokens)
    }

    /// Create a mock whose responses take `delay_ms` to arrive
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Create a mock whose nth request fails slowly while the others
    /// succeed quickly (exercises discarding of already-finished results)
    pub fn failing_slowly_at(request: usize, fail_after_ms: u64, succeed_after_ms: u64) -> Self {
        Self::new(MockBehavior::FailingSlowlyAt {
            request,
            fail_after_ms,
            succeed_after_ms,
        })
    }

    /// Set a custom response generator taking (chunk, target_lang)
    pub fn with_custom_response(mut self, generator: fn(&str, &str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Total requests received so far
    pub fn requests(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously in-flight requests observed
    pub fn peak_concurrency(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn annotate(text: &str, target_lang: &str) -> String {
        format!("[{}] {}", target_lang, text)
    }

    fn duplicate_tokens(text: &str) -> String {
        crate::validation::extract_tokens(text)
            .iter()
            .fold(text.to_string(), |acc, token| {
                acc.replacen(token, &format!("{} {}", token, token), 1)
            })
    }

    fn drop_tokens(text: &str) -> String {
        crate::validation::extract_tokens(text)
            .iter()
            .fold(text.to_string(), |acc, token| acc.replace(token.as_str(), ""))
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            in_flight: Arc::clone(&self.in_flight),
            max_in_flight: Arc::clone(&self.max_in_flight),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl TranslateProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate_chunk(
        &self,
        text: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        let live = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(live, Ordering::SeqCst);
        // Yield so overlapping requests are actually observed in-flight.
        tokio::task::yield_now().await;

        let result = match self.behavior {
            MockBehavior::Working => {
                let out = if let Some(generator) = self.custom_response {
                    generator(text, target_lang)
                } else {
                    Self::annotate(text, target_lang)
                };
                Ok(out)
            }

            MockBehavior::FailingAt { request } => {
                if count == request {
                    Err(ProviderError::request_failed(
                        "mock",
                        503,
                        &format!("simulated failure (request #{})", count),
                    ))
                } else {
                    Ok(Self::annotate(text, target_lang))
                }
            }

            MockBehavior::DuplicatingTokens => Ok(Self::duplicate_tokens(text)),

            MockBehavior::DroppingTokens => Ok(Self::drop_tokens(text)),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(Self::annotate(text, target_lang))
            }

            MockBehavior::FailingSlowlyAt {
                request,
                fail_after_ms,
                succeed_after_ms,
            } => {
                if count == request {
                    tokio::time::sleep(tokio::time::Duration::from_millis(fail_after_ms)).await;
                    Err(ProviderError::request_failed(
                        "mock",
                        500,
                        &format!("simulated slow failure (request #{})", count),
                    ))
                } else {
                    tokio::time::sleep(tokio::time::Duration::from_millis(succeed_after_ms)).await;
                    Ok(Self::annotate(text, target_lang))
                }
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

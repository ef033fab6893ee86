/*!
 * Per-service dispatch profiles.
 *
 * This module provides chunking and concurrency settings based on provider
 * characteristics such as request size limits, rate limits, and tolerance
 * of parallel requests.
 */

use crate::app_config::ServiceKind;

/// Dispatch profile for one service, with tuned defaults
#[derive(Debug, Clone)]
pub struct ServiceProfile {
    /// Maximum characters per chunk
    pub max_chars: usize,
    /// Maximum number of chunks per invocation
    pub max_chunks: usize,
    /// Default number of concurrent requests
    pub concurrency: usize,
    /// Providers that misbehave under parallel requests are pinned to
    /// serial dispatch; a configured override cannot raise this.
    pub serial_only: bool,
}

impl ServiceProfile {
    /// Profile for a service, depending on whether a credential is
    /// configured (keyed endpoints tolerate larger requests).
    pub fn resolve(service: ServiceKind, has_key: bool) -> Self {
        match service {
            ServiceKind::Google => {
                if has_key {
                    // Cloud Translation v2 accepts large batched payloads
                    Self { max_chars: 10_000, max_chunks: 100, concurrency: 4, serial_only: false }
                } else {
                    // Free translate_a/single endpoint, conservative sizing
                    Self { max_chars: 4_000, max_chunks: 60, concurrency: 3, serial_only: false }
                }
            }
            ServiceKind::Microsoft => {
                if has_key {
                    Self { max_chars: 9_000, max_chunks: 100, concurrency: 4, serial_only: false }
                } else {
                    // Edge endpoint shares one bearer token across workers
                    Self { max_chars: 4_000, max_chunks: 60, concurrency: 2, serial_only: false }
                }
            }
            ServiceKind::DeepL => {
                Self { max_chars: 8_000, max_chunks: 80, concurrency: 3, serial_only: false }
            }
            ServiceKind::Libre => {
                if has_key {
                    Self { max_chars: 5_000, max_chunks: 80, concurrency: 3, serial_only: false }
                } else {
                    // Public instances rate-limit keyless clients aggressively
                    Self { max_chars: 2_000, max_chunks: 40, concurrency: 2, serial_only: false }
                }
            }
            ServiceKind::Yandex => {
                Self { max_chars: 4_000, max_chunks: 60, concurrency: 2, serial_only: false }
            }
            ServiceKind::OpenAI => {
                Self { max_chars: 6_000, max_chunks: 80, concurrency: 3, serial_only: false }
            }
            ServiceKind::Gemini => {
                Self { max_chars: 6_000, max_chunks: 80, concurrency: 3, serial_only: false }
            }
            // The free text endpoint rejects overlapping requests from one
            // client, so it is pinned to serial dispatch unconditionally.
            ServiceKind::Pollinations => {
                Self { max_chars: 3_000, max_chunks: 40, concurrency: 1, serial_only: true }
            }
            ServiceKind::Custom => {
                Self { max_chars: 4_000, max_chunks: 60, concurrency: 2, serial_only: false }
            }
        }
    }

    /// Effective concurrency, respecting a user override except for
    /// serial-pinned services
    pub fn effective_concurrency(&self, user_override: Option<usize>) -> usize {
        if self.serial_only {
            return 1;
        }
        user_override.unwrap_or(self.concurrency).max(1)
    }
}

/*!
 * # Anchorlate - Anchor-Preserving Chunked Translation
 *
 * A Rust library for translating selected HTML/text content while
 * protecting regions that must never be altered in transit.
 *
 * ## Features
 *
 * - Anchor mathematical formulas and code behind sentinel tokens
 * - Split anchored text into provider-sized chunks at soft boundaries
 * - Dispatch chunks through a bounded worker pool, reassembled in order
 * - Translate via Google, Microsoft, DeepL, OpenAI, Gemini, Pollinations,
 *   or a user-defined custom endpoint
 * - Verify (and for LLM providers, repair) sentinel-token integrity
 *   before restoring the protected regions
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `anchoring`: Protected-region detection, sentinel tokens, restoration
 * - `chunking`: Size-bounded splitting with boundary safety
 * - `translation`: Dispatch orchestration:
 *   - `translation::profiles`: Per-service size/concurrency profiles
 *   - `translation::dispatcher`: Bounded worker pool
 *   - `translation::progress`: Progress events
 *   - `translation::pipeline`: End-to-end anchored translation
 * - `validation`: Sentinel-token integrity verification and repair
 * - `providers`: Client implementations for the translation backends
 * - `errors`: Custom error types for the pipeline
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod anchoring;
pub mod app_config;
pub mod chunking;
pub mod errors;
pub mod providers;
pub mod translation;
pub mod validation;

// Re-export main types for easier usage
pub use anchoring::{AnchorTable, ProtectedRegion, RegionKind};
pub use app_config::{Config, CustomApiConfig, ServiceKind};
pub use chunking::Chunk;
pub use errors::{ProviderError, TranslationError};
pub use providers::{TranslateProvider, build_provider};
pub use translation::{
    PipelineState, ProgressEvent, ProgressPhase, ProgressSink, TranslatedSelection,
    TranslationPipeline,
};
pub use validation::{IntegrityReport, verify_and_repair};

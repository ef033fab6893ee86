/*!
 * End-to-end anchored translation.
 *
 * One invocation runs: anchor → split (profile-bounded) → dispatch →
 * verify/repair → restore. Every stage's entities are created fresh per
 * invocation and discarded afterwards; nothing is persisted.
 *
 * The invocation walks an explicit state machine so failures report which
 * stage aborted the run:
 * `Idle → Chunking → Dispatching → {Error | Aggregating} →
 * {Repairing (LLM) | Verifying} → {Done | IntegrityFailed}`.
 */

use log::{debug, info, warn};
use std::time::Duration;

use crate::anchoring::{self, AnchorTable};
use crate::app_config::Config;
use crate::chunking;
use crate::errors::TranslationError;
use crate::providers::{TranslateProvider, build_provider};
use crate::translation::dispatcher::{DispatchOptions, dispatch_chunks};
use crate::translation::profiles::ServiceProfile;
use crate::translation::progress::ProgressSink;

/// Stage of one translation invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No invocation in progress
    Idle,
    /// Anchoring and splitting the input
    Chunking,
    /// Chunks are in flight
    Dispatching,
    /// Joining per-chunk results in ordinal order
    Aggregating,
    /// Stripping hallucinated tokens (LLM providers only)
    Repairing,
    /// Comparing token populations
    Verifying,
    /// Terminal: restored output produced
    Done,
    /// Terminal: a chunk failed or configuration was rejected
    Error,
    /// Terminal: token population did not survive translation
    IntegrityFailed,
}

/// Result of one successful invocation
#[derive(Debug)]
pub struct TranslatedSelection {
    /// Restored output text
    pub text: String,
    /// Number of chunks dispatched
    pub chunk_count: usize,
    /// Number of protected regions that were anchored
    pub region_count: usize,
}

/// Anchored-translation pipeline bound to one configuration
pub struct TranslationPipeline {
    config: Config,
    provider: Box<dyn TranslateProvider>,
    progress: ProgressSink,
    state: PipelineState,
}

impl TranslationPipeline {
    /// Build a pipeline from configuration, constructing the configured
    /// provider adapter. Fails before any network traffic when the
    /// configuration is invalid.
    pub fn new(config: Config) -> Result<Self, TranslationError> {
        config
            .validate()
            .map_err(|e| TranslationError::Configuration(e.to_string()))?;
        let provider = build_provider(&config)?;
        Ok(Self {
            config,
            provider,
            progress: ProgressSink::disabled(),
            state: PipelineState::Idle,
        })
    }

    /// Build a pipeline around an externally constructed provider
    pub fn with_provider(config: Config, provider: Box<dyn TranslateProvider>) -> Self {
        Self {
            config,
            provider,
            progress: ProgressSink::disabled(),
            state: PipelineState::Idle,
        }
    }

    /// Attach a progress sink
    pub fn with_progress(mut self, progress: ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    /// Stage reached by the most recent invocation
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Translate into the first configured target language
    pub async fn translate(&mut self, html: &str) -> Result<TranslatedSelection, TranslationError> {
        let target = self.config.primary_target_language().to_string();
        self.translate_to(html, &target).await
    }

    /// Translate into an explicit target language
    pub async fn translate_to(
        &mut self,
        html: &str,
        target_lang: &str,
    ) -> Result<TranslatedSelection, TranslationError> {
        self.state = PipelineState::Chunking;

        let (anchored, table) = anchoring::anchor(html);
        let region_count = table.formulas.len() + table.codes.len();
        debug!(
            "anchored {} region(s) ({} formula, {} code)",
            region_count,
            table.formulas.len(),
            table.codes.len()
        );

        let has_key = self.config.api_key().is_some();
        let profile = ServiceProfile::resolve(self.config.service, has_key);
        let chunks = match chunking::split_bounded(&anchored, profile.max_chars, profile.max_chunks)
        {
            Ok(chunks) => chunks,
            Err(e) => {
                self.state = PipelineState::Error;
                return Err(e);
            }
        };
        info!(
            "translating {} chunk(s) to '{}' via {}",
            chunks.len(),
            target_lang,
            self.provider.name()
        );

        self.state = PipelineState::Dispatching;
        let options = DispatchOptions {
            concurrency: profile.effective_concurrency(self.config.max_concurrency),
            timeout: Duration::from_millis(self.config.timeout_ms),
            target_lang: target_lang.to_string(),
        };
        let outputs =
            match dispatch_chunks(self.provider.as_ref(), &chunks, &options, &self.progress).await
            {
                Ok(outputs) => outputs,
                Err(e) => {
                    self.state = PipelineState::Error;
                    return Err(e);
                }
            };

        self.state = PipelineState::Aggregating;
        let joined = outputs.concat();

        // verify_and_repair owns the hallucination-repair pass for LLM
        // providers before checking the token population, so the state here
        // reflects which stage the call starts in.
        let is_llm = self.config.service.is_llm();
        self.state = if is_llm {
            PipelineState::Repairing
        } else {
            PipelineState::Verifying
        };
        let verified = match crate::validation::verify_and_repair(&anchored, &joined, is_llm) {
            Ok(verified) => verified,
            Err(e) => {
                self.state = PipelineState::IntegrityFailed;
                return Err(e);
            }
        };

        let translated_formulas = if self.config.translate_formulas {
            self.translate_formula_contents(&table, &options).await
        } else {
            Vec::new()
        };
        let restored = anchoring::restore(
            &verified,
            &table,
            self.config.translate_formulas,
            &translated_formulas,
        );

        self.state = PipelineState::Done;
        Ok(TranslatedSelection {
            text: restored,
            chunk_count: chunks.len(),
            region_count,
        })
    }

    /// Best-effort translation of formula contents, one provider call per
    /// formula. A failed formula falls back to its original content rather
    /// than failing the run.
    async fn translate_formula_contents(
        &self,
        table: &AnchorTable,
        options: &DispatchOptions,
    ) -> Vec<Option<String>> {
        let mut translated = Vec::with_capacity(table.formulas.len());
        for region in &table.formulas {
            let outcome = tokio::time::timeout(
                options.timeout,
                self.provider
                    .translate_chunk(&region.original, &options.target_lang),
            )
            .await;
            match outcome {
                Ok(Ok(text)) => translated.push(Some(text)),
                Ok(Err(e)) => {
                    warn!("formula {} not translated: {}", region.ordinal, e);
                    translated.push(None);
                }
                Err(_elapsed) => {
                    warn!("formula {} translation timed out", region.ordinal);
                    translated.push(None);
                }
            }
        }
        translated
    }
}

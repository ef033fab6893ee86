/*!
 * Post-translation validation.
 *
 * This module verifies that the sentinel-token population survived the
 * round trip through a provider, repairing LLM hallucinations where that
 * is safe to do.
 */

pub mod integrity;

pub use integrity::{IntegrityReport, extract_tokens, repair_tokens, verify_and_repair};
